//! Inline formatting marks and mark sets.

use serde::Serialize;
use smallvec::SmallVec;

use crate::kind::{Attrs, MarkKind};


/// An inline formatting attribute such as `strong` or a `link` with an `href`.
///
/// Equality is structural: two marks are equal when both kind and attributes
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Mark {
	kind: MarkKind,
	attrs: Attrs,
}

impl Mark {
	/// Creates a mark without attributes.
	pub fn new(kind: impl Into<MarkKind>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
		}
	}

	/// Creates a mark with attributes.
	pub fn with_attrs(kind: impl Into<MarkKind>, attrs: Attrs) -> Self {
		Self {
			kind: kind.into(),
			attrs,
		}
	}

	/// Creates a `link` mark. An empty title is omitted.
	pub fn link(href: impl Into<String>, title: impl Into<String>) -> Self {
		let mut attrs = Attrs::new().with("href", href);
		let title = title.into();
		if !title.is_empty() {
			attrs.insert("title", title);
		}
		Self::with_attrs("link", attrs)
	}

	pub fn kind(&self) -> &MarkKind {
		&self.kind
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	/// Returns true if this mark has the given kind.
	#[inline]
	pub fn is(&self, kind: &str) -> bool {
		self.kind == *kind
	}
}

/// A set of marks with at most one mark per kind, ordered by kind name.
///
/// All operations are pure and return a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkSet(SmallVec<[Mark; 2]>);

impl MarkSet {
	/// The empty mark set.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a set from marks; later marks replace earlier marks of the same kind.
	pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
		marks.into_iter().fold(Self::empty(), |set, mark| set.add(mark))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Mark> {
		self.0.iter()
	}

	/// Returns true if the set holds a mark of `kind`.
	pub fn contains_kind(&self, kind: &str) -> bool {
		self.get(kind).is_some()
	}

	/// Returns true if the set holds exactly `mark`.
	pub fn contains(&self, mark: &Mark) -> bool {
		self.0.iter().any(|m| m == mark)
	}

	/// Returns the mark of `kind`, if present.
	pub fn get(&self, kind: &str) -> Option<&Mark> {
		self.0.iter().find(|m| m.is(kind))
	}

	/// Returns a set containing `mark`, replacing any mark of the same kind.
	pub fn add(&self, mark: Mark) -> Self {
		let mut marks = self.0.clone();
		match marks.binary_search_by(|m| m.kind.cmp(&mark.kind)) {
			Ok(idx) => marks[idx] = mark,
			Err(idx) => marks.insert(idx, mark),
		}
		Self(marks)
	}

	/// Returns a set without `mark`. A mark of the same kind but different
	/// attributes is kept.
	pub fn remove(&self, mark: &Mark) -> Self {
		Self(self.0.iter().filter(|m| *m != mark).cloned().collect())
	}

	/// Returns a set without any mark of `kind`.
	pub fn remove_kind(&self, kind: &str) -> Self {
		Self(self.0.iter().filter(|m| !m.is(kind)).cloned().collect())
	}
}

impl<'a> IntoIterator for &'a MarkSet {
	type Item = &'a Mark;
	type IntoIter = std::slice::Iter<'a, Mark>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl FromIterator<Mark> for MarkSet {
	fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
		Self::from_marks(iter)
	}
}
