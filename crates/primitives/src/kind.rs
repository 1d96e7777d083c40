//! Type tags and attribute maps shared by nodes, spans and marks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

macro_rules! kind_name {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
		#[serde(transparent)]
		pub struct $name(Arc<str>);

		impl $name {
			/// Creates a tag from a name.
			pub fn new(name: impl AsRef<str>) -> Self {
				Self(Arc::from(name.as_ref()))
			}

			/// Returns the tag name.
			#[inline]
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Debug for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{:?}", &*self.0)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(name: &str) -> Self {
				Self::new(name)
			}
		}

		impl From<String> for $name {
			fn from(name: String) -> Self {
				Self(Arc::from(name))
			}
		}

		impl PartialEq<str> for $name {
			fn eq(&self, other: &str) -> bool {
				&*self.0 == other
			}
		}

		impl PartialEq<&str> for $name {
			fn eq(&self, other: &&str) -> bool {
				&*self.0 == *other
			}
		}
	};
}

kind_name! {
	/// Type tag of a block node or inline leaf (e.g. `paragraph`, `image`).
	NodeKind
}

kind_name! {
	/// Type tag of a mark (e.g. `strong`, `link`).
	MarkKind
}

/// String attribute map attached to nodes, inline leaves and marks.
///
/// Ordered so that equality and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, String>);

impl Attrs {
	/// Creates an empty attribute map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the map with `key` set to `value`.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Sets `key` to `value`, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates over `(key, value)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// A node type plus attributes, without content.
///
/// Describes wrappers for [`wrap`](crate::transform::Transform::wrap) and the
/// type given to the second half of a split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Markup {
	pub kind: NodeKind,
	pub attrs: Attrs,
}

impl Markup {
	/// Creates markup with no attributes.
	pub fn new(kind: impl Into<NodeKind>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
		}
	}

	/// Creates markup with attributes.
	pub fn with_attrs(kind: impl Into<NodeKind>, attrs: Attrs) -> Self {
		Self {
			kind: kind.into(),
			attrs,
		}
	}
}

impl From<&str> for Markup {
	fn from(kind: &str) -> Self {
		Self::new(kind)
	}
}

impl From<&crate::Node> for Markup {
	fn from(node: &crate::Node) -> Self {
		node.markup()
	}
}
