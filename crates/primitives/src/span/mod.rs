//! Inline content: text runs and inline leaves carrying marks.
//!
//! Inline content is addressed in *units*: every Unicode scalar value of a text
//! span is one unit and every inline leaf is one unit. Helpers in this module
//! operate on whole `Vec<Span>` sequences and always return them in canonical
//! form (see [`normalize`]).

use serde::Serialize;

use crate::kind::{Attrs, NodeKind};
use crate::mark::{Mark, MarkSet};

#[cfg(test)]
mod tests;

/// One inline content unit run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Span {
	/// A run of text sharing one mark set.
	Text { text: String, marks: MarkSet },
	/// An inline leaf such as an image. Always one unit wide.
	Leaf {
		kind: NodeKind,
		attrs: Attrs,
		marks: MarkSet,
	},
}

impl Span {
	/// Creates an unmarked text span.
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text {
			text: text.into(),
			marks: MarkSet::empty(),
		}
	}

	/// Creates a text span with marks.
	pub fn styled(text: impl Into<String>, marks: MarkSet) -> Self {
		Self::Text {
			text: text.into(),
			marks,
		}
	}

	/// Creates an inline leaf.
	pub fn leaf(kind: impl Into<NodeKind>, attrs: Attrs) -> Self {
		Self::Leaf {
			kind: kind.into(),
			attrs,
			marks: MarkSet::empty(),
		}
	}

	/// Number of units this span occupies.
	pub fn width(&self) -> usize {
		match self {
			Span::Text { text, .. } => text.chars().count(),
			Span::Leaf { .. } => 1,
		}
	}

	pub fn marks(&self) -> &MarkSet {
		match self {
			Span::Text { marks, .. } | Span::Leaf { marks, .. } => marks,
		}
	}

	/// Returns the text of a text span.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Span::Text { text, .. } => Some(text),
			Span::Leaf { .. } => None,
		}
	}

	pub fn is_text(&self) -> bool {
		matches!(self, Span::Text { .. })
	}

	/// Returns the span with its mark set replaced.
	pub fn with_marks(self, marks: MarkSet) -> Self {
		match self {
			Span::Text { text, .. } => Span::Text { text, marks },
			Span::Leaf { kind, attrs, .. } => Span::Leaf { kind, attrs, marks },
		}
	}

	/// Splits a span at a unit offset inside it.
	fn split(self, at: usize) -> (Span, Span) {
		match self {
			Span::Text { text, marks } => {
				let byte = byte_offset(&text, at);
				let (head, tail) = text.split_at(byte);
				(
					Span::Text {
						text: head.to_string(),
						marks: marks.clone(),
					},
					Span::Text {
						text: tail.to_string(),
						marks,
					},
				)
			}
			// Leaves are one unit wide and never split internally.
			leaf @ Span::Leaf { .. } => (Span::text(""), leaf),
		}
	}
}

fn byte_offset(text: &str, units: usize) -> usize {
	text.char_indices().nth(units).map_or(text.len(), |(i, _)| i)
}

/// Total width of a span sequence in units.
pub fn width(spans: &[Span]) -> usize {
	spans.iter().map(Span::width).sum()
}

/// Puts inline content in canonical form: drops empty text spans and merges
/// adjacent text spans with equal mark sets.
pub fn normalize(spans: Vec<Span>) -> Vec<Span> {
	let mut out: Vec<Span> = Vec::with_capacity(spans.len());
	for span in spans {
		if let Span::Text { text, .. } = &span
			&& text.is_empty()
		{
			continue;
		}
		if let (
			Some(Span::Text {
				text: prev,
				marks: prev_marks,
			}),
			Span::Text { text, marks },
		) = (out.last_mut(), &span)
			&& *prev_marks == *marks
		{
			prev.push_str(text);
			continue;
		}
		out.push(span);
	}
	out
}

/// Splits content at unit offset `at` into `(before, after)`.
///
/// Offsets past the end are clamped.
pub fn split_at(spans: &[Span], at: usize) -> (Vec<Span>, Vec<Span>) {
	let mut before = Vec::new();
	let mut after = Vec::new();
	let mut pos = 0;
	for span in spans {
		let w = span.width();
		if pos + w <= at {
			before.push(span.clone());
		} else if pos >= at {
			after.push(span.clone());
		} else {
			let (head, tail) = span.clone().split(at - pos);
			before.push(head);
			after.push(tail);
		}
		pos += w;
	}
	(normalize(before), normalize(after))
}

/// Returns the units in `[from, to)`.
pub fn slice(spans: &[Span], from: usize, to: usize) -> Vec<Span> {
	let (_, rest) = split_at(spans, from);
	let (mid, _) = split_at(&rest, to.saturating_sub(from));
	mid
}

/// Inserts `inserted` at unit offset `at`.
pub fn insert(spans: &[Span], at: usize, inserted: &[Span]) -> Vec<Span> {
	let (mut before, after) = split_at(spans, at);
	before.extend(inserted.iter().cloned());
	before.extend(after);
	normalize(before)
}

/// Removes the units in `[from, to)`.
pub fn remove(spans: &[Span], from: usize, to: usize) -> Vec<Span> {
	let (mut before, rest) = split_at(spans, from);
	let (_, after) = split_at(&rest, to.saturating_sub(from));
	before.extend(after);
	normalize(before)
}

/// Applies `f` to the mark set of every unit in `[from, to)`.
pub fn map_marks(spans: &[Span], from: usize, to: usize, f: impl Fn(&MarkSet) -> MarkSet) -> Vec<Span> {
	let (mut before, rest) = split_at(spans, from);
	let (mid, after) = split_at(&rest, to.saturating_sub(from));
	before.extend(mid.into_iter().map(|span| {
		let marks = f(span.marks());
		span.with_marks(marks)
	}));
	before.extend(after);
	normalize(before)
}

/// Returns the span covering unit `index` and the unit offset it starts at.
pub fn span_at(spans: &[Span], index: usize) -> Option<(&Span, usize)> {
	let mut pos = 0;
	for span in spans {
		let w = span.width();
		if index < pos + w {
			return Some((span, pos));
		}
		pos += w;
	}
	None
}

/// A maximal run of units in `[from, to)` that share the same mark of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRun {
	pub from: usize,
	pub to: usize,
	/// The mark of the queried kind on this run, if any.
	pub mark: Option<Mark>,
}

/// Partitions `[from, to)` into runs by the mark of `kind` each unit carries.
pub fn mark_runs(spans: &[Span], from: usize, to: usize, kind: &str) -> Vec<MarkRun> {
	let mut runs: Vec<MarkRun> = Vec::new();
	let mut pos = 0;
	for span in spans {
		let w = span.width();
		let start = pos.max(from);
		let end = (pos + w).min(to);
		pos += w;
		if start >= end {
			continue;
		}
		let mark = span.marks().get(kind).cloned();
		match runs.last_mut() {
			Some(last) if last.to == start && last.mark == mark => last.to = end,
			_ => runs.push(MarkRun {
				from: start,
				to: end,
				mark,
			}),
		}
	}
	runs
}

/// Concatenated text of the units in `[from, to)`; leaves contribute nothing.
pub fn text_between(spans: &[Span], from: usize, to: usize) -> String {
	slice(spans, from, to).iter().filter_map(Span::as_text).collect()
}
