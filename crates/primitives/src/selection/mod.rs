use serde::Serialize;

use crate::document::Document;
use crate::position::Pos;
use crate::transform::{Bias, Mapping};


/// Selection direction (anchor to head).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Head is at or after anchor.
	Forward,
	/// Head is before anchor.
	Backward,
}

/// A selection defined by anchor and head positions.
///
/// The anchor is the fixed end, and the head moves during selection extension.
/// A selection is collapsed (a cursor) when both ends are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
	/// The fixed end of the selection.
	pub anchor: Pos,
	/// The moving end of the selection (cursor position).
	pub head: Pos,
}

impl Selection {
	/// Creates a new selection from anchor to head.
	pub fn new(anchor: Pos, head: Pos) -> Self {
		Self { anchor, head }
	}

	/// Creates a collapsed selection at the given position.
	pub fn point(pos: Pos) -> Self {
		Self::new(pos.clone(), pos)
	}

	/// Returns the earlier of anchor and head in document order.
	#[inline]
	pub fn from(&self) -> &Pos {
		std::cmp::min(&self.anchor, &self.head)
	}

	/// Returns the later of anchor and head in document order.
	#[inline]
	pub fn to(&self) -> &Pos {
		std::cmp::max(&self.anchor, &self.head)
	}

	/// Returns true if anchor and head are the same position.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	pub fn direction(&self) -> Direction {
		if self.head < self.anchor {
			Direction::Backward
		} else {
			Direction::Forward
		}
	}

	/// Swaps anchor and head.
	pub fn flip(&self) -> Self {
		Self::new(self.head.clone(), self.anchor.clone())
	}

	/// Returns true if both ends resolve in `doc`.
	pub fn is_valid_in(&self, doc: &Document) -> bool {
		doc.contains(&self.anchor) && doc.contains(&self.head)
	}

	/// Maps both ends through `mapping`. Both ends move past content inserted
	/// exactly at them, so a cursor follows typed text.
	pub fn map(&self, mapping: &Mapping) -> Self {
		Self::new(
			mapping.map_pos(&self.anchor, Bias::Right),
			mapping.map_pos(&self.head, Bias::Right),
		)
	}
}
