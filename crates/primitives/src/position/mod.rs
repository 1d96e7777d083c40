//! Tree addressing: a position is a container path plus an offset inside it.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;


/// Child indices from the root down to a node.
pub type Path = SmallVec<[usize; 4]>;

/// A point in a document.
///
/// `path` names the container node by child indices from the root; `offset`
/// is a child index when the container holds blocks (a point between two
/// blocks) and a unit offset when it holds inline content.
///
/// Positions order in document order: a position at offset `k` of a block
/// container sorts before everything inside child `k` and after everything
/// inside child `k - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pos {
	/// Container node path.
	pub path: Path,
	/// Offset inside the container.
	pub offset: usize,
}

impl Pos {
	/// Creates a position in the container at `path`.
	pub fn new(path: impl IntoIterator<Item = usize>, offset: usize) -> Self {
		Self {
			path: path.into_iter().collect(),
			offset,
		}
	}

	/// Creates a position directly inside the root node.
	pub fn root(offset: usize) -> Self {
		Self {
			path: Path::new(),
			offset,
		}
	}

	/// Creates the position at offset 0 of the container at `path`.
	pub fn start_of(path: &[usize]) -> Self {
		Self::new(path.iter().copied(), 0)
	}

	/// Number of path entries; 0 for positions inside the root.
	#[inline]
	pub fn depth(&self) -> usize {
		self.path.len()
	}

	/// Returns true if both positions sit in the same container.
	#[inline]
	pub fn same_path(&self, other: &Pos) -> bool {
		self.path == other.path
	}

	/// Returns the position at `offset` inside child `index` of this
	/// position's container.
	pub fn child(&self, index: usize, offset: usize) -> Pos {
		let mut path = self.path.clone();
		path.push(index);
		Pos { path, offset }
	}

	/// Returns the position moved by `delta` within the same container,
	/// saturating at 0.
	pub fn move_by(&self, delta: isize) -> Pos {
		Pos {
			path: self.path.clone(),
			offset: self.offset.saturating_add_signed(delta),
		}
	}

	/// Returns a position pointing before (`extra == 0`) or after
	/// (`extra == 1`) the ancestor node at `depth`.
	///
	/// `None` targets the innermost node, i.e. the container itself. A depth
	/// at or beyond the path length returns the position unchanged.
	pub fn shorten(&self, depth: Option<usize>, extra: usize) -> Pos {
		let len = self.path.len();
		let Some(to) = depth.or_else(|| len.checked_sub(1)) else {
			return self.clone();
		};
		if to >= len {
			return self.clone();
		}
		Pos {
			path: self.path[..to].iter().copied().collect(),
			offset: self.path[to] + extra,
		}
	}

	/// Path of the container's parent, or `None` for the root.
	pub fn parent_path(&self) -> Option<&[usize]> {
		self.path.split_last().map(|(_, rest)| rest)
	}
}

impl Ord for Pos {
	fn cmp(&self, other: &Self) -> Ordering {
		let common = self.path.len().min(other.path.len());
		for i in 0..common {
			match self.path[i].cmp(&other.path[i]) {
				Ordering::Equal => {}
				ord => return ord,
			}
		}
		match self.path.len().cmp(&other.path.len()) {
			Ordering::Equal => self.offset.cmp(&other.offset),
			// Self is inside child `self.path[common]` of other's container.
			Ordering::Greater => {
				if self.path[common] < other.offset {
					Ordering::Less
				} else {
					Ordering::Greater
				}
			}
			Ordering::Less => {
				if self.offset <= other.path[common] {
					Ordering::Less
				} else {
					Ordering::Greater
				}
			}
		}
	}
}

impl PartialOrd for Pos {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for Pos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (i, idx) in self.path.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{idx}")?;
		}
		write!(f, "]:{}", self.offset)
	}
}
