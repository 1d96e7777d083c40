use crate::position::{Path, Pos};

/// Bias determines how positions at step boundaries are mapped.
///
/// When mapping a position through an insertion or split at the same
/// location, bias determines whether the position moves with the new content
/// or stays before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	#[default]
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// How one step moves positions.
///
/// Positions inside removed content collapse to the start of the removed
/// range. Positions inside moved, split, wrapped or unwrapped content follow
/// the content. Degenerate maps (an inverted range, a join at index 0) never
/// panic; they saturate at the container start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepMap {
	/// The step moves no positions (mark changes).
	Identity,
	/// `len` children or units inserted at `at` in the container at `path`.
	Insert { path: Path, at: usize, len: usize },
	/// Children or units `[from, to)` removed from the container at `path`.
	Remove { path: Path, from: usize, to: usize },
	/// The node at `path` split at `offset` into itself and a next sibling.
	Split { path: Path, offset: usize },
	/// Child `index` of `path` merged into child `index - 1`, whose old size
	/// was `seam`.
	Join { path: Path, index: usize, seam: usize },
	/// Children `[from, to)` of `path` moved into a new node at `from`.
	Wrap { path: Path, from: usize, to: usize },
	/// The node at `path` replaced by its `count` children.
	Unwrap { path: Path, count: usize },
}

/// Index of the child of `base` that `pos` lies inside, if `pos` is strictly
/// deeper than `base` and below it.
fn child_index(pos: &Pos, base: &[usize]) -> Option<usize> {
	(pos.path.len() > base.len() && pos.path.starts_with(base)).then(|| pos.path[base.len()])
}

fn with_entry(pos: &Pos, depth: usize, value: usize) -> Pos {
	let mut mapped = pos.clone();
	mapped.path[depth] = value;
	mapped
}

impl StepMap {
	/// Maps a position valid before the step to one valid after it.
	pub fn map_pos(&self, pos: &Pos, bias: Bias) -> Pos {
		match self {
			StepMap::Identity => pos.clone(),
			StepMap::Insert { path, at, len } => {
				if pos.path == *path {
					if pos.offset > *at || (pos.offset == *at && bias == Bias::Right) {
						return Pos::new(path.iter().copied(), pos.offset + len);
					}
				} else if let Some(c) = child_index(pos, path)
					&& c >= *at
				{
					return with_entry(pos, path.len(), c + len);
				}
				pos.clone()
			}
			StepMap::Remove { path, from, to } => {
				let removed = to.saturating_sub(*from);
				if pos.path == *path {
					if pos.offset >= *to {
						return Pos::new(path.iter().copied(), pos.offset - removed);
					}
					if pos.offset > *from {
						return Pos::new(path.iter().copied(), *from);
					}
				} else if let Some(c) = child_index(pos, path) {
					if c >= *to {
						return with_entry(pos, path.len(), c - removed);
					}
					if c >= *from {
						return Pos::new(path.iter().copied(), *from);
					}
				}
				pos.clone()
			}
			StepMap::Split { path, offset } => map_split(pos, path, *offset, bias),
			StepMap::Join { path, index, seam } => map_join(pos, path, *index, *seam),
			StepMap::Wrap { path, from, to } => map_wrap(pos, path, *from, *to),
			StepMap::Unwrap { path, count } => map_unwrap(pos, path, *count),
		}
	}
}

fn map_split(pos: &Pos, path: &Path, offset: usize, bias: Bias) -> Pos {
	let Some((&k, parent)) = path.split_last() else {
		return pos.clone();
	};
	if pos.path == *path {
		if pos.offset > offset || (pos.offset == offset && bias == Bias::Right) {
			return Pos::new(parent.iter().copied().chain([k + 1]), pos.offset - offset);
		}
		return pos.clone();
	}
	if let Some(c) = child_index(pos, path) {
		if c >= offset {
			let mut mapped = with_entry(pos, parent.len(), k + 1);
			mapped.path[path.len()] = c - offset;
			return mapped;
		}
		return pos.clone();
	}
	if pos.path[..] == *parent {
		if pos.offset > k {
			return pos.move_by(1);
		}
	} else if let Some(c) = child_index(pos, parent)
		&& c > k
	{
		return with_entry(pos, parent.len(), c + 1);
	}
	pos.clone()
}

fn map_join(pos: &Pos, path: &Path, index: usize, seam: usize) -> Pos {
	let depth = path.len();
	if let Some(c) = child_index(pos, path) {
		if c == index {
			let mut mapped = with_entry(pos, depth, index.saturating_sub(1));
			if mapped.path.len() == depth + 1 {
				mapped.offset += seam;
			} else {
				mapped.path[depth + 1] += seam;
			}
			return mapped;
		}
		if c > index {
			return with_entry(pos, depth, c - 1);
		}
		return pos.clone();
	}
	if pos.path == *path {
		if pos.offset == index {
			return Pos::new(path.iter().copied().chain([index.saturating_sub(1)]), seam);
		}
		if pos.offset > index {
			return pos.move_by(-1);
		}
	}
	pos.clone()
}

fn map_wrap(pos: &Pos, path: &Path, from: usize, to: usize) -> Pos {
	let depth = path.len();
	let moved = to.saturating_sub(from);
	if let Some(c) = child_index(pos, path) {
		if (from..to).contains(&c) {
			let mut mapped_path: Path = path.clone();
			mapped_path.push(from);
			mapped_path.push(c - from);
			mapped_path.extend_from_slice(&pos.path[depth + 1..]);
			return Pos {
				path: mapped_path,
				offset: pos.offset,
			};
		}
		if c >= to {
			return with_entry(pos, depth, c - moved + 1);
		}
		return pos.clone();
	}
	if pos.path == *path {
		if pos.offset > from && pos.offset < to {
			return Pos::new(path.iter().copied().chain([from]), pos.offset - from);
		}
		if pos.offset >= to {
			return Pos::new(path.iter().copied(), pos.offset - moved + 1);
		}
	}
	pos.clone()
}

fn map_unwrap(pos: &Pos, path: &Path, count: usize) -> Pos {
	let Some((&k, parent)) = path.split_last() else {
		return pos.clone();
	};
	if let Some(c) = child_index(pos, path) {
		let mut mapped_path: Path = parent.iter().copied().collect();
		mapped_path.push(k + c);
		mapped_path.extend_from_slice(&pos.path[path.len() + 1..]);
		return Pos {
			path: mapped_path,
			offset: pos.offset,
		};
	}
	if pos.path == *path {
		return Pos::new(parent.iter().copied(), k + pos.offset);
	}
	if pos.path[..] == *parent {
		if pos.offset > k {
			return Pos::new(parent.iter().copied(), pos.offset + count - 1);
		}
	} else if let Some(c) = child_index(pos, parent)
		&& c > k
	{
		return with_entry(pos, parent.len(), c + count - 1);
	}
	pos.clone()
}

/// The composed position maps of a sequence of steps, applied left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
	maps: Vec<StepMap>,
}

impl Mapping {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, map: StepMap) {
		self.maps.push(map);
	}

	pub fn maps(&self) -> &[StepMap] {
		&self.maps
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}

	pub(crate) fn truncate(&mut self, len: usize) {
		self.maps.truncate(len);
	}

	/// Maps a position through every step in order.
	pub fn map_pos(&self, pos: &Pos, bias: Bias) -> Pos {
		self.maps.iter().fold(pos.clone(), |pos, map| map.map_pos(&pos, bias))
	}
}

impl FromIterator<StepMap> for Mapping {
	fn from_iter<I: IntoIterator<Item = StepMap>>(iter: I) -> Self {
		Self {
			maps: iter.into_iter().collect(),
		}
	}
}
