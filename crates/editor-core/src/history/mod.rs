//! Grouped undo/redo history.
//!
//! Stores forward and inverse steps per commit rather than document
//! snapshots. Consecutive commits are coalesced into one undo group while the
//! history is *recording* and the edits continue each other: a typing run
//! that keeps inserting where the last insertion ended, or a deletion run that
//! keeps removing next to the last removal, within the configured delay.
//!
//! Anything else closes the group: a commit of another kind, a selection
//! change, undo, redo, or an explicit [`History::close_group`].


use std::time::{Duration, Instant};

use quire_primitives::{Document, EditError, Pos, Selection, Step, Transform, UndoPolicy};
use tracing::{debug, trace};

use crate::config::HistoryConfig;

/// Coalescing class of a committed transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
	/// A single text insertion.
	Typing,
	/// A single inline removal.
	Deleting,
	/// Anything else; never coalesced under [`UndoPolicy::Auto`].
	Other,
}

/// Kind and extent of one commit, derived from its steps.
#[derive(Debug, Clone)]
struct Shape {
	kind: EditKind,
	/// Affected inline range; `None` for [`EditKind::Other`].
	range: Option<(Pos, Pos)>,
}

impl Shape {
	fn of(steps: &[Step]) -> Self {
		match steps {
			[Step::InsertInline { path, at, spans }] => {
				let width = spans.iter().map(|span| span.width()).sum::<usize>();
				Self {
					kind: EditKind::Typing,
					range: Some((Pos::new(path.iter().copied(), *at), Pos::new(path.iter().copied(), at + width))),
				}
			}
			[Step::RemoveInline { path, from, to }] => Self {
				kind: EditKind::Deleting,
				range: Some((Pos::new(path.iter().copied(), *from), Pos::new(path.iter().copied(), *to))),
			},
			_ => Self {
				kind: EditKind::Other,
				range: None,
			},
		}
	}

	/// Where the caret rests after this edit.
	fn caret(&self) -> Option<Pos> {
		let (from, to) = self.range.as_ref()?;
		match self.kind {
			EditKind::Typing => Some(to.clone()),
			_ => Some(from.clone()),
		}
	}
}

/// One user-perceived operation: a run of commits undone together.
#[derive(Debug, Clone)]
pub struct UndoGroup {
	/// Forward steps per commit, in commit order.
	redo: Vec<Vec<Step>>,
	/// Inverse steps per commit, applied in reverse commit order.
	undo: Vec<Vec<Step>>,
	selection_before: Selection,
	selection_after: Selection,
	kind: EditKind,
	/// Caret after the latest commit, for adjacency checks.
	caret: Option<Pos>,
	updated_at: Instant,
}

impl UndoGroup {
	fn new(edit: HistoryEdit, shape: Shape) -> Self {
		Self {
			caret: shape.caret(),
			kind: shape.kind,
			redo: vec![edit.redo],
			undo: vec![edit.undo],
			selection_before: edit.selection_before,
			selection_after: edit.selection_after,
			updated_at: edit.at,
		}
	}

	fn append(&mut self, edit: HistoryEdit, shape: Shape) {
		if self.kind != shape.kind {
			self.kind = EditKind::Other;
		}
		self.caret = shape.caret();
		self.redo.push(edit.redo);
		self.undo.push(edit.undo);
		self.selection_after = edit.selection_after;
		self.updated_at = edit.at;
	}

	/// Whether an [`UndoPolicy::Auto`] commit of `shape` continues this group.
	fn continues(&self, shape: &Shape, at: Instant, delay: Duration) -> bool {
		if self.kind == EditKind::Other || self.kind != shape.kind {
			return false;
		}
		if at.saturating_duration_since(self.updated_at) > delay {
			return false;
		}
		let (Some(caret), Some((from, to))) = (&self.caret, &shape.range) else {
			return false;
		};
		match shape.kind {
			EditKind::Typing => from == caret,
			EditKind::Deleting => to == caret || from == caret,
			EditKind::Other => false,
		}
	}

	pub fn kind(&self) -> EditKind {
		self.kind
	}

	/// Number of commits coalesced into this group.
	pub fn len(&self) -> usize {
		self.redo.len()
	}

	pub fn is_empty(&self) -> bool {
		self.redo.is_empty()
	}

	/// Selection before the group's first commit.
	pub fn selection_before(&self) -> &Selection {
		&self.selection_before
	}

	/// Selection after the group's latest commit.
	pub fn selection_after(&self) -> &Selection {
		&self.selection_after
	}
}

/// A committed transform as handed to [`History::record`].
#[derive(Debug, Clone)]
pub struct HistoryEdit {
	/// The transform's steps.
	pub redo: Vec<Step>,
	/// Steps restoring the document from before the transform.
	pub undo: Vec<Step>,
	pub selection_before: Selection,
	pub selection_after: Selection,
	pub policy: UndoPolicy,
	/// When the commit happened.
	pub at: Instant,
}

/// Result of an undo or redo: the replayed transform and the selection to
/// restore.
#[derive(Debug, Clone)]
pub struct Restored {
	pub transform: Transform,
	pub selection: Selection,
}

/// Grouped undo/redo stacks with a coalescing policy.
#[derive(Debug, Clone)]
pub struct History {
	undo_stack: Vec<UndoGroup>,
	redo_stack: Vec<UndoGroup>,
	/// Whether the latest group accepts [`UndoPolicy::Auto`] merges.
	recording: bool,
	depth: usize,
	group_delay: Duration,
}

impl Default for History {
	fn default() -> Self {
		Self::new(&HistoryConfig::default())
	}
}

impl History {
	/// Creates an empty history bounded by `config`.
	pub fn new(config: &HistoryConfig) -> Self {
		Self {
			undo_stack: Vec::new(),
			redo_stack: Vec::new(),
			recording: false,
			depth: config.depth.max(1),
			group_delay: config.group_delay(),
		}
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		!self.undo_stack.is_empty()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		!self.redo_stack.is_empty()
	}

	/// Returns the number of groups in the undo stack.
	pub fn undo_len(&self) -> usize {
		self.undo_stack.len()
	}

	/// Returns the number of groups in the redo stack.
	pub fn redo_len(&self) -> usize {
		self.redo_stack.len()
	}

	/// Whether the latest group is still open for merges.
	pub fn is_recording(&self) -> bool {
		self.recording
	}

	/// The newest undo group.
	pub fn last_group(&self) -> Option<&UndoGroup> {
		self.undo_stack.last()
	}

	/// Ends the open group; the next commit starts a new one.
	pub fn close_group(&mut self) {
		if self.recording {
			trace!(groups = self.undo_stack.len(), "history.close_group");
		}
		self.recording = false;
	}

	/// Clears the redo stack.
	///
	/// MUST be called on every new edit to maintain history integrity.
	pub fn clear_redo(&mut self) {
		if !self.redo_stack.is_empty() {
			trace!(dropped = self.redo_stack.len(), "history.clear_redo");
		}
		self.redo_stack.clear();
	}

	/// Records a committed edit.
	///
	/// Returns `true` when the edit started a new group, `false` when it was
	/// merged into the latest one. Evicts the oldest groups beyond the
	/// configured depth.
	pub fn record(&mut self, edit: HistoryEdit) -> bool {
		let shape = Shape::of(&edit.redo);
		let merge = match edit.policy {
			UndoPolicy::Record => false,
			UndoPolicy::Merge => !self.undo_stack.is_empty(),
			UndoPolicy::Auto => {
				self.recording
					&& self
						.undo_stack
						.last()
						.is_some_and(|group| group.continues(&shape, edit.at, self.group_delay))
			}
		};

		self.clear_redo();
		if merge && let Some(group) = self.undo_stack.last_mut() {
			group.append(edit, shape);
			trace!(kind = ?group.kind, commits = group.len(), "history.merge");
		} else {
			let group = UndoGroup::new(edit, shape);
			debug!(kind = ?group.kind, undo_len = self.undo_stack.len() + 1, "history.group_start");
			self.undo_stack.push(group);
		}
		self.recording = true;
		self.enforce_limits();
		!merge
	}

	/// Evicts oldest groups until the depth limit is met.
	fn enforce_limits(&mut self) {
		while self.undo_stack.len() > self.depth {
			let oldest = self.undo_stack.remove(0);
			debug!(commits = oldest.len(), depth = self.depth, "history.evict");
		}
	}

	/// Undoes the newest group against `doc`.
	///
	/// Returns `Ok(None)` when there is nothing to undo. If the inverse steps
	/// no longer apply, the group stays on the undo stack.
	pub fn undo(&mut self, doc: &Document) -> Result<Option<Restored>, EditError> {
		self.recording = false;
		let Some(group) = self.undo_stack.pop() else {
			return Ok(None);
		};
		let steps: Vec<Step> = group.undo.iter().rev().flatten().cloned().collect();
		match Transform::replay(doc, &steps) {
			Ok(transform) => {
				let selection = group.selection_before.clone();
				trace!(steps = steps.len(), "history.undo");
				self.redo_stack.push(group);
				Ok(Some(Restored { transform, selection }))
			}
			Err(err) => {
				self.undo_stack.push(group);
				Err(err)
			}
		}
	}

	/// Redoes the newest undone group against `doc`.
	pub fn redo(&mut self, doc: &Document) -> Result<Option<Restored>, EditError> {
		self.recording = false;
		let Some(group) = self.redo_stack.pop() else {
			return Ok(None);
		};
		let steps: Vec<Step> = group.redo.iter().flatten().cloned().collect();
		match Transform::replay(doc, &steps) {
			Ok(transform) => {
				let selection = group.selection_after.clone();
				trace!(steps = steps.len(), "history.redo");
				self.undo_stack.push(group);
				self.enforce_limits();
				Ok(Some(Restored { transform, selection }))
			}
			Err(err) => {
				self.redo_stack.push(group);
				Err(err)
			}
		}
	}
}
