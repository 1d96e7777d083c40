//! Editor - the current document, its selection and undo history.
//!
//! An [`Editor`] owns exactly one current [`Document`]. Collaborators read it
//! through [`Editor::doc`], build a [`Transform`] with [`Editor::tr`] and hand
//! it back through [`Editor::apply`] or [`Editor::commit`], the single gate
//! for document modifications.
//!
//! # Selection
//!
//! The selection lives next to the document it addresses. Every commit remaps
//! it through the transform's mapping (or replaces it with an explicit
//! selection), so it can never refer to positions of a superseded document.
//! A remapped or restored end that lands between blocks, for instance because
//! its textblock was removed, moves to the nearest textblock position.
//!
//! # Stored marks
//!
//! Toggling a style on a collapsed selection does not change the document;
//! the editor stores the resulting mark set and uses it for the next typed
//! text. Stored marks are dropped when the selection or the document changes.


use std::time::Instant;

use quire_primitives::{
	Bias, CommitResult, Document, EditError, EditOrigin, Mark, MarkSet, Pos, Selection, Transform,
	UndoPolicy, active_styles_at, selected_text,
};
use tracing::{debug, trace, warn};

use crate::config::EditorConfig;
use crate::history::{History, HistoryEdit, Restored};

/// A transform ready to be committed, with its history and selection policy.
#[derive(Debug, Clone)]
pub struct EditCommit {
	/// The staged edit; must be built against the editor's current document.
	pub tr: Transform,
	/// Explicit selection after the edit. `None` remaps the current one.
	pub selection_after: Option<Selection>,
	/// How the edit is grouped for undo.
	pub undo: UndoPolicy,
	pub origin: EditOrigin,
}

impl EditCommit {
	pub fn new(tr: Transform) -> Self {
		Self {
			tr,
			selection_after: None,
			undo: UndoPolicy::Auto,
			origin: EditOrigin::Input,
		}
	}

	pub fn with_selection(mut self, selection: Selection) -> Self {
		self.selection_after = Some(selection);
		self
	}

	pub fn with_undo(mut self, undo: UndoPolicy) -> Self {
		self.undo = undo;
		self
	}

	pub fn with_origin(mut self, origin: EditOrigin) -> Self {
		self.origin = origin;
		self
	}
}

/// Headless editor state.
#[derive(Debug, Clone)]
pub struct Editor {
	doc: Document,
	selection: Selection,
	/// Marks for the next typed text, overriding the ones at the cursor.
	stored_marks: Option<MarkSet>,
	history: History,
	/// Incremented on every document change, including undo and redo.
	version: u64,
}

impl Editor {
	/// Creates an editor on `doc` with default configuration.
	///
	/// The selection starts collapsed at the first textblock.
	pub fn new(doc: Document) -> Self {
		Self::with_config(doc, &EditorConfig::default())
	}

	pub fn with_config(doc: Document, config: &EditorConfig) -> Self {
		Self {
			selection: Selection::point(doc.start()),
			doc,
			stored_marks: None,
			history: History::new(&config.history),
			version: 0,
		}
	}

	/// Returns the current document.
	pub fn doc(&self) -> &Document {
		&self.doc
	}

	/// Returns the current selection.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	/// Returns the document version.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Returns the undo history.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Returns the stored marks, if any are set.
	pub fn stored_marks(&self) -> Option<&MarkSet> {
		self.stored_marks.as_ref()
	}

	/// Starts a transform against the current document.
	pub fn tr(&self) -> Transform {
		Transform::new(self.doc.clone())
	}

	/// Replaces the selection.
	///
	/// Both ends must resolve in the current document. A changed selection
	/// closes the open undo group and drops stored marks.
	pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditError> {
		check_selection(&self.doc, &selection)?;
		if selection != self.selection {
			trace!(anchor = %selection.anchor, head = %selection.head, "editor.set_selection");
			self.history.close_group();
			self.stored_marks = None;
			self.selection = selection;
		}
		Ok(())
	}

	/// Commits `tr` with a remapped selection and automatic undo grouping.
	pub fn apply(&mut self, tr: Transform) -> Result<CommitResult, EditError> {
		self.commit(EditCommit::new(tr))
	}

	/// Applies an edit through the authoritative edit gate.
	///
	/// # Errors
	///
	/// Returns `EditError::StaleTransform` if the transform was built against
	/// another document than the current one, and `EditError::OutOfRange` if
	/// an explicit selection does not resolve in the resulting document.
	pub fn commit(&mut self, commit: EditCommit) -> Result<CommitResult, EditError> {
		self.commit_at(commit, Instant::now())
	}

	/// [`Self::commit`] with an explicit timestamp for undo grouping.
	pub fn commit_at(&mut self, commit: EditCommit, at: Instant) -> Result<CommitResult, EditError> {
		let EditCommit {
			tr,
			selection_after,
			undo,
			origin,
		} = commit;
		if !tr.base().ptr_eq(&self.doc) {
			warn!(?origin, steps = tr.steps().len(), "editor.commit: stale transform");
			return Err(EditError::StaleTransform);
		}
		let selection_after = match selection_after {
			Some(selection) => {
				check_selection(tr.doc(), &selection)?;
				selection
			}
			None => settle_selection(tr.doc(), self.selection.map(tr.mapping())),
		};

		if tr.is_empty() {
			self.set_selection(selection_after)?;
			return Ok(self.unchanged());
		}

		let version_before = self.version;
		let inverse = tr.invert()?;
		let selection_before = std::mem::replace(&mut self.selection, selection_after.clone());
		self.doc = tr.doc().clone();
		self.version = self.version.wrapping_add(1);
		self.stored_marks = None;

		let steps = tr.steps().len();
		let undo_group_started = self.history.record(HistoryEdit {
			redo: tr.steps().to_vec(),
			undo: inverse,
			selection_before,
			selection_after: selection_after.clone(),
			policy: undo,
			at,
		});
		debug!(
			?origin,
			steps,
			version = self.version,
			undo_group_started,
			"editor.commit"
		);

		Ok(CommitResult {
			version_before,
			version_after: self.version,
			selection_after,
			undo_group_started,
			steps,
		})
	}

	/// Marks that text typed now would receive.
	pub fn active_styles(&self) -> MarkSet {
		match &self.stored_marks {
			Some(marks) => marks.clone(),
			None => active_styles_at(&self.doc, self.selection.from()),
		}
	}

	/// Text covered by the selection, one line per textblock.
	pub fn selected_text(&self) -> String {
		selected_text(&self.doc, self.selection.from(), self.selection.to())
	}

	/// Turns an inline style on or off for the selection.
	///
	/// On a collapsed selection this only updates the stored marks. Otherwise
	/// the mark is added to or removed from the selected range as one undo
	/// group.
	pub fn set_inline_style(&mut self, mark: Mark, on: bool) -> Result<CommitResult, EditError> {
		if self.selection.is_empty() {
			let active = self.active_styles();
			let marks = if on { active.add(mark) } else { active.remove_kind(mark.kind().as_str()) };
			trace!(marks = marks.len(), "editor.stored_marks");
			self.stored_marks = Some(marks);
			return Ok(self.unchanged());
		}
		let (from, to) = (self.selection.from().clone(), self.selection.to().clone());
		let mut tr = self.tr();
		if on {
			tr.add_style(&from, &to, mark)?;
		} else {
			tr.remove_style(&from, &to, mark.kind().as_str())?;
		}
		self.commit(
			EditCommit::new(tr)
				.with_undo(UndoPolicy::Record)
				.with_origin(EditOrigin::Command("set_inline_style")),
		)
	}

	/// Replaces the selection with `text`, styled with [`Self::active_styles`].
	pub fn type_text(&mut self, text: &str) -> Result<CommitResult, EditError> {
		self.type_text_at(text, Instant::now())
	}

	/// [`Self::type_text`] with an explicit timestamp for undo grouping.
	pub fn type_text_at(&mut self, text: &str, at: Instant) -> Result<CommitResult, EditError> {
		let marks = self.active_styles();
		let mut tr = self.tr();
		let (from, to) = (self.selection.from(), self.selection.to());
		if from != to {
			tr.delete(from, to)?;
		}
		let cursor = tr.mapping().map_pos(from, Bias::Left);
		tr.insert_text(&cursor, text, marks)?;
		self.commit_at(EditCommit::new(tr), at)
	}

	/// Deletes the selected content. A collapsed selection is a no-op.
	pub fn delete_selection(&mut self) -> Result<CommitResult, EditError> {
		self.delete_selection_at(Instant::now())
	}

	/// [`Self::delete_selection`] with an explicit timestamp for undo grouping.
	pub fn delete_selection_at(&mut self, at: Instant) -> Result<CommitResult, EditError> {
		let mut tr = self.tr();
		if !self.selection.is_empty() {
			tr.delete(self.selection.from(), self.selection.to())?;
		}
		self.commit_at(EditCommit::new(tr), at)
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	/// Ends the open undo group; the next edit starts a new one.
	pub fn close_history_group(&mut self) {
		self.history.close_group();
	}

	/// Undoes the newest undo group and restores the selection from before it.
	///
	/// Returns `false` if there was nothing to undo.
	pub fn undo(&mut self) -> bool {
		let restored = self.history.undo(&self.doc);
		self.restore(restored, "undo")
	}

	/// Redoes the newest undone group and restores the selection after it.
	///
	/// Returns `false` if there was nothing to redo.
	pub fn redo(&mut self) -> bool {
		let restored = self.history.redo(&self.doc);
		self.restore(restored, "redo")
	}

	fn restore(&mut self, restored: Result<Option<Restored>, EditError>, op: &'static str) -> bool {
		match restored {
			Ok(Some(Restored { transform, selection })) => {
				self.doc = transform.doc().clone();
				self.selection = settle_selection(&self.doc, selection);
				self.stored_marks = None;
				self.version = self.version.wrapping_add(1);
				debug!(op, version = self.version, "editor.history");
				true
			}
			Ok(None) => false,
			Err(err) => {
				warn!(op, %err, "editor.history: replay failed");
				false
			}
		}
	}

	fn unchanged(&self) -> CommitResult {
		CommitResult {
			version_before: self.version,
			version_after: self.version,
			selection_after: self.selection.clone(),
			undo_group_started: false,
			steps: 0,
		}
	}
}

fn check_selection(doc: &Document, selection: &Selection) -> Result<(), EditError> {
	doc.resolve(&selection.anchor)?;
	doc.resolve(&selection.head)?;
	Ok(())
}

fn settle_selection(doc: &Document, selection: Selection) -> Selection {
	let Selection { anchor, head } = selection;
	Selection::new(settle(doc, anchor), settle(doc, head))
}

/// Moves `pos` into a textblock: the end of the nearest one before it, else
/// the start of the first one after it.
fn settle(doc: &Document, pos: Pos) -> Pos {
	if doc.resolve(&pos).is_ok_and(|resolved| resolved.node.is_textblock()) {
		return pos;
	}
	let mut before = None;
	for (path, node) in doc.textblocks() {
		let start = Pos::start_of(&path);
		if start > pos {
			return before.unwrap_or(start);
		}
		before = Some(Pos::new(path, node.content_size()));
	}
	match before {
		Some(end) => end,
		None if doc.contains(&pos) => pos,
		None => doc.start(),
	}
}
