use thiserror::Error;

use crate::Selection;
use crate::position::Pos;

/// Errors raised while addressing or editing a document.
///
/// Structural precondition failures (`NotLiftable`, `NotWrappable`,
/// `IncompatibleJoin`) are expected outcomes: collaborators usually query the
/// matching predicate first and disable the action instead of surfacing the
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	/// A position does not resolve in the document.
	#[error("position {pos} is out of range")]
	OutOfRange { pos: Pos },

	/// A node path does not resolve in the document.
	#[error("no node at path {path:?}")]
	NotFound { path: Vec<usize> },

	/// Content is not permitted where it would be placed.
	#[error("invalid placement: {reason}")]
	InvalidPlacement { reason: String },

	/// A range is inverted, out of bounds, or would remove required structure.
	#[error("invalid range: {reason}")]
	InvalidRange { reason: String },

	/// The range has no ancestor it can be lifted out of.
	#[error("range cannot be lifted")]
	NotLiftable,

	/// The range cannot be wrapped in the requested node.
	#[error("range cannot be wrapped in `{kind}`")]
	NotWrappable { kind: String },

	/// The blocks on either side of a join point cannot be merged.
	#[error("blocks at {pos} cannot be joined")]
	IncompatibleJoin { pos: Pos },

	/// A step of a batch failed to apply; the batch was rejected as a whole.
	#[error("invalid transform: step {index} rejected")]
	InvalidTransform {
		index: usize,
		#[source]
		source: Box<EditError>,
	},

	/// The transform was built against a document that has since been replaced.
	#[error("transform was built against a superseded document")]
	StaleTransform,
}

impl EditError {
	pub(crate) fn placement(reason: impl Into<String>) -> Self {
		Self::InvalidPlacement {
			reason: reason.into(),
		}
	}

	pub(crate) fn range(reason: impl Into<String>) -> Self {
		Self::InvalidRange {
			reason: reason.into(),
		}
	}
}

/// How a commit participates in undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoPolicy {
	/// Let the history coalescing policy decide.
	#[default]
	Auto,
	/// Always start a new undo group.
	Record,
	/// Always merge into the latest undo group.
	Merge,
}

/// Where an edit came from, for tracing and grouping decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditOrigin {
	/// Direct user input (typing, deleting).
	#[default]
	Input,
	/// A command such as a menu item or key binding.
	Command(&'static str),
	/// Undo or redo replay.
	History,
}

/// Outcome of committing a transform to an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
	/// Document version before the commit.
	pub version_before: u64,
	/// Document version after the commit.
	pub version_after: u64,
	/// Selection after remapping (or the explicit selection supplied).
	pub selection_after: Selection,
	/// Whether a new undo group was started.
	pub undo_group_started: bool,
	/// Number of steps the transform contained.
	pub steps: usize,
}
