//! Core types for rich-text editing: positions, document trees, marks,
//! schemas, transforms and selections.

/// A root node bound to its schema.
pub mod document;
/// Edit operation types: errors, policies, and results.
pub mod edit;
/// Node and mark type tags, attributes and markup.
pub mod kind;
/// Inline formatting marks and mark sets.
pub mod mark;
/// Immutable tree nodes.
pub mod node;
/// Path + offset addressing.
pub mod position;
/// Node and mark metadata supplied by the embedding application.
pub mod schema;
/// Selection anchored in the document tree.
pub mod selection;
/// Inline content runs.
pub mod span;
/// Atomic steps, position maps and transform builders.
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{Document, Resolved, TextblockRange};
pub use edit::{CommitResult, EditError, EditOrigin, UndoPolicy};
pub use kind::{Attrs, MarkKind, Markup, NodeKind};
pub use mark::{Mark, MarkSet};
pub use node::{Content, Node};
pub use position::{Path, Pos};
pub use schema::{Schema, SchemaError};
pub use selection::{Direction, Selection};
pub use span::Span;
pub use transform::{
	Bias, LiftPlan, Mapping, Step, StepMap, Transform, WrapPlan, active_styles_at, can_lift, can_wrap, join_point,
	range_has_style, selected_text,
};
