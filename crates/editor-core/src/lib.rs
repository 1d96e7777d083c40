//! Headless editor core: the current document, its selection, stored marks
//! and grouped undo history.

/// Editor configuration loaded from TOML.
pub mod config;
/// Editor state and the commit gate.
pub mod editor;
/// Grouped undo/redo with coalescing.
pub mod history;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, EditorConfig, HistoryConfig};
pub use editor::{EditCommit, Editor};
pub use history::{EditKind, History, HistoryEdit, Restored, UndoGroup};
pub use quire_primitives::{
	CommitResult, EditError, EditOrigin, UndoPolicy, can_lift, can_wrap, join_point, range_has_style,
};
