//! Immutable document nodes.

use std::sync::Arc;

use serde::Serialize;

use crate::edit::EditError;
use crate::kind::{Attrs, Markup, NodeKind};
use crate::span::{self, Span};


/// Content held by a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
	/// Block children, shared between document versions.
	Blocks(Vec<Arc<Node>>),
	/// Inline spans in canonical form.
	Inline(Vec<Span>),
	/// No content (e.g. a horizontal rule).
	Empty,
}

/// A node of the document tree.
///
/// Nodes are never mutated in place. Edits produce a new root that shares
/// every untouched subtree with the previous version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
	kind: NodeKind,
	#[serde(skip_serializing_if = "Attrs::is_empty")]
	attrs: Attrs,
	content: Content,
}

impl Node {
	/// Creates a block container.
	pub fn block(kind: impl Into<NodeKind>, children: impl IntoIterator<Item = Node>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
			content: Content::Blocks(children.into_iter().map(Arc::new).collect()),
		}
	}

	/// Creates a textblock with inline content.
	pub fn textblock(kind: impl Into<NodeKind>, spans: impl IntoIterator<Item = Span>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
			content: Content::Inline(span::normalize(spans.into_iter().collect())),
		}
	}

	/// Creates a leaf block without content.
	pub fn leaf(kind: impl Into<NodeKind>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
			content: Content::Empty,
		}
	}

	/// Creates a node from markup and content.
	pub fn from_markup(markup: Markup, content: Content) -> Self {
		let content = match content {
			Content::Inline(spans) => Content::Inline(span::normalize(spans)),
			other => other,
		};
		Self {
			kind: markup.kind,
			attrs: markup.attrs,
			content,
		}
	}

	/// Returns the node with its attributes replaced.
	pub fn with_attrs(mut self, attrs: Attrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	pub fn content(&self) -> &Content {
		&self.content
	}

	/// The node's type and attributes without its content.
	pub fn markup(&self) -> Markup {
		Markup::with_attrs(self.kind.clone(), self.attrs.clone())
	}

	/// Returns true if this node holds inline content.
	#[inline]
	pub fn is_textblock(&self) -> bool {
		matches!(self.content, Content::Inline(_))
	}

	/// Returns true if this node holds block children.
	#[inline]
	pub fn is_container(&self) -> bool {
		matches!(self.content, Content::Blocks(_))
	}

	/// Number of children for block containers, number of units for
	/// textblocks, 0 for leaves.
	pub fn content_size(&self) -> usize {
		match &self.content {
			Content::Blocks(children) => children.len(),
			Content::Inline(spans) => span::width(spans),
			Content::Empty => 0,
		}
	}

	/// Block children in order; empty for textblocks and leaves.
	pub fn children(&self) -> &[Arc<Node>] {
		match &self.content {
			Content::Blocks(children) => children,
			_ => &[],
		}
	}

	pub fn child(&self, index: usize) -> Option<&Node> {
		self.children().get(index).map(Arc::as_ref)
	}

	/// Inline spans; empty for block containers and leaves.
	pub fn spans(&self) -> &[Span] {
		match &self.content {
			Content::Inline(spans) => spans,
			_ => &[],
		}
	}

	/// Concatenated text of all descendants.
	pub fn text_content(&self) -> String {
		match &self.content {
			Content::Blocks(children) => children.iter().map(|c| c.text_content()).collect(),
			Content::Inline(spans) => spans.iter().filter_map(Span::as_text).collect(),
			Content::Empty => String::new(),
		}
	}

	/// Returns the node at `path` relative to this node.
	pub fn descend(&self, path: &[usize]) -> Option<&Node> {
		path.iter().try_fold(self, |node, &idx| node.child(idx))
	}

	/// Rebuilds the spine down to `path`, replacing the node there with the
	/// result of `f`. Siblings along the way are shared, not copied.
	pub(crate) fn update_at(
		&self,
		path: &[usize],
		f: impl FnOnce(&Node) -> Result<Node, EditError>,
	) -> Result<Node, EditError> {
		self.update_from(path, 0, f)
	}

	fn update_from(
		&self,
		path: &[usize],
		depth: usize,
		f: impl FnOnce(&Node) -> Result<Node, EditError>,
	) -> Result<Node, EditError> {
		let Some(&idx) = path.get(depth) else {
			return f(self);
		};
		let Some(child) = self.children().get(idx) else {
			return Err(EditError::NotFound { path: path.to_vec() });
		};
		let updated = child.update_from(path, depth + 1, f)?;
		let mut children = self.children().to_vec();
		children[idx] = Arc::new(updated);
		Ok(Node {
			kind: self.kind.clone(),
			attrs: self.attrs.clone(),
			content: Content::Blocks(children),
		})
	}
}
