//! Schema registry: which nodes may contain which, and which marks exist.
//!
//! A [`Schema`] is supplied by the embedding application; the core carries no
//! built-in document model. Node specs name the child kinds they accept either
//! directly or through groups:
//!
//! ```
//! use quire_primitives::schema::{MarkSpec, NodeSpec, Schema};
//!
//! let schema = Schema::builder("doc")
//! 	.node(NodeSpec::blocks("doc").accepts(["block"]).requires_content())
//! 	.node(NodeSpec::textblock("paragraph").group("block"))
//! 	.node(NodeSpec::inline_leaf("image"))
//! 	.mark(MarkSpec::new("strong"))
//! 	.build()
//! 	.unwrap();
//! assert!(schema.accepts(&"doc".into(), &"paragraph".into()));
//! ```

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::edit::EditError;
use crate::kind::{MarkKind, NodeKind};
use crate::node::{Content, Node};
use crate::span::Span;


/// What a node kind holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
	/// Block children.
	Blocks,
	/// Inline content (a textblock).
	Inline,
	/// Nothing; a leaf block.
	Empty,
	/// An inline leaf span such as an image.
	InlineLeaf,
}

/// Metadata for one node kind.
#[derive(Debug, Clone)]
pub struct NodeSpec {
	name: NodeKind,
	content: ContentKind,
	accepts: Vec<String>,
	groups: Vec<String>,
	marks: bool,
	requires_content: bool,
}

impl NodeSpec {
	fn new(name: &str, content: ContentKind) -> Self {
		Self {
			name: NodeKind::new(name),
			content,
			accepts: Vec::new(),
			groups: Vec::new(),
			marks: true,
			requires_content: false,
		}
	}

	/// A block container.
	pub fn blocks(name: &str) -> Self {
		Self::new(name, ContentKind::Blocks)
	}

	/// A textblock. Accepts inline leaves of the `inline` group by default.
	pub fn textblock(name: &str) -> Self {
		Self::new(name, ContentKind::Inline).accepts(["inline"])
	}

	/// A leaf block.
	pub fn leaf(name: &str) -> Self {
		Self::new(name, ContentKind::Empty)
	}

	/// An inline leaf. Joins the `inline` group by default.
	pub fn inline_leaf(name: &str) -> Self {
		Self::new(name, ContentKind::InlineLeaf).group("inline")
	}

	/// Replaces the accepted child kinds or group names.
	pub fn accepts<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.accepts = names.into_iter().map(Into::into).collect();
		self
	}

	/// Adds this kind to a group.
	pub fn group(mut self, group: &str) -> Self {
		self.groups.push(group.to_string());
		self
	}

	/// Disallows marks inside this textblock.
	pub fn no_marks(mut self) -> Self {
		self.marks = false;
		self
	}

	/// Requires at least one child.
	pub fn requires_content(mut self) -> Self {
		self.requires_content = true;
		self
	}

	pub fn name(&self) -> &NodeKind {
		&self.name
	}

	pub fn content(&self) -> ContentKind {
		self.content
	}

	pub fn allows_marks(&self) -> bool {
		self.marks
	}

	pub fn is_content_required(&self) -> bool {
		self.requires_content
	}

	fn in_group(&self, name: &str) -> bool {
		self.name == *name || self.groups.iter().any(|g| g == name)
	}
}

/// Metadata for one mark kind.
#[derive(Debug, Clone)]
pub struct MarkSpec {
	name: MarkKind,
	inclusive: bool,
}

impl MarkSpec {
	pub fn new(name: &str) -> Self {
		Self {
			name: MarkKind::new(name),
			inclusive: true,
		}
	}

	/// Text typed at the end of the mark's run does not receive the mark.
	pub fn non_inclusive(mut self) -> Self {
		self.inclusive = false;
		self
	}

	pub fn name(&self) -> &MarkKind {
		&self.name
	}

	pub fn is_inclusive(&self) -> bool {
		self.inclusive
	}
}

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	/// The root kind is not declared.
	#[error("root node kind `{0}` is not declared")]
	UnknownRoot(String),

	/// The root kind does not hold block children.
	#[error("root node kind `{0}` must hold block children")]
	RootNotBlocks(String),

	/// A node kind was declared twice.
	#[error("node kind `{0}` declared twice")]
	DuplicateNode(String),

	/// A mark kind was declared twice.
	#[error("mark kind `{0}` declared twice")]
	DuplicateMark(String),

	/// An accepted name is neither a node kind nor a group.
	#[error("node kind `{node}` accepts unknown kind or group `{name}`")]
	UnknownReference { node: String, name: String },
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
	root: String,
	nodes: Vec<NodeSpec>,
	marks: Vec<MarkSpec>,
}

impl SchemaBuilder {
	pub fn node(mut self, spec: NodeSpec) -> Self {
		self.nodes.push(spec);
		self
	}

	pub fn mark(mut self, spec: MarkSpec) -> Self {
		self.marks.push(spec);
		self
	}

	/// Validates references and builds the schema.
	pub fn build(self) -> Result<Schema, SchemaError> {
		let mut nodes = FxHashMap::default();
		let mut order = Vec::with_capacity(self.nodes.len());
		for spec in self.nodes {
			if nodes.contains_key(&spec.name) {
				return Err(SchemaError::DuplicateNode(spec.name.to_string()));
			}
			order.push(spec.name.clone());
			nodes.insert(spec.name.clone(), spec);
		}

		for spec in nodes.values() {
			for name in &spec.accepts {
				if !nodes.values().any(|s| s.in_group(name)) && !(name == "inline" && spec.content == ContentKind::Inline) {
					return Err(SchemaError::UnknownReference {
						node: spec.name.to_string(),
						name: name.clone(),
					});
				}
			}
		}

		let root = NodeKind::new(&self.root);
		match nodes.get(&root) {
			None => return Err(SchemaError::UnknownRoot(self.root)),
			Some(spec) if spec.content != ContentKind::Blocks => return Err(SchemaError::RootNotBlocks(self.root)),
			Some(_) => {}
		}

		let mut marks = FxHashMap::default();
		for spec in self.marks {
			if marks.contains_key(&spec.name) {
				return Err(SchemaError::DuplicateMark(spec.name.to_string()));
			}
			marks.insert(spec.name.clone(), spec);
		}

		Ok(Schema {
			root,
			nodes,
			order,
			marks,
		})
	}
}

/// Node and mark metadata consulted by structural predicates.
#[derive(Debug)]
pub struct Schema {
	root: NodeKind,
	nodes: FxHashMap<NodeKind, NodeSpec>,
	order: Vec<NodeKind>,
	marks: FxHashMap<MarkKind, MarkSpec>,
}

impl Schema {
	/// Starts a schema whose documents have a `root` node.
	pub fn builder(root: &str) -> SchemaBuilder {
		SchemaBuilder {
			root: root.to_string(),
			nodes: Vec::new(),
			marks: Vec::new(),
		}
	}

	pub fn root(&self) -> &NodeKind {
		&self.root
	}

	pub fn node(&self, kind: &NodeKind) -> Option<&NodeSpec> {
		self.nodes.get(kind)
	}

	pub fn mark(&self, kind: &MarkKind) -> Option<&MarkSpec> {
		self.marks.get(kind)
	}

	/// Whether the mark extends to text typed at its end. Unknown marks are
	/// treated as inclusive.
	pub fn is_inclusive(&self, kind: &MarkKind) -> bool {
		self.mark(kind).is_none_or(MarkSpec::is_inclusive)
	}

	/// Whether textblocks of `kind` may carry marks.
	pub fn allows_marks(&self, kind: &NodeKind) -> bool {
		self.node(kind).is_some_and(|s| s.content == ContentKind::Inline && s.marks)
	}

	/// Whether a `parent` node may directly hold a `child` node.
	pub fn accepts(&self, parent: &NodeKind, child: &NodeKind) -> bool {
		let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) else {
			return false;
		};
		let shape_ok = match parent.content {
			ContentKind::Blocks => matches!(child.content, ContentKind::Blocks | ContentKind::Inline | ContentKind::Empty),
			ContentKind::Inline => child.content == ContentKind::InlineLeaf,
			ContentKind::Empty | ContentKind::InlineLeaf => false,
		};
		shape_ok && parent.accepts.iter().any(|name| child.in_group(name))
	}

	/// Checks the direct content of `node` against its spec.
	pub fn check_children(&self, node: &Node) -> Result<(), EditError> {
		let Some(spec) = self.node(node.kind()) else {
			return Err(EditError::placement(format!("unknown node kind `{}`", node.kind())));
		};
		match (spec.content, node.content()) {
			(ContentKind::Blocks, Content::Blocks(children)) => {
				if let Some(child) = children.iter().find(|c| !self.accepts(node.kind(), c.kind())) {
					return Err(EditError::placement(format!("`{}` cannot contain `{}`", node.kind(), child.kind())));
				}
			}
			(ContentKind::Inline, Content::Inline(spans)) => self.check_spans(spec, spans)?,
			(ContentKind::Empty, Content::Empty) => {}
			_ => {
				return Err(EditError::placement(format!(
					"`{}` has content of the wrong shape",
					node.kind()
				)));
			}
		}
		if spec.requires_content && node.content_size() == 0 {
			return Err(EditError::placement(format!("`{}` cannot be empty", node.kind())));
		}
		Ok(())
	}

	fn check_spans(&self, spec: &NodeSpec, spans: &[Span]) -> Result<(), EditError> {
		for span in spans {
			if let Span::Leaf { kind, .. } = span
				&& !self.accepts(&spec.name, kind)
			{
				return Err(EditError::placement(format!("`{}` cannot contain `{kind}`", spec.name)));
			}
			for mark in span.marks() {
				if !spec.marks {
					return Err(EditError::placement(format!("`{}` does not allow marks", spec.name)));
				}
				if self.mark(mark.kind()).is_none() {
					return Err(EditError::placement(format!("unknown mark kind `{}`", mark.kind())));
				}
			}
		}
		Ok(())
	}

	/// Checks `node` and every descendant.
	pub fn check_tree(&self, node: &Node) -> Result<(), EditError> {
		self.check_children(node)?;
		node.children().iter().try_for_each(|child| self.check_tree(child))
	}

	/// Finds the node kinds that must be placed between `outer` and `inner`
	/// for `outer` to hold `inner`, outermost first.
	///
	/// Returns an empty chain when `outer` accepts `inner` directly and `None`
	/// when no chain of up to two intermediate block containers exists.
	pub fn find_wrapping(&self, outer: &NodeKind, inner: &NodeKind) -> Option<Vec<NodeKind>> {
		if self.accepts(outer, inner) {
			return Some(Vec::new());
		}
		let containers: Vec<&NodeKind> = self
			.order
			.iter()
			.filter(|k| **k != self.root && self.nodes.get(*k).is_some_and(|s| s.content == ContentKind::Blocks))
			.collect();
		for first in &containers {
			if self.accepts(outer, first) && self.accepts(first, inner) {
				return Some(vec![(*first).clone()]);
			}
		}
		for first in &containers {
			if !self.accepts(outer, first) {
				continue;
			}
			for second in &containers {
				if self.accepts(first, second) && self.accepts(second, inner) {
					return Some(vec![(*first).clone(), (*second).clone()]);
				}
			}
		}
		None
	}

	/// Whether `b` can be merged into `a` (a join keeps `a`'s type).
	pub fn joinable(&self, a: &Node, b: &Node) -> bool {
		match (a.content(), b.content()) {
			(Content::Blocks(_), Content::Blocks(children)) => children.iter().all(|c| self.accepts(a.kind(), c.kind())),
			(Content::Inline(_), Content::Inline(spans)) => self
				.node(a.kind())
				.is_some_and(|spec| self.check_spans(spec, spans).is_ok()),
			_ => false,
		}
	}
}
