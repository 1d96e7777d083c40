//! A document: a root node bound to the schema it conforms to.

use std::sync::Arc;

use crate::edit::EditError;
use crate::node::{Content, Node};
use crate::position::{Path, Pos};
use crate::schema::Schema;


/// An immutable document version.
///
/// Cloning is cheap: the tree and schema are shared.
#[derive(Debug, Clone)]
pub struct Document {
	root: Arc<Node>,
	schema: Arc<Schema>,
}

/// A position resolved against a document.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
	/// The container node the position points into.
	pub node: &'a Node,
	/// Ancestors of `node`, root first.
	pub ancestors: Vec<&'a Node>,
}

impl Resolved<'_> {
	/// The container's parent, if it is not the root.
	pub fn parent(&self) -> Option<&Node> {
		self.ancestors.last().copied()
	}
}

/// A textblock together with the part of it a range covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextblockRange {
	pub path: Path,
	pub from: usize,
	pub to: usize,
}

impl Document {
	/// Creates a document. The tree is not checked against the schema; use
	/// [`Document::checked`] for that.
	pub fn new(schema: Arc<Schema>, root: Node) -> Self {
		Self {
			root: Arc::new(root),
			schema,
		}
	}

	/// Creates a document after checking every node against the schema.
	pub fn checked(schema: Arc<Schema>, root: Node) -> Result<Self, EditError> {
		if root.kind() != schema.root() {
			return Err(EditError::placement(format!(
				"document root must be `{}`, found `{}`",
				schema.root(),
				root.kind()
			)));
		}
		schema.check_tree(&root)?;
		Ok(Self::new(schema, root))
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	/// Returns a document with the same schema and a new root.
	pub(crate) fn with_root(&self, root: Node) -> Self {
		Self {
			root: Arc::new(root),
			schema: Arc::clone(&self.schema),
		}
	}

	/// Returns true if both values are the same document version.
	pub fn ptr_eq(&self, other: &Document) -> bool {
		Arc::ptr_eq(&self.root, &other.root)
	}

	/// Returns the node at `path`.
	pub fn node_at(&self, path: &[usize]) -> Result<&Node, EditError> {
		self.root
			.descend(path)
			.ok_or_else(|| EditError::NotFound { path: path.to_vec() })
	}

	/// Resolves `pos` to its container and ancestor chain.
	///
	/// Fails with `OutOfRange` if the path does not name a block container or
	/// textblock, or if the offset exceeds the container's size.
	pub fn resolve(&self, pos: &Pos) -> Result<Resolved<'_>, EditError> {
		let out_of_range = || EditError::OutOfRange { pos: pos.clone() };
		let mut ancestors = Vec::with_capacity(pos.depth());
		let mut node: &Node = &self.root;
		for &idx in &pos.path {
			let child = node.child(idx).ok_or_else(out_of_range)?;
			ancestors.push(node);
			node = child;
		}
		if matches!(node.content(), Content::Empty) || pos.offset > node.content_size() {
			return Err(out_of_range());
		}
		Ok(Resolved { node, ancestors })
	}

	/// Returns true if `pos` resolves in this document.
	pub fn contains(&self, pos: &Pos) -> bool {
		self.resolve(pos).is_ok()
	}

	/// First inline position, or the start of the root when there is no
	/// textblock.
	pub fn start(&self) -> Pos {
		self.textblocks()
			.next()
			.map_or_else(|| Pos::root(0), |(path, _)| Pos::start_of(&path))
	}

	/// Last inline position, or the end of the root when there is no
	/// textblock.
	pub fn end(&self) -> Pos {
		self.textblocks().last().map_or_else(
			|| Pos::root(self.root.content_size()),
			|(path, node)| Pos::new(path, node.content_size()),
		)
	}

	/// Depth-first pre-order walk over every node below the root, with paths.
	pub fn descendants(&self) -> Descendants<'_> {
		let mut stack: Vec<(Path, &Node)> = self
			.root
			.children()
			.iter()
			.enumerate()
			.map(|(i, child)| (Path::from_slice(&[i]), child.as_ref()))
			.collect();
		stack.reverse();
		Descendants { stack }
	}

	/// Every textblock in document order.
	pub fn textblocks(&self) -> impl Iterator<Item = (Path, &Node)> {
		self.descendants().filter(|(_, node)| node.is_textblock())
	}

	/// The textblocks that `[from, to]` touches and the unit range it covers
	/// in each.
	pub fn textblocks_between(&self, from: &Pos, to: &Pos) -> Vec<TextblockRange> {
		self.textblocks()
			.filter_map(|(path, node)| {
				let size = node.content_size();
				let start = Pos::start_of(&path);
				let end = Pos::new(path.iter().copied(), size);
				if end < *from || start > *to {
					return None;
				}
				let seg_from = if from.path == path { from.offset.min(size) } else { 0 };
				let seg_to = if to.path == path { to.offset.min(size) } else { size };
				Some(TextblockRange {
					path,
					from: seg_from,
					to: seg_to,
				})
			})
			.collect()
	}
}

impl PartialEq for Document {
	/// Structural equality of the trees; the schema is compared by identity.
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.schema, &other.schema) && self.root == other.root
	}
}

impl Pos {
	/// The position at the end of the container at `path` in `doc`.
	pub fn end_in(doc: &Document, path: &[usize]) -> Result<Pos, EditError> {
		let node = doc.node_at(path)?;
		Ok(Pos::new(path.iter().copied(), node.content_size()))
	}
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
	stack: Vec<(Path, &'a Node)>,
}

impl<'a> Iterator for Descendants<'a> {
	type Item = (Path, &'a Node);

	fn next(&mut self) -> Option<Self::Item> {
		let (path, node) = self.stack.pop()?;
		for (i, child) in node.children().iter().enumerate().rev() {
			let mut child_path = path.clone();
			child_path.push(i);
			self.stack.push((child_path, child.as_ref()));
		}
		Some((path, node))
	}
}
