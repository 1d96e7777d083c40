//! Structural predicates: which sibling ranges can be lifted, wrapped or
//! joined.

use crate::document::Document;
use crate::kind::{Markup, NodeKind};
use crate::position::{Path, Pos};
use crate::schema::ContentKind;

/// How [`Transform::lift`](super::Transform::lift) will lift a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftPlan {
	/// The wrapper the range is lifted out of.
	pub path: Path,
	/// First child of the range.
	pub from: usize,
	/// End (exclusive) of the range.
	pub to: usize,
	/// Whether the range's nodes are unwrapped too, because the wrapper's
	/// parent only accepts their children.
	pub unwrap_children: bool,
}

/// How [`Transform::wrap`](super::Transform::wrap) will wrap a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapPlan {
	/// The container holding the range.
	pub path: Path,
	pub from: usize,
	pub to: usize,
	/// Node kinds placed around each selected node inside the wrapper,
	/// outermost first.
	pub inner: Vec<NodeKind>,
}

/// Finds the sibling range of blocks that `[from, to]` covers.
///
/// Returns the container path and the child range `[a, b)`. When both
/// positions sit in the same textblock the range is that textblock.
pub fn selected_siblings(doc: &Document, from: &Pos, to: &Pos) -> Option<(Path, usize, usize)> {
	doc.resolve(from).ok()?;
	doc.resolve(to).ok()?;
	if from > to {
		return None;
	}
	let mut node = doc.root();
	let mut depth = 0;
	loop {
		if node.is_textblock() {
			let (&last, parent) = from.path[..depth].split_last()?;
			return Some((parent.iter().copied().collect(), last, last + 1));
		}
		let from_here = depth == from.depth();
		let to_here = depth == to.depth();
		let left = if from_here { from.offset } else { from.path[depth] };
		let right = if to_here { to.offset } else { to.path[depth] };
		if from_here || to_here || left != right {
			let end = if to_here { right } else { right + 1 };
			if left >= end {
				return None;
			}
			return Some((from.path[..depth].iter().copied().collect(), left, end));
		}
		node = node.child(left)?;
		depth += 1;
	}
}

/// Returns how the range `[from, to]` can be lifted out of its wrapper, or
/// `None` if it cannot.
///
/// The range is liftable when the wrapper's parent accepts the range's
/// nodes, or accepts their children (the nodes are then unwrapped as well).
/// When neither holds, the range's container itself is tried as the range,
/// which lifts a list item's content out of its list.
pub fn can_lift(doc: &Document, from: &Pos, to: &Pos) -> Option<LiftPlan> {
	let (path, a, b) = selected_siblings(doc, from, to)?;
	lift_level(doc, &path, a, b).or_else(|| {
		let (&k, parent) = path.split_last()?;
		lift_level(doc, parent, k, k + 1)
	})
}

fn lift_level(doc: &Document, path: &[usize], from: usize, to: usize) -> Option<LiftPlan> {
	let (_, grand_path) = path.split_last()?;
	let schema = doc.schema();
	let wrapper = doc.node_at(path).ok()?;
	let grand = doc.node_at(grand_path).ok()?;
	let range = wrapper.children().get(from..to)?;
	let plan = |unwrap_children| LiftPlan {
		path: path.iter().copied().collect(),
		from,
		to,
		unwrap_children,
	};
	if range.iter().all(|node| schema.accepts(grand.kind(), node.kind())) {
		return Some(plan(false));
	}
	let unwrappable = range.iter().all(|node| {
		node.is_container()
			&& node.content_size() > 0
			&& node.children().iter().all(|child| schema.accepts(grand.kind(), child.kind()))
	});
	unwrappable.then(|| plan(true))
}

/// Returns how the range `[from, to]` can be wrapped in `wrapper`, or `None`
/// if it cannot.
///
/// The range's container must accept the wrapper, and every selected node
/// must fit inside it through the same chain of intermediate nodes.
pub fn can_wrap(doc: &Document, from: &Pos, to: &Pos, wrapper: &Markup) -> Option<WrapPlan> {
	let (path, a, b) = selected_siblings(doc, from, to)?;
	let schema = doc.schema();
	if schema.node(&wrapper.kind)?.content() != ContentKind::Blocks {
		return None;
	}
	let container = doc.node_at(&path).ok()?;
	if !schema.accepts(container.kind(), &wrapper.kind) {
		return None;
	}
	let mut inner: Option<Vec<NodeKind>> = None;
	for node in container.children().get(a..b)? {
		let chain = schema.find_wrapping(&wrapper.kind, node.kind())?;
		match &inner {
			Some(existing) if *existing != chain => return None,
			_ => inner = Some(chain),
		}
	}
	Some(WrapPlan {
		path,
		from: a,
		to: b,
		inner: inner?,
	})
}

/// Finds the deepest boundary between an ancestor of `pos` and the block
/// above it where both sides are joinable.
///
/// Returns the block-level position between the two blocks, suitable for
/// [`Transform::join`](super::Transform::join).
pub fn join_point(doc: &Document, pos: &Pos) -> Option<Pos> {
	doc.resolve(pos).ok()?;
	let schema = doc.schema();
	(0..pos.depth()).rev().find_map(|k| {
		let index = pos.path[k];
		if index == 0 {
			return None;
		}
		let parent = doc.node_at(&pos.path[..k]).ok()?;
		let above = parent.child(index - 1)?;
		let node = parent.child(index)?;
		schema
			.joinable(above, node)
			.then(|| Pos::new(pos.path[..k].iter().copied(), index))
	})
}
