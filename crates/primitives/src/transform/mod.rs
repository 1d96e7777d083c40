//! Transforms: ordered, invertible sequences of atomic steps.
//!
//! A [`Transform`] stages steps on a working copy of a document. Builder
//! operations validate before anything is kept: when an operation fails, the
//! steps it staged are rolled back and the transform is left as it was.
//!
//! ```
//! # use std::sync::Arc;
//! # use quire_primitives::schema::{NodeSpec, Schema};
//! # use quire_primitives::{Document, Node, Pos, Span, Transform};
//! # let schema = Schema::builder("doc")
//! # 	.node(NodeSpec::blocks("doc").accepts(["paragraph"]))
//! # 	.node(NodeSpec::textblock("paragraph"))
//! # 	.build()
//! # 	.unwrap();
//! let doc = Document::new(Arc::new(schema), Node::block("doc", [Node::textblock("paragraph", [Span::text("ab")])]));
//! let mut tr = Transform::new(doc.clone());
//! tr.insert_text(&Pos::new([0], 1), "x", Default::default()).unwrap();
//! assert_eq!(tr.doc().root().text_content(), "axb");
//!
//! let undone = Transform::replay(tr.doc(), &tr.invert().unwrap()).unwrap();
//! assert_eq!(undone.doc(), &doc);
//! ```

use std::sync::Arc;

use crate::document::Document;
use crate::edit::EditError;
use crate::kind::Markup;
use crate::mark::{Mark, MarkSet};
use crate::node::Node;
use crate::position::{Path, Pos};
use crate::span::Span;

mod map;
mod step;
mod structure;
mod style;

#[cfg(test)]
mod tests;

pub use map::{Bias, Mapping, StepMap};
pub use step::Step;
pub use structure::{LiftPlan, WrapPlan, can_lift, can_wrap, join_point, selected_siblings};
pub use style::{active_styles_at, range_has_style, selected_text};

/// An edit under construction against one document version.
#[derive(Debug, Clone)]
pub struct Transform {
	base: Document,
	doc: Document,
	steps: Vec<Step>,
	docs: Vec<Document>,
	mapping: Mapping,
}

impl Transform {
	/// Starts an empty transform on `doc`.
	pub fn new(doc: Document) -> Self {
		Self {
			base: doc.clone(),
			doc,
			steps: Vec::new(),
			docs: Vec::new(),
			mapping: Mapping::new(),
		}
	}

	/// The document the transform was started on.
	pub fn base(&self) -> &Document {
		&self.base
	}

	/// The document with every staged step applied.
	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// Position maps of the staged steps, composed in order.
	pub fn mapping(&self) -> &Mapping {
		&self.mapping
	}

	/// Returns true if no step has been staged.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Steps that restore the base document when applied to [`Self::doc`].
	pub fn invert(&self) -> Result<Vec<Step>, EditError> {
		let mut inverse = Vec::with_capacity(self.steps.len());
		for (step, before) in self.steps.iter().zip(&self.docs).rev() {
			inverse.extend(step.invert(before)?);
		}
		Ok(inverse)
	}

	/// Re-applies stored steps to `doc`.
	///
	/// Steps are validated structurally only. The first step that does not
	/// apply rejects the whole batch with `InvalidTransform`.
	pub fn replay(doc: &Document, steps: &[Step]) -> Result<Transform, EditError> {
		let mut tr = Transform::new(doc.clone());
		for (index, step) in steps.iter().enumerate() {
			tr.push_unchecked(step.clone())
				.map_err(|source| EditError::InvalidTransform {
					index,
					source: Box::new(source),
				})?;
		}
		Ok(tr)
	}

	/// Appends a raw step, validated structurally and against the schema.
	pub fn step(&mut self, step: Step) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.push_checked(step))
	}

	/// Runs `f`, rolling back every step it staged if it fails.
	fn atomic(&mut self, f: impl FnOnce(&mut Self) -> Result<(), EditError>) -> Result<&mut Self, EditError> {
		let len = self.steps.len();
		let doc = self.doc.clone();
		match f(self) {
			Ok(()) => Ok(self),
			Err(err) => {
				self.steps.truncate(len);
				self.docs.truncate(len);
				self.mapping.truncate(len);
				self.doc = doc;
				Err(err)
			}
		}
	}

	pub(crate) fn push_unchecked(&mut self, step: Step) -> Result<(), EditError> {
		let (doc, map) = step.apply(&self.doc)?;
		self.docs.push(std::mem::replace(&mut self.doc, doc));
		self.steps.push(step);
		self.mapping.push(map);
		Ok(())
	}

	/// Applies `step` and checks every container it changed against the
	/// schema.
	pub(crate) fn push_checked(&mut self, step: Step) -> Result<(), EditError> {
		let schema = Arc::clone(self.doc.schema());
		if let Step::InsertNodes { nodes, .. } = &step {
			nodes.iter().try_for_each(|node| schema.check_tree(node))?;
		}
		let touched = step.touched();
		let removes_nodes = matches!(step, Step::RemoveNodes { .. });
		let split_as = matches!(step, Step::Split { after: Some(_), .. });
		self.push_unchecked(step)?;

		for path in &touched {
			let node = self.doc.node_at(path)?;
			if removes_nodes
				&& node.content_size() == 0
				&& schema.node(node.kind()).is_some_and(|spec| spec.is_content_required())
			{
				return Err(EditError::range(format!("`{}` would be left empty", node.kind())));
			}
			schema.check_children(node)?;
		}
		if split_as && let [_, head, tail] = touched.as_slice() {
			let (head, tail) = (self.doc.node_at(head)?, self.doc.node_at(tail)?);
			if !schema.joinable(head, tail) {
				return Err(EditError::placement(format!(
					"`{}` cannot be split off `{}`",
					tail.kind(),
					head.kind()
				)));
			}
		}
		Ok(())
	}

	/// Inserts a block node at a block-level position.
	pub fn insert(&mut self, pos: &Pos, node: Node) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.insert_node(pos, node))
	}

	fn insert_node(&mut self, pos: &Pos, node: Node) -> Result<(), EditError> {
		let schema = Arc::clone(self.doc.schema());
		let container = self.doc.resolve(pos)?.node;
		if !container.is_container() {
			return Err(EditError::placement(format!(
				"{pos} is inside textblock `{}`, not between blocks",
				container.kind()
			)));
		}
		if !schema.accepts(container.kind(), node.kind()) {
			return Err(EditError::placement(format!(
				"`{}` cannot contain `{}`",
				container.kind(),
				node.kind()
			)));
		}
		self.push_checked(Step::InsertNodes {
			path: pos.path.clone(),
			at: pos.offset,
			nodes: vec![Arc::new(node)],
		})
	}

	/// Inserts an inline span into a textblock.
	pub fn insert_inline(&mut self, pos: &Pos, span: Span) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.insert_spans(pos, vec![span]))
	}

	/// Inserts text carrying `marks` into a textblock. Empty text is a no-op.
	pub fn insert_text(&mut self, pos: &Pos, text: &str, marks: MarkSet) -> Result<&mut Self, EditError> {
		if text.is_empty() {
			self.doc.resolve(pos)?;
			return Ok(self);
		}
		self.atomic(|tr| tr.insert_spans(pos, vec![Span::styled(text, marks)]))
	}

	fn insert_spans(&mut self, pos: &Pos, spans: Vec<Span>) -> Result<(), EditError> {
		let container = self.doc.resolve(pos)?.node;
		if !container.is_textblock() {
			return Err(EditError::placement(format!("{pos} is not inside a textblock")));
		}
		self.push_checked(Step::InsertInline {
			path: pos.path.clone(),
			at: pos.offset,
			spans,
		})
	}

	/// Inserts a block near `pos`.
	///
	/// Inside a textblock at a non-zero offset the textblock is split and the
	/// node goes between the halves; at offset 0 it goes before the
	/// textblock. At a block-level position this is [`Self::insert`].
	pub fn insert_block(&mut self, pos: &Pos, node: Node) -> Result<&mut Self, EditError> {
		self.atomic(|tr| {
			if !tr.doc.resolve(pos)?.node.is_textblock() {
				return tr.insert_node(pos, node);
			}
			if pos.offset == 0 {
				return tr.insert_node(&pos.shorten(None, 0), node);
			}
			tr.split_at(pos, 1, None)?;
			tr.insert_node(&pos.shorten(None, 1), node)
		})
	}

	/// Deletes the content between `from` and `to`.
	///
	/// Within one container, inline units or child blocks are removed.
	/// Across containers, the tail of the start branch, the head of the end
	/// branch and every block between are removed, then the two branches are
	/// joined level by level while they are joinable.
	pub fn delete(&mut self, from: &Pos, to: &Pos) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.delete_range(from, to))
	}

	fn delete_range(&mut self, from: &Pos, to: &Pos) -> Result<(), EditError> {
		if from > to {
			return Err(EditError::range(format!("{from} is after {to}")));
		}
		let from_node = self.doc.resolve(from)?.node;
		self.doc.resolve(to)?;
		if from == to {
			return Ok(());
		}
		if from.same_path(to) {
			let step = if from_node.is_textblock() {
				Step::RemoveInline {
					path: from.path.clone(),
					from: from.offset,
					to: to.offset,
				}
			} else {
				Step::RemoveNodes {
					path: from.path.clone(),
					from: from.offset,
					to: to.offset,
				}
			};
			return self.push_checked(step);
		}

		let depth = from.path.iter().zip(&to.path).take_while(|(a, b)| a == b).count();
		let common: Path = from.path[..depth].iter().copied().collect();
		let from_deep = from.depth() > depth;
		let to_deep = to.depth() > depth;
		let a = if from_deep { from.path[depth] } else { from.offset };
		let b = if to_deep { to.path[depth] } else { to.offset };

		if to_deep {
			self.trim_head(to, depth)?;
		}
		let middle_from = if from_deep { a + 1 } else { a };
		if middle_from < b {
			self.push_unchecked(Step::RemoveNodes {
				path: common.clone(),
				from: middle_from,
				to: b,
			})?;
		}
		if from_deep {
			self.trim_tail(from, depth)?;
		}
		if from_deep && to_deep {
			self.join_branches(from, common.clone(), a + 1, depth)?;
		}
		self.check_not_emptied(&common)
	}

	/// Removes everything before `to` inside the branch below depth `depth`.
	fn trim_head(&mut self, to: &Pos, depth: usize) -> Result<(), EditError> {
		if to.offset > 0 {
			let step = if self.doc.node_at(&to.path)?.is_textblock() {
				Step::RemoveInline {
					path: to.path.clone(),
					from: 0,
					to: to.offset,
				}
			} else {
				Step::RemoveNodes {
					path: to.path.clone(),
					from: 0,
					to: to.offset,
				}
			};
			self.push_unchecked(step)?;
		}
		for k in (depth + 1..to.depth()).rev() {
			if to.path[k] > 0 {
				self.push_unchecked(Step::RemoveNodes {
					path: to.path[..k].iter().copied().collect(),
					from: 0,
					to: to.path[k],
				})?;
			}
		}
		Ok(())
	}

	/// Removes everything after `from` inside the branch below depth `depth`.
	fn trim_tail(&mut self, from: &Pos, depth: usize) -> Result<(), EditError> {
		let inner = self.doc.node_at(&from.path)?;
		let size = inner.content_size();
		if from.offset < size {
			let step = if inner.is_textblock() {
				Step::RemoveInline {
					path: from.path.clone(),
					from: from.offset,
					to: size,
				}
			} else {
				Step::RemoveNodes {
					path: from.path.clone(),
					from: from.offset,
					to: size,
				}
			};
			self.push_unchecked(step)?;
		}
		for k in (depth + 1..from.depth()).rev() {
			let path: Path = from.path[..k].iter().copied().collect();
			let len = self.doc.node_at(&path)?.content_size();
			if from.path[k] + 1 < len {
				self.push_unchecked(Step::RemoveNodes {
					path,
					from: from.path[k] + 1,
					to: len,
				})?;
			}
		}
		Ok(())
	}

	/// Joins the trimmed start and end branches, outermost level first, until
	/// a level is not joinable.
	fn join_branches(&mut self, from: &Pos, mut path: Path, mut index: usize, depth: usize) -> Result<(), EditError> {
		let schema = Arc::clone(self.doc.schema());
		let mut level = depth;
		loop {
			let parent = self.doc.node_at(&path)?;
			let (Some(left), Some(right)) = (parent.child(index - 1), parent.child(index)) else {
				return Ok(());
			};
			if !schema.joinable(left, right) {
				return Ok(());
			}
			self.push_unchecked(Step::Join {
				path: path.clone(),
				index,
			})?;
			level += 1;
			if from.depth() <= level {
				return Ok(());
			}
			path.push(index - 1);
			index = from.path[level] + 1;
		}
	}

	/// Fails if a container below `path` that requires content is empty.
	fn check_not_emptied(&self, path: &[usize]) -> Result<(), EditError> {
		let schema = self.doc.schema();
		let mut stack = vec![self.doc.node_at(path)?];
		while let Some(node) = stack.pop() {
			if node.is_container()
				&& node.content_size() == 0
				&& schema.node(node.kind()).is_some_and(|spec| spec.is_content_required())
			{
				return Err(EditError::range(format!("`{}` would be left empty", node.kind())));
			}
			stack.extend(node.children().iter().map(Arc::as_ref));
		}
		Ok(())
	}

	/// Splits the node containing `pos`, and `depth - 1` of its ancestors.
	pub fn split(&mut self, pos: &Pos, depth: usize) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.split_at(pos, depth, None))
	}

	/// Like [`Self::split`], giving the innermost second half the type
	/// `after`. The two halves must stay joinable.
	pub fn split_as(&mut self, pos: &Pos, depth: usize, after: Markup) -> Result<&mut Self, EditError> {
		self.atomic(|tr| tr.split_at(pos, depth, Some(after)))
	}

	fn split_at(&mut self, pos: &Pos, depth: usize, after: Option<Markup>) -> Result<(), EditError> {
		if depth > pos.depth() {
			return Err(EditError::range(format!("cannot split {depth} levels at {pos}")));
		}
		self.doc.resolve(pos)?;
		if depth == 0 {
			return Ok(());
		}
		self.push_checked(Step::Split {
			path: pos.path.clone(),
			offset: pos.offset,
			after,
		})?;
		let len = pos.depth();
		for i in 1..depth {
			self.push_checked(Step::Split {
				path: pos.path[..len - i].iter().copied().collect(),
				offset: pos.path[len - i] + 1,
				after: None,
			})?;
		}
		Ok(())
	}

	/// Joins the blocks on either side of the block-level position `pos`.
	pub fn join(&mut self, pos: &Pos) -> Result<&mut Self, EditError> {
		self.atomic(|tr| {
			let incompatible = || EditError::IncompatibleJoin { pos: pos.clone() };
			let container = tr.doc.resolve(pos)?.node;
			if pos.offset == 0 {
				return Err(incompatible());
			}
			let (Some(left), Some(right)) = (container.child(pos.offset - 1), container.child(pos.offset)) else {
				return Err(incompatible());
			};
			if !tr.doc.schema().joinable(left, right) {
				return Err(incompatible());
			}
			tr.push_checked(Step::Join {
				path: pos.path.clone(),
				index: pos.offset,
			})
		})
	}

	/// Removes one level of wrapping around the sibling range selected by
	/// `[from, to]`. See [`can_lift`].
	pub fn lift(&mut self, from: &Pos, to: &Pos) -> Result<&mut Self, EditError> {
		let plan = can_lift(&self.doc, from, to).ok_or(EditError::NotLiftable)?;
		self.atomic(|tr| tr.apply_lift(&plan))
	}

	fn apply_lift(&mut self, plan: &LiftPlan) -> Result<(), EditError> {
		let Some((&k, parent)) = plan.path.split_last() else {
			return Err(EditError::NotLiftable);
		};
		let parent: Path = parent.iter().copied().collect();
		let len = self.doc.node_at(&plan.path)?.content_size();
		if plan.to < len {
			self.push_unchecked(Step::Split {
				path: plan.path.clone(),
				offset: plan.to,
				after: None,
			})?;
		}
		let mut wrapper = k;
		if plan.from > 0 {
			self.push_unchecked(Step::Split {
				path: plan.path.clone(),
				offset: plan.from,
				after: None,
			})?;
			wrapper += 1;
		}
		self.push_unchecked(Step::Unwrap {
			path: parent.iter().copied().chain([wrapper]).collect(),
		})?;
		if plan.unwrap_children {
			for j in (0..plan.to - plan.from).rev() {
				self.push_unchecked(Step::Unwrap {
					path: parent.iter().copied().chain([wrapper + j]).collect(),
				})?;
			}
		}
		Ok(())
	}

	/// Wraps the sibling range selected by `[from, to]` in `wrapper`. See
	/// [`can_wrap`].
	pub fn wrap(&mut self, from: &Pos, to: &Pos, wrapper: Markup) -> Result<&mut Self, EditError> {
		let plan = can_wrap(&self.doc, from, to, &wrapper).ok_or_else(|| EditError::NotWrappable {
			kind: wrapper.kind.to_string(),
		})?;
		self.atomic(|tr| {
			for i in plan.from..plan.to {
				for kind in plan.inner.iter().rev() {
					tr.push_unchecked(Step::Wrap {
						path: plan.path.clone(),
						from: i,
						to: i + 1,
						wrapper: Markup::new(kind.clone()),
					})?;
				}
			}
			tr.push_unchecked(Step::Wrap {
				path: plan.path.clone(),
				from: plan.from,
				to: plan.to,
				wrapper,
			})
		})
	}

	/// Adds `mark` to every inline unit in `[from, to)`. Textblocks that do
	/// not allow marks are skipped.
	pub fn add_style(&mut self, from: &Pos, to: &Pos, mark: Mark) -> Result<&mut Self, EditError> {
		self.atomic(|tr| style::add(tr, from, to, &mark))
	}

	/// Removes marks of `kind` from every inline unit in `[from, to)`.
	pub fn remove_style(&mut self, from: &Pos, to: &Pos, kind: &str) -> Result<&mut Self, EditError> {
		self.atomic(|tr| style::remove(tr, from, to, kind))
	}
}
