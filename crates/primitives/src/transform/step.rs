use std::sync::Arc;

use serde::Serialize;

use super::map::StepMap;
use crate::document::Document;
use crate::edit::EditError;
use crate::kind::{MarkKind, Markup};
use crate::mark::Mark;
use crate::node::{Content, Node};
use crate::position::{Path, Pos};
use crate::span::{self, Span};

/// An atomic, invertible edit.
///
/// Paths name the container each step operates in. Every step can be
/// inverted against the document it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Step {
	/// Insert block nodes at child index `at` of the container at `path`.
	InsertNodes { path: Path, at: usize, nodes: Vec<Arc<Node>> },
	/// Remove children `[from, to)` of the container at `path`.
	RemoveNodes { path: Path, from: usize, to: usize },
	/// Insert inline content at unit offset `at` of the textblock at `path`.
	InsertInline { path: Path, at: usize, spans: Vec<Span> },
	/// Remove units `[from, to)` of the textblock at `path`.
	RemoveInline { path: Path, from: usize, to: usize },
	/// Split the node at `path` at `offset`. The second half takes `after`
	/// as its type, or the original type when `None`.
	Split {
		path: Path,
		offset: usize,
		after: Option<Markup>,
	},
	/// Merge child `index` of `path` into child `index - 1`.
	Join { path: Path, index: usize },
	/// Move children `[from, to)` of `path` into a new `wrapper` node.
	Wrap {
		path: Path,
		from: usize,
		to: usize,
		wrapper: Markup,
	},
	/// Replace the node at `path` with its children.
	Unwrap { path: Path },
	/// Add `mark` to units `[from, to)` of the textblock at `path`.
	AddMark { path: Path, from: usize, to: usize, mark: Mark },
	/// Remove marks of `kind` from units `[from, to)` of the textblock at `path`.
	RemoveMark {
		path: Path,
		from: usize,
		to: usize,
		kind: MarkKind,
	},
}

fn blocks_of(node: &Node) -> Result<&[Arc<Node>], EditError> {
	match node.content() {
		Content::Blocks(children) => Ok(children),
		_ => Err(EditError::placement(format!("`{}` does not hold blocks", node.kind()))),
	}
}

fn spans_of(node: &Node) -> Result<&[Span], EditError> {
	match node.content() {
		Content::Inline(spans) => Ok(spans),
		_ => Err(EditError::placement(format!("`{}` is not a textblock", node.kind()))),
	}
}

fn check_bounds(path: &Path, from: usize, to: usize, size: usize) -> Result<(), EditError> {
	if from > to {
		return Err(EditError::range(format!("inverted range {from}..{to}")));
	}
	if to > size {
		return Err(EditError::OutOfRange {
			pos: Pos::new(path.iter().copied(), to),
		});
	}
	Ok(())
}

fn with_blocks(node: &Node, children: Vec<Arc<Node>>) -> Node {
	Node::from_markup(node.markup(), Content::Blocks(children))
}

fn with_spans(node: &Node, spans: Vec<Span>) -> Node {
	Node::from_markup(node.markup(), Content::Inline(spans))
}

fn split_parent(path: &Path, what: &str) -> Result<(usize, Path), EditError> {
	match path.split_last() {
		Some((&k, parent)) => Ok((k, parent.iter().copied().collect())),
		None => Err(EditError::range(format!("cannot {what} the root node"))),
	}
}

/// Replaces child `k` of `node` with `replacement`.
fn splice_child(node: &Node, k: usize, replacement: impl IntoIterator<Item = Arc<Node>>) -> Result<Node, EditError> {
	let mut children = blocks_of(node)?.to_vec();
	if k >= children.len() {
		return Err(EditError::NotFound { path: vec![k] });
	}
	children.splice(k..=k, replacement);
	Ok(with_blocks(node, children))
}

impl Step {
	/// Applies the step, returning the new document and the step's position
	/// map.
	///
	/// Only structural shape is validated here; schema rules are checked by
	/// [`Transform`](super::Transform).
	pub fn apply(&self, doc: &Document) -> Result<(Document, StepMap), EditError> {
		let root = doc.root();
		let (root, map) = match self {
			Step::InsertNodes { path, at, nodes } => {
				let root = root.update_at(path, |node| {
					let mut children = blocks_of(node)?.to_vec();
					check_bounds(path, *at, *at, children.len())?;
					children.splice(*at..*at, nodes.iter().cloned());
					Ok(with_blocks(node, children))
				})?;
				let map = StepMap::Insert {
					path: path.clone(),
					at: *at,
					len: nodes.len(),
				};
				(root, map)
			}
			Step::RemoveNodes { path, from, to } => {
				let root = root.update_at(path, |node| {
					let mut children = blocks_of(node)?.to_vec();
					check_bounds(path, *from, *to, children.len())?;
					children.drain(*from..*to);
					Ok(with_blocks(node, children))
				})?;
				let map = StepMap::Remove {
					path: path.clone(),
					from: *from,
					to: *to,
				};
				(root, map)
			}
			Step::InsertInline { path, at, spans } => {
				let root = root.update_at(path, |node| {
					let existing = spans_of(node)?;
					check_bounds(path, *at, *at, span::width(existing))?;
					Ok(with_spans(node, span::insert(existing, *at, spans)))
				})?;
				let map = StepMap::Insert {
					path: path.clone(),
					at: *at,
					len: span::width(spans),
				};
				(root, map)
			}
			Step::RemoveInline { path, from, to } => {
				let root = root.update_at(path, |node| {
					let existing = spans_of(node)?;
					check_bounds(path, *from, *to, span::width(existing))?;
					Ok(with_spans(node, span::remove(existing, *from, *to)))
				})?;
				let map = StepMap::Remove {
					path: path.clone(),
					from: *from,
					to: *to,
				};
				(root, map)
			}
			Step::Split { path, offset, after } => {
				let (k, parent) = split_parent(path, "split")?;
				let target = doc.node_at(path)?;
				check_bounds(path, *offset, *offset, target.content_size())?;
				let second = after.clone().unwrap_or_else(|| target.markup());
				let (head, tail) = match target.content() {
					Content::Blocks(children) => (
						with_blocks(target, children[..*offset].to_vec()),
						Node::from_markup(second, Content::Blocks(children[*offset..].to_vec())),
					),
					Content::Inline(spans) => {
						let (before, rest) = span::split_at(spans, *offset);
						(
							with_spans(target, before),
							Node::from_markup(second, Content::Inline(rest)),
						)
					}
					Content::Empty => {
						return Err(EditError::placement(format!("cannot split leaf `{}`", target.kind())));
					}
				};
				let root = root.update_at(&parent, |node| {
					splice_child(node, k, [Arc::new(head), Arc::new(tail)])
				})?;
				let map = StepMap::Split {
					path: path.clone(),
					offset: *offset,
				};
				(root, map)
			}
			Step::Join { path, index } => {
				let mut seam = 0;
				let root = root.update_at(path, |node| {
					let mut children = blocks_of(node)?.to_vec();
					if *index == 0 || *index >= children.len() {
						return Err(EditError::range(format!("no blocks on both sides of join index {index}")));
					}
					let (a, b) = (&children[*index - 1], &children[*index]);
					seam = a.content_size();
					let merged = match (a.content(), b.content()) {
						(Content::Blocks(left), Content::Blocks(right)) => {
							with_blocks(a, left.iter().chain(right).cloned().collect())
						}
						(Content::Inline(left), Content::Inline(right)) => {
							with_spans(a, left.iter().chain(right).cloned().collect())
						}
						_ => {
							return Err(EditError::IncompatibleJoin {
								pos: Pos::new(path.iter().copied(), *index),
							});
						}
					};
					children.splice(*index - 1..=*index, [Arc::new(merged)]);
					Ok(with_blocks(node, children))
				})?;
				let map = StepMap::Join {
					path: path.clone(),
					index: *index,
					seam,
				};
				(root, map)
			}
			Step::Wrap {
				path,
				from,
				to,
				wrapper,
			} => {
				let root = root.update_at(path, |node| {
					let mut children = blocks_of(node)?.to_vec();
					check_bounds(path, *from, *to, children.len())?;
					if from == to {
						return Err(EditError::range("cannot wrap an empty range"));
					}
					let inner: Vec<Arc<Node>> = children.drain(*from..*to).collect();
					let wrapped = Node::from_markup(wrapper.clone(), Content::Blocks(inner));
					children.insert(*from, Arc::new(wrapped));
					Ok(with_blocks(node, children))
				})?;
				let map = StepMap::Wrap {
					path: path.clone(),
					from: *from,
					to: *to,
				};
				(root, map)
			}
			Step::Unwrap { path } => {
				let (k, parent) = split_parent(path, "unwrap")?;
				let target = doc.node_at(path)?;
				let inner = blocks_of(target)?;
				if inner.is_empty() {
					return Err(EditError::range(format!("cannot unwrap empty `{}`", target.kind())));
				}
				let root = root.update_at(&parent, |node| splice_child(node, k, inner.iter().cloned()))?;
				let map = StepMap::Unwrap {
					path: path.clone(),
					count: inner.len(),
				};
				(root, map)
			}
			Step::AddMark { path, from, to, mark } => {
				let root = root.update_at(path, |node| {
					let existing = spans_of(node)?;
					check_bounds(path, *from, *to, span::width(existing))?;
					Ok(with_spans(
						node,
						span::map_marks(existing, *from, *to, |marks| marks.add(mark.clone())),
					))
				})?;
				(root, StepMap::Identity)
			}
			Step::RemoveMark { path, from, to, kind } => {
				let root = root.update_at(path, |node| {
					let existing = spans_of(node)?;
					check_bounds(path, *from, *to, span::width(existing))?;
					Ok(with_spans(
						node,
						span::map_marks(existing, *from, *to, |marks| marks.remove_kind(kind.as_str())),
					))
				})?;
				(root, StepMap::Identity)
			}
		};
		Ok((doc.with_root(root), map))
	}

	/// Returns the steps that undo this step, given the document it was
	/// applied to. The returned steps apply in order.
	pub fn invert(&self, before: &Document) -> Result<Vec<Step>, EditError> {
		let inverse = match self {
			Step::InsertNodes { path, at, nodes } => vec![Step::RemoveNodes {
				path: path.clone(),
				from: *at,
				to: at + nodes.len(),
			}],
			Step::RemoveNodes { path, from, to } => {
				let children = blocks_of(before.node_at(path)?)?;
				let removed = children.get(*from..*to).ok_or_else(|| EditError::OutOfRange {
					pos: Pos::new(path.iter().copied(), *to),
				})?;
				vec![Step::InsertNodes {
					path: path.clone(),
					at: *from,
					nodes: removed.to_vec(),
				}]
			}
			Step::InsertInline { path, at, spans } => vec![Step::RemoveInline {
				path: path.clone(),
				from: *at,
				to: at + span::width(spans),
			}],
			Step::RemoveInline { path, from, to } => {
				let spans = spans_of(before.node_at(path)?)?;
				vec![Step::InsertInline {
					path: path.clone(),
					at: *from,
					spans: span::slice(spans, *from, *to),
				}]
			}
			Step::Split { path, .. } => {
				let (k, parent) = split_parent(path, "split")?;
				vec![Step::Join { path: parent, index: k + 1 }]
			}
			Step::Join { path, index } => {
				let node = before.node_at(path)?;
				let missing = || EditError::NotFound {
					path: path.iter().copied().chain([*index]).collect(),
				};
				let a = node.child(index.wrapping_sub(1)).ok_or_else(missing)?;
				let b = node.child(*index).ok_or_else(missing)?;
				vec![Step::Split {
					path: path.iter().copied().chain([index - 1]).collect(),
					offset: a.content_size(),
					after: Some(b.markup()),
				}]
			}
			Step::Wrap { path, from, .. } => vec![Step::Unwrap {
				path: path.iter().copied().chain([*from]).collect(),
			}],
			Step::Unwrap { path } => {
				let (k, parent) = split_parent(path, "unwrap")?;
				let node = before.node_at(path)?;
				vec![Step::Wrap {
					path: parent,
					from: k,
					to: k + node.content_size(),
					wrapper: node.markup(),
				}]
			}
			Step::AddMark { path, from, to, mark } => {
				let spans = spans_of(before.node_at(path)?)?;
				span::mark_runs(spans, *from, *to, mark.kind().as_str())
					.into_iter()
					.filter_map(|run| match run.mark {
						Some(old) if old == *mark => None,
						Some(old) => Some(Step::AddMark {
							path: path.clone(),
							from: run.from,
							to: run.to,
							mark: old,
						}),
						None => Some(Step::RemoveMark {
							path: path.clone(),
							from: run.from,
							to: run.to,
							kind: mark.kind().clone(),
						}),
					})
					.collect()
			}
			Step::RemoveMark { path, from, to, kind } => {
				let spans = spans_of(before.node_at(path)?)?;
				span::mark_runs(spans, *from, *to, kind.as_str())
					.into_iter()
					.filter_map(|run| {
						run.mark.map(|old| Step::AddMark {
							path: path.clone(),
							from: run.from,
							to: run.to,
							mark: old,
						})
					})
					.collect()
			}
		};
		Ok(inverse)
	}

	/// Paths of the containers whose direct content this step changes, as
	/// they are after the step.
	pub(crate) fn touched(&self) -> Vec<Path> {
		let child = |path: &Path, idx: usize| -> Path { path.iter().copied().chain([idx]).collect() };
		match self {
			Step::InsertNodes { path, .. }
			| Step::RemoveNodes { path, .. }
			| Step::InsertInline { path, .. }
			| Step::AddMark { path, .. } => vec![path.clone()],
			Step::RemoveInline { .. } | Step::RemoveMark { .. } => Vec::new(),
			Step::Split { path, .. } => match path.split_last() {
				Some((&k, parent)) => {
					let parent: Path = parent.iter().copied().collect();
					vec![parent.clone(), path.clone(), child(&parent, k + 1)]
				}
				None => Vec::new(),
			},
			Step::Join { path, index } => vec![path.clone(), child(path, index.saturating_sub(1))],
			Step::Wrap { path, from, .. } => vec![path.clone(), child(path, *from)],
			Step::Unwrap { path } => path
				.split_last()
				.map(|(_, parent)| vec![parent.iter().copied().collect()])
				.unwrap_or_default(),
		}
	}
}
