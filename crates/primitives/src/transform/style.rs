//! Inline style queries and the mark steps behind `add_style`/`remove_style`.

use super::{Step, Transform};
use crate::document::Document;
use crate::edit::EditError;
use crate::kind::MarkKind;
use crate::mark::{Mark, MarkSet};
use crate::position::Pos;
use crate::span;

/// Returns true iff every inline unit in `[from, to)` carries a mark of
/// `kind`. A range without inline units has no style.
pub fn range_has_style(doc: &Document, from: &Pos, to: &Pos, kind: &str) -> bool {
	if from > to || !doc.contains(from) || !doc.contains(to) {
		return false;
	}
	let mut any_units = false;
	for segment in doc.textblocks_between(from, to) {
		if segment.from >= segment.to {
			continue;
		}
		let Ok(node) = doc.node_at(&segment.path) else {
			return false;
		};
		any_units = true;
		if span::mark_runs(node.spans(), segment.from, segment.to, kind)
			.iter()
			.any(|run| run.mark.is_none())
		{
			return false;
		}
	}
	any_units
}

/// Marks that text typed at `pos` would receive.
///
/// Uses the unit before the cursor, or the unit after it at the start of a
/// textblock. Non-inclusive marks are dropped unless the unit on the other
/// side of the cursor carries them too.
pub fn active_styles_at(doc: &Document, pos: &Pos) -> MarkSet {
	let Ok(resolved) = doc.resolve(pos) else {
		return MarkSet::empty();
	};
	let spans = resolved.node.spans();
	let before = pos.offset.checked_sub(1).and_then(|i| span::span_at(spans, i));
	let after = span::span_at(spans, pos.offset);
	let (main, other) = match before {
		Some(before) => (Some(before), after),
		None => (after, None),
	};
	let Some((main, _)) = main else {
		return MarkSet::empty();
	};
	let schema = doc.schema();
	main.marks()
		.iter()
		.filter(|mark| schema.is_inclusive(mark.kind()) || other.is_some_and(|(span, _)| span.marks().contains(mark)))
		.cloned()
		.collect()
}

/// Text of the inline content in `[from, to)`, one line per textblock.
pub fn selected_text(doc: &Document, from: &Pos, to: &Pos) -> String {
	if from > to {
		return String::new();
	}
	doc.textblocks_between(from, to)
		.iter()
		.filter_map(|segment| {
			let node = doc.node_at(&segment.path).ok()?;
			Some(span::text_between(node.spans(), segment.from, segment.to))
		})
		.collect::<Vec<_>>()
		.join("\n")
}

fn check_range(doc: &Document, from: &Pos, to: &Pos) -> Result<(), EditError> {
	doc.resolve(from)?;
	doc.resolve(to)?;
	if from > to {
		return Err(EditError::range(format!("{from} is after {to}")));
	}
	Ok(())
}

pub(super) fn add(tr: &mut Transform, from: &Pos, to: &Pos, mark: &Mark) -> Result<(), EditError> {
	check_range(tr.doc(), from, to)?;
	let schema = std::sync::Arc::clone(tr.doc().schema());
	if schema.mark(mark.kind()).is_none() {
		return Err(EditError::placement(format!("unknown mark kind `{}`", mark.kind())));
	}
	for segment in tr.doc().textblocks_between(from, to) {
		if segment.from >= segment.to {
			continue;
		}
		let node = tr.doc().node_at(&segment.path)?;
		if !schema.allows_marks(node.kind()) {
			continue;
		}
		let covered = span::mark_runs(node.spans(), segment.from, segment.to, mark.kind().as_str())
			.iter()
			.all(|run| run.mark.as_ref() == Some(mark));
		if covered {
			continue;
		}
		tr.push_checked(Step::AddMark {
			path: segment.path,
			from: segment.from,
			to: segment.to,
			mark: mark.clone(),
		})?;
	}
	Ok(())
}

pub(super) fn remove(tr: &mut Transform, from: &Pos, to: &Pos, kind: &str) -> Result<(), EditError> {
	check_range(tr.doc(), from, to)?;
	for segment in tr.doc().textblocks_between(from, to) {
		if segment.from >= segment.to {
			continue;
		}
		let node = tr.doc().node_at(&segment.path)?;
		let marked = span::mark_runs(node.spans(), segment.from, segment.to, kind)
			.iter()
			.any(|run| run.mark.is_some());
		if !marked {
			continue;
		}
		tr.push_checked(Step::RemoveMark {
			path: segment.path,
			from: segment.from,
			to: segment.to,
			kind: MarkKind::new(kind),
		})?;
	}
	Ok(())
}
