use super::*;
use crate::kind::Attrs;
use crate::mark::{Mark, MarkSet};

fn strong() -> MarkSet {
	MarkSet::from_marks([Mark::new("strong")])
}

fn image() -> Span {
	Span::leaf("image", Attrs::new().with("src", "a.png"))
}

#[test]
fn test_width_counts_scalars_and_leaves() {
	let spans = vec![Span::text("héllo"), image(), Span::styled("!", strong())];
	assert_eq!(width(&spans), 7);
}

#[test]
fn test_normalize_merges_equal_marks_and_drops_empty() {
	let spans = normalize(vec![
		Span::text("ab"),
		Span::text(""),
		Span::text("cd"),
		Span::styled("ef", strong()),
		Span::styled("g", strong()),
	]);
	assert_eq!(spans, vec![Span::text("abcd"), Span::styled("efg", strong())]);
}

#[test]
fn test_normalize_keeps_leaves_separate() {
	let spans = normalize(vec![Span::text("a"), image(), image(), Span::text("b")]);
	assert_eq!(spans.len(), 4);
}

#[test]
fn test_split_at_inside_span() {
	let spans = vec![Span::text("hello"), Span::styled("world", strong())];
	let (before, after) = split_at(&spans, 7);
	assert_eq!(before, vec![Span::text("hello"), Span::styled("wo", strong())]);
	assert_eq!(after, vec![Span::styled("rld", strong())]);
}

#[test]
fn test_split_at_multibyte_boundary() {
	let (before, after) = split_at(&[Span::text("añb")], 2);
	assert_eq!(before, vec![Span::text("añ")]);
	assert_eq!(after, vec![Span::text("b")]);
}

#[test]
fn test_split_at_end_clamps() {
	let (before, after) = split_at(&[Span::text("abc")], 10);
	assert_eq!(before, vec![Span::text("abc")]);
	assert!(after.is_empty());
}

#[test]
fn test_insert_merges_with_neighbours() {
	let spans = insert(&[Span::text("held")], 2, &[Span::text("llo wor")]);
	assert_eq!(spans, vec![Span::text("hello world")]);
}

#[test]
fn test_remove_rejoins_pieces() {
	let spans = vec![Span::text("ab"), Span::styled("XY", strong()), Span::text("cd")];
	assert_eq!(remove(&spans, 2, 4), vec![Span::text("abcd")]);
}

#[test]
fn test_map_marks_splits_at_boundaries() {
	let spans = map_marks(&[Span::text("hello")], 1, 3, |m| m.add(Mark::new("strong")));
	assert_eq!(spans, vec![Span::text("h"), Span::styled("el", strong()), Span::text("lo")]);
}

#[test]
fn test_map_marks_applies_to_leaves() {
	let spans = map_marks(&[Span::text("a"), image()], 0, 2, |m| m.add(Mark::new("strong")));
	assert_eq!(spans[0], Span::styled("a", strong()));
	assert!(spans[1].marks().contains_kind("strong"));
}

#[test]
fn test_span_at_reports_start() {
	let spans = vec![Span::text("ab"), image(), Span::styled("cd", strong())];
	let (span, start) = span_at(&spans, 3).expect("unit 3 exists");
	assert_eq!(start, 3);
	assert_eq!(span.as_text(), Some("cd"));
	assert!(span_at(&spans, 5).is_none());
}

#[test]
fn test_mark_runs_partition_range() {
	let link_a = Mark::link("a", "");
	let link_b = Mark::link("b", "");
	let spans = vec![
		Span::styled("xx", MarkSet::from_marks([link_a.clone()])),
		Span::text("yy"),
		Span::styled("zz", MarkSet::from_marks([link_b.clone()])),
	];
	let runs = mark_runs(&spans, 1, 5, "link");
	assert_eq!(
		runs,
		vec![
			MarkRun {
				from: 1,
				to: 2,
				mark: Some(link_a)
			},
			MarkRun {
				from: 2,
				to: 4,
				mark: None
			},
			MarkRun {
				from: 4,
				to: 5,
				mark: Some(link_b)
			},
		]
	);
}

#[test]
fn test_text_between_skips_leaves() {
	let spans = vec![Span::text("ab"), image(), Span::text("cd")];
	assert_eq!(text_between(&spans, 1, 5), "bcd");
}
