use std::sync::Arc;

use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::kind::Markup;
use crate::mark::{Mark, MarkSet};
use crate::node::Node;
use crate::position::Pos;
use crate::span::Span;
use crate::testing::{bq, code, doc, h, hr, image, li, marked, p, p_spans, strong, ul};

fn root(children: impl IntoIterator<Item = Node>) -> Node {
	Node::block("doc", children)
}

fn pos<const N: usize>(path: [usize; N], offset: usize) -> Pos {
	Pos::new(path, offset)
}

/// Every position that resolves in `doc`.
fn all_positions(doc: &Document) -> Vec<Pos> {
	let mut containers = vec![(Path::new(), doc.root())];
	containers.extend(doc.descendants());
	containers
		.into_iter()
		.filter(|(_, node)| node.is_container() || node.is_textblock())
		.flat_map(|(path, node)| (0..=node.content_size()).map(move |offset| Pos::new(path.iter().copied(), offset)))
		.collect()
}

fn assert_round_trip(tr: &Transform) {
	let inverse = tr.invert().expect("invertible");
	let undone = Transform::replay(tr.doc(), &inverse).expect("inverse applies");
	assert_eq!(undone.doc().root(), tr.base().root());
}

#[test]
fn test_insert_block_node() {
	let mut tr = Transform::new(doc([p("a"), p("b")]));
	tr.insert(&Pos::root(1), hr()).expect("doc accepts rules");
	assert_eq!(tr.doc().root(), &root([p("a"), hr(), p("b")]));
	assert_eq!(tr.steps().len(), 1);
	assert_round_trip(&tr);
}

#[test]
fn test_insert_rejects_disallowed_child() {
	let mut tr = Transform::new(doc([p("a")]));
	let err = tr.insert(&Pos::root(0), li([p("x")])).unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
	assert!(tr.is_empty());
	assert_eq!(tr.doc().root(), tr.base().root());

	let err = tr.insert(&pos([0], 0), hr()).unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
}

#[test]
fn test_insert_rejects_invalid_subtree() {
	let mut tr = Transform::new(doc([p("a")]));
	let err = tr.insert(&Pos::root(1), bq([])).unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
}

#[test]
fn test_insert_text_and_inline_leaf() {
	let mut tr = Transform::new(doc([p("ad")]));
	tr.insert_text(&pos([0], 1), "bc", MarkSet::empty()).expect("textblock");
	tr.insert_inline(&pos([0], 4), image()).expect("paragraph accepts images");
	assert_eq!(tr.doc().root(), &root([p_spans([Span::text("abcd"), image()])]));
	assert_round_trip(&tr);

	let err = tr.insert_inline(&Pos::root(0), Span::text("x")).unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
	let err = tr.insert_text(&pos([0], 9), "x", MarkSet::empty()).unwrap_err();
	assert!(matches!(err, EditError::OutOfRange { .. }));
}

#[test]
fn test_insert_inline_rejects_image_in_code_block() {
	let mut tr = Transform::new(doc([code("x")]));
	assert!(tr.insert_inline(&pos([0], 0), image()).is_err());
	assert!(tr.is_empty());
}

#[test]
fn test_edits_share_untouched_blocks() {
	let base = doc([p("a"), p("b"), p("c")]);
	let mut tr = Transform::new(base.clone());
	tr.insert_text(&pos([1], 1), "!", MarkSet::empty()).expect("valid");
	let (before, after) = (base.root().children(), tr.doc().root().children());
	assert!(Arc::ptr_eq(&before[0], &after[0]));
	assert!(Arc::ptr_eq(&before[2], &after[2]));
	assert!(!Arc::ptr_eq(&before[1], &after[1]));
}

#[rstest]
#[case::middle(pos([0], 2), root([p("ab"), hr(), p("cd")]))]
#[case::start(pos([0], 0), root([hr(), p("abcd")]))]
#[case::between_blocks(Pos::root(1), root([p("abcd"), hr()]))]
fn test_insert_block(#[case] at: Pos, #[case] expected: Node) {
	let mut tr = Transform::new(doc([p("abcd")]));
	tr.insert_block(&at, hr()).expect("block insertion");
	assert_eq!(tr.doc().root(), &expected);
	assert_round_trip(&tr);
}

#[test]
fn test_delete_within_textblock() {
	let mut tr = Transform::new(doc([p("hello")]));
	tr.delete(&pos([0], 1), &pos([0], 4)).expect("valid range");
	assert_eq!(tr.doc().root(), &root([p("ho")]));
	assert_round_trip(&tr);
}

#[test]
fn test_delete_empty_range_is_noop() {
	let mut tr = Transform::new(doc([p("hello")]));
	tr.delete(&pos([0], 2), &pos([0], 2)).expect("valid");
	assert!(tr.is_empty());
}

#[test]
fn test_delete_inverted_range() {
	let mut tr = Transform::new(doc([p("hello")]));
	let err = tr.delete(&pos([0], 4), &pos([0], 1)).unwrap_err();
	assert!(matches!(err, EditError::InvalidRange { .. }));
}

#[test]
fn test_delete_across_paragraphs_joins() {
	let mut tr = Transform::new(doc([p("abc"), hr(), p("def")]));
	tr.delete(&pos([0], 1), &pos([2], 2)).expect("valid range");
	assert_eq!(tr.doc().root(), &root([p("af")]));
	assert_round_trip(&tr);
}

#[test]
fn test_delete_across_list_items_joins_each_level() {
	let mut tr = Transform::new(doc([ul([li([p("ab")]), li([p("cd")])])]));
	tr.delete(&pos([0, 0, 0], 1), &pos([0, 1, 0], 1)).expect("valid range");
	assert_eq!(tr.doc().root(), &root([ul([li([p("ad")])])]));
	assert_round_trip(&tr);
}

#[test]
fn test_delete_keeps_unjoinable_branches() {
	let mut tr = Transform::new(doc([p("ab"), bq([p("cd")])]));
	tr.delete(&pos([0], 1), &pos([1, 0], 1)).expect("valid range");
	assert_eq!(tr.doc().root(), &root([p("a"), bq([p("d")])]));
	assert_round_trip(&tr);
}

#[test]
fn test_delete_rejects_emptying_required_content() {
	let mut tr = Transform::new(doc([bq([p("a")]), p("b")]));
	let err = tr.delete(&pos([0], 0), &pos([0], 1)).unwrap_err();
	assert!(matches!(err, EditError::InvalidRange { .. }));
	assert!(tr.is_empty());
}

#[test]
fn test_split_textblock() {
	let mut tr = Transform::new(doc([p("abcd")]));
	tr.split(&pos([0], 2), 1).expect("splittable");
	assert_eq!(tr.doc().root(), &root([p("ab"), p("cd")]));
	assert_round_trip(&tr);
}

#[test]
fn test_split_at_end_makes_empty_block() {
	let mut tr = Transform::new(doc([p("ab")]));
	tr.split(&pos([0], 2), 1).expect("splittable");
	assert_eq!(tr.doc().root(), &root([p("ab"), p("")]));
}

#[test]
fn test_split_list_item_two_levels() {
	let mut tr = Transform::new(doc([ul([li([p("abcd")])])]));
	tr.split(&pos([0, 0, 0], 2), 2).expect("splittable");
	assert_eq!(tr.doc().root(), &root([ul([li([p("ab")]), li([p("cd")])])]));
	assert_round_trip(&tr);
}

#[test]
fn test_split_rejects_root() {
	let mut tr = Transform::new(doc([p("ab")]));
	assert!(matches!(
		tr.split(&pos([0], 1), 2),
		Err(EditError::InvalidRange { .. })
	));
	assert!(tr.split(&Pos::root(1), 1).is_err());
}

#[test]
fn test_split_as_changes_second_type() {
	let mut tr = Transform::new(doc([p("abcd")]));
	tr.split_as(&pos([0], 2), 1, Markup::new("heading")).expect("joinable types");
	assert_eq!(tr.doc().root(), &root([p("ab"), h("cd")]));
	assert_round_trip(&tr);

	let mut tr = Transform::new(doc([p("abcd")]));
	assert!(tr.split_as(&pos([0], 2), 1, Markup::new("bullet_list")).is_err());
	assert!(tr.is_empty());
}

#[test]
fn test_join_paragraphs() {
	let mut tr = Transform::new(doc([p("ab"), p("cd")]));
	tr.join(&Pos::root(1)).expect("joinable");
	assert_eq!(tr.doc().root(), &root([p("abcd")]));
	assert_round_trip(&tr);
}

#[rstest]
#[case::start(Pos::root(0))]
#[case::rule(Pos::root(2))]
#[case::end(Pos::root(3))]
fn test_join_incompatible(#[case] at: Pos) {
	let mut tr = Transform::new(doc([p("ab"), p("cd"), hr()]));
	assert_eq!(tr.join(&at).unwrap_err(), EditError::IncompatibleJoin { pos: at.clone() });
}

#[test]
fn test_lift_from_blockquote_splits_wrapper() {
	let mut tr = Transform::new(doc([bq([p("a"), p("b"), p("c")])]));
	tr.lift(&pos([0, 1], 0), &pos([0, 1], 1)).expect("liftable");
	assert_eq!(tr.doc().root(), &root([bq([p("a")]), p("b"), bq([p("c")])]));
	assert_round_trip(&tr);
}

#[test]
fn test_lift_whole_blockquote() {
	let mut tr = Transform::new(doc([bq([p("a"), p("b")])]));
	tr.lift(&pos([0, 0], 0), &pos([0, 1], 1)).expect("liftable");
	assert_eq!(tr.doc().root(), &root([p("a"), p("b")]));
}

#[test]
fn test_lift_list_item_unwraps_item() {
	let mut tr = Transform::new(doc([ul([li([p("a")]), li([p("b")])])]));
	let plan = can_lift(tr.doc(), &pos([0, 1, 0], 0), &pos([0, 1, 0], 0)).expect("liftable");
	assert!(plan.unwrap_children);
	tr.lift(&pos([0, 1, 0], 0), &pos([0, 1, 0], 0)).expect("liftable");
	assert_eq!(tr.doc().root(), &root([ul([li([p("a")])]), p("b")]));
	assert_round_trip(&tr);
}

#[test]
fn test_lift_top_level_fails() {
	let mut tr = Transform::new(doc([p("a")]));
	assert_eq!(tr.lift(&pos([0], 0), &pos([0], 1)).unwrap_err(), EditError::NotLiftable);
}

#[test]
fn test_wrap_in_blockquote() {
	let mut tr = Transform::new(doc([p("a"), p("b"), p("c")]));
	tr.wrap(&pos([0], 0), &pos([1], 1), Markup::new("blockquote")).expect("wrappable");
	assert_eq!(tr.doc().root(), &root([bq([p("a"), p("b")]), p("c")]));
	assert_round_trip(&tr);
}

#[test]
fn test_wrap_in_list_adds_items() {
	let mut tr = Transform::new(doc([p("a"), p("b")]));
	tr.wrap(&pos([0], 0), &pos([1], 0), Markup::new("bullet_list")).expect("wrappable");
	assert_eq!(tr.doc().root(), &root([ul([li([p("a")]), li([p("b")])])]));
	assert_round_trip(&tr);
}

#[rstest]
#[case::not_accepted("list_item")]
#[case::textblock("code_block")]
#[case::unknown("table")]
fn test_wrap_rejects(#[case] wrapper: &str) {
	let mut tr = Transform::new(doc([p("a")]));
	let err = tr.wrap(&pos([0], 0), &pos([0], 1), Markup::new(wrapper)).unwrap_err();
	assert_eq!(err, EditError::NotWrappable { kind: wrapper.to_string() });
}

fn structure_doc() -> Document {
	doc([
		p("ab"),
		bq([p("cd"), p("ef")]),
		ul([li([p("gh")]), li([p("ij"), ul([li([p("kl")])])])]),
		hr(),
		h("mn"),
	])
}

#[test]
fn test_can_lift_matches_lift() {
	let d = structure_doc();
	let positions = all_positions(&d);
	for from in &positions {
		for to in positions.iter().filter(|to| *to >= from) {
			let mut tr = Transform::new(d.clone());
			assert_eq!(
				can_lift(&d, from, to).is_some(),
				tr.lift(from, to).is_ok(),
				"lift {from}..{to}"
			);
			if !tr.is_empty() {
				assert!(d.schema().check_tree(tr.doc().root()).is_ok(), "lift {from}..{to}");
			}
		}
	}
}

#[test]
fn test_can_wrap_matches_wrap() {
	let d = structure_doc();
	let positions = all_positions(&d);
	for kind in ["blockquote", "bullet_list"] {
		for from in &positions {
			for to in positions.iter().filter(|to| *to >= from) {
				let wrapper = Markup::new(kind);
				let mut tr = Transform::new(d.clone());
				assert_eq!(
					can_wrap(&d, from, to, &wrapper).is_some(),
					tr.wrap(from, to, wrapper).is_ok(),
					"wrap {from}..{to} in {kind}"
				);
				if !tr.is_empty() {
					assert!(d.schema().check_tree(tr.doc().root()).is_ok(), "wrap {from}..{to}");
				}
			}
		}
	}
}

#[test]
fn test_join_point_matches_join() {
	let d = doc([p("ab"), p("cd"), hr(), bq([p("ef")]), bq([p("gh")])]);
	for at in all_positions(&d) {
		if let Some(point) = join_point(&d, &at) {
			let mut tr = Transform::new(d.clone());
			assert!(tr.join(&point).is_ok(), "join at {point} from {at}");
		}
	}
	assert_eq!(join_point(&d, &pos([1], 0)), Some(Pos::root(1)));
	assert_eq!(join_point(&d, &pos([0], 1)), None);
	assert_eq!(join_point(&d, &pos([2], 0)), None);
	assert_eq!(join_point(&d, &pos([4, 0], 0)), Some(Pos::root(4)));
}

#[test]
fn test_selected_siblings() {
	let d = structure_doc();
	assert_eq!(selected_siblings(&d, &pos([0], 1), &pos([0], 2)), Some((Path::new(), 0, 1)));
	assert_eq!(selected_siblings(&d, &pos([0], 1), &pos([1, 0], 1)), Some((Path::new(), 0, 2)));
	assert_eq!(
		selected_siblings(&d, &pos([1, 0], 1), &pos([1, 1], 1)),
		Some((Path::from_slice(&[1]), 0, 2))
	);
	assert_eq!(selected_siblings(&d, &Pos::root(1), &Pos::root(3)), Some((Path::new(), 1, 3)));
	assert_eq!(selected_siblings(&d, &Pos::root(1), &Pos::root(1)), None);
}

#[test]
fn test_add_and_remove_style() {
	let mut tr = Transform::new(doc([p("hello"), p("world")]));
	tr.add_style(&pos([0], 1), &pos([1], 2), strong()).expect("known mark");
	assert_eq!(
		tr.doc().root(),
		&root([
			p_spans([Span::text("h"), marked("ello", [strong()])]),
			p_spans([marked("wo", [strong()]), Span::text("rld")]),
		])
	);
	assert!(range_has_style(tr.doc(), &pos([0], 1), &pos([1], 2), "strong"));
	assert!(!range_has_style(tr.doc(), &pos([0], 0), &pos([1], 2), "strong"));
	assert_round_trip(&tr);

	tr.remove_style(&pos([0], 2), &pos([0], 3), "strong").expect("valid range");
	assert!(!range_has_style(tr.doc(), &pos([0], 1), &pos([1], 2), "strong"));
	assert_round_trip(&tr);
}

#[test]
fn test_add_style_skips_redundant_and_unmarkable_blocks() {
	let mut tr = Transform::new(doc([p_spans([marked("ab", [strong()])]), code("cd")]));
	tr.add_style(&pos([0], 0), &pos([1], 2), strong()).expect("valid");
	assert!(tr.is_empty());

	let err = tr.add_style(&pos([0], 0), &pos([0], 1), Mark::new("blink")).unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
}

#[test]
fn test_add_style_replaces_link_and_inverts() {
	let old = Mark::link("https://old.example", "");
	let new = Mark::link("https://new.example", "");
	let mut tr = Transform::new(doc([p_spans([marked("ab", [old.clone()]), Span::text("cd")])]));
	tr.add_style(&pos([0], 1), &pos([0], 3), new.clone()).expect("valid");
	assert_eq!(
		tr.doc().root(),
		&root([p_spans([
			marked("a", [old]),
			marked("bc", [new]),
			Span::text("d")
		])])
	);
	assert_round_trip(&tr);
}

#[test]
fn test_range_has_style_single_gap() {
	let d = doc([p_spans([marked("ab", [strong()]), Span::text("c"), marked("d", [strong()])])]);
	assert!(range_has_style(&d, &pos([0], 0), &pos([0], 2), "strong"));
	assert!(!range_has_style(&d, &pos([0], 0), &pos([0], 4), "strong"));
	assert!(!range_has_style(&d, &pos([0], 1), &pos([0], 1), "strong"));
	assert!(!range_has_style(&d, &pos([0], 3), &pos([0], 1), "strong"));
}

#[test]
fn test_active_styles_at() {
	let link = Mark::link("https://a.example", "");
	let d = doc([p_spans([
		marked("ab", [strong()]),
		Span::text("c"),
		marked("de", [link.clone()]),
	])]);
	assert!(active_styles_at(&d, &pos([0], 0)).contains_kind("strong"));
	assert!(active_styles_at(&d, &pos([0], 2)).contains_kind("strong"));
	assert!(active_styles_at(&d, &pos([0], 3)).is_empty());
	assert!(active_styles_at(&d, &pos([0], 4)).contains(&link));
	assert!(!active_styles_at(&d, &pos([0], 5)).contains_kind("link"));
	assert!(active_styles_at(&d, &Pos::root(0)).is_empty());
}

#[test]
fn test_selected_text_joins_blocks_with_newlines() {
	let d = doc([p("hello"), hr(), bq([p("world")])]);
	assert_eq!(selected_text(&d, &pos([0], 1), &pos([2, 0], 3)), "ello\nwor");
	assert_eq!(selected_text(&d, &pos([0], 2), &pos([0], 2)), "");
}

#[test]
fn test_replay_reports_failing_step() {
	let d = doc([p("ab")]);
	let steps = [
		Step::InsertInline {
			path: Path::from_slice(&[0]),
			at: 0,
			spans: vec![Span::text("x")],
		},
		Step::RemoveInline {
			path: Path::from_slice(&[0]),
			from: 2,
			to: 9,
		},
	];
	let err = Transform::replay(&d, &steps).unwrap_err();
	assert!(matches!(err, EditError::InvalidTransform { index: 1, .. }));
}

#[test]
fn test_raw_step_is_checked_against_schema() {
	let mut tr = Transform::new(doc([p("ab")]));
	let err = tr
		.step(Step::InsertNodes {
			path: Path::new(),
			at: 0,
			nodes: vec![Arc::new(li([p("x")]))],
		})
		.unwrap_err();
	assert!(matches!(err, EditError::InvalidPlacement { .. }));
	assert!(tr.is_empty());

	tr.step(Step::AddMark {
		path: Path::from_slice(&[0]),
		from: 0,
		to: 1,
		mark: strong(),
	})
	.expect("paragraph allows marks");
	assert_eq!(tr.steps().len(), 1);
}

#[test]
fn test_failed_operation_rolls_back_staged_steps() {
	let mut tr = Transform::new(doc([p("ab")]));
	tr.insert_text(&pos([0], 0), "x", MarkSet::empty()).expect("valid");
	let staged = tr.doc().clone();
	assert!(tr.split(&pos([0], 1), 2).is_err());
	assert_eq!(tr.steps().len(), 1);
	assert_eq!(tr.doc().root(), staged.root());
	assert_eq!(tr.mapping().maps().len(), 1);
}

fn mapping_fixture() -> Document {
	doc([
		p("ab"),
		bq([p("cd"), p("ef")]),
		ul([li([p("gh")]), li([p("ij")])]),
		hr(),
	])
}

fn fixture_steps() -> Vec<Step> {
	let path = |p: &[usize]| Path::from_slice(p);
	vec![
		Step::InsertNodes {
			path: path(&[]),
			at: 1,
			nodes: vec![Arc::new(p("x"))],
		},
		Step::RemoveNodes {
			path: path(&[1]),
			from: 0,
			to: 1,
		},
		Step::RemoveNodes {
			path: path(&[]),
			from: 1,
			to: 3,
		},
		Step::InsertInline {
			path: path(&[0]),
			at: 1,
			spans: vec![Span::text("xy")],
		},
		Step::RemoveInline {
			path: path(&[0]),
			from: 0,
			to: 2,
		},
		Step::Split {
			path: path(&[1, 0]),
			offset: 1,
			after: None,
		},
		Step::Split {
			path: path(&[1]),
			offset: 1,
			after: None,
		},
		Step::Join { path: path(&[1]), index: 1 },
		Step::Join { path: path(&[2]), index: 1 },
		Step::Wrap {
			path: path(&[]),
			from: 0,
			to: 2,
			wrapper: Markup::new("blockquote"),
		},
		Step::Unwrap { path: path(&[1]) },
		Step::Unwrap { path: path(&[2, 0]) },
		Step::AddMark {
			path: path(&[0]),
			from: 0,
			to: 1,
			mark: strong(),
		},
		Step::RemoveMark {
			path: path(&[0]),
			from: 0,
			to: 2,
			kind: "strong".into(),
		},
	]
}

#[test]
fn test_every_step_maps_valid_positions_to_valid_positions() {
	let before = mapping_fixture();
	let positions = all_positions(&before);
	for step in fixture_steps() {
		let (after, map) = step.apply(&before).expect("fixture step applies");
		for at in &positions {
			for bias in [Bias::Left, Bias::Right] {
				let mapped = map.map_pos(at, bias);
				assert!(after.contains(&mapped), "{step:?}: {at} mapped to invalid {mapped}");
			}
		}
	}
}

#[test]
fn test_every_step_inverts() {
	let before = mapping_fixture();
	for step in fixture_steps() {
		let (after, _) = step.apply(&before).expect("fixture step applies");
		let inverse = step.invert(&before).expect("invertible");
		let restored = Transform::replay(&after, &inverse).expect("inverse applies");
		assert_eq!(restored.doc().root(), before.root(), "{step:?}");
	}
}

#[rstest]
#[case::insert_left(0, pos([0], 1), Bias::Left, pos([0], 1))]
#[case::insert_right(0, Pos::root(1), Bias::Right, Pos::root(2))]
#[case::insert_shifts_deeper(0, pos([1, 0], 1), Bias::Left, pos([2, 0], 1))]
#[case::remove_collapses(2, pos([1, 1], 2), Bias::Left, Pos::root(1))]
#[case::remove_shifts(2, pos([3], 0), Bias::Left, pos([1], 0))]
#[case::inline_remove_collapses(4, pos([0], 1), Bias::Right, pos([0], 0))]
#[case::split_left(5, pos([1, 0], 1), Bias::Left, pos([1, 0], 1))]
#[case::split_right(5, pos([1, 0], 1), Bias::Right, pos([1, 1], 0))]
#[case::split_follows_sibling(5, pos([1, 1], 2), Bias::Left, pos([1, 2], 2))]
#[case::block_split_moves_children(6, pos([1, 1], 1), Bias::Left, pos([2, 0], 1))]
#[case::join_adds_seam(7, pos([1, 1], 1), Bias::Left, pos([1, 0], 3))]
#[case::join_boundary(7, pos([1], 1), Bias::Left, pos([1, 0], 2))]
#[case::join_blocks(8, pos([2, 1, 0], 1), Bias::Left, pos([2, 0, 1], 1))]
#[case::wrap_moves_inside(9, pos([1, 0], 2), Bias::Left, pos([0, 1, 0], 2))]
#[case::wrap_shifts_after(9, pos([2, 0, 0], 1), Bias::Left, pos([1, 0, 0], 1))]
#[case::unwrap_lifts(10, pos([1, 1], 1), Bias::Left, pos([2], 1))]
#[case::unwrap_shifts_after(10, pos([2], 1), Bias::Left, pos([3], 1))]
#[case::mark_identity(12, pos([0], 1), Bias::Right, pos([0], 1))]
fn test_step_maps(#[case] step: usize, #[case] at: Pos, #[case] bias: Bias, #[case] expected: Pos) {
	let before = mapping_fixture();
	let (_, map) = fixture_steps()[step].apply(&before).expect("fixture step applies");
	assert_eq!(map.map_pos(&at, bias), expected);
}

#[test]
fn test_mapping_composes_left_to_right() {
	let mut tr = Transform::new(doc([p("ab"), p("cd")]));
	tr.insert(&Pos::root(0), hr()).expect("valid");
	tr.insert_text(&pos([2], 0), "xx", MarkSet::empty()).expect("valid");
	assert_eq!(tr.mapping().map_pos(&pos([1], 1), Bias::Left), pos([2], 3));
}

#[rstest]
#[case::join_at_first_child(StepMap::Join { path: Path::new(), index: 0, seam: 2 }, pos([0], 1), pos([0], 3))]
#[case::join_boundary_at_first_child(StepMap::Join { path: Path::new(), index: 0, seam: 2 }, Pos::root(0), pos([0], 2))]
#[case::inverted_remove(StepMap::Remove { path: Path::from_slice(&[0]), from: 3, to: 1 }, pos([0], 2), pos([0], 2))]
#[case::inverted_block_remove(StepMap::Remove { path: Path::new(), from: 2, to: 0 }, pos([1], 1), pos([1], 1))]
#[case::inverted_wrap(StepMap::Wrap { path: Path::new(), from: 2, to: 1 }, pos([3], 0), pos([4], 0))]
fn test_degenerate_maps_saturate(#[case] map: StepMap, #[case] at: Pos, #[case] expected: Pos) {
	for bias in [Bias::Left, Bias::Right] {
		assert_eq!(map.map_pos(&at, bias), expected);
	}
}

#[derive(Debug, Clone)]
enum Op {
	Insert { block: usize, at: usize, text: String },
	Delete { from: (usize, usize), to: (usize, usize) },
	Style { from: (usize, usize), to: (usize, usize), on: bool },
	Split { block: usize, at: usize },
	Join { index: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
	let point = (0usize..8, 0usize..12);
	prop_oneof![
		(0usize..8, 0usize..12, "[a-zé]{1,4}").prop_map(|(block, at, text)| Op::Insert { block, at, text }),
		(point.clone(), point.clone()).prop_map(|(from, to)| Op::Delete { from, to }),
		(point.clone(), point, any::<bool>()).prop_map(|(from, to, on)| Op::Style { from, to, on }),
		(0usize..8, 0usize..12).prop_map(|(block, at)| Op::Split { block, at }),
		(0usize..4).prop_map(|index| Op::Join { index }),
	]
}

/// Picks an inline position from textblock `block` (modulo the count).
fn text_pos(doc: &Document, (block, at): (usize, usize)) -> Pos {
	let blocks: Vec<_> = doc.textblocks().collect();
	let (path, node) = &blocks[block % blocks.len()];
	Pos::new(path.iter().copied(), at % (node.content_size() + 1))
}

fn run_op(tr: &mut Transform, op: &Op) {
	let d = tr.doc().clone();
	// Rejected operations leave the transform untouched, so errors are ignored.
	let _ = match op {
		Op::Insert { block, at, text } => tr.insert_text(&text_pos(&d, (*block, *at)), text, MarkSet::empty()).map(|_| ()),
		Op::Delete { from, to } => {
			let (a, b) = (text_pos(&d, *from), text_pos(&d, *to));
			let (from, to) = if a <= b { (a, b) } else { (b, a) };
			tr.delete(&from, &to).map(|_| ())
		}
		Op::Style { from, to, on } => {
			let (a, b) = (text_pos(&d, *from), text_pos(&d, *to));
			let (from, to) = if a <= b { (a, b) } else { (b, a) };
			if *on {
				tr.add_style(&from, &to, strong()).map(|_| ())
			} else {
				tr.remove_style(&from, &to, "strong").map(|_| ())
			}
		}
		Op::Split { block, at } => tr.split(&text_pos(&d, (*block, *at)), 1).map(|_| ()),
		Op::Join { index } => tr.join(&Pos::root(*index)).map(|_| ()),
	};
}

proptest! {
	#[test]
	fn prop_undo_restores_document(ops in prop::collection::vec(arb_op(), 1..12)) {
		let base = doc([p("hello"), bq([p("quoted"), p("text")]), ul([li([p("item")])]), p("world")]);
		let mut tr = Transform::new(base.clone());
		for op in &ops {
			run_op(&mut tr, op);
		}
		prop_assert!(base.schema().check_tree(tr.doc().root()).is_ok());
		let inverse = tr.invert().expect("staged steps invert");
		let undone = Transform::replay(tr.doc(), &inverse).expect("inverse applies");
		prop_assert_eq!(undone.doc().root(), base.root());
	}

	#[test]
	fn prop_mapping_keeps_positions_valid(ops in prop::collection::vec(arb_op(), 1..6)) {
		let base = doc([p("hello"), bq([p("quoted"), p("text")]), ul([li([p("item")])]), p("world")]);
		let mut tr = Transform::new(base.clone());
		for op in &ops {
			run_op(&mut tr, op);
		}
		for at in all_positions(&base) {
			for bias in [Bias::Left, Bias::Right] {
				let mapped = tr.mapping().map_pos(&at, bias);
				prop_assert!(tr.doc().contains(&mapped), "{} mapped to invalid {}", at, mapped);
			}
		}
	}
}
