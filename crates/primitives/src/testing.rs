//! Fixture schema and node builders shared by unit tests.

use std::sync::Arc;

use crate::document::Document;
use crate::kind::Attrs;
use crate::mark::{Mark, MarkSet};
use crate::node::Node;
use crate::schema::{MarkSpec, NodeSpec, Schema};
use crate::span::Span;

pub(crate) fn schema() -> Arc<Schema> {
	let schema = Schema::builder("doc")
		.node(NodeSpec::blocks("doc").accepts(["block"]).requires_content())
		.node(NodeSpec::textblock("paragraph").group("block"))
		.node(NodeSpec::textblock("heading").group("block"))
		.node(NodeSpec::textblock("code_block").group("block").accepts(Vec::<String>::new()).no_marks())
		.node(NodeSpec::blocks("blockquote").group("block").accepts(["block"]).requires_content())
		.node(NodeSpec::blocks("bullet_list").group("block").accepts(["list_item"]).requires_content())
		.node(NodeSpec::blocks("ordered_list").group("block").accepts(["list_item"]).requires_content())
		.node(NodeSpec::blocks("list_item").accepts(["block"]).requires_content())
		.node(NodeSpec::leaf("horizontal_rule").group("block"))
		.node(NodeSpec::inline_leaf("image"))
		.mark(MarkSpec::new("strong"))
		.mark(MarkSpec::new("em"))
		.mark(MarkSpec::new("code"))
		.mark(MarkSpec::new("link").non_inclusive())
		.build();
	Arc::new(schema.expect("fixture schema is valid"))
}

pub(crate) fn doc(children: impl IntoIterator<Item = Node>) -> Document {
	Document::new(schema(), Node::block("doc", children))
}

pub(crate) fn p(text: &str) -> Node {
	Node::textblock("paragraph", [Span::text(text)])
}

pub(crate) fn p_spans(spans: impl IntoIterator<Item = Span>) -> Node {
	Node::textblock("paragraph", spans)
}

pub(crate) fn h(text: &str) -> Node {
	Node::textblock("heading", [Span::text(text)])
}

pub(crate) fn code(text: &str) -> Node {
	Node::textblock("code_block", [Span::text(text)])
}

pub(crate) fn bq(children: impl IntoIterator<Item = Node>) -> Node {
	Node::block("blockquote", children)
}

pub(crate) fn ul(children: impl IntoIterator<Item = Node>) -> Node {
	Node::block("bullet_list", children)
}

pub(crate) fn li(children: impl IntoIterator<Item = Node>) -> Node {
	Node::block("list_item", children)
}

pub(crate) fn hr() -> Node {
	Node::leaf("horizontal_rule")
}

pub(crate) fn image() -> Span {
	Span::leaf("image", Attrs::new().with("src", "a.png"))
}

pub(crate) fn strong() -> Mark {
	Mark::new("strong")
}

pub(crate) fn marked(text: &str, marks: impl IntoIterator<Item = Mark>) -> Span {
	Span::styled(text, MarkSet::from_marks(marks))
}
