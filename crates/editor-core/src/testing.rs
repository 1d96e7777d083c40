//! Fixture schema and document builders shared by unit tests.

use std::sync::Arc;

use quire_primitives::schema::{MarkSpec, NodeSpec, Schema};
use quire_primitives::{Document, Mark, MarkSet, Node, Span};

pub(crate) fn schema() -> Arc<Schema> {
	let schema = Schema::builder("doc")
		.node(NodeSpec::blocks("doc").accepts(["block"]).requires_content())
		.node(NodeSpec::textblock("paragraph").group("block"))
		.node(NodeSpec::textblock("heading").group("block"))
		.node(NodeSpec::blocks("blockquote").group("block").accepts(["block"]).requires_content())
		.node(NodeSpec::blocks("bullet_list").group("block").accepts(["list_item"]).requires_content())
		.node(NodeSpec::blocks("list_item").accepts(["block"]).requires_content())
		.mark(MarkSpec::new("strong"))
		.mark(MarkSpec::new("em"))
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

pub(crate) fn strong() -> Mark {
	Mark::new("strong")
}

pub(crate) fn marked(text: &str, marks: impl IntoIterator<Item = Mark>) -> Span {
	Span::styled(text, MarkSet::from_marks(marks))
}
