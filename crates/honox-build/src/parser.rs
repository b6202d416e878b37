//! TSX parsing shared by the build steps.

use tree_sitter::{Node, Parser, Tree};

use crate::error::TransformError;

/// Parses `source` as TSX, rejecting any syntax error.
pub(crate) fn parse_tsx(source: &str) -> Result<Tree, TransformError> {
	let mut parser = Parser::new();
	parser.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())?;
	let tree = parser
		.parse(source, None)
		.ok_or(TransformError::ParseCancelled)?;

	if let Some(node) = first_error(tree.root_node()) {
		return Err(syntax_error(source, node));
	}
	Ok(tree)
}

/// Source text covered by `node`.
pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
	&source[node.byte_range()]
}

/// Unquoted value of a string literal node.
pub(crate) fn string_value<'s>(node: Node<'_>, source: &'s str) -> &'s str {
	let raw = text(node, source);
	raw.strip_prefix(['"', '\''])
		.and_then(|s| s.strip_suffix(['"', '\'']))
		.unwrap_or(raw)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
	if !node.has_error() {
		return None;
	}
	if node.is_error() || node.is_missing() {
		return Some(node);
	}
	let mut cursor = node.walk();
	let found = node.children(&mut cursor).find_map(first_error);
	// has_error() without an error descendant still means the node is bad
	found.or(Some(node))
}

fn syntax_error(source: &str, node: Node<'_>) -> TransformError {
	let position = node.start_position();
	let snippet = source
		.lines()
		.nth(position.row)
		.unwrap_or_default()
		.trim()
		.chars()
		.take(80)
		.collect();

	TransformError::Syntax {
		line: position.row + 1,
		column: position.column + 1,
		snippet,
	}
}
