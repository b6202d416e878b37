//! Export analysis and the edits that wrap island exports.

use std::ops::Range;

use honox_core::naming::is_component_name;
use honox_core::protocol::DEFAULT_EXPORT;
use tree_sitter::Node;

use super::wrapper::{
	ANONYMOUS_COMPONENT, WrapperNames, marker_import, original_binding, original_name, wrapper,
};
use crate::parser::text;

/// Replacement of one top-level statement.
#[derive(Debug)]
pub(crate) struct Edit {
	range: Range<usize>,
	replacement: String,
}

/// Everything needed to rewrite a module.
#[derive(Debug, Default)]
pub(crate) struct Rewrite {
	edits: Vec<Edit>,
	/// Statements appended after the module body.
	trailing: Vec<String>,
	/// Wrapped export names, in source order.
	pub(crate) exports: Vec<String>,
}

impl Rewrite {
	pub(crate) fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	/// Applies the edits to `source` and prepends the marker import.
	pub(crate) fn apply(&self, source: &str, import_source: &str) -> String {
		let mut out = marker_import(import_source);
		out.push('\n');

		let mut cursor = 0;
		for edit in &self.edits {
			out.push_str(&source[cursor..edit.range.start]);
			out.push_str(&edit.replacement);
			cursor = edit.range.end;
		}
		out.push_str(&source[cursor..]);

		if !self.trailing.is_empty() {
			let ends_with_newline = out.ends_with('\n');
			if !ends_with_newline {
				out.push('\n');
			}
			out.push_str(&self.trailing.join("\n"));
			if ends_with_newline {
				out.push('\n');
			}
		}
		out
	}
}

/// Walks the top-level statements of a module and plans the rewrite.
pub(crate) struct Rewriter<'s> {
	source: &'s str,
	component_path: &'s str,
	names: WrapperNames,
	rewrite: Rewrite,
}

impl<'s> Rewriter<'s> {
	pub(crate) fn new(source: &'s str, component_path: &'s str) -> Self {
		Self {
			source,
			component_path,
			names: WrapperNames::default(),
			rewrite: Rewrite::default(),
		}
	}

	pub(crate) fn run(mut self, program: Node<'_>) -> Rewrite {
		let mut cursor = program.walk();
		for statement in program.named_children(&mut cursor) {
			if statement.kind() == "export_statement" {
				self.export_statement(statement);
			}
		}
		self.rewrite
	}

	fn export_statement(&mut self, statement: Node<'_>) {
		// Re-exports and type-only exports are left to the module they come from.
		if statement.child_by_field_name("source").is_some() || has_token(statement, "type") {
			return;
		}
		if has_token(statement, "default") {
			self.default_export(statement);
			return;
		}
		if let Some(declaration) = statement.child_by_field_name("declaration") {
			match declaration.kind() {
				"function_declaration" => self.named_function(statement, declaration),
				"lexical_declaration" | "variable_declaration" => {
					self.variables(statement, declaration)
				}
				_ => {}
			}
			return;
		}
		let mut cursor = statement.walk();
		let clause = statement
			.named_children(&mut cursor)
			.find(|child| child.kind() == "export_clause");
		if let Some(clause) = clause {
			self.specifiers(statement, clause);
		}
	}

	/// `export default function ...`, `export default () => ...`,
	/// `export default Ident`
	fn default_export(&mut self, statement: Node<'_>) {
		let Some(target) = statement
			.child_by_field_name("declaration")
			.or_else(|| statement.child_by_field_name("value"))
		else {
			return;
		};

		let (name, component, original) = match target.kind() {
			"function_declaration" | "function_expression" | "function" | "arrow_function" => {
				let name = target
					.child_by_field_name("name")
					.map(|n| text(n, self.source))
					.unwrap_or(ANONYMOUS_COMPONENT);
				let binding = original_binding(name, &self.function_expression(target));
				(name, original_name(name), Some(binding))
			}
			"identifier" => {
				let name = text(target, self.source);
				(name, name.to_string(), None)
			}
			_ => return,
		};

		let wrapped = self.names.allocate(name);
		let mut replacement = String::new();
		if let Some(original) = original {
			replacement.push_str(&original);
			replacement.push('\n');
		}
		replacement.push_str(&wrapper(&wrapped, &component, self.component_path, None));

		self.push(statement, replacement, DEFAULT_EXPORT);
		self.rewrite
			.trailing
			.push(format!("export default {wrapped};"));
	}

	/// `export function Name() {}`
	fn named_function(&mut self, statement: Node<'_>, function: Node<'_>) {
		let Some(name) = function
			.child_by_field_name("name")
			.map(|n| text(n, self.source))
		else {
			return;
		};
		if !is_component_name(name) {
			return;
		}

		let wrapped = self.names.allocate(name);
		let replacement = [
			text(function, self.source).to_string(),
			wrapper(&wrapped, name, self.component_path, Some(name)),
			export_as(&wrapped, name),
		]
		.join("\n");
		self.push(statement, replacement, name);
	}

	/// `export const A = ..., b = ...;` splits into one statement per
	/// declarator so eligible ones can be rebound.
	fn variables(&mut self, statement: Node<'_>, declaration: Node<'_>) {
		let mut cursor = declaration.walk();
		let Some(keyword) = declaration
			.children(&mut cursor)
			.next()
			.map(|k| text(k, self.source))
		else {
			return;
		};
		let declarators: Vec<(Node<'_>, Option<&str>)> = declaration
			.named_children(&mut cursor)
			.filter(|d| d.kind() == "variable_declarator")
			.map(|d| (d, self.eligible_declarator(d)))
			.collect();
		if declarators.iter().all(|(_, name)| name.is_none()) {
			return;
		}

		let mut parts = Vec::with_capacity(declarators.len());
		let mut names = Vec::new();
		for (declarator, name) in declarators {
			let declarator_text = text(declarator, self.source);
			match name {
				Some(name) => {
					let wrapped = self.names.allocate(name);
					parts.push(format!("{keyword} {declarator_text};"));
					parts.push(wrapper(&wrapped, name, self.component_path, Some(name)));
					parts.push(export_as(&wrapped, name));
					names.push(name);
				}
				None => parts.push(format!("export {keyword} {declarator_text};")),
			}
		}

		self.rewrite.edits.push(Edit {
			range: statement.byte_range(),
			replacement: parts.join("\n"),
		});
		self.rewrite
			.exports
			.extend(names.into_iter().map(str::to_string));
	}

	fn eligible_declarator(&self, declarator: Node<'_>) -> Option<&'s str> {
		let name = declarator.child_by_field_name("name")?;
		declarator.child_by_field_name("value")?;
		if name.kind() != "identifier" {
			return None;
		}
		let name = text(name, self.source);
		is_component_name(name).then_some(name)
	}

	/// `export { a, B, C as default }`
	fn specifiers(&mut self, statement: Node<'_>, clause: Node<'_>) {
		let mut cursor = clause.walk();
		let specifiers: Vec<Specifier<'s>> = clause
			.named_children(&mut cursor)
			.filter(|s| s.kind() == "export_specifier")
			.filter_map(|s| self.specifier(s))
			.collect();
		if !specifiers.iter().any(|s| s.eligible) {
			return;
		}

		let mut wrappers = Vec::new();
		let mut printed = Vec::with_capacity(specifiers.len());
		let mut names = Vec::new();
		for specifier in specifiers {
			if !specifier.eligible {
				printed.push(specifier.text.to_string());
				continue;
			}
			let wrapped = self.names.allocate(specifier.local);
			let export = (specifier.exported != DEFAULT_EXPORT).then_some(specifier.exported);
			wrappers.push(wrapper(
				&wrapped,
				specifier.local,
				self.component_path,
				export,
			));
			printed.push(format!("{wrapped} as {}", specifier.exported));
			names.push(specifier.exported);
		}

		wrappers.push(format!("export {{ {} }};", printed.join(", ")));
		self.rewrite.edits.push(Edit {
			range: statement.byte_range(),
			replacement: wrappers.join("\n"),
		});
		self.rewrite
			.exports
			.extend(names.into_iter().map(str::to_string));
	}

	fn specifier(&self, node: Node<'_>) -> Option<Specifier<'s>> {
		let name = node.child_by_field_name("name")?;
		let local = text(name, self.source);
		let exported = node
			.child_by_field_name("alias")
			.map(|alias| text(alias, self.source))
			.unwrap_or(local);
		let type_only = has_token(node, "type") || has_token(node, "typeof");
		let eligible = !type_only
			&& name.kind() == "identifier"
			&& (exported == DEFAULT_EXPORT || is_component_name(exported));

		Some(Specifier {
			text: text(node, self.source),
			local,
			exported,
			eligible,
		})
	}

	/// A function node as an anonymous function expression.
	fn function_expression(&self, function: Node<'_>) -> String {
		match function.child_by_field_name("name") {
			Some(name) => format!(
				"{}{}",
				&self.source[function.start_byte()..name.start_byte()],
				&self.source[name.end_byte()..function.end_byte()]
			),
			None => text(function, self.source).to_string(),
		}
	}

	fn push(&mut self, statement: Node<'_>, replacement: String, export: &str) {
		self.rewrite.edits.push(Edit {
			range: statement.byte_range(),
			replacement,
		});
		self.rewrite.exports.push(export.to_string());
	}
}

struct Specifier<'s> {
	text: &'s str,
	local: &'s str,
	exported: &'s str,
	eligible: bool,
}

fn export_as(wrapped: &str, exported: &str) -> String {
	format!("export {{ {wrapped} as {exported} }};")
}

/// Whether `node` has an anonymous `token` child, e.g. `default` in
/// `export default`.
fn has_token(node: Node<'_>, token: &str) -> bool {
	let mut cursor = node.walk();
	let found = node
		.children(&mut cursor)
		.any(|child| !child.is_named() && child.kind() == token);
	found
}
