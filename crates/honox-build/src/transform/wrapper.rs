//! Source emitted around an island export.

use std::collections::HashSet;

/// Name given to an anonymous default export.
pub(crate) const ANONYMOUS_COMPONENT: &str = "__HonoIslandComponent__";

/// Import line for the marker-rendering helper.
pub(crate) fn marker_import(import_source: &str) -> String {
	format!("import {{ HonoXIsland }} from {};", js_string(import_source))
}

/// `const <Name>Original = <expression>;`
pub(crate) fn original_binding(name: &str, expression: &str) -> String {
	format!("const {} = {expression};", original_name(name))
}

pub(crate) fn original_name(name: &str) -> String {
	format!("{name}Original")
}

/// The dual-path wrapper around `component`.
///
/// On the server it renders the island marker with `component` as its live
/// child; on the client it renders `component` directly.
pub(crate) fn wrapper(
	wrapped: &str,
	component: &str,
	component_path: &str,
	export: Option<&str>,
) -> String {
	let mut marker = format!(
		"<HonoXIsland componentName={} Component={{{component}}} props={{props}}",
		jsx_string(component_path)
	);
	if let Some(export) = export {
		marker.push_str(" componentExport=");
		marker.push_str(&jsx_string(export));
	}
	marker.push_str(" />");

	format!(
		"const {wrapped} = function (props) {{\n  return import.meta.env.SSR ? {marker} : <{component} {{...props}}></{component}>;\n}};"
	)
}

/// Allocates wrapper names, suffixing on collision.
#[derive(Debug, Default)]
pub(crate) struct WrapperNames {
	used: HashSet<String>,
}

impl WrapperNames {
	pub(crate) fn allocate(&mut self, local: &str) -> String {
		let base = format!("Wrapped{local}");
		let mut name = base.clone();
		let mut n = 1;
		while !self.used.insert(name.clone()) {
			n += 1;
			name = format!("{base}_{n}");
		}
		name
	}
}

fn js_string(value: &str) -> String {
	serde_json::Value::String(value.to_string()).to_string()
}

/// JSX attribute values cannot hold escapes; fall back to an expression.
fn jsx_string(value: &str) -> String {
	if value.contains(['"', '\\', '\n', '\r', '{', '}']) {
		format!("{{{}}}", js_string(value))
	} else {
		format!("\"{value}\"")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_wrapper_default_export() {
		assert_eq!(
			wrapper("WrappedBadge", "BadgeOriginal", "Badge.tsx", None),
			"const WrappedBadge = function (props) {\n  return import.meta.env.SSR ? <HonoXIsland componentName=\"Badge.tsx\" Component={BadgeOriginal} props={props} /> : <BadgeOriginal {...props}></BadgeOriginal>;\n};"
		);
	}

	#[rstest]
	fn test_wrapper_named_export() {
		let code = wrapper("WrappedBadge", "Badge", "/islands/Badge.tsx", Some("Badge"));
		assert!(code.contains(
			"<HonoXIsland componentName=\"/islands/Badge.tsx\" Component={Badge} props={props} componentExport=\"Badge\" />"
		));
	}

	#[rstest]
	#[case("Badge.tsx", "\"Badge.tsx\"")]
	#[case("we\"ird.tsx", "{\"we\\\"ird.tsx\"}")]
	fn test_jsx_string(#[case] value: &str, #[case] expected: &str) {
		assert_eq!(jsx_string(value), expected);
	}

	#[rstest]
	fn test_wrapper_names_unique() {
		let mut names = WrapperNames::default();
		assert_eq!(names.allocate("Badge"), "WrappedBadge");
		assert_eq!(names.allocate("Badge"), "WrappedBadge_2");
		assert_eq!(names.allocate("Card"), "WrappedCard");
	}

	#[rstest]
	fn test_marker_import() {
		assert_eq!(
			marker_import("honox/vite/components"),
			"import { HonoXIsland } from \"honox/vite/components\";"
		);
	}
}
