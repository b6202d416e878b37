//! Island marker protocol.
//!
//! The server wraps every island in a `<honox-island>` element. The client
//! runtime reads the same attributes back, so both sides share these names
//! verbatim.
//!
//! ```text
//! <honox-island component-name="/islands/Counter.tsx"
//!               component-export="Counter"
//!               data-serialized-props="{&quot;count&quot;:1}">
//!   ...live server render of the component...
//!   <template data-hono-template="">...children markup...</template>
//! </honox-island>
//! ```
//!
//! Asynchronously rendered regions are delimited by a `<template id="H:n">`
//! (suspense) or `<template id="E:n">` (error boundary) placeholder, inline
//! fallback markup, and a closing comment sentinel.

use std::fmt;
use std::str::FromStr;

/// Element that marks an island on the page.
pub const ISLAND_TAG: &str = "honox-island";

/// Attribute holding the island's component path.
pub const COMPONENT_NAME: &str = "component-name";

/// Attribute holding the export name. Omitted for the default export.
pub const COMPONENT_EXPORT: &str = "component-export";

/// Attribute holding the JSON-encoded data props.
pub const DATA_SERIALIZED_PROPS: &str = "data-serialized-props";

/// Attribute on a trailing `<template>` naming the prop it supplies.
pub const DATA_HONO_TEMPLATE: &str = "data-hono-template";

/// Attribute written by the client once a marker has been hydrated.
pub const DATA_HONO_HYDRATED: &str = "data-hono-hydrated";

/// Attribute marking already-resolved content for a boundary id.
pub const DATA_HONO_TARGET: &str = "data-hono-target";

/// Hidden element the client parks pending boundary templates in.
pub const PLACEHOLDER_TAG: &str = "hono-placeholder";

/// Name of the route-module export flagging that the page imports an island.
pub const IMPORTING_ISLANDS_ID: &str = "__importing_islands";

/// Export name used when a marker carries no `component-export` attribute.
pub const DEFAULT_EXPORT: &str = "default";

/// Prop supplied by a template child with an empty or absent key.
pub const CHILDREN_PROP: &str = "children";

/// Maps a `data-hono-template` value to the prop name it supplies.
///
/// An empty key means the default `children` prop.
pub fn template_prop_name(key: &str) -> &str {
	if key.is_empty() { CHILDREN_PROP } else { key }
}

/// Maps a prop name to the `data-hono-template` value that carries it.
pub fn template_key(prop: &str) -> &str {
	if prop == CHILDREN_PROP { "" } else { prop }
}

/// Island identity as written on a marker element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IslandMarker {
	/// Component path relative to the app root (e.g. `/islands/Counter.tsx`).
	pub component_path: String,
	/// Named export, `None` for the default export.
	pub export: Option<String>,
}

impl IslandMarker {
	/// Creates a marker for the default export of `component_path`.
	pub fn new(component_path: impl Into<String>) -> Self {
		Self {
			component_path: component_path.into(),
			export: None,
		}
	}

	/// Sets the export name. `default` is normalised to `None`.
	pub fn with_export(mut self, export: impl Into<String>) -> Self {
		let export = export.into();
		self.export = (export != DEFAULT_EXPORT).then_some(export);
		self
	}

	/// The export to load, falling back to `default`.
	pub fn export_name(&self) -> &str {
		self.export.as_deref().unwrap_or(DEFAULT_EXPORT)
	}

	/// Reads a marker back from an element's attributes.
	///
	/// Returns `None` if the component path attribute is missing.
	pub fn from_attributes<F>(get: F) -> Option<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let component_path = get(COMPONENT_NAME)?;
		let marker = Self::new(component_path);
		Some(match get(COMPONENT_EXPORT) {
			Some(export) => marker.with_export(export),
			None => marker,
		})
	}

	/// Attributes for the marker element, in output order.
	pub fn to_attrs(&self, serialized_props: &str) -> Vec<(&'static str, String)> {
		let mut attrs = vec![(COMPONENT_NAME, self.component_path.clone())];
		if let Some(ref export) = self.export {
			attrs.push((COMPONENT_EXPORT, export.clone()));
		}
		attrs.push((DATA_SERIALIZED_PROPS, serialized_props.to_string()));
		attrs
	}
}

/// Kind of an asynchronously rendered region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
	/// `H:<n>`
	Suspense,
	/// `E:<n>`
	ErrorBoundary,
}

impl BoundaryKind {
	fn prefix(self) -> char {
		match self {
			BoundaryKind::Suspense => 'H',
			BoundaryKind::ErrorBoundary => 'E',
		}
	}
}

/// Identifier of a suspense or error boundary placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryId {
	pub kind: BoundaryKind,
	pub index: u64,
}

impl BoundaryId {
	pub fn suspense(index: u64) -> Self {
		Self {
			kind: BoundaryKind::Suspense,
			index,
		}
	}

	pub fn error_boundary(index: u64) -> Self {
		Self {
			kind: BoundaryKind::ErrorBoundary,
			index,
		}
	}

	pub fn is_suspense(&self) -> bool {
		self.kind == BoundaryKind::Suspense
	}

	pub fn is_error_boundary(&self) -> bool {
		self.kind == BoundaryKind::ErrorBoundary
	}
}

impl fmt::Display for BoundaryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind.prefix(), self.index)
	}
}

/// Error returned when a string is not a boundary id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid boundary id: {0:?}")]
pub struct InvalidBoundaryId(pub String);

impl FromStr for BoundaryId {
	type Err = InvalidBoundaryId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || InvalidBoundaryId(s.to_string());
		let (prefix, digits) = s.split_once(':').ok_or_else(invalid)?;
		let kind = match prefix {
			"H" => BoundaryKind::Suspense,
			"E" => BoundaryKind::ErrorBoundary,
			_ => return Err(invalid()),
		};
		if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
			return Err(invalid());
		}
		let index = digits.parse().map_err(|_| invalid())?;
		Ok(Self { kind, index })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("H:0", BoundaryId::suspense(0))]
	#[case("H:12", BoundaryId::suspense(12))]
	#[case("E:3", BoundaryId::error_boundary(3))]
	fn test_parse_boundary_id(#[case] input: &str, #[case] expected: BoundaryId) {
		let id: BoundaryId = input.parse().unwrap();
		assert_eq!(id, expected);
		assert_eq!(id.to_string(), input);
	}

	#[rstest]
	#[case("")]
	#[case("H:")]
	#[case("H0")]
	#[case("X:1")]
	#[case("H:1a")]
	#[case("H:-1")]
	#[case("h:1")]
	#[case("rh-0")]
	fn test_reject_invalid_boundary_id(#[case] input: &str) {
		assert_eq!(
			input.parse::<BoundaryId>(),
			Err(InvalidBoundaryId(input.to_string()))
		);
	}

	#[rstest]
	#[case("", "children")]
	#[case("header", "header")]
	fn test_template_prop_name(#[case] key: &str, #[case] prop: &str) {
		assert_eq!(template_prop_name(key), prop);
		assert_eq!(template_key(prop), key);
	}

	#[rstest]
	fn test_marker_default_export_omits_attribute() {
		let marker = IslandMarker::new("Badge.tsx").with_export("default");
		assert_eq!(marker.export, None);
		assert_eq!(marker.export_name(), "default");
		assert_eq!(
			marker.to_attrs("{}"),
			vec![
				(COMPONENT_NAME, "Badge.tsx".to_string()),
				(DATA_SERIALIZED_PROPS, "{}".to_string()),
			]
		);
	}

	#[rstest]
	fn test_marker_from_attributes() {
		let attrs = [
			(COMPONENT_NAME, "/islands/Counter.tsx"),
			(COMPONENT_EXPORT, "Counter"),
		];
		let marker = IslandMarker::from_attributes(|name| {
			attrs
				.iter()
				.find(|(key, _)| *key == name)
				.map(|(_, value)| value.to_string())
		})
		.unwrap();
		assert_eq!(marker.component_path, "/islands/Counter.tsx");
		assert_eq!(marker.export_name(), "Counter");

		assert!(IslandMarker::from_attributes(|_| None).is_none());
	}
}
