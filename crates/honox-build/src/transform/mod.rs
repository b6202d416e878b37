//! Island transform.
//!
//! Rewrites an island module so each component export is replaced by a
//! dual-path wrapper. On the server the wrapper renders the island marker
//! around the original component; on the client it renders the original
//! component directly.
//!
//! ```text
//! export default function Badge() { ... }
//! ```
//!
//! becomes
//!
//! ```text
//! import { HonoXIsland } from "honox/vite/components";
//! const BadgeOriginal = function () { ... };
//! const WrappedBadge = function (props) {
//!   return import.meta.env.SSR ? <HonoXIsland componentName="Badge.tsx" Component={BadgeOriginal} props={props} /> : <BadgeOriginal {...props}></BadgeOriginal>;
//! };
//! export default WrappedBadge;
//! ```
//!
//! Statements that are not rewritten are copied byte for byte. A module with
//! nothing to wrap is returned unchanged, without the import.

mod exports;
mod wrapper;

use tracing::debug;

use crate::error::TransformError;
use crate::parser::parse_tsx;
use exports::{Rewrite, Rewriter};

/// Default module the marker-rendering helper is imported from.
pub const DEFAULT_MARKER_IMPORT_SOURCE: &str = "honox/vite/components";

/// Source-to-source island transform.
#[derive(Debug, Clone)]
pub struct IslandTransformer {
	import_source: String,
}

impl IslandTransformer {
	pub fn new() -> Self {
		Self {
			import_source: DEFAULT_MARKER_IMPORT_SOURCE.to_string(),
		}
	}

	/// Sets the module the `HonoXIsland` helper is imported from.
	pub fn with_import_source(mut self, import_source: impl Into<String>) -> Self {
		self.import_source = import_source.into();
		self
	}

	pub fn import_source(&self) -> &str {
		&self.import_source
	}

	/// Rewrites `source`, tagging markers with `component_path`.
	///
	/// # Errors
	///
	/// Returns [`TransformError::Syntax`] if the module does not parse.
	pub fn transform(&self, source: &str, component_path: &str) -> Result<String, TransformError> {
		let Some(rewrite) = analyze(source, component_path)? else {
			return Ok(source.to_string());
		};
		debug!(
			component_path,
			exports = ?rewrite.exports,
			"wrapped island exports"
		);
		Ok(rewrite.apply(source, &self.import_source))
	}

	/// Names of the exports [`transform`](Self::transform) would wrap, with
	/// `default` for the default export.
	pub fn island_exports(&self, source: &str) -> Result<Vec<String>, TransformError> {
		Ok(analyze(source, "")?
			.map(|rewrite| rewrite.exports)
			.unwrap_or_default())
	}
}

impl Default for IslandTransformer {
	fn default() -> Self {
		Self::new()
	}
}

/// Transforms `source` with the default marker import.
pub fn transform_jsx_tags(source: &str, component_path: &str) -> Result<String, TransformError> {
	IslandTransformer::new().transform(source, component_path)
}

fn analyze(source: &str, component_path: &str) -> Result<Option<Rewrite>, TransformError> {
	if source.trim().is_empty() {
		return Ok(None);
	}
	let tree = parse_tsx(source)?;
	let rewrite = Rewriter::new(source, component_path).run(tree.root_node());
	Ok((!rewrite.is_empty()).then_some(rewrite))
}
