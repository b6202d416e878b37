//! Island build configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! app_dir = "/app"
//! island_dir = "/islands"
//! marker_import_source = "honox/vite/components"
//! jsx_import_source = "hono/jsx"
//! ```

use std::borrow::Cow;
use std::path::Path;

use honox_core::paths::{DEFAULT_APP_DIR, DEFAULT_ISLAND_DIR, IslandPaths};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BuildError, BuildResult};
use crate::transform::{DEFAULT_MARKER_IMPORT_SOURCE, IslandTransformer};

const HONO_JSX: &str = "hono/jsx";
const HONO_JSX_DOM: &str = "hono/jsx/dom";

/// Configuration for the island build steps.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandsConfig {
	/// App directory relative to the project root.
	pub app_dir: String,

	/// Island directory relative to the app directory.
	pub island_dir: String,

	/// Module the `HonoXIsland` helper is imported from.
	pub marker_import_source: String,

	/// JSX runtime used by the app, if not `hono/jsx`.
	pub jsx_import_source: Option<String>,
}

impl Default for IslandsConfig {
	fn default() -> Self {
		Self {
			app_dir: DEFAULT_APP_DIR.to_string(),
			island_dir: DEFAULT_ISLAND_DIR.to_string(),
			marker_import_source: DEFAULT_MARKER_IMPORT_SOURCE.to_string(),
			jsx_import_source: None,
		}
	}
}

impl IslandsConfig {
	pub fn with_app_dir(mut self, dir: impl Into<String>) -> Self {
		self.app_dir = dir.into();
		self
	}

	pub fn with_island_dir(mut self, dir: impl Into<String>) -> Self {
		self.island_dir = dir.into();
		self
	}

	pub fn with_jsx_import_source(mut self, source: impl Into<String>) -> Self {
		self.jsx_import_source = Some(normalize_jsx_import_source(&source.into()));
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> BuildResult<Self> {
		let path = path.as_ref();
		let content =
			std::fs::read_to_string(path).map_err(|source| BuildError::io(path, source))?;
		Self::from_toml(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml(content: &str) -> BuildResult<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Picks up `compilerOptions.jsxImportSource` from a `tsconfig.json`.
	///
	/// A missing or unreadable tsconfig leaves the configuration unchanged.
	pub fn with_tsconfig(mut self, path: impl AsRef<Path>) -> Self {
		let path = path.as_ref();
		match read_jsx_import_source(path) {
			Ok(Some(source)) => self.jsx_import_source = Some(source),
			Ok(None) => {}
			Err(error) => warn!(path = %path.display(), %error, "ignoring tsconfig"),
		}
		self
	}

	pub fn island_paths(&self) -> IslandPaths {
		IslandPaths::new(&self.app_dir, &self.island_dir)
	}

	pub fn transformer(&self) -> IslandTransformer {
		IslandTransformer::new().with_import_source(self.marker_import_source.clone())
	}

	/// Points `hono/jsx` imports in `source` at the configured JSX runtime.
	pub fn rewrite_jsx_import_source<'a>(&self, source: &'a str) -> Cow<'a, str> {
		match self.jsx_import_source.as_deref() {
			Some(target) if target != HONO_JSX => {
				let mut rewritten = Cow::Borrowed(source);
				for quote in ['\'', '"'] {
					let from = format!("{quote}{HONO_JSX}{quote}");
					if rewritten.contains(&from) {
						let to = format!("{quote}{target}{quote}");
						rewritten = Cow::Owned(rewritten.replace(&from, &to));
					}
				}
				rewritten
			}
			_ => Cow::Borrowed(source),
		}
	}
}

fn normalize_jsx_import_source(source: &str) -> String {
	if source == HONO_JSX_DOM {
		HONO_JSX.to_string()
	} else {
		source.to_string()
	}
}

#[derive(Debug, thiserror::Error)]
enum TsconfigError {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

fn read_jsx_import_source(path: &Path) -> Result<Option<String>, TsconfigError> {
	let content = std::fs::read_to_string(path)?;
	let tsconfig: serde_json::Value = serde_json::from_str(&content)?;
	Ok(tsconfig
		.pointer("/compilerOptions/jsxImportSource")
		.and_then(serde_json::Value::as_str)
		.map(normalize_jsx_import_source))
}
