//! Build-time island manifest.
//!
//! The build step scans the app for island files and records each one's
//! component path and the exports that were wrapped. The client turns the
//! manifest into its loader registry.

use serde::{Deserialize, Serialize};

use crate::protocol::DEFAULT_EXPORT;

/// One island module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandEntry {
	/// Component path, as written on markers.
	pub component_path: String,
	/// Wrapped export names; `default` for the default export.
	#[serde(default)]
	pub exports: Vec<String>,
}

impl IslandEntry {
	pub fn new(component_path: impl Into<String>) -> Self {
		Self {
			component_path: component_path.into(),
			exports: Vec::new(),
		}
	}

	pub fn with_export(mut self, export: impl Into<String>) -> Self {
		self.exports.push(export.into());
		self
	}

	pub fn has_default_export(&self) -> bool {
		self.exports.iter().any(|e| e == DEFAULT_EXPORT)
	}
}

/// Every island known to the build, ordered by component path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandManifest {
	pub islands: Vec<IslandEntry>,
}

impl IslandManifest {
	pub fn new(mut islands: Vec<IslandEntry>) -> Self {
		islands.sort_by(|a, b| a.component_path.cmp(&b.component_path));
		Self { islands }
	}

	pub fn get(&self, component_path: &str) -> Option<&IslandEntry> {
		self.islands
			.iter()
			.find(|entry| entry.component_path == component_path)
	}

	pub fn contains(&self, component_path: &str) -> bool {
		self.get(component_path).is_some()
	}

	pub fn len(&self) -> usize {
		self.islands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.islands.is_empty()
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}

	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}
}
