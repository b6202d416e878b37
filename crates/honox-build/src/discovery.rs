//! Island discovery.
//!
//! Walks the app directory for island files and records the exports the
//! transform wraps in each. The resulting manifest seeds the client registry.

use std::path::Path;

use honox_core::manifest::{IslandEntry, IslandManifest};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::IslandsConfig;
use crate::error::{BuildError, BuildResult};
use crate::importing::root_relative;

/// Scans `root` for islands according to `config`.
///
/// # Errors
///
/// Fails if the app directory cannot be walked, an island cannot be read, or
/// an island does not parse.
pub fn discover_islands(root: &Path, config: &IslandsConfig) -> BuildResult<IslandManifest> {
	let paths = config.island_paths();
	let transformer = config.transformer();
	let app_root = root.join(paths.app_dir().trim_start_matches('/'));

	let mut islands = Vec::new();
	for entry in WalkDir::new(&app_root).sort_by_file_name() {
		let entry = entry.map_err(|source| BuildError::Walk {
			path: app_root.clone(),
			source,
		})?;
		if !entry.file_type().is_file() {
			continue;
		}
		let Some(component_path) =
			root_relative(root, entry.path()).and_then(|relative| paths.component_path(&relative))
		else {
			continue;
		};

		let source = std::fs::read_to_string(entry.path())
			.map_err(|source| BuildError::io(entry.path(), source))?;
		let exports = transformer
			.island_exports(&source)
			.map_err(|source| BuildError::transform(entry.path(), source))?;
		if exports.is_empty() {
			debug!(%component_path, "island file exports no components");
			continue;
		}

		islands.push(IslandEntry {
			component_path,
			exports,
		});
	}

	debug!(count = islands.len(), app_root = %app_root.display(), "discovered islands");
	Ok(IslandManifest::new(islands))
}
