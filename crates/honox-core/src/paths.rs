//! Island file conventions.
//!
//! A source file is an island if it lives under the island directory of the
//! app, or anywhere in the app when named `_name.island.tsx` or `$name.tsx`.
//! Its component path is the root-relative path with the app directory
//! prefix removed, so `/app/islands/Counter.tsx` becomes
//! `/islands/Counter.tsx`.

use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_APP_DIR: &str = "/app";
pub const DEFAULT_ISLAND_DIR: &str = "/islands";

/// Matches islands declared by file name anywhere in the tree.
static NAMED_ISLAND: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r".*/(?:_[a-zA-Z0-9-]+\.island\.tsx|\$[a-zA-Z0-9-]+\.tsx)$")
		.expect("Invalid regex pattern")
});

/// Island path matcher for one app layout.
#[derive(Debug, Clone)]
pub struct IslandPaths {
	app_dir: String,
	island_dir: String,
	in_island_dir: Regex,
}

impl IslandPaths {
	/// Creates a matcher for `app_dir` and `island_dir` (relative to the app).
	///
	/// Both are normalised to a leading slash and no trailing slash.
	pub fn new(app_dir: &str, island_dir: &str) -> Self {
		let app_dir = normalize_dir(app_dir);
		let island_dir = normalize_dir(island_dir);
		let in_island_dir = Regex::new(&format!(
			r"^{}{}/.+\.tsx$",
			regex::escape(&app_dir),
			regex::escape(&island_dir)
		))
		.expect("Invalid regex pattern");

		Self {
			app_dir,
			island_dir,
			in_island_dir,
		}
	}

	pub fn app_dir(&self) -> &str {
		&self.app_dir
	}

	pub fn island_dir(&self) -> &str {
		&self.island_dir
	}

	/// Returns `true` if the root-relative `path` is an island source file.
	pub fn is_island(&self, path: &str) -> bool {
		let path = to_slash(path);
		self.in_island_dir.is_match(&path) || NAMED_ISLAND.is_match(&path)
	}

	/// Component path for the root-relative `path`, if it is an island.
	pub fn component_path(&self, path: &str) -> Option<String> {
		if !self.is_island(path) {
			return None;
		}
		let path = to_slash(path);
		let relative = match path.strip_prefix(&self.app_dir) {
			Some(rest) if rest.starts_with('/') => rest,
			_ => path.as_str(),
		};
		Some(relative.to_string())
	}
}

impl Default for IslandPaths {
	fn default() -> Self {
		Self::new(DEFAULT_APP_DIR, DEFAULT_ISLAND_DIR)
	}
}

fn normalize_dir(dir: &str) -> String {
	let trimmed = to_slash(dir).trim_matches('/').to_string();
	if trimmed.is_empty() {
		String::new()
	} else {
		format!("/{trimmed}")
	}
}

fn to_slash(path: &str) -> String {
	path.replace('\\', "/")
}
