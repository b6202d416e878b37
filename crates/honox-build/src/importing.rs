//! Importing-islands detection.
//!
//! A page only needs the client bootstrap script if an island is reachable
//! from it. For each route module the build walks the static import graph;
//! when an island is found the module gets an extra export the router reads:
//!
//! ```text
//! export const __importing_islands = true;
//! ```

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use honox_core::paths::IslandPaths;
use honox_core::protocol::IMPORTING_ISLANDS_ID;
use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult};
use crate::parser::{parse_tsx, string_value};

/// Resolves import specifiers to files.
pub trait ModuleResolver {
	/// Resolves `specifier` as imported from `importer`.
	fn resolve(&self, specifier: &str, importer: &Path) -> Option<PathBuf>;

	/// Reads a resolved module.
	fn read(&self, path: &Path) -> std::io::Result<String> {
		std::fs::read_to_string(path)
	}
}

/// Resolves relative and root-absolute specifiers on the file system.
///
/// Bare package specifiers are never followed.
#[derive(Debug, Clone)]
pub struct FsResolver {
	root: PathBuf,
}

impl FsResolver {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

const EXTENSIONS: [&str; 2] = ["tsx", "ts"];

impl ModuleResolver for FsResolver {
	fn resolve(&self, specifier: &str, importer: &Path) -> Option<PathBuf> {
		let base = if specifier.starts_with("./") || specifier.starts_with("../") {
			importer.parent()?.join(specifier)
		} else if let Some(absolute) = specifier.strip_prefix('/') {
			self.root.join(absolute)
		} else {
			return None;
		};
		let base = normalize(&base);

		let with_extension = EXTENSIONS.iter().map(|ext| {
			let mut path = OsString::from(base.as_os_str());
			path.push(".");
			path.push(ext);
			PathBuf::from(path)
		});
		let index = EXTENSIONS
			.iter()
			.map(|ext| base.join(format!("index.{ext}")));

		std::iter::once(base.clone())
			.chain(with_extension)
			.chain(index)
			.find(|candidate| candidate.is_file())
	}
}

/// Detects whether route modules reach an island.
#[derive(Debug, Clone)]
pub struct ImportingIslands<R> {
	root: PathBuf,
	paths: IslandPaths,
	resolver: R,
}

impl ImportingIslands<FsResolver> {
	/// Detector resolving modules under `root` on the file system.
	pub fn new(root: impl Into<PathBuf>, paths: IslandPaths) -> Self {
		let root = root.into();
		let resolver = FsResolver::new(root.clone());
		Self::with_resolver(root, paths, resolver)
	}
}

impl<R: ModuleResolver> ImportingIslands<R> {
	pub fn with_resolver(root: impl Into<PathBuf>, paths: IslandPaths, resolver: R) -> Self {
		Self {
			root: root.into(),
			paths,
			resolver,
		}
	}

	/// Returns `true` if any module reachable from `entry` is an island.
	///
	/// # Errors
	///
	/// Fails if `entry` cannot be read, or if any reachable module does not
	/// parse. Unreadable dependencies are skipped with a warning.
	pub fn imports_island(&self, entry: &Path) -> BuildResult<bool> {
		let source = self
			.resolver
			.read(entry)
			.map_err(|source| BuildError::io(entry, source))?;
		self.imports_island_from(entry, &source)
	}

	/// Appends the importing-islands flag to `source` if `entry` reaches an
	/// island; otherwise returns `source` unchanged.
	pub fn inject(&self, entry: &Path, source: &str) -> BuildResult<String> {
		if self.imports_island_from(entry, source)? {
			debug!(entry = %entry.display(), "route imports islands");
			Ok(inject_importing_islands(source))
		} else {
			Ok(source.to_string())
		}
	}

	fn imports_island_from(&self, entry: &Path, source: &str) -> BuildResult<bool> {
		let mut visited = HashSet::from([entry.to_path_buf()]);
		let mut stack = vec![(entry.to_path_buf(), source.to_string())];

		while let Some((importer, source)) = stack.pop() {
			let specifiers = import_specifiers(&source)
				.map_err(|source| BuildError::transform(&importer, source))?;

			for specifier in specifiers {
				let Some(resolved) = self.resolver.resolve(&specifier, &importer) else {
					continue;
				};
				if self.is_island(&resolved) {
					return Ok(true);
				}
				if !visited.insert(resolved.clone()) {
					continue;
				}
				match self.resolver.read(&resolved) {
					Ok(dependency) => stack.push((resolved, dependency)),
					Err(error) => {
						warn!(path = %resolved.display(), %error, "skipping unreadable import")
					}
				}
			}
		}
		Ok(false)
	}

	fn is_island(&self, path: &Path) -> bool {
		root_relative(&self.root, path).is_some_and(|relative| self.paths.is_island(&relative))
	}
}

/// Appends the importing-islands export to a route module.
pub fn inject_importing_islands(source: &str) -> String {
	let mut out = source.to_string();
	if !out.is_empty() && !out.ends_with('\n') {
		out.push('\n');
	}
	out.push_str(&format!("export const {IMPORTING_ISLANDS_ID} = true;\n"));
	out
}

/// Static import and re-export sources of a module.
pub fn import_specifiers(source: &str) -> Result<Vec<String>, crate::TransformError> {
	let tree = parse_tsx(source)?;
	let root = tree.root_node();
	let mut cursor = root.walk();
	let specifiers = root
		.named_children(&mut cursor)
		.filter(|node| matches!(node.kind(), "import_statement" | "export_statement"))
		.filter_map(|node| node.child_by_field_name("source"))
		.map(|node| string_value(node, source).to_string())
		.collect();
	Ok(specifiers)
}

/// `path` relative to `root`, as a `/`-separated path with a leading slash.
pub(crate) fn root_relative(root: &Path, path: &Path) -> Option<String> {
	let relative = path.strip_prefix(root).ok()?;
	let mut out = String::new();
	for component in relative.components() {
		if let Component::Normal(part) = component {
			out.push('/');
			out.push_str(&part.to_string_lossy());
		}
	}
	Some(out)
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				out.pop();
			}
			other => out.push(other),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::fs;
	use tempfile::TempDir;

	fn write(root: &Path, relative: &str, content: &str) {
		let path = root.join(relative);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, content).unwrap();
	}

	#[fixture]
	fn project() -> TempDir {
		let dir = tempfile::tempdir().unwrap();
		let root = dir.path();
		write(
			root,
			"app/islands/Counter.tsx",
			"export default function Counter() { return <button>0</button> }\n",
		);
		write(
			root,
			"app/components/Layout.tsx",
			"import Counter from '../islands/Counter'\nexport const Layout = () => <div><Counter /></div>\n",
		);
		write(
			root,
			"app/components/Plain.tsx",
			"import { helper } from './helper'\nexport const Plain = () => <p>{helper()}</p>\n",
		);
		write(
			root,
			"app/components/helper.ts",
			"import { Plain } from './Plain'\nexport const helper = () => 'plain'\n",
		);
		write(
			root,
			"app/routes/index.tsx",
			"import { Layout } from '../components/Layout'\nexport default function Page() { return <Layout /> }\n",
		);
		write(
			root,
			"app/routes/about.tsx",
			"import { Plain } from '/app/components/Plain'\nimport { css } from 'hono/css'\nexport default function About() { return <Plain /> }\n",
		);
		dir
	}

	#[rstest]
	fn test_transitive_island_import(project: TempDir) {
		let detector = ImportingIslands::new(project.path(), IslandPaths::default());
		let entry = project.path().join("app/routes/index.tsx");
		assert!(detector.imports_island(&entry).unwrap());
	}

	#[rstest]
	fn test_no_island_with_cycle(project: TempDir) {
		let detector = ImportingIslands::new(project.path(), IslandPaths::default());
		let entry = project.path().join("app/routes/about.tsx");
		assert!(!detector.imports_island(&entry).unwrap());
	}

	#[rstest]
	fn test_inject(project: TempDir) {
		let detector = ImportingIslands::new(project.path(), IslandPaths::default());
		let entry = project.path().join("app/routes/index.tsx");
		let source = fs::read_to_string(&entry).unwrap();

		let injected = detector.inject(&entry, &source).unwrap();
		assert_eq!(
			injected,
			format!("{source}export const __importing_islands = true;\n")
		);

		let about = project.path().join("app/routes/about.tsx");
		let about_source = fs::read_to_string(&about).unwrap();
		assert_eq!(detector.inject(&about, &about_source).unwrap(), about_source);
	}

	#[rstest]
	fn test_syntax_error_is_fatal(project: TempDir) {
		write(project.path(), "app/routes/broken.tsx", "import { from '../x'\n");
		let detector = ImportingIslands::new(project.path(), IslandPaths::default());
		let entry = project.path().join("app/routes/broken.tsx");
		assert!(matches!(
			detector.imports_island(&entry),
			Err(BuildError::Transform { .. })
		));
	}

	#[rstest]
	fn test_import_specifiers() {
		let source = "import a from './a'\nimport type { B } from \"./b\"\nexport { c } from './c'\nexport const d = 1\n";
		assert_eq!(import_specifiers(source).unwrap(), vec!["./a", "./b", "./c"]);
	}

	#[rstest]
	#[case("", "export const __importing_islands = true;\n")]
	#[case("export default 1", "export default 1\nexport const __importing_islands = true;\n")]
	fn test_inject_importing_islands(#[case] source: &str, #[case] expected: &str) {
		assert_eq!(inject_importing_islands(source), expected);
	}
}
