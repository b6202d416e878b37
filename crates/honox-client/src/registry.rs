//! Island loader registry.
//!
//! Maps component paths to asynchronous loaders. Each loader runs at most
//! once; concurrent and later lookups share its result, including a failure.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use honox_core::manifest::{IslandEntry, IslandManifest};
use tracing::debug;

use crate::component::{Component, IslandModule};
use crate::error::LoadError;

pub type LoadFuture = LocalBoxFuture<'static, Result<IslandModule, LoadError>>;

/// Loads an island module.
pub type Loader = Rc<dyn Fn() -> LoadFuture>;

struct Entry {
	loader: Loader,
	loaded: RefCell<Option<Shared<LoadFuture>>>,
}

impl Entry {
	fn load(&self) -> Shared<LoadFuture> {
		self.loaded
			.borrow_mut()
			.get_or_insert_with(|| (self.loader)().shared())
			.clone()
	}
}

/// Registry of island loaders, keyed by component path.
///
/// Cloning is cheap and clones share memoized loads.
#[derive(Clone, Default)]
pub struct IslandRegistry {
	entries: BTreeMap<String, Rc<Entry>>,
}

impl fmt::Debug for IslandRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.entries.keys()).finish()
	}
}

impl IslandRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from the build manifest, asking `loader_for` for the
	/// loader of each entry.
	pub fn from_manifest<F>(manifest: &IslandManifest, loader_for: F) -> Self
	where
		F: Fn(&IslandEntry) -> Loader,
	{
		let mut registry = Self::new();
		for entry in &manifest.islands {
			registry.insert(entry.component_path.clone(), loader_for(entry));
		}
		registry
	}

	/// Registers `loader` for `component_path`, replacing any previous one.
	pub fn register<F, Fut>(&mut self, component_path: impl Into<String>, loader: F)
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = Result<IslandModule, LoadError>> + 'static,
	{
		self.insert(component_path.into(), Rc::new(move || loader().boxed_local()));
	}

	/// Builder form of [`IslandRegistry::register`].
	pub fn with<F, Fut>(mut self, component_path: impl Into<String>, loader: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = Result<IslandModule, LoadError>> + 'static,
	{
		self.register(component_path, loader);
		self
	}

	/// Registers a module that is already in memory.
	pub fn with_module(self, component_path: impl Into<String>, module: IslandModule) -> Self {
		self.with(component_path, move || futures::future::ready(Ok(module.clone())))
	}

	fn insert(&mut self, component_path: String, loader: Loader) {
		self.entries.insert(
			component_path,
			Rc::new(Entry {
				loader,
				loaded: RefCell::new(None),
			}),
		);
	}

	/// Registered component paths, in order.
	pub fn paths(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn contains(&self, component_path: &str) -> bool {
		self.entries.contains_key(component_path)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Loads the module for `component_path`.
	pub async fn load(&self, component_path: &str) -> Result<IslandModule, LoadError> {
		let entry = self
			.entries
			.get(component_path)
			.ok_or_else(|| LoadError::NotRegistered {
				component_path: component_path.to_string(),
			})?;
		debug!(component_path, "loading island module");
		entry.load().await
	}

	/// Loads `component_path` and picks `export` from it.
	pub async fn resolve(&self, component_path: &str, export: &str) -> Result<Component, LoadError> {
		let module = self.load(component_path).await?;
		module
			.get(export)
			.cloned()
			.ok_or_else(|| LoadError::MissingExport {
				component_path: component_path.to_string(),
				export: export.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	fn counter() -> Component {
		Component::new("Counter", |_| Vec::new())
	}

	#[tokio::test]
	async fn test_loader_runs_once() {
		let calls = Rc::new(Cell::new(0));
		let seen = calls.clone();
		let registry = IslandRegistry::new().with("/islands/Counter.tsx", move || {
			seen.set(seen.get() + 1);
			async { Ok(IslandModule::new().with_default(counter())) }
		});

		let (a, b) = futures::join!(
			registry.resolve("/islands/Counter.tsx", "default"),
			registry.resolve("/islands/Counter.tsx", "default"),
		);
		assert_eq!(a.unwrap().name(), "Counter");
		assert_eq!(b.unwrap().name(), "Counter");
		registry.load("/islands/Counter.tsx").await.unwrap();

		assert_eq!(calls.get(), 1);
	}

	#[tokio::test]
	async fn test_failure_is_shared() {
		let calls = Rc::new(Cell::new(0));
		let seen = calls.clone();
		let registry = IslandRegistry::new().with("/islands/Broken.tsx", move || {
			seen.set(seen.get() + 1);
			async { Err(LoadError::failed("/islands/Broken.tsx", "syntax error")) }
		});

		for _ in 0..2 {
			let err = registry.load("/islands/Broken.tsx").await.unwrap_err();
			assert!(matches!(err, LoadError::Failed { .. }));
		}
		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	#[case("/islands/Missing.tsx", "default", "no island registered")]
	#[case("/islands/Counter.tsx", "Named", "has no export named Named")]
	#[tokio::test]
	async fn test_resolve_errors(
		#[case] path: &str,
		#[case] export: &str,
		#[case] message: &str,
	) {
		let registry = IslandRegistry::new()
			.with_module("/islands/Counter.tsx", IslandModule::new().with_default(counter()));

		let err = registry.resolve(path, export).await.unwrap_err();
		assert!(err.to_string().contains(message), "{err}");
	}

	#[rstest]
	fn test_from_manifest() {
		let manifest = IslandManifest::new(vec![
			IslandEntry::new("/islands/b.tsx").with_export("default"),
			IslandEntry::new("/islands/a.tsx").with_export("A"),
		]);
		let registry = IslandRegistry::from_manifest(&manifest, |_| -> Loader {
			Rc::new(|| futures::future::ready(Ok::<_, LoadError>(IslandModule::new())).boxed_local())
		});

		assert_eq!(
			registry.paths().collect::<Vec<_>>(),
			vec!["/islands/a.tsx", "/islands/b.tsx"]
		);
	}
}
