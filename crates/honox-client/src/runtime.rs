//! Hydration runtime.
//!
//! [`Hydrator::hydrate`] finds the island markers under a root that have not
//! been hydrated yet, flags them all before its first await, and then loads,
//! decodes, reconstructs and mounts each of them concurrently.
//!
//! The flag is what keeps repeated and overlapping passes from mounting a
//! marker twice: a marker is claimed by exactly one pass, whether that pass
//! later succeeds or fails.

use std::rc::Rc;

use futures::future::join_all;
use honox_core::protocol::{COMPONENT_NAME, DATA_HONO_HYDRATED, IslandMarker};
use tracing::{debug, warn};

use crate::children::Reconstructor;
use crate::dom::{Document, NodeId};
use crate::error::HydrationError;
use crate::host::Host;
use crate::registry::IslandRegistry;

/// Outcome of a hydration pass.
#[derive(Debug, Default)]
pub struct HydrationReport {
	/// Markers mounted by the pass.
	pub hydrated: Vec<NodeId>,
	/// Contained failures, one or more per affected marker.
	pub errors: Vec<HydrationError>,
}

impl HydrationReport {
	pub fn is_clean(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn merge(&mut self, other: HydrationReport) {
		self.hydrated.extend(other.hydrated);
		self.errors.extend(other.errors);
	}
}

/// Hydrates island markers in a document.
#[derive(Clone)]
pub struct Hydrator {
	doc: Document,
	registry: IslandRegistry,
	host: Rc<dyn Host>,
}

impl Hydrator {
	pub fn new(doc: Document, registry: IslandRegistry, host: Rc<dyn Host>) -> Self {
		Self {
			doc,
			registry,
			host,
		}
	}

	pub fn document(&self) -> &Document {
		&self.doc
	}

	pub fn registry(&self) -> &IslandRegistry {
		&self.registry
	}

	/// Unhydrated markers under `root` for every registered component path.
	fn unhydrated_markers(&self, root: NodeId) -> Vec<(NodeId, IslandMarker)> {
		let mut markers = Vec::new();
		for path in self.registry.paths() {
			let nodes = self.doc.query_all(root, |el| {
				el.attr(COMPONENT_NAME) == Some(path) && !el.has_attr(DATA_HONO_HYDRATED)
			});
			for node in nodes {
				if let Some(marker) = IslandMarker::from_attributes(|name| self.doc.attr(node, name)) {
					markers.push((node, marker));
				}
			}
		}
		markers
	}

	/// Hydrates every unhydrated marker under `root`.
	///
	/// Never fails as a whole: per-marker failures are logged and returned in
	/// the report, and the marker keeps its server-rendered content.
	pub async fn hydrate(&self, root: NodeId) -> HydrationReport {
		let markers = self.unhydrated_markers(root);
		if markers.is_empty() {
			return HydrationReport::default();
		}

		for (node, _) in &markers {
			self.doc.set_attr(*node, DATA_HONO_HYDRATED, "true");
		}
		debug!(markers = markers.len(), "hydrating islands");

		let outcomes = join_all(
			markers
				.into_iter()
				.map(|(node, marker)| self.hydrate_marker(node, marker)),
		)
		.await;

		let mut report = HydrationReport::default();
		for (mounted, errors) in outcomes {
			report.hydrated.extend(mounted);
			report.errors.extend(errors);
		}
		debug!(
			hydrated = report.hydrated.len(),
			errors = report.errors.len(),
			"hydration pass finished"
		);
		report
	}

	/// Hydrates the whole document.
	pub async fn hydrate_document(&self) -> HydrationReport {
		self.hydrate(self.doc.root()).await
	}

	async fn hydrate_marker(
		&self,
		node: NodeId,
		marker: IslandMarker,
	) -> (Option<NodeId>, Vec<HydrationError>) {
		let reconstructor =
			Reconstructor::new(self.doc.clone(), self.registry.clone(), self.host.clone());
		let result = self.mount_island(&reconstructor, node, &marker).await;

		let mut errors: Vec<HydrationError> = reconstructor
			.take_errors()
			.into_iter()
			.map(HydrationError::from)
			.collect();

		match result {
			Ok(()) => {
				debug!(component_path = %marker.component_path, export = marker.export_name(), "island mounted");
				(Some(node), errors)
			}
			Err(error) => {
				warn!(
					component_path = %marker.component_path,
					error = %error,
					"island left unhydrated"
				);
				errors.push(error);
				(None, errors)
			}
		}
	}

	async fn mount_island(
		&self,
		reconstructor: &Reconstructor,
		node: NodeId,
		marker: &IslandMarker,
	) -> Result<(), HydrationError> {
		let live = reconstructor.island(node, marker).await?;
		self.host
			.mount(live, node, &self.doc)
			.await
			.map_err(|source| HydrationError::Mount {
				component_path: marker.component_path.clone(),
				source,
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::{Component, IslandModule};
	use crate::error::LoadError;
	use crate::host::StaticHost;
	use crate::node::LiveNode;
	use rstest::rstest;

	fn hydrator(doc: &Document) -> Hydrator {
		let hello = Component::new("Hello", |_| vec![LiveNode::tag("p", vec![LiveNode::text("live")])]);
		let registry = IslandRegistry::new()
			.with_module("/islands/Hello.tsx", IslandModule::new().with_default(hello))
			.with("/islands/Broken.tsx", || async {
				Err(LoadError::failed("/islands/Broken.tsx", "boom"))
			});
		Hydrator::new(doc.clone(), registry, Rc::new(StaticHost))
	}

	#[rstest]
	#[tokio::test]
	async fn test_hydrate_flags_and_mounts() {
		let doc = Document::parse(
			r#"<div><honox-island component-name="/islands/Hello.tsx"><p>static</p></honox-island></div><honox-island component-name="/islands/Unknown.tsx"><p>untouched</p></honox-island>"#,
		);
		let hydrator = hydrator(&doc);

		let report = hydrator.hydrate_document().await;

		assert_eq!(report.hydrated.len(), 1);
		assert!(report.is_clean());
		let island = report.hydrated[0];
		assert_eq!(doc.attr(island, DATA_HONO_HYDRATED).as_deref(), Some("true"));
		assert_eq!(doc.inner_html(island), "<p>live</p>");
		assert!(doc.html().contains("<p>untouched</p>"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_second_pass_is_a_no_op() {
		let doc = Document::parse(r#"<honox-island component-name="/islands/Hello.tsx"></honox-island>"#);
		let hydrator = hydrator(&doc);

		let first = hydrator.hydrate_document().await;
		let second = hydrator.hydrate_document().await;

		assert_eq!(first.hydrated.len(), 1);
		assert!(second.hydrated.is_empty());
		assert!(second.is_clean());
	}

	#[rstest]
	#[case(r#"<honox-island component-name="/islands/Broken.tsx"><p>static</p></honox-island>"#, "failed to load")]
	#[case(r#"<honox-island component-name="/islands/Hello.tsx" data-serialized-props="{oops"><p>static</p></honox-island>"#, "invalid props")]
	#[case(r#"<honox-island component-name="/islands/Hello.tsx" component-export="Named"><p>static</p></honox-island>"#, "no export named Named")]
	#[tokio::test]
	async fn test_failures_keep_static_content(#[case] markup: &str, #[case] message: &str) {
		let doc = Document::parse(markup);
		let hydrator = hydrator(&doc);

		let report = hydrator.hydrate_document().await;

		assert!(report.hydrated.is_empty());
		assert_eq!(report.errors.len(), 1);
		assert!(report.errors[0].to_string().contains(message), "{}", report.errors[0]);
		assert!(doc.html().contains("<p>static</p>"));
	}
}
