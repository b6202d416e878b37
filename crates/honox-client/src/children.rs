//! Children reconstruction.
//!
//! Template children arrive as inert markup. [`Reconstructor`] turns such a
//! node list back into [`LiveNode`]s:
//!
//! - text becomes text and comments are dropped
//! - a nested island marker becomes a live component, with its own template
//!   children reconstructed first
//! - a `H:n`/`E:n` template starts a boundary, which swallows its inline
//!   fallback up to the closing comment and becomes a suspense node
//! - any other element is rebuilt generically with its attributes
//!
//! Keys are handed out in document order from a counter starting at 1.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use honox_core::props::PropValue;
use honox_core::protocol::{
	BoundaryId, DATA_HONO_TARGET, DATA_HONO_TEMPLATE, DATA_SERIALIZED_PROPS, IslandMarker,
	PLACEHOLDER_TAG, template_prop_name,
};
use tracing::{debug, warn};

use crate::dom::{Document, NodeData, NodeId};
use crate::error::{HydrationError, ReconstructError};
use crate::host::Host;
use crate::node::{BoundaryContent, ClientProps, LiveNode};
use crate::registry::IslandRegistry;

enum ChildKind {
	Text(String),
	Comment,
	Island(IslandMarker),
	Boundary(BoundaryId),
	TemplateChild(String),
	Element {
		tag: String,
		attrs: Vec<(String, String)>,
	},
}

fn classify(doc: &Document, node: NodeId) -> ChildKind {
	match doc.data(node) {
		NodeData::Text(text) => ChildKind::Text(text),
		NodeData::Element(el) => {
			if let Some(marker) = IslandMarker::from_attributes(|name| el.attr(name).map(str::to_string)) {
				return ChildKind::Island(marker);
			}
			if el.name == "template" {
				if let Some(id) = el.attr("id").and_then(|id| id.parse().ok()) {
					return ChildKind::Boundary(id);
				}
				if let Some(key) = el.attr(DATA_HONO_TEMPLATE) {
					return ChildKind::TemplateChild(key.to_string());
				}
			}
			ChildKind::Element {
				tag: el.name,
				attrs: el.attrs,
			}
		}
		NodeData::Comment(_) | NodeData::Root | NodeData::Fragment => ChildKind::Comment,
	}
}

/// Trailing `data-hono-template` children of a marker, in document order.
pub(crate) fn template_children(doc: &Document, marker: NodeId) -> Vec<(String, NodeId)> {
	let mut found = Vec::new();
	for child in doc.children(marker).into_iter().rev() {
		match doc.data(child) {
			NodeData::Element(el) if el.name == "template" => match el.attr(DATA_HONO_TEMPLATE) {
				Some(key) => found.push((key.to_string(), child)),
				None => break,
			},
			NodeData::Text(text) if text.trim().is_empty() => {}
			_ => break,
		}
	}
	found.reverse();
	found
}

/// Nodes carried by a replacement: a fragment's children, or the node itself.
fn carried_nodes(doc: &Document, node: NodeId) -> Vec<NodeId> {
	match doc.data(node) {
		NodeData::Fragment => doc.children(node),
		_ => vec![node],
	}
}

/// Rebuilds live nodes from inert markup.
///
/// Clones share the key counter and the recorded errors.
#[derive(Clone)]
pub struct Reconstructor {
	doc: Document,
	registry: IslandRegistry,
	host: Rc<dyn Host>,
	next_key: Rc<Cell<u64>>,
	errors: Rc<RefCell<Vec<ReconstructError>>>,
}

impl Reconstructor {
	pub fn new(doc: Document, registry: IslandRegistry, host: Rc<dyn Host>) -> Self {
		Self {
			doc,
			registry,
			host,
			next_key: Rc::new(Cell::new(1)),
			errors: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Errors recorded so far. Later errors, from boundaries that resolve
	/// after this call, are only logged.
	pub fn take_errors(&self) -> Vec<ReconstructError> {
		std::mem::take(&mut *self.errors.borrow_mut())
	}

	fn next_key(&self) -> u64 {
		let key = self.next_key.get();
		self.next_key.set(key + 1);
		key
	}

	fn record(&self, error: ReconstructError) {
		warn!(error = %error, "reconstruction fell back");
		self.errors.borrow_mut().push(error);
	}

	/// Reconstructs a sibling node list.
	pub fn reconstruct<'a>(&'a self, nodes: &'a [NodeId]) -> LocalBoxFuture<'a, Vec<LiveNode>> {
		async move {
			let mut out = Vec::with_capacity(nodes.len());
			let mut index = 0;
			while index < nodes.len() {
				let node = nodes[index];
				index += 1;
				match classify(&self.doc, node) {
					ChildKind::Comment => {}
					ChildKind::Text(text) => out.push(LiveNode::Text(text)),
					ChildKind::Island(marker) => out.push(self.nested_island(node, marker).await),
					ChildKind::Boundary(id) => {
						let (live, consumed) = self.boundary(id, node, &nodes[index..]).await;
						index += consumed;
						out.push(live);
					}
					ChildKind::TemplateChild(key) => {
						self.record(ReconstructError::MisplacedTemplate { key });
					}
					ChildKind::Element { tag, attrs } => {
						let key = self.next_key();
						let children = self.reconstruct(&self.doc.children(node)).await;
						out.push(self.host.create_tag(&tag, attrs, children).with_key(key));
					}
				}
			}
			out
		}
		.boxed_local()
	}

	/// Builds the live component for the island marker `node`.
	///
	/// Loads the component, decodes the serialized props and reconstructs each
	/// trailing template child into the prop it names.
	pub async fn island(&self, node: NodeId, marker: &IslandMarker) -> Result<LiveNode, HydrationError> {
		let component = self
			.registry
			.resolve(&marker.component_path, marker.export_name())
			.await?;

		let serialized = self
			.doc
			.attr(node, DATA_SERIALIZED_PROPS)
			.unwrap_or_default();
		let mut props =
			ClientProps::from_serialized(&serialized).map_err(|source| HydrationError::Decode {
				component_path: marker.component_path.clone(),
				source,
			})?;

		for (key, template) in template_children(&self.doc, node) {
			let nodes = self.reconstruct(&self.doc.children(template)).await;
			props.insert(template_prop_name(&key), PropValue::Element(nodes));
		}

		Ok(self.host.create_element(&component, props))
	}

	async fn nested_island(&self, node: NodeId, marker: IslandMarker) -> LiveNode {
		let key = self.next_key();
		match self.island(node, &marker).await {
			Ok(live) => live.with_key(key),
			Err(source) => {
				self.record(ReconstructError::Island {
					component_path: marker.component_path,
					source: Box::new(source),
				});
				// The static server render stays; its templates are dropped.
				let templates: Vec<NodeId> = template_children(&self.doc, node)
					.into_iter()
					.map(|(_, id)| id)
					.collect();
				let statics: Vec<NodeId> = self
					.doc
					.children(node)
					.into_iter()
					.filter(|child| !templates.contains(child))
					.collect();
				let children = self.reconstruct(&statics).await;
				let (tag, attrs) = match self.doc.data(node) {
					NodeData::Element(el) => (el.name, el.attrs),
					_ => (String::new(), Vec::new()),
				};
				self.host.create_tag(&tag, attrs, children).with_key(key)
			}
		}
	}

	/// Handles the boundary template `template` followed by `rest`, the rest
	/// of its sibling list. Returns the suspense node and how many nodes of
	/// `rest` belonged to the boundary.
	async fn boundary(&self, id: BoundaryId, template: NodeId, rest: &[NodeId]) -> (LiveNode, usize) {
		let key = self.next_key();
		let doc = &self.doc;

		let mut consumed = rest.len();
		let mut sentinel = None;
		for (offset, &sibling) in rest.iter().enumerate() {
			if matches!(doc.data(sibling), NodeData::Comment(_)) {
				sentinel = Some(sibling);
				consumed = offset + 1;
				break;
			}
		}
		let fallback_nodes = &rest[..consumed - usize::from(sentinel.is_some())];

		let boundary_id = id.to_string();
		let resolved = doc.query_all(doc.root(), |el| {
			el.attr(DATA_HONO_TARGET) == Some(boundary_id.as_str())
		});
		if let Some(&target) = resolved.last() {
			debug!(boundary = %id, "boundary resolved before hydration");
			let content = self.reconstruct(&doc.children(target)).await;
			let live = LiveNode::Suspense {
				boundary: id,
				fallback: content.clone(),
				content: BoundaryContent::ready(content),
				key: Some(key),
			};
			return (live, consumed);
		}

		// Park the template in a hidden placeholder so the stream can still
		// find it by id; its replacement is intercepted instead of applied.
		let placeholder = doc.create_element(PLACEHOLDER_TAG);
		doc.set_attr(placeholder, "style", "display: none");

		let (tx, rx) = oneshot::channel::<Vec<NodeId>>();
		let tx = Cell::new(Some(tx));
		doc.set_replace_hook(template, move |doc, replacement| {
			if let Some(tx) = tx.take() {
				if tx.send(carried_nodes(doc, replacement)).is_err() {
					debug!("boundary content dropped before it resolved");
				}
				doc.remove(placeholder);
			}
		});

		doc.append_child(placeholder, template);
		if let Some(sentinel) = sentinel {
			doc.append_child(placeholder, sentinel);
		}

		let mut fallback = self.reconstruct(fallback_nodes).await;

		if fallback.is_empty() && id.is_error_boundary() {
			let (error_tx, error_rx) = oneshot::channel::<Vec<NodeId>>();
			let error_tx = Cell::new(Some(error_tx));
			doc.set_insert_hook(placeholder, move |doc, node| {
				if let Some(tx) = error_tx.take() {
					if tx.send(carried_nodes(doc, node)).is_err() {
						debug!("error fallback dropped before it arrived");
					}
				}
			});
			fallback = vec![LiveNode::Suspense {
				boundary: id,
				fallback: Vec::new(),
				content: self.pending_content(error_rx),
				key: Some(self.next_key()),
			}];
		}

		doc.append_child(doc.root(), placeholder);
		debug!(boundary = %id, "boundary pending");

		let live = LiveNode::Suspense {
			boundary: id,
			fallback,
			content: self.pending_content(rx),
			key: Some(key),
		};
		(live, consumed)
	}

	/// Content that is reconstructed once `rx` delivers it. Never resolves if
	/// the sender goes away.
	fn pending_content(&self, rx: oneshot::Receiver<Vec<NodeId>>) -> BoundaryContent {
		let reconstructor = self.clone();
		BoundaryContent::new(async move {
			match rx.await {
				Ok(nodes) => reconstructor.reconstruct(&nodes).await,
				Err(_) => future::pending().await,
			}
		})
	}
}
