//! Client bootstrap.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::info;

use crate::dom::Document;
use crate::host::{Host, StaticHost};
use crate::registry::IslandRegistry;
use crate::runtime::{HydrationReport, Hydrator};
use crate::suspense::{DEFAULT_QUEUE_CAPACITY, Reconciler};

/// Replaces the default hydration trigger.
pub type Trigger = Rc<dyn Fn(Hydrator) -> LocalBoxFuture<'static, HydrationReport>>;

/// Client configuration.
#[derive(Clone)]
pub struct ClientOptions {
	registry: IslandRegistry,
	host: Rc<dyn Host>,
	queue_capacity: usize,
	trigger: Option<Trigger>,
}

impl fmt::Debug for ClientOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientOptions")
			.field("registry", &self.registry)
			.field("queue_capacity", &self.queue_capacity)
			.field("trigger", &self.trigger.is_some())
			.finish_non_exhaustive()
	}
}

impl ClientOptions {
	/// Options with a [`StaticHost`] and the default queue capacity.
	pub fn new(registry: IslandRegistry) -> Self {
		Self {
			registry,
			host: Rc::new(StaticHost),
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
			trigger: None,
		}
	}

	pub fn with_host(mut self, host: Rc<dyn Host>) -> Self {
		self.host = host;
		self
	}

	/// Capacity of the reconciler's mutation queue.
	pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
		self.queue_capacity = capacity;
		self
	}

	/// Runs `trigger` instead of the default start sequence.
	pub fn with_trigger<F, Fut>(mut self, trigger: F) -> Self
	where
		F: Fn(Hydrator) -> Fut + 'static,
		Fut: Future<Output = HydrationReport> + 'static,
	{
		self.trigger = Some(Rc::new(move |hydrator| trigger(hydrator).boxed_local()));
		self
	}
}

/// Result of [`Client::start`].
pub struct Started {
	/// The initial hydration pass.
	pub report: HydrationReport,
	/// Set when boundaries were pending at start. The caller drives it.
	pub reconciler: Option<Reconciler>,
}

/// Hydrates a document.
pub struct Client {
	doc: Document,
	options: ClientOptions,
}

impl Client {
	pub fn new(doc: Document, options: ClientOptions) -> Self {
		Self { doc, options }
	}

	pub fn document(&self) -> &Document {
		&self.doc
	}

	pub fn hydrator(&self) -> Hydrator {
		Hydrator::new(
			self.doc.clone(),
			self.options.registry.clone(),
			self.options.host.clone(),
		)
	}

	/// Arms the reconciler if boundaries are pending, then hydrates the
	/// document. A configured trigger replaces both steps.
	pub async fn start(&self) -> Started {
		let hydrator = self.hydrator();

		if let Some(trigger) = &self.options.trigger {
			return Started {
				report: trigger(hydrator).await,
				reconciler: None,
			};
		}

		let reconciler = Reconciler::arm(hydrator.clone(), self.options.queue_capacity);
		let report = hydrator.hydrate_document().await;
		info!(
			hydrated = report.hydrated.len(),
			errors = report.errors.len(),
			pending_boundaries = reconciler.as_ref().map_or(0, |r| r.pending().count()),
			"client started"
		);
		Started { report, reconciler }
	}
}
