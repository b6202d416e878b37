//! Streaming boundary reconciler.
//!
//! Boundaries still pending in the live document when the client starts are
//! resolved later by the server stream, which replaces each placeholder
//! template in place. The reconciler observes the parents of those
//! templates with one shared observer. The observer only enqueues; a
//! dedicated task drains the queue, re-hydrates every mutated parent and
//! drops boundaries whose template was removed. Once no boundary is pending
//! the observer is disconnected.
//!
//! A boundary that never resolves keeps the reconciler armed forever. That
//! is a valid steady state, not an error.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use honox_core::protocol::BoundaryId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::dom::{Document, MutationRecord, NodeId, ObserverId};
use crate::runtime::{HydrationReport, Hydrator};

/// Default capacity of the mutation queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Live boundary placeholder templates, in document order.
pub fn pending_boundaries(doc: &Document) -> Vec<NodeId> {
	doc.query_all(doc.root(), |el| {
		el.name == "template"
			&& el
				.attr("id")
				.is_some_and(|id| id.parse::<BoundaryId>().is_ok())
	})
}

/// Re-hydrates subtrees as pending boundaries resolve.
pub struct Reconciler {
	hydrator: Hydrator,
	observer: ObserverId,
	events: mpsc::Receiver<Vec<MutationRecord>>,
	pending: BTreeSet<String>,
	overflowed: Rc<Cell<bool>>,
}

impl Reconciler {
	/// Starts observing the parents of every pending boundary.
	///
	/// Returns `None` when nothing is pending. When the queue of `capacity`
	/// batches is full, further batches are dropped and the next drained
	/// batch re-hydrates the whole document instead.
	pub fn arm(hydrator: Hydrator, capacity: usize) -> Option<Self> {
		let doc = hydrator.document().clone();

		let mut pending = BTreeSet::new();
		let mut targets = BTreeSet::new();
		for template in pending_boundaries(&doc) {
			if let (Some(parent), Some(id)) = (doc.parent(template), doc.attr(template, "id")) {
				pending.insert(id);
				targets.insert(parent);
			}
		}
		if targets.is_empty() {
			return None;
		}

		let (tx, events) = mpsc::channel(capacity.max(1));
		let overflowed = Rc::new(Cell::new(false));
		let flag = overflowed.clone();
		let observer = doc.observe(targets.iter().copied(), move |_, records| {
			match tx.try_send(records.to_vec()) {
				Ok(()) => {}
				Err(TrySendError::Full(_)) => flag.set(true),
				Err(TrySendError::Closed(_)) => {}
			}
		});

		debug!(
			boundaries = pending.len(),
			targets = targets.len(),
			"boundary reconciler armed"
		);
		Some(Self {
			hydrator,
			observer,
			events,
			pending,
			overflowed,
		})
	}

	/// Ids of the boundaries still pending.
	pub fn pending(&self) -> impl Iterator<Item = &str> {
		self.pending.iter().map(String::as_str)
	}

	pub fn is_settled(&self) -> bool {
		self.pending.is_empty()
	}

	fn document(&self) -> &Document {
		self.hydrator.document()
	}

	/// Waits for the next batch of mutations and reconciles it.
	///
	/// Returns `None` once settled.
	pub async fn next_batch(&mut self) -> Option<HydrationReport> {
		if self.is_settled() {
			return None;
		}
		let mut records = self.events.recv().await?;
		while let Ok(more) = self.events.try_recv() {
			records.extend(more);
		}

		let doc = self.document().clone();
		let mut targets = BTreeSet::new();
		for record in &records {
			targets.insert(record.target);
			for &removed in &record.removed {
				if let Some(id) = doc.attr(removed, "id") {
					if self.pending.remove(&id) {
						debug!(boundary = %id, "boundary resolved");
					}
				}
			}
		}

		if self.overflowed.replace(false) {
			warn!("mutation queue overflowed; re-hydrating the whole document");
			self.pending
				.retain(|id| doc.get_element_by_id(id).is_some());
			targets = BTreeSet::from([doc.root()]);
		}

		let mut report = HydrationReport::default();
		for target in targets {
			report.merge(self.hydrator.hydrate(target).await);
		}

		if self.is_settled() {
			doc.disconnect(self.observer);
			debug!("boundary reconciler disconnected");
		}
		Some(report)
	}

	/// Reconciles until every boundary has resolved.
	///
	/// Does not return while a boundary stays pending.
	pub async fn run(mut self) -> HydrationReport {
		let mut report = HydrationReport::default();
		while let Some(batch) = self.next_batch().await {
			report.merge(batch);
		}
		report
	}
}

impl Drop for Reconciler {
	fn drop(&mut self) {
		self.hydrator.document().disconnect(self.observer);
	}
}
