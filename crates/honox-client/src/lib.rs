//! Client runtime for honox islands.
//!
//! Finds the island markers the server rendered, loads each island's
//! component, decodes its props, rebuilds its template children and hands
//! the result to a [`Host`] to mount. Content streamed in later by suspense
//! and error boundaries is picked up by the [`Reconciler`].
//!
//! Everything here is single-threaded: handles are `Rc`-based and futures are
//! local.
//!
//! ## Example
//!
//! ```rust
//! use honox_client::{Client, ClientOptions, Component, Document, IslandModule, IslandRegistry, LiveNode};
//!
//! let doc = Document::parse(
//!     r#"<honox-island component-name="/islands/Counter.tsx" data-serialized-props="{&quot;count&quot;:1}"><p>1</p></honox-island>"#,
//! );
//! let counter = Component::new("Counter", |props| {
//!     let count = props
//!         .get_value("count")
//!         .map(|v| v.to_string())
//!         .unwrap_or_default();
//!     vec![LiveNode::tag("button", vec![LiveNode::text(count)])]
//! });
//! let registry = IslandRegistry::new()
//!     .with_module("/islands/Counter.tsx", IslandModule::new().with_default(counter));
//!
//! let client = Client::new(doc.clone(), ClientOptions::new(registry));
//! let started = futures::executor::block_on(client.start());
//!
//! assert_eq!(started.report.hydrated.len(), 1);
//! assert!(started.reconciler.is_none());
//! assert_eq!(doc.inner_html(started.report.hydrated[0]), "<button>1</button>");
//! ```

pub mod children;
pub mod client;
pub mod component;
pub mod dom;
pub mod error;
pub mod host;
pub mod node;
pub mod registry;
pub mod runtime;
pub mod stream;
pub mod suspense;

pub use children::Reconstructor;
pub use client::{Client, ClientOptions, Started, Trigger};
pub use component::{Component, IslandModule};
pub use dom::{Document, MutationRecord, NodeId};
pub use error::{HydrationError, LoadError, MountError, ReconstructError};
pub use host::{Host, StaticHost};
pub use node::{BoundaryContent, ClientProps, LiveNode};
pub use registry::{IslandRegistry, Loader};
pub use runtime::{HydrationReport, Hydrator};
pub use suspense::{DEFAULT_QUEUE_CAPACITY, Reconciler};
