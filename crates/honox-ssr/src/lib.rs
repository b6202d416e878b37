//! Server side of the island marker protocol.
//!
//! The page renderer builds a [`View`] tree; islands appear in it as
//! [`IslandView`]s and are turned into `<honox-island>` markers when the
//! tree is rendered. [`Script`] and [`has_islands`] keep the client bootstrap
//! off pages that have no islands.
//!
//! ## Example
//!
//! ```rust
//! use honox_ssr::{IslandView, ServerProps, View};
//!
//! let badge = |props: &ServerProps| -> View {
//!     let label = props
//!         .get_value("label")
//!         .and_then(|v| v.as_str())
//!         .unwrap_or_default()
//!         .to_string();
//!     View::element("span").child(label).into()
//! };
//!
//! let html = View::from(IslandView::new("Badge.tsx", badge).prop("label", "New"))
//!     .render_to_string();
//! assert_eq!(
//!     html,
//!     "<honox-island component-name=\"Badge.tsx\" data-serialized-props=\"{&quot;label&quot;:&quot;New&quot;}\"><span>New</span></honox-island>"
//! );
//! ```

pub mod island;
pub mod script;
pub mod view;

pub use island::{IslandContext, IslandView, ServerComponent, ServerProps};
pub use script::{PageContext, Script, has_islands};
pub use view::{ElementView, IntoView, View};
