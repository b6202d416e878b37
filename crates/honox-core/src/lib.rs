//! Shared vocabulary for honox islands.
//!
//! An island is an interactive component embedded in otherwise static,
//! server-rendered markup. The server wraps it in a marker element that
//! carries everything the client needs to resume it; the client finds the
//! marker, decodes its props and mounts the real component in its place.
//!
//! This crate holds the pieces both sides must agree on:
//!
//! - [`naming`]: the component-name classifier used at build time
//! - [`protocol`]: the marker element and attribute vocabulary, and
//!   suspense/error boundary identifiers
//! - [`props`]: island props as a tagged union of plain data and element subtrees
//! - [`paths`]: which source files are islands and what their component path is
//! - [`manifest`]: the build-time list of islands handed to the client registry
//!
//! ## Example
//!
//! ```rust
//! use honox_core::naming::is_component_name;
//! use honox_core::protocol::BoundaryId;
//!
//! assert!(is_component_name("Badge"));
//! assert!(!is_component_name("MAX_LENGTH"));
//!
//! let id: BoundaryId = "H:3".parse().unwrap();
//! assert!(id.is_suspense());
//! ```

pub mod manifest;
pub mod naming;
pub mod paths;
pub mod props;
pub mod protocol;

pub use manifest::{IslandEntry, IslandManifest};
pub use naming::is_component_name;
pub use paths::IslandPaths;
pub use props::{DecodeError, PropValue, Props};
pub use protocol::{BoundaryId, BoundaryKind, InvalidBoundaryId, IslandMarker};
