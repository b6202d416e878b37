//! # honox
//!
//! Island architecture for server-rendered pages.
//!
//! Most of a page is rendered on the server as static markup. Interactive
//! components, the islands, are wrapped in `<honox-island>` markers that
//! carry the component path, export name, serialized props and any element
//! props as inert templates. The client runtime finds each marker, loads its
//! component and mounts it in place, nested islands included. Content that
//! the server streams in later behind suspense or error boundaries is picked
//! up as it arrives.
//!
//! ## Feature Flags
//!
//! - `build`: TSX island transform, island discovery and importing-islands
//!   detection ([`build`])
//! - `ssr`: server rendering of island markers ([`ssr`])
//! - `client`: hydration runtime and streaming boundary reconciler ([`client`])
//! - `full` (default): all of the above
//!
//! The shared vocabulary from `honox-core` is always available at the crate
//! root.
//!
//! ## Example
//!
//! ```rust
//! use honox::is_component_name;
//! use honox::protocol::{COMPONENT_NAME, ISLAND_TAG};
//!
//! assert!(is_component_name("Counter"));
//! assert_eq!(ISLAND_TAG, "honox-island");
//! assert_eq!(COMPONENT_NAME, "component-name");
//! ```

pub use honox_core::*;

#[cfg(feature = "build")]
pub mod build;
#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "ssr")]
pub mod ssr;
