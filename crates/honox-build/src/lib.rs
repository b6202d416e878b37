//! Build-time island tooling.
//!
//! - [`transform`]: rewrites island modules so each component export renders
//!   an island marker on the server and the bare component on the client
//! - [`importing`]: flags route modules that reach an island, so the page
//!   knows to emit the client bootstrap script
//! - [`discovery`]: scans the app for islands and produces the manifest the
//!   client registry is built from
//! - [`config`]: directory layout and import sources
//!
//! Every step parses TSX with tree-sitter. A module that fails to parse is a
//! hard error for that module; nothing is skipped silently.
//!
//! ## Example
//!
//! ```rust
//! use honox_build::transform::IslandTransformer;
//!
//! let source = "export const MAX = 10;";
//! let output = IslandTransformer::new().transform(source, "Badge.tsx").unwrap();
//! assert_eq!(output, source);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod importing;
mod parser;
pub mod transform;

pub use config::IslandsConfig;
pub use discovery::discover_islands;
pub use error::{BuildError, BuildResult, TransformError};
pub use importing::{FsResolver, ImportingIslands, ModuleResolver, inject_importing_islands};
pub use transform::{IslandTransformer, transform_jsx_tags};
