//! Build-time island tooling.
//!
//! Rewrites island modules, discovers islands under the app directory and
//! flags the routes that reach one.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use honox::build::{IslandsConfig, discover_islands};
//!
//! let config = IslandsConfig::default();
//! let manifest = discover_islands(Path::new("."), &config).unwrap();
//! println!("{}", manifest.to_json().unwrap());
//! ```

pub use honox_build::*;
