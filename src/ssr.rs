//! Server rendering of island markers.

pub use honox_ssr::*;
