//! Client hydration runtime.
//!
//! Single-threaded: document handles are `Rc`-based and every future is
//! local, so drive it from a current-thread executor or a `LocalSet`.

pub use honox_client::*;
