//! Client runtime errors.
//!
//! None of these abort a hydration pass. They are logged, collected into a
//! [`HydrationReport`](crate::runtime::HydrationReport) and the pass moves on
//! to the next marker.

use honox_core::props::DecodeError;

/// An island module or export could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
	#[error("no island registered for {component_path}")]
	NotRegistered { component_path: String },

	#[error("island {component_path} has no export named {export}")]
	MissingExport {
		component_path: String,
		export: String,
	},

	#[error("failed to load island {component_path}: {message}")]
	Failed {
		component_path: String,
		message: String,
	},
}

impl LoadError {
	/// A loader failure for `component_path`.
	pub fn failed(component_path: impl Into<String>, message: impl Into<String>) -> Self {
		LoadError::Failed {
			component_path: component_path.into(),
			message: message.into(),
		}
	}
}

/// The host could not mount a live node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mount failed: {0}")]
pub struct MountError(pub String);

impl MountError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// A subtree inside template children could not be reconstructed as written.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReconstructError {
	/// A nested island failed; it was rebuilt from its static markup instead.
	#[error("nested island {component_path} degraded to static markup")]
	Island {
		component_path: String,
		#[source]
		source: Box<HydrationError>,
	},

	/// A `data-hono-template` child outside the trailing templates of a marker.
	#[error("template for prop {key:?} is not a trailing child of an island")]
	MisplacedTemplate { key: String },
}

/// Per-marker hydration failure.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HydrationError {
	#[error("invalid props for island {component_path}")]
	Decode {
		component_path: String,
		#[source]
		source: DecodeError,
	},

	#[error(transparent)]
	Load(#[from] LoadError),

	#[error("could not mount island {component_path}")]
	Mount {
		component_path: String,
		#[source]
		source: MountError,
	},

	#[error(transparent)]
	Reconstruct(#[from] ReconstructError),
}

impl HydrationError {
	/// Component path of the island the error belongs to, if known.
	pub fn component_path(&self) -> Option<&str> {
		match self {
			HydrationError::Decode { component_path, .. }
			| HydrationError::Mount { component_path, .. } => Some(component_path),
			HydrationError::Load(
				LoadError::NotRegistered { component_path }
				| LoadError::MissingExport { component_path, .. }
				| LoadError::Failed { component_path, .. },
			) => Some(component_path),
			HydrationError::Reconstruct(ReconstructError::Island { component_path, .. }) => {
				Some(component_path)
			}
			HydrationError::Reconstruct(ReconstructError::MisplacedTemplate { .. }) => None,
		}
	}
}
