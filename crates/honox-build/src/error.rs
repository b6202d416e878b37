//! Build error types.

use std::path::PathBuf;

/// Error raised while parsing or rewriting a single module.
///
/// Any of these is fatal for the module being built.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
	#[error("failed to load TSX grammar: {0}")]
	Language(#[from] tree_sitter::LanguageError),

	#[error("parser produced no syntax tree")]
	ParseCancelled,

	#[error("syntax error at {line}:{column}: {snippet}")]
	Syntax {
		/// 1-based line.
		line: usize,
		/// 1-based column, in bytes.
		column: usize,
		snippet: String,
	},
}

/// Error raised by file-level build steps.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
	#[error("{path}: {source}")]
	Transform {
		path: PathBuf,
		#[source]
		source: TransformError,
	},

	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid islands config: {0}")]
	Config(#[from] toml::de::Error),

	#[error("failed to walk {path}: {source}")]
	Walk {
		path: PathBuf,
		#[source]
		source: walkdir::Error,
	},
}

impl BuildError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}

	pub(crate) fn transform(path: impl Into<PathBuf>, source: TransformError) -> Self {
		Self::Transform {
			path: path.into(),
			source,
		}
	}
}

/// Result alias for build steps.
pub type BuildResult<T> = Result<T, BuildError>;
