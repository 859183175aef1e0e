use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the scoring core.
///
/// Only `ConfigurationMissing` and `InvalidConfiguration` are meant to stop a
/// process. Corpus and cache failures are scoped to one language and the
/// registry keeps loading the others.
#[derive(Debug, Error)]
pub enum LexiError {
	/// A required configuration key is absent.
	#[error("missing configuration key: {0}")]
	ConfigurationMissing(String),

	/// The configuration exists but cannot be parsed or holds an out-of-range value.
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),

	/// Trainer parameters out of range (`ngram_length < 2`, negative smoothing...).
	#[error("invalid n-gram parameters: {0}")]
	InvalidParameters(String),

	/// The corpus file of a language cannot be opened or read.
	#[error("corpus for '{language}' unavailable at {}: {source}", .path.display())]
	CorpusUnavailable {
		language: String,
		path: PathBuf,
		source: io::Error,
	},

	/// A freshly trained model could not be persisted.
	#[error("failed to write cached model for '{language}': {source}")]
	CacheWrite {
		language: String,
		source: io::Error,
	},

	/// Encoding a model into its cache artifact failed.
	#[error("failed to serialize model: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, LexiError>;
