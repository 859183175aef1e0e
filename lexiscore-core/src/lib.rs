//! Character n-gram language scoring library.
//!
//! This crate tells how likely a string is to be a word of a language:
//! - Per-language n-gram tables trained from word lists, with Laplace smoothing
//! - An on-disk cache so tables are trained once per host
//! - Scoring of a word against one language
//! - Ranking of all known languages for a word
//!
//! Every operation is synchronous; callers decide where to run them.

/// N-gram models, training, caching, scoring and ranking.
pub mod model;

/// Service configuration loaded from TOML.
pub mod config;

/// Error type shared by the crate.
pub mod error;

/// Corpus reading and path helpers.
pub mod io;

pub use config::Config;
pub use error::{LexiError, Result};
pub use model::{LanguageModel, ModelRegistry, NgramParams, rank_languages, score_word};
