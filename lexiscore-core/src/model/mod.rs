//! Top-level module for the n-gram language models.
//!
//! This module provides the whole scoring pipeline:
//! - Training parameters and the padding/casing transform (`NgramParams`)
//! - Corpus training (`trainer`) into a `LanguageModel`
//! - Persistence of trained models (`ModelCache`)
//! - Cache-or-train orchestration for all languages (`ModelRegistry`)
//! - Word scoring (`scorer`) and language ranking (`ranker`)

/// Training parameters, boundary marker and out-of-vocabulary floor.
pub mod params;

/// Trained n-gram → probability table of one language.
pub mod language_model;

/// Corpus-driven training with additive smoothing.
pub mod trainer;

/// Geometric-mean scoring of a word against one model.
pub mod scorer;

/// Multi-language ranking with hyphen handling.
pub mod ranker;

/// On-disk model cache, one artifact per language.
pub mod cache;

/// Language registry built once at startup.
///
/// Loads or trains every configured language in parallel.
pub mod registry;

/// Internal occurrence counter used by the trainer.
///
/// Not exposed
mod counter;

pub use cache::ModelCache;
pub use language_model::LanguageModel;
pub use params::NgramParams;
pub use ranker::rank_languages;
pub use registry::{LoadFailure, ModelRegistry};
pub use scorer::score_word;
