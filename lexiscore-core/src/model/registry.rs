use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use tracing::{error, info, warn};

use super::cache::ModelCache;
use super::language_model::LanguageModel;
use super::params::NgramParams;
use super::trainer::train_corpus;
use crate::config::{Config, LanguageConfig};
use crate::error::{LexiError, Result};

/// A language that could not be loaded, and why.
#[derive(Debug)]
pub struct LoadFailure {
	pub language: String,
	pub error: LexiError,
}

/// Language code → model mapping, built once at startup.
///
/// # Responsibilities
/// - Load every configured language from the cache, or train it
/// - Keep the configured language order (used to break ranking ties)
/// - Record languages that failed without blocking the others
///
/// The registry is read-only after construction and can be shared between
/// threads without locking.
#[derive(Debug, Default)]
pub struct ModelRegistry {
	order: Vec<String>,
	models: HashMap<String, LanguageModel>,
	failures: Vec<LoadFailure>,
}

impl ModelRegistry {
	/// Loads every configured language, using the cache in `config.cache_dir`.
	///
	/// With `force_training`, cached entries are ignored and overwritten.
	pub fn load(config: &Config, force_training: bool) -> Self {
		let cache = ModelCache::new(&config.cache_dir);
		Self::load_with_cache(config, &cache, force_training)
	}

	/// Same as [`ModelRegistry::load`] with an explicit cache.
	///
	/// # Behavior
	/// - Splits the languages into one chunk per CPU.
	/// - Each worker thread loads or trains the languages of its chunk.
	/// - Results are collected over an MPSC channel and stored in configured order.
	/// - Failures are logged and kept in [`ModelRegistry::failures`].
	pub fn load_with_cache(config: &Config, cache: &ModelCache, force_training: bool) -> Self {
		let languages = &config.languages;
		info!(languages = languages.len(), force_training, cache_dir = %cache.dir().display(), "loading languages");
		if languages.is_empty() {
			return Self::default();
		}

		let start = Instant::now();
		let workers = num_cpus::get().clamp(1, languages.len());
		let chunk_size = languages.len().div_ceil(workers);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in languages.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					for language in chunk {
						let result = get_or_train(cache, language, &config.data_dir, config.params, force_training);
						if tx.send((language.code.clone(), result)).is_err() {
							break;
						}
					}
				});
			}
		});
		drop(tx);

		let mut results: HashMap<String, Result<LanguageModel>> = rx.iter().collect();
		let mut registry = Self::default();
		for language in languages {
			match results.remove(&language.code) {
				Some(Ok(model)) => registry.insert(language.code.clone(), model),
				Some(Err(e)) => {
					error!(language = %language.code, error = %e, "language not loaded");
					registry.failures.push(LoadFailure { language: language.code.clone(), error: e });
				}
				None => {}
			}
		}

		info!(
			loaded = registry.len(),
			failed = registry.failures.len(),
			elapsed = ?start.elapsed(),
			"languages loaded"
		);
		registry
	}

	/// Builds a registry from already trained models, keeping iteration order.
	///
	/// A repeated language code replaces the earlier model but keeps its position.
	pub fn from_models<I>(models: I) -> Self
	where
		I: IntoIterator<Item = (String, LanguageModel)>,
	{
		let mut registry = Self::default();
		for (language, model) in models {
			registry.insert(language, model);
		}
		registry
	}

	fn insert(&mut self, language: String, model: LanguageModel) {
		if !self.models.contains_key(&language) {
			self.order.push(language.clone());
		}
		self.models.insert(language, model);
	}

	pub fn get(&self, language: &str) -> Option<&LanguageModel> {
		self.models.get(language)
	}

	pub fn contains(&self, language: &str) -> bool {
		self.models.contains_key(language)
	}

	/// Loaded language codes in configured order.
	pub fn languages(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(String::as_str)
	}

	/// `(language, model)` pairs in configured order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageModel)> {
		self.order
			.iter()
			.filter_map(|language| self.models.get(language).map(|model| (language.as_str(), model)))
	}

	pub fn len(&self) -> usize {
		self.models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}

	/// Languages that failed to load.
	pub fn failures(&self) -> &[LoadFailure] {
		&self.failures
	}
}

/// Returns the cached model of a language, or trains and caches it.
///
/// # Behavior
/// - Without `force_training`, a compatible cache entry is returned as-is.
/// - Otherwise the corpus is trained and written back to the cache.
/// - A failed cache write is logged; the trained model is still returned.
///
/// # Errors
/// Returns `CorpusUnavailable` if training was needed and the corpus cannot be read.
pub fn get_or_train(
	cache: &ModelCache,
	language: &LanguageConfig,
	data_dir: &Path,
	params: NgramParams,
	force_training: bool,
) -> Result<LanguageModel> {
	if !force_training {
		if let Some(model) = cache.get(&language.code, &params) {
			return Ok(model);
		}
	}

	info!(language = %language.code, "training probabilities");
	let model = train_corpus(&language.code, language.corpus_path(data_dir), params)?;
	if let Err(e) = cache.put(&language.code, &model) {
		warn!(language = %language.code, error = %e, "trained model kept in memory only");
	}
	Ok(model)
}
