use std::path::Path;
use std::time::Instant;

use tracing::info;

use super::counter::NGramCounter;
use super::language_model::LanguageModel;
use super::params::NgramParams;
use crate::error::{LexiError, Result};
use crate::io::read_corpus;

/// Trains a language model from an in-memory sequence of words.
///
/// Each word is cased, padded with `ngram_length - 1` boundary markers and
/// windowed. An empty sequence yields an empty model.
pub fn train<I, S>(words: I, params: NgramParams) -> LanguageModel
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut counter = NGramCounter::new(params);
	for word in words {
		counter.add_word(word.as_ref());
	}
	LanguageModel::from_parts(params, counter.into_probabilities())
}

/// Trains a language model by streaming a corpus file.
///
/// # Errors
/// Returns `CorpusUnavailable` if the file cannot be opened or a line cannot
/// be read (I/O failure, invalid UTF-8). No partial model is returned.
pub fn train_corpus<P: AsRef<Path>>(language: &str, corpus_file: P, params: NgramParams) -> Result<LanguageModel> {
	let path = corpus_file.as_ref();
	let unavailable = |source| LexiError::CorpusUnavailable {
		language: language.to_owned(),
		path: path.to_path_buf(),
		source,
	};

	let start = Instant::now();
	let corpus = read_corpus(path).map_err(unavailable)?;

	let mut counter = NGramCounter::new(params);
	for word in corpus {
		counter.add_word(&word.map_err(unavailable)?);
	}

	info!(
		language,
		smoothing_k = params.smoothing_k(),
		total_count = counter.total(),
		distinct = counter.distinct(),
		elapsed = ?start.elapsed(),
		"trained n-gram probabilities"
	);
	Ok(LanguageModel::from_parts(params, counter.into_probabilities()))
}
