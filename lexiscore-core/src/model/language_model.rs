use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::params::NgramParams;
use super::scorer;

/// A trained character n-gram table for one language.
///
/// The `LanguageModel` maps every observed n-gram to its smoothed
/// probability and remembers the parameters it was trained with, so a word is
/// always padded and cased the same way at scoring time as during training.
///
/// # Responsibilities
/// - Hold the n-gram → probability table
/// - Expose lookups and a scoring shortcut
///
/// # Invariants
/// - Every key is exactly `params.ngram_length()` characters long
/// - Every probability is strictly positive
/// - Immutable once built (construct, then share)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageModel {
	params: NgramParams,
	probabilities: HashMap<String, f64>,
}

impl LanguageModel {
	pub(crate) fn from_parts(params: NgramParams, probabilities: HashMap<String, f64>) -> Self {
		Self { params, probabilities }
	}

	/// Parameters used to build this model.
	pub fn params(&self) -> &NgramParams {
		&self.params
	}

	/// Probability of a single n-gram, `None` if it was never observed.
	pub fn probability(&self, ngram: &str) -> Option<f64> {
		self.probabilities.get(ngram).copied()
	}

	/// Number of distinct n-grams in the table.
	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	/// All `(ngram, probability)` entries sorted by n-gram.
	///
	/// Sorting makes the serialized form independent of hash order.
	pub fn sorted_entries(&self) -> Vec<(String, f64)> {
		let mut entries: Vec<(String, f64)> =
			self.probabilities.iter().map(|(k, v)| (k.clone(), *v)).collect();
		entries.sort_by(|a, b| a.0.cmp(&b.0));
		entries
	}

	/// Scores a word against this model, see [`scorer::score_word`].
	pub fn score(&self, word: &str) -> f64 {
		scorer::score_word(word, self)
	}
}
