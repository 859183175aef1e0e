use std::collections::HashMap;

use super::params::NgramParams;

/// Occurrence counts accumulated while reading a corpus.
///
/// ## Responsibilities:
/// - Pad each word and count every window of `ngram_length` characters
/// - Track the total number of windows seen
/// - Turn the counts into Laplace-smoothed probabilities
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - `total` is the sum of all counts
#[derive(Clone, Debug)]
pub(crate) struct NGramCounter {
	params: NgramParams,
	counts: HashMap<String, usize>,
	total: usize,
}

impl NGramCounter {
	pub(crate) fn new(params: NgramParams) -> Self {
		Self { params, counts: HashMap::new(), total: 0 }
	}

	/// Counts every window of a padded word.
	pub(crate) fn add_word(&mut self, word: &str) {
		let padded = self.params.prepare(word);
		for window in padded.windows(self.params.ngram_length()) {
			let ngram: String = window.iter().collect();
			*self.counts.entry(ngram).or_insert(0) += 1;
			self.total += 1;
		}
	}

	pub(crate) fn total(&self) -> usize {
		self.total
	}

	pub(crate) fn distinct(&self) -> usize {
		self.counts.len()
	}

	/// Smoothed probability of every observed n-gram.
	///
	/// `(count + k) / (total + k * distinct)`, where `distinct` is the observed
	/// vocabulary size. The result does not sum to 1.
	pub(crate) fn into_probabilities(self) -> HashMap<String, f64> {
		let k = self.params.smoothing_k();
		let denominator = self.total as f64 + k * self.counts.len() as f64;
		self.counts
			.into_iter()
			.map(|(ngram, count)| (ngram, (count as f64 + k) / denominator))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_padded_windows() {
		let mut counter = NGramCounter::new(NgramParams::default());
		counter.add_word("ab");
		// $$$a $$ab $ab$ ab$$ b$$$
		assert_eq!(counter.total(), 5);
		assert_eq!(counter.distinct(), 5);

		counter.add_word("ab");
		assert_eq!(counter.total(), 10);
		assert_eq!(counter.distinct(), 5);
	}

	#[test]
	fn empty_word_still_yields_boundary_windows() {
		let mut counter = NGramCounter::new(NgramParams::default());
		counter.add_word("");
		// "$$$$$$" has 3 windows, all "$$$$"
		assert_eq!(counter.total(), 3);
		assert_eq!(counter.distinct(), 1);
	}

	#[test]
	fn laplace_smoothing_uses_observed_vocabulary() {
		let params = NgramParams::new(2, true, 1.0).unwrap();
		let mut counter = NGramCounter::new(params);
		counter.add_word("aa");
		// "$aa$": "$a", "aa", "a$" → total 3, distinct 3
		let probs = counter.into_probabilities();
		let expected = (1.0 + 1.0) / (3.0 + 1.0 * 3.0);
		assert_eq!(probs["aa"], expected);
		assert_eq!(probs.len(), 3);
	}

	#[test]
	fn zero_smoothing_is_relative_frequency() {
		let params = NgramParams::new(2, true, 0.0).unwrap();
		let mut counter = NGramCounter::new(params);
		counter.add_word("ab");
		counter.add_word("ac");
		let probs = counter.into_probabilities();
		assert_eq!(probs["$a"], 2.0 / 6.0);
		assert_eq!(probs["b$"], 1.0 / 6.0);
	}
}
