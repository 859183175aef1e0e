use tracing::debug;

use super::language_model::LanguageModel;
use super::params::OOV_PROBABILITY;

/// Probability that `word` belongs to the language of `model`.
///
/// The word is padded and cased with the model's own parameters, then each
/// window is looked up (unseen windows get [`OOV_PROBABILITY`]). The result is
/// the geometric mean of the window probabilities:
///
/// `(p_1 * p_2 * ... * p_w) ^ (1 / w)` with `w = len(padded) - (n - 1)`, floored at 1.
///
/// Logarithms are summed instead of multiplying raw probabilities, so long
/// unknown words stay above zero instead of underflowing.
///
/// The score lies in `(0, 1]` and only compares across languages for the same word.
pub fn score_word(word: &str, model: &LanguageModel) -> f64 {
	let params = model.params();
	let padded = params.prepare(word);
	let window_count = params.window_count(padded.len());

	let mut log_sum = 0.0;
	for window in padded.windows(params.ngram_length()) {
		let ngram: String = window.iter().collect();
		let p = model.probability(&ngram).unwrap_or(OOV_PROBABILITY);
		debug!(%ngram, p, "window probability");
		log_sum += p.ln();
	}

	let score = (log_sum / window_count as f64).exp();
	debug!(word, score, window_count, "scored word");
	score.min(1.0)
}
