use serde::{Deserialize, Serialize};

use crate::error::{LexiError, Result};

/// Sentinel padded around every word before windowing.
pub const BOUNDARY_MARKER: char = '$';

/// Probability substituted for any n-gram absent from a model.
pub const OOV_PROBABILITY: f64 = 1e-20;

/// Training parameters of a language model.
///
/// The same parameters drive padding and casing at scoring time, so they are
/// stored inside every `LanguageModel` and every cache artifact.
///
/// # Invariants
/// - `ngram_length` is always >= 2
/// - `smoothing_k` is finite and >= 0
///
/// Deserialization goes through [`NgramParams::new`], so decoded values hold
/// the same invariants.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "UncheckedParams")]
pub struct NgramParams {
	ngram_length: usize,
	lowercase: bool,
	smoothing_k: f64,
}

/// Wire form of `NgramParams` before validation.
#[derive(Deserialize)]
struct UncheckedParams {
	ngram_length: usize,
	lowercase: bool,
	smoothing_k: f64,
}

impl TryFrom<UncheckedParams> for NgramParams {
	type Error = LexiError;

	fn try_from(raw: UncheckedParams) -> Result<Self> {
		Self::new(raw.ngram_length, raw.lowercase, raw.smoothing_k)
	}
}

impl Default for NgramParams {
	fn default() -> Self {
		Self { ngram_length: 4, lowercase: true, smoothing_k: 100.0 }
	}
}

impl NgramParams {
	/// Creates a validated parameter set.
	///
	/// # Errors
	/// Returns `InvalidParameters` if `ngram_length < 2` or if `smoothing_k`
	/// is negative or not finite.
	pub fn new(ngram_length: usize, lowercase: bool, smoothing_k: f64) -> Result<Self> {
		if ngram_length < 2 {
			return Err(LexiError::InvalidParameters(format!("ngram_length must be >= 2, got {ngram_length}")));
		}
		if !smoothing_k.is_finite() || smoothing_k < 0.0 {
			return Err(LexiError::InvalidParameters(format!("smoothing_k must be finite and >= 0, got {smoothing_k}")));
		}
		Ok(Self { ngram_length, lowercase, smoothing_k })
	}

	pub fn ngram_length(&self) -> usize {
		self.ngram_length
	}

	pub fn lowercase(&self) -> bool {
		self.lowercase
	}

	pub fn smoothing_k(&self) -> f64 {
		self.smoothing_k
	}

	/// Applies the casing policy and pads with `ngram_length - 1` markers on each side.
	///
	/// Example with `n = 4`: `"ab"` → `"$$$ab$$$"`.
	pub fn prepare(&self, word: &str) -> Vec<char> {
		let pad = self.ngram_length - 1;
		let mut padded = Vec::with_capacity(word.len() + 2 * pad);
		padded.extend(std::iter::repeat_n(BOUNDARY_MARKER, pad));
		if self.lowercase {
			padded.extend(word.chars().flat_map(char::to_lowercase));
		} else {
			padded.extend(word.chars());
		}
		padded.extend(std::iter::repeat_n(BOUNDARY_MARKER, pad));
		padded
	}

	/// Number of windows in a padded word, never less than 1.
	pub fn window_count(&self, padded_len: usize) -> usize {
		padded_len.saturating_sub(self.ngram_length - 1).max(1)
	}
}
