use super::registry::ModelRegistry;
use super::scorer::score_word;

/// Ranks the languages of `registry` for `word`, best first.
///
/// # Parameters
/// - `candidates`: restricts ranking to these language codes. `None` ranks
///   every loaded language; an empty slice yields an empty result. Codes the
///   registry does not know are ignored.
///
/// # Behavior
/// - A word containing `-` is scored as given and with every hyphen removed;
///   the larger score is reported.
/// - Sorting is stable: equal scores keep the registry's configured order.
/// - Nothing is filtered out, thresholds belong to the caller.
pub fn rank_languages<S: AsRef<str>>(
	word: &str,
	registry: &ModelRegistry,
	candidates: Option<&[S]>,
) -> Vec<(String, f64)> {
	let dehyphenated = word.contains('-').then(|| word.replace('-', ""));

	let mut scored: Vec<(String, f64)> = registry
		.iter()
		.filter(|(language, _)| match candidates {
			Some(candidates) => candidates.iter().any(|c| c.as_ref() == *language),
			None => true,
		})
		.map(|(language, model)| {
			let mut score = score_word(word, model);
			if let Some(joined) = &dehyphenated {
				score = score.max(score_word(joined, model));
			}
			(language.to_owned(), score)
		})
		.collect();

	scored.sort_by(|a, b| b.1.total_cmp(&a.1));
	scored
}
