use std::env;
use std::fs;

use lexiscore_core::{Config, ModelRegistry, rank_languages};
use tracing_subscriber::EnvFilter;

/// Same lower bound as the `/lang` endpoint: below it a word has no language.
const RANK_THRESHOLD: f64 = 0.000001;

/// Name of the labelled word list, looked up in the data directory.
const EVALUATION_FILE: &str = "evaluation_data.csv";

/// A word whose predicted language differs from the expected one.
#[derive(Debug, PartialEq)]
struct Mismatch {
    word: String,
    expected: String,
    actual: String,
}

/// Confusion counts over a labelled word list.
///
/// An empty language means "no language": a word with an empty prediction
/// is a negative, a word with a non-empty prediction is a positive.
#[derive(Debug, Default)]
struct Evaluation {
    true_positives: usize,
    true_negatives: usize,
    false_positives: Vec<Mismatch>,
    false_negatives: Vec<Mismatch>,
}

impl Evaluation {
    /// Compares a prediction with its label and updates the counts.
    fn record(&mut self, word: &str, expected: &str, actual: &str) {
        let mismatch = || Mismatch { word: word.to_owned(), expected: expected.to_owned(), actual: actual.to_owned() };
        match (actual.is_empty(), actual == expected) {
            (false, true) => self.true_positives += 1,
            (false, false) => self.false_positives.push(mismatch()),
            (true, true) => self.true_negatives += 1,
            (true, false) => self.false_negatives.push(mismatch()),
        }
    }

    fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives.len() + self.false_negatives.len()
    }

    /// `tp / (tp + fp)`, 0 when nothing was predicted.
    fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives.len())
    }

    /// `tp / (tp + fn)`, 0 when nothing was expected.
    fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives.len())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

/// Parses `word;expected_lang` lines. A missing or empty language means "no language".
fn parse_cases(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(';') {
            Some((word, expected)) => (word.trim().to_owned(), expected.trim().to_owned()),
            None => (line.to_owned(), String::new()),
        })
        .collect()
}

/// Runs `predict` over every case.
fn evaluate<F>(cases: &[(String, String)], predict: F) -> Evaluation
where
    F: Fn(&str) -> String,
{
    let mut evaluation = Evaluation::default();
    for (word, expected) in cases {
        let actual = predict(word);
        evaluation.record(word, expected, &actual);
    }
    evaluation
}

/// Top-ranked language of `word`, empty if none reaches the threshold.
fn top_language(word: &str, registry: &ModelRegistry) -> String {
    rank_languages::<&str>(word, registry, None)
        .into_iter()
        .find(|(_, score)| *score >= RANK_THRESHOLD)
        .map(|(language, _)| language)
        .unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // Usage: evaluate [--force]
    let force_training = env::args().skip(1).any(|arg| arg == "--force");

    let config_path = env::var("LEXISCORE_CONFIG").unwrap_or_else(|_| "lexiscore.toml".to_owned());
    let config = Config::load(&config_path)?;
    let registry = ModelRegistry::load(&config, force_training);

    let data_path = config.data_dir.join(EVALUATION_FILE);
    let contents = fs::read_to_string(&data_path)
        .map_err(|e| format!("Cannot read {}: {e}", data_path.display()))?;
    let cases = parse_cases(&contents);

    let evaluation = evaluate(&cases, |word| top_language(word, &registry));

    println!("False positives:");
    for m in &evaluation.false_positives {
        println!("Query: {}, Expected output: {}, Actual output: {}", m.word, m.expected, m.actual);
    }
    println!("False negatives:");
    for m in &evaluation.false_negatives {
        println!("Query: {}, Expected output: {}, Actual output: {}", m.word, m.expected, m.actual);
    }

    println!("True positives: {}", evaluation.true_positives);
    println!("True negatives: {}", evaluation.true_negatives);
    println!("Total: {}", evaluation.total());
    println!("Precision: {:.2}", evaluation.precision());
    println!("Recall: {:.2}", evaluation.recall());

    Ok(())
}
