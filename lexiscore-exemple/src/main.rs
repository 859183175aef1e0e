use std::env;

use lexiscore_core::{Config, ModelRegistry, rank_languages, score_word};
use tracing_subscriber::EnvFilter;

const SAMPLE_WORDS: &[&str] = &[
    "anders",
    "husar",
    "ffffb",
    "sksksksk",
    "ss",
    "Gott",
    "schwarz",
    "Schwester",
    "substitutionselasticitet",
    "wwwgooglecom",
    "jubiidk",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: lexiscore-exemple [--force] [word...]
    // '--force' ignores cached models and retrains every language
    let mut force_training = false;
    let mut words: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--force" {
            force_training = true;
        } else {
            words.push(arg);
        }
    }
    if words.is_empty() {
        words = SAMPLE_WORDS.iter().map(|w| (*w).to_owned()).collect();
    }

    // Same configuration file as the server
    let config_path = env::var("LEXISCORE_CONFIG").unwrap_or_else(|_| "lexiscore.toml".to_owned());
    let config = Config::load(&config_path)?;
    let registry = ModelRegistry::load(&config, force_training);

    for failure in registry.failures() {
        println!("Language '{}' not loaded: {}", failure.language, failure.error);
    }

    // Score every word against the first configured language, best first
    let Some(first) = registry.languages().next() else {
        return Err("No language could be loaded".into());
    };
    let Some(model) = registry.get(first) else {
        return Err(format!("Language '{first}' missing from registry").into());
    };
    let mut scores: Vec<(&str, f64)> = words.iter().map(|w| (w.as_str(), score_word(w, model))).collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("Scores against '{first}':");
    for (word, score) in &scores {
        println!("{word}: {score:e}");
    }

    // Rank every loaded language for each word
    for word in &words {
        let ranking = rank_languages::<&str>(word, &registry, None);
        let line: Vec<String> = ranking.iter().map(|(lang, score)| format!("{lang}={score:e}")).collect();
        println!("{word} -> {}", line.join(", "));
    }

    Ok(())
}
