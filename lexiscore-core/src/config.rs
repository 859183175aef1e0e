//! Typed service configuration.
//!
//! The configuration is read from a TOML file into optional raw fields, then
//! validated so that every missing required key is reported by name.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LexiError, Result};
use crate::io::normalize_folder;
use crate::model::params::NgramParams;

/// Corpus location of one active language.
#[derive(Clone, Debug, PartialEq)]
pub struct LanguageConfig {
	pub code: String,
	pub filename: PathBuf,
}

impl LanguageConfig {
	/// Full corpus path, `filename` resolved against the data directory.
	pub fn corpus_path(&self, data_dir: &Path) -> PathBuf {
		data_dir.join(&self.filename)
	}
}

/// HTTP settings, only read by the web service.
#[derive(Clone, Debug, PartialEq)]
pub struct WebserviceConfig {
	pub bind: String,
	pub origins: Vec<String>,
}

impl Default for WebserviceConfig {
	fn default() -> Self {
		Self { bind: "127.0.0.1:8000".to_owned(), origins: vec!["*".to_owned()] }
	}
}

/// Validated configuration, passed explicitly to the registry and the server.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	pub title: String,
	pub data_dir: PathBuf,
	pub cache_dir: PathBuf,
	/// Active languages, in configured order.
	pub languages: Vec<LanguageConfig>,
	pub params: NgramParams,
	pub webservice: WebserviceConfig,
}

#[derive(Deserialize)]
struct RawConfig {
	general: Option<RawGeneral>,
	model: Option<RawModel>,
	webservice: Option<RawWebservice>,
	#[serde(default)]
	languages: HashMap<String, RawLanguage>,
}

#[derive(Deserialize)]
struct RawGeneral {
	title: Option<String>,
	data_dir: Option<String>,
	cache_dir: Option<String>,
	languages: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawModel {
	ngram_length: Option<usize>,
	smoothing_k: Option<f64>,
	lowercase: Option<bool>,
}

#[derive(Deserialize)]
struct RawWebservice {
	bind: Option<String>,
	origins: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawLanguage {
	filename: Option<String>,
}

impl Config {
	/// Reads and validates a TOML configuration file.
	///
	/// # Errors
	/// - `ConfigurationMissing` if the file does not exist or a required key is absent
	/// - `InvalidConfiguration` if the file cannot be read or parsed
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
			std::io::ErrorKind::NotFound => LexiError::ConfigurationMissing(format!("configuration file {}", path.display())),
			_ => LexiError::InvalidConfiguration(format!("{}: {e}", path.display())),
		})?;
		Self::from_toml_str(&contents)
	}

	/// Parses and validates a TOML document.
	pub fn from_toml_str(contents: &str) -> Result<Self> {
		let raw: RawConfig = toml_edit::de::from_str(contents)
			.map_err(|e| LexiError::InvalidConfiguration(e.to_string()))?;
		Self::validate(raw)
	}

	fn validate(mut raw: RawConfig) -> Result<Self> {
		let general = raw.general.ok_or_else(|| missing("general"))?;
		let data_dir = general.data_dir.ok_or_else(|| missing("general.data_dir"))?;
		let codes = general.languages.ok_or_else(|| missing("general.languages"))?;

		let mut seen = HashSet::new();
		let mut languages = Vec::with_capacity(codes.len());
		for code in codes {
			let code = code.trim().to_owned();
			if code.is_empty() {
				return Err(LexiError::InvalidConfiguration("empty language code".to_owned()));
			}
			if !seen.insert(code.clone()) {
				return Err(LexiError::InvalidConfiguration(format!("language '{code}' listed twice")));
			}
			let filename = raw
				.languages
				.remove(&code)
				.and_then(|l| l.filename)
				.ok_or_else(|| missing(&format!("languages.{code}.filename")))?;
			languages.push(LanguageConfig { code, filename: PathBuf::from(filename) });
		}

		let defaults = NgramParams::default();
		let params = match raw.model {
			Some(model) => NgramParams::new(
				model.ngram_length.unwrap_or(defaults.ngram_length()),
				model.lowercase.unwrap_or(defaults.lowercase()),
				model.smoothing_k.unwrap_or(defaults.smoothing_k()),
			)
			.map_err(|e| LexiError::InvalidConfiguration(e.to_string()))?,
			None => defaults,
		};

		let mut webservice = WebserviceConfig::default();
		if let Some(raw_web) = raw.webservice {
			if let Some(bind) = raw_web.bind {
				webservice.bind = bind;
			}
			if let Some(origins) = raw_web.origins {
				webservice.origins = origins;
			}
		}

		Ok(Self {
			title: general.title.unwrap_or_else(|| "LexiScore".to_owned()),
			data_dir: normalize_folder(&data_dir),
			cache_dir: general.cache_dir.map(PathBuf::from).unwrap_or_else(std::env::temp_dir),
			languages,
			params,
			webservice,
		})
	}
}

fn missing(key: &str) -> LexiError {
	LexiError::ConfigurationMissing(key.to_owned())
}
