use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::language_model::LanguageModel;
use super::params::NgramParams;
use crate::error::{LexiError, Result};

/// Bumped whenever the artifact layout changes.
const CACHE_FORMAT_VERSION: u32 = 1;

/// On-disk form of one language model.
///
/// Records are sorted by n-gram; `f64`s are written as raw IEEE-754 bytes by
/// postcard, so a round-trip is bit-exact.
#[derive(Serialize, Deserialize, Debug)]
struct CacheArtifact {
	version: u32,
	language: String,
	params: NgramParams,
	ngrams: Vec<(String, f64)>,
}

/// Durable store of trained models, one file per language.
///
/// - Files live in a single directory, named `lexiscore_probs_{language}.bin`
/// - A missing, unreadable or incompatible file is a cache miss
/// - Writes go through a temporary file renamed into place
/// - Writes for the same language are serialized, other languages never contend
#[derive(Debug)]
pub struct ModelCache {
	dir: PathBuf,
	write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ModelCache {
	/// Creates a cache rooted at `dir`. The directory is created on first write.
	pub fn new<P: AsRef<Path>>(dir: P) -> Self {
		Self { dir: dir.as_ref().to_path_buf(), write_locks: Mutex::new(HashMap::new()) }
	}

	/// Cache directory.
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Artifact path of a language.
	pub fn path_for(&self, language: &str) -> PathBuf {
		self.dir.join(format!("lexiscore_probs_{language}.bin"))
	}

	/// Loads the cached model of `language` if it was trained with `params`.
	///
	/// Returns `None` when there is no entry, when it cannot be decoded, when
	/// its format version or parameters differ, or when a probability lies
	/// outside `(0, 1]`. None of these are errors.
	pub fn get(&self, language: &str, params: &NgramParams) -> Option<LanguageModel> {
		let path = self.path_for(language);
		let bytes = match std::fs::read(&path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				info!(language, path = %path.display(), "no cached probabilities");
				return None;
			}
			Err(e) => {
				warn!(language, path = %path.display(), error = %e, "cannot read cached probabilities");
				return None;
			}
		};

		let artifact: CacheArtifact = match postcard::from_bytes(&bytes) {
			Ok(artifact) => artifact,
			Err(e) => {
				warn!(language, path = %path.display(), error = %e, "corrupt cached probabilities");
				return None;
			}
		};

		if artifact.version != CACHE_FORMAT_VERSION || artifact.language != language {
			warn!(language, version = artifact.version, "incompatible cache entry");
			return None;
		}
		if artifact.params != *params {
			warn!(language, cached = ?artifact.params, requested = ?params, "cache entry trained with other parameters");
			return None;
		}
		if let Some((ngram, p)) = artifact.ngrams.iter().find(|(_, p)| !(*p > 0.0 && *p <= 1.0)) {
			warn!(language, %ngram, p, "cached probability out of range");
			return None;
		}

		info!(language, path = %path.display(), ngrams = artifact.ngrams.len(), "probabilities loaded from cache");
		Some(LanguageModel::from_parts(artifact.params, artifact.ngrams.into_iter().collect()))
	}

	/// Persists `model` as the entry of `language`, replacing any previous one.
	///
	/// # Errors
	/// - `Serialization` if encoding fails
	/// - `CacheWrite` if the directory, temporary file or rename fails
	pub fn put(&self, language: &str, model: &LanguageModel) -> Result<()> {
		let artifact = CacheArtifact {
			version: CACHE_FORMAT_VERSION,
			language: language.to_owned(),
			params: *model.params(),
			ngrams: model.sorted_entries(),
		};
		let bytes = postcard::to_stdvec(&artifact)?;

		let lock = self.write_lock(language);
		let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

		self.write_atomically(language, &bytes).map_err(|source| LexiError::CacheWrite {
			language: language.to_owned(),
			source,
		})
	}

	fn write_atomically(&self, language: &str, bytes: &[u8]) -> io::Result<()> {
		std::fs::create_dir_all(&self.dir)?;
		let mut temp_file = NamedTempFile::new_in(&self.dir)?;
		temp_file.write_all(bytes)?;
		temp_file.as_file().sync_all()?;
		temp_file.persist(self.path_for(language)).map_err(|e| e.error)?;
		Ok(())
	}

	fn write_lock(&self, language: &str) -> Arc<Mutex<()>> {
		let mut locks = self.write_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
		locks.entry(language.to_owned()).or_default().clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::trainer::train;

	fn model(params: NgramParams) -> LanguageModel {
		train(["hus", "huset", "husene", "første-gang", "ærø"], params)
	}

	#[test]
	fn round_trip_is_exact() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		let params = NgramParams::default();
		let m = model(params);

		cache.put("da", &m).unwrap();
		let loaded = cache.get("da", &params).unwrap();
		assert_eq!(loaded, m);
		for ((ka, pa), (kb, pb)) in loaded.sorted_entries().iter().zip(m.sorted_entries().iter()) {
			assert_eq!(ka, kb);
			assert_eq!(pa.to_bits(), pb.to_bits());
		}
	}

	#[test]
	fn missing_entry_is_a_miss() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path().join("not-yet-created"));
		assert!(cache.get("da", &NgramParams::default()).is_none());
	}

	#[test]
	fn put_overwrites() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		let params = NgramParams::default();

		cache.put("da", &model(params)).unwrap();
		let replacement = train(["bil"], params);
		cache.put("da", &replacement).unwrap();
		assert_eq!(cache.get("da", &params).unwrap(), replacement);
	}

	#[test]
	fn other_parameters_are_a_miss() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		cache.put("da", &model(NgramParams::default())).unwrap();

		let trigram = NgramParams::new(3, true, 100.0).unwrap();
		assert!(cache.get("da", &trigram).is_none());
	}

	#[test]
	fn corrupt_entry_is_a_miss() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		std::fs::write(cache.path_for("da"), b"\xff\xff\xff").unwrap();
		assert!(cache.get("da", &NgramParams::default()).is_none());
	}

	#[test]
	fn out_of_range_probability_is_a_miss() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		let params = NgramParams::default();
		for bad in [f64::NAN, 0.0, -0.5, 1.5, f64::INFINITY] {
			let artifact = CacheArtifact {
				version: CACHE_FORMAT_VERSION,
				language: "da".to_owned(),
				params,
				ngrams: vec![("$$$h".to_owned(), bad), ("$$hu".to_owned(), 0.25)],
			};
			std::fs::write(cache.path_for("da"), postcard::to_stdvec(&artifact).unwrap()).unwrap();
			assert!(cache.get("da", &params).is_none(), "accepted {bad}");
		}
	}

	#[test]
	fn concurrent_writes_leave_one_complete_entry() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		let params = NgramParams::default();
		let models: Vec<LanguageModel> = (0..16).map(|i| train([format!("hus{i}"), "bil".repeat(i + 1)], params)).collect();

		std::thread::scope(|scope| {
			for model in &models {
				let cache = &cache;
				scope.spawn(move || cache.put("da", model).unwrap());
			}
		});

		let loaded = cache.get("da", &params).unwrap();
		assert!(models.contains(&loaded));
		let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
		assert_eq!(files.len(), 1);
	}

	#[test]
	fn entries_are_keyed_by_language() {
		let dir = tempfile::tempdir().unwrap();
		let cache = ModelCache::new(dir.path());
		let params = NgramParams::default();
		cache.put("da", &model(params)).unwrap();

		assert!(cache.get("de", &params).is_none());
		assert_eq!(cache.path_for("da").file_name().unwrap(), "lexiscore_probs_da.bin");
	}

	#[test]
	fn unwritable_directory_reports_cache_write() {
		let dir = tempfile::tempdir().unwrap();
		let blocker = dir.path().join("file");
		std::fs::write(&blocker, b"").unwrap();
		let cache = ModelCache::new(blocker.join("sub"));

		let result = cache.put("da", &model(NgramParams::default()));
		assert!(matches!(result, Err(LexiError::CacheWrite { .. })));
	}
}
