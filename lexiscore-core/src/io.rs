use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Lazy sequence of words read from a newline-delimited corpus file.
///
/// - Lines are trimmed (this also drops a trailing `\r`)
/// - Blank lines are skipped, so they add no `$`-only windows to the counts
///   (an empty word would otherwise contribute `n - 1` all-marker n-grams)
/// - Casing is left untouched, the trainer applies its own policy
///
/// Any read error (including invalid UTF-8) is yielded as an `Err` item.
pub struct Corpus {
	lines: Lines<BufReader<File>>,
}

impl Iterator for Corpus {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			match self.lines.next()? {
				Ok(line) => {
					let word = line.trim();
					if !word.is_empty() {
						return Some(Ok(word.to_owned()));
					}
				}
				Err(e) => return Some(Err(e)),
			}
		}
	}
}

/// Opens a corpus file for streaming.
///
/// Nothing but the file handle is held; words are read on demand.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<Corpus> {
	let file = File::open(filename)?;
	Ok(Corpus { lines: BufReader::new(file).lines() })
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}
