//! Reading corpus, query log and stopword files into memory.

use crate::tokenizer::StopWords;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("corpus not found: {}", .0.display())]
    MissingCorpus(PathBuf),
    #[error("query log not found: {}", .0.display())]
    MissingQueryLog(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk corpus directory: {0}")]
    Walk(#[from] walkdir::Error),
}

fn read_text(path: &Path) -> Result<String, InputError> {
    let bytes = fs::read(path).map_err(|source| InputError::Read { path: path.to_path_buf(), source })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// One word per line. A missing or unreadable file yields an empty set.
pub fn load_stopwords(path: &Path) -> StopWords {
    match read_text(path) {
        Ok(text) => {
            let words: StopWords = text.lines().collect();
            tracing::info!(path = %path.display(), count = words.len(), "loaded stopwords");
            words
        }
        Err(err) => {
            tracing::warn!(error = %err, "continuing without stopwords");
            StopWords::empty()
        }
    }
}

/// Non-empty lines of a corpus file, or of every file under a corpus directory
/// in file-name order.
pub fn read_corpus(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::MissingCorpus(path.to_path_buf()));
    }
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut records = Vec::new();
    for file in &files {
        let text = read_text(file)?;
        records.extend(text.lines().filter(|l| !l.trim().is_empty()).map(str::to_string));
    }
    tracing::info!(files = files.len(), records = records.len(), "read corpus");
    Ok(records)
}

/// Every line is a query, blank ones included, so numbering follows line numbers.
pub fn read_query_log(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingQueryLog(path.to_path_buf()));
    }
    let text = read_text(path)?;
    Ok(text.lines().map(str::to_string).collect())
}
