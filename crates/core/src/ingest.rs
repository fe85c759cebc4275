use crate::SearchError;
use std::fs;
use std::path::PathBuf;

/// Where the run's search terms come from.
#[derive(Debug, Clone)]
pub enum TermSource {
    Wordlist(PathBuf),
    Keyword(String),
}

impl TermSource {
    /// Loads every term up front. Failure here is fatal for the run.
    pub fn load(&self) -> Result<Vec<String>, SearchError> {
        match self {
            Self::Wordlist(path) => {
                let contents = fs::read(path)?;
                Ok(terms_from_lines(&String::from_utf8_lossy(&contents)))
            }
            Self::Keyword(keyword) => {
                let keyword = keyword.trim();
                if keyword.is_empty() {
                    return Err(SearchError::InvalidArgument(
                        "keyword must not be empty".to_string(),
                    ));
                }
                Ok(vec![keyword.to_string()])
            }
        }
    }
}

/// One term per line, trimmed, blank lines dropped.
pub fn terms_from_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
