use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;

/// The per-file tag attached to every row sourced from that file.
///
/// Derived purely from the filename, never from file contents. A single run
/// uses one variant throughout; there is no coercion between the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Number(i64),
    Name(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Name(s) => f.write_str(s),
        }
    }
}

/// How to derive an [`Identifier`] from a source path. Supplied by the
/// caller, so the same consolidation engine serves both the numbered
/// per-song dataset and the named per-dimension dataset.
#[derive(Debug, Clone, Copy)]
pub enum IdExtractor {
    /// Parse the filename stem as an integer, e.g. `data/12.csv` → `12`.
    NumericStem,
    /// Use the filename stem verbatim, e.g. `data/arousal.csv` → `arousal`.
    NameStem,
}

impl IdExtractor {
    pub fn extract(&self, path: &Path) -> Result<Identifier> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match self {
            IdExtractor::NumericStem => {
                stem.parse::<i64>()
                    .map(Identifier::Number)
                    .map_err(|_| Error::InvalidIdentifier {
                        path: path.to_path_buf(),
                        stem,
                    })
            }
            IdExtractor::NameStem => Ok(Identifier::Name(stem)),
        }
    }
}
