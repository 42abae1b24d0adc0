use std::path::PathBuf;

/// Errors raised by the consolidation pipeline.
///
/// Per-file parse failures are deliberately absent: they are recoverable,
/// recorded on [`crate::consolidate::Consolidation::skipped`] and never
/// propagated. Everything here terminates the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input directory does not exist.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The input directory exists but holds no matching files.
    #[error("no CSV files found in {0}")]
    NoMatchingFiles(PathBuf),

    /// A filename stem could not be parsed as the expected identifier type.
    #[error("invalid identifier `{stem}` in {path}")]
    InvalidIdentifier { path: PathBuf, stem: String },

    /// Every input file failed to parse; an empty concatenation is not a
    /// valid result.
    #[error("no data loaded: all {attempted} input files failed to parse")]
    NoDataLoaded { attempted: usize },

    /// Writing the consolidated output failed.
    #[error("write error at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an I/O failure with the output path it occurred at.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
