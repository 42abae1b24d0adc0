use crate::error::{Error, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Find every `*.csv` file directly inside `dir`, sorted lexicographically
/// by path. No recursion into subdirectories.
///
/// - `DirectoryNotFound` if `dir` does not exist (or is not a directory).
/// - `NoMatchingFiles` if it exists but contains zero CSV files.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let pattern = format!("{}/*.csv", dir.display());
    let mut paths: Vec<PathBuf> = Vec::new();
    // An unparseable pattern yields zero matches and is reported below as
    // NoMatchingFiles; unreadable entries are skipped.
    if let Ok(entries) = glob(&pattern) {
        for entry in entries {
            match entry {
                Ok(p) if p.is_file() => paths.push(p),
                Ok(_) => {}
                Err(e) => warn!("cannot read glob entry: {:?}", e),
            }
        }
    }

    if paths.is_empty() {
        return Err(Error::NoMatchingFiles(dir.to_path_buf()));
    }

    paths.sort();
    info!("found {} CSV files in {}", paths.len(), dir.display());
    Ok(paths)
}
