pub mod extract;

pub use extract::{IdExtractor, Identifier};

use crate::error::{Error, Result};
use anyhow::Context;
use csv::ReaderBuilder;
use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// One delimited table held in memory: a header row plus string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Approximate in-memory footprint: cell and header text plus the
    /// per-String and per-row Vec overhead.
    pub fn approx_bytes(&self) -> usize {
        let string_overhead = std::mem::size_of::<String>();
        let cells: usize = self
            .rows
            .iter()
            .map(|r| {
                r.iter().map(|c| c.len() + string_overhead).sum::<usize>()
                    + std::mem::size_of::<Vec<String>>()
            })
            .sum();
        let headers: usize = self
            .headers
            .iter()
            .map(|h| h.len() + string_overhead)
            .sum();
        cells + headers
    }
}

/// A file dropped by the partial-failure policy: its path and the parse
/// error that caused the skip.
#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a consolidation run. The skipped list is part of the contract,
/// not just a logging side effect, so callers can see exactly which inputs
/// contributed no rows.
#[derive(Debug)]
pub struct Consolidation {
    pub table: Table,
    pub skipped: Vec<Skipped>,
}

/// Load every path as a delimited table, tag each row with the identifier
/// derived from its filename, and concatenate the results in the order
/// given (callers pass sorted paths, so output order is deterministic).
///
/// - A file that fails to parse is skipped whole: none of its rows enter
///   the output, the failure is logged and recorded, and the run continues.
/// - An identifier extraction failure is fatal: it means the directory
///   layout itself does not match expectations.
/// - `NoDataLoaded` if every file failed to parse.
///
/// Concatenation uses column-union semantics: the output header set is the
/// union of all per-file headers in first-seen order, cells a file does not
/// supply are left empty, and `id_column` is appended last.
pub fn consolidate(
    paths: &[PathBuf],
    extractor: IdExtractor,
    id_column: &str,
    delimiter: u8,
) -> Result<Consolidation> {
    // 1) Load each file in order, tagging it with its identifier.
    let mut loaded: Vec<(Identifier, Table)> = Vec::new();
    let mut skipped: Vec<Skipped> = Vec::new();

    for path in paths {
        let id = extractor.extract(path)?;
        match read_delimited(path, delimiter) {
            Ok(table) => {
                loaded.push((id, table));
                if loaded.len() % 100 == 0 {
                    info!("processed {} files...", loaded.len());
                }
            }
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                skipped.push(Skipped {
                    path: path.clone(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    if loaded.is_empty() {
        return Err(Error::NoDataLoaded {
            attempted: paths.len(),
        });
    }

    // 2) Union of all headers, first-seen order, identifier column last.
    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (_, table) in &loaded {
        for h in &table.headers {
            if !index.contains_key(h) {
                index.insert(h.clone(), headers.len());
                headers.push(h.clone());
            }
        }
    }
    headers.push(id_column.to_string());
    let id_idx = headers.len() - 1;

    // 3) Concatenate, remapping each file's columns into the union and
    //    leaving gaps empty.
    let total_rows: usize = loaded.iter().map(|(_, t)| t.rows.len()).sum();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(total_rows);
    for (id, table) in loaded {
        let positions: Vec<usize> = table.headers.iter().map(|h| index[h]).collect();
        let id_value = id.to_string();
        for row in table.rows {
            let mut out = vec![String::new(); headers.len()];
            for (cell, &pos) in row.into_iter().zip(&positions) {
                out[pos] = cell;
            }
            out[id_idx] = id_value.clone();
            rows.push(out);
        }
    }

    info!(
        "consolidated {} rows from {} files ({} skipped)",
        rows.len(),
        paths.len() - skipped.len(),
        skipped.len()
    );

    Ok(Consolidation {
        table: Table { headers, rows },
        skipped,
    })
}

/// Parse one delimited file: first row is the header, every record must
/// have the same width. Any record error fails the whole file.
fn read_delimited(path: &Path, delimiter: u8) -> anyhow::Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading record in {}", path.display()))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for (name, content) in files {
            let p = dir.join(name);
            fs::write(&p, content).unwrap();
            paths.push(p);
        }
        paths.sort();
        paths
    }

    fn column(table: &Table, name: &str) -> Vec<String> {
        let idx = table.column_index(name).unwrap();
        table.rows.iter().map(|r| r[idx].clone()).collect()
    }

    #[test]
    fn tags_and_concatenates_in_path_order() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[
                ("1.csv", "t,v\n0.0,10\n0.5,11\n"),
                ("2.csv", "t,v\n0.0,20\n0.5,21\n1.0,22\n"),
                // Ragged record: whole file must be skipped.
                ("3.csv", "t,v\n0.0,30,999\n"),
            ],
        );

        let result = consolidate(&paths, IdExtractor::NumericStem, "file_id", b',').unwrap();
        assert_eq!(result.table.row_count(), 5);
        assert_eq!(result.table.headers, vec!["t", "v", "file_id"]);
        assert_eq!(column(&result.table, "file_id"), ["1", "1", "2", "2", "2"]);
        assert_eq!(column(&result.table, "v"), ["10", "11", "20", "21", "22"]);

        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].path.ends_with("3.csv"));
    }

    #[test]
    fn distinct_identifiers_match_file_count() {
        let dir = tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[
                ("arousal.csv", "song_id,s0\n2,0.1\n3,0.2\n"),
                ("valence.csv", "song_id,s0\n2,0.3\n3,0.4\n"),
            ],
        );

        let result = consolidate(&paths, IdExtractor::NameStem, "annotation_type", b',').unwrap();
        assert_eq!(result.table.row_count(), 4);
        let ids: std::collections::HashSet<_> =
            column(&result.table, "annotation_type").into_iter().collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("arousal") && ids.contains("valence"));
    }

    #[test]
    fn all_files_malformed_is_fatal() {
        let dir = tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[("1.csv", "a,b\n1,2,3\n"), ("2.csv", "a,b\nx\n")],
        );

        let err = consolidate(&paths, IdExtractor::NumericStem, "file_id", b',').unwrap_err();
        assert!(matches!(err, Error::NoDataLoaded { attempted: 2 }));
    }

    #[test]
    fn invalid_identifier_aborts_the_run() {
        let dir = tempdir().unwrap();
        let paths = write_files(dir.path(), &[("notanumber.csv", "a,b\n1,2\n")]);

        let err = consolidate(&paths, IdExtractor::NumericStem, "file_id", b',').unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn divergent_columns_union_with_empty_gaps() {
        let dir = tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[("1.csv", "a,b\n1,2\n"), ("2.csv", "b,c\n3,4\n")],
        );

        let result = consolidate(&paths, IdExtractor::NumericStem, "file_id", b',').unwrap();
        assert_eq!(result.table.headers, vec!["a", "b", "c", "file_id"]);
        assert_eq!(result.table.rows[0], vec!["1", "2", "", "1"]);
        assert_eq!(result.table.rows[1], vec!["", "3", "4", "2"]);
    }

    #[test]
    fn honors_the_configured_delimiter() {
        let dir = tempdir().unwrap();
        let paths = write_files(dir.path(), &[("7.csv", "t;mfcc_1\n0.0;1.5\n0.5;1.6\n")]);

        let result = consolidate(&paths, IdExtractor::NumericStem, "file_id", b';').unwrap();
        assert_eq!(result.table.headers, vec!["t", "mfcc_1", "file_id"]);
        assert_eq!(result.table.row_count(), 2);
    }
}
