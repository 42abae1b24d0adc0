use crate::consolidate::Table;
use crate::error::{Error, Result};
use csv::WriterBuilder;
use std::{fs, path::Path};
use tracing::info;

/// Write `table` as delimited text at `output_path`: header included, no
/// row-index column, existing file overwritten unconditionally. Missing
/// ancestor directories are created first.
pub fn persist(table: &Table, output_path: &Path, delimiter: u8) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
        }
    }

    info!("saving to {}...", output_path.display());

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(output_path)
        .map_err(|e| to_write_error(output_path, e))?;

    writer
        .write_record(&table.headers)
        .map_err(|e| to_write_error(output_path, e))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| to_write_error(output_path, e))?;
    }
    writer.flush().map_err(|e| Error::write(output_path, e))?;

    info!("save completed ({} rows)", table.row_count());
    Ok(())
}

fn to_write_error(path: &Path, e: csv::Error) -> Error {
    Error::write(
        path,
        match e.into_kind() {
            csv::ErrorKind::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", other)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::{consolidate, IdExtractor};
    use crate::discover;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_table() -> Table {
        Table {
            headers: vec!["t".into(), "v".into(), "file_id".into()],
            rows: vec![
                vec!["0.0".into(), "10".into(), "1".into()],
                vec!["0.5".into(), "11".into(), "1".into()],
            ],
        }
    }

    #[test]
    fn creates_ancestor_directories() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("data").join("processed").join("out.csv");
        persist(&sample_table(), &out, b',').unwrap();
        assert!(out.is_file());
    }

    #[test]
    fn output_has_header_and_no_index_column() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        persist(&sample_table(), &out, b',').unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text, "t,v,file_id\n0.0,10,1\n0.5,11,1\n");
    }

    #[test]
    fn repeated_persist_is_byte_identical() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let table = sample_table();

        persist(&table, &out, b',').unwrap();
        let first = fs::read(&out).unwrap();
        persist(&table, &out, b',').unwrap();
        let second = fs::read(&out).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        fs::write(&out, "stale contents that are much longer than the table").unwrap();
        persist(&sample_table(), &out, b',').unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("t,v,file_id\n"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn round_trips_through_consolidate() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("1.csv"), "t,v\n0.0,10\n0.5,11\n").unwrap();
        fs::write(src.join("2.csv"), "t,v\n0.0,20\n").unwrap();

        let paths = discover::csv_files(&src).unwrap();
        let result = consolidate(&paths, IdExtractor::NumericStem, "file_id", b',').unwrap();

        let out = dir.path().join("out.csv");
        persist(&result.table, &out, b',').unwrap();

        // Reading the artifact back with the same delimiter reproduces the
        // in-memory table (identifiers compare by their serialized form).
        let reread = consolidate(
            &[PathBuf::from(&out)],
            IdExtractor::NameStem,
            "ignored",
            b',',
        )
        .unwrap();
        let stripped: Vec<Vec<String>> = reread
            .table
            .rows
            .into_iter()
            .map(|mut r| {
                r.pop();
                r
            })
            .collect();
        assert_eq!(stripped, result.table.rows);
        assert_eq!(
            &reread.table.headers[..reread.table.headers.len() - 1],
            &result.table.headers[..]
        );
    }
}
