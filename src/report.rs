//! Console summaries of a consolidated table. Purely observational: nothing
//! here changes the table or produces an artifact. The statistics are
//! computed by pure functions so they stay testable; printing is separate.

use crate::consolidate::Table;
use std::collections::HashMap;

/// Row-count distribution across the distinct values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

fn value_counts(table: &Table, column: &str) -> Option<HashMap<String, usize>> {
    let idx = table.column_index(column)?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &table.rows {
        *counts.entry(row[idx].clone()).or_default() += 1;
    }
    Some(counts)
}

/// Min/max/mean rows per distinct value of `column`. `None` if the column
/// is absent or the table has no rows.
pub fn distribution(table: &Table, column: &str) -> Option<Distribution> {
    let counts = value_counts(table, column)?;
    if counts.is_empty() {
        return None;
    }
    let min = *counts.values().min().unwrap();
    let max = *counts.values().max().unwrap();
    let mean = table.row_count() as f64 / counts.len() as f64;
    Some(Distribution { min, max, mean })
}

/// Rows per distinct value of `column`, sorted by value. Empty if the
/// column is absent.
pub fn breakdown(table: &Table, column: &str) -> Vec<(String, usize)> {
    let Some(counts) = value_counts(table, column) else {
        return Vec::new();
    };
    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort();
    pairs
}

/// Print overall shape: rows, columns, approximate memory, unique count of
/// the identifier column and the leading column names.
pub fn print_basic_summary(table: &Table, id_column: &str, id_label: &str) {
    println!("\n=== DATASET SUMMARY ===");
    println!("total rows: {}", table.row_count());
    println!("total columns: {}", table.column_count());
    println!(
        "memory usage: {:.2} MB",
        table.approx_bytes() as f64 / 1024.0 / 1024.0
    );

    if let Some(counts) = value_counts(table, id_column) {
        println!("\nunique {}: {}", id_label, counts.len());
        println!(
            "rows per {} (avg): {:.1}",
            id_label,
            table.row_count() as f64 / counts.len() as f64
        );
    }

    let shown = table.headers.iter().take(10).cloned().collect::<Vec<_>>();
    println!("\n=== COLUMN NAMES (first 10) ===");
    println!("{:?}", shown);
}

/// Print the min/max/mean row-count distribution for `id_column`.
pub fn print_distribution_summary(table: &Table, id_column: &str, id_label: &str) {
    println!("\n=== {} DISTRIBUTION ===", id_label.to_uppercase());
    match distribution(table, id_column) {
        Some(d) => {
            println!("min rows per {}: {}", id_label, d.min);
            println!("max rows per {}: {}", id_label, d.max);
            println!("mean rows per {}: {:.1}", id_label, d.mean);
        }
        None => println!("column `{}` not present", id_column),
    }
}

/// Print the per-category row counts for the named-identifier variant.
pub fn print_category_breakdown(table: &Table, id_column: &str, label: &str) {
    println!("\n=== {} DISTRIBUTION ===", label.to_uppercase());
    for (value, count) in breakdown(table, id_column) {
        println!("{}: {} rows", value, count);
    }
}
