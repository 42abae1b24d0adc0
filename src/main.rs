use anyhow::Result;
use clap::{Parser, Subcommand};
use deamprep::{
    audio,
    consolidate::{consolidate, Consolidation, IdExtractor},
    discover, persist, report,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "deamprep",
    about = "DEAM dataset preparation: consolidate per-file CSVs, convert audio"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consolidate the per-song feature CSVs into one table
    Features {
        /// Directory of `<song number>.csv` feature files
        #[arg(long, default_value = "data/DEAM/features")]
        dir: PathBuf,
        #[arg(long, default_value = "data/processed/deam_features_consolidated.csv")]
        out: PathBuf,
    },
    /// Consolidate the per-dimension annotation CSVs into one table
    Annotations {
        /// Directory of `<dimension name>.csv` annotation files
        #[arg(
            long,
            default_value = "data/DEAM/annotations/annotations averaged per song/dynamic (per second annotations)"
        )]
        dir: PathBuf,
        #[arg(long, default_value = "data/processed/deam_annotations_consolidated.csv")]
        out: PathBuf,
    },
    /// Convert the MP3 audio to WAV files in a wav/ subdirectory
    ConvertAudio {
        #[arg(long, default_value = "data/DEAM/MEMD_audio")]
        dir: PathBuf,
        /// Overwrite WAV files that already exist
        #[arg(long, short)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    match Cli::parse().command {
        Command::Features { dir, out } => run_features(&dir, &out),
        Command::Annotations { dir, out } => run_annotations(&dir, &out),
        Command::ConvertAudio { dir, force } => {
            audio::convert_all(&dir, force)?;
            Ok(())
        }
    }
}

fn run_features(dir: &Path, out: &Path) -> Result<()> {
    info!("loading DEAM features...");
    let paths = discover::csv_files(dir)?;
    // Feature files are semicolon-delimited, one file per song, numbered.
    let result = consolidate(&paths, IdExtractor::NumericStem, "file_id", b';')?;
    note_skipped(&result);

    report::print_basic_summary(&result.table, "file_id", "file ID");
    report::print_distribution_summary(&result.table, "file_id", "file ID");

    persist::persist(&result.table, out, b',')?;
    println!("\nconsolidated DEAM features saved to: {}", out.display());
    Ok(())
}

fn run_annotations(dir: &Path, out: &Path) -> Result<()> {
    info!("loading DEAM annotations...");
    let paths = discover::csv_files(dir)?;
    // Annotation files are comma-delimited, one file per emotion dimension.
    let result = consolidate(&paths, IdExtractor::NameStem, "annotation_type", b',')?;
    note_skipped(&result);

    report::print_basic_summary(&result.table, "song_id", "song ID");
    report::print_category_breakdown(&result.table, "annotation_type", "annotation type");
    report::print_distribution_summary(&result.table, "song_id", "song ID");

    persist::persist(&result.table, out, b',')?;
    println!("\nconsolidated DEAM annotations saved to: {}", out.display());
    Ok(())
}

fn note_skipped(result: &Consolidation) {
    // Individual skips were already logged with their cause as they
    // happened; this is the end-of-run accounting.
    if !result.skipped.is_empty() {
        warn!(
            "{} file(s) skipped and contributed no rows: {:?}",
            result.skipped.len(),
            result
                .skipped
                .iter()
                .map(|s| s.path.display().to_string())
                .collect::<Vec<_>>()
        );
    }
}
