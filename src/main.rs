use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use imgdate::{date, scan, writer};

#[derive(Parser)]
#[command(
    name = "imgdate",
    version,
    about = "Convert PNG/JPG trees into dated JPEGs using dates from filenames"
)]
struct Cli {
    /// Source directory, scanned recursively
    source_path: PathBuf,

    /// Destination directory, created if missing
    dest_path: PathBuf,

    /// Maximum width/height in pixels (larger images are scaled down)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    max_dimension: u32,

    /// JPEG quality (1-100)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let t_total = Instant::now();

    if !cli.source_path.is_dir() {
        anyhow::bail!(
            "source directory does not exist or is not a directory: {}",
            cli.source_path.display()
        );
    }

    // Stage 1: Scan source tree
    eprintln!("=== Stage 1: Scanning source tree ===");
    let t = Instant::now();
    let mut media = scan::scan_tree(&cli.source_path)?;
    eprintln!("  Scan took {:.2}s", t.elapsed().as_secs_f64());

    if media.is_empty() {
        eprintln!("No PNG or JPG files found in: {}", cli.source_path.display());
        return Ok(());
    }
    eprintln!("Found {} image files", media.len());

    // Stage 2: Extract dates from filenames
    eprintln!("=== Stage 2: Extracting dates ===");
    for m in &mut media {
        m.date = date::extract(&m.filename);
    }
    let dated = media.iter().filter(|m| m.date.is_some()).count();
    eprintln!("Dates found: {}/{}", dated, media.len());

    // Stage 3: Convert
    eprintln!("=== Stage 3: Converting ===");
    let t = Instant::now();
    let summary = writer::convert_all(&media, &cli.dest_path, cli.max_dimension, cli.quality)?;
    eprintln!("  Conversion took {:.2}s", t.elapsed().as_secs_f64());

    eprintln!(
        "Processed {}, skipped {} (no date in filename), failed {}",
        summary.processed, summary.skipped, summary.failed
    );
    eprintln!("Total: {:.2}s", t_total.elapsed().as_secs_f64());
    Ok(())
}
