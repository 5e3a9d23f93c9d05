use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::metadata;
use crate::media::Media;
use crate::transform;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files converted and written
    pub processed: usize,
    /// Files without a date in the filename
    pub skipped: usize,
    /// Files that failed to decode, encode or write
    pub failed: usize,
}

enum Outcome {
    Processed,
    Skipped,
    Failed,
}

/// Convert all dated media files into the destination tree, in parallel.
/// Per-file failures are reported and counted, never propagated.
pub fn convert_all(
    media: &[Media],
    dest_dir: &Path,
    max_dimension: u32,
    quality: u8,
) -> anyhow::Result<RunSummary> {
    fs::create_dir_all(dest_dir)?;

    let pb = ProgressBar::new(media.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} converting")
            .unwrap(),
    );

    let outcomes: Vec<Outcome> = media
        .par_iter()
        .map(|m| {
            let outcome = convert_one(m, dest_dir, max_dimension, quality);
            pb.inc(1);
            outcome
        })
        .collect();

    pb.finish_and_clear();

    let mut summary = RunSummary::default();
    for outcome in &outcomes {
        match outcome {
            Outcome::Processed => summary.processed += 1,
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Failed => summary.failed += 1,
        }
    }
    Ok(summary)
}

fn convert_one(m: &Media, dest_dir: &Path, max_dimension: u32, quality: u8) -> Outcome {
    let Some(date) = m.date else {
        eprintln!("No date in filename, skipping: {}", m.source.display());
        return Outcome::Skipped;
    };

    let dest = dest_path(dest_dir, &m.rel_path);
    match process_file(&m.source, &dest, date.resolve(), max_dimension, quality) {
        Ok(()) => Outcome::Processed,
        Err(e) => {
            eprintln!("Error processing {}: {}", m.source.display(), e);
            Outcome::Failed
        }
    }
}

/// Mirror the relative path under the destination root, extension
/// normalized to `.jpg`.
pub fn dest_path(dest_dir: &Path, rel_path: &Path) -> PathBuf {
    dest_dir.join(rel_path).with_extension("jpg")
}

fn process_file(
    source: &Path,
    dest: &Path,
    dt: NaiveDateTime,
    max_dimension: u32,
    quality: u8,
) -> anyhow::Result<()> {
    let bytes = fs::read(source)?;
    let orientation = metadata::orientation_from_bytes(&bytes);

    let img = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .decode()?;

    let img = transform::normalize_orientation(img, orientation);
    let img = transform::flatten_to_rgb(img);
    let img = transform::resize_to_fit(img, max_dimension);

    // Safe under concurrent creation of shared parents
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&img)?;

    let payload = metadata::build_date_exif(dt)?;
    metadata::insert_exif_segment(&mut jpeg, &payload);
    fs::write(dest, &jpeg)?;

    set_timestamps(dest, dt);
    Ok(())
}

/// Stamp the extracted date onto the written file. The datetime is naive
/// local time, matching the EXIF strings. Failures are reported but the
/// file still counts as processed.
fn set_timestamps(path: &Path, dt: NaiveDateTime) {
    let Some(local) = dt.and_local_timezone(chrono::Local).single() else {
        return;
    };
    let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
    if let Err(e) = filetime::set_file_times(path, ft, ft) {
        eprintln!("Could not set timestamps on {}: {}", path.display(), e);
    }
    set_creation_time(path, dt);
}

/// Best-effort creation time via SetFile (ships with the Xcode command
/// line tools). Absence or failure is fine.
#[cfg(target_os = "macos")]
fn set_creation_time(path: &Path, dt: NaiveDateTime) {
    let stamp = dt.format("%m/%d/%Y %H:%M:%S").to_string();
    let _ = std::process::Command::new("SetFile")
        .args(["-d", &stamp, "-m", &stamp])
        .arg(path)
        .output();
}

/// No settable creation time through standard means on this platform.
#[cfg(not(target_os = "macos"))]
fn set_creation_time(_path: &Path, _dt: NaiveDateTime) {}
