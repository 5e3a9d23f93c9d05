use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

use imgdate::{date, scan, writer};

const MAX_DIMENSION: u32 = 50;
const QUALITY: u8 = 85;

fn save_png_rgba(path: &Path, img: RgbaImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn save_jpeg(path: &Path, img: RgbImage) {
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Half-red, half-transparent RGBA test image.
fn split_rgba(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for (x, _, p) in img.enumerate_pixels_mut() {
        *p = if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
    }
    img
}

fn run_pipeline(source: &Path, dest: &Path) -> writer::RunSummary {
    let mut media = scan::scan_tree(source).unwrap();
    for m in &mut media {
        m.date = date::extract(&m.filename);
    }
    writer::convert_all(&media, dest, MAX_DIMENSION, QUALITY).unwrap()
}

fn setup_tree(source: &Path) {
    fs::create_dir_all(source.join("trips")).unwrap();
    save_png_rgba(&source.join("2023-12-25_photo.png"), split_rgba(32, 32));
    save_jpeg(
        &source.join("trips/2023.11_shot.jpg"),
        RgbImage::from_pixel(100, 40, Rgb([0, 128, 0])),
    );
    save_png_rgba(&source.join("vacation.png"), split_rgba(8, 8));
}

#[test]
fn test_end_to_end_counts_and_tree() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    setup_tree(source.path());

    let summary = run_pipeline(source.path(), dest.path());
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    // Mirrored tree, extensions normalized to .jpg
    assert!(dest.path().join("2023-12-25_photo.jpg").exists());
    assert!(dest.path().join("trips/2023.11_shot.jpg").exists());
    assert!(!dest.path().join("vacation.jpg").exists());
    assert!(!dest.path().join("vacation.png").exists());
}

#[test]
fn test_resize_and_no_upscale() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    setup_tree(source.path());
    run_pipeline(source.path(), dest.path());

    // 100x40 shrinks so the larger side is MAX_DIMENSION
    let shot = image::open(dest.path().join("trips/2023.11_shot.jpg")).unwrap();
    assert_eq!((shot.width(), shot.height()), (50, 20));

    // 32x32 is within bounds and stays as-is
    let photo = image::open(dest.path().join("2023-12-25_photo.jpg")).unwrap();
    assert_eq!((photo.width(), photo.height()), (32, 32));
}

#[test]
fn test_transparency_flattens_to_white() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    setup_tree(source.path());
    run_pipeline(source.path(), dest.path());

    let photo = image::open(dest.path().join("2023-12-25_photo.jpg"))
        .unwrap()
        .into_rgb8();
    // Sample well inside each half to stay clear of 8x8 block boundaries
    let [r, g, b] = photo.get_pixel(28, 16).0;
    assert!(r >= 250 && g >= 250 && b >= 250, "expected white, got {:?}", (r, g, b));
    let [r, g, _] = photo.get_pixel(4, 16).0;
    assert!(r >= 200 && g <= 80, "expected red, got ({}, {})", r, g);
}

#[test]
fn test_exif_dates_read_back() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    setup_tree(source.path());
    run_pipeline(source.path(), dest.path());

    let bytes = fs::read(dest.path().join("2023-12-25_photo.jpg")).unwrap();
    let data = exif::Reader::new()
        .read_from_container(&mut Cursor::new(&bytes))
        .unwrap();

    for tag in [
        exif::Tag::DateTime,
        exif::Tag::DateTimeOriginal,
        exif::Tag::DateTimeDigitized,
    ] {
        let field = data.get_field(tag, exif::In::PRIMARY).unwrap();
        match &field.value {
            exif::Value::Ascii(v) => assert_eq!(v[0], b"2023:12:25 00:00:00"),
            other => panic!("unexpected value for {}: {:?}", tag, other),
        }
    }

    // Year-month file defaults day to the 1st
    let bytes = fs::read(dest.path().join("trips/2023.11_shot.jpg")).unwrap();
    let data = exif::Reader::new()
        .read_from_container(&mut Cursor::new(&bytes))
        .unwrap();
    let field = data
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .unwrap();
    match &field.value {
        exif::Value::Ascii(v) => assert_eq!(v[0], b"2023:11:01 00:00:00"),
        other => panic!("unexpected value: {:?}", other),
    }
}

#[test]
fn test_idempotent_reruns() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    setup_tree(source.path());

    run_pipeline(source.path(), dest.path());
    let first = fs::read(dest.path().join("2023-12-25_photo.jpg")).unwrap();
    run_pipeline(source.path(), dest.path());
    let second = fs::read(dest.path().join("2023-12-25_photo.jpg")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_orientation_normalized_end_to_end() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(source.path()).unwrap();

    // A 4x2 JPEG tagged orientation 6 (rotate 90 CW to display)
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode_image(&RgbImage::from_pixel(4, 2, Rgb([0, 128, 0])))
        .unwrap();

    let orientation = exif::Field {
        tag: exif::Tag::Orientation,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Short(vec![6]),
    };
    let mut exif_writer = exif::experimental::Writer::new();
    exif_writer.push_field(&orientation);
    let mut buf = Cursor::new(Vec::new());
    exif_writer.write(&mut buf, false).unwrap();
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&buf.into_inner());
    imgdate::metadata::insert_exif_segment(&mut jpeg, &payload);

    fs::write(source.path().join("2023_rotated.jpg"), &jpeg).unwrap();

    let summary = run_pipeline(source.path(), dest.path());
    assert_eq!(summary.processed, 1);

    // Axes swapped by the orientation fix
    let out = image::open(dest.path().join("2023_rotated.jpg")).unwrap();
    assert_eq!((out.width(), out.height()), (2, 4));

    // Output carries no orientation tag other than normal
    let bytes = fs::read(dest.path().join("2023_rotated.jpg")).unwrap();
    let data = exif::Reader::new()
        .read_from_container(&mut Cursor::new(&bytes))
        .unwrap();
    let field = data
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .unwrap();
    assert_eq!(field.value.get_uint(0), Some(1));
}

#[test]
fn test_undecodable_file_counts_as_failure() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(source.path()).unwrap();
    fs::write(source.path().join("2023-01-01_broken.jpg"), b"not a jpeg").unwrap();

    let summary = run_pipeline(source.path(), dest.path());
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 1);
    assert!(!dest.path().join("2023-01-01_broken.jpg").exists());
}
