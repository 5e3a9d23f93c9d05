use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

/// Apply an EXIF orientation value (1..=8) so the pixel buffer is upright.
/// Unknown values leave the image untouched.
pub fn normalize_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Convert to opaque RGB, compositing any alpha channel over white.
pub fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        dst.0 = [blend(r), blend(g), blend(b)];
    }
    out
}

/// Shrink so the larger dimension equals `max_dimension`, preserving aspect
/// ratio. Images already within bounds are returned unchanged (no upscaling).
pub fn resize_to_fit(img: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = img.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return img;
    }
    let (new_width, new_height) = fit_dimensions(width, height, max_dimension);
    image::imageops::resize(&img, new_width, new_height, FilterType::Lanczos3)
}

/// Target dimensions for a proportional downscale: the larger side becomes
/// `max_dimension`, the other is scaled by the same ratio, rounded to the
/// nearest pixel and clamped to at least 1.
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = (side as f64 * max_dimension as f64 / larger as f64).round() as u32;
        scaled.max(1)
    };
    if width >= height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}
