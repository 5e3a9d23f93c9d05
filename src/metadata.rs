use std::io::Cursor;

use chrono::NaiveDateTime;
use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};

const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
const SOFTWARE: &str = "imgdate";

/// Read the EXIF orientation value (1..=8) from raw image bytes.
/// Returns 1 (normal) when there is no EXIF data or no orientation tag.
pub fn orientation_from_bytes(bytes: &[u8]) -> u32 {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|data| {
            data.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|f| f.value.get_uint(0))
        })
        .unwrap_or(1)
}

/// Build an APP1-ready EXIF payload (with `Exif\0\0` header) carrying the
/// given datetime in DateTime, DateTimeOriginal and DateTimeDigitized,
/// plus Orientation = 1 since the pixel buffer is already upright.
pub fn build_date_exif(dt: NaiveDateTime) -> anyhow::Result<Vec<u8>> {
    let date_str = dt.format("%Y:%m:%d %H:%M:%S").to_string().into_bytes();
    let ascii_date = || Value::Ascii(vec![date_str.clone()]);

    let datetime = Field {
        tag: Tag::DateTime,
        ifd_num: In::PRIMARY,
        value: ascii_date(),
    };
    let original = Field {
        tag: Tag::DateTimeOriginal,
        ifd_num: In::PRIMARY,
        value: ascii_date(),
    };
    let digitized = Field {
        tag: Tag::DateTimeDigitized,
        ifd_num: In::PRIMARY,
        value: ascii_date(),
    };
    let orientation = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![1]),
    };
    let software = Field {
        tag: Tag::Software,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![SOFTWARE.as_bytes().to_vec()]),
    };

    let mut writer = Writer::new();
    writer.push_field(&datetime);
    writer.push_field(&original);
    writer.push_field(&digitized);
    writer.push_field(&orientation);
    writer.push_field(&software);

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false)?;
    let tiff = buf.into_inner();

    let mut payload = Vec::with_capacity(EXIF_HEADER.len() + tiff.len());
    payload.extend_from_slice(EXIF_HEADER);
    payload.extend_from_slice(&tiff);
    Ok(payload)
}

/// Splice an EXIF APP1 segment into freshly encoded JPEG bytes, after any
/// leading APP markers (the encoder's JFIF APP0 stays first). Oversized
/// payloads and non-JPEG buffers are left alone.
pub fn insert_exif_segment(jpeg: &mut Vec<u8>, payload: &[u8]) {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return;
    }
    if payload.len() + 2 > u16::MAX as usize {
        return;
    }

    let mut pos = 2;
    while pos + 4 <= jpeg.len() && jpeg[pos] == 0xFF {
        let marker = jpeg[pos + 1];
        if !(0xE0..=0xEF).contains(&marker) {
            break;
        }
        let len = ((jpeg[pos + 2] as usize) << 8) | jpeg[pos + 3] as usize;
        if len < 2 {
            break;
        }
        pos += 2 + len;
    }

    let mut segment = Vec::with_capacity(payload.len() + 4);
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(payload);
    jpeg.splice(pos..pos, segment);
}
