//! EXIF orientation and APP1 passthrough

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

const ORIENTATION_TAG: u16 = 0x0112;
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Raw EXIF block of a source image
#[derive(Debug, Clone)]
pub(crate) struct ExifBlock {
    /// TIFF-structured EXIF data, without the `Exif\0\0` header
    pub tiff: Vec<u8>,
    pub orientation: Option<u16>,
}

/// Reads the EXIF block from any container `kamadak-exif` understands
pub(crate) fn read_exif(data: &[u8]) -> Option<ExifBlock> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .and_then(|value| u16::try_from(value).ok())
        .filter(|value| (1..=8).contains(value));

    Some(ExifBlock {
        tiff: exif.buf().to_vec(),
        orientation,
    })
}

/// Turns pixels upright for an EXIF orientation value
pub(crate) fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate90().flipv(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Rewrites the IFD0 orientation entry to 1 (upright)
///
/// Returns `false` when the block is malformed or has no orientation entry.
pub(crate) fn reset_orientation(tiff: &mut [u8]) -> bool {
    let big_endian = match tiff.get(0..2) {
        Some(b"MM") => true,
        Some(b"II") => false,
        _ => return false,
    };
    let read_u16 = |buf: &[u8], at: usize| -> Option<u16> {
        let bytes: [u8; 2] = buf.get(at..at + 2)?.try_into().ok()?;
        Some(if big_endian { u16::from_be_bytes(bytes) } else { u16::from_le_bytes(bytes) })
    };
    let read_u32 = |buf: &[u8], at: usize| -> Option<u32> {
        let bytes: [u8; 4] = buf.get(at..at + 4)?.try_into().ok()?;
        Some(if big_endian { u32::from_be_bytes(bytes) } else { u32::from_le_bytes(bytes) })
    };

    let Some(ifd) = read_u32(&*tiff, 4).and_then(|offset| usize::try_from(offset).ok()) else {
        return false;
    };
    let Some(count) = read_u16(&*tiff, ifd) else {
        return false;
    };

    for index in 0..usize::from(count) {
        let entry = ifd + 2 + index * 12;
        if read_u16(&*tiff, entry) != Some(ORIENTATION_TAG) {
            continue;
        }
        // SHORT values are stored left-justified in the 4-byte value field
        let value = if big_endian { 1u16.to_be_bytes() } else { 1u16.to_le_bytes() };
        return match tiff.get_mut(entry + 8..entry + 10) {
            Some(slot) => {
                slot.copy_from_slice(&value);
                true
            }
            None => false,
        };
    }

    false
}

/// Inserts an EXIF APP1 segment right after the JPEG SOI marker
///
/// Returns the input untouched if it is not a JPEG or the block does not fit
/// in a single segment.
pub(crate) fn insert_jpeg_app1(jpeg: Vec<u8>, tiff: &[u8]) -> Vec<u8> {
    if !jpeg.starts_with(&[0xFF, 0xD8]) {
        return jpeg;
    }
    let Ok(length) = u16::try_from(2 + EXIF_HEADER.len() + tiff.len()) else {
        return jpeg;
    };

    let mut out = Vec::with_capacity(jpeg.len() + usize::from(length) + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
