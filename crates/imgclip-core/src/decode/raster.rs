//! Encoded image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, Orientation, SourceImage};

/// Decode an encoded image (JPEG or PNG) into an RGBA source raster.
///
/// The format is sniffed from the bytes. EXIF orientation is applied so
/// the raster is upright in the crop window the way a camera shot it.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be guessed,
/// `DecodeError::CorruptedFile` if decoding fails, and
/// `DecodeError::EmptyImage` if the result has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgba = apply_orientation(img, orientation).into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }
    Ok(SourceImage::from_rgba_image(rgba))
}

/// EXIF orientation of encoded bytes; `Normal` when there is no EXIF block.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 7, 255])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixels.len(), 3 * 2 * 4);
        assert_eq!(img.pixel(2, 1), Some([20, 10, 7, 255]));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_image(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = png_bytes(8, 8);
        match decode_image(&bytes[..24]) {
            Err(DecodeError::CorruptedFile(_)) => {}
            other => panic!("Expected CorruptedFile error, got: {:?}", other),
        }
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(extract_orientation(&png_bytes(2, 2)), Orientation::Normal);
        assert_eq!(extract_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 1));
        let rotated = apply_orientation(img, Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 255, 0, 255]));

        let flipped =
            apply_orientation(DynamicImage::ImageRgba8(src), Orientation::FlipHorizontal)
                .into_rgba8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
