use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::error::TransferError;
use crate::image_buffer::ByteImage;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Decode compressed image bytes into a canonical RGB buffer. `field` names
/// the upload for the error message.
pub fn decode(field: &'static str, bytes: &[u8]) -> Result<ByteImage, TransferError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| TransferError::Decode {
        field,
        reason: e.to_string(),
    })?;
    // to_rgb8 flattens any source channel order or alpha into RGB.
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(ByteImage {
        width,
        height,
        data: rgb.into_raw(),
    })
}

/// Serialize a buffer to lossless PNG.
pub fn encode_png(image: &ByteImage) -> anyhow::Result<Vec<u8>> {
    let rgb = RgbImage::from_raw(image.width, image.height, image.data.clone())
        .ok_or_else(|| anyhow::anyhow!("pixel buffer length does not match dimensions"))?;
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb).write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// PNG bytes wrapped as a `data:image/png;base64,` URI for the JSON envelope.
pub fn encode_data_uri(image: &ByteImage) -> anyhow::Result<String> {
    let png = encode_png(image)?;
    Ok(format!("{DATA_URI_PREFIX}{}", BASE64.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> ByteImage {
        ByteImage {
            width: 3,
            height: 2,
            data: vec![
                255, 0, 0, 0, 255, 0, 0, 0, 255, //
                10, 20, 30, 40, 50, 60, 70, 80, 90,
            ],
        }
    }

    #[test]
    fn png_roundtrip_is_pixel_exact() {
        let image = sample_image();
        let png = encode_png(&image).unwrap();
        let decoded = decode("content_image", &png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode("content_image", b"definitely not an image").unwrap_err();
        match err {
            TransferError::Decode { field, .. } => assert_eq!(field, "content_image"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn data_uri_carries_the_png_payload() {
        let image = sample_image();
        let uri = encode_data_uri(&image).unwrap();
        let payload = uri.strip_prefix(DATA_URI_PREFIX).expect("data URI prefix");
        let png = BASE64.decode(payload).unwrap();
        let decoded = decode("content_image", &png).unwrap();
        assert_eq!(decoded, image);
    }
}
