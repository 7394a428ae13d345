use fast_image_resize as fr;

/// Neither upload dimension is allowed past this after normalization. Keeps
/// per-pixel work and backend payload sizes bounded.
pub const MAX_DIMENSION: u32 = 1024;

/// Interleaved RGB, one byte per channel, values in `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Interleaved RGB, one f32 per channel, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

/// Scales both dimensions by `max_dimension / max(width, height)` when either
/// exceeds `max_dimension`, preserving aspect ratio. No-op otherwise.
pub fn downscale(image: ByteImage, max_dimension: u32) -> anyhow::Result<ByteImage> {
    if image.width <= max_dimension && image.height <= max_dimension {
        return Ok(image);
    }
    let scale = max_dimension as f64 / image.width.max(image.height) as f64;
    let target_w = ((image.width as f64 * scale) as u32).max(1);
    let target_h = ((image.height as f64 * scale) as u32).max(1);

    let src = fr::images::Image::from_vec_u8(
        image.width,
        image.height,
        image.data,
        fr::PixelType::U8x3,
    )?;
    let mut dst = fr::images::Image::new(target_w, target_h, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    // Box convolution is the area-averaging choice for downscaling.
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));
    resizer.resize(&src, &mut dst, Some(&options))?;

    Ok(ByteImage {
        width: target_w,
        height: target_h,
        data: dst.into_vec(),
    })
}

pub fn to_unit_float(image: &ByteImage) -> FloatImage {
    FloatImage {
        width: image.width,
        height: image.height,
        data: image.data.iter().map(|&v| v as f32 / 255.0).collect(),
    }
}

/// Inverse of [`to_unit_float`]. Clamps to `[0, 1]` first: the recoloring
/// math can overshoot the unit range.
pub fn to_byte_range(image: &FloatImage) -> ByteImage {
    ByteImage {
        width: image.width,
        height: image.height,
        data: image
            .data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect(),
    }
}

/// Deterministic nearest-neighbor resample to an exact target size.
pub fn resample_nearest(image: &FloatImage, target_w: u32, target_h: u32) -> FloatImage {
    if image.width == target_w && image.height == target_h {
        return image.clone();
    }
    let src_w = image.width as usize;
    let src_h = image.height as usize;
    let mut data = Vec::with_capacity(target_w as usize * target_h as usize * 3);
    for y in 0..target_h as usize {
        let sy = (y * src_h / target_h as usize).min(src_h - 1);
        for x in 0..target_w as usize {
            let sx = (x * src_w / target_w as usize).min(src_w - 1);
            let i = (sy * src_w + sx) * 3;
            data.extend_from_slice(&image.data[i..i + 3]);
        }
    }
    FloatImage {
        width: target_w,
        height: target_h,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_bytes(width: u32, height: u32, value: u8) -> ByteImage {
        ByteImage {
            width,
            height,
            data: vec![value; width as usize * height as usize * 3],
        }
    }

    #[test]
    fn downscale_is_noop_within_bounds() {
        let image = flat_bytes(1024, 600, 10);
        let out = downscale(image.clone(), MAX_DIMENSION).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn downscale_bounds_the_long_edge() {
        let out = downscale(flat_bytes(4000, 3000, 128), MAX_DIMENSION).unwrap();
        assert_eq!((out.width, out.height), (1024, 768));
        assert_eq!(out.data.len(), 1024 * 768 * 3);
        // Flat input stays flat through an area average.
        assert!(out.data.iter().all(|&v| v == 128));
    }

    #[test]
    fn downscale_preserves_aspect_for_tall_images() {
        let out = downscale(flat_bytes(200, 2048, 0), MAX_DIMENSION).unwrap();
        assert_eq!((out.width, out.height), (100, 1024));
    }

    #[test]
    fn unit_float_conversion_maps_endpoints() {
        let image = ByteImage {
            width: 1,
            height: 1,
            data: vec![0, 128, 255],
        };
        let float = to_unit_float(&image);
        assert_eq!(float.data[0], 0.0);
        assert!((float.data[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(float.data[2], 1.0);
    }

    #[test]
    fn byte_range_conversion_clamps_overshoot() {
        let float = FloatImage {
            width: 1,
            height: 1,
            data: vec![-0.5, 0.5, 1.5],
        };
        let bytes = to_byte_range(&float);
        assert_eq!(bytes.data, vec![0, 127, 255]);
    }

    #[test]
    fn nearest_resample_hits_exact_target_size() {
        let image = FloatImage {
            width: 2,
            height: 2,
            data: vec![
                0.0, 0.0, 0.0, 1.0, 1.0, 1.0, //
                0.2, 0.2, 0.2, 0.8, 0.8, 0.8,
            ],
        };
        let out = resample_nearest(&image, 3, 5);
        assert_eq!((out.width, out.height), (3, 5));
        assert_eq!(out.data.len(), 3 * 5 * 3);
        // Every output pixel is one of the four source pixels.
        for px in out.data.chunks_exact(3) {
            assert!(px[0] == px[1] && px[1] == px[2]);
        }
    }

    #[test]
    fn nearest_resample_is_identity_at_same_size() {
        let image = FloatImage {
            width: 2,
            height: 1,
            data: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        assert_eq!(resample_nearest(&image, 2, 1), image);
    }
}
