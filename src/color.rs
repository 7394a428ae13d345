//! RGB to CIE LAB conversion and per-channel statistics.
//!
//! LAB decorrelates luminance from chrominance, so matching mean and
//! variance per channel independently stays visually coherent. All
//! conversions assume sRGB with a D65 white point.

const WHITE_X: f32 = 0.950_47;
const WHITE_Z: f32 = 1.088_83;
const LAB_EPSILON: f32 = 0.008_856; // (6/29)^3
const LAB_KAPPA: f32 = 7.787; // (29/6)^2 / 3

/// Valid L range in LAB.
pub const L_RANGE: (f32, f32) = (0.0, 100.0);
/// Valid a/b range in LAB.
pub const AB_RANGE: (f32, f32) = (-128.0, 127.0);

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    let cubed = t * t * t;
    if cubed > LAB_EPSILON {
        cubed
    } else {
        (t - 16.0 / 116.0) / LAB_KAPPA
    }
}

/// Convert one sRGB pixel in `[0, 1]` to LAB. L is in `[0, 100]`, a and b
/// roughly in `[-128, 127]`.
#[inline]
pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let r = srgb_to_linear(r);
    let g = srgb_to_linear(g);
    let b = srgb_to_linear(b);

    let x = (0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / WHITE_X;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175 * b;
    let z = (0.019_333_9 * r + 0.119_192 * g + 0.950_304_1 * b) / WHITE_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Inverse of [`rgb_to_lab`]. Output channels are clamped to `[0, 1]`:
/// LAB coordinates outside the sRGB gamut land on the gamut boundary.
#[inline]
pub fn lab_to_rgb(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = lab_f_inv(fx) * WHITE_X;
    let y = lab_f_inv(fy);
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266 * x + 1.876_010_8 * y + 0.041_556 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    (
        linear_to_srgb(r).clamp(0.0, 1.0),
        linear_to_srgb(g).clamp(0.0, 1.0),
        linear_to_srgb(b).clamp(0.0, 1.0),
    )
}

/// Extract L, a, b planes from interleaved `[0, 1]` RGB values.
pub fn lab_planes_from_rgb(rgb: &[f32]) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let size = rgb.len() / 3;
    let mut l = vec![0.0f32; size];
    let mut a = vec![0.0f32; size];
    let mut b = vec![0.0f32; size];
    for i in 0..size {
        let src = i * 3;
        let (lv, av, bv) = rgb_to_lab(rgb[src], rgb[src + 1], rgb[src + 2]);
        l[i] = lv;
        a[i] = av;
        b[i] = bv;
    }
    (l, a, b)
}

/// Convert L, a, b planes back to interleaved `[0, 1]` RGB values.
pub fn rgb_from_lab_planes(l: &[f32], a: &[f32], b: &[f32]) -> Vec<f32> {
    let size = l.len();
    let mut rgb = vec![0.0f32; size * 3];
    for i in 0..size {
        let (r, g, bv) = lab_to_rgb(l[i], a[i], b[i]);
        let dst = i * 3;
        rgb[dst] = r;
        rgb[dst + 1] = g;
        rgb[dst + 2] = bv;
    }
    rgb
}

/// Mean and population standard deviation of one channel plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f32,
    pub std: f32,
}

/// Accumulates in f64 so the result does not depend on plane length quirks.
pub fn channel_stats(plane: &[f32]) -> ChannelStats {
    let n = plane.len() as f64;
    let mean = plane.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = plane
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    ChannelStats {
        mean: mean as f32,
        std: variance.sqrt() as f32,
    }
}
