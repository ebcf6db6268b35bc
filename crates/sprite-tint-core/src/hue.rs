use crate::config::Rounding;
use image::{Rgba, RgbaImage};

/// Hue/saturation/value triple with every component in `[0, 1]`.
///
/// `h` is a fraction of a full turn (0.5 == 180°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Converts 8-bit RGB to HSV (hexcone model).
///
/// Achromatic inputs (`r == g == b`) get `h = 0` and `s = 0`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max_c = r.max(g).max(b);
    let min_c = r.min(g).min(b);
    let delta = max_c - min_c;

    let h = if delta == 0.0 {
        0.0
    } else if max_c == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max_c == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max_c == 0.0 { 0.0 } else { delta / max_c };

    Hsv {
        h: wrap_unit(h),
        s,
        v: max_c,
    }
}

/// Converts HSV back to 8-bit RGB using the six-sector decomposition.
///
/// `rounding` decides how the scaled `[0, 255]` channel values are quantized.
pub fn hsv_to_rgb(hsv: Hsv, rounding: Rounding) -> [u8; 3] {
    let h = wrap_unit(hsv.h);
    let c = hsv.v * hsv.s;
    let x = c * (1.0 - ((h * 6.0).rem_euclid(2.0) - 1.0).abs());
    let m = hsv.v - c;

    let (r, g, b) = match (h * 6.0).floor() as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        quantize(r + m, rounding),
        quantize(g + m, rounding),
        quantize(b + m, rounding),
    ]
}

/// Rotates the hue of one pixel by `shift_degrees`, keeping alpha.
///
/// Fully transparent pixels come back bit-identical.
pub fn shift_pixel(px: Rgba<u8>, shift_degrees: f64, rounding: Rounding) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    if a == 0 {
        return px;
    }
    let mut hsv = rgb_to_hsv(r, g, b);
    hsv.h = wrap_unit(hsv.h + shift_degrees / 360.0);
    let [r, g, b] = hsv_to_rgb(hsv, rounding);
    Rgba([r, g, b, a])
}

/// Returns a new image whose every visible pixel has its hue rotated by
/// `shift_degrees` (any finite value; taken modulo 360). Uses nearest rounding.
pub fn apply_hue_shift(image: &RgbaImage, shift_degrees: f64) -> RgbaImage {
    apply_hue_shift_with(image, shift_degrees, Rounding::Nearest)
}

/// Same as [`apply_hue_shift`] with an explicit rounding rule.
pub fn apply_hue_shift_with(image: &RgbaImage, shift_degrees: f64, rounding: Rounding) -> RgbaImage {
    let (w, h) = image.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        shift_pixel(*image.get_pixel(x, y), shift_degrees, rounding)
    })
}

/// Maps `t` into `[0, 1)` with true (Euclidean) modulo.
fn wrap_unit(t: f64) -> f64 {
    let w = t.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if w >= 1.0 { 0.0 } else { w }
}

fn quantize(unit: f64, rounding: Rounding) -> u8 {
    let scaled = unit * 255.0;
    let q = match rounding {
        Rounding::Nearest => scaled.round(),
        Rounding::Truncate => scaled.trunc(),
    };
    q.clamp(0.0, 255.0) as u8
}
