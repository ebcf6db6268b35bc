use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use sprite_tint_core::prelude::*;
use sprite_tint_core::{Rounding, shift_pixel};

const SHIFTS: [f64; 9] = [0.0, 1.0, -60.0, 90.0, 179.5, 360.0, -725.25, 1e6, -1e-12];

#[test]
fn transparent_pixels_are_bit_identical() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let px = Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), 0u8]);
        let shift = rng.gen_range(-1000.0..1000.0);
        assert_eq!(shift_pixel(px, shift, Rounding::Nearest), px);
        assert_eq!(shift_pixel(px, shift, Rounding::Truncate), px);
    }
    for s in SHIFTS {
        let px = Rgba([12, 250, 3, 0]);
        assert_eq!(shift_pixel(px, s, Rounding::Nearest), px, "shift={}", s);
    }
}

#[test]
fn alpha_is_preserved_for_every_pixel() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let img = RgbaImage::from_fn(32, 32, |_, _| {
        Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), rng.r#gen()])
    });
    for s in SHIFTS {
        let out = apply_hue_shift(&img, s);
        assert_eq!(out.dimensions(), img.dimensions());
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }
}

#[test]
fn achromatic_pixels_stay_gray() {
    for v in 0..=255u8 {
        for s in SHIFTS {
            let px = Rgba([v, v, v, 200]);
            let n = shift_pixel(px, s, Rounding::Nearest);
            assert_eq!(n, px, "nearest gray {} shift {}", v, s);

            let t = shift_pixel(px, s, Rounding::Truncate);
            assert_eq!(t[0], t[1]);
            assert_eq!(t[1], t[2]);
            assert!((t[0] as i32 - v as i32).abs() <= 1, "truncate gray {} -> {}", v, t[0]);
            assert_eq!(t[3], 200);
        }
    }
}

#[test]
fn black_and_white_are_invariant() {
    let black = Rgba([0, 0, 0, 255]);
    let white = Rgba([255, 255, 255, 255]);
    for s in SHIFTS {
        for r in [Rounding::Nearest, Rounding::Truncate] {
            assert_eq!(shift_pixel(black, s, r), black);
            assert_eq!(shift_pixel(white, s, r), white);
        }
    }
}

#[test]
fn non_finite_shift_does_not_panic() {
    let px = Rgba([200, 100, 50, 255]);
    for s in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let out = shift_pixel(px, s, Rounding::Nearest);
        assert_eq!(out[3], 255);
    }
    assert_eq!(
        shift_pixel(Rgba([1, 2, 3, 0]), f64::NAN, Rounding::Nearest),
        Rgba([1, 2, 3, 0])
    );
}
