use image::{Rgba, RgbaImage};
use sprite_tint_core::{Rounding, apply_hue_shift_with, hsv_to_rgb, rgb_to_hsv};

// Row of reference pixels; the expected outputs below pin the rounding rules.
fn pinned_image() -> RgbaImage {
    let row = [
        Rgba([255, 0, 0, 255]),
        Rgba([200, 100, 50, 128]),
        Rgba([40, 180, 220, 255]),
        Rgba([128, 128, 128, 77]),
        Rgba([12, 34, 56, 0]),
    ];
    RgbaImage::from_fn(row.len() as u32, 1, |x, _| row[x as usize])
}

fn row(img: &RgbaImage) -> Vec<[u8; 4]> {
    img.pixels().map(|p| p.0).collect()
}

#[test]
fn pinned_nearest_plus_60() {
    let out = apply_hue_shift_with(&pinned_image(), 60.0, Rounding::Nearest);
    assert_eq!(
        row(&out),
        vec![
            [255, 255, 0, 255],
            [150, 200, 50, 128],
            [80, 40, 220, 255],
            [128, 128, 128, 77],
            [12, 34, 56, 0],
        ]
    );
}

#[test]
fn pinned_nearest_minus_90() {
    let out = apply_hue_shift_with(&pinned_image(), -90.0, Rounding::Nearest);
    let px = row(&out);
    assert_eq!(px[1], [175, 50, 200, 128]);
    assert_eq!(px[2], [90, 220, 40, 255]);
    assert_eq!(px[3], [128, 128, 128, 77]);
    assert_eq!(px[4], [12, 34, 56, 0]);
}

#[test]
fn pinned_truncate_drops_a_unit() {
    let img = pinned_image();
    let plus = row(&apply_hue_shift_with(&img, 60.0, Rounding::Truncate));
    assert_eq!(plus[1], [150, 200, 49, 128]);
    assert_eq!(plus[2], [80, 40, 220, 255]);

    let minus = row(&apply_hue_shift_with(&img, -90.0, Rounding::Truncate));
    assert_eq!(minus[1], [175, 49, 200, 128]);
    assert_eq!(minus[2], [89, 220, 40, 255]);

    // truncation is not an exact identity at zero shift
    let zero = row(&apply_hue_shift_with(&img, 0.0, Rounding::Truncate));
    assert_eq!(zero[1], [200, 99, 49, 128]);
}

#[test]
fn primaries_rotate_in_thirds() {
    let red = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
    for rounding in [Rounding::Nearest, Rounding::Truncate] {
        let g = apply_hue_shift_with(&red, 120.0, rounding);
        assert_eq!(g.get_pixel(0, 0).0, [0, 255, 0, 255]);
        let b = apply_hue_shift_with(&red, 240.0, rounding);
        assert_eq!(b.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }
}

#[test]
fn rgb_to_hsv_reference_values() {
    let red = rgb_to_hsv(255, 0, 0);
    assert_eq!((red.h, red.s, red.v), (0.0, 1.0, 1.0));

    let green = rgb_to_hsv(0, 255, 0);
    assert!((green.h - 1.0 / 3.0).abs() < 1e-12);

    let blue = rgb_to_hsv(0, 0, 255);
    assert!((blue.h - 2.0 / 3.0).abs() < 1e-12);

    // magenta-ish red has max == r with g < b: hue wraps to the top of the turn
    let m = rgb_to_hsv(255, 0, 128);
    assert!(m.h > 5.0 / 6.0 && m.h < 1.0);

    let gray = rgb_to_hsv(90, 90, 90);
    assert_eq!((gray.h, gray.s), (0.0, 0.0));

    let black = rgb_to_hsv(0, 0, 0);
    assert_eq!((black.h, black.s, black.v), (0.0, 0.0, 0.0));
}

#[test]
fn hsv_round_trip_is_exact_with_nearest() {
    for (r, g, b) in [(200u8, 100u8, 50u8), (1, 2, 3), (255, 254, 0), (17, 200, 199)] {
        let hsv = rgb_to_hsv(r, g, b);
        assert_eq!(hsv_to_rgb(hsv, Rounding::Nearest), [r, g, b]);
    }
}
