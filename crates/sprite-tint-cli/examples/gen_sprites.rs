//! Generates a small animation tree for trying the CLI:
//! `cargo run -p sprite-tint-cli --example gen_sprites -- demo/player`
//! then `sprite-tint tint demo/player demo/speedster --shift -90`.
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

const DIRECTIONS: [&str; 4] = ["north", "east", "south", "west"];

fn draw_soft_circle(img: &mut RgbaImage, cx: i32, cy: i32, r: f32, rgb: [u8; 3]) {
    let (w, h) = img.dimensions();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d = (dx * dx + dy * dy).sqrt();
            if d <= r {
                // soft alpha near edge 0..1
                let edge = (r - d) / r.max(1.0);
                let a = (edge.clamp(0.0, 1.0) * 255.0) as u8;
                img.put_pixel(x as u32, y as u32, Rgba([rgb[0], rgb[1], rgb[2], a]));
            }
        }
    }
}

fn frame(rng: &mut impl Rng, i: u32) -> RgbaImage {
    let mut img = RgbaImage::new(32, 32);
    let body = [200, 60 + (i * 10) as u8, 40];
    draw_soft_circle(&mut img, 16, 18, 11.0, body);
    let eye = [rng.gen_range(200..=255), rng.gen_range(200..=255), rng.gen_range(200..=255)];
    draw_soft_circle(&mut img, 12 + (i % 3) as i32, 14, 2.5, eye);
    // gray outline pixels stay gray under any shift
    for x in 6..26 {
        img.put_pixel(x, 30, Rgba([90, 90, 90, 255]));
    }
    img
}

fn main() -> anyhow::Result<()> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demo/player"));
    let mut rng = rand::rngs::StdRng::seed_from_u64(30);

    for anim in ["idle-4-frames", "running-8-frames"] {
        let frames: u32 = if anim.starts_with("idle") { 4 } else { 8 };
        for dir in DIRECTIONS {
            let out = root.join(anim).join(dir);
            fs::create_dir_all(&out)?;
            for i in 0..frames {
                frame(&mut rng, i).save(out.join(format!("frame_{i:03}.png")))?;
            }
        }
    }
    // an empty direction folder must still be mirrored
    fs::create_dir_all(root.join("death").join("north"))?;
    println!("wrote sprites under {}", root.display());
    Ok(())
}
