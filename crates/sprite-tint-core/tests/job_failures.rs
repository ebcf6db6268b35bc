use image::{Rgba, RgbaImage};
use sprite_tint_core::prelude::*;
use sprite_tint_core::FailureKind;
use std::fs;
use std::path::Path;

fn write_sprite(path: &Path) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    RgbaImage::from_pixel(3, 3, Rgba([220, 20, 20, 255]))
        .save(path)
        .expect("save");
}

#[test]
fn undecodable_file_is_skipped_and_recorded() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_sprite(&src.join("walk/0.png"));
    write_sprite(&src.join("walk/1.png"));
    fs::write(src.join("walk/broken.png"), b"definitely not a png").expect("write");

    let report = run_tint(&JobConfig::builder(&src, &dst).hue_shift(30.0).build()).expect("run");

    assert_eq!(report.total, 2);
    assert_eq!(report.count_for("walk"), 2);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, FailureKind::Decode);
    assert!(failure.path.ends_with("walk/broken.png"));
    assert!(!dst.join("walk/broken.png").exists());
    assert!(report.has_failures());
    // nothing was written for the broken file, so counts still agree
    assert_eq!(report.verification, Verification::Match { count: 2 });
    assert!(report.to_string().contains("[decode]"));
}

#[test]
fn unexpected_destination_file_is_a_mismatch_warning() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_sprite(&src.join("a/0.png"));
    write_sprite(&dst.join("a/stale.png"));

    let report = run_tint(&JobConfig::builder(&src, &dst).build()).expect("run");
    assert_eq!(report.total, 1);
    assert_eq!(
        report.verification,
        Verification::Mismatch {
            expected: 1,
            found: 2
        }
    );
    assert!(!report.is_verified());
    assert!(report.to_string().contains("WARNING: expected 1 files but found 2"));
}

#[test]
fn missing_source_fails_before_any_write() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("does-not-exist");
    let dst = tmp.path().join("dst");

    let err = run_tint(&JobConfig::builder(&src, &dst).build()).expect_err("must fail");
    assert!(matches!(err, sprite_tint_core::SpriteTintError::Config(_)));
    assert!(!dst.exists());
}

#[test]
fn unwritable_destination_is_an_encode_failure() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_sprite(&src.join("a/0.png"));
    write_sprite(&src.join("a/1.png"));
    // a directory squats on the output path of a/0.png
    fs::create_dir_all(dst.join("a/0.png")).expect("mkdir");

    let report = run_tint(&JobConfig::builder(&src, &dst).hue_shift(60.0).build()).expect("run");

    assert_eq!(report.total, 1);
    assert_eq!(report.count_for("a"), 1);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, FailureKind::Encode);
    assert!(failure.path.ends_with("a/0.png"));
    assert!(dst.join("a/1.png").is_file());
    assert_eq!(report.verification, Verification::Match { count: 1 });
    assert!(report.to_string().contains("[encode]"));
}

#[test]
fn unwritable_destination_is_a_copy_failure() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_sprite(&src.join("a/0.png"));
    write_sprite(&src.join("a/1.png"));
    fs::create_dir_all(dst.join("a/0.png")).expect("mkdir");

    let report = run_copy(&JobConfig::builder(&src, &dst).build()).expect("run");

    assert_eq!(report.total, 1);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, FailureKind::Copy);
    assert!(failure.path.ends_with("a/0.png"));
    assert_eq!(
        fs::read(dst.join("a/1.png")).expect("read"),
        fs::read(src.join("a/1.png")).expect("read")
    );
    assert_eq!(report.verification, Verification::Match { count: 1 });
    assert!(report.to_string().contains("[copy]"));
}
