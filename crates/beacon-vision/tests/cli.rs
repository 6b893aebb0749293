use std::path::Path;

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;

fn write_pair_frame(path: &Path) {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([120, 120, 120]));
    for y in 140..340u32 {
        for x in 100..250u32 {
            img.put_pixel(x, y, Rgb([220, 30, 30]));
        }
        for x in 260..410u32 {
            img.put_pixel(x, y, Rgb([30, 30, 220]));
        }
    }
    for (cx, cy) in [(175i32, 240i32), (335, 240)] {
        for y in cy - 15..=cy + 15 {
            for x in cx - 15..=cx + 15 {
                if (x - cx).pow(2) + (y - cy).pow(2) <= 225 {
                    img.put_pixel(x as u32, y as u32, Rgb([0, 0, 0]));
                }
            }
        }
    }
    img.save(path).expect("write png");
}

fn cli() -> Command {
    Command::cargo_bin("beacon-vision").expect("binary")
}

#[test]
fn detects_pair_and_writes_report() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let frame = dir.path().join("frame.png");
    let report = dir.path().join("report.json");
    write_pair_frame(&frame);

    cli()
        .arg(&frame)
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("RED/BLUE score=7 code=ADLR"));

    let raw = std::fs::read_to_string(&report).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["strategy"], "ellipse");
    assert_eq!(json["width"], 640);
    assert_eq!(json["beacons"][0]["code"], "ADLR");
    assert_eq!(json["beacons"][0]["partial"], false);
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let frame = dir.path().join("frame.png");
    let report = dir.path().join("out.json");
    let config = dir.path().join("cfg.json");
    write_pair_frame(&frame);
    let cfg = serde_json::json!({
        "image_path": frame,
        "output_path": report,
        "analyzer": { "min_score": 100 }
    });
    std::fs::write(&config, cfg.to_string()).expect("write cfg");

    cli()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("no beacons"));
    assert!(report.exists());
}

#[test]
fn missing_image_fails() {
    cli()
        .arg("/definitely/not/here.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn no_input_is_rejected() {
    cli()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input image"));
}

#[test]
fn unknown_strategy_is_rejected_by_the_parser() {
    cli()
        .args(["frame.png", "--strategy", "template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template"));
}
