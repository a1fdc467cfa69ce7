//! Batch conversion over a real temp directory with the pure Rust backend.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photo4k::batch::{self, BatchError, BatchEvent};
use photo4k::config::{Config, load_config};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use tempfile::TempDir;

fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 100])
    }));
    img.save_with_format(path, format).unwrap();
}

/// Defaults with the slow bits turned down; the output size is unaffected.
fn quick_config() -> Config {
    let mut config = Config::default();
    config.sharpen.enabled = false;
    config.output.quality = 60;
    config
}

#[test]
fn converts_directory_and_reports_failures() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    fs::create_dir(&input).unwrap();

    write_image(&input.join("wide.png"), 320, 100, ImageFormat::Png);
    write_image(&input.join("Tall.JPG"), 90, 160, ImageFormat::Jpeg);
    fs::write(input.join("broken.jpeg"), b"not a jpeg").unwrap();
    fs::write(input.join("camera.heic"), b"ftypheic").unwrap();
    fs::write(input.join("notes.txt"), b"ignored").unwrap();

    let (tx, rx) = mpsc::channel();
    let report = batch::convert(&input, &output, &quick_config(), Some(tx)).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.errors, 2);
    assert_eq!(report.outcomes.len(), 4);

    for name in ["wide_4K.jpg", "Tall_4K.jpg"] {
        let img = image::open(output.join(name)).unwrap();
        assert_eq!((img.width(), img.height()), (3840, 2160), "{name}");
    }
    assert!(!output.join("broken_4K.jpg").exists());
    assert!(!output.join("camera_4K.jpg").exists());

    let events: Vec<BatchEvent> = rx.iter().collect();
    assert_eq!(events.len(), 5);
    let failures = events
        .iter()
        .filter(|e| matches!(e, BatchEvent::FileFailed { .. }))
        .count();
    assert_eq!(failures, 2);
}

#[test]
fn config_file_in_input_dir_is_honored() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("photo4k.toml"),
        "[output]\nsuffix = \"_uhd\"\nquality = 60\n[sharpen]\nenabled = false\n[input]\nextensions = [\"png\"]\n",
    )
    .unwrap();
    write_image(&input.join("a.png"), 64, 36, ImageFormat::Png);
    write_image(&input.join("b.jpg"), 64, 36, ImageFormat::Jpeg);

    let config = load_config(&input, None).unwrap();
    let report = batch::convert(&input, &output, &config, None).unwrap();

    assert_eq!(report.processed, 1);
    assert!(output.join("a_uhd.jpg").exists());
    assert!(!output.join("b_uhd.jpg").exists());
}

#[test]
fn missing_input_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let result = batch::convert(
        &tmp.path().join("absent"),
        &tmp.path().join("out"),
        &Config::default(),
        None,
    );
    assert!(matches!(result, Err(BatchError::SourceNotFound(_))));
}

#[test]
fn report_is_serializable() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir(&input).unwrap();
    write_image(&input.join("x.png"), 48, 27, ImageFormat::Png);

    let report = batch::convert(&input, &tmp.path().join("out"), &quick_config(), None).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["processed"], 1);
    let outcome = &json["outcomes"][0];
    assert_eq!(outcome["crop"]["axis"], "vertical");
    assert_eq!(outcome["crop"]["rect"]["width"], 48);
    assert!(outcome.get("error").is_none());
}

#[test]
fn same_stem_in_two_formats_converts_only_the_first() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    write_image(&input.join("p.jpg"), 64, 36, ImageFormat::Jpeg);
    write_image(&input.join("p.png"), 128, 36, ImageFormat::Png);

    let report = batch::convert(&input, &output, &quick_config(), None).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.errors, 1);
    assert_eq!(report.outcomes[0].crop.unwrap().rect.width, 64);
    assert!(report.outcomes[1].error.as_ref().unwrap().contains("p.jpg"));

    let written: Vec<_> = fs::read_dir(&output).unwrap().collect();
    assert_eq!(written.len(), 1);
}
