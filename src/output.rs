//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Converting 3 files → 3840x2160
//! ✅ Processed: beach.png
//!     beach_4K.jpg (crop 5333x3000+412+0, horizontal)
//! ❌ Error on IMG_0042.CR2: Failed to decode /in/IMG_0042.CR2: ...
//! ✅ Processed: portrait.jpg
//!     portrait_4K.jpg (crop 3000x1688+0+578, vertical)
//! 🎉 Processing complete! 2 files processed, 1 errors
//! ```
//!
//! Lines arrive in completion order, which with parallel workers is not
//! necessarily file order.
//!
//! ## Check
//!
//! ```text
//! Input: /home/me/photos
//! 001 beach.png
//! 002 IMG_0042.CR2 (no decoder in this build)
//! 2 files would be converted
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::imaging::rust_backend::can_decode;
use crate::imaging::{TARGET_HEIGHT, TARGET_WIDTH};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// File name of a path for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Convert
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!(
                "Converting {} files \u{2192} {}x{}",
                total, TARGET_WIDTH, TARGET_HEIGHT
            )]
        }
        BatchEvent::FileProcessed {
            source,
            output,
            crop,
            ..
        } => vec![
            format!("\u{2705} Processed: {}", display_name(source)),
            format!(
                "    {} (crop {}, {})",
                display_name(output),
                crop.rect,
                crop.axis
            ),
        ],
        BatchEvent::FileFailed { source, error, .. } => {
            vec![format!(
                "\u{274C} Error on {}: {}",
                display_name(source),
                error
            )]
        }
    }
}

/// Final line of a batch.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    vec![format!(
        "\u{1F389} Processing complete! {} files processed, {} errors",
        report.processed, report.errors
    )]
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

/// Shown instead of running when the input directory is missing.
pub fn format_source_missing(path: &Path) -> Vec<String> {
    vec![format!(
        "\u{274C} Source folder does not exist: {}",
        path.display()
    )]
}

pub fn print_source_missing(path: &Path) {
    for line in format_source_missing(path) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// List the files a conversion would pick up.
///
/// Files whose format has no decoder in this build are flagged; they would
/// be reported as errors by `convert`.
pub fn format_check_output(input_dir: &Path, files: &[impl AsRef<Path>]) -> Vec<String> {
    let mut lines = vec![format!("Input: {}", input_dir.display())];
    for (i, file) in files.iter().enumerate() {
        let file = file.as_ref();
        let decodable = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(can_decode);
        let mut line = format!("{} {}", format_index(i + 1), display_name(file));
        if !decodable {
            line.push_str(" (no decoder in this build)");
        }
        lines.push(line);
    }
    lines.push(format!("{} files would be converted", files.len()));
    lines
}

pub fn print_check_output(input_dir: &Path, files: &[impl AsRef<Path>]) {
    for line in format_check_output(input_dir, files) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FileOutcome;
    use crate::imaging::{CropAxis, CropDecision, Rectangle};
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    // =========================================================================
    // Batch events
    // =========================================================================

    #[test]
    fn started_event_shows_count_and_size() {
        let lines = format_batch_event(&BatchEvent::Started { total: 3 });
        assert_eq!(lines, vec!["Converting 3 files \u{2192} 3840x2160"]);
    }

    #[test]
    fn processed_event_shows_file_name_and_crop() {
        let event = BatchEvent::FileProcessed {
            index: 1,
            source: PathBuf::from("/in/beach.png"),
            output: PathBuf::from("/out/beach_4K.jpg"),
            crop: CropDecision {
                rect: Rectangle::new(412, 0, 5333, 3000),
                axis: CropAxis::Horizontal,
            },
        };
        let lines = format_batch_event(&event);
        assert_eq!(lines[0], "\u{2705} Processed: beach.png");
        assert_eq!(
            lines[1],
            "    beach_4K.jpg (crop 5333x3000+412+0, horizontal)"
        );
    }

    #[test]
    fn failed_event_shows_file_name_and_message() {
        let event = BatchEvent::FileFailed {
            index: 2,
            source: PathBuf::from("/in/IMG_1.CR2"),
            error: "Failed to decode /in/IMG_1.CR2: unsupported".into(),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["\u{274C} Error on IMG_1.CR2: Failed to decode /in/IMG_1.CR2: unsupported"]
        );
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_counts_successes_and_errors() {
        let report = BatchReport {
            processed: 5,
            errors: 2,
            outcomes: Vec::<FileOutcome>::new(),
        };
        assert_eq!(
            format_summary(&report),
            vec!["\u{1F389} Processing complete! 5 files processed, 2 errors"]
        );
    }

    #[test]
    fn source_missing_names_the_path() {
        assert_eq!(
            format_source_missing(Path::new("/nope")),
            vec!["\u{274C} Source folder does not exist: /nope"]
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_lists_files_and_flags_undecodable() {
        let files = [PathBuf::from("/in/a.jpg"), PathBuf::from("/in/b.heic")];
        let lines = format_check_output(Path::new("/in"), &files);
        assert_eq!(
            lines,
            vec![
                "Input: /in",
                "001 a.jpg",
                "002 b.heic (no decoder in this build)",
                "2 files would be converted",
            ]
        );
    }

    #[test]
    fn check_with_no_files() {
        let lines = format_check_output(Path::new("/in"), &Vec::<PathBuf>::new());
        assert_eq!(lines, vec!["Input: /in", "0 files would be converted"]);
    }
}
