//! Output naming and command-line path handling.
//!
//! Every output lands in the output directory as `<stem><suffix>.jpg`,
//! whatever the input container was:
//! - `beach.png` → `beach_4K.jpg`
//! - `IMG_0042.CR2` → `IMG_0042_4K.jpg`
//! - `holiday.final.jpeg` → `holiday.final_4K.jpg` (only the last extension is dropped)

use std::path::{Path, PathBuf};

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// File name (no directory) of the output for `source`.
pub fn output_file_name(source: &Path, suffix: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{stem}{suffix}.{OUTPUT_EXTENSION}")
}

/// Full output path for `source` inside `output_dir`.
pub fn output_path(output_dir: &Path, source: &Path, suffix: &str) -> PathBuf {
    output_dir.join(output_file_name(source, suffix))
}

/// Temporary sibling an output is written to before being renamed into place.
///
/// Hidden and without a `.jpg` extension, so an interrupted run never leaves
/// anything that looks like a finished output.
pub fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.part"))
}

/// Expand a leading `~/` and resolve against the current directory.
pub fn expand_path(raw: &Path) -> std::io::Result<PathBuf> {
    let expanded = match raw.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => raw.to_path_buf(),
    };
    std::path::absolute(expanded)
}
