//! Batch conversion of a directory.
//!
//! Takes every matching file at the top level of the input directory,
//! runs it through the image pipeline, and writes `<stem>_4K.jpg` into the
//! output directory.
//!
//! ## Flow
//!
//! ```text
//! input/                      output/
//! ├── beach.png        →      ├── beach_4K.jpg
//! ├── IMG_0042.JPG     →      ├── IMG_0042_4K.jpg
//! ├── raw/  (ignored)         └── ...
//! └── notes.txt (ignored)
//! ```
//!
//! ## Failure Model
//!
//! Only problems with the directories themselves (missing input, output
//! cannot be created, listing fails) abort the batch. Anything that goes
//! wrong with one file is recorded in the [`BatchReport`], reported as a
//! [`BatchEvent::FileFailed`], and the batch moves on.
//!
//! Inputs that map to the same output name (`p.jpg` and `p.png`) are
//! resolved before any work starts: the first in name order is converted,
//! the rest fail without being decoded.
//!
//! Outputs are written to a hidden `.part` sibling and renamed into place,
//! so a failed or interrupted file never leaves a truncated JPEG behind.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon) on
//! whatever pool the caller installed (see `processing.max_processes`).
//! Each worker owns its image for the whole pipeline; nothing is shared
//! between files except the read-only settings.

use crate::config::{Config, ConfigError, InputConfig};
use crate::imaging::{CropDecision, ImageBackend, PipelineConfig, PipelineError, RustBackend};
use crate::naming;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Source folder does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Progress events emitted while a batch runs.
///
/// Sent over an mpsc channel so the caller can print them as they happen.
/// `index` is 1-based and follows enumeration order; with parallel workers
/// events may arrive out of order.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    FileProcessed {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        crop: CropDecision,
    },
    FileFailed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of a batch, in enumeration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let processed = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            processed,
            errors: outcomes.len() - processed,
            outcomes,
        }
    }
}

/// List the files a batch over `input_dir` would convert.
///
/// Top level only, regular files (or links to them) with a configured
/// extension, sorted by file name.
pub fn collect_inputs(input_dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::SourceNotFound(input_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && input.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Convert every matching file in `input_dir` with the pure Rust backend.
pub fn convert(
    input_dir: &Path,
    output_dir: &Path,
    config: &Config,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let backend = RustBackend::new();
    convert_with_backend(&backend, input_dir, output_dir, config, progress)
}

/// Convert using a specific backend (allows testing with mock).
pub fn convert_with_backend(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    config: &Config,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let inputs = collect_inputs(input_dir, &config.input)?;
    fs::create_dir_all(output_dir)?;

    let pipeline = config.pipeline_config();
    let suffix = config.output.suffix.as_str();
    let emit = |event: BatchEvent| {
        if let Some(tx) = &progress {
            // Receiver gone means nobody is listening; keep converting.
            let _ = tx.send(event);
        }
    };

    info!(
        files = inputs.len(),
        input = %input_dir.display(),
        output = %output_dir.display(),
        "starting batch"
    );
    emit(BatchEvent::Started {
        total: inputs.len(),
    });

    let collisions = output_collisions(&inputs, suffix);
    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .zip(collisions.par_iter())
        .enumerate()
        .map(|(i, (source, collision))| {
            let index = i + 1;
            let result = match collision {
                Some(first) => Err(format!(
                    "output name collides with {}",
                    first.file_name().unwrap_or_default().to_string_lossy()
                )),
                None => convert_one(backend, source, output_dir, suffix, &pipeline)
                    .map_err(|e| e.to_string()),
            };
            match result {
                Ok((output, crop)) => {
                    emit(BatchEvent::FileProcessed {
                        index,
                        source: source.clone(),
                        output: output.clone(),
                        crop,
                    });
                    FileOutcome {
                        source: source.clone(),
                        output: Some(output),
                        crop: Some(crop),
                        error: None,
                    }
                }
                Err(error) => {
                    debug!(source = %source.display(), %error, "file failed");
                    emit(BatchEvent::FileFailed {
                        index,
                        source: source.clone(),
                        error: error.clone(),
                    });
                    FileOutcome {
                        source: source.clone(),
                        output: None,
                        crop: None,
                        error: Some(error),
                    }
                }
            }
        })
        .collect();

    let report = BatchReport::from_outcomes(outcomes);
    info!(
        processed = report.processed,
        errors = report.errors,
        "batch finished"
    );
    Ok(report)
}

/// For each input, the earlier input whose output name it would overwrite.
///
/// Names are compared case-insensitively since the output directory may be
/// on a case-insensitive filesystem. The first file in enumeration order
/// keeps the name.
fn output_collisions(inputs: &[PathBuf], suffix: &str) -> Vec<Option<PathBuf>> {
    let mut claimed: HashMap<String, &PathBuf> = HashMap::new();
    inputs
        .iter()
        .map(|source| {
            let name = naming::output_file_name(source, suffix).to_lowercase();
            match claimed.entry(name) {
                Entry::Occupied(first) => Some((*first.get()).clone()),
                Entry::Vacant(slot) => {
                    slot.insert(source);
                    None
                }
            }
        })
        .collect()
}

/// Decode, process and write one file.
fn convert_one(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    suffix: &str,
    pipeline: &PipelineConfig,
) -> Result<(PathBuf, CropDecision), PipelineError> {
    let decoded = backend.decode(source)?;
    let encoded = backend.process(decoded, pipeline)?;
    let output = naming::output_path(output_dir, source, suffix);
    write_atomic(&output, &encoded.bytes)?;
    Ok((output, encoded.crop))
}

/// Write via a `.part` sibling and rename, removing the sibling on failure.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let part = naming::partial_path(path);
    let result = fs::write(&part, bytes).and_then(|()| fs::rename(&part, path));
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}
