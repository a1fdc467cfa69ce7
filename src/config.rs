//! Converter configuration module.
//!
//! Handles loading, validating, and merging `photo4k.toml`. Stock defaults
//! are the base layer; a user file overrides whatever keys it sets.
//!
//! ## Config File Location
//!
//! The first of these wins:
//!
//! 1. `--config <path>` on the command line (must exist)
//! 2. `photo4k.toml` in the input directory
//! 3. stock defaults
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! quality = 92              # JPEG quality (1-100)
//! progressive = true        # Progressive scan ordering
//! suffix = "_4K"            # Appended to the source file stem
//!
//! [sharpen]
//! enabled = true
//! radius = 1.5              # Gaussian sigma of the unsharp mask
//! amount = 0.5              # Fraction of the difference added back
//! threshold = 0             # Minimum difference before a pixel changes
//!
//! [scan]
//! divisions = 20            # Crop scan step is (max offset / divisions)
//! enhance = true            # Smooth the scoring copy before measuring
//!
//! [input]
//! extensions = ["jpg", "jpeg", "png", "heic", "heif", "bmp", "tiff", "cr2", "nef", "arw"]
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! The output size (3840×2160) is fixed and not configurable.
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{PipelineConfig, Quality, ScanParams, Sharpening};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the input directory.
pub const CONFIG_FILE_NAME: &str = "photo4k.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Converter configuration loaded from `photo4k.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// JPEG encoding and file naming.
    pub output: OutputConfig,
    /// Post-resample unsharp mask.
    pub sharpen: SharpenConfig,
    /// Crop scan granularity.
    pub scan: ScanConfig,
    /// Which files in the input directory are picked up.
    pub input: InputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "output.suffix must not be empty".into(),
            ));
        }
        if self.output.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.suffix must not contain path separators".into(),
            ));
        }
        if self.sharpen.radius.is_nan() || self.sharpen.radius <= 0.0 {
            return Err(ConfigError::Validation(
                "sharpen.radius must be greater than 0".into(),
            ));
        }
        if self.sharpen.amount.is_nan() || self.sharpen.amount < 0.0 {
            return Err(ConfigError::Validation(
                "sharpen.amount must not be negative".into(),
            ));
        }
        if self.scan.divisions == 0 {
            return Err(ConfigError::Validation(
                "scan.divisions must be at least 1".into(),
            ));
        }
        if self.input.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "input.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Build the immutable per-file pipeline settings.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            quality: Quality::new(self.output.quality),
            progressive: self.output.progressive,
            sharpening: self.sharpen.enabled.then(|| Sharpening {
                radius: self.sharpen.radius,
                amount: self.sharpen.amount,
                threshold: self.sharpen.threshold,
            }),
            scan: ScanParams {
                divisions: self.scan.divisions,
                enhance: self.scan.enhance,
            },
            filter: FilterType::Lanczos3,
        }
    }
}

/// JPEG output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Write progressive (SOF2) rather than baseline JPEGs.
    pub progressive: bool,
    /// Appended to the source stem: `beach.png` → `beach_4K.jpg`.
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 92,
            progressive: true,
            suffix: "_4K".to_string(),
        }
    }
}

/// Unsharp-mask settings applied after resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharpenConfig {
    pub enabled: bool,
    pub radius: f32,
    pub amount: f32,
    pub threshold: u8,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        let standard = Sharpening::standard();
        Self {
            enabled: true,
            radius: standard.radius,
            amount: standard.amount,
            threshold: standard.threshold,
        }
    }
}

/// Crop-scan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub divisions: u32,
    pub enhance: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let params = ScanParams::default();
        Self {
            divisions: params.divisions,
            enhance: params.enhance,
        }
    }
}

/// Input selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Extensions without the dot, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: [
                "jpg", "jpeg", "png", "heic", "heif", "bmp", "tiff", "cr2", "nef", "arw",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        }
    }
}

impl InputConfig {
    /// Whether `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config for a run over `input_dir`.
///
/// An explicit path must exist; the implicit `photo4k.toml` is optional.
pub fn load_config(input_dir: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(toml::from_str(&fs::read_to_string(path)?)?),
        None => load_raw_config(&input_dir.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `photo4k.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo4k Configuration
# =====================
# Place this file as photo4k.toml in the input directory, or pass it with
# --config. Every key is optional; omitted keys keep the values shown here.
# Unknown keys are rejected.
#
# Every output is exactly 3840x2160. That size is not configurable.

# ---------------------------------------------------------------------------
# Output files
# ---------------------------------------------------------------------------
[output]
# JPEG quality, 1 (smallest) to 100 (best).
quality = 92

# Progressive JPEGs render coarse-to-fine while loading.
progressive = true

# Output name is <source stem><suffix>.jpg, e.g. beach.png -> beach_4K.jpg
suffix = "_4K"

# ---------------------------------------------------------------------------
# Sharpening after the resize to 3840x2160 (unsharp mask)
# ---------------------------------------------------------------------------
[sharpen]
enabled = true

# Gaussian blur sigma used to build the mask.
radius = 1.5

# Fraction of the (original - blurred) difference added back.
amount = 0.5

# Per-channel differences at or below this value are left alone.
threshold = 0

# ---------------------------------------------------------------------------
# Content-aware crop scan (wide images only)
# ---------------------------------------------------------------------------
[scan]
# The crop window is tried at steps of (max offset / divisions).
divisions = 20

# Smooth the grayscale copy used for scoring, so sensor noise on a flat
# background does not look like detail.
enhance = true

# ---------------------------------------------------------------------------
# Input selection (top level of the input directory only)
# ---------------------------------------------------------------------------
[input]
# Compared case-insensitively. HEIC/HEIF and RAW files are picked up but
# have no decoder in this build; they are reported as per-file errors.
extensions = ["jpg", "jpeg", "png", "heic", "heif", "bmp", "tiff", "cr2", "nef", "arw"]

# ---------------------------------------------------------------------------
# Parallelism
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}
