use clap::{Parser, Subcommand};
use photo4k::{batch, config, naming, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that read a config.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// Config file to use instead of <INPUT_DIR>/photo4k.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "photo4k")]
#[command(about = "Batch-convert photos to 3840x2160 progressive JPEGs")]
#[command(long_about = "\
Batch-convert photos to 3840x2160 progressive JPEGs

Every image at the top level of the input directory is cropped to 16:9,
resized to exactly 3840x2160, lightly sharpened and written to the output
directory as <name>_4K.jpg.

Crop placement:
  Wider than 16:9   the crop slides sideways to the most detailed area
  Otherwise         full width, positioned a quarter of the way down the slack

Files that fail to decode are reported and skipped; the rest of the batch
continues.

Run 'photo4k gen-config' to generate a documented photo4k.toml.")]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every photo in INPUT_DIR into OUTPUT_DIR
    Convert {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        /// Write a JSON report of every file's outcome
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
    /// List the files a conversion would pick up, without decoding them
    Check {
        input_dir: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print a stock photo4k.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert {
            input_dir,
            output_dir,
            config: config_args,
            report,
        } => {
            let input_dir = naming::expand_path(&input_dir)?;
            let output_dir = naming::expand_path(&output_dir)?;
            require_source(&input_dir);

            let config = load_config(&input_dir, &config_args)?;
            init_thread_pool(&config.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::convert(&input_dir, &output_dir, &config, Some(tx))?;
            printer.join().map_err(|_| "output thread panicked")?;

            if let Some(report_path) = report {
                let report_path = naming::expand_path(&report_path)?;
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&report_path, json)?;
            }
            output::print_summary(&result);
        }
        Command::Check {
            input_dir,
            config: config_args,
        } => {
            let input_dir = naming::expand_path(&input_dir)?;
            require_source(&input_dir);

            let config = load_config(&input_dir, &config_args)?;
            let files = batch::collect_inputs(&input_dir, &config.input)?;
            output::print_check_output(&input_dir, &files);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for this crate
/// with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "photo4k=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit with the missing-folder message if `input_dir` is not a directory.
fn require_source(input_dir: &Path) {
    if !input_dir.is_dir() {
        output::print_source_missing(input_dir);
        std::process::exit(1);
    }
}

fn load_config(
    input_dir: &Path,
    args: &ConfigArgs,
) -> Result<config::Config, config::ConfigError> {
    let explicit = args
        .config
        .as_deref()
        .map(naming::expand_path)
        .transpose()?;
    config::load_config(input_dir, explicit.as_deref())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
