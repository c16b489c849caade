//! Single-shot generation smoke test.
//!
//! Loads one pipeline, runs one greedy generation, prints the output.

use clap::error::ErrorKind;
use clap::Parser;
use devbench::Device;
use std::error::Error as _;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

use crate::config::GenerationConfig;
use crate::pipeline::PipelineLoader;

pub const DEFAULT_SINGLE_SHOT_PROMPT: &str = "Once upon a time";

const USAGE: &str = "Usage: devbench-generate <model_path> [prompt] [device]";
const EXAMPLE: &str = "  devbench-generate ./tinyllama-onnx 'Hello, I am' NPU";

#[derive(Parser, Debug, Clone)]
#[command(name = "devbench-generate")]
#[command(about = "Run one generation on one device")]
#[command(version)]
pub struct SingleShotArgs {
    /// Path to the exported model directory
    pub model_path: PathBuf,

    /// Prompt text
    #[arg(default_value = DEFAULT_SINGLE_SHOT_PROMPT)]
    pub prompt: String,

    /// Execution device (CPU, GPU, NPU, ...)
    #[arg(default_value = "NPU")]
    pub device: Device,

    /// Maximum number of new tokens
    #[arg(long, default_value_t = 50)]
    pub max_new_tokens: usize,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Outcome of argument parsing.
#[derive(Debug)]
pub enum Parsed {
    Run(SingleShotArgs),
    /// Stop with this exit status; output has already been written.
    Exit(i32),
}

/// Parses `argv` (including the program name).
///
/// A missing `model_path` prints usage and yields exit status 1.
pub fn parse_single_shot<I, T>(argv: I, out: &mut dyn Write) -> io::Result<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match SingleShotArgs::try_parse_from(argv) {
        Ok(args) => Ok(Parsed::Run(args)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                write!(out, "{}", err.render())?;
                Ok(Parsed::Exit(0))
            }
            ErrorKind::MissingRequiredArgument => {
                write_usage(out)?;
                Ok(Parsed::Exit(1))
            }
            _ => {
                writeln!(out, "{}", err.render())?;
                write_usage(out)?;
                Ok(Parsed::Exit(1))
            }
        },
    }
}

fn write_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", USAGE)?;
    writeln!(out)?;
    writeln!(out, "Example:")?;
    writeln!(out, "{}", EXAMPLE)
}

/// Runs the generation. Returns the process exit status.
///
/// Failures print the error and its source chain, then return 1.
pub fn run_single_shot<L>(args: &SingleShotArgs, loader: &L, out: &mut dyn Write) -> io::Result<i32>
where
    L: PipelineLoader + ?Sized,
{
    writeln!(out, "Loading model from: {}", args.model_path.display())?;
    writeln!(out, "Device: {}", args.device)?;

    let config = GenerationConfig::greedy(args.max_new_tokens);

    let result = loader
        .load(&args.model_path, &args.device)
        .and_then(|mut pipeline| {
            info!("Pipeline loaded, generating");
            pipeline.generate(&args.prompt, &config)
        });

    match result {
        Ok(text) => {
            writeln!(out)?;
            writeln!(out, "Prompt: {}", args.prompt)?;
            writeln!(out)?;
            writeln!(out, "Response:")?;
            writeln!(out, "{}", text)?;
            writeln!(out)?;
            writeln!(out, "Generation complete")?;
            Ok(0)
        }
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            let mut source = e.source();
            while let Some(cause) = source {
                writeln!(out, "  Caused by: {}", cause)?;
                source = cause.source();
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> (Parsed, String) {
        let mut out = Vec::new();
        let parsed = parse_single_shot(argv.iter().copied(), &mut out).unwrap();
        (parsed, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults() {
        let (parsed, _) = parse(&["devbench-generate", "./model"]);
        let Parsed::Run(args) = parsed else {
            panic!("expected args");
        };
        assert_eq!(args.model_path, PathBuf::from("./model"));
        assert_eq!(args.prompt, DEFAULT_SINGLE_SHOT_PROMPT);
        assert_eq!(args.device, Device::Npu);
        assert_eq!(args.max_new_tokens, 50);
    }

    #[test]
    fn test_positional_overrides() {
        let (parsed, _) = parse(&["devbench-generate", "./m", "Hello, I am", "gpu"]);
        let Parsed::Run(args) = parsed else {
            panic!("expected args");
        };
        assert_eq!(args.prompt, "Hello, I am");
        assert_eq!(args.device, Device::Gpu);
    }

    #[test]
    fn test_missing_model_path_prints_usage() {
        let (parsed, out) = parse(&["devbench-generate"]);
        assert!(matches!(parsed, Parsed::Exit(1)));
        assert!(out.starts_with(USAGE));
    }

    #[test]
    fn test_help_exits_zero() {
        let (parsed, out) = parse(&["devbench-generate", "--help"]);
        assert!(matches!(parsed, Parsed::Exit(0)));
        assert!(out.contains("model_path") || out.contains("MODEL_PATH"));
    }
}
