//! devbench-sweep - benchmark text generation across execution devices
//!
//! Usage:
//!     devbench-sweep
//!     devbench-sweep --devices NPU,CPU --max-new-tokens 64 --json

use clap::Parser;
use devbench::{Device, WorkspaceConfig};
use devbench_generate::{run_benchmark, BenchmarkPlan, GenerationConfig, OnnxPipelineLoader, SystemClock};
use std::path::PathBuf;
use tracing::info;

/// Model directory name under the workspace used when `--model` is absent.
const DEFAULT_MODEL_DIR: &str = "tinyllama-npu";

#[derive(Parser, Debug)]
#[command(name = "devbench-sweep")]
#[command(about = "Compare text-generation throughput across CPU, GPU and NPU")]
#[command(version)]
struct Args {
    /// Workspace root (defaults to $DEVBENCH_WORKSPACE or ~/.openclaw/workspace)
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Model directory (defaults to <workspace>/tinyllama-npu)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Prompt for the measured generation
    #[arg(long, default_value = devbench_generate::harness::DEFAULT_PROMPT)]
    prompt: String,

    /// Comma-separated devices, benchmarked in order
    #[arg(long, default_value = "CPU,GPU,NPU")]
    devices: String,

    /// Maximum number of new tokens per generation
    #[arg(long, default_value_t = 100)]
    max_new_tokens: usize,

    /// Enable sampling instead of greedy decoding
    #[arg(long)]
    sample: bool,

    /// Also print the report as JSON
    #[arg(long)]
    json: bool,

    /// Number of threads for inference (0 = auto)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    devbench::tracing::init_with_filter(devbench::tracing::level_filter(&args.log_level));

    info!("Starting devbench-sweep v{}", env!("CARGO_PKG_VERSION"));

    let model_path = match args.model {
        Some(path) => path,
        None => WorkspaceConfig::discover(args.workspace.as_deref())?
            .generation_model_dir(DEFAULT_MODEL_DIR),
    };

    let plan = BenchmarkPlan {
        devices: Device::parse_list(&args.devices)?,
        prompt: args.prompt,
        config: GenerationConfig {
            do_sample: args.sample,
            ..GenerationConfig::greedy(args.max_new_tokens)
        },
        ..BenchmarkPlan::new(model_path)
    };
    plan.validate()?;

    let loader = OnnxPipelineLoader {
        num_threads: args.threads,
    };
    let report = run_benchmark(&plan, &loader, &SystemClock::new());

    println!();
    println!("{}", "=".repeat(60));
    println!("COMPARATIVE SUMMARY");
    println!("{}", "=".repeat(60));
    println!();
    print!("{}", report.render_summary());
    println!();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
