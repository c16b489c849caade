//! devbench-embed - sentence embeddings on CPU, GPU or NPU
//!
//! Usage:
//!     devbench-embed demo
//!     devbench-embed demo --device CPU --model all-MiniLM-L6-v2

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use devbench::{Device, WorkspaceConfig};
use devbench_embeddings::encoder::HfEncoderLoader;
use devbench_embeddings::provision::HubProvisioner;
use devbench_embeddings::runtime::OrtCompiler;
use devbench_embeddings::service::DEFAULT_MODEL;
use devbench_embeddings::{Components, EmbeddingService};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devbench-embed")]
#[command(about = "Sentence embeddings and similarity via ONNX Runtime")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed five multilingual sentences and print pairwise similarities
    Demo {
        /// Execution device (CPU, GPU, NPU, ...)
        #[arg(long, default_value = "NPU")]
        device: Device,

        /// Sentence-transformers model name
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Workspace root (defaults to $DEVBENCH_WORKSPACE or ~/.openclaw/workspace)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Log level (debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: String,
    },
}

fn print_usage() -> std::io::Result<()> {
    println!("Usage:");
    println!("  devbench-embed demo");
    println!();
    println!("Or use the library from your code:");
    println!();
    println!("  use devbench_embeddings::EmbeddingService;");
    println!("  let service = EmbeddingService::new(&workspace, \"all-MiniLM-L6-v2\", Device::Npu)?;");
    println!("  let batch = service.embed(&[\"texto 1\".into(), \"texto 2\".into()])?;");
    println!();
    Cli::command().print_help()
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            print_usage()?;
            return Ok(());
        }
    };

    let Some(Command::Demo {
        device,
        model,
        workspace,
        log_level,
    }) = cli.command
    else {
        print_usage()?;
        return Ok(());
    };

    devbench::tracing::init_with_filter(devbench::tracing::level_filter(&log_level));

    let workspace = WorkspaceConfig::discover(workspace.as_deref())?;
    let provisioner = HubProvisioner::default().with_token(std::env::var("HF_TOKEN").ok());

    let service = EmbeddingService::open(
        &workspace,
        &model,
        device,
        Components {
            compiler: &OrtCompiler::default(),
            provisioner: &provisioner,
            encoders: &HfEncoderLoader::default(),
        },
    )?;

    devbench_embeddings::demo::run_demo(&service, &mut std::io::stdout())?;
    Ok(())
}
