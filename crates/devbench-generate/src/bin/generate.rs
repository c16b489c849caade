//! devbench-generate - single-shot generation smoke test
//!
//! Usage:
//!     devbench-generate <model_path> [prompt] [device]

use devbench_generate::cli::{parse_single_shot, run_single_shot, Parsed};
use devbench_generate::OnnxPipelineLoader;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = std::io::stdout();

    let args = match parse_single_shot(std::env::args_os(), &mut stdout) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Exit(code)) => return exit_code(code),
        Err(e) => {
            eprintln!("failed to write output: {}", e);
            return ExitCode::FAILURE;
        }
    };

    devbench::tracing::init_with_filter(devbench::tracing::level_filter(&args.log_level));

    match run_single_shot(&args, &OnnxPipelineLoader::new(), &mut stdout) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
