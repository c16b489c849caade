//! Single-shot CLI tests

use devbench::Device;
use devbench_generate::cli::{parse_single_shot, run_single_shot, Parsed};
use devbench_generate::{GenerateError, GenerationConfig, PipelineLoader, Result, TextGenerator};
use std::cell::{Cell, RefCell};
use std::path::Path;

struct Echo;

impl TextGenerator for Echo {
    fn generate(&mut self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        assert!(!config.do_sample, "single-shot must decode greedily");
        Ok(format!("{} ... and so it ended ({} max)", prompt, config.max_new_tokens))
    }
}

#[derive(Default)]
struct CountingLoader {
    loads: Cell<usize>,
    fail: bool,
    seen: RefCell<Option<(String, Device)>>,
}

impl PipelineLoader for CountingLoader {
    fn load(&self, model_path: &Path, device: &Device) -> Result<Box<dyn TextGenerator>> {
        self.loads.set(self.loads.get() + 1);
        *self.seen.borrow_mut() = Some((model_path.display().to_string(), device.clone()));
        if self.fail {
            return Err(GenerateError::Core(devbench::Error::Runtime(
                "NPU plugin not found".to_string(),
            )));
        }
        Ok(Box::new(Echo))
    }
}

fn run(argv: &[&str], loader: &CountingLoader) -> (i32, String) {
    let mut out = Vec::new();
    let code = match parse_single_shot(argv.iter().copied(), &mut out).unwrap() {
        Parsed::Exit(code) => code,
        Parsed::Run(args) => run_single_shot(&args, loader, &mut out).unwrap(),
    };
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_no_arguments_exits_one_without_loading() {
    let loader = CountingLoader::default();
    let (code, out) = run(&["devbench-generate"], &loader);

    assert_eq!(code, 1);
    assert!(out.contains("Usage: devbench-generate <model_path> [prompt] [device]"));
    assert_eq!(loader.loads.get(), 0);
}

#[test]
fn test_successful_generation() {
    let loader = CountingLoader::default();
    let (code, out) = run(&["devbench-generate", "./tiny", "Hello, I am", "CPU"], &loader);

    assert_eq!(code, 0);
    assert_eq!(loader.loads.get(), 1);
    assert_eq!(
        *loader.seen.borrow(),
        Some(("./tiny".to_string(), Device::Cpu))
    );
    assert!(out.contains("Prompt: Hello, I am"));
    assert!(out.contains("Hello, I am ... and so it ended (50 max)"));
    assert!(out.contains("Generation complete"));
}

#[test]
fn test_failure_prints_error_chain_and_exits_one() {
    let loader = CountingLoader {
        fail: true,
        ..CountingLoader::default()
    };
    let (code, out) = run(&["devbench-generate", "./tiny"], &loader);

    assert_eq!(code, 1);
    assert!(out.contains("Error: runtime error: NPU plugin not found"));
    assert!(!out.contains("Generation complete"));
}

#[test]
fn test_max_new_tokens_flag() {
    let loader = CountingLoader::default();
    let (code, out) = run(
        &["devbench-generate", "./tiny", "Hi", "NPU", "--max-new-tokens", "8"],
        &loader,
    );

    assert_eq!(code, 0);
    assert!(out.contains("(8 max)"));
}
