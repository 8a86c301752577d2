mod test_runner;

use std::path::Path;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use engine::runner::{BlockFailure, RunOptions, RunReport, run_script};
use engine::{EngineConfig, ScriptService, StubService};
use pyblocks::Script;
use pyblocks::segmenter::Segmenter;

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

#[derive(Parser)]
#[command(name = "pyblocks", version, about = "Block-by-block script runner")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a script into blocks and execute them in order
    Run(RunArgs),

    /// Run .test.py fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Script file to segment and execute
    file: String,

    /// Segment only: list the blocks without executing
    #[arg(long)]
    blocks: bool,

    /// Suppress the REPL-style display (failures are still reported)
    #[arg(short, long)]
    quiet: bool,

    /// Interpreter heap size in bytes
    #[arg(long, default_value_t = engine::config::DEFAULT_HEAP_SIZE)]
    heap_size: usize,

    /// Skip the garbage collection pass after the run
    #[arg(long)]
    no_gc: bool,

    /// Pause between blocks, in milliseconds (display pacing only)
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.py file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // Convenience: if the first positional arg is not a known subcommand,
    // inject "run" so `pyblocks script.py` works like `pyblocks run script.py`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        let first_pos = first_pos.clone();
        if !SUBCOMMANDS.contains(&first_pos.as_str()) {
            let pos = args.iter().position(|a| *a == first_pos).unwrap();
            args.insert(pos, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_run(args: RunArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    // Segmentation is total: any text yields a (possibly empty) block sequence.
    let script = Segmenter::new(source, file_id).segment();

    if !args.quiet || args.blocks {
        print_block_inventory(&script);
    }
    if args.blocks {
        return;
    }

    let mut service = StubService::new();
    let config = EngineConfig {
        heap_size: args.heap_size,
        enable_gc: !args.no_gc,
    };
    if let Err(e) = service.initialize(config) {
        eprintln!("error: {}", e);
        process::exit(1);
    }

    let options = RunOptions {
        show_source: !args.quiet,
        show_memory: !args.quiet,
        pace: args.delay_ms.map(Duration::from_millis),
        ..RunOptions::default()
    };

    let result = if args.quiet {
        let mut sink = std::io::sink();
        run_script(&script, &mut service, &mut sink, &options)
    } else {
        let mut stdout = std::io::stdout();
        run_script(&script, &mut service, &mut stdout, &options)
    };

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    // Per-block failures are non-fatal; render them as labelled warnings.
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for failure in &report.failures {
        let diagnostic = failure_diagnostic(failure);
        let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
    }

    if !args.quiet {
        print_summary(&report);
    }

    service.shutdown();
}

fn print_block_inventory(script: &Script) {
    println!("segmented {} blocks:", script.blocks.len());
    for (i, block) in script.blocks.iter().enumerate() {
        println!(
            "  block {}: {} (lines {}-{})",
            i + 1,
            block.kind,
            block.start_line + 1,
            block.end_line + 1
        );
    }
}

fn print_summary(report: &RunReport) {
    println!();
    println!("run summary");
    println!("  blocks executed: {}", report.executed);
    println!("  blocks failed:   {}", report.failed);
    if !report.kind_counts.is_empty() {
        println!("  block kinds:");
        for (kind, count) in &report.kind_counts {
            println!("    {}: {}", kind, count);
        }
    }
    if report.heap_size > 0 {
        let utilization = report.memory_usage as f64 / report.heap_size as f64 * 100.0;
        println!(
            "  memory: {} / {} bytes ({:.1}%)",
            report.memory_usage, report.heap_size, utilization
        );
    }
}

fn failure_diagnostic(failure: &BlockFailure) -> Diagnostic<usize> {
    Diagnostic::new(Severity::Warning)
        .with_message(format!(
            "block {} ({}) failed: {}",
            failure.block_index + 1,
            failure.kind,
            failure.error
        ))
        .with_labels(vec![Label::primary(
            failure.source_id,
            failure.span.clone(),
        )])
}
