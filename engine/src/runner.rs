use std::collections::BTreeMap;
use std::io::Write;
use std::ops::Range;
use std::thread;
use std::time::Duration;

use pyblocks::Script;
use pyblocks::block::{BlockKind, CodeBlock};

use crate::error::EngineError;
use crate::service::ScriptService;

/// Display options for a sequential run. Pacing is cosmetic only and never
/// affects which blocks run or in what order.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Show each block's source in a framed listing before executing it.
    pub show_source: bool,
    /// Print memory telemetry after function/class/loop blocks.
    pub show_memory: bool,
    /// How many leading lines the `>>>` preview echoes.
    pub preview_lines: usize,
    /// Pause inserted around each block, for watchable demo output.
    pub pace: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            show_source: true,
            show_memory: true,
            preview_lines: 3,
            pace: None,
        }
    }
}

/// A block that failed to execute. The run continues past it; earlier side
/// effects are not rolled back.
#[derive(Debug)]
pub struct BlockFailure {
    pub block_index: usize,
    pub kind: BlockKind,
    pub error: EngineError,
    /// Byte span of the failing block in the original source.
    pub span: Range<usize>,
    pub source_id: usize,
}

/// Outcome of a full sequential run.
#[derive(Debug)]
pub struct RunReport {
    pub executed: usize,
    pub failed: usize,
    /// Block count per kind, over all blocks seen.
    pub kind_counts: BTreeMap<BlockKind, usize>,
    /// Usage after the run (post-GC when the service collects).
    pub memory_usage: usize,
    pub heap_size: usize,
    pub failures: Vec<BlockFailure>,
}

/// Execute every block of a script, strictly in order, against the service.
/// Later blocks may depend on definitions from earlier ones, so ordering is a
/// contract. A failing block is recorded and skipped over, not fatal.
pub fn run_script(
    script: &Script,
    service: &mut dyn ScriptService,
    output: &mut dyn Write,
    options: &RunOptions,
) -> Result<RunReport, EngineError> {
    if !service.is_initialized() {
        return Err(EngineError::NotInitialized);
    }

    let mut report = RunReport {
        executed: 0,
        failed: 0,
        kind_counts: BTreeMap::new(),
        memory_usage: service.memory_usage(),
        heap_size: service.heap_size(),
        failures: Vec::new(),
    };

    for (index, block) in script.blocks.iter().enumerate() {
        *report.kind_counts.entry(block.kind).or_insert(0) += 1;

        if options.show_source {
            display_block(block, output)?;
            display_preview(index, block, options.preview_lines, output)?;
        }
        pace(options);

        match service.execute(&block.content, output) {
            Ok(()) => {
                report.executed += 1;
                if options.show_memory && reports_memory(block.kind) {
                    writeln!(output, "  memory usage: {} bytes", service.memory_usage())?;
                }
            }
            Err(error) => {
                report.failed += 1;
                report.failures.push(BlockFailure {
                    block_index: index,
                    kind: block.kind,
                    error,
                    span: block.span.clone(),
                    source_id: script.source_id,
                });
            }
        }
    }

    service.collect_garbage();
    report.memory_usage = service.memory_usage();
    Ok(report)
}

/// Memory telemetry is only interesting for blocks that allocate durably.
fn reports_memory(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::Function | BlockKind::Class | BlockKind::Loop
    )
}

/// Framed source listing with 1-based line numbers.
fn display_block(block: &CodeBlock, output: &mut dyn Write) -> Result<(), EngineError> {
    writeln!(output)?;
    writeln!(
        output,
        "┌─ executing {} (lines {}-{}) ─┐",
        block.kind,
        block.start_line + 1,
        block.end_line + 1
    )?;
    for (offset, line) in block.content.lines().enumerate() {
        writeln!(output, "│ {:>3} │ {}", block.start_line + offset + 1, line)?;
    }
    writeln!(output, "└{}┘", "─".repeat(50))?;
    Ok(())
}

/// REPL-style echo of the first few lines of the block.
fn display_preview(
    index: usize,
    block: &CodeBlock,
    preview_lines: usize,
    output: &mut dyn Write,
) -> Result<(), EngineError> {
    writeln!(output, ">>> [block {} - {}]", index + 1, block.kind)?;
    let lines: Vec<&str> = block.content.lines().collect();
    for line in lines.iter().take(preview_lines) {
        writeln!(output, "... {}", line)?;
    }
    if lines.len() > preview_lines {
        writeln!(output, "... ({} more lines)", lines.len() - preview_lines)?;
    }
    Ok(())
}

fn pace(options: &RunOptions) {
    if let Some(delay) = options.pace {
        thread::sleep(delay);
    }
}
