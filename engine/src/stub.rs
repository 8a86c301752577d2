use std::io::Write;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::service::ScriptService;

/// Canned execution service: accepts any code, simulates output by scanning
/// for `print(...)` calls, and approximates memory pressure arithmetically.
/// Stands in for a real interpreter embedding behind [`ScriptService`].
#[derive(Debug, Default)]
pub struct StubService {
    state: Option<StubState>,
}

#[derive(Debug)]
struct StubState {
    config: EngineConfig,
    /// Backing buffer, allocated at the configured size like a real
    /// embedding's heap would be.
    heap: Vec<u8>,
    /// Bytes accrued by executions on top of the runtime baseline.
    accrued: usize,
}

impl StubState {
    /// A quarter of the heap is treated as permanently held by the runtime.
    fn baseline(&self) -> usize {
        self.heap.len() / 4
    }

    fn headroom(&self) -> usize {
        self.heap.len() - self.baseline()
    }
}

impl StubService {
    pub fn new() -> Self {
        StubService::default()
    }
}

impl ScriptService for StubService {
    fn initialize(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        if self.state.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        if config.heap_size == 0 {
            return Err(EngineError::HeapAllocation(0));
        }
        let heap = vec![0u8; config.heap_size];
        self.state = Some(StubState {
            config,
            heap,
            accrued: 0,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        self.state = None;
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn execute(&mut self, code: &str, output: &mut dyn Write) -> Result<(), EngineError> {
        let Some(state) = self.state.as_mut() else {
            return Err(EngineError::NotInitialized);
        };
        if code.trim().is_empty() {
            return Err(EngineError::EmptyCode);
        }

        for argument in print_arguments(code) {
            writeln!(output, "{}", render_print_argument(argument))?;
        }

        // Pretend each execution leaves roughly its source size live on the heap.
        let headroom = state.headroom();
        state.accrued = (state.accrued + code.len()).min(headroom);
        Ok(())
    }

    fn collect_garbage(&mut self) {
        if let Some(state) = self.state.as_mut() {
            if state.config.enable_gc {
                state.accrued = 0;
            }
        }
    }

    fn memory_usage(&self) -> usize {
        self.state
            .as_ref()
            .map(|s| s.baseline() + s.accrued)
            .unwrap_or(0)
    }

    fn heap_size(&self) -> usize {
        self.state.as_ref().map(|s| s.heap.len()).unwrap_or(0)
    }
}

/// Extract the argument text of every `print(...)` call, matching parentheses
/// at depth. An unterminated call is ignored. Purely textual: quotes and
/// comments are not understood.
fn print_arguments(code: &str) -> Vec<&str> {
    let mut arguments = Vec::new();
    let mut rest = code;
    while let Some(pos) = rest.find("print(") {
        let after = &rest[pos + "print(".len()..];
        let mut depth = 1usize;
        let mut close = None;
        for (i, c) in after.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else { break };
        arguments.push(&after[..close]);
        rest = &after[close + 1..];
    }
    arguments
}

/// Strip one pair of matching quotes (and an f-string prefix) so simulated
/// output reads like real print output. Anything else is echoed verbatim.
fn render_print_argument(argument: &str) -> &str {
    let trimmed = argument.trim();
    let unprefixed = trimmed.strip_prefix('f').unwrap_or(trimmed);
    for quote in ['"', '\''] {
        if let Some(inner) = unprefixed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            if !inner.contains(quote) {
                return inner;
            }
        }
    }
    trimmed
}
