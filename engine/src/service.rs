use std::io::Write;
use std::path::Path;

use crate::config::EngineConfig;
use crate::error::EngineError;

/// The script execution capability: something that runs a chunk of source
/// text and reports memory telemetry. The block runner depends only on this
/// trait, never on a concrete embedding.
pub trait ScriptService {
    /// Set up the service with the given configuration.
    /// Fails if already initialized or if the heap cannot be allocated.
    fn initialize(&mut self, config: EngineConfig) -> Result<(), EngineError>;

    /// Release the heap. Idempotent; safe to call when uninitialized.
    fn shutdown(&mut self);

    fn is_initialized(&self) -> bool;

    /// Execute a chunk of source text. Program output goes to `output`.
    fn execute(&mut self, code: &str, output: &mut dyn Write) -> Result<(), EngineError>;

    /// Read a script file and execute its full contents as one chunk.
    fn execute_file(&mut self, path: &Path, output: &mut dyn Write) -> Result<(), EngineError> {
        let code = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("cannot open '{}': {}", path.display(), e)))?;
        self.execute(&code, output)
    }

    /// Run a collection pass. No-op when uninitialized or GC is disabled.
    fn collect_garbage(&mut self);

    /// Bytes currently in use. 0 when uninitialized.
    fn memory_usage(&self) -> usize;

    /// Configured heap size in bytes. 0 when uninitialized.
    fn heap_size(&self) -> usize;
}
