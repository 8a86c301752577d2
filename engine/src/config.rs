/// Default interpreter heap: 64 KiB.
pub const DEFAULT_HEAP_SIZE: usize = 64 * 1024;

/// Configuration for a script execution service.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Heap available to the embedded interpreter, in bytes.
    pub heap_size: usize,
    /// Whether `collect_garbage` actually releases memory.
    pub enable_gc: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            heap_size: DEFAULT_HEAP_SIZE,
            enable_gc: true,
        }
    }
}
