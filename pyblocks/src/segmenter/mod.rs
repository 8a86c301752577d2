mod classify;
mod scanner;

use crate::Script;
use crate::block::CodeBlock;

/// Segmenter entry point.
pub struct Segmenter {
    source: String,
    file_id: usize,
}

impl Segmenter {
    pub fn new(source: String, file_id: usize) -> Self {
        Segmenter { source, file_id }
    }

    /// Segment the source into an ordered block sequence.
    /// Total over all inputs: malformed text is grouped best-effort, never rejected.
    pub fn segment(&self) -> Script {
        Script {
            blocks: scanner::segment_lines(&self.source),
            source_id: self.file_id,
        }
    }
}

/// Convenience wrapper when no source ID is needed.
pub fn segment(source: &str) -> Vec<CodeBlock> {
    scanner::segment_lines(source)
}
