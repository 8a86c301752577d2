pub mod block;
pub mod segmenter;

use crate::block::CodeBlock;

/// A segmented script: the ordered block sequence produced from one source text.
#[derive(Debug, Clone)]
pub struct Script {
    /// Blocks in source order, with strictly increasing, non-overlapping line ranges.
    pub blocks: Vec<CodeBlock>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
