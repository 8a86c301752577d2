use std::fmt;
use std::ops::Range;

/// Classification of a code block, determined by its opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKind {
    Statement,
    Function,
    Class,
    Loop,
    Conditional,
    Exception,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Statement => "statement",
            BlockKind::Function => "function",
            BlockKind::Class => "class",
            BlockKind::Loop => "loop",
            BlockKind::Conditional => "conditional",
            BlockKind::Exception => "exception",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One logical, contiguous unit of source text destined for individual execution.
/// Blocks are immutable once emitted by the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Exact source text of the block, newline-terminated per line.
    /// Blank lines and comments inside a multi-line body are preserved.
    pub content: String,
    /// Kind fixed at creation from the opening line; never reclassified.
    pub kind: BlockKind,
    /// Zero-based inclusive line index of the first line.
    pub start_line: usize,
    /// Zero-based inclusive line index of the last line. `start_line <= end_line`.
    pub end_line: usize,
    /// Byte span in the original source, for error reporting.
    pub span: Range<usize>,
}

impl CodeBlock {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}
