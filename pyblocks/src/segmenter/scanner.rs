use std::ops::Range;

use crate::block::{BlockKind, CodeBlock};
use crate::segmenter::classify;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Segment source text into an ordered sequence of code blocks with one
/// left-to-right scan over its lines.
pub(crate) fn segment_lines(source: &str) -> Vec<CodeBlock> {
    let mut state = ScanState::new();
    for (index, line) in split_lines(source).into_iter().enumerate() {
        state.feed(index, line);
    }
    state.finish()
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// A line of the original source, carriage return already stripped.
struct SourceLine<'a> {
    text: &'a str,
    span: Range<usize>,
}

/// A line accumulated into the in-progress block.
struct AccLine<'a> {
    index: usize,
    text: &'a str,
    span: Range<usize>,
    /// Blank or comment-only. Trailing runs of these are trimmed at finalization.
    skippable: bool,
}

/// Mutable scan state threaded through the single pass.
struct ScanState<'a> {
    /// Finalized blocks, in source order.
    blocks: Vec<CodeBlock>,
    /// Lines of the in-progress block. The first line is never skippable.
    acc: Vec<AccLine<'a>>,
    /// Kind of the in-progress block, fixed by its opening line.
    kind: BlockKind,
    /// Last known indentation width of the in-progress block.
    indent: usize,
    /// An opening line (colon or non-statement construct) has been seen and
    /// its indented body has not dedented yet.
    in_multiline: bool,
}

impl<'a> ScanState<'a> {
    fn new() -> Self {
        ScanState {
            blocks: Vec::new(),
            acc: Vec::new(),
            kind: BlockKind::Statement,
            indent: 0,
            in_multiline: false,
        }
    }

    fn feed(&mut self, index: usize, line: SourceLine<'a>) {
        let trimmed = line.text.trim();

        if classify::is_skippable(trimmed) {
            if self.in_multiline {
                // Blank lines and comments inside a body are part of the block.
                self.push_line(index, line, true);
            } else {
                // Outside a body they terminate the current block and are dropped.
                self.finish_block();
            }
            return;
        }

        let kind = classify::classify_line(trimmed);
        let opens = classify::opens_block(trimmed, kind);
        let indent = classify::indent_width(line.text);
        let was_multiline = self.in_multiline;

        // Dedent back to at most the block's recorded indent ends its body.
        // A dedent all the way to column 0 also closes the block: this line
        // belongs to a fresh one.
        if self.in_multiline && indent <= self.indent {
            self.in_multiline = false;
            if indent == 0 {
                self.finish_block();
            }
        }

        // Boundary check between single-line groupings: a new opener, a kind
        // change, or a return to column 0 from an indented block.
        if !was_multiline
            && !self.acc.is_empty()
            && (opens || kind != self.kind || (indent == 0 && self.indent > 0))
        {
            self.finish_block();
        }

        if self.acc.is_empty() {
            self.kind = kind;
            self.indent = indent;
        }

        self.push_line(index, line, false);

        if opens {
            self.in_multiline = true;
            self.indent = indent;
        }
    }

    fn push_line(&mut self, index: usize, line: SourceLine<'a>, skippable: bool) {
        self.acc.push(AccLine {
            index,
            text: line.text,
            span: line.span,
            skippable,
        });
    }

    /// Emit the in-progress block, trimming trailing blank/comment lines so a
    /// body-terminating blank line is dropped rather than kept as content.
    fn finish_block(&mut self) {
        while self.acc.last().is_some_and(|l| l.skippable) {
            self.acc.pop();
        }

        if let (Some(first), Some(last)) = (self.acc.first(), self.acc.last()) {
            let mut content = String::new();
            for line in &self.acc {
                content.push_str(line.text);
                content.push('\n');
            }
            self.blocks.push(CodeBlock {
                content,
                kind: self.kind,
                start_line: first.index,
                end_line: last.index,
                span: first.span.start..last.span.end,
            });
        }

        self.acc.clear();
        self.kind = BlockKind::Statement;
    }

    fn finish(mut self) -> Vec<CodeBlock> {
        self.finish_block();
        self.blocks
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split on newlines, keeping byte spans and normalizing CRLF to LF semantics.
fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push(SourceLine {
            text,
            span: offset..offset + text.len(),
        });
        offset += raw.len() + 1;
    }
    // A trailing newline yields a spurious empty final line.
    if source.ends_with('\n') {
        lines.pop();
    }
    lines
}
