use pyblocks::block::{BlockKind, CodeBlock};
use pyblocks::segmenter::{Segmenter, segment};

fn kinds(source: &str) -> Vec<BlockKind> {
    segment(source).iter().map(|b| b.kind).collect()
}

fn ranges(source: &str) -> Vec<(usize, usize)> {
    segment(source)
        .iter()
        .map(|b| (b.start_line, b.end_line))
        .collect()
}

#[test]
fn empty_input_yields_no_blocks() {
    assert!(segment("").is_empty());
    assert!(segment("\n").is_empty());
    assert!(segment("   \n\t\n").is_empty());
}

#[test]
fn comment_only_input_yields_no_blocks() {
    assert!(segment("# just a comment\n").is_empty());
    assert!(segment("# one\n\n# two\n").is_empty());
}

#[test]
fn single_statement() {
    let blocks = segment("print(1)\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::Statement);
    assert_eq!(blocks[0].start_line, 0);
    assert_eq!(blocks[0].end_line, 0);
    assert_eq!(blocks[0].content, "print(1)\n");
}

#[test]
fn consecutive_statements_merge() {
    let blocks = segment("x = 1\ny = 2\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "x = 1\ny = 2\n");
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
}

#[test]
fn blank_line_terminates_function_block() {
    let blocks = segment("def f(n):\n    return n * n\n\nx = 1\n");
    assert_eq!(blocks.len(), 2);

    assert_eq!(blocks[0].kind, BlockKind::Function);
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
    assert_eq!(blocks[0].content, "def f(n):\n    return n * n\n");

    assert_eq!(blocks[1].kind, BlockKind::Statement);
    assert_eq!((blocks[1].start_line, blocks[1].end_line), (3, 3));
    assert_eq!(blocks[1].content, "x = 1\n");
}

#[test]
fn dedent_to_zero_closes_conditional() {
    let blocks = segment("if x > 0:\n    print(1)\nz = 1\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Conditional);
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
    assert_eq!(blocks[1].kind, BlockKind::Statement);
    assert_eq!((blocks[1].start_line, blocks[1].end_line), (2, 2));
    assert_eq!(blocks[1].content, "z = 1\n");
}

#[test]
fn consecutive_functions_split() {
    let blocks = segment("def a():\n    return 1\ndef b():\n    return 2\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Function);
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
    assert_eq!(blocks[1].kind, BlockKind::Function);
    assert_eq!((blocks[1].start_line, blocks[1].end_line), (2, 3));
}

#[test]
fn opening_construct_classification() {
    let source = "x = 1\n\ndef f():\n    pass\n\nclass A:\n    pass\n\nfor i in r:\n    pass\n\nwhile t:\n    pass\n\nif c:\n    pass\n\ntry:\n    pass\n";
    assert_eq!(
        kinds(source),
        vec![
            BlockKind::Statement,
            BlockKind::Function,
            BlockKind::Class,
            BlockKind::Loop,
            BlockKind::Loop,
            BlockKind::Conditional,
            BlockKind::Exception,
        ]
    );
}

#[test]
fn continuation_keywords_classify_alone() {
    assert_eq!(kinds("elif x:\n    pass\n"), vec![BlockKind::Conditional]);
    assert_eq!(kinds("else:\n    pass\n"), vec![BlockKind::Conditional]);
    assert_eq!(
        kinds("except ValueError:\n    pass\n"),
        vec![BlockKind::Exception]
    );
    assert_eq!(kinds("finally:\n    pass\n"), vec![BlockKind::Exception]);
}

#[test]
fn comment_terminates_statement_block() {
    let blocks = segment("x = 1\n# note\ny = 2\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].content, "x = 1\n");
    assert_eq!(blocks[1].content, "y = 2\n");
    assert_eq!((blocks[1].start_line, blocks[1].end_line), (2, 2));
}

#[test]
fn interior_blank_lines_preserved_in_body() {
    let blocks = segment("def f():\n    a = 1\n\n    b = 2\nx = f\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Function);
    assert_eq!(blocks[0].content, "def f():\n    a = 1\n\n    b = 2\n");
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 3));
}

#[test]
fn comments_preserved_in_body() {
    let blocks = segment("for i in r:\n    # loop body\n    f(i)\nx = 1\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].content, "for i in r:\n    # loop body\n    f(i)\n");
}

#[test]
fn crlf_normalized() {
    let blocks = segment("x = 1\r\ny = 2\r\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "x = 1\ny = 2\n");
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
}

#[test]
fn unterminated_block_spans_to_end() {
    let blocks = segment("def f():\n    return 1");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::Function);
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 1));
}

#[test]
fn tab_indentation_counts_as_four_columns() {
    let blocks = segment("if x:\n\tpass\nz = 1\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Conditional);
    assert_eq!(blocks[0].content, "if x:\n\tpass\n");
    assert_eq!(blocks[1].content, "z = 1\n");
}

#[test]
fn indented_statement_split_on_return_to_column_zero() {
    let blocks = segment("    x = 1\ny = 2\n");
    assert_eq!(ranges("    x = 1\ny = 2\n"), vec![(0, 0), (1, 1)]);
    assert_eq!(blocks[0].content, "    x = 1\n");
}

#[test]
fn nested_dedent_stays_in_block() {
    // Dedents to a nonzero intermediate level do not split; only a return to
    // column 0 starts a fresh block.
    let blocks = segment("if a:\n    if b:\n        c()\n    d()\ne()\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Conditional);
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 3));
    assert_eq!(blocks[1].content, "e()\n");
}

#[test]
fn line_ranges_are_ordered_and_non_overlapping() {
    let source = "a = 1\n\ndef f():\n    return a\n\nfor i in r:\n    f()\n\nprint(a)\n";
    let blocks = segment(source);
    assert!(!blocks.is_empty());
    for pair in blocks.windows(2) {
        assert!(pair[0].end_line < pair[1].start_line);
    }
    for block in &blocks {
        assert!(block.start_line <= block.end_line);
    }
}

#[test]
fn concatenation_reproduces_non_skipped_lines() {
    let source = "x = 1\n\ndef f():\n    pass\n\n# comment\nclass A:\n    pass\n";
    let joined: String = segment(source)
        .iter()
        .map(|b: &CodeBlock| b.content.as_str())
        .collect();
    assert_eq!(joined, "x = 1\ndef f():\n    pass\nclass A:\n    pass\n");
}

#[test]
fn spans_index_into_source() {
    let source = "x = 1\n\ny = 2\n";
    let blocks = segment(source);
    assert_eq!(blocks.len(), 2);
    assert_eq!(&source[blocks[0].span.clone()], "x = 1");
    assert_eq!(&source[blocks[1].span.clone()], "y = 2");

    let source = "def f():\n    return 1\n";
    let blocks = segment(source);
    assert_eq!(&source[blocks[0].span.clone()], "def f():\n    return 1");
}

#[test]
fn segmenter_carries_source_id() {
    let script = Segmenter::new("x = 1\n".to_string(), 7).segment();
    assert_eq!(script.source_id, 7);
    assert_eq!(script.blocks.len(), 1);
}

#[test]
fn segmentation_is_deterministic() {
    let source = "def f():\n    pass\n\nx = f()\n";
    assert_eq!(segment(source), segment(source));
}
