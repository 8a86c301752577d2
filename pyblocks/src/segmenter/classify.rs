use crate::block::BlockKind;

/// Prefix dispatch table for opening constructs, checked in order against the
/// trimmed line. First match wins.
const KIND_PREFIXES: &[(&str, BlockKind)] = &[
    ("def ", BlockKind::Function),
    ("class ", BlockKind::Class),
    ("for ", BlockKind::Loop),
    ("while ", BlockKind::Loop),
    ("if ", BlockKind::Conditional),
    ("elif ", BlockKind::Conditional),
    ("else:", BlockKind::Conditional),
    ("try:", BlockKind::Exception),
    ("except", BlockKind::Exception),
    ("finally:", BlockKind::Exception),
];

/// Classify a line by its opening construct. Expects the line already trimmed.
pub(crate) fn classify_line(trimmed: &str) -> BlockKind {
    for (prefix, kind) in KIND_PREFIXES {
        if trimmed.starts_with(prefix) {
            return *kind;
        }
    }
    BlockKind::Statement
}

/// A line opens a multi-line block when it ends with a colon or introduces
/// a non-statement construct.
pub(crate) fn opens_block(trimmed: &str, kind: BlockKind) -> bool {
    trimmed.ends_with(':') || kind != BlockKind::Statement
}

/// Indentation width in columns: tabs count as 4, spaces as 1.
pub(crate) fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Blank and `#`-comment lines sit outside any block unless a multi-line
/// body is open.
pub(crate) fn is_skippable(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}
