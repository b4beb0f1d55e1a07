// SPDX-License-Identifier: Apache-2.0

//! Source positions, spans, and conversion from byte offsets.
//!
//! Lines and columns are zero-based; columns are byte offsets within the
//! line.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Pos { line, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Pos,
    pub limit: Pos,
}

impl Span {
    pub fn new(start: Pos, limit: Pos) -> Self {
        Span { start, limit }
    }

    pub fn to_human_string(&self) -> String {
        format!(
            "{}:{}..{}:{}",
            self.start.line + 1,
            self.start.col + 1,
            self.limit.line + 1,
            self.limit.col + 1
        )
    }
}

/// Maps byte offsets in a text to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { line_starts }
    }

    pub fn pos(&self, offset: usize) -> Pos {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Pos::new(line, offset - self.line_starts[line])
    }
}

/// Returns the text covered by `span` over `lines`, joining lines with `\n`.
///
/// Out-of-range positions are clamped, so a stale span degrades to a shorter
/// (possibly empty) string instead of panicking.
pub fn line_range<S: AsRef<str>>(lines: &[S], span: &Span) -> String {
    let clamp = |line: &str, col: usize| -> usize {
        let mut col = col.min(line.len());
        while !line.is_char_boundary(col) {
            col -= 1;
        }
        col
    };
    if span.start.line >= lines.len() || span.limit < span.start {
        return String::new();
    }
    let last = span.limit.line.min(lines.len() - 1);
    let mut out = String::new();
    for lineno in span.start.line..=last {
        let line = lines[lineno].as_ref();
        let from = if lineno == span.start.line {
            clamp(line, span.start.col)
        } else {
            0
        };
        let to = if lineno == span.limit.line {
            clamp(line, span.limit.col)
        } else {
            line.len()
        };
        if from < to {
            out.push_str(&line[from..to]);
        }
        if lineno != last {
            out.push('\n');
        }
    }
    out
}
