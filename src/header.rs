// SPDX-License-Identifier: Apache-2.0

//! Locates a module header: the text from the declaration keyword through the
//! `;` that ends the name/parameter/port portion of the declaration.

use crate::comment_scanner::{ScanState, mask_line, skip_string_literal};
use crate::span::{Pos, Span, line_range};

/// Returns the column of the first header-terminating `;` in a line whose
/// comments are already masked, skipping string literals and escaped
/// identifiers (`\foo;bar `).
fn find_terminator(masked: &str) -> Option<usize> {
    let bytes = masked.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string_literal(bytes, i),
            b'\\' => {
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
            }
            b';' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Computes the header span for a declaration whose keyword is at `start`.
///
/// Scanning begins at the keyword itself, so comment text earlier on the
/// same line (including the tail of a block comment opened on a previous
/// line) never contributes a terminator. When no terminator exists before
/// end of file the span ends at `fallback_end`, normally the end of the
/// declared name.
pub fn header_span<S: AsRef<str>>(lines: &[S], start: Pos, fallback_end: Pos) -> Span {
    let mut state = ScanState::Normal;
    for (lineno, line) in lines.iter().enumerate().skip(start.line) {
        let line = line.as_ref();
        let from = if lineno == start.line {
            start.col.min(line.len())
        } else {
            0
        };
        let Some(rest) = line.get(from..) else {
            break;
        };
        let (masked, next) = mask_line(rest, state);
        state = next;
        if let Some(col) = find_terminator(&masked) {
            return Span::new(start, Pos::new(lineno, from + col + 1));
        }
    }
    log::debug!(
        "no header terminator after line {}; using degenerate span",
        start.line + 1
    );
    Span::new(start, fallback_end)
}

/// Returns the literal header text (comments included) for a declaration
/// whose keyword is at `start`.
pub fn extract_header<S: AsRef<str>>(lines: &[S], start: Pos, fallback_end: Pos) -> String {
    line_range(lines, &header_span(lines, start, fallback_end))
}
