// SPDX-License-Identifier: Apache-2.0

//! Line-oriented comment stripping for SystemVerilog/Verilog text.
//!
//! Block comments may span lines, so every entry point takes the
//! [`ScanState`] left behind by the previous line and returns the state for
//! the next one. String literals are passed through untouched; comment
//! markers inside them are not honored.

use std::ops::Range;

/// Comment state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Normal,
    InBlockComment,
}

fn find_from(line: &str, from: usize, needle: &str) -> Option<usize> {
    line[from..].find(needle).map(|p| p + from)
}

/// Returns the index just past the string literal whose opening quote is at
/// `start`, or the line length if the literal is unterminated.
pub(crate) fn skip_string_literal(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Computes the byte ranges of `line` that are code (i.e. not comment text).
///
/// Every range boundary falls on an ASCII byte so the ranges are always valid
/// `str` slice bounds.
pub fn code_segments(line: &str, state: ScanState) -> (Vec<Range<usize>>, ScanState) {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    if state == ScanState::InBlockComment {
        match find_from(line, 0, "*/") {
            Some(close) => i = close + 2,
            None => return (segments, ScanState::InBlockComment),
        }
    }

    let mut start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string_literal(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                if start < i {
                    segments.push(start..i);
                }
                return (segments, ScanState::Normal);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                if start < i {
                    segments.push(start..i);
                }
                match find_from(line, i + 2, "*/") {
                    Some(close) => {
                        i = close + 2;
                        start = i;
                    }
                    None => return (segments, ScanState::InBlockComment),
                }
            }
            _ => i += 1,
        }
    }
    let end = bytes.len();
    if start < end {
        segments.push(start..end);
    }
    (segments, ScanState::Normal)
}

/// Removes comment text from `line`.
pub fn strip_line(line: &str, state: ScanState) -> (String, ScanState) {
    let (segments, next) = code_segments(line, state);
    let mut out = String::with_capacity(line.len());
    for segment in segments {
        out.push_str(&line[segment]);
    }
    (out, next)
}

/// Like [`strip_line`] but replaces comment bytes with spaces, so the result
/// has the same length as `line` and columns still line up with the source.
pub fn mask_line(line: &str, state: ScanState) -> (String, ScanState) {
    let (segments, next) = code_segments(line, state);
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for segment in segments {
        out.extend(std::iter::repeat(' ').take(segment.start - cursor));
        out.push_str(&line[segment.clone()]);
        cursor = segment.end;
    }
    out.extend(std::iter::repeat(' ').take(line.len() - cursor));
    (out, next)
}

/// Replaces the contents of string literals in an already comment-masked
/// line with spaces, keeping the quotes. Byte length is preserved.
fn blank_string_literals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_string = false;
            out.push(c);
            continue;
        }
        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
    }
    out
}

/// Masks every comment in a multi-line text with spaces; when
/// `blank_strings` is set, string literal contents are blanked as well.
///
/// The result has exactly the byte length and line structure of `text`, so
/// offsets found in the masked text index the original.
pub fn mask_text(text: &str, blank_strings: bool) -> String {
    let mut state = ScanState::Normal;
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let (masked, next) = mask_line(line, state);
        state = next;
        if blank_strings {
            lines.push(blank_string_literals(&masked));
        } else {
            lines.push(masked);
        }
    }
    lines.join("\n")
}

/// Strips all comments from a multi-line text. Line structure is kept.
pub fn strip_text(text: &str) -> String {
    let mut state = ScanState::Normal;
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let (stripped, next) = strip_line(line, state);
        state = next;
        lines.push(stripped);
    }
    lines.join("\n")
}
