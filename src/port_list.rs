// SPDX-License-Identifier: Apache-2.0

//! Reduces a module header to its ordered parameter and port identifiers.
//!
//! Parsing is purely textual: each comma-separated entry of the
//! parameter group (`#( ... )`) and of the final parenthesized group (the
//! port list) is stripped of default values and bracketed ranges, and the
//! last remaining whitespace-separated token is taken as the declared name.
//! Types, directions, and widths are discarded.

use crate::comment_scanner::{skip_string_literal, strip_text};
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    pub parameters: Vec<String>,
    pub signals: Vec<String>,
}

fn opens(b: u8) -> bool {
    matches!(b, b'(' | b'[' | b'{')
}

fn closes(b: u8) -> bool {
    matches!(b, b')' | b']' | b'}')
}

/// Returns the `(`..`)` index ranges of the balanced top-level parenthesized
/// groups of `text`, in order. Parentheses inside string literals do not
/// count, and a group left open at the end of `text` is not reported.
fn top_level_groups(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut open = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = skip_string_literal(bytes, i);
                continue;
            }
            b'(' => {
                if depth == 0 {
                    open = i;
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push(open..i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    groups
}

/// Returns the index of the first `stop` byte that is not nested inside
/// `()`, `[]`, `{}` or a string literal.
fn find_top_level(text: &str, stop: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            i = skip_string_literal(bytes, i);
            continue;
        }
        if opens(b) {
            depth += 1;
        } else if closes(b) {
            depth = depth.saturating_sub(1);
        } else if b == stop && depth == 0 {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Splits on commas that are not nested inside brackets or string literals.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = body;
    while let Some(comma) = find_top_level(rest, b',') {
        pieces.push(&rest[..comma]);
        rest = &rest[comma + 1..];
    }
    pieces.push(rest);
    pieces
}

/// Drops a trailing `= default` from a declaration entry.
fn cut_default(entry: &str) -> &str {
    match find_top_level(entry, b'=') {
        Some(eq) => &entry[..eq],
        None => entry,
    }
}

/// Replaces every bracketed range (`[7:0]`, `[N-1:0][3:0]`, ...) with a
/// space so that adjacent tokens stay separated.
fn remove_ranges(entry: &str) -> String {
    let mut out = String::with_capacity(entry.len());
    let mut depth = 0usize;
    for c in entry.chars() {
        match c {
            '[' => {
                if depth == 0 {
                    out.push(' ');
                }
                depth += 1;
            }
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn entry_identifier(entry: &str) -> Option<String> {
    let entry = cut_default(entry.trim());
    remove_ranges(entry)
        .split_whitespace()
        .last()
        .map(|s| s.to_string())
}

fn identifiers(body: &str) -> Vec<String> {
    split_top_level(body)
        .into_iter()
        .filter_map(entry_identifier)
        .collect()
}

/// Parses the parameter and port identifiers out of a raw module header.
///
/// A header with a missing or unbalanced group yields an empty list for that
/// group rather than an error.
pub fn parse_port_list(raw_header: &str) -> PortList {
    let text = strip_text(raw_header);

    let groups = top_level_groups(&text);
    let param_group = text
        .find('#')
        .and_then(|hash| groups.iter().find(|g| g.start > hash).cloned());
    let parameters = match &param_group {
        Some(group) => identifiers(&text[group.start + 1..group.end]),
        None => Vec::new(),
    };

    let signals = match groups.last() {
        Some(group) if Some(group) != param_group.as_ref() => {
            identifiers(&text[group.start + 1..group.end])
        }
        _ => Vec::new(),
    };

    PortList {
        parameters,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test_case("module Foo #(parameter WIDTH=8) (input a, output b);", &["WIDTH"], &["a", "b"]; "parameterized")]
    #[test_case("module Bar(input x, output [7:0] y);", &[], &["x", "y"]; "no parameters")]
    #[test_case("module Empty;", &[], &[]; "empty header")]
    #[test_case("module E();", &[], &[]; "empty port list")]
    #[test_case("module old(a, b, c);", &[], &["a", "b", "c"]; "non-ansi")]
    #[test_case("module m (input wire [3:0] a, b, output reg[7:0]q);", &[], &["a", "b", "q"]; "shared direction and glued range")]
    #[test_case("module m (input logic [N-1:0] mem [0:3], bus_if.master bus);", &[], &["mem", "bus"]; "unpacked and interface port")]
    #[test_case("module m #(parameter int A = 1, B = f(2, 3), parameter type T = logic) (input T x);", &["A", "B", "T"], &["x"]; "defaults with commas")]
    #[test_case("module m #(parameter W = 4);", &["W"], &[]; "parameters only")]
    #[test_case("module m #(parameter S = \"a,b\", parameter W = 1) (input x);", &["S", "W"], &["x"]; "string default with comma")]
    #[test_case("module m #(parameter S = \")\") (input x, output y);", &["S"], &["x", "y"]; "string default with paren")]
    #[test_case("module m #(parameter string S = \"=\\\",\") (input x);", &["S"], &["x"]; "string default with escaped quote")]
    fn test_parse_port_list(header: &str, parameters: &[&str], signals: &[&str]) {
        let got = parse_port_list(header);
        assert_eq!(
            got,
            PortList {
                parameters: strings(parameters),
                signals: strings(signals),
            }
        );
    }

    #[test]
    fn test_comments_are_stripped_before_hash_check() {
        let header = "module m /* #(fake) */ (\n  input a, // b,\n  /* c, */ output d\n);";
        assert_eq!(
            parse_port_list(header),
            PortList {
                parameters: vec![],
                signals: strings(&["a", "d"]),
            }
        );
    }

    #[test]
    fn test_multiline_header_with_comments() {
        let header = "module fifo #(\n  parameter DEPTH = 16, // entries\n  parameter WIDTH = 8\n) (\n  input  logic clk,\n  input  logic [WIDTH-1:0] din, /* data */\n  output logic [WIDTH-1:0] dout\n);";
        assert_eq!(
            parse_port_list(header),
            PortList {
                parameters: strings(&["DEPTH", "WIDTH"]),
                signals: strings(&["clk", "din", "dout"]),
            }
        );
    }

    #[test]
    fn test_unbalanced_port_group_is_empty() {
        let got = parse_port_list("module m #(parameter W = 1) (input a, output b");
        assert_eq!(got.parameters, strings(&["W"]));
        assert!(got.signals.is_empty());

        let got = parse_port_list("module m (input a, output b");
        assert!(got.parameters.is_empty());
        assert!(got.signals.is_empty());
    }

    #[test]
    fn test_trailing_comma_entry_is_skipped() {
        assert_eq!(parse_port_list("module m(input a,);").signals, strings(&["a"]));
    }
}
