// SPDX-License-Identifier: Apache-2.0

//! Finds `module`/`class`/`interface`/`package`/`program` declarations and
//! pairs each one with its `end<kind>` terminator.
//!
//! Pairing counts nesting depth per kind: a same-kind declaration start
//! between a declaration and its terminator pushes the depth up, and the
//! declaration closes when the depth returns to zero. Comments and string
//! literal contents are masked out before matching so keywords inside them
//! are never seen.

use crate::comment_scanner::mask_text;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DECL_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(virtual)\s+)?(module|class|interface|package|program)\s+(?:automatic\s+)?([A-Za-z_][A-Za-z0-9_$]*)",
    )
    .expect("declaration start regex should compile")
});

static DECL_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bend(module|class|interface|package|program)\b")
        .expect("declaration end regex should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    Module,
    Class,
    Interface,
    Package,
    Program,
}

impl DeclKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "module" => Some(DeclKind::Module),
            "class" => Some(DeclKind::Class),
            "interface" => Some(DeclKind::Interface),
            "package" => Some(DeclKind::Package),
            "program" => Some(DeclKind::Program),
            _ => None,
        }
    }

    const COUNT: usize = 5;

    fn slot(self) -> usize {
        self as usize
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Module => "module",
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
            DeclKind::Package => "package",
            DeclKind::Program => "program",
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// One declaration paired with its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationMatch<'a> {
    pub kind: DeclKind,
    pub name: &'a str,
    /// Byte range of the declared name.
    pub name_range: Range<usize>,
    /// Byte range from the declaration's first keyword (`virtual` included)
    /// through the end of its `end<kind>` terminator.
    pub decl_range: Range<usize>,
}

#[derive(Debug, Clone)]
struct DeclStart {
    kind: DeclKind,
    decl_start: usize,
    name_range: Range<usize>,
}

/// Prepared matcher over one file's text.
///
/// Construction masks the text and locates every declaration start and
/// terminator once; [`DeclarationMatcher::matches`] can then be called any
/// number of times and pairs them up lazily.
pub struct DeclarationMatcher<'a> {
    text: &'a str,
    starts: Vec<DeclStart>,
    /// Terminator end offsets in text order, one list per kind.
    ends: [Vec<usize>; DeclKind::COUNT],
}

impl<'a> DeclarationMatcher<'a> {
    pub fn new(text: &'a str) -> Self {
        let code = mask_text(text, true);
        let mut starts = Vec::new();
        for caps in DECL_START_RE.captures_iter(&code) {
            let (Some(kind_m), Some(name_m)) = (caps.get(2), caps.get(3)) else {
                continue;
            };
            let Some(kind) = DeclKind::from_keyword(kind_m.as_str()) else {
                continue;
            };
            let virtual_m = caps.get(1);
            // `virtual interface foo_if vif;` is a variable declaration.
            if virtual_m.is_some() && kind != DeclKind::Class {
                continue;
            }
            // `interface class Foo;` declares an interface class, not an interface.
            if kind == DeclKind::Interface && name_m.as_str() == "class" {
                continue;
            }
            starts.push(DeclStart {
                kind,
                decl_start: virtual_m.map(|m| m.start()).unwrap_or(kind_m.start()),
                name_range: name_m.range(),
            });
        }
        let mut ends: [Vec<usize>; DeclKind::COUNT] = Default::default();
        for caps in DECL_END_RE.captures_iter(&code) {
            let (Some(whole), Some(kind_m)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(kind) = DeclKind::from_keyword(kind_m.as_str()) {
                ends[kind.slot()].push(whole.end());
            }
        }
        DeclarationMatcher { text, starts, ends }
    }

    pub fn matches(&self) -> DeclarationMatches<'_, 'a> {
        DeclarationMatches {
            matcher: self,
            next_start: 0,
        }
    }

    /// Finds the terminator for `self.starts[index]`, returning the end offset
    /// of its `end<kind>` keyword.
    ///
    /// Only terminators of the same kind after the declared name are visited,
    /// and only until the nesting depth returns to zero.
    fn find_terminator(&self, index: usize) -> Option<usize> {
        let start = &self.starts[index];
        let kind = start.kind;
        let ends = &self.ends[kind.slot()];
        let first = ends.partition_point(|&end| end <= start.name_range.end);
        let mut nested_starts = self.starts[index + 1..]
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.name_range.start)
            .peekable();
        let mut depth = 1usize;
        for &end in &ends[first..] {
            while let Some(&nested) = nested_starts.peek() {
                if nested >= end {
                    break;
                }
                depth += 1;
                nested_starts.next();
            }
            depth -= 1;
            if depth == 0 {
                return Some(end);
            }
        }
        None
    }
}

/// Lazy iterator over the declarations in a file, in start order.
pub struct DeclarationMatches<'m, 'a> {
    matcher: &'m DeclarationMatcher<'a>,
    next_start: usize,
}

impl<'m, 'a> Iterator for DeclarationMatches<'m, 'a> {
    type Item = DeclarationMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_start < self.matcher.starts.len() {
            let index = self.next_start;
            self.next_start += 1;
            let start = &self.matcher.starts[index];
            match self.matcher.find_terminator(index) {
                Some(end) => {
                    return Some(DeclarationMatch {
                        kind: start.kind,
                        name: &self.matcher.text[start.name_range.clone()],
                        name_range: start.name_range.clone(),
                        decl_range: start.decl_start..end,
                    });
                }
                None => {
                    log::debug!(
                        "unterminated {} declaration `{}` at byte {}",
                        start.kind,
                        &self.matcher.text[start.name_range.clone()],
                        start.decl_start
                    );
                }
            }
        }
        None
    }
}

/// Convenience wrapper returning all matches of `text` in start order.
pub fn find_declarations(text: &str) -> Vec<DeclarationMatch<'_>> {
    DeclarationMatcher::new(text).matches().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn summarize(text: &str) -> Vec<(DeclKind, String)> {
        find_declarations(text)
            .into_iter()
            .map(|m| (m.kind, m.name.to_string()))
            .collect()
    }

    #[test_case("module Foo;\nendmodule\n", DeclKind::Module, "Foo"; "module")]
    #[test_case("class Bar;\nendclass\n", DeclKind::Class, "Bar"; "class")]
    #[test_case("interface Bus_if;\nendinterface\n", DeclKind::Interface, "Bus_if"; "interface")]
    #[test_case("package my_pkg;\nendpackage\n", DeclKind::Package, "my_pkg"; "package")]
    #[test_case("program automatic tb;\nendprogram\n", DeclKind::Program, "tb"; "automatic program")]
    #[test_case("  virtual class Base;\n  endclass\n", DeclKind::Class, "Base"; "virtual class")]
    fn test_single_declaration(text: &str, kind: DeclKind, name: &str) {
        assert_eq!(summarize(text), vec![(kind, name.to_string())]);
    }

    #[test]
    fn test_name_range_covers_identifier() {
        let text = "// header\nmodule Foo (input a);\nendmodule\n";
        let matches = find_declarations(text);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(&text[m.name_range.clone()], "Foo");
        assert_eq!(&text[m.decl_range.clone()], "module Foo (input a);\nendmodule");
    }

    #[test]
    fn test_terminator_must_match_kind() {
        let text = "module top;\n  endclass\nendmodule\nclass c;\nendclass\n";
        assert_eq!(
            summarize(text),
            vec![
                (DeclKind::Module, "top".to_string()),
                (DeclKind::Class, "c".to_string())
            ]
        );
        let matches = find_declarations(text);
        assert!(text[matches[0].decl_range.clone()].ends_with("endmodule"));
    }

    #[test]
    fn test_nested_same_kind_is_depth_counted() {
        let text = "module outer;\n  module inner;\n  endmodule\n  wire w;\nendmodule\n";
        let matches = find_declarations(text);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "outer");
        assert!(text[matches[0].decl_range.clone()].ends_with("wire w;\nendmodule"));
        assert_eq!(matches[1].name, "inner");
        assert!(text[matches[1].decl_range.clone()].ends_with("module inner;\n  endmodule"));
    }

    #[test]
    fn test_different_kinds_nest_independently() {
        let text = "package p;\n  class c;\n  endclass\nendpackage\n";
        assert_eq!(
            summarize(text),
            vec![
                (DeclKind::Package, "p".to_string()),
                (DeclKind::Class, "c".to_string())
            ]
        );
    }

    #[test]
    fn test_keywords_in_comments_and_strings_are_ignored() {
        let text = "/*\nmodule ghost;\n*/\nmodule real_one;\n  initial $display(\"endmodule\");\n  // endmodule\nendmodule\n";
        let matches = find_declarations(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "real_one");
        assert!(text[matches[0].decl_range.clone()].ends_with("// endmodule\nendmodule"));
    }

    #[test]
    fn test_unterminated_declaration_is_skipped() {
        let text = "module broken;\nwire w;\nmodule ok;\nendmodule\n";
        // `broken` has no terminator of its own once `ok` claims the only one.
        assert_eq!(summarize(text), vec![(DeclKind::Module, "ok".to_string())]);
    }

    #[test]
    fn test_not_line_anchored_is_not_a_declaration() {
        let text = "typedef class fwd;\nmodule m;\n  virtual interface bus_if vif;\nendmodule\n";
        assert_eq!(summarize(text), vec![(DeclKind::Module, "m".to_string())]);
    }

    #[test]
    fn test_interface_class_is_not_an_interface() {
        let text = "interface class Shape;\nendclass\ninterface bus_if;\nendinterface\n";
        assert_eq!(
            summarize(text),
            vec![(DeclKind::Interface, "bus_if".to_string())]
        );
    }

    #[test]
    fn test_many_sequential_declarations() {
        let text: String = (0..2000)
            .map(|i| format!("module m{};\nendmodule\n", i))
            .collect();
        let matches = find_declarations(&text);
        assert_eq!(matches.len(), 2000);
        assert_eq!(matches[1999].name, "m1999");
        assert!(text[matches[1999].decl_range.clone()].ends_with("endmodule"));
    }

    #[test]
    fn test_matches_are_restartable() {
        let text = "module a;\nendmodule\nmodule b;\nendmodule\n";
        let matcher = DeclarationMatcher::new(text);
        let first: Vec<_> = matcher.matches().map(|m| m.name).collect();
        let second: Vec<_> = matcher.matches().map(|m| m.name).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }
}
