// SPDX-License-Identifier: Apache-2.0

//! Builds editable instantiation templates for modules.
//!
//! Placeholders use editor snippet syntax (`${n}`). `${1}` is the instance
//! name; parameters and then signals are numbered after it in declaration
//! order.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Indentation placed before each `.name(...)` binding.
    pub indent: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            indent: "  ".to_string(),
        }
    }
}

fn placeholder(n: usize) -> String {
    format!("${{{}}}", n)
}

/// Renders `.name(${n})` bindings, one per line, starting at placeholder
/// `first`.
fn bindings(names: &[String], first: usize, indent: &str) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}.{}({})", indent, name, placeholder(first + i)))
        .collect::<Vec<String>>()
        .join(",\n")
}

/// Synthesizes an instantiation template for `module_name`.
///
/// No reordering or deduplication is done; the result is a textual
/// skeleton, not a checked instantiation.
pub fn synthesize(
    module_name: &str,
    parameters: &[String],
    signals: &[String],
    options: &TemplateOptions,
) -> String {
    let mut out = String::from(module_name);
    if !parameters.is_empty() {
        out.push_str(" #(\n");
        out.push_str(&bindings(parameters, 2, &options.indent));
        out.push_str("\n)");
    }
    out.push(' ');
    out.push_str(&placeholder(1));
    if signals.is_empty() {
        out.push_str(" ();");
    } else {
        out.push_str(" (\n");
        out.push_str(&bindings(
            signals,
            2 + parameters.len(),
            &options.indent,
        ));
        out.push_str("\n);");
    }
    out
}
