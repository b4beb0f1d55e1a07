// SPDX-License-Identifier: Apache-2.0

//! Implements the `symbols` subcommand: list indexed declarations, either
//! those matching `--query` or those of a single `--file`.

use crate::common::build_index;
use crate::index_config::IndexConfig;
use clap::ArgMatches;
use svindex::DeclarationSymbol;

fn format_symbol(symbol: &DeclarationSymbol) -> String {
    format!(
        "{} {} {}:{}",
        symbol.kind,
        symbol.name,
        symbol.file.display(),
        symbol.span.to_human_string()
    )
}

pub fn handle_symbols(matches: &ArgMatches, config: &Option<IndexConfig>) -> Result<(), String> {
    let built = build_index(matches, config)?;
    let index = &built.index;
    let symbols = if let Some(file) = matches.get_one::<String>("file") {
        index.symbols_in_file(&built.resolve_file(file)?)
    } else {
        let query = matches
            .get_one::<String>("query")
            .map(|s| s.as_str())
            .unwrap_or("");
        index.query(query, matches.get_flag("exact"))
    };
    for symbol in &symbols {
        println!("{}", format_symbol(symbol));
    }
    Ok(())
}
