// SPDX-License-Identifier: Apache-2.0

//! Implements the `module` subcommand: print a module's header along with
//! the parameter and signal names parsed from it.

use crate::common::build_index;
use crate::index_config::IndexConfig;
use clap::ArgMatches;
use svindex::SvIndexError;

pub fn handle_module(matches: &ArgMatches, config: &Option<IndexConfig>) -> Result<(), String> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("module name argument is required")?;
    let built = build_index(matches, config)?;
    let header = match matches.get_one::<String>("file") {
        Some(file) => built.index.module_header(name, &built.resolve_file(file)?),
        None => built.index.query_module(name),
    }
    .ok_or_else(|| SvIndexError::ModuleNotFound(name.to_string()).to_string())?;

    let ports = header.port_list();
    println!("// {}", header.file.display());
    println!("{}", header.raw_text);
    println!("parameters: {}", ports.parameters.join(", "));
    println!("signals: {}", ports.signals.join(", "));
    Ok(())
}
