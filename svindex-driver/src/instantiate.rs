// SPDX-License-Identifier: Apache-2.0

//! Implements the `instantiate` subcommand: print an instantiation template
//! for a module.

use crate::common::build_index;
use crate::index_config::IndexConfig;
use clap::ArgMatches;

pub fn handle_instantiate(
    matches: &ArgMatches,
    config: &Option<IndexConfig>,
) -> Result<(), String> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("module name argument is required")?;
    let built = build_index(matches, config)?;
    let template = built
        .index
        .synthesize_instantiation(name)
        .map_err(|e| e.to_string())?;
    println!("{}", template);
    Ok(())
}
