// SPDX-License-Identifier: Apache-2.0

//! Implements the `index` subcommand: build the index and print its status.

use crate::common::build_index;
use crate::index_config::IndexConfig;
use clap::ArgMatches;

pub fn handle_index(matches: &ArgMatches, config: &Option<IndexConfig>) -> Result<(), String> {
    let built = build_index(matches, config)?;
    println!("{}", built.outcome);
    Ok(())
}
