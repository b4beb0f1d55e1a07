// SPDX-License-Identifier: Apache-2.0

//! Command line driver that indexes a SystemVerilog/Verilog source tree and
//! answers queries against it.
//!
//! Commands are given like:
//!
//! ```text
//! svindex-driver <global-options> <command> <root> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - index: Builds the index and prints its status line.
//! - symbols: Lists declarations matching a query, or those in one file.
//! - module: Prints a module's header and its parsed parameter/signal names.
//! - instantiate: Prints an instantiation template for a module.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- index ../rtl
//! $ cargo run -- symbols ../rtl --query fifo
//! $ cargo run -- --config=$HOME/svindex.toml instantiate ../rtl fifo
//! ```

mod common;
mod index;
mod index_config;
mod instantiate;
mod module_info;
mod report_cli_error;
mod symbols;

use crate::index_config::{CONFIG_FILE_NAME, IndexConfig, load_config};
use clap::{Arg, ArgAction, ArgMatches};
use report_cli_error::report_cli_error_and_exit;

trait AppExt {
    fn add_root_arg(self) -> Self;
    fn add_index_args(self) -> Self;
    fn add_module_name_arg(self) -> Self;
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self;
}

impl AppExt for clap::Command {
    fn add_root_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("root")
                .value_name("ROOT")
                .help("Root directory of the source tree to index")
                .required(true)
                .index(1),
        )
    }

    fn add_index_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("exclude")
                    .long("exclude")
                    .value_name("GLOB")
                    .help("Glob (relative to the root) of files to skip; may be repeated")
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("batch_size")
                    .long("batch_size")
                    .value_name("FILES")
                    .help("Number of files processed per batch")
                    .value_parser(clap::value_parser!(usize))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("jobs")
                    .long("jobs")
                    .value_name("THREADS")
                    .help("Worker threads used to process a batch")
                    .value_parser(clap::value_parser!(usize))
                    .action(ArgAction::Set),
            )
            .add_bool_arg("disabled", "Skip indexing entirely")
    }

    fn add_module_name_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("name")
                .value_name("MODULE")
                .help("Name of the module")
                .required(true)
                .index(2),
        )
    }

    /// Adds a boolean argument taking an explicit `true`/`false` value, so an
    /// absent flag can defer to the config file.
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name("BOOL")
                .action(ArgAction::Set)
                .value_parser(["true", "false"])
                .num_args(1)
                .help(help),
        )
    }
}

/// Resolves the config file from `--config`, or from `svindex.toml` in the
/// working directory when the flag is absent.
fn resolve_config(matches: &ArgMatches) -> Option<IndexConfig> {
    let mut config_path: Option<std::path::PathBuf> = matches
        .get_one::<String>("config")
        .map(std::path::PathBuf::from);

    if let Some(path) = &config_path {
        if !path.exists() {
            let cwd = std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            report_cli_error_and_exit(
                "config file does not exist",
                None,
                vec![
                    ("path", &path.display().to_string()),
                    ("working directory", &cwd),
                ],
            );
        }
    } else if let Ok(cwd) = std::env::current_dir() {
        let cwd_config_path = cwd.join(CONFIG_FILE_NAME);
        if cwd_config_path.exists() {
            log::info!(
                "Using {} in current directory: {}",
                CONFIG_FILE_NAME,
                cwd_config_path.display()
            );
            config_path = Some(cwd_config_path);
        }
    }

    config_path.map(|path| match load_config(&path) {
        Ok(config) => config,
        Err(e) => report_cli_error_and_exit(
            &e.to_string(),
            None,
            vec![("path", &path.display().to_string())],
        ),
    })
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "svindex-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("svindex-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Indexes SystemVerilog declarations and synthesizes module instantiations")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to an svindex.toml file")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("index")
                .about("Builds the index and prints its status")
                .add_root_arg()
                .add_index_args(),
        )
        .subcommand(
            clap::Command::new("symbols")
                .about("Lists indexed declarations")
                .add_root_arg()
                .add_index_args()
                .arg(
                    Arg::new("query")
                        .long("query")
                        .value_name("TEXT")
                        .help("Fuzzy (or with --exact, exact) name to search for; empty lists the first symbols")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("exact")
                        .long("exact")
                        .help("Only list names equal to the query")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_name("PATH")
                        .help("List the declarations of this file instead of querying")
                        .conflicts_with_all(["query", "exact"])
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            clap::Command::new("module")
                .about("Prints a module header and its parameter and signal names")
                .add_root_arg()
                .add_module_name_arg()
                .add_index_args()
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_name("PATH")
                        .help("Use the declaration in this file rather than the first one indexed")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            clap::Command::new("instantiate")
                .about("Prints an instantiation template for a module")
                .add_root_arg()
                .add_module_name_arg()
                .add_index_args()
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .value_name("TEXT")
                        .help("Indentation placed before each binding")
                        .action(ArgAction::Set),
                ),
        )
        .get_matches();

    let config = resolve_config(&matches);

    let result = match matches.subcommand() {
        Some(("index", sub)) => index::handle_index(sub, &config),
        Some(("symbols", sub)) => symbols::handle_symbols(sub, &config),
        Some(("module", sub)) => module_info::handle_module(sub, &config),
        Some(("instantiate", sub)) => instantiate::handle_instantiate(sub, &config),
        Some(("version", _)) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => report_cli_error_and_exit("No valid subcommand provided.", None, vec![]),
    };
    if let Err(e) = result {
        let subcommand = matches.subcommand_name();
        report_cli_error_and_exit(&e, subcommand, vec![]);
    }
}
