// SPDX-License-Identifier: Apache-2.0

//! The `[index]` table of an `svindex.toml` file, and its merge with
//! command line flags. A flag given on the command line always wins over the
//! corresponding config entry.

use clap::ArgMatches;
use serde::Deserialize;
use std::path::Path;
use svindex::{IndexOptions, SvIndexError, TemplateOptions};

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "svindex.toml";

#[derive(Deserialize)]
struct SvIndexToml {
    #[serde(default)]
    index: IndexConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Globs, relative to the indexed root, of files to leave out.
    pub exclude: Option<Vec<String>>,

    /// Files handed to the worker pool per batch.
    pub batch_size: Option<usize>,

    /// Worker threads; defaults to the number of CPUs.
    pub jobs: Option<usize>,

    /// Turns indexing off entirely.
    pub disabled: Option<bool>,

    /// Indentation used for bindings in instantiation templates.
    pub indent: Option<String>,
}

pub fn parse_config(text: &str) -> Result<IndexConfig, SvIndexError> {
    let parsed: SvIndexToml =
        toml::from_str(text).map_err(|e| SvIndexError::Config(e.to_string()))?;
    let config = parsed.index;
    if config.batch_size == Some(0) {
        return Err(SvIndexError::Config(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if config.jobs == Some(0) {
        return Err(SvIndexError::Config("jobs must be at least 1".to_string()));
    }
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<IndexConfig, SvIndexError> {
    let text = std::fs::read_to_string(path).map_err(|e| SvIndexError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_config(&text)
}

/// Exclude globs from `--exclude` if given, else from the config.
pub fn get_excludes(matches: &ArgMatches, config: &Option<IndexConfig>) -> Vec<String> {
    if let Some(values) = matches.get_many::<String>("exclude") {
        values.cloned().collect()
    } else if let Some(config) = config {
        config.exclude.clone().unwrap_or_default()
    } else {
        Vec::new()
    }
}

/// Builds the library options from flags, falling back to config entries and
/// then to the library defaults.
pub fn get_index_options(matches: &ArgMatches, config: &Option<IndexConfig>) -> IndexOptions {
    let defaults = IndexOptions::default();
    let config = config.as_ref();
    let batch_size = matches
        .get_one::<usize>("batch_size")
        .copied()
        .or_else(|| config.and_then(|c| c.batch_size))
        .unwrap_or(defaults.batch_size);
    let jobs = matches
        .get_one::<usize>("jobs")
        .copied()
        .or_else(|| config.and_then(|c| c.jobs))
        .unwrap_or(defaults.jobs);
    let disabled = matches
        .get_one::<String>("disabled")
        .map(|s| s == "true")
        .or_else(|| config.and_then(|c| c.disabled))
        .unwrap_or(defaults.disabled);
    let indent = matches
        .try_get_one::<String>("indent")
        .ok()
        .flatten()
        .cloned()
        .or_else(|| config.and_then(|c| c.indent.clone()))
        .unwrap_or(defaults.template.indent);
    IndexOptions {
        batch_size,
        jobs,
        disabled,
        template: TemplateOptions { indent },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn command() -> clap::Command {
        clap::Command::new("test")
            .arg(Arg::new("exclude").long("exclude").action(ArgAction::Append))
            .arg(
                Arg::new("batch_size")
                    .long("batch_size")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("jobs")
                    .long("jobs")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("disabled")
                    .long("disabled")
                    .value_parser(["true", "false"]),
            )
            .arg(Arg::new("indent").long("indent"))
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
[index]
exclude = ["build/**", "**/*_tb.sv"]
batch_size = 10
jobs = 2
disabled = false
indent = "    "
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            IndexConfig {
                exclude: Some(vec!["build/**".to_string(), "**/*_tb.sv".to_string()]),
                batch_size: Some(10),
                jobs: Some(2),
                disabled: Some(false),
                indent: Some("    ".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_table_is_all_defaults() {
        assert_eq!(parse_config("").unwrap(), IndexConfig::default());
    }

    #[test_case("[index]\nbatch_size = 0\n"; "zero batch size")]
    #[test_case("[index]\njobs = 0\n"; "zero jobs")]
    #[test_case("[index]\nbatch = 3\n"; "unknown key")]
    #[test_case("[index]\nexclude = \"build\"\n"; "exclude not a list")]
    #[test_case("[index\n"; "malformed toml")]
    fn test_invalid_config(text: &str) {
        assert!(matches!(parse_config(text), Err(SvIndexError::Config(_))));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Some(IndexConfig {
            exclude: Some(vec!["a/**".to_string()]),
            batch_size: Some(7),
            jobs: Some(3),
            disabled: Some(true),
            indent: Some("\t".to_string()),
        });
        let matches = command()
            .try_get_matches_from([
                "test",
                "--exclude",
                "b/**",
                "--exclude",
                "c/**",
                "--batch_size",
                "2",
                "--disabled",
                "false",
            ])
            .unwrap();
        let options = get_index_options(&matches, &config);
        assert_eq!(options.batch_size, 2);
        assert_eq!(options.jobs, 3);
        assert!(!options.disabled);
        assert_eq!(options.template.indent, "\t");
        assert_eq!(
            get_excludes(&matches, &config),
            vec!["b/**".to_string(), "c/**".to_string()]
        );
    }

    #[test]
    fn test_defaults_without_config() {
        let matches = command().try_get_matches_from(["test"]).unwrap();
        let options = get_index_options(&matches, &None);
        assert_eq!(options.batch_size, 50);
        assert!(options.jobs >= 1);
        assert!(!options.disabled);
        assert_eq!(options.template.indent, "  ");
        assert!(get_excludes(&matches, &None).is_empty());
    }
}
