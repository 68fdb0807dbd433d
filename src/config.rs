//! Layered run configuration.
//!
//! Settings come from, lowest precedence first: built-in defaults, a TOML
//! file, `DEPINFO_*` environment variables and command-line flags. Each layer
//! is composed with `ortho_config` and merged into a [`Cli`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ArgMatches;
use clap::parser::ValueSource;
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{MergeComposer, OrthoMergeExt, OrthoResult, sanitize_value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::GenerateOptions;
use crate::cli::Cli;
pub use crate::error::ConfigError;
use crate::record::IncludePathPolicy;

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "depinfo.toml";

const ENV_PREFIX: &str = "DEPINFO_";

/// Settings as written in the TOML file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    /// Build configuration to generate for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    /// Continue after per-target failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,
    /// Language whose include path is written out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_language: Option<String>,
    /// Languages that alias the reference include path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_languages: Option<Vec<String>>,
    /// Enable debug logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl FileSettings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Locate the config file: the named one, else `depinfo.toml` if present.
fn config_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.config_file {
        return Some(cli.resolve_path(path).into_owned());
    }
    let fallback = cli.resolve_path(Path::new(DEFAULT_CONFIG_FILE)).into_owned();
    fallback.is_file().then_some(fallback)
}

fn read_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FileSettings::from_toml(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Return `true` when no CLI overrides were supplied.
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

/// Keep only the values the user typed on the command line.
///
/// clap fills in defaults for every flag, and those must not mask the file
/// or environment layers underneath.
fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let mut map = match sanitize_value(cli)? {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(ortho_config::OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };

    map.remove("command");
    map.retain(|field, _| matches.value_source(field) == Some(ValueSource::CommandLine));
    Ok(serde_json::Value::Object(map))
}

/// Merge defaults, the config file, the environment and the command line.
///
/// `-C` and `--config-file` locate the config file, so they are taken from
/// `cli` as parsed rather than from the merged layers.
///
/// # Errors
///
/// Returns [`ConfigError`] when a named or discovered config file cannot be
/// read or parsed, or when the layers cannot be merged. A missing default
/// file is not an error.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> Result<Cli, ConfigError> {
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    if let Some(path) = config_path(cli) {
        debug!(path = %path.display(), "loading config file");
        let settings = read_settings(&path)?;
        match sanitize_value(&settings) {
            Ok(value) => composer.push_file(value, None),
            Err(err) => errors.push(err),
        }
    }

    let env_provider = Env::prefixed(ENV_PREFIX)
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition
        .into_merge_result(Cli::merge_from_layers)
        .map_err(|source| ConfigError::Merge { source })?;
    merged.directory.clone_from(&cli.directory);
    merged.config_file.clone_from(&cli.config_file);
    merged.command.clone_from(&cli.command);
    Ok(merged.with_default_command())
}

/// Options for a generation pass under the merged settings.
#[must_use]
pub fn generate_options(cli: &Cli) -> GenerateOptions {
    let defaults = IncludePathPolicy::default();
    GenerateOptions {
        configuration: cli.configuration.clone(),
        keep_going: cli.keep_going,
        include_policy: IncludePathPolicy {
            reference_language: cli
                .reference_language
                .clone()
                .unwrap_or(defaults.reference_language),
            alias_languages: cli
                .alias_languages
                .clone()
                .unwrap_or(defaults.alias_languages),
        },
    }
}
