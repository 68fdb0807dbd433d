//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. The same
//! structure is the merge target for the layered configuration in
//! [`crate::config`], so every setting can also come from a config file or a
//! `DEPINFO_*` environment variable.

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default build graph snapshot file name.
pub const DEFAULT_GRAPH_FILE: &str = "depinfo-graph.yml";

/// Generate dependency-scanner manifests from a build graph snapshot.
#[derive(Debug, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(author, version, about, long_about = None)]
#[ortho_config(prefix = "DEPINFO")]
pub struct Cli {
    /// Path to the build graph snapshot to read.
    #[arg(short, long, value_name = "GRAPH", default_value = DEFAULT_GRAPH_FILE)]
    #[ortho_config(default = default_graph_path())]
    pub file: PathBuf,

    /// Run as if started in this directory.
    ///
    /// This affects graph lookup, output paths, and config discovery.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Build configuration to generate manifests for.
    #[arg(short = 'c', long, value_name = "CONFIG")]
    pub configuration: Option<String>,

    /// Read settings from this TOML file.
    #[arg(long, value_name = "FILE", env = "DEPINFO_CONFIG_PATH")]
    pub config_file: Option<PathBuf>,

    /// Keep generating the remaining targets after a failure.
    ///
    /// `--keep-going=false` switches off a value set by a config file or the
    /// environment.
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    #[ortho_config(default = false)]
    pub keep_going: bool,

    /// Language whose include path is written out (default `C`).
    #[arg(long, value_name = "LANG")]
    pub reference_language: Option<String>,

    /// Languages that reuse the reference include path.
    ///
    /// Defaults to `CXX,Fortran,ASM`.
    #[arg(long = "alias-language", value_name = "LANG", value_delimiter = ',')]
    pub alias_languages: Option<Vec<String>>,

    /// Enable verbose diagnostic logging.
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Generate);
        }
        self
    }

    /// Resolve a command-line path against `-C/--directory`.
    ///
    /// The directory option behaves like a working directory change for
    /// every relative path supplied on the command line.
    #[must_use]
    pub fn resolve_path<'a>(&self, path: &'a Path) -> Cow<'a, Path> {
        if path.is_relative() {
            self.directory
                .as_ref()
                .map_or_else(|| Cow::Borrowed(path), |dir| Cow::Owned(dir.join(path)))
        } else {
            Cow::Borrowed(path)
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: default_graph_path(),
            directory: None,
            configuration: None,
            config_file: None,
            keep_going: false,
            reference_language: None,
            alias_languages: None,
            verbose: false,
            command: None,
        }
        .with_default_command()
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Write every target manifest and the project manifest `default`.
    Generate,

    /// Write one target's manifest.
    Target {
        /// Name of the target.
        #[arg(value_name = "NAME")]
        name: String,
        /// Output path; `-` writes to stdout.
        #[arg(value_name = "FILE", default_value = "-")]
        file: PathBuf,
    },

    /// Write only the project manifest listing every target manifest.
    Manifest {
        /// Output path; `-` writes to stdout.
        #[arg(value_name = "FILE", default_value = "-")]
        file: PathBuf,
    },
}

/// Return the default graph filename when none is provided.
fn default_graph_path() -> PathBuf {
    PathBuf::from(DEFAULT_GRAPH_FILE)
}

/// Parse CLI arguments, applying the default command.
///
/// Returns both the parsed CLI struct and the `ArgMatches` required for
/// configuration merging.
///
/// # Errors
///
/// Returns the clap error when parsing fails.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(iter)?;
    let cli = Cli::from_arg_matches(&matches)?.with_default_command();
    Ok((cli, matches))
}
