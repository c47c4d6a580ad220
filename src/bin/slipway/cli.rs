//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use slipway::core::Linkage;
use slipway::resolver::ChainPolicy;

/// Slipway - resolves native library requirements of a build
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Slipway.toml (default: search upward from the current directory)
    #[arg(long, global = true, env = "SLIPWAY_MANIFEST")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the binaries a library requirement resolves to
    Resolve(ResolveArgs),

    /// List declared libraries
    Libraries(LibrariesArgs),

    /// List build units
    Units,

    /// Resolve every declared library requirement
    Check(CheckArgs),

    /// Show or change resolution settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Build unit declaring the library (e.g. `:lib:core`)
    pub unit: String,

    /// Library name
    pub library: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub resolve: ResolveFlags,
}

/// Flags overriding the `[resolve]` config.
#[derive(Args)]
pub struct ResolveFlags {
    /// How locator answers are combined
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Do not search prebuilt repositories
    #[arg(long)]
    pub no_prebuilt: bool,
}

#[derive(Args)]
pub struct LibrariesArgs {
    /// Only list libraries of this unit
    pub unit: Option<String>,

    /// Only list libraries of this kind
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub resolve: ResolveFlags,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings and the files they come from
    Show,

    /// Write settings to the project (or global) config file
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// How locator answers are combined
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Whether prebuilt repositories are searched
    #[arg(long)]
    pub prebuilt: Option<bool>,

    /// Write the global config instead of the project's
    #[arg(long)]
    pub global: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    First,
    Merge,
}

impl From<PolicyArg> for ChainPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::First => ChainPolicy::First,
            PolicyArg::Merge => ChainPolicy::Merge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Static,
    Shared,
    HeaderOnly,
}

impl From<KindArg> for Linkage {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Static => Linkage::Static,
            KindArg::Shared => Linkage::Shared,
            KindArg::HeaderOnly => Linkage::HeaderOnly,
        }
    }
}
