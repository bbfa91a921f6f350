//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "hexy",
    bin_name = "hexy",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Check and exercise dependency-injection module graphs",
    long_about = "Hexy composes the modules described in a TOML manifest, \
                  enforces import/export visibility, and resolves providers \
                  through the same container applications use.",
    after_help = "EXAMPLES:\n\
        \x20 hexy check hexy.toml\n\
        \x20 hexy graph manifests/ --format json\n\
        \x20 hexy resolve user-controller hexy.toml --request\n\
        \x20 hexy completions bash > /usr/share/bash-completion/completions/hexy",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose a manifest and report wiring defects.
    #[command(
        visible_alias = "c",
        about = "Validate a module manifest",
        after_help = "EXAMPLES:\n\
            \x20 hexy check\n\
            \x20 hexy check hexy.toml\n\
            \x20 hexy check manifests/ --allow-overwrite"
    )]
    Check(CheckArgs),

    /// Show the composed module graph.
    #[command(
        visible_alias = "g",
        about = "Print modules and providers in load order",
        after_help = "EXAMPLES:\n\
            \x20 hexy graph hexy.toml\n\
            \x20 hexy graph hexy.toml --format csv"
    )]
    Graph(GraphArgs),

    /// Resolve one token and print what got built.
    #[command(
        visible_alias = "r",
        about = "Resolve a token from a manifest",
        after_help = "EXAMPLES:\n\
            \x20 hexy resolve user-service hexy.toml\n\
            \x20 hexy resolve user-controller --request --times 2"
    )]
    Resolve(ResolveArgs),

    /// Initialise a Hexy configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 hexy init           # default location\n\
            \x20 hexy init --local   # .hexy.toml in the current directory\n\
            \x20 hexy -c ./cfg.toml init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 hexy completions bash > ~/.local/share/bash-completion/completions/hexy\n\
            \x20 hexy completions zsh  > ~/.zfunc/_hexy\n\
            \x20 hexy completions fish > ~/.config/fish/completions/hexy.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Hexy configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 hexy config get container.default_scope\n\
            \x20 hexy config list\n\
            \x20 hexy config path"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where to read modules from.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Manifest file or directory of manifests.
    #[arg(
        value_name = "MANIFEST",
        help = "Manifest file or directory (default: manifest.default_path)"
    )]
    pub manifest: Option<PathBuf>,

    /// Let later registrations replace earlier ones with the same token.
    #[arg(long = "allow-overwrite", help = "Allow duplicate tokens (latest wins)")]
    pub allow_overwrite: bool,
}

// ── check ─────────────────────────────────────────────────────────────────────

/// Arguments for `hexy check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: ManifestArgs,
}

// ── graph ─────────────────────────────────────────────────────────────────────

/// Arguments for `hexy graph`.
#[derive(Debug, Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub source: ManifestArgs,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: GraphFormat,
}

/// Output format for the `graph` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Human-readable table.
    Table,
    /// One token per line.
    List,
    /// JSON array of modules.
    Json,
    /// CSV rows, one per provider.
    Csv,
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Arguments for `hexy resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Token to resolve.
    #[arg(value_name = "TOKEN", help = "Token to resolve")]
    pub token: String,

    #[command(flatten)]
    pub source: ManifestArgs,

    /// Resolve inside a resolution context (needed for request-scoped tokens).
    #[arg(long = "request", help = "Resolve inside a fresh resolution context")]
    pub request: bool,

    /// Resolve this many times to show caching.
    #[arg(
        long = "times",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=100),
        help = "Number of resolutions"
    )]
    pub times: u32,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `hexy init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.hexy.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `hexy completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `hexy config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `container.default_scope`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
