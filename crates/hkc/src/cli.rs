//! Clap derive structures for the `hkc` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of crate-internal imports so `build.rs` can render man pages from it.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hkc -- monitor and arm HKC alarm panels
#[derive(Debug, Parser)]
#[command(
    name = "hkc",
    version,
    about = "Monitor and arm HKC alarm panels from the command line",
    long_about = "Talks to HKC alarm panels through the HKC cloud.\n\n\
        Each configured panel is a config entry; `hkc setup` creates one,\n\
        `hkc status` and `hkc zones` read the panel, `hkc arm` and\n\
        `hkc disarm` change its state.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config entry to use (entry id or panel id)
    #[arg(long, short = 'e', env = "HKC_ENTRY", global = true)]
    pub entry: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HKC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates from the HKC cloud
    #[arg(long, short = 'k', env = "HKC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "HKC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a panel: validate its credentials and store a config entry
    Setup(SetupArgs),

    /// Change the options of a configured panel
    Options(OptionsArgs),

    /// Show the alarm state and keypad display
    #[command(alias = "st")]
    Status,

    /// List zone sensors and their derived state
    #[command(alias = "z")]
    Zones,

    /// Arm the panel
    Arm(ArmArgs),

    /// Disarm the panel
    Disarm(DisarmArgs),

    /// Poll the panel and print entity states as they change
    Watch(WatchArgs),

    /// Manage CLI configuration and entries
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Setup / Options ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Panel id (prompted if omitted)
    #[arg(long)]
    pub panel_id: Option<String>,

    /// Panel password (prompted if omitted)
    #[arg(long, env = "HKC_PANEL_PASSWORD", hide_env_values = true)]
    pub panel_password: Option<String>,

    /// User code (prompted if omitted)
    #[arg(long, env = "HKC_USER_CODE", hide_env_values = true)]
    pub user_code: Option<String>,

    /// Poll interval in seconds
    #[arg(long)]
    pub update_interval: Option<u64>,

    /// Store the password and user code in the system keyring
    #[arg(long)]
    pub keyring: bool,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    /// Poll interval in seconds
    #[arg(long)]
    pub update_interval: u64,
}

// ── Arming ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArmMode {
    /// Part set A
    Home,
    /// Part set B
    Night,
    /// Full set
    Away,
}

#[derive(Debug, Args)]
pub struct ArmArgs {
    /// Arming mode
    #[arg(value_enum)]
    pub mode: ArmMode,

    /// Wait for the panel to settle and print the resulting state
    #[arg(long, short = 'w')]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct DisarmArgs {
    /// Wait for the panel to settle and print the resulting state
    #[arg(long, short = 'w')]
    pub wait: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (defaults to the entry's update interval)
    #[arg(long)]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Migrate every entry to the newest schema version
    Migrate,

    /// Remove a config entry and its keyring secrets
    Remove,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
