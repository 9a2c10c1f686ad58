//! Clap derive structures for the `towerwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use towerwatch_core::ModeLabel;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// towerwatch -- monitor and control a fleet of water towers
#[derive(Debug, Parser)]
#[command(
    name = "towerwatch",
    version,
    about = "Monitor and control water towers from the command line",
    long_about = "Polls a water-tower gateway for levels, pump state and alarms,\n\
        sends pump and mode commands, and charts level history.\n\n\
        Use --synthetic to explore with a built-in demo fleet.",
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
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "TOWERWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway address (overrides profile)
    #[arg(long, short = 'g', env = "TOWERWATCH_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Use the built-in demo fleet instead of a gateway
    #[arg(long, env = "TOWERWATCH_SYNTHETIC", global = true)]
    pub synthetic: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TOWERWATCH_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TOWERWATCH_TIMEOUT", global = true)]
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
    /// List and inspect towers
    #[command(alias = "t")]
    Towers(TowersArgs),

    /// Show gateway status
    #[command(alias = "st")]
    Status,

    /// Show level history for one tower
    #[command(alias = "hist")]
    History(HistoryArgs),

    /// Switch a tower's pump on or off (leaves auto mode)
    Pump(PumpArgs),

    /// Set the fleet control mode
    Mode(ModeArgs),

    /// Poll continuously and print changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Towers ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TowersArgs {
    #[command(subcommand)]
    pub command: TowersCommand,
}

#[derive(Debug, Subcommand)]
pub enum TowersCommand {
    /// List every tower
    #[command(alias = "ls")]
    List,

    /// Show one tower
    Get {
        /// Tower id
        id: u32,
    },
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Tower id
    pub id: u32,

    /// Day to start from (YYYY-MM-DD, defaults to today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Number of hours to fetch (overrides --date)
    #[arg(long, short = 'H')]
    pub hours: Option<u32>,

    /// Always cover at least 24 hours
    #[arg(long)]
    pub full_day: bool,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PumpState {
    On,
    Off,
}

impl PumpState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Args)]
pub struct PumpArgs {
    /// Tower id
    pub id: u32,

    /// Desired pump state
    pub state: PumpState,

    /// Send even if the tower is reported offline
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// `auto` or `manual`
    pub mode: ModeLabel,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval_ms: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Interactively create a profile
    Init,

    /// Set the gateway address of the active profile
    SetGateway {
        /// Address, e.g. `192.168.4.1` or `http://tower-gw.local`
        address: String,
    },

    /// Enable or disable the demo fleet for the active profile
    SetSynthetic {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Set the poll interval of the active profile
    SetInterval {
        /// Milliseconds between polls
        ms: u64,
    },

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// List profiles
    Profiles,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
