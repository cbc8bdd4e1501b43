//! CLI argument definitions for the option configurator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "carconf",
    version,
    about = "Vehicle option configurator",
    long_about = "Resolve vehicle option selections against an option catalog.\n\n\
                  Every command starts from the catalog defaults and replays the\n\
                  --set and --deselect arguments in order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Catalog document (default: $CARCONF_CATALOG).
    #[arg(long = "catalog", value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Engine options file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Always activate a changed color, leather or wheel directly instead of
    /// re-resolving the selections that offered it as an alternative.
    #[arg(long = "no-reapply", global = true)]
    pub no_reapply: bool,

    /// Do not prefer styles of the current market when no style holds.
    #[arg(long = "no-market-fallback", global = true)]
    pub no_market_fallback: bool,

    /// Take the first style when several tie instead of asking for --pick.
    #[arg(long = "first-style", global = true)]
    pub first_style: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the default configuration of the catalog.
    Defaults,

    /// Apply selections and show the resulting configuration.
    Select(SelectionArgs),

    /// Show every category with its current value and choices.
    Categories(SelectionArgs),

    /// Show which selections activated or disabled each code.
    Explain(SelectionArgs),

    /// Enumerate render requests for the current configuration.
    Batch(BatchArgs),
}

#[derive(Parser)]
pub struct SelectionArgs {
    /// Select CODE in CATEGORY; repeat to apply several selections in order.
    #[arg(long = "set", value_name = "CATEGORY=CODE")]
    pub set: Vec<String>,

    /// Switch off an accessory after all --set selections.
    #[arg(long = "deselect", value_name = "CODE")]
    pub deselect: Vec<String>,

    /// Candidate to take when a selection matches several styles equally.
    #[arg(long = "pick", value_name = "N")]
    pub pick: Option<usize>,
}

#[derive(Parser)]
pub struct BatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Enumerate every trim offered in the current market.
    #[arg(long = "all-trims")]
    pub all_trims: bool,

    /// Enumerate every available drivetrain.
    #[arg(long = "all-drivetrains")]
    pub all_drivetrains: bool,

    /// Enumerate every available body style.
    #[arg(long = "all-bodystyles")]
    pub all_bodystyles: bool,

    /// Enumerate every available exterior color.
    #[arg(long = "all-colors")]
    pub all_colors: bool,

    /// Enumerate every available interior color theme.
    #[arg(long = "all-themes")]
    pub all_themes: bool,

    /// Render every exterior camera.
    #[arg(long = "exterior")]
    pub exterior: bool,

    /// Render every interior camera.
    #[arg(long = "interior")]
    pub interior: bool,

    /// Camera used when no camera set is requested (default: first camera).
    #[arg(long = "camera", value_name = "CODE")]
    pub camera: Option<String>,

    /// Stop after N items.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Renderer settings appended to every image query.
    #[arg(long = "settings", value_name = "QUERY", default_value = "")]
    pub settings: String,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
