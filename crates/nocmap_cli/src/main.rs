//! nocmap CLI: maps communicating cores onto a network-on-chip mesh.
//!
//! Provides `nocmap init` for scaffolding a `nocmap.toml`, `nocmap check` for
//! validating a configuration and summarizing the mesh and traffic, and
//! `nocmap map` for running the placement search and exporting the result.

#![warn(missing_docs)]

mod check;
mod init;
mod map;
mod project;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use nocmap_config::{Algorithm, RoutingMode};

/// nocmap: energy-aware core mapping for mesh networks-on-chip.
#[derive(Parser, Debug)]
#[command(name = "nocmap", version, about = "NoC core mapping")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `nocmap.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new mapping project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,

        /// Edge size of the square mesh in the generated configuration.
        #[arg(short, long, default_value_t = 4)]
        edge: u32,
    },
    /// Validate the configuration and print mesh and traffic statistics.
    Check,
    /// Search for a placement and export it.
    Map(MapArgs),
}

/// Arguments for the `nocmap map` subcommand.
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Random seed, overriding `mapping.seed`.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Search algorithm, overriding `mapping.algorithm`.
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmChoice>,

    /// Routing strategy, overriding `mapping.routing`.
    #[arg(short, long, value_enum)]
    pub routing: Option<RoutingChoice>,

    /// Output format for the mapping.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the mapping to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Run the `[thermal]` simulator on the final mapping.
    #[arg(long)]
    pub thermal: bool,
}

/// Search algorithm selection on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmChoice {
    /// Simulated annealing.
    Anneal,
    /// Exhaustive enumeration.
    Exhaustive,
}

impl From<AlgorithmChoice> for Algorithm {
    fn from(choice: AlgorithmChoice) -> Self {
        match choice {
            AlgorithmChoice::Anneal => Algorithm::Anneal,
            AlgorithmChoice::Exhaustive => Algorithm::Exhaustive,
        }
    }
}

/// Routing strategy selection on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoutingChoice {
    /// Static XY routing.
    Xy,
    /// Adaptive West-First routing.
    WestFirst,
    /// Adaptive Odd-Even routing.
    OddEven,
}

impl From<RoutingChoice> for RoutingMode {
    fn from(choice: RoutingChoice) -> Self {
        match choice {
            RoutingChoice::Xy => RoutingMode::Xy,
            RoutingChoice::WestFirst => RoutingMode::WestFirst,
            RoutingChoice::OddEven => RoutingMode::OddEven,
        }
    }
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Mapping and diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// `node core` lines, diagnostics on stderr.
    Text,
    /// One JSON document holding the mapping and its diagnostics.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_level(cli.quiet, cli.verbose))
        .parse_default_env()
        .init();

    let color = use_color(cli.color, std::io::stderr().is_terminal());

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Init { name, edge } => init::run(name, edge),
        Command::Check => check::run(&global),
        Command::Map(ref args) => map::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Picks the log level from the global flags; `RUST_LOG` still overrides it.
fn log_level(quiet: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    }
}

/// Resolves `--color`; `auto` follows whether stderr, where diagnostics are
/// rendered, is a terminal.
fn use_color(choice: ColorChoice, stderr_is_terminal: bool) -> bool {
    match choice {
        ColorChoice::Auto => stderr_is_terminal,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_init_default() {
        let cli = Cli::parse_from(["nocmap", "init"]);
        match cli.command {
            Command::Init { name, edge } => {
                assert!(name.is_none());
                assert_eq!(edge, 4);
            }
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_init_with_args() {
        let cli = Cli::parse_from(["nocmap", "init", "vopd", "--edge", "3"]);
        match cli.command {
            Command::Init { name, edge } => {
                assert_eq!(name.as_deref(), Some("vopd"));
                assert_eq!(edge, 3);
            }
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["nocmap", "check"]);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_map_default() {
        let cli = Cli::parse_from(["nocmap", "map"]);
        match cli.command {
            Command::Map(ref args) => {
                assert!(args.seed.is_none());
                assert!(args.algorithm.is_none());
                assert!(args.routing.is_none());
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.output.is_none());
                assert!(!args.thermal);
            }
            _ => panic!("expected Map command"),
        }
    }

    #[test]
    fn parse_map_with_args() {
        let cli = Cli::parse_from([
            "nocmap",
            "map",
            "--seed",
            "42",
            "--algorithm",
            "exhaustive",
            "--routing",
            "odd-even",
            "--format",
            "json",
            "--output",
            "mapping.json",
            "--thermal",
        ]);
        match cli.command {
            Command::Map(ref args) => {
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.algorithm, Some(AlgorithmChoice::Exhaustive));
                assert_eq!(args.routing, Some(RoutingChoice::OddEven));
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.output.as_deref(), Some("mapping.json"));
                assert!(args.thermal);
            }
            _ => panic!("expected Map command"),
        }
    }

    #[test]
    fn parse_map_short_flags() {
        let cli = Cli::parse_from(["nocmap", "map", "-s", "7", "-r", "west-first"]);
        match cli.command {
            Command::Map(ref args) => {
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.routing, Some(RoutingChoice::WestFirst));
            }
            _ => panic!("expected Map command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["nocmap", "--quiet", "--color", "never", "check"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_global_flag_after_subcommand() {
        let cli = Cli::parse_from(["nocmap", "map", "--verbose", "--config", "a/nocmap.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("a/nocmap.toml"));
    }

    #[test]
    fn parse_color_always() {
        let cli = Cli::parse_from(["nocmap", "--color", "always", "check"]);
        assert_eq!(cli.color, ColorChoice::Always);
    }

    #[test]
    fn choices_convert_to_config() {
        assert_eq!(Algorithm::from(AlgorithmChoice::Anneal), Algorithm::Anneal);
        assert_eq!(
            Algorithm::from(AlgorithmChoice::Exhaustive),
            Algorithm::Exhaustive
        );
        assert_eq!(RoutingMode::from(RoutingChoice::Xy), RoutingMode::Xy);
        assert_eq!(
            RoutingMode::from(RoutingChoice::WestFirst),
            RoutingMode::WestFirst
        );
        assert_eq!(RoutingMode::from(RoutingChoice::OddEven), RoutingMode::OddEven);
    }

    #[test]
    fn auto_color_follows_stderr_terminal() {
        assert!(use_color(ColorChoice::Auto, true));
        assert!(!use_color(ColorChoice::Auto, false));
        assert!(use_color(ColorChoice::Always, false));
        assert!(!use_color(ColorChoice::Never, true));
    }

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(log_level(true, true), LevelFilter::Debug);
        assert_eq!(log_level(true, false), LevelFilter::Error);
        assert_eq!(log_level(false, false), LevelFilter::Warn);
    }
}
