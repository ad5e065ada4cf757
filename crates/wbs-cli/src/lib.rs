//! WBS command line
//!
//! Argument parsing, logging setup and the `scan` command. The binary in
//! `main.rs` is a thin wrapper so the command can be driven from tests.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use wbs_core::{load_tree, Percolator, PercolationReport, Tree, WbsConfig};
use wbs_render::selected;

/// Source scanned when `--file` is not given
pub const DEFAULT_SOURCE: &str = "WBS.svt";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value == "json" {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Options of the `scan` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub fix: bool,
    pub wbs: bool,
    pub gantt: bool,
    pub outline: bool,
    pub json: bool,
}

impl ScanArgs {
    /// Scan `file` with no flags set
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    fn from_matches(args: &ArgMatches) -> Self {
        Self {
            file: args
                .get_one::<PathBuf>("file")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)),
            config: args.get_one::<PathBuf>("config").cloned(),
            fix: args.get_flag("fix"),
            wbs: args.get_flag("wbs"),
            gantt: args.get_flag("gantt"),
            outline: args.get_flag("outline"),
            json: args.get_flag("json"),
        }
    }

    /// Configuration file values with command line flags applied on top
    pub fn resolve_config(&self) -> Result<WbsConfig> {
        let mut config = match &self.config {
            Some(path) => WbsConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => WbsConfig::default(),
        };
        config.fix |= self.fix;
        config.render.wbs |= self.wbs;
        config.render.gantt |= self.gantt;
        config.render.outline |= self.outline;
        config.render.json |= self.json;
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub verbosity: u8,
    pub log_format: LogFormat,
    pub scan: Option<ScanArgs>,
}

/// Command definition
#[must_use]
pub fn command() -> Command {
    Command::new("wbs")
        .version(wbs_core::VERSION)
        .about("Work breakdown structure reconciler")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Raise log verbosity (repeatable)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .default_value("text")
                .value_parser(["text", "json"])
                .global(true)
                .help("Log output format"),
        )
        .subcommand(
            Command::new("scan")
                .about("Build, reconcile and render a source")
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .default_value(DEFAULT_SOURCE)
                        .value_parser(value_parser!(PathBuf))
                        .help("Source file"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(flag("fix", "Collapse candidates into final values"))
                .arg(flag("wbs", "Print the WBS diagram"))
                .arg(flag("gantt", "Print the Gantt timeline"))
                .arg(flag("outline", "Print the candidate outline"))
                .arg(flag("json", "Print the tree as JSON")),
        )
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

/// Parse `argv` (including the program name)
pub fn parse<I, T>(argv: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(argv)?;
    Ok(Cli {
        verbosity: matches.get_count("verbose"),
        log_format: matches
            .get_one::<String>("log-format")
            .map_or(LogFormat::Text, |v| LogFormat::parse(v)),
        scan: match matches.subcommand() {
            Some(("scan", args)) => Some(ScanArgs::from_matches(args)),
            _ => None,
        },
    })
}

/// Default filter directive for a `-v` count
#[must_use]
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `-v`
pub fn init_logging(verbosity: u8, format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))
}

/// Build and reconcile the tree for `path`
pub fn reconcile(path: &Path, config: &WbsConfig) -> Result<(Tree, PercolationReport)> {
    let mut tree =
        load_tree(path, config).with_context(|| format!("scanning {}", path.display()))?;
    debug!(nodes = tree.len(), source = %path.display(), "tree built");
    let report = Percolator::from_config(config).run(&mut tree);
    Ok((tree, report))
}

/// Run `scan` and return what it prints
pub fn scan(args: &ScanArgs) -> Result<String> {
    let config = args.resolve_config()?;
    let (tree, report) = reconcile(&args.file, &config)?;
    info!(source = %args.file.display(), %report, "percolation finished");

    if !config.render.any() {
        info!("no renderer selected");
    }
    let mut out = String::new();
    for renderer in selected(&config.render) {
        debug!(renderer = renderer.name(), "rendering");
        out.push_str(&renderer.render(&tree));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults() {
        let cli = parse(["wbs", "scan"]).unwrap();
        assert_eq!(cli.verbosity, 0);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.scan, Some(ScanArgs::new(DEFAULT_SOURCE)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse([
            "wbs", "scan", "-vv", "--log-format", "json", "--fix", "--gantt", "-f", "plan.csv",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        let scan = cli.scan.unwrap();
        assert!(scan.fix && scan.gantt);
        assert!(!scan.wbs);
        assert_eq!(scan.file, PathBuf::from("plan.csv"));
    }

    #[test]
    fn no_subcommand() {
        assert_eq!(parse(["wbs"]).unwrap().scan, None);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(parse(["wbs", "--log-format", "xml", "scan"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }
}
