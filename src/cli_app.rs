//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use apptracker::core::config::Config;
use apptracker::core::errors::TrackerError;
use apptracker::daemon::loop_main::TrackingDaemon;
use apptracker::daemon::signals::SignalHandler;
use apptracker::logger::jsonl::DailyLog;
use apptracker::platform::probe::{ProbeKind, build_probe};
use apptracker::report::aggregate::aggregate;
use apptracker::report::format::format_report;
use apptracker::report::webhook::WebhookSender;

/// apptracker: records the frontmost application and summarizes the day.
#[derive(Debug, Parser)]
#[command(
    name = "apptracker",
    author,
    version,
    about = "Desktop app usage tracker",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run the tracking daemon until SIGINT/SIGTERM.
    Daemon(DaemonArgs),
    /// Aggregate one day's log and post the summary.
    Report(ReportArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct DaemonArgs {
    /// Probe backend to use instead of the configured one.
    #[arg(long, value_name = "KIND")]
    probe: Option<ProbeKind>,
}

#[derive(Debug, Clone, Args, Default)]
struct ReportArgs {
    /// Day to report on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,
    /// Print the summary without posting it.
    #[arg(long)]
    print_only: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<TrackerError> for CliError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidConfig { .. }
            | TrackerError::MissingConfig { .. }
            | TrackerError::ConfigParse { .. }
            | TrackerError::UnsupportedProbe { .. } => Self::User(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// How a report left the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Delivery {
    Sent { http_status: u16 },
    PrintOnly,
    NotConfigured,
    Failed { error: String },
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }
    init_tracing(cli);

    match &cli.command {
        Command::Daemon(args) => run_daemon(cli, args),
        Command::Report(args) => run_report(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env("APPTRACKER_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// ──────────────────── daemon ────────────────────

fn run_daemon(cli: &Cli, args: &DaemonArgs) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(kind) = args.probe {
        config.tracker.probe = kind;
    }

    let probe = build_probe(config.tracker.probe, config.tracker.probe_timeout())?;
    let log = DailyLog::new(&config.paths.log_dir);
    let mut daemon = TrackingDaemon::new(config, probe, log, SignalHandler::new());
    let stats = daemon.run()?;

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "apptracker stopped: {} ticks recorded, {} skipped, {} wakes, {} write errors",
                stats.ticks_recorded, stats.ticks_skipped, stats.wakes_detected, stats.write_errors
            );
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "daemon",
                "stats": serde_json::to_value(stats)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── report ────────────────────

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let mode = output_mode(cli);
    let day = args.date.unwrap_or_else(|| Local::now().date_naive());
    let day_label = day.format("%Y-%m-%d").to_string();

    let log = DailyLog::new(&config.paths.log_dir);
    let readout = log.read_report(day)?;

    if readout.records.is_empty() {
        return emit_skip(
            mode,
            &day_label,
            "no_records",
            &format!("No records for {day_label}, skipping report."),
        );
    }

    let summary = aggregate(&readout.records, config.tracker.poll_interval_secs);
    if summary.total_active_seconds == 0 {
        return emit_skip(
            mode,
            &day_label,
            "all_idle",
            &format!("All observations idle for {day_label}, skipping report."),
        );
    }

    let message = format_report(&summary, config.report.top_n, day);
    if mode == OutputMode::Human {
        println!("{message}");
    }

    let delivery = if args.print_only {
        Delivery::PrintOnly
    } else if !config.webhook.is_configured() {
        Delivery::NotConfigured
    } else {
        match WebhookSender::from_config(&config.webhook).send(&message) {
            Ok(http_status) => Delivery::Sent { http_status },
            Err(e) => Delivery::Failed {
                error: e.to_string(),
            },
        }
    };

    match mode {
        OutputMode::Human => match &delivery {
            Delivery::Sent { http_status } => {
                println!("\n{} {http_status}", "Webhook response:".green());
            }
            Delivery::PrintOnly => {}
            Delivery::NotConfigured => {
                println!("\n{}", "Webhook URL not configured, printed report only.".yellow());
            }
            Delivery::Failed { error } => eprintln!("{} {error}", "Delivery failed:".red()),
        },
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "date": day_label,
                "skipped": false,
                "skipped_lines": readout.skipped,
                "summary": serde_json::to_value(&summary)?,
                "message": message,
                "delivery": serde_json::to_value(&delivery)?,
            });
            write_json_line(&payload)?;
        }
    }

    match delivery {
        Delivery::Failed { error } => Err(CliError::Runtime(error)),
        _ => Ok(()),
    }
}

fn emit_skip(mode: OutputMode, day: &str, reason: &str, text: &str) -> Result<(), CliError> {
    match mode {
        OutputMode::Human => println!("{text}"),
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "date": day,
                "skipped": true,
                "reason": reason,
                "message": text,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────── output helpers ────────────────────

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("APPTRACKER_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
