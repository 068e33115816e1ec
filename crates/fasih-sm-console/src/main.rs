/*
[INPUT]:  CLI arguments, YAML configuration file, FASIH_CONSOLE__* environment
[OUTPUT]: Operator console session driving the automation backend
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or log routing
*/

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use fasih_sm_adapter::ActionKind;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use fasih_sm_console::{ConsoleConfig, ConsoleSession};

#[derive(Parser, Debug)]
#[command(name = "fasih-sm-console", version, about = "FASIH-SM operator console")]
struct Cli {
    /// Config file; defaults to the per-user config path
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides `log.level`
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    /// Overrides `backend.base_url`
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new configuration file
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List surveys available to the logged-in account
    Surveys,
    /// List downloaded raw data and action logs
    History,
    /// Select a kabupaten, prepare its wilayah cache and run one action
    Run(RunArgs),
    /// Write a copy of an artifact holding only some columns
    Export {
        #[arg(long, value_name = "FILENAME")]
        file: String,
        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "all",
            required_unless_present = "all"
        )]
        columns: Vec<String>,
        #[arg(long)]
        all: bool,
    },
    /// Save an artifact locally
    Download {
        #[arg(long, value_name = "FILENAME")]
        file: String,
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// End the backend session
    Logout,
    /// Menu-driven console (default)
    Interactive,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Survey id or name
    #[arg(long)]
    survey: String,
    /// Period id or name
    #[arg(long)]
    period: String,
    /// Province full code or name
    #[arg(long)]
    province: String,
    /// Kabupaten id, full code or name
    #[arg(long)]
    kabupaten: String,
    /// download-raw | approve | revoke | reject
    #[arg(long, value_parser = parse_action)]
    action: ActionKind,
    /// Column subset for download-raw
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
    /// Leave the result artifact on the backend
    #[arg(long)]
    no_download: bool,
}

fn parse_action(value: &str) -> std::result::Result<ActionKind, String> {
    ActionKind::from_path(value).ok_or_else(|| {
        format!("unknown action '{value}', expected download-raw, approve, revoke or reject")
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let command = match args.command.unwrap_or(Command::Interactive) {
        Command::Init { output } => {
            let output = output
                .or(args.config_path)
                .unwrap_or_else(ConsoleConfig::default_path);
            return cli::init::run_init(output);
        }
        command => command,
    };

    let mut config = load_config(args.config_path.as_ref())?;
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    let level = args.log_level.unwrap_or_else(|| config.log.level.clone());
    let interactive = matches!(command, Command::Interactive);
    let _log_guard = init_tracing(&level, interactive, &config)?;

    info!(base_url = %config.backend.base_url, "starting fasih-sm-console");
    let client = config.build_client()?;
    let session = ConsoleSession::new(Arc::new(client), config.poll_interval());

    match command {
        Command::Surveys => cli::commands::surveys(&session).await,
        Command::History => cli::commands::history(&session).await,
        Command::Run(run) => {
            let request = cli::commands::RunRequest {
                survey: run.survey,
                period: run.period,
                province: run.province,
                kabupaten: run.kabupaten,
                action: run.action,
                columns: run.columns,
                download: !run.no_download,
            };
            cli::commands::run(&session, &config, request).await
        }
        Command::Export { file, columns, all } => {
            cli::commands::export(&session, &file, (!all).then_some(columns)).await
        }
        Command::Download { file, output } => {
            cli::commands::download(&session, &config, &file, output).await
        }
        Command::Logout => cli::commands::logout(&session).await,
        Command::Interactive => cli::interactive::run_interactive(&session, &config).await,
        Command::Init { .. } => Ok(()),
    }
}

/// Stderr by default; interactive mode writes to a daily file when `log.directory` is set
fn init_tracing(level: &str, interactive: bool, config: &ConsoleConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(level).context("invalid log level")?;

    if interactive {
        if let Some(directory) = &config.log.directory {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("create log directory {}", directory.display()))?;
            let appender = tracing_appender::rolling::daily(directory, "fasih-sm-console.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|err| anyhow!(err))
                .context("initialize tracing subscriber")?;
            return Ok(Some(guard));
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(None)
}

fn load_config(path: Option<&PathBuf>) -> Result<ConsoleConfig> {
    match path {
        Some(path) => ConsoleConfig::load(path, true).context("load config"),
        None => ConsoleConfig::load(&ConsoleConfig::default_path(), false).context("load config"),
    }
}
