/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When ConsoleConfig schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use fasih_sm_console::config::{BackendConfig, ConsoleConfig, LogConfig, PollingConfig};

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to FASIH-SM Console Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a console configuration.").dim()
    );

    if output.exists() {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Nothing written.").yellow());
            return Ok(());
        }
    }

    let theme = ColorfulTheme::default();
    let defaults = ConsoleConfig::default();

    println!("\n{}", style("--- Backend ---").bold());
    let base_url: String = Input::with_theme(&theme)
        .with_prompt("Backend base URL")
        .default(defaults.backend.base_url.clone())
        .interact_text()?;

    let timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Request timeout (seconds)")
        .default(defaults.backend.timeout_secs)
        .interact_text()?;

    println!("\n{}", style("--- Tasks ---").bold());
    let interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Progress poll interval (ms)")
        .default(defaults.polling.interval_ms)
        .validate_with(|value: &u64| {
            if *value == 0 {
                Err("must be greater than zero")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let download_dir: String = Input::with_theme(&theme)
        .with_prompt("Download directory")
        .default(defaults.download_dir.display().to_string())
        .interact_text()?;

    println!("\n{}", style("--- Logging ---").bold());
    let levels = vec!["info", "debug", "warn", "error"];
    let level_selection = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&levels)
        .default(0)
        .interact()?;
    let log_directory: String = Input::with_theme(&theme)
        .with_prompt("Log directory for interactive mode (empty to log to stderr)")
        .allow_empty(true)
        .interact_text()?;

    let config = ConsoleConfig {
        backend: BackendConfig {
            base_url,
            timeout_secs,
            connect_timeout_secs: defaults.backend.connect_timeout_secs,
        },
        polling: PollingConfig { interval_ms },
        download_dir: PathBuf::from(download_dir),
        log: LogConfig {
            level: levels[level_selection].to_string(),
            directory: Some(log_directory.trim())
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        },
    };
    config.validate()?;
    config
        .write_to(&output)
        .context("failed to save configuration")?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!("Configuration written to: {}", style(output.display()).cyan());

    Ok(())
}
