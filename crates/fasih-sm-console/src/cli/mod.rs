/*
[INPUT]:  ConsoleSession snapshots and task views
[OUTPUT]: Terminal rendering shared by one-shot commands and the interactive menu
[POS]:    CLI layer - presentation helpers
[UPDATE]: When adding panels or changing progress output
*/

pub mod commands;
pub mod init;
pub mod interactive;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use console::style;
use fasih_sm_adapter::{HistoryItem, Period, RegionOption, Survey, TaskStatus};
use tokio::sync::watch;

use fasih_sm_console::{
    ConsoleConfig, ConsoleError, ConsoleSession, SelectionState, TaskView, WilayahPhase,
    format_size,
};

pub fn print_selection(state: &SelectionState) {
    let value = |v: &str| {
        if v.is_empty() {
            style("-".to_string()).dim()
        } else {
            style(v.to_string()).cyan()
        }
    };
    println!("{}", style("--- Selection ---").bold());
    println!("  Survey    : {}", value(&state.survey_name));
    println!("  Period    : {}", value(&state.period_name));
    println!("  Role      : {}", value(&state.role));
    println!("  Province  : {}", value(&state.province_name));
    println!("  Kabupaten : {}", value(&state.kabupaten_name));
    println!("  Wilayah   : {}", wilayah_label(state));
}

fn wilayah_label(state: &SelectionState) -> String {
    let status = &state.wilayah;
    match status.phase {
        WilayahPhase::Ready => style(format!("ready ({} smallcodes)", status.count))
            .green()
            .to_string(),
        WilayahPhase::Error => {
            let detail = status
                .error
                .as_ref()
                .map(|failure| failure.message.as_str())
                .unwrap_or("unknown failure");
            style(format!("error: {detail}")).red().to_string()
        }
        WilayahPhase::Checking | WilayahPhase::Fetching => {
            style(status.phase.to_string()).yellow().to_string()
        }
        WilayahPhase::Idle => style("idle".to_string()).dim().to_string(),
    }
}

pub fn print_notices(session: &ConsoleSession) {
    for notice in session.notices().snapshot() {
        println!("{} {}", style(format!("[{}]", notice.id)).yellow(), notice.message);
    }
}

/// Most recent notice text, used to explain why a lookup came back empty
pub fn latest_notice(session: &ConsoleSession) -> Option<String> {
    session
        .notices()
        .snapshot()
        .last()
        .map(|notice| notice.message.clone())
}

pub fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("{}", style("No history yet.").yellow());
        return;
    }
    for item in items {
        println!(
            "{:<10} {:>10}  {}  {}",
            item.kind.to_string(),
            format_size(item.size),
            item.timestamp.format("%Y-%m-%d %H:%M"),
            item.filename
        );
    }
}

pub fn history_label(item: &HistoryItem) -> String {
    format!(
        "{} | {} | {} | {}",
        item.kind,
        item.filename,
        format_size(item.size),
        item.timestamp.format("%Y-%m-%d %H:%M")
    )
}

/// Print progress until the task ends or Ctrl-C; new log lines are printed once
pub async fn follow_task(mut view: watch::Receiver<TaskView>) -> Result<TaskView> {
    let mut printed_logs = 0;
    let mut last_line = String::new();
    loop {
        let current = view.borrow_and_update().clone();
        for line in current.logs.iter().skip(printed_logs) {
            println!("    {}", style(line).dim());
        }
        printed_logs = printed_logs.max(current.logs.len());

        let line = format!(
            "[{:>3}%] {:<12} {}",
            current.progress,
            format!("{:?}", current.status).to_lowercase(),
            current.message
        );
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
        if let Some(err) = &current.last_poll_error {
            println!("{}", style(format!("    poll failed, retrying: {err}")).yellow());
        }
        if current.is_terminal() {
            return Ok(current);
        }

        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    return Ok(view.borrow().clone());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", style("Stopped following the task.").yellow());
                return Ok(view.borrow().clone());
            }
        }
    }
}

pub fn print_task_summary(view: &TaskView) {
    match view.status {
        TaskStatus::Completed => {
            println!("{} {}", style("COMPLETED").bold().green(), view.message)
        }
        TaskStatus::Error => println!("{}", style("FAILED").bold().red()),
        _ => println!("{} {}", style("STOPPED").bold().yellow(), view.message),
    }
    if let Some(counters) = &view.counters {
        let count = |value: Option<u64>| value.map_or("-".to_string(), |v| v.to_string());
        println!(
            "  total {} | success {} | failed {} | skipped {}",
            count(counters.total_assignments),
            count(counters.success),
            count(counters.fail),
            count(counters.skip)
        );
    }
    if let Some(detail) = view.failure_detail() {
        println!("{}", style(detail).red());
    }
    if let Some(artifact) = &view.artifact {
        println!("  artifact: {}", style(&artifact.filename).cyan());
    }
}

/// Download `filename` into `output` or the configured download directory
pub async fn save_artifact(
    session: &ConsoleSession,
    config: &ConsoleConfig,
    filename: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let dest = match output {
        Some(path) => path,
        None => config.download_dir.join(filename),
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let bytes = session
        .download(filename, &dest)
        .await
        .with_context(|| format!("download {filename}"))?;
    println!(
        "Saved {} ({}) to {}",
        filename,
        format_size(bytes),
        style(dest.display()).cyan()
    );
    Ok(dest)
}

/// Start the session, turning "not logged in" into operator guidance
pub async fn start_session(session: &ConsoleSession) -> Result<()> {
    match session.start().await {
        Ok(()) => Ok(()),
        Err(ConsoleError::NotLoggedIn) => Err(anyhow!(
            "backend session is not logged in; log in through the backend first"
        )),
        Err(err) => Err(err).context("start console session"),
    }
}

/// Something the operator can pick by id/code or by name
pub trait Choice {
    fn keys(&self) -> Vec<&str>;
    fn label(&self) -> &str;
}

impl Choice for Survey {
    fn keys(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Choice for Period {
    fn keys(&self) -> Vec<&str> {
        vec![self.id.as_str()]
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Choice for RegionOption {
    fn keys(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.full_code.as_str()]
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Exact id/code match first, then a case-insensitive name match
pub fn resolve<'a, T: Choice>(items: &'a [T], query: &str) -> Option<&'a T> {
    let query = query.trim();
    items
        .iter()
        .find(|item| item.keys().contains(&query))
        .or_else(|| items.iter().find(|item| item.label().eq_ignore_ascii_case(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kab(id: &str, full_code: &str, name: &str) -> RegionOption {
        RegionOption {
            id: id.to_string(),
            name: name.to_string(),
            code: full_code[2..].to_string(),
            full_code: full_code.to_string(),
        }
    }

    #[test]
    fn test_resolve_prefers_ids_then_names() {
        let items = vec![kab("K1", "3573", "KOTA MALANG"), kab("K2", "3507", "MALANG")];

        assert_eq!(resolve(&items, "K2").map(|k| k.id.as_str()), Some("K2"));
        assert_eq!(resolve(&items, "3573").map(|k| k.id.as_str()), Some("K1"));
        assert_eq!(resolve(&items, " malang ").map(|k| k.id.as_str()), Some("K2"));
        assert!(resolve(&items, "BATU").is_none());
    }
}
