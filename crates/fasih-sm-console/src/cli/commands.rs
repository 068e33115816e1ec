/*
[INPUT]:  Parsed subcommand arguments and a ConsoleSession
[OUTPUT]: One-shot operations (surveys, history, run, export, download, logout)
[POS]:    CLI layer - non-interactive commands
[UPDATE]: When adding subcommands
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use console::style;
use fasih_sm_adapter::{ActionKind, TaskStatus};
use tracing::warn;

use fasih_sm_console::{ColumnSelection, ConsoleConfig, ConsoleSession, WilayahPhase};

use super::{
    follow_task, latest_notice, print_history, print_selection, print_task_summary,
    resolve, save_artifact, start_session,
};

pub struct RunRequest {
    pub survey: String,
    pub period: String,
    pub province: String,
    pub kabupaten: String,
    pub action: ActionKind,
    pub columns: Vec<String>,
    pub download: bool,
}

pub async fn surveys(session: &ConsoleSession) -> Result<()> {
    start_session(session).await?;
    let state = session.selection();
    if state.surveys.is_empty() {
        println!("{}", style("No surveys available.").yellow());
    }
    for survey in &state.surveys {
        println!(
            "{:<38} {:<14} {}",
            style(&survey.id).dim(),
            survey.survey_type,
            survey.name
        );
    }
    Ok(())
}

pub async fn history(session: &ConsoleSession) -> Result<()> {
    start_session(session).await?;
    print_history(&session.history());
    Ok(())
}

fn not_found(what: &str, query: &str, session: &ConsoleSession) -> anyhow::Error {
    match latest_notice(session) {
        Some(notice) => anyhow!("{what} '{query}' not found ({notice})"),
        None => anyhow!("{what} '{query}' not found"),
    }
}

pub async fn run(session: &ConsoleSession, config: &ConsoleConfig, request: RunRequest) -> Result<()> {
    start_session(session).await?;

    let survey_id = resolve(&session.selection().surveys, &request.survey)
        .map(|survey| survey.id.clone())
        .ok_or_else(|| not_found("survey", &request.survey, session))?;
    session.select_survey(&survey_id).await;

    let period_id = resolve(&session.selection().period_options, &request.period)
        .map(|period| period.id.clone())
        .ok_or_else(|| not_found("period", &request.period, session))?;
    session.select_period(&period_id).await;

    let province_code = resolve(&session.selection().province_options, &request.province)
        .map(|province| province.full_code.clone())
        .ok_or_else(|| not_found("province", &request.province, session))?;
    session.select_province(&province_code).await;

    let kabupaten_id = resolve(&session.selection().kabupaten_options, &request.kabupaten)
        .map(|kabupaten| kabupaten.id.clone())
        .ok_or_else(|| not_found("kabupaten", &request.kabupaten, session))?;
    session.select_kabupaten(&kabupaten_id).await;

    let state = session.selection();
    print_selection(&state);
    if state.wilayah.phase != WilayahPhase::Ready {
        let detail = state
            .wilayah
            .error
            .as_ref()
            .map(|failure| failure.message.clone())
            .unwrap_or_else(|| "wilayah cache not ready".to_string());
        bail!("wilayah for {} is not ready: {detail}", state.kabupaten_name);
    }

    let dispatched = if request.action == ActionKind::DownloadRaw {
        let selection = if request.columns.is_empty() {
            None
        } else {
            download_selection(session, &request.columns).await
        };
        session.dispatch_download(selection.as_ref()).await
    } else {
        session.dispatch(request.action).await
    };
    let view = dispatched.with_context(|| format!("dispatch {}", request.action))?;

    println!(
        "{} {} for {}",
        style("Dispatched").bold(),
        request.action,
        state.kabupaten_name
    );
    let finished = follow_task(view).await?;
    session.close_task().await;
    print_task_summary(&finished);

    match finished.status {
        TaskStatus::Completed => {
            if let (Some(artifact), true) = (&finished.artifact, request.download) {
                save_artifact(session, config, &artifact.filename, None).await?;
            }
            Ok(())
        }
        TaskStatus::Error => Err(anyhow!("{} failed: {}", request.action, finished.message)),
        _ => Ok(()),
    }
}

/// Picker preloaded with `columns`; `None` (full download) when the catalog is unavailable
async fn download_selection(session: &ConsoleSession, columns: &[String]) -> Option<ColumnSelection> {
    let catalog = session.download_catalog().await?;
    if catalog.is_unavailable() {
        warn!("no column catalog for this survey yet, downloading all columns");
        return None;
    }
    Some(pick_columns(catalog.catalog().to_vec(), columns))
}

fn pick_columns(catalog: Vec<String>, columns: &[String]) -> ColumnSelection {
    let mut selection = ColumnSelection::empty(catalog);
    for column in columns {
        if selection.is_selected(column) {
            continue;
        }
        if !selection.toggle(column) {
            println!("{}", style(format!("Unknown column skipped: {column}")).yellow());
        }
    }
    selection
}

/// `columns: None` keeps every column
pub async fn export(session: &ConsoleSession, file: &str, columns: Option<Vec<String>>) -> Result<()> {
    start_session(session).await?;
    let mut selection = session
        .open_export(file)
        .await
        .with_context(|| format!("load columns of {file}"))?;
    if selection.is_unavailable() {
        bail!("no columns available in {file}");
    }
    if let Some(columns) = columns {
        selection = pick_columns(selection.catalog().to_vec(), &columns);
    }

    let result = session
        .export(file, &selection)
        .await
        .with_context(|| format!("export {file}"))?;
    println!(
        "{} {} ({} columns, {} rows)",
        style("Exported").bold().green(),
        style(&result.filename).cyan(),
        result.columns_count,
        result.rows_count
    );
    Ok(())
}

pub async fn download(
    session: &ConsoleSession,
    config: &ConsoleConfig,
    file: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    save_artifact(session, config, file, output).await?;
    Ok(())
}

pub async fn logout(session: &ConsoleSession) -> Result<()> {
    session.logout().await.context("logout")?;
    println!("{}", style("Logged out.").green());
    Ok(())
}
