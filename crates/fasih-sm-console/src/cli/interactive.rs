/*
[INPUT]:  ConsoleSession and user input via CLI
[OUTPUT]: Menu-driven selection, task runs, history downloads and exports
[POS]:    CLI interactive flow
[UPDATE]: 2026-10-17 Add interactive selection/action menu
[UPDATE]: 2026-10-18 Column picker with search for downloads and exports
*/

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};
use fasih_sm_adapter::{ActionKind, HistoryKind, TaskStatus};

use fasih_sm_console::{ColumnSelection, ConsoleConfig, ConsoleSession};

use super::{
    Choice, follow_task, history_label, print_notices, print_selection, print_task_summary,
    save_artifact, start_session,
};

pub async fn run_interactive(session: &ConsoleSession, config: &ConsoleConfig) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("{}", style("FASIH-SM Operator Console").bold().cyan());

    start_session(session).await?;

    loop {
        println!();
        print_selection(&session.selection());
        print_notices(session);

        let actions = vec![
            "Select survey",
            "Select period",
            "Select province",
            "Select kabupaten",
            "Refresh wilayah",
            "Run action",
            "History & export",
            "Dismiss notices",
            "Logout",
            "Exit",
        ];
        let selection = Select::with_theme(&theme)
            .with_prompt("Select action")
            .items(&actions)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let surveys = session.selection().surveys;
                if let Some(survey) = pick(&theme, "Survey", &surveys)? {
                    session.select_survey(&survey.id).await;
                }
            }
            1 => {
                let periods = session.selection().period_options;
                if let Some(period) = pick(&theme, "Period", &periods)? {
                    session.select_period(&period.id).await;
                }
            }
            2 => {
                let provinces = session.selection().province_options;
                if let Some(province) = pick(&theme, "Province", &provinces)? {
                    session.select_province(&province.full_code).await;
                }
            }
            3 => {
                let kabupaten = session.selection().kabupaten_options;
                if let Some(kabupaten) = pick(&theme, "Kabupaten", &kabupaten)? {
                    session.select_kabupaten(&kabupaten.id).await;
                }
            }
            4 => session.refresh_wilayah().await,
            5 => run_action(session, config, &theme).await?,
            6 => history_menu(session, config, &theme).await?,
            7 => dismiss_notices(session, &theme)?,
            8 => {
                let confirmed = Confirm::with_theme(&theme)
                    .with_prompt("Log out of the backend?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    match session.logout().await {
                        Ok(()) => {
                            println!("{}", style("Logged out.").green());
                            return Ok(());
                        }
                        Err(err) => println!("{}", style(format!("Logout failed: {err}")).red()),
                    }
                }
            }
            _ => {
                session.close_task().await;
                return Ok(());
            }
        }
    }
}

fn pick<'a, T: Choice>(theme: &ColorfulTheme, prompt: &str, items: &'a [T]) -> Result<Option<&'a T>> {
    if items.is_empty() {
        println!(
            "{}",
            style(format!("No {} options yet.", prompt.to_lowercase())).yellow()
        );
        return Ok(None);
    }
    let labels: Vec<&str> = items.iter().map(Choice::label).collect();
    let selected = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .max_length(15)
        .interact_opt()?;
    Ok(selected.map(|idx| &items[idx]))
}

async fn run_action(session: &ConsoleSession, config: &ConsoleConfig, theme: &ColorfulTheme) -> Result<()> {
    if !session.can_dispatch() {
        let reason = match session.active_task_id() {
            Some(task_id) => format!("Task {task_id} is still running."),
            None => "Select survey, period and kabupaten and wait for wilayah to be ready.".to_string(),
        };
        println!("{}", style(reason).yellow());
        return Ok(());
    }

    let labels: Vec<&str> = ActionKind::ALL.iter().map(|kind| kind.as_path()).collect();
    let Some(choice) = Select::with_theme(theme)
        .with_prompt("Action")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let kind = ActionKind::ALL[choice];

    let dispatched = if kind == ActionKind::DownloadRaw {
        let selection = match session.download_catalog().await {
            Some(selection) if selection.is_unavailable() => {
                println!("{}", style("No columns available yet, downloading all columns.").dim());
                None
            }
            Some(selection) => {
                let customize = Confirm::with_theme(theme)
                    .with_prompt(format!(
                        "Choose columns? ({} available, all selected)",
                        selection.total_count()
                    ))
                    .default(false)
                    .interact()?;
                if customize {
                    Some(choose_columns(selection, theme)?)
                } else {
                    None
                }
            }
            None => None,
        };
        session.dispatch_download(selection.as_ref()).await
    } else {
        let kabupaten = session.selection().kabupaten_name;
        let confirmed = Confirm::with_theme(theme)
            .with_prompt(format!("Run {kind} for {kabupaten}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
        session.dispatch(kind).await
    };

    let view = match dispatched {
        Ok(view) => view,
        Err(err) => {
            println!("{}", style(format!("Action {kind} failed to start: {err}")).red());
            return Ok(());
        }
    };

    let finished = follow_task(view).await?;
    session.close_task().await;
    print_task_summary(&finished);

    if let (TaskStatus::Completed, Some(artifact)) = (finished.status, &finished.artifact) {
        let download = Confirm::with_theme(theme)
            .with_prompt(format!("Download {}?", artifact.filename))
            .default(true)
            .interact()?;
        if download {
            if let Err(err) = save_artifact(session, config, &artifact.filename, None).await {
                println!("{}", style(format!("{err:#}")).red());
            }
        }
    }
    Ok(())
}

/// Search-and-tick loop over a column picker
fn choose_columns(mut selection: ColumnSelection, theme: &ColorfulTheme) -> Result<ColumnSelection> {
    loop {
        let query: String = Input::with_theme(theme)
            .with_prompt("Filter columns (empty for all)")
            .allow_empty(true)
            .interact_text()?;
        let visible: Vec<String> = selection
            .matching(&query)
            .into_iter()
            .map(str::to_string)
            .collect();

        if visible.is_empty() {
            println!("{}", style("No column matches.").yellow());
        } else {
            let defaults: Vec<bool> = visible.iter().map(|c| selection.is_selected(c)).collect();
            let ticked = MultiSelect::with_theme(theme)
                .with_prompt("Columns (space to toggle, enter to confirm)")
                .items(&visible)
                .defaults(&defaults)
                .max_length(20)
                .interact()?;
            for (idx, column) in visible.iter().enumerate() {
                if ticked.contains(&idx) != selection.is_selected(column) {
                    selection.toggle(column);
                }
            }
        }

        println!(
            "{} of {} columns selected",
            style(selection.selected_count()).cyan(),
            selection.total_count()
        );
        let next = Select::with_theme(theme)
            .with_prompt("Columns")
            .items(&["Done", "Filter again", "Select all", "Clear all"])
            .default(0)
            .interact()?;
        match next {
            0 => return Ok(selection),
            2 => selection.select_all(),
            3 => selection.clear(),
            _ => {}
        }
    }
}

async fn history_menu(session: &ConsoleSession, config: &ConsoleConfig, theme: &ColorfulTheme) -> Result<()> {
    session.refresh_history().await;
    let items = session.history();
    if items.is_empty() {
        println!("{}", style("No history yet.").yellow());
        return Ok(());
    }

    let labels: Vec<String> = items.iter().map(history_label).collect();
    let Some(idx) = Select::with_theme(theme)
        .with_prompt("History")
        .items(&labels)
        .default(0)
        .max_length(15)
        .interact_opt()?
    else {
        return Ok(());
    };
    let item = &items[idx];

    let mut options = vec!["Download"];
    if item.kind == HistoryKind::RawData {
        options.push("Export filtered columns");
    }
    options.push("Back");
    let choice = Select::with_theme(theme)
        .with_prompt(&item.filename)
        .items(&options)
        .default(0)
        .interact()?;

    match options[choice] {
        "Download" => {
            if let Err(err) = save_artifact(session, config, &item.filename, None).await {
                println!("{}", style(format!("{err:#}")).red());
            }
        }
        "Export filtered columns" => export_item(session, &item.filename, theme).await?,
        _ => {}
    }
    Ok(())
}

async fn export_item(session: &ConsoleSession, filename: &str, theme: &ColorfulTheme) -> Result<()> {
    let selection = match session.open_export(filename).await {
        Ok(selection) => selection,
        Err(err) => {
            println!("{}", style(format!("Failed to load columns: {err}")).red());
            return Ok(());
        }
    };
    if selection.is_unavailable() {
        println!("{}", style("No columns available.").yellow());
        return Ok(());
    }

    let selection = choose_columns(selection, theme)?;
    match session.export(filename, &selection).await {
        Ok(result) => println!(
            "{} {} ({} columns, {} rows)",
            style("Exported").bold().green(),
            style(&result.filename).cyan(),
            result.columns_count,
            result.rows_count
        ),
        Err(err) => println!("{}", style(format!("Export failed: {err}")).red()),
    }
    Ok(())
}

fn dismiss_notices(session: &ConsoleSession, theme: &ColorfulTheme) -> Result<()> {
    let notices = session.notices().snapshot();
    if notices.is_empty() {
        println!("{}", style("No notices.").dim());
        return Ok(());
    }
    let labels: Vec<&str> = notices.iter().map(|notice| notice.message.as_str()).collect();
    let defaults = vec![true; labels.len()];
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Dismiss notices")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    for idx in chosen {
        session.notices().dismiss(notices[idx].id);
    }
    Ok(())
}
