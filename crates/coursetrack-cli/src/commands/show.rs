use crate::commands::{build_service, load_config};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use learn_sync_models::{WatchlistEntry, WatchlistStatus};

fn watchlist_table(entries: &[WatchlistEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Course").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Instructor").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Quizzes").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Progress").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Last accessed").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    for entry in entries {
        let status_color = match entry.status {
            WatchlistStatus::Completed => Color::Green,
            WatchlistStatus::InProgress => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(&entry.course_id),
            Cell::new(&entry.course_title),
            Cell::new(&entry.instructor),
            Cell::new(format!("{}/{}", entry.completed_quizzes, entry.total_videos)),
            Cell::new(format!("{}%", entry.progress)),
            Cell::new(entry.status.as_str()).fg(status_color),
            Cell::new(entry.recency().format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

pub async fn run_show(user_id: &str, output: &Output) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config, false)?;

    let entries = service
        .watchlist(user_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load watchlist for {}: {}", user_id, e))?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if entries.is_empty() {
                output.info(format!("{} has no courses on their watchlist", user_id));
                return Ok(());
            }
            println!("{}", watchlist_table(&entries));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => output.report("", &entries),
    }
    Ok(())
}
