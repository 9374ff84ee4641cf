use crate::commands::{build_service, load_config};
use crate::output::Output;
use color_eyre::Result;
use learn_sync_models::CourseSnapshot;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Build the course snapshot either from a JSON file or from the inline flags
pub fn snapshot_from_args(
    course_file: Option<PathBuf>,
    course_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    instructor: Option<String>,
    thumbnail: Option<String>,
    total_videos: Option<i64>,
) -> Result<CourseSnapshot> {
    if let Some(path) = course_file {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read course file {}: {}", path.display(), e))?;
        let snapshot: CourseSnapshot = serde_json::from_str(&content)
            .map_err(|e| color_eyre::eyre::eyre!("Invalid course snapshot in {}: {}", path.display(), e))?;
        return Ok(snapshot);
    }

    let course_id = course_id.ok_or_else(|| color_eyre::eyre::eyre!("--course-id or --course-file is required"))?;
    let total_videos = total_videos.ok_or_else(|| color_eyre::eyre::eyre!("--total-videos is required with --course-id"))?;

    Ok(CourseSnapshot {
        course_id,
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        instructor_display_name: instructor.unwrap_or_default(),
        thumbnail: thumbnail.unwrap_or_default(),
        total_videos,
    })
}

pub async fn run_open(user_id: &str, snapshot: CourseSnapshot, output: &Output) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config, false)?;

    let report = service
        .open_course(user_id, &snapshot)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to open course {}: {}", snapshot.course_id, e))?;

    let human = match (&report.entry, report.is_new_entry) {
        (Some(entry), true) => format!(
            "{} Added {} to {}'s watchlist ({}%)",
            "✓".green(),
            entry.course_id.bright_cyan(),
            user_id,
            entry.progress
        ),
        (Some(entry), false) => format!(
            "{} {} already on {}'s watchlist, last accessed updated",
            "✓".green(),
            entry.course_id.bright_cyan(),
            user_id
        ),
        (None, _) => format!("Opened {} for {}", report.course_id, user_id),
    };
    output.report(human, &report);
    Ok(())
}
