use crate::commands::{build_service, load_config};
use crate::output::Output;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use learn_sync_models::QuizCompletionRecord;
use serde_json::json;

fn parse_completed_at(raw: Option<String>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| color_eyre::eyre::eyre!("Invalid --completed-at '{}': {}", s, e)),
    }
}

pub async fn run_complete(
    user_id: &str,
    course_id: String,
    video_id: String,
    score: f64,
    completed_at: Option<String>,
    output: &Output,
) -> Result<()> {
    let record = QuizCompletionRecord {
        course_id,
        video_id,
        score,
        completed_at: parse_completed_at(completed_at)?,
    };

    let config = load_config()?;
    let service = build_service(&config, false)?;

    let course_id = record.course_id.clone();
    let video_id = record.video_id.clone();
    let report = service
        .record_completion(user_id, record)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to record completion: {}", e))?;

    let progress = report
        .as_ref()
        .and_then(|r| r.entries.iter().find(|e| e.course_id == course_id))
        .map(|e| e.progress);

    let human = match progress {
        Some(p) => format!("Recorded quiz for {}/{}, course progress now {}%", course_id, video_id, p),
        None => format!("Recorded quiz for {}/{}", course_id, video_id),
    };
    output.report(
        human,
        &json!({
            "userId": user_id,
            "courseId": course_id,
            "videoId": video_id,
            "progress": progress,
            "reconcile": report,
        }),
    );
    Ok(())
}
