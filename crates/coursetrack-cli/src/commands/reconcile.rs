use crate::commands::{build_service, load_config};
use crate::output::Output;
use color_eyre::Result;
use learn_sync_core::ReconcileReport;
use owo_colors::OwoColorize;
use serde_json::json;

fn summarize(report: &ReconcileReport, dry_run: bool) -> String {
    if !report.changed {
        return format!("{} {}: already consistent", "✓".green(), report.user_id);
    }
    let verb = if dry_run { "would remove" } else { "removed" };
    format!(
        "{} {}: {} {} duplicate(s), {} entr{} recomputed",
        if dry_run { "~".yellow().to_string() } else { "✓".green().to_string() },
        report.user_id,
        verb,
        report.duplicates_removed,
        report.recomputed,
        if report.recomputed == 1 { "y" } else { "ies" },
    )
}

pub async fn run_reconcile(user: Option<String>, all: bool, dry_run: bool, output: &Output) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config, dry_run)?;

    if dry_run {
        output.info("Dry run: no changes will be written");
    }

    if !all {
        let user_id = user.ok_or_else(|| color_eyre::eyre::eyre!("--user or --all is required"))?;
        let report = service
            .reconcile_user(&user_id)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Reconciliation failed for {}: {}", user_id, e))?;
        output.report(summarize(&report, dry_run), &report);
        return Ok(());
    }

    let items = service
        .reconcile_all()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Batch reconciliation failed: {}", e))?;

    let mut failed = 0usize;
    let mut results = Vec::with_capacity(items.len());
    for item in &items {
        match &item.result {
            Ok(report) => {
                output.report(summarize(report, dry_run), report);
                results.push(json!({ "userId": item.user_id, "ok": true }));
            }
            Err(e) => {
                failed += 1;
                output.error(format!("{}: {}", item.user_id, e));
                results.push(json!({ "userId": item.user_id, "ok": false, "error": e.to_string() }));
            }
        }
    }

    output.report(
        format!("Reconciled {} user(s), {} failed", items.len() - failed, failed),
        &json!({ "users": items.len(), "failed": failed, "results": results }),
    );

    if failed > 0 {
        return Err(color_eyre::eyre::eyre!("{} user(s) could not be reconciled", failed));
    }
    Ok(())
}
