use crate::output::Output;
use color_eyre::Result;
use learn_sync_core::{decode_entries, decode_records, reconcile, ReconcileOutcome};
use std::path::Path;

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| color_eyre::eyre::eyre!("{} is not valid JSON: {}", path.display(), e))
}

fn repair_files(watchlist: &Path, completions: Option<&Path>) -> Result<ReconcileOutcome> {
    let entries = decode_entries(read_json(watchlist)?)?;
    let records = match completions {
        Some(path) => decode_records(read_json(path)?)?,
        None => Vec::new(),
    };
    Ok(reconcile(&entries, &records)?)
}

pub fn run_repair(watchlist: &Path, completions: Option<&Path>, write: Option<&Path>, output: &Output) -> Result<()> {
    let outcome = repair_files(watchlist, completions)?;

    let summary = format!(
        "{} entr{} kept, {} duplicate(s) removed, {} recomputed",
        outcome.entries.len(),
        if outcome.entries.len() == 1 { "y" } else { "ies" },
        outcome.duplicates_removed,
        outcome.recomputed
    );

    match write {
        Some(path) => {
            let content = serde_json::to_string_pretty(&outcome.entries)?;
            std::fs::write(path, content)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", path.display(), e))?;
            output.success(format!("{}, written to {}", summary, path.display()));
        }
        None => {
            output.info(&summary);
            let human = serde_json::to_string_pretty(&outcome.entries)?;
            output.report(human, &outcome);
        }
    }
    Ok(())
}
