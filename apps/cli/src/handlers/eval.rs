use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use vtl_metrics::{read_predictions, score_predictions, similarity_scores};

/// Scores a predictions file and prints one `metric: value` line per score.
///
/// Classification scores come first, then ROUGE and BLEU (already scaled to 0-100).
///
/// # Errors
/// Returns an error if the file is unreadable, malformed or empty.
pub fn run(path: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let records = read_predictions(path)?;
    let scores = score_predictions(&records).with_context(|| format!("Cannot score {}", path.display()))?;
    let similarity = similarity_scores(&records).with_context(|| format!("Cannot score {}", path.display()))?;
    info!(samples = records.len(), "Scored predictions");

    if json {
        let report = serde_json::json!({ "classification": scores, "similarity": similarity });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    let rows = [
        ("accuracy", scores.accuracy),
        ("macro_precision", scores.macro_precision),
        ("macro_recall", scores.macro_recall),
        ("macro_f1", scores.macro_f1),
        ("weighted_precision", scores.weighted_precision),
        ("weighted_f1", scores.weighted_f1),
    ];
    for (name, value) in rows {
        println!("{name}: {value:.4}");
    }
    for (name, value) in &similarity {
        println!("{name}: {value:.4}");
    }
    Ok(ExitCode::SUCCESS)
}
