//! Shared output formatting.

use palace_core::vaults::VaultResult;
use serde::Serialize;

/// Note row for JSON output.
#[derive(Debug, Serialize)]
pub struct ResultOutput {
    pub vault: String,
    pub path: String,
    pub display_path: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&VaultResult> for ResultOutput {
    fn from(r: &VaultResult) -> Self {
        Self {
            vault: r.vault.clone(),
            path: r.path.to_string_lossy().to_string(),
            display_path: r.display_path.clone(),
            note_type: r.note.note_type.clone(),
            title: r.note.title.clone(),
            status: r.note.status.as_str().to_string(),
            modified: r.note.modified.clone(),
            score: r.score,
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => super::fail(format!("Error encoding JSON: {}", e)),
    }
}

pub fn print_results_json(results: &[VaultResult]) {
    let rows: Vec<ResultOutput> = results.iter().map(ResultOutput::from).collect();
    print_json(&rows);
}

/// Print results as a table. Scores are shown when any result has one.
pub fn print_results_table(results: &[VaultResult]) {
    if results.is_empty() {
        println!("(no notes found)");
        return;
    }

    let show_score = results.iter().any(|r| r.score.is_some());
    let path_width =
        results.iter().map(|r| r.display_path.chars().count()).max().unwrap_or(4).clamp(4, 60);
    let type_width =
        results.iter().map(|r| r.note.note_type.chars().count()).max().unwrap_or(4).clamp(4, 12);

    if show_score {
        println!(
            "{:<path_width$}  {:<type_width$}  {:>7}  TITLE",
            "PATH",
            "TYPE",
            "SCORE",
            path_width = path_width,
            type_width = type_width,
        );
    } else {
        println!(
            "{:<path_width$}  {:<type_width$}  TITLE",
            "PATH",
            "TYPE",
            path_width = path_width,
            type_width = type_width,
        );
    }

    for r in results {
        let path = truncate(&r.display_path, path_width);
        match r.score {
            Some(score) if show_score => println!(
                "{:<path_width$}  {:<type_width$}  {:>7.3}  {}",
                path,
                r.note.note_type,
                score,
                r.note.title,
                path_width = path_width,
                type_width = type_width,
            ),
            _ => println!(
                "{:<path_width$}  {:<type_width$}  {}",
                path,
                r.note.note_type,
                r.note.title,
                path_width = path_width,
                type_width = type_width,
            ),
        }
    }

    println!();
    println!("{} note(s)", results.len());
}

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
