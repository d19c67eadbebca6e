//! Result card for one endpoint call.

use std::fmt::Write;

use medsent_client::CallOutcome;

/// Certainty is never shown as a flat 100%.
const MAX_CERTAINTY_PCT: f64 = 99.9;

pub fn print_result_card(endpoint: &str, outcome: &CallOutcome, total_ms: u64) {
    print!("{}", render_result_card(endpoint, outcome, total_ms));
}

/// Render label, certainty, model and latency as a vertical card.
pub fn render_result_card(endpoint: &str, outcome: &CallOutcome, total_ms: u64) -> String {
    let view = outcome.view();
    let mut out = String::new();

    let _ = writeln!(out, "=== {endpoint} ===");
    row(&mut out, "Label", &view.display_label());
    row(&mut out, "Certainty", &certainty_text(view.certainty));
    row(&mut out, "Model", &view.model);

    let mut latency = format!("total {total_ms} ms");
    // A zero server time is as good as none.
    if let Some(server_ms) = view.server_elapsed_ms.filter(|ms| *ms > 0) {
        let _ = write!(latency, " · server {server_ms} ms");
    }
    row(&mut out, "Latency", &latency);

    if outcome.attempts > 1 {
        row(&mut out, "Attempts", &outcome.attempts.to_string());
    }
    if !outcome.is_success() {
        row(&mut out, "Status", &format!("HTTP {}", outcome.status));
        if let Some(error) = outcome.data.get("error").and_then(|e| e.as_str()) {
            row(&mut out, "Error", error);
        }
    }
    row(
        &mut out,
        "Received",
        &outcome.received_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    out
}

fn row(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  {name:<12} {value}");
}

fn certainty_text(certainty: Option<f64>) -> String {
    match certainty {
        Some(c) => format!("{:.1}%", (c * 100.0).min(MAX_CERTAINTY_PCT)),
        None => "N/A".to_string(),
    }
}
