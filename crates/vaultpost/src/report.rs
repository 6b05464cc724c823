//! Human-readable summaries of publish results.

use std::fmt::Write;
use vaultpost_core::{Category, PublishReport, UploadResult};

/// Multi-line summary of a publish: outcome first, then one line per embed.
pub fn render_report(report: &PublishReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", report.title, report.outcome.message());

    if report.uploads.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "Uploads: {} of {} succeeded",
        report.uploaded_count(),
        report.uploads.len()
    );
    for record in &report.uploads {
        match &record.result {
            UploadResult::Uploaded { url } => {
                let _ = writeln!(out, "  ok      {} -> {}", record.reference, url);
            }
            UploadResult::Failed(failure) => {
                let _ = writeln!(out, "  failed  {} ({})", record.reference, failure);
            }
        }
    }
    out
}

/// One `id  name` line per category
pub fn render_categories(categories: &[Category]) -> String {
    let width = categories
        .iter()
        .map(|c| c.id.to_string().len())
        .max()
        .unwrap_or(1);
    categories
        .iter()
        .map(|c| format!("{:>width$}  {}\n", c.id, c.name, width = width))
        .collect()
}
