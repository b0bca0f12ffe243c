//! Plain-text rendering for the dashboard views.

use std::fmt::Write;

use flowdoc_core::models::{DocumentStats, DocumentSummary};
use flowdoc_core::utils::{format_age, format_date, truncate_string};
use flowdoc_core::SessionData;

const NAME_WIDTH: usize = 36;
const TYPE_WIDTH: usize = 18;

pub fn document_table(documents: &[DocumentSummary]) -> String {
    if documents.is_empty() {
        return "No documents yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<NAME_WIDTH$} {:<TYPE_WIDTH$} {:<10} {:>9}  {}",
        "ID", "NAME", "TYPE", "STATUS", "SIZE", "UPLOADED"
    );
    for doc in documents {
        let _ = writeln!(
            out,
            "{:<8} {:<NAME_WIDTH$} {:<TYPE_WIDTH$} {:<10} {:>9}  {}",
            truncate_string(&doc.id.to_string(), 8),
            truncate_string(doc.display_name(), NAME_WIDTH),
            truncate_string(doc.content_type.as_deref().unwrap_or("-"), TYPE_WIDTH),
            doc.status_display(),
            doc.size_display(),
            doc.created_at.as_deref().map(format_date).unwrap_or_default(),
        );
    }
    out
}

pub fn statistics(stats: &DocumentStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Documents:   {}", stats.total);
    let _ = writeln!(out, "Total size:  {}", stats.total_bytes_display());

    if !stats.by_status.is_empty() {
        let _ = writeln!(out, "By status:");
        for (status, count) in &stats.by_status {
            let _ = writeln!(out, "  {:<16} {}", status, count);
        }
    }
    if !stats.by_content_type.is_empty() {
        let _ = writeln!(out, "By type:");
        for (content_type, count) in &stats.by_content_type {
            let _ = writeln!(out, "  {:<16} {}", content_type, count);
        }
    }
    out
}

pub fn session_status(data: Option<&SessionData>) -> String {
    match data {
        Some(data) => format!(
            "Logged in as {} ({})",
            data.username,
            format_age(data.age())
        ),
        None => "Not logged in".to_string(),
    }
}
