//! Lenient dashboard views over document list payloads.
//!
//! The list endpoint's payload is backend-defined, so these types accept
//! the field spellings the Flowdoc backends have used and skip anything
//! they cannot read.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::utils::format_bytes;

/// Status the backend assigns to documents that have not been processed
const DEFAULT_STATUS: &str = "pending";

/// Keys under which a wrapped list payload may carry its documents
const LIST_KEYS: [&str; 3] = ["documents", "items", "data"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    #[serde(default, alias = "fileName", alias = "original_name", alias = "title")]
    pub filename: Option<String>,
    #[serde(default, alias = "mime_type", alias = "fileType", alias = "contentType")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<u64>,
    #[serde(default, alias = "createdAt", alias = "uploadDate")]
    pub created_at: Option<String>,
}

/// Sizes arrive as integers, floats or numeric strings depending on the
/// backend. Anything else reads as unknown rather than failing the entry.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let size = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    };
    Ok(size)
}

impl DocumentSummary {
    /// Extract summaries from a list payload: either a bare array or an
    /// object wrapping one under `documents`, `items` or `data`.
    pub fn from_payload(payload: &Value) -> Vec<DocumentSummary> {
        let entries = match payload {
            Value::Array(items) => items,
            Value::Object(map) => match LIST_KEYS.iter().find_map(|k| map.get(*k)?.as_array()) {
                Some(items) => items,
                None => return vec![],
            },
            _ => return vec![],
        };

        entries
            .iter()
            .filter_map(|entry| match DocumentSummary::deserialize(entry) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable document entry");
                    None
                }
            })
            .collect()
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("(untitled)")
    }

    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    pub fn size_display(&self) -> String {
        match self.size {
            Some(bytes) => format_bytes(bytes),
            None => "-".to_string(),
        }
    }
}

/// Aggregate statistics shown at the top of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub total: usize,
    pub total_bytes: u64,
    pub by_status: BTreeMap<String, usize>,
    pub by_content_type: BTreeMap<String, usize>,
}

impl DocumentStats {
    pub fn from_documents(documents: &[DocumentSummary]) -> Self {
        let mut stats = DocumentStats {
            total: documents.len(),
            ..Default::default()
        };

        for doc in documents {
            stats.total_bytes += doc.size.unwrap_or(0);
            *stats
                .by_status
                .entry(doc.status_display().to_string())
                .or_default() += 1;
            let content_type = doc.content_type.as_deref().unwrap_or("unknown");
            *stats.by_content_type.entry(content_type.to_string()).or_default() += 1;
        }

        stats
    }

    pub fn count_for_status(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }

    pub fn total_bytes_display(&self) -> String {
        format_bytes(self.total_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_bare_array() {
        let payload = json!([
            {"id": 1, "filename": "a.pdf", "content_type": "application/pdf", "status": "processed", "size": 2048},
            {"id": "doc-2", "title": "Lease", "mime_type": "image/png"}
        ]);

        let docs = DocumentSummary::from_payload(&payload);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, DocumentId::Number(1));
        assert_eq!(docs[0].display_name(), "a.pdf");
        assert_eq!(docs[1].id.to_string(), "doc-2");
        assert_eq!(docs[1].display_name(), "Lease");
        assert_eq!(docs[1].status_display(), "pending");
    }

    #[test]
    fn test_from_wrapped_payload() {
        let payload = json!({
            "documents": [{"id": 5, "fileName": "x.jpg", "fileType": "image/jpeg", "uploadDate": "2024-01-02T00:00:00Z"}],
            "total": 1,
            "page": 1
        });

        let docs = DocumentSummary::from_payload(&payload);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(docs[0].created_at.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_skips_entries_without_id() {
        let payload = json!({"items": [{"filename": "orphan.pdf"}, {"id": 3}]});
        let docs = DocumentSummary::from_payload(&payload);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, DocumentId::Number(3));
    }

    #[test]
    fn test_unrecognised_payload_is_empty() {
        assert!(DocumentSummary::from_payload(&json!({"error": "nope"})).is_empty());
        assert!(DocumentSummary::from_payload(&json!("text")).is_empty());
        assert!(DocumentSummary::from_payload(&Value::Null).is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let payload = json!([
            {"id": 1, "content_type": "application/pdf", "status": "processed", "size": 1000},
            {"id": 2, "content_type": "application/pdf", "size": 24},
            {"id": 3, "content_type": "image/png", "status": "processed"},
            {"id": 4}
        ]);
        let stats = DocumentStats::from_documents(&DocumentSummary::from_payload(&payload));

        assert_eq!(stats.total, 4);
        assert_eq!(stats.total_bytes, 1024);
        assert_eq!(stats.count_for_status("processed"), 2);
        assert_eq!(stats.count_for_status("pending"), 2);
        assert_eq!(stats.count_for_status("failed"), 0);
        assert_eq!(stats.by_content_type.get("application/pdf"), Some(&2));
        assert_eq!(stats.by_content_type.get("unknown"), Some(&1));
        assert_eq!(stats.total_bytes_display(), "1.0 KB");
    }

    #[test]
    fn test_loosely_typed_sizes_keep_the_entry() {
        let payload = json!([
            {"id": 1, "size": "2048"},
            {"id": 2, "size": 1000.7},
            {"id": 3, "size": "unknown"},
            {"id": 4, "size": -5},
            {"id": 5, "size": null}
        ]);
        let docs = DocumentSummary::from_payload(&payload);

        assert_eq!(docs.len(), 5);
        let sizes: Vec<Option<u64>> = docs.iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![Some(2048), Some(1000), None, None, None]);
        assert_eq!(DocumentStats::from_documents(&docs).total_bytes, 3048);
        assert_eq!(docs[2].size_display(), "-");
    }
}
