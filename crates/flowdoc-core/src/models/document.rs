use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Content type used when the extension is not recognised
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Default page number for the document list
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for the document list
pub const DEFAULT_LIMIT: u32 = 10;

/// Binary content of a file about to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?
            .to_string();

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    /// Whether the dashboard's file picker would offer this file
    /// (`application/pdf` or any `image/*`).
    pub fn is_accepted_type(&self) -> bool {
        self.content_type == "application/pdf" || self.content_type.starts_with("image/")
    }
}

/// Guess a MIME type from a file name's extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return FALLBACK_CONTENT_TYPE,
    };

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Metadata record sent alongside an upload, serialized as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    /// ISO-8601 timestamp
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
}

impl UploadMetadata {
    /// Describe `file`, stamped with the current time.
    pub fn for_file(file: &UploadFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            file_type: file.content_type.clone(),
            upload_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Page parameters for the document list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPage {
    pub page: u32,
    pub limit: u32,
}

impl ListPage {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

impl Default for ListPage {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}
