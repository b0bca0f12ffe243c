//! Data models for Flowdoc requests and dashboard views.
//!
//! - `UploadFile`, `UploadMetadata`: the two halves of an upload request
//! - `ListPage`: page/limit parameters for the document list
//! - `DocumentSummary`, `DocumentStats`: lenient views over backend list
//!   payloads used by the dashboard

pub mod document;
pub mod summary;

pub use document::{ListPage, UploadFile, UploadMetadata};
pub use summary::{DocumentId, DocumentStats, DocumentSummary};
