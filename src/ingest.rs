//! Document ingestion boundary.
//!
//! Uploaded files pass through a [`TextExtractor`] before the bank parser
//! sees them. The shipped implementation handles plain-text uploads;
//! converters for binary document formats plug in behind the same trait.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("file is not valid UTF-8 text")]
    NotText,

    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

/// Turns an uploaded file into the raw text fed to the bank parser.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file_name: &str, data: &[u8]) -> Result<String, IngestError>;
}

/// Extractor for plain-text uploads (`.txt`, `.md`, or anything that decodes
/// as UTF-8). Known binary document extensions are rejected up front so the
/// caller gets a useful error instead of a failed parse.
pub struct PlainTextExtractor;

const BINARY_EXTENSIONS: &[&str] = &["doc", "docx", "pdf", "odt", "rtf"];

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, file_name: &str, data: &[u8]) -> Result<String, IngestError> {
        if data.is_empty() {
            return Err(IngestError::Empty);
        }

        if let Some(ext) = file_name.rsplit('.').next().filter(|e| *e != file_name) {
            let ext = ext.to_ascii_lowercase();
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                return Err(IngestError::Unsupported(ext));
            }
        }

        String::from_utf8(data.to_vec()).map_err(|_| IngestError::NotText)
    }
}
