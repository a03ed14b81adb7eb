//! Extraction adapter: turns an uploaded resume file into plain text plus a page count.
//!
//! Dispatch is by file extension only. Reads are whole-buffer; nothing is streamed.

pub mod pdf;
pub mod word;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read PDF '{file_name}': {reason}")]
    Pdf { file_name: String, reason: String },

    #[error("Failed to read Word document '{file_name}': {reason}")]
    Word { file_name: String, reason: String },

    #[error("Unsupported file format: '{file_name}' (expected .pdf, .doc or .docx)")]
    UnsupportedFormat { file_name: String },
}

/// Text and page count of one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub file_size: u64,
    pub text: String,
    pub page_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Pdf,
    Word,
}

fn detect_format(file_name: &str) -> Option<DocumentFormat> {
    match extension(file_name)?.as_str() {
        "pdf" => Some(DocumentFormat::Pdf),
        "doc" | "docx" => Some(DocumentFormat::Word),
        _ => None,
    }
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Extracts text from `bytes`, choosing the parser from the file name's extension.
pub fn extract_document(file_name: &str, bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
    let format = detect_format(file_name).ok_or_else(|| ExtractionError::UnsupportedFormat {
        file_name: file_name.to_string(),
    })?;

    let (text, page_count) = match format {
        DocumentFormat::Pdf => pdf::extract(file_name, bytes)?,
        DocumentFormat::Word => word::extract(file_name, bytes)?,
    };

    tracing::debug!(
        "Extracted {} chars over {} page(s) from {}",
        text.len(),
        page_count,
        file_name
    );

    Ok(ExtractedDocument {
        file_name: file_name.to_string(),
        file_size: bytes.len() as u64,
        text,
        page_count,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Upload validation
// ────────────────────────────────────────────────────────────────────────────

/// A file as received from a multipart upload, before extraction.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: bytes::Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub accepted: Vec<UploadedFile>,
    pub rejected: Vec<RejectedFile>,
    /// Names of files skipped because the same name and size already appeared.
    pub duplicates: Vec<String>,
}

/// Applies the upload policy: allowed extension, size limit, and no
/// duplicate (name, size) pairs within one batch. Input order is kept.
pub fn validate_batch(files: Vec<UploadedFile>, max_bytes: usize) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    let mut seen: HashSet<(String, usize)> = HashSet::new();

    for file in files {
        if detect_format(&file.file_name).is_none() {
            batch.rejected.push(RejectedFile {
                file_name: file.file_name,
                reason: "unsupported file type".to_string(),
            });
            continue;
        }
        if file.bytes.len() > max_bytes {
            batch.rejected.push(RejectedFile {
                file_name: file.file_name,
                reason: format!("file exceeds the {max_bytes} byte limit"),
            });
            continue;
        }
        if !seen.insert((file.file_name.clone(), file.bytes.len())) {
            batch.duplicates.push(file.file_name);
            continue;
        }
        batch.accepted.push(file);
    }

    batch
}
