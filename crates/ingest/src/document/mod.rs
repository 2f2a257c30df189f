//! Text extraction from uploaded study materials.
//!
//! Extraction never fails outright: unsupported files and broken documents
//! produce an explanatory text payload plus an `error` metadata entry, so an
//! upload can always be stored.

mod docx;
mod pdf;
mod txt;

use serde_json::Value;
use studybot_core::Record;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("DOCX extraction failed: {0}")]
    DocxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    /// Lower-cased extension: "pdf", "docx", "txt", ...
    pub file_type: String,
    pub text: String,
    /// Format-specific metadata (page count, author, size, ...).
    pub metadata: Record,
}

impl ExtractedDocument {
    /// Whether extraction failed and `text` is an explanation, not content.
    pub fn is_error(&self) -> bool {
        self.metadata.contains_key("error")
    }

    pub fn total_chars(&self) -> usize {
        self.text.chars().count()
    }
}

fn file_type_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Extract text from file bytes, dispatching on the filename's extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> ExtractedDocument {
    let file_type = file_type_of(filename);

    let extracted = match file_type.as_str() {
        "pdf" => pdf::extract_pdf(bytes),
        "docx" | "doc" => docx::extract_docx(bytes),
        "txt" | "text" | "md" | "markdown" | "rtf" => Ok(txt::extract_txt(bytes)),
        _ => Err(ExtractionError::UnsupportedType(filename.to_string())),
    };

    let (text, metadata) = match extracted {
        Ok(parts) => parts,
        Err(e) => {
            tracing::warn!(filename, error = %e, "document extraction failed");
            let mut metadata = Record::new();
            let reason = match &e {
                ExtractionError::UnsupportedType(_) => "Unsupported file type".to_string(),
                other => other.to_string(),
            };
            metadata.insert("error".into(), Value::String(reason));
            (e.to_string(), metadata)
        }
    };

    ExtractedDocument {
        filename: filename.to_string(),
        file_type,
        text,
        metadata,
    }
}
