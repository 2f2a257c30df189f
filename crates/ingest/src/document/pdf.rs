use studybot_core::Record;

use super::ExtractionError;

/// Extract PDF text, one `--- Page N ---` section per non-empty page.
pub fn extract_pdf(bytes: &[u8]) -> Result<(String, Record), ExtractionError> {
    // pdf-extract panics on some malformed fonts and streams.
    let raw = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractionError::PdfError("parser panicked on malformed PDF".into()))?
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    // pdf-extract returns all text as one string, pages separated by form feeds.
    let pages: Vec<&str> = raw.split('\x0C').collect();
    let page_count = pages.len();

    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        text.push_str(&format!("--- Page {} ---\n{}\n\n", i + 1, page));
    }

    if text.is_empty() {
        tracing::warn!("PDF contains no extractable text layer ({} pages)", page_count);
    }

    let mut metadata = Record::new();
    metadata.insert("pageCount".into(), page_count.into());
    Ok((text, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_pdf_error() {
        let err = extract_pdf(b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, ExtractionError::PdfError(_)));
    }
}
