//! DOCX extraction: the body lives in `word/document.xml`, core properties in
//! `docProps/core.xml`, both inside a zip container.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use studybot_core::Record;

use super::ExtractionError;

const BODY_PART: &str = "word/document.xml";
const CORE_PART: &str = "docProps/core.xml";

/// Core property element names mapped to metadata keys.
const CORE_PROPERTIES: &[(&[u8], &str)] = &[
    (b"dc:title", "title"),
    (b"dc:creator", "author"),
    (b"dc:subject", "subject"),
    (b"dcterms:created", "created"),
    (b"dcterms:modified", "modified"),
];

fn docx_err(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::DocxError(e.to_string())
}

pub fn extract_docx(bytes: &[u8]) -> Result<(String, Record), ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_err)?;

    let body = read_part(&mut archive, BODY_PART)?
        .ok_or_else(|| docx_err(format!("missing {BODY_PART}")))?;
    let paragraphs = body_paragraphs(&body)?;

    let mut metadata = match read_part(&mut archive, CORE_PART)? {
        Some(core) => core_properties(&core)?,
        None => Record::new(),
    };
    metadata.insert("paragraphCount".into(), paragraphs.len().into());

    let mut text = String::new();
    for para in paragraphs.iter().filter(|p| !p.is_empty()) {
        text.push_str(para);
        text.push('\n');
    }
    Ok((text, metadata))
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, ExtractionError> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(docx_err(e)),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Collect the text of every `w:p` paragraph, in document order.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(docx_err)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape().map_err(docx_err)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn core_properties(xml: &str) -> Result<Record, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut metadata = Record::new();
    let mut current_key: Option<&str> = None;

    loop {
        match reader.read_event().map_err(docx_err)? {
            Event::Start(e) => {
                current_key = CORE_PROPERTIES
                    .iter()
                    .find(|(tag, _)| *tag == e.name().as_ref())
                    .map(|(_, key)| *key);
            }
            Event::Text(t) => {
                if let Some(key) = current_key {
                    let value = t.unescape().map_err(docx_err)?.trim().to_string();
                    if !value.is_empty() {
                        metadata.insert(key.into(), Value::String(value));
                    }
                }
            }
            Event::End(_) => current_key = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}
