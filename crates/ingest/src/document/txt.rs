use studybot_core::Record;

/// Decode plain text as UTF-8, falling back to Latin-1 (which cannot fail).
pub fn extract_txt(bytes: &[u8]) -> (String, Record) {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    let mut metadata = Record::new();
    metadata.insert("size".into(), bytes.len().into());
    (text, metadata)
}
