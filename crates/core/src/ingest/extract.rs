use crate::ingest::error::{ExtractError, ExtractStage};
use crate::ingest::types::RawTable;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::path::Path;

/// Reads a scraper CSV dump into memory. The whole file is read at call time;
/// a writer still appending to it can produce a torn read, which is not detected.
pub fn read_raw_table(source_name: &str, path: &Path) -> Result<RawTable, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| {
        ExtractError::new(source_name, path, ExtractStage::Open, e.to_string())
    })?;

    let text = decode_bytes(source_name, &bytes);
    parse_csv_text(&text).map_err(|(stage, detail)| {
        ExtractError::new(source_name, path, stage, detail)
    })
}

pub fn decode_bytes<'a>(source_name: &str, bytes: &'a [u8]) -> Cow<'a, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            tracing::warn!(source = source_name, "extract is not valid UTF-8; decoding as windows-1252");
            let (cow, _, _) = WINDOWS_1252.decode(bytes);
            cow
        }
    }
}

pub fn parse_csv_text(text: &str) -> Result<RawTable, (ExtractStage, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| (ExtractStage::Header, e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err((ExtractStage::Header, "missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| (ExtractStage::Row, format!("row {}: {e}", idx + 1)))?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());
        rows.push(cells);
    }

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_rows_and_trims_headers() {
        let t = parse_csv_text(" Ticker ,Segmento\nHGLG11\nXPLG11,Logística\n").unwrap();
        assert_eq!(t.headers(), &["Ticker".to_string(), "Segmento".to_string()]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(0, "Segmento"), Some(""));
        assert_eq!(t.cell(1, "Segmento"), Some("Logística"));
    }

    #[test]
    fn decodes_windows_1252_fallback() {
        // "Logística" with í as the single byte 0xED.
        let bytes = b"Ticker,Segmento\nHGLG11,Log\xEDstica\n";
        let text = decode_bytes("test", bytes);
        let t = parse_csv_text(&text).unwrap();
        assert_eq!(t.cell(0, "Segmento"), Some("Logística"));
    }

    #[test]
    fn strips_utf8_bom() {
        let bytes = "\u{FEFF}Ticker\nHGLG11\n".as_bytes();
        let t = parse_csv_text(&decode_bytes("test", bytes)).unwrap();
        assert!(t.column_index("Ticker").is_some());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_raw_table("primary", Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.is_missing_file());
        assert!(err.to_string().contains("source=primary"));
    }
}
