// ============================================================
// CSV PARSER
// ============================================================
// Decode uploaded CSV bytes and split them into header + rows

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::error::AppError;

/// Header row plus data rows, with blank lines already dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// Lowercased, trimmed, unquoted header names
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// CSV parser with encoding fallback
#[derive(Default)]
pub struct CsvParser {
    /// Delimiter character; `None` means detect from the content
    delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// UTF-8 when valid, otherwise Windows-1252 (what spreadsheet exports
    /// on Windows usually are). A UTF-8 BOM is dropped.
    pub fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(content) => content.to_string(),
            Err(_) => {
                let (content, _, _) = WINDOWS_1252.decode(bytes);
                content.into_owned()
            }
        }
    }

    /// Parse raw upload bytes. Needs a header row and at least one data row.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<CsvTable, AppError> {
        self.parse_content(&Self::decode(bytes))
    }

    pub fn parse_content(&self, content: &str) -> Result<CsvTable, AppError> {
        let lines: Vec<&str> = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();

        if lines.len() < 2 {
            return Err(AppError::ValidationError(
                "CSV must have a header row and at least one data row".to_string(),
            ));
        }

        let cleaned = lines.join("\n");
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(&cleaned));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true) // Allow rows with different lengths
            .has_headers(false)
            .from_reader(cleaned.as_bytes());

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
                .iter()
                .map(|h| clean_value(h).to_lowercase())
                .collect(),
            None => {
                return Err(AppError::ValidationError(
                    "CSV must have a header row and at least one data row".to_string(),
                ))
            }
        };

        let mut rows = Vec::new();
        for (index, result) in records.enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(clean_value).collect());
        }

        Ok(CsvTable { headers, rows })
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// Trim and strip one layer of stray surrounding quotes.
fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
