//! Delimited-text connector.
//!
//! Reads a header row and one record per data row. The delimiter is sniffed
//! from the first line unless the mapping pins one, values are whitespace
//! trimmed, and rows shorter than the header pad with null.

use crate::connector::{Connector, source_text};
use dpp_model::{ConnectorError, DataRecord, Source};
use serde_json::Value;
use tracing::debug;

/// How many leading bytes the delimiter sniffer inspects.
const SNIFF_WINDOW: usize = 4096;

const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Connector for CSV and other single-character-delimited text.
pub struct CsvConnector {
    delimiter: Option<char>,
    skip_rows: usize,
}

impl CsvConnector {
    pub fn new() -> Self {
        Self {
            delimiter: None,
            skip_rows: 0,
        }
    }

    /// Pins the field delimiter instead of sniffing it.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Skips `count` lines before the header row. Useful for exports that
    /// prepend titles or generation timestamps.
    pub fn with_skip_rows(mut self, count: usize) -> Self {
        self.skip_rows = count;
        self
    }
}

impl Default for CsvConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for CsvConnector {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> &'static str {
        "delimited text parser (CSV, TSV)"
    }

    fn parse(&self, source: &Source) -> Result<Vec<DataRecord>, ConnectorError> {
        let text = source_text(source)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let body = skip_lines(text, self.skip_rows);

        let delimiter = match self.delimiter {
            Some(delimiter) => {
                u8::try_from(delimiter).map_err(|_| ConnectorError::Csv {
                    detail: format!("delimiter {delimiter:?} is not a single-byte character"),
                })?
            }
            None => sniff_delimiter(body),
        };
        debug!(delimiter = %char::from(delimiter), "reading delimited text");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers = reader
            .headers()
            .map_err(|error| ConnectorError::Csv {
                detail: error.to_string(),
            })?
            .clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|error| ConnectorError::Csv {
                detail: error.to_string(),
            })?;
            let mut record = DataRecord::new();
            for (index, header) in headers.iter().enumerate() {
                let value = match row.get(index) {
                    Some(field) => Value::String(field.to_string()),
                    None => Value::Null,
                };
                record.insert(header.to_string(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(position) => rest = &rest[position + 1..],
            None => return "",
        }
    }
    rest
}

/// Picks the candidate delimiter that appears most often in the first line of
/// the sniff window. Comma wins ties and empty input.
fn sniff_delimiter(text: &str) -> u8 {
    let window = &text.as_bytes()[..text.len().min(SNIFF_WINDOW)];
    let first_line = match window.iter().position(|&byte| byte == b'\n') {
        Some(position) => &window[..position],
        None => window,
    };

    let mut best = b',';
    let mut best_count = first_line.iter().filter(|&&byte| byte == b',').count();
    for &candidate in &SNIFF_CANDIDATES[1..] {
        let count = first_line.iter().filter(|&&byte| byte == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}
