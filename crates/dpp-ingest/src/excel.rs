//! Excel workbook connector.
//!
//! Reads one worksheet: a header row names the fields, every later row
//! becomes a record. Cell types survive where JSON can hold them (numbers,
//! booleans, null for blanks); date cells render as ISO-8601 strings.

use std::io::Cursor;

use crate::connector::Connector;
use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use dpp_model::{ConnectorError, DataRecord, Source};
use serde_json::Value;
use tracing::debug;

/// Connector for `.xlsx` workbooks.
pub struct ExcelConnector {
    sheet: Option<String>,
    header_row: usize,
    skip_rows: usize,
}

impl ExcelConnector {
    pub fn new() -> Self {
        Self {
            sheet: None,
            header_row: 1,
            skip_rows: 0,
        }
    }

    /// Reads the named worksheet instead of the first one.
    pub fn with_sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }

    /// Takes headers from the given 1-based row.
    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = row;
        self
    }

    /// Skips `count` rows between the header row and the first data row.
    pub fn with_skip_rows(mut self, count: usize) -> Self {
        self.skip_rows = count;
        self
    }
}

impl Default for ExcelConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for ExcelConnector {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn description(&self) -> &'static str {
        "Excel workbook parser (.xlsx)"
    }

    fn parse(&self, source: &Source) -> Result<Vec<DataRecord>, ConnectorError> {
        match source {
            Source::Path(path) => {
                std::fs::metadata(path).map_err(|error| ConnectorError::read(path, error))?;
                let workbook: Xlsx<std::io::BufReader<std::fs::File>> =
                    open_workbook(path).map_err(|error: XlsxError| ConnectorError::Workbook {
                        origin: path.display().to_string(),
                        detail: error.to_string(),
                    })?;
                self.extract(workbook, &path.display().to_string())
            }
            Source::Bytes(bytes) => {
                let workbook =
                    Xlsx::new(Cursor::new(bytes.clone())).map_err(|error| {
                        ConnectorError::Workbook {
                            origin: "raw bytes".to_string(),
                            detail: error.to_string(),
                        }
                    })?;
                self.extract(workbook, "raw bytes")
            }
            Source::Text(_) => Err(ConnectorError::UnsupportedSource {
                connector: "excel",
                given: source.kind(),
            }),
        }
    }
}

impl ExcelConnector {
    fn extract<RS>(
        &self,
        mut workbook: Xlsx<RS>,
        origin: &str,
    ) -> Result<Vec<DataRecord>, ConnectorError>
    where
        RS: std::io::Read + std::io::Seek,
    {
        let sheet = match &self.sheet {
            Some(name) => {
                let available = workbook.sheet_names();
                if !available.iter().any(|candidate| candidate == name) {
                    return Err(ConnectorError::MissingSheet {
                        name: name.clone(),
                        available,
                    });
                }
                name.clone()
            }
            None => workbook.sheet_names().first().cloned().ok_or_else(|| {
                ConnectorError::Workbook {
                    origin: origin.to_string(),
                    detail: "workbook has no sheets".to_string(),
                }
            })?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|error| ConnectorError::Workbook {
                origin: origin.to_string(),
                detail: error.to_string(),
            })?;
        debug!(sheet = %sheet, rows = range.height(), "reading worksheet");
        self.rows_to_records(&range, &sheet)
    }

    fn rows_to_records(
        &self,
        range: &Range<Data>,
        sheet: &str,
    ) -> Result<Vec<DataRecord>, ConnectorError> {
        let no_header_row = || ConnectorError::NoHeaderRow {
            sheet: sheet.to_string(),
            row: self.header_row,
        };

        // The range covers only used cells; its first row may sit below row 1.
        let first_used = range.start().map_or(0, |(row, _)| row as usize);
        let header_index = self.header_row.checked_sub(1).ok_or_else(no_header_row)?;
        let offset = header_index.checked_sub(first_used).ok_or_else(no_header_row)?;

        let mut rows = range.rows();
        let header_cells = rows.nth(offset).ok_or_else(no_header_row)?;
        let headers: Vec<String> = header_cells
            .iter()
            .enumerate()
            .map(|(index, cell)| header_label(cell, index))
            .collect();

        let mut records = Vec::new();
        for row in rows.skip(self.skip_rows) {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }
            let mut record = DataRecord::new();
            for (index, header) in headers.iter().enumerate() {
                let value = row.get(index).map_or(Value::Null, cell_to_value);
                record.insert(header.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

fn header_label(cell: &Data, index: usize) -> String {
    let label = match cell {
        // Numeric headers like 2024 read back as floats; drop the ".0".
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    };
    let label = label.trim();
    if label.is_empty() {
        format!("column_{index}")
    } else {
        label.to_string()
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(text) => Value::String(text.clone()),
        Data::Int(number) => Value::from(*number),
        Data::Float(number) => {
            if number.fract() == 0.0 && number.abs() < 9.0e18 {
                Value::from(*number as i64)
            } else {
                serde_json::Number::from_f64(*number).map_or(Value::Null, Value::Number)
            }
        }
        Data::Bool(flag) => Value::Bool(*flag),
        Data::DateTime(stamp) => stamp.as_datetime().map_or(Value::Null, |datetime| {
            Value::String(datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
        }),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Value::String(text.clone()),
        Data::Error(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use serde_json::json;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(workbook.add_worksheet());
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_typed_cells_from_first_sheet() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "lot_id").unwrap();
            sheet.write(0, 1, "capacity").unwrap();
            sheet.write(0, 2, "share").unwrap();
            sheet.write(0, 3, "active").unwrap();
            sheet.write(1, 0, "BAT-001").unwrap();
            sheet.write(1, 1, 100).unwrap();
            sheet.write(1, 2, 0.35).unwrap();
            sheet.write(1, 3, true).unwrap();
        });

        let records = ExcelConnector::new().parse(&Source::bytes(bytes)).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get("lot_id"), Some(&json!("BAT-001")));
        assert_eq!(record.get("capacity"), Some(&json!(100)));
        assert_eq!(record.get("share"), Some(&json!(0.35)));
        assert_eq!(record.get("active"), Some(&json!(true)));
    }

    #[test]
    fn named_sheet_and_header_row() {
        let bytes = {
            let mut workbook = Workbook::new();
            workbook.add_worksheet().set_name("Cover").unwrap();
            let sheet = workbook.add_worksheet();
            sheet.set_name("Passports").unwrap();
            sheet.write(0, 0, "export title").unwrap();
            sheet.write(1, 0, "lot_id").unwrap();
            sheet.write(2, 0, "BAT-007").unwrap();
            workbook.save_to_buffer().unwrap()
        };

        let records = ExcelConnector::new()
            .with_sheet("Passports")
            .with_header_row(2)
            .parse(&Source::bytes(bytes))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("lot_id"), Some(&json!("BAT-007")));
    }

    #[test]
    fn missing_sheet_lists_available_names() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "a").unwrap();
        });
        let error = ExcelConnector::new()
            .with_sheet("Nope")
            .parse(&Source::bytes(bytes))
            .unwrap_err();
        match error {
            ConnectorError::MissingSheet { name, available } => {
                assert_eq!(name, "Nope");
                assert_eq!(available, vec!["Sheet1".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_row_beyond_data_is_an_error() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "a").unwrap();
        });
        let error = ExcelConnector::new()
            .with_header_row(10)
            .parse(&Source::bytes(bytes))
            .unwrap_err();
        assert!(matches!(error, ConnectorError::NoHeaderRow { row: 10, .. }));
    }

    #[test]
    fn blank_headers_get_positional_names() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "lot_id").unwrap();
            // column 1 header left blank
            sheet.write(0, 2, "note").unwrap();
            sheet.write(1, 0, "L1").unwrap();
            sheet.write(1, 1, "stray").unwrap();
            sheet.write(1, 2, "ok").unwrap();
        });
        let records = ExcelConnector::new().parse(&Source::bytes(bytes)).unwrap();
        assert_eq!(records[0].get("column_1"), Some(&json!("stray")));
        assert_eq!(records[0].get("note"), Some(&json!("ok")));
    }

    #[test]
    fn skips_blank_rows_and_fills_missing_cells_with_null() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "a").unwrap();
            sheet.write(0, 1, "b").unwrap();
            sheet.write(1, 0, "x").unwrap();
            // row 2 entirely blank
            sheet.write(3, 0, "y").unwrap();
            sheet.write(3, 1, "z").unwrap();
        });
        let records = ExcelConnector::new().parse(&Source::bytes(bytes)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("b"), Some(&json!(null)));
        assert_eq!(records[1].get("b"), Some(&json!("z")));
    }

    #[test]
    fn skip_rows_discards_rows_after_header() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write(0, 0, "lot_id").unwrap();
            sheet.write(1, 0, "units").unwrap();
            sheet.write(2, 0, "BAT-001").unwrap();
        });
        let records = ExcelConnector::new()
            .with_skip_rows(1)
            .parse(&Source::bytes(bytes))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("lot_id"), Some(&json!("BAT-001")));
    }

    #[test]
    fn date_cells_render_iso_8601() {
        let bytes = workbook_bytes(|sheet| {
            let stamp = ExcelDateTime::from_ymd(2024, 1, 15)
                .unwrap()
                .and_hms(10, 30, 0)
                .unwrap();
            let format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
            sheet.write(0, 0, "produced").unwrap();
            sheet
                .write_datetime_with_format(1, 0, &stamp, &format)
                .unwrap();
        });
        let records = ExcelConnector::new().parse(&Source::bytes(bytes)).unwrap();
        assert_eq!(
            records[0].get("produced"),
            Some(&json!("2024-01-15T10:30:00"))
        );
    }

    #[test]
    fn inline_text_is_rejected() {
        let error = ExcelConnector::new()
            .parse(&Source::text("not a workbook"))
            .unwrap_err();
        assert!(matches!(
            error,
            ConnectorError::UnsupportedSource {
                connector: "excel",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xlsx");
        let error = ExcelConnector::new()
            .parse(&Source::path(&path))
            .unwrap_err();
        assert!(matches!(error, ConnectorError::Read { .. }));
    }

    #[test]
    fn reads_workbook_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lots.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write(0, 0, "lot_id").unwrap();
        sheet.write(1, 0, "BAT-042").unwrap();
        workbook.save(&path).unwrap();

        let records = ExcelConnector::new().parse(&Source::path(&path)).unwrap();
        assert_eq!(records[0].get("lot_id"), Some(&json!("BAT-042")));
    }
}
