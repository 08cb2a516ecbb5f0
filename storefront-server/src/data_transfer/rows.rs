//! Import file parsing
//!
//! Both formats are header-keyed. Cells arrive as raw text; typing happens
//! per row during reconciliation so a bad cell fails only its row.

use calamine::{Data, Reader};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ImportFormat;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data row, keyed by the import column names
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductImportRow {
    pub part_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub oem: Option<String>,
    pub compatibility: Option<String>,
    pub condition: Option<String>,
    pub year: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub slug: Option<String>,
}

/// Trimmed, non-empty cell text
pub fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProductImportRow {
    pub fn part_number(&self) -> Option<&str> {
        cell(&self.part_number)
    }

    fn is_blank(&self) -> bool {
        [
            &self.part_number,
            &self.name,
            &self.description,
            &self.price,
            &self.original_price,
            &self.category_id,
            &self.subcategory_id,
            &self.status,
            &self.brand,
            &self.oem,
            &self.compatibility,
            &self.condition,
            &self.year,
            &self.car_brand,
            &self.car_model,
            &self.meta_title,
            &self.meta_description,
            &self.meta_keywords,
            &self.slug,
        ]
        .into_iter()
        .all(|v| cell(v).is_none())
    }
}

/// Row plus its 1-based position in the file's data section
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub row: usize,
    pub data: ProductImportRow,
    /// Set when the record itself could not be read; `data` is then empty
    pub error: Option<String>,
}

impl ParsedRow {
    fn read(row: usize, record: Result<ProductImportRow, impl std::fmt::Display>) -> Option<Self> {
        match record {
            Ok(data) if data.is_blank() => None,
            Ok(data) => Some(Self { row, data, error: None }),
            Err(e) => Some(Self {
                row,
                data: ProductImportRow::default(),
                error: Some(format!("Unreadable row: {e}")),
            }),
        }
    }
}

/// Parse an uploaded file. Blank rows are skipped but keep their numbering.
///
/// Only a broken header or container fails the whole file; a record that
/// cannot be decoded comes back as a row with `error` set.
pub fn parse_rows(format: ImportFormat, bytes: &[u8]) -> AppResult<Vec<ParsedRow>> {
    let rows = match format {
        ImportFormat::Csv => parse_csv(bytes)?,
        ImportFormat::Xlsx => parse_xlsx(bytes)?,
    };
    if rows.is_empty() {
        return Err(AppError::with_message(ErrorCode::ImportEmptyFile, "Import file has no data rows"));
    }
    Ok(rows)
}

fn parse_failed(msg: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::ImportParseFailed, format!("Failed to parse import file: {msg}"))
}

/// Spreadsheet exports from some locales use `;` between columns
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let commas = header.iter().filter(|b| **b == b',').count();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    if semicolons > commas { b';' } else { b',' }
}

pub fn parse_csv(bytes: &[u8]) -> AppResult<Vec<ParsedRow>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader.byte_headers().map_err(parse_failed)?.clone();
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(parse_failed)?;
        rows.extend(ParsedRow::read(idx + 1, record.deserialize::<ProductImportRow>(Some(&headers))));
    }
    Ok(rows)
}

/// Cell text the way a user sees it: integral floats without a fraction
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

pub fn parse_xlsx(bytes: &[u8]) -> AppResult<Vec<ParsedRow>> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(parse_failed)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::with_message(ErrorCode::ImportEmptyFile, "Workbook has no sheets"))?
        .map_err(parse_failed)?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers = csv::StringRecord::from(header.iter().map(|c| cell_text(c).trim().to_string()).collect::<Vec<_>>());

    let mut rows = Vec::new();
    for (idx, cells) in sheet_rows.enumerate() {
        let record = csv::StringRecord::from(cells.iter().map(cell_text).collect::<Vec<_>>());
        rows.extend(ParsedRow::read(idx + 1, record.deserialize::<ProductImportRow>(Some(&headers))));
    }
    Ok(rows)
}

/// Decimal number as typed by people: `1 234,50`, `1234.5`
pub fn parse_number(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{raw}' is not a number"))
}

/// Comma-joined list cell
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_with_bom_and_unknown_columns() {
        let input = "\u{feff}partNumber,name,price,extra,compatibility\nA-1,Pad,100,x,\"BMW E46, BMW E90\"\n,,,,\nB-2,Disc,\"12,5\",,\n";
        let rows = parse_csv(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].data.part_number(), Some("A-1"));
        assert_eq!(split_list(cell(&rows[0].data.compatibility)), ["BMW E46", "BMW E90"]);
        assert_eq!(rows[1].row, 3);
        assert_eq!(parse_number(cell(&rows[1].data.price).unwrap()).unwrap(), 12.5);
    }

    #[test]
    fn semicolon_delimited_csv() {
        let rows = parse_csv("partNumber;name;price\nX;Фара;1 200,50\n".as_bytes()).unwrap();
        assert_eq!(rows[0].data.name.as_deref(), Some("Фара"));
        assert_eq!(parse_number(rows[0].data.price.as_deref().unwrap()).unwrap(), 1200.5);
    }

    #[test]
    fn undecodable_record_fails_alone() {
        // cp1251 "Фара" in the second record
        let mut input = b"partNumber,name,price\nA,Pad,10\nB,".to_vec();
        input.extend_from_slice(&[0xD4, 0xE0, 0xF0, 0xE0]);
        input.extend_from_slice(b",20\nC,Disc,30\n");

        let rows = parse_rows(ImportFormat::Csv, &input).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].error, None);
        assert_eq!(rows[1].row, 2);
        assert!(rows[1].error.as_deref().unwrap().starts_with("Unreadable row"));
        assert_eq!(rows[2].data.part_number(), Some("C"));
        assert_eq!(rows[2].error, None);
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = parse_rows(ImportFormat::Csv, b"partNumber,name,price\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ImportEmptyFile);
    }

    #[test]
    fn xlsx_first_sheet_by_header() {
        let rows = parse_rows(ImportFormat::Xlsx, include_bytes!("../../tests/fixtures/products.xlsx")).unwrap();

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.row, 1);
        assert_eq!(first.error, None);
        assert_eq!(first.data.part_number(), Some("12345"));
        assert_eq!(first.data.name.as_deref(), Some("Фильтр масляный"));
        assert_eq!(first.data.price.as_deref(), Some("450.5"));
        assert_eq!(first.data.year.as_deref(), Some("2019"));
        assert_eq!(split_list(cell(&first.data.compatibility)), ["Lada Vesta", "Lada Largus"]);

        // the empty sheet row keeps its number
        assert_eq!(rows[1].row, 3);
        assert_eq!(rows[1].data.part_number(), Some("B-2"));
        assert_eq!(rows[1].data.price.as_deref(), Some("120"));
        assert_eq!(cell(&rows[1].data.year), None);
    }

    #[test]
    fn garbage_xlsx_fails_to_parse() {
        let err = parse_rows(ImportFormat::Xlsx, b"not a workbook").unwrap_err();
        assert_eq!(err.code, ErrorCode::ImportParseFailed);
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number(" 80 ").unwrap(), 80.0);
        assert_eq!(parse_number("1\u{a0}000,25").unwrap(), 1000.25);
        assert!(parse_number("abc").is_err());
        assert!(parse_number("inf").is_err());
    }

    #[test]
    fn integral_floats_print_without_fraction() {
        assert_eq!(cell_text(&Data::Float(2019.0)), "2019");
        assert_eq!(cell_text(&Data::Float(99.5)), "99.5");
        assert_eq!(cell_text(&Data::String("A-1".into())), "A-1");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
