use crate::domain::model::{CellValue, Column, FileFormat, Table, UploadedFile};
use crate::utils::error::{FormatterError, Result};
use calamine::{Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::io::Cursor;

/// Strings read as missing values, in addition to the empty string.
const NA_TOKENS: [&str; 11] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// 依偵測到的格式解析表格
pub fn load_table(file: &UploadedFile, format: FileFormat) -> Result<Table> {
    match format {
        FileFormat::TabularCsv => load_csv(&file.name, &file.bytes),
        FileFormat::TabularSpreadsheet => load_spreadsheet(&file.name, &file.bytes),
        other => Err(FormatterError::ProcessingError {
            message: format!("'{}' ({:?}) is not a tabular file", file.name, other),
        }),
    }
}

pub fn load_csv(file_name: &str, bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| FormatterError::parse(file_name, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(FormatterError::parse(file_name, "No columns to parse from file"));
    }

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            FormatterError::parse(file_name, format!("row {}: {}", index + 2, e))
        })?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(text_cell(field));
        }
    }

    tracing::debug!(
        "Parsed CSV '{}': {} columns, {} rows",
        file_name,
        headers.len(),
        cells[0].len()
    );
    build_table(file_name, headers, cells)
}

pub fn load_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| FormatterError::parse(file_name, format!("invalid workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FormatterError::parse(file_name, "workbook has no worksheets"))?
        .map_err(|e| FormatterError::parse(file_name, format!("unreadable worksheet: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| spreadsheet_cell(cell).to_string())
            .collect(),
        // 空白工作表：零欄零列
        None => return Table::new(Vec::new()),
    };

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (column, cell) in cells.iter_mut().zip(row.iter()) {
            column.push(spreadsheet_cell(cell));
        }
    }

    tracing::debug!(
        "Parsed spreadsheet '{}': {} columns, {} rows",
        file_name,
        headers.len(),
        range.height().saturating_sub(1)
    );
    build_table(file_name, headers, cells)
}

fn is_na(raw: &str) -> bool {
    raw.is_empty() || NA_TOKENS.contains(&raw)
}

fn text_cell(raw: &str) -> CellValue {
    if is_na(raw) {
        CellValue::Absent
    } else {
        CellValue::Text(raw.to_string())
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) if f.is_nan() => CellValue::Absent,
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => text_cell(s),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::Date(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Absent,
    }
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// 欄位中每個非空值都是數字（原生或可解析的文字）時轉成數值欄；NaN 一律視為缺值
fn coerce_numeric(values: Vec<CellValue>) -> Vec<CellValue> {
    let numeric = values.iter().all(|v| match v {
        CellValue::Absent | CellValue::Number(_) => true,
        CellValue::Text(s) => parse_number(s).is_some(),
        _ => false,
    });
    if !numeric {
        return values;
    }

    values
        .into_iter()
        .map(|v| match v {
            CellValue::Text(s) => parse_number(&s)
                .filter(|n| !n.is_nan())
                .map(CellValue::Number)
                .unwrap_or(CellValue::Absent),
            CellValue::Number(n) if n.is_nan() => CellValue::Absent,
            other => other,
        })
        .collect()
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        used.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

fn build_table(file_name: &str, headers: Vec<String>, cells: Vec<Vec<CellValue>>) -> Result<Table> {
    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, coerce_numeric(values)))
        .collect();

    Table::new(columns).map_err(|e| FormatterError::parse(file_name, e.to_string()))
}
