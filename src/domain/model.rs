use crate::utils::error::{FormatterError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;

/// One uploaded file as received from the presentation layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Handling strategy picked from a file name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    TabularCsv,
    TabularSpreadsheet,
    Document,
    Unsupported,
}

impl FileFormat {
    pub fn is_tabular(self) -> bool {
        matches!(self, FileFormat::TabularCsv | FileFormat::TabularSpreadsheet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    Csv,
    Spreadsheet,
    Pdf,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Csv => "csv",
            TargetFormat::Spreadsheet => "xlsx",
            TargetFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Csv => "text/csv",
            TargetFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            TargetFormat::Pdf => "application/pdf",
        }
    }

    /// 原始檔名的主檔名加上目標副檔名
    pub fn file_name_for(self, original: &str) -> String {
        let stem = Path::new(original)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(original);
        format!("{}.{}", stem, self.extension())
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetFormat::Csv => "CSV",
            TargetFormat::Spreadsheet => "Excel",
            TargetFormat::Pdf => "PDF",
        };
        f.write_str(label)
    }
}

impl FromStr for TargetFormat {
    type Err = FormatterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(TargetFormat::Csv),
            "xlsx" | "excel" | "spreadsheet" => Ok(TargetFormat::Spreadsheet),
            "pdf" => Ok(TargetFormat::Pdf),
            other => Err(FormatterError::ValidationError {
                message: format!("Unknown target format '{}'. Use csv, xlsx or pdf", other),
            }),
        }
    }
}

/// A single table cell.
///
/// Equality is by type and value; all NaNs are equal and `-0.0 == 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Absent,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n.is_nan() {
            f64::NAN.to_bits()
        } else if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Absent, CellValue::Absent) => true,
            (CellValue::Number(a), CellValue::Number(b)) => {
                Self::number_bits(*a) == Self::number_bits(*b)
            }
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Absent => {}
            CellValue::Number(n) => Self::number_bits(*n).hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Boolean(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Absent => Ok(()),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("True"),
            CellValue::Boolean(false) => f.write_str("False"),
            CellValue::Date(d) => {
                if d.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// Integral values print without a fractional part, everything else in shortest
/// round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Number,
    Text,
    Boolean,
    Date,
}

impl ColumnType {
    /// 所有非空值同型別時取該型別；全空欄位視為數值欄
    pub fn infer(values: &[CellValue]) -> Self {
        let mut present = values.iter().filter(|v| !v.is_absent()).peekable();
        let first = match present.peek() {
            Some(value) => *value,
            None => return ColumnType::Number,
        };

        let candidate = match first {
            CellValue::Number(_) => ColumnType::Number,
            CellValue::Boolean(_) => ColumnType::Boolean,
            CellValue::Date(_) => ColumnType::Date,
            _ => return ColumnType::Text,
        };

        let uniform = present.all(|v| {
            matches!(
                (candidate, v),
                (ColumnType::Number, CellValue::Number(_))
                    | (ColumnType::Boolean, CellValue::Boolean(_))
                    | (ColumnType::Date, CellValue::Date(_))
            )
        });

        if uniform {
            candidate
        } else {
            ColumnType::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let column_type = ColumnType::infer(&values);
        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Number
    }

    pub fn absent_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_absent()).count()
    }
}

/// Ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    /// 允許零欄位但保留列數
    pub fn with_row_count(columns: Vec<Column>, row_count: usize) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(FormatterError::ValidationError {
                    message: format!("Duplicate column name '{}'", column.name),
                });
            }
            if column.values.len() != row_count {
                return Err(FormatterError::ValidationError {
                    message: format!(
                        "Column '{}' has {} values, expected {}",
                        column.name,
                        column.values.len(),
                        row_count
                    ),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    /// For transforms that keep every column at `row_count` values with unique names.
    pub(crate) fn from_aligned(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.row_count).map(move |i| self.row(i))
    }

    /// First `n` rows, like a preview.
    pub fn head(&self, n: usize) -> Table {
        let keep = n.min(self.row_count);
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                column_type: c.column_type,
                values: c.values[..keep].to_vec(),
            })
            .collect();
        Table {
            columns,
            row_count: keep,
        }
    }
}

/// Plain text of a document, one entry per paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphSequence(Vec<String>);

impl ParagraphSequence {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self(paragraphs)
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ConversionContent<'a> {
    Table(&'a Table),
    Paragraphs(&'a ParagraphSequence),
}

#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub file_name: &'a str,
    pub source: FileFormat,
    pub target: TargetFormat,
    pub content: ConversionContent<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}
