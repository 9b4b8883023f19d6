use crate::domain::model::{format_number, CellValue, ExportArtifact, Table, TargetFormat};
use crate::utils::error::{FormatterError, Result};
use crate::utils::markup::escape_xml_text;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const SHEET_NAME: &str = "Sheet1";
const DATE_STYLE: usize = 1;
const HEADER_STYLE: usize = 2;

/// Serializes a table for download as CSV or spreadsheet.
pub fn export_table(file_name: &str, table: &Table, target: TargetFormat) -> Result<ExportArtifact> {
    let bytes = match target {
        TargetFormat::Csv => write_csv(table)?,
        TargetFormat::Spreadsheet => write_xlsx(table)?,
        TargetFormat::Pdf => {
            return Err(FormatterError::UnsupportedConversionError {
                file_name: file_name.to_string(),
                target: target.to_string(),
            })
        }
    };

    tracing::debug!(
        "Exported '{}' to {} ({} bytes)",
        file_name,
        target,
        bytes.len()
    );
    Ok(ExportArtifact {
        bytes,
        filename: target.file_name_for(file_name),
        mime_type: target.mime_type().to_string(),
    })
}

/// 標題列加資料列；零欄位的表格輸出空內容
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    if table.column_count() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| FormatterError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })
}

/// Writes a single-sheet workbook: header row in bold, typed cells below it.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/styles.xml", STYLES.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(table)),
    ];

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in parts.iter() {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// `0` -> `A`, `25` -> `Z`, `26` -> `AA`.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Days since the spreadsheet epoch (1899-12-30), fractional part for the time.
fn excel_serial(value: &NaiveDateTime) -> f64 {
    match NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(epoch) => (*value - epoch).num_milliseconds() as f64 / 86_400_000.0,
        None => 0.0,
    }
}

fn inline_string(out: &mut String, reference: &str, text: &str, style: Option<usize>) {
    let style = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    let _ = write!(
        out,
        r#"<c r="{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
        reference,
        style,
        escape_xml_text(text)
    );
}

fn write_cell(out: &mut String, reference: &str, cell: &CellValue) {
    match cell {
        CellValue::Absent => {}
        CellValue::Number(n) if n.is_finite() => {
            let _ = write!(out, r#"<c r="{}"><v>{}</v></c>"#, reference, n);
        }
        // 非有限數值在試算表中無法表示，改寫成文字
        CellValue::Number(n) => inline_string(out, reference, &format_number(*n), None),
        CellValue::Text(s) => inline_string(out, reference, s, None),
        CellValue::Boolean(b) => {
            let _ = write!(
                out,
                r#"<c r="{}" t="b"><v>{}</v></c>"#,
                reference,
                if *b { 1 } else { 0 }
            );
        }
        CellValue::Date(d) => {
            let _ = write!(
                out,
                r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                reference,
                DATE_STYLE,
                excel_serial(d)
            );
        }
    }
}

fn sheet_xml(table: &Table) -> String {
    let letters: Vec<String> = (0..table.column_count()).map(column_letter).collect();
    let mut out = String::from(XML_DECLARATION);
    out.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    if table.column_count() == 0 {
        out.push_str("<sheetData/></worksheet>");
        return out;
    }

    let _ = write!(
        out,
        r#"<dimension ref="A1:{}{}"/><sheetData>"#,
        letters[letters.len() - 1],
        table.row_count() + 1
    );

    out.push_str(r#"<row r="1">"#);
    for (letter, column) in letters.iter().zip(table.columns()) {
        inline_string(&mut out, &format!("{}1", letter), &column.name, Some(HEADER_STYLE));
    }
    out.push_str("</row>");

    for (index, row) in table.rows().enumerate() {
        let row_number = index + 2;
        let _ = write!(out, r#"<row r="{}">"#, row_number);
        for (letter, cell) in letters.iter().zip(row) {
            write_cell(&mut out, &format!("{}{}", letter, row_number), cell);
        }
        out.push_str("</row>");
    }

    out.push_str("</sheetData></worksheet>");
    out
}

fn workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECLARATION, SHEET_NAME
    )
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// cellXfs: 0 預設, 1 日期, 2 粗體標題
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm:ss"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::project_columns;
    use crate::core::tabular::{load_csv, load_spreadsheet};
    use crate::domain::model::{Column, ColumnType};

    fn scores() -> Table {
        load_csv("scores.csv", b"name,score\nAlice,30\n\"Smith, Bob\",2.5\nCarol,\n").unwrap()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_write_csv_quotes_and_formats_cells() {
        let bytes = write_csv(&scores()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,score\nAlice,30\n\"Smith, Bob\",2.5\nCarol,\n");
    }

    #[test]
    fn test_write_csv_zero_columns() {
        let empty = project_columns::<&str>(&scores(), &[]).unwrap();
        assert!(write_csv(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_export_table_names_and_mime() {
        let artifact = export_table("data.csv", &scores(), TargetFormat::Spreadsheet).unwrap();
        assert_eq!(artifact.filename, "data.xlsx");
        assert_eq!(
            artifact.mime_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let artifact = export_table("data.xlsx", &scores(), TargetFormat::Csv).unwrap();
        assert_eq!(artifact.filename, "data.csv");
        assert_eq!(artifact.mime_type, "text/csv");

        assert!(matches!(
            export_table("data.csv", &scores(), TargetFormat::Pdf),
            Err(FormatterError::UnsupportedConversionError { .. })
        ));
    }

    #[test]
    fn test_xlsx_round_trip_keeps_types() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = Table::new(vec![
            Column::new(
                "label",
                vec![
                    CellValue::Text("a & <b>".to_string()),
                    CellValue::Absent,
                    CellValue::Text("c".to_string()),
                ],
            ),
            Column::new(
                "value",
                vec![CellValue::Number(1.0), CellValue::Number(2.5), CellValue::Absent],
            ),
            Column::new(
                "flag",
                vec![
                    CellValue::Boolean(true),
                    CellValue::Boolean(false),
                    CellValue::Boolean(true),
                ],
            ),
            Column::new(
                "when",
                vec![CellValue::Date(day), CellValue::Absent, CellValue::Date(day)],
            ),
        ])
        .unwrap();

        let bytes = write_xlsx(&table).unwrap();
        let loaded = load_spreadsheet("round.xlsx", &bytes).unwrap();

        assert_eq!(loaded.column_names(), table.column_names());
        assert_eq!(loaded.row_count(), 3);
        assert_eq!(loaded.column("label").unwrap().values, table.column("label").unwrap().values);
        assert_eq!(loaded.column("value").unwrap().values, table.column("value").unwrap().values);
        assert_eq!(loaded.column("flag").unwrap().column_type, ColumnType::Boolean);
        assert_eq!(loaded.column("when").unwrap().column_type, ColumnType::Date);
        assert_eq!(loaded.column("when").unwrap().values[0], CellValue::Date(day));
    }

    #[test]
    fn test_xlsx_with_zero_columns_is_readable() {
        let empty = project_columns::<&str>(&scores(), &[]).unwrap();
        let bytes = write_xlsx(&empty).unwrap();
        let loaded = load_spreadsheet("empty.xlsx", &bytes).unwrap();
        assert_eq!(loaded.column_count(), 0);
    }
}
