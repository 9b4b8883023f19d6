use crate::domain::model::FileFormat;
use crate::utils::error::{FormatterError, Result};
use std::path::Path;

/// 只看副檔名（不分大小寫）決定處理方式
pub fn detect_format(file_name: &str) -> FileFormat {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => FileFormat::TabularCsv,
        Some("xlsx") => FileFormat::TabularSpreadsheet,
        Some("docx") => FileFormat::Document,
        _ => FileFormat::Unsupported,
    }
}

/// Like [`detect_format`], but turns `Unsupported` into an error for the file.
pub fn require_supported(file_name: &str) -> Result<FileFormat> {
    match detect_format(file_name) {
        FileFormat::Unsupported => Err(FormatterError::UnsupportedFormatError {
            file_name: file_name.to_string(),
        }),
        format => Ok(format),
    }
}
