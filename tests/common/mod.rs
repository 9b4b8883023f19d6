#![allow(dead_code)]

use async_trait::async_trait;
use data_formatter::domain::ports::PdfRenderer;
use data_formatter::{FormatterError, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

/// Minimal .docx with one `<w:p>` per paragraph; empty strings become `<w:p/>`.
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            body.push_str("<w:p/>");
        } else {
            body.push_str(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                paragraph
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;")
            ));
        }
    }
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file::<_, ()>("[Content_Types].xml", FileOptions::default())
        .unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file::<_, ()>("word/document.xml", FileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Writes a fixed PDF and remembers the HTML and scratch path it was given.
#[derive(Default)]
pub struct FakeRenderer {
    pub html: Mutex<Vec<String>>,
    pub outputs: Mutex<Vec<std::path::PathBuf>>,
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, html: &str, output: &Path) -> Result<()> {
        self.html.lock().unwrap().push(html.to_string());
        self.outputs.lock().unwrap().push(output.to_path_buf());
        tokio::fs::write(output, b"%PDF-1.4\n1 0 obj\n%%EOF\n").await?;
        Ok(())
    }
}

/// Always fails after leaving a partial file behind.
#[derive(Default)]
pub struct FailingRenderer {
    pub outputs: Mutex<Vec<std::path::PathBuf>>,
}

#[async_trait]
impl PdfRenderer for FailingRenderer {
    async fn render(&self, _html: &str, output: &Path) -> Result<()> {
        self.outputs.lock().unwrap().push(output.to_path_buf());
        tokio::fs::write(output, b"%PDF-partial").await?;
        Err(FormatterError::render("engine exited with status 1"))
    }
}
