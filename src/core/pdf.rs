use crate::config::RendererConfig;
use crate::domain::model::{ExportArtifact, ParagraphSequence, TargetFormat};
use crate::domain::ports::PdfRenderer;
use crate::utils::error::{FormatterError, Result};
use crate::utils::markup::escape_markup;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One `<p>` per paragraph, in order.
pub fn build_html(paragraphs: &ParagraphSequence, escape: bool) -> String {
    let mut html = String::from(r#"<html><head><meta charset="utf-8"></head><body>"#);
    for paragraph in paragraphs.paragraphs() {
        html.push_str("<p>");
        if escape {
            html.push_str(&escape_markup(paragraph));
        } else {
            html.push_str(paragraph);
        }
        html.push_str("</p>");
    }
    html.push_str("</body></html>");
    html
}

/// Renders the document through `renderer` into a scratch directory that is
/// removed on every exit path.
pub async fn export_document<R: PdfRenderer + ?Sized>(
    file_name: &str,
    paragraphs: &ParagraphSequence,
    renderer: &R,
    escape_html: bool,
) -> Result<ExportArtifact> {
    let html = build_html(paragraphs, escape_html);

    let staging = tempfile::Builder::new()
        .prefix("data-formatter-")
        .tempdir()?;
    let pdf_path = staging.path().join("output.pdf");

    tracing::debug!(
        "Rendering '{}' ({} paragraphs) to {}",
        file_name,
        paragraphs.len(),
        pdf_path.display()
    );
    renderer.render(&html, &pdf_path).await?;

    let bytes = tokio::fs::read(&pdf_path)
        .await
        .map_err(|e| FormatterError::render(format!("rendered PDF could not be read: {}", e)))?;
    staging.close()?;

    if bytes.is_empty() {
        return Err(FormatterError::render("rendering engine produced an empty file"));
    }

    Ok(ExportArtifact {
        bytes,
        filename: TargetFormat::Pdf.file_name_for(file_name),
        mime_type: TargetFormat::Pdf.mime_type().to_string(),
    })
}

/// Drives the `wkhtmltopdf` executable: HTML on stdin, PDF written to the output path.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(60),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.wkhtmltopdf_path),
            timeout: Duration::from_secs(config.timeout_seconds),
            extra_args: config.extra_args.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render(&self, html: &str, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("--quiet")
            .args(&self.extra_args)
            .arg("-")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FormatterError::render(format!(
                    "wkhtmltopdf not found at '{}'",
                    self.binary.display()
                )),
                _ => FormatterError::render(format!("failed to start wkhtmltopdf: {}", e)),
            })?;

        // 寫入 stdin 與等待結束同時進行，整段交換受同一個逾時限制
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // 程序提早結束時 stdin 會斷線，交給結束碼處理
                if let Err(e) = stdin.write_all(html.as_bytes()).await {
                    if e.kind() != ErrorKind::BrokenPipe {
                        return Err(FormatterError::render(format!(
                            "failed to send HTML to wkhtmltopdf: {}",
                            e
                        )));
                    }
                }
            }
            Ok(())
        };
        let exchange = async move {
            let (fed, finished) = tokio::join!(feed, child.wait_with_output());
            fed?;
            finished.map_err(|e| FormatterError::render(format!("wkhtmltopdf did not finish: {}", e)))
        };

        // 逾時會丟棄 child，kill_on_drop 負責結束程序
        let finished = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                FormatterError::render(format!("wkhtmltopdf timed out after {:?}", self.timeout))
            })??;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            return Err(FormatterError::render(format!(
                "wkhtmltopdf exited with {}: {}",
                finished.status,
                stderr.trim()
            )));
        }

        tracing::debug!("wkhtmltopdf wrote {}", output.display());
        Ok(())
    }
}
