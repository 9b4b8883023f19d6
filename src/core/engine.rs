use crate::core::detect::require_supported;
use crate::core::document::load_document;
use crate::core::export::export_table;
use crate::core::pdf::export_document;
use crate::domain::model::{
    ConversionContent, ConversionRequest, ExportArtifact, FileFormat, ParagraphSequence, Table,
    TargetFormat, UploadedFile,
};
use crate::domain::ports::PdfRenderer;
use crate::utils::error::{FormatterError, Result};

/// What a loader produced for one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedContent {
    Table { format: FileFormat, table: Table },
    Document(ParagraphSequence),
}

/// Detection, loading and conversion with the rendering engine injected.
pub struct FormatterEngine<R: PdfRenderer> {
    renderer: R,
    escape_html: bool,
}

impl<R: PdfRenderer> FormatterEngine<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            escape_html: true,
        }
    }

    pub fn with_html_escaping(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn load(&self, file: &UploadedFile) -> Result<LoadedContent> {
        let format = require_supported(&file.name)?;
        tracing::debug!("Loading '{}' as {:?} ({} bytes)", file.name, format, file.bytes.len());

        match format {
            FileFormat::TabularCsv | FileFormat::TabularSpreadsheet => {
                let table = crate::core::tabular::load_table(file, format)?;
                tracing::info!(
                    "📄 Loaded '{}': {} rows x {} columns",
                    file.name,
                    table.row_count(),
                    table.column_count()
                );
                Ok(LoadedContent::Table { format, table })
            }
            FileFormat::Document => {
                let paragraphs = load_document(file)?;
                tracing::info!("📄 Loaded '{}': {} paragraphs", file.name, paragraphs.len());
                Ok(LoadedContent::Document(paragraphs))
            }
            FileFormat::Unsupported => Err(FormatterError::UnsupportedFormatError {
                file_name: file.name.clone(),
            }),
        }
    }

    pub async fn convert(&self, request: ConversionRequest<'_>) -> Result<ExportArtifact> {
        tracing::debug!(
            "Converting '{}' from {:?} to {}",
            request.file_name,
            request.source,
            request.target
        );

        let artifact = match (request.content, request.target) {
            (ConversionContent::Table(table), TargetFormat::Csv | TargetFormat::Spreadsheet)
                if request.source.is_tabular() =>
            {
                export_table(request.file_name, table, request.target)?
            }
            (ConversionContent::Paragraphs(paragraphs), TargetFormat::Pdf)
                if request.source == FileFormat::Document =>
            {
                export_document(request.file_name, paragraphs, &self.renderer, self.escape_html)
                    .await?
            }
            _ => {
                return Err(FormatterError::UnsupportedConversionError {
                    file_name: request.file_name.to_string(),
                    target: request.target.to_string(),
                })
            }
        };

        tracing::info!(
            "💾 Converted '{}' -> '{}' ({} bytes)",
            request.file_name,
            artifact.filename,
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}
