use crate::core::cleaning::{self, DedupReport, FillReport};
use crate::core::engine::{FormatterEngine, LoadedContent};
use crate::core::projection::{numeric_chart_columns, project_columns};
use crate::domain::model::{
    ConversionContent, ConversionRequest, ExportArtifact, FileFormat, ParagraphSequence, Table,
    TargetFormat, UploadedFile,
};
use crate::domain::ports::PdfRenderer;
use crate::utils::error::{FormatterError, Result};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct TabularEntry {
    pub format: FileFormat,
    pub table: Table,
    /// `None` means every column, in table order.
    pub selection: Option<Vec<String>>,
}

impl TabularEntry {
    /// 目前的表格套用欄位選擇後的結果
    pub fn view(&self) -> Result<Table> {
        match &self.selection {
            Some(selection) => project_columns(&self.table, selection),
            None => Ok(self.table.clone()),
        }
    }
}

#[derive(Debug)]
pub enum EntryState {
    Tabular(TabularEntry),
    Document(ParagraphSequence),
    Failed(FormatterError),
}

#[derive(Debug)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: usize,
    pub state: EntryState,
}

impl FileEntry {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_kb: f64,
    pub kind: &'static str,
    pub rows: Option<usize>,
    pub columns: Option<Vec<String>>,
    pub paragraphs: Option<usize>,
    pub error: Option<String>,
}

impl From<&FileEntry> for FileSummary {
    fn from(entry: &FileEntry) -> Self {
        let mut summary = FileSummary {
            name: entry.name.clone(),
            size_kb: (entry.size_kb() * 100.0).round() / 100.0,
            kind: "failed",
            rows: None,
            columns: None,
            paragraphs: None,
            error: None,
        };

        match &entry.state {
            EntryState::Tabular(tabular) => {
                summary.kind = "table";
                summary.rows = Some(tabular.table.row_count());
                summary.columns = Some(match &tabular.selection {
                    Some(selection) => selection.clone(),
                    None => tabular.table.column_names(),
                });
            }
            EntryState::Document(paragraphs) => {
                summary.kind = "document";
                summary.paragraphs = Some(paragraphs.len());
            }
            EntryState::Failed(err) => {
                summary.error = Some(err.user_friendly_message());
            }
        }
        summary
    }
}

/// One user's working set: the current upload batch and each file's state.
pub struct Session<R: PdfRenderer> {
    engine: FormatterEngine<R>,
    preview_rows: usize,
    entries: Vec<FileEntry>,
}

impl<R: PdfRenderer> Session<R> {
    pub fn new(engine: FormatterEngine<R>, preview_rows: usize) -> Self {
        Self {
            engine,
            preview_rows,
            entries: Vec::new(),
        }
    }

    /// 新的上傳批次取代目前所有檔案；單一檔案失敗不影響其他檔案
    pub fn upload(&mut self, files: Vec<UploadedFile>) -> Vec<FileSummary> {
        self.entries = files
            .into_iter()
            .map(|file| {
                let state = match self.engine.load(&file) {
                    Ok(LoadedContent::Table { format, table }) => EntryState::Tabular(TabularEntry {
                        format,
                        table,
                        selection: None,
                    }),
                    Ok(LoadedContent::Document(paragraphs)) => EntryState::Document(paragraphs),
                    Err(err) => {
                        tracing::warn!("❌ {}: {}", file.name, err);
                        EntryState::Failed(err)
                    }
                };
                FileEntry {
                    name: file.name,
                    size_bytes: file.bytes.len(),
                    state,
                }
            })
            .collect();

        self.summaries()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Result<&FileEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| FormatterError::FileNotFoundError {
                file_name: name.to_string(),
            })
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.entries.iter().map(FileSummary::from).collect()
    }

    fn tabular(&self, name: &str, operation: &str) -> Result<&TabularEntry> {
        match &self.entry(name)?.state {
            EntryState::Tabular(tabular) => Ok(tabular),
            _ => Err(FormatterError::InvalidOperationError {
                file_name: name.to_string(),
                operation: operation.to_string(),
            }),
        }
    }

    fn tabular_mut(&mut self, name: &str, operation: &str) -> Result<&mut TabularEntry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| FormatterError::FileNotFoundError {
                file_name: name.to_string(),
            })?;
        match &mut entry.state {
            EntryState::Tabular(tabular) => Ok(tabular),
            _ => Err(FormatterError::InvalidOperationError {
                file_name: name.to_string(),
                operation: operation.to_string(),
            }),
        }
    }

    /// First rows of the current view.
    pub fn preview(&self, name: &str) -> Result<Table> {
        Ok(self.tabular(name, "preview")?.view()?.head(self.preview_rows))
    }

    pub fn remove_duplicates(&mut self, name: &str) -> Result<DedupReport> {
        let entry = self.tabular_mut(name, "remove duplicates")?;
        let (table, report) = cleaning::remove_duplicates(&entry.table);
        entry.table = table;
        tracing::info!("✔ {}: removed {} duplicate rows", name, report.removed());
        Ok(report)
    }

    pub fn fill_missing(&mut self, name: &str) -> Result<FillReport> {
        let entry = self.tabular_mut(name, "fill missing values")?;
        let (table, report) = cleaning::fill_missing(&entry.table);
        entry.table = table;
        tracing::info!("✔ {}: filled {} missing values", name, report.total_cells());
        Ok(report)
    }

    /// Sets the columns to keep; `None` goes back to every column.
    pub fn select_columns(&mut self, name: &str, selection: Option<Vec<String>>) -> Result<Table> {
        let entry = self.tabular_mut(name, "select columns")?;
        let view = match &selection {
            Some(columns) => project_columns(&entry.table, columns)?,
            None => entry.table.clone(),
        };
        entry.selection = selection;
        Ok(view)
    }

    /// Chart input: the first two numeric columns of the current view.
    pub fn chart_data(&self, name: &str) -> Result<Table> {
        let view = self.tabular(name, "chart")?.view()?;
        Ok(numeric_chart_columns(&view))
    }

    pub async fn convert(&self, name: &str, target: TargetFormat) -> Result<ExportArtifact> {
        let entry = self.entry(name)?;
        match &entry.state {
            EntryState::Tabular(tabular) => {
                let view = tabular.view()?;
                self.engine
                    .convert(ConversionRequest {
                        file_name: &entry.name,
                        source: tabular.format,
                        target,
                        content: ConversionContent::Table(&view),
                    })
                    .await
            }
            EntryState::Document(paragraphs) => {
                self.engine
                    .convert(ConversionRequest {
                        file_name: &entry.name,
                        source: FileFormat::Document,
                        target,
                        content: ConversionContent::Paragraphs(paragraphs),
                    })
                    .await
            }
            EntryState::Failed(_) => Err(FormatterError::InvalidOperationError {
                file_name: name.to_string(),
                operation: "convert".to_string(),
            }),
        }
    }
}
