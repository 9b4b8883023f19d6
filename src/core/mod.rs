pub mod cleaning;
pub mod detect;
pub mod document;
pub mod engine;
pub mod export;
pub mod pdf;
pub mod projection;
pub mod tabular;

pub use crate::domain::model::{
    CellValue, Column, ColumnType, ExportArtifact, FileFormat, ParagraphSequence, Table,
    TargetFormat, UploadedFile,
};
pub use crate::domain::ports::{PdfRenderer, Storage};
pub use crate::utils::error::Result;
