use crate::domain::model::ExportArtifact;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Download sink for finished artifacts.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn save_artifact(
        &self,
        artifact: &ExportArtifact,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        self.write_file(&artifact.filename, &artifact.bytes)
    }
}

/// External HTML-to-PDF engine: writes a PDF for `html` at `output`, or fails.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, output: &Path) -> Result<()>;
}
