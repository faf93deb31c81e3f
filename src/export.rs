use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns rendered report HTML into a stored document and returns its
/// storage path. Byte-level rendering lives behind this boundary.
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn export(&self, report_id: &str, html: &str) -> Result<String, ExportError>;
}

/// Writes the document into a local directory, one file per report id.
pub struct LocalExporter {
    dir: PathBuf,
}

impl LocalExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentExporter for LocalExporter {
    async fn export(&self, report_id: &str, html: &str) -> Result<String, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{report_id}.html"));
        tokio::fs::write(&path, html).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}
