use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

/// Where a rendered quote document goes to be looked at and printed.
#[async_trait]
pub trait ReportViewer: Send + Sync {
    /// Returns a human-readable location of the shown document.
    async fn show(&self, name: &str, html: &str) -> Result<String, std::io::Error>;
}

/// Writes documents as `<dir>/<name>.html`.
#[derive(Debug, Clone)]
pub struct FileViewer {
    dir: PathBuf,
}

impl FileViewer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportViewer for FileViewer {
    async fn show(&self, name: &str, html: &str) -> Result<String, std::io::Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{name}.html"));
        tokio::fs::write(&path, html).await?;
        info!(path = %path.display(), bytes = html.len(), "report written");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_viewer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = FileViewer::new(dir.path().join("reports"));
        let location = viewer.show("ORÇ-abc123-simple", "<html></html>").await.unwrap();
        assert!(location.ends_with("ORÇ-abc123-simple.html"));
        assert_eq!(tokio::fs::read_to_string(&location).await.unwrap(), "<html></html>");
    }
}
