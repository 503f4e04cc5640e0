use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::Document;
use crate::parse::{parse_document, serialize_document};

/// Error type for reading and writing the task file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

/// The line-oriented markdown file that holds the document
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TaskFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file is an empty document.
    pub fn load(&self) -> Result<Document, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no task file yet, starting empty");
                return Ok(Document::new());
            }
            Err(e) => {
                return Err(StoreError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let (doc, dropped) = parse_document(&text);
        if dropped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                dropped,
                "ignored lines that are not tasks or headings"
            );
        }
        tracing::info!(path = %self.path.display(), items = doc.len(), "loaded task file");
        Ok(doc)
    }

    /// Rewrite the whole file in document order
    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let content = serialize_document(doc);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), items = doc.len(), "saved task file");
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
