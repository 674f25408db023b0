//! Document sinks
//!
//! Emitting the finished document is the only side effect of an export. It
//! goes through [`DocumentSink`] so composition never touches a file system
//! or a browser directly. Provided sinks:
//!
//! - [`FileSink`]: writes `<dir>/<file name>`
//! - [`MemorySink`]: keeps documents in memory
//! - [`DataUriSink`]: renders a `data:` URI download link
//!
//! Any `Fn(&str, &[u8]) -> Result<()>` closure is a sink too.

use crate::error::{Error, Result};
use crate::types::DOC_MIME_TYPE;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Receives a finished document
pub trait DocumentSink: Send + Sync {
    /// Store or deliver `content` under `file_name`
    fn emit(&self, file_name: &str, content: &[u8]) -> Result<()>;
}

impl<F> DocumentSink for F
where
    F: Fn(&str, &[u8]) -> Result<()> + Send + Sync,
{
    fn emit(&self, file_name: &str, content: &[u8]) -> Result<()> {
        self(file_name, content)
    }
}

/// Writes documents into a directory, creating it if needed
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a document with this file name is written to
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(safe_file_name(file_name))
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for FileSink {
    fn emit(&self, file_name: &str, content: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_name);
        std::fs::write(&path, content)?;
        info!(path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }
}

/// Keeps emitted documents in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitted documents as (file name, content)
    pub fn documents(&self) -> Vec<(String, Vec<u8>)> {
        self.documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }
}

impl DocumentSink for MemorySink {
    fn emit(&self, file_name: &str, content: &[u8]) -> Result<()> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|_| Error::Sink("memory sink lock poisoned".to_string()))?;
        docs.push((file_name.to_string(), content.to_vec()));
        Ok(())
    }
}

/// A download link for an emitted document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadLink {
    /// Suggested file name
    pub file_name: String,
    /// `data:` URI holding the document
    pub href: String,
}

/// Turns documents into `data:` URI download links
#[derive(Debug, Default)]
pub struct DataUriSink {
    links: Mutex<Vec<DownloadLink>>,
}

impl DataUriSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Links produced so far
    pub fn links(&self) -> Vec<DownloadLink> {
        self.links
            .lock()
            .map(|links| links.clone())
            .unwrap_or_default()
    }
}

impl DocumentSink for DataUriSink {
    fn emit(&self, file_name: &str, content: &[u8]) -> Result<()> {
        let link = DownloadLink {
            file_name: file_name.to_string(),
            href: data_uri(content),
        };
        self.links
            .lock()
            .map_err(|_| Error::Sink("data uri sink lock poisoned".to_string()))?
            .push(link);
        Ok(())
    }
}

/// `data:` URI of a UTF-8 document
pub fn data_uri(content: &[u8]) -> String {
    format!(
        "data:{};charset=utf-8,{}",
        DOC_MIME_TYPE,
        urlencoding::encode_binary(content)
    )
}

/// Replace characters that are not allowed in file names
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "document.doc".to_string(),
        trimmed => trimmed.to_string(),
    }
}
