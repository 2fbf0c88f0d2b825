//! Input handles passed to connectors.

use std::path::{Path, PathBuf};

/// Where a connector reads from: a file on disk, inline text, or raw bytes.
///
/// Not every connector accepts every variant — an XLSX workbook cannot be
/// parsed from `Text`, for instance. Connectors reject variants they cannot
/// consume with `ConnectorError::UnsupportedSource`.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Text(String),
    Bytes(Vec<u8>),
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Source::Text(text.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Source::Bytes(bytes.into())
    }

    /// Short label for log lines and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Path(_) => "path",
            Source::Text(_) => "inline text",
            Source::Bytes(_) => "raw bytes",
        }
    }

    /// The filesystem path, when this source is one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Source::Path(path) => Some(path),
            _ => None,
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}
