//! Comment sources
//!
//! The pipeline itself takes `&[RawComment]`; sources are the adapters that
//! produce them. Two file formats are supported: plain text (one comment
//! per non-empty line) and a JSON array of comment records.

use crate::comment::RawComment;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Source label for text typed or pasted directly.
pub const TEXT_INPUT_SOURCE: &str = "text_input";

/// Errors from loading comments
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid comment JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that yields raw comments.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<RawComment>, IngestError>;
}

/// One comment per non-empty trimmed line, ids `text_0`, `text_1`, ...
pub fn parse_text(text: &str, source: &str) -> Vec<RawComment> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| RawComment::new(format!("text_{}", i), line).with_source(source))
        .collect()
}

/// Parse a JSON array of comment records. Records without a source get
/// `default_source`.
pub fn parse_json(json: &str, default_source: &str) -> Result<Vec<RawComment>, serde_json::Error> {
    let mut comments: Vec<RawComment> = serde_json::from_str(json)?;
    for comment in comments.iter_mut().filter(|c| c.source.is_empty()) {
        comment.source = default_source.to_string();
    }
    Ok(comments)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn read(path: &Path) -> Result<String, IngestError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Plain-text file source.
#[derive(Debug, Clone)]
pub struct TextSource {
    path: PathBuf,
}

impl TextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CommentSource for TextSource {
    fn name(&self) -> &str {
        "text"
    }

    async fn load(&self) -> Result<Vec<RawComment>, IngestError> {
        let text = read(&self.path).await?;
        let comments = parse_text(&text, &file_label(&self.path));
        debug!(path = %self.path.display(), comments = comments.len(), "loaded text comments");
        Ok(comments)
    }
}

/// JSON array file source.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CommentSource for JsonSource {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self) -> Result<Vec<RawComment>, IngestError> {
        let json = read(&self.path).await?;
        let comments = parse_json(&json, &file_label(&self.path)).map_err(|source| IngestError::Json {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), comments = comments.len(), "loaded JSON comments");
        Ok(comments)
    }
}

/// Pick a source by file extension: `.json` is JSON, anything else text.
pub fn source_for_path(path: &Path) -> Box<dyn CommentSource> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonSource::new(path))
    } else {
        Box::new(TextSource::new(path))
    }
}
