//! Document sources: where the raw profile text comes from.
//!
//! A source yields one or more raw text segments (one per file). The format
//! behind a source does not matter to the rest of the pipeline.

use std::{
    fs,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::RagError;

/// Provider interface for raw corpus text.
///
/// Async because real sources may live behind I/O; object-safe so the
/// index builder can hold a `dyn CorpusSource`.
pub trait CorpusSource: Send + Sync {
    /// Loads every segment of the corpus, in a stable order.
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Vec<String>, RagError>> + Send + '_>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Corpus backed by a single UTF-8 file or a directory of `.txt`/`.md` files.
#[derive(Clone, Debug)]
pub struct FileCorpus {
    path: PathBuf,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(path: &Path) -> Result<Vec<String>, RagError> {
        if !path.exists() {
            return Err(RagError::Corpus(format!(
                "document not found: {}",
                path.display()
            )));
        }

        if path.is_file() {
            let text = fs::read_to_string(path).map_err(|e| {
                RagError::Corpus(format!("cannot read {}: {e}", path.display()))
            })?;
            if text.trim().is_empty() {
                return Err(RagError::Corpus(format!(
                    "document is empty: {}",
                    path.display()
                )));
            }
            return Ok(vec![text]);
        }

        let mut segments = Vec::new();
        let walker = WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(root = %path.display(), error = %e, "corpus: walk error skipped");
                    None
                }
            });

        for entry in walker {
            if !entry.file_type().is_file() || !has_text_extension(entry.path()) {
                continue;
            }
            match fs::read_to_string(entry.path()) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(file = %entry.path().display(), chars = text.chars().count(), "corpus: segment loaded");
                    segments.push(text);
                }
                Ok(_) => debug!(file = %entry.path().display(), "corpus: empty file skipped"),
                Err(e) => warn!(file = %entry.path().display(), error = %e, "corpus: unreadable file skipped"),
            }
        }

        if segments.is_empty() {
            return Err(RagError::Corpus(format!(
                "no readable .txt/.md documents under {}",
                path.display()
            )));
        }
        Ok(segments)
    }
}

impl CorpusSource for FileCorpus {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Vec<String>, RagError>> + Send + '_>> {
        Box::pin(async move {
            let path = self.path.clone();
            let segments = tokio::task::spawn_blocking(move || Self::read_all(&path))
                .await
                .map_err(|e| RagError::Corpus(format!("corpus loader task failed: {e}")))??;
            info!(path = %self.path.display(), segments = segments.len(), "corpus loaded");
            Ok(segments)
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// In-memory corpus, useful for embedding callers and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticCorpus {
    segments: Vec<String>,
}

impl StaticCorpus {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

impl CorpusSource for StaticCorpus {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Vec<String>, RagError>> + Send + '_>> {
        Box::pin(async move { Ok(self.segments.clone()) })
    }

    fn describe(&self) -> String {
        format!("static:{} segments", self.segments.len())
    }
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn single_file_is_one_segment() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("profile.txt");
        fs::write(&file, "I build data pipelines.").unwrap();

        let segments = FileCorpus::new(&file).load().await.unwrap();
        assert_eq!(segments, vec!["I build data pipelines.".to_string()]);
    }

    #[tokio::test]
    async fn directory_is_read_in_name_order_and_filters_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "second").unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("c.json"), "{\"ignored\": true}").unwrap();
        fs::write(dir.path().join("d.txt"), "   ").unwrap();

        let segments = FileCorpus::new(dir.path()).load().await.unwrap();
        assert_eq!(segments, vec!["first".to_string(), "second".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dangling_links_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("b.txt")).unwrap();

        let segments = FileCorpus::new(dir.path()).load().await.unwrap();
        assert_eq!(segments, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn missing_document_is_a_corpus_error() {
        let dir = tempdir().unwrap();
        let err = FileCorpus::new(dir.path().join("nope.txt"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Corpus(_)));
    }

    #[tokio::test]
    async fn empty_directory_is_a_corpus_error() {
        let dir = tempdir().unwrap();
        assert!(FileCorpus::new(dir.path()).load().await.is_err());
    }
}
