//! Knowledge store over a flat directory of text files

use crate::{seed, Result, StoreError};
use kbchat_core::KnowledgeFile;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// A knowledge base: one directory of `*.txt` files
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dir: PathBuf,
}

/// A file that could not be read during aggregation
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// The aggregated knowledge base, rebuilt before every model call
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBundle {
    /// All readable documents concatenated with per-file source headers
    pub text: String,

    /// The file listing the aggregation was built from, in sorted order
    pub files: Vec<String>,

    /// Files that were listed but failed to read
    pub skipped: Vec<SkippedFile>,
}

impl KnowledgeStore {
    /// Open a store, creating the directory if it does not exist
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory backing this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the `*.txt` files in the store, sorted lexicographically.
    ///
    /// Sorted so that aggregation output is deterministic for a given
    /// directory snapshot. No side effects.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read one document, enforcing UTF-8
    pub fn read(&self, name: &str) -> Result<KnowledgeFile> {
        validate_name(name)?;
        let bytes = fs::read(self.dir.join(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| StoreError::NotUtf8(name.to_string()))?;
        Ok(KnowledgeFile::new(name, content))
    }

    /// Write a document. Overwrites silently if the name already exists.
    #[instrument(skip(self, bytes))]
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        validate_name(name)?;
        fs::write(self.dir.join(name), bytes)?;
        debug!("Wrote {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Delete a document
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        fs::remove_file(self.dir.join(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io(e),
        })?;
        debug!("Deleted {}", name);
        Ok(())
    }

    /// Seed an empty store with the default document.
    ///
    /// Returns true if the seed document was written.
    pub fn ensure_seeded(&self) -> Result<bool> {
        if !self.list()?.is_empty() {
            return Ok(false);
        }
        self.write(seed::DEFAULT_FILE_NAME, seed::DEFAULT_CONTENT.as_bytes())?;
        info!("Seeded empty knowledge base with {}", seed::DEFAULT_FILE_NAME);
        Ok(true)
    }

    /// Concatenate every document into one knowledge text.
    ///
    /// Seeds the store first if it is empty. Each readable file is appended
    /// behind a `--- Source: <name> ---` header in listing order; a file
    /// that fails to read is recorded in `skipped` and aggregation
    /// continues. Only a listing failure aborts the whole call. No size
    /// limit is applied.
    #[instrument(skip(self))]
    pub fn aggregate(&self) -> Result<KnowledgeBundle> {
        self.ensure_seeded()?;
        let files = self.list()?;

        let mut text = String::new();
        let mut skipped = Vec::new();
        for name in &files {
            match self.read(name) {
                Ok(file) => {
                    text.push_str(&format!(
                        "\n\n--- Source: {} ---\n{}",
                        file.name, file.content
                    ));
                }
                Err(e) => {
                    debug!("Skipping {}: {}", name, e);
                    skipped.push(SkippedFile {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Aggregated {} of {} files ({} chars)",
            files.len() - skipped.len(),
            files.len(),
            text.len()
        );
        Ok(KnowledgeBundle { text, files, skipped })
    }
}

/// The store owns a flat directory of `*.txt` files only
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.starts_with("..")
        || !name.ends_with(".txt")
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
