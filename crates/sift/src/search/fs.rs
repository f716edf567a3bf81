//! Sources of file content.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies the content of the files named in a search.
pub trait SourceLoader: Send + Sync {
    /// Returns the content of `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while loading the file.
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Serves files held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    /// Creates a loader over `(path, content)` pairs.
    #[must_use]
    pub fn new(files: impl IntoIterator<Item = (PathBuf, String)>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory file at {}", path.display()),
            )
        })
    }
}
