//! Atomic output writes.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use apigen_build::RenderedFile;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Writes rendered files below one output root.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Writer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one file and return its full path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the file
    /// cannot be written or renamed into place.
    pub fn write(&self, file: &RenderedFile) -> Result<PathBuf> {
        let path = self.root.join(&file.path);
        write_atomic(&path, &file.contents)?;
        tracing::info!(path = %path.display(), "wrote");
        Ok(path)
    }
}

/// Write `contents` to a temporary sibling of `path`, then rename it into
/// place. A reader never sees a partially written file.
///
/// # Errors
///
/// Returns an I/O error from any step.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use apigen_build::Language;

    use super::*;

    #[test]
    fn creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());
        let file = RenderedFile::new("a/b/c.json", Language::Json, "{}\n".to_string());

        let path = writer.write(&file).unwrap();
        assert_eq!(path, dir.path().join("a/b/c.json"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");

        let again = RenderedFile::new("a/b/c.json", Language::Json, "[]\n".to_string());
        writer.write(&again).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("a/b"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
