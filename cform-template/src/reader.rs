//! Directory reader yielding template fragments in file-name order.

use std::path::{Path, PathBuf};

use crate::error::{io_err, TemplateError};

/// One source document contributing part of the merged template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Where the fragment was read from; used for error context.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Fragment {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Reads every regular file of a directory, one fragment per file.
///
/// The directory is listed once, at construction, and sorted by file name.
/// Construct a new reader to enumerate again.
#[derive(Debug)]
pub struct DirectoryReader {
    files: std::vec::IntoIter<PathBuf>,
}

impl DirectoryReader {
    pub fn new(source_dir: &Path) -> Result<Self, TemplateError> {
        let mut entries: Vec<_> = std::fs::read_dir(source_dir)
            .map_err(|e| io_err(source_dir, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| io_err(source_dir, e))?;
        entries.sort_by_key(|e| e.file_name());

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
            if file_type.is_dir() {
                tracing::debug!(path = %path.display(), "skipping subdirectory");
                continue;
            }
            files.push(path);
        }

        tracing::debug!(
            dir = %source_dir.display(),
            fragments = files.len(),
            "listed fragment directory"
        );
        Ok(Self {
            files: files.into_iter(),
        })
    }
}

impl Iterator for DirectoryReader {
    type Item = Result<Fragment, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(
            std::fs::read(&path)
                .map(|contents| Fragment::new(path.clone(), contents))
                .map_err(|e| io_err(&path, e)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(reader: DirectoryReader) -> Vec<String> {
        reader
            .map(|f| {
                f.expect("fragment")
                    .path
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn yields_files_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("20-resources.yaml"), "b").unwrap();
        fs::write(dir.path().join("10-parameters.yaml"), "a").unwrap();
        fs::write(dir.path().join("30-outputs.yaml"), "c").unwrap();

        let reader = DirectoryReader::new(dir.path()).unwrap();
        assert_eq!(
            names(reader),
            vec!["10-parameters.yaml", "20-resources.yaml", "30-outputs.yaml"]
        );
    }

    #[test]
    fn skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.yaml"), "x").unwrap();

        let reader = DirectoryReader::new(dir.path()).unwrap();
        assert_eq!(names(reader), vec!["a.yaml"]);
    }

    #[test]
    fn fragment_contents_are_raw_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "a:\n  b: \"c\"\n").unwrap();

        let mut reader = DirectoryReader::new(dir.path()).unwrap();
        let fragment = reader.next().unwrap().unwrap();
        assert_eq!(fragment.contents, b"a:\n  b: \"c\"\n");
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let mut reader = DirectoryReader::new(dir.path()).unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryReader::new(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }

    #[test]
    fn new_reader_restarts_enumeration() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "x").unwrap();

        let first = DirectoryReader::new(dir.path()).unwrap();
        assert_eq!(first.count(), 1);
        let second = DirectoryReader::new(dir.path()).unwrap();
        assert_eq!(second.count(), 1);
    }
}
