//! Writing edited sources back to disk.
//!
//! Writes are atomic (tempfile in the target directory, fsync, rename) and
//! verified by reading the file back. A verification mismatch restores the
//! previous content.

use crate::config::PersistOptions;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Expected content of a file after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large files)
    Hash(u64),
}

impl Verification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Verification::ExactMatch(expected) => text == expected,
            Verification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    /// Hash for text over 1KB, exact match otherwise.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            Verification::Hash(xxh3_64(text.as_bytes()))
        } else {
            Verification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("{} has no parent directory", path.display())]
    NoParent { path: PathBuf },

    #[error("editor was not opened from a file; use save_to with a path")]
    NoPath,

    #[error("read-back of {} did not match the written content; previous content restored", path.display())]
    VerificationFailed { path: PathBuf },
}

impl PersistError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of [`write_verified`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "SaveOutcome tells whether anything was written"]
pub enum SaveOutcome {
    /// The file already held this content.
    Unchanged { path: PathBuf },
    Written {
        path: PathBuf,
        bytes: usize,
        backup: Option<PathBuf>,
    },
}

/// Write `content` to `path` atomically.
///
/// A missing target is created. When the target already holds `content`
/// nothing is touched.
pub fn write_verified(
    path: &Path,
    content: &str,
    options: &PersistOptions,
) -> Result<SaveOutcome, PersistError> {
    let previous = match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8(bytes).map_err(|_| PersistError::NotUtf8 {
            path: path.to_path_buf(),
        })?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(PersistError::io(path, e)),
    };

    if previous.as_deref() == Some(content) {
        return Ok(SaveOutcome::Unchanged {
            path: path.to_path_buf(),
        });
    }

    let backup = match (&previous, options.keep_backup) {
        (Some(old), true) => {
            let backup_path = backup_path(path, &options.backup_suffix);
            atomic_write(&backup_path, old.as_bytes())?;
            tracing::debug!(backup = %backup_path.display(), "wrote backup");
            Some(backup_path)
        }
        _ => None,
    };

    atomic_write(path, content.as_bytes())?;

    if options.verify {
        let expected = Verification::from_text(content);
        let readback = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        if !expected.matches(&readback) {
            tracing::warn!(path = %path.display(), "read-back mismatch, restoring previous content");
            match &previous {
                Some(old) => atomic_write(path, old.as_bytes())?,
                None => fs::remove_file(path).map_err(|e| PersistError::io(path, e))?,
            }
            return Err(PersistError::VerificationFailed {
                path: path.to_path_buf(),
            });
        }
    }

    tracing::info!(path = %path.display(), bytes = content.len(), "saved");
    Ok(SaveOutcome::Written {
        path: path.to_path_buf(),
        bytes: content.len(),
        backup,
    })
}

fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => {
            return Err(PersistError::NoParent {
                path: path.to_path_buf(),
            })
        }
    };

    let mut temp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| PersistError::io(path, e))?;
    temp.write_all(content)
        .map_err(|e| PersistError::io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PersistError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| PersistError::io(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_exact_match() {
        let verify = Verification::ExactMatch("hello world".to_string());
        assert!(verify.matches("hello world"));
        assert!(!verify.matches("hello"));
    }

    #[test]
    fn verification_hash_for_large_text() {
        let text = "x".repeat(2000);
        let verify = Verification::from_text(&text);
        assert!(matches!(verify, Verification::Hash(_)));
        assert!(verify.matches(&text));
        assert!(!verify.matches("x"));
    }

    #[test]
    fn writes_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.py");
        fs::write(&path, "x = 1\n").unwrap();

        let outcome = write_verified(&path, "x = 2\n", &PersistOptions::default()).unwrap();

        assert!(matches!(outcome, SaveOutcome::Written { backup: None, bytes: 6, .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 2\n");
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.py");
        fs::write(&path, "x = 1\n").unwrap();

        let outcome = write_verified(&path, "x = 1\n", &PersistOptions::default()).unwrap();
        assert!(matches!(outcome, SaveOutcome::Unchanged { .. }));
    }

    #[test]
    fn keeps_backup_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.py");
        fs::write(&path, "x = 1\n").unwrap();

        let options = PersistOptions {
            keep_backup: true,
            ..PersistOptions::default()
        };
        let outcome = write_verified(&path, "x = 2\n", &options).unwrap();

        let expected_backup = dir.path().join("app.py.orig");
        match outcome {
            SaveOutcome::Written { backup, .. } => assert_eq!(backup, Some(expected_backup.clone())),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(fs::read_to_string(expected_backup).unwrap(), "x = 1\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 2\n");
    }

    #[test]
    fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.js");

        let options = PersistOptions {
            keep_backup: true,
            ..PersistOptions::default()
        };
        let outcome = write_verified(&path, "let a = 1;\n", &options).unwrap();

        assert!(matches!(outcome, SaveOutcome::Written { backup: None, .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "let a = 1;\n");
    }
}
