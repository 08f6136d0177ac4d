// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types.
//!
//! Nothing in the tag engine is fatal to the process. A missing tag container
//! is not an error at all (it is represented as `None`), and file level
//! failures of a bulk operation are collected into a [`BatchError`] so the
//! batch can carry on with the remaining files.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::tag::TagSlot;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Tag {slot} is not supported for {format} files")]
    TagNotSupported { slot: TagSlot, format: &'static str },

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("File {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Rename {} to {} failed", .from.display(), .to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Create directory {} failed", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

/// Failures accumulated over a batch of files.
///
/// The batch is never aborted by a single file, the caller gets the complete
/// list once the batch is done.
#[derive(Debug, Default)]
pub struct BatchError {
    pub failures: Vec<(PathBuf, Error)>,
}

impl BatchError {
    pub fn push(&mut self, path: impl Into<PathBuf>, error: Error) {
        self.failures.push((path.into(), error));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Converts into `Err` if anything failed.
    pub fn into_result(self) -> std::result::Result<(), BatchError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error while writing file:")?;
        for (path, error) in &self.failures {
            write!(f, "\n{}: {}", path.display(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_lists_every_file() {
        let mut errors = BatchError::default();
        errors.push("/music/a.mp3", Error::NotAFile(PathBuf::from("/music/a.mp3")));
        errors.push("/music/b.mp3", Error::AlreadyExists(PathBuf::from("/music/c.mp3")));

        let text = errors.to_string();
        assert!(text.starts_with("Error while writing file:"));
        assert!(text.contains("/music/a.mp3: /music/a.mp3 is not a file"));
        assert!(text.contains("/music/b.mp3: File /music/c.mp3 already exists"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_batch_is_ok() {
        assert!(BatchError::default().into_result().is_ok());
    }
}
