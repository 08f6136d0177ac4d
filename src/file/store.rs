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

//! Registry of opened files.
//!
//! The store owns every [`TaggedFile`] and the backend used to read and write
//! them. Other components refer to files by [`FileIndex`], which stays valid
//! for the lifetime of the store.

use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::backend::{FileFormat, TagBackend};
use crate::config::TagConfig;
use crate::error::{BatchError, Error, Result};
use crate::model::{FrameCollection, StandardTagsFilter};
use crate::tag::{MapOptions, TagSlot};

use super::{FileIndex, TaggedFile};

pub struct FileStore {
    backend: Box<dyn TagBackend>,
    files: Vec<TaggedFile>,
    tag_config: TagConfig,
}

impl FileStore {
    pub fn new(backend: Box<dyn TagBackend>, tag_config: TagConfig) -> Self {
        debug!("Using {} {} tag backend", backend.name(), backend.version());
        Self {
            backend,
            files: Vec::new(),
            tag_config,
        }
    }

    pub fn backend(&self) -> &dyn TagBackend {
        self.backend.as_ref()
    }

    pub fn tag_config(&self) -> &TagConfig {
        &self.tag_config
    }

    pub fn set_tag_config(&mut self, tag_config: TagConfig) {
        self.tag_config = tag_config;
    }

    /// Opens one file and adds it to the store.
    ///
    /// # Errors
    ///
    /// If the file cannot be read.
    pub fn open_file(&mut self, path: &Path) -> Result<FileIndex> {
        let file = TaggedFile::open(self.backend.as_ref(), path)?;
        self.files.push(file);
        Ok(FileIndex(self.files.len() - 1))
    }

    /// Opens every supported audio file of a directory, sorted by name.
    ///
    /// Files which cannot be read are logged and skipped.
    ///
    /// # Errors
    ///
    /// If `dir` is not a directory.
    pub fn open_directory(&mut self, dir: &Path, recursive: bool) -> Result<Vec<FileIndex>> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut opened = Vec::new();
        for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || FileFormat::from_path(path).is_none() {
                continue;
            }
            match self.open_file(path) {
                Ok(idx) => opened.push(idx),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        debug!("Opened {} files from {}", opened.len(), dir.display());
        Ok(opened)
    }

    pub fn get(&self, idx: FileIndex) -> Option<&TaggedFile> {
        self.files.get(idx.0)
    }

    pub fn get_mut(&mut self, idx: FileIndex) -> Option<&mut TaggedFile> {
        self.files.get_mut(idx.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileIndex, &TaggedFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileIndex(i), f))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FileIndex, &mut TaggedFile)> {
        self.files.iter_mut().enumerate().map(|(i, f)| (FileIndex(i), f))
    }

    pub fn indices(&self) -> Vec<FileIndex> {
        (0..self.files.len()).map(FileIndex).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Number of opened files in the directory of `idx`.
    pub fn total_tracks_in_dir(&self, idx: FileIndex) -> u32 {
        let Some(file) = self.get(idx) else {
            return 0;
        };
        let dir = file.dirname();
        let count = self.files.iter().filter(|f| f.dirname() == dir).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Options for mapping frames onto the tags of `idx`.
    pub fn map_options(&self, idx: FileIndex) -> MapOptions {
        let total = self.tag_config.write_total_tracks.then(|| self.total_tracks_in_dir(idx));
        self.tag_config.map_options(total, self.backend.mirrors_utf16())
    }

    /// Standard fields of a slot, `None` for a missing file or tag.
    pub fn standard_tags(&self, idx: FileIndex, slot: TagSlot) -> Option<FrameCollection> {
        let opts = self.map_options(idx);
        self.get(idx)?.standard_tags(slot, &opts)
    }

    /// Every frame of a slot, `None` for a missing file or tag.
    pub fn frames(&self, idx: FileIndex, slot: TagSlot) -> Option<FrameCollection> {
        let opts = self.map_options(idx);
        self.get(idx)?.frames(slot, &opts)
    }

    pub fn set_frames(
        &mut self,
        idx: FileIndex,
        slot: TagSlot,
        frames: &FrameCollection,
        filter: &StandardTagsFilter,
    ) -> bool {
        let opts = self.map_options(idx);
        self.get_mut(idx)
            .is_some_and(|file| file.set_frames(slot, frames, filter, &opts))
    }

    pub fn remove_tags(&mut self, idx: FileIndex, slot: TagSlot, filter: &StandardTagsFilter) -> bool {
        let opts = self.map_options(idx);
        self.get_mut(idx)
            .is_some_and(|file| file.remove_tags(slot, filter, &opts))
    }

    /// Saves every changed file, then performs its pending rename.
    ///
    /// A failing file does not stop the batch.
    ///
    /// # Returns
    ///
    /// The number of files written or renamed.
    ///
    /// # Errors
    ///
    /// Every file which failed, with its error.
    pub fn save_all(&mut self) -> std::result::Result<usize, BatchError> {
        let mut errors = BatchError::default();
        let mut saved = 0;
        for file in self.files.iter_mut().filter(|f| f.is_changed()) {
            let result = file
                .save(self.backend.as_ref())
                .and_then(|written| Ok(file.rename()? || written));
            match result {
                Ok(true) => saved += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Saving {} failed: {}", file.path().display(), e);
                    errors.push(file.path(), e);
                }
            }
        }
        errors.into_result().map(|()| saved)
    }
}
