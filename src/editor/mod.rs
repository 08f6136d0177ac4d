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

//! Editing session.
//!
//! The [`Session`] is the application-lifetime context: it owns the file
//! store, the configuration and the copy buffer. Every bulk operation works
//! on a selection of file indices and follows the same pattern:
//!
//! 1. read the frames of each selected file,
//! 2. transform them,
//! 3. write them back through a [`StandardTagsFilter`].
//!
//! Changes stay in memory until [`Session::save`].
//!
//! # Sub-modules
//!
//! * [`rename`]: directory rename planning.

pub mod rename;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use log::debug;

use crate::backend::TagBackend;
use crate::config::AppConfig;
use crate::error::{BatchError, Result};
use crate::file::{FileIndex, FileStore};
use crate::format::command::CommandCodes;
use crate::format::parser::ImportParser;
use crate::format::track::{TrackCodes, format_filename_from_tags};
use crate::format::format_string;
use crate::model::{FrameAggregate, FrameCollection, StandardTagsFilter};
use crate::tag::{TagSlot, TagVersion};
use crate::track::{ImportTrackDataVector, TrackData};

use self::rename::{RenameMode, RenamePlan};

pub struct Session {
    store: FileStore,
    config: AppConfig,
    copy_buffer: FrameCollection,
}

impl Session {
    pub fn new(backend: Box<dyn TagBackend>, config: AppConfig) -> Self {
        Self {
            store: FileStore::new(backend, config.tags.clone()),
            config,
            copy_buffer: FrameCollection::new(),
        }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FileStore {
        &mut self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AppConfig) {
        self.store.set_tag_config(config.tags.clone());
        self.config = config;
    }

    pub fn copy_buffer(&self) -> &FrameCollection {
        &self.copy_buffer
    }

    pub fn open_file(&mut self, path: &Path) -> Result<FileIndex> {
        self.store.open_file(path)
    }

    pub fn open_directory(&mut self, dir: &Path, recursive: bool) -> Result<Vec<FileIndex>> {
        self.store.open_directory(dir, recursive)
    }

    pub fn track_data(&self, idx: FileIndex, version: TagVersion) -> TrackData {
        TrackData::from_file(&self.store, idx, version)
    }

    /// The frames a selection has in common.
    ///
    /// Fields with different values are left out of the frames and listed as
    /// differing, so writing the aggregate back does not touch them.
    pub fn aggregate(&self, selection: &[FileIndex], slot: TagSlot) -> FrameAggregate {
        let mut aggregate = FrameAggregate::new();
        for idx in selection {
            aggregate.add(self.store.frames(*idx, slot).as_ref());
        }
        aggregate
    }

    /// Writes `frames` to every file of the selection.
    ///
    /// # Returns
    ///
    /// The number of files changed.
    pub fn apply_frames(
        &mut self,
        selection: &[FileIndex],
        slot: TagSlot,
        frames: &FrameCollection,
        filter: &StandardTagsFilter,
    ) -> usize {
        let frames = if self.config.format_while_editing {
            let mut formatted = frames.clone();
            self.config.tag_format_config.format_frames(&mut formatted);
            Cow::Owned(formatted)
        } else {
            Cow::Borrowed(frames)
        };
        let changed = selection
            .iter()
            .filter(|idx| self.store.set_frames(**idx, slot, &frames, filter))
            .count();
        debug!("Tag {slot} changed in {changed} of {} files", selection.len());
        changed
    }

    /// Copies every frame of a tag into the copy buffer.
    pub fn copy_tags(&mut self, idx: FileIndex, slot: TagSlot) {
        self.copy_buffer = self.store.frames(idx, slot).unwrap_or_default();
    }

    pub fn paste_tags(&mut self, selection: &[FileIndex], slot: TagSlot, filter: &StandardTagsFilter) -> usize {
        let frames = self.copy_buffer.clone();
        self.apply_frames(selection, slot, &frames, filter)
    }

    /// Copies tag `from` to the other tag of each file.
    pub fn copy_between(&mut self, selection: &[FileIndex], from: TagSlot, filter: &StandardTagsFilter) -> usize {
        let mut changed = 0;
        for idx in selection {
            let Some(frames) = self.store.frames(*idx, from) else {
                continue;
            };
            if self.store.set_frames(*idx, from.other(), &frames, filter) {
                changed += 1;
            }
        }
        changed
    }

    /// Removes the fields enabled in `filter`, all fields remove the tags.
    pub fn remove_tags(&mut self, selection: &[FileIndex], slot: TagSlot, filter: &StandardTagsFilter) -> usize {
        selection
            .iter()
            .filter(|idx| self.store.remove_tags(**idx, slot, filter))
            .count()
    }

    /// Applies case conversion and string replacement to the tags.
    pub fn apply_tag_format(&mut self, selection: &[FileIndex], slot: TagSlot) -> usize {
        let mut changed = 0;
        for idx in selection {
            let Some(mut frames) = self.store.frames(*idx, slot) else {
                continue;
            };
            if self.config.tag_format_config.format_frames(&mut frames)
                && self.store.set_frames(*idx, slot, &frames, &StandardTagsFilter::all())
            {
                changed += 1;
            }
        }
        changed
    }

    /// Sets tags from the file names, e.g. with "%a - %t".
    ///
    /// # Errors
    ///
    /// If `pattern` is not a valid filename pattern.
    pub fn tags_from_filename(
        &mut self,
        selection: &[FileIndex],
        slot: TagSlot,
        pattern: &str,
        filter: &StandardTagsFilter,
    ) -> Result<usize> {
        let parser = ImportParser::new(pattern)?;
        let mut changed = 0;
        for idx in selection {
            let Some(file) = self.store.get(*idx) else {
                continue;
            };
            let path = file.dirname().join(file.filename());
            match parser.parse(&path) {
                Some(frames) => {
                    if self.apply_frames(&[*idx], slot, &frames, filter) > 0 {
                        changed += 1;
                    }
                }
                None => debug!("{} does not match {pattern:?}", path.display()),
            }
        }
        Ok(changed)
    }

    /// Schedules new file names generated from the tags.
    ///
    /// Uses the configured filename format if `format` is `None`.
    pub fn filename_from_tags(&mut self, selection: &[FileIndex], version: TagVersion, format: Option<&str>) -> usize {
        let format = format.unwrap_or(&self.config.filename_format).to_string();
        let mut changed = 0;
        for idx in selection {
            let track = TrackData::from_file(&self.store, *idx, version);
            if track.frames().is_empty_or_inactive() {
                continue;
            }
            let name = {
                let codes = TrackCodes::new(&track, &self.store);
                let name = format_filename_from_tags(&codes, &format, false, &self.config.separator_replacements);
                self.config.filename_format_config.format_filename(&name)
            };
            if let Some(file) = self.store.get_mut(*idx) {
                file.set_filename(name);
                if file.is_filename_changed() {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Applies imported track data to the selection, in order.
    ///
    /// Disabled tracks are skipped, their file is left alone.
    pub fn import_tracks(
        &mut self,
        selection: &[FileIndex],
        tracks: &ImportTrackDataVector,
        slot: TagSlot,
        filter: &StandardTagsFilter,
    ) -> usize {
        let mut changed = 0;
        for (idx, track) in selection.iter().zip(&tracks.tracks) {
            if !track.enabled {
                continue;
            }
            if self.apply_frames(&[*idx], slot, track.track.frames(), filter) > 0 {
                changed += 1;
            }
        }
        changed
    }

    /// One formatted line per file, using the export format if `format` is
    /// `None`.
    pub fn export_lines(&self, selection: &[FileIndex], version: TagVersion, format: Option<&str>) -> Vec<String> {
        let format = format.unwrap_or(&self.config.export_format);
        selection
            .iter()
            .map(|idx| {
                let track = TrackData::from_file(&self.store, *idx, version);
                format_string(format, &TrackCodes::new(&track, &self.store))
            })
            .collect()
    }

    /// Arguments of an external command run on the selection.
    pub fn command_args(&self, selection: &[FileIndex], args: &[&str]) -> Vec<String> {
        let files: Vec<PathBuf> = selection
            .iter()
            .filter_map(|idx| self.store.get(*idx))
            .map(|f| f.path().to_path_buf())
            .collect();
        let frames = selection
            .first()
            .map(|idx| self.track_data(*idx, TagVersion::V2V1).into_frames())
            .unwrap_or_default();
        CommandCodes::new(&frames, &files, false, &self.config.browser).format_args(args)
    }

    /// Plans renaming the directories of the selection.
    ///
    /// Uses the configured directory format if `format` is `None`. Files
    /// without tags are skipped.
    pub fn plan_rename_directory(
        &self,
        selection: &[FileIndex],
        version: TagVersion,
        format: Option<&str>,
        mode: RenameMode,
    ) -> RenamePlan {
        let format = format.unwrap_or(&self.config.dir_format);
        let mut plan = RenamePlan::new();
        for idx in selection {
            let Some(file) = self.store.get(*idx) else {
                continue;
            };
            let track = TrackData::from_file(&self.store, *idx, version);
            if track.frames().is_empty_or_inactive() {
                continue;
            }
            let codes = TrackCodes::new(&track, &self.store);
            let name = format_filename_from_tags(&codes, format, true, &self.config.separator_replacements);
            plan.schedule(file.path(), &name, mode);
        }
        plan
    }

    /// Executes a rename plan and updates the paths of the opened files.
    ///
    /// # Errors
    ///
    /// Every action which failed. Actions after a failure are still
    /// performed.
    pub fn rename_directory(&mut self, plan: &mut RenamePlan) -> std::result::Result<usize, BatchError> {
        let result = plan.execute();
        for (_, file) in self.store.iter_mut() {
            let path = plan.relocate(file.path());
            if path != file.path() {
                file.set_path(path);
            }
        }
        result
    }

    /// Writes every changed file, then performs pending renames.
    ///
    /// # Errors
    ///
    /// Every file which could not be saved. The other files are saved.
    pub fn save(&mut self) -> std::result::Result<usize, BatchError> {
        self.store.save_all()
    }
}
