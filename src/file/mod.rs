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

//! Opened audio files.
//!
//! A [`TaggedFile`] holds the tags of one audio file in memory. Edits only
//! touch the in-memory tags and mark the slot as changed, nothing reaches
//! the disk before [`TaggedFile::save`] and [`TaggedFile::rename`].
//!
//! # Sub-modules
//!
//! * [`store`]: the registry owning every opened file.

pub mod store;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::backend::{DetailInfo, FileContents, FileFormat, TagBackend};
use crate::error::{Error, Result};
use crate::model::{FrameCollection, StandardTagsFilter};
use crate::tag::{MapOptions, RawTag, TagSlot};

pub use store::FileStore;

/// Position of a file in the [`FileStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileIndex(pub usize);

#[derive(Debug, Clone)]
pub struct TaggedFile {
    path: PathBuf,
    new_filename: Option<String>,
    format: FileFormat,
    tag_v1: Option<RawTag>,
    tag_v2: Option<RawTag>,
    changed_v1: bool,
    changed_v2: bool,
    detail: DetailInfo,
}

impl TaggedFile {
    /// Reads the file at `path` through `backend`.
    ///
    /// # Errors
    ///
    /// If `path` is a directory or the backend cannot read the file.
    pub fn open(backend: &dyn TagBackend, path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }
        let contents = backend.read(path)?;
        debug!("Opened {} ({})", path.display(), contents.format);
        Ok(Self::from_contents(path, contents))
    }

    pub fn from_contents(path: impl Into<PathBuf>, contents: FileContents) -> Self {
        Self {
            path: path.into(),
            new_filename: None,
            format: contents.format,
            tag_v1: contents.tag_v1,
            tag_v2: contents.tag_v2,
            changed_v1: false,
            changed_v2: false,
            detail: contents.detail,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }

    /// Directory containing the file.
    pub fn dirname(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name, the pending new name if one is set.
    pub fn filename(&self) -> String {
        match &self.new_filename {
            Some(name) => name.clone(),
            None => self.current_filename(),
        }
    }

    /// File name on disk.
    pub fn current_filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Schedules a rename, performed by [`TaggedFile::rename`].
    pub fn set_filename(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.current_filename() {
            self.new_filename = None;
        } else {
            self.new_filename = Some(name);
        }
    }

    pub fn is_filename_changed(&self) -> bool {
        self.new_filename.is_some()
    }

    /// Extension including the dot, e.g. ".mp3".
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn detail(&self) -> &DetailInfo {
        &self.detail
    }

    pub fn duration(&self) -> Option<Duration> {
        self.detail.duration
    }

    pub fn tag(&self, slot: TagSlot) -> Option<&RawTag> {
        match slot {
            TagSlot::V1 => self.tag_v1.as_ref(),
            TagSlot::V2 => self.tag_v2.as_ref(),
        }
    }

    fn tag_entry(&mut self, slot: TagSlot) -> &mut Option<RawTag> {
        match slot {
            TagSlot::V1 => &mut self.tag_v1,
            TagSlot::V2 => &mut self.tag_v2,
        }
    }

    pub fn has_tag(&self, slot: TagSlot) -> bool {
        self.tag(slot).is_some()
    }

    pub fn is_tag_supported(&self, slot: TagSlot) -> bool {
        self.format.supports(slot)
    }

    /// The standard fields of a slot, `None` if the file has no such tag.
    pub fn standard_tags(&self, slot: TagSlot, opts: &MapOptions) -> Option<FrameCollection> {
        self.tag(slot).map(|tag| tag.standard_frames(opts))
    }

    /// Every frame of a slot, `None` if the file has no such tag.
    pub fn frames(&self, slot: TagSlot, opts: &MapOptions) -> Option<FrameCollection> {
        self.tag(slot).map(|tag| tag.frames(opts))
    }

    /// Writes `frames` into a slot.
    ///
    /// A missing tag is only created when the write actually sets a value.
    ///
    /// # Returns
    ///
    /// `true` if the tag was modified.
    pub fn set_frames(
        &mut self,
        slot: TagSlot,
        frames: &FrameCollection,
        filter: &StandardTagsFilter,
        opts: &MapOptions,
    ) -> bool {
        let format = self.format;
        let entry = self.tag_entry(slot);
        let changed = if let Some(tag) = entry.as_mut() {
            tag.set_frames(frames, filter, opts)
        } else if let Some(mut tag) = format.new_tag(slot, opts) {
            let changed = tag.set_frames(frames, filter, opts);
            if changed {
                *entry = Some(tag);
            }
            changed
        } else {
            debug!("Tag {slot} not supported for {format} file, ignoring write");
            false
        };
        if changed {
            self.mark_changed(slot);
        }
        changed
    }

    /// Removes the fields enabled in `filter`, all fields remove the tag.
    pub fn remove_tags(&mut self, slot: TagSlot, filter: &StandardTagsFilter, opts: &MapOptions) -> bool {
        let entry = self.tag_entry(slot);
        let changed = if filter.is_all_true() {
            entry.take().is_some()
        } else {
            entry.as_mut().is_some_and(|tag| tag.remove_frames(filter, opts))
        };
        if changed {
            self.mark_changed(slot);
        }
        changed
    }

    /// Format of a tag, e.g. "ID3v2.3", `None` if there is no tag.
    pub fn tag_format(&self, slot: TagSlot) -> Option<&'static str> {
        self.tag(slot).map(RawTag::format_name)
    }

    fn mark_changed(&mut self, slot: TagSlot) {
        match slot {
            TagSlot::V1 => self.changed_v1 = true,
            TagSlot::V2 => self.changed_v2 = true,
        }
    }

    pub fn is_tag_changed(&self, slot: TagSlot) -> bool {
        match slot {
            TagSlot::V1 => self.changed_v1,
            TagSlot::V2 => self.changed_v2,
        }
    }

    /// Tags or file name have unsaved changes.
    pub fn is_changed(&self) -> bool {
        self.changed_v1 || self.changed_v2 || self.is_filename_changed()
    }

    /// Writes the changed tags, an empty tag is stripped from the file.
    ///
    /// # Returns
    ///
    /// `true` if anything was written.
    ///
    /// # Errors
    ///
    /// If the backend fails to write. Slots written before the failure stay
    /// saved.
    pub fn save(&mut self, backend: &dyn TagBackend) -> Result<bool> {
        let mut written = false;
        for slot in [TagSlot::V1, TagSlot::V2] {
            if !self.is_tag_changed(slot) {
                continue;
            }
            let tag = self.tag(slot).filter(|tag| !tag.is_empty());
            backend.write(&self.path, slot, tag)?;
            debug!("Wrote tag {slot} of {}", self.path.display());
            if tag.is_none() {
                *self.tag_entry(slot) = None;
            }
            match slot {
                TagSlot::V1 => self.changed_v1 = false,
                TagSlot::V2 => self.changed_v2 = false,
            }
            written = true;
        }
        Ok(written)
    }

    /// Performs a pending rename within the directory of the file.
    ///
    /// # Errors
    ///
    /// If the target exists or the rename fails.
    pub fn rename(&mut self) -> Result<bool> {
        let Some(name) = self.new_filename.clone() else {
            return Ok(false);
        };
        let target = self.dirname().join(&name);
        if target.exists() {
            return Err(Error::AlreadyExists(target));
        }
        fs::rename(&self.path, &target).map_err(|source| Error::RenameFailed {
            from: self.path.clone(),
            to: target.clone(),
            source,
        })?;
        debug!("Renamed {} to {}", self.path.display(), target.display());
        self.path = target;
        self.new_filename = None;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameType;
    use crate::tag::id3v1::Id3v1Tag;
    use crate::tag::xiph::XiphComment;

    fn flac(tag_v2: Option<RawTag>) -> TaggedFile {
        TaggedFile::from_contents(
            "/music/Muse/01 Hysteria.flac",
            FileContents {
                format: FileFormat::Flac,
                tag_v1: None,
                tag_v2,
                detail: DetailInfo::default(),
            },
        )
    }

    fn mp3() -> TaggedFile {
        TaggedFile::from_contents(
            "/music/a.mp3",
            FileContents {
                format: FileFormat::Mpeg,
                tag_v1: Some(RawTag::Id3v1(Id3v1Tag::new())),
                tag_v2: None,
                detail: DetailInfo::default(),
            },
        )
    }

    #[test]
    fn missing_tag_is_none() {
        let file = flac(None);
        assert!(file.standard_tags(TagSlot::V2, &MapOptions::default()).is_none());
        assert!(file.standard_tags(TagSlot::V1, &MapOptions::default()).is_none());
    }

    #[test]
    fn tag_created_only_on_change() {
        let opts = MapOptions::default();
        let mut file = flac(None);

        assert!(!file.set_frames(TagSlot::V2, &FrameCollection::empty_standard(), &StandardTagsFilter::all(), &opts));
        assert!(!file.has_tag(TagSlot::V2));
        assert!(!file.is_changed());

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Artist, "Muse");
        assert!(file.set_frames(TagSlot::V2, &frames, &StandardTagsFilter::all(), &opts));
        assert_eq!(file.tag_format(TagSlot::V2), Some("Vorbis"));
        assert!(file.is_tag_changed(TagSlot::V2));
    }

    #[test]
    fn unsupported_slot_is_ignored() {
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "Hysteria");
        let mut file = flac(None);
        assert!(!file.set_frames(TagSlot::V1, &frames, &StandardTagsFilter::all(), &MapOptions::default()));
        assert!(!file.has_tag(TagSlot::V1));
    }

    #[test]
    fn remove_all_drops_the_tag() {
        let opts = MapOptions::default();
        let mut file = flac(Some(RawTag::Xiph(XiphComment::new())));
        assert!(file.remove_tags(TagSlot::V2, &StandardTagsFilter::all(), &opts));
        assert!(!file.has_tag(TagSlot::V2));

        let mut file = mp3();
        assert!(!file.remove_tags(TagSlot::V2, &StandardTagsFilter::all(), &opts));
        assert!(!file.is_changed());
    }

    #[test]
    fn filename_and_extension() {
        let mut file = flac(None);
        assert_eq!(file.filename(), "01 Hysteria.flac");
        assert_eq!(file.extension(), ".flac");
        assert_eq!(file.dirname(), Path::new("/music/Muse"));

        file.set_filename("01 Muse - Hysteria.flac");
        assert!(file.is_filename_changed());
        assert_eq!(file.filename(), "01 Muse - Hysteria.flac");

        file.set_filename("01 Hysteria.flac");
        assert!(!file.is_filename_changed());
    }
}
