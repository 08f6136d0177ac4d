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

//! Track data flowing through the export and import pipelines.

use std::collections::BTreeSet;
use std::time::Duration;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::file::{FileIndex, FileStore, TaggedFile};
use crate::model::{FrameCollection, FrameType};
use crate::tag::{TagSlot, TagVersion};

/// Frames of a track, optionally tied to a file of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackData {
    frames: FrameCollection,
    file: Option<FileIndex>,
}

impl TrackData {
    pub fn new(frames: FrameCollection) -> Self {
        Self { frames, file: None }
    }

    /// Reads the frames of a file from the tags selected by `version`.
    ///
    /// For [`TagVersion::V2V1`] fields missing or empty in tag 2 are taken
    /// from tag 1.
    pub fn from_file(store: &FileStore, idx: FileIndex, version: TagVersion) -> Self {
        Self {
            frames: read_frames(store, idx, version),
            file: Some(idx),
        }
    }

    pub fn frames(&self) -> &FrameCollection {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FrameCollection {
        &mut self.frames
    }

    pub fn into_frames(self) -> FrameCollection {
        self.frames
    }

    pub fn file_index(&self) -> Option<FileIndex> {
        self.file
    }

    pub fn tagged_file<'a>(&self, store: &'a FileStore) -> Option<&'a TaggedFile> {
        self.file.and_then(|idx| store.get(idx))
    }
}

fn read_frames(store: &FileStore, idx: FileIndex, version: TagVersion) -> FrameCollection {
    match version {
        TagVersion::V1 => store.frames(idx, TagSlot::V1).unwrap_or_default(),
        TagVersion::V2 => store.frames(idx, TagSlot::V2).unwrap_or_default(),
        TagVersion::V2V1 => {
            let mut frames = store.frames(idx, TagSlot::V2).unwrap_or_default();
            if let Some(v1) = store.frames(idx, TagSlot::V1) {
                frames.merge(&v1);
            }
            frames
        }
    }
}

/// A track of an import together with its imported duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTrackData {
    pub track: TrackData,
    pub import_duration: Option<Duration>,
    /// Disabled tracks are skipped when the import is applied.
    pub enabled: bool,
}

impl ImportTrackData {
    pub fn new(track: TrackData, import_duration: Option<Duration>) -> Self {
        Self {
            track,
            import_duration,
            enabled: true,
        }
    }

    /// Absolute difference between file and import duration, `None` if
    /// either is unknown.
    pub fn time_difference(&self, store: &FileStore) -> Option<Duration> {
        let file = self.track.tagged_file(store)?.duration().filter(|d| !d.is_zero())?;
        let import = self.import_duration.filter(|d| !d.is_zero())?;
        Some(file.abs_diff(import))
    }

    /// Lower case words of the file name without extension.
    pub fn filename_words(&self, store: &FileStore) -> BTreeSet<String> {
        let Some(file) = self.track.tagged_file(store) else {
            return BTreeSet::new();
        };
        let name = file.filename();
        let stem = match name.rfind('.') {
            Some(pos) if pos > 0 => &name[..pos],
            _ => name.as_str(),
        };
        lower_case_words(stem)
    }

    /// Lower case words of the title.
    pub fn title_words(&self) -> BTreeSet<String> {
        self.track
            .frames()
            .title()
            .map(|title| lower_case_words(&title))
            .unwrap_or_default()
    }
}

/// Splits `text` into lower case words made of letters only.
///
/// Accents are dropped and digits are removed without splitting the word.
fn lower_case_words(text: &str) -> BTreeSet<String> {
    let simplified: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_alphabetic() {
                Some(c)
            } else if c.is_numeric() {
                None
            } else {
                Some(' ')
            }
        })
        .collect();
    simplified.split_whitespace().map(str::to_string).collect()
}

/// Ordered tracks of an import, e.g. an album listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportTrackDataVector {
    pub tracks: Vec<ImportTrackData>,
    pub cover_art_url: Option<String>,
}

impl ImportTrackDataVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Album artist, from the first track or its file.
    pub fn artist(&self, store: &FileStore) -> String {
        self.first_value(store, FrameType::Artist)
    }

    pub fn album(&self, store: &FileStore) -> String {
        self.first_value(store, FrameType::Album)
    }

    fn first_value(&self, store: &FileStore, frame_type: FrameType) -> String {
        let Some(first) = self.tracks.first() else {
            return String::new();
        };
        let value = |frames: Option<FrameCollection>| {
            frames
                .and_then(|f| f.text(frame_type))
                .filter(|v| !v.is_empty())
        };
        value(Some(first.track.frames().clone()))
            .or_else(|| {
                let idx = first.track.file_index()?;
                value(store.frames(idx, TagSlot::V2)).or_else(|| value(store.frames(idx, TagSlot::V1)))
            })
            .unwrap_or_default()
    }

    /// Replaces the tracks with the tags of `files`.
    pub fn read_tags(&mut self, store: &FileStore, files: &[FileIndex], version: TagVersion) {
        self.tracks = files
            .iter()
            .map(|idx| ImportTrackData::new(TrackData::from_file(store, *idx, version), None))
            .collect();
        self.cover_art_url = None;
    }

    pub fn clear_data(&mut self) {
        self.tracks.clear();
        self.cover_art_url = None;
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_lower_case_letters() {
        let words = lower_case_words("01 Café_Noël - Don't Stop (Live)");
        let expected: BTreeSet<String> = ["cafe", "noel", "don", "t", "stop", "live"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn empty_title_has_no_words() {
        let track = ImportTrackData::new(TrackData::default(), None);
        assert!(track.title_words().is_empty());
    }

    #[test]
    fn title_words_come_from_frames() {
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "Time Is Running Out");
        let track = ImportTrackData::new(TrackData::new(frames), Some(Duration::from_secs(236)));
        assert!(track.title_words().contains("running"));
        assert_eq!(track.title_words().len(), 4);
    }
}
