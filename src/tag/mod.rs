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

//! Per-format tag models and their mapping onto [`FrameCollection`].
//!
//! Each format keeps its fields the way they are stored on disk. [`RawTag`]
//! dispatches over the closed set of formats and offers the one mapping API
//! the rest of the crate uses:
//!
//! * [`RawTag::standard_frames`] returns every standard field, empty if unset.
//! * [`RawTag::frames`] additionally returns every other frame the format
//!   carries.
//! * [`RawTag::set_frames`] writes the frames enabled by a filter. A present
//!   frame with an empty value removes the field, a frame that is not present
//!   leaves the field as it is.

pub mod ape;
pub mod encoding;
pub mod id3v1;
pub mod id3v2;
pub mod track;
pub mod xiph;

use std::fmt;

use crate::model::{Frame, FrameCollection, FrameType, StandardTagsFilter};

use self::ape::ApeTag;
use self::encoding::TextEncoding;
use self::id3v1::Id3v1Tag;
use self::id3v2::{Id3v2Tag, Id3v2Version};
use self::xiph::XiphComment;

/// One of the two tag slots of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagSlot {
    /// ID3v1.
    V1,
    /// ID3v2, Vorbis comment or APE.
    V2,
}

impl TagSlot {
    pub fn other(self) -> TagSlot {
        match self {
            TagSlot::V1 => TagSlot::V2,
            TagSlot::V2 => TagSlot::V1,
        }
    }
}

impl fmt::Display for TagSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSlot::V1 => f.write_str("1"),
            TagSlot::V2 => f.write_str("2"),
        }
    }
}

/// Which tags track data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagVersion {
    V1,
    V2,
    /// Tag 2 with missing or empty fields taken from tag 1.
    #[default]
    V2V1,
}

/// Options controlling how frames are mapped onto a particular tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOptions {
    /// Total number of tracks written after the track number, if enabled.
    pub total_tracks: Option<u32>,
    pub track_digits: usize,
    /// Encoding of newly created ID3v2 text frames.
    pub default_encoding: TextEncoding,
    /// Wide text is stored with the bytes of each UTF-16 unit swapped.
    pub mirrored_utf16: bool,
    /// Vorbis comment field holding the comment.
    pub comment_field: String,
    pub id3v2_version: Id3v2Version,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            total_tracks: None,
            track_digits: 1,
            default_encoding: TextEncoding::Latin1,
            mirrored_utf16: false,
            comment_field: "COMMENT".into(),
            id3v2_version: Id3v2Version::V3,
        }
    }
}

/// A tag as stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTag {
    Id3v1(Id3v1Tag),
    Id3v2(Id3v2Tag),
    Xiph(XiphComment),
    Ape(ApeTag),
}

impl RawTag {
    /// The seven standard fields, each present and empty if unset.
    pub fn standard_frames(&self, opts: &MapOptions) -> FrameCollection {
        let mut frames = FrameCollection::empty_standard();
        for frame in self.mapped_frames(opts).iter().filter(|f| f.frame_type().is_standard()) {
            frames.insert(frame.clone());
        }
        frames
    }

    /// The standard fields plus every other frame of the tag.
    pub fn frames(&self, opts: &MapOptions) -> FrameCollection {
        let mut frames = FrameCollection::empty_standard();
        for frame in self.mapped_frames(opts).iter() {
            frames.insert(frame.clone());
        }
        frames
    }

    fn mapped_frames(&self, opts: &MapOptions) -> FrameCollection {
        match self {
            RawTag::Id3v1(tag) => tag.frames(),
            RawTag::Id3v2(tag) => tag.frames(opts),
            RawTag::Xiph(tag) => tag.frames(opts),
            RawTag::Ape(tag) => tag.frames(),
        }
    }

    /// Writes the frames enabled in `filter`.
    ///
    /// # Returns
    ///
    /// `true` if the tag was modified.
    pub fn set_frames(
        &mut self,
        frames: &FrameCollection,
        filter: &StandardTagsFilter,
        opts: &MapOptions,
    ) -> bool {
        let before = self.clone();
        match self {
            RawTag::Id3v1(tag) => tag.set_frames(frames, filter),
            RawTag::Id3v2(tag) => tag.set_frames(frames, filter, opts),
            RawTag::Xiph(tag) => tag.set_frames(frames, filter, opts),
            RawTag::Ape(tag) => tag.set_frames(frames, filter, opts),
        }
        *self != before
    }

    /// Clears the standard fields enabled in `filter`.
    pub fn remove_frames(&mut self, filter: &StandardTagsFilter, opts: &MapOptions) -> bool {
        let cleared: FrameCollection = FrameType::STANDARD
            .into_iter()
            .filter(|t| filter.is_enabled(*t))
            .map(|t| Frame::text(t, ""))
            .collect();
        self.set_frames(&cleared, filter, opts)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawTag::Id3v1(tag) => tag.is_empty(),
            RawTag::Id3v2(tag) => tag.is_empty(),
            RawTag::Xiph(tag) => tag.is_empty(),
            RawTag::Ape(tag) => tag.is_empty(),
        }
    }

    /// Format name such as "ID3v1.1" or "Vorbis".
    pub fn format_name(&self) -> &'static str {
        match self {
            RawTag::Id3v1(tag) => tag.format_name(),
            RawTag::Id3v2(tag) => tag.format_name(),
            RawTag::Xiph(_) => "Vorbis",
            RawTag::Ape(_) => "APE",
        }
    }
}

/// Frames of `frames` which a write under `filter` has to touch.
///
/// Pictures are read-only.
pub(crate) fn writable_frames<'a>(
    frames: &'a FrameCollection,
    filter: &'a StandardTagsFilter,
) -> impl Iterator<Item = &'a Frame> {
    frames
        .iter()
        .filter(|f| f.frame_type() != FrameType::Picture && filter.is_enabled(f.frame_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StandardFields;

    fn all_formats() -> Vec<RawTag> {
        vec![
            RawTag::Id3v1(Id3v1Tag::new()),
            RawTag::Id3v2(Id3v2Tag::new(Id3v2Version::V4)),
            RawTag::Xiph(XiphComment::new()),
            RawTag::Ape(ApeTag::new()),
        ]
    }

    fn sample() -> FrameCollection {
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "Hysteria");
        frames.set_text(FrameType::Artist, "Muse");
        frames.set_text(FrameType::Album, "Absolution");
        frames.set_text(FrameType::Comment, "live");
        frames.set_number(FrameType::Year, 2003);
        frames.set_number(FrameType::Track, 8);
        frames.set_text(FrameType::Genre, "Rock");
        frames
    }

    #[test]
    fn standard_fields_round_trip_in_every_format() {
        let opts = MapOptions::default();
        for mut tag in all_formats() {
            assert!(tag.set_frames(&sample(), &StandardTagsFilter::all(), &opts));
            assert_eq!(tag.standard_frames(&opts), sample(), "{}", tag.format_name());
        }
    }

    #[test]
    fn empty_tag_reads_every_field_empty() {
        let opts = MapOptions::default();
        for tag in all_formats() {
            let frames = tag.standard_frames(&opts);
            assert_eq!(frames.len(), FrameType::STANDARD.len());
            assert!(frames.is_empty_or_inactive());
        }
    }

    #[test]
    fn excluded_field_is_left_alone_in_every_format() {
        let opts = MapOptions::default();
        let filter = StandardTagsFilter::without(StandardFields::COMMENT);
        for mut tag in all_formats() {
            tag.set_frames(&sample(), &StandardTagsFilter::all(), &opts);

            let mut update = FrameCollection::empty_standard();
            update.set_text(FrameType::Comment, "should not be written");
            tag.set_frames(&update, &filter, &opts);

            let frames = tag.standard_frames(&opts);
            assert_eq!(frames.comment().as_deref(), Some("live"), "{}", tag.format_name());
            assert_eq!(frames.title().as_deref(), Some(""));
        }
    }

    #[test]
    fn unchanged_write_reports_no_change() {
        let opts = MapOptions::default();
        for mut tag in all_formats() {
            tag.set_frames(&sample(), &StandardTagsFilter::all(), &opts);
            assert!(!tag.set_frames(&sample(), &StandardTagsFilter::all(), &opts));
        }
    }

    #[test]
    fn remove_frames_clears_enabled_fields_only() {
        let opts = MapOptions::default();
        let filter = StandardTagsFilter::new(StandardFields::TITLE | StandardFields::YEAR);
        for mut tag in all_formats() {
            tag.set_frames(&sample(), &StandardTagsFilter::all(), &opts);
            assert!(tag.remove_frames(&filter, &opts));

            let frames = tag.standard_frames(&opts);
            assert_eq!(frames.title().as_deref(), Some(""));
            assert_eq!(frames.year(), Some(0));
            assert_eq!(frames.artist().as_deref(), Some("Muse"));
        }
    }
}
