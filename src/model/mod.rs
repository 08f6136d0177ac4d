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

//! Canonical tag model.
//!
//! Every on-disk tag format is mapped onto the same ordered collection of
//! typed frames. The collection is also the unit of editing: a frame that is
//! present with an empty value means "clear this field", a frame that is not
//! present at all means "leave this field alone".
//!
//! # Sub-modules
//!
//! * [`filter`]: field masks selecting which standard fields an operation
//!   touches.
//! * [`genre`]: the numeric genre table shared by ID3v1 and ID3v2.
//! * [`aggregate`]: the "filter different" aggregate of a multi-file
//!   selection.

pub mod aggregate;
pub mod filter;
pub mod genre;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

pub use aggregate::FrameAggregate;
pub use filter::{StandardFields, StandardTagsFilter};

use crate::tag::track;

/// Type of a frame.
///
/// The first seven variants are the standard fields every tag format can
/// carry. The declaration order is the display order of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameType {
    Title,
    Artist,
    Album,
    Comment,
    Year,
    Track,
    Genre,
    AlbumArtist,
    Composer,
    Disc,
    Picture,
    Other,
}

impl FrameType {
    pub const STANDARD: [FrameType; 7] = [
        FrameType::Title,
        FrameType::Artist,
        FrameType::Album,
        FrameType::Comment,
        FrameType::Year,
        FrameType::Track,
        FrameType::Genre,
    ];

    pub fn is_standard(self) -> bool {
        Self::STANDARD.contains(&self)
    }

    /// Year and track are carried as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, FrameType::Year | FrameType::Track)
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            FrameType::Title => "Title",
            FrameType::Artist => "Artist",
            FrameType::Album => "Album",
            FrameType::Comment => "Comment",
            FrameType::Year => "Year",
            FrameType::Track => "Track Number",
            FrameType::Genre => "Genre",
            FrameType::AlbumArtist => "Album Artist",
            FrameType::Composer => "Composer",
            FrameType::Disc => "Disc Number",
            FrameType::Picture => "Picture",
            FrameType::Other => "Other",
        }
    }

    /// Name used by the `%{name}` format codes.
    pub fn code_name(self) -> &'static str {
        match self {
            FrameType::Title => "title",
            FrameType::Artist => "artist",
            FrameType::Album => "album",
            FrameType::Comment => "comment",
            FrameType::Year => "year",
            FrameType::Track => "track",
            FrameType::Genre => "genre",
            FrameType::AlbumArtist => "albumartist",
            FrameType::Composer => "composer",
            FrameType::Disc => "disc",
            FrameType::Picture => "picture",
            FrameType::Other => "",
        }
    }

    pub fn from_code_name(name: &str) -> Option<FrameType> {
        let name = name.to_lowercase();
        [
            FrameType::Title,
            FrameType::Artist,
            FrameType::Album,
            FrameType::Comment,
            FrameType::Year,
            FrameType::Track,
            FrameType::Genre,
            FrameType::AlbumArtist,
            FrameType::Composer,
            FrameType::Disc,
            FrameType::Picture,
        ]
        .into_iter()
        .find(|t| t.code_name() == name)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value carried by a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameValue {
    Text(String),
    Number(u32),
    Binary(Vec<u8>),
}

impl FrameValue {
    /// Empty text, zero and an empty blob all mean "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            FrameValue::Text(s) => s.is_empty(),
            FrameValue::Number(n) => *n == 0,
            FrameValue::Binary(data) => data.is_empty(),
        }
    }

    /// Textual representation, empty for zero and for binary data.
    pub fn to_text(&self) -> String {
        match self {
            FrameValue::Text(s) => s.clone(),
            FrameValue::Number(0) => String::new(),
            FrameValue::Number(n) => n.to_string(),
            FrameValue::Binary(_) => String::new(),
        }
    }

    /// Numeric representation, 0 if there is none.
    ///
    /// Text in "N/total" form yields N.
    pub fn number(&self) -> u32 {
        match self {
            FrameValue::Number(n) => *n,
            FrameValue::Text(s) => track::split_track_number(s).0.unwrap_or(0),
            FrameValue::Binary(_) => 0,
        }
    }
}

impl fmt::Display for FrameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameValue::Binary(data) => write!(f, "<{} bytes>", data.len()),
            other => f.write_str(&other.to_text()),
        }
    }
}

/// Identity of a frame inside a collection.
///
/// Custom frames are keyed by their name, every other type is unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameKey {
    pub frame_type: FrameType,
    pub name: String,
}

impl FrameKey {
    pub fn of(frame_type: FrameType) -> Self {
        Self {
            frame_type,
            name: String::new(),
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            frame_type: FrameType::Other,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    key: FrameKey,
    value: FrameValue,
}

impl Frame {
    pub fn new(frame_type: FrameType, value: FrameValue) -> Self {
        Self {
            key: FrameKey::of(frame_type),
            value,
        }
    }

    pub fn text(frame_type: FrameType, text: impl Into<String>) -> Self {
        Self::new(frame_type, FrameValue::Text(text.into()))
    }

    pub fn number(frame_type: FrameType, number: u32) -> Self {
        Self::new(frame_type, FrameValue::Number(number))
    }

    /// A custom frame with a free-form name.
    pub fn other(name: impl Into<String>, value: FrameValue) -> Self {
        Self {
            key: FrameKey::other(name),
            value,
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.key.frame_type
    }

    /// Custom name for [`FrameType::Other`], the type name otherwise.
    pub fn name(&self) -> &str {
        if self.key.frame_type == FrameType::Other {
            &self.key.name
        } else {
            self.key.frame_type.name()
        }
    }

    pub fn key(&self) -> &FrameKey {
        &self.key
    }

    pub fn value(&self) -> &FrameValue {
        &self.value
    }

    pub fn set_value(&mut self, value: FrameValue) {
        self.value = value;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Ordered set of frames forming one tag of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCollection {
    frames: BTreeMap<FrameKey, Frame>,
}

impl FrameCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection containing every standard field with an empty value.
    ///
    /// This is what reading an existing but empty tag yields.
    pub fn empty_standard() -> Self {
        FrameType::STANDARD
            .into_iter()
            .map(|t| {
                if t.is_numeric() {
                    Frame::number(t, 0)
                } else {
                    Frame::text(t, "")
                }
            })
            .collect()
    }

    /// Inserts a frame, replacing the frame with the same key.
    pub fn insert(&mut self, frame: Frame) -> Option<Frame> {
        self.frames.insert(frame.key.clone(), frame)
    }

    pub fn get(&self, frame_type: FrameType) -> Option<&Frame> {
        self.frames.get(&FrameKey::of(frame_type))
    }

    pub fn get_other(&self, name: &str) -> Option<&Frame> {
        self.frames.get(&FrameKey::other(name))
    }

    pub fn get_key(&self, key: &FrameKey) -> Option<&Frame> {
        self.frames.get(key)
    }

    pub fn value(&self, frame_type: FrameType) -> Option<&FrameValue> {
        self.get(frame_type).map(Frame::value)
    }

    pub fn text(&self, frame_type: FrameType) -> Option<String> {
        self.value(frame_type).map(FrameValue::to_text)
    }

    pub fn number(&self, frame_type: FrameType) -> Option<u32> {
        self.value(frame_type).map(FrameValue::number)
    }

    pub fn set_text(&mut self, frame_type: FrameType, text: impl Into<String>) {
        self.insert(Frame::text(frame_type, text));
    }

    pub fn set_number(&mut self, frame_type: FrameType, number: u32) {
        self.insert(Frame::number(frame_type, number));
    }

    pub fn remove(&mut self, frame_type: FrameType) -> Option<Frame> {
        self.frames.remove(&FrameKey::of(frame_type))
    }

    pub fn remove_key(&mut self, key: &FrameKey) -> Option<Frame> {
        self.frames.remove(key)
    }

    pub fn contains(&self, frame_type: FrameType) -> bool {
        self.frames.contains_key(&FrameKey::of(frame_type))
    }

    pub fn iter(&self) -> btree_map::Values<'_, FrameKey, Frame> {
        self.frames.values()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, FrameKey, Frame> {
        self.frames.keys()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True if no frame carries a value.
    pub fn is_empty_or_inactive(&self) -> bool {
        self.frames.values().all(Frame::is_empty)
    }

    /// Fills frames which are missing or empty here from `other`.
    pub fn merge(&mut self, other: &FrameCollection) {
        for frame in other.iter() {
            let missing = self.get_key(frame.key()).is_none_or(Frame::is_empty);
            if missing {
                self.insert(frame.clone());
            }
        }
    }

    /// Copies the frames of `other` which are enabled in `filter`.
    pub fn copy_enabled(&mut self, other: &FrameCollection, filter: &StandardTagsFilter) {
        for frame in other.iter().filter(|f| filter.is_enabled(f.frame_type())) {
            self.insert(frame.clone());
        }
    }

    /// Drops every frame not enabled in `filter`.
    pub fn retain_enabled(&mut self, filter: &StandardTagsFilter) {
        self.frames.retain(|key, _| filter.is_enabled(key.frame_type));
    }

    pub fn title(&self) -> Option<String> {
        self.text(FrameType::Title)
    }

    pub fn artist(&self) -> Option<String> {
        self.text(FrameType::Artist)
    }

    pub fn album(&self) -> Option<String> {
        self.text(FrameType::Album)
    }

    pub fn comment(&self) -> Option<String> {
        self.text(FrameType::Comment)
    }

    pub fn year(&self) -> Option<u32> {
        self.number(FrameType::Year)
    }

    pub fn track(&self) -> Option<u32> {
        self.number(FrameType::Track)
    }

    pub fn genre(&self) -> Option<String> {
        self.text(FrameType::Genre)
    }
}

impl FromIterator<Frame> for FrameCollection {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let mut frames = FrameCollection::new();
        for frame in iter {
            frames.insert(frame);
        }
        frames
    }
}

impl<'a> IntoIterator for &'a FrameCollection {
    type Item = &'a Frame;
    type IntoIter = btree_map::Values<'a, FrameKey, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_frame_of_same_type() {
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "First");
        frames.set_text(FrameType::Title, "Second");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames.title().as_deref(), Some("Second"));
    }

    #[test]
    fn custom_frames_key_on_name() {
        let mut frames = FrameCollection::new();
        frames.insert(Frame::other("MOOD", FrameValue::Text("calm".into())));
        frames.insert(Frame::other("LABEL", FrameValue::Text("Warp".into())));
        frames.insert(Frame::other("MOOD", FrameValue::Text("angry".into())));

        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames.get_other("MOOD").map(|f| f.value().to_text()).as_deref(),
            Some("angry")
        );
    }

    #[test]
    fn iteration_follows_type_order() {
        let frames: FrameCollection = [
            Frame::text(FrameType::Genre, "Rock"),
            Frame::text(FrameType::Title, "Hysteria"),
            Frame::number(FrameType::Track, 3),
        ]
        .into_iter()
        .collect();

        let types: Vec<_> = frames.iter().map(Frame::frame_type).collect();
        assert_eq!(types, [FrameType::Title, FrameType::Track, FrameType::Genre]);
    }

    #[test]
    fn merge_fills_missing_and_empty_frames_only() {
        let mut v2 = FrameCollection::empty_standard();
        v2.set_text(FrameType::Title, "Hysteria");

        let mut v1 = FrameCollection::empty_standard();
        v1.set_text(FrameType::Title, "Hysteri");
        v1.set_text(FrameType::Artist, "Muse");
        v1.set_number(FrameType::Year, 2003);

        v2.merge(&v1);
        assert_eq!(v2.title().as_deref(), Some("Hysteria"));
        assert_eq!(v2.artist().as_deref(), Some("Muse"));
        assert_eq!(v2.year(), Some(2003));
    }

    #[test]
    fn numeric_text_values() {
        assert_eq!(FrameValue::Text("5/12".into()).number(), 5);
        assert_eq!(FrameValue::Text("".into()).number(), 0);
        assert_eq!(FrameValue::Number(0).to_text(), "");
        assert!(FrameValue::Number(0).is_empty());
        assert!(!FrameValue::Number(7).is_empty());
    }

    #[test]
    fn empty_standard_is_inactive() {
        let frames = FrameCollection::empty_standard();
        assert_eq!(frames.len(), FrameType::STANDARD.len());
        assert!(frames.is_empty_or_inactive());
    }

    #[test]
    fn code_names_round_trip() {
        for t in FrameType::STANDARD {
            assert_eq!(FrameType::from_code_name(t.code_name()), Some(t));
        }
        assert_eq!(FrameType::from_code_name("AlbumArtist"), Some(FrameType::AlbumArtist));
        assert_eq!(FrameType::from_code_name("nonexistent"), None);
    }
}
