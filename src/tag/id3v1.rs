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

//! ID3v1 fixed field tag.

use crate::model::genre;
use crate::model::{FrameCollection, FrameType, StandardTagsFilter};

use super::writable_frames;

pub const TEXT_LEN: usize = 30;
pub const COMMENT_LEN: usize = 28;
pub const YEAR_LEN: usize = 4;

/// The seven fixed fields of the 128 byte trailer.
///
/// Track 0 and genre [`genre::NONE`] mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: u8,
    pub genre: u8,
}

impl Default for Id3v1Tag {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            year: String::new(),
            comment: String::new(),
            track: 0,
            genre: genre::NONE,
        }
    }
}

impl Id3v1Tag {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn frames(&self) -> FrameCollection {
        let mut frames = FrameCollection::new();
        let texts = [
            (FrameType::Title, &self.title),
            (FrameType::Artist, &self.artist),
            (FrameType::Album, &self.album),
            (FrameType::Comment, &self.comment),
        ];
        for (frame_type, text) in texts {
            if !text.is_empty() {
                frames.set_text(frame_type, text.as_str());
            }
        }
        if let Some(year) = super::track::parse_year(&self.year) {
            frames.set_number(FrameType::Year, year);
        }
        if self.track > 0 {
            frames.set_number(FrameType::Track, u32::from(self.track));
        }
        if let Some(name) = genre::name(self.genre) {
            frames.set_text(FrameType::Genre, name);
        }
        frames
    }

    /// Writes the enabled fields, truncating to the field sizes.
    ///
    /// A genre that is not in the genre table clears the genre.
    pub(super) fn set_frames(&mut self, frames: &FrameCollection, filter: &StandardTagsFilter) {
        for frame in writable_frames(frames, filter) {
            let value = frame.value();
            match frame.frame_type() {
                FrameType::Title => self.title = truncate(&value.to_text(), TEXT_LEN),
                FrameType::Artist => self.artist = truncate(&value.to_text(), TEXT_LEN),
                FrameType::Album => self.album = truncate(&value.to_text(), TEXT_LEN),
                FrameType::Comment => self.comment = truncate(&value.to_text(), COMMENT_LEN),
                FrameType::Year => {
                    self.year = match value.number() {
                        0 => String::new(),
                        year => truncate(&year.to_string(), YEAR_LEN),
                    }
                }
                FrameType::Track => self.track = u8::try_from(value.number()).unwrap_or(0),
                FrameType::Genre => {
                    let name = value.to_text();
                    self.genre = genre::number(&name).unwrap_or(genre::NONE);
                    if !name.is_empty() && self.genre == genre::NONE {
                        log::debug!("Genre '{name}' has no ID3v1 number, cleared");
                    }
                }
                _ => log::debug!("ID3v1 cannot store frame '{}'", frame.name()),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn format_name(&self) -> &'static str {
        if self.track > 0 { "ID3v1.1" } else { "ID3v1.0" }
    }
}

fn truncate(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StandardFields;

    fn filled() -> Id3v1Tag {
        Id3v1Tag {
            title: "Hysteria".into(),
            artist: "Muse".into(),
            album: "Absolution".into(),
            year: "2003".into(),
            comment: "ripped".into(),
            track: 8,
            genre: 17,
        }
    }

    #[test]
    fn reads_fixed_fields() {
        let frames = filled().frames();
        assert_eq!(frames.title().as_deref(), Some("Hysteria"));
        assert_eq!(frames.year(), Some(2003));
        assert_eq!(frames.track(), Some(8));
        assert_eq!(frames.genre().as_deref(), Some("Rock"));
    }

    #[test]
    fn truncates_long_values() {
        let mut tag = Id3v1Tag::new();
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "x".repeat(40));
        frames.set_text(FrameType::Comment, "y".repeat(40));
        frames.set_number(FrameType::Year, 123456);
        tag.set_frames(&frames, &StandardTagsFilter::all());

        assert_eq!(tag.title.chars().count(), TEXT_LEN);
        assert_eq!(tag.comment.chars().count(), COMMENT_LEN);
        assert_eq!(tag.year, "1234");
    }

    #[test]
    fn excluded_comment_stays_untouched() {
        let mut tag = filled();
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Comment, "overwritten");
        frames.set_text(FrameType::Title, "Time Is Running Out");
        tag.set_frames(&frames, &StandardTagsFilter::without(StandardFields::COMMENT));

        assert_eq!(tag.comment, "ripped");
        assert_eq!(tag.title, "Time Is Running Out");
    }

    #[test]
    fn unknown_genre_clears() {
        let mut tag = filled();
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Genre, "Math Rock Revival");
        tag.set_frames(&frames, &StandardTagsFilter::all());
        assert_eq!(tag.genre, genre::NONE);
    }

    #[test]
    fn format_name_depends_on_track() {
        let mut tag = filled();
        assert_eq!(tag.format_name(), "ID3v1.1");
        tag.track = 0;
        assert_eq!(tag.format_name(), "ID3v1.0");
        assert!(!tag.is_empty());
        assert!(Id3v1Tag::new().is_empty());
    }
}
