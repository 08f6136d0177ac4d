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

//! ID3v2 frame tag.
//!
//! Frames are held as they are stored in the file, including their text
//! encoding. Frames the mapping does not understand are carried along
//! untouched so that writing the tag back does not lose them.

use serde::{Deserialize, Serialize};

use crate::model::genre;
use crate::model::{Frame, FrameCollection, FrameType, FrameValue, StandardTagsFilter};

use super::encoding::{StoredText, TextEncoding};
use super::track::{join_track_number, parse_year, split_track_number};
use super::{MapOptions, writable_frames};

const COMMENT_ID: &str = "COMM";
const USER_TEXT_ID: &str = "TXXX";
const PICTURE_ID: &str = "APIC";
pub const YEAR_IDS: [&str; 2] = ["TYER", "TDRC"];
const COMMENT_LANGUAGE: &str = "eng";

/// Text frames with a fixed frame type.
const TEXT_FRAME_IDS: [(FrameType, &str); 8] = [
    (FrameType::Title, "TIT2"),
    (FrameType::Artist, "TPE1"),
    (FrameType::Album, "TALB"),
    (FrameType::Track, "TRCK"),
    (FrameType::Genre, "TCON"),
    (FrameType::AlbumArtist, "TPE2"),
    (FrameType::Composer, "TCOM"),
    (FrameType::Disc, "TPOS"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Id3v2Version {
    V2,
    #[default]
    V3,
    V4,
}

impl Id3v2Version {
    /// Frame holding the year, TDRC replaced TYER in ID3v2.4.
    pub fn year_frame_id(self) -> &'static str {
        match self {
            Id3v2Version::V4 => "TDRC",
            _ => "TYER",
        }
    }

    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(Id3v2Version::V2),
            3 => Some(Id3v2Version::V3),
            4 => Some(Id3v2Version::V4),
            _ => None,
        }
    }

    pub fn format_name(self) -> &'static str {
        match self {
            Id3v2Version::V2 => "ID3v2.2",
            Id3v2Version::V3 => "ID3v2.3",
            Id3v2Version::V4 => "ID3v2.4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    Text(StoredText),
    Comment {
        language: String,
        description: String,
        text: StoredText,
    },
    UserText {
        description: String,
        value: StoredText,
    },
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Frame {
    pub id: String,
    pub encoding: TextEncoding,
    pub content: FrameContent,
}

impl Id3v2Frame {
    pub fn text(id: impl Into<String>, encoding: TextEncoding, text: impl Into<StoredText>) -> Self {
        Self {
            id: id.into(),
            encoding,
            content: FrameContent::Text(text.into()),
        }
    }

    pub fn comment(encoding: TextEncoding, description: &str, text: impl Into<StoredText>) -> Self {
        Self {
            id: COMMENT_ID.into(),
            encoding,
            content: FrameContent::Comment {
                language: COMMENT_LANGUAGE.into(),
                description: description.into(),
                text: text.into(),
            },
        }
    }

    pub fn user_text(encoding: TextEncoding, description: &str, value: impl Into<StoredText>) -> Self {
        Self {
            id: USER_TEXT_ID.into(),
            encoding,
            content: FrameContent::UserText {
                description: description.into(),
                value: value.into(),
            },
        }
    }

    fn is_main_comment(&self) -> bool {
        self.id == COMMENT_ID
            && matches!(&self.content, FrameContent::Comment { description, .. } if description.is_empty())
    }

    fn is_user_text(&self, name: &str) -> bool {
        matches!(&self.content, FrameContent::UserText { description, .. } if description == name)
    }

    /// The text payload, `None` for binary frames.
    fn stored_text(&self) -> Option<&StoredText> {
        match &self.content {
            FrameContent::Text(text) => Some(text),
            FrameContent::Comment { text, .. } => Some(text),
            FrameContent::UserText { value, .. } => Some(value),
            FrameContent::Binary(_) => None,
        }
    }

    fn set_stored_text(&mut self, stored: StoredText) {
        match &mut self.content {
            FrameContent::Text(text) => *text = stored,
            FrameContent::Comment { text, .. } => *text = stored,
            FrameContent::UserText { value, .. } => *value = stored,
            FrameContent::Binary(_) => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v2Tag {
    pub version: Id3v2Version,
    pub frames: Vec<Id3v2Frame>,
}

impl Id3v2Tag {
    pub fn new(version: Id3v2Version) -> Self {
        Self {
            version,
            frames: Vec::new(),
        }
    }

    pub fn frame(&self, id: &str) -> Option<&Id3v2Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub(super) fn frames(&self, opts: &MapOptions) -> FrameCollection {
        let mut frames = FrameCollection::new();
        for frame in &self.frames {
            if let Some(mapped) = map_frame(frame, opts)
                && frames.get_key(mapped.key()).is_none()
            {
                frames.insert(mapped);
            }
        }
        frames
    }

    pub(super) fn set_frames(
        &mut self,
        frames: &FrameCollection,
        filter: &StandardTagsFilter,
        opts: &MapOptions,
    ) {
        for frame in writable_frames(frames, filter) {
            let value = frame.value();
            match frame.frame_type() {
                FrameType::Comment => {
                    self.set_text(|f| f.is_main_comment(), &value.to_text(), opts, |enc, text| {
                        Id3v2Frame::comment(enc, "", text)
                    });
                }
                FrameType::Year => {
                    let id = self.version.year_frame_id();
                    self.frames
                        .retain(|f| f.id == id || !YEAR_IDS.contains(&f.id.as_str()));
                    self.set_text_frame(id, &value.to_text(), opts);
                }
                FrameType::Track => {
                    let text = join_track_number(value.number(), opts.total_tracks, opts.track_digits);
                    self.set_text_frame("TRCK", &text, opts);
                }
                FrameType::Other if is_text_frame_id(frame.name()) => {
                    self.set_text_frame(frame.name(), &value.to_text(), opts);
                }
                FrameType::Other => {
                    let name = frame.name().to_string();
                    self.set_text(|f| f.is_user_text(&name), &value.to_text(), opts, |enc, text| {
                        Id3v2Frame::user_text(enc, &name, text)
                    });
                }
                frame_type => {
                    if let Some((_, id)) = TEXT_FRAME_IDS.iter().find(|(t, _)| *t == frame_type) {
                        self.set_text_frame(id, &value.to_text(), opts);
                    }
                }
            }
        }
    }

    fn set_text_frame(&mut self, id: &str, text: &str, opts: &MapOptions) {
        self.set_text(
            |f| f.id == id && matches!(f.content, FrameContent::Text(_)),
            text,
            opts,
            |enc, text| Id3v2Frame::text(id, enc, text),
        );
    }

    /// Sets the text of the first frame matching `is_target`.
    ///
    /// Empty text removes every matching frame. An existing frame keeps its
    /// encoding unless the text needs a wider one, a new frame is created by
    /// `create` with the default encoding.
    fn set_text<P, C>(&mut self, is_target: P, text: &str, opts: &MapOptions, create: C)
    where
        P: Fn(&Id3v2Frame) -> bool,
        C: FnOnce(TextEncoding, StoredText) -> Id3v2Frame,
    {
        if text.is_empty() {
            self.frames.retain(|f| !is_target(f));
            return;
        }
        match self.frames.iter_mut().find(|f| is_target(f)) {
            Some(frame) => {
                let encoding = frame.encoding.for_text(text);
                if encoding != frame.encoding {
                    log::debug!("Frame {} upgraded from {} to {}", frame.id, frame.encoding, encoding);
                }
                frame.encoding = encoding;
                frame.set_stored_text(encode(text, encoding, opts));
            }
            None => {
                let encoding = opts.default_encoding.for_text(text);
                self.frames.push(create(encoding, encode(text, encoding, opts)));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn format_name(&self) -> &'static str {
        self.version.format_name()
    }
}

fn map_frame(frame: &Id3v2Frame, opts: &MapOptions) -> Option<Frame> {
    let text = || decode(frame, opts);
    match &frame.content {
        FrameContent::Text(_) if YEAR_IDS.contains(&frame.id.as_str()) => Some(Frame::number(
            FrameType::Year,
            parse_year(&text()).unwrap_or(0),
        )),
        FrameContent::Text(_) => {
            let frame_type = TEXT_FRAME_IDS
                .iter()
                .find(|(_, id)| *id == frame.id)
                .map(|(t, _)| *t);
            Some(match frame_type {
                Some(FrameType::Track) => {
                    Frame::number(FrameType::Track, split_track_number(&text()).0.unwrap_or(0))
                }
                Some(FrameType::Genre) => {
                    Frame::text(FrameType::Genre, genre::parse_id3v2(&text()))
                }
                Some(frame_type) => Frame::text(frame_type, text()),
                None => Frame::other(frame.id.clone(), FrameValue::Text(text())),
            })
        }
        FrameContent::Comment { .. } if frame.is_main_comment() => {
            Some(Frame::text(FrameType::Comment, text()))
        }
        FrameContent::UserText { description, .. } => {
            Some(Frame::other(description.clone(), FrameValue::Text(text())))
        }
        FrameContent::Binary(data) if frame.id == PICTURE_ID => {
            Some(Frame::new(FrameType::Picture, FrameValue::Binary(data.clone())))
        }
        _ => None,
    }
}

/// True for the ID of a standard text information frame.
fn is_text_frame_id(name: &str) -> bool {
    name.len() == 4
        && name.starts_with('T')
        && name != USER_TEXT_ID
        && name.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

fn decode(frame: &Id3v2Frame, opts: &MapOptions) -> String {
    frame
        .stored_text()
        .map(|text| text.decode(opts.mirrored_utf16 && frame.encoding.is_utf16()))
        .unwrap_or_default()
}

fn encode(text: &str, encoding: TextEncoding, opts: &MapOptions) -> StoredText {
    StoredText::encode(text, opts.mirrored_utf16 && encoding.is_utf16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StandardFields;

    fn read(tag: &Id3v2Tag) -> FrameCollection {
        tag.frames(&MapOptions::default())
    }

    fn write(tag: &mut Id3v2Tag, frames: &FrameCollection, opts: &MapOptions) {
        tag.set_frames(frames, &StandardTagsFilter::all(), opts);
    }

    #[test]
    fn maps_known_frames() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames = vec![
            Id3v2Frame::text("TIT2", TextEncoding::Latin1, "Hysteria"),
            Id3v2Frame::text("TRCK", TextEncoding::Latin1, "8/14"),
            Id3v2Frame::text("TCON", TextEncoding::Latin1, "(17)"),
            Id3v2Frame::text("TYER", TextEncoding::Latin1, "2003"),
            Id3v2Frame::text("TMOO", TextEncoding::Latin1, "dark"),
            Id3v2Frame::comment(TextEncoding::Latin1, "", "great"),
            Id3v2Frame::comment(TextEncoding::Latin1, "iTunNORM", "0000"),
            Id3v2Frame::user_text(TextEncoding::Utf8, "CATALOG", "MUSH1"),
        ];

        let frames = read(&tag);
        assert_eq!(frames.title().as_deref(), Some("Hysteria"));
        assert_eq!(frames.track(), Some(8));
        assert_eq!(frames.genre().as_deref(), Some("Rock"));
        assert_eq!(frames.year(), Some(2003));
        assert_eq!(frames.comment().as_deref(), Some("great"));
        assert!(frames.get_other("TMOO").is_some());
        assert!(frames.get_other("CATALOG").is_some());
        assert!(frames.get_other("iTunNORM").is_none());
    }

    #[test]
    fn round_trip_with_all_fields() {
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "Hysteria");
        frames.set_text(FrameType::Artist, "Muse");
        frames.set_text(FrameType::Album, "Absolution");
        frames.set_text(FrameType::Comment, "great");
        frames.set_number(FrameType::Year, 2003);
        frames.set_number(FrameType::Track, 8);
        frames.set_text(FrameType::Genre, "Rock");

        for version in [Id3v2Version::V3, Id3v2Version::V4] {
            let mut tag = Id3v2Tag::new(version);
            write(&mut tag, &frames, &MapOptions::default());
            assert_eq!(read(&tag), frames);
        }
    }

    #[test]
    fn track_total_is_written_and_dropped_on_read() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V4);
        let mut frames = FrameCollection::new();
        frames.set_number(FrameType::Track, 5);
        let opts = MapOptions {
            total_tracks: Some(12),
            ..MapOptions::default()
        };
        write(&mut tag, &frames, &opts);

        assert_eq!(
            tag.frame("TRCK").map(|f| &f.content),
            Some(&FrameContent::Text("5/12".into()))
        );
        assert_eq!(read(&tag).track(), Some(5));
    }

    #[test]
    fn latin1_frame_is_upgraded_for_wide_text() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames.push(Id3v2Frame::text("TPE1", TextEncoding::Latin1, "Muse"));

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Artist, "Мумий Тролль");
        write(&mut tag, &frames, &MapOptions::default());

        assert_eq!(tag.frame("TPE1").map(|f| f.encoding), Some(TextEncoding::Utf16));
        assert_eq!(read(&tag).artist().as_deref(), Some("Мумий Тролль"));
    }

    #[test]
    fn latin1_text_keeps_encoding() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames.push(Id3v2Frame::text("TPE1", TextEncoding::Latin1, "Muse"));

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Artist, "Björk");
        write(&mut tag, &frames, &MapOptions::default());

        assert_eq!(tag.frame("TPE1").map(|f| f.encoding), Some(TextEncoding::Latin1));
    }

    #[test]
    fn empty_value_removes_and_absent_value_keeps() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames = vec![
            Id3v2Frame::text("TIT2", TextEncoding::Latin1, "Hysteria"),
            Id3v2Frame::text("TALB", TextEncoding::Latin1, "Absolution"),
        ];

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Title, "");
        write(&mut tag, &frames, &MapOptions::default());

        assert!(tag.frame("TIT2").is_none());
        assert!(tag.frame("TALB").is_some());
    }

    #[test]
    fn partial_filter_skips_excluded_and_custom_frames() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames.push(Id3v2Frame::comment(TextEncoding::Latin1, "", "keep me"));

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Comment, "changed");
        frames.insert(Frame::other("MOOD", FrameValue::Text("calm".into())));
        tag.set_frames(
            &frames,
            &StandardTagsFilter::without(StandardFields::COMMENT),
            &MapOptions::default(),
        );

        assert_eq!(read(&tag).comment().as_deref(), Some("keep me"));
        assert!(read(&tag).get_other("MOOD").is_none());
    }

    #[test]
    fn mirrored_utf16_is_corrected() {
        let opts = MapOptions {
            mirrored_utf16: true,
            ..MapOptions::default()
        };
        let mirrored: Vec<u16> = "Crème brûlée Über ß Ø"
            .encode_utf16()
            .map(u16::swap_bytes)
            .collect();
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        tag.frames.push(Id3v2Frame::text("TIT2", TextEncoding::Utf16, StoredText::Utf16(mirrored)));

        assert_eq!(tag.frames(&opts).title().as_deref(), Some("Crème brûlée Über ß Ø"));

        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Album, "Straße nach Øresund");
        frames.set_text(FrameType::Title, "Über ß Ø");
        tag.set_frames(&frames, &StandardTagsFilter::all(), &opts);
        assert_eq!(tag.frames(&opts).album().as_deref(), Some("Straße nach Øresund"));
        assert_eq!(tag.frames(&opts).title().as_deref(), Some("Über ß Ø"));
    }

    #[test]
    fn mirrored_write_stores_swapped_units() {
        let opts = MapOptions {
            mirrored_utf16: true,
            default_encoding: TextEncoding::Utf16,
            ..MapOptions::default()
        };
        let mut tag = Id3v2Tag::new(Id3v2Version::V3);
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Artist, "Ü");
        tag.set_frames(&frames, &StandardTagsFilter::all(), &opts);

        assert_eq!(
            tag.frame("TPE1").map(|f| &f.content),
            Some(&FrameContent::Text(StoredText::Utf16(vec![0xdc00])))
        );
        assert_eq!(tag.frames(&opts).artist().as_deref(), Some("Ü"));
    }

    #[test]
    fn year_frame_follows_version() {
        let mut tag = Id3v2Tag::new(Id3v2Version::V4);
        tag.frames.push(Id3v2Frame::text("TYER", TextEncoding::Latin1, "1999"));

        let mut frames = FrameCollection::new();
        frames.set_number(FrameType::Year, 2001);
        write(&mut tag, &frames, &MapOptions::default());

        assert!(tag.frame("TYER").is_none());
        assert_eq!(read(&tag).year(), Some(2001));
    }
}
