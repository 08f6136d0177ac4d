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

//! Xiph comment (Vorbis comment) tag used by Ogg and FLAC.
//!
//! Field names are case-insensitive. The track number and the total number
//! of tracks live in two separate fields.

use crate::model::{Frame, FrameCollection, FrameType, FrameValue, StandardTagsFilter};

use super::track::{join_track_number, parse_year, split_track_number};
use super::{MapOptions, writable_frames};

const TRACK_NUMBER: &str = "TRACKNUMBER";
const TRACK_TOTAL: &str = "TRACKTOTAL";
const TOTAL_TRACKS: &str = "TOTALTRACKS";
const DATE: &str = "DATE";
const DESCRIPTION: &str = "DESCRIPTION";

/// Fields mapped onto plain text frame types.
const TEXT_FIELDS: [(FrameType, &str); 7] = [
    (FrameType::Title, "TITLE"),
    (FrameType::Artist, "ARTIST"),
    (FrameType::Album, "ALBUM"),
    (FrameType::Genre, "GENRE"),
    (FrameType::AlbumArtist, "ALBUMARTIST"),
    (FrameType::Composer, "COMPOSER"),
    (FrameType::Disc, "DISCNUMBER"),
];

/// Binary or structural fields which are never shown as custom frames.
const HIDDEN_FIELDS: [&str; 4] = [TRACK_TOTAL, TOTAL_TRACKS, "METADATA_BLOCK_PICTURE", "COVERART"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XiphComment {
    pub vendor: String,
    pub fields: Vec<(String, String)>,
}

impl XiphComment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every value of `key` by `value`, empty removes the field.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.remove(key);
            return;
        }
        match self.fields.iter().position(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(index) => {
                self.fields[index].1 = value.to_string();
                let mut seen = 0;
                self.fields.retain(|(k, _)| {
                    if k.eq_ignore_ascii_case(key) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.fields.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
    }

    pub(super) fn frames(&self, opts: &MapOptions) -> FrameCollection {
        let mut frames = FrameCollection::new();
        for (key, value) in &self.fields {
            let upper = key.to_ascii_uppercase();
            let frame = if let Some((frame_type, _)) = TEXT_FIELDS.iter().find(|(_, k)| *k == upper) {
                Frame::text(*frame_type, value.as_str())
            } else if upper.eq_ignore_ascii_case(&opts.comment_field) {
                Frame::text(FrameType::Comment, value.as_str())
            } else if upper == DESCRIPTION && self.get(&opts.comment_field).is_none() {
                Frame::text(FrameType::Comment, value.as_str())
            } else if upper == DATE {
                Frame::number(FrameType::Year, parse_year(value).unwrap_or(0))
            } else if upper == TRACK_NUMBER {
                Frame::number(FrameType::Track, split_track_number(value).0.unwrap_or(0))
            } else if HIDDEN_FIELDS.contains(&upper.as_str()) {
                continue;
            } else {
                Frame::other(key.clone(), FrameValue::Text(value.clone()))
            };
            if frames.get_key(frame.key()).is_none() {
                frames.insert(frame);
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
                FrameType::Comment => self.set(&opts.comment_field, &value.to_text()),
                FrameType::Year => self.set(DATE, &value.to_text()),
                FrameType::Track => {
                    let number = value.number();
                    self.set(TRACK_NUMBER, &join_track_number(number, None, opts.track_digits));
                    match opts.total_tracks {
                        Some(total) if number > 0 && total > 0 => {
                            let digits = opts.track_digits;
                            self.set(TRACK_TOTAL, &format!("{total:0digits$}"));
                        }
                        _ if number == 0 => self.remove(TRACK_TOTAL),
                        _ => {}
                    }
                }
                FrameType::Other => self.set(frame.name(), &value.to_text()),
                frame_type => {
                    if let Some((_, key)) = TEXT_FIELDS.iter().find(|(t, _)| *t == frame_type) {
                        self.set(key, &value.to_text());
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(fields: &[(&str, &str)]) -> XiphComment {
        XiphComment {
            vendor: "Xiph.Org libVorbis I 20200704".into(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn keys_are_case_insensitive() {
        let tag = comment(&[("title", "Hysteria"), ("Artist", "Muse"), ("date", "2003-09-15")]);
        let frames = tag.frames(&MapOptions::default());

        assert_eq!(frames.title().as_deref(), Some("Hysteria"));
        assert_eq!(frames.artist().as_deref(), Some("Muse"));
        assert_eq!(frames.year(), Some(2003));
    }

    #[test]
    fn description_is_comment_fallback() {
        let tag = comment(&[("DESCRIPTION", "from description")]);
        assert_eq!(
            tag.frames(&MapOptions::default()).comment().as_deref(),
            Some("from description")
        );

        let tag = comment(&[("DESCRIPTION", "ignored"), ("COMMENT", "real")]);
        assert_eq!(tag.frames(&MapOptions::default()).comment().as_deref(), Some("real"));
    }

    #[test]
    fn track_total_goes_to_separate_field() {
        let mut tag = XiphComment::new();
        let mut frames = FrameCollection::new();
        frames.set_number(FrameType::Track, 5);
        let opts = MapOptions {
            total_tracks: Some(12),
            ..MapOptions::default()
        };
        tag.set_frames(&frames, &StandardTagsFilter::all(), &opts);

        assert_eq!(tag.get(TRACK_NUMBER), Some("5"));
        assert_eq!(tag.get(TRACK_TOTAL), Some("12"));
        let read = tag.frames(&opts);
        assert_eq!(read.track(), Some(5));
        assert!(read.get_other(TRACK_TOTAL).is_none());
    }

    #[test]
    fn set_collapses_duplicate_fields() {
        let mut tag = comment(&[("ARTIST", "A"), ("OTHER", "x"), ("artist", "B")]);
        tag.set("Artist", "C");
        assert_eq!(tag.fields.len(), 2);
        assert_eq!(tag.get("ARTIST"), Some("C"));
    }

    #[test]
    fn custom_fields_are_other_frames() {
        let tag = comment(&[("MOOD", "calm"), ("METADATA_BLOCK_PICTURE", "AAAA")]);
        let frames = tag.frames(&MapOptions::default());
        assert!(frames.get_other("MOOD").is_some());
        assert_eq!(frames.len(), 1);
    }
}
