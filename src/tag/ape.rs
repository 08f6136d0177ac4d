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

//! APE item tag used by Musepack.

use crate::model::{Frame, FrameCollection, FrameType, FrameValue, StandardTagsFilter};

use super::track::{join_track_number, parse_year, split_track_number};
use super::{MapOptions, writable_frames};

const COVER_ART_PREFIX: &str = "cover art";

const TEXT_KEYS: [(FrameType, &str); 8] = [
    (FrameType::Title, "Title"),
    (FrameType::Artist, "Artist"),
    (FrameType::Album, "Album"),
    (FrameType::Comment, "Comment"),
    (FrameType::Genre, "Genre"),
    (FrameType::AlbumArtist, "Album Artist"),
    (FrameType::Composer, "Composer"),
    (FrameType::Disc, "Disc"),
];

const YEAR: &str = "Year";
const TRACK: &str = "Track";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApeValue {
    Text(String),
    Binary(Vec<u8>),
    Locator(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApeItem {
    pub key: String,
    pub value: ApeValue,
}

impl ApeItem {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ApeValue::Text(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApeTag {
    pub items: Vec<ApeItem>,
}

impl ApeTag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ApeItem> {
        self.items.iter().find(|item| item.key.eq_ignore_ascii_case(key))
    }

    /// Sets a text item, empty removes it.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.items.retain(|item| !item.key.eq_ignore_ascii_case(key));
            return;
        }
        match self.items.iter_mut().find(|item| item.key.eq_ignore_ascii_case(key)) {
            Some(item) => item.value = ApeValue::Text(value.to_string()),
            None => self.items.push(ApeItem::text(key, value)),
        }
    }

    pub(super) fn frames(&self) -> FrameCollection {
        let mut frames = FrameCollection::new();
        for item in &self.items {
            let key = item.key.as_str();
            let frame = match &item.value {
                ApeValue::Binary(data) if key.to_ascii_lowercase().starts_with(COVER_ART_PREFIX) => {
                    Frame::new(FrameType::Picture, FrameValue::Binary(data.clone()))
                }
                ApeValue::Text(text) => {
                    if let Some((frame_type, _)) =
                        TEXT_KEYS.iter().find(|(_, k)| k.eq_ignore_ascii_case(key))
                    {
                        Frame::text(*frame_type, text.as_str())
                    } else if key.eq_ignore_ascii_case(YEAR) {
                        Frame::number(FrameType::Year, parse_year(text).unwrap_or(0))
                    } else if key.eq_ignore_ascii_case(TRACK) {
                        Frame::number(FrameType::Track, split_track_number(text).0.unwrap_or(0))
                    } else {
                        Frame::other(key, FrameValue::Text(text.clone()))
                    }
                }
                _ => continue,
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
                FrameType::Year => self.set(YEAR, &value.to_text()),
                FrameType::Track => {
                    let text = join_track_number(value.number(), opts.total_tracks, opts.track_digits);
                    self.set(TRACK, &text);
                }
                FrameType::Other => self.set(frame.name(), &value.to_text()),
                frame_type => {
                    if let Some((_, key)) = TEXT_KEYS.iter().find(|(t, _)| *t == frame_type) {
                        self.set(key, &value.to_text());
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_items() {
        let tag = ApeTag {
            items: vec![
                ApeItem::text("TITLE", "Hysteria"),
                ApeItem::text("Track", "8/14"),
                ApeItem::text("Year", "2003"),
                ApeItem::text("Album Artist", "Muse"),
                ApeItem::text("Catalog", "MUSH1"),
                ApeItem {
                    key: "Cover Art (Front)".into(),
                    value: ApeValue::Binary(vec![0xff, 0xd8]),
                },
            ],
        };

        let frames = tag.frames();
        assert_eq!(frames.title().as_deref(), Some("Hysteria"));
        assert_eq!(frames.track(), Some(8));
        assert_eq!(frames.year(), Some(2003));
        assert_eq!(frames.text(FrameType::AlbumArtist).as_deref(), Some("Muse"));
        assert!(frames.get_other("Catalog").is_some());
        assert!(frames.contains(FrameType::Picture));
    }

    #[test]
    fn writes_track_with_total() {
        let mut tag = ApeTag::new();
        let mut frames = FrameCollection::new();
        frames.set_number(FrameType::Track, 5);
        let opts = MapOptions {
            total_tracks: Some(12),
            ..MapOptions::default()
        };
        tag.set_frames(&frames, &StandardTagsFilter::all(), &opts);

        assert_eq!(tag.get(TRACK).map(|i| &i.value), Some(&ApeValue::Text("5/12".into())));
        assert_eq!(tag.frames().track(), Some(5));
    }

    #[test]
    fn empty_value_removes_item() {
        let mut tag = ApeTag {
            items: vec![ApeItem::text("Genre", "Rock")],
        };
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Genre, "");
        tag.set_frames(&frames, &StandardTagsFilter::all(), &MapOptions::default());
        assert!(tag.is_empty());
    }
}
