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

//! Codes for the frames of a tag.
//!
//! | Code | Long code | Value |
//! |------|-----------|-------|
//! | `%s`, `%t` | `%{title}` | title |
//! | `%a` | `%{artist}` | artist |
//! | `%l` | `%{album}` | album |
//! | `%c` | `%{comment}` | comment |
//! | `%y` | `%{year}` | year |
//! | `%T` | `%{track}` | track number, two digits |
//! | `%g` | `%{genre}` | genre |
//!
//! Any other frame is available by its lower case name, e.g.
//! `%{albumartist}` or the name of a custom frame.

use crate::model::{FrameCollection, FrameType, FrameValue};

use super::CodeResolver;

pub struct FrameCodes<'a> {
    frames: &'a FrameCollection,
}

impl<'a> FrameCodes<'a> {
    pub fn new(frames: &'a FrameCollection) -> Self {
        Self { frames }
    }

    fn value(&self, frame_type: FrameType) -> String {
        match (frame_type, self.frames.value(frame_type)) {
            (FrameType::Track, Some(value)) => match value.number() {
                0 => String::new(),
                n => format!("{n:02}"),
            },
            (_, Some(value)) => value.to_text(),
            (_, None) => String::new(),
        }
    }

    fn custom(&self, name: &str) -> Option<String> {
        self.frames
            .iter()
            .find(|f| f.frame_type() == FrameType::Other && f.name().eq_ignore_ascii_case(name))
            .map(|f| match f.value() {
                FrameValue::Binary(_) => String::new(),
                value => value.to_text(),
            })
    }
}

impl CodeResolver for FrameCodes<'_> {
    fn short_code(&self, code: char) -> Option<String> {
        let frame_type = match code {
            's' | 't' => FrameType::Title,
            'a' => FrameType::Artist,
            'l' => FrameType::Album,
            'c' => FrameType::Comment,
            'y' => FrameType::Year,
            'T' => FrameType::Track,
            'g' => FrameType::Genre,
            _ => return None,
        };
        Some(self.value(frame_type))
    }

    fn long_code(&self, name: &str) -> Option<String> {
        match FrameType::from_code_name(name) {
            Some(FrameType::Picture) => None,
            Some(frame_type) => Some(self.value(frame_type)),
            None => self.custom(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatFlags, replace_percent_codes};
    use crate::model::Frame;

    fn hysteria() -> FrameCollection {
        let mut frames = FrameCollection::empty_standard();
        frames.set_text(FrameType::Title, "Hysteria");
        frames.set_text(FrameType::Artist, "Muse");
        frames.set_text(FrameType::Album, "Absolution");
        frames.set_number(FrameType::Year, 2003);
        frames.set_number(FrameType::Track, 8);
        frames.set_text(FrameType::AlbumArtist, "Muse");
        frames.insert(Frame::other("CATALOG", FrameValue::Text("MUSH1".into())));
        frames
    }

    fn fmt(format: &str, frames: &FrameCollection) -> String {
        replace_percent_codes(format, &FrameCodes::new(frames), FormatFlags::empty())
    }

    #[test]
    fn standard_codes() {
        let frames = hysteria();
        assert_eq!(fmt("%a - %t", &frames), "Muse - Hysteria");
        assert_eq!(fmt("%T %s (%y, %l)", &frames), "08 Hysteria (2003, Absolution)");
    }

    #[test]
    fn named_frames() {
        let frames = hysteria();
        assert_eq!(fmt("%{albumartist}", &frames), "Muse");
        assert_eq!(fmt("%{catalog}", &frames), "MUSH1");
        assert_eq!(fmt("[%{composer}]", &frames), "[]");
    }

    #[test]
    fn empty_values_substitute_nothing() {
        let frames = FrameCollection::empty_standard();
        assert_eq!(fmt("%T-%y-%g", &frames), "--");
    }
}
