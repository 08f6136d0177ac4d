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

//! Field selection for bulk tag operations.

use bitflags::bitflags;

use super::FrameType;

bitflags! {
    /// The seven standard fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StandardFields: u8 {
        const TITLE = 1 << 0;
        const ARTIST = 1 << 1;
        const ALBUM = 1 << 2;
        const COMMENT = 1 << 3;
        const YEAR = 1 << 4;
        const TRACK = 1 << 5;
        const GENRE = 1 << 6;
    }
}

impl StandardFields {
    pub fn of(frame_type: FrameType) -> Option<StandardFields> {
        match frame_type {
            FrameType::Title => Some(StandardFields::TITLE),
            FrameType::Artist => Some(StandardFields::ARTIST),
            FrameType::Album => Some(StandardFields::ALBUM),
            FrameType::Comment => Some(StandardFields::COMMENT),
            FrameType::Year => Some(StandardFields::YEAR),
            FrameType::Track => Some(StandardFields::TRACK),
            FrameType::Genre => Some(StandardFields::GENRE),
            _ => None,
        }
    }
}

/// Mask selecting which fields take part in a copy, paste, remove or import.
///
/// A filter with every standard field enabled has "whole tag" semantics:
/// removing strips the tag container and non-standard frames are carried
/// along. With any field disabled only the enabled standard fields are
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardTagsFilter {
    fields: StandardFields,
}

impl StandardTagsFilter {
    pub fn new(fields: StandardFields) -> Self {
        Self { fields }
    }

    pub fn all() -> Self {
        Self::new(StandardFields::all())
    }

    pub fn none() -> Self {
        Self::new(StandardFields::empty())
    }

    /// Every field except the given ones.
    pub fn without(fields: StandardFields) -> Self {
        Self::new(StandardFields::all().difference(fields))
    }

    pub fn fields(&self) -> StandardFields {
        self.fields
    }

    pub fn set(&mut self, fields: StandardFields, enabled: bool) {
        self.fields.set(fields, enabled);
    }

    pub fn is_all_true(&self) -> bool {
        self.fields.is_all()
    }

    pub fn is_enabled(&self, frame_type: FrameType) -> bool {
        match StandardFields::of(frame_type) {
            Some(field) => self.fields.contains(field),
            None => self.is_all_true(),
        }
    }
}

impl Default for StandardTagsFilter {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_filter_excludes_non_standard_frames() {
        let filter = StandardTagsFilter::without(StandardFields::COMMENT);

        assert!(!filter.is_all_true());
        assert!(filter.is_enabled(FrameType::Title));
        assert!(!filter.is_enabled(FrameType::Comment));
        assert!(!filter.is_enabled(FrameType::Composer));
        assert!(!filter.is_enabled(FrameType::Other));
    }

    #[test]
    fn all_true_filter_enables_everything() {
        let filter = StandardTagsFilter::all();

        assert!(filter.is_all_true());
        assert!(filter.is_enabled(FrameType::Picture));
        assert!(filter.is_enabled(FrameType::Other));
    }

    #[test]
    fn set_toggles_a_field() {
        let mut filter = StandardTagsFilter::none();
        filter.set(StandardFields::YEAR, true);

        assert!(filter.is_enabled(FrameType::Year));
        assert!(!filter.is_enabled(FrameType::Track));
    }
}
