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

//! Text encoding policy for frame based tags.
//!
//! A frame keeps the encoding it was read with. Writing text that the
//! current encoding cannot represent upgrades the frame to UTF-16.
//!
//! Some old tag library releases store UTF-16 text with the bytes of each
//! code unit swapped. [`mirrors_utf16`] tells whether a backend is
//! affected. Their wide text is kept as code units in [`StoredText`] and
//! [`swap_utf16_bytes`] undoes (and redoes) the damage on the units.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    Latin1,
    Utf16,
    Utf16Be,
    Utf8,
}

impl TextEncoding {
    pub fn is_unicode(self) -> bool {
        self != TextEncoding::Latin1
    }

    pub fn can_encode(self, text: &str) -> bool {
        self.is_unicode() || is_latin1(text)
    }

    /// The encoding to use for writing `text`, upgraded to UTF-16 if needed.
    pub fn for_text(self, text: &str) -> TextEncoding {
        if self.can_encode(text) {
            self
        } else {
            TextEncoding::Utf16
        }
    }

    pub fn is_utf16(self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16Be)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Utf16 => "UTF-16",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf8 => "UTF-8",
        };
        f.write_str(name)
    }
}

/// True if every character fits into a single ISO-8859-1 byte.
pub fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xff)
}

/// Swaps the two bytes of every UTF-16 code unit.
pub fn swap_utf16_bytes(units: &[u16]) -> Vec<u16> {
    units.iter().map(|u| u.swap_bytes()).collect()
}

/// Text payload of a frame as stored in the file.
///
/// Wide text from a mirroring backend stays as raw code units: swapped
/// units of U+00D8 to U+00DF are lone surrogates and do not survive a
/// `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredText {
    Plain(String),
    Utf16(Vec<u16>),
}

impl StoredText {
    /// Stores `text`, byte swapped if the backend mirrors UTF-16.
    pub fn encode(text: &str, mirrored: bool) -> Self {
        if mirrored {
            let units: Vec<u16> = text.encode_utf16().collect();
            StoredText::Utf16(swap_utf16_bytes(&units))
        } else {
            StoredText::Plain(text.to_string())
        }
    }

    /// The text, with the byte order of wide text corrected if `mirrored`.
    pub fn decode(&self, mirrored: bool) -> String {
        match self {
            StoredText::Plain(text) => text.clone(),
            StoredText::Utf16(units) if mirrored => String::from_utf16_lossy(&swap_utf16_bytes(units)),
            StoredText::Utf16(units) => String::from_utf16_lossy(units),
        }
    }

    /// The text as stored, without any correction.
    pub fn to_text(&self) -> String {
        self.decode(false)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StoredText::Plain(text) => text.is_empty(),
            StoredText::Utf16(units) => units.is_empty(),
        }
    }
}

impl From<String> for StoredText {
    fn from(text: String) -> Self {
        StoredText::Plain(text)
    }
}

impl From<&str> for StoredText {
    fn from(text: &str) -> Self {
        StoredText::Plain(text.to_string())
    }
}

/// Library whose old releases mirror UTF-16 code units.
pub const MIRRORING_LIBRARY: &str = "id3lib";

/// True if text written by `library` in `version` has mirrored UTF-16.
pub fn mirrors_utf16(library: &str, version: LibraryVersion) -> bool {
    library == MIRRORING_LIBRARY && version <= LibraryVersion::LAST_MIRRORING
}

/// Version of the library behind a tag backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl LibraryVersion {
    /// Last release known to store mirrored UTF-16.
    pub const LAST_MIRRORING: LibraryVersion = LibraryVersion::new(3, 8, 3);

    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses "major.minor.patch", missing parts count as 0.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().splitn(3, '.').map(str::parse::<u16>);
        let major = parts.next()?.ok()?;
        let minor = parts.next().transpose().ok()?.unwrap_or(0);
        let patch = parts.next().transpose().ok()?.unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_upgrade() {
        assert_eq!(TextEncoding::Latin1.for_text("Björk"), TextEncoding::Latin1);
        assert_eq!(TextEncoding::Latin1.for_text("Дельфин"), TextEncoding::Utf16);
        assert_eq!(TextEncoding::Utf8.for_text("Дельфин"), TextEncoding::Utf8);
    }

    #[test]
    fn swap_is_an_involution() {
        let units: Vec<u16> = "Sigur Rós ÿ ā Über ß Ø".encode_utf16().collect();
        let swapped = swap_utf16_bytes(&units);
        assert_ne!(swapped, units);
        assert_eq!(swap_utf16_bytes(&swapped), units);
    }

    #[test]
    fn mirrored_text_round_trips() {
        for text in ["Über", "Straße", "Øresund", "Sigur Rós", "Дельфин", "🎵 ÝÞ"] {
            let stored = StoredText::encode(text, true);
            assert_eq!(stored.decode(true), text);
        }
        // Ü swapped is a lone low surrogate
        assert_eq!(StoredText::encode("Ü", true), StoredText::Utf16(vec![0xdc00]));
    }

    #[test]
    fn unmirrored_text_is_stored_plain() {
        let stored = StoredText::encode("Straße", false);
        assert_eq!(stored, StoredText::Plain("Straße".into()));
        assert_eq!(stored.decode(true), "Straße");
        assert_eq!(StoredText::Utf16("Øresund".encode_utf16().collect()).to_text(), "Øresund");
    }

    #[test]
    fn mirroring_versions() {
        assert!(mirrors_utf16("id3lib", LibraryVersion::new(3, 8, 3)));
        assert!(mirrors_utf16("id3lib", LibraryVersion::new(3, 7, 13)));
        assert!(!mirrors_utf16("id3lib", LibraryVersion::new(3, 8, 4)));
        assert!(!mirrors_utf16("lofty", LibraryVersion::new(0, 22, 4)));
    }

    #[test]
    fn parse_version() {
        assert_eq!(LibraryVersion::parse("0.23.2"), Some(LibraryVersion::new(0, 23, 2)));
        assert_eq!(LibraryVersion::parse("3.8"), Some(LibraryVersion::new(3, 8, 0)));
        assert_eq!(LibraryVersion::parse("x.1"), None);
    }
}
