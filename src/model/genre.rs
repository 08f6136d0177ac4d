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

//! Numeric genre table.
//!
//! ID3v1 stores the genre as an index into a fixed table, ID3v2 may refer to
//! the same table with `(N)` references inside the TCON frame.

use lofty::id3::v1::GENRES;

/// Value used by ID3v1 for "no genre".
pub const NONE: u8 = 0xff;

/// Name of the genre with the given number.
pub fn name(number: u8) -> Option<&'static str> {
    GENRES.get(usize::from(number)).copied()
}

/// Number of the genre with the given name, compared case-insensitively.
pub fn number(name: &str) -> Option<u8> {
    GENRES
        .iter()
        .position(|g| g.eq_ignore_ascii_case(name))
        .and_then(|n| u8::try_from(n).ok())
}

/// Resolves the value of an ID3v2 content type frame to a genre name.
///
/// # Arguments
///
/// * `value` - raw frame text, one of `N`, `(N)`, `(N)refinement`, `(RX)`,
///   `(CR)` or free text.
///
/// A number outside the table yields the original text.
pub fn parse_id3v2(value: &str) -> String {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('(')
        && let Some(close) = rest.find(')')
    {
        let code = &rest[..close];
        let refinement = &rest[close + 1..];
        match code {
            "RX" => return "Remix".into(),
            "CR" => return "Cover".into(),
            _ => {}
        }
        if let Ok(n) = code.parse::<u8>() {
            if !refinement.is_empty() && !refinement.starts_with('(') {
                return refinement.to_string();
            }
            if let Some(genre) = name(n) {
                return genre.to_string();
            }
        }
        return value.to_string();
    }
    match value.parse::<u8>() {
        Ok(n) => name(n).map_or_else(|| value.to_string(), str::to_string),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        assert_eq!(name(17), Some("Rock"));
        assert_eq!(number("rock"), Some(17));
        assert_eq!(number("No Such Genre"), None);
        assert_eq!(name(NONE), None);
    }

    #[test]
    fn id3v2_references() {
        assert_eq!(parse_id3v2("17"), "Rock");
        assert_eq!(parse_id3v2("(17)"), "Rock");
        assert_eq!(parse_id3v2("(17)Rock & Roll"), "Rock & Roll");
        assert_eq!(parse_id3v2("(RX)"), "Remix");
        assert_eq!(parse_id3v2("(CR)"), "Cover");
        assert_eq!(parse_id3v2("Shoegaze"), "Shoegaze");
        assert_eq!(parse_id3v2("(250)"), "(250)");
        assert_eq!(parse_id3v2("250"), "250");
    }
}
