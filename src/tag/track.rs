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

//! Track number and year text helpers.

/// Splits "N/total" into its two numbers.
///
/// Either side may be missing or unparseable, in which case it is `None`.
pub fn split_track_number(value: &str) -> (Option<u32>, Option<u32>) {
    let value = value.trim();
    match value.split_once('/') {
        Some((number, total)) => (number.trim().parse().ok(), total.trim().parse().ok()),
        None => (value.parse().ok(), None),
    }
}

/// Formats a track number, optionally followed by "/total".
///
/// # Arguments
///
/// * `number` - track number, 0 yields an empty string
/// * `total` - total number of tracks, ignored if `None` or 0
/// * `digits` - minimum width, the numbers are padded with zeros
pub fn join_track_number(number: u32, total: Option<u32>, digits: usize) -> String {
    if number == 0 {
        return String::new();
    }
    match total {
        Some(total) if total > 0 => format!("{number:0digits$}/{total:0digits$}"),
        _ => format!("{number:0digits$}"),
    }
}

/// Leading year digits of a date such as "2009-05-01".
pub fn parse_year(value: &str) -> Option<u32> {
    let value = value.trim();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split() {
        assert_eq!(split_track_number("5/12"), (Some(5), Some(12)));
        assert_eq!(split_track_number(" 7 "), (Some(7), None));
        assert_eq!(split_track_number("3/"), (Some(3), None));
        assert_eq!(split_track_number(""), (None, None));
        assert_eq!(split_track_number("side A"), (None, None));
    }

    #[test]
    fn join() {
        assert_eq!(join_track_number(5, Some(12), 1), "5/12");
        assert_eq!(join_track_number(5, Some(12), 2), "05/12");
        assert_eq!(join_track_number(5, None, 2), "05");
        assert_eq!(join_track_number(5, Some(0), 1), "5");
        assert_eq!(join_track_number(0, Some(12), 1), "");
    }

    #[test]
    fn split_after_join_keeps_number() {
        let joined = join_track_number(5, Some(12), 1);
        assert_eq!(split_track_number(&joined).0, Some(5));
    }

    #[test]
    fn year() {
        assert_eq!(parse_year("2009"), Some(2009));
        assert_eq!(parse_year("2009-05-01"), Some(2009));
        assert_eq!(parse_year("unknown"), None);
    }
}
