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

//! Application configuration.
//!
//! This module manages the application configuration file. Missing or
//! unreadable settings fall back to their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::case::FormatConfig;
use crate::tag::MapOptions;
use crate::tag::encoding::TextEncoding;
use crate::tag::id3v2::Id3v2Version;

const CONFIG_NAME: &str = "tagnorm";

/// How frames are written to tags.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TagConfig {
    /// Append "/total" to track numbers, total being the number of files in
    /// the directory.
    pub write_total_tracks: bool,
    pub track_digits: usize,
    pub id3v2_version: Id3v2Version,
    /// Encoding of new ID3v2 text frames.
    pub text_encoding: TextEncoding,
    /// Vorbis comment field used for the comment.
    pub comment_field: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            write_total_tracks: false,
            track_digits: 1,
            id3v2_version: Id3v2Version::V3,
            text_encoding: TextEncoding::Latin1,
            comment_field: "COMMENT".into(),
        }
    }
}

impl TagConfig {
    /// Mapping options for a file in a directory with `total_tracks` files.
    pub fn map_options(&self, total_tracks: Option<u32>, mirrored_utf16: bool) -> MapOptions {
        MapOptions {
            total_tracks: total_tracks.filter(|_| self.write_total_tracks),
            track_digits: self.track_digits.max(1),
            default_encoding: self.text_encoding,
            mirrored_utf16,
            comment_field: self.comment_field.clone(),
            id3v2_version: self.id3v2_version,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dirs: Vec<String>,
    pub tags: TagConfig,
    /// Format used to generate file names from tags.
    pub filename_format: String,
    /// Format used to generate directory names from tags.
    pub dir_format: String,
    pub export_format: String,
    /// Replacements applied to values substituted into directory names.
    pub separator_replacements: BTreeMap<String, String>,
    pub filename_format_config: FormatConfig,
    pub tag_format_config: FormatConfig,
    /// Apply the tag format configuration whenever tags are edited.
    pub format_while_editing: bool,
    /// Command used to open URLs.
    pub browser: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            tags: TagConfig::default(),
            filename_format: "%T %a - %t".into(),
            dir_format: "%a - %l".into(),
            export_format: "%T. %a - %t (%d)".into(),
            separator_replacements: BTreeMap::from([
                ("/".to_string(), "-".to_string()),
                ("\\".to_string(), "-".to_string()),
            ]),
            filename_format_config: FormatConfig::for_filenames(),
            tag_format_config: FormatConfig::default(),
            format_while_editing: false,
            browser: "xdg-open".into(),
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_only_when_enabled() {
        let mut tags = TagConfig::default();
        assert_eq!(tags.map_options(Some(12), false).total_tracks, None);

        tags.write_total_tracks = true;
        assert_eq!(tags.map_options(Some(12), false).total_tracks, Some(12));
    }

    #[test]
    fn default_separators_map_to_dash() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.separator_replacements.get("/").map(String::as_str), Some("-"));
        assert_eq!(cfg.separator_replacements.get("\\").map(String::as_str), Some("-"));
    }
}
