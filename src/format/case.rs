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

//! Case conversion and string replacement of tag values and file names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FrameCollection, FrameType, FrameValue};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseConversion {
    #[default]
    NoChanges,
    AllLowercase,
    AllUppercase,
    FirstLetterUppercase,
    AllFirstLettersUppercase,
}

impl CaseConversion {
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseConversion::NoChanges => text.to_string(),
            CaseConversion::AllLowercase => text.to_lowercase(),
            CaseConversion::AllUppercase => text.to_uppercase(),
            CaseConversion::FirstLetterUppercase => {
                let lower = text.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            CaseConversion::AllFirstLettersUppercase => {
                let mut out = String::with_capacity(text.len());
                let mut word_start = true;
                for c in text.chars() {
                    if word_start {
                        out.extend(c.to_uppercase());
                    } else {
                        out.extend(c.to_lowercase());
                    }
                    // "Don't" is one word
                    word_start = !(c.is_alphanumeric() || c == '\'');
                }
                out
            }
        }
    }
}

/// How values are normalised before they are written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FormatConfig {
    pub case_conversion: CaseConversion,
    pub str_repl_enabled: bool,
    /// Replacements, applied in key order.
    pub str_repl_map: BTreeMap<String, String>,
}

impl FormatConfig {
    /// Configuration for file names, replacing characters which are not
    /// allowed in a file name.
    pub fn for_filenames() -> Self {
        Self {
            case_conversion: CaseConversion::NoChanges,
            str_repl_enabled: true,
            str_repl_map: BTreeMap::from([
                ("/".to_string(), "-".to_string()),
                (":".to_string(), "-".to_string()),
                ("?".to_string(), String::new()),
                ("*".to_string(), String::new()),
            ]),
        }
    }

    pub fn format_string(&self, text: &str) -> String {
        let mut text = self.case_conversion.apply(text);
        if self.str_repl_enabled {
            for (from, to) in self.str_repl_map.iter().filter(|(from, _)| !from.is_empty()) {
                text = text.replace(from.as_str(), to);
            }
        }
        text
    }

    /// Formats a file name, leaving the extension as it is.
    pub fn format_filename(&self, filename: &str) -> String {
        match filename.rfind('.') {
            Some(pos) if pos > 0 => {
                let (stem, extension) = filename.split_at(pos);
                format!("{}{}", self.format_string(stem), extension)
            }
            _ => self.format_string(filename),
        }
    }

    /// Formats every text frame except the genre.
    ///
    /// # Returns
    ///
    /// `true` if a value changed.
    pub fn format_frames(&self, frames: &mut FrameCollection) -> bool {
        let mut changed = false;
        let updates: Vec<_> = frames
            .iter()
            .filter(|f| f.frame_type() != FrameType::Genre)
            .filter_map(|f| match f.value() {
                FrameValue::Text(text) => {
                    let formatted = self.format_string(text);
                    (formatted != *text).then(|| {
                        let mut frame = f.clone();
                        frame.set_value(FrameValue::Text(formatted));
                        frame
                    })
                }
                _ => None,
            })
            .collect();
        for frame in updates {
            frames.insert(frame);
            changed = true;
        }
        changed
    }
}
