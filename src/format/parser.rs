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

//! Extraction of tags from file names.
//!
//! A pattern uses the frame codes of [`super::frames`]. Each code becomes a
//! capture group of a regular expression, the literal text in between has to
//! match exactly. Year and track capture digits only.

use std::path::Path;

use log::debug;
use regex::Regex;

use crate::error::Result;
use crate::model::{Frame, FrameCollection, FrameKey, FrameType, FrameValue};

use super::{Code, next_code};

#[derive(Debug, Clone)]
pub struct ImportParser {
    regex: Regex,
    fields: Vec<FrameKey>,
    /// Directory levels the pattern spans.
    depth: usize,
}

fn short_code_key(code: char) -> Option<FrameKey> {
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
    Some(FrameKey::of(frame_type))
}

fn long_code_key(name: &str) -> Option<FrameKey> {
    match FrameType::from_code_name(name) {
        Some(FrameType::Picture) => None,
        Some(frame_type) => Some(FrameKey::of(frame_type)),
        None if name.is_empty() => None,
        None => Some(FrameKey::other(name)),
    }
}

impl ImportParser {
    /// Compiles `pattern`, e.g. "%a - %l/%T %t".
    ///
    /// # Errors
    ///
    /// If the resulting regular expression is invalid.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expr = String::from("^");
        let mut fields = Vec::new();
        let mut rest = pattern;
        while let Some(pos) = rest.find('%') {
            expr.push_str(&regex::escape(&rest[..pos]));
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                expr.push('%');
                rest = tail;
                continue;
            }
            let Some((code, len)) = next_code(after) else {
                expr.push('%');
                rest = after;
                continue;
            };
            let key = match code {
                Code::Short(c) => short_code_key(c),
                Code::Long(name) => long_code_key(&name.to_lowercase()),
            };
            match key {
                Some(key) => {
                    expr.push_str(if key.frame_type.is_numeric() { r"(\d+)" } else { "(.+?)" });
                    fields.push(key);
                }
                None => expr.push_str(&regex::escape(&rest[pos..pos + 1 + len])),
            }
            rest = &after[len..];
        }
        expr.push_str(&regex::escape(rest));
        expr.push('$');
        debug!("Filename pattern {pattern:?} compiled to {expr:?}");

        Ok(Self {
            regex: Regex::new(&expr)?,
            fields,
            depth: pattern.matches('/').count(),
        })
    }

    /// Frames captured by the pattern, in order.
    pub fn fields(&self) -> &[FrameKey] {
        &self.fields
    }

    /// Extracts the frames from a file path.
    ///
    /// The extension is ignored. A pattern containing `/` is matched against
    /// as many trailing components of the path.
    pub fn parse(&self, path: &Path) -> Option<FrameCollection> {
        let stem = path.with_extension("");
        let components: Vec<_> = stem
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let start = components.len().saturating_sub(self.depth + 1);
        self.parse_str(&components[start..].join("/"))
    }

    /// Extracts the frames from `text`, `None` if it does not match.
    pub fn parse_str(&self, text: &str) -> Option<FrameCollection> {
        let captures = self.regex.captures(text)?;
        let mut frames = FrameCollection::new();
        for (key, group) in self.fields.iter().zip(captures.iter().skip(1)) {
            let Some(group) = group else {
                continue;
            };
            let value = group.as_str().trim();
            let frame = match key.frame_type {
                FrameType::Other => Frame::other(key.name.clone(), FrameValue::Text(value.to_string())),
                t if t.is_numeric() => Frame::number(t, value.parse().unwrap_or(0)),
                t => Frame::text(t, value),
            };
            frames.insert(frame);
        }
        Some(frames)
    }
}
