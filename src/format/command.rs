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

//! Codes for the arguments of external commands.
//!
//! `%f`/`%{file}` is the first selected file, `%F`/`%{files}` all of them,
//! `%d`/`%{directory}` the directory of the first file and `%b`/`%{browser}`
//! the configured browser. `%{url}` and `%{urls}` give file URLs. Any code
//! prefixed with `%u` is URL encoded, e.g. `%ua` or `%u{album}`.

use std::path::{Path, PathBuf};

use url::Url;

use crate::model::FrameCollection;

use super::frames::FrameCodes;
use super::{CodeResolver, FormatFlags, format_with};

pub struct CommandCodes<'a> {
    frames: FrameCodes<'a>,
    files: &'a [PathBuf],
    /// The selection is a directory, `%d` is the first entry itself.
    is_dir: bool,
    browser: &'a str,
}

impl<'a> CommandCodes<'a> {
    pub fn new(frames: &'a FrameCollection, files: &'a [PathBuf], is_dir: bool, browser: &'a str) -> Self {
        Self {
            frames: FrameCodes::new(frames),
            files,
            is_dir,
            browser,
        }
    }

    fn url(path: &Path) -> String {
        Url::from_file_path(path).map(String::from).unwrap_or_default()
    }

    fn joined(&self, f: impl Fn(&Path) -> String) -> String {
        self.files.iter().map(|p| f(p)).collect::<Vec<_>>().join(" ")
    }

    fn command_code(&self, name: &str) -> Option<String> {
        let first = self.files.first();
        let value = match name {
            "file" => first.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default(),
            "files" => self.joined(|p| p.to_string_lossy().into_owned()),
            "directory" => match first {
                Some(p) if self.is_dir => p.to_string_lossy().into_owned(),
                Some(p) => p
                    .parent()
                    .map(|d| d.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                None => String::new(),
            },
            "browser" => self.browser.to_string(),
            "url" => first.map(|p| Self::url(p)).unwrap_or_default(),
            "urls" => self.joined(Self::url),
            _ => return None,
        };
        Some(value)
    }

    /// Formats the arguments of a command.
    ///
    /// An argument consisting only of `%F`, `%{files}` or `%{urls}` expands
    /// to one argument per file.
    pub fn format_args(&self, args: &[&str]) -> Vec<String> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            match *arg {
                "%F" | "%{files}" => out.extend(self.files.iter().map(|p| p.to_string_lossy().into_owned())),
                "%{urls}" => out.extend(self.files.iter().map(|p| Self::url(p))),
                _ => out.push(format_with(arg, self, FormatFlags::URL_ENCODE)),
            }
        }
        out
    }
}

impl CodeResolver for CommandCodes<'_> {
    fn short_code(&self, code: char) -> Option<String> {
        let name = match code {
            'f' => "file",
            'F' => "files",
            'd' => "directory",
            'b' => "browser",
            _ => return self.frames.short_code(code),
        };
        self.command_code(name)
    }

    fn long_code(&self, name: &str) -> Option<String> {
        self.frames.long_code(name).or_else(|| self.command_code(name))
    }
}
