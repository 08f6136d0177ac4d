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

//! Format strings with percent codes.
//!
//! A format is literal text with codes of the form `%c` or `%{name}`. Codes
//! are resolved by a [`CodeResolver`]; resolvers stack, a more specialised
//! one handles its own codes and hands everything else to the one it wraps.
//!
//! * `%%` is a literal percent sign.
//! * An unknown one-character code stays in the output as written.
//! * An unknown `%{name}` code is replaced by nothing.
//! * An unterminated `%{` is kept as written.
//!
//! # Sub-modules
//!
//! * [`frames`]: codes for the frames of a tag.
//! * [`track`]: codes for a file and its technical details.
//! * [`command`]: codes for external commands run on a selection.
//! * [`case`]: case conversion and string replacement of values.
//! * [`parser`]: extraction of frames from file names.

pub mod case;
pub mod command;
pub mod frames;
pub mod parser;
pub mod track;

use std::collections::BTreeMap;

use bitflags::bitflags;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left alone when a substitution is URL encoded.
const URL_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub trait CodeResolver {
    /// Replacement of a one-character code, `None` if unknown.
    fn short_code(&self, code: char) -> Option<String>;

    /// Replacement of a `%{name}` code, `name` is lower case. `None` if
    /// unknown.
    fn long_code(&self, name: &str) -> Option<String>;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FormatFlags: u8 {
        /// Apply the backslash escapes before the codes.
        const ESCAPES = 1 << 0;
        /// `%u` followed by a code URL encodes the substitution.
        const URL_ENCODE = 1 << 1;
    }
}

/// Applies escape pass and codes, as used for export lines.
pub fn format_string(format: &str, resolver: &dyn CodeResolver) -> String {
    format_with(format, resolver, FormatFlags::ESCAPES)
}

pub fn format_with(format: &str, resolver: &dyn CodeResolver, flags: FormatFlags) -> String {
    if flags.contains(FormatFlags::ESCAPES) {
        replace_percent_codes(&replace_escaped_chars(format), resolver, flags)
    } else {
        replace_percent_codes(format, resolver, flags)
    }
}

/// Replaces `\n`, `\t`, `\r`, `\\`, `\a`, `\b`, `\f`, `\v`, `\"` and `\'`.
///
/// Other backslashes are kept.
pub fn replace_escaped_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code<'a> {
    Short(char),
    Long(&'a str),
}

/// Parses the code at the start of `text`, which follows a `%`.
///
/// Returns the code and the number of bytes it takes.
fn next_code(text: &str) -> Option<(Code<'_>, usize)> {
    if let Some(braced) = text.strip_prefix('{') {
        let end = braced.find('}')?;
        return Some((Code::Long(&braced[..end]), end + 2));
    }
    let c = text.chars().next()?;
    Some((Code::Short(c), c.len_utf8()))
}

fn substitute(resolver: &dyn CodeResolver, code: Code<'_>) -> Option<String> {
    match code {
        Code::Short(c) => resolver.short_code(c),
        Code::Long(name) => Some(resolver.long_code(&name.to_lowercase()).unwrap_or_default()),
    }
}

pub fn replace_percent_codes(text: &str, resolver: &dyn CodeResolver, flags: FormatFlags) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }

        if flags.contains(FormatFlags::URL_ENCODE)
            && let Some(tail) = after.strip_prefix('u')
            && let Some((code, len)) = next_code(tail)
            && let Some(value) = substitute(resolver, code)
        {
            out.extend(utf8_percent_encode(&value, URL_UNRESERVED));
            rest = &tail[len..];
            continue;
        }

        match next_code(after) {
            Some((code, len)) => {
                match substitute(resolver, code) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(&after[..len]);
                    }
                }
                rest = &after[len..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolver applying string replacements to every substitution of the
/// resolver it wraps, used for directory names.
pub struct ReplaceSeparators<'a> {
    inner: &'a dyn CodeResolver,
    replacements: &'a BTreeMap<String, String>,
}

impl<'a> ReplaceSeparators<'a> {
    pub fn new(inner: &'a dyn CodeResolver, replacements: &'a BTreeMap<String, String>) -> Self {
        Self { inner, replacements }
    }

    fn replace(&self, mut value: String) -> String {
        for (from, to) in self.replacements.iter().filter(|(from, _)| !from.is_empty()) {
            value = value.replace(from.as_str(), to);
        }
        value
    }
}

impl CodeResolver for ReplaceSeparators<'_> {
    fn short_code(&self, code: char) -> Option<String> {
        self.inner.short_code(code).map(|v| self.replace(v))
    }

    fn long_code(&self, name: &str) -> Option<String> {
        self.inner.long_code(name).map(|v| self.replace(v))
    }
}
