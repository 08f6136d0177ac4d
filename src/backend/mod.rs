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

//! Tag I/O backends.
//!
//! A backend reads the tags and technical details of an audio file into the
//! raw per-format models of [`crate::tag`] and writes them back. The backend
//! is chosen once when the file store is created.

pub mod lofty;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::tag::ape::ApeTag;
use crate::tag::encoding::{self, LibraryVersion};
use crate::tag::id3v1::Id3v1Tag;
use crate::tag::id3v2::Id3v2Tag;
use crate::tag::xiph::XiphComment;
use crate::tag::{MapOptions, RawTag, TagSlot};

pub use self::lofty::LoftyBackend;

/// Everything a backend reads from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileContents {
    pub format: FileFormat,
    pub tag_v1: Option<RawTag>,
    pub tag_v2: Option<RawTag>,
    pub detail: DetailInfo,
}

pub trait TagBackend {
    /// Name of the library doing the work.
    fn name(&self) -> &'static str;

    fn version(&self) -> LibraryVersion;

    /// Reads tags and details of the file at `path`.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a supported audio file.
    fn read(&self, path: &Path) -> Result<FileContents>;

    /// Writes one tag slot, `None` strips the tag from the file.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    fn write(&self, path: &Path, slot: TagSlot, tag: Option<&RawTag>) -> Result<()>;

    fn strip(&self, path: &Path, slot: TagSlot) -> Result<()> {
        self.write(path, slot, None)
    }

    /// Wide text written by this backend has mirrored byte order.
    fn mirrors_utf16(&self) -> bool {
        encoding::mirrors_utf16(self.name(), self.version())
    }
}

/// Supported audio file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Mpeg,
    Flac,
    OggVorbis,
    Musepack,
}

impl FileFormat {
    pub const EXTENSIONS: [&'static str; 6] = ["mp3", "mp2", "flac", "ogg", "oga", "mpc"];

    pub fn from_extension(extension: &str) -> Option<FileFormat> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" | "mp2" => Some(FileFormat::Mpeg),
            "flac" => Some(FileFormat::Flac),
            "ogg" | "oga" => Some(FileFormat::OggVorbis),
            "mpc" => Some(FileFormat::Musepack),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<FileFormat> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(FileFormat::from_extension)
    }

    pub fn supports(self, slot: TagSlot) -> bool {
        match slot {
            TagSlot::V1 => matches!(self, FileFormat::Mpeg | FileFormat::Musepack),
            TagSlot::V2 => true,
        }
    }

    /// A new empty tag for `slot`, `None` if the format has no such tag.
    pub fn new_tag(self, slot: TagSlot, opts: &MapOptions) -> Option<RawTag> {
        match (slot, self) {
            (TagSlot::V1, FileFormat::Mpeg | FileFormat::Musepack) => {
                Some(RawTag::Id3v1(Id3v1Tag::new()))
            }
            (TagSlot::V1, _) => None,
            (TagSlot::V2, FileFormat::Mpeg) => Some(RawTag::Id3v2(Id3v2Tag::new(opts.id3v2_version))),
            (TagSlot::V2, FileFormat::Flac | FileFormat::OggVorbis) => {
                Some(RawTag::Xiph(XiphComment::new()))
            }
            (TagSlot::V2, FileFormat::Musepack) => Some(RawTag::Ape(ApeTag::new())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Mpeg => "MP3",
            FileFormat::Flac => "FLAC",
            FileFormat::OggVorbis => "Ogg Vorbis",
            FileFormat::Musepack => "Musepack",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    pub fn name(self) -> &'static str {
        match self {
            ChannelMode::Stereo => "Stereo",
            ChannelMode::JointStereo => "Joint Stereo",
            ChannelMode::DualChannel => "Dual Channel",
            ChannelMode::Mono => "Mono",
        }
    }
}

/// Technical details of an audio file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailInfo {
    pub codec: String,
    /// Kilobits per second.
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub channel_mode: Option<ChannelMode>,
    /// Variable bitrate stream.
    pub vbr: bool,
    pub duration: Option<Duration>,
}
