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

//! Codes for a file and its technical details.
//!
//! | Code | Long code | Value |
//! |------|-----------|-------|
//! | `%f` | `%{file}` | file name |
//! | `%p` | `%{filepath}` | absolute path |
//! | `%u` | `%{url}` | file URL |
//! | `%d` | `%{duration}` | duration "M:SS" |
//! | `%D` | `%{seconds}` | duration in seconds |
//! | `%n` | `%{tracks}` | number of tracks in the directory |
//! | `%e` | `%{extension}` | extension with dot |
//! | `%O` | `%{tag1}` | format of tag 1 |
//! | `%o` | `%{tag2}` | format of tag 2 |
//! | `%b` | `%{bitrate}` | bitrate in kbps |
//! | `%r` | `%{samplerate}` | sample rate |
//! | `%m` | `%{mode}` | channel mode |
//! | `%h` | `%{channels}` | channels |
//! | `%k` | `%{codec}` | codec |
//! | `%v` | `%{vbr}` | "VBR" for a variable bitrate |
//!
//! The frame codes of [`super::frames`] are available as well.

use std::collections::BTreeMap;

use url::Url;

use crate::file::{FileStore, TaggedFile};
use crate::tag::TagSlot;
use crate::track::TrackData;
use crate::util::format::format_time;

use super::frames::FrameCodes;
use super::{CodeResolver, FormatFlags, ReplaceSeparators, format_with};

pub struct TrackCodes<'a> {
    frames: FrameCodes<'a>,
    file: Option<&'a TaggedFile>,
    total_tracks: u32,
}

impl<'a> TrackCodes<'a> {
    pub fn new(track: &'a TrackData, store: &'a FileStore) -> Self {
        Self {
            frames: FrameCodes::new(track.frames()),
            file: track.tagged_file(store),
            total_tracks: track.file_index().map_or(0, |idx| store.total_tracks_in_dir(idx)),
        }
    }

    fn file_code(&self, name: &str) -> Option<String> {
        let file = self.file;
        let detail = file.map(TaggedFile::detail);
        let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        let value = match name {
            "file" => file.map(TaggedFile::filename).unwrap_or_default(),
            "filepath" => file
                .map(|f| f.path().to_string_lossy().into_owned())
                .unwrap_or_default(),
            "url" => file
                .and_then(|f| Url::from_file_path(f.path()).ok())
                .map(String::from)
                .unwrap_or_default(),
            "duration" => file
                .and_then(TaggedFile::duration)
                .map(|d| format_time(d.as_secs()))
                .unwrap_or_default(),
            "seconds" => file
                .and_then(TaggedFile::duration)
                .map(|d| d.as_secs().to_string())
                .unwrap_or_default(),
            "tracks" => self.total_tracks.to_string(),
            "extension" => file.map(TaggedFile::extension).unwrap_or_default(),
            "tag1" => file.and_then(|f| f.tag_format(TagSlot::V1)).unwrap_or_default().to_string(),
            "tag2" => file.and_then(|f| f.tag_format(TagSlot::V2)).unwrap_or_default().to_string(),
            "bitrate" => number(detail.and_then(|d| d.bitrate)),
            "samplerate" => number(detail.and_then(|d| d.sample_rate)),
            "mode" => detail
                .and_then(|d| d.channel_mode)
                .map(|m| m.name().to_string())
                .unwrap_or_default(),
            "channels" => number(detail.and_then(|d| d.channels).map(u32::from)),
            "codec" => detail.map(|d| d.codec.clone()).unwrap_or_default(),
            "vbr" => detail.filter(|d| d.vbr).map(|_| "VBR".to_string()).unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }
}

impl CodeResolver for TrackCodes<'_> {
    fn short_code(&self, code: char) -> Option<String> {
        let name = match code {
            'f' => "file",
            'p' => "filepath",
            'u' => "url",
            'd' => "duration",
            'D' => "seconds",
            'n' => "tracks",
            'e' => "extension",
            'O' => "tag1",
            'o' => "tag2",
            'b' => "bitrate",
            'r' => "samplerate",
            'm' => "mode",
            'h' => "channels",
            'k' => "codec",
            'v' => "vbr",
            _ => return self.frames.short_code(code),
        };
        self.file_code(name)
    }

    fn long_code(&self, name: &str) -> Option<String> {
        self.frames.long_code(name).or_else(|| self.file_code(name))
    }
}

/// Generates a file or directory name from the tags of a track.
///
/// For a file name any directory part of `format` is dropped and the
/// extension of the file is appended. For a directory name every
/// substitution goes through `separators`, so a value like "AC/DC" does not
/// create a nested directory.
pub fn format_filename_from_tags(
    codes: &TrackCodes<'_>,
    format: &str,
    is_dirname: bool,
    separators: &BTreeMap<String, String>,
) -> String {
    if is_dirname {
        let resolver = ReplaceSeparators::new(codes, separators);
        format_with(format, &resolver, FormatFlags::empty())
    } else {
        let name = match format.rfind('/') {
            Some(pos) => &format[pos + 1..],
            None => format,
        };
        let extension = codes.file.map(TaggedFile::extension).unwrap_or_default();
        format_with(&format!("{name}{extension}"), codes, FormatFlags::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChannelMode, DetailInfo, FileContents, FileFormat, TagBackend};
    use crate::config::TagConfig;
    use crate::error::Result;
    use crate::file::FileIndex;
    use crate::format::format_string;
    use crate::model::{FrameCollection, FrameType};
    use crate::tag::encoding::LibraryVersion;
    use crate::tag::{RawTag, TagVersion};
    use crate::tag::id3v2::{Id3v2Tag, Id3v2Version};
    use std::path::Path;
    use std::time::Duration;

    struct DetailBackend {
        vbr: bool,
    }

    impl TagBackend for DetailBackend {
        fn name(&self) -> &'static str {
            "detail"
        }

        fn version(&self) -> LibraryVersion {
            LibraryVersion::new(1, 0, 0)
        }

        fn read(&self, _path: &Path) -> Result<FileContents> {
            Ok(FileContents {
                format: FileFormat::Mpeg,
                tag_v1: None,
                tag_v2: Some(RawTag::Id3v2(Id3v2Tag::new(Id3v2Version::V3))),
                detail: DetailInfo {
                    codec: "MPEG 1 Layer 3".into(),
                    bitrate: Some(320),
                    sample_rate: Some(44100),
                    channels: Some(2),
                    channel_mode: Some(ChannelMode::JointStereo),
                    vbr: self.vbr,
                    duration: Some(Duration::from_secs(227)),
                },
            })
        }

        fn write(&self, _path: &Path, _slot: TagSlot, _tag: Option<&RawTag>) -> Result<()> {
            Ok(())
        }
    }

    fn store() -> FileStore {
        store_with_vbr(false)
    }

    fn store_with_vbr(vbr: bool) -> FileStore {
        let mut store = FileStore::new(Box::new(DetailBackend { vbr }), TagConfig::default());
        store.open_file(Path::new("/music/Absolution/08.mp3")).unwrap();
        store.open_file(Path::new("/music/Absolution/09.mp3")).unwrap();
        let mut frames = FrameCollection::new();
        frames.set_text(FrameType::Artist, "AC/DC");
        frames.set_text(FrameType::Title, "Hysteria");
        frames.set_text(FrameType::Album, "Absolution");
        frames.set_number(FrameType::Track, 8);
        store.set_frames(FileIndex(0), TagSlot::V2, &frames, &Default::default());
        store
    }

    #[test]
    fn file_codes() {
        let store = store();
        let track = TrackData::from_file(&store, FileIndex(0), TagVersion::V2V1);
        let codes = TrackCodes::new(&track, &store);
        let text = format_string("%f|%e|%d|%D|%n|%o|%O|%b|%r|%m|%h|%k", &codes);
        assert_eq!(text, "08.mp3|.mp3|3:47|227|2|ID3v2.3||320|44100|Joint Stereo|2|MPEG 1 Layer 3");
        assert_eq!(codes.short_code('u').as_deref(), Some("file:///music/Absolution/08.mp3"));
    }

    #[test]
    fn vbr_code() {
        let store = store_with_vbr(true);
        let track = TrackData::from_file(&store, FileIndex(0), TagVersion::V2V1);
        let codes = TrackCodes::new(&track, &store);
        assert_eq!(format_string("%v|%{vbr}", &codes), "VBR|VBR");

        let store = self::store();
        let track = TrackData::from_file(&store, FileIndex(0), TagVersion::V2V1);
        let codes = TrackCodes::new(&track, &store);
        assert_eq!(format_string("[%v]", &codes), "[]");
    }

    #[test]
    fn filename_from_tags_appends_extension() {
        let store = store();
        let track = TrackData::from_file(&store, FileIndex(0), TagVersion::V2);
        let codes = TrackCodes::new(&track, &store);
        let separators = BTreeMap::from([("/".to_string(), "-".to_string())]);

        let name = format_filename_from_tags(&codes, "%{album}/%T %t", false, &separators);
        assert_eq!(name, "08 Hysteria.mp3");

        let dir = format_filename_from_tags(&codes, "%a/%l", true, &separators);
        assert_eq!(dir, "AC-DC/Absolution");
    }
}
