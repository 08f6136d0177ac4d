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

//! Tag backend built on the `lofty` crate.
//!
//! Writing a tag re-reads the tag currently in the file and replaces only the
//! text content with the edited raw tag. Pictures and other binary frames
//! are left in place.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use lofty::ape::{ApeItem as LoftyApeItem, ApeTag as LoftyApeTag};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{FileType, TaggedFile};
use lofty::flac::FlacFile;
use lofty::id3::v1::Id3v1Tag as LoftyId3v1Tag;
use lofty::id3::v2::{
    CommentFrame, ExtendedTextFrame, Frame as LoftyFrame, FrameId, Id3v2Tag as LoftyId3v2Tag,
    Id3v2Version as LoftyId3v2Version, TextInformationFrame,
};
use lofty::mpeg::{ChannelMode as LoftyChannelMode, MpegFile};
use lofty::musepack::MpcFile;
use lofty::ogg::{VorbisComments, VorbisFile};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::properties::FileProperties;
use lofty::tag::{ItemValue, TagType};

use crate::error::{Error, Result};
use crate::model::genre;
use crate::tag::ape::{ApeItem, ApeTag, ApeValue};
use crate::tag::encoding::{LibraryVersion, TextEncoding};
use crate::tag::id3v1::Id3v1Tag;
use crate::tag::id3v2::{FrameContent, Id3v2Frame, Id3v2Tag, Id3v2Version, YEAR_IDS};
use crate::tag::track::parse_year;
use crate::tag::xiph::XiphComment;
use crate::tag::{RawTag, TagSlot};

use super::{ChannelMode, DetailInfo, FileContents, FileFormat, TagBackend};

const LOFTY_VERSION: LibraryVersion = LibraryVersion::new(0, 22, 4);

#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyBackend;

impl LoftyBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TagBackend for LoftyBackend {
    fn name(&self) -> &'static str {
        "lofty"
    }

    fn version(&self) -> LibraryVersion {
        LOFTY_VERSION
    }

    fn read(&self, path: &Path) -> Result<FileContents> {
        let mut file = File::open(path)?;
        let format = detect_format(path, &mut file)?;
        log::debug!("Reading {} as {format}", path.display());

        match format {
            FileFormat::Mpeg => {
                let vbr = mpeg_is_vbr(&mut file)?;
                let mpeg_file = <MpegFile as AudioFile>::read_from(&mut file, parse_options())?;
                let channel_mode = channel_mode(*mpeg_file.properties().channel_mode());
                let tag_v1 = mpeg_file.id3v1().map(import_id3v1);
                let tag_v2 = mpeg_file.id3v2().map(import_id3v2);
                let tagged_file: TaggedFile = mpeg_file.into();
                let mut detail = detail_from(tagged_file.properties(), "MPEG");
                detail.channel_mode = Some(channel_mode);
                detail.vbr = vbr;
                Ok(FileContents { format, tag_v1, tag_v2, detail })
            }
            FileFormat::Flac => {
                let flac_file = <FlacFile as AudioFile>::read_from(&mut file, parse_options())?;
                let tag_v2 = flac_file.vorbis_comments().map(import_xiph);
                let tagged_file: TaggedFile = flac_file.into();
                let detail = detail_from(tagged_file.properties(), "FLAC");
                Ok(FileContents { format, tag_v1: None, tag_v2, detail })
            }
            FileFormat::OggVorbis => {
                let ogg_file = <VorbisFile as AudioFile>::read_from(&mut file, parse_options())?;
                let tag_v2 = Some(import_xiph(ogg_file.vorbis_comments()));
                let tagged_file: TaggedFile = ogg_file.into();
                let detail = detail_from(tagged_file.properties(), "Ogg Vorbis");
                Ok(FileContents { format, tag_v1: None, tag_v2, detail })
            }
            FileFormat::Musepack => {
                let mpc_file = <MpcFile as AudioFile>::read_from(&mut file, parse_options())?;
                let tag_v1 = mpc_file.id3v1().map(import_id3v1);
                let tag_v2 = mpc_file.ape().map(import_ape);
                let tagged_file: TaggedFile = mpc_file.into();
                let detail = detail_from(tagged_file.properties(), "Musepack");
                Ok(FileContents { format, tag_v1, tag_v2, detail })
            }
        }
    }

    fn write(&self, path: &Path, slot: TagSlot, tag: Option<&RawTag>) -> Result<()> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let format = detect_format(path, &mut file)?;

        let Some(tag) = tag else {
            log::debug!("Removing tag {slot} from {}", path.display());
            let tag_type = match (slot, format) {
                (TagSlot::V1, _) => TagType::Id3v1,
                (TagSlot::V2, FileFormat::Mpeg) => TagType::Id3v2,
                (TagSlot::V2, FileFormat::Flac | FileFormat::OggVorbis) => TagType::VorbisComments,
                (TagSlot::V2, FileFormat::Musepack) => TagType::Ape,
            };
            drop(file);
            tag_type.remove_from_path(path)?;
            return Ok(());
        };

        log::debug!("Writing {} to {}", tag.format_name(), path.display());
        let mut write_options = WriteOptions::default();
        match (format, tag) {
            (FileFormat::Mpeg, RawTag::Id3v1(raw)) => {
                let mut mpeg_file = <MpegFile as AudioFile>::read_from(&mut file, parse_options())?;
                mpeg_file.set_id3v1(export_id3v1(raw));
                file.rewind()?;
                mpeg_file.save_to(&mut file, write_options)?;
            }
            (FileFormat::Mpeg, RawTag::Id3v2(raw)) => {
                let mut mpeg_file = <MpegFile as AudioFile>::read_from(&mut file, parse_options())?;
                let mut id3v2 = mpeg_file.id3v2_mut().map(std::mem::take).unwrap_or_default();
                export_id3v2(raw, &mut id3v2);
                mpeg_file.set_id3v2(id3v2);
                file.rewind()?;
                let write_options = write_options.use_id3v23(raw.version != Id3v2Version::V4);
                mpeg_file.save_to(&mut file, write_options)?;
            }
            (FileFormat::Flac, RawTag::Xiph(raw)) => {
                let mut flac_file = <FlacFile as AudioFile>::read_from(&mut file, parse_options())?;
                let mut comments = flac_file
                    .vorbis_comments_mut()
                    .map(std::mem::take)
                    .unwrap_or_default();
                export_xiph(raw, &mut comments);
                flac_file.set_vorbis_comments(comments);
                file.rewind()?;
                flac_file.save_to(&mut file, write_options)?;
            }
            (FileFormat::OggVorbis, RawTag::Xiph(raw)) => {
                let mut ogg_file = <VorbisFile as AudioFile>::read_from(&mut file, parse_options())?;
                let mut comments = std::mem::take(ogg_file.vorbis_comments_mut());
                export_xiph(raw, &mut comments);
                ogg_file.set_vorbis_comments(comments);
                file.rewind()?;
                ogg_file.save_to(&mut file, write_options)?;
            }
            (FileFormat::Musepack, RawTag::Id3v1(raw)) => {
                let mut mpc_file = <MpcFile as AudioFile>::read_from(&mut file, parse_options())?;
                mpc_file.set_id3v1(export_id3v1(raw));
                file.rewind()?;
                mpc_file.save_to(&mut file, write_options)?;
            }
            (FileFormat::Musepack, RawTag::Ape(raw)) => {
                let mut mpc_file = <MpcFile as AudioFile>::read_from(&mut file, parse_options())?;
                let mut ape = mpc_file.ape_mut().map(std::mem::take).unwrap_or_default();
                export_ape(raw, &mut ape)?;
                mpc_file.set_ape(ape);
                file.rewind()?;
                mpc_file.save_to(&mut file, write_options)?;
            }
            (format, _) => {
                return Err(Error::TagNotSupported {
                    slot,
                    format: format.name(),
                });
            }
        }
        Ok(())
    }
}

fn parse_options() -> ParseOptions {
    ParseOptions::new().read_properties(true)
}

/// Detects the format from the content, falling back to the extension.
fn detect_format(path: &Path, file: &mut File) -> Result<FileFormat> {
    let guessed = Probe::new(file.try_clone()?).guess_file_type()?;
    file.rewind()?;
    let format = match guessed.file_type() {
        Some(FileType::Mpeg) => Some(FileFormat::Mpeg),
        Some(FileType::Flac) => Some(FileFormat::Flac),
        Some(FileType::Vorbis) => Some(FileFormat::OggVorbis),
        Some(FileType::Mpc) => Some(FileFormat::Musepack),
        Some(other) => {
            log::debug!("{} is {other:?}", path.display());
            None
        }
        None => FileFormat::from_path(path),
    };
    format.ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))
}

fn detail_from(properties: &FileProperties, codec: &str) -> DetailInfo {
    let duration = properties.duration();
    DetailInfo {
        codec: codec.to_string(),
        bitrate: properties.audio_bitrate().or(properties.overall_bitrate()),
        sample_rate: properties.sample_rate(),
        channels: properties.channels(),
        channel_mode: None,
        vbr: false,
        duration: (!duration.is_zero()).then_some(duration),
    }
}

/// Bytes of the first MPEG frame searched for a VBR header.
const VBR_HEADER_WINDOW: usize = 64;

/// Checks the first audio frame for a Xing or VBRI header, leaving the file
/// rewound.
fn mpeg_is_vbr(file: &mut File) -> Result<bool> {
    file.rewind()?;
    let mut header = [0u8; 10];
    let mut audio_start = 0;
    if file.read_exact(&mut header).is_ok() && header.starts_with(b"ID3") {
        let size = header[6..10]
            .iter()
            .fold(0u64, |acc, b| (acc << 7) | u64::from(b & 0x7f));
        let footer = if header[5] & 0x10 != 0 { 10 } else { 0 };
        audio_start = 10 + size + footer;
    }
    file.seek(SeekFrom::Start(audio_start))?;
    let mut data = Vec::with_capacity(4096);
    file.by_ref().take(4096).read_to_end(&mut data)?;
    file.rewind()?;
    Ok(has_vbr_header(&data))
}

/// True if the first frame in `data` carries a Xing or VBRI header, "Info"
/// marks a constant bitrate stream.
fn has_vbr_header(data: &[u8]) -> bool {
    let Some(sync) = data
        .windows(2)
        .position(|w| w[0] == 0xff && w[1] & 0xe0 == 0xe0)
    else {
        return false;
    };
    let frame = &data[sync..data.len().min(sync + VBR_HEADER_WINDOW)];
    frame.windows(4).any(|w| w == b"Xing" || w == b"VBRI")
}

fn channel_mode(mode: LoftyChannelMode) -> ChannelMode {
    match mode {
        LoftyChannelMode::Stereo => ChannelMode::Stereo,
        LoftyChannelMode::JointStereo => ChannelMode::JointStereo,
        LoftyChannelMode::DualChannel => ChannelMode::DualChannel,
        LoftyChannelMode::SingleChannel => ChannelMode::Mono,
        #[allow(unreachable_patterns)]
        _ => ChannelMode::Stereo,
    }
}

fn text_encoding(encoding: lofty::TextEncoding) -> TextEncoding {
    match encoding {
        lofty::TextEncoding::Latin1 => TextEncoding::Latin1,
        lofty::TextEncoding::UTF16 => TextEncoding::Utf16,
        lofty::TextEncoding::UTF16BE => TextEncoding::Utf16Be,
        lofty::TextEncoding::UTF8 => TextEncoding::Utf8,
        #[allow(unreachable_patterns)]
        _ => TextEncoding::Utf8,
    }
}

fn lofty_encoding(encoding: TextEncoding) -> lofty::TextEncoding {
    match encoding {
        TextEncoding::Latin1 => lofty::TextEncoding::Latin1,
        TextEncoding::Utf16 => lofty::TextEncoding::UTF16,
        TextEncoding::Utf16Be => lofty::TextEncoding::UTF16BE,
        TextEncoding::Utf8 => lofty::TextEncoding::UTF8,
    }
}

fn import_id3v1(tag: &LoftyId3v1Tag) -> RawTag {
    RawTag::Id3v1(Id3v1Tag {
        title: tag.title.clone().unwrap_or_default(),
        artist: tag.artist.clone().unwrap_or_default(),
        album: tag.album.clone().unwrap_or_default(),
        year: tag.year.clone().unwrap_or_default(),
        comment: tag.comment.clone().unwrap_or_default(),
        track: tag.track_number.unwrap_or(0),
        genre: tag.genre.unwrap_or(genre::NONE),
    })
}

fn export_id3v1(raw: &Id3v1Tag) -> LoftyId3v1Tag {
    let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
    let mut tag = LoftyId3v1Tag::default();
    tag.title = non_empty(&raw.title);
    tag.artist = non_empty(&raw.artist);
    tag.album = non_empty(&raw.album);
    tag.year = non_empty(&raw.year);
    tag.comment = non_empty(&raw.comment);
    tag.track_number = (raw.track > 0).then_some(raw.track);
    tag.genre = (raw.genre != genre::NONE).then_some(raw.genre);
    tag
}

fn import_id3v2(tag: &LoftyId3v2Tag) -> RawTag {
    let version = match tag.original_version() {
        LoftyId3v2Version::V2 => Id3v2Version::V2,
        LoftyId3v2Version::V3 => Id3v2Version::V3,
        LoftyId3v2Version::V4 => Id3v2Version::V4,
        #[allow(unreachable_patterns)]
        _ => Id3v2Version::V4,
    };
    let mut raw = Id3v2Tag::new(version);
    for frame in tag {
        let id = frame.id().as_str().to_string();
        let imported = match frame {
            LoftyFrame::Text(f) if !YEAR_IDS.contains(&id.as_str()) => Some(Id3v2Frame {
                encoding: text_encoding(f.encoding),
                content: FrameContent::Text(f.value.to_string().into()),
                id,
            }),
            LoftyFrame::Comment(f) => Some(Id3v2Frame {
                encoding: text_encoding(f.encoding),
                content: FrameContent::Comment {
                    language: String::from_utf8_lossy(&f.language).into_owned(),
                    description: f.description.to_string(),
                    text: f.content.to_string().into(),
                },
                id,
            }),
            LoftyFrame::UserText(f) => Some(Id3v2Frame {
                encoding: text_encoding(f.encoding),
                content: FrameContent::UserText {
                    description: f.description.to_string(),
                    value: f.content.to_string().into(),
                },
                id,
            }),
            LoftyFrame::Picture(f) => Some(Id3v2Frame {
                encoding: text_encoding(f.encoding),
                content: FrameContent::Binary(f.picture.data().to_vec()),
                id,
            }),
            _ => None,
        };
        raw.frames.extend(imported);
    }
    // TDRC is a timestamp frame in lofty, the year is taken through the accessor
    if let Some(year) = tag.year() {
        raw.frames.push(Id3v2Frame::text(
            version.year_frame_id(),
            TextEncoding::Latin1,
            year.to_string(),
        ));
    }
    RawTag::Id3v2(raw)
}

fn export_id3v2(raw: &Id3v2Tag, tag: &mut LoftyId3v2Tag) {
    tag.retain(|frame| {
        !matches!(
            frame,
            LoftyFrame::Text(_) | LoftyFrame::Comment(_) | LoftyFrame::UserText(_)
        )
    });
    tag.remove_year();

    for frame in &raw.frames {
        let id = FrameId::Valid(Cow::Owned(frame.id.clone()));
        let encoding = lofty_encoding(frame.encoding);
        let exported = match &frame.content {
            FrameContent::Text(text) if YEAR_IDS.contains(&frame.id.as_str()) => {
                if let Some(year) = parse_year(&text.to_text()) {
                    tag.set_year(year);
                }
                None
            }
            FrameContent::Text(text) => Some(LoftyFrame::Text(TextInformationFrame::new(
                id,
                encoding,
                text.to_text(),
            ))),
            FrameContent::Comment { language, description, text } => {
                Some(LoftyFrame::Comment(CommentFrame::new(
                    encoding,
                    language_code(language),
                    description.clone(),
                    text.to_text(),
                )))
            }
            FrameContent::UserText { description, value } => Some(LoftyFrame::UserText(
                ExtendedTextFrame::new(encoding, description.clone(), value.to_text()),
            )),
            FrameContent::Binary(_) => None,
        };
        if let Some(exported) = exported {
            tag.insert(exported);
        }
    }
}

fn language_code(language: &str) -> [u8; 3] {
    let mut code = *b"eng";
    if language.len() == 3 && language.is_ascii() {
        code.copy_from_slice(language.as_bytes());
    }
    code
}

fn import_xiph(comments: &VorbisComments) -> RawTag {
    RawTag::Xiph(XiphComment {
        vendor: comments.vendor().to_string(),
        fields: comments
            .items()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    })
}

fn export_xiph(raw: &XiphComment, comments: &mut VorbisComments) {
    let keys: Vec<String> = comments.items().map(|(key, _)| key.to_string()).collect();
    for key in keys {
        comments.remove(&key).for_each(drop);
    }
    for (key, value) in &raw.fields {
        comments.push(key.clone(), value.clone());
    }
}

fn import_ape(tag: &LoftyApeTag) -> RawTag {
    RawTag::Ape(ApeTag {
        items: tag
            .into_iter()
            .map(|item| ApeItem {
                key: item.key().to_string(),
                value: match item.value() {
                    ItemValue::Text(text) => ApeValue::Text(text.clone()),
                    ItemValue::Locator(locator) => ApeValue::Locator(locator.clone()),
                    ItemValue::Binary(data) => ApeValue::Binary(data.clone()),
                },
            })
            .collect(),
    })
}

fn export_ape(raw: &ApeTag, tag: &mut LoftyApeTag) -> Result<()> {
    let keys: Vec<String> = (&*tag)
        .into_iter()
        .filter(|item| !matches!(item.value(), ItemValue::Binary(_)))
        .map(|item| item.key().to_string())
        .collect();
    for key in keys {
        tag.remove(&key);
    }
    for item in &raw.items {
        let value = match &item.value {
            ApeValue::Text(text) => ItemValue::Text(text.clone()),
            ApeValue::Locator(locator) => ItemValue::Locator(locator.clone()),
            ApeValue::Binary(_) => continue,
        };
        tag.insert(LoftyApeItem::new(item.key.clone(), value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodings_map_both_ways() {
        for encoding in [
            TextEncoding::Latin1,
            TextEncoding::Utf16,
            TextEncoding::Utf16Be,
            TextEncoding::Utf8,
        ] {
            assert_eq!(text_encoding(lofty_encoding(encoding)), encoding);
        }
    }

    #[test]
    fn id3v1_conversion_keeps_fields() {
        let raw = Id3v1Tag {
            title: "Hysteria".into(),
            artist: "Muse".into(),
            album: String::new(),
            year: "2003".into(),
            comment: String::new(),
            track: 8,
            genre: 17,
        };
        let exported = export_id3v1(&raw);
        assert_eq!(exported.album, None);
        assert_eq!(import_id3v1(&exported), RawTag::Id3v1(raw));
    }

    #[test]
    fn language_code_falls_back_to_english() {
        assert_eq!(&language_code("deu"), b"deu");
        assert_eq!(&language_code(""), b"eng");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = LoftyBackend::new().read(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn vbr_header_in_first_frame() {
        let mut frame = vec![0u8; 3];
        frame.extend_from_slice(&[0xff, 0xfb, 0x90, 0x64]);
        frame.extend_from_slice(&[0u8; 32]);

        let mut xing = frame.clone();
        xing.extend_from_slice(b"Xing");
        assert!(has_vbr_header(&xing));

        let mut vbri = frame.clone();
        vbri.extend_from_slice(b"VBRI");
        assert!(has_vbr_header(&vbri));

        let mut info = frame.clone();
        info.extend_from_slice(b"Info");
        assert!(!has_vbr_header(&info));

        assert!(!has_vbr_header(b"Xing without a frame sync"));
    }

    #[test]
    fn vbr_detection_skips_id3v2_tag() {
        let mut file = tempfile::tempfile().unwrap();
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x10".to_vec();
        // the tag body may contain a sync pattern and "Xing" text
        data.extend_from_slice(&[0xff, 0xfb]);
        data.extend_from_slice(b"Xing");
        data.resize(10 + 16, 0);
        data.extend_from_slice(&[0xff, 0xfb, 0x90, 0x64]);
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(b"Info");
        std::io::Write::write_all(&mut file, &data).unwrap();

        assert!(!mpeg_is_vbr(&mut file).unwrap());
        assert_eq!(file.stream_position().unwrap(), 0);
    }

    #[test]
    fn lofty_never_mirrors() {
        assert!(!LoftyBackend::new().mirrors_utf16());
    }
}
