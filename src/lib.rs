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

//! # Audio tag normalisation.
//!
//! Reads and edits the tags of MP3, Ogg Vorbis, FLAC and Musepack files.
//!
//! Every on-disk format (ID3v1, ID3v2, Vorbis comments, APE) is mapped onto
//! one canonical [`model::FrameCollection`], so editing, copying between tag
//! versions and generating file names work the same for all of them.
//!
//! ## Architecture
//!
//! * [`backend`] reads files into the raw tag models of [`tag`] and writes
//!   them back, [`backend::LoftyBackend`] does the actual I/O.
//! * [`file`] holds the opened files, the [`file::FileStore`] owns them.
//! * [`format`] translates between tags and file names with percent-code
//!   format strings.
//! * [`editor::Session`] ties everything together and provides the bulk
//!   operations on a selection of files.

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod file;
pub mod format;
pub mod model;
pub mod tag;
pub mod track;
pub mod util;

pub use editor::Session;
pub use error::{BatchError, Error, Result};
