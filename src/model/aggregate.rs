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

//! Representative frames of a multi-file selection.
//!
//! Only frames whose value is identical in every added collection survive.
//! Every other frame is dropped and its key remembered as differing, so a
//! front end can show "multiple values" instead of a misleading single one.
//! Once a key differs it never comes back, which makes the result
//! independent of the order the collections are added in.

use std::collections::BTreeSet;

use super::{FrameCollection, FrameKey};

#[derive(Debug, Clone, Default)]
pub struct FrameAggregate {
    frames: FrameCollection,
    differing: BTreeSet<FrameKey>,
    count: usize,
    missing_tag: bool,
}

impl FrameAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the frames of one file, `None` if the file has no such tag.
    pub fn add(&mut self, frames: Option<&FrameCollection>) {
        let first = self.count == 0;
        self.count += 1;

        let Some(frames) = frames else {
            self.missing_tag = true;
            let keys: Vec<FrameKey> = self.frames.keys().cloned().collect();
            self.differing.extend(keys);
            self.frames = FrameCollection::new();
            return;
        };

        if first {
            self.frames = frames.clone();
            return;
        }
        if self.missing_tag {
            self.differing.extend(frames.keys().cloned());
            return;
        }

        let keys: BTreeSet<FrameKey> = self.frames.keys().chain(frames.keys()).cloned().collect();
        for key in keys {
            let ours = self.frames.get_key(&key).map(|f| f.value());
            let theirs = frames.get_key(&key).map(|f| f.value());
            if ours != theirs {
                self.frames.remove_key(&key);
                self.differing.insert(key);
            }
        }
    }

    /// Frames common to every added collection.
    pub fn frames(&self) -> &FrameCollection {
        &self.frames
    }

    pub fn into_frames(self) -> FrameCollection {
        self.frames
    }

    pub fn differing(&self) -> &BTreeSet<FrameKey> {
        &self.differing
    }

    pub fn is_different(&self, key: &FrameKey) -> bool {
        self.differing.contains(key)
    }

    /// Number of collections added so far.
    pub fn count(&self) -> usize {
        self.count
    }
}
