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

//! Renaming directories after the tags of the files they contain.
//!
//! Planning and execution are separate, so the actions can be shown before
//! anything is touched. The plan never schedules two actions with the same
//! source or the same destination: the first file of a directory decides
//! what happens to it.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::error::{BatchError, Error, Result};

/// Where the generated directory name goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameMode {
    /// Replace the directory of the file.
    #[default]
    Rename,
    /// Create the directory inside the directory of the file.
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameAction {
    CreateDirectory { dest: PathBuf },
    RenameDirectory { src: PathBuf, dest: PathBuf },
    RenameFile { src: PathBuf, dest: PathBuf },
}

impl RenameAction {
    pub fn source(&self) -> Option<&Path> {
        match self {
            RenameAction::CreateDirectory { .. } => None,
            RenameAction::RenameDirectory { src, .. } | RenameAction::RenameFile { src, .. } => Some(src),
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            RenameAction::CreateDirectory { dest }
            | RenameAction::RenameDirectory { dest, .. }
            | RenameAction::RenameFile { dest, .. } => dest,
        }
    }

    fn execute(&self) -> Result<()> {
        match self {
            RenameAction::CreateDirectory { dest } => {
                if dest.is_dir() {
                    return Ok(());
                }
                fs::create_dir(dest).map_err(|source| Error::CreateDirFailed {
                    path: dest.clone(),
                    source,
                })
            }
            RenameAction::RenameDirectory { src, dest } => {
                if dest.exists() {
                    return Err(Error::AlreadyExists(dest.clone()));
                }
                if !src.is_dir() {
                    return Err(Error::NotADirectory(src.clone()));
                }
                rename(src, dest)
            }
            RenameAction::RenameFile { src, dest } => {
                if dest.is_file() {
                    return Ok(());
                }
                if dest.exists() {
                    return Err(Error::AlreadyExists(dest.clone()));
                }
                if !src.is_file() {
                    return Err(Error::NotAFile(src.clone()));
                }
                rename(src, dest)
            }
        }
    }
}

fn rename(src: &Path, dest: &Path) -> Result<()> {
    fs::rename(src, dest).map_err(|source| Error::RenameFailed {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })
}

impl fmt::Display for RenameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameAction::CreateDirectory { dest } => write!(f, "Create directory {}", dest.display()),
            RenameAction::RenameDirectory { src, dest } => {
                write!(f, "Rename directory {} to {}", src.display(), dest.display())
            }
            RenameAction::RenameFile { src, dest } => {
                write!(f, "Rename file {} to {}", src.display(), dest.display())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    actions: Vec<RenameAction>,
    done: Vec<bool>,
}

impl RenamePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[RenameAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn add(&mut self, action: RenameAction) {
        let taken = self.actions.iter().any(|a| {
            action.source().is_some_and(|src| a.source() == Some(src)) || a.destination() == action.destination()
        });
        if !taken {
            debug!("Scheduled: {action}");
            self.actions.push(action);
        }
    }

    fn has_source(&self, src: &Path) -> bool {
        self.actions.iter().any(|a| a.source() == Some(src))
    }

    fn has_destination(&self, dest: &Path) -> bool {
        self.actions.iter().any(|a| a.destination() == dest)
    }

    /// Follows scheduled directory renames of `dir`, at most five levels.
    fn renamed(&self, dir: &Path) -> PathBuf {
        let mut dir = dir.to_path_buf();
        for _ in 0..5 {
            let next = self.actions.iter().find_map(|a| match a {
                RenameAction::RenameDirectory { src, dest } if *src == dir => Some(dest.clone()),
                _ => None,
            });
            match next {
                Some(dest) => dir = dest,
                None => break,
            }
        }
        dir
    }

    /// Schedules the actions moving `file` into a directory named `new_name`.
    ///
    /// With [`RenameMode::Rename`] `new_name` replaces the directory of the
    /// file, with [`RenameMode::Create`] it is created inside it. `new_name`
    /// may contain several levels separated by `/`.
    pub fn schedule(&mut self, file: &Path, new_name: &str, mode: RenameMode) {
        let (Some(dir), Some(filename)) = (file.parent(), file.file_name()) else {
            return;
        };
        let base = match mode {
            RenameMode::Rename => dir.parent().unwrap_or(dir),
            RenameMode::Create => dir,
        };
        let new_dir = join_relative(base, new_name);
        let mut current = dir.to_path_buf();

        // A first round renames the directory, a second one creates the
        // remaining levels inside it.
        for _ in 0..2 {
            current = self.renamed(&current);
            if new_dir == current {
                return;
            }
            if let Ok(rest) = new_dir.strip_prefix(&current) {
                let files_dir = current.clone();
                for part in rest.components() {
                    current.push(part);
                    self.add(RenameAction::CreateDirectory { dest: current.clone() });
                }
                self.add(RenameAction::RenameFile {
                    src: files_dir.join(filename),
                    dest: current.join(filename),
                });
                return;
            }

            let Some(parent) = current.parent().map(Path::to_path_buf) else {
                return;
            };
            let Ok(rest) = new_dir.strip_prefix(&parent) else {
                warn!("{} is too different from {}", new_dir.display(), current.display());
                return;
            };
            let Some(first) = rest.components().next() else {
                return;
            };
            let target = parent.join(first);
            if (target.is_dir() && !self.has_source(&target)) || self.has_destination(&target) {
                self.add(RenameAction::RenameFile {
                    src: current.join(filename),
                    dest: target.join(filename),
                });
            } else {
                self.add(RenameAction::RenameDirectory {
                    src: current.clone(),
                    dest: target.clone(),
                });
            }
            current = target;
            if rest.components().count() < 2 {
                return;
            }
        }
    }

    /// Performs the actions in order, continuing past failures.
    ///
    /// # Returns
    ///
    /// The number of actions performed.
    ///
    /// # Errors
    ///
    /// Every action which failed, keyed by its source or destination.
    pub fn execute(&mut self) -> std::result::Result<usize, BatchError> {
        let mut errors = BatchError::default();
        self.done = self
            .actions
            .iter()
            .map(|action| match action.execute() {
                Ok(()) => true,
                Err(e) => {
                    warn!("{action} failed: {e}");
                    errors.push(action.source().unwrap_or(action.destination()), e);
                    false
                }
            })
            .collect();
        let performed = self.done.iter().filter(|done| **done).count();
        errors.into_result().map(|()| performed)
    }

    /// Where a file is after the performed actions.
    pub fn relocate(&self, path: &Path) -> PathBuf {
        let mut path = path.to_path_buf();
        for (action, _) in self.actions.iter().zip(&self.done).filter(|(_, done)| **done) {
            match action {
                RenameAction::RenameDirectory { src, dest } => {
                    if let Ok(rest) = path.strip_prefix(src) {
                        path = dest.join(rest);
                    }
                }
                RenameAction::RenameFile { src, dest } if *src == path => path = dest.clone(),
                _ => {}
            }
        }
        path
    }
}

/// Joins a generated relative name, ignoring empty, `.` and `..` levels.
fn join_relative(base: &Path, name: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_directory_once() {
        let mut plan = RenamePlan::new();
        plan.schedule(Path::new("/m/unknown/01.mp3"), "Muse - Absolution", RenameMode::Rename);
        plan.schedule(Path::new("/m/unknown/02.mp3"), "Muse - Absolution", RenameMode::Rename);

        assert_eq!(
            plan.actions(),
            &[RenameAction::RenameDirectory {
                src: "/m/unknown".into(),
                dest: "/m/Muse - Absolution".into(),
            }]
        );
    }

    #[test]
    fn same_name_does_nothing() {
        let mut plan = RenamePlan::new();
        plan.schedule(Path::new("/m/Absolution/01.mp3"), "Absolution", RenameMode::Rename);
        assert!(plan.is_empty());
    }

    #[test]
    fn nested_name_renames_then_creates() {
        let mut plan = RenamePlan::new();
        plan.schedule(Path::new("/m/unknown/01.mp3"), "Muse/Absolution", RenameMode::Rename);

        assert_eq!(
            plan.actions(),
            &[
                RenameAction::RenameDirectory {
                    src: "/m/unknown".into(),
                    dest: "/m/Muse".into(),
                },
                RenameAction::CreateDirectory {
                    dest: "/m/Muse/Absolution".into(),
                },
                RenameAction::RenameFile {
                    src: "/m/Muse/01.mp3".into(),
                    dest: "/m/Muse/Absolution/01.mp3".into(),
                },
            ]
        );
    }

    #[test]
    fn create_mode_moves_files_into_new_directory() {
        let mut plan = RenamePlan::new();
        plan.schedule(Path::new("/m/in/01.mp3"), "Muse", RenameMode::Create);
        plan.schedule(Path::new("/m/in/02.mp3"), "Muse", RenameMode::Create);

        assert_eq!(plan.actions().len(), 3);
        assert_eq!(plan.actions()[0].destination(), Path::new("/m/in/Muse"));
        assert_eq!(plan.actions()[2].destination(), Path::new("/m/in/Muse/02.mp3"));
    }

    #[test]
    fn execute_reports_every_failure() {
        let mut plan = RenamePlan::new();
        plan.schedule(Path::new("/no/such/a/01.mp3"), "b", RenameMode::Rename);
        plan.schedule(Path::new("/no/such/c/01.mp3"), "d", RenameMode::Rename);

        let err = plan.execute().unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.to_string().contains("/no/such/a is not a directory"));
        assert_eq!(plan.relocate(Path::new("/no/such/a/01.mp3")), PathBuf::from("/no/such/a/01.mp3"));
    }
}
