//! Adapter holding an open file handle directly.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::error::Failure;
use crate::manager::{ContextManager, Managed};

/// Open mode in the familiar `fopen` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `r`: read an existing file.
    Read,
    /// `w`: create or truncate, write only.
    Write,
    /// `a`: create if missing, append only.
    Append,
    /// `r+`: read and write an existing file.
    ReadWrite,
    /// `w+`: create or truncate, read and write.
    ReadTruncate,
    /// `a+`: create if missing, read and append.
    ReadAppend,
}

impl OpenMode {
    /// Whether the mode permits writing.
    #[must_use]
    pub fn writes(self) -> bool {
        !matches!(self, Self::Read)
    }

    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::ReadWrite => options.read(true).write(true),
            Self::ReadTruncate => options.read(true).write(true).create(true).truncate(true),
            Self::ReadAppend => options.read(true).append(true).create(true),
        };
        options
    }
}

/// Mode string that is not one of the `fopen` modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid open mode '{0}'")]
pub struct InvalidMode(pub String);

impl FromStr for OpenMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Binary flag is meaningless here.
        let normalized: String = s.chars().filter(|c| *c != 'b').collect();
        match normalized.as_str() {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "a" => Ok(Self::Append),
            "r+" => Ok(Self::ReadWrite),
            "w+" => Ok(Self::ReadTruncate),
            "a+" => Ok(Self::ReadAppend),
            _ => Err(InvalidMode(s.to_string())),
        }
    }
}

/// Arguments for opening a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArgs {
    /// Path to open.
    pub path: PathBuf,
    /// How to open it.
    pub mode: OpenMode,
}

impl FileArgs {
    /// Open `path` with `mode`.
    pub fn new(path: impl Into<PathBuf>, mode: OpenMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    /// Open `path` with an `fopen`-style mode string.
    pub fn parse(path: impl Into<PathBuf>, mode: &str) -> Result<Self, InvalidMode> {
        Ok(Self::new(path, mode.parse()?))
    }
}

impl<P: AsRef<Path>> From<(P, OpenMode)> for FileArgs {
    fn from((path, mode): (P, OpenMode)) -> Self {
        Self::new(path.as_ref(), mode)
    }
}

/// Adapter for [`File`]. Closes the handle on exit, or on drop if the
/// block never exited it.
///
/// Close failures are logged and never suppress or replace a failure
/// raised by a body.
#[derive(Debug, Default)]
pub struct FileManager {
    file: Option<File>,
    path: PathBuf,
    writable: bool,
}

impl FileManager {
    /// Path of the handle, if one was opened.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle, returning whether the close succeeded.
    ///
    /// Closing an absent handle succeeds.
    pub fn close(&mut self) -> bool {
        let Some(file) = self.file.take() else {
            return true;
        };
        if self.writable
            && let Err(error) = file.sync_all()
        {
            tracing::warn!(path = %self.path.display(), %error, "failed to flush file on close");
            return false;
        }
        tracing::debug!(path = %self.path.display(), "closed file");
        true
    }
}

impl ContextManager for FileManager {
    type Value = File;
    type Args = FileArgs;

    fn try_enter(&mut self, args: FileArgs) -> Result<bool, Failure> {
        self.path = args.path;
        self.writable = args.mode.writes();
        let file = args
            .mode
            .options()
            .open(&self.path)
            .map_err(Failure::raised)?;
        self.file = Some(file);
        Ok(true)
    }

    fn get(&mut self) -> &mut File {
        self.file
            .as_mut()
            .expect("file accessed outside an entered block")
    }

    fn exit(&mut self, _failure: Option<&Failure>) -> bool {
        self.close();
        false
    }
}

impl Drop for FileManager {
    fn drop(&mut self) {
        self.close();
    }
}

impl Managed for File {
    type Manager = FileManager;
}
