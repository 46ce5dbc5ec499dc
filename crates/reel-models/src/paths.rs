//! Media root resolution and media references.
//!
//! Every asset handled by the pipelines lives under a single media root. Callers
//! refer to assets with relative references which may carry the conventional
//! `media/` prefix; `media/clip.wav` and `clip.wav` denote the same file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Conventional prefix carried by references handed back to callers.
pub const MEDIA_PREFIX: &str = "media/";

/// Media root used when `REEL_ENV=production`.
pub const PRODUCTION_MEDIA_ROOT: &str = "/app/media";

/// Media root used for local development.
pub const LOCAL_MEDIA_ROOT: &str = "public/media";

/// Errors produced while parsing a media reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("media reference is empty")]
    Empty,

    #[error("media reference must be relative to the media root: {0}")]
    Absolute(String),

    #[error("media reference escapes the media root: {0}")]
    Escapes(String),
}

/// Strip a leading `media/` prefix, if present.
///
/// Only the prefix at the start is removed, so nested segments such as
/// `some/media/file.mp4` stay intact.
pub fn strip_media_prefix(reference: &str) -> &str {
    reference.strip_prefix(MEDIA_PREFIX).unwrap_or(reference)
}

/// A validated reference to an asset below the media root.
///
/// Stored without the `media/` prefix; [`fmt::Display`] renders it with the
/// prefix so outputs can be fed back in as inputs of later stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaRef(String);

impl MediaRef {
    /// Parse a caller supplied reference.
    pub fn parse(reference: impl AsRef<str>) -> Result<Self, ReferenceError> {
        let raw = reference.as_ref().trim();
        let relative = strip_media_prefix(raw);

        if relative.is_empty() {
            return Err(ReferenceError::Empty);
        }

        for component in Path::new(relative).components() {
            match component {
                Component::ParentDir => return Err(ReferenceError::Escapes(raw.to_string())),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ReferenceError::Absolute(raw.to_string()))
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }

        Ok(Self(relative.to_string()))
    }

    /// The reference relative to the media root, without prefix.
    pub fn as_relative(&self) -> &str {
        &self.0
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Extension of the final path segment, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Replace (or add) the extension of the final path segment.
    pub fn with_extension(&self, extension: &str) -> Self {
        let name = self.file_name();
        let stem = match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        };
        self.sibling(&format!("{}.{}", stem, extension))
    }

    /// A reference to `file_name` in the same directory as this one.
    pub fn sibling(&self, file_name: &str) -> Self {
        match self.0.rfind('/') {
            Some(idx) => Self(format!("{}/{}", &self.0[..idx], file_name)),
            None => Self(file_name.to_string()),
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MEDIA_PREFIX, self.0)
    }
}

impl FromStr for MediaRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaRef {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MediaRef> for String {
    fn from(value: MediaRef) -> Self {
        value.to_string()
    }
}

/// The filesystem directory every media reference resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoot {
    dir: PathBuf,
}

impl MediaRoot {
    /// Create a media root at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Media root for a named runtime environment.
    pub fn for_environment(environment: &str) -> Self {
        if environment.trim() == "production" {
            Self::new(PRODUCTION_MEDIA_ROOT)
        } else {
            Self::new(LOCAL_MEDIA_ROOT)
        }
    }

    /// Resolve the media root from environment variables.
    ///
    /// `MEDIA_ROOT` wins; otherwise `REEL_ENV` selects the production or
    /// local default.
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var("MEDIA_ROOT") {
            if !dir.trim().is_empty() {
                return Self::new(dir.trim());
            }
        }
        let environment = std::env::var("REEL_ENV").unwrap_or_else(|_| "localhost".to_string());
        Self::for_environment(&environment)
    }

    /// The root directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Filesystem path of a reference.
    pub fn resolve(&self, reference: &MediaRef) -> PathBuf {
        self.dir.join(reference.as_relative())
    }
}
