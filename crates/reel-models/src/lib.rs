//! Shared value types for the reel media pipeline.
//!
//! This crate provides plain, Serde-serializable types for:
//! - Media root resolution and media references
//! - Crop rectangles and video transitions
//! - Speaker diarization segments
//! - Encoding defaults shared by the pipelines
//! - Job identifiers

pub mod crop;
pub mod diarization;
pub mod encoding;
pub mod job;
pub mod paths;
pub mod transition;

// Re-export common types
pub use crop::CropRect;
pub use diarization::{normalize_segments, DiarizationSegment};
pub use encoding::{AudioEncoding, AudioFormat};
pub use job::JobId;
pub use paths::{strip_media_prefix, MediaRef, MediaRoot, ReferenceError, MEDIA_PREFIX};
pub use transition::Transition;
