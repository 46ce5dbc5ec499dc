//! Crop rectangle produced by black-bar detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pixel region of a video frame to retain.
///
/// Bounds against the source frame are enforced by FFmpeg when the crop is
/// applied, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    pub fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self { width, height, x, y }
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// FFmpeg `crop` filter expression for this rectangle.
    pub fn filter(&self) -> String {
        format!("crop={}", self)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropRect {
    type Err = CropParseError;

    /// Parse the `W:H:X:Y` form printed by `cropdetect`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(CropParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| CropParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(CropRect::new(values[0], values[1], values[2], values[3]))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CropParseError {
    #[error("Invalid crop format: {0}, expected 'W:H:X:Y'")]
    InvalidFormat(String),
    #[error("Invalid number in crop: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_parse() {
        let rect: CropRect = "1920:800:0:140".parse().unwrap();
        assert_eq!(rect, CropRect::new(1920, 800, 0, 140));
        assert_eq!(rect.filter(), "crop=1920:800:0:140");
        assert_eq!(rect.area(), 1920 * 800);
    }

    #[test]
    fn test_crop_parse_errors() {
        assert!(matches!(
            "1920:800:0".parse::<CropRect>(),
            Err(CropParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1920:-8:0:0".parse::<CropRect>(),
            Err(CropParseError::InvalidNumber(_))
        ));
    }
}
