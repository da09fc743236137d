//! Region selection for fingerprinting.
//!
//! A [`Region`] names the sub-rectangle of an image that gets hashed. The
//! same region convention must be used at signature-creation time and at
//! match time: a signature authored from the left half of a banner only
//! compares meaningfully against the left half of candidate images.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PerceptualError;

/// Which part of an image a fingerprint covers.
///
/// Serializes to the textual forms used by the persisted signature file:
/// `"whole"`, `"left"`, `"right"`, `"top"`, `"bottom"` or `"x,y,w,h"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Region {
    /// The full frame.
    #[default]
    Whole,
    /// Left half: width `floor(w/2)`, full height, origin (0,0).
    Left,
    /// Right half: the remainder after the left half.
    Right,
    /// Top half: full width, height `floor(h/2)`.
    Top,
    /// Bottom half: the remainder after the top half.
    Bottom,
    /// Explicit rectangle, clamped to image bounds at resolve time.
    Rect { x: u32, y: u32, w: u32, h: u32 },
}

/// A resolved crop rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Resolve this region against an image of `width` x `height` pixels.
    ///
    /// Half-splits are deterministic: the leading half (left/top) takes
    /// `floor(n/2)` pixels and the trailing half takes the remainder, so the
    /// two halves always tile the image exactly. Explicit rectangles are
    /// clamped to the image bounds.
    pub fn resolve(&self, width: u32, height: u32) -> Result<CropRect, PerceptualError> {
        let empty = || PerceptualError::EmptyRegion { width, height };
        if width == 0 || height == 0 {
            return Err(empty());
        }

        let rect = match *self {
            Region::Whole => CropRect {
                x: 0,
                y: 0,
                width,
                height,
            },
            Region::Left => CropRect {
                x: 0,
                y: 0,
                width: width / 2,
                height,
            },
            Region::Right => CropRect {
                x: width / 2,
                y: 0,
                width: width - width / 2,
                height,
            },
            Region::Top => CropRect {
                x: 0,
                y: 0,
                width,
                height: height / 2,
            },
            Region::Bottom => CropRect {
                x: 0,
                y: height / 2,
                width,
                height: height - height / 2,
            },
            Region::Rect { x, y, w, h } => {
                let x = x.min(width);
                let y = y.min(height);
                CropRect {
                    x,
                    y,
                    width: w.min(width - x),
                    height: h.min(height - y),
                }
            }
        };

        if rect.width == 0 || rect.height == 0 {
            return Err(empty());
        }
        Ok(rect)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Region::Whole => f.write_str("whole"),
            Region::Left => f.write_str("left"),
            Region::Right => f.write_str("right"),
            Region::Top => f.write_str("top"),
            Region::Bottom => f.write_str("bottom"),
            Region::Rect { x, y, w, h } => write!(f, "{x},{y},{w},{h}"),
        }
    }
}

impl FromStr for Region {
    type Err = PerceptualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "whole" => Ok(Region::Whole),
            "left" => Ok(Region::Left),
            "right" => Ok(Region::Right),
            "top" => Ok(Region::Top),
            "bottom" => Ok(Region::Bottom),
            other => {
                let parts: Vec<&str> = other.split(',').map(str::trim).collect();
                if parts.len() != 4 {
                    return Err(PerceptualError::InvalidRegion(s.to_string()));
                }
                let mut nums = [0u32; 4];
                for (slot, part) in nums.iter_mut().zip(&parts) {
                    *slot = part
                        .parse()
                        .map_err(|_| PerceptualError::InvalidRegion(s.to_string()))?;
                }
                let [x, y, w, h] = nums;
                Ok(Region::Rect { x, y, w, h })
            }
        }
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.to_string()
    }
}

impl TryFrom<String> for Region {
    type Error = PerceptualError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
