use serde::{Deserialize, Serialize};

/// Fraction of the background width a foreground at scale 1.0 occupies.
pub const BASE_FRACTION: f32 = 0.33;

/// Allowed scale range for a placement.
pub const SCALE_MIN: f32 = 0.3;
pub const SCALE_MAX: f32 = 2.0;

/// Where and how large a foreground renders inside a background.
///
/// The anchor is a fractional position within the background bounds and
/// denotes the foreground's visual *center*, not its top-left corner.
/// Scale multiplies [`BASE_FRACTION`] of the background width.
///
/// Immutable by convention: composer gestures replace the whole value,
/// they never mutate it incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            anchor_x: 0.5,
            anchor_y: 0.5,
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn new(anchor_x: f32, anchor_y: f32, scale: f32) -> Self {
        Self {
            anchor_x,
            anchor_y,
            scale,
        }
    }

    /// Range-clamped copy: anchor into [0, 1] on both axes, scale into
    /// [[`SCALE_MIN`], [`SCALE_MAX`]]. Non-finite components collapse
    /// to the default. Callers clamp before handing a placement to the
    /// compositor, and the compositor clamps again at its own boundary.
    pub fn clamped(self) -> Self {
        if !self.anchor_x.is_finite() || !self.anchor_y.is_finite() || !self.scale.is_finite() {
            return Self::default();
        }
        Self {
            anchor_x: self.anchor_x.clamp(0.0, 1.0),
            anchor_y: self.anchor_y.clamp(0.0, 1.0),
            scale: self.scale.clamp(SCALE_MIN, SCALE_MAX),
        }
    }
}
