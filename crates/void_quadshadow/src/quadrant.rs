//! Frustum Quadrants
//!
//! The light's orthographic shadow frustum is split into four fixed quadrants.
//! Each quadrant is a fractional range of the parent frustum's width and
//! height; slicing the parent bounds by a quadrant yields the bounds one
//! caster renders.
//!
//! ```text
//!   y=1 +---------+---------+
//!       |    0    |    1    |
//!       | top-lft | top-rgt |
//! y=0.5 +---------+---------+
//!       |    3    |    2    |
//!       | bot-lft | bot-rgt |
//!   y=0 +---------+---------+
//!      x=0      x=0.5      x=1
//! ```

use glam::Mat4;
use serde::{Serialize, Deserialize};

use crate::error::{QuadShadowError, Result};

/// Number of quadrants (and casters)
pub const QUADRANT_COUNT: usize = 4;

/// Fractional sub-region of a shadow frustum
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrustumQuadrant {
    /// Horizontal range as fractions of the parent width
    pub x: [f32; 2],
    /// Vertical range as fractions of the parent height
    pub y: [f32; 2],
}

impl FrustumQuadrant {
    pub const TOP_LEFT: Self = Self { x: [0.0, 0.5], y: [0.5, 1.0] };
    pub const TOP_RIGHT: Self = Self { x: [0.5, 1.0], y: [0.5, 1.0] };
    pub const BOTTOM_RIGHT: Self = Self { x: [0.5, 1.0], y: [0.0, 0.5] };
    pub const BOTTOM_LEFT: Self = Self { x: [0.0, 0.5], y: [0.0, 0.5] };

    /// Quadrant for an index in `0..QUADRANT_COUNT`
    pub fn by_index(index: usize) -> Option<Self> {
        QUADRANTS.get(index).copied()
    }

    /// Fractional area covered by this quadrant
    pub fn area(&self) -> f32 {
        (self.x[1] - self.x[0]) * (self.y[1] - self.y[0])
    }
}

/// Fixed quadrant layout, indexed by quadrant tag
pub const QUADRANTS: [FrustumQuadrant; QUADRANT_COUNT] = [
    FrustumQuadrant::TOP_LEFT,
    FrustumQuadrant::TOP_RIGHT,
    FrustumQuadrant::BOTTOM_RIGHT,
    FrustumQuadrant::BOTTOM_LEFT,
];

/// Orthographic shadow camera bounds in light space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowFrustumBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowFrustumBounds {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            near: 0.5,
            far: 500.0,
        }
    }
}

impl ShadowFrustumBounds {
    /// Create validated bounds
    ///
    /// Requires `left < right`, `bottom < top` and `near < far`.
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Result<Self> {
        let bounds = Self { left, right, top, bottom, near, far };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check the ordering invariants
    pub fn validate(&self) -> Result<()> {
        let finite = [self.left, self.right, self.top, self.bottom, self.near, self.far]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(QuadShadowError::Configuration(format!(
                "shadow frustum bounds must be finite: {:?}", self
            )));
        }
        if self.left >= self.right {
            return Err(QuadShadowError::Configuration(format!(
                "shadow frustum left ({}) must be less than right ({})", self.left, self.right
            )));
        }
        if self.bottom >= self.top {
            return Err(QuadShadowError::Configuration(format!(
                "shadow frustum bottom ({}) must be less than top ({})", self.bottom, self.top
            )));
        }
        if self.near >= self.far {
            return Err(QuadShadowError::Configuration(format!(
                "shadow frustum near ({}) must be less than far ({})", self.near, self.far
            )));
        }
        Ok(())
    }

    /// Width in light-space units
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height in light-space units
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Cut out the region a quadrant covers; near/far are kept
    pub fn slice(&self, quadrant: &FrustumQuadrant) -> Self {
        let width = self.width();
        let height = self.height();

        Self {
            left: self.left + width * quadrant.x[0],
            right: self.left + width * quadrant.x[1],
            top: self.bottom + height * quadrant.y[1],
            bottom: self.bottom + height * quadrant.y[0],
            near: self.near,
            far: self.far,
        }
    }

    /// Orthographic projection (wgpu depth range)
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }
}
