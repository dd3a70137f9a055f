//! Geometry primitives for positionable blocks
//!
//! Block geometry is kept in whole pixels relative to the container origin.
//! Initial values may be given as CSS-like lengths (`"200px"`, `"25%"`) and
//! are resolved against the container once it is known.

use crate::{CoreError, Result};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position and size of a block in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Geometry {
    /// Top-left offset from the container origin (left, top)
    pub position: IVec2,
    /// Width and height
    pub size: IVec2,
}

impl Geometry {
    /// Create geometry from flat pixel values
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    /// Left edge
    pub fn x(&self) -> i32 {
        self.position.x
    }

    /// Top edge
    pub fn y(&self) -> i32 {
        self.position.y
    }

    /// Width in pixels
    pub fn width(&self) -> i32 {
        self.size.x
    }

    /// Height in pixels
    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// Bottom-right corner (exclusive), clamped to the `i32` range
    pub fn max(&self) -> IVec2 {
        self.position.saturating_add(self.size)
    }

    /// Check whether a point lies inside the rectangle
    pub fn contains(&self, point: IVec2) -> bool {
        let max = self.max();
        point.x >= self.position.x && point.y >= self.position.y && point.x < max.x && point.y < max.y
    }

    /// Check that width and height are not negative
    pub fn validate(&self) -> Result<()> {
        if self.size.x < 0 || self.size.y < 0 {
            return Err(CoreError::InvalidGeometry(format!(
                "negative size {}x{}",
                self.size.x, self.size.y
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ ({}, {})",
            self.size.x, self.size.y, self.position.x, self.position.y
        )
    }
}

/// A length given either in pixels or as a percentage of the container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Length {
    /// Absolute pixels
    Px(f32),
    /// Percentage of the container extent along the same axis
    Percent(f32),
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

impl Length {
    /// Resolve to whole pixels against the container extent on the same axis
    pub fn resolve(&self, container_extent: i32) -> i32 {
        match self {
            Length::Px(px) => px.round() as i32,
            Length::Percent(pct) => (container_extent as f32 * pct / 100.0).round() as i32,
        }
    }
}

impl FromStr for Length {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || CoreError::InvalidLength(s.to_string());

        let (number, percent) = if let Some(n) = trimmed.strip_suffix('%') {
            (n, true)
        } else if let Some(n) = trimmed.strip_suffix("px") {
            (n, false)
        } else {
            (trimmed, false)
        };

        let value: f32 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        Ok(if percent {
            Length::Percent(value)
        } else {
            Length::Px(value)
        })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", v),
            Length::Percent(v) => write!(f, "{}%", v),
        }
    }
}

/// Container size expressed as a percentage of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RelativeSize {
    /// Width as percent of the viewport width (two decimals)
    pub width_percent: f32,
    /// Height as percent of the viewport height (two decimals)
    pub height_percent: f32,
}

impl RelativeSize {
    /// Compute the relative size of `container` inside `viewport`.
    ///
    /// An empty viewport yields `0%` on that axis.
    pub fn of(container: IVec2, viewport: IVec2) -> Self {
        fn percent(part: i32, whole: i32) -> f32 {
            if whole <= 0 {
                return 0.0;
            }
            let raw = part as f32 / whole as f32 * 100.0;
            (raw * 100.0).round() / 100.0
        }

        Self {
            width_percent: percent(container.x, viewport.x),
            height_percent: percent(container.y, viewport.y),
        }
    }

    /// Scale back to pixels for a given viewport
    pub fn to_pixels(&self, viewport: IVec2) -> glam::Vec2 {
        glam::Vec2::new(
            viewport.x as f32 * self.width_percent / 100.0,
            viewport.y as f32 * self.height_percent / 100.0,
        )
    }
}

/// One size-observation update published by a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SizeObservation {
    /// Surface size relative to the viewport
    pub relative: RelativeSize,
    /// Viewport the percentages refer to
    pub viewport: IVec2,
}

impl SizeObservation {
    /// Pixel size implied by the observation
    pub fn pixels(&self) -> glam::Vec2 {
        self.relative.to_pixels(self.viewport)
    }
}
