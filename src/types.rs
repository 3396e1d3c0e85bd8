//! Core types for spark-showcase.
//!
//! Plain values that flow from the host environment into the state
//! derivers and back out as snapshots for the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Section identity
// =============================================================================

/// Stable identifier of a page section (`"home"`, `"about"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Vertical extent of a section in viewport coordinates.
///
/// Both offsets are measured from the viewport's top edge, so a section
/// scrolled above the fold has a negative `top`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionBounds {
    pub top: f64,
    pub bottom: f64,
}

impl SectionBounds {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// True when the horizontal line `y` falls inside the section (inclusive).
    pub fn contains_line(&self, y: f64) -> bool {
        self.top <= y && self.bottom >= y
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

// =============================================================================
// Pointer
// =============================================================================

/// Raw pointer position in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Center-relative pointer offset used to drive parallax motion.
///
/// Unbounded: a pointer far outside the viewport yields large values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerOffset {
    pub dx: f64,
    pub dy: f64,
}

impl PointerOffset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Scale both axes, e.g. `-2.0` for a layer moving against the pointer.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_line_is_inclusive() {
        let bounds = SectionBounds::new(100.0, 400.0);
        assert!(bounds.contains_line(100.0));
        assert!(bounds.contains_line(400.0));
        assert!(!bounds.contains_line(99.9));
        assert!(!bounds.contains_line(400.1));
        assert_eq!(bounds.height(), 300.0);
    }

    #[test]
    fn test_section_id_conversions() {
        let id: SectionId = "about".into();
        assert_eq!(id.as_str(), "about");
        assert_eq!(id.to_string(), "about");
        assert_eq!(id, SectionId::new(String::from("about")));
    }

    #[test]
    fn test_pointer_offset_scaled() {
        let offset = PointerOffset::new(1.5, -2.0).scaled(-2.0);
        assert_eq!(offset, PointerOffset::new(-3.0, 4.0));
    }
}
