//! Geometry Module - Section bounding rectangles
//!
//! The scroll tracker and reveal tracker ask the host where each named
//! section currently sits relative to the viewport. A section that is not
//! mounted reports `None`.
//!
//! [`PageLayout`] is a ready-made implementation for hosts (and tests) that
//! know each section's position in document space: viewport bounds are the
//! document rect shifted by the current scroll offset.

use std::cell::RefCell;
use std::collections::HashMap;

use super::events;
use crate::types::{SectionBounds, SectionId};

/// Host query for a section's current viewport-relative bounds.
pub trait SectionGeometry {
    fn bounds(&self, id: &SectionId) -> Option<SectionBounds>;
}

impl SectionGeometry for HashMap<SectionId, SectionBounds> {
    fn bounds(&self, id: &SectionId) -> Option<SectionBounds> {
        self.get(id).copied()
    }
}

impl<F> SectionGeometry for F
where
    F: Fn(&SectionId) -> Option<SectionBounds>,
{
    fn bounds(&self, id: &SectionId) -> Option<SectionBounds> {
        self(id)
    }
}

// =============================================================================
// PAGE LAYOUT
// =============================================================================

/// Where a section sits in the document, independent of scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DocumentRect {
    top: f64,
    height: f64,
}

/// Document-space layout of the page's sections.
///
/// Viewport bounds follow the global scroll offset from
/// [`events::scroll_offset`], the same way a DOM bounding rect follows
/// `window.scrollY`.
#[derive(Debug, Default)]
pub struct PageLayout {
    sections: RefCell<HashMap<SectionId, DocumentRect>>,
}

impl PageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack sections top to bottom starting at document offset 0.
    pub fn stacked<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<SectionId>,
    {
        let layout = Self::new();
        let mut top = 0.0;
        for (id, height) in sections {
            layout.insert(id, top, height);
            top += height;
        }
        layout
    }

    /// Mount (or move) a section at a document offset.
    pub fn insert(&self, id: impl Into<SectionId>, top: f64, height: f64) {
        self.sections
            .borrow_mut()
            .insert(id.into(), DocumentRect { top, height });
    }

    /// Unmount a section. Returns `true` if it was present.
    pub fn remove(&self, id: &SectionId) -> bool {
        self.sections.borrow_mut().remove(id).is_some()
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.sections.borrow().contains_key(id)
    }

    /// Total document height covered by mounted sections.
    pub fn document_height(&self) -> f64 {
        self.sections
            .borrow()
            .values()
            .map(|rect| rect.top + rect.height)
            .fold(0.0, f64::max)
    }

    /// Viewport bounds of `id` at an explicit scroll offset.
    pub fn bounds_at(&self, id: &SectionId, scroll_offset: f64) -> Option<SectionBounds> {
        self.sections.borrow().get(id).map(|rect| {
            let top = rect.top - scroll_offset;
            SectionBounds::new(top, top + rect.height)
        })
    }
}

impl SectionGeometry for PageLayout {
    fn bounds(&self, id: &SectionId) -> Option<SectionBounds> {
        self.bounds_at(id, events::scroll_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        events::reset_events();
    }

    #[test]
    fn test_stacked_layout_follows_scroll() {
        setup();

        let layout = PageLayout::stacked([("home", 800.0), ("about", 600.0)]);
        let about = SectionId::from("about");

        assert_eq!(layout.bounds(&about), Some(SectionBounds::new(800.0, 1400.0)));

        events::dispatch_scroll(750.0);
        assert_eq!(layout.bounds(&about), Some(SectionBounds::new(50.0, 650.0)));
        assert_eq!(layout.document_height(), 1400.0);
    }

    #[test]
    fn test_removed_section_is_absent() {
        setup();

        let layout = PageLayout::stacked([("home", 800.0)]);
        let home = SectionId::from("home");
        assert!(layout.remove(&home));
        assert_eq!(layout.bounds(&home), None);
        assert!(!layout.contains(&home));
    }

    #[test]
    fn test_closure_and_map_geometry() {
        let mut map = HashMap::new();
        map.insert(SectionId::from("home"), SectionBounds::new(0.0, 10.0));
        assert_eq!(
            map.bounds(&SectionId::from("home")),
            Some(SectionBounds::new(0.0, 10.0))
        );

        let closure = |id: &SectionId| (id.as_str() == "x").then(|| SectionBounds::new(1.0, 2.0));
        assert!(closure.bounds(&SectionId::from("x")).is_some());
        assert!(closure.bounds(&SectionId::from("y")).is_none());
    }
}
