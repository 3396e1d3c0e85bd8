//! Reveal Module - One-shot "entered the viewport" latches
//!
//! Content sections animate in the first time they come into view and stay
//! revealed afterwards. A section is in view when it overlaps the viewport
//! shrunk by `margin` pixels at the top and at the bottom.
//!
//! The latch only moves one way: scrolling a revealed section back out of
//! view does not hide it again. `reset()` clears every latch.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::error::{ShowcaseError, ShowcaseResult};
use crate::host::events;
use crate::host::geometry::SectionGeometry;
use crate::types::{SectionBounds, SectionId};

/// Inset applied to the viewport before the overlap test.
pub const DEFAULT_REVEAL_MARGIN: f64 = 100.0;

/// Sections that animate in on first view.
pub const DEFAULT_REVEAL_SECTIONS: [&str; 3] = ["about", "projects", "contact"];

/// True when `bounds` overlaps the viewport inset by `margin`.
pub fn is_in_view(bounds: SectionBounds, viewport_height: f64, margin: f64) -> bool {
    bounds.top < viewport_height - margin && bounds.bottom > margin
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub sections: Vec<SectionId>,
    pub margin: f64,
}

impl RevealConfig {
    pub fn validate(&self) -> ShowcaseResult<()> {
        if self.sections.is_empty() {
            return Err(ShowcaseError::NoSections);
        }
        let mut seen = HashSet::new();
        for id in &self.sections {
            if !seen.insert(id) {
                return Err(ShowcaseError::DuplicateSection(id.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            sections: DEFAULT_REVEAL_SECTIONS.iter().map(|s| SectionId::from(*s)).collect(),
            margin: DEFAULT_REVEAL_MARGIN,
        }
    }
}

struct RevealInner {
    config: RevealConfig,
    geometry: Rc<dyn SectionGeometry>,
    revealed: Signal<BTreeSet<SectionId>>,
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl RevealInner {
    fn evaluate(&self) {
        let height = events::viewport().height;
        let mut revealed = self.revealed.get();
        let mut changed = false;

        for id in &self.config.sections {
            if revealed.contains(id) {
                continue;
            }
            let visible = self
                .geometry
                .bounds(id)
                .is_some_and(|bounds| is_in_view(bounds, height, self.config.margin));
            if visible {
                tracing::trace!(section = %id, "section revealed");
                revealed.insert(id.clone());
                changed = true;
            }
        }

        if changed {
            self.revealed.set(revealed);
        }
    }
}

/// Latches sections as revealed the first time they come into view.
pub struct RevealTracker {
    inner: Rc<RevealInner>,
}

impl RevealTracker {
    pub fn new(config: RevealConfig, geometry: Rc<dyn SectionGeometry>) -> ShowcaseResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Rc::new(RevealInner {
                config,
                geometry,
                revealed: signal(BTreeSet::new()),
                cleanup: RefCell::new(None),
            }),
        })
    }

    /// Evaluate once and re-evaluate on every scroll event.
    pub fn mount(&self) {
        if self.is_mounted() {
            return;
        }
        self.inner.evaluate();

        let weak: Weak<RevealInner> = Rc::downgrade(&self.inner);
        let cleanup = events::on_scroll(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.evaluate();
            }
        });
        *self.inner.cleanup.borrow_mut() = Some(Box::new(cleanup));
        tracing::debug!(sections = self.inner.config.sections.len(), "reveal tracker mounted");
    }

    pub fn unmount(&self) {
        let cleanup = self.inner.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
            tracing::debug!("reveal tracker unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.cleanup.borrow().is_some()
    }

    /// Check every unrevealed section against current geometry.
    pub fn evaluate(&self) {
        self.inner.evaluate();
    }

    pub fn is_revealed(&self, id: &SectionId) -> bool {
        self.inner.revealed.get().contains(id)
    }

    pub fn revealed(&self) -> BTreeSet<SectionId> {
        self.inner.revealed.get()
    }

    pub fn revealed_signal(&self) -> Signal<BTreeSet<SectionId>> {
        self.inner.revealed.clone()
    }

    pub fn reset(&self) {
        self.inner.revealed.set(BTreeSet::new());
    }
}

impl Drop for RevealTracker {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::geometry::PageLayout;

    fn setup() -> Rc<PageLayout> {
        events::reset_events();
        events::set_viewport(1280.0, 800.0);
        Rc::new(PageLayout::stacked([
            ("home", 800.0),
            ("about", 600.0),
            ("projects", 900.0),
            ("contact", 500.0),
        ]))
    }

    #[test]
    fn test_in_view_respects_margin() {
        // Section starting 750px down an 800px viewport: inside the raw
        // viewport but below the inset bottom edge at 700.
        assert!(!is_in_view(SectionBounds::new(750.0, 1200.0), 800.0, 100.0));
        assert!(is_in_view(SectionBounds::new(650.0, 1200.0), 800.0, 100.0));
        // Scrolled almost entirely above the inset top edge.
        assert!(!is_in_view(SectionBounds::new(-500.0, 100.0), 800.0, 100.0));
        assert!(is_in_view(SectionBounds::new(-500.0, 101.0), 800.0, 100.0));
    }

    #[test]
    fn test_reveal_latches_once_seen() {
        let layout = setup();
        let tracker = RevealTracker::new(RevealConfig::default(), layout).unwrap();
        tracker.mount();

        let about = SectionId::from("about");
        assert!(!tracker.is_revealed(&about));

        events::dispatch_scroll(200.0);
        assert!(tracker.is_revealed(&about));
        assert!(!tracker.is_revealed(&SectionId::from("projects")));

        // Back to the top: stays revealed.
        events::dispatch_scroll(0.0);
        assert!(tracker.is_revealed(&about));
    }

    #[test]
    fn test_mount_reveals_sections_already_visible() {
        let layout = setup();
        events::dispatch_scroll(1500.0);

        let tracker = RevealTracker::new(RevealConfig::default(), layout).unwrap();
        tracker.mount();
        let revealed: Vec<String> = tracker.revealed().iter().map(|id| id.to_string()).collect();
        assert_eq!(revealed, vec!["projects"]);
    }

    #[test]
    fn test_missing_section_is_not_revealed() {
        let layout = setup();
        layout.remove(&SectionId::from("about"));
        let tracker = RevealTracker::new(RevealConfig::default(), layout.clone()).unwrap();
        tracker.mount();

        events::dispatch_scroll(200.0);
        assert!(tracker.revealed().is_empty());

        layout.insert("about", 800.0, 600.0);
        events::dispatch_scroll(210.0);
        assert!(tracker.is_revealed(&SectionId::from("about")));
    }

    #[test]
    fn test_reset_and_unmount() {
        let layout = setup();
        let tracker = RevealTracker::new(RevealConfig::default(), layout).unwrap();
        tracker.mount();
        events::dispatch_scroll(200.0);
        assert_eq!(tracker.revealed().len(), 1);

        tracker.reset();
        assert!(tracker.revealed().is_empty());

        tracker.unmount();
        events::dispatch_scroll(250.0);
        assert!(tracker.revealed().is_empty());
    }

    #[test]
    fn test_config_validation() {
        let config = RevealConfig {
            sections: vec![],
            ..Default::default()
        };
        assert!(matches!(
            RevealTracker::new(config, setup()),
            Err(ShowcaseError::NoSections)
        ));
    }
}
