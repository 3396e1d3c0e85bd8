//! Scroll Module - Scrolled flag and active-section tracking
//!
//! Derives two values from the page's scroll position:
//!
//! - `scrolled` - true once the offset passes a threshold (default 50px)
//! - `active` - the first declared section crossing the anchor line
//!   (default 100px below the viewport top)
//!
//! When no section crosses the anchor line the previous active section is
//! kept, so the navigation never flickers back to "nothing".
//!
//! Scroll events can arrive many times per frame. In coalescing mode (the
//! default) `on_scroll` only records the latest offset and the geometry
//! reads happen once per frame, in `flush_frame()`. A tracker built with
//! [`ScrollTracker::with_scheduler`] also arms a single zero-delay flush on
//! the scheduler when an offset first goes pending, so the frame boundary
//! is the scheduler's next tick even if nobody calls `flush_frame()`.
//!
//! Also home to [`ScrollLink`], a clamped linear mapping from scroll offset
//! to a motion value (hero parallax and fade).
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_showcase::host::{events, PageLayout};
//! use spark_showcase::state::scroll::{ScrollTracker, ScrollTrackerConfig};
//!
//! let layout = Rc::new(PageLayout::stacked([("home", 900.0), ("about", 700.0)]));
//! let tracker = ScrollTracker::new(ScrollTrackerConfig::default(), layout)?;
//! tracker.mount();
//!
//! events::dispatch_scroll(850.0);
//! tracker.flush_frame();
//! assert_eq!(tracker.active_section().unwrap().as_str(), "about");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::error::{ShowcaseError, ShowcaseResult};
use crate::host::clock::{Scheduler, TimerId};
use crate::host::events;
use crate::host::geometry::SectionGeometry;
use crate::types::SectionId;

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Offset past which the page counts as scrolled.
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 50.0;

/// Anchor line, measured from the viewport top.
pub const DEFAULT_ANCHOR_LINE: f64 = 100.0;

/// Sections of the page in declared order.
pub const DEFAULT_SECTIONS: [&str; 4] = ["home", "about", "projects", "contact"];

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration for a [`ScrollTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTrackerConfig {
    /// Section ids in declared order. Order is the tie-break.
    pub sections: Vec<SectionId>,
    pub threshold: f64,
    pub anchor_line: f64,
    /// Active section before the first match.
    pub initial_active: Option<SectionId>,
    /// Defer evaluation to `flush_frame()` (default: true).
    pub coalesce: bool,
}

impl ScrollTrackerConfig {
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

impl Default for ScrollTrackerConfig {
    fn default() -> Self {
        Self {
            sections: DEFAULT_SECTIONS.iter().map(|s| SectionId::from(*s)).collect(),
            threshold: DEFAULT_SCROLL_THRESHOLD,
            anchor_line: DEFAULT_ANCHOR_LINE,
            initial_active: Some(SectionId::from("home")),
            coalesce: true,
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Strictly greater than: an offset equal to the threshold is not scrolled.
pub fn is_past_threshold(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

/// First section, in declared order, whose bounds contain the anchor line.
///
/// Sections the geometry does not know about are skipped.
pub fn resolve_active_section<'a, G>(
    sections: &'a [SectionId],
    geometry: &G,
    anchor_line: f64,
) -> Option<&'a SectionId>
where
    G: SectionGeometry + ?Sized,
{
    sections.iter().find(|id| {
        geometry
            .bounds(id)
            .is_some_and(|bounds| bounds.contains_line(anchor_line))
    })
}

// =============================================================================
// TRACKER
// =============================================================================

/// Snapshot read by the navigation bar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollState {
    pub scrolled: bool,
    pub active: Option<SectionId>,
}

struct TrackerInner {
    config: ScrollTrackerConfig,
    geometry: Rc<dyn SectionGeometry>,
    state: Signal<ScrollState>,
    pending: Cell<Option<f64>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    flush_timer: Cell<Option<TimerId>>,
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl TrackerInner {
    fn evaluate(&self, offset: f64) {
        let current = self.state.get();
        let resolved =
            resolve_active_section(&self.config.sections, self.geometry.as_ref(), self.config.anchor_line);
        let next = ScrollState {
            scrolled: is_past_threshold(offset, self.config.threshold),
            active: resolved.cloned().or_else(|| current.active.clone()),
        };
        if next != current {
            if next.active != current.active {
                tracing::trace!(active = ?next.active, offset, "active section changed");
            }
            self.state.set(next);
        }
    }

    fn on_scroll(self: &Rc<Self>, offset: f64) {
        if !self.config.coalesce {
            self.evaluate(offset);
            return;
        }
        if self.pending.replace(Some(offset)).is_none() {
            self.arm_flush();
        }
    }

    fn arm_flush(self: &Rc<Self>) {
        let Some(scheduler) = &self.scheduler else {
            return;
        };
        if self.flush_timer.get().is_some() {
            return;
        }
        let weak: Weak<TrackerInner> = Rc::downgrade(self);
        let id = scheduler.schedule(
            0,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.flush_timer.set(None);
                    inner.flush();
                }
            }),
        );
        self.flush_timer.set(Some(id));
    }

    fn cancel_flush(&self) {
        if let (Some(id), Some(scheduler)) = (self.flush_timer.take(), &self.scheduler) {
            scheduler.cancel(id);
        }
    }

    fn flush(&self) -> bool {
        match self.pending.take() {
            Some(offset) => {
                self.evaluate(offset);
                true
            }
            None => false,
        }
    }
}

/// Tracks the scrolled flag and the active section.
pub struct ScrollTracker {
    inner: Rc<TrackerInner>,
}

impl ScrollTracker {
    pub fn new(config: ScrollTrackerConfig, geometry: Rc<dyn SectionGeometry>) -> ShowcaseResult<Self> {
        Self::build(config, geometry, None)
    }

    /// Like [`ScrollTracker::new`], but coalesced offsets also flush on
    /// their own through a zero-delay timer on `scheduler`.
    pub fn with_scheduler(
        config: ScrollTrackerConfig,
        geometry: Rc<dyn SectionGeometry>,
        scheduler: Rc<dyn Scheduler>,
    ) -> ShowcaseResult<Self> {
        Self::build(config, geometry, Some(scheduler))
    }

    fn build(
        config: ScrollTrackerConfig,
        geometry: Rc<dyn SectionGeometry>,
        scheduler: Option<Rc<dyn Scheduler>>,
    ) -> ShowcaseResult<Self> {
        config.validate()?;
        let initial = ScrollState {
            scrolled: false,
            active: config.initial_active.clone(),
        };
        Ok(Self {
            inner: Rc::new(TrackerInner {
                config,
                geometry,
                state: signal(initial),
                pending: Cell::new(None),
                scheduler,
                flush_timer: Cell::new(None),
                cleanup: RefCell::new(None),
            }),
        })
    }

    /// Evaluate once and subscribe to the global scroll signal.
    ///
    /// The first evaluation resolves the active section but always reports
    /// `scrolled = false`.
    pub fn mount(&self) {
        if self.is_mounted() {
            return;
        }

        let inner = &self.inner;
        let resolved =
            resolve_active_section(&inner.config.sections, inner.geometry.as_ref(), inner.config.anchor_line);
        let current = inner.state.get();
        inner.state.set(ScrollState {
            scrolled: false,
            active: resolved.cloned().or(current.active),
        });

        let weak: Weak<TrackerInner> = Rc::downgrade(inner);
        let cleanup = events::on_scroll(move |offset| {
            if let Some(inner) = weak.upgrade() {
                inner.on_scroll(offset);
            }
        });
        *inner.cleanup.borrow_mut() = Some(Box::new(cleanup));
        tracing::debug!(sections = inner.config.sections.len(), "scroll tracker mounted");
    }

    /// Release the scroll subscription and drop any pending frame.
    pub fn unmount(&self) {
        let cleanup = self.inner.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
            self.inner.cancel_flush();
            self.inner.pending.set(None);
            tracing::debug!("scroll tracker unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.cleanup.borrow().is_some()
    }

    /// Feed a scroll offset directly (bypassing the global signal).
    pub fn on_scroll(&self, offset: f64) {
        self.inner.on_scroll(offset);
    }

    /// Evaluate the latest pending offset, if any. Returns `true` if work
    /// was done.
    pub fn flush_frame(&self) -> bool {
        self.inner.cancel_flush();
        self.inner.flush()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Evaluate immediately at `offset`.
    pub fn evaluate(&self, offset: f64) {
        self.inner.cancel_flush();
        self.inner.pending.set(None);
        self.inner.evaluate(offset);
    }

    pub fn state(&self) -> ScrollState {
        self.inner.state.get()
    }

    pub fn state_signal(&self) -> Signal<ScrollState> {
        self.inner.state.clone()
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.inner.state.get().active
    }

    pub fn is_scrolled(&self) -> bool {
        self.inner.state.get().scrolled
    }

    pub fn config(&self) -> &ScrollTrackerConfig {
        &self.inner.config
    }

    /// Back to the initial state. The only way `active` returns to its
    /// initial value once a section has matched.
    pub fn reset(&self) {
        self.inner.cancel_flush();
        self.inner.pending.set(None);
        self.inner.state.set(ScrollState {
            scrolled: false,
            active: self.inner.config.initial_active.clone(),
        });
    }
}

impl Drop for ScrollTracker {
    fn drop(&mut self) {
        self.unmount();
    }
}

// =============================================================================
// SCROLL-LINKED VALUES
// =============================================================================

/// Clamped linear map from a scroll range to an output range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollLink {
    pub input: (f64, f64),
    pub output: (f64, f64),
}

impl ScrollLink {
    pub const fn new(input: (f64, f64), output: (f64, f64)) -> Self {
        Self { input, output }
    }

    /// Map `offset`. Outside the input range the output end value holds.
    pub fn apply(&self, offset: f64) -> f64 {
        let (in_start, in_end) = self.input;
        let (out_start, out_end) = self.output;
        if in_end == in_start {
            return out_start;
        }
        let t = ((offset - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
        out_start + (out_end - out_start) * t
    }
}

/// Hero content drifts down 150px over the first 500px of scroll.
pub const HERO_PARALLAX: ScrollLink = ScrollLink::new((0.0, 500.0), (0.0, 150.0));

/// Hero content fades out over the first 300px of scroll.
pub const HERO_FADE: ScrollLink = ScrollLink::new((0.0, 300.0), (1.0, 0.0));

// =============================================================================
// TESTS
// =============================================================================
