//! Mount API - Page lifecycle and render snapshots.
//!
//! Builds every state deriver from one [`ShowcaseConfig`], mounts them on
//! the host's signals and hands back a [`MountHandle`]. The presentation
//! layer either pulls a [`Snapshot`] once per frame or registers a render
//! callback that re-runs whenever any derived value changes.
//!
//! Coalesced scroll work flushes on the scheduler's next tick (a zero-delay
//! timer), so render callbacks see `scrolled` and `active` catch up without
//! a `frame()` call. `frame()` flushes earlier when the host pulls.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_showcase::host::{FrameClock, PageLayout};
//! use spark_showcase::pipeline::{mount, ShowcaseConfig};
//!
//! let clock = Rc::new(FrameClock::new());
//! let layout = Rc::new(PageLayout::stacked([("home", 900.0), ("about", 700.0)]));
//! let handle = mount(&ShowcaseConfig::default(), layout, clock.clone())?;
//!
//! loop {
//!     clock.run_due();
//!     let snapshot = handle.frame();
//!     // draw snapshot...
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use spark_signals::{effect, Signal};

use crate::error::ShowcaseResult;
use crate::host::clock::Scheduler;
use crate::host::events;
use crate::host::geometry::SectionGeometry;
use crate::state::pointer::{PointerSampler, DEFAULT_PARALLAX_DIVISOR};
use crate::state::reveal::{RevealConfig, RevealTracker};
use crate::state::scroll::{ScrollState, ScrollTracker, ScrollTrackerConfig, HERO_FADE, HERO_PARALLAX};
use crate::state::typewriter::{Typewriter, TypewriterConfig, TypewriterState};
use crate::types::{PointerOffset, SectionId};

// =============================================================================
// Configuration
// =============================================================================

/// Everything needed to mount the page's state derivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub typewriter: TypewriterConfig,
    pub scroll: ScrollTrackerConfig,
    pub reveal: RevealConfig,
    pub parallax_divisor: f64,
}

impl ShowcaseConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ShowcaseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            typewriter: TypewriterConfig::default(),
            scroll: ScrollTrackerConfig::default(),
            reveal: RevealConfig::default(),
            parallax_divisor: DEFAULT_PARALLAX_DIVISOR,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the presentation layer reads in one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub text: String,
    pub phrase_index: usize,
    pub scrolled: bool,
    pub active: Option<SectionId>,
    pub pointer: PointerOffset,
    pub revealed: BTreeSet<SectionId>,
    /// Hero content translation driven by scroll.
    pub hero_offset: f64,
    /// Hero content opacity driven by scroll.
    pub hero_opacity: f64,
}

/// The signals a snapshot is derived from.
#[derive(Clone)]
struct SnapshotSignals {
    typewriter: Signal<TypewriterState>,
    scroll: Signal<ScrollState>,
    pointer: Signal<PointerOffset>,
    revealed: Signal<BTreeSet<SectionId>>,
}

impl SnapshotSignals {
    fn read(&self) -> Snapshot {
        let typing = self.typewriter.get();
        let scroll = self.scroll.get();
        let offset = events::scroll_offset();
        Snapshot {
            text: typing.buffer,
            phrase_index: typing.phrase_index,
            scrolled: scroll.scrolled,
            active: scroll.active,
            pointer: self.pointer.get(),
            revealed: self.revealed.get(),
            hero_offset: HERO_PARALLAX.apply(offset),
            hero_opacity: HERO_FADE.apply(offset),
        }
    }
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`]. Owns every mounted component.
///
/// Dropping the handle releases every timer, listener and render effect;
/// `unmount()` does the same explicitly.
pub struct MountHandle {
    typewriter: Typewriter,
    scroll: ScrollTracker,
    pointer: PointerSampler,
    reveal: RevealTracker,
    signals: SnapshotSignals,
    stop_effects: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl MountHandle {
    /// Flush coalesced scroll work, then read a snapshot.
    ///
    /// Call once per animation frame.
    pub fn frame(&self) -> Snapshot {
        self.scroll.flush_frame();
        self.signals.read()
    }

    /// Read a snapshot without flushing pending scroll work.
    pub fn snapshot(&self) -> Snapshot {
        self.signals.read()
    }

    /// Register a render callback. It runs once now and again after every
    /// change to any derived value, until unmount.
    ///
    /// Scroll state reaches the callback once the scheduler ticks the
    /// pending flush; calling `frame()` is not required.
    pub fn on_render<F>(&self, render: F)
    where
        F: Fn(&Snapshot) + 'static,
    {
        let signals = self.signals.clone();
        let stop = effect(move || {
            let snapshot = signals.read();
            render(&snapshot);
        });
        self.stop_effects.borrow_mut().push(Box::new(stop));
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn scroll_tracker(&self) -> &ScrollTracker {
        &self.scroll
    }

    pub fn pointer_sampler(&self) -> &PointerSampler {
        &self.pointer
    }

    pub fn reveal_tracker(&self) -> &RevealTracker {
        &self.reveal
    }

    /// Stop everything and clean up.
    pub fn unmount(self) {
        self.release();
        tracing::debug!("showcase unmounted");
    }

    fn release(&self) {
        let stops: Vec<_> = self.stop_effects.borrow_mut().drain(..).collect();
        for stop in stops {
            stop();
        }
        self.typewriter.stop();
        self.scroll.unmount();
        self.pointer.unmount();
        self.reveal.unmount();
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Build and mount every component.
///
/// All configuration is validated before anything subscribes, so an error
/// leaves no listener or timer behind.
pub fn mount(
    config: &ShowcaseConfig,
    geometry: Rc<dyn SectionGeometry>,
    scheduler: Rc<dyn Scheduler>,
) -> ShowcaseResult<MountHandle> {
    let typewriter = Typewriter::from_config(&config.typewriter, scheduler.clone())?;
    let scroll = ScrollTracker::with_scheduler(config.scroll.clone(), geometry.clone(), scheduler)?;
    let pointer = PointerSampler::new(config.parallax_divisor)?;
    let reveal = RevealTracker::new(config.reveal.clone(), geometry)?;

    scroll.mount();
    pointer.mount();
    reveal.mount();
    typewriter.start();

    let signals = SnapshotSignals {
        typewriter: typewriter.state_signal(),
        scroll: scroll.state_signal(),
        pointer: pointer.offset_signal(),
        revealed: reveal.revealed_signal(),
    };

    tracing::debug!(
        phrases = typewriter.phrases().len(),
        sections = config.scroll.sections.len(),
        "showcase mounted"
    );

    Ok(MountHandle {
        typewriter,
        scroll,
        pointer,
        reveal,
        signals,
        stop_effects: RefCell::new(Vec::new()),
    })
}

// =============================================================================
// Tests
// =============================================================================
