//! # spark-showcase
//!
//! Reactive state core for single-page showcase sites.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! The host feeds raw input (scroll offset, pointer position, viewport size,
//! section rectangles, timers) into a handful of global signals. Small state
//! derivers subscribe to those signals and publish what the page renders:
//!
//! ```text
//! host events → global signals → typewriter / scroll / pointer / reveal → Snapshot
//! ```
//!
//! Nothing here draws. Any presentation layer (DOM binding, terminal, test
//! harness) reads the derived signals or a per-frame [`Snapshot`].
//!
//! ## Modules
//!
//! - [`types`] - Section ids, bounds, viewport, pointer values
//! - [`error`] - Error type shared by every constructor
//! - [`host`] - Clocks, global event hub, section geometry
//! - [`state`] - Typewriter, scroll tracker, pointer sampler, reveal latches
//! - [`pipeline`] - Mount API and render snapshots

pub mod error;
pub mod host;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{ShowcaseError, ShowcaseResult};

pub use host::{
    FrameClock, ListenerBackend, ListenerKinds, PageLayout, Scheduler, SectionGeometry, TimerId,
    TimerTask, VirtualClock,
};

pub use pipeline::{mount, MountHandle, ShowcaseConfig, Snapshot};

pub use state::{
    // Typewriter
    transition, PhraseList, Typewriter, TypewriterConfig, TypewriterPhase, TypewriterState,
    TypewriterTiming,
    // Scroll
    is_past_threshold, resolve_active_section, ScrollLink, ScrollState, ScrollTracker,
    ScrollTrackerConfig, HERO_FADE, HERO_PARALLAX,
    // Pointer
    PointerSampler,
    // Reveal
    is_in_view, RevealConfig, RevealTracker,
};
