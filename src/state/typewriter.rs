//! Typewriter Module - Phrase-cycling text typing engine
//!
//! Types a phrase one character at a time, pauses, deletes it, pauses, then
//! moves on to the next phrase. Wraps around forever.
//!
//! # State Machine
//!
//! ```text
//! Typing ──(buffer == phrase)──> PausedFull ──(pause)──> Deleting
//!    ^                                                     │
//!    └──────(pause)── PausedEmpty <──(buffer empty, next)──┘
//! ```
//!
//! The machine itself is pure: [`transition`] maps a state to the next state
//! plus the delay before the transition after that. [`Typewriter`] wraps it
//! with a scheduler and publishes every state through a `Signal`.
//!
//! A "character" is an extended grapheme cluster, so emoji with modifiers
//! appear and disappear in a single step.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_showcase::host::clock::VirtualClock;
//! use spark_showcase::state::typewriter::{PhraseList, Typewriter, TypewriterTiming};
//!
//! let clock = Rc::new(VirtualClock::new());
//! let phrases = PhraseList::new(["ab", "c"])?;
//! let typewriter = Typewriter::new(phrases, TypewriterTiming::default(), clock.clone())?;
//!
//! typewriter.start();
//! clock.advance(60);
//! assert_eq!(typewriter.text(), "a");
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{ShowcaseError, ShowcaseResult};
use crate::host::clock::{Scheduler, TimerId};

// =============================================================================
// DEFAULTS
// =============================================================================

/// Delay between typed characters.
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 60;
/// Delay between deleted characters.
pub const DEFAULT_DELETING_INTERVAL_MS: u64 = 40;
/// Hold time once a phrase is fully typed.
pub const DEFAULT_PAUSE_AFTER_TYPED_MS: u64 = 2500;
/// Hold time once a phrase is fully deleted.
pub const DEFAULT_PAUSE_AFTER_DELETED_MS: u64 = 1000;

/// Hero phrases shown by default.
pub const DEFAULT_PHRASES: [&str; 3] = [
    "Crafting modern digital experiences that speak for your brand",
    "Building stunning websites that leave a lasting impression",
    "Transforming ideas into beautiful, functional web solutions",
];

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Ordered, non-empty, cyclic list of phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseList(Vec<String>);

impl PhraseList {
    /// Build a phrase list. Fails with [`ShowcaseError::EmptyPhraseList`]
    /// when no phrases are given.
    pub fn new<I, S>(phrases: I) -> ShowcaseResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(ShowcaseError::EmptyPhraseList);
        }
        Ok(Self(phrases))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Phrase at `index`, wrapping cyclically.
    pub fn get(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for PhraseList {
    fn default() -> Self {
        Self(DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect())
    }
}

/// Interval and pause durations, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterTiming {
    pub typing_interval_ms: u64,
    pub deleting_interval_ms: u64,
    pub pause_after_typed_ms: u64,
    pub pause_after_deleted_ms: u64,
}

impl TypewriterTiming {
    /// Intervals must be non-zero so every phrase cycle takes time.
    /// Pauses may be zero.
    pub fn validate(&self) -> ShowcaseResult<()> {
        if self.typing_interval_ms == 0 {
            return Err(ShowcaseError::invalid_timing("typing interval must be > 0"));
        }
        if self.deleting_interval_ms == 0 {
            return Err(ShowcaseError::invalid_timing("deleting interval must be > 0"));
        }
        Ok(())
    }
}

impl Default for TypewriterTiming {
    fn default() -> Self {
        Self {
            typing_interval_ms: DEFAULT_TYPING_INTERVAL_MS,
            deleting_interval_ms: DEFAULT_DELETING_INTERVAL_MS,
            pause_after_typed_ms: DEFAULT_PAUSE_AFTER_TYPED_MS,
            pause_after_deleted_ms: DEFAULT_PAUSE_AFTER_DELETED_MS,
        }
    }
}

/// Serializable typewriter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub phrases: Vec<String>,
    #[serde(flatten)]
    pub timing: TypewriterTiming,
}

impl TypewriterConfig {
    /// Validate into the engine's typed inputs.
    pub fn build(&self) -> ShowcaseResult<(PhraseList, TypewriterTiming)> {
        let phrases = PhraseList::new(self.phrases.iter().cloned())?;
        self.timing.validate()?;
        Ok((phrases, self.timing))
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            timing: TypewriterTiming::default(),
        }
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Phase of the typewriter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypewriterPhase {
    #[default]
    Typing,
    PausedFull,
    Deleting,
    PausedEmpty,
}

impl TypewriterPhase {
    /// How long this phase waits before the next transition.
    pub fn delay_ms(&self, timing: &TypewriterTiming) -> u64 {
        match self {
            Self::Typing => timing.typing_interval_ms,
            Self::PausedFull => timing.pause_after_typed_ms,
            Self::Deleting => timing.deleting_interval_ms,
            Self::PausedEmpty => timing.pause_after_deleted_ms,
        }
    }
}

/// Immutable snapshot of the typewriter.
///
/// `buffer` is always a prefix of the phrase at `phrase_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterState {
    pub phrase_index: usize,
    pub buffer: String,
    pub phase: TypewriterPhase,
}

impl TypewriterState {
    /// Starting state: typing phrase 0 with an empty buffer.
    pub fn initial(phrases: &PhraseList) -> Self {
        Self::typing(0, phrases)
    }

    /// Enter `Typing` for `index`. A zero-length phrase is already complete,
    /// so it goes straight to `PausedFull`.
    fn typing(index: usize, phrases: &PhraseList) -> Self {
        let phase = if phrases.get(index).is_empty() {
            TypewriterPhase::PausedFull
        } else {
            TypewriterPhase::Typing
        };
        Self {
            phrase_index: index,
            buffer: String::new(),
            phase,
        }
    }

    /// The state one step later.
    pub fn next(&self, phrases: &PhraseList) -> Self {
        match self.phase {
            TypewriterPhase::Typing => {
                let target = phrases.get(self.phrase_index);
                let revealed = self.buffer.graphemes(true).count();
                let buffer = grapheme_prefix(target, revealed + 1);
                let phase = if buffer.len() == target.len() {
                    TypewriterPhase::PausedFull
                } else {
                    TypewriterPhase::Typing
                };
                Self {
                    phrase_index: self.phrase_index,
                    buffer: buffer.to_string(),
                    phase,
                }
            }
            TypewriterPhase::PausedFull => Self {
                phase: TypewriterPhase::Deleting,
                ..self.clone()
            },
            TypewriterPhase::Deleting => {
                let buffer = without_last_grapheme(&self.buffer);
                if buffer.is_empty() {
                    Self {
                        phrase_index: (self.phrase_index + 1) % phrases.len(),
                        buffer: String::new(),
                        phase: TypewriterPhase::PausedEmpty,
                    }
                } else {
                    Self {
                        phrase_index: self.phrase_index,
                        buffer: buffer.to_string(),
                        phase: TypewriterPhase::Deleting,
                    }
                }
            }
            TypewriterPhase::PausedEmpty => Self::typing(self.phrase_index, phrases),
        }
    }

    /// Re-anchor this state on a replacement phrase list.
    ///
    /// The index is clamped modulo the new length and the buffer is cut to
    /// the longest prefix it shares with the new phrase.
    pub fn reconcile(&self, phrases: &PhraseList) -> Self {
        let phrase_index = self.phrase_index % phrases.len();
        let target = phrases.get(phrase_index);
        let buffer = common_grapheme_prefix(&self.buffer, target).to_string();
        let complete = buffer.len() == target.len();

        let phase = match self.phase {
            TypewriterPhase::Typing if complete => TypewriterPhase::PausedFull,
            TypewriterPhase::PausedFull if !complete => TypewriterPhase::Typing,
            phase => phase,
        };
        Self {
            phrase_index,
            buffer,
            phase,
        }
    }
}

/// Pure transition: next state plus the delay until the one after it.
pub fn transition(
    state: &TypewriterState,
    phrases: &PhraseList,
    timing: &TypewriterTiming,
) -> (TypewriterState, u64) {
    let next = state.next(phrases);
    let delay = next.phase.delay_ms(timing);
    (next, delay)
}

fn grapheme_prefix(text: &str, count: usize) -> &str {
    match text.grapheme_indices(true).nth(count) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn without_last_grapheme(text: &str) -> &str {
    match text.grapheme_indices(true).next_back() {
        Some((start, _)) => &text[..start],
        None => text,
    }
}

fn common_grapheme_prefix<'a>(current: &str, target: &'a str) -> &'a str {
    let end: usize = current
        .graphemes(true)
        .zip(target.graphemes(true))
        .take_while(|(a, b)| a == b)
        .map(|(_, b)| b.len())
        .sum();
    &target[..end]
}

// =============================================================================
// LAZY FRAME SEQUENCE
// =============================================================================

/// A state together with the virtual time at which it appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub at_ms: u64,
    pub state: TypewriterState,
}

/// Infinite iterator over typewriter frames, starting at time 0.
#[derive(Debug, Clone)]
pub struct Frames {
    phrases: PhraseList,
    timing: TypewriterTiming,
    current: TypewriterState,
    at_ms: u64,
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = Frame {
            at_ms: self.at_ms,
            state: self.current.clone(),
        };
        let delay = self.current.phase.delay_ms(&self.timing);
        self.current = self.current.next(&self.phrases);
        self.at_ms += delay;
        Some(frame)
    }
}

/// Lazy, restartable frame sequence. Each call starts from the initial state.
pub fn frames(phrases: &PhraseList, timing: &TypewriterTiming) -> Frames {
    Frames {
        phrases: phrases.clone(),
        timing: *timing,
        current: TypewriterState::initial(phrases),
        at_ms: 0,
    }
}

// =============================================================================
// ENGINE
// =============================================================================

struct Engine {
    phrases: PhraseList,
    timing: TypewriterTiming,
    current: TypewriterState,
    running: bool,
    /// Token of the only timer allowed to act. Bumped on every schedule and
    /// every invalidation; a timer holding an older token is stale.
    generation: u64,
    pending: Option<TimerId>,
}

struct Shared {
    engine: RefCell<Engine>,
    state: Signal<TypewriterState>,
    scheduler: Rc<dyn Scheduler>,
}

/// Timer-driven typewriter publishing its state through a `Signal`.
///
/// At most one timer is pending at any time. Stopping, reconfiguring or
/// dropping the engine cancels it; should a cancelled timer still fire, it
/// does nothing.
pub struct Typewriter {
    shared: Rc<Shared>,
}

impl Typewriter {
    /// Create a stopped typewriter at its initial state.
    pub fn new(
        phrases: PhraseList,
        timing: TypewriterTiming,
        scheduler: Rc<dyn Scheduler>,
    ) -> ShowcaseResult<Self> {
        timing.validate()?;
        let initial = TypewriterState::initial(&phrases);
        Ok(Self {
            shared: Rc::new(Shared {
                state: signal(initial.clone()),
                engine: RefCell::new(Engine {
                    phrases,
                    timing,
                    current: initial,
                    running: false,
                    generation: 0,
                    pending: None,
                }),
                scheduler,
            }),
        })
    }

    /// Create from a serializable config.
    pub fn from_config(config: &TypewriterConfig, scheduler: Rc<dyn Scheduler>) -> ShowcaseResult<Self> {
        let (phrases, timing) = config.build()?;
        Self::new(phrases, timing, scheduler)
    }

    /// Start (or resume) cycling from the current state.
    pub fn start(&self) {
        {
            let mut engine = self.shared.engine.borrow_mut();
            if engine.running {
                return;
            }
            engine.running = true;
            tracing::debug!(phrase_index = engine.current.phrase_index, "typewriter started");
        }
        schedule_current(&self.shared);
    }

    /// Stop cycling. The current text stays as it is.
    pub fn stop(&self) {
        let mut engine = self.shared.engine.borrow_mut();
        if !engine.running {
            return;
        }
        engine.running = false;
        invalidate(&mut engine, self.shared.scheduler.as_ref());
        tracing::debug!(phrase_index = engine.current.phrase_index, "typewriter stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.engine.borrow().running
    }

    /// Currently displayed text.
    pub fn text(&self) -> String {
        self.shared.state.get().buffer
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> TypewriterState {
        self.shared.state.get()
    }

    /// Reactive state. Effects reading it re-run on every transition.
    pub fn state_signal(&self) -> Signal<TypewriterState> {
        self.shared.state.clone()
    }

    pub fn phrases(&self) -> PhraseList {
        self.shared.engine.borrow().phrases.clone()
    }

    pub fn timing(&self) -> TypewriterTiming {
        self.shared.engine.borrow().timing
    }

    /// Replace the phrase list. Safe in any phase.
    pub fn set_phrases(&self, phrases: PhraseList) {
        let next = {
            let mut engine = self.shared.engine.borrow_mut();
            invalidate(&mut engine, self.shared.scheduler.as_ref());
            let next = engine.current.reconcile(&phrases);
            tracing::debug!(
                phrases = phrases.len(),
                phrase_index = next.phrase_index,
                "typewriter phrases replaced"
            );
            engine.phrases = phrases;
            engine.current = next.clone();
            next
        };
        self.shared.state.set(next);
        schedule_current(&self.shared);
    }

    /// Replace the timing. The current phase restarts its full delay.
    pub fn set_timing(&self, timing: TypewriterTiming) -> ShowcaseResult<()> {
        timing.validate()?;
        {
            let mut engine = self.shared.engine.borrow_mut();
            invalidate(&mut engine, self.shared.scheduler.as_ref());
            engine.timing = timing;
            tracing::debug!(?timing, "typewriter timing replaced");
        }
        schedule_current(&self.shared);
        Ok(())
    }

    /// Jump back to the initial state, keeping the running flag.
    pub fn reset(&self) {
        let initial = {
            let mut engine = self.shared.engine.borrow_mut();
            invalidate(&mut engine, self.shared.scheduler.as_ref());
            engine.current = TypewriterState::initial(&engine.phrases);
            engine.current.clone()
        };
        self.shared.state.set(initial);
        schedule_current(&self.shared);
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cancel the pending timer and retire its token.
fn invalidate(engine: &mut Engine, scheduler: &dyn Scheduler) {
    engine.generation += 1;
    if let Some(id) = engine.pending.take() {
        scheduler.cancel(id);
    }
}

/// Arm the single timer for the current phase, if running.
fn schedule_current(shared: &Rc<Shared>) {
    let mut engine = shared.engine.borrow_mut();
    if !engine.running || engine.pending.is_some() {
        return;
    }
    let delay = engine.current.phase.delay_ms(&engine.timing);
    arm(shared, &mut engine, delay);
}

fn arm(shared: &Rc<Shared>, engine: &mut Engine, delay_ms: u64) {
    engine.generation += 1;
    let generation = engine.generation;
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let id = shared.scheduler.schedule(
        delay_ms,
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                fire(&shared, generation);
            }
        }),
    );
    engine.pending = Some(id);
}

fn fire(shared: &Rc<Shared>, generation: u64) {
    let next = {
        let mut engine = shared.engine.borrow_mut();
        if !engine.running || engine.generation != generation {
            tracing::trace!(
                generation,
                current = engine.generation,
                "stale typewriter timer ignored"
            );
            return;
        }
        engine.pending = None;
        let next = engine.current.next(&engine.phrases);
        tracing::trace!(
            phrase_index = next.phrase_index,
            phase = ?next.phase,
            len = next.buffer.len(),
            "typewriter transition"
        );
        engine.current = next.clone();
        next
    };

    // Effects run synchronously inside `set` and may stop or reconfigure
    // the engine, so no borrow is held here.
    shared.state.set(next);
    schedule_current(shared);
}

// =============================================================================
// TESTS
// =============================================================================
