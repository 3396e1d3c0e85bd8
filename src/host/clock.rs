//! Clock Module - One-shot timers for the host environment
//!
//! Components never sleep. They hand a task and a delay to a [`Scheduler`]
//! and keep the returned [`TimerId`] so the task can be cancelled.
//!
//! Two schedulers are provided:
//!
//! - [`VirtualClock`] - time only moves when `advance()` is called. Fully
//!   deterministic, used by tests and by hosts that own their own time base.
//! - [`FrameClock`] - wall-clock time from `Instant`. The host render loop
//!   calls `run_due()` once per frame.
//!
//! # Ordering
//!
//! Due timers fire in deadline order; timers sharing a deadline fire in the
//! order they were scheduled. A task runs with no internal borrow held, so it
//! may schedule or cancel other timers.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_showcase::host::clock::{Scheduler, VirtualClock};
//!
//! let clock = Rc::new(VirtualClock::new());
//! let id = clock.schedule(100, Box::new(|| println!("fired")));
//! clock.advance(99);  // nothing
//! clock.advance(1);   // "fired"
//! assert!(!clock.cancel(id)); // already gone
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

// =============================================================================
// TYPES
// =============================================================================

/// Handle of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce()>;

/// Host timer contract.
pub trait Scheduler {
    /// Current time in milliseconds since the clock's origin.
    fn now_ms(&self) -> u64;

    /// Run `task` once, `delay_ms` from now.
    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerId;

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    fn cancel(&self, id: TimerId) -> bool;
}

// =============================================================================
// TIMER QUEUE
// =============================================================================

/// Pending timers keyed by `(deadline, id)`.
struct TimerQueue {
    entries: BTreeMap<(u64, u64), TimerTask>,
    deadlines: HashMap<u64, u64>,
    next_id: u64,
}

impl TimerQueue {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    fn push(&mut self, deadline: u64, task: TimerTask) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        TimerId(id)
    }

    fn remove(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(deadline) => self.entries.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    }

    /// Pop the earliest timer due at `now` whose id is below `id_limit`.
    fn pop_due(&mut self, now: u64, id_limit: u64) -> Option<(u64, TimerTask)> {
        let (&(deadline, id), _) = self.entries.first_key_value()?;
        if deadline > now || id >= id_limit {
            return None;
        }
        let task = self.entries.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((deadline, task))
    }

    fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}

/// Pop and run every timer due at `now`. The queue borrow is released
/// before each task runs.
///
/// With `only_existing`, timers scheduled by the tasks themselves wait for
/// the next call even when already due.
fn run_due_timers(
    queue: &RefCell<TimerQueue>,
    now: u64,
    only_existing: bool,
    mut before_run: impl FnMut(u64),
) -> usize {
    let id_limit = if only_existing { queue.borrow().next_id } else { u64::MAX };
    let mut fired = 0;
    loop {
        let next = queue.borrow_mut().pop_due(now, id_limit);
        match next {
            Some((deadline, task)) => {
                before_run(deadline);
                task();
                fired += 1;
            }
            None => break,
        }
    }
    fired
}

// =============================================================================
// VIRTUAL CLOCK
// =============================================================================

/// Deterministic clock driven by explicit `advance()` calls.
pub struct VirtualClock {
    now: Cell<u64>,
    queue: RefCell<TimerQueue>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            queue: RefCell::new(TimerQueue::new()),
        }
    }

    /// Move time forward by `ms`, firing every timer that comes due.
    ///
    /// Returns the number of timers fired. While a task runs, `now_ms()`
    /// reports that task's own deadline.
    pub fn advance(&self, ms: u64) -> usize {
        self.advance_to(self.now.get().saturating_add(ms))
    }

    /// Move time forward to the absolute instant `target`.
    pub fn advance_to(&self, target: u64) -> usize {
        let target = target.max(self.now.get());
        let fired = run_due_timers(&self.queue, target, false, |deadline| {
            self.now.set(deadline.max(self.now.get()));
        });
        self.now.set(target);
        fired
    }

    /// Jump straight to the next pending deadline and fire what is due there.
    ///
    /// Returns the new time, or `None` when nothing is pending.
    pub fn advance_to_next(&self) -> Option<u64> {
        let deadline = self.queue.borrow().next_deadline()?;
        self.advance_to(deadline);
        Some(deadline)
    }

    /// Number of timers waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.borrow().next_deadline()
    }

    /// Drop every pending timer without running it.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerId {
        let deadline = self.now.get().saturating_add(delay_ms);
        self.queue.borrow_mut().push(deadline, task)
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().remove(id)
    }
}

// =============================================================================
// FRAME CLOCK
// =============================================================================

/// Wall-clock scheduler polled by the host's frame loop.
pub struct FrameClock {
    origin: Instant,
    queue: RefCell<TimerQueue>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: RefCell::new(TimerQueue::new()),
        }
    }

    /// Fire every timer whose deadline has passed. Call once per frame.
    ///
    /// Only timers pending when the call starts can fire, so a task
    /// rescheduling itself with a zero delay runs on the next frame rather
    /// than starving this one.
    pub fn run_due(&self) -> usize {
        let now = self.now_ms();
        run_due_timers(&self.queue, now, true, |_| {})
    }

    /// How long until the earliest pending timer is due.
    ///
    /// `Some(Duration::ZERO)` when a timer is already overdue, `None` when
    /// nothing is pending.
    pub fn time_until_next(&self) -> Option<Duration> {
        let deadline = self.queue.borrow().next_deadline()?;
        Some(Duration::from_millis(deadline.saturating_sub(self.now_ms())))
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FrameClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerId {
        let deadline = self.now_ms().saturating_add(delay_ms);
        self.queue.borrow_mut().push(deadline, task)
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().remove(id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
