//! Pointer Module - Center-relative pointer offset for parallax
//!
//! Every global pointer move is turned into an offset from the viewport
//! center, scaled down by a divisor (default 50):
//!
//! ```text
//! dx = (client_x - width / 2) / divisor
//! dy = (client_y - height / 2) / divisor
//! ```
//!
//! No smoothing and no memory beyond the latest sample. Layers that want
//! easing apply it downstream.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::error::{ShowcaseError, ShowcaseResult};
use crate::host::events;
use crate::types::{PointerOffset, PointerPosition, Viewport};

/// Default parallax divisor.
pub const DEFAULT_PARALLAX_DIVISOR: f64 = 50.0;

/// Center-relative offset of a pointer sample.
pub fn sample(client_x: f64, client_y: f64, viewport: Viewport, divisor: f64) -> PointerOffset {
    let (cx, cy) = viewport.center();
    PointerOffset::new((client_x - cx) / divisor, (client_y - cy) / divisor)
}

/// Pointer position relative to an element's top-left corner.
pub fn relative_to(client_x: f64, client_y: f64, left: f64, top: f64) -> PointerPosition {
    PointerPosition::new(client_x - left, client_y - top)
}

struct SamplerInner {
    divisor: f64,
    offset: Signal<PointerOffset>,
    last: Signal<Option<PointerPosition>>,
    cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl SamplerInner {
    fn on_pointer_move(&self, position: PointerPosition) {
        self.last.set(Some(position));
        self.offset
            .set(sample(position.x, position.y, events::viewport(), self.divisor));
    }
}

/// Publishes the parallax offset of the latest global pointer move.
pub struct PointerSampler {
    inner: Rc<SamplerInner>,
}

impl PointerSampler {
    pub fn new(divisor: f64) -> ShowcaseResult<Self> {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(ShowcaseError::InvalidDivisor(divisor));
        }
        Ok(Self::with_divisor(divisor))
    }

    fn with_divisor(divisor: f64) -> Self {
        Self {
            inner: Rc::new(SamplerInner {
                divisor,
                offset: signal(PointerOffset::ZERO),
                last: signal(None),
                cleanup: RefCell::new(None),
            }),
        }
    }

    /// Subscribe to global pointer moves.
    pub fn mount(&self) {
        if self.is_mounted() {
            return;
        }
        let weak: Weak<SamplerInner> = Rc::downgrade(&self.inner);
        let cleanup = events::on_pointer_move(move |position| {
            if let Some(inner) = weak.upgrade() {
                inner.on_pointer_move(position);
            }
        });
        *self.inner.cleanup.borrow_mut() = Some(Box::new(cleanup));
        tracing::debug!(divisor = self.inner.divisor, "pointer sampler mounted");
    }

    pub fn unmount(&self) {
        let cleanup = self.inner.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
            tracing::debug!("pointer sampler unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.cleanup.borrow().is_some()
    }

    /// Feed a sample directly (bypassing the global signal).
    pub fn on_pointer_move(&self, client_x: f64, client_y: f64) {
        self.inner
            .on_pointer_move(PointerPosition::new(client_x, client_y));
    }

    pub fn offset(&self) -> PointerOffset {
        self.inner.offset.get()
    }

    pub fn offset_signal(&self) -> Signal<PointerOffset> {
        self.inner.offset.clone()
    }

    /// Last raw client position, `None` before the first move.
    pub fn last_position(&self) -> Option<PointerPosition> {
        self.inner.last.get()
    }

    /// Latest pointer position relative to an element whose top-left corner
    /// sits at `(left, top)` in client coordinates (the navbar glow).
    ///
    /// The host supplies the element's current rect. `None` before the
    /// first move.
    pub fn position_relative_to(&self, left: f64, top: f64) -> Option<PointerPosition> {
        self.inner
            .last
            .get()
            .map(|position| relative_to(position.x, position.y, left, top))
    }
}

impl Default for PointerSampler {
    fn default() -> Self {
        Self::with_divisor(DEFAULT_PARALLAX_DIVISOR)
    }
}

impl Drop for PointerSampler {
    fn drop(&mut self) {
        self.unmount();
    }
}
