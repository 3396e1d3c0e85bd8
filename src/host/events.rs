//! Events Module - Process-wide scroll and pointer signal source
//!
//! The page has exactly one scroll signal and one pointer-move signal. Any
//! number of components may subscribe; they fan out from a single
//! underlying host listener per kind. The listener is attached when the
//! first subscriber arrives and detached when the last one leaves.
//!
//! # API
//!
//! - `on_scroll(fn)` / `on_pointer_move(fn)` - Subscribe, returns cleanup
//! - `dispatch_scroll(offset)` / `dispatch_pointer_move(x, y)` - Host feeds events
//! - `set_viewport(w, h)` / `viewport()` - Viewport size
//! - `scroll_offset()` / `pointer_position()` - Latest raw values (reactive)
//! - `set_listener_backend(backend)` - Hook the real host listener
//!
//! # Example
//!
//! ```ignore
//! use spark_showcase::host::events;
//!
//! let cleanup = events::on_scroll(|offset| println!("scrolled to {offset}"));
//! events::dispatch_scroll(120.0);
//! cleanup();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;
use spark_signals::{signal, Signal};

use crate::types::{PointerPosition, Viewport};

// =============================================================================
// TYPES
// =============================================================================

bitflags! {
    /// Underlying host listeners.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ListenerKinds: u8 {
        const SCROLL = 1 << 0;
        const POINTER_MOVE = 1 << 1;
    }
}

/// Real host listener registration (e.g. `addEventListener` on the window).
pub trait ListenerBackend {
    fn attach(&self, kind: ListenerKinds);
    fn detach(&self, kind: ListenerKinds);
}

/// Handler for scroll events, receives the vertical scroll offset.
pub type ScrollHandler = Rc<dyn Fn(f64)>;

/// Handler for pointer-move events, receives client coordinates.
pub type PointerHandler = Rc<dyn Fn(PointerPosition)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    scroll_handlers: Vec<(usize, ScrollHandler)>,
    pointer_handlers: Vec<(usize, PointerHandler)>,
    backend: Option<Rc<dyn ListenerBackend>>,
    attached: ListenerKinds,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            scroll_handlers: Vec::new(),
            pointer_handlers: Vec::new(),
            backend: None,
            attached: ListenerKinds::empty(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn wanted(&self) -> ListenerKinds {
        let mut kinds = ListenerKinds::empty();
        if !self.scroll_handlers.is_empty() {
            kinds |= ListenerKinds::SCROLL;
        }
        if !self.pointer_handlers.is_empty() {
            kinds |= ListenerKinds::POINTER_MOVE;
        }
        kinds
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// REACTIVE STATE
// =============================================================================

thread_local! {
    static SCROLL_OFFSET: Signal<f64> = signal(0.0);
    static POINTER: Signal<Option<PointerPosition>> = signal(None);
    static VIEWPORT: Signal<Viewport> = signal(Viewport::default());
}

/// Latest vertical scroll offset.
pub fn scroll_offset() -> f64 {
    SCROLL_OFFSET.with(|s| s.get())
}

/// Latest raw pointer position, `None` before the first move.
pub fn pointer_position() -> Option<PointerPosition> {
    POINTER.with(|s| s.get())
}

/// Current viewport size.
pub fn viewport() -> Viewport {
    VIEWPORT.with(|s| s.get())
}

/// Record a viewport resize.
pub fn set_viewport(width: f64, height: f64) {
    VIEWPORT.with(|s| s.set(Viewport::new(width, height)));
}

/// Which underlying host listeners are attached right now.
pub fn attached_listeners() -> ListenerKinds {
    REGISTRY.with(|reg| reg.borrow().attached)
}

/// Number of scroll and pointer subscribers.
pub fn subscriber_counts() -> (usize, usize) {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        (reg.scroll_handlers.len(), reg.pointer_handlers.len())
    })
}

// =============================================================================
// LISTENER LIFECYCLE
// =============================================================================

/// Install the host backend. Listeners already wanted are attached at once.
pub fn set_listener_backend(backend: Rc<dyn ListenerBackend>) {
    clear_listener_backend();
    REGISTRY.with(|reg| reg.borrow_mut().backend = Some(backend));
    sync_listeners();
}

/// Detach every listener from the current backend and forget it.
pub fn clear_listener_backend() {
    let (backend, attached) = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let attached = reg.attached;
        reg.attached = ListenerKinds::empty();
        (reg.backend.take(), attached)
    });
    if let Some(backend) = backend {
        for kind in attached.iter() {
            backend.detach(kind);
        }
    }
}

/// Attach or detach host listeners so they match the current subscribers.
fn sync_listeners() {
    let (backend, to_attach, to_detach) = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let wanted = reg.wanted();
        let to_attach = wanted - reg.attached;
        let to_detach = reg.attached - wanted;
        reg.attached = wanted;
        (reg.backend.clone(), to_attach, to_detach)
    });

    for kind in to_attach.iter() {
        tracing::debug!(?kind, "attaching host listener");
        if let Some(backend) = &backend {
            backend.attach(kind);
        }
    }
    for kind in to_detach.iter() {
        tracing::debug!(?kind, "detaching host listener");
        if let Some(backend) = &backend {
            backend.detach(kind);
        }
    }
}

// =============================================================================
// PUBLIC API - REGISTRATION
// =============================================================================

/// Subscribe to scroll events. Returns cleanup function.
pub fn on_scroll<F>(handler: F) -> impl FnOnce()
where
    F: Fn(f64) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.scroll_handlers.push((id, Rc::new(handler)));
        id
    });
    sync_listeners();

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .scroll_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
        sync_listeners();
    }
}

/// Subscribe to pointer-move events. Returns cleanup function.
pub fn on_pointer_move<F>(handler: F) -> impl FnOnce()
where
    F: Fn(PointerPosition) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.pointer_handlers.push((id, Rc::new(handler)));
        id
    });
    sync_listeners();

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .pointer_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
        sync_listeners();
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Feed a scroll event. Handlers run in subscription order.
///
/// Handlers are cloned out of the registry first, so a handler may
/// unsubscribe (itself or others) while the event is being delivered.
pub fn dispatch_scroll(offset: f64) {
    SCROLL_OFFSET.with(|s| s.set(offset));

    let handlers: Vec<ScrollHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .scroll_handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    });
    for handler in handlers {
        handler(offset);
    }
}

/// Feed a pointer-move event in client coordinates.
pub fn dispatch_pointer_move(x: f64, y: f64) {
    let position = PointerPosition::new(x, y);
    POINTER.with(|s| s.set(Some(position)));

    let handlers: Vec<PointerHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .pointer_handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    });
    for handler in handlers {
        handler(position);
    }
}

/// Reset all event state (for testing).
pub fn reset_events() {
    clear_listener_backend();
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
    SCROLL_OFFSET.with(|s| s.set(0.0));
    POINTER.with(|s| s.set(None));
    VIEWPORT.with(|s| s.set(Viewport::default()));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() {
        reset_events();
    }

    #[derive(Default)]
    struct RecordingBackend {
        log: RefCell<Vec<(bool, ListenerKinds)>>,
    }

    impl ListenerBackend for RecordingBackend {
        fn attach(&self, kind: ListenerKinds) {
            self.log.borrow_mut().push((true, kind));
        }
        fn detach(&self, kind: ListenerKinds) {
            self.log.borrow_mut().push((false, kind));
        }
    }

    #[test]
    fn test_scroll_fans_out_to_all_subscribers() {
        setup();

        let a = Rc::new(Cell::new(0.0));
        let b = Rc::new(Cell::new(0.0));
        let a_clone = a.clone();
        let b_clone = b.clone();
        let cleanup_a = on_scroll(move |y| a_clone.set(y));
        let cleanup_b = on_scroll(move |y| b_clone.set(y));

        dispatch_scroll(42.0);
        assert_eq!(a.get(), 42.0);
        assert_eq!(b.get(), 42.0);
        assert_eq!(scroll_offset(), 42.0);

        cleanup_a();
        dispatch_scroll(7.0);
        assert_eq!(a.get(), 42.0);
        assert_eq!(b.get(), 7.0);

        cleanup_b();
    }

    #[test]
    fn test_single_underlying_listener_per_kind() {
        setup();

        let backend = Rc::new(RecordingBackend::default());
        set_listener_backend(backend.clone());

        let c1 = on_scroll(|_| {});
        let c2 = on_scroll(|_| {});
        let c3 = on_pointer_move(|_| {});

        assert_eq!(
            attached_listeners(),
            ListenerKinds::SCROLL | ListenerKinds::POINTER_MOVE
        );
        assert_eq!(
            *backend.log.borrow(),
            vec![
                (true, ListenerKinds::SCROLL),
                (true, ListenerKinds::POINTER_MOVE)
            ]
        );

        c1();
        assert!(attached_listeners().contains(ListenerKinds::SCROLL));
        c2();
        assert!(!attached_listeners().contains(ListenerKinds::SCROLL));
        c3();
        assert!(attached_listeners().is_empty());

        assert_eq!(backend.log.borrow().len(), 4);
        assert_eq!(
            backend.log.borrow()[2..],
            [
                (false, ListenerKinds::SCROLL),
                (false, ListenerKinds::POINTER_MOVE)
            ]
        );
    }

    #[test]
    fn test_backend_installed_late_attaches_existing() {
        setup();

        let cleanup = on_pointer_move(|_| {});
        let backend = Rc::new(RecordingBackend::default());
        set_listener_backend(backend.clone());

        assert_eq!(
            *backend.log.borrow(),
            vec![(true, ListenerKinds::POINTER_MOVE)]
        );
        cleanup();
    }

    #[test]
    fn test_handler_may_unsubscribe_during_dispatch() {
        setup();

        let cleanup_slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let slot = cleanup_slot.clone();
        let hits_clone = hits.clone();
        let cleanup = on_scroll(move |_| {
            hits_clone.set(hits_clone.get() + 1);
            if let Some(cleanup) = slot.borrow_mut().take() {
                cleanup();
            }
        });
        *cleanup_slot.borrow_mut() = Some(Box::new(cleanup));

        dispatch_scroll(1.0);
        dispatch_scroll(2.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(subscriber_counts(), (0, 0));
    }

    #[test]
    fn test_pointer_and_viewport_state() {
        setup();

        assert_eq!(pointer_position(), None);
        dispatch_pointer_move(10.0, 20.0);
        assert_eq!(pointer_position(), Some(PointerPosition::new(10.0, 20.0)));

        set_viewport(800.0, 600.0);
        assert_eq!(viewport(), Viewport::new(800.0, 600.0));
    }
}
