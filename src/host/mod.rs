//! Host Module - Contract with the surrounding environment
//!
//! Everything the state derivers need from the outside world:
//!
//! - **Clock** - One-shot timers with cancellation (virtual or wall clock)
//! - **Events** - Global scroll and pointer-move signals with fan-out
//! - **Geometry** - Viewport-relative bounds of named sections

pub mod clock;
pub mod events;
pub mod geometry;

pub use clock::{FrameClock, Scheduler, TimerId, TimerTask, VirtualClock};
pub use events::{ListenerBackend, ListenerKinds};
pub use geometry::{PageLayout, SectionGeometry};
