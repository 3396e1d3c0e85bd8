//! State Module - Reactive state derivers for the showcase page
//!
//! Each system turns host input into a small signal the presentation layer
//! reads:
//!
//! - **Typewriter** - Timer-driven phrase cycling (type, hold, delete, hold)
//! - **Scroll** - Scrolled flag and active navigation section
//! - **Pointer** - Center-relative parallax offset
//! - **Reveal** - One-shot "entered the viewport" latches

pub mod pointer;
pub mod reveal;
pub mod scroll;
pub mod typewriter;

pub use pointer::*;
pub use reveal::*;
pub use scroll::*;
pub use typewriter::*;
