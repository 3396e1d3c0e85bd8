//! Page Pipeline
//!
//! Connects the state derivers to whatever draws the page.
//!
//! ```text
//! host events → global signals → state derivers → Snapshot → render callback
//! ```
//!
//! - **mount** - Builds every deriver from one config and owns their lifetimes
//! - **frame** - Flushes coalesced scroll work and reads a [`Snapshot`]
//! - **on_render** - Effect that re-runs whenever any derived value changes

pub mod mount;

pub use mount::{mount, MountHandle, ShowcaseConfig, Snapshot};
