//! Repaint-driven render loop.
//!
//! A [`RepaintClock`] stands in for the display's repaint callback. Each
//! [`RenderHandle`] pulls a grid from its [`GridSource`] once per tick and
//! publishes it to a [`DisplayTarget`], requesting the next tick only after the
//! publish returns.

pub mod clock;
pub mod driver;
pub mod source;
pub mod target;

pub use clock::{drive_for, FrameRequestId, Pacing, RepaintClock, REPAINT_INTERVAL};
pub use driver::{Activation, LoopSettings, LoopState, Placeholders, RenderHandle, RenderLoop};
pub use source::{GridSource, SampledSource};
pub use target::DisplayTarget;
