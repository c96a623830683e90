//! Time subsystem.
//!
//! Frame timing without coupling to the runtime:
//! - one `FrameClock` per render loop
//! - call `tick()` once per simulated frame to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{clamp_step, FrameClock, FrameTime, MAX_TIME_STEP};
