//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer and the
//! cube renderer, and drives the message/tick state machine.

mod frame_loop;
mod runtime;

pub use frame_loop::{FrameLoop, LoopState, Message, Step};
pub use runtime::{Runtime, RuntimeConfig, StartupError, StartupStage};
