//! Pug engine crate.
//!
//! A single rotating cube rendered through wgpu: device and swap chain,
//! shader loading, the load/update/render/teardown lifecycle and the
//! window-driven frame loop.

pub mod cube;
pub mod device;
pub mod logging;
pub mod shader;
pub mod time;
pub mod window;
