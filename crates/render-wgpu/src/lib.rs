//! wgpu backend for streamed terrain.
//!
//! # Invariants
//! - A vertex buffer is registered with its device from its first upload
//!   until it is dropped; draws referencing a released buffer are skipped.
//! - Only the thread that owns the device drops vertex buffers.

mod device;
mod pass;
mod shaders;

pub use device::{GpuInitError, WgpuGraphicsDevice};
pub use pass::TerrainPass;

pub fn crate_info() -> &'static str {
    "terrastream-render-wgpu v0.1.0"
}
