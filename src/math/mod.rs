//! # Math Module
//!
//! Small column-major matrix types used for every transform in the viewer:
//! model placement of drawables, the camera's view and projection, and normal
//! correction under non-uniform scale.
//!
//! The types are plain `#[repr(C)]` arrays so they can be handed to the GPU with
//! `bytemuck`, and they convert to and from `cgmath` where the camera wants
//! richer vector math.

mod matrix3;
mod matrix4;

pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
