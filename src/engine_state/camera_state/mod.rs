//! # Camera State Management
//!
//! The camera collaborator: it supplies the view and projection matrices every
//! frame and the aim ray block edits are resolved along. Input decoding is not
//! handled here; callers translate their own key and pointer events into the
//! movement helpers on [`Camera`].
//!
//! ## Core Components
//! - `Camera`: eye, look-at point and up vector
//! - `Projection`: perspective parameters
//! - `CameraState`: both, plus the combined matrix queries the frame needs

use crate::{config::CameraConfig, error::ViewerResult, math::Matrix4};

pub mod camera;

pub use camera::{Camera, Projection};

/// The camera and its projection.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    /// The current camera placement
    pub camera: Camera,
    /// The perspective projection settings
    pub projection: Projection,
}

impl CameraState {
    /// Creates a camera state from configuration.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            camera: Camera::new(config),
            projection: Projection::from_config(config),
        }
    }

    /// The view matrix for the current placement.
    pub fn view_matrix(&self) -> ViewerResult<Matrix4> {
        self.camera.calc_matrix()
    }

    /// The projection matrix for the current viewport.
    pub fn projection_matrix(&self) -> ViewerResult<Matrix4> {
        self.projection.calc_matrix()
    }

    /// Updates the projection for a resized viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }
}
