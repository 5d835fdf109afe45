//! Scene-level uniform handles.
//!
//! Every handle the frame needs outside of lighting is resolved exactly once, at
//! bind time, into a [`SceneUniforms`] table. Texture samplers live in a fixed
//! array indexed by [`TextureUnit`], so no uniform name is ever composed at draw
//! time.

use log::warn;

use crate::{
    error::{ViewerError, ViewerResult},
    math::Matrix4,
};

use super::{Renderer, TextureUnit, UniformHandle, UniformValue, TEXTURE_UNIT_COUNT};

/// Projection matrix (mat4).
pub const PROJECTION_MATRIX: &str = "u_ProjectionMatrix";
/// View matrix (mat4).
pub const VIEW_MATRIX: &str = "u_ViewMatrix";
/// Scene-wide rotation (mat4).
pub const GLOBAL_ROTATE_MATRIX: &str = "u_GlobalRotateMatrix";

/// Sampler uniform names, indexed by texture unit.
pub const SAMPLER_UNIFORM_NAMES: [&str; TEXTURE_UNIT_COUNT] = [
    "u_Sampler0",
    "u_Sampler1",
    "u_Sampler2",
    "u_Sampler3",
    "u_Sampler4",
];

/// Resolved handles for the per-frame matrices and the texture samplers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneUniforms {
    /// [`PROJECTION_MATRIX`]
    pub projection: UniformHandle,
    /// [`VIEW_MATRIX`]
    pub view: UniformHandle,
    /// [`GLOBAL_ROTATE_MATRIX`]
    pub global_rotate: UniformHandle,
    /// One sampler per texture unit, named by [`SAMPLER_UNIFORM_NAMES`]
    pub samplers: [UniformHandle; TEXTURE_UNIT_COUNT],
}

impl SceneUniforms {
    /// Resolves every scene uniform against `renderer`.
    ///
    /// # Errors
    /// Returns [`ViewerError::MissingUniform`] naming the first uniform the
    /// renderer cannot resolve. Without these the frame cannot be drawn at all.
    pub fn resolve(renderer: &mut dyn Renderer) -> ViewerResult<Self> {
        let projection = require(renderer, PROJECTION_MATRIX)?;
        let view = require(renderer, VIEW_MATRIX)?;
        let global_rotate = require(renderer, GLOBAL_ROTATE_MATRIX)?;

        let mut samplers = [UniformHandle(0); TEXTURE_UNIT_COUNT];
        for (slot, name) in samplers.iter_mut().zip(SAMPLER_UNIFORM_NAMES) {
            *slot = require(renderer, name)?;
        }

        Ok(Self {
            projection,
            view,
            global_rotate,
            samplers,
        })
    }

    /// Points each sampler at its texture unit.
    pub fn bind_samplers(&self, renderer: &mut dyn Renderer) {
        for unit in TextureUnit::all() {
            renderer.set_uniform(
                self.samplers[unit.index()],
                UniformValue::Int(unit.index() as i32),
            );
        }
    }

    /// Uploads the projection, view and global rotation matrices.
    pub fn upload_matrices(
        &self,
        renderer: &mut dyn Renderer,
        projection: Matrix4,
        view: Matrix4,
        global_rotate: Matrix4,
    ) {
        renderer.set_uniform(self.projection, UniformValue::Mat4(projection));
        renderer.set_uniform(self.view, UniformValue::Mat4(view));
        renderer.set_uniform(self.global_rotate, UniformValue::Mat4(global_rotate));
    }
}

fn require(renderer: &mut dyn Renderer, name: &str) -> ViewerResult<UniformHandle> {
    renderer.uniform_location(name).ok_or_else(|| {
        warn!("Failed to get the storage location of {name}");
        ViewerError::MissingUniform(name.to_string())
    })
}
