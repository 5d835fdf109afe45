//! Rendering boundary for the voxel viewer.
//!
//! The viewer does not own a GPU. It talks to an opaque [`Renderer`] that resolves
//! uniform names to handles once during setup, accepts uniform writes, and binds
//! and issues draws described by [`DrawCommand`]s. Everything the core knows about
//! geometry (the cube template, the batched terrain buffers, the interleaved
//! vertex layout) lives in this module's children.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::math::Matrix4;

pub mod cube;
pub mod meshing;
pub mod recording;
pub mod uniforms;
mod vertex;

// Re-export commonly used types
pub use cube::Cube;
pub use meshing::{MeshBatcher, MeshBuffer, SurfaceMaterial, TerrainMesh};
pub use recording::{RecordingRenderer, RenderCall};
pub use uniforms::SceneUniforms;
pub use vertex::Vertex;

/// Opaque handle to a shader uniform, issued by the renderer during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u32);

/// A value written to a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Integer, used for sampler units
    Int(i32),
    /// Boolean switch
    Bool(bool),
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3([f32; 3]),
    /// 4-component vector
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix
    Mat4(Matrix4),
}

/// Texture units bound by the shading stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum TextureUnit {
    /// Sky texture
    Sky = 0,
    /// Sub-surface terrain
    Dirt = 1,
    /// Surface terrain
    Grass = 2,
    /// Reserved for tree trunks
    Wood = 3,
    /// Reserved for foliage
    Leaves = 4,
}

/// Number of texture units, and of sampler uniforms.
pub const TEXTURE_UNIT_COUNT: usize = 5;

impl TextureUnit {
    /// All units in index order.
    pub fn all() -> [TextureUnit; TEXTURE_UNIT_COUNT] {
        [
            TextureUnit::Sky,
            TextureUnit::Dirt,
            TextureUnit::Grass,
            TextureUnit::Wood,
            TextureUnit::Leaves,
        ]
    }

    /// Index of the unit, equal to its sampler slot.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Selects how a drawable is coloured.
///
/// On the wire this is an integer: `-2` means flat colour, `0..5` picks a texture
/// unit, anything else renders white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSelector {
    /// Use the command's RGBA colour instead of a texture
    FlatColor,
    /// Sample the given texture unit
    Texture(TextureUnit),
    /// An unrecognised code; the shader falls back to white
    Unknown(i32),
}

impl TextureSelector {
    /// Reserved code meaning "use flat colour".
    pub const FLAT_COLOR_CODE: i32 = -2;

    /// Decodes an integer selector.
    pub fn from_code(code: i32) -> Self {
        if code == Self::FLAT_COLOR_CODE {
            return TextureSelector::FlatColor;
        }
        match TextureUnit::from_i32(code) {
            Some(unit) => TextureSelector::Texture(unit),
            None => TextureSelector::Unknown(code),
        }
    }

    /// Encodes the selector as the integer the shader expects.
    pub fn code(self) -> i32 {
        match self {
            TextureSelector::FlatColor => Self::FLAT_COLOR_CODE,
            TextureSelector::Texture(unit) => unit as i32,
            TextureSelector::Unknown(code) => code,
        }
    }
}

/// One draw submission: a transform, a colouring mode and a position/UV buffer pair.
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand<'a> {
    /// Model transform
    pub model: Matrix4,
    /// Texture unit or flat-colour sentinel
    pub texture: TextureSelector,
    /// RGBA colour, only used in flat-colour mode
    pub color: [f32; 4],
    /// Vertex positions, three floats per vertex
    pub positions: &'a [f32],
    /// Texture coordinates, two floats per vertex
    pub uvs: &'a [f32],
    /// Number of vertices to draw
    pub vertex_count: u32,
}

impl DrawCommand<'_> {
    /// Number of triangles the command draws.
    pub fn triangle_count(&self) -> u32 {
        self.vertex_count / 3
    }
}

/// The opaque rendering backend the viewer emits commands to.
///
/// Implementations own the surface, shaders and GPU buffers. The viewer resolves
/// every uniform it needs once via [`Renderer::uniform_location`] and then only
/// writes through the returned handles.
pub trait Renderer {
    /// Resolves a uniform by name, or `None` if the shader has no such uniform.
    fn uniform_location(&mut self, name: &str) -> Option<UniformHandle>;

    /// Writes a uniform value.
    fn set_uniform(&mut self, handle: UniformHandle, value: UniformValue);

    /// Clears colour and depth.
    fn clear(&mut self);

    /// Enables or disables depth testing for subsequent draws.
    fn set_depth_test(&mut self, enabled: bool);

    /// Binds the command's buffers and state and issues the draw.
    fn draw(&mut self, command: DrawCommand<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_codes_round_trip() {
        assert_eq!(TextureSelector::from_code(-2), TextureSelector::FlatColor);
        assert_eq!(
            TextureSelector::from_code(2),
            TextureSelector::Texture(TextureUnit::Grass)
        );
        assert_eq!(TextureSelector::from_code(9), TextureSelector::Unknown(9));
        for unit in TextureUnit::all() {
            let selector = TextureSelector::Texture(unit);
            assert_eq!(TextureSelector::from_code(selector.code()), selector);
            assert_eq!(unit.index() as i32, selector.code());
        }
    }

    #[test]
    fn triangle_count_is_a_third_of_vertices() {
        let command = DrawCommand {
            model: Matrix4::identity(),
            texture: TextureSelector::FlatColor,
            color: [1.0; 4],
            positions: &cube::CUBE_VERTICES,
            uvs: &cube::CUBE_UVS,
            vertex_count: 36,
        };
        assert_eq!(command.triangle_count(), 12);
    }
}
