//! The unit cube primitive.
//!
//! A single 36-vertex (12-triangle) cube centred on the origin with per-face UVs.
//! It is both the building block of the batched terrain and a standalone drawable
//! for the sky backdrop and light markers.

use crate::math::Matrix4;

use super::{DrawCommand, Renderer, TextureSelector};

/// Number of vertices in the cube template.
pub const CUBE_VERTEX_COUNT: usize = 36;

/// Cube vertex positions, three floats per vertex, two triangles per face.
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; CUBE_VERTEX_COUNT * 3] = [
    // front (+z)
    -0.5, -0.5,  0.5,    0.5, -0.5,  0.5,    0.5,  0.5,  0.5,
    -0.5, -0.5,  0.5,    0.5,  0.5,  0.5,   -0.5,  0.5,  0.5,
    // back (-z)
    -0.5, -0.5, -0.5,   -0.5,  0.5, -0.5,    0.5,  0.5, -0.5,
    -0.5, -0.5, -0.5,    0.5,  0.5, -0.5,    0.5, -0.5, -0.5,
    // top (+y)
    -0.5,  0.5, -0.5,   -0.5,  0.5,  0.5,    0.5,  0.5,  0.5,
    -0.5,  0.5, -0.5,    0.5,  0.5,  0.5,    0.5,  0.5, -0.5,
    // bottom (-y)
    -0.5, -0.5, -0.5,    0.5, -0.5, -0.5,    0.5, -0.5,  0.5,
    -0.5, -0.5, -0.5,    0.5, -0.5,  0.5,   -0.5, -0.5,  0.5,
    // right (+x)
     0.5, -0.5, -0.5,    0.5,  0.5, -0.5,    0.5,  0.5,  0.5,
     0.5, -0.5, -0.5,    0.5,  0.5,  0.5,    0.5, -0.5,  0.5,
    // left (-x)
    -0.5, -0.5, -0.5,   -0.5, -0.5,  0.5,   -0.5,  0.5,  0.5,
    -0.5, -0.5, -0.5,   -0.5,  0.5,  0.5,   -0.5,  0.5, -0.5,
];

/// Cube texture coordinates, two floats per vertex, matching [`CUBE_VERTICES`].
#[rustfmt::skip]
pub const CUBE_UVS: [f32; CUBE_VERTEX_COUNT * 2] = [
    // front
    0.0, 0.0,   1.0, 0.0,   1.0, 1.0,
    0.0, 0.0,   1.0, 1.0,   0.0, 1.0,
    // back
    1.0, 0.0,   1.0, 1.0,   0.0, 1.0,
    1.0, 0.0,   0.0, 1.0,   0.0, 0.0,
    // top
    0.0, 1.0,   0.0, 0.0,   1.0, 0.0,
    0.0, 1.0,   1.0, 0.0,   1.0, 1.0,
    // bottom
    1.0, 1.0,   0.0, 1.0,   0.0, 0.0,
    1.0, 1.0,   0.0, 0.0,   1.0, 0.0,
    // right
    1.0, 0.0,   1.0, 1.0,   0.0, 1.0,
    1.0, 0.0,   0.0, 1.0,   0.0, 0.0,
    // left
    0.0, 0.0,   1.0, 0.0,   1.0, 1.0,
    0.0, 0.0,   1.0, 1.0,   0.0, 1.0,
];

/// A standalone cube drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    /// Model transform applied to the template
    pub matrix: Matrix4,
    /// Texture to sample, or flat colour
    pub texture: TextureSelector,
    /// RGBA colour used in flat-colour mode
    pub color: [f32; 4],
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            matrix: Matrix4::identity(),
            texture: TextureSelector::FlatColor,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Cube {
    /// Creates a flat-coloured cube with an identity transform.
    pub fn flat(color: [f32; 4]) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Emits the draw command for this cube.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.draw(DrawCommand {
            model: self.matrix,
            texture: self.texture,
            color: self.color,
            positions: &CUBE_VERTICES,
            uvs: &CUBE_UVS,
            vertex_count: CUBE_VERTEX_COUNT as u32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_a_unit_cube() {
        assert_eq!(CUBE_VERTICES.len(), 108);
        assert_eq!(CUBE_UVS.len(), 72);
        assert!(CUBE_VERTICES.iter().all(|c| c.abs() == 0.5));
        assert!(CUBE_UVS.iter().all(|&c| c == 0.0 || c == 1.0));
    }

    #[test]
    fn every_face_has_two_triangles() {
        // each face shares one constant coordinate across its six vertices
        for face in CUBE_VERTICES.chunks(18) {
            let fixed_axis = (0..3).find(|&axis| {
                face.chunks(3).all(|v| v[axis] == face[axis])
            });
            assert!(fixed_axis.is_some());
        }
    }
}
