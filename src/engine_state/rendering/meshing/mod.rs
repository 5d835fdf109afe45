//! Mesh generation for the terrain.
//!
//! The terrain is drawn as exactly two batches, one per surface material, so the
//! whole world costs two draw calls no matter how many cubes it holds.
//!
//! # Architecture
//! - [`MeshBatcher`]: builds and caches the [`TerrainMesh`] for a height field
//! - [`TerrainMesh`]: the surface and sub-surface [`MeshBuffer`]s
//! - [`SurfaceMaterial`]: which batch a cube at a given level belongs to
//!
//! # Performance Considerations
//! - Every cube contributes all 36 vertices; hidden faces between neighbouring
//!   cubes are not culled. On a 32×32 grid with at most 4 cubes per column this
//!   stays under 150k vertices.
//! - An edit invalidates the cache and the next request rebuilds everything. There
//!   is no incremental patching, so the buffers always match the current heights.

use log::debug;

use crate::engine_state::{
    rendering::{
        cube::{CUBE_UVS, CUBE_VERTEX_COUNT, CUBE_VERTICES},
        TextureUnit, Vertex,
    },
    voxels::HeightField,
};

/// The two material classes a terrain cube can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceMaterial {
    /// The ground-level cube of every column, drawn with the grass texture
    Surface,
    /// Every cube stacked above ground level, drawn with the dirt texture
    SubSurface,
}

impl SurfaceMaterial {
    /// Classifies the cube at grid level `y` of a column.
    pub fn for_level(y: usize) -> Self {
        if y == 0 {
            SurfaceMaterial::Surface
        } else {
            SurfaceMaterial::SubSurface
        }
    }

    /// Texture unit sampled when drawing this material.
    pub fn texture(self) -> TextureUnit {
        match self {
            SurfaceMaterial::Surface => TextureUnit::Grass,
            SurfaceMaterial::SubSurface => TextureUnit::Dirt,
        }
    }
}

/// Flat position and UV buffers for one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    /// Vertex positions, three floats per vertex
    pub positions: Vec<f32>,
    /// Texture coordinates, two floats per vertex
    pub uvs: Vec<f32>,
}

impl MeshBuffer {
    fn with_cube_capacity(cubes: usize) -> Self {
        Self {
            positions: Vec::with_capacity(cubes * CUBE_VERTICES.len()),
            uvs: Vec::with_capacity(cubes * CUBE_UVS.len()),
        }
    }

    /// Appends the cube template translated by `offset`.
    fn push_cube(&mut self, offset: [f32; 3]) {
        for vertex in CUBE_VERTICES.chunks_exact(3) {
            self.positions.push(vertex[0] + offset[0]);
            self.positions.push(vertex[1] + offset[1]);
            self.positions.push(vertex[2] + offset[2]);
        }
        self.uvs.extend_from_slice(&CUBE_UVS);
    }

    /// Number of vertices, three position floats each.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Number of whole cubes in the buffer.
    pub fn cube_count(&self) -> usize {
        self.vertex_count() / CUBE_VERTEX_COUNT
    }

    /// `true` when the buffer holds no geometry; its draw call is skipped.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleaves the buffers into [`Vertex`] records for GPU upload.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.positions
            .chunks_exact(3)
            .zip(self.uvs.chunks_exact(2))
            .map(|(p, uv)| Vertex::new([p[0], p[1], p[2]], [uv[0], uv[1]]))
            .collect()
    }
}

/// The batched terrain geometry: one buffer pair per material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMesh {
    /// Ground-level cubes
    pub surface: MeshBuffer,
    /// Cubes stacked above ground level
    pub subsurface: MeshBuffer,
}

impl TerrainMesh {
    /// Returns the buffer for `material`.
    pub fn get(&self, material: SurfaceMaterial) -> &MeshBuffer {
        match material {
            SurfaceMaterial::Surface => &self.surface,
            SurfaceMaterial::SubSurface => &self.subsurface,
        }
    }

    fn get_mut(&mut self, material: SurfaceMaterial) -> &mut MeshBuffer {
        match material {
            SurfaceMaterial::Surface => &mut self.surface,
            SurfaceMaterial::SubSurface => &mut self.subsurface,
        }
    }

    /// Total vertices across both batches.
    pub fn vertex_count(&self) -> usize {
        self.surface.vertex_count() + self.subsurface.vertex_count()
    }
}

/// Builds terrain batches from a height field and caches the result until the
/// field changes.
///
/// The cache is invalidated explicitly by the owner after every accepted edit;
/// the batcher never inspects the field to detect changes on its own.
#[derive(Debug, Default)]
pub struct MeshBatcher {
    cached: Option<TerrainMesh>,
    rebuilds: u64,
}

impl MeshBatcher {
    /// Creates a batcher with no cached mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulates the whole height field into a fresh [`TerrainMesh`].
    ///
    /// The cube at grid `(x, y, z)` is centred at `(x - N/2, y - 0.5, z - N/2)`,
    /// which puts the world's centre at the origin and the ground-level cubes
    /// straddling `y = 0`.
    ///
    /// # Arguments
    /// * `field` - The heights to triangulate
    ///
    /// # Returns
    /// Two buffer pairs; identical inputs always give bit-identical output.
    pub fn build(field: &HeightField) -> TerrainMesh {
        let half = (field.size() / 2) as f32;
        let columns = field.size() * field.size();
        let mut mesh = TerrainMesh {
            surface: MeshBuffer::with_cube_capacity(columns),
            subsurface: MeshBuffer::with_cube_capacity(field.cube_count().saturating_sub(columns)),
        };

        for (x, z, height) in field.columns() {
            for y in 0..height as usize {
                let offset = [x as f32 - half, y as f32 - 0.5, z as f32 - half];
                mesh.get_mut(SurfaceMaterial::for_level(y)).push_cube(offset);
            }
        }

        mesh
    }

    /// Returns the cached mesh, rebuilding it first if it was invalidated.
    pub fn mesh(&mut self, field: &HeightField) -> &TerrainMesh {
        if self.cached.is_none() {
            self.rebuild(field);
        }
        self.cached.get_or_insert_with(|| Self::build(field))
    }

    /// Rebuilds the cache unconditionally.
    pub fn rebuild(&mut self, field: &HeightField) -> &TerrainMesh {
        let mesh = Self::build(field);
        self.rebuilds += 1;
        debug!(
            "Rebuilt terrain mesh #{}: {} surface cubes, {} sub-surface cubes",
            self.rebuilds,
            mesh.surface.cube_count(),
            mesh.subsurface.cube_count()
        );
        self.cached.insert(mesh)
    }

    /// Drops the cached mesh so the next [`MeshBatcher::mesh`] call rebuilds.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Whether a mesh is cached and current.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Number of full rebuilds performed so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> HeightField {
        HeightField::from_heights(&[vec![2, 1], vec![1, 1]], 1, 4).unwrap()
    }

    #[test]
    fn two_by_two_splits_into_materials() {
        let mesh = MeshBatcher::build(&two_by_two());
        assert_eq!(mesh.surface.positions.len(), 4 * 36 * 3);
        assert_eq!(mesh.surface.uvs.len(), 4 * 36 * 2);
        assert_eq!(mesh.subsurface.positions.len(), 36 * 3);
        assert_eq!(mesh.subsurface.uvs.len(), 36 * 2);
        assert_eq!(mesh.subsurface.cube_count(), 1);
        assert_eq!(mesh.surface.triangle_count(), 48);
    }

    #[test]
    fn rebuilding_is_bit_identical() {
        let field = two_by_two();
        let first = MeshBatcher::build(&field);
        let second = MeshBatcher::build(&field);
        let bits = |v: &[f32]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first.surface.positions), bits(&second.surface.positions));
        assert_eq!(bits(&first.subsurface.positions), bits(&second.subsurface.positions));
        assert_eq!(bits(&first.surface.uvs), bits(&second.surface.uvs));
    }

    #[test]
    fn cubes_are_centred_on_their_cells() {
        let mesh = MeshBatcher::build(&two_by_two());
        // first surface cube is grid (0, 0, 0): centre (-1, -0.5, -1)
        let first = &mesh.surface.positions[..108];
        let centre = |axis: usize| {
            first.iter().skip(axis).step_by(3).sum::<f32>() / 36.0
        };
        assert_eq!([centre(0), centre(1), centre(2)], [-1.0, -0.5, -1.0]);

        // the only sub-surface cube sits one level up in the same column
        let stacked = &mesh.subsurface.positions;
        let y_centre = stacked.iter().skip(1).step_by(3).sum::<f32>() / 36.0;
        assert_eq!(y_centre, 0.5);
    }

    #[test]
    fn cache_rebuilds_only_after_invalidation() {
        let mut field = two_by_two();
        let mut batcher = MeshBatcher::new();
        assert!(!batcher.is_cached());
        assert_eq!(batcher.mesh(&field).vertex_count(), 5 * 36);
        batcher.mesh(&field);
        assert_eq!(batcher.rebuilds(), 1);

        assert!(field.raise(1, 1));
        batcher.invalidate();
        assert_eq!(batcher.mesh(&field).subsurface.cube_count(), 2);
        assert_eq!(batcher.rebuilds(), 2);
    }

    #[test]
    fn interleaved_vertices_follow_buffers() {
        let mesh = MeshBatcher::build(&two_by_two());
        let vertices = mesh.subsurface.to_vertices();
        assert_eq!(vertices.len(), 36);
        assert_eq!(vertices[0].position, [
            mesh.subsurface.positions[0],
            mesh.subsurface.positions[1],
            mesh.subsurface.positions[2],
        ]);
        assert_eq!(vertices[0].tex_coords, [CUBE_UVS[0], CUBE_UVS[1]]);
    }

    #[test]
    fn materials_map_to_textures() {
        assert_eq!(SurfaceMaterial::for_level(0), SurfaceMaterial::Surface);
        assert_eq!(SurfaceMaterial::for_level(3), SurfaceMaterial::SubSurface);
        assert_eq!(SurfaceMaterial::Surface.texture(), TextureUnit::Grass);
        assert_eq!(SurfaceMaterial::SubSurface.texture(), TextureUnit::Dirt);
    }
}
