//! # Voxel World
//!
//! The voxel side of the viewer: the terrain's height field, the ray caster that
//! finds the voxel under the cursor, and the block editor that mutates columns.
//!
//! ## Data Flow
//!
//! 1. [`HeightField::generate`] samples noise once per session
//! 2. The mesh batcher reads the field to build terrain geometry
//! 3. [`BlockEditor`] raises or lowers single columns in response to edits
//! 4. Any accepted edit triggers a full geometry rebuild
//!
//! ## Coordinates
//!
//! Grid columns are `(x, z)` in `0..N`. A column of height `h` holds cubes at grid
//! levels `0..h`; the cube at level 0 is the surface material, every cube above
//! it is sub-surface material.

pub mod block_editor;
pub mod height_field;
pub mod raycast;

pub use block_editor::{BlockEditor, ColumnTarget, EditIntent, TargetResolver};
pub use height_field::HeightField;
pub use raycast::{AimRay, VoxelHit, VoxelRaycaster};
