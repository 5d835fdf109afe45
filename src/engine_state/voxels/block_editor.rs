//! # Block Editor
//!
//! Turns "add block" / "remove block" intents into height-field mutations.
//!
//! Resolving which column an intent applies to is delegated to a
//! [`TargetResolver`]; the default [`VoxelRaycaster`] resolver walks the aim ray
//! through the voxel grid. The editor itself only enforces the bounds: edits
//! outside the grid, above the height cap or below the floor are rejected and
//! reported as "no change".

use log::debug;

use super::{
    height_field::HeightField,
    raycast::{AimRay, VoxelRaycaster},
};

/// What the user asked to do with the block under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditIntent {
    /// Put one cube on a column
    Add,
    /// Take the top cube off a column
    Remove,
}

/// A column targeted by an edit. Coordinates may lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnTarget {
    /// Grid column X
    pub x: i32,
    /// Grid column Z
    pub z: i32,
}

/// Decides which column an edit intent applies to.
pub trait TargetResolver {
    /// Resolves the column for `intent` given the aim `ray`, or `None` if the ray
    /// does not point at anything editable.
    fn resolve(&self, field: &HeightField, ray: &AimRay, intent: EditIntent) -> Option<ColumnTarget>;
}

impl TargetResolver for VoxelRaycaster {
    /// "Remove" targets the column of the voxel hit; "add" targets the column of the
    /// empty voxel in front of the face that was hit, which is the hit column itself
    /// when the ray came down onto its top.
    fn resolve(&self, field: &HeightField, ray: &AimRay, intent: EditIntent) -> Option<ColumnTarget> {
        let hit = self.cast(field, ray)?;
        let [x, _, z] = match intent {
            EditIntent::Remove => hit.voxel,
            EditIntent::Add => hit.previous,
        };
        Some(ColumnTarget { x, z })
    }
}

/// Applies add/remove intents to a height field.
#[derive(Debug, Clone, Default)]
pub struct BlockEditor<R = VoxelRaycaster> {
    resolver: R,
}

impl<R: TargetResolver> BlockEditor<R> {
    /// Creates an editor that resolves targets with `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolves the target of `intent` along `ray` and applies it.
    ///
    /// # Returns
    /// `true` if the height field changed and geometry must be rebuilt.
    pub fn apply(&self, field: &mut HeightField, intent: EditIntent, ray: &AimRay) -> bool {
        match self.resolver.resolve(field, ray, intent) {
            Some(target) => self.apply_at(field, intent, target),
            None => {
                debug!("{intent:?} rejected: nothing targeted");
                false
            }
        }
    }

    /// Applies `intent` directly to the column at `target`.
    ///
    /// # Returns
    /// `true` if the height field changed and geometry must be rebuilt.
    pub fn apply_at(&self, field: &mut HeightField, intent: EditIntent, target: ColumnTarget) -> bool {
        if !field.contains(target.x, target.z) {
            debug!("{intent:?} rejected: ({}, {}) is outside the grid", target.x, target.z);
            return false;
        }
        match intent {
            EditIntent::Add => field.raise(target.x, target.z),
            EditIntent::Remove => field.lower(target.x, target.z),
        }
    }
}
