//! # Voxel Ray Casting
//!
//! Finds the voxel a camera ray is aimed at, using a grid traversal (DDA) over the
//! height field's cubes.
//!
//! World and grid space differ by the offset the mesh batcher applies: the cube at
//! grid `(x, y, z)` is centred on `(x - N/2, y - 0.5, z - N/2)`, so it spans
//! `[x - N/2 - 0.5, x - N/2 + 0.5] × [y - 1, y] × [z - N/2 - 0.5, z - N/2 + 0.5]`.

use cgmath::{InnerSpace, Point3, Vector3};

use super::height_field::HeightField;

/// Default reach of a ray, in world units.
pub const DEFAULT_REACH: f32 = 8.0;

/// A ray in world space, typically from the camera eye along the look direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimRay {
    /// Where the ray starts
    pub origin: Point3<f32>,
    /// Where the ray points; need not be normalized
    pub direction: Vector3<f32>,
}

impl AimRay {
    /// Creates a new ray.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelHit {
    /// Grid coordinates `[x, y, z]` of the first solid voxel along the ray
    pub voxel: [i32; 3],
    /// Grid coordinates of the empty voxel the ray passed through just before the hit
    pub previous: [i32; 3],
}

/// Walks a ray through the voxel grid of a height field.
#[derive(Debug, Clone, Copy)]
pub struct VoxelRaycaster {
    /// How far along the ray to search, in world units
    pub max_distance: f32,
}

impl Default for VoxelRaycaster {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_REACH,
        }
    }
}

impl VoxelRaycaster {
    /// Creates a raycaster with the given reach.
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Casts `ray` against `field` and returns the first solid voxel within reach.
    ///
    /// The ray is first clipped against the grid's bounding box, so an origin far
    /// outside the world never starts the traversal from a saturated voxel index.
    ///
    /// # Returns
    /// `None` if the ray has no direction, has a non-finite origin or direction, or
    /// hits nothing within `max_distance`.
    pub fn cast(&self, field: &HeightField, ray: &AimRay) -> Option<VoxelHit> {
        if !ray.direction.magnitude2().is_normal()
            || self.max_distance.is_nan()
            || self.max_distance < 0.0
        {
            return None;
        }
        let dir = ray.direction.normalize();
        let dir = [dir.x, dir.y, dir.z];
        let origin = to_grid_space(field, ray.origin);
        if origin.iter().any(|c| !c.is_finite()) {
            return None;
        }

        let upper = [
            field.size() as f32,
            f32::from(field.max_height()),
            field.size() as f32,
        ];
        let (enter, exit) = clip_to_box(origin, dir, upper)?;
        let reach = self.max_distance.min(exit);
        if enter > reach {
            return None;
        }
        // restart from the entry point so voxel indices stay inside the grid
        let mut start = origin;
        for axis in 0..3 {
            start[axis] = (origin[axis] + dir[axis] * enter).clamp(0.0, upper[axis]);
        }
        let reach = reach - enter;

        let mut voxel = [
            start[0].floor() as i32,
            start[1].floor() as i32,
            start[2].floor() as i32,
        ];

        let mut step = [0i32; 3];
        let mut t_delta = [f32::MAX; 3];
        let mut t_max = [f32::MAX; 3];
        for axis in 0..3 {
            step[axis] = if dir[axis] > 0.0 { 1 } else { -1 };
            if dir[axis] != 0.0 {
                t_delta[axis] = 1.0 / dir[axis].abs();
                t_max[axis] = if dir[axis] > 0.0 {
                    (voxel[axis] as f32 + 1.0 - start[axis]) * t_delta[axis]
                } else {
                    (start[axis] - voxel[axis] as f32) * t_delta[axis]
                };
            }
        }

        let mut previous = voxel;
        let mut distance = 0.0;
        while distance <= reach {
            if field.is_solid(voxel[0], voxel[1], voxel[2]) {
                return Some(VoxelHit { voxel, previous });
            }
            previous = voxel;

            let axis = if t_max[0] < t_max[1] {
                if t_max[0] < t_max[2] {
                    0
                } else {
                    2
                }
            } else if t_max[1] < t_max[2] {
                1
            } else {
                2
            };
            distance = t_max[axis];
            voxel[axis] += step[axis];
            t_max[axis] += t_delta[axis];
        }

        None
    }
}

/// Slab test of a ray against the box `[0, upper]`. Returns the entry and exit
/// distances along the ray, with entry clamped to zero when the origin is inside.
fn clip_to_box(origin: [f32; 3], dir: [f32; 3], upper: [f32; 3]) -> Option<(f32, f32)> {
    let mut enter = 0.0f32;
    let mut exit = f32::INFINITY;
    for axis in 0..3 {
        if dir[axis] == 0.0 {
            if origin[axis] < 0.0 || origin[axis] > upper[axis] {
                return None;
            }
            continue;
        }
        let a = -origin[axis] / dir[axis];
        let b = (upper[axis] - origin[axis]) / dir[axis];
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
    }
    (enter <= exit).then_some((enter, exit))
}

/// Converts a world-space point into continuous grid coordinates, where voxel
/// `(x, y, z)` occupies `[x, x + 1) × [y, y + 1) × [z, z + 1)`.
fn to_grid_space(field: &HeightField, point: Point3<f32>) -> [f32; 3] {
    let half = (field.size() / 2) as f32;
    [point.x + half + 0.5, point.y + 1.0, point.z + half + 0.5]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field() -> HeightField {
        // 4x4 grid, every column 1 high, except (2, 2) which is 3 high
        let mut rows = vec![vec![1u8; 4]; 4];
        rows[2][2] = 3;
        HeightField::from_heights(&rows, 1, 4).unwrap()
    }

    #[test]
    fn straight_down_hits_column_top() {
        let field = flat_field();
        // grid x=1 is world x = 1 - 2 = -1
        let ray = AimRay::new(Point3::new(-1.0, 5.0, -1.0), Vector3::new(0.0, -1.0, 0.0));
        let hit = VoxelRaycaster::default().cast(&field, &ray).unwrap();
        assert_eq!(hit.voxel, [1, 0, 1]);
        assert_eq!(hit.previous, [1, 1, 1]);
    }

    #[test]
    fn tall_column_is_hit_at_its_top() {
        let field = flat_field();
        let ray = AimRay::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let hit = VoxelRaycaster::default().cast(&field, &ray).unwrap();
        assert_eq!(hit.voxel, [2, 2, 2]);
        assert_eq!(hit.previous, [2, 3, 2]);
    }

    #[test]
    fn horizontal_ray_hits_column_side() {
        let field = flat_field();
        // travelling +x at world y = 1.5 (grid level 2), z of column (2, 2)
        let ray = AimRay::new(Point3::new(-1.9, 1.5, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hit = VoxelRaycaster::default().cast(&field, &ray).unwrap();
        assert_eq!(hit.voxel, [2, 2, 2]);
        assert_eq!(hit.previous, [1, 2, 2]);
    }

    #[test]
    fn misses_beyond_reach() {
        let field = flat_field();
        let ray = AimRay::new(Point3::new(0.0, 50.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(VoxelRaycaster::default().cast(&field, &ray).is_none());
        assert!(VoxelRaycaster::new(100.0).cast(&field, &ray).is_some());
    }

    #[test]
    fn far_origin_misses_without_overflow() {
        let field = flat_field();
        let away = AimRay::new(Point3::new(3.0e9, 0.0, 0.0), Vector3::unit_x());
        assert!(VoxelRaycaster::default().cast(&field, &away).is_none());
        let toward = AimRay::new(Point3::new(3.0e9, 0.0, 0.0), -Vector3::unit_x());
        assert!(VoxelRaycaster::default().cast(&field, &toward).is_none());
        // unbounded reach from that far out only has to terminate
        let _ = VoxelRaycaster::new(f32::MAX).cast(&field, &toward);
        let below = AimRay::new(Point3::new(0.0, -4.0e9, 0.0), -Vector3::unit_y());
        assert!(VoxelRaycaster::new(f32::MAX).cast(&field, &below).is_none());
    }

    #[test]
    fn far_origin_within_reach_still_hits() {
        let field = flat_field();
        // enters the grid at x = 4 on level 1, row z = 2
        let ray = AimRay::new(Point3::new(1.0e6, 0.5, 0.0), -Vector3::unit_x());
        let hit = VoxelRaycaster::new(f32::MAX).cast(&field, &ray).unwrap();
        assert_eq!(hit.voxel, [2, 1, 2]);
        assert_eq!(hit.previous, [3, 1, 2]);
    }

    #[test]
    fn non_finite_rays_hit_nothing() {
        let field = flat_field();
        let down = Vector3::new(0.0, -1.0, 0.0);
        for origin in [
            Point3::new(f32::NAN, 5.0, 0.0),
            Point3::new(0.0, f32::INFINITY, 0.0),
            Point3::new(0.0, 5.0, f32::NEG_INFINITY),
        ] {
            assert!(VoxelRaycaster::default().cast(&field, &AimRay::new(origin, down)).is_none());
        }
        let nan_dir = AimRay::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, f32::NAN, 0.0));
        assert!(VoxelRaycaster::default().cast(&field, &nan_dir).is_none());
        let inf_dir = AimRay::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, f32::INFINITY, 0.0));
        assert!(VoxelRaycaster::default().cast(&field, &inf_dir).is_none());
        let ray = AimRay::new(Point3::new(0.0, 5.0, 0.0), down);
        assert!(VoxelRaycaster::new(f32::NAN).cast(&field, &ray).is_none());
    }

    #[test]
    fn zero_direction_hits_nothing() {
        let field = flat_field();
        let ray = AimRay::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert!(VoxelRaycaster::default().cast(&field, &ray).is_none());
    }
}
