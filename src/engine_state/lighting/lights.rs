//! Point and spot light sources and their on-screen markers.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::{engine_state::rendering::Cube, math::Matrix4};

/// Marker scale for the point light.
const POINT_MARKER_SCALE: [f32; 3] = [0.5, 0.5, 0.5];
/// Marker scale for the spot light, elongated to hint at its direction.
const SPOT_MARKER_SCALE: [f32; 3] = [0.3, 0.6, 0.3];

/// An omnidirectional light.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Position in world space
    pub position: Point3<f32>,
    /// RGB colour, each channel in `[0, 1]`
    pub color: [f32; 3],
    /// Whether the light contributes and its marker is drawn
    pub enabled: bool,
}

impl PointLight {
    /// A small flat-coloured cube at the light's position, in the light's colour.
    pub fn marker(&self) -> Cube {
        marker_at(self.position, self.color, POINT_MARKER_SCALE)
    }
}

/// A cone-shaped light.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    /// Position of the cone apex in world space
    pub position: Point3<f32>,
    /// Axis of the cone; need not be normalized
    pub direction: Vector3<f32>,
    /// RGB colour, each channel in `[0, 1]`
    pub color: [f32; 3],
    /// Cosine of the cone's half-angle
    pub cutoff: f32,
    /// Whether the light contributes and its marker is drawn
    pub enabled: bool,
}

impl SpotLight {
    /// Builds the cutoff cosine from a half-angle in degrees.
    pub fn cutoff_from_degrees(half_angle: f32) -> f32 {
        half_angle.to_radians().cos()
    }

    /// Whether `point` lies inside the light's cone.
    ///
    /// A zero-length direction, or a point at the light itself, lights nothing.
    pub fn illuminates(&self, point: Point3<f32>) -> bool {
        let to_point = point - self.position;
        if to_point.magnitude2() == 0.0 || self.direction.magnitude2() == 0.0 {
            return false;
        }
        to_point.normalize().dot(self.direction.normalize()) >= self.cutoff
    }

    /// An elongated flat-coloured cube at the cone apex.
    pub fn marker(&self) -> Cube {
        marker_at(self.position, self.color, SPOT_MARKER_SCALE)
    }
}

fn marker_at(position: Point3<f32>, color: [f32; 3], scale: [f32; 3]) -> Cube {
    let mut matrix = Matrix4::from_translation(position.x, position.y, position.z);
    matrix.scale(scale[0], scale[1], scale[2]);
    Cube {
        matrix,
        color: [color[0], color[1], color[2], 1.0],
        ..Cube::default()
    }
}
