//! # Camera Implementation
//!
//! A look-at camera and its perspective projection:
//! - `Camera`: eye/at/up vectors plus movement helpers
//! - `Projection`: field of view, aspect ratio and clip planes
//!
//! Both produce [`Matrix4`]s in the column-major layout the shader expects.

use cgmath::{InnerSpace, Point3, Vector3};
use log::warn;

use crate::{
    config::CameraConfig,
    engine_state::voxels::AimRay,
    error::ViewerResult,
    math::Matrix4,
};

/// Smallest |cos| between the view direction and the up vector that tilting may
/// reach, keeping the look-at basis well defined.
const MAX_TILT_COS: f32 = 0.99;

/// A first-person camera described by where it is, what it looks at, and which
/// way is up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub eye: Point3<f32>,
    /// The point the camera looks at
    pub at: Point3<f32>,
    /// The world up direction
    pub up: Vector3<f32>,
    /// Distance covered by one movement step
    move_speed: f32,
    /// Degrees turned by one turn step
    turn_angle: f32,
    /// Degrees of rotation per unit of pointer motion
    look_sensitivity: f32,
}

impl Camera {
    /// Creates a camera from its configuration.
    ///
    /// # Arguments
    /// * `config` - Initial eye/at/up vectors and movement rates
    ///
    /// # Returns
    /// A new `Camera` placed as configured
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            eye: Point3::from(config.eye),
            at: Point3::from(config.at),
            up: Vector3::from(config.up),
            move_speed: config.move_speed,
            turn_angle: config.turn_angle,
            look_sensitivity: config.look_sensitivity,
        }
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Errors
    /// Fails when `eye == at` or `up` is parallel to the view direction.
    pub fn calc_matrix(&self) -> ViewerResult<Matrix4> {
        let mut view = Matrix4::identity();
        view.set_look_at(self.eye, self.at, self.up)?;
        Ok(view)
    }

    /// The aim ray used for block editing: from the eye towards the look-at point.
    pub fn aim_ray(&self) -> AimRay {
        AimRay::new(self.eye, self.at - self.eye)
    }

    /// Eye position as a plain array, as uploaded to the shader.
    pub fn position(&self) -> [f32; 3] {
        self.eye.into()
    }

    /// Steps towards the look-at point.
    ///
    /// Movement is skipped, with a warning, while `eye == at` or when the step
    /// would leave finite coordinates. The same holds for the other moves.
    pub fn move_forward(&mut self) {
        if let Some(forward) = self.forward() {
            self.translate(forward * self.move_speed);
        }
    }

    /// Steps away from the look-at point.
    pub fn move_backward(&mut self) {
        if let Some(forward) = self.forward() {
            self.translate(-forward * self.move_speed);
        }
    }

    /// Strafes left, keeping the view direction. Skipped while the view is
    /// parallel to `up`.
    pub fn move_left(&mut self) {
        if let Some(right) = self.right() {
            self.translate(-right * self.move_speed);
        }
    }

    /// Strafes right, keeping the view direction.
    pub fn move_right(&mut self) {
        if let Some(right) = self.right() {
            self.translate(right * self.move_speed);
        }
    }

    /// Turns the view left around the up axis by one turn step.
    pub fn turn_left(&mut self) {
        self.pan(self.turn_angle);
    }

    /// Turns the view right around the up axis by one turn step.
    pub fn turn_right(&mut self) {
        self.pan(-self.turn_angle);
    }

    /// Rotates the view from pointer motion.
    ///
    /// # Arguments
    /// * `delta_x` - Horizontal motion; positive pans right
    /// * `delta_y` - Vertical motion; positive tilts down
    ///
    /// # Notes
    /// A tilt that would bring the view within a few degrees of straight up or
    /// down is skipped; panning still applies.
    pub fn look_around(&mut self, delta_x: f32, delta_y: f32) {
        self.pan(-delta_x * self.look_sensitivity);

        let angle = -delta_y * self.look_sensitivity;
        if angle == 0.0 {
            return;
        }
        let Some(axis) = self.right() else {
            return;
        };
        let tilted = rotate_vector(self.at - self.eye, angle, axis);
        if tilted.normalize().dot(self.up.normalize()).abs() > MAX_TILT_COS {
            warn!("Camera tilt of {angle} degrees would align the view with up, skipped");
            return;
        }
        self.at = self.eye + tilted;
    }

    fn pan(&mut self, angle: f32) {
        let rotated = rotate_vector(self.at - self.eye, angle, self.up);
        let at = self.eye + rotated;
        if is_finite(at) {
            self.at = at;
        }
    }

    fn translate(&mut self, step: Vector3<f32>) {
        let (eye, at) = (self.eye + step, self.at + step);
        if !(is_finite(eye) && is_finite(at)) {
            warn!("Camera step of {step:?} leaves finite space, skipped");
            return;
        }
        self.eye = eye;
        self.at = at;
    }

    /// Unit view direction, or `None` while `eye == at` (or either is not finite).
    fn forward(&self) -> Option<Vector3<f32>> {
        let view = self.at - self.eye;
        if !view.magnitude2().is_normal() {
            warn!("Camera eye and target coincide, view direction undefined");
            return None;
        }
        Some(view.normalize())
    }

    fn right(&self) -> Option<Vector3<f32>> {
        let right = self.forward()?.cross(self.up);
        if !right.magnitude2().is_normal() {
            warn!("Camera view is parallel to up, strafe direction undefined");
            return None;
        }
        Some(right.normalize())
    }
}

fn is_finite(p: Point3<f32>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

fn rotate_vector(v: Vector3<f32>, angle: f32, axis: Vector3<f32>) -> Vector3<f32> {
    let mut rotation = Matrix4::identity();
    rotation.set_rotate(angle, axis.x, axis.y, axis.z);
    let [x, y, z, _] = rotation.multiply_vector4([v.x, v.y, v.z, 0.0]);
    Vector3::new(x, y, z)
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in degrees
    fovy: f32,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view in degrees
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy,
            znear,
            zfar,
        }
    }

    /// Builds the projection described by `config`.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            config.viewport_width,
            config.viewport_height,
            config.fov,
            config.near,
            config.far,
        )
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Current aspect ratio, width over height.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix.
    ///
    /// # Errors
    /// Fails for a null frustum, a non-positive near plane or a zero field of view.
    pub fn calc_matrix(&self) -> ViewerResult<Matrix4> {
        let mut projection = Matrix4::identity();
        projection.set_perspective(self.fovy, self.aspect, self.znear, self.zfar)?;
        Ok(projection)
    }
}

/// A zero height would give an infinite aspect; treat it as square instead.
fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        warn!("Viewport height is zero, using an aspect ratio of 1");
        return 1.0;
    }
    width as f32 / height as f32
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig {
            eye: [0.0, 0.0, 5.0],
            at: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            move_speed: 1.0,
            turn_angle: 90.0,
            look_sensitivity: 1.0,
            ..CameraConfig::default()
        })
    }

    #[test]
    fn moving_forward_carries_the_target() {
        let mut camera = camera();
        camera.move_forward();
        assert_relative_eq!(camera.eye.z, 4.0);
        assert_relative_eq!(camera.at.z, -1.0);
        camera.move_backward();
        assert_relative_eq!(camera.eye.z, 5.0);
    }

    #[test]
    fn strafing_is_perpendicular_to_view() {
        let mut camera = camera();
        camera.move_right();
        assert_relative_eq!(camera.eye.x, 1.0);
        assert_relative_eq!(camera.eye.z, 5.0);
        camera.move_left();
        camera.move_left();
        assert_relative_eq!(camera.eye.x, -1.0);
    }

    #[test]
    fn turning_left_rotates_about_up() {
        let mut camera = camera();
        camera.turn_left();
        // looking down -z, a left turn of 90 degrees looks down -x
        assert_relative_eq!(camera.at.x, -5.0, epsilon = 1e-4);
        assert_relative_eq!(camera.at.z, 5.0, epsilon = 1e-4);
        camera.turn_right();
        assert_relative_eq!(camera.at.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn tilt_towards_up_is_skipped() {
        let mut camera = camera();
        let before = camera.at;
        camera.look_around(0.0, -90.0);
        assert_eq!(camera.at, before);
        camera.look_around(0.0, -10.0);
        assert!(camera.at.y > 0.0);
    }

    #[test]
    fn aim_ray_points_at_target() {
        let ray = camera().aim_ray();
        assert_eq!(ray.origin, Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(ray.direction.z, -5.0);
    }

    #[test]
    fn view_matrix_puts_target_on_negative_z() {
        let view = camera().calc_matrix().unwrap();
        let [x, y, z] = view.multiply_vector3([0.0, 0.0, 0.0]);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
        assert_relative_eq!(z, -5.0);
    }

    #[test]
    fn coincident_eye_and_target_freeze_the_camera() {
        let mut camera = Camera::new(&CameraConfig {
            eye: [1.0, 2.0, 3.0],
            at: [1.0, 2.0, 3.0],
            ..CameraConfig::default()
        });
        let before = camera.clone();
        camera.move_forward();
        camera.move_backward();
        camera.move_left();
        camera.move_right();
        camera.turn_left();
        camera.look_around(10.0, 10.0);
        assert_eq!(camera, before);
        assert!(camera.calc_matrix().is_err());
    }

    #[test]
    fn view_along_up_still_moves_but_does_not_strafe() {
        let mut camera = Camera::new(&CameraConfig {
            eye: [0.0, 5.0, 0.0],
            at: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            move_speed: 1.0,
            ..CameraConfig::default()
        });
        camera.move_left();
        camera.look_around(0.0, 5.0);
        assert_eq!(camera.eye, Point3::new(0.0, 5.0, 0.0));
        assert_eq!(camera.at, Point3::new(0.0, 0.0, 0.0));
        camera.move_forward();
        assert_relative_eq!(camera.eye.y, 4.0);
        assert!(camera.calc_matrix().is_err());
    }

    #[test]
    fn step_out_of_finite_space_is_skipped() {
        let mut camera = Camera::new(&CameraConfig {
            move_speed: f32::INFINITY,
            ..CameraConfig::default()
        });
        let before = camera.clone();
        camera.move_forward();
        camera.move_right();
        assert_eq!(camera, before);
        assert!(camera.calc_matrix().is_ok());
    }

    #[test]
    fn projection_tracks_resize() {
        let mut projection = Projection::from_config(&CameraConfig::default());
        assert_relative_eq!(projection.aspect(), 800.0 / 600.0);
        projection.resize(100, 100);
        assert_relative_eq!(projection.aspect(), 1.0);
        projection.resize(100, 0);
        assert_relative_eq!(projection.aspect(), 1.0);
        assert!(projection.calc_matrix().is_ok());
    }
}
