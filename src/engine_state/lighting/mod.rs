//! # Light Model
//!
//! Holds the scene's light state and turns it into shader uniforms each frame:
//! a point light that can orbit the world, a spot light, an ambient term and a
//! shared specular exponent, plus the global lighting and normal-view toggles.
//!
//! ## Animation
//!
//! When animation is on, every update advances an angle accumulator and places
//! the point light on a horizontal circle around the origin. Its height bobs at
//! twice the orbit frequency:
//!
//! ```text
//! x = cos(angle) * radius
//! z = sin(angle) * radius
//! y = height + sin(2 * angle) * bob
//! ```
//!
//! With [`AnimationTiming::PerTick`] the step is fixed per update, so motion speed
//! follows the frame rate. [`AnimationTiming::PerSecond`] scales the step by the
//! elapsed time relative to a 60 Hz tick.

use cgmath::{Point3, Vector3};
use log::debug;
use web_time::Duration;

use crate::{
    config::{AnimationTiming, LightingConfig},
    engine_state::rendering::{Renderer, UniformValue},
};

mod controls;
mod lights;
mod uniforms;

pub use controls::{Axis, ColorChannel, LightControl};
pub use lights::{PointLight, SpotLight};
pub use uniforms::{LightUniform, LightUniformHandles};

/// Reference tick rate for [`AnimationTiming::PerSecond`].
const REFERENCE_TICKS_PER_SECOND: f32 = 60.0;

/// Parameters of the point light's orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    /// Distance from the vertical axis
    pub radius: f32,
    /// Height the orbit bobs around
    pub height: f32,
    /// Amplitude of the vertical bob
    pub bob_amplitude: f32,
    /// Radians added per step
    pub angle_step: f32,
    /// Whether a step is per tick or scaled by elapsed time
    pub timing: AnimationTiming,
}

/// The complete light state of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LightModel {
    /// The orbiting point light
    pub point: PointLight,
    /// The spot light
    pub spot: SpotLight,
    /// RGB ambient term, independent of both lights
    pub ambient: [f32; 3],
    /// Specular exponent shared by both lights
    pub specular_power: f32,
    /// Master switch; when off the shader renders unlit
    pub lighting_enabled: bool,
    /// Render surface normals as colours
    pub show_normals: bool,
    /// Whether `update` advances the orbit
    pub animate: bool,
    /// Orbit followed while animating
    pub orbit: Orbit,
    /// Accumulated orbit angle in radians
    angle: f32,
}

impl LightModel {
    /// Builds the light state from configuration.
    pub fn from_config(config: &LightingConfig) -> Self {
        Self {
            point: PointLight {
                position: Point3::from(config.point_position),
                color: config.point_color,
                enabled: config.point_enabled,
            },
            spot: SpotLight {
                position: Point3::from(config.spot_position),
                direction: Vector3::from(config.spot_direction),
                color: config.spot_color,
                cutoff: SpotLight::cutoff_from_degrees(config.spot_cutoff_degrees),
                enabled: config.spot_enabled,
            },
            ambient: config.ambient,
            specular_power: config.specular_power,
            lighting_enabled: true,
            show_normals: false,
            animate: config.animate,
            orbit: Orbit {
                radius: config.orbit_radius,
                height: config.orbit_height,
                bob_amplitude: config.bob_amplitude,
                angle_step: config.angle_step,
                timing: config.timing,
            },
            angle: 0.0,
        }
    }

    /// Current orbit angle in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances the animation by one update.
    ///
    /// # Arguments
    /// * `dt` - Time since the previous update; only used with
    ///   [`AnimationTiming::PerSecond`]
    ///
    /// # Notes
    /// Does nothing while animation is off. The point light keeps its last
    /// position when animation is switched off again.
    pub fn update(&mut self, dt: Duration) {
        if !self.animate {
            return;
        }
        let step = match self.orbit.timing {
            AnimationTiming::PerTick => self.orbit.angle_step,
            AnimationTiming::PerSecond => {
                self.orbit.angle_step * dt.as_secs_f32() * REFERENCE_TICKS_PER_SECOND
            }
        };
        self.angle += step;

        let (sin, cos) = self.angle.sin_cos();
        self.point.position = Point3::new(
            cos * self.orbit.radius,
            self.orbit.height + (self.angle * 2.0).sin() * self.orbit.bob_amplitude,
            sin * self.orbit.radius,
        );
    }

    /// Applies a control-panel event.
    pub fn apply(&mut self, control: LightControl) {
        use controls::{clamp_to, UNIT_RANGE};

        match control {
            LightControl::ToggleLighting => self.lighting_enabled = !self.lighting_enabled,
            LightControl::ToggleNormals => self.show_normals = !self.show_normals,
            LightControl::TogglePointLight => self.point.enabled = !self.point.enabled,
            LightControl::ToggleSpotLight => self.spot.enabled = !self.spot.enabled,
            LightControl::ToggleAnimation => self.animate = !self.animate,
            LightControl::PointPosition(axis, value) => {
                self.point.position[axis.index()] = clamp_to(value, axis.range());
            }
            LightControl::SpotPosition(axis, value) => {
                self.spot.position[axis.index()] = clamp_to(value, axis.range());
            }
            LightControl::AmbientIntensity(value) => {
                self.ambient = [clamp_to(value, UNIT_RANGE); 3];
            }
            LightControl::PointColor(channel, value) => {
                self.point.color[channel.index()] = clamp_to(value, UNIT_RANGE);
            }
        }
        debug!("Applied light control {control:?}");
    }

    /// Writes every light uniform plus the camera position.
    ///
    /// Only writes to the renderer's uniform slots; calling it twice in a row
    /// writes the same values twice.
    ///
    /// # Arguments
    /// * `renderer` - Destination of the writes
    /// * `handles` - Handles resolved during setup
    /// * `camera_position` - Eye position used for specular highlights
    pub fn set_uniforms(
        &self,
        renderer: &mut dyn Renderer,
        handles: &LightUniformHandles,
        camera_position: [f32; 3],
    ) {
        use uniforms::write;

        write(renderer, handles.point_position, UniformValue::Vec3(self.point.position.into()));
        write(renderer, handles.point_color, UniformValue::Vec3(self.point.color));
        write(renderer, handles.spot_position, UniformValue::Vec3(self.spot.position.into()));
        write(renderer, handles.spot_direction, UniformValue::Vec3(self.spot.direction.into()));
        write(renderer, handles.spot_color, UniformValue::Vec3(self.spot.color));
        write(renderer, handles.ambient, UniformValue::Vec3(self.ambient));
        write(renderer, handles.specular_power, UniformValue::Float(self.specular_power));
        write(renderer, handles.spot_cutoff, UniformValue::Float(self.spot.cutoff));
        write(renderer, handles.lighting_on, UniformValue::Bool(self.lighting_enabled));
        write(renderer, handles.show_normals, UniformValue::Bool(self.show_normals));
        write(renderer, handles.point_on, UniformValue::Bool(self.point.enabled));
        write(renderer, handles.spot_on, UniformValue::Bool(self.spot.enabled));
        write(renderer, handles.camera_position, UniformValue::Vec3(camera_position));
    }

    /// Draws a marker cube for each enabled light.
    pub fn render_markers(&self, renderer: &mut dyn Renderer) {
        if self.point.enabled {
            self.point.marker().render(renderer);
        }
        if self.spot.enabled {
            self.spot.marker().render(renderer);
        }
    }

    /// Packs the light state into a uniform-buffer block.
    pub fn to_uniform(&self, camera_position: [f32; 3]) -> LightUniform {
        let pad = |v: [f32; 3]| [v[0], v[1], v[2], 0.0];
        LightUniform {
            point_position: pad(self.point.position.into()),
            point_color: pad(self.point.color),
            spot_position: pad(self.spot.position.into()),
            spot_direction: pad(self.spot.direction.into()),
            spot_color: pad(self.spot.color),
            ambient: pad(self.ambient),
            camera_position: pad(camera_position),
            params: [self.specular_power, self.spot.cutoff, 0.0, 0.0],
            flags: [
                self.lighting_enabled as u32,
                self.show_normals as u32,
                self.point.enabled as u32,
                self.spot.enabled as u32,
            ],
        }
    }
}

impl Default for LightModel {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}
