//! # Configuration
//!
//! Tunable parameters for the world, the lights and the camera. Every field has a
//! default matching the reference scene, so a config file only needs to name the
//! values it changes:
//!
//! ```json
//! { "world": { "seed": 7 }, "lighting": { "animate": true, "timing": "per_second" } }
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ViewerResult;

/// Top-level configuration for a viewer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Terrain generation parameters
    pub world: WorldConfig,
    /// Point/spot light and ambient defaults
    pub lighting: LightingConfig,
    /// Initial camera placement and projection
    pub camera: CameraConfig,
    /// Number of frames the headless driver renders before exiting
    pub frames: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
            frames: 120,
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    /// Returns [`crate::ViewerError::Config`] if the document is not valid JSON or
    /// a field has the wrong type.
    pub fn from_json_str(json: &str) -> ViewerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file, falling back to defaults when it does not exist.
    ///
    /// # Errors
    /// Returns [`crate::ViewerError::Config`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Parameters of the height-field generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length N of the square N×N grid
    pub size: usize,
    /// Factor applied to grid coordinates before sampling noise
    pub noise_scale: f64,
    /// Multiplier turning the [-1, 1] noise sample into a height band
    pub noise_amplitude: f64,
    /// Offset added to the scaled noise before clamping
    pub baseline: i32,
    /// Lowest column height; columns never become empty
    pub min_height: u8,
    /// Highest column height
    pub max_height: u8,
    /// Noise seed; a random one is drawn per run when absent
    pub seed: Option<u32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 32,
            noise_scale: 0.1,
            noise_amplitude: 3.0,
            baseline: 2,
            min_height: 1,
            max_height: 4,
            seed: None,
        }
    }
}

impl WorldConfig {
    /// Returns the configured seed, or draws a fresh one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }
}

/// How the point light's orbit angle advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationTiming {
    /// A fixed step every tick, regardless of elapsed time
    PerTick,
    /// The step is scaled by elapsed time relative to a 60 Hz tick
    PerSecond,
}

/// Initial light state and animation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Initial point light position in world space
    pub point_position: [f32; 3],
    /// Point light RGB colour
    pub point_color: [f32; 3],
    /// Whether the point light starts on
    pub point_enabled: bool,
    /// Initial spot light position in world space
    pub spot_position: [f32; 3],
    /// Direction the spot cone points
    pub spot_direction: [f32; 3],
    /// Spot light RGB colour
    pub spot_color: [f32; 3],
    /// Half-angle of the spot cone in degrees; stored on the light as its cosine
    pub spot_cutoff_degrees: f32,
    /// Whether the spot light starts on
    pub spot_enabled: bool,
    /// RGB ambient term
    pub ambient: [f32; 3],
    /// Specular exponent
    pub specular_power: f32,
    /// Radius of the point light's horizontal orbit
    pub orbit_radius: f32,
    /// Height the orbit bobs around
    pub orbit_height: f32,
    /// Amplitude of the vertical bob
    pub bob_amplitude: f32,
    /// Radians added to the orbit angle per step
    pub angle_step: f32,
    /// Whether the point light orbits from the first frame
    pub animate: bool,
    /// How the orbit angle advances
    pub timing: AnimationTiming,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            point_position: [0.0, 10.0, 0.0],
            point_color: [1.0, 1.0, 1.0],
            point_enabled: true,
            spot_position: [5.0, 10.0, 5.0],
            spot_direction: [0.0, -1.0, 0.0],
            spot_color: [1.0, 0.8, 0.4],
            spot_cutoff_degrees: 30.0,
            spot_enabled: false,
            ambient: [0.2, 0.2, 0.3],
            specular_power: 32.0,
            orbit_radius: 8.0,
            orbit_height: 8.0,
            bob_amplitude: 3.0,
            angle_step: 0.01,
            animate: false,
            timing: AnimationTiming::PerTick,
        }
    }
}

/// Initial camera placement and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position
    pub eye: [f32; 3],
    /// Point the camera looks at
    pub at: [f32; 3],
    /// World up direction
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
    /// Distance covered by one movement step
    pub move_speed: f32,
    /// Degrees turned by one turn step
    pub turn_angle: f32,
    /// Degrees of pan/tilt per unit of pointer motion
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 3.0, 12.0],
            at: [0.0, 2.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 60.0,
            viewport_width: 800,
            viewport_height: 600,
            near: 0.1,
            far: 100.0,
            move_speed: 0.2,
            turn_angle: 5.0,
            look_sensitivity: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.world.size, 32);
        assert_eq!(config.lighting.timing, AnimationTiming::PerTick);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = ViewerConfig::from_json_str(
            r#"{ "world": { "seed": 7, "size": 8 }, "lighting": { "timing": "per_second" } }"#,
        )
        .unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.size, 8);
        assert_eq!(config.world.max_height, 4);
        assert_eq!(config.lighting.timing, AnimationTiming::PerSecond);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = ViewerConfig::from_json_str("{ world: ").unwrap_err();
        assert!(matches!(err, crate::ViewerError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ViewerConfig::load("/definitely/not/here/viewer.json").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn configured_seed_is_used() {
        let world = WorldConfig {
            seed: Some(42),
            ..WorldConfig::default()
        };
        assert_eq!(world.resolve_seed(), 42);
    }
}
