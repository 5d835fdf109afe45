//! Discrete control events pushed by an external control panel.
//!
//! Slider values are clamped to the ranges the panel offers; nothing else is
//! validated.

/// Horizontal slider range for light positions.
pub const HORIZONTAL_RANGE: (f32, f32) = (-20.0, 20.0);
/// Vertical slider range for light positions.
pub const VERTICAL_RANGE: (f32, f32) = (0.0, 20.0);
/// Range of colour channels and ambient intensity.
pub const UNIT_RANGE: (f32, f32) = (0.0, 1.0);

/// A world axis a light can be moved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left-right
    X,
    /// Up-down
    Y,
    /// Front-back
    Z,
}

impl Axis {
    /// Component index into an `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The slider range for a position on this axis.
    pub fn range(self) -> (f32, f32) {
        match self {
            Axis::Y => VERTICAL_RANGE,
            Axis::X | Axis::Z => HORIZONTAL_RANGE,
        }
    }
}

/// One channel of an RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    /// First channel
    Red,
    /// Second channel
    Green,
    /// Third channel
    Blue,
}

impl ColorChannel {
    /// Component index into an RGB triple.
    pub fn index(self) -> usize {
        match self {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
        }
    }
}

/// A change requested by the control panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightControl {
    /// Switch all lighting on or off
    ToggleLighting,
    /// Switch the normal visualisation on or off
    ToggleNormals,
    /// Switch the point light on or off
    TogglePointLight,
    /// Switch the spot light on or off
    ToggleSpotLight,
    /// Start or stop the point light's orbit
    ToggleAnimation,
    /// Move the point light along one axis
    PointPosition(Axis, f32),
    /// Move the spot light along one axis
    SpotPosition(Axis, f32),
    /// Set the ambient term to a grey of this intensity
    AmbientIntensity(f32),
    /// Set one channel of the point light's colour
    PointColor(ColorChannel, f32),
}

/// Clamps `value` into `range`, mapping NaN to the lower bound.
pub(super) fn clamp_to(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}
