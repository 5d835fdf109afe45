//! Light uniform handles and the packed GPU block.

use log::warn;

use crate::engine_state::rendering::{Renderer, UniformHandle, UniformValue};

/// Point light position (vec3).
pub const POINT_LIGHT_POSITION: &str = "u_PointLightPosition";
/// Point light colour (vec3).
pub const POINT_LIGHT_COLOR: &str = "u_PointLightColor";
/// Spot light position (vec3).
pub const SPOT_LIGHT_POSITION: &str = "u_SpotLightPosition";
/// Spot light direction (vec3).
pub const SPOT_LIGHT_DIRECTION: &str = "u_SpotLightDirection";
/// Spot light colour (vec3).
pub const SPOT_LIGHT_COLOR: &str = "u_SpotLightColor";
/// Ambient term (vec3).
pub const AMBIENT_LIGHT: &str = "u_AmbientLight";
/// Specular exponent (float).
pub const SPECULAR_POWER: &str = "u_SpecularPower";
/// Cosine of the spot half-angle (float).
pub const SPOT_CUTOFF: &str = "u_SpotCutoff";
/// Lighting master switch (bool).
pub const LIGHTING_ON: &str = "u_LightingOn";
/// Normal visualisation switch (bool).
pub const SHOW_NORMALS: &str = "u_ShowNormals";
/// Point light switch (bool).
pub const POINT_LIGHT_ON: &str = "u_PointLightOn";
/// Spot light switch (bool).
pub const SPOT_LIGHT_ON: &str = "u_SpotLightOn";
/// Eye position for specular terms (vec3).
pub const CAMERA_POSITION: &str = "u_CameraPosition";

/// Handles for every light uniform, resolved once during setup.
///
/// Light uniforms are optional: a shader that drops one (an unlit debug shader,
/// say) still renders, and writes to the missing slot are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightUniformHandles {
    /// [`POINT_LIGHT_POSITION`]
    pub point_position: Option<UniformHandle>,
    /// [`POINT_LIGHT_COLOR`]
    pub point_color: Option<UniformHandle>,
    /// [`SPOT_LIGHT_POSITION`]
    pub spot_position: Option<UniformHandle>,
    /// [`SPOT_LIGHT_DIRECTION`]
    pub spot_direction: Option<UniformHandle>,
    /// [`SPOT_LIGHT_COLOR`]
    pub spot_color: Option<UniformHandle>,
    /// [`AMBIENT_LIGHT`]
    pub ambient: Option<UniformHandle>,
    /// [`SPECULAR_POWER`]
    pub specular_power: Option<UniformHandle>,
    /// [`SPOT_CUTOFF`]
    pub spot_cutoff: Option<UniformHandle>,
    /// [`LIGHTING_ON`]
    pub lighting_on: Option<UniformHandle>,
    /// [`SHOW_NORMALS`]
    pub show_normals: Option<UniformHandle>,
    /// [`POINT_LIGHT_ON`]
    pub point_on: Option<UniformHandle>,
    /// [`SPOT_LIGHT_ON`]
    pub spot_on: Option<UniformHandle>,
    /// [`CAMERA_POSITION`]
    pub camera_position: Option<UniformHandle>,
}

impl LightUniformHandles {
    /// Looks up every light uniform, warning about each one the renderer lacks.
    pub fn resolve(renderer: &mut dyn Renderer) -> Self {
        let mut lookup = |name: &str| {
            let handle = renderer.uniform_location(name);
            if handle.is_none() {
                warn!("Failed to get the storage location of {name}");
            }
            handle
        };
        Self {
            point_position: lookup(POINT_LIGHT_POSITION),
            point_color: lookup(POINT_LIGHT_COLOR),
            spot_position: lookup(SPOT_LIGHT_POSITION),
            spot_direction: lookup(SPOT_LIGHT_DIRECTION),
            spot_color: lookup(SPOT_LIGHT_COLOR),
            ambient: lookup(AMBIENT_LIGHT),
            specular_power: lookup(SPECULAR_POWER),
            spot_cutoff: lookup(SPOT_CUTOFF),
            lighting_on: lookup(LIGHTING_ON),
            show_normals: lookup(SHOW_NORMALS),
            point_on: lookup(POINT_LIGHT_ON),
            spot_on: lookup(SPOT_LIGHT_ON),
            camera_position: lookup(CAMERA_POSITION),
        }
    }
}

/// Writes `value` to `handle` if the handle was resolved.
pub(super) fn write(renderer: &mut dyn Renderer, handle: Option<UniformHandle>, value: UniformValue) {
    if let Some(handle) = handle {
        renderer.set_uniform(handle, value);
    }
}

/// GPU-friendly representation of the light state for a uniform buffer.
///
/// Vectors are padded to 16 bytes; flags are stored as 0/1 words.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Point light position, w unused
    pub point_position: [f32; 4],
    /// Point light colour, w unused
    pub point_color: [f32; 4],
    /// Spot light position, w unused
    pub spot_position: [f32; 4],
    /// Spot light direction, w unused
    pub spot_direction: [f32; 4],
    /// Spot light colour, w unused
    pub spot_color: [f32; 4],
    /// Ambient term, w unused
    pub ambient: [f32; 4],
    /// Eye position, w unused
    pub camera_position: [f32; 4],
    /// `[specular_power, spot_cutoff, 0, 0]`
    pub params: [f32; 4],
    /// `[lighting_on, show_normals, point_on, spot_on]`
    pub flags: [u32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::RecordingRenderer;

    #[test]
    fn missing_light_uniforms_are_optional() {
        let mut renderer = RecordingRenderer::new().with_missing(&[SHOW_NORMALS]);
        let handles = LightUniformHandles::resolve(&mut renderer);
        assert!(handles.show_normals.is_none());
        assert!(handles.point_position.is_some());
        assert_eq!(renderer.lookups(), 13);
    }

    #[test]
    fn uniform_block_is_padded() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 144);
    }
}
