//! A headless [`Renderer`] that records every call it receives.
//!
//! Used by the binary's headless session and by tests to assert on the exact
//! sequence of clears, state changes, uniform writes and draws a frame emits.

use std::collections::{HashMap, HashSet};

use crate::math::Matrix4;

use super::{DrawCommand, Renderer, TextureSelector, UniformHandle, UniformValue};

/// A recorded draw. Buffers are summarised by length rather than copied.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Model matrix of the draw
    pub model: Matrix4,
    /// Texture or flat colour selection
    pub texture: TextureSelector,
    /// RGBA colour
    pub color: [f32; 4],
    /// Vertices drawn
    pub vertex_count: u32,
    /// Length of the position buffer
    pub position_floats: usize,
    /// Length of the UV buffer
    pub uv_floats: usize,
}

/// One call made against the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    /// `Renderer::clear`
    Clear,
    /// `Renderer::set_depth_test`
    DepthTest(bool),
    /// `Renderer::set_uniform`
    Uniform {
        /// Target slot
        handle: UniformHandle,
        /// Written value
        value: UniformValue,
    },
    /// `Renderer::draw`
    Draw(DrawRecord),
}

/// Records calls and hands out sequential uniform handles.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    handles: HashMap<String, UniformHandle>,
    missing: HashSet<String>,
    lookups: usize,
    calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    /// Creates a renderer that resolves every uniform name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named uniforms unresolvable, as if the shader lacked them.
    pub fn with_missing(mut self, names: &[&str]) -> Self {
        self.missing.extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// The handle previously issued for `name`, if any.
    pub fn uniform(&self, name: &str) -> Option<UniformHandle> {
        self.handles.get(name).copied()
    }

    /// The most recent value written to the uniform called `name`.
    pub fn last_value(&self, name: &str) -> Option<UniformValue> {
        let handle = self.uniform(name)?;
        self.calls.iter().rev().find_map(|call| match call {
            RenderCall::Uniform { handle: h, value } if *h == handle => Some(*value),
            _ => None,
        })
    }

    /// Every call received, in order.
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Recorded draws, in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.calls.iter().filter_map(|call| match call {
            RenderCall::Draw(draw) => Some(draw),
            _ => None,
        })
    }

    /// Number of frames started, counted by clears.
    pub fn frames(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RenderCall::Clear))
            .count()
    }

    /// Number of uniform lookups made, successful or not.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Forgets recorded calls but keeps issued handles.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn uniform_location(&mut self, name: &str) -> Option<UniformHandle> {
        self.lookups += 1;
        if self.missing.contains(name) {
            return None;
        }
        let next = UniformHandle(self.handles.len() as u32);
        Some(*self.handles.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform(&mut self, handle: UniformHandle, value: UniformValue) {
        self.calls.push(RenderCall::Uniform { handle, value });
    }

    fn clear(&mut self) {
        self.calls.push(RenderCall::Clear);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(RenderCall::DepthTest(enabled));
    }

    fn draw(&mut self, command: DrawCommand<'_>) {
        self.calls.push(RenderCall::Draw(DrawRecord {
            model: command.model,
            texture: command.texture,
            color: command.color,
            vertex_count: command.vertex_count,
            position_floats: command.positions.len(),
            uv_floats: command.uvs.len(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::Cube;

    #[test]
    fn handles_are_stable_per_name() {
        let mut renderer = RecordingRenderer::new();
        let a = renderer.uniform_location("u_A");
        let b = renderer.uniform_location("u_B");
        assert_ne!(a, b);
        assert_eq!(renderer.uniform_location("u_A"), a);
        assert_eq!(renderer.lookups(), 3);
    }

    #[test]
    fn missing_names_do_not_resolve() {
        let mut renderer = RecordingRenderer::new().with_missing(&["u_Gone"]);
        assert_eq!(renderer.uniform_location("u_Gone"), None);
        assert_eq!(renderer.uniform("u_Gone"), None);
    }

    #[test]
    fn records_draws_and_last_values() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.uniform_location("u_X").unwrap();
        renderer.clear();
        renderer.set_uniform(handle, UniformValue::Float(1.0));
        renderer.set_uniform(handle, UniformValue::Float(2.0));
        Cube::flat([1.0, 0.0, 0.0, 1.0]).render(&mut renderer);

        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.last_value("u_X"), Some(UniformValue::Float(2.0)));
        let draw = renderer.draws().next().unwrap();
        assert_eq!(draw.vertex_count, 36);
        assert_eq!(draw.position_floats, 108);
        assert_eq!(draw.texture, TextureSelector::FlatColor);
    }
}
