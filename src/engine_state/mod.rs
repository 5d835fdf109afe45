//! # Engine State Module
//!
//! The explicit world state of the viewer and the per-frame driver.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the terrain, its mesh cache, the lights and the camera
//! * `camera_state` - View and projection matrices and the aim ray
//! * `lighting` - Point/spot lights, ambient term and their uniforms
//! * `rendering` - The renderer boundary, cube template and mesh batching
//! * `voxels` - Height field, ray casting and block editing
//!
//! ## Architecture
//!
//! All mutable state lives in one `EngineState` owned by the driver loop. Input,
//! edits and frames all go through `&mut self`, so a mesh rebuild always sees a
//! stable height field and an edit is always applied before the next rebuild.
//!
//! ## Frame Order
//!
//! 1. Light animation update
//! 2. Clear
//! 3. Projection, view and global rotation uploads
//! 4. Light uniforms and camera position
//! 5. Sky backdrop, with depth testing off
//! 6. Terrain: the sub-surface batch, then the surface batch
//! 7. Light markers

use cgmath::{Point3, Vector3};
use log::{debug, error, info};
use web_time::Duration;

use crate::{
    config::ViewerConfig,
    error::{ViewerError, ViewerResult},
    math::Matrix4,
};

pub mod camera_state;
pub mod lighting;
pub mod rendering;
pub mod voxels;

use camera_state::CameraState;
use lighting::{LightControl, LightModel, LightUniformHandles};
use rendering::{
    Cube, DrawCommand, MeshBatcher, Renderer, SceneUniforms, SurfaceMaterial, TerrainMesh,
    TextureSelector, Vertex,
};
use voxels::{AimRay, BlockEditor, EditIntent, HeightField};

/// Flat colour of the sky backdrop.
pub const SKY_COLOR: [f32; 4] = [0.53, 0.81, 0.98, 1.0];
/// Scale of the sky cube, large enough to enclose the world.
const SKY_SCALE: f32 = 100.0;

/// Draw order of the terrain batches.
const TERRAIN_ORDER: [SurfaceMaterial; 2] = [SurfaceMaterial::SubSurface, SurfaceMaterial::Surface];

/// Every uniform handle the frame writes through, resolved once in [`EngineState::bind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderBindings {
    /// Matrix and sampler handles
    pub scene: SceneUniforms,
    /// Light handles; any may be absent
    pub lights: LightUniformHandles,
}

/// What a single frame submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Index of the frame, starting at 1
    pub frame: u64,
    /// Draw calls issued, sky and markers included
    pub draw_calls: usize,
    /// Vertices submitted across both terrain batches
    pub terrain_vertices: usize,
    /// Full mesh rebuilds performed so far
    pub mesh_rebuilds: u64,
}

/// What a GPU backend would upload for the current world and lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadSummary {
    /// Bytes of interleaved [`Vertex`] data across both terrain batches
    pub terrain_bytes: u64,
    /// Bytes of the packed light uniform block
    pub light_block_bytes: usize,
    /// Surface columns whose top face lies inside the spot light's cone
    pub spot_lit_columns: usize,
}

/// The main state container for the viewer.
///
/// # Examples
///
/// ```
/// use voxel_viewer::{EngineState, RecordingRenderer, ViewerConfig};
/// use web_time::Duration;
///
/// let mut renderer = RecordingRenderer::new();
/// let mut engine = EngineState::new(&ViewerConfig::default()).unwrap();
/// engine.bind(&mut renderer).unwrap();
/// let stats = engine.tick(&mut renderer, Duration::from_millis(16)).unwrap();
/// assert_eq!(stats.frame, 1);
/// ```
pub struct EngineState {
    /// Camera placement and projection
    pub camera_state: CameraState,
    /// Actions gathered since the last call to [`EngineState::process_input`]
    pub player_actions: PlayerAction,
    /// The terrain heights
    height_field: HeightField,
    /// Cached terrain batches
    batcher: MeshBatcher,
    /// Turns edit intents into height changes
    editor: BlockEditor,
    /// Light state
    lights: LightModel,
    /// Rotation applied to the whole scene
    global_rotation: Matrix4,
    /// Uniform handles, `None` until bound
    bindings: Option<RenderBindings>,
    /// Noise seed the terrain was generated from
    seed: u32,
    /// Frames rendered so far
    frame: u64,
}

impl EngineState {
    /// Creates the world described by `config`, generating terrain from noise.
    ///
    /// # Arguments
    ///
    /// * `config` - World, lighting and camera settings
    ///
    /// # Errors
    ///
    /// Fails if the world settings are invalid (zero grid size, inverted bounds).
    pub fn new(config: &ViewerConfig) -> ViewerResult<Self> {
        let seed = config.world.resolve_seed();
        let height_field = HeightField::generate(&config.world, seed)?;
        Ok(Self::with_height_field(height_field, seed, config))
    }

    /// Creates the world around an existing height field.
    ///
    /// # Arguments
    ///
    /// * `height_field` - The terrain to view
    /// * `seed` - Seed reported by [`EngineState::seed`]
    /// * `config` - Lighting and camera settings; world settings are ignored
    pub fn with_height_field(height_field: HeightField, seed: u32, config: &ViewerConfig) -> Self {
        Self {
            camera_state: CameraState::new(&config.camera),
            player_actions: PlayerAction::default(),
            height_field,
            batcher: MeshBatcher::new(),
            editor: BlockEditor::default(),
            lights: LightModel::from_config(&config.lighting),
            global_rotation: Matrix4::identity(),
            bindings: None,
            seed,
            frame: 0,
        }
    }

    /// Resolves every uniform handle against `renderer` and binds the samplers.
    ///
    /// This is the one-time setup phase. On failure the engine stays unbound and
    /// [`EngineState::tick`] keeps refusing to draw; nothing panics.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::MissingUniform`] if a scene uniform is missing.
    pub fn bind(&mut self, renderer: &mut dyn Renderer) -> ViewerResult<()> {
        let scene = SceneUniforms::resolve(renderer).map_err(|err| {
            error!("Renderer setup failed: {err}");
            err
        })?;
        scene.bind_samplers(renderer);
        let lights = LightUniformHandles::resolve(renderer);

        self.bindings = Some(RenderBindings { scene, lights });
        info!("Renderer bound");
        Ok(())
    }

    /// Whether [`EngineState::bind`] has succeeded.
    pub fn is_bound(&self) -> bool {
        self.bindings.is_some()
    }

    /// Renders one frame.
    ///
    /// # Arguments
    ///
    /// * `renderer` - Destination of the frame's commands
    /// * `dt` - Time elapsed since the previous frame
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::NotBound`] before a successful [`EngineState::bind`],
    /// or the camera's error if its matrices are degenerate. In both cases nothing
    /// is submitted for this frame.
    pub fn tick(&mut self, renderer: &mut dyn Renderer, dt: Duration) -> ViewerResult<FrameStats> {
        let bindings = self.bindings.ok_or(ViewerError::NotBound)?;

        self.lights.update(dt);

        let projection = self.camera_state.projection_matrix()?;
        let view = self.camera_state.view_matrix()?;
        let eye = self.camera_state.camera.position();

        renderer.clear();
        bindings
            .scene
            .upload_matrices(renderer, projection, view, self.global_rotation);
        self.lights.set_uniforms(renderer, &bindings.lights, eye);

        let mut draw_calls = 0;

        renderer.set_depth_test(false);
        self.sky(eye).render(renderer);
        renderer.set_depth_test(true);
        draw_calls += 1;

        let mesh = self.batcher.mesh(&self.height_field);
        let mut terrain_vertices = 0;
        for material in TERRAIN_ORDER {
            let batch = mesh.get(material);
            if batch.is_empty() {
                continue;
            }
            renderer.draw(DrawCommand {
                model: Matrix4::identity(),
                texture: TextureSelector::Texture(material.texture()),
                color: [1.0, 1.0, 1.0, 1.0],
                positions: &batch.positions,
                uvs: &batch.uvs,
                vertex_count: batch.vertex_count() as u32,
            });
            terrain_vertices += batch.vertex_count();
            draw_calls += 1;
        }

        self.lights.render_markers(renderer);
        draw_calls += usize::from(self.lights.point.enabled) + usize::from(self.lights.spot.enabled);

        self.frame += 1;
        Ok(FrameStats {
            frame: self.frame,
            draw_calls,
            terrain_vertices,
            mesh_rebuilds: self.batcher.rebuilds(),
        })
    }

    /// The sky backdrop: a large flat-coloured cube centred on the eye.
    fn sky(&self, eye: [f32; 3]) -> Cube {
        let mut matrix = Matrix4::from_translation(eye[0], eye[1], eye[2]);
        matrix.scale(SKY_SCALE, SKY_SCALE, SKY_SCALE);
        Cube {
            matrix,
            ..Cube::flat(SKY_COLOR)
        }
    }

    /// Applies an edit along the camera's aim ray.
    ///
    /// # Returns
    ///
    /// `true` if a column changed; the terrain mesh has then been rebuilt.
    pub fn apply_edit(&mut self, intent: EditIntent) -> bool {
        let ray = self.camera_state.camera.aim_ray();
        self.apply_edit_with_ray(intent, &ray)
    }

    /// Applies an edit along an explicit ray.
    pub fn apply_edit_with_ray(&mut self, intent: EditIntent, ray: &AimRay) -> bool {
        let changed = self.editor.apply(&mut self.height_field, intent, ray);
        if changed {
            self.batcher.rebuild(&self.height_field);
        }
        changed
    }

    /// Restores the terrain as generated, rebuilding if anything had been edited.
    pub fn reset_world(&mut self) -> bool {
        let changed = self.height_field.reset();
        if changed {
            info!("World reset to generated terrain");
            self.batcher.rebuild(&self.height_field);
        }
        changed
    }

    /// Applies one control-panel event to the lights.
    pub fn apply_light_control(&mut self, control: LightControl) {
        self.lights.apply(control);
    }

    /// Sets the scene-wide rotation about the vertical axis, in degrees.
    pub fn set_global_rotation(&mut self, degrees: f32) {
        let up = Vector3::unit_y();
        self.global_rotation.set_rotate(degrees, up.x, up.y, up.z);
    }

    /// Applies and clears the gathered [`PlayerAction`].
    ///
    /// Camera movement comes first, so an edit in the same batch uses the moved
    /// camera's aim ray.
    ///
    /// # Returns
    ///
    /// `true` if the terrain changed.
    pub fn process_input(&mut self) -> bool {
        let actions = std::mem::take(&mut self.player_actions);
        let camera = &mut self.camera_state.camera;

        if actions.move_forward {
            camera.move_forward();
        }
        if actions.move_backward {
            camera.move_backward();
        }
        if actions.move_left {
            camera.move_left();
        }
        if actions.move_right {
            camera.move_right();
        }
        if actions.turn_left {
            camera.turn_left();
        }
        if actions.turn_right {
            camera.turn_right();
        }
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            camera.look_around(delta_x, delta_y);
        }

        for control in actions.light_controls {
            self.lights.apply(control);
        }

        let mut changed = false;
        if actions.reset_world {
            changed |= self.reset_world();
        }
        if let Some(intent) = actions.edit {
            changed |= self.apply_edit(intent);
        }
        if changed {
            debug!("Terrain changed: {} cubes", self.height_field.cube_count());
        }
        changed
    }

    /// Updates the projection for a resized viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_state.resize(width, height);
    }

    /// The current terrain heights.
    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    /// The current light state.
    pub fn lights(&self) -> &LightModel {
        &self.lights
    }

    /// The current terrain batches, rebuilt first if stale.
    pub fn mesh(&mut self) -> &TerrainMesh {
        self.batcher.mesh(&self.height_field)
    }

    /// Sizes the interleaved terrain vertices and the light block against the
    /// layouts a GPU backend binds, rebuilding the mesh first if stale.
    pub fn upload_summary(&mut self) -> UploadSummary {
        let stride = Vertex::desc().array_stride;
        let mesh = self.batcher.mesh(&self.height_field);
        let vertices = mesh.surface.to_vertices().len() + mesh.subsurface.to_vertices().len();
        let block = self.lights.to_uniform(self.camera_state.camera.position());
        UploadSummary {
            terrain_bytes: vertices as u64 * stride,
            light_block_bytes: bytemuck::bytes_of(&block).len(),
            spot_lit_columns: self.spot_lit_columns(),
        }
    }

    /// Counts the columns whose top face centre is inside the spot light's cone.
    /// A disabled spot light lights nothing.
    pub fn spot_lit_columns(&self) -> usize {
        if !self.lights.spot.enabled {
            return 0;
        }
        let half = (self.height_field.size() / 2) as f32;
        self.height_field
            .columns()
            .filter(|&(x, z, h)| {
                let top = Point3::new(x as f32 - half, f32::from(h) - 1.0, z as f32 - half);
                self.lights.spot.illuminates(top)
            })
            .count()
    }

    /// Full mesh rebuilds performed so far.
    pub fn mesh_rebuilds(&self) -> u64 {
        self.batcher.rebuilds()
    }

    /// Seed the terrain was generated from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Represents player actions gathered from input between frames.
///
/// Input decoding happens outside the viewer; callers set these flags and call
/// [`EngineState::process_input`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// Step towards the look-at point
    pub move_forward: bool,
    /// Step away from the look-at point
    pub move_backward: bool,
    /// Strafe left
    pub move_left: bool,
    /// Strafe right
    pub move_right: bool,
    /// Turn left about the up axis
    pub turn_left: bool,
    /// Turn right about the up axis
    pub turn_right: bool,

    /// View rotation from pointer motion
    pub rotate_view: Option<(f32, f32)>,

    /// Block edit at the aimed voxel
    pub edit: Option<EditIntent>,
    /// Restore the generated terrain
    pub reset_world: bool,
    /// Control-panel events, applied in order
    pub light_controls: Vec<LightControl>,
}
