//! Full-frame behaviour driven through the public API and a recording renderer.

use cgmath::{Point3, Vector3};
use voxel_viewer::{
    config::WorldConfig,
    engine_state::{
        lighting::{Axis, ColorChannel},
        rendering::{
            uniforms::{PROJECTION_MATRIX, SAMPLER_UNIFORM_NAMES},
            RenderCall, TextureSelector, TextureUnit, UniformValue,
        },
        voxels::AimRay,
    },
    EditIntent, EngineState, HeightField, LightControl, PlayerAction, RecordingRenderer,
    ViewerConfig, ViewerError,
};
use web_time::Duration;

fn seeded_config(seed: u32) -> ViewerConfig {
    ViewerConfig {
        world: WorldConfig {
            seed: Some(seed),
            ..WorldConfig::default()
        },
        ..ViewerConfig::default()
    }
}

fn bound(config: &ViewerConfig) -> (EngineState, RecordingRenderer) {
    let mut renderer = RecordingRenderer::new();
    let mut engine = EngineState::new(config).unwrap();
    engine.bind(&mut renderer).unwrap();
    (engine, renderer)
}

#[test]
fn generated_world_renders_every_cube_in_two_batches() {
    let (mut engine, mut renderer) = bound(&seeded_config(42));
    let cubes = engine.height_field().cube_count();
    let stats = engine.tick(&mut renderer, Duration::from_millis(16)).unwrap();

    assert_eq!(stats.terrain_vertices, cubes * 36);
    let terrain: Vec<_> = renderer
        .draws()
        .filter(|draw| matches!(draw.texture, TextureSelector::Texture(_)))
        .collect();
    assert_eq!(terrain.len(), 2);
    // every column contributes exactly one surface cube
    assert_eq!(terrain[1].texture, TextureSelector::Texture(TextureUnit::Grass));
    assert_eq!(terrain[1].vertex_count as usize, 32 * 32 * 36);
    assert_eq!(terrain[0].vertex_count as usize + terrain[1].vertex_count as usize, cubes * 36);
}

#[test]
fn same_seed_gives_same_world() {
    let a = EngineState::new(&seeded_config(7)).unwrap();
    let b = EngineState::new(&seeded_config(7)).unwrap();
    assert_eq!(a.height_field(), b.height_field());
    assert_eq!(a.seed(), 7);
}

#[test]
fn generated_heights_stay_in_bounds() {
    for seed in [0, 1, 99, 12345] {
        let engine = EngineState::new(&seeded_config(seed)).unwrap();
        assert!(engine
            .height_field()
            .columns()
            .all(|(_, _, h)| (1..=4).contains(&h)));
    }
}

#[test]
fn missing_scene_uniform_fails_setup_without_panicking() {
    let mut renderer = RecordingRenderer::new().with_missing(&[PROJECTION_MATRIX]);
    let mut engine = EngineState::new(&seeded_config(1)).unwrap();

    let err = engine.bind(&mut renderer).unwrap_err();
    assert_eq!(err, ViewerError::MissingUniform(PROJECTION_MATRIX.to_string()));
    assert!(!engine.is_bound());
    assert_eq!(
        engine.tick(&mut renderer, Duration::ZERO),
        Err(ViewerError::NotBound)
    );
    assert_eq!(renderer.frames(), 0);
}

#[test]
fn bind_points_samplers_at_units() {
    let (_, renderer) = bound(&seeded_config(3));
    for (unit, name) in SAMPLER_UNIFORM_NAMES.iter().enumerate() {
        assert_eq!(renderer.last_value(name), Some(UniformValue::Int(unit as i32)));
    }
}

#[test]
fn uniforms_are_resolved_once_across_frames() {
    let (mut engine, mut renderer) = bound(&seeded_config(5));
    let lookups = renderer.lookups();
    for _ in 0..3 {
        engine.tick(&mut renderer, Duration::from_millis(16)).unwrap();
    }
    assert_eq!(renderer.lookups(), lookups);
    assert_eq!(renderer.frames(), 3);
}

#[test]
fn add_then_remove_restores_the_column() {
    let field = HeightField::from_heights(&[vec![1; 4], vec![1; 4], vec![1; 4], vec![1; 4]], 1, 4)
        .unwrap();
    let mut engine = EngineState::with_height_field(field.clone(), 0, &ViewerConfig::default());
    // column (2, 2) is centred at world (0, _, 0)
    let ray = AimRay::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert!(engine.apply_edit_with_ray(EditIntent::Add, &ray));
    assert_eq!(engine.height_field().height(2, 2), Some(2));
    assert!(engine.apply_edit_with_ray(EditIntent::Remove, &ray));
    assert_eq!(engine.height_field(), &field);
    assert_eq!(engine.mesh_rebuilds(), 2);
}

#[test]
fn edit_shows_up_in_the_next_frame() {
    let field = HeightField::from_heights(&[vec![1, 1], vec![1, 1]], 1, 4).unwrap();
    let mut engine = EngineState::with_height_field(field, 0, &ViewerConfig::default());
    let mut renderer = RecordingRenderer::new();
    engine.bind(&mut renderer).unwrap();

    let before = engine.tick(&mut renderer, Duration::ZERO).unwrap();
    assert_eq!(before.draw_calls, 3, "no sub-surface batch while every column is flat");

    let ray = AimRay::new(Point3::new(-1.0, 5.0, -1.0), Vector3::new(0.0, -1.0, 0.0));
    assert!(engine.apply_edit_with_ray(EditIntent::Add, &ray));
    let after = engine.tick(&mut renderer, Duration::ZERO).unwrap();
    assert_eq!(after.draw_calls, 4);
    assert_eq!(after.terrain_vertices, before.terrain_vertices + 36);
}

#[test]
fn light_controls_reach_the_shader() {
    let (mut engine, mut renderer) = bound(&seeded_config(11));
    engine.player_actions = PlayerAction {
        light_controls: vec![
            LightControl::ToggleSpotLight,
            LightControl::SpotPosition(Axis::Y, 50.0),
            LightControl::PointColor(ColorChannel::Red, 0.5),
            LightControl::ToggleLighting,
        ],
        ..PlayerAction::default()
    };
    engine.process_input();
    let stats = engine.tick(&mut renderer, Duration::ZERO).unwrap();

    assert_eq!(renderer.last_value("u_SpotLightOn"), Some(UniformValue::Bool(true)));
    assert_eq!(renderer.last_value("u_LightingOn"), Some(UniformValue::Bool(false)));
    assert_eq!(
        renderer.last_value("u_SpotLightPosition"),
        Some(UniformValue::Vec3([5.0, 20.0, 5.0]))
    );
    assert_eq!(
        renderer.last_value("u_PointLightColor"),
        Some(UniformValue::Vec3([0.5, 1.0, 1.0]))
    );
    // sky, two terrain batches, two markers
    assert_eq!(stats.draw_calls, 5);
    let marker = renderer.draws().last().unwrap();
    assert_eq!(marker.color, [1.0, 0.8, 0.4, 1.0]);
}

#[test]
fn sky_is_drawn_without_depth_test_around_the_eye() {
    let (mut engine, mut renderer) = bound(&seeded_config(13));
    engine.tick(&mut renderer, Duration::ZERO).unwrap();

    let calls = renderer.calls();
    let sky_index = calls
        .iter()
        .position(|call| matches!(call, RenderCall::Draw(_)))
        .unwrap();
    assert_eq!(calls[sky_index - 1], RenderCall::DepthTest(false));
    assert_eq!(calls[sky_index + 1], RenderCall::DepthTest(true));

    let sky = renderer.draws().next().unwrap();
    assert_eq!(sky.texture, TextureSelector::FlatColor);
    assert_eq!(sky.model.at(0, 0), 100.0);
    assert_eq!(sky.model.at(1, 3), 3.0);
}

#[test]
fn edits_from_far_outside_the_world_do_nothing() {
    let mut engine = EngineState::new(&seeded_config(17)).unwrap();
    let before = engine.height_field().clone();
    engine.camera_state.camera.eye = Point3::new(3.0e9, 3.0, 12.0);
    engine.camera_state.camera.at = Point3::new(3.0e9 - 1.0, 2.0, 0.0);

    assert!(!engine.apply_edit(EditIntent::Add));
    assert!(!engine.apply_edit(EditIntent::Remove));
    assert_eq!(engine.height_field(), &before);
    assert_eq!(engine.mesh_rebuilds(), 0);
}

#[test]
fn degenerate_camera_skips_the_frame_and_keeps_its_placement() {
    let (mut engine, mut renderer) = bound(&seeded_config(19));
    let target = engine.camera_state.camera.at;
    engine.camera_state.camera.eye = target;
    engine.player_actions = PlayerAction {
        move_forward: true,
        move_left: true,
        rotate_view: Some((4.0, 4.0)),
        ..PlayerAction::default()
    };
    engine.process_input();

    assert_eq!(engine.camera_state.camera.eye, target);
    assert_eq!(engine.camera_state.camera.at, target);
    assert!(matches!(
        engine.tick(&mut renderer, Duration::ZERO),
        Err(ViewerError::DegenerateTransform(_))
    ));
    assert_eq!(renderer.frames(), 0);
}

#[test]
fn huge_noise_amplitude_clamps_instead_of_failing() {
    let config = ViewerConfig {
        world: WorldConfig {
            noise_amplitude: 1e12,
            baseline: i32::MAX,
            seed: Some(3),
            ..WorldConfig::default()
        },
        ..ViewerConfig::default()
    };
    let engine = EngineState::new(&config).unwrap();
    assert!(engine.height_field().columns().all(|(_, _, h)| (1..=4).contains(&h)));
}
