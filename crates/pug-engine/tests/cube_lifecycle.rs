mod common;

use common::*;
use pug_engine::cube::{
    projection_matrix, view_matrix, world_matrix, ConstantBlock, ConstantBufferSlot,
    CubeRenderer, CLEAR_COLOR,
};
use pug_engine::device::SurfaceErrorAction;
use pug_engine::shader::ShaderPaths;

const VERTEX_BUFFER: &str = "pug cube vertex buffer";
const INDEX_BUFFER: &str = "pug cube index buffer";

fn application() -> &'static str {
    ConstantBufferSlot::Application.label()
}

fn frame() -> &'static str {
    ConstantBufferSlot::Frame.label()
}

fn object() -> &'static str {
    ConstantBufferSlot::Object.label()
}

/// Content release order followed by the device.
fn full_release_order() -> Vec<&'static str> {
    vec![
        PIPELINE,
        application(),
        frame(),
        object(),
        INDEX_BUFFER,
        VERTEX_BUFFER,
        INPUT_LAYOUT,
        VERTEX_SHADER,
        PIXEL_SHADER,
        DEVICE,
    ]
}

fn loaded(log: &Log) -> CubeRenderer<RecordingGpu> {
    let mut renderer = CubeRenderer::new(RecordingGpu::new(log));
    renderer.load(&shipped_shaders()).unwrap();
    renderer
}

fn block_bytes(m: glam::Mat4) -> Vec<u8> {
    bytemuck::bytes_of(&ConstantBlock::from(m)).to_vec()
}

#[test]
fn load_creates_objects_in_dependency_order() {
    let log = new_log();
    let renderer = loaded(&log);
    assert!(renderer.is_loaded());

    let events = take(&log);
    assert_eq!(
        created(&events),
        vec![
            VERTEX_BUFFER,
            INDEX_BUFFER,
            application(),
            frame(),
            object(),
            VERTEX_SHADER,
            INPUT_LAYOUT,
            PIXEL_SHADER,
            PIPELINE,
        ]
    );
    assert!(released(&events).is_empty());

    // The projection upload is the last load step.
    assert_eq!(
        events.last(),
        Some(&Event::Update {
            label: application(),
            data: block_bytes(projection_matrix(1280.0, 720.0)),
        })
    );
    assert_eq!(renderer.projection(), projection_matrix(1280.0, 720.0));
}

#[test]
fn projection_follows_client_size() {
    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log).with_size(800, 600));
    renderer.load(&shipped_shaders()).unwrap();

    let p = renderer.projection();
    assert_eq!(p, projection_matrix(800.0, 600.0));
    assert!((p.x_axis.x * 800.0 / 600.0 - p.y_axis.y).abs() < 1e-5);
}

#[test]
fn zero_height_client_area_still_yields_a_finite_projection() {
    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log).with_size(1280, 0));
    renderer.load(&shipped_shaders()).unwrap();
    assert!(renderer.projection().is_finite());
}

#[test]
fn missing_vertex_shader_stops_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let shaders = ShaderPaths {
        vertex: dir.path().join("missing_vertex.wgsl"),
        pixel: shipped_shaders().pixel,
    };

    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log));
    let err = renderer.load(&shaders).unwrap_err();

    assert!(format!("{err:#}").contains("missing_vertex.wgsl"), "{err:#}");
    assert!(!renderer.is_loaded());

    let events = take(&log);
    let created = created(&events);
    assert!(!created.contains(&VERTEX_SHADER));
    assert!(!created.contains(&PIXEL_SHADER));
    assert!(!events.iter().any(|e| matches!(e, Event::Update { .. })));

    // Partially created objects are released before the error surfaces.
    let mut released = released(&events);
    released.sort_unstable();
    let mut expected = created.clone();
    expected.sort_unstable();
    assert_eq!(released, expected);
}

#[test]
fn input_layout_mismatch_fails_before_the_pixel_shader() {
    let dir = tempfile::tempdir().unwrap();
    let shaders = write_shaders(dir.path(), MISMATCHED_VERTEX_WGSL, PIXEL_WGSL);

    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log));
    let err = renderer.load(&shaders).unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("input layout"), "{message}");
    assert!(message.contains("COLOR"), "{message}");

    let events = take(&log);
    assert!(created(&events).contains(&VERTEX_SHADER));
    assert!(!created(&events).contains(&INPUT_LAYOUT));
    assert!(!created(&events).contains(&PIXEL_SHADER));
    assert!(!renderer.is_loaded());
}

#[test]
fn invalid_pixel_shader_source_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let vertex = std::fs::read_to_string(shipped_shaders().vertex).unwrap();
    let shaders = write_shaders(dir.path(), &vertex, "this is not wgsl");

    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log));
    assert!(renderer.load(&shaders).is_err());

    let events = take(&log);
    assert!(created(&events).contains(&INPUT_LAYOUT));
    assert!(!created(&events).contains(&PIXEL_SHADER));
    assert!(!created(&events).contains(&PIPELINE));
}

#[test]
fn failed_step_releases_everything_already_created() {
    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log).failing_on(PIPELINE));
    assert!(renderer.load(&shipped_shaders()).is_err());

    let events = take(&log);
    assert!(events.contains(&Event::CreateFailed(PIPELINE)));
    assert_eq!(created(&events).len(), released(&events).len());
    assert!(!renderer.is_loaded());
}

#[test]
fn load_twice_is_rejected() {
    let log = new_log();
    let mut renderer = loaded(&log);
    take(&log);

    assert!(renderer.load(&shipped_shaders()).is_err());
    assert!(take(&log).is_empty());
    assert!(renderer.is_loaded());
}

#[test]
fn three_ticks_at_one_ninetieth_rotate_three_degrees() {
    let log = new_log();
    let mut renderer = loaded(&log);

    for _ in 0..3 {
        renderer.update(1.0 / 90.0);
    }
    assert!((renderer.angle_degrees() - 3.0).abs() < 1e-4);
}

#[test]
fn angle_accumulates_without_wrapping() {
    let log = new_log();
    let mut renderer = loaded(&log);

    // 121 ticks of 3 degrees each.
    for _ in 0..121 {
        renderer.update(1.0 / 30.0);
    }
    assert!(renderer.angle_degrees() > 360.0);
    assert!((renderer.angle_degrees() - 363.0).abs() < 1e-2);
}

#[test]
fn zero_dt_leaves_the_world_matrix_unchanged() {
    let log = new_log();
    let mut renderer = loaded(&log);

    renderer.update(0.25);
    let world = renderer.world();
    renderer.update(0.0);
    assert_eq!(renderer.world(), world);
}

#[test]
fn update_uploads_view_then_world() {
    let log = new_log();
    let mut renderer = loaded(&log);
    take(&log);

    renderer.update(0.5);

    assert_eq!(
        take(&log),
        vec![
            Event::Update {
                label: frame(),
                data: block_bytes(view_matrix()),
            },
            Event::Update {
                label: object(),
                data: block_bytes(world_matrix(45.0)),
            },
        ]
    );
    assert_eq!(renderer.view(), view_matrix());
    assert_eq!(renderer.world(), world_matrix(45.0));
}

#[test]
fn render_clears_draws_all_indices_and_presents() {
    let log = new_log();
    let mut renderer = loaded(&log);
    take(&log);

    renderer.render().unwrap();

    assert_eq!(
        take(&log),
        vec![
            Event::Draw {
                indices: 0..36,
                clear: [CLEAR_COLOR.r, CLEAR_COLOR.g, CLEAR_COLOR.b, CLEAR_COLOR.a],
            },
            Event::Present,
        ]
    );
}

#[test]
fn skipped_frame_is_not_presented() {
    let log = new_log();
    let gpu = RecordingGpu::new(&log).with_draw_result(Err(SurfaceErrorAction::SkipFrame));
    let mut renderer = CubeRenderer::new(gpu);
    renderer.load(&shipped_shaders()).unwrap();
    take(&log);

    assert_eq!(renderer.render(), Err(SurfaceErrorAction::SkipFrame));
    assert!(!take(&log).contains(&Event::Present));
}

#[test]
#[should_panic(expected = "render called before content was loaded")]
fn render_without_content_panics() {
    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log));
    let _ = renderer.render();
}

#[test]
#[should_panic(expected = "render called without a device")]
fn render_after_cleanup_panics() {
    let log = new_log();
    let mut renderer = loaded(&log);
    renderer.cleanup();
    let _ = renderer.render();
}

#[test]
fn full_cycle_with_zero_ticks_releases_everything_once() {
    let log = new_log();
    let mut renderer = loaded(&log);
    renderer.render().unwrap();
    renderer.unload_content();
    renderer.cleanup();

    let events = take(&log);
    assert_eq!(released(&events), full_release_order());

    let mut created = created(&events);
    created.push(DEVICE);
    created.sort_unstable();
    let mut released = released(&events);
    released.sort_unstable();
    assert_eq!(created, released);
}

#[test]
fn teardown_is_idempotent() {
    let log = new_log();
    let mut renderer = loaded(&log);
    take(&log);

    renderer.unload_content();
    renderer.unload_content();
    renderer.cleanup();
    renderer.cleanup();
    drop(renderer);

    assert_eq!(released(&take(&log)), full_release_order());
}

#[test]
fn cleanup_without_unload_releases_content_first() {
    let log = new_log();
    let mut renderer = loaded(&log);
    take(&log);

    renderer.cleanup();
    assert_eq!(released(&take(&log)), full_release_order());
    assert!(renderer.gpu().is_none());
}

#[test]
fn drop_performs_outstanding_teardown() {
    let log = new_log();
    let renderer = loaded(&log);
    take(&log);

    drop(renderer);
    assert_eq!(released(&take(&log)), full_release_order());
}

#[test]
fn load_after_cleanup_fails() {
    let log = new_log();
    let mut renderer = CubeRenderer::new(RecordingGpu::new(&log));
    renderer.cleanup();
    take(&log);

    assert!(renderer.load(&shipped_shaders()).is_err());
    assert!(take(&log).is_empty());
}
