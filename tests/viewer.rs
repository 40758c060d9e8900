use std::{fs, path::PathBuf, thread, time::Duration};

use cgmath::{InnerSpace, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use roomwalk::{
    config::ViewerConfig,
    gfx::{
        loader::LoadEvent,
        scene::{painter, Mesh, Model},
    },
    LoadStatus, Viewer,
};
use winit::keyboard::KeyCode;

const SPEED: f32 = 5.0;
const ROTATE_SPEED: f32 = 2.0;

fn approx_vec(a: Vector3<f32>, b: Vector3<f32>, eps: f32) -> bool {
    (a - b).magnitude() < eps
}

fn strip_model(name: &str, vertex_count: usize, spacing: f32) -> Model {
    let positions: Vec<f32> = (0..vertex_count)
        .flat_map(|i| [i as f32 * spacing, (i % 3) as f32, (i % 2) as f32 * spacing])
        .collect();
    let indices: Vec<u32> = (0..vertex_count.saturating_sub(2) as u32)
        .flat_map(|i| [i, i + 1, i + 2])
        .collect();
    Model::new(name, vec![Mesh::new(name, &positions, &[], indices)])
}

#[test]
fn yaw_is_the_sum_of_applied_rotations() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut viewer = Viewer::new(&ViewerConfig::default());
    let mut expected = 0.0f32;

    for _ in 0..500 {
        let left = rng.random_bool(0.5);
        let right = rng.random_bool(0.3);
        let dt = rng.random_range(0.001..0.05);

        if left {
            viewer.key_down(KeyCode::ArrowLeft);
            expected += ROTATE_SPEED * dt;
        } else {
            viewer.key_up(KeyCode::ArrowLeft);
        }
        if right {
            viewer.key_down(KeyCode::ArrowRight);
            expected -= ROTATE_SPEED * dt;
        } else {
            viewer.key_up(KeyCode::ArrowRight);
        }
        viewer.tick(dt);
    }

    assert!((viewer.rig.yaw() - expected).abs() < 1e-4);
    assert_eq!(viewer.report().rotation, format!("rotY:{:.2}", expected));
}

#[test]
fn idle_frames_do_not_move_the_camera() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut viewer = Viewer::new(&ViewerConfig::default());
    let start = viewer.scene.camera.position;

    for _ in 0..200 {
        viewer.tick(rng.random_range(0.0..0.1));
    }

    assert!(approx_vec(viewer.scene.camera.position, start, 1e-5));
    assert_eq!(viewer.report().position, "x:0.00 y:2.00 z:6.00");
}

#[test]
fn walking_forward_stays_on_the_horizontal_plane() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let mut viewer = Viewer::new(&ViewerConfig::default());

        viewer.key_down(KeyCode::ArrowLeft);
        viewer.tick(rng.random_range(0.0..3.0));
        viewer.key_up(KeyCode::ArrowLeft);
        let yaw = viewer.rig.yaw();

        let before = viewer.scene.camera.position;
        let dt = rng.random_range(0.01..0.1);
        viewer.key_down(KeyCode::KeyW);
        viewer.tick(dt);

        let moved = viewer.scene.camera.position - before;
        let expected = Vector3::new(-yaw.sin(), 0.0, -yaw.cos()) * (SPEED * dt);
        assert!(approx_vec(moved, expected, 1e-4), "yaw {yaw}: moved {moved:?}");
        assert_eq!(viewer.scene.camera.position.y, before.y);
    }
}

#[test]
fn orbit_target_follows_the_camera() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    viewer.key_down(KeyCode::KeyD);
    viewer.key_down(KeyCode::ArrowUp);
    viewer.tick(0.2);

    let camera = &viewer.scene.camera;
    let expected = camera.position + camera.forward() * 5.0;
    assert!(approx_vec(viewer.scene.controls.target, expected, 1e-5));
    // Strafing right from the start pose heads toward +X
    assert!(camera.position.x > 0.9);
    assert!((camera.position.y - 3.0).abs() < 1e-5);
}

#[test]
fn reset_returns_home_after_any_walk() {
    let mut rng = StdRng::seed_from_u64(99);
    let keys = [
        KeyCode::KeyW,
        KeyCode::KeyA,
        KeyCode::KeyS,
        KeyCode::KeyD,
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
    ];
    let mut viewer = Viewer::new(&ViewerConfig::default());

    for _ in 0..300 {
        let key = keys[rng.random_range(0..keys.len())];
        if rng.random_bool(0.5) {
            viewer.key_down(key);
        } else {
            viewer.key_up(key);
        }
        viewer.tick(rng.random_range(0.0..0.05));
    }

    viewer.reset();
    assert_eq!(viewer.scene.camera.position, Vector3::new(0.0, 2.0, 6.0));
    assert_eq!(viewer.rig.yaw(), 0.0);
    assert_eq!(viewer.scene.controls.target, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn resize_updates_aspect_and_output_size() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    assert!(viewer.resize(800, 600));
    assert_eq!(viewer.scene.camera.aspect, 800.0 / 600.0);
    assert_eq!(viewer.scene.viewport, (800, 600));

    assert!(!viewer.resize(800, 0));
    assert_eq!(viewer.scene.viewport, (800, 600));
}

#[test]
fn dragging_spins_the_room_not_the_camera() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    let camera_before = viewer.scene.camera.position;

    viewer.pointer.pointer_down(300.0);
    viewer.pointer.pointer_move(420.0, &mut viewer.scene.room);
    viewer.pointer.pointer_up();
    viewer.pointer.pointer_move(0.0, &mut viewer.scene.room);

    assert!((viewer.scene.room.rotation_y() - 1.2).abs() < 1e-5);
    viewer.tick(0.016);
    assert_eq!(viewer.scene.camera.position, camera_before);
}

#[test]
fn loaded_meshes_are_painted_by_buffer_index() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    viewer.handle_load_event(LoadEvent::Loaded(strip_model("strip", 37, 1.0)));

    let mesh = &viewer.scene.room.models[0].meshes[0];
    let n = mesh.vertex_count();
    for (i, vertex) in mesh.vertices().iter().enumerate() {
        let t = i as f32 / n as f32;
        let lerp = |a: [f32; 3], b: [f32; 3], s: f32| {
            [a[0] + (b[0] - a[0]) * s, a[1] + (b[1] - a[1]) * s, a[2] + (b[2] - a[2]) * s]
        };
        let c = lerp(painter::RED, painter::GREEN, t);
        let c = lerp(c, painter::BLUE, 0.5 * t);
        let c = lerp(c, painter::YELLOW, 0.25 * t);
        assert_eq!(vertex.color, c);
    }
    assert!(mesh.cast_shadow && mesh.receive_shadow);
}

#[test]
fn oversized_models_are_scaled_down() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    // Diagonal well above 100 units
    viewer.handle_load_event(LoadEvent::Loaded(strip_model("large", 20, 10.0)));
    // Diagonal well below
    viewer.handle_load_event(LoadEvent::Loaded(strip_model("small", 5, 1.0)));

    let models = &viewer.scene.room.models;
    assert_eq!(models[0].scale, 0.1);
    assert_eq!(models[1].scale, 1.0);
    for model in models {
        let center = model.bounding_box().center() + model.offset;
        assert!(center.magnitude() < 1e-4);
    }
}

#[test]
fn background_load_reaches_the_scene() {
    let path: PathBuf = std::env::temp_dir().join(format!("roomwalk-it-{}.obj", std::process::id()));
    fs::write(
        &path,
        "o wall\nv 0 0 0\nv 4 0 0\nv 4 3 0\nv 0 3 0\nf 1 2 3 4\n",
    )
    .expect("write obj");

    let config = ViewerConfig {
        asset_path: path.clone(),
        ..Default::default()
    };
    let mut viewer = Viewer::new(&config);
    viewer.start_loading();
    assert!(matches!(viewer.status(), LoadStatus::Loading(_)));

    for _ in 0..500 {
        viewer.tick(0.0);
        if !matches!(viewer.status(), LoadStatus::Loading(_)) {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    let _ = fs::remove_file(&path);

    assert!(matches!(viewer.status(), LoadStatus::Loaded(_)), "{:?}", viewer.status());
    let stats = viewer.scene.get_statistics();
    assert_eq!(stats.model_count, 1);
    assert_eq!(stats.total_triangles, 2);

    // One vertex per triangle corner, painted in corner order
    let mesh = &viewer.scene.room.models[0].meshes[0];
    assert_eq!(mesh.vertex_count(), 6);
    for (i, vertex) in mesh.vertices().iter().enumerate() {
        assert_eq!(vertex.color, painter::gradient_color(i, 6));
    }
}

#[test]
fn missing_asset_is_not_fatal() {
    let config = ViewerConfig {
        asset_path: std::env::temp_dir().join("roomwalk-it-missing.obj"),
        ..Default::default()
    };
    let mut viewer = Viewer::new(&config);
    viewer.start_loading();

    for _ in 0..500 {
        viewer.tick(0.016);
        if matches!(viewer.status(), LoadStatus::Failed(_)) {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    assert!(matches!(viewer.status(), LoadStatus::Failed(_)));
    assert!(viewer.scene.room.models.is_empty());
}
