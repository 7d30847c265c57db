use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{InnerSpace, MetricSpace, Point3, Vector3};
use orbit_viewer::{
    camera::{Camera, Projection},
    config::ControlsConfig,
    controls::{OrbitControls, Spherical},
};

fn camera() -> Camera {
    Camera::new((0.0, 2.0, 5.0), (0.0, 0.0, 0.0))
}

fn projection() -> Projection {
    Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 1000.0)
}

fn polar_angle(camera: &Camera) -> f32 {
    Spherical::from_vector(camera.position - camera.target).phi
}

fn azimuth(camera: &Camera) -> f32 {
    Spherical::from_vector(camera.position - camera.target).theta
}

#[test]
fn should_round_trip_spherical_coordinates() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let back = Spherical::from_vector(v).to_vector();
    assert!((back - v).magnitude() < 1e-5);
}

#[test]
fn should_not_move_without_input() {
    let mut controls = OrbitControls::new(ControlsConfig::default());
    let mut camera = camera();
    let before = camera.position;

    assert!(!controls.update(&mut camera));
    assert!(camera.position.distance(before) < 1e-5);
}

#[test]
fn should_apply_rotation_with_damping() {
    let mut controls = OrbitControls::new(ControlsConfig::default());
    let mut camera = camera();
    let start = azimuth(&camera);

    controls.rotate_left(0.4);
    controls.update(&mut camera);
    // a quarter of the pending rotation per update
    let first = start - azimuth(&camera);
    assert!((first - 0.1).abs() < 1e-4, "first step {first}");

    controls.update(&mut camera);
    let second = start - azimuth(&camera) - first;
    assert!((second - 0.075).abs() < 1e-4, "second step {second}");

    for _ in 0..200 {
        controls.update(&mut camera);
    }
    let total = start - azimuth(&camera);
    assert!((total - 0.4).abs() < 1e-3, "total {total}");
}

#[test]
fn should_apply_rotation_at_once_without_damping() {
    let config = ControlsConfig {
        enable_damping: false,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = camera();
    let start = azimuth(&camera);

    controls.rotate_left(0.4);
    assert!(controls.update(&mut camera));
    assert!((start - azimuth(&camera) - 0.4).abs() < 1e-4);
    assert!(!controls.update(&mut camera));
}

#[test]
fn should_clamp_to_the_upper_hemisphere() {
    let mut controls = OrbitControls::new(ControlsConfig::default());
    let mut camera = camera();
    let radius = camera.position.distance(camera.target);

    // try to swing far below the ground plane
    controls.rotate_up(-PI);
    for _ in 0..100 {
        controls.update(&mut camera);
        assert!(polar_angle(&camera) <= FRAC_PI_2 + 1e-4);
    }
    assert!((polar_angle(&camera) - FRAC_PI_2).abs() < 1e-3);
    assert!(camera.position.y >= -1e-4);
    assert!((camera.position.distance(camera.target) - radius).abs() < 1e-3);

    // and over the pole: stops just short of straight up
    controls.rotate_up(2.0 * PI);
    for _ in 0..100 {
        controls.update(&mut camera);
    }
    assert!(polar_angle(&camera) < 1e-3);
    assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
    assert!((camera.position.distance(camera.target) - radius).abs() < 1e-3);
}

#[test]
fn should_dolly_towards_the_target() {
    let config = ControlsConfig {
        enable_damping: false,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = camera();
    let radius = camera.position.distance(camera.target);

    controls.dolly_in(0.95);
    controls.update(&mut camera);
    assert!((camera.position.distance(camera.target) - radius * 0.95).abs() < 1e-4);

    controls.dolly_out(0.95);
    controls.update(&mut camera);
    assert!((camera.position.distance(camera.target) - radius).abs() < 1e-4);
}

#[test]
fn should_clamp_distance() {
    let config = ControlsConfig {
        enable_damping: false,
        min_distance: 2.0,
        max_distance: 10.0,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = camera();

    controls.dolly_in(0.01);
    controls.update(&mut camera);
    assert!((camera.position.distance(camera.target) - 2.0).abs() < 1e-4);

    controls.dolly_out(0.01);
    controls.update(&mut camera);
    assert!((camera.position.distance(camera.target) - 10.0).abs() < 1e-4);
}

#[test]
fn should_pan_along_the_ground_plane() {
    let config = ControlsConfig {
        enable_damping: false,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = camera();
    let offset = camera.position - camera.target;

    controls.pan(40.0, 25.0, &camera, &projection(), 600);
    assert!(controls.update(&mut camera));

    // the target moved but stayed on the ground, and the camera moved with it
    assert!(camera.target.y.abs() < 1e-5);
    assert!(camera.target.distance(Point3::new(0.0, 0.0, 0.0)) > 0.01);
    assert!((camera.position - camera.target - offset).magnitude() < 1e-4);
}

#[test]
fn should_pan_in_screen_space_when_enabled() {
    let config = ControlsConfig {
        enable_damping: false,
        screen_space_panning: true,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = camera();

    controls.pan(0.0, 50.0, &camera, &projection(), 600);
    controls.update(&mut camera);
    assert!(camera.target.y > 0.01);
}
