//! Orbit controls.
//!
//! Rotates, pans and dollies a [`Camera`] around its target. Input only accumulates
//! deltas; [`OrbitControls::update`] applies them once per frame. With damping enabled
//! each update applies a `damping_factor` share of the pending motion and lets the rest
//! decay, so the camera keeps gliding for a few frames after the input stops.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::{
    camera::{Camera, Projection},
    config::ControlsConfig,
    viewport::ViewportSize,
};

const EPS: f32 = 0.000001;

/// Spherical coordinates of the camera offset from the target, +Y up.
///
/// `theta` is the azimuth around Y measured from +Z, `phi` the polar angle from +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` off the poles where the view direction would become parallel to up.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

#[derive(Debug)]
pub struct OrbitControls {
    config: ControlsConfig,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    drag: Option<Drag>,
    cursor: Option<PhysicalPosition<f64>>,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
            drag: None,
            cursor: None,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    /// Queue a rotation around the vertical axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Queue a change of the polar angle.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Move closer to the target by `dolly_scale` (< 1 zooms in further).
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Queue a pan by a pointer movement of `(dx, dy)` pixels on a surface `height` pixels tall.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera, projection: &Projection, height: u32) {
        let offset = camera.position - camera.target;
        // half of the visible height at the target's depth
        let target_distance = offset.magnitude() * (projection.fovy().0 / 2.0).tan();
        let height = height.max(1) as f32;
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();

        let left = right * (-2.0 * dx * target_distance / height * self.config.pan_speed);
        let up_axis = if self.config.screen_space_panning {
            right.cross(forward).normalize()
        } else {
            camera.up.cross(right)
        };
        let up = up_axis * (2.0 * dy * target_distance / height * self.config.pan_speed);
        self.pan_offset += left + up;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.config.zoom_speed)
    }

    /// Feed a window event. Returns `true` when the event was consumed.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        size: ViewportSize,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => Some(Drag::Rotate),
                    (MouseButton::Right, ElementState::Pressed) => Some(Drag::Pan),
                    (_, ElementState::Released) => None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                let (Some(drag), Some(previous)) = (self.drag, previous) else {
                    return false;
                };
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                match drag {
                    Drag::Rotate => {
                        let height = size.height.max(1) as f32;
                        self.rotate_left(2.0 * PI * dx / height * self.config.rotate_speed);
                        self.rotate_up(2.0 * PI * dy / height * self.config.rotate_speed);
                    }
                    Drag::Pan => self.pan(dx, dy, camera, projection, size.height),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                if dy > 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if dy < 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = None;
                false
            }
            _ => false,
        }
    }

    /// Apply one step of the pending motion to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.position;
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_vector(offset);

        let damping = self.config.damping_factor;
        if self.config.enable_damping {
            spherical.theta += self.theta_delta * damping;
            spherical.phi += self.phi_delta * damping;
        } else {
            spherical.theta += self.theta_delta;
            spherical.phi += self.phi_delta;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.config.min_polar_angle.0, self.config.max_polar_angle.0);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        if self.config.enable_damping {
            camera.target += self.pan_offset * damping;
        } else {
            camera.target += self.pan_offset;
        }
        camera.position = camera.target + spherical.to_vector();

        if self.config.enable_damping {
            self.theta_delta *= 1.0 - damping;
            self.phi_delta *= 1.0 - damping;
            self.pan_offset *= 1.0 - damping;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - before).magnitude2() > EPS
    }
}
