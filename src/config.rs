//! Viewer configuration.
//!
//! [`ViewerConfig`] collects every tunable the viewer uses: which asset to load, how the
//! scene is lit, where the camera starts, how the orbit controls behave and which host
//! elements carry the progress overlay. The defaults reproduce the stock viewer; hosts
//! override individual fields before calling [`crate::flow::run`].

use cgmath::{Deg, Point3, Rad};

/// Perspective camera parameters.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 1000.0,
            position: Point3::new(0.0, 2.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

/// Orbit controls parameters.
#[derive(Clone, Debug)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub screen_space_panning: bool,
    pub min_polar_angle: Rad<f32>,
    pub max_polar_angle: Rad<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.25,
            screen_space_panning: false,
            min_polar_angle: Rad(0.0),
            max_polar_angle: Rad(std::f32::consts::FRAC_PI_2),
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

/// Colour and intensity of the flat fill light plus the off-axis directional light.
#[derive(Clone, Debug)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 2.0,
            directional_position: [1.0, 2.0, 3.0],
        }
    }
}

/// Ids of the host document elements used on the web.
#[derive(Clone, Debug)]
pub struct DomConfig {
    pub canvas_id: String,
    pub loading_text_id: String,
    pub loading_overlay_id: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".to_string(),
            loading_text_id: "loading-text".to_string(),
            loading_overlay_id: "loading-overlay".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Relative path of the glTF/GLB asset, resolved by the platform's asset source.
    pub asset_path: String,
    pub title: String,
    /// Clear colour as `0xRRGGBB`.
    pub background: u32,
    /// Rotation applied to the model about the vertical axis on every frame.
    pub rotation_step: Rad<f32>,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    pub dom: DomConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: "public/scene.gltf".to_string(),
            title: "orbit-viewer".to_string(),
            background: 0xcccccc,
            rotation_step: Rad(0.005),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            dom: DomConfig::default(),
        }
    }
}
