use glam::{Mat4, Vec3};

use crate::renderer::gltf::ResolveOptions;

/// The constants of the sample scene. `Default` is the scene as shipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Vertical field of view of the projection, in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Multiplied by the aspect ratio and applied as a uniform scale every
    /// frame.
    pub scale_factor: f32,
    /// The model matrix the per-frame scale is composed with.
    pub base_model: Mat4,
    pub clear_color: [f32; 4],
    /// The name of the glTF document, as given to the asset source.
    pub scene_asset: String,
    pub resolve: ResolveOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            fov_y_degrees: 70.0,
            z_near: 1.0,
            z_far: 1000.0,
            eye: Vec3::new(0.0, 0.0, -1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            scale_factor: 0.5,
            base_model: Mat4::IDENTITY,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            scene_asset: "helloworld.gltf".to_string(),
            resolve: ResolveOptions::default(),
        }
    }
}
