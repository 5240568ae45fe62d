use glam::{Mat4, Vec3};

use crate::config::RendererConfig;
use crate::error::RenderError;

pub mod device;
pub mod draw_calls;
pub mod gl;
pub mod gltf;
#[cfg(test)]
pub(crate) mod recording;
pub mod upload;

use device::{check_error, Gpu};
use gltf::{SceneDocument, ShaderProgram};
use upload::RenderObject;

/// Renders the scene document on the surface it was given, until the surface
/// goes away.
pub struct FrameRenderer<G: Gpu> {
    config: RendererConfig,
    state: RendererState<G>,
}

pub enum RendererState<G: Gpu> {
    Uninitialized,
    Ready(Box<ReadyState<G>>),
    Terminated,
}

impl<G: Gpu> FrameRenderer<G> {
    pub fn new(config: RendererConfig) -> FrameRenderer<G> {
        FrameRenderer {
            config,
            state: RendererState::Uninitialized,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn state(&self) -> &RendererState<G> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, RendererState::Ready(_))
    }

    /// Sets up the GPU resources for `document` on the device of a freshly
    /// created surface. Any resources of a previous surface are released
    /// first.
    pub fn surface_available(
        &mut self,
        gpu: G,
        document: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.state = RendererState::Uninitialized;
        log::info!("surface available, {width}x{height}");
        let ready = ReadyState::new(gpu, self.config.clone(), document, width, height)?;
        self.state = RendererState::Ready(Box::new(ready));
        Ok(())
    }

    pub fn surface_resized(&mut self, width: u32, height: u32) {
        if let RendererState::Ready(ready) = &mut self.state {
            ready.resize(width, height);
        }
    }

    /// Draws one frame. Returns false without touching the GPU if there is no
    /// surface to draw on.
    pub fn frame_tick(&mut self) -> Result<bool, RenderError> {
        match &mut self.state {
            RendererState::Ready(ready) => {
                ready.render_frame()?;
                Ok(true)
            }
            RendererState::Uninitialized | RendererState::Terminated => Ok(false),
        }
    }

    /// Releases the shader program and every render object.
    pub fn surface_destroyed(&mut self) {
        if self.is_ready() {
            log::info!("surface destroyed, releasing GPU resources");
        }
        self.state = RendererState::Terminated;
    }
}

/// Owns every GPU resource of the scene. Dropping it releases them.
pub struct ReadyState<G: Gpu> {
    gpu: G,
    config: RendererConfig,
    program: ShaderProgram,
    render_objects: Vec<RenderObject>,
    aspect_ratio: f32,
    projection: Mat4,
    view: Mat4,
    model: Mat4,
}

impl<G: Gpu> ReadyState<G> {
    pub fn new(
        mut gpu: G,
        config: RendererConfig,
        document: &[u8],
        width: u32,
        height: u32,
    ) -> Result<ReadyState<G>, RenderError> {
        let program = gltf::create_program(&mut gpu)?;
        let mut ready = ReadyState {
            gpu,
            config,
            program,
            render_objects: Vec::new(),
            aspect_ratio: 1.0,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        };
        ready.resize(width, height);
        ready.gpu.set_clear_color(ready.config.clear_color);
        check_error(&mut ready.gpu, "viewport setup")?;

        let document = gltf::parse_document(document).unwrap_or_else(|err| {
            log::error!("{err}, nothing will be drawn");
            SceneDocument::default()
        });
        let primitives = gltf::resolve_document(&document, ready.config.resolve);
        upload::upload(&mut ready.gpu, primitives, &mut ready.render_objects)?;
        log::info!(
            "scene ready with {} render objects",
            ready.render_objects.len()
        );
        Ok(ready)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.viewport(width as i32, height as i32);
        self.aspect_ratio = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        self.projection = Mat4::perspective_rh_gl(
            self.config.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.config.z_near,
            self.config.z_far,
        );
    }

    pub fn render_objects(&self) -> &[RenderObject] {
        &self.render_objects
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    pub fn update_camera(&mut self) {
        self.view = Mat4::look_at_rh(self.config.eye, self.config.target, self.config.up);
    }

    pub fn update_model_matrix(&mut self, base_model: Mat4, scale_factor: f32) {
        self.model = base_model * Mat4::from_scale(Vec3::splat(scale_factor));
    }

    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        self.gpu.clear();
        self.update_camera();
        self.update_model_matrix(
            self.config.base_model,
            self.config.scale_factor * self.aspect_ratio,
        );
        self.draw()
    }

    pub fn draw(&mut self) -> Result<(), RenderError> {
        check_error(&mut self.gpu, "before draw")?;
        let program = self.program;
        let model_view_projection = self.model_view_projection();
        self.gpu.use_program(program.program);
        self.gpu
            .uniform_matrix4(program.model_view_projection_location, &model_view_projection);
        for render_object in &self.render_objects {
            render_object
                .draw_call()
                .issue(&mut self.gpu, program.position_location);
        }
        check_error(&mut self.gpu, "draw")
    }
}

impl<G: Gpu> Drop for ReadyState<G> {
    fn drop(&mut self) {
        upload::release(&mut self.gpu, std::mem::take(&mut self.render_objects));
        self.gpu.delete_program(self.program.program);
    }
}
