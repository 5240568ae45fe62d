//! The GPU operations the renderer needs, as traits, so the rendering logic
//! doesn't depend on a live GL context.

use glam::Mat4;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Buffer binding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget {
    /// GL_ARRAY_BUFFER
    Vertex,
    /// GL_ELEMENT_ARRAY_BUFFER
    Index,
}

pub trait ShaderCompiler {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, RenderError>;
    fn attribute_location(&mut self, program: ProgramHandle, name: &str)
        -> Option<AttribLocation>;
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    fn delete_program(&mut self, program: ProgramHandle);
}

/// A GPU bound to the current context. All calls are assumed to be made from
/// the thread that owns the context.
pub trait Gpu: ShaderCompiler {
    fn gen_buffers(&mut self, count: usize) -> Vec<BufferHandle>;
    fn delete_buffers(&mut self, buffers: &[BufferHandle]);
    /// Binds `buffer` to `target`, or unbinds the target with `None`.
    fn bind_buffer(&mut self, target: BindTarget, buffer: Option<BufferHandle>);
    /// Uploads `data` to the buffer bound to `target`, with a static
    /// (upload once, draw many times) usage hint.
    fn buffer_data_static(&mut self, target: BindTarget, data: &[u8]);
    /// Returns and clears the pending error code, if any.
    fn take_error(&mut self) -> Option<u32>;

    fn viewport(&mut self, width: i32, height: i32);
    fn set_clear_color(&mut self, color: [f32; 4]);
    fn clear(&mut self);

    fn use_program(&mut self, program: ProgramHandle);
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4);
    /// Points `location` at tightly packed f32 vectors of `components`
    /// elements in the bound vertex buffer.
    fn vertex_attrib_pointer_f32(&mut self, location: AttribLocation, components: i32);
    fn enable_vertex_attrib_array(&mut self, location: AttribLocation);
    fn disable_vertex_attrib_array(&mut self, location: AttribLocation);
    /// Draws a triangle list of `count` u16 indices from the bound index
    /// buffer.
    fn draw_elements_u16(&mut self, count: i32);
}

/// Turns a pending GPU error into a [`RenderError::Gpu`].
pub fn check_error<G: Gpu + ?Sized>(gpu: &mut G, stage: &'static str) -> Result<(), RenderError> {
    match gpu.take_error() {
        Some(code) => {
            log::error!("GPU error {code:#06x} after {stage}");
            Err(RenderError::Gpu { stage, code })
        }
        None => Ok(()),
    }
}
