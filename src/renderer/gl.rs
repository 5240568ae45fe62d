//! OpenGL ES 3.0 bindings, and the [`Gpu`] implementation on top of them.

use std::ffi::{c_void, CString};
use std::ptr;

use glam::Mat4;

use crate::error::RenderError;
use crate::renderer::device::{
    AttribLocation, BindTarget, BufferHandle, Gpu, ProgramHandle, ShaderCompiler, UniformLocation,
};

#[allow(
    clippy::all,
    dead_code,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    unused_imports
)]
mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

pub use bindings::*;

/// Calls the unsafe GL function, and in debug builds, panics with the call
/// site if it raised an error.
macro_rules! call {
    ($expr:expr) => {{
        #[allow(unused_unsafe)]
        let result = unsafe { $expr };
        if cfg!(debug_assertions) {
            let error = unsafe { $crate::renderer::gl::GetError() };
            if error != $crate::renderer::gl::NO_ERROR {
                panic!(
                    "OpenGL error {} at {}:{}:{}",
                    $crate::renderer::gl::error_name(error),
                    file!(),
                    line!(),
                    column!(),
                );
            }
        }
        result
    }};
}

pub(crate) use call;

pub fn error_name(error: types::GLenum) -> String {
    match error {
        INVALID_ENUM => "INVALID_ENUM".to_string(),
        INVALID_VALUE => "INVALID_VALUE".to_string(),
        INVALID_OPERATION => "INVALID_OPERATION".to_string(),
        OUT_OF_MEMORY => "OUT_OF_MEMORY".to_string(),
        INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION".to_string(),
        _ => format!("{error:#06x}"),
    }
}

pub fn create_shader(
    shader_type: types::GLenum,
    source: &str,
) -> Result<types::GLuint, RenderError> {
    let stage = if shader_type == VERTEX_SHADER {
        "vertex"
    } else {
        "fragment"
    };
    let source = CString::new(source).map_err(|_| RenderError::ShaderCompile {
        stage,
        log: "shader source contains a nul byte".to_string(),
    })?;
    let shader = call!(CreateShader(shader_type));
    call!(ShaderSource(shader, 1, &source.as_ptr(), ptr::null()));
    call!(CompileShader(shader));
    let mut compile_status = 0;
    call!(GetShaderiv(shader, COMPILE_STATUS, &mut compile_status));
    if compile_status == FALSE as i32 {
        let mut info_log = [0u8; 4096];
        let mut length = 0;
        call!(GetShaderInfoLog(
            shader,
            info_log.len() as i32,
            &mut length,
            info_log.as_mut_ptr() as *mut types::GLchar,
        ));
        let log = String::from_utf8_lossy(&info_log[..length.max(0) as usize]).into_owned();
        call!(DeleteShader(shader));
        return Err(RenderError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

pub fn create_program(shaders: &[types::GLuint]) -> Result<types::GLuint, RenderError> {
    let program = call!(CreateProgram());
    for &shader in shaders {
        call!(AttachShader(program, shader));
    }
    call!(LinkProgram(program));
    let mut link_status = 0;
    call!(GetProgramiv(program, LINK_STATUS, &mut link_status));
    if link_status == FALSE as i32 {
        let mut info_log = [0u8; 4096];
        let mut length = 0;
        call!(GetProgramInfoLog(
            program,
            info_log.len() as i32,
            &mut length,
            info_log.as_mut_ptr() as *mut types::GLchar,
        ));
        let log = String::from_utf8_lossy(&info_log[..length.max(0) as usize]).into_owned();
        call!(DeleteProgram(program));
        return Err(RenderError::ShaderLink(log));
    }
    Ok(program)
}

fn bind_target(target: BindTarget) -> types::GLenum {
    match target {
        BindTarget::Vertex => ARRAY_BUFFER,
        BindTarget::Index => ELEMENT_ARRAY_BUFFER,
    }
}

/// The [`Gpu`] backed by the GL context that was current when it was created.
pub struct GlDevice {
    vao: types::GLuint,
}

impl GlDevice {
    /// Loads the GL functions with `loader` and binds a vertex array object
    /// for the renderer's attribute state. The context must be current.
    pub fn new<F>(loader: F) -> GlDevice
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        load_with(loader);
        let mut vao = 0;
        call!(GenVertexArrays(1, &mut vao));
        call!(BindVertexArray(vao));
        GlDevice { vao }
    }
}

impl Drop for GlDevice {
    fn drop(&mut self) {
        call!(DeleteVertexArrays(1, &self.vao));
    }
}

impl ShaderCompiler for GlDevice {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, RenderError> {
        let vertex_shader = create_shader(VERTEX_SHADER, vertex_source)?;
        let fragment_shader = match create_shader(FRAGMENT_SHADER, fragment_source) {
            Ok(shader) => shader,
            Err(err) => {
                call!(DeleteShader(vertex_shader));
                return Err(err);
            }
        };
        let program = create_program(&[vertex_shader, fragment_shader]);
        call!(DeleteShader(vertex_shader));
        call!(DeleteShader(fragment_shader));
        program.map(ProgramHandle)
    }

    fn attribute_location(
        &mut self,
        program: ProgramHandle,
        name: &str,
    ) -> Option<AttribLocation> {
        let name = CString::new(name).ok()?;
        let location = call!(GetAttribLocation(program.0, name.as_ptr()));
        u32::try_from(location).ok().map(AttribLocation)
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let name = CString::new(name).ok()?;
        let location = call!(GetUniformLocation(program.0, name.as_ptr()));
        (location >= 0).then_some(UniformLocation(location))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        call!(DeleteProgram(program.0));
    }
}

impl Gpu for GlDevice {
    fn gen_buffers(&mut self, count: usize) -> Vec<BufferHandle> {
        let mut buffers = vec![0; count];
        call!(GenBuffers(buffers.len() as i32, buffers.as_mut_ptr()));
        buffers.into_iter().map(BufferHandle).collect()
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        let buffers = buffers.iter().map(|buffer| buffer.0).collect::<Vec<_>>();
        call!(DeleteBuffers(buffers.len() as i32, buffers.as_ptr()));
    }

    fn bind_buffer(&mut self, target: BindTarget, buffer: Option<BufferHandle>) {
        let buffer = buffer.map(|buffer| buffer.0).unwrap_or(0);
        call!(BindBuffer(bind_target(target), buffer));
    }

    fn buffer_data_static(&mut self, target: BindTarget, data: &[u8]) {
        call!(BufferData(
            bind_target(target),
            data.len() as isize,
            data.as_ptr() as *const c_void,
            STATIC_DRAW,
        ));
    }

    fn take_error(&mut self) -> Option<u32> {
        let error = unsafe { GetError() };
        (error != NO_ERROR).then_some(error)
    }

    fn viewport(&mut self, width: i32, height: i32) {
        call!(Viewport(0, 0, width, height));
    }

    fn set_clear_color(&mut self, [r, g, b, a]: [f32; 4]) {
        call!(ClearColor(r, g, b, a));
    }

    fn clear(&mut self) {
        call!(Clear(COLOR_BUFFER_BIT));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        call!(UseProgram(program.0));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4) {
        let columns = matrix.to_cols_array();
        call!(UniformMatrix4fv(location.0, 1, FALSE, columns.as_ptr()));
    }

    fn vertex_attrib_pointer_f32(&mut self, location: AttribLocation, components: i32) {
        call!(VertexAttribPointer(
            location.0,
            components,
            FLOAT,
            FALSE,
            0,
            ptr::null(),
        ));
    }

    fn enable_vertex_attrib_array(&mut self, location: AttribLocation) {
        call!(EnableVertexAttribArray(location.0));
    }

    fn disable_vertex_attrib_array(&mut self, location: AttribLocation) {
        call!(DisableVertexAttribArray(location.0));
    }

    fn draw_elements_u16(&mut self, count: i32) {
        call!(DrawElements(TRIANGLES, count, UNSIGNED_SHORT, ptr::null()));
    }
}
