//! A [`Gpu`] that records calls instead of making them.

use std::sync::{Arc, Mutex};

use glam::Mat4;

use crate::error::RenderError;
use crate::renderer::device::{
    AttribLocation, BindTarget, BufferHandle, Gpu, ProgramHandle, ShaderCompiler, UniformLocation,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CompileProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    GenBuffers(Vec<BufferHandle>),
    DeleteBuffers(Vec<BufferHandle>),
    BindBuffer(BindTarget, Option<BufferHandle>),
    BufferData(BindTarget, Vec<u8>),
    Viewport(i32, i32),
    ClearColor([f32; 4]),
    Clear,
    UseProgram(ProgramHandle),
    UniformMatrix4(UniformLocation, Mat4),
    VertexAttribPointer(AttribLocation, i32),
    EnableAttrib(AttribLocation),
    DisableAttrib(AttribLocation),
    DrawElements(i32),
}

/// Shared between a test and the [`RecordingGpu`]s it hands out, so calls can
/// be inspected after the device has been moved into the renderer.
#[derive(Debug, Default)]
pub struct GpuLog {
    pub calls: Vec<GpuCall>,
    /// Reported by the next `take_error`.
    pub pending_error: Option<u32>,
    /// Names that fail to resolve to a location.
    pub missing_locations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingGpu {
    log: Arc<Mutex<GpuLog>>,
    next_handle: u32,
}

impl RecordingGpu {
    pub fn new() -> RecordingGpu {
        RecordingGpu::default()
    }

    pub fn with_log(log: Arc<Mutex<GpuLog>>) -> RecordingGpu {
        RecordingGpu {
            log,
            next_handle: 0,
        }
    }

    pub fn log(&self) -> Arc<Mutex<GpuLog>> {
        Arc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<GpuCall> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn fail_next_check(&self, code: u32) {
        self.log.lock().unwrap().pending_error = Some(code);
    }

    fn record(&mut self, call: GpuCall) {
        self.log.lock().unwrap().calls.push(call);
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn is_missing(&self, name: &str) -> bool {
        let log = self.log.lock().unwrap();
        log.missing_locations.iter().any(|missing| missing == name)
    }
}

impl ShaderCompiler for RecordingGpu {
    fn compile_program(&mut self, _: &str, _: &str) -> Result<ProgramHandle, RenderError> {
        let program = ProgramHandle(self.next());
        self.record(GpuCall::CompileProgram(program));
        Ok(program)
    }

    fn attribute_location(&mut self, _: ProgramHandle, name: &str) -> Option<AttribLocation> {
        (!self.is_missing(name)).then_some(AttribLocation(0))
    }

    fn uniform_location(&mut self, _: ProgramHandle, name: &str) -> Option<UniformLocation> {
        (!self.is_missing(name)).then_some(UniformLocation(0))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.record(GpuCall::DeleteProgram(program));
    }
}

impl Gpu for RecordingGpu {
    fn gen_buffers(&mut self, count: usize) -> Vec<BufferHandle> {
        let buffers = (0..count).map(|_| BufferHandle(self.next())).collect::<Vec<_>>();
        self.record(GpuCall::GenBuffers(buffers.clone()));
        buffers
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        self.record(GpuCall::DeleteBuffers(buffers.to_vec()));
    }

    fn bind_buffer(&mut self, target: BindTarget, buffer: Option<BufferHandle>) {
        self.record(GpuCall::BindBuffer(target, buffer));
    }

    fn buffer_data_static(&mut self, target: BindTarget, data: &[u8]) {
        self.record(GpuCall::BufferData(target, data.to_vec()));
    }

    fn take_error(&mut self) -> Option<u32> {
        self.log.lock().unwrap().pending_error.take()
    }

    fn viewport(&mut self, width: i32, height: i32) {
        self.record(GpuCall::Viewport(width, height));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.record(GpuCall::ClearColor(color));
    }

    fn clear(&mut self) {
        self.record(GpuCall::Clear);
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.record(GpuCall::UseProgram(program));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4) {
        self.record(GpuCall::UniformMatrix4(location, *matrix));
    }

    fn vertex_attrib_pointer_f32(&mut self, location: AttribLocation, components: i32) {
        self.record(GpuCall::VertexAttribPointer(location, components));
    }

    fn enable_vertex_attrib_array(&mut self, location: AttribLocation) {
        self.record(GpuCall::EnableAttrib(location));
    }

    fn disable_vertex_attrib_array(&mut self, location: AttribLocation) {
        self.record(GpuCall::DisableAttrib(location));
    }

    fn draw_elements_u16(&mut self, count: i32) {
        self.record(GpuCall::DrawElements(count));
    }
}
