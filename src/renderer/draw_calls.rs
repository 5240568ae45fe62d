use crate::renderer::device::{AttribLocation, BindTarget, BufferHandle, Gpu};

/// Number of f32 components per POSITION.
pub const COORDS_PER_VERTEX: i32 = 3;
pub const BYTES_PER_SHORT: usize = 2;

/// The state needed to draw one render object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: i32,
}

impl DrawCall {
    /// Draws the indexed triangle list, leaving no buffers bound and the
    /// position attribute disabled.
    pub fn issue<G: Gpu + ?Sized>(&self, gpu: &mut G, position: AttribLocation) {
        gpu.bind_buffer(BindTarget::Vertex, Some(self.vertex_buffer));
        gpu.vertex_attrib_pointer_f32(position, COORDS_PER_VERTEX);
        gpu.bind_buffer(BindTarget::Vertex, None);
        gpu.enable_vertex_attrib_array(position);

        gpu.bind_buffer(BindTarget::Index, Some(self.index_buffer));
        gpu.draw_elements_u16(self.index_count);
        gpu.bind_buffer(BindTarget::Index, None);

        gpu.disable_vertex_attrib_array(position);
    }
}
