use crate::error::RenderError;
use crate::renderer::device::{check_error, BindTarget, BufferHandle, Gpu};
use crate::renderer::draw_calls::{DrawCall, BYTES_PER_SHORT};
use crate::renderer::gltf::{ResolvedPrimitive, TypedView};

/// A primitive whose vertex and index data have been uploaded to the GPU.
/// The GPU buffers are owned by whoever holds the render object, and have to
/// be released with [`release`] while the context is still alive.
#[derive(Debug)]
pub struct RenderObject {
    pub vertices: TypedView<f32>,
    pub indices: TypedView<u16>,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
}

impl RenderObject {
    pub fn vertex_byte_offset(&self) -> usize {
        self.vertices.byte_offset()
    }

    pub fn vertex_byte_length(&self) -> usize {
        self.vertices.byte_length()
    }

    pub fn index_byte_offset(&self) -> usize {
        self.indices.byte_offset()
    }

    pub fn index_byte_length(&self) -> usize {
        self.indices.byte_length()
    }

    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            vertex_buffer: self.vertex_buffer,
            index_buffer: self.index_buffer,
            index_count: (self.index_byte_length() / BYTES_PER_SHORT) as i32,
        }
    }
}

/// Uploads every primitive into a fresh pair of vertex and index buffers,
/// appending the render objects to `render_objects` in the same order.
///
/// The objects are appended as soon as their buffers exist, so the caller
/// owns (and must release) them even when the final error check fails.
pub fn upload<G: Gpu + ?Sized>(
    gpu: &mut G,
    primitives: Vec<ResolvedPrimitive>,
    render_objects: &mut Vec<RenderObject>,
) -> Result<(), RenderError> {
    for primitive in primitives {
        let buffers = gpu.gen_buffers(2);
        let (vertex_buffer, index_buffer) = (buffers[0], buffers[1]);

        gpu.bind_buffer(BindTarget::Vertex, Some(vertex_buffer));
        gpu.buffer_data_static(BindTarget::Vertex, primitive.vertices.as_bytes());
        gpu.bind_buffer(BindTarget::Vertex, None);

        gpu.bind_buffer(BindTarget::Index, Some(index_buffer));
        gpu.buffer_data_static(BindTarget::Index, primitive.indices.as_bytes());
        gpu.bind_buffer(BindTarget::Index, None);

        render_objects.push(RenderObject {
            vertices: primitive.vertices,
            indices: primitive.indices,
            vertex_buffer,
            index_buffer,
        });
    }
    check_error(gpu, "glTF buffer upload")?;
    log::debug!("uploaded {} render objects", render_objects.len());
    Ok(())
}

/// Frees the GPU buffers of every render object.
pub fn release<G: Gpu + ?Sized>(gpu: &mut G, render_objects: Vec<RenderObject>) {
    if render_objects.is_empty() {
        return;
    }
    let buffers = render_objects
        .iter()
        .flat_map(|object| [object.vertex_buffer, object.index_buffer])
        .collect::<Vec<_>>();
    gpu.delete_buffers(&buffers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::gltf::fixtures::{self, QUAD_INDICES, QUAD_VERTICES};
    use crate::renderer::gltf::{parse_document, resolve_document, ResolveOptions};
    use crate::renderer::recording::{GpuCall, RecordingGpu};
    use pretty_assertions::assert_eq;

    fn quad_primitives() -> Vec<ResolvedPrimitive> {
        let json = fixtures::quad_document(&fixtures::quad_buffer_uri());
        let document = parse_document(json.as_bytes()).unwrap();
        resolve_document(&document, ResolveOptions::default())
    }

    #[test]
    fn uploads_the_quad_into_two_buffers() {
        let mut gpu = RecordingGpu::new();
        let mut objects = Vec::new();
        upload(&mut gpu, quad_primitives(), &mut objects).unwrap();

        assert_eq!(objects.len(), 1);
        let quad = &objects[0];
        assert_eq!(quad.vertex_byte_length(), 48);
        assert_eq!(quad.index_byte_length(), 12);
        assert_eq!(quad.index_byte_offset(), 48);
        assert_eq!(quad.draw_call().index_count, 6);

        let vertex_bytes = bytemuck::cast_slice::<f32, u8>(&QUAD_VERTICES).to_vec();
        let index_bytes = bytemuck::cast_slice::<u16, u8>(&QUAD_INDICES).to_vec();
        assert_eq!(
            gpu.calls(),
            vec![
                GpuCall::GenBuffers(vec![quad.vertex_buffer, quad.index_buffer]),
                GpuCall::BindBuffer(BindTarget::Vertex, Some(quad.vertex_buffer)),
                GpuCall::BufferData(BindTarget::Vertex, vertex_bytes),
                GpuCall::BindBuffer(BindTarget::Vertex, None),
                GpuCall::BindBuffer(BindTarget::Index, Some(quad.index_buffer)),
                GpuCall::BufferData(BindTarget::Index, index_bytes),
                GpuCall::BindBuffer(BindTarget::Index, None),
            ]
        );
    }

    #[test]
    fn gpu_error_is_fatal_but_objects_are_kept_for_release() {
        let mut gpu = RecordingGpu::new();
        gpu.fail_next_check(0x0505);
        let mut objects = Vec::new();
        let err = upload(&mut gpu, quad_primitives(), &mut objects).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Gpu {
                code: 0x0505,
                ..
            }
        ));
        assert_eq!(objects.len(), 1);

        let buffers = vec![objects[0].vertex_buffer, objects[0].index_buffer];
        release(&mut gpu, objects);
        assert_eq!(gpu.calls().last(), Some(&GpuCall::DeleteBuffers(buffers)));
    }
}
