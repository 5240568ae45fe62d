//! Turns accessor -> bufferView -> buffer chains into typed views of the
//! decoded buffer bytes.

use std::marker::PhantomData;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::ResolveError;
use crate::renderer::gltf::{
    Accessor, BufferTarget, BufferView, ComponentType, Index, Primitive, SceneDocument,
};

/// The only kind of buffer uri that is supported.
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// What to do when a buffer's declared `byteLength` differs from the length
/// of its decoded payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteLengthPolicy {
    /// Log a warning and use the decoded bytes as they are.
    #[default]
    Advisory,
    /// Refuse to resolve views into the buffer.
    Strict,
}

/// Whether an accessor's own `byteOffset` is added to its buffer view's
/// offset when computing where the view starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessorOffset {
    /// Views start at the buffer view's offset and span the whole buffer view.
    #[default]
    Ignore,
    /// Views start `accessor.byteOffset` bytes into the buffer view.
    Apply,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub byte_length: ByteLengthPolicy,
    pub accessor_offset: AccessorOffset,
}

/// Decodes a `data:application/octet-stream;base64,` uri into bytes.
pub fn decode_data_uri(uri: &str) -> Result<Arc<[u8]>, ResolveError> {
    let payload = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| ResolveError::UnsupportedUri(uri.to_string()))?;
    let bytes = BASE64
        .decode(payload)
        .map_err(|err| ResolveError::InvalidBase64(err.to_string()))?;
    Ok(bytes.into())
}

/// The element types views can be interpreted as.
pub trait Element: bytemuck::Pod {
    const BYTE_WIDTH: usize;
}

impl Element for f32 {
    const BYTE_WIDTH: usize = 4;
}

impl Element for u16 {
    const BYTE_WIDTH: usize = 2;
}

/// The supported combinations of accessor component type and buffer view
/// target. Everything else is explicitly unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    FloatVertex,
    UShortIndex,
    Unsupported {
        component_type: ComponentType,
        target: BufferTarget,
    },
}

impl ViewKind {
    pub fn classify(component_type: ComponentType, target: BufferTarget) -> ViewKind {
        match (component_type, target) {
            (ComponentType::Float, BufferTarget::ArrayBuffer) => ViewKind::FloatVertex,
            (ComponentType::UnsignedShort, BufferTarget::ElementArrayBuffer) => {
                ViewKind::UShortIndex
            }
            (component_type, target) => ViewKind::Unsupported {
                component_type,
                target,
            },
        }
    }
}

/// A read-only window into a buffer's decoded bytes, interpreted as
/// consecutive `T`s.
pub struct TypedView<T> {
    storage: Arc<[u8]>,
    byte_offset: usize,
    byte_length: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for TypedView<T> {
    fn clone(&self) -> Self {
        TypedView {
            storage: Arc::clone(&self.storage),
            byte_offset: self.byte_offset,
            byte_length: self.byte_length,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedView")
            .field("byte_offset", &self.byte_offset)
            .field("byte_length", &self.byte_length)
            .finish()
    }
}

impl<T: Element> TypedView<T> {
    fn new(
        storage: Arc<[u8]>,
        byte_offset: usize,
        byte_length: usize,
    ) -> Result<TypedView<T>, ResolveError> {
        let end = byte_offset.checked_add(byte_length);
        match end {
            Some(end) if end <= storage.len() => Ok(TypedView {
                storage,
                byte_offset,
                byte_length,
                _marker: PhantomData,
            }),
            _ => Err(ResolveError::RangeOutOfBounds {
                start: byte_offset,
                end: byte_offset.saturating_add(byte_length),
                len: storage.len(),
            }),
        }
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// The offset of the view in the buffer, in `T`-sized elements.
    pub fn start_element(&self) -> usize {
        self.byte_offset / T::BYTE_WIDTH
    }

    /// The number of whole elements in the view.
    pub fn len(&self) -> usize {
        self.byte_length / T::BYTE_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[self.byte_offset..self.byte_offset + self.byte_length]
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.as_bytes()
            .chunks_exact(T::BYTE_WIDTH)
            .map(bytemuck::pod_read_unaligned)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// The GPU-ready data of one primitive.
#[derive(Debug, Clone)]
pub struct ResolvedPrimitive {
    pub vertices: TypedView<f32>,
    pub indices: TypedView<u16>,
}

/// Resolves the POSITION and index views of every primitive of every mesh,
/// in document order. Primitives that can't be resolved are logged and left
/// out.
pub fn resolve_document(
    document: &SceneDocument,
    options: ResolveOptions,
) -> Vec<ResolvedPrimitive> {
    let mut resolved = Vec::new();
    for (mesh_index, mesh) in document.meshes.iter() {
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            match resolve_primitive(document, primitive, options) {
                Ok(primitive) => resolved.push(primitive),
                Err(err) => log::error!(
                    "mesh {} primitive {primitive_index} will not be rendered: {err}",
                    mesh_index.get(),
                ),
            }
        }
    }
    resolved
}

pub fn resolve_primitive(
    document: &SceneDocument,
    primitive: &Primitive,
    options: ResolveOptions,
) -> Result<ResolvedPrimitive, ResolveError> {
    let position = primitive.position().ok_or(ResolveError::MissingPosition)?;

    let (accessor, view) = lookup(document, position)?;
    let vertices = match ViewKind::classify(accessor.component_type, view.target) {
        ViewKind::FloatVertex => resolve_view(document, accessor, view, options)?,
        ViewKind::UShortIndex | ViewKind::Unsupported { .. } => {
            return Err(if accessor.component_type != ComponentType::Float {
                ResolveError::UnsupportedVertexComponent(accessor.component_type.code())
            } else {
                ResolveError::UnsupportedVertexTarget(view.target.code())
            });
        }
    };

    let (accessor, view) = lookup(document, primitive.indices)?;
    let indices = match ViewKind::classify(accessor.component_type, view.target) {
        ViewKind::UShortIndex => resolve_view(document, accessor, view, options)?,
        ViewKind::FloatVertex | ViewKind::Unsupported { .. } => {
            return Err(if view.target != BufferTarget::ElementArrayBuffer {
                ResolveError::UnsupportedIndexTarget(view.target.code())
            } else {
                ResolveError::UnsupportedIndexComponent(accessor.component_type.code())
            });
        }
    };

    Ok(ResolvedPrimitive { vertices, indices })
}

fn lookup(
    document: &SceneDocument,
    accessor: Index<Accessor>,
) -> Result<(&Accessor, &BufferView), ResolveError> {
    let accessor = document.accessors.get(accessor)?;
    let view = document.buffer_views.get(accessor.buffer_view)?;
    Ok((accessor, view))
}

fn resolve_view<T: Element>(
    document: &SceneDocument,
    accessor: &Accessor,
    view: &BufferView,
    options: ResolveOptions,
) -> Result<TypedView<T>, ResolveError> {
    let buffer = document.buffers.get(view.buffer)?;
    let storage = buffer
        .data
        .clone()
        .map_err(|_| ResolveError::UndecodedBuffer(view.buffer.get()))?;

    if storage.len() != buffer.byte_length {
        match options.byte_length {
            ByteLengthPolicy::Advisory => log::warn!(
                "buffer {} declares {} bytes but decodes to {}",
                view.buffer.get(),
                buffer.byte_length,
                storage.len(),
            ),
            ByteLengthPolicy::Strict => {
                return Err(ResolveError::ByteLengthMismatch {
                    declared: buffer.byte_length,
                    decoded: storage.len(),
                })
            }
        }
    }

    let (byte_offset, byte_length) = match options.accessor_offset {
        AccessorOffset::Ignore => (view.byte_offset, view.byte_length),
        AccessorOffset::Apply => {
            let out_of_bounds = || ResolveError::RangeOutOfBounds {
                start: view.byte_offset.saturating_add(accessor.byte_offset),
                end: view.byte_offset.saturating_add(view.byte_length),
                len: storage.len(),
            };
            let byte_length = view
                .byte_length
                .checked_sub(accessor.byte_offset)
                .ok_or_else(out_of_bounds)?;
            let byte_offset = view
                .byte_offset
                .checked_add(accessor.byte_offset)
                .ok_or_else(out_of_bounds)?;
            (byte_offset, byte_length)
        }
    };
    TypedView::new(storage, byte_offset, byte_length)
}
