use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{IndexError, ResolveError};

#[cfg(test)]
pub(crate) mod fixtures;
mod loader;
mod program;
mod resolver;

pub use loader::parse_document;
pub use program::*;
pub use resolver::*;

/// The component type codes of glTF accessors.
pub const COMPONENT_TYPE_BYTE: u32 = 5120;
pub const COMPONENT_TYPE_UNSIGNED_BYTE: u32 = 5121;
pub const COMPONENT_TYPE_SHORT: u32 = 5122;
pub const COMPONENT_TYPE_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_TYPE_INT: u32 = 5124;
pub const COMPONENT_TYPE_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_TYPE_FLOAT: u32 = 5126;
pub const COMPONENT_TYPE_DOUBLE: u32 = 5127;

/// The buffer view target codes, same as GL_ARRAY_BUFFER and
/// GL_ELEMENT_ARRAY_BUFFER.
pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// The parsed contents of a glTF document. Cross-references between the
/// sections are typed indices into the arenas.
#[derive(Debug, Default)]
pub struct SceneDocument {
    pub scenes: Arena<Scene>,
    pub nodes: Arena<Node>,
    pub meshes: Arena<Mesh>,
    pub buffers: Arena<Buffer>,
    pub buffer_views: Arena<BufferView>,
    pub accessors: Arena<Accessor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<Index<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub mesh: Index<Mesh>,
    /// Parsed, but never traversed by the renderer.
    pub children: Vec<Index<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub attributes: HashMap<String, Index<Accessor>>,
    pub indices: Index<Accessor>,
}

impl Primitive {
    pub fn position(&self) -> Option<Index<Accessor>> {
        self.attributes.get("POSITION").copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub name: Option<String>,
    /// Advisory only, see [`ByteLengthPolicy`].
    pub byte_length: usize,
    pub uri: String,
    /// The decoded payload of `uri`, or why it could not be decoded.
    pub data: Result<Arc<[u8]>, ResolveError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub name: Option<String>,
    pub buffer: Index<Buffer>,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// 0 means tightly packed.
    pub byte_stride: usize,
    pub target: BufferTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: Option<String>,
    pub buffer_view: Index<BufferView>,
    /// Relative to the buffer view's own offset.
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub count: usize,
    /// "SCALAR", "VEC3", etc. Informational only.
    pub type_: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
    Other(u32),
}

impl BufferTarget {
    pub fn from_code(code: u32) -> BufferTarget {
        match code {
            TARGET_ARRAY_BUFFER => BufferTarget::ArrayBuffer,
            TARGET_ELEMENT_ARRAY_BUFFER => BufferTarget::ElementArrayBuffer,
            other => BufferTarget::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            BufferTarget::ArrayBuffer => TARGET_ARRAY_BUFFER,
            BufferTarget::ElementArrayBuffer => TARGET_ELEMENT_ARRAY_BUFFER,
            BufferTarget::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl ComponentType {
    pub fn from_code(code: u32) -> Option<ComponentType> {
        Some(match code {
            COMPONENT_TYPE_BYTE => ComponentType::Byte,
            COMPONENT_TYPE_UNSIGNED_BYTE => ComponentType::UnsignedByte,
            COMPONENT_TYPE_SHORT => ComponentType::Short,
            COMPONENT_TYPE_UNSIGNED_SHORT => ComponentType::UnsignedShort,
            COMPONENT_TYPE_INT => ComponentType::Int,
            COMPONENT_TYPE_UNSIGNED_INT => ComponentType::UnsignedInt,
            COMPONENT_TYPE_FLOAT => ComponentType::Float,
            COMPONENT_TYPE_DOUBLE => ComponentType::Double,
            _ => return None,
        })
    }

    pub fn code(self) -> u32 {
        match self {
            ComponentType::Byte => COMPONENT_TYPE_BYTE,
            ComponentType::UnsignedByte => COMPONENT_TYPE_UNSIGNED_BYTE,
            ComponentType::Short => COMPONENT_TYPE_SHORT,
            ComponentType::UnsignedShort => COMPONENT_TYPE_UNSIGNED_SHORT,
            ComponentType::Int => COMPONENT_TYPE_INT,
            ComponentType::UnsignedInt => COMPONENT_TYPE_UNSIGNED_INT,
            ComponentType::Float => COMPONENT_TYPE_FLOAT,
            ComponentType::Double => COMPONENT_TYPE_DOUBLE,
        }
    }
}

/// Implemented by everything that lives in an [`Arena`], for error messages.
pub trait ArenaItem {
    const KIND: &'static str;
}

impl ArenaItem for Scene {
    const KIND: &'static str = "scene";
}
impl ArenaItem for Node {
    const KIND: &'static str = "node";
}
impl ArenaItem for Mesh {
    const KIND: &'static str = "mesh";
}
impl ArenaItem for Buffer {
    const KIND: &'static str = "buffer";
}
impl ArenaItem for BufferView {
    const KIND: &'static str = "bufferView";
}
impl ArenaItem for Accessor {
    const KIND: &'static str = "accessor";
}

/// A position in an [`Arena<T>`]. Only meaningful for the arena of the same
/// document it was parsed from.
pub struct Index<T> {
    raw: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Index<T> {
    pub fn new(raw: usize) -> Index<T> {
        Index {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn get(self) -> usize {
        self.raw
    }
}

impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Index<T> {}

impl<T> Hash for Index<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: ArenaItem> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", T::KIND, self.raw)
    }
}

/// Positional storage for one section of the document. Records that failed
/// to parse keep their slot so that the indices of the following records
/// stay the same as in the JSON.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { slots: Vec::new() }
    }
}

impl<T: ArenaItem> Arena<T> {
    pub fn get(&self, index: Index<T>) -> Result<&T, IndexError> {
        match self.slots.get(index.raw) {
            Some(Some(item)) => Ok(item),
            Some(None) => Err(IndexError::Vacant {
                kind: T::KIND,
                index: index.raw,
            }),
            None => Err(IndexError::OutOfRange {
                kind: T::KIND,
                index: index.raw,
                len: self.slots.len(),
            }),
        }
    }

    /// The number of slots, including the ones of skipped records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over the records that parsed successfully.
    pub fn iter(&self) -> impl Iterator<Item = (Index<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (Index::new(i), item)))
    }
}

impl<T> FromIterator<Option<T>> for Arena<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Arena {
            slots: iter.into_iter().collect(),
        }
    }
}
