//! Error types for loading and rendering the scene.
//!
//! Three tiers: [`RecordError`] is absorbed per JSON record,
//! [`ResolveError`] is absorbed per primitive, and [`RenderError`] is fatal
//! for the whole rendering pipeline.

use thiserror::Error;

/// The document as a whole is not a JSON object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("document is not valid UTF-8")]
    InvalidUtf8,
    #[error("document is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("document root is not a JSON object")]
    NotAnObject,
}

/// A single record of a top-level section could not be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{section}[{index}]: {reason}")]
pub struct RecordError {
    pub section: &'static str,
    pub index: usize,
    pub reason: String,
}

impl RecordError {
    pub fn new(section: &'static str, index: usize, reason: impl Into<String>) -> RecordError {
        RecordError {
            section,
            index,
            reason: reason.into(),
        }
    }
}

/// An arena lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("{kind} index {index} is out of range (length {len})")]
    OutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{kind} {index} was skipped while parsing")]
    Vacant { kind: &'static str, index: usize },
}

/// A buffer or primitive could not be turned into GPU-ready data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unsupported buffer uri scheme in \"{0}\"")]
    UnsupportedUri(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
    #[error("buffer declares {declared} bytes but decodes to {decoded}")]
    ByteLengthMismatch { declared: usize, decoded: usize },
    #[error("buffer {0} failed to decode")]
    UndecodedBuffer(usize),
    #[error("primitive has no POSITION attribute")]
    MissingPosition,
    #[error("POSITION accessor has component type {0}, expected FLOAT")]
    UnsupportedVertexComponent(u32),
    #[error("index accessor has component type {0}, expected UNSIGNED_SHORT")]
    UnsupportedIndexComponent(u32),
    #[error("POSITION buffer view has target {0}, expected ARRAY_BUFFER")]
    UnsupportedVertexTarget(u32),
    #[error("index buffer view has target {0}, expected ELEMENT_ARRAY_BUFFER")]
    UnsupportedIndexTarget(u32),
    #[error("byte range {start}..{end} exceeds buffer storage of {len} bytes")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Failures that leave the rendering pipeline unusable.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("GPU error {code:#06x} after {stage}")]
    Gpu { stage: &'static str, code: u32 },
    #[error("could not find {kind} location for \"{name}\"")]
    MissingLocation { kind: &'static str, name: String },
    #[error("compiling {stage} shader failed: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("linking shader program failed: {0}")]
    ShaderLink(String),
    #[error("context error: {0}")]
    Context(String),
    #[error("could not read asset \"{name}\": {source}")]
    Asset {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
