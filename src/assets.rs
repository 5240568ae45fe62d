use std::io;
use std::path::PathBuf;

use crate::error::RenderError;

/// Supplies the bytes of named resources.
pub trait AssetSource {
    fn read(&self, name: &str) -> Result<Vec<u8>, RenderError>;
}

impl<A: AssetSource + ?Sized> AssetSource for Box<A> {
    fn read(&self, name: &str) -> Result<Vec<u8>, RenderError> {
        (**self).read(name)
    }
}

/// Resources compiled into the binary, as `(name, bytes)` pairs.
pub struct EmbeddedAssets {
    resources: &'static [(&'static str, &'static [u8])],
}

const BUILTIN_RESOURCES: &[(&str, &[u8])] = &[(
    "helloworld.gltf",
    include_bytes!("../assets/helloworld.gltf"),
)];

impl EmbeddedAssets {
    pub fn new(resources: &'static [(&'static str, &'static [u8])]) -> EmbeddedAssets {
        EmbeddedAssets { resources }
    }

    /// The scene that ships with the renderer.
    pub fn builtin() -> EmbeddedAssets {
        EmbeddedAssets::new(BUILTIN_RESOURCES)
    }
}

impl AssetSource for EmbeddedAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, RenderError> {
        self.resources
            .iter()
            .find(|(resource_name, _)| *resource_name == name)
            .map(|(_, data)| data.to_vec())
            .ok_or_else(|| RenderError::Asset {
                name: name.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such embedded resource"),
            })
    }
}

/// Resources read from a directory on disk.
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> AssetDir {
        AssetDir { root: root.into() }
    }
}

impl AssetSource for AssetDir {
    fn read(&self, name: &str) -> Result<Vec<u8>, RenderError> {
        let path = self.root.join(name);
        log::debug!("reading asset {}", path.display());
        std::fs::read(&path).map_err(|source| RenderError::Asset {
            name: name.to_string(),
            source,
        })
    }
}
