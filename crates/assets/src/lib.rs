//! Scene assets: fragment shader sources, textures and the manifest that
//! ties them together.
//!
//! Everything here is CPU-side. The renderer consumes [`LoadedScene`] and
//! never touches file paths.
//!
//! Texture naming convention: the i-th texture listed in a manifest is
//! bound to the shader as `texture{i}`, counting from zero.

mod scene;
mod shader;
mod texture;

use std::path::PathBuf;

pub use scene::{LoadedScene, SceneManifest};
pub use shader::{FRAGMENT_ENTRY_POINT, ShaderSource};
pub use texture::TextureImage;

/// Errors from loading scene assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("shader {path} does not define `{entry}`")]
    MissingEntryPoint { path: PathBuf, entry: &'static str },
    #[error("invalid scene manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
}

impl AssetError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
