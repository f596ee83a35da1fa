use crate::shader::ShaderSource;
use crate::texture::TextureImage;
use crate::AssetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk description of a scene: one fragment shader and the textures it
/// samples, in binding order.
///
/// ```yaml
/// name: gallery
/// shader: gallery.wgsl
/// flip_textures: false
/// textures:
///   - textures/hex.png          # texture0
///   - textures/white_marble.png # texture1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default = "default_name")]
    pub name: String,
    pub shader: PathBuf,
    #[serde(default)]
    pub textures: Vec<PathBuf>,
    #[serde(default)]
    pub flip_textures: bool,
}

fn default_name() -> String {
    "scene".into()
}

impl SceneManifest {
    /// Parse a manifest; relative paths are resolved against `base_dir`.
    pub fn from_yaml(text: &str, base_dir: &Path) -> Result<Self, AssetError> {
        let mut manifest: Self = serde_yaml::from_str(text)?;
        manifest.shader = resolve(base_dir, &manifest.shader);
        for texture in &mut manifest.textures {
            *texture = resolve(base_dir, texture);
        }
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_yaml(&text, base_dir)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

/// A scene with its shader read and every texture decoded.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub name: String,
    pub shader: ShaderSource,
    pub textures: Vec<TextureImage>,
}

impl LoadedScene {
    /// A scene that samples no textures.
    pub fn from_shader(name: impl Into<String>, shader: ShaderSource) -> Self {
        Self {
            name: name.into(),
            shader,
            textures: Vec::new(),
        }
    }

    /// Load the shader, then each texture in manifest order. The first
    /// failure aborts the load.
    pub fn load(manifest: &SceneManifest) -> Result<Self, AssetError> {
        let shader = ShaderSource::load(&manifest.shader)?;
        let textures = manifest
            .textures
            .iter()
            .map(|path| TextureImage::load(path, manifest.flip_textures))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(
            "loaded scene '{}' with {} texture(s)",
            manifest.name,
            textures.len()
        );
        Ok(Self {
            name: manifest.name.clone(),
            shader,
            textures,
        })
    }
}
