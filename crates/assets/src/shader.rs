use crate::AssetError;
use std::path::{Path, PathBuf};

/// Name of the fragment entry point every scene shader must define.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// WGSL fragment source for a scene.
///
/// The source only provides the fragment stage. The renderer prepends the
/// uniform block, texture bindings and the full-screen vertex stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: String,
    pub code: String,
    pub path: Option<PathBuf>,
}

impl ShaderSource {
    pub fn inline(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
            path: None,
        }
    }

    /// Read a WGSL fragment source from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        if !defines_fn(&code, FRAGMENT_ENTRY_POINT) {
            return Err(AssetError::MissingEntryPoint {
                path: path.to_path_buf(),
                entry: FRAGMENT_ENTRY_POINT,
            });
        }
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".into());
        tracing::debug!("read shader {} ({} bytes)", path.display(), code.len());
        Ok(Self {
            label,
            code,
            path: Some(path.to_path_buf()),
        })
    }
}

/// Whether `code` contains a `fn <name>(` declaration. Comments are not
/// stripped; this is a sanity check, not a parser.
fn defines_fn(code: &str, name: &str) -> bool {
    code.match_indices("fn").any(|(i, _)| {
        let rest = code[i + 2..].trim_start();
        rest.strip_prefix(name)
            .is_some_and(|after| after.trim_start().starts_with('('))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_entry_point_declaration() {
        assert!(defines_fn("@fragment\nfn fs_main(in: QuadOutput) {}", "fs_main"));
        assert!(defines_fn("fn   fs_main (x: f32) {}", "fs_main"));
        assert!(!defines_fn("fn fs_main_alt() {}", "fs_main"));
        assert!(!defines_fn("// calls fs_main()", "fs_main"));
    }

    #[test]
    fn load_reads_file_and_labels_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.wgsl");
        std::fs::write(
            &path,
            "@fragment\nfn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        )
        .unwrap();

        let source = ShaderSource::load(&path).unwrap();
        assert_eq!(source.label, "gallery");
        assert_eq!(source.path.as_deref(), Some(path.as_path()));
        assert!(source.code.contains("fs_main"));
    }

    #[test]
    fn load_rejects_source_without_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wgsl");
        std::fs::write(&path, "fn helper() {}").unwrap();

        let err = ShaderSource::load(&path).unwrap_err();
        assert!(matches!(err, AssetError::MissingEntryPoint { entry: "fs_main", .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ShaderSource::load("/definitely/not/here.wgsl").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("here.wgsl"));
    }
}
