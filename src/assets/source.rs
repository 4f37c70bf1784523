use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    assets::{decode::decode_image, store::PreparedImage},
    foundation::error::{LoadError, PlumageError, PlumageResult},
};

/// Where asset images come from.
///
/// Paths and collection names are logical, `/`-separated and relative. Implementations must be
/// shareable across threads: variants of one collection are decoded in parallel.
pub trait ImageSource: Send + Sync {
    /// Read and decode one image.
    fn load_image(&self, path: &str) -> Result<PreparedImage, LoadError>;

    /// Logical paths of every image in `collection`, in a stable order.
    fn list_collection(&self, collection: &str) -> Result<Vec<String>, LoadError>;
}

/// Image source backed by a directory of PNG files.
///
/// A collection is a subdirectory; its variants are the `*.png` files directly inside it, sorted
/// by file name.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory all logical paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, logical: &str) -> PlumageResult<PathBuf> {
        let norm = normalize_rel_path(logical)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl ImageSource for DirSource {
    fn load_image(&self, path: &str) -> Result<PreparedImage, LoadError> {
        let abs = self.resolve(path).map_err(|e| LoadError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let bytes = std::fs::read(&abs).map_err(|e| LoadError::Read {
            path: path.to_string(),
            reason: format!("{}: {e}", abs.display()),
        })?;
        decode_image(&bytes).map_err(|e| LoadError::Decode {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })
    }

    fn list_collection(&self, collection: &str) -> Result<Vec<String>, LoadError> {
        let list_err = |reason: String| LoadError::List {
            collection: collection.to_string(),
            reason,
        };
        let dir = self.resolve(collection).map_err(|e| list_err(e.to_string()))?;
        let rd = std::fs::read_dir(&dir).map_err(|e| list_err(format!("{}: {e}", dir.display())))?;

        let mut names = Vec::new();
        for entry in rd {
            let entry = entry.map_err(|e| list_err(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if !is_png {
                continue;
            }
            // A skipped variant would shift every later digit onto the wrong image.
            let name = entry.file_name().into_string().map_err(|raw| {
                list_err(format!("variant file name {raw:?} is not valid utf-8"))
            })?;
            names.push(name);
        }
        names.sort();

        let prefix = normalize_rel_path(collection).map_err(|e| list_err(e.to_string()))?;
        Ok(names
            .into_iter()
            .map(|name| format!("{prefix}/{name}"))
            .collect())
    }
}

/// Image source holding already-decoded images, keyed by logical path.
///
/// A collection is every path of the form `<collection>/<name>`, in path order.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    images: BTreeMap<String, PreparedImage>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the image at `path`.
    pub fn insert(&mut self, path: impl Into<String>, image: PreparedImage) -> &mut Self {
        self.images.insert(path.into(), image);
        self
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with_image(mut self, path: impl Into<String>, image: PreparedImage) -> Self {
        self.insert(path, image);
        self
    }

    /// Number of images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when no images are held.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for MemorySource {
    fn load_image(&self, path: &str) -> Result<PreparedImage, LoadError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Read {
                path: path.to_string(),
                reason: "no such image".to_string(),
            })
    }

    fn list_collection(&self, collection: &str) -> Result<Vec<String>, LoadError> {
        let prefix = format!("{}/", collection.trim_end_matches('/'));
        Ok(self
            .images
            .range(prefix.clone()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(&prefix))
            .filter(|k| !k[prefix.len()..].contains('/'))
            .cloned()
            .collect())
    }
}

/// Normalize and validate asset-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PlumageResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PlumageError::validation("asset paths must be relative"));
    }

    let parts: Vec<&str> = s
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.contains(&"..") {
        return Err(PlumageError::validation("asset paths must not contain '..'"));
    }
    if parts.is_empty() {
        return Err(PlumageError::validation("asset path must be non-empty"));
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
