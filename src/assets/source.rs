use std::path::{Path, PathBuf};

use crate::animation::AnimationClip;
use crate::assets::bounds::Aabb;
use crate::errors::{Result, StageError};

/// What a scene source hands back to the load pipeline.
#[derive(Debug, Clone, Default)]
pub struct LoadedScene {
    /// Bounds of the loaded content. An invalid box means "nothing loaded".
    pub bounds: Aabb,
    /// Clips of the content's animation manager, if it exposes one.
    pub animations: Option<Vec<AnimationClip>>,
}

impl LoadedScene {
    #[must_use]
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            animations: None,
        }
    }

    #[must_use]
    pub fn with_animations(mut self, clips: Vec<AnimationClip>) -> Self {
        self.animations = Some(clips);
        self
    }
}

/// Produces scene content for a URI.
///
/// `load` runs on the load worker thread and may block for as long as it
/// needs to.
pub trait SceneSource: Send + Sync {
    fn load(&self, uri: &str) -> Result<LoadedScene>;
}

impl<F> SceneSource for F
where
    F: Fn(&str) -> Result<LoadedScene> + Send + Sync,
{
    fn load(&self, uri: &str) -> Result<LoadedScene> {
        self(uri)
    }
}

/// Reads local files and hands their bytes to a format parser.
///
/// URIs are resolved against `root_path`; a `file://` prefix is accepted.
pub struct FileSceneSource<P> {
    root_path: PathBuf,
    parser: P,
}

impl<P> FileSceneSource<P>
where
    P: Fn(&[u8], &Path) -> Result<LoadedScene> + Send + Sync,
{
    pub fn new(root: impl AsRef<Path>, parser: P) -> Self {
        let root = root.as_ref();
        let root_path = if root.is_file() {
            root.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            root.to_path_buf()
        };
        Self { root_path, parser }
    }

    #[inline]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[must_use]
    pub fn resolve(&self, uri: &str) -> PathBuf {
        let stripped = uri.strip_prefix("file://").unwrap_or(uri);
        self.root_path.join(stripped)
    }
}

impl<P> SceneSource for FileSceneSource<P>
where
    P: Fn(&[u8], &Path) -> Result<LoadedScene> + Send + Sync,
{
    fn load(&self, uri: &str) -> Result<LoadedScene> {
        let path = self.resolve(uri);
        if !path.exists() {
            return Err(StageError::SourceNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(&path)?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        (self.parser)(&bytes, &path)
    }
}
