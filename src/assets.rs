//! Where posters and fonts come from.

use crate::error::AssetError;
use crate::types::PosterId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Image extensions recognised as posters
pub const POSTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Body,
}

/// Supplies poster and font bytes. Lookups are expected to be quick and
/// bounded; callers run them off the async executor when rendering.
pub trait AssetStore: Send + Sync {
    fn list_posters(&self) -> Result<Vec<PosterId>, AssetError>;

    fn poster_bytes(&self, id: &str) -> Result<Vec<u8>, AssetError>;

    fn font_bytes(&self, role: FontRole) -> Result<Vec<u8>, AssetError>;
}

/// Assets laid out on disk as `<root>/posters/*` and `<root>/fonts/{title.otf,body.ttf}`
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn posters_dir(&self) -> PathBuf {
        self.root.join("posters")
    }

    fn fonts_dir(&self) -> PathBuf {
        self.root.join("fonts")
    }

    /// Create the poster and font directories if they are missing
    pub fn bootstrap(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.posters_dir())?;
        std::fs::create_dir_all(self.fonts_dir())?;
        Ok(())
    }

    pub fn font_path(&self, role: FontRole) -> PathBuf {
        match role {
            FontRole::Title => self.fonts_dir().join("title.otf"),
            FontRole::Body => self.fonts_dir().join("body.ttf"),
        }
    }
}

fn is_poster_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            POSTER_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Poster ids are bare file names; anything that could escape the poster
/// directory is refused.
fn validate_poster_id(id: &str) -> Result<(), AssetError> {
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(AssetError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn read_asset(path: PathBuf) -> Result<Vec<u8>, AssetError> {
    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AssetError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(AssetError::Io(e)),
    }
}

impl AssetStore for FsAssets {
    fn list_posters(&self) -> Result<Vec<PosterId>, AssetError> {
        let dir = self.posters_dir();
        if !dir.exists() {
            tracing::warn!("Posters directory not found at {}", dir.display());
            return Ok(Vec::new());
        }

        let mut posters = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_poster_file(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                posters.push(name.to_string());
            }
        }
        posters.sort();
        Ok(posters)
    }

    fn poster_bytes(&self, id: &str) -> Result<Vec<u8>, AssetError> {
        validate_poster_id(id)?;
        read_asset(self.posters_dir().join(id))
    }

    fn font_bytes(&self, role: FontRole) -> Result<Vec<u8>, AssetError> {
        read_asset(self.font_path(role))
    }
}

/// In-memory assets for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    posters: HashMap<PosterId, Vec<u8>>,
    fonts: HashMap<FontRole, Vec<u8>>,
}

impl MemoryAssets {
    pub fn add_poster(&mut self, id: &str, bytes: Vec<u8>) {
        self.posters.insert(id.to_string(), bytes);
    }

    pub fn set_font(&mut self, role: FontRole, bytes: Vec<u8>) {
        self.fonts.insert(role, bytes);
    }
}

impl AssetStore for MemoryAssets {
    fn list_posters(&self) -> Result<Vec<PosterId>, AssetError> {
        let mut posters: Vec<PosterId> = self.posters.keys().cloned().collect();
        posters.sort();
        Ok(posters)
    }

    fn poster_bytes(&self, id: &str) -> Result<Vec<u8>, AssetError> {
        self.posters
            .get(id)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(id.to_string()))
    }

    fn font_bytes(&self, role: FontRole) -> Result<Vec<u8>, AssetError> {
        self.fonts
            .get(&role)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(format!("{:?} font", role)))
    }
}
