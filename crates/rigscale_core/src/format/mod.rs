//! Scene file loading and saving.
//!
//! Formats are picked by file extension. Each format implements
//! [`SceneFormat`]; the free functions [`load_scene`] and [`save_scene`]
//! dispatch on the path.
//!
//! ## Supported Formats
//!
//! - `.json` - the scene model serialized with serde
//!
//! # Example
//!
//! ```ignore
//! use rigscale_core::format::{load_scene, save_scene};
//!
//! let scene = load_scene("character.json")?;
//! println!("Loaded {} nodes", scene.node_count());
//! save_scene(&scene, "character_out.json")?;
//! ```

mod json;

use std::path::Path;

use thiserror::Error;

use crate::scene::Scene;

pub use json::JsonFormat;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported scene format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid scene: {0}")]
    Invalid(String),
}

/// Errors that can occur while saving a scene.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unsupported scene format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for saving operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// A scene file format.
pub trait SceneFormat {
    /// File extensions (lowercase, without dot) handled by this format.
    fn extensions(&self) -> &[&str];

    fn load(&self, path: &Path) -> LoadResult<Scene>;

    fn save(&self, scene: &Scene, path: &Path) -> SaveResult<()>;
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Pick the format for a path by its extension.
pub fn format_for(path: &Path) -> Option<Box<dyn SceneFormat>> {
    let ext = extension(path);
    let formats: [Box<dyn SceneFormat>; 1] = [Box::new(JsonFormat)];
    formats.into_iter().find(|f| f.extensions().contains(&ext.as_str()))
}

/// Load a scene, picking the format from the file extension.
///
/// The loaded scene is validated before it is returned.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    let format = format_for(path).ok_or_else(|| LoadError::UnsupportedFormat(extension(path)))?;

    let mut scene = format.load(path)?;
    scene.validate().map_err(LoadError::Invalid)?;

    if scene.name.is_empty() {
        scene.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
    }

    log::info!(
        "Loaded scene '{}' ({} nodes, {} animation stacks) from {}",
        scene.name,
        scene.node_count(),
        scene.animation_stacks.len(),
        path.display()
    );
    Ok(scene)
}

/// Save a scene, picking the format from the file extension.
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> SaveResult<()> {
    let path = path.as_ref();
    let format = format_for(path).ok_or_else(|| SaveError::UnsupportedFormat(extension(path)))?;
    format.save(scene, path)?;
    log::info!("Saved scene '{}' to {}", scene.name, path.display());
    Ok(())
}
