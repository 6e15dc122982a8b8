//! JSON scene files.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::Deserializer;

use super::{LoadResult, SaveResult, SceneFormat};
use crate::scene::Scene;

/// The scene model as pretty-printed JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat;

impl JsonFormat {
    /// Parse a scene from a JSON string (useful for testing).
    pub fn parse(content: &str) -> LoadResult<Scene> {
        read_scene(Deserializer::from_str(content))
    }

    /// Serialize a scene to a JSON string.
    pub fn to_json(scene: &Scene) -> SaveResult<String> {
        Ok(serde_json::to_string_pretty(scene)?)
    }
}

impl SceneFormat for JsonFormat {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn load(&self, path: &Path) -> LoadResult<Scene> {
        let reader = BufReader::new(File::open(path)?);
        read_scene(Deserializer::from_reader(reader))
    }

    fn save(&self, scene: &Scene, path: &Path) -> SaveResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, scene)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Deserialize a whole document into a scene.
///
/// The node tree nests one JSON object per level, so the parser's recursion
/// limit is lifted; rig depth is bounded by the thread stack only.
fn read_scene<'de, R: serde_json::de::Read<'de>>(mut de: Deserializer<R>) -> LoadResult<Scene> {
    de.disable_recursion_limit();
    let scene = Scene::deserialize(&mut de)?;
    de.end()?;
    Ok(scene)
}
