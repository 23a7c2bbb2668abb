//! Named color and background presets.
//!
//! Custom presets live in a durable key-value store, one JSON array per
//! namespace. Any storage failure degrades to "no presets" with a warning;
//! callers never see an error from [`PresetStore`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ChartError, ChartResult};

/// Durable string key-value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn get(&self, key: &str) -> ChartResult<Option<String>>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn set(&self, key: &str, value: &str) -> ChartResult<()>;
}

/// In-memory storage, used when no data directory is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> ChartResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| ChartError::Storage("lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ChartResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ChartError::Storage("lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> ChartResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> ChartResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ChartResult<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// A persisted preset kind.
pub trait Preset: Clone + Serialize + DeserializeOwned {
    /// Storage key for this kind.
    const NAMESPACE: &'static str;

    /// Preset id.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Stamp a fresh id and creation time.
    fn assign_identity(&mut self, id: String, created_at: u64);
}

/// Header/row/text colors saved under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPreset {
    /// Preset id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Header fill.
    pub header_color: String,
    /// Odd row tint.
    pub row_color: String,
    /// Text color.
    pub text_color: String,
    /// Creation time (ms since epoch); 0 for built-ins.
    #[serde(default)]
    pub created_at: u64,
}

impl ColorPreset {
    /// Unsaved preset with the given name and colors.
    #[must_use]
    pub fn new(name: &str, header: &str, row: &str, text: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            header_color: header.to_string(),
            row_color: row.to_string(),
            text_color: text.to_string(),
            created_at: 0,
        }
    }

    /// Presets shipped with the application.
    #[must_use]
    pub fn builtin() -> Vec<ColorPreset> {
        [
            ("classic", "Classic", "#000000", "#f3f4f6", "#000000"),
            ("ocean", "Ocean", "#0ea5e9", "#e0f2fe", "#0c4a6e"),
            ("forest", "Forest", "#16a34a", "#dcfce7", "#14532d"),
            ("sunset", "Sunset", "#f97316", "#fed7aa", "#7c2d12"),
            ("royal", "Royal", "#7c3aed", "#ede9fe", "#4c1d95"),
            ("rose", "Rose", "#e11d48", "#ffe4e6", "#831843"),
            ("midnight", "Midnight", "#1e293b", "#e2e8f0", "#0f172a"),
            ("gold", "Gold", "#d97706", "#fef3c7", "#78350f"),
        ]
        .into_iter()
        .map(|(id, name, header, row, text)| ColorPreset {
            id: id.to_string(),
            ..ColorPreset::new(name, header, row, text)
        })
        .collect()
    }
}

impl Preset for ColorPreset {
    const NAMESPACE: &'static str = "customColorPresets";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_identity(&mut self, id: String, created_at: u64) {
        self.id = id;
        self.created_at = created_at;
    }
}

/// A background image, optionally bundled with colors and a table scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPreset {
    /// Preset id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Background image reference.
    #[serde(alias = "path")]
    pub background_path: String,
    /// Header fill.
    #[serde(default)]
    pub header_color: Option<String>,
    /// Odd row tint.
    #[serde(default)]
    pub row_color: Option<String>,
    /// Text color.
    #[serde(default)]
    pub text_color: Option<String>,
    /// Table scale.
    #[serde(default)]
    pub scale: Option<f32>,
    /// Creation time (ms since epoch); 0 for built-ins.
    #[serde(default)]
    pub created_at: u64,
}

impl BackgroundPreset {
    /// Background-only preset.
    #[must_use]
    pub fn new(name: &str, background_path: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            background_path: background_path.to_string(),
            header_color: None,
            row_color: None,
            text_color: None,
            scale: None,
            created_at: 0,
        }
    }

    /// Backgrounds shipped with the application.
    #[must_use]
    pub fn builtin() -> Vec<BackgroundPreset> {
        [
            ("blank-white", "White", "/backgrounds/white-solid.jpg"),
            ("gmax", "G-Max", "/backgrounds/G-max.jpg"),
            ("gmax-kids", "G-Max Kids", "/backgrounds/Gmax%20Kids.jpg"),
            ("gmax-kids-2", "Kids 2", "/backgrounds/Gmax%20Kid%202.jpg"),
        ]
        .into_iter()
        .map(|(id, name, path)| BackgroundPreset {
            id: id.to_string(),
            ..BackgroundPreset::new(name, path)
        })
        .collect()
    }
}

impl Preset for BackgroundPreset {
    const NAMESPACE: &'static str = "backgroundPresets";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_identity(&mut self, id: String, created_at: u64) {
        self.id = id;
        self.created_at = created_at;
    }
}

/// List/save/delete for custom presets, namespaced per preset kind.
#[derive(Clone)]
pub struct PresetStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for PresetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetStore").finish_non_exhaustive()
    }
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl PresetStore {
    /// Store over any storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Non-durable store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Store backed by JSON files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> ChartResult<Self> {
        Ok(Self::new(Arc::new(FileStorage::new(dir)?)))
    }

    /// Saved presets of one kind, oldest first. Empty on any failure.
    #[must_use]
    pub fn list<P: Preset>(&self) -> Vec<P> {
        match self.read::<P>() {
            Ok(presets) => presets,
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}", P::NAMESPACE);
                Vec::new()
            }
        }
    }

    /// Save a preset under a fresh id. Returns `None` if the name is blank
    /// or storage failed.
    pub fn save<P: Preset>(&self, mut preset: P) -> Option<P> {
        if preset.name().trim().is_empty() {
            tracing::debug!("Rejecting preset with empty name");
            return None;
        }
        preset.assign_identity(Uuid::new_v4().to_string(), current_timestamp_ms());

        let mut presets = self.list::<P>();
        presets.push(preset.clone());
        match self.write(&presets) {
            Ok(()) => Some(preset),
            Err(e) => {
                tracing::warn!("Failed to save {}: {e}", P::NAMESPACE);
                None
            }
        }
    }

    /// Delete a preset by id. Returns `false` on storage failure.
    pub fn delete<P: Preset>(&self, id: &str) -> bool {
        let presets: Vec<P> = self.list::<P>().into_iter().filter(|p| p.id() != id).collect();
        match self.write(&presets) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to delete from {}: {e}", P::NAMESPACE);
                false
            }
        }
    }

    fn read<P: Preset>(&self) -> ChartResult<Vec<P>> {
        match self.storage.get(P::NAMESPACE)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn write<P: Preset>(&self, presets: &[P]) -> ChartResult<()> {
        let json = serde_json::to_string_pretty(presets)?;
        self.storage.set(P::NAMESPACE, &json)
    }
}

/// Replace anything that is not alphanumeric, `-` or `_` with `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> ChartResult<Option<String>> {
            Err(ChartError::Storage("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> ChartResult<()> {
            Err(ChartError::Storage("unavailable".to_string()))
        }
    }

    #[test]
    fn test_save_list_delete() {
        let store = PresetStore::in_memory();
        let saved = store
            .save(ColorPreset::new("Mine", "#111111", "#222222", "#333333"))
            .expect("saved");
        assert!(!saved.id.is_empty());
        assert!(saved.created_at > 0);

        let listed = store.list::<ColorPreset>();
        assert_eq!(listed, vec![saved.clone()]);
        assert!(store.list::<BackgroundPreset>().is_empty());

        assert!(store.delete::<ColorPreset>(&saved.id));
        assert!(store.list::<ColorPreset>().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let store = PresetStore::in_memory();
        assert!(store.save(ColorPreset::new("  ", "#0", "#0", "#0")).is_none());
        assert!(store.list::<ColorPreset>().is_empty());
    }

    #[test]
    fn test_broken_storage_degrades() {
        let store = PresetStore::new(Arc::new(BrokenStorage));
        assert!(store.list::<ColorPreset>().is_empty());
        assert!(store.save(BackgroundPreset::new("bg", "/a.jpg")).is_none());
        assert!(!store.delete::<ColorPreset>("x"));
    }

    #[test]
    fn test_corrupt_json_degrades() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(ColorPreset::NAMESPACE, "{not json")
            .expect("set");
        let store = PresetStore::new(storage);
        assert!(store.list::<ColorPreset>().is_empty());
    }

    #[test]
    fn test_builtin_presets() {
        let colors = ColorPreset::builtin();
        assert_eq!(colors.len(), 8);
        assert_eq!(colors[1].name, "Ocean");
        assert_eq!(colors[1].header_color, "#0ea5e9");
        assert_eq!(BackgroundPreset::builtin()[0].background_path, "/backgrounds/white-solid.jpg");
    }

    #[test]
    fn test_background_preset_accepts_path_alias() {
        let json = r#"[{"id":"a","name":"A","path":"/bg.jpg"}]"#;
        let parsed: Vec<BackgroundPreset> = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed[0].background_path, "/bg.jpg");
        assert!(parsed[0].header_color.is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("a/b c"), "a_b_c");
    }
}
