//! Per-user grid display preferences
//!
//! The grid reads preferences once, when it is built, through a
//! [`PreferencesStore`]. It never writes them back itself; changes are
//! reported through the grid's preferences callback and the caller decides
//! whether to save.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Identifies one stored preferences value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesKey {
    /// Table identifier, e.g. "loans"
    pub id: String,
    /// Screen or feature the table lives in
    pub scope: String,
    pub user_key: Option<String>,
    pub org_key: Option<String>,
    /// Bumped when the stored shape changes; old values are not read
    pub version: u32,
}

impl PreferencesKey {
    pub fn new(scope: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: scope.into(),
            user_key: None,
            org_key: None,
            version: 1,
        }
    }

    pub fn user(mut self, user_key: impl Into<String>) -> Self {
        self.user_key = Some(user_key.into());
        self
    }

    pub fn org(mut self, org_key: impl Into<String>) -> Self {
        self.org_key = Some(org_key.into());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Deterministic string form, e.g. `grid:admin:loans:user-1:org-9:v2`
    pub fn storage_key(&self) -> String {
        format!(
            "grid:{}:{}:{}:{}:v{}",
            self.scope,
            self.id,
            self.user_key.as_deref().unwrap_or("-"),
            self.org_key.as_deref().unwrap_or("-"),
            self.version
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreference {
    pub page_size: usize,
}

/// The stored preferences value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PagePreference>,
    /// `{column_id: visible}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_visibility: Option<BTreeMap<String, bool>>,
}

/// Load/save contract for grid preferences
pub trait PreferencesStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`
    fn load(&self, key: &PreferencesKey) -> Result<Option<GridPreferences>>;

    fn save(&self, key: &PreferencesKey, preferences: &GridPreferences) -> Result<()>;
}

/// Process-local store, mostly useful in tests
#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    entries: Mutex<HashMap<String, GridPreferences>>,
}

impl MemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl PreferencesStore for MemoryPreferencesStore {
    fn load(&self, key: &PreferencesKey) -> Result<Option<GridPreferences>> {
        Ok(self.entries.lock().get(&key.storage_key()).cloned())
    }

    fn save(&self, key: &PreferencesKey, preferences: &GridPreferences) -> Result<()> {
        self.entries
            .lock()
            .insert(key.storage_key(), preferences.clone());
        Ok(())
    }
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct JsonFilePreferencesStore {
    dir: PathBuf,
}

impl JsonFilePreferencesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn in_default_dir() -> Result<Self> {
        Ok(Self::new(default_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &PreferencesKey) -> PathBuf {
        let file_name: String = key
            .storage_key()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl PreferencesStore for JsonFilePreferencesStore {
    fn load(&self, key: &PreferencesKey) -> Result<Option<GridPreferences>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preferences from {:?}", path))?;
        let preferences = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences in {:?}", path))?;
        Ok(Some(preferences))
    }

    fn save(&self, key: &PreferencesKey, preferences: &GridPreferences) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {:?}", self.dir))?;
        let path = self.path_for(key);
        let content = serde_json::to_string_pretty(preferences)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences to {:?}", path))?;
        tracing::debug!(path = %path.display(), "Saved grid preferences");
        Ok(())
    }
}

/// `<data dir>/backoffice/grid-preferences`
pub fn default_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join("backoffice").join("grid-preferences"))
        .context("Could not find data directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PreferencesKey {
        PreferencesKey::new("admin", "loans").user("u-1").version(2)
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(key().storage_key(), "grid:admin:loans:u-1:-:v2");
        assert_ne!(key().storage_key(), key().version(3).storage_key());
    }

    #[test]
    fn test_preferences_json_shape() {
        let prefs = GridPreferences {
            pagination: Some(PagePreference { page_size: 25 }),
            column_visibility: Some(BTreeMap::from([("amount".to_string(), false)])),
        };
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pagination": {"pageSize": 25},
                "columnVisibility": {"amount": false}
            })
        );

        let empty: GridPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, GridPreferences::default());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferencesStore::new();
        assert!(store.load(&key()).unwrap().is_none());

        let prefs = GridPreferences {
            pagination: Some(PagePreference { page_size: 50 }),
            column_visibility: None,
        };
        store.save(&key(), &prefs).unwrap();
        assert_eq!(store.load(&key()).unwrap(), Some(prefs));
        assert!(store.load(&key().version(3)).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_path_is_file_system_safe() {
        let store = JsonFilePreferencesStore::new("/tmp/prefs");
        let path = store.path_for(&key());
        assert_eq!(
            path,
            PathBuf::from("/tmp/prefs/grid_admin_loans_u-1_-_v2.json")
        );
    }
}
