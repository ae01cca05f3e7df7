//! Per-group enable/disable storage
//!
//! Persisted as a JSON object mapping the group ID (as a string) to a
//! boolean:
//! ```json
//! {"123456789012345678": true, "223456789012345678": false}
//! ```

use automod_core::{Error, GroupId, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory group settings backed by a JSON file
#[derive(Debug)]
pub struct GroupConfigStore {
    path: PathBuf,
    groups: RwLock<HashMap<GroupId, bool>>,
    /// Serializes file writes
    persist_lock: Mutex<()>,
}

impl GroupConfigStore {
    /// Load the store from `path`.
    ///
    /// A missing or unreadable file yields an empty store; startup never
    /// fails because of it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let groups = match read_groups(&path) {
            Ok(groups) => {
                info!(path = %path.display(), groups = groups.len(), "Loaded group configuration");
                groups
            }
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No group configuration file, starting empty");
                HashMap::new()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable group configuration"
                );
                HashMap::new()
            }
        };

        Self {
            path,
            groups: RwLock::new(groups),
            persist_lock: Mutex::new(()),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether moderation is enabled for `group`. Unknown groups are disabled.
    pub fn get(&self, group: GroupId) -> bool {
        self.groups.read().get(&group).copied().unwrap_or(false)
    }

    /// Enable or disable moderation for `group` and persist the change.
    ///
    /// The in-memory value is updated even if persisting fails.
    pub fn set(&self, group: GroupId, enabled: bool) -> Result<()> {
        self.groups.write().insert(group, enabled);
        debug!(group, enabled, "Group moderation setting changed");
        self.persist()
    }

    /// Copy of the current mapping
    pub fn snapshot(&self) -> HashMap<GroupId, bool> {
        self.groups.read().clone()
    }

    /// Write the current mapping to the backing file
    pub fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock();

        let serialized: BTreeMap<String, bool> = self
            .groups
            .read()
            .iter()
            .map(|(group, enabled)| (group.to_string(), *enabled))
            .collect();
        let json = serde_json::to_vec(&serialized)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::storage(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!(
            path = %self.path.display(),
            groups = serialized.len(),
            "Persisted group configuration"
        );
        Ok(())
    }
}

fn read_groups(path: &Path) -> Result<HashMap<GroupId, bool>> {
    let content = fs::read_to_string(path)?;
    let raw: BTreeMap<String, bool> = serde_json::from_str(&content)?;

    let mut groups = HashMap::with_capacity(raw.len());
    for (key, enabled) in raw {
        match key.trim().parse::<GroupId>() {
            Ok(group) => {
                groups.insert(group, enabled);
            }
            Err(_) => warn!(key = %key, "Skipping group configuration entry with non-numeric ID"),
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> GroupConfigStore {
        GroupConfigStore::load(dir.path().join("automod_guilds.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.snapshot().is_empty());
        assert!(!store.get(123));
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("automod_guilds.json");
        fs::write(&path, "{not json").unwrap();

        let store = GroupConfigStore::load(&path);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("automod_guilds.json");
        fs::write(&path, r#"{"1": "yes"}"#).unwrap();

        assert!(GroupConfigStore::load(&path).snapshot().is_empty());
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(111, true).unwrap();
        store.set(222, false).unwrap();
        assert!(store.get(111));
        assert!(!store.get(222));

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.snapshot(), store.snapshot());

        let on_disk: BTreeMap<String, bool> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk.get("111"), Some(&true));
        assert_eq!(on_disk.get("222"), Some(&false));
    }

    #[test]
    fn test_toggle_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(7, true).unwrap();
        store.set(7, false).unwrap();

        assert!(!store_in(&dir).get(7));
    }

    #[test]
    fn test_non_numeric_keys_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("automod_guilds.json");
        fs::write(&path, r#"{"42": true, "general": true}"#).unwrap();

        let store = GroupConfigStore::load(&path);
        assert_eq!(store.snapshot().len(), 1);
        assert!(store.get(42));
    }

    #[test]
    fn test_persist_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = GroupConfigStore::load(dir.path().join("state").join("guilds.json"));

        store.set(1, true).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_failed_replace_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guilds.json");
        // A non-empty directory cannot be replaced by a file
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let store = GroupConfigStore::load(&path);
        let err = store.set(9, true).unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(store.get(9));
        assert!(!path.with_extension("tmp").exists());
    }
}
