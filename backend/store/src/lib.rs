//! # State Store
//!
//! Flat JSON files in a single state directory. Every read loads a whole file
//! and every write replaces a whole file, so there is no locking and the last
//! writer wins.
//!
//! Files:
//! - `state.nodes.json`: array of [`Node`](models::Node)
//! - `state.suggestions.json`: array of [`Suggestion`](models::Suggestion)
//! - `state.consents.json`: array of objects with a string `id`
//! - `events.log.jsonl`: one [`Event`](models::Event) per line
use std::{
    env,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Component, Path, PathBuf},
    process,
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{info, warn};

pub mod error;
pub mod models;
pub mod schema;
pub mod timestamp;

pub use error::StoreError;

pub const NODES_FILE: &str = "state.nodes.json";
pub const SUGGESTIONS_FILE: &str = "state.suggestions.json";
pub const CONSENTS_FILE: &str = "state.consents.json";
pub const EVENTS_FILE: &str = "events.log.jsonl";

pub const STATE_DIR_VAR: &str = "NR_STATE_DIR";
pub const ALLOW_INIT_VAR: &str = "NR_ALLOW_INIT_DIR";

/// Root of the state files, resolved once at startup and handed to whoever
/// needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(StoreError::StateDirUnset);
        }

        let root = normalize(&std::path::absolute(dir)?);
        Ok(Self { root })
    }

    pub fn from_env() -> Result<Self, StoreError> {
        match env::var(STATE_DIR_VAR) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Err(StoreError::StateDirUnset),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Checks the directory is usable, creating it only when `allow_init` is set.
    pub fn ensure(&self, allow_init: bool) -> Result<&Path, StoreError> {
        match fs::metadata(&self.root) {
            Ok(meta) if !meta.is_dir() => Err(StoreError::StateDirInaccessible {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            }),
            Ok(meta) if meta.permissions().readonly() => Err(StoreError::StateDirInaccessible {
                path: self.root.clone(),
                reason: "read-only".to_string(),
            }),
            Ok(_) => Ok(&self.root),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if !allow_init {
                    return Err(StoreError::StateDirMissing(self.root.clone()));
                }

                fs::create_dir_all(&self.root)?;
                info!("Created state directory {}", self.root.display());
                Ok(&self.root)
            }
            Err(e) => Err(StoreError::StateDirInaccessible {
                path: self.root.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Resolves `file_name` inside the state directory, refusing anything that
    /// escapes it.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        if file_name.is_empty() {
            return Err(StoreError::EmptyFileName);
        }

        let resolved = normalize(&self.root.join(file_name));
        if !resolved.starts_with(&self.root) {
            return Err(StoreError::PathEscape(file_name.to_string()));
        }

        Ok(resolved)
    }

    pub fn exists(&self, file_name: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(file_name)?.try_exists()?)
    }

    /// Reads a JSON document, falling back to `Value::Null` when the file is
    /// missing, empty or unreadable.
    pub fn read_json(&self, file_name: &str) -> Value {
        self.read_json_or(file_name, Value::Null)
    }

    pub fn read_json_or<T: DeserializeOwned>(&self, file_name: &str, fallback: T) -> T {
        let path = match self.resolve(file_name) {
            Ok(path) => path,
            Err(e) => {
                warn!("[store] Failed to read {file_name}: {e}");
                return fallback;
            }
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return fallback,
            Err(e) => {
                warn!("[store] Failed to read {file_name}: {e}");
                return fallback;
            }
        };

        if raw.trim().is_empty() {
            return fallback;
        }

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("[store] Failed to read {file_name}: {e}");
            fallback
        })
    }

    /// Number of entries in a JSON array file, zero for anything else.
    pub fn count_of(&self, file_name: &str) -> usize {
        match self.read_json(file_name) {
            Value::Array(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Writes pretty JSON to a temporary sibling, then renames it over the target.
    pub fn write_json_atomic<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        data: &T,
    ) -> Result<PathBuf, StoreError> {
        let path = self.resolve(file_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_string_pretty(data)?;
        let tmp_path = tmp_sibling(&path);

        if let Err(e) = fs::write(&tmp_path, payload).and_then(|_| fs::rename(&tmp_path, &path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(path)
    }

    pub fn append_json_line<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        entry: &T,
    ) -> Result<(), StoreError> {
        let path = self.resolve(file_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

/// Reads `NR_ALLOW_INIT_DIR`. Only the literal `true` enables it.
pub fn allow_init_from_env() -> bool {
    env::var(ALLOW_INIT_VAR).is_ok_and(|value| value == "true")
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".tmp-{}-{}", process::id(), Utc::now().timestamp_millis()));
    PathBuf::from(name)
}

// Lexical only, symlinks are not followed.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_resolve_stays_inside() {
        let tmp = tempdir().unwrap();
        let state = StateDir::new(tmp.path()).unwrap();

        assert_eq!(state.resolve(NODES_FILE).unwrap(), state.path().join(NODES_FILE));
        assert_eq!(
            state.resolve("nested/../events.log.jsonl").unwrap(),
            state.path().join(EVENTS_FILE)
        );
        assert!(matches!(
            state.resolve("../outside.json"),
            Err(StoreError::PathEscape(_))
        ));
        assert!(matches!(
            state.resolve("/etc/passwd"),
            Err(StoreError::PathEscape(_))
        ));
        assert!(matches!(state.resolve(""), Err(StoreError::EmptyFileName)));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(StateDir::new(""), Err(StoreError::StateDirUnset)));
    }

    #[test]
    fn test_ensure_missing_dir() {
        let tmp = tempdir().unwrap();
        let state = StateDir::new(tmp.path().join("state")).unwrap();

        assert!(matches!(state.ensure(false), Err(StoreError::StateDirMissing(_))));
        assert_eq!(state.ensure(true).unwrap(), state.path());
        assert!(state.path().is_dir());
        assert!(state.ensure(false).is_ok());
    }

    #[test]
    fn test_ensure_rejects_file() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, "x").unwrap();

        let state = StateDir::new(&file).unwrap();
        assert!(matches!(
            state.ensure(true),
            Err(StoreError::StateDirInaccessible { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let tmp = tempdir().unwrap();
        let state = StateDir::new(tmp.path()).unwrap();

        let written = state
            .write_json_atomic(SUGGESTIONS_FILE, &json!([{"id": "s1"}, {"id": "s2"}]))
            .unwrap();

        assert_eq!(written, state.path().join(SUGGESTIONS_FILE));
        assert_eq!(state.count_of(SUGGESTIONS_FILE), 2);
        assert_eq!(state.read_json(SUGGESTIONS_FILE), json!([{"id": "s1"}, {"id": "s2"}]));

        let raw = fs::read_to_string(&written).unwrap();
        assert!(raw.starts_with("[\n  {"));

        let leftovers: Vec<_> = fs::read_dir(state.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_read_fallbacks() {
        let tmp = tempdir().unwrap();
        let state = StateDir::new(tmp.path()).unwrap();

        assert_eq!(state.read_json(NODES_FILE), Value::Null);
        assert_eq!(state.count_of(NODES_FILE), 0);

        fs::write(state.path().join(NODES_FILE), "").unwrap();
        assert_eq!(state.read_json_or(NODES_FILE, json!([])), json!([]));

        fs::write(state.path().join(NODES_FILE), "{not json").unwrap();
        assert_eq!(state.read_json_or(NODES_FILE, json!([])), json!([]));

        fs::write(state.path().join(NODES_FILE), "{\"id\": 1}").unwrap();
        assert_eq!(state.count_of(NODES_FILE), 0);
    }

    #[test]
    fn test_append_json_line() {
        let tmp = tempdir().unwrap();
        let state = StateDir::new(tmp.path()).unwrap();

        state.append_json_line(EVENTS_FILE, &json!({"action": "one"})).unwrap();
        state.append_json_line(EVENTS_FILE, &json!({"action": "two"})).unwrap();

        let raw = fs::read_to_string(state.path().join(EVENTS_FILE)).unwrap();
        let lines: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines, vec![json!({"action": "one"}), json!({"action": "two"})]);
        assert!(state.exists(EVENTS_FILE).unwrap());
        assert!(!state.exists(NODES_FILE).unwrap());
    }
}
