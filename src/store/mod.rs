//! Shortcut store: named command blocks kept in one JSON file.
//!
//! The file holds a pretty-printed array of records:
//!
//! ```text
//! [
//!   {
//!     "id": "…",
//!     "name": "Build",
//!     "description": "",
//!     "commands": "cd app\nmake",
//!     "workingDir": "/home/me/src",
//!     "createdAt": "2025-01-01T00:00:00Z"
//!   }
//! ]
//! ```
//!
//! All I/O goes through `ctx.fs`, so the store works with live, recording
//! and replaying adapters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::context::ServiceContext;

/// A saved command block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    /// Unique id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Command block, one command per line.
    pub commands: String,
    /// Directory the block starts in.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    pub working_dir: Option<PathBuf>,
    /// When it was saved.
    pub created_at: DateTime<Utc>,
}

/// Input for [`ShortcutStore::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewShortcut {
    /// Display name; must not be blank.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Command block; must not be blank.
    pub commands: String,
    /// Directory the block starts in.
    pub working_dir: Option<PathBuf>,
}

/// Older files carry numeric millisecond ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Older files write `""` when no directory was chosen.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let dir = Option::<String>::deserialize(deserializer)?;
    Ok(dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from))
}

/// Reads and writes the shortcut file.
pub struct ShortcutStore<'a> {
    ctx: &'a ServiceContext,
    path: PathBuf,
}

impl<'a> ShortcutStore<'a> {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, path: &Path) -> Self {
        Self { ctx, path: path.to_path_buf() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a shortcut and rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or commands are blank, the existing file
    /// cannot be read or parsed, or the file cannot be written.
    pub fn save(&self, new: NewShortcut) -> Result<Shortcut, String> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err("Shortcut name must not be empty".to_string());
        }
        if new.commands.trim().is_empty() {
            return Err("Shortcut commands must not be empty".to_string());
        }

        let mut shortcuts = self.load()?;
        let shortcut = Shortcut {
            id: self.ctx.id_gen.generate_id(),
            name: name.to_string(),
            description: new.description.trim().to_string(),
            commands: new.commands,
            working_dir: new.working_dir.filter(|d| !d.as_os_str().is_empty()),
            created_at: self.ctx.clock.now(),
        };
        shortcuts.push(shortcut.clone());
        self.write_all(&shortcuts)?;
        debug!("saved shortcut {} ({})", shortcut.id, shortcut.name);
        Ok(shortcut)
    }

    /// Every saved shortcut, oldest first.
    ///
    /// A missing file is empty. An unreadable or corrupt file is logged and
    /// treated as empty.
    #[must_use]
    pub fn list(&self) -> Vec<Shortcut> {
        self.load().unwrap_or_else(|e| {
            warn!("{e}");
            Vec::new()
        })
    }

    /// Removes every shortcut with `id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn delete(&self, id: &str) -> Result<bool, String> {
        if !self.ctx.fs.exists(&self.path) {
            return Ok(false);
        }
        let mut shortcuts = self.load()?;
        let before = shortcuts.len();
        shortcuts.retain(|s| s.id != id);
        if shortcuts.len() == before {
            return Ok(false);
        }
        self.write_all(&shortcuts)?;
        debug!("deleted shortcut {id}");
        Ok(true)
    }

    /// Looks a shortcut up by id, then by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn find(&self, key: &str) -> Result<Option<Shortcut>, String> {
        let shortcuts = self.load()?;
        let by_id = shortcuts.iter().position(|s| s.id == key);
        let index = by_id.or_else(|| shortcuts.iter().position(|s| s.name == key));
        Ok(index.map(|i| shortcuts[i].clone()))
    }

    fn load(&self) -> Result<Vec<Shortcut>, String> {
        if !self.ctx.fs.exists(&self.path) {
            return Ok(Vec::new());
        }
        let contents = self
            .ctx
            .fs
            .read_to_string(&self.path)
            .map_err(|e| format!("Failed to read shortcuts {}: {e}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse shortcuts {}: {e}", self.path.display()))
    }

    fn write_all(&self, shortcuts: &[Shortcut]) -> Result<(), String> {
        let json = serde_json::to_string_pretty(shortcuts)
            .map_err(|e| format!("Failed to serialize shortcuts: {e}"))?;
        self.ctx
            .fs
            .write(&self.path, &json)
            .map_err(|e| format!("Failed to write shortcuts {}: {e}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Clock, FileSystem, IdGenerator};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory filesystem shared with the test through an `Arc`.
    #[derive(Clone, Default)]
    struct MemFs {
        files: Arc<Mutex<HashMap<PathBuf, String>>>,
    }

    impl MemFs {
        fn with_file(path: &str, contents: &str) -> Self {
            let fs = Self::default();
            fs.files.lock().unwrap().insert(PathBuf::from(path), contents.to_string());
            fs
        }

        fn get(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }
    }

    impl FileSystem for MemFs {
        fn read_to_string(
            &self,
            path: &Path,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| format!("file not found: {}", path.display()).into())
        }

        fn write(
            &self,
            path: &Path,
            contents: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
        }
    }

    #[derive(Default)]
    struct SeqIds(AtomicUsize);

    impl IdGenerator for SeqIds {
        fn generate_id(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn make_test_context(fs: MemFs) -> ServiceContext {
        use crate::cassette::config::CassetteConfig;
        // Start from panicking defaults, then replace what the store touches.
        let mut ctx = ServiceContext::replaying_from(&CassetteConfig::default())
            .expect("empty config should always load");
        ctx.fs = Box::new(fs);
        ctx.clock = Box::new(FixedClock);
        ctx.id_gen = Box::new(SeqIds::default());
        ctx
    }

    fn build(name: &str) -> NewShortcut {
        NewShortcut {
            name: name.to_string(),
            description: "builds it".to_string(),
            commands: "cd app\nmake".to_string(),
            working_dir: Some(PathBuf::from("/src")),
        }
    }

    const PATH: &str = "/home/me/.execute-scripter-shortcuts.json";

    #[test]
    fn save_then_list() {
        let fs = MemFs::default();
        let ctx = make_test_context(fs.clone());
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        let saved = store.save(build("Build")).unwrap();
        store.save(build("Deploy")).unwrap();

        assert_eq!(saved.id, "id-1");
        assert_eq!(saved.created_at.to_rfc3339(), "2025-03-01T12:00:00+00:00");
        let names: Vec<_> = store.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Build", "Deploy"]);

        let raw = fs.get(PATH).unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains("\"workingDir\": \"/src\""));
        assert!(raw.contains("\"createdAt\": \"2025-03-01T12:00:00Z\""));
    }

    #[test]
    fn blank_name_or_commands_are_rejected() {
        let fs = MemFs::default();
        let ctx = make_test_context(fs.clone());
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        let err = store.save(NewShortcut { name: "  ".into(), ..build("x") }).unwrap_err();
        assert!(err.contains("name"));
        let err = store.save(NewShortcut { commands: "\n \n".into(), ..build("x") }).unwrap_err();
        assert!(err.contains("commands"));
        assert!(fs.get(PATH).is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let ctx = make_test_context(MemFs::default());
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        assert!(store.list().is_empty());
        assert_eq!(store.delete("id-1"), Ok(false));
        assert_eq!(store.find("Build"), Ok(None));
    }

    #[test]
    fn corrupt_file_lists_empty_and_is_not_overwritten() {
        let fs = MemFs::with_file(PATH, "{ not json");
        let ctx = make_test_context(fs.clone());
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        assert!(store.list().is_empty());
        assert!(store.save(build("Build")).unwrap_err().starts_with("Failed to parse"));
        assert_eq!(fs.get(PATH).as_deref(), Some("{ not json"));
    }

    #[test]
    fn delete_removes_only_matching_id() {
        let fs = MemFs::default();
        let ctx = make_test_context(fs);
        let store = ShortcutStore::new(&ctx, Path::new(PATH));
        store.save(build("Build")).unwrap();
        store.save(build("Deploy")).unwrap();

        assert_eq!(store.delete("id-1"), Ok(true));
        assert_eq!(store.delete("id-1"), Ok(false));
        let ids: Vec<_> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["id-2"]);
    }

    #[test]
    fn find_prefers_id_over_name() {
        let fs = MemFs::default();
        let ctx = make_test_context(fs);
        let store = ShortcutStore::new(&ctx, Path::new(PATH));
        store.save(build("id-2")).unwrap();
        store.save(build("Deploy")).unwrap();

        assert_eq!(store.find("id-2").unwrap().unwrap().name, "Deploy");
        assert_eq!(store.find("Deploy").unwrap().unwrap().id, "id-2");
        assert_eq!(store.find("id-1").unwrap().unwrap().name, "id-2");
        assert!(store.find("nothing").unwrap().is_none());
    }

    #[test]
    fn reads_legacy_empty_working_dir() {
        let legacy = r#"[{"id": "a", "name": "here", "description": "", "commands": "ls",
            "workingDir": "", "createdAt": "2023-11-14T22:13:20.000Z"},
            {"id": "b", "name": "null", "description": "", "commands": "ls",
            "workingDir": null, "createdAt": "2023-11-14T22:13:20.000Z"}]"#;
        let ctx = make_test_context(MemFs::with_file(PATH, legacy));
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        let shortcuts = store.list();
        assert_eq!(shortcuts.len(), 2);
        assert!(shortcuts.iter().all(|s| s.working_dir.is_none()));
    }

    #[test]
    fn empty_working_dir_is_not_saved() {
        let fs = MemFs::default();
        let ctx = make_test_context(fs.clone());
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        let saved =
            store.save(NewShortcut { working_dir: Some(PathBuf::new()), ..build("Build") }).unwrap();
        assert_eq!(saved.working_dir, None);
        assert!(!fs.get(PATH).unwrap().contains("workingDir"));
    }

    #[test]
    fn reads_legacy_numeric_ids() {
        let legacy = r#"[{"id": 1700000000000, "name": "old", "description": "",
            "commands": "ls", "createdAt": "2023-11-14T22:13:20.000Z"}]"#;
        let ctx = make_test_context(MemFs::with_file(PATH, legacy));
        let store = ShortcutStore::new(&ctx, Path::new(PATH));

        let shortcuts = store.list();
        assert_eq!(shortcuts[0].id, "1700000000000");
        assert_eq!(shortcuts[0].working_dir, None);
        assert!(store.delete("1700000000000").unwrap());
    }
}
