//! JSON file storage for the reminder collection.
//!
//! Active reminders live in `reminders.json`, completed ones are appended
//! to `archive.json`. Every operation works on the full collection and
//! holds an advisory lock file for its whole read-modify-write, so the
//! webhook process and the scheduler daemon never interleave partial
//! updates. Readers always see a complete snapshot.

use anyhow::{anyhow, Context, Result};
use log::{debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::features::reminders::Reminder;

/// Name of the active collection file
const REMINDERS_FILE: &str = "reminders.json";

/// Name of the append-only archive file
const ARCHIVE_FILE: &str = "archive.json";

/// Name of the advisory lock file
const LOCK_FILE: &str = "reminders.lock";

/// How long to keep retrying the lock before giving up
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A lock file older than this is treated as left behind by a dead
/// process and broken
const LOCK_STALE_AFTER: Duration = Duration::from_secs(10);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// File-backed reminder storage rooted at the data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Storage {
            data_dir: data_dir.into(),
        }
    }

    fn reminders_path(&self) -> PathBuf {
        self.data_dir.join(REMINDERS_FILE)
    }

    fn archive_path(&self) -> PathBuf {
        self.data_dir.join(ARCHIVE_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    /// Load the full active collection. A missing file is an empty
    /// collection; I/O and parse faults are errors the caller treats as
    /// cycle-level failures.
    pub fn load(&self) -> Result<Vec<Reminder>> {
        let _lock = self.acquire_lock()?;
        self.read_reminders()
    }

    /// Replace the active collection with a full snapshot.
    pub fn save(&self, reminders: &[Reminder]) -> Result<()> {
        let _lock = self.acquire_lock()?;
        self.write_reminders(reminders)
    }

    /// Append a newly registered reminder to the active collection.
    pub fn add(&self, reminder: Reminder) -> Result<()> {
        let _lock = self.acquire_lock()?;
        let mut reminders = self.read_reminders()?;
        reminders.push(reminder);
        self.write_reminders(&reminders)
    }

    /// Remove one reminder by ID. Returns whether anything was removed.
    pub fn delete_by_id(&self, id: &str) -> Result<bool> {
        let _lock = self.acquire_lock()?;
        let mut reminders = self.read_reminders()?;
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.write_reminders(&reminders)?;
        Ok(true)
    }

    /// Remove all of a user's reminders. Returns how many were removed.
    pub fn delete_all_for_user(&self, user_id: &str) -> Result<usize> {
        let _lock = self.acquire_lock()?;
        let mut reminders = self.read_reminders()?;
        let before = reminders.len();
        reminders.retain(|r| r.user_id != user_id);
        let removed = before - reminders.len();
        if removed > 0 {
            self.write_reminders(&reminders)?;
        }
        Ok(removed)
    }

    /// Append completed reminders to the archive, stamping each with
    /// `archived_at`.
    pub fn append_to_archive(&self, completed: Vec<Reminder>, archived_at: &str) -> Result<()> {
        if completed.is_empty() {
            return Ok(());
        }

        let _lock = self.acquire_lock()?;
        let mut archive = self.read_archive()?;
        for mut reminder in completed {
            reminder.archived_at = Some(archived_at.to_string());
            archive.push(reminder);
        }
        self.write_json(&self.archive_path(), &archive)
    }

    /// Everything ever archived, oldest first.
    pub fn load_archive(&self) -> Result<Vec<Reminder>> {
        let _lock = self.acquire_lock()?;
        self.read_archive()
    }

    // ---- unlocked primitives ----

    fn read_reminders(&self) -> Result<Vec<Reminder>> {
        self.read_json(&self.reminders_path())
    }

    fn write_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        self.write_json(&self.reminders_path(), &reminders)
    }

    fn read_archive(&self) -> Result<Vec<Reminder>> {
        self.read_json(&self.archive_path())
    }

    fn read_json(&self, path: &Path) -> Result<Vec<Reminder>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
    }

    fn write_json(&self, path: &Path, reminders: &impl serde::Serialize) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        let json = serde_json::to_string_pretty(reminders)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    // ---- advisory locking ----

    fn acquire_lock(&self) -> Result<LockGuard> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        let path = self.lock_path();
        let deadline = SystemTime::now() + LOCK_TIMEOUT;

        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => return Ok(LockGuard { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    self.break_stale_lock(&path);
                }
                Err(e) => {
                    return Err(anyhow!("failed to create lock {}: {e}", path.display()));
                }
            }

            if SystemTime::now() >= deadline {
                return Err(anyhow!(
                    "timed out waiting for storage lock {}",
                    path.display()
                ));
            }
            std::thread::sleep(LOCK_RETRY_INTERVAL);
        }
    }

    fn break_stale_lock(&self, path: &Path) {
        let age = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok());

        if let Some(age) = age {
            if age > LOCK_STALE_AFTER {
                warn!(
                    "Breaking stale storage lock {} (held {}s)",
                    path.display(),
                    age.as_secs()
                );
                if let Err(e) = fs::remove_file(path) {
                    error!("Failed to remove stale lock {}: {e}", path.display());
                }
            }
        }
    }
}

struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            error!("Failed to release storage lock {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::ReminderStatus;
    use crate::features::schedule::Schedule;
    use tempfile::TempDir;

    fn reminder(id: &str, user_id: &str) -> Reminder {
        Reminder {
            id: id.to_string(),
            user_id: user_id.to_string(),
            text: "テスト".to_string(),
            schedule: Schedule::Once {
                run_at: "2025-05-03T14:00:00+09:00".to_string(),
            },
            next_run_at: Some("2025-05-03T14:00:00+09:00".to_string()),
            created_at: "2025-01-01T10:00:00+09:00".to_string(),
            status: ReminderStatus::Pending,
            archived_at: None,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        assert!(storage.load().unwrap().is_empty());
        assert!(storage.load_archive().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        let reminders = vec![reminder("a", "U1"), reminder("b", "U2")];
        storage.save(&reminders).unwrap();
        assert_eq!(storage.load().unwrap(), reminders);
    }

    #[test]
    fn test_add_appends() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        storage.add(reminder("a", "U1")).unwrap();
        storage.add(reminder("b", "U1")).unwrap();

        let ids: Vec<String> = storage.load().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        fs::write(dir.path().join(REMINDERS_FILE), "{not json").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_delete_by_id() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage
            .save(&[reminder("a", "U1"), reminder("b", "U1")])
            .unwrap();

        assert!(storage.delete_by_id("a").unwrap());
        assert!(!storage.delete_by_id("a").unwrap());
        let ids: Vec<String> = storage.load().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_delete_all_for_user() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage
            .save(&[reminder("a", "U1"), reminder("b", "U1"), reminder("c", "U2")])
            .unwrap();

        assert_eq!(storage.delete_all_for_user("U1").unwrap(), 2);
        assert_eq!(storage.delete_all_for_user("U1").unwrap(), 0);
        let ids: Vec<String> = storage.load().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_archive_append_stamps_and_accumulates() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        storage
            .append_to_archive(vec![reminder("a", "U1")], "2025-01-01T12:00:00+09:00")
            .unwrap();
        storage
            .append_to_archive(vec![reminder("b", "U1")], "2025-01-02T12:00:00+09:00")
            .unwrap();

        let archive = storage.load_archive().unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(
            archive[0].archived_at.as_deref(),
            Some("2025-01-01T12:00:00+09:00")
        );
        assert_eq!(
            archive[1].archived_at.as_deref(),
            Some("2025-01-02T12:00:00+09:00")
        );
    }

    #[test]
    fn test_archive_append_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage.append_to_archive(Vec::new(), "now").unwrap();
        assert!(!dir.path().join(ARCHIVE_FILE).exists());
    }

    #[test]
    fn test_lock_released_after_operation() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage.save(&[reminder("a", "U1")]).unwrap();
        assert!(!dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn test_stale_lock_is_broken() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        // A leftover lock from a dead process, backdated past the stale
        // threshold via its mtime
        let lock = dir.path().join(LOCK_FILE);
        fs::write(&lock, "").unwrap();
        let old = SystemTime::now() - Duration::from_secs(60);
        let file = fs::File::options().write(true).open(&lock).unwrap();
        file.set_modified(old).unwrap();
        drop(file);

        storage.save(&[reminder("a", "U1")]).unwrap();
        assert_eq!(storage.load().unwrap().len(), 1);
    }
}
