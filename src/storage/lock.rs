//! Per-ticket lock files
//!
//! A lock is a file created with `create_new`, so exactly one writer across
//! threads and processes holds it at a time. It is removed on drop. Locks
//! older than the configured staleness threshold are assumed abandoned and
//! broken by whichever waiter holds the ticket's `.break` guard file.

use crate::config::StorageConfig;
use crate::core::TicketId;
use crate::error::{HelpdeskError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    pub fn acquire(path: PathBuf, id: &TicketId, settings: &StorageConfig) -> Result<Self> {
        for attempt in 0..=settings.lock_retries {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let lock = Self { path };
                    writeln!(file, "{}", std::process::id())?;
                    tracing::debug!(ticket = %id.short(), attempt, "Acquired ticket lock");
                    return Ok(lock);
                },
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path, settings.stale_after())
                        && break_stale(&path, id, settings.stale_after())
                    {
                        continue;
                    }
                    thread::sleep(settings.retry_delay());
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(HelpdeskError::LockTimeout { id: id.to_string() })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {e}", self.path.display());
        }
    }
}

fn is_stale(path: &Path, threshold: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > threshold)
}

/// Remove a lock that looked stale, under a `.break` guard file.
///
/// Only the guard holder deletes the lock, and it checks the age again
/// first, so a lock created after another waiter broke the old one is
/// never removed. Returns `true` when acquisition should be retried at once.
fn break_stale(path: &Path, id: &TicketId, threshold: Duration) -> bool {
    let guard_path = path.with_extension("lock.break");
    let _guard = match OpenOptions::new().write(true).create_new(true).open(&guard_path) {
        Ok(_) => FileLock { path: guard_path },
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // A breaker crashed while holding the guard
            if is_stale(&guard_path, threshold) {
                remove_logged(&guard_path);
            }
            return false;
        },
        Err(e) => {
            tracing::warn!(ticket = %id.short(), "Failed to create lock guard {}: {e}", guard_path.display());
            return false;
        },
    };

    if is_stale(path, threshold) {
        tracing::warn!(ticket = %id.short(), "Removing stale ticket lock");
        remove_logged(path);
    }
    true
}

fn remove_logged(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove stale lock {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn fast_settings() -> StorageConfig {
        StorageConfig {
            lock_retries: 2,
            lock_retry_delay_ms: 1,
            stale_lock_secs: 3600,
        }
    }

    /// A lock file as a crashed writer would leave it, an hour old
    fn leave_abandoned_lock(path: &Path) {
        fs::write(path, "12345").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
    }

    #[test]
    fn test_second_acquire_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        let id = TicketId::new();

        let held = FileLock::acquire(path.clone(), &id, &fast_settings()).unwrap();
        let second = FileLock::acquire(path.clone(), &id, &fast_settings());
        assert!(matches!(second, Err(HelpdeskError::LockTimeout { .. })));

        drop(held);
        assert!(FileLock::acquire(path, &id, &fast_settings()).is_ok());
    }

    #[test]
    fn test_stale_lock_is_broken() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        leave_abandoned_lock(&path);

        let settings = StorageConfig {
            stale_lock_secs: 60,
            ..fast_settings()
        };
        let lock = FileLock::acquire(path.clone(), &TicketId::new(), &settings);
        assert!(lock.is_ok());
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_lock_being_broken_elsewhere_is_left_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        let guard = path.with_extension("lock.break");
        let id = TicketId::new();
        leave_abandoned_lock(&path);
        fs::write(&guard, "").unwrap();

        assert!(!break_stale(&path, &id, Duration::from_secs(60)));
        assert!(path.exists());
        assert!(guard.exists());
    }

    #[test]
    fn test_abandoned_guard_is_cleared() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        let guard = path.with_extension("lock.break");
        let id = TicketId::new();
        leave_abandoned_lock(&path);
        leave_abandoned_lock(&guard);

        assert!(!break_stale(&path, &id, Duration::from_secs(60)));
        assert!(!guard.exists());
        assert!(break_stale(&path, &id, Duration::from_secs(60)));
        assert!(!path.exists());
        assert!(!guard.exists());
    }

    #[test]
    fn test_fresh_lock_is_not_broken() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        let id = TicketId::new();
        let held = FileLock::acquire(path.clone(), &id, &fast_settings()).unwrap();

        assert!(break_stale(&path, &id, Duration::from_secs(60)));
        assert!(path.exists());
        drop(held);
    }

    #[test]
    fn test_concurrent_takeover_of_stale_lock_is_exclusive() {
        const WAITERS: usize = 8;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.lock");
        leave_abandoned_lock(&path);

        let settings = StorageConfig {
            lock_retries: 5_000,
            lock_retry_delay_ms: 1,
            stale_lock_secs: 60,
        };
        let id = TicketId::new();
        let holders = AtomicUsize::new(0);
        let most_holders = AtomicUsize::new(0);
        let barrier = Barrier::new(WAITERS);

        thread::scope(|s| {
            for _ in 0..WAITERS {
                s.spawn(|| {
                    barrier.wait();
                    let lock = FileLock::acquire(path.clone(), &id, &settings).unwrap();
                    let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                    most_holders.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    holders.fetch_sub(1, Ordering::SeqCst);
                    drop(lock);
                });
            }
        });

        assert_eq!(most_holders.load(Ordering::SeqCst), 1);
        assert!(!path.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
