//! Process-wide install locks keyed by install directory.
//!
//! Installs into the same directory are serialized; installs into different
//! directories run in parallel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

static INSTALL_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Lock guarding one install directory.
///
/// Equivalent spellings of a path (relative vs absolute) share a lock.
/// Entries nobody holds any more are dropped on the next call, so the map
/// stays bounded by the number of directories in use at once.
pub fn install_lock(install_dir: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(install_dir).unwrap_or_else(|_| install_dir.to_path_buf());
    let mut locks = INSTALL_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    // Handles are only cloned under the map lock, so a count of 1 means idle.
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    Arc::clone(locks.entry(key).or_default())
}

/// Acquire `lock`, recovering from poisoning.
///
/// The guarded value is `()`; the next holder re-probes the directory anyway.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_dir_shares_lock() {
        let a = install_lock(Path::new("/tmp/toolpin-lock-test/volta"));
        let b = install_lock(Path::new("/tmp/toolpin-lock-test/volta"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_dirs_have_distinct_locks() {
        let a = install_lock(Path::new("/tmp/toolpin-lock-test/a/volta"));
        let b = install_lock(Path::new("/tmp/toolpin-lock-test/b/volta"));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_relative_and_absolute_share_lock() {
        let relative = Path::new("toolpin-lock-test-rel/volta");
        let absolute = std::env::current_dir().unwrap().join(relative);
        assert!(Arc::ptr_eq(&install_lock(relative), &install_lock(&absolute)));
    }

    fn is_tracked(path: &Path) -> bool {
        INSTALL_LOCKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&std::path::absolute(path).unwrap())
    }

    #[test]
    fn test_idle_entries_are_dropped() {
        let idle = Path::new("/tmp/toolpin-lock-test/idle/volta");
        let held = Path::new("/tmp/toolpin-lock-test/held/volta");
        let held_lock = install_lock(held);
        drop(install_lock(idle));

        let _other = install_lock(Path::new("/tmp/toolpin-lock-test/other/volta"));

        assert!(!is_tracked(idle));
        assert!(is_tracked(held));
        assert!(Arc::ptr_eq(&held_lock, &install_lock(held)));
    }

    #[test]
    fn test_lock_serializes_holders() {
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    let lock = install_lock(Path::new("/tmp/toolpin-lock-test/serial"));
                    let _guard = acquire(&lock);
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = install_lock(Path::new("/tmp/toolpin-lock-test/poison"));
        let poisoner = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(lock.is_poisoned());
        let _guard = acquire(&lock);
    }
}
