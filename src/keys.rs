use crate::error::GenerationError;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Active,
    Failed,
}

#[derive(Debug)]
struct KeyEntry {
    key: String,
    status: KeyStatus,
}

#[derive(Debug)]
struct PoolInner {
    entries: Vec<KeyEntry>,
    cursor: usize,
}

/// Round-robin pool of API credentials, owned by one project run.
///
/// The cursor advances on every dispense, success or failure, so load
/// spreads across keys even when everything is healthy. `mark_failed` is
/// bookkeeping only: a failed key stays in rotation and may be retried by a
/// later logical call. Dispense-and-advance happens under one lock with no
/// await point, so overlapping in-flight calls never share a cursor slot.
#[derive(Debug)]
pub struct KeyPool {
    inner: Mutex<PoolInner>,
}

/// Handle for one dispensed credential; the index feeds `mark_failed`.
#[derive(Debug, Clone)]
pub struct DispensedKey {
    pub index: usize,
    pub key: String,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        let entries = keys
            .into_iter()
            .map(|key| KeyEntry {
                key,
                status: KeyStatus::Active,
            })
            .collect();
        KeyPool {
            inner: Mutex::new(PoolInner { entries, cursor: 0 }),
        }
    }

    /// Reinitialize for a new project run: cursor back to 0, all keys active.
    pub fn reset(&self, keys: Vec<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries = keys
            .into_iter()
            .map(|key| KeyEntry {
                key,
                status: KeyStatus::Active,
            })
            .collect();
        inner.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor position; the failover loop remembers this to detect
    /// a full wrap of the rotation.
    pub fn cursor(&self) -> usize {
        self.inner.lock().unwrap().cursor
    }

    /// Dispense the next credential and advance the cursor, atomically.
    /// Failed keys are dispensed like any other; skipping happens at the
    /// level of a single call's rotation, not here.
    pub fn next_key(&self) -> Result<DispensedKey, GenerationError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.is_empty() {
            return Err(GenerationError::EmptyCredentialSet);
        }
        let index = inner.cursor;
        let key = inner.entries[index].key.clone();
        inner.cursor = (inner.cursor + 1) % inner.entries.len();
        Ok(DispensedKey { index, key })
    }

    pub fn mark_failed(&self, index: usize) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(index) {
            entry.status = KeyStatus::Failed;
        }
    }

    pub fn statuses(&self) -> Vec<KeyStatus> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> KeyPool {
        KeyPool::new((0..n).map(|i| format!("key-{}", i)).collect())
    }

    #[test]
    fn dispenses_in_cyclic_order() {
        let pool = pool(3);
        let order: Vec<usize> = (0..7).map(|_| pool.next_key().unwrap().index).collect();
        assert_eq!(order, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn empty_pool_fails_immediately() {
        let pool = KeyPool::new(vec![]);
        assert!(matches!(
            pool.next_key(),
            Err(GenerationError::EmptyCredentialSet)
        ));
    }

    #[test]
    fn mark_failed_keeps_key_in_rotation() {
        let pool = pool(2);
        let first = pool.next_key().unwrap();
        pool.mark_failed(first.index);
        assert_eq!(pool.statuses(), vec![KeyStatus::Failed, KeyStatus::Active]);
        // Still dispensed on the next wrap.
        let _ = pool.next_key().unwrap();
        let again = pool.next_key().unwrap();
        assert_eq!(again.index, 0);
    }

    #[test]
    fn reset_restores_cursor_and_statuses() {
        let pool = pool(3);
        let _ = pool.next_key().unwrap();
        pool.mark_failed(0);
        pool.reset(vec!["a".into(), "b".into()]);
        assert_eq!(pool.cursor(), 0);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.statuses(), vec![KeyStatus::Active, KeyStatus::Active]);
    }

    #[test]
    fn concurrent_dispenses_never_share_a_slot() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let pool = Arc::new(KeyPool::new(
            (0..8).map(|i| format!("key-{}", i)).collect(),
        ));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                pool.next_key().unwrap().index
            }));
        }
        let seen: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen.len(), 8, "each dispense must take a distinct slot");
    }
}
