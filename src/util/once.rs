//! Run-once memoization keyed by value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

/// Insert-if-absent memo: the producer for a key runs at most once, and
/// every later lookup of that key returns the cached value.
///
/// A single mutex guards the whole table and is held while the producer
/// runs, so concurrent first lookups of one key still compute once. The
/// producer must not look up the same memo.
#[derive(Debug)]
pub struct ExecuteOnce<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for ExecuteOnce<K, V> {
    fn default() -> Self {
        ExecuteOnce {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> ExecuteOnce<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, running `produce` only if the key is new.
    pub fn get_or_insert_with(&self, key: K, produce: impl FnOnce() -> V) -> V {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entries.get(&key) {
            return value.clone();
        }

        let value = produce();
        entries.insert(key, value.clone());
        value
    }

    /// Number of distinct keys computed so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_runs_once_per_key() {
        let memo = ExecuteOnce::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let v = memo.get_or_insert_with("a", || {
                calls.fetch_add(1, Ordering::SeqCst);
                42
            });
            assert_eq!(v, 42);
        }
        memo.get_or_insert_with("b", || {
            calls.fetch_add(1, Ordering::SeqCst);
            7
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_concurrent_first_lookup() {
        let memo = Arc::new(ExecuteOnce::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    memo.get_or_insert_with(("locator", 1), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "diagnostic".to_string()
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "diagnostic");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
