//! Row-locked in-memory table.
//!
//! The outer `RwLock` only guards membership (insert / lookup of the row
//! handle). Row contents sit behind their own `Mutex`, so mutating one row
//! never blocks a mutation of another.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use bazaar_types::Result;
use parking_lot::{Mutex, RwLock};

pub(crate) struct Table<K, V> {
    rows: RwLock<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> Table<K, V>
where
    K: Copy + Eq + Hash,
    V: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn row(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.rows.read().get(key).cloned()
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.row(key).map(|row| row.lock().clone())
    }

    /// Insert unless present. Returns the stored value and whether it was
    /// inserted.
    pub(crate) fn get_or_insert(&self, key: K, value: V) -> (V, bool) {
        let mut rows = self.rows.write();
        if let Some(existing) = rows.get(&key) {
            return (existing.lock().clone(), false);
        }
        rows.insert(key, Arc::new(Mutex::new(value.clone())));
        (value, true)
    }

    /// Run `check` against the current row under its lock, then `mutate` a
    /// copy and write it back only if both succeed.
    pub(crate) fn update_if(
        &self,
        key: &K,
        missing: impl FnOnce() -> bazaar_types::MarketError,
        check: impl FnOnce(&V) -> Result<()>,
        mutate: &mut dyn FnMut(&mut V) -> Result<()>,
    ) -> Result<V> {
        let row = self.row(key).ok_or_else(missing)?;
        let mut guard = row.lock();
        check(&guard)?;
        let mut next = guard.clone();
        mutate(&mut next)?;
        *guard = next.clone();
        Ok(next)
    }

    pub(crate) fn snapshot(&self) -> Vec<V> {
        let handles: Vec<Arc<Mutex<V>>> = self.rows.read().values().cloned().collect();
        handles.iter().map(|row| row.lock().clone()).collect()
    }

    /// Snapshot of the rows matching `keep`.
    pub(crate) fn filter(&self, keep: impl Fn(&V) -> bool) -> Vec<V> {
        self.snapshot().into_iter().filter(|v| keep(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_types::MarketError;

    #[test]
    fn get_or_insert_keeps_first() {
        let table: Table<u32, &str> = Table::new();
        assert_eq!(table.get_or_insert(1, "a"), ("a", true));
        assert_eq!(table.get_or_insert(1, "b"), ("a", false));
        assert_eq!(table.get(&1), Some("a"));
    }

    #[test]
    fn failed_mutation_leaves_row_untouched() {
        let table: Table<u32, u64> = Table::new();
        table.get_or_insert(1, 10);
        let err = table
            .update_if(
                &1,
                || MarketError::Internal("missing".into()),
                |_| Ok(()),
                &mut |v| {
                    *v += 5;
                    Err(MarketError::Internal("boom".into()))
                },
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::Internal(_)));
        assert_eq!(table.get(&1), Some(10));
    }

    #[test]
    fn missing_row_reports_missing() {
        let table: Table<u32, u64> = Table::new();
        let err = table
            .update_if(&9, || MarketError::Internal("nine".into()), |_| Ok(()), &mut |_| Ok(()))
            .unwrap_err();
        assert!(err.to_string().contains("nine"));
    }
}
