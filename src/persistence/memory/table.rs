//! Keyed row container with a monotonic surrogate-key counter.

use std::collections::BTreeMap;

/// Rows keyed by a store-assigned `i64` id.
///
/// Ids start at 1 and are never reused, even after deletes. The counter
/// lives next to the rows so that whoever holds `&mut Table` assigns the
/// id and inserts the row in one step.
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Table<T> {
    /// Creates an empty table whose first id will be 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Assigns the next id, builds the row from it and stores it.
    pub fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> &T {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.rows.entry(id).or_insert(build(id))
    }

    /// Returns the row with `id`.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Returns the row with `id` for in-place modification.
    pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    /// Returns `true` if a row with `id` exists.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    /// Removes and returns the row with `id`.
    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Iterates rows in id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut table = Table::new();
        assert_eq!(*table.insert_with(|id| id * 10), 10);
        assert_eq!(*table.insert_with(|id| id * 10), 20);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut table = Table::new();
        table.insert_with(|id| id);
        table.insert_with(|id| id);
        assert_eq!(table.remove(2), Some(2));
        assert_eq!(*table.insert_with(|id| id), 3);
        assert!(!table.contains(2));
    }

    #[test]
    fn values_iterate_in_id_order() {
        let mut table = Table::new();
        for _ in 0..3 {
            table.insert_with(|id| format!("row-{id}"));
        }
        let rows: Vec<&String> = table.values().collect();
        assert_eq!(rows, ["row-1", "row-2", "row-3"]);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut table = Table::new();
        table.insert_with(|_| 1_u32);
        if let Some(row) = table.get_mut(1) {
            *row = 5;
        }
        assert_eq!(table.get(1), Some(&5));
        assert!(table.get_mut(9).is_none());
        assert!(!table.is_empty());
    }
}
