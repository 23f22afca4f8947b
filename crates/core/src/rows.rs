//! Editable row lists for mappings and filters.
//!
//! Every row gets a `RowId` that stays attached to it for the life of the
//! session, so removing one row never changes which row another id names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map(RowId)
            .map_err(|_| format!("invalid row id '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row<T> {
    pub id: RowId,
    #[serde(flatten)]
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowList<T> {
    /// Next id to hand out. Ids are never reused, even after removal.
    next_id: u64,
    rows: Vec<Row<T>>,
}

impl<T> Default for RowList<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<T> RowList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row { id, value });
        id
    }

    pub fn get(&self, id: RowId) -> Option<&T> {
        self.rows.iter().find(|r| r.id == id).map(|r| &r.value)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut T> {
        self.rows.iter_mut().find(|r| r.id == id).map(|r| &mut r.value)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.rows.iter().any(|r| r.id == id)
    }

    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Remove every row whose id is in `ids`. Unknown ids are ignored.
    /// Returns the removed values in their original list order.
    pub fn remove(&mut self, ids: &[RowId]) -> Vec<T> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            if ids.contains(&row.id) {
                removed.push(row.value);
            } else {
                kept.push(row);
            }
        }
        self.rows = kept;
        removed
    }

    /// Positional batch removal.
    ///
    /// All indices refer to the list as it was before the call; they are
    /// applied highest-first so one removal never shifts another. Duplicate
    /// and out-of-range indices are ignored. Returns the removed values in
    /// their original list order.
    pub fn remove_at(&mut self, indices: &[usize]) -> Vec<T> {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.rows.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed = Vec::with_capacity(sorted.len());
        for &idx in sorted.iter().rev() {
            removed.push(self.rows.remove(idx).value);
        }
        removed.reverse();
        removed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row<T>> {
        self.rows.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|r| &r.value)
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> FromIterator<T> for RowList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}
