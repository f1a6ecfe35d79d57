//! Row identity.

use std::collections::HashSet;

/// An explicit row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
    /// Numeric id.
    Int(i64),
    /// Textual id.
    Text(String),
}

impl RowId {
    /// Returns `false` for the ids that count as "no id": `0` and `""`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Stable key used to match a rendered row across re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// The row's own id.
    Id(RowId),
    /// The row's position, used when it has no truthy id.
    Index(usize),
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A row the table can display.
pub trait TableRow: Clone + Send + Sync + 'static {
    /// The row's id, if it has one.
    fn row_id(&self) -> Option<RowId> {
        None
    }
}

impl TableRow for serde_json::Value {
    fn row_id(&self) -> Option<RowId> {
        match self.get("id")? {
            serde_json::Value::Number(n) => n.as_i64().map(RowId::Int),
            serde_json::Value::String(s) => Some(RowId::Text(s.clone())),
            _ => None,
        }
    }
}

/// Identity of the row at `index`: its id when present and truthy, else the
/// index. An id of `0` or `""` falls back to the index.
pub fn identity<R: TableRow>(index: usize, row: &R) -> RowKey {
    match row.row_id() {
        Some(id) if id.is_truthy() => RowKey::Id(id),
        _ => RowKey::Index(index),
    }
}

/// Keys added, removed and kept between two renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowDiff {
    /// Keys present only in the new render, in new order.
    pub inserted: Vec<RowKey>,
    /// Keys present only in the old render, in old order.
    pub removed: Vec<RowKey>,
    /// Keys present in both, in new order.
    pub retained: Vec<RowKey>,
}

impl RowDiff {
    /// Compares two key sequences.
    pub fn between(old: &[RowKey], new: &[RowKey]) -> Self {
        let old_set: HashSet<&RowKey> = old.iter().collect();
        let new_set: HashSet<&RowKey> = new.iter().collect();

        let (retained, inserted): (Vec<RowKey>, Vec<RowKey>) =
            new.iter().cloned().partition(|k| old_set.contains(k));
        let removed = old.iter().filter(|k| !new_set.contains(k)).cloned().collect();

        Self {
            inserted,
            removed,
            retained,
        }
    }

    /// Returns `true` if no row was added or removed.
    pub fn is_unchanged(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identity_falls_back_to_index() {
        assert_eq!(identity(2, &json!({"name": "Demo"})), RowKey::Index(2));
        assert_eq!(identity(1, &json!({"id": 5, "name": "Apple"})), RowKey::Id(RowId::Int(5)));
        assert_eq!(identity(0, &json!({"id": 0, "name": "Zero"})), RowKey::Index(0));
        assert_eq!(identity(3, &json!({"id": 0})), RowKey::Index(3));
        assert_eq!(identity(4, &json!({"id": ""})), RowKey::Index(4));
        assert_eq!(identity(4, &json!({"id": "abc"})).to_string(), "abc");
    }

    #[test]
    fn test_identity_displays_like_its_value() {
        assert_eq!(identity(2, &json!({"name": "Demo"})).to_string(), "2");
        assert_eq!(identity(1, &json!({"id": 5})).to_string(), "5");
        assert_eq!(identity(0, &json!({"id": 0})).to_string(), "0");
    }

    #[test]
    fn test_diff() {
        let old = vec![RowKey::Id(RowId::Int(1)), RowKey::Id(RowId::Int(2)), RowKey::Index(2)];
        let new = vec![RowKey::Id(RowId::Int(2)), RowKey::Id(RowId::Int(3))];
        let diff = RowDiff::between(&old, &new);
        assert_eq!(diff.retained, vec![RowKey::Id(RowId::Int(2))]);
        assert_eq!(diff.inserted, vec![RowKey::Id(RowId::Int(3))]);
        assert_eq!(diff.removed, vec![RowKey::Id(RowId::Int(1)), RowKey::Index(2)]);
        assert!(!diff.is_unchanged());
        assert!(RowDiff::between(&new, &new).is_unchanged());
    }
}
