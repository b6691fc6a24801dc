//! EntryTable implementation
//!
//! HashMap keyed by entry id.

use std::collections::HashMap;

use crate::error::{NtError, Result};
use crate::protocol::Value;
use super::{Entry, Snapshot, SnapshotEntry};

/// In-memory mirror of the server's entries
#[derive(Debug, Default)]
pub struct EntryTable {
    entries: HashMap<u16, Entry>,
}

impl EntryTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or wholesale replace the entry at `id`
    pub fn assign(&mut self, id: u16, name: Vec<u8>, type_tag: u8, value: Option<Value>, sequence: u16) {
        let entry = Entry {
            id,
            name,
            type_tag,
            value,
            sequence,
        };
        if let Some(previous) = self.entries.insert(id, entry) {
            tracing::trace!(id, old_type = previous.type_tag, new_type = type_tag, "Entry reassigned");
        }
    }

    /// Replace the value of an existing entry, keeping its name and type
    ///
    /// Fails with `UnknownEntry` (and changes nothing) if `id` was never assigned.
    pub fn update(&mut self, id: u16, value: Option<Value>, sequence: u16) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(NtError::UnknownEntry { id })?;
        entry.value = value;
        entry.sequence = sequence;
        Ok(())
    }

    /// Recorded type tag of an entry
    pub fn type_of(&self, id: u16) -> Option<u8> {
        self.entries.get(&id).map(|e| e.type_tag)
    }

    pub fn get(&self, id: u16) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned, id-ordered copy of `(name, type, value)` per entry
    pub fn snapshot(&self) -> Snapshot {
        self.entries
            .values()
            .map(|e| {
                (
                    e.id,
                    SnapshotEntry {
                        name: e.name.clone(),
                        type_tag: e.type_tag,
                        value: e.value.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TypeTag;

    #[test]
    fn update_keeps_name_and_type() {
        let mut table = EntryTable::new();
        table.assign(5, b"x".to_vec(), TypeTag::Number as u8, Some(Value::Number(1.0)), 1);
        table.update(5, Some(Value::Number(2.0)), 2).unwrap();

        let entry = table.get(5).unwrap();
        assert_eq!(entry.name, b"x");
        assert_eq!(entry.entry_type(), Some(TypeTag::Number));
        assert_eq!(entry.value, Some(Value::Number(2.0)));
        assert_eq!(entry.sequence, 2);
    }

    #[test]
    fn update_unknown_id_changes_nothing() {
        let mut table = EntryTable::new();
        table.assign(1, b"a".to_vec(), TypeTag::Bool as u8, Some(Value::Bool(true)), 1);
        let before = table.snapshot();

        let err = table.update(2, Some(Value::Bool(false)), 1).unwrap_err();
        assert!(matches!(err, NtError::UnknownEntry { id: 2 }));
        assert_eq!(table.snapshot(), before);
    }
}
