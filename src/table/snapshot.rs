//! Table snapshots and the change feed between them.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use crate::protocol::{TypeTag, Value};

/// Read-only copy of one entry
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub name: Vec<u8>,
    pub type_tag: u8,
    pub value: Option<Value>,
}

impl SnapshotEntry {
    pub fn entry_type(&self) -> Option<TypeTag> {
        TypeTag::from_u8(self.type_tag)
    }
}

impl fmt::Display for SnapshotEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", String::from_utf8_lossy(&self.name))?;
        match self.entry_type() {
            Some(tag) => write!(f, "({tag})")?,
            None => write!(f, "(unknown 0x{:02x})", self.type_tag)?,
        }
        match &self.value {
            Some(v) => write!(f, " = {v}"),
            None => f.write_str(" = <absent>"),
        }
    }
}

/// Id-ordered view of the whole table at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: BTreeMap<u16, SnapshotEntry>,
}

/// Difference for one id between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Id not present in the older snapshot
    Added { id: u16, entry: SnapshotEntry },

    /// Id present in both, name/type/value differ
    Modified {
        id: u16,
        before: SnapshotEntry,
        after: SnapshotEntry,
    },
}

impl Change {
    pub fn id(&self) -> u16 {
        match self {
            Change::Added { id, .. } | Change::Modified { id, .. } => *id,
        }
    }

    /// The entry as it is now
    pub fn current(&self) -> &SnapshotEntry {
        match self {
            Change::Added { entry, .. } => entry,
            Change::Modified { after, .. } => after,
        }
    }
}

impl Snapshot {
    pub fn get(&self, id: u16) -> Option<&SnapshotEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that are new or different compared to `previous`, in id order
    ///
    /// Entries are never removed from the table, so there is no removal case.
    pub fn changes_since(&self, previous: &Snapshot) -> Vec<Change> {
        self.entries
            .iter()
            .filter_map(|(&id, now)| match previous.entries.get(&id) {
                None => Some(Change::Added {
                    id,
                    entry: now.clone(),
                }),
                Some(before) if before != now => Some(Change::Modified {
                    id,
                    before: before.clone(),
                    after: now.clone(),
                }),
                Some(_) => None,
            })
            .collect()
    }
}

impl FromIterator<(u16, SnapshotEntry)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (u16, SnapshotEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a u16, &'a SnapshotEntry);
    type IntoIter = btree_map::Iter<'a, u16, SnapshotEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
