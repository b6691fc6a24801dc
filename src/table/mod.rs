//! Table Module
//!
//! Local mirror of the remote entry table.
//!
//! ## Responsibilities
//! - Hold one `Entry` per id, created by ASSIGN and changed by UPDATE
//! - Keep an entry's type fixed between assignments
//! - Hand out owned snapshots and the changes between two of them
//!
//! The table does no locking of its own. It is owned by the session and
//! mutated only while a message is being applied.

mod entry_table;
mod snapshot;

pub use entry_table::EntryTable;
pub use snapshot::{Change, Snapshot, SnapshotEntry};

use crate::protocol::{TypeTag, Value};

/// One synchronized entry
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Identifier assigned by the server
    pub id: u16,

    /// Raw name bytes exactly as received
    pub name: Vec<u8>,

    /// Type tag recorded at assignment; may be a tag this client cannot decode
    pub type_tag: u8,

    /// Current value, `None` if `type_tag` is unknown
    pub value: Option<Value>,

    /// Sequence number of the last ASSIGN/UPDATE applied (not enforced)
    pub sequence: u16,
}

impl Entry {
    /// The decoded type, if this client knows the tag
    pub fn entry_type(&self) -> Option<TypeTag> {
        TypeTag::from_u8(self.type_tag)
    }
}
