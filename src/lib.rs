//! # ntsync
//!
//! A blocking client that mirrors a remote NetworkTables-style key/value
//! table:
//! - Version handshake on connect
//! - Self-describing binary value codec (scalars and arrays)
//! - Create/update semantics applied to a local entry table
//! - Snapshots and change feed for consumers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Table Server                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TCP (network::Connection)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Session                                │
//! │        (one message per process() call, no threads)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │ EntryTable  │
//!   │ (messages + │          │  (id → entry│
//!   │  codec)     │          │   mirror)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Snapshot   │
//!                           │ (changes)   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ntsync::{Config, Session};
//!
//! let config = Config::from_target("10.0.0.2")?;
//! let mut session = Session::connect(&config)?;
//! let mut seen = session.snapshot();
//! loop {
//!     match session.process() {
//!         Ok(_) => {}
//!         Err(e) if e.is_timeout() => continue,
//!         Err(e) => return Err(e),
//!     }
//!     let now = session.snapshot();
//!     for change in now.changes_since(&seen) {
//!         println!("{} {}", change.id(), change.current());
//!     }
//!     seen = now;
//! }
//! # Ok::<(), ntsync::NtError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod table;
pub mod network;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NtError, Result};
pub use config::Config;
pub use protocol::{Message, TypeTag, Value};
pub use session::{Session, SessionState};
pub use table::{Change, Entry, EntryTable, Snapshot};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ntsync
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
