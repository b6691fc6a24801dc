//! Network Module
//!
//! TCP connection handling.
//!
//! ## Architecture
//! - One blocking `TcpStream` per session
//! - Read/write deadlines from `Config`
//! - `ShutdownHandle` closes the socket from another thread

mod connection;

pub use connection::{Connection, ShutdownHandle};
