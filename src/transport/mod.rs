//! Transport seam to the distributed shared memory service
//!
//! The marshaling core never talks to the network itself; everything it
//! needs from the service fits the synchronous, return-or-fail [`Transport`]
//! trait below. [`mem::MemTransport`] is an in-process implementation used
//! by tests and demos.

pub mod mem;

pub use mem::MemTransport;

use crate::error::Result;

/// One host's entries in the service's allocation list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAllocations {
    /// Lower-case host name
    pub host: String,
    /// Fully qualified variable names allocated on that host
    pub entries: Vec<String>,
}

/// Outcome of a blocking wait: which variable changed and how many bytes of
/// the caller's buffer were filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitEvent {
    /// Partner host that wrote the variable
    pub partner: String,
    /// Variable name that changed
    pub name: String,
    /// Bytes written into the wait buffer
    pub len: usize,
}

/// Synchronous interface to the shared-memory service.
///
/// Buffers cross this boundary already flat: `read` returns exactly the
/// variable's total byte size and `write` expects the same. All calls
/// either complete or fail; the core never retries them.
pub trait Transport: Send + Sync {
    /// Read a variable's flat buffer and its last-write timestamp
    /// (Unix seconds)
    fn read(&self, partner: &str, name: &str) -> Result<(Vec<u8>, i64)>;

    /// Write a variable's flat buffer, optionally notifying monitors
    fn write(&self, partner: &str, name: &str, data: &[u8], notify: bool) -> Result<()>;

    /// Register a variable for wait-for-change notification
    fn monitor(&self, partner: &str, name: &str) -> Result<()>;

    /// Remove a variable from the monitor set
    fn no_monitor(&self, partner: &str, name: &str) -> Result<()>;

    /// Remove every monitored variable
    fn clear_monitor(&self) -> Result<()>;

    /// Block until a monitored variable changes, filling `buf` with its
    /// flat contents
    fn read_wait(&self, buf: &mut [u8]) -> Result<WaitEvent>;

    /// Fetch the service-wide allocation list
    fn allocation_list(&self) -> Result<Vec<HostAllocations>>;
}
