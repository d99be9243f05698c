//! DSM client session: typed reads, writes and change monitoring

use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DsmError, Result};
use crate::marshal::{pack, unpack};
use crate::schema::{Layout, Schema};
use crate::structure::{read_structure, write_structure, MemberTable};
use crate::transport::Transport;
use crate::value::Value;

/// Buffer bookkeeping for `read_wait`: one buffer sized to the largest
/// variable ever monitored is reused across all waits.
#[derive(Debug, Default)]
struct WaitState {
    max_size: usize,
    buf: Vec<u8>,
}

/// Client session over a [`Transport`].
///
/// Normalizes names on every call (variable names upper-case, partner
/// names lower-case), dispatches structure names to the structure adapter,
/// and tracks the monitored-size high watermark for `read_wait`.
#[derive(Debug)]
pub struct DsmClient<T: Transport> {
    transport: T,
    config: super::ClientConfig,
    /// Allocation-list snapshot, populated on first structure access
    member_table: OnceLock<MemberTable>,
    wait_state: Mutex<WaitState>,
}

impl<T: Transport> DsmClient<T> {
    /// Create a client with default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, super::ClientConfig::default())
    }

    /// Create a client with explicit configuration
    pub fn with_config(transport: T, config: super::ClientConfig) -> Self {
        Self {
            transport,
            config,
            member_table: OnceLock::new(),
            wait_state: Mutex::new(WaitState::default()),
        }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read a variable, returning its decoded value and last-write
    /// timestamp (Unix seconds)
    pub fn read(&self, partner: &str, name: &str) -> Result<(Value, i64)> {
        let (partner, name) = normalize(partner, name);
        tracing::debug!(%partner, %name, "read request");
        if name.ends_with('X') {
            return read_structure(
                &self.transport,
                self.member_table()?,
                &partner,
                &name,
                &self.config.name_options,
            );
        }
        let schema = Schema::decode(&name, &self.config.name_options)?;
        let layout = Layout::of(&schema)?;
        let (bytes, timestamp) = self.transport.read(&partner, &name)?;
        if bytes.len() != layout.total_bytes {
            return Err(DsmError::internal(format!(
                "transport returned {} bytes for {name}, schema needs {}",
                bytes.len(),
                layout.total_bytes
            )));
        }
        Ok((unpack(&bytes, &schema)?, timestamp))
    }

    /// Write a variable, optionally notifying monitors
    pub fn write(&self, partner: &str, name: &str, value: &Value, notify: bool) -> Result<()> {
        let (partner, name) = normalize(partner, name);
        tracing::debug!(%partner, %name, notify, "write request");
        if name.len() < 2 {
            return Err(DsmError::illegal_name(name));
        }
        if name.ends_with('X') {
            return write_structure(
                &self.transport,
                self.member_table()?,
                &partner,
                &name,
                value,
                notify,
                &self.config.name_options,
            );
        }
        let schema = Schema::decode(&name, &self.config.name_options)?;
        let bytes = pack(value, &schema)?;
        self.transport.write(&partner, &name, &bytes, notify)
    }

    /// Register a variable for change notification and grow the wait
    /// buffer watermark to cover it
    pub fn monitor(&self, partner: &str, name: &str) -> Result<()> {
        let (partner, name) = normalize(partner, name);
        if name.ends_with('X') {
            return Err(DsmError::not_implemented(
                "monitoring structures is not supported",
            ));
        }
        let schema = Schema::decode(&name, &self.config.name_options)?;
        let layout = Layout::of(&schema)?;
        {
            let mut state = self.wait_state.lock().unwrap();
            if layout.total_bytes > state.max_size {
                tracing::debug!(
                    %name,
                    from = state.max_size,
                    to = layout.total_bytes,
                    "raising read_wait buffer watermark"
                );
                state.max_size = layout.total_bytes;
            }
        }
        self.transport.monitor(&partner, &name)
    }

    /// Remove a variable from the monitor set.
    ///
    /// The name is decoded first purely for validation, matching the read
    /// path's grammar checks. The watermark never shrinks.
    pub fn no_monitor(&self, partner: &str, name: &str) -> Result<()> {
        let (partner, name) = normalize(partner, name);
        if name.ends_with('X') {
            return Err(DsmError::not_implemented(
                "monitoring structures is not supported",
            ));
        }
        Schema::decode(&name, &self.config.name_options)?;
        self.transport.no_monitor(&partner, &name)
    }

    /// Remove every monitored variable
    pub fn clear_monitor(&self) -> Result<()> {
        self.transport.clear_monitor()
    }

    /// Block until a monitored variable changes and decode it.
    ///
    /// Returns the writing partner, the variable name, its decoded value
    /// and the wakeup timestamp. Fails with
    /// [`DsmError::NothingMonitored`] before the first `monitor` call.
    pub fn read_wait(&self) -> Result<(String, String, Value, i64)> {
        let mut state = self.wait_state.lock().unwrap();
        if state.max_size == 0 {
            return Err(DsmError::NothingMonitored);
        }
        let max_size = state.max_size;
        if state.buf.len() != max_size {
            state.buf.resize(max_size, 0);
        }
        let event = self.transport.read_wait(&mut state.buf)?;
        tracing::debug!(partner = %event.partner, name = %event.name, "read_wait woke");
        let schema = Schema::decode(&event.name, &self.config.name_options)?;
        let layout = Layout::of(&schema)?;
        if layout.total_bytes > state.buf.len() {
            return Err(DsmError::internal(format!(
                "wait buffer holds {} bytes, {} needs {}",
                state.buf.len(),
                event.name,
                layout.total_bytes
            )));
        }
        let value = unpack(&state.buf[..layout.total_bytes], &schema)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok((event.partner, event.name, value, timestamp))
    }

    fn member_table(&self) -> Result<&MemberTable> {
        if let Some(table) = self.member_table.get() {
            return Ok(table);
        }
        tracing::debug!("fetching allocation list for member table");
        let list = self.transport.allocation_list()?;
        // A concurrent first access may have won the race; get_or_init
        // keeps exactly one table either way.
        Ok(self
            .member_table
            .get_or_init(|| MemberTable::from_allocations(list)))
    }
}

/// Case-normalization contract: variable names upper-case, partner names
/// lower-case.
fn normalize(partner: &str, name: &str) -> (String, String) {
    (partner.to_ascii_lowercase(), name.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cases() {
        let (partner, name) = normalize("Partner1", "foo_v3_b");
        assert_eq!(partner, "partner1");
        assert_eq!(name, "FOO_V3_B");
    }
}
