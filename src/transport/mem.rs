//! In-process transport backed by plain maps
//!
//! Deterministic stand-in for the real shared-memory service: variables
//! live in a `(partner, name)`-keyed map, notifications are a condvar-backed
//! queue. Tests and demos seed it with [`MemTransport::publish`] and
//! [`MemTransport::set_allocations`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Condvar, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TransportError};

use super::{HostAllocations, Transport, WaitEvent};

#[derive(Debug, Clone)]
struct Cell {
    bytes: Vec<u8>,
    timestamp: i64,
}

/// In-memory [`Transport`] implementation
#[derive(Debug, Default)]
pub struct MemTransport {
    cells: RwLock<HashMap<(String, String), Cell>>,
    monitors: Mutex<HashSet<(String, String)>>,
    pending: Mutex<VecDeque<(String, String)>>,
    wakeup: Condvar,
    allocations: RwLock<Vec<HostAllocations>>,
}

impl MemTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a variable's flat contents, bypassing notification
    pub fn publish(&self, partner: &str, name: &str, bytes: Vec<u8>) {
        let mut cells = self.cells.write().unwrap();
        cells.insert(
            (partner.to_string(), name.to_string()),
            Cell {
                bytes,
                timestamp: now(),
            },
        );
    }

    /// Install the allocation list served by [`Transport::allocation_list`]
    pub fn set_allocations(&self, allocations: Vec<HostAllocations>) {
        *self.allocations.write().unwrap() = allocations;
    }

    /// Number of monitored variables
    pub fn monitored_count(&self) -> usize {
        self.monitors.lock().unwrap().len()
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl Transport for MemTransport {
    fn read(&self, partner: &str, name: &str) -> Result<(Vec<u8>, i64)> {
        let cells = self.cells.read().unwrap();
        let cell = cells
            .get(&(partner.to_string(), name.to_string()))
            .ok_or_else(|| TransportError::NoSuchName {
                name: name.to_string(),
            })?;
        Ok((cell.bytes.clone(), cell.timestamp))
    }

    fn write(&self, partner: &str, name: &str, data: &[u8], notify: bool) -> Result<()> {
        {
            let mut cells = self.cells.write().unwrap();
            cells.insert(
                (partner.to_string(), name.to_string()),
                Cell {
                    bytes: data.to_vec(),
                    timestamp: now(),
                },
            );
        }
        if notify {
            let key = (partner.to_string(), name.to_string());
            let monitored = self.monitors.lock().unwrap().contains(&key);
            if monitored {
                self.pending.lock().unwrap().push_back(key);
                self.wakeup.notify_one();
            }
        }
        Ok(())
    }

    fn monitor(&self, partner: &str, name: &str) -> Result<()> {
        self.monitors
            .lock()
            .unwrap()
            .insert((partner.to_string(), name.to_string()));
        Ok(())
    }

    fn no_monitor(&self, partner: &str, name: &str) -> Result<()> {
        self.monitors
            .lock()
            .unwrap()
            .remove(&(partner.to_string(), name.to_string()));
        Ok(())
    }

    fn clear_monitor(&self) -> Result<()> {
        self.monitors.lock().unwrap().clear();
        Ok(())
    }

    fn read_wait(&self, buf: &mut [u8]) -> Result<WaitEvent> {
        let mut pending = self.pending.lock().unwrap();
        let (partner, name) = loop {
            if let Some(event) = pending.pop_front() {
                break event;
            }
            pending = self.wakeup.wait(pending).unwrap();
        };
        let cells = self.cells.read().unwrap();
        let cell = cells
            .get(&(partner.clone(), name.clone()))
            .ok_or_else(|| TransportError::NoSuchName { name: name.clone() })?;
        let len = cell.bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&cell.bytes[..len]);
        Ok(WaitEvent { partner, name, len })
    }

    fn allocation_list(&self) -> Result<Vec<HostAllocations>> {
        Ok(self.allocations.read().unwrap().clone())
    }
}
