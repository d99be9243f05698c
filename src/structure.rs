//! Structure adapter: aggregates of independently typed members
//!
//! A "structure" variable (name suffix `X`) is one opaque transport blob
//! holding every member back to back. Member names come from the service's
//! allocation list as fully qualified `STRUCT/MEMBER<suffix>` entries; each
//! member is decoded and marshaled independently against its slice of the
//! blob, and the whole structure surfaces as a [`Value::Map`].

use std::collections::BTreeMap;

use crate::error::{DsmError, Result};
use crate::marshal::{pack, unpack};
use crate::schema::{BaseType, Layout, NameOptions, Schema};
use crate::transport::{HostAllocations, Transport};
use crate::value::Value;

/// Snapshot of the allocation list, queried per `(partner, structure)`.
///
/// Populated once on first structure access and never invalidated;
/// staleness is accepted by design.
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    hosts: Vec<HostAllocations>,
}

impl MemberTable {
    /// Build a table from the transport's allocation list
    pub fn from_allocations(hosts: Vec<HostAllocations>) -> Self {
        Self { hosts }
    }

    /// Bare member names of `structure` on `partner`, in allocation order.
    ///
    /// Entries match when their fully qualified name starts with
    /// `structure` followed by `/`; the qualifier is stripped. An unknown
    /// partner or a structure with no matches yields an empty list, not an
    /// error.
    pub fn members_of(&self, partner: &str, structure: &str) -> Vec<String> {
        let prefix = format!("{structure}/");
        self.hosts
            .iter()
            .filter(|h| h.host == partner)
            .flat_map(|h| h.entries.iter())
            .filter_map(|entry| entry.strip_prefix(&prefix))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
struct MemberSlot {
    name: String,
    schema: Schema,
    offset: usize,
    len: usize,
}

/// Byte layout of a structure blob: members packed contiguously in member
/// table order, each sized by its own decoded schema.
#[derive(Debug, Clone)]
pub struct StructureLayout {
    slots: Vec<MemberSlot>,
    total_bytes: usize,
}

impl StructureLayout {
    /// Decode every member name and assign consecutive offsets.
    ///
    /// A member whose own name decodes to a structure would nest aggregates
    /// inside aggregates, which the marshaler does not support.
    pub fn build(members: &[String], options: &NameOptions) -> Result<Self> {
        let mut slots = Vec::with_capacity(members.len());
        let mut offset = 0;
        for member in members {
            let schema = Schema::decode(member, options)?;
            if schema.base == BaseType::Structure {
                return Err(DsmError::not_implemented(format!(
                    "nested structure member: {member}"
                )));
            }
            let len = Layout::of(&schema)?.total_bytes;
            slots.push(MemberSlot {
                name: member.clone(),
                schema,
                offset,
                len,
            });
            offset += len;
        }
        Ok(Self {
            slots,
            total_bytes: offset,
        })
    }

    /// Summed size of all member slices
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn slot(&self, member: &str) -> Option<&MemberSlot> {
        self.slots.iter().find(|s| s.name == member)
    }
}

/// Read a structure as a map of bare member name to decoded value, plus the
/// blob's timestamp.
pub fn read_structure<T: Transport>(
    transport: &T,
    table: &MemberTable,
    partner: &str,
    name: &str,
    options: &NameOptions,
) -> Result<(Value, i64)> {
    let members = table.members_of(partner, name);
    tracing::debug!(partner, name, members = members.len(), "reading structure");
    let layout = StructureLayout::build(&members, options)?;
    let (blob, timestamp) = transport.read(partner, name)?;
    if blob.len() < layout.total_bytes() {
        return Err(DsmError::internal(format!(
            "structure blob is {} bytes, member layout needs {}",
            blob.len(),
            layout.total_bytes()
        )));
    }
    let mut result = BTreeMap::new();
    for slot in &layout.slots {
        let slice = &blob[slot.offset..slot.offset + slot.len];
        let value = unpack(slice, &slot.schema)?;
        result.insert(slot.name.clone(), value);
    }
    Ok((Value::Map(result), timestamp))
}

/// Write a map of member name to value into the structure's blob and hand
/// the fully populated blob to the transport.
///
/// The current blob is read first so members absent from the map keep their
/// contents. Any member's marshal failure aborts before the transport
/// write; a partially updated blob is never flushed.
pub fn write_structure<T: Transport>(
    transport: &T,
    table: &MemberTable,
    partner: &str,
    name: &str,
    value: &Value,
    notify: bool,
    options: &NameOptions,
) -> Result<()> {
    let entries = value.as_map().ok_or_else(|| {
        DsmError::decode(format!(
            "structure write needs a map of member values, found {}",
            value.kind()
        ))
    })?;
    let members = table.members_of(partner, name);
    let layout = StructureLayout::build(&members, options)?;
    let (mut blob, _) = transport.read(partner, name)?;
    if blob.len() < layout.total_bytes() {
        return Err(DsmError::internal(format!(
            "structure blob is {} bytes, member layout needs {}",
            blob.len(),
            layout.total_bytes()
        )));
    }
    for (member, member_value) in entries {
        let slot = layout.slot(member).ok_or_else(|| {
            DsmError::decode(format!("structure {name} has no member {member}"))
        })?;
        let bytes = pack(member_value, &slot.schema)?;
        blob[slot.offset..slot.offset + slot.len].copy_from_slice(&bytes);
        tracing::trace!(member, len = slot.len, "packed structure member");
    }
    transport.write(partner, name, &blob, notify)
}
