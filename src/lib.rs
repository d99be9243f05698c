//! # dsmlink - Typed-Name Marshaling for Distributed Shared Memory
//!
//! dsmlink is a client-side binding for a distributed shared memory (DSM)
//! service in which every variable's *name* encodes its schema: the final
//! character selects the scalar type and `_V<digits>_` markers add array
//! dimensions. There is no separate schema registry.
//!
//! ## Features
//!
//! - **Name-schema decoding**: `FOO_V2_V3_L` is a 2x3 array of 32-bit
//!   integers, `MSGC16` a 16-byte string, `STATEX` a structure
//! - **Bidirectional marshaling**: flat row-major buffers to nested
//!   dynamic values and back, with strict range and shape checking
//! - **Structure support**: aggregates marshaled member-by-member through
//!   a cached allocation-list member table
//! - **Change monitoring**: blocking wait on monitored variables with a
//!   single high-watermark-sized wait buffer
//! - **Pluggable transport**: the service itself sits behind a small
//!   synchronous trait; an in-memory implementation ships for tests
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 DsmClient                       │
//! │  name normalization │ monitor watermark │ cache │
//! ├──────────────────────────────┬──────────────────┤
//! │        Marshaling Core       │ Structure Adapter│
//! │  Schema decode │ pack/unpack │  member table    │
//! └──────────────┬───────────────┴───────┬──────────┘
//!                ▼                       ▼
//! ┌─────────────────────────────────────────────────┐
//! │            Transport (trait)                    │
//! │   read / write / monitor / read_wait / alloc    │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod marshal;
pub mod schema;
pub mod structure;
pub mod transport;
pub mod value;

pub use client::{ClientConfig, DsmClient};
pub use error::{DsmError, Result, TransportError};
pub use marshal::{pack, unpack};
pub use schema::{BaseType, Layout, NameOptions, Schema};
pub use structure::{MemberTable, StructureLayout};
pub use transport::{HostAllocations, MemTransport, Transport, WaitEvent};
pub use value::Value;
