//! Variable name schemas: suffix decoding and binary layout

pub mod layout;
pub mod name;

pub use layout::Layout;
pub use name::{BaseType, NameOptions, Schema};
