//! Bidirectional marshaling between flat buffers and dynamic values
//!
//! Both directions are keyed by a decoded [`Schema`](crate::schema::Schema):
//! [`unpack`] turns a row-major flat buffer into a nested
//! [`Value`](crate::value::Value) and [`pack`] turns a nested value back
//! into a flat buffer, validating element kinds, numeric ranges and
//! sequence shapes.

pub mod pack;
pub mod unpack;

pub use pack::pack;
pub use unpack::unpack;
