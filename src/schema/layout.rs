//! Binary layout arithmetic for decoded schemas

use crate::error::{DsmError, Result};

use super::name::{BaseType, Schema};

/// Flat-buffer layout derived from a [`Schema`]: element stride, flattened
/// element count, and total byte size.
///
/// Buffers are row-major: the last enumerable dimension varies fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Bytes per element (string length for `String`)
    pub element_size: usize,
    /// Flattened number of elements, product of the enumerable dimensions
    pub element_count: usize,
    /// `element_size * element_count`
    pub total_bytes: usize,
    /// Number of enumerable axes
    pub rank: usize,
}

impl Layout {
    /// Compute the layout of a schema.
    ///
    /// Structures have no flat layout of their own; their members are laid
    /// out individually by the structure adapter. A `String` schema with no
    /// length entry cannot come out of the decoder, so it is an invariant
    /// violation rather than a caller error.
    pub fn of(schema: &Schema) -> Result<Layout> {
        let element_size = match schema.base {
            BaseType::String => *schema.dims.last().ok_or_else(|| {
                DsmError::internal("string schema with no buffer-length entry")
            })?,
            BaseType::Structure => {
                return Err(DsmError::internal(
                    "structures have no flat layout; marshal their members",
                ))
            }
            other => other
                .fixed_size()
                .ok_or_else(|| DsmError::internal("scalar type with no fixed size"))?,
        };
        let array_dims = schema.array_dims();
        let element_count: usize = array_dims.iter().product();
        if element_count == 0 && !array_dims.is_empty() {
            return Err(DsmError::internal("zero-length dimension in schema"));
        }
        Ok(Layout {
            element_size,
            element_count,
            total_bytes: element_size * element_count,
            rank: array_dims.len(),
        })
    }
}
