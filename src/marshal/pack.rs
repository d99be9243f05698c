//! Dynamic value to flat buffer conversion

use crate::error::{DsmError, Result};
use crate::schema::{BaseType, Layout, Schema};
use crate::value::Value;

/// Convert a nested [`Value`] into a flat row-major buffer per `schema`.
///
/// Integer elements are range-checked against the target width, strings
/// against the fixed buffer length (reserving one byte for the NUL
/// terminator). Shape or kind mismatches anywhere in the nesting fail with
/// [`DsmError::Decode`] and the partial buffer is dropped, never returned.
pub fn pack(value: &Value, schema: &Schema) -> Result<Vec<u8>> {
    let layout = Layout::of(schema)?;
    let mut buf = vec![0u8; layout.total_bytes];
    if layout.rank == 0 {
        write_element(&mut buf, 0, schema.base, layout.element_size, value)?;
        return Ok(buf);
    }
    tracing::debug!(
        base = schema.base.name(),
        rank = layout.rank,
        elements = layout.element_count,
        "packing array"
    );
    let dims = schema.array_dims();
    // Index odometer: the innermost index increments fastest, carrying
    // into higher dimensions on overflow.
    let mut indices = vec![0usize; dims.len()];
    for element in 0..layout.element_count {
        let leaf = descend(value, dims, &indices)?;
        write_element(
            &mut buf,
            element * layout.element_size,
            schema.base,
            layout.element_size,
            leaf,
        )?;
        step_odometer(&mut indices, dims);
    }
    Ok(buf)
}

/// Follow one index path down the nested sequences, checking each level's
/// kind and exact length on the way.
fn descend<'v>(value: &'v Value, dims: &[usize], indices: &[usize]) -> Result<&'v Value> {
    let mut current = value;
    for (depth, &index) in indices.iter().enumerate() {
        let items = current.as_seq().ok_or_else(|| {
            DsmError::decode(format!(
                "expected a sequence at depth {}, found {}",
                depth,
                current.kind()
            ))
        })?;
        if items.len() != dims[depth] {
            return Err(DsmError::decode(format!(
                "sequence at depth {} has {} elements, schema needs {}",
                depth,
                items.len(),
                dims[depth]
            )));
        }
        current = &items[index];
    }
    Ok(current)
}

fn step_odometer(indices: &mut [usize], dims: &[usize]) {
    for depth in (0..indices.len()).rev() {
        indices[depth] += 1;
        if indices[depth] < dims[depth] {
            return;
        }
        indices[depth] = 0;
    }
}

/// Validate one scalar and write it at `offset` in the target's native
/// in-memory representation.
fn write_element(
    buf: &mut [u8],
    offset: usize,
    base: BaseType,
    element_size: usize,
    value: &Value,
) -> Result<()> {
    match base {
        BaseType::Byte => {
            let v = int_leaf(value)?;
            if !(i8::MIN as i64..=i8::MAX as i64).contains(&v) {
                return Err(DsmError::range(format!(
                    "{v} is out of range for a signed byte integer"
                )));
            }
            buf[offset..offset + 1].copy_from_slice(&(v as i8).to_ne_bytes());
        }
        BaseType::Short => {
            let v = int_leaf(value)?;
            if !(i16::MIN as i64..=i16::MAX as i64).contains(&v) {
                return Err(DsmError::range(format!(
                    "{v} is out of range for a signed short integer"
                )));
            }
            buf[offset..offset + 2].copy_from_slice(&(v as i16).to_ne_bytes());
        }
        BaseType::Long => {
            // No range check beyond the native width: the value truncates
            // to 32 bits exactly as the legacy cast did.
            let v = int_leaf(value)?;
            buf[offset..offset + 4].copy_from_slice(&(v as i32).to_ne_bytes());
        }
        BaseType::Float => {
            let v = float_leaf(value)?;
            buf[offset..offset + 4].copy_from_slice(&(v as f32).to_ne_bytes());
        }
        BaseType::Double => {
            let v = float_leaf(value)?;
            buf[offset..offset + 8].copy_from_slice(&v.to_ne_bytes());
        }
        BaseType::String => {
            let text = value.as_str().ok_or_else(|| {
                DsmError::decode(format!("expected text, found {}", value.kind()))
            })?;
            let raw = text.as_bytes();
            if raw.len() > element_size.saturating_sub(1) {
                return Err(DsmError::range(format!(
                    "string of {} bytes does not fit a buffer of {} (one byte is reserved for the terminator)",
                    raw.len(),
                    element_size
                )));
            }
            // The buffer is zero-filled, so the terminator and padding are
            // already in place.
            buf[offset..offset + raw.len()].copy_from_slice(raw);
        }
        BaseType::Structure => {
            return Err(DsmError::internal(
                "structure reached the element marshaler",
            ))
        }
    }
    Ok(())
}

fn int_leaf(value: &Value) -> Result<i64> {
    value.as_int().ok_or_else(|| {
        DsmError::decode(format!("expected an integer, found {}", value.kind()))
    })
}

fn float_leaf(value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        DsmError::decode(format!("expected a number, found {}", value.kind()))
    })
}
