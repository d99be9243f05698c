//! Flat buffer to dynamic value conversion

use crate::error::{DsmError, Result};
use crate::schema::{BaseType, Layout, Schema};
use crate::value::Value;

/// Convert a flat row-major buffer into a nested [`Value`] per `schema`.
///
/// The buffer must be exactly [`Layout::total_bytes`] long; the read path
/// guarantees this, so a mismatch here is an invariant violation rather
/// than a user error.
pub fn unpack(buf: &[u8], schema: &Schema) -> Result<Value> {
    let layout = Layout::of(schema)?;
    if buf.len() != layout.total_bytes {
        return Err(DsmError::internal(format!(
            "buffer is {} bytes, schema needs {}",
            buf.len(),
            layout.total_bytes
        )));
    }
    if layout.rank == 0 {
        return read_element(buf, schema.base, layout.element_size, 0);
    }
    tracing::debug!(
        base = schema.base.name(),
        rank = layout.rank,
        elements = layout.element_count,
        "unpacking array"
    );
    // One cursor is threaded through the whole recursive build so sibling
    // subtrees keep consuming consecutive elements.
    let mut cursor = 0usize;
    let value = build_nested(
        buf,
        schema.base,
        layout.element_size,
        schema.array_dims(),
        0,
        &mut cursor,
    )?;
    if cursor != layout.element_count {
        return Err(DsmError::internal(format!(
            "consumed {} of {} elements",
            cursor, layout.element_count
        )));
    }
    Ok(value)
}

/// Build the sequence tree outermost-dimension-first, consuming elements in
/// row-major order at the innermost level.
fn build_nested(
    buf: &[u8],
    base: BaseType,
    element_size: usize,
    dims: &[usize],
    depth: usize,
    cursor: &mut usize,
) -> Result<Value> {
    let len = dims[depth];
    let mut items = Vec::with_capacity(len);
    if depth + 1 == dims.len() {
        for _ in 0..len {
            items.push(read_element(buf, base, element_size, *cursor)?);
            *cursor += 1;
        }
    } else {
        for _ in 0..len {
            items.push(build_nested(buf, base, element_size, dims, depth + 1, cursor)?);
        }
    }
    Ok(Value::Seq(items))
}

/// Read the element at flattened `index`, widening to the host
/// representation (`i64` for integers, `f64` for floating point).
fn read_element(buf: &[u8], base: BaseType, element_size: usize, index: usize) -> Result<Value> {
    let offset = index * element_size;
    match base {
        BaseType::Byte => {
            let raw: [u8; 1] = slice_exact(buf, offset)?;
            Ok(Value::Int(i8::from_ne_bytes(raw) as i64))
        }
        BaseType::Short => {
            let raw: [u8; 2] = slice_exact(buf, offset)?;
            Ok(Value::Int(i16::from_ne_bytes(raw) as i64))
        }
        BaseType::Long => {
            let raw: [u8; 4] = slice_exact(buf, offset)?;
            Ok(Value::Int(i32::from_ne_bytes(raw) as i64))
        }
        BaseType::Float => {
            let raw: [u8; 4] = slice_exact(buf, offset)?;
            Ok(Value::Float(f32::from_ne_bytes(raw) as f64))
        }
        BaseType::Double => {
            let raw: [u8; 8] = slice_exact(buf, offset)?;
            Ok(Value::Float(f64::from_ne_bytes(raw)))
        }
        BaseType::String => {
            let raw = buf.get(offset..offset + element_size).ok_or_else(|| {
                DsmError::internal("string element past end of buffer")
            })?;
            // C-string semantics: stop at the first NUL, cap at the
            // fixed buffer length.
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            Ok(Value::Text(
                String::from_utf8_lossy(&raw[..end]).into_owned(),
            ))
        }
        BaseType::Structure => Err(DsmError::internal(
            "structure reached the element marshaler",
        )),
    }
}

fn slice_exact<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    buf.get(offset..offset + N)
        .and_then(|raw| raw.try_into().ok())
        .ok_or_else(|| DsmError::internal("element read past end of buffer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NameOptions;

    fn schema(name: &str) -> Schema {
        Schema::decode(name, &NameOptions::default()).unwrap()
    }

    #[test]
    fn test_scalar_widening() {
        assert_eq!(
            unpack(&(-5i8).to_ne_bytes(), &schema("AB")).unwrap(),
            Value::Int(-5)
        );
        assert_eq!(
            unpack(&(-300i16).to_ne_bytes(), &schema("AS")).unwrap(),
            Value::Int(-300)
        );
        assert_eq!(
            unpack(&1.5f32.to_ne_bytes(), &schema("AF")).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_string_stops_at_nul() {
        let buf = *b"AB\0CDEFG";
        assert_eq!(
            unpack(&buf, &schema("MC8")).unwrap(),
            Value::Text("AB".into())
        );
        let full = *b"ABCDEFGH";
        assert_eq!(
            unpack(&full, &schema("MC8")).unwrap(),
            Value::Text("ABCDEFGH".into())
        );
    }

    #[test]
    fn test_wrong_buffer_size_is_internal() {
        assert!(matches!(
            unpack(&[0u8; 3], &schema("AL")),
            Err(DsmError::Internal { .. })
        ));
    }

    #[test]
    fn test_shared_cursor_across_siblings() {
        // [2,2] shorts: 1 2 / 3 4 in row-major order
        let mut buf = Vec::new();
        for v in [1i16, 2, 3, 4] {
            buf.extend_from_slice(&v.to_ne_bytes());
        }
        let value = unpack(&buf, &schema("A_V2_V2_S")).unwrap();
        let expect = Value::Seq(vec![
            Value::Seq(vec![Value::Int(1), Value::Int(2)]),
            Value::Seq(vec![Value::Int(3), Value::Int(4)]),
        ]);
        assert_eq!(value, expect);
    }
}
