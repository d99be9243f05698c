//! Integration tests for the bidirectional marshaling engine

use dsmlink::{pack, unpack, DsmError, NameOptions, Schema, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &str) -> Schema {
        Schema::decode(name, &NameOptions::default()).unwrap()
    }

    fn roundtrip(name: &str, value: Value) {
        let s = schema(name);
        let buf = pack(&value, &s).unwrap();
        assert_eq!(unpack(&buf, &s).unwrap(), value, "{name}");
    }

    fn ints(values: &[i64]) -> Value {
        Value::Seq(values.iter().map(|&v| Value::Int(v)).collect())
    }

    #[test]
    fn test_scalar_roundtrips() {
        roundtrip("AB", Value::Int(-128));
        roundtrip("AB", Value::Int(127));
        roundtrip("AS", Value::Int(-32768));
        roundtrip("AL", Value::Int(-2000000000));
        roundtrip("AF", Value::Float(0.25));
        roundtrip("AD", Value::Float(-1234.5678));
        roundtrip("MSGC12", Value::Text("hello".into()));
        roundtrip("MSGC12", Value::Text("".into()));
    }

    #[test]
    fn test_array_roundtrips() {
        roundtrip("A_V4_B", ints(&[1, -2, 3, -4]));
        roundtrip(
            "A_V2_V3_S",
            Value::Seq(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]),
        );
        roundtrip(
            "A_V2_V2_V2_D",
            Value::Seq(vec![
                Value::Seq(vec![
                    Value::Seq(vec![Value::Float(1.0), Value::Float(2.0)]),
                    Value::Seq(vec![Value::Float(3.0), Value::Float(4.0)]),
                ]),
                Value::Seq(vec![
                    Value::Seq(vec![Value::Float(5.0), Value::Float(6.0)]),
                    Value::Seq(vec![Value::Float(7.0), Value::Float(8.0)]),
                ]),
            ]),
        );
        roundtrip(
            "NAMES_V2_C6",
            Value::Seq(vec![Value::Text("abc".into()), Value::Text("de".into())]),
        );
    }

    #[test]
    fn test_rank_four_roundtrip() {
        let leaf = |base: i64| ints(&[base, base + 1]);
        let level2 = |base: i64| Value::Seq(vec![leaf(base), leaf(base + 10)]);
        let level1 = |base: i64| Value::Seq(vec![level2(base), level2(base + 100)]);
        let value = Value::Seq(vec![level1(0), level1(1000)]);
        roundtrip("A_V2_V2_V2_V2_L", value);
    }

    #[test]
    fn test_byte_range_enforced() {
        let s = schema("AB");
        assert!(matches!(
            pack(&Value::Int(200), &s),
            Err(DsmError::Range { .. })
        ));
        let buf = pack(&Value::Int(100), &s).unwrap();
        assert_eq!(unpack(&buf, &s).unwrap(), Value::Int(100));
    }

    #[test]
    fn test_short_range_enforced() {
        let s = schema("AS");
        assert!(matches!(
            pack(&Value::Int(40000), &s),
            Err(DsmError::Range { .. })
        ));
        assert!(matches!(
            pack(&Value::Int(-40000), &s),
            Err(DsmError::Range { .. })
        ));
    }

    #[test]
    fn test_long_truncates_without_range_check() {
        // Legacy cast semantics: the value truncates to 32 bits
        let s = schema("AL");
        let buf = pack(&Value::Int((1 << 40) + 9), &s).unwrap();
        assert_eq!(unpack(&buf, &s).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_string_truncation_boundary() {
        let s = schema("MSGC8");
        // element_size - 1 characters fit
        let ok = pack(&Value::Text("1234567".into()), &s).unwrap();
        assert_eq!(ok.len(), 8);
        assert_eq!(unpack(&ok, &s).unwrap(), Value::Text("1234567".into()));
        // element_size characters do not
        assert!(matches!(
            pack(&Value::Text("12345678".into()), &s),
            Err(DsmError::Range { .. })
        ));
    }

    #[test]
    fn test_row_major_offsets() {
        // dims [2,3]: logical index (1,2) lands at offset (1*3+2)*4
        let s = schema("A_V2_V3_L");
        let value = Value::Seq(vec![ints(&[10, 11, 12]), ints(&[13, 14, 15])]);
        let buf = pack(&value, &s).unwrap();
        let offset = (1 * 3 + 2) * 4;
        let raw: [u8; 4] = buf[offset..offset + 4].try_into().unwrap();
        assert_eq!(i32::from_ne_bytes(raw), 15);
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let s = schema("A_V2_V3_L");
        // Wrong outer length
        let short_outer = Value::Seq(vec![ints(&[1, 2, 3])]);
        assert!(matches!(
            pack(&short_outer, &s),
            Err(DsmError::Decode { .. })
        ));
        // Wrong inner length
        let short_inner = Value::Seq(vec![ints(&[1, 2, 3]), ints(&[4, 5])]);
        assert!(matches!(
            pack(&short_inner, &s),
            Err(DsmError::Decode { .. })
        ));
        // Nesting too shallow
        assert!(matches!(
            pack(&ints(&[1, 2]), &s),
            Err(DsmError::Decode { .. })
        ));
    }

    #[test]
    fn test_wrong_leaf_kind_is_decode_error() {
        let s = schema("A_V2_B");
        let value = Value::Seq(vec![Value::Int(1), Value::Text("x".into())]);
        assert!(matches!(pack(&value, &s), Err(DsmError::Decode { .. })));
    }

    #[test]
    fn test_scalar_kind_mismatch() {
        assert!(matches!(
            pack(&Value::Text("1".into()), &schema("AB")),
            Err(DsmError::Decode { .. })
        ));
        assert!(matches!(
            pack(&Value::Int(1), &schema("MSGC4")),
            Err(DsmError::Decode { .. })
        ));
    }

    #[test]
    fn test_float_target_widens_int() {
        let s = schema("AF");
        let buf = pack(&Value::Int(2), &s).unwrap();
        assert_eq!(unpack(&buf, &s).unwrap(), Value::Float(2.0));
    }
}
