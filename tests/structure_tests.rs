//! Integration tests for the structure adapter

use std::collections::BTreeMap;

use dsmlink::{DsmClient, DsmError, HostAllocations, MemTransport, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_with_temp_structure() -> MemTransport {
        let transport = MemTransport::new();
        transport.set_allocations(vec![HostAllocations {
            host: "partner1".into(),
            entries: vec!["TEMPX/T1B".into(), "TEMPX/T2B".into()],
        }]);
        // Blob layout: T1B at offset 0, T2B at offset 1
        transport.publish("partner1", "TEMPX", vec![5, 7]);
        transport
    }

    #[test]
    fn test_structure_read_prefix_stripped_members() {
        let client = DsmClient::new(transport_with_temp_structure());
        let (value, _timestamp) = client.read("partner1", "TEMPX").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("T1B"), Some(&Value::Int(5)));
        assert_eq!(map.get("T2B"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_unknown_partner_yields_empty_map() {
        let transport = transport_with_temp_structure();
        transport.publish("partner2", "TEMPX", vec![]);
        let client = DsmClient::new(transport);
        let (value, _) = client.read("partner2", "TEMPX").unwrap();
        assert_eq!(value, Value::Map(BTreeMap::new()));
    }

    #[test]
    fn test_structure_write_updates_named_members() {
        let client = DsmClient::new(transport_with_temp_structure());
        let mut members = BTreeMap::new();
        members.insert("T1B".to_string(), Value::Int(42));
        client
            .write("partner1", "TEMPX", &Value::Map(members), false)
            .unwrap();
        let (value, _) = client.read("partner1", "TEMPX").unwrap();
        let map = value.as_map().unwrap();
        // Written member changed, untouched member kept its contents
        assert_eq!(map.get("T1B"), Some(&Value::Int(42)));
        assert_eq!(map.get("T2B"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_failed_member_aborts_whole_write() {
        let client = DsmClient::new(transport_with_temp_structure());
        let mut members = BTreeMap::new();
        members.insert("T1B".to_string(), Value::Int(1));
        members.insert("T2B".to_string(), Value::Int(500)); // out of byte range
        let err = client
            .write("partner1", "TEMPX", &Value::Map(members), false)
            .unwrap_err();
        assert!(matches!(err, DsmError::Range { .. }));
        // Nothing was flushed, including the valid member
        let (value, _) = client.read("partner1", "TEMPX").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("T1B"), Some(&Value::Int(5)));
        assert_eq!(map.get("T2B"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_unknown_member_key_is_decode_error() {
        let client = DsmClient::new(transport_with_temp_structure());
        let mut members = BTreeMap::new();
        members.insert("T9B".to_string(), Value::Int(1));
        assert!(matches!(
            client.write("partner1", "TEMPX", &Value::Map(members), false),
            Err(DsmError::Decode { .. })
        ));
    }

    #[test]
    fn test_structure_write_requires_map() {
        let client = DsmClient::new(transport_with_temp_structure());
        assert!(matches!(
            client.write("partner1", "TEMPX", &Value::Int(1), false),
            Err(DsmError::Decode { .. })
        ));
    }

    #[test]
    fn test_nested_structure_member_not_implemented() {
        let transport = MemTransport::new();
        transport.set_allocations(vec![HostAllocations {
            host: "partner1".into(),
            entries: vec!["OUTERX/INNERX".into()],
        }]);
        transport.publish("partner1", "OUTERX", vec![]);
        let client = DsmClient::new(transport);
        assert!(matches!(
            client.read("partner1", "OUTERX"),
            Err(DsmError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_mixed_member_types() {
        let transport = MemTransport::new();
        transport.set_allocations(vec![HostAllocations {
            host: "partner1".into(),
            entries: vec![
                "STATEX/COUNTL".into(),
                "STATEX/RATIOD".into(),
                "STATEX/LABELC8".into(),
            ],
        }]);
        let mut blob = Vec::new();
        blob.extend_from_slice(&7i32.to_ne_bytes());
        blob.extend_from_slice(&0.5f64.to_ne_bytes());
        blob.extend_from_slice(b"ok\0\0\0\0\0\0");
        transport.publish("partner1", "STATEX", blob);

        let client = DsmClient::new(transport);
        let (value, _) = client.read("partner1", "STATEX").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("COUNTL"), Some(&Value::Int(7)));
        assert_eq!(map.get("RATIOD"), Some(&Value::Float(0.5)));
        assert_eq!(map.get("LABELC8"), Some(&Value::Text("ok".into())));
    }

    #[test]
    fn test_member_table_cached_after_first_access() {
        let client = DsmClient::new(transport_with_temp_structure());
        client.read("partner1", "TEMPX").unwrap();
        // Later allocation-list changes are invisible: staleness accepted
        client.transport().set_allocations(vec![]);
        let (value, _) = client.read("partner1", "TEMPX").unwrap();
        assert_eq!(value.as_map().unwrap().len(), 2);
    }
}
