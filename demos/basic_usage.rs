#!/usr/bin/env rust

//! Basic usage example of the dsmlink client

use std::collections::BTreeMap;

use dsmlink::{DsmClient, HostAllocations, MemTransport, Result, Value};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("dsmlink Typed-Name DSM Client Example");
    println!("=====================================");

    // An in-memory transport stands in for the real DSM service
    let transport = MemTransport::new();
    transport.set_allocations(vec![HostAllocations {
        host: "antenna1".into(),
        entries: vec!["WEATHERX/TEMPD".into(), "WEATHERX/SITEC16".into()],
    }]);
    transport.publish("antenna1", "WEATHERX", vec![0; 8 + 16]);

    let client = DsmClient::new(transport);

    // Scalars and arrays: the name carries the whole schema
    client.write("antenna1", "AZIMUTHD", &Value::Float(182.5), false)?;
    let (azimuth, timestamp) = client.read("antenna1", "AZIMUTHD")?;
    println!("AZIMUTHD = {azimuth:?} (written at {timestamp})");

    let gains = Value::Seq(vec![
        Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        Value::Seq(vec![Value::Int(4), Value::Int(5), Value::Int(6)]),
    ]);
    client.write("antenna1", "GAINS_V2_V3_L", &gains, false)?;
    let (gains_back, _) = client.read("antenna1", "GAINS_V2_V3_L")?;
    println!("GAINS_V2_V3_L = {gains_back:?}");

    // Structures marshal member-by-member into one mapping
    let mut weather = BTreeMap::new();
    weather.insert("TEMPD".to_string(), Value::Float(-4.25));
    weather.insert("SITEC16".to_string(), Value::Text("mauna kea".into()));
    client.write("antenna1", "WEATHERX", &Value::Map(weather), false)?;
    let (station, _) = client.read("antenna1", "WEATHERX")?;
    println!("WEATHERX = {station:?}");

    // Monitoring: block until a monitored variable changes
    client.monitor("antenna1", "AZIMUTHD")?;
    client.write("antenna1", "AZIMUTHD", &Value::Float(183.0), true)?;
    let (partner, name, value, _) = client.read_wait()?;
    println!("read_wait: {name} on {partner} changed to {value:?}");

    println!("Example completed successfully!");
    Ok(())
}
