use crate::{bind_listener, collect_datagrams, collect_exact};
use influx_udp_metrics::{
    FieldValue, Inliner, Measurement, MeasurementSender, MetricsError, UdpInfluxdbProtocol,
    UdpInlinerSender,
};
use influxdb_line_protocol::{parse_lines, FieldValue as ParsedValue};
use std::time::Duration;

/// Decodes one line back into a measurement with the reference parser
fn decode(line: &str) -> Measurement {
    let parsed = parse_lines(line.trim_end_matches('\n'))
        .next()
        .expect("no line parsed")
        .expect("line does not parse");

    let mut measurement = Measurement::new(parsed.series.measurement.to_string());
    if let Some(tag_set) = &parsed.series.tag_set {
        for (key, value) in tag_set {
            measurement = measurement.tag(key.to_string(), value.to_string());
        }
    }
    for (key, value) in &parsed.field_set {
        let value = match value {
            ParsedValue::I64(i) => FieldValue::Integer(*i),
            ParsedValue::U64(u) => FieldValue::UnsignedInteger(*u),
            ParsedValue::F64(f) => FieldValue::Float(*f),
            ParsedValue::String(s) => FieldValue::String(s.to_string()),
            ParsedValue::Boolean(b) => FieldValue::Boolean(*b),
        };
        measurement = measurement.field(key.to_string(), value);
    }
    measurement.timestamp(parsed.timestamp.expect("line has no timestamp"))
}

fn samples() -> Vec<Measurement> {
    vec![
        Measurement::new("cpu")
            .tag("host", "server01")
            .tag("region", "us-west")
            .field("usage_idle", 93.25)
            .field("usage_user", 0.1)
            .timestamp(1_465_839_830_100_400_200),
        Measurement::new("weather station")
            .tag("location", "north, upper deck")
            .tag("unit=metric", "yes")
            .field("temperature", -3.5)
            .field("humidity", 87_i64)
            .field("uptime", 123_456_u64)
            .field("online", true)
            .timestamp(1),
        Measurement::new("logs")
            .field("message", "user \"admin\" logged in from C:\\temp")
            .field("empty", "")
            .timestamp(0),
    ]
}

#[test]
fn test_roundtrip_recovers_measurement() {
    let inliner = Inliner::default();
    for original in samples() {
        let line = inliner.inline(&original).unwrap();
        assert_eq!(decode(&line), original, "line: {line}");
    }
}

/// Names, keys and tag values at the edge of what line protocol can carry
fn awkward() -> Vec<Measurement> {
    let base = |name: &str| Measurement::new(name).timestamp(42);
    vec![
        base("cpu\\").field("v", 1_i64),
        base("cpu").tag("host", "C:\\").field("v", 1_i64),
        base("cpu").tag("host\\", "a").field("v", 1_i64),
        base("cpu").tag("host", "a").field("k\\", 1_i64),
        base("#cpu").field("v", 1_i64),
        base("a\nb").field("v", 1_i64),
        base("cpu").tag("host", "a\rb").field("v", 1_i64),
        base("cpu").tag("host", "a\tb").field("v", 1_i64),
        base("c\0pu").field("v", 1_i64),
        base("disk").tag("path", "C:\\temp").field("v", 1_i64),
        base("disk").tag("path", "a\\,b\\ c\\=d").field("v", 1_i64),
        base("dir\\name").tag("k\\\\ey", "\\\\share\\x").field("re\\ad", 1_i64),
        base("cpu#1").tag("#tag", "#v").field("#f", 1_i64),
        base("notes").field("text", "line one\nline two\tend\\"),
    ]
}

#[test]
fn test_awkward_inputs_roundtrip_or_are_rejected() {
    let inliner = Inliner::default();
    let mut encoded = 0;
    for original in awkward() {
        match inliner.inline(&original) {
            Ok(line) => {
                assert_eq!(decode(&line), original, "line: {line:?}");
                encoded += 1;
            }
            Err(MetricsError::Unrepresentable(_)) => {}
            Err(err) => panic!("unexpected error {err} for {original:?}"),
        }
    }
    // backslashes that do not end a token and '#' past the start all survive
    assert_eq!(encoded, 5);
}

#[test]
fn test_only_representable_inputs_reach_the_wire() {
    let (listener, addr) = bind_listener(Duration::from_millis(500));
    let protocol = UdpInfluxdbProtocol::new(addr.ip().to_string(), addr.port());
    let sender = UdpInlinerSender::new(&protocol).unwrap();
    let batch = awkward();

    assert!(sender.send(&batch));

    let received = collect_datagrams(&listener);
    assert_eq!(received.len(), 5);
    for datagram in &received {
        let line = datagram.trim_end_matches('\n');
        let parsed: Vec<_> = parse_lines(line).collect();
        assert!(matches!(parsed.as_slice(), [Ok(_)]), "datagram: {datagram:?}");
    }
}

#[test]
fn test_encoding_twice_gives_same_text() {
    let inliner = Inliner::default();
    for original in samples() {
        assert_eq!(inliner.inline(&original).unwrap(), inliner.inline(&original).unwrap());
    }
}

#[test]
fn test_roundtrip_through_udp() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let protocol = UdpInfluxdbProtocol::new(addr.ip().to_string(), addr.port());
    let sender = UdpInlinerSender::new(&protocol).unwrap();
    let originals = samples();

    assert!(sender.send(&originals));

    let mut decoded: Vec<Measurement> = collect_exact(&listener, originals.len())
        .iter()
        .map(|datagram| decode(datagram))
        .collect();
    decoded.sort_by_key(|m| m.timestamp_nanos());

    let mut expected = originals;
    expected.sort_by_key(|m| m.timestamp_nanos());
    assert_eq!(decoded, expected);
}
