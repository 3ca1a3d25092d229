#![no_main]

use influx_udp_metrics::{FieldValue, Inliner, Measurement, MetricsError, Precision};
use influxdb_line_protocol::{parse_lines, FieldValue as ParsedValue};
use libfuzzer_sys::fuzz_target;

// Fuzz target focusing on escaping of names, tags and string fields
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let precision = match data[0] % 4 {
        0 => Precision::Nanoseconds,
        1 => Precision::Microseconds,
        2 => Precision::Milliseconds,
        _ => Precision::Seconds,
    };

    // Split the rest into chunks used as name, tag key/value and field key/value
    let text = String::from_utf8_lossy(&data[1..]);
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = (chars.len() / 5).max(1);
    let mut parts = chars.chunks(chunk_size).map(|c| c.iter().collect::<String>());

    let name = parts.next().unwrap_or_default();
    let tag_key = parts.next().unwrap_or_default();
    let tag_value = parts.next().unwrap_or_default();
    let field_key = parts.next().unwrap_or_default();
    let field_value = parts.next().unwrap_or_default();

    let measurement = Measurement::new(name)
        .tag(tag_key, tag_value)
        .field(field_key, field_value.clone())
        .field("len", field_value.len() as u64)
        .timestamp(i64::from(data[0]) << 40);

    // string fields keep raw newlines inside their quotes
    let quoted_newlines: usize = measurement
        .fields()
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(_, value)| match value {
            FieldValue::String(s) => s.matches('\n').count(),
            _ => 0,
        })
        .sum();

    let line = match Inliner::new(precision).inline(&measurement) {
        Ok(line) => line,
        Err(MetricsError::Unrepresentable(_) | MetricsError::EmptyName) => return,
        Err(err) => panic!("unexpected error: {err}"),
    };

    // one measurement is always exactly one line
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), quoted_newlines + 1);

    // and that line reads back as the same measurement
    let parsed: Vec<_> = parse_lines(line.trim_end_matches('\n')).collect();
    let parsed = match parsed.as_slice() {
        [Ok(parsed)] => parsed,
        other => panic!("{line:?} decoded as {other:?}"),
    };
    assert_eq!(parsed.series.measurement.to_string(), measurement.name());

    let tags: Vec<(String, String)> = parsed
        .series
        .tag_set
        .iter()
        .flatten()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let expected_tags: Vec<(String, String)> = measurement
        .tags()
        .iter()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    assert_eq!(tags, expected_tags);

    let fields: Vec<(String, FieldValue)> = parsed
        .field_set
        .iter()
        .map(|(k, v)| {
            let value = match v {
                ParsedValue::String(s) => FieldValue::String(s.to_string()),
                ParsedValue::U64(u) => FieldValue::UnsignedInteger(*u),
                other => panic!("unexpected field type {other:?}"),
            };
            (k.to_string(), value)
        })
        .collect();
    let expected_fields: Vec<(String, FieldValue)> = measurement
        .fields()
        .iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    assert_eq!(fields, expected_fields);

    assert_eq!(
        parsed.timestamp,
        Some(precision.convert(measurement.timestamp_nanos()))
    );
});
