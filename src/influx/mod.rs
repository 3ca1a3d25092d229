use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod channel;
pub mod inliner;
pub mod macros;
pub mod observer;
pub mod protocol;
pub mod queue;
pub mod reporter;
pub mod sender;

/// A single field value of a measurement.
///
/// The variant decides the line protocol type suffix: floats are written bare,
/// integers get an `i` suffix, unsigned integers a `u` suffix and strings are
/// double-quoted.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A 64-bit float. Non-finite values cannot be written and are skipped.
    Float(f64),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An unsigned 64-bit integer.
    UnsignedInteger(u64),
    /// A string value.
    String(String),
    /// A boolean value.
    Boolean(bool),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::UnsignedInteger(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::UnsignedInteger(u64::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// One data point to report: a name, tags, fields and a timestamp.
///
/// Measurements are assembled with consuming builder methods and are not
/// modified afterwards. Senders only ever borrow them.
///
/// ```
/// use influx_udp_metrics::Measurement;
///
/// let cpu = Measurement::new("cpu")
///     .tag("host", "server01")
///     .field("usage_idle", 93.5)
///     .field("cores", 8_i64)
///     .timestamp(1_700_000_000_000_000_000);
///
/// assert_eq!(cpu.name(), "cpu");
/// assert_eq!(cpu.tags().get("host").map(String::as_str), Some("server01"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    name: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: i64,
}

impl Measurement {
    /// Creates an empty measurement stamped with the current wall-clock time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: now_nanos(),
        }
    }

    /// Adds a tag, replacing any previous value for the same key.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a field, replacing any previous value for the same key.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the timestamp, in nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(mut self, nanos: i64) -> Self {
        self.timestamp = nanos;
        self
    }

    /// The measurement name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags, ordered by key.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Fields, ordered by key.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Timestamp in nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp_nanos(&self) -> i64 {
        self.timestamp
    }
}

fn now_nanos() -> i64 {
    // clocks before the epoch are reported as the epoch
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
}
