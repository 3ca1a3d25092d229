use std::fmt::Write;

use itoa::Buffer;

use super::{FieldValue, Measurement};
use crate::{MetricResult, MetricsError};

/// Resolution of the timestamp written at the end of each line.
///
/// Must match the precision the receiving UDP listener is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Nanoseconds, the line protocol default.
    #[default]
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
}

impl Precision {
    const fn divisor(self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
        }
    }

    /// Converts a nanosecond timestamp into this precision.
    #[must_use]
    pub const fn convert(self, nanos: i64) -> i64 {
        nanos / self.divisor()
    }
}

/// Encodes measurements into InfluxDB line protocol.
///
/// Output is `name[,tag=value...] field=value[,field=value...] timestamp\n` with
/// tags and fields in key order, so encoding the same measurement twice always
/// yields the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inliner {
    precision: Precision,
}

// characters that need a backslash in each position of a line
const NAME_SPECIALS: &[char] = &[',', ' ', '\\'];
const KEY_SPECIALS: &[char] = &[',', '=', ' ', '\\'];
const STRING_SPECIALS: &[char] = &['"', '\\'];

// Names, keys and tag values are rejected rather than escaped when:
// - they end in a backslash, which reads as an escape of the separator after
//   it even when doubled;
// - they hold a line break or tab, which ends the token and has no escape;
// - a name starts with `#`, which turns the line into a comment;
// - a name holds a NUL.
const UNESCAPABLE: &[char] = &['\n', '\r', '\t'];
const COMMENT_MARKER: char = '#';

impl Inliner {
    /// Creates an encoder writing timestamps with the given precision.
    #[must_use]
    pub const fn new(precision: Precision) -> Self {
        Self { precision }
    }

    /// Timestamp precision used by this encoder.
    #[must_use]
    pub const fn precision(&self) -> Precision {
        self.precision
    }

    /// Encodes one measurement as a single newline-terminated line.
    ///
    /// # Errors
    /// Returns [`MetricsError::EmptyName`] if the name is empty,
    /// [`MetricsError::NoFields`] if no field can be written and
    /// [`MetricsError::Unrepresentable`] if a name, key or tag value would not
    /// read back unchanged.
    pub fn inline(&self, measurement: &Measurement) -> MetricResult<String> {
        let mut line = String::with_capacity(64);
        self.inline_into(measurement, &mut line)?;
        Ok(line)
    }

    /// Appends the encoded line to `out`. On error `out` is left unchanged.
    ///
    /// # Errors
    /// Same as [`Inliner::inline`].
    pub fn inline_into(&self, measurement: &Measurement, out: &mut String) -> MetricResult<()> {
        let start = out.len();
        let res = self.write_line(measurement, out);
        if res.is_err() {
            out.truncate(start);
        }
        res
    }

    fn write_line(&self, measurement: &Measurement, out: &mut String) -> MetricResult<()> {
        let name = measurement.name();
        if name.is_empty() {
            return Err(MetricsError::EmptyName);
        }
        if name.starts_with(COMMENT_MARKER) || name.contains('\0') {
            return Err(MetricsError::Unrepresentable(format!(
                "measurement name {name:?}"
            )));
        }
        check_token("measurement name", name)?;
        push_escaped(out, name, NAME_SPECIALS);

        for (key, value) in measurement.tags() {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            check_token("tag key", key)?;
            check_token("tag value", value)?;
            out.push(',');
            push_escaped(out, key, KEY_SPECIALS);
            out.push('=');
            push_escaped(out, value, KEY_SPECIALS);
        }

        let mut buffer = Buffer::new();
        let mut separator = ' ';
        for (key, value) in measurement.fields() {
            if key.is_empty() || !is_encodable(value) {
                continue;
            }
            check_token("field key", key)?;
            out.push(separator);
            separator = ',';
            push_escaped(out, key, KEY_SPECIALS);
            out.push('=');
            push_field_value(out, value, &mut buffer);
        }

        if separator == ' ' {
            return Err(MetricsError::NoFields(name.to_owned()));
        }

        out.push(' ');
        out.push_str(buffer.format(self.precision.convert(measurement.timestamp_nanos())));
        out.push('\n');
        Ok(())
    }
}

fn check_token(kind: &str, value: &str) -> MetricResult<()> {
    if value.ends_with('\\') {
        return Err(MetricsError::Unrepresentable(format!(
            "{kind} {value:?} ends with a backslash"
        )));
    }
    if value.contains(UNESCAPABLE) {
        return Err(MetricsError::Unrepresentable(format!(
            "{kind} {value:?} holds a line break or tab"
        )));
    }
    Ok(())
}

fn is_encodable(value: &FieldValue) -> bool {
    match value {
        FieldValue::Float(f) => f.is_finite(),
        _ => true,
    }
}

fn push_field_value(out: &mut String, value: &FieldValue, buffer: &mut Buffer) {
    match value {
        FieldValue::Float(f) => {
            // Display on f64 never fails and never uses exponent notation
            let _ = write!(out, "{f}");
        }
        FieldValue::Integer(i) => {
            out.push_str(buffer.format(*i));
            out.push('i');
        }
        FieldValue::UnsignedInteger(u) => {
            out.push_str(buffer.format(*u));
            out.push('u');
        }
        FieldValue::String(s) => {
            out.push('"');
            for c in s.chars() {
                if STRING_SPECIALS.contains(&c) {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}

fn push_escaped(out: &mut String, value: &str, specials: &[char]) {
    for c in value.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
