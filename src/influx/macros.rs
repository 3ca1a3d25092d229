/// Macro for building a [`Measurement`](crate::Measurement) from literal tags and fields.
///
/// Tags are optional, fields are not. Keys and values go through the same
/// `Into` conversions as [`Measurement::tag`](crate::Measurement::tag) and
/// [`Measurement::field`](crate::Measurement::field). The measurement is
/// stamped with the current time.
///
/// # Examples
///
/// ```
/// use influx_udp_metrics::{measurement, FieldValue};
///
/// // With tags
/// let m = measurement!("http_requests"; tags: ["method" => "GET", "status" => 200.to_string()]; fields: ["count" => 12_i64]);
/// assert_eq!(m.tags().len(), 2);
///
/// // Without tags
/// let m = measurement!("load"; fields: ["avg1" => 0.25, "avg5" => 0.5]);
/// assert_eq!(m.fields()["avg5"], FieldValue::Float(0.5));
/// ```
#[macro_export]
macro_rules! measurement {
    // With tags
    ($name:expr; tags: [$($tk:expr => $tv:expr),* $(,)?]; fields: [$($fk:expr => $fv:expr),+ $(,)?]) => {
        $crate::Measurement::new($name)
            $(.tag($tk, $tv))*
            $(.field($fk, $fv))+
    };
    // Without tags
    ($name:expr; fields: [$($fk:expr => $fv:expr),+ $(,)?]) => {
        $crate::Measurement::new($name)
            $(.field($fk, $fv))+
    };
}
