//! # influx-udp-metrics
//!
//! Reports measurements to InfluxDB over UDP using the line protocol.
//!
//! ## Features
//!
//! - **Line protocol encoder**: deterministic output, tags and fields in key order
//! - **UDP sender**: one datagram per measurement, one channel per batch, fire-and-forget
//! - **Queueing**: buffer single measurements and flush in bounded batches
//! - **Background reporter**: periodic flush thread with a final flush on shutdown
//! - **Injected observer**: send events go to `tracing` by default, or anywhere else
//!
//! ## Quick Start
//!
//! ```no_run
//! use influx_udp_metrics::{measurement, Measurement, MeasurementSender};
//! use influx_udp_metrics::{UdpInfluxdbProtocol, UdpInlinerSender};
//!
//! let protocol = UdpInfluxdbProtocol::new("127.0.0.1", 8089);
//! let sender = UdpInlinerSender::new(&protocol)?;
//!
//! let batch = vec![
//!     Measurement::new("cpu").tag("host", "server01").field("usage_idle", 93.5),
//!     measurement!("mem"; tags: ["host" => "server01"]; fields: ["used" => 1024_u64]),
//! ];
//!
//! // `false` only when no socket could be opened for the batch
//! let sent = sender.send(&batch);
//! # let _ = sent;
//! # Ok::<(), influx_udp_metrics::MetricsError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

// https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/
mod error;
mod influx;

pub use error::MetricsError;
pub use influx::channel::{ChannelFactory, DatagramChannel, UdpChannel, UdpChannelFactory};
pub use influx::inliner::{Inliner, Precision};
pub use influx::observer::{SendEvent, SendObserver, TracingObserver};
pub use influx::protocol::{UdpInfluxdbProtocol, DEFAULT_UDP_PORT};
pub use influx::queue::QueueableSender;
pub use influx::reporter::{InfluxReporter, ReporterOptions};
pub use influx::sender::{
    MeasurementSender, SenderOptions, UdpInlinerSender, DEFAULT_MAX_MEASURES_PER_SEND,
};
pub use influx::{FieldValue, Measurement};

/// Result type for encoding and sender setup.
pub type MetricResult<T> = Result<T, MetricsError>;
