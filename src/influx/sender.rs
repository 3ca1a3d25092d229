use std::mem::ManuallyDrop;
use std::net::SocketAddr;
use std::sync::Arc;

use super::channel::{ChannelFactory, DatagramChannel, UdpChannelFactory};
use super::inliner::{Inliner, Precision};
use super::observer::{SendEvent, SendObserver, TracingObserver};
use super::protocol::UdpInfluxdbProtocol;
use super::Measurement;
use crate::{MetricResult, MetricsError};

/// Largest batch sent through a single channel.
pub const DEFAULT_MAX_MEASURES_PER_SEND: usize = 5000;

/// Trait for anything that can deliver a batch of measurements.
pub trait MeasurementSender {
    /// Sends a batch and reports whether it was handed to the transport.
    ///
    /// An empty batch is a no-op that returns `true`.
    fn send(&self, measures: &[Measurement]) -> bool;

    /// Maximum batch size this sender handles in one go.
    fn max_measures_per_send(&self) -> usize;
}

/// Configuration options for [`UdpInlinerSender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderOptions {
    /// Batches larger than this are split into chunks of this size, each sent
    /// through its own channel. Must be greater than zero.
    pub max_measures_per_send: usize,
    /// Local address channels bind to. `None` binds an ephemeral port on the
    /// unspecified address of the destination's family.
    pub bind_addr: Option<SocketAddr>,
    /// Precision of the timestamps written on each line.
    pub precision: Precision,
}

impl Default for SenderOptions {
    fn default() -> Self {
        Self {
            max_measures_per_send: DEFAULT_MAX_MEASURES_PER_SEND,
            bind_addr: None,
            precision: Precision::default(),
        }
    }
}

/// Sends measurements as InfluxDB line protocol over UDP, one datagram per
/// measurement.
///
/// Each batch gets its own channel, released when the batch is done:
///
/// - if the channel cannot be opened the batch is dropped and `send` returns
///   `false` without sending anything;
/// - a measurement that fails to encode or send is counted and reported to the
///   observer, the rest of the batch is still sent and the result stays `true`;
/// - an error while releasing the channel is reported and ignored.
///
/// Delivery is fire-and-forget: nothing is retried.
///
/// # Example
///
/// ```no_run
/// use influx_udp_metrics::{Measurement, MeasurementSender, UdpInfluxdbProtocol, UdpInlinerSender};
///
/// let sender = UdpInlinerSender::new(&UdpInfluxdbProtocol::new("127.0.0.1", 8089))?;
/// let batch = [Measurement::new("cpu").tag("host", "a").field("load", 0.42)];
/// assert!(sender.send(&batch));
/// # Ok::<(), influx_udp_metrics::MetricsError>(())
/// ```
pub struct UdpInlinerSender<F = UdpChannelFactory> {
    inliner: Inliner,
    destination: SocketAddr,
    max_measures_per_send: usize,
    factory: F,
    observer: Arc<dyn SendObserver + Send + Sync>,
}

impl UdpInlinerSender {
    /// Creates a sender with default options.
    ///
    /// # Errors
    /// Returns [`MetricsError::UnresolvedDestination`] if the host does not resolve.
    pub fn new(protocol: &UdpInfluxdbProtocol) -> MetricResult<Self> {
        Self::with_options(protocol, SenderOptions::default())
    }

    /// Creates a sender backed by real UDP sockets.
    ///
    /// # Errors
    /// Returns [`MetricsError::UnresolvedDestination`] if the host does not
    /// resolve and [`MetricsError::InvalidOption`] for a zero batch size.
    pub fn with_options(protocol: &UdpInfluxdbProtocol, options: SenderOptions) -> MetricResult<Self> {
        let destination = protocol.resolve()?;
        let factory = options
            .bind_addr
            .map_or_else(|| UdpChannelFactory::for_destination(destination), UdpChannelFactory::new);
        Self::build(destination, options, factory)
    }
}

impl<F: ChannelFactory> UdpInlinerSender<F> {
    /// Creates a sender that opens its channels through `factory`.
    ///
    /// `options.bind_addr` is ignored, binding is up to the factory.
    ///
    /// # Errors
    /// Same as [`UdpInlinerSender::with_options`].
    pub fn with_factory(
        protocol: &UdpInfluxdbProtocol,
        options: SenderOptions,
        factory: F,
    ) -> MetricResult<Self> {
        Self::build(protocol.resolve()?, options, factory)
    }

    fn build(destination: SocketAddr, options: SenderOptions, factory: F) -> MetricResult<Self> {
        if options.max_measures_per_send == 0 {
            return Err(MetricsError::InvalidOption(
                "max_measures_per_send must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            inliner: Inliner::new(options.precision),
            destination,
            max_measures_per_send: options.max_measures_per_send,
            factory,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replaces the observer receiving send events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SendObserver + Send + Sync>) -> Self {
        self.observer = observer;
        self
    }

    /// Resolved destination address.
    #[must_use]
    pub const fn destination(&self) -> SocketAddr {
        self.destination
    }

    fn send_chunk(&self, measures: &[Measurement]) -> bool {
        let channel = match self.factory.open() {
            Ok(channel) => channel,
            Err(err) => {
                self.observer.on_event(&SendEvent::ChannelOpenFailed {
                    count: measures.len(),
                    destination: self.destination,
                    error: &err,
                });
                return false;
            }
        };
        // released on drop, whatever happens below
        let guard = ChannelGuard {
            channel: ManuallyDrop::new(channel),
            observer: self.observer.as_ref(),
        };

        let mut errors = 0;
        let mut line = String::with_capacity(128);
        for measure in measures {
            line.clear();
            if let Err(err) = self.inliner.inline_into(measure, &mut line) {
                self.observer.on_event(&SendEvent::EncodeFailed { error: &err });
                errors += 1;
                continue;
            }

            self.observer.on_event(&SendEvent::Encoded { line: &line });
            if let Err(err) = guard.channel.send_to(line.as_bytes(), self.destination) {
                self.observer.on_event(&SendEvent::DatagramFailed {
                    destination: self.destination,
                    error: &err,
                });
                errors += 1;
            }
        }

        self.observer.on_event(&SendEvent::BatchSent {
            count: measures.len(),
            errors,
            destination: self.destination,
        });
        true
    }
}

impl<F: ChannelFactory> MeasurementSender for UdpInlinerSender<F> {
    fn send(&self, measures: &[Measurement]) -> bool {
        let mut success = true;
        for chunk in measures.chunks(self.max_measures_per_send) {
            success &= self.send_chunk(chunk);
        }
        success
    }

    fn max_measures_per_send(&self) -> usize {
        self.max_measures_per_send
    }
}

impl<F> std::fmt::Debug for UdpInlinerSender<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpInlinerSender")
            .field("destination", &self.destination)
            .field("max_measures_per_send", &self.max_measures_per_send)
            .field("precision", &self.inliner.precision())
            .finish_non_exhaustive()
    }
}

struct ChannelGuard<'a, C: DatagramChannel> {
    channel: ManuallyDrop<C>,
    observer: &'a (dyn SendObserver + Send + Sync),
}

impl<C: DatagramChannel> Drop for ChannelGuard<'_, C> {
    fn drop(&mut self) {
        // SAFETY: drop runs once and the channel is not touched after being taken
        let channel = unsafe { ManuallyDrop::take(&mut self.channel) };
        if let Err(err) = channel.close() {
            self.observer
                .on_event(&SendEvent::ChannelCloseFailed { error: &err });
        }
    }
}
