use std::io;
use std::net::SocketAddr;

use crate::MetricsError;

/// Something that happened while a batch was being sent.
///
/// Events borrow from the sender for the duration of the callback only.
#[derive(Debug)]
pub enum SendEvent<'a> {
    /// A measurement was encoded and is about to be sent.
    Encoded {
        /// The encoded line, including its trailing newline.
        line: &'a str,
    },
    /// A measurement could not be encoded and was skipped.
    EncodeFailed {
        /// Why the measurement was rejected.
        error: &'a MetricsError,
    },
    /// No channel could be opened, the batch was dropped.
    ChannelOpenFailed {
        /// Number of measurements in the dropped batch.
        count: usize,
        /// Where the batch was going.
        destination: SocketAddr,
        /// Error returned by the channel factory.
        error: &'a io::Error,
    },
    /// One datagram could not be sent.
    DatagramFailed {
        /// Where the datagram was going.
        destination: SocketAddr,
        /// Error returned by the channel.
        error: &'a io::Error,
    },
    /// A batch went through its channel.
    BatchSent {
        /// Number of measurements in the batch.
        count: usize,
        /// Number of measurements that failed to encode or send.
        errors: usize,
        /// Where the batch was sent.
        destination: SocketAddr,
    },
    /// Releasing the channel failed. Never affects the result of a send.
    ChannelCloseFailed {
        /// Error returned while closing.
        error: &'a io::Error,
    },
}

/// Receives [`SendEvent`]s from a sender.
///
/// The default observer is [`TracingObserver`]. Inject a different one to
/// assert on events in tests or to forward them elsewhere.
pub trait SendObserver {
    /// Called synchronously for every event.
    fn on_event(&self, event: &SendEvent<'_>);
}

/// Forwards events to `tracing` at the level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SendObserver for TracingObserver {
    fn on_event(&self, event: &SendEvent<'_>) {
        match event {
            SendEvent::Encoded { line } => {
                tracing::debug!("measurements being sent:\n{line}");
            }
            SendEvent::EncodeFailed { error } => {
                tracing::warn!("measurement skipped: {error}");
            }
            SendEvent::ChannelOpenFailed {
                count,
                destination,
                error,
            } => {
                tracing::info!("failed to send {count} measures to UDP[{destination}], {error}");
            }
            SendEvent::DatagramFailed { destination, error } => {
                tracing::warn!("UDP send error to {destination}: {error}");
            }
            SendEvent::BatchSent {
                count,
                errors,
                destination,
            } => {
                tracing::debug!("{count} measurements sent to UDP[{destination}] with {errors} errors");
            }
            SendEvent::ChannelCloseFailed { error } => {
                tracing::error!("channel close failed: {error}");
            }
        }
    }
}
