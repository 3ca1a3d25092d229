use super::sender::MeasurementSender;
use super::Measurement;

/// Buffers measurements in front of a [`MeasurementSender`].
///
/// The queue is flushed automatically when it reaches the sender's
/// [`max_measures_per_send`](MeasurementSender::max_measures_per_send), and on
/// demand with [`QueueableSender::flush`]. A flush always empties the queue:
/// measurements from a failed batch are dropped, not retried.
#[derive(Debug)]
pub struct QueueableSender<S> {
    sender: S,
    threshold: usize,
    queue: Vec<Measurement>,
}

impl<S: MeasurementSender> QueueableSender<S> {
    /// Wraps `sender`, flushing every `sender.max_measures_per_send()` measurements.
    pub fn new(sender: S) -> Self {
        let threshold = sender.max_measures_per_send().max(1);
        Self {
            sender,
            threshold,
            queue: Vec::with_capacity(threshold),
        }
    }

    /// Queues one measurement.
    ///
    /// Returns the result of the flush when this measurement filled the queue,
    /// `true` otherwise.
    pub fn send(&mut self, measure: Measurement) -> bool {
        self.queue.push(measure);
        if self.queue.len() >= self.threshold {
            return self.flush();
        }
        true
    }

    /// Queues every measurement, flushing as often as the threshold requires.
    ///
    /// Returns `false` if any of the triggered flushes failed.
    pub fn send_all(&mut self, measures: impl IntoIterator<Item = Measurement>) -> bool {
        let mut success = true;
        for measure in measures {
            success &= self.send(measure);
        }
        success
    }

    /// Sends everything queued so far as one batch and empties the queue.
    pub fn flush(&mut self) -> bool {
        if self.queue.is_empty() {
            return true;
        }
        let result = self.sender.send(&self.queue);
        self.queue.clear();
        result
    }

    /// Number of queued measurements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The wrapped sender.
    pub const fn sender(&self) -> &S {
        &self.sender
    }
}
