use std::thread::{Builder, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{tick, unbounded, Receiver, Sender};
use crossbeam::select;
use tracing::{debug, warn};

use super::protocol::UdpInfluxdbProtocol;
use super::queue::QueueableSender;
use super::sender::{MeasurementSender, SenderOptions, UdpInlinerSender};
use super::Measurement;
use crate::{MetricResult, MetricsError};

/// Configuration options for [`InfluxReporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterOptions {
    /// How often queued measurements are flushed.
    pub flush_interval: Duration,
    /// Options of the underlying UDP sender.
    pub sender: SenderOptions,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(10),
            sender: SenderOptions::default(),
        }
    }
}

/// Reports measurements from any thread through a background flush job.
///
/// Measurements are queued on a background thread and sent when the queue is
/// full, every `flush_interval`, and one last time when the reporter is
/// dropped. Dropping blocks until that final flush has completed.
///
/// # Example
///
/// ```no_run
/// use influx_udp_metrics::{InfluxReporter, Measurement, ReporterOptions, UdpInfluxdbProtocol};
///
/// let reporter = InfluxReporter::new(&UdpInfluxdbProtocol::default(), ReporterOptions::default())?;
/// reporter.report(Measurement::new("jobs").field("pending", 12_i64));
/// reporter.shutdown();
/// # Ok::<(), influx_udp_metrics::MetricsError>(())
/// ```
#[derive(Debug)]
pub struct InfluxReporter {
    sender: Option<Sender<Measurement>>,
    // only used in cold path
    job_handle: Option<JoinHandle<()>>,
}

impl InfluxReporter {
    /// Creates a reporter sending over UDP to `protocol`.
    ///
    /// # Errors
    /// Returns the errors of [`UdpInlinerSender::with_options`], an
    /// [`MetricsError::InvalidOption`] for a zero flush interval, or an I/O
    /// error if the background thread cannot be spawned.
    pub fn new(protocol: &UdpInfluxdbProtocol, options: ReporterOptions) -> MetricResult<Self> {
        let sender = UdpInlinerSender::with_options(protocol, options.sender)?;
        Self::with_sender(sender, options.flush_interval)
    }

    /// Creates a reporter around any [`MeasurementSender`].
    ///
    /// # Errors
    /// Returns [`MetricsError::InvalidOption`] for a zero flush interval, or an
    /// I/O error if the background thread cannot be spawned.
    pub fn with_sender<S>(sender: S, flush_interval: Duration) -> MetricResult<Self>
    where
        S: MeasurementSender + Send + 'static,
    {
        if flush_interval.is_zero() {
            return Err(MetricsError::InvalidOption(
                "flush_interval must be greater than zero".to_owned(),
            ));
        }

        let (sender_tx, receiver) = unbounded::<Measurement>();
        let queue = QueueableSender::new(sender);
        let job_handle = Builder::new()
            .name("influx-reporter".to_owned())
            .spawn(move || run_job(queue, &receiver, flush_interval))?;

        Ok(Self {
            sender: Some(sender_tx),
            job_handle: Some(job_handle),
        })
    }

    /// Queues one measurement.
    pub fn report(&self, measure: Measurement) {
        if let Some(sender) = &self.sender {
            if sender.send(measure).is_err() {
                warn!("reporter job has stopped, measurement dropped");
            }
        }
    }

    /// Queues every measurement.
    pub fn report_all(&self, measures: impl IntoIterator<Item = Measurement>) {
        for measure in measures {
            self.report(measure);
        }
    }

    /// Flushes what is queued and stops the background job.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for InfluxReporter {
    fn drop(&mut self) {
        // closing the channel is the stop signal, the job flushes before exiting
        drop(self.sender.take());

        if let Some(handle) = self.job_handle.take() {
            if handle.join().is_err() {
                warn!("reporter job panicked");
            }
        }
    }
}

fn run_job<S: MeasurementSender>(
    mut queue: QueueableSender<S>,
    receiver: &Receiver<Measurement>,
    flush_interval: Duration,
) {
    let flush_tick = tick(flush_interval);

    loop {
        select! {
            recv(flush_tick) -> _ => {
                if !queue.flush() {
                    warn!("periodic flush failed");
                }
            },
            recv(receiver) -> msg => match msg {
                Ok(measure) => {
                    if !queue.send(measure) {
                        warn!("flush of a full queue failed");
                    }
                }
                Err(_) => {
                    let pending = queue.len();
                    if !queue.flush() {
                        warn!("final flush of {pending} measurements failed");
                    }
                    debug!("reporter job stopped");
                    return;
                }
            },
        }
    }
}
