use influx_udp_metrics::{
    InfluxReporter, Measurement, MeasurementSender, ReporterOptions, UdpInfluxdbProtocol,
    UdpInlinerSender,
};
use std::time::{Duration, Instant};

const SERVER_HOST: &str = "127.0.0.1";
const SERVER_PORT: u16 = 8089;

fn main() {
    let protocol = UdpInfluxdbProtocol::new(SERVER_HOST, SERVER_PORT);

    send_batch(&protocol);
    report_heavy(&protocol);
}

fn send_batch(protocol: &UdpInfluxdbProtocol) {
    let sender = UdpInlinerSender::new(protocol).unwrap();

    let batch: Vec<Measurement> = (0..100)
        .map(|i| {
            Measurement::new("demo.batch")
                .tag("worker", format!("w{}", i % 4))
                .field("value", i64::from(i))
        })
        .collect();

    let instant = Instant::now();
    let ok = sender.send(&batch);
    println!("batch sent: {ok}, elapsed: {:?}us", instant.elapsed().as_micros());
}

fn report_heavy(protocol: &UdpInfluxdbProtocol) {
    let options = ReporterOptions {
        flush_interval: Duration::from_millis(100),
        ..ReporterOptions::default()
    };
    let reporter = InfluxReporter::new(protocol, options).unwrap();

    let instant = Instant::now();
    for i in 0..50_000_u64 {
        reporter.report(
            Measurement::new("demo.heavy")
                .tag("shard", (i % 16).to_string())
                .field("seq", i)
                .field("ratio", 1.0 / (i + 1) as f64),
        );
    }

    reporter.shutdown();
    println!("elapsed: {:?}ms", instant.elapsed().as_millis());
}
