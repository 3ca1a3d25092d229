#![no_main]

use influx_udp_metrics::{
    Measurement, MeasurementSender, QueueableSender, SenderOptions, UdpInfluxdbProtocol,
    UdpInlinerSender,
};
use libfuzzer_sys::fuzz_target;

// Fuzz target focusing on batch splitting and queue thresholds
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // Use first 2 bytes to determine the chunk size (1 to 512)
    let max_measures_per_send = usize::from(u16::from_le_bytes([data[0], data[1]]) % 512) + 1;
    let batch_size = usize::from(data[2]) * 4;

    let options = SenderOptions {
        max_measures_per_send,
        ..SenderOptions::default()
    };
    let protocol = UdpInfluxdbProtocol::new("127.0.0.1", 9999);
    let sender = UdpInlinerSender::with_options(&protocol, options).unwrap();

    let base = String::from_utf8_lossy(&data[3..]);
    let batch: Vec<Measurement> = (0..batch_size)
        .map(|i| Measurement::new(format!("fuzz.{base}")).field("i", i as u64))
        .collect();

    assert!(sender.send(&batch));

    let mut queue = QueueableSender::new(sender);
    assert!(queue.send_all(batch));
    assert!(queue.len() < max_measures_per_send);
    assert!(queue.flush());
    assert!(queue.is_empty());
});
