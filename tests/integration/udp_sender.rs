use crate::{bind_listener, collect_datagrams, collect_exact, RecordingObserver};
use influx_udp_metrics::{
    Inliner, Measurement, MeasurementSender, SenderOptions, UdpInfluxdbProtocol,
    UdpInlinerSender,
};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

fn create_sender(destination: SocketAddr, options: SenderOptions) -> UdpInlinerSender {
    let protocol = UdpInfluxdbProtocol::new(destination.ip().to_string(), destination.port());
    UdpInlinerSender::with_options(&protocol, options).unwrap()
}

fn measures(n: usize) -> Vec<Measurement> {
    (0..n)
        .map(|i| {
            Measurement::new("http_requests")
                .tag("endpoint", format!("/api/{i}"))
                .tag("method", "GET")
                .field("count", i as i64)
                .field("latency", 0.5 + i as f64)
                .timestamp(1_700_000_000_000_000_000 + i as i64)
        })
        .collect()
}

#[test]
fn test_sends_one_datagram_per_measurement() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let sender = create_sender(addr, SenderOptions::default());
    let batch = measures(10);

    assert!(sender.send(&batch));

    let received: HashSet<String> = collect_exact(&listener, 10).into_iter().collect();
    let inliner = Inliner::default();
    let expected: HashSet<String> = batch.iter().map(|m| inliner.inline(m).unwrap()).collect();
    assert_eq!(received, expected);
}

#[test]
fn test_each_datagram_is_a_single_line() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let sender = create_sender(addr, SenderOptions::default());

    assert!(sender.send(&measures(3)));

    for datagram in collect_exact(&listener, 3) {
        assert!(datagram.starts_with("http_requests,endpoint=/api/"));
        assert!(datagram.ends_with('\n'));
        assert_eq!(datagram.matches('\n').count(), 1);
    }
}

#[test]
fn test_empty_batch_sends_nothing() {
    let (listener, addr) = bind_listener(Duration::from_millis(200));
    let observer = Arc::new(RecordingObserver::default());
    let sender = create_sender(addr, SenderOptions::default()).with_observer(observer.clone());

    assert!(sender.send(&[]));
    assert!(collect_datagrams(&listener).is_empty());
    assert!(observer.events().is_empty());
}

#[test]
fn test_bind_failure_reports_failure_and_sends_nothing() {
    let (listener, addr) = bind_listener(Duration::from_millis(200));
    let observer = Arc::new(RecordingObserver::default());
    let options = SenderOptions {
        // TEST-NET-1 is never assigned to a local interface
        bind_addr: Some("192.0.2.1:0".parse().unwrap()),
        ..SenderOptions::default()
    };
    let sender = create_sender(addr, options).with_observer(observer.clone());

    assert!(!sender.send(&measures(5)));
    assert!(collect_datagrams(&listener).is_empty());
    assert_eq!(observer.events(), vec!["open_failed:5".to_owned()]);
}

#[test]
fn test_observer_sees_encoded_lines_and_summary() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let observer = Arc::new(RecordingObserver::default());
    let sender = create_sender(addr, SenderOptions::default()).with_observer(observer.clone());

    let batch = [Measurement::new("disk")
        .tag("path", "/var")
        .field("used_percent", 41.5)
        .timestamp(7)];
    assert!(sender.send(&batch));
    collect_exact(&listener, 1);

    assert_eq!(
        observer.events(),
        vec![
            "encoded:disk,path=/var used_percent=41.5 7".to_owned(),
            "batch_sent:1:0".to_owned(),
        ]
    );
}

#[test]
fn test_oversized_batch_is_delivered_in_chunks() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let observer = Arc::new(RecordingObserver::default());
    let options = SenderOptions {
        max_measures_per_send: 4,
        ..SenderOptions::default()
    };
    let sender = create_sender(addr, options).with_observer(observer.clone());

    assert!(sender.send(&measures(10)));
    assert_eq!(collect_exact(&listener, 10).len(), 10);

    let summaries: Vec<String> = observer
        .events()
        .into_iter()
        .filter(|e| e.starts_with("batch_sent"))
        .collect();
    assert_eq!(summaries, vec!["batch_sent:4:0", "batch_sent:4:0", "batch_sent:2:0"]);
}

#[test]
fn test_send_without_listener_still_succeeds() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let (listener, addr) = bind_listener(Duration::from_millis(10));
        drop(listener);
        addr
    };
    let sender = create_sender(addr, SenderOptions::default());

    assert!(sender.send(&measures(3)));
}

#[test]
fn test_sender_is_reusable_across_batches() {
    let (listener, addr) = bind_listener(Duration::from_secs(2));
    let sender = create_sender(addr, SenderOptions::default());

    assert!(sender.send(&measures(2)));
    assert!(sender.send(&measures(3)));
    assert_eq!(collect_exact(&listener, 5).len(), 5);
}
