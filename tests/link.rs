//! End-to-end tests: transmitter and receiver joined by an in-memory link.

use std::future::pending;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rc_link::actuator::ActuatorSink;
use rc_link::error::{RcLinkError, Result};
use rc_link::input::LineSource;
use rc_link::node::{Receiver, Transmitter};
use rc_link::protocol::decoder::ActuationState;
use rc_link::serial::port_trait::memory_pair;
use rc_link::serial::LinkSerial;

/// Sink that keeps every applied state
#[derive(Clone, Default)]
struct RecordingSink {
    applied: Arc<Mutex<Vec<ActuationState>>>,
}

impl RecordingSink {
    fn applied(&self) -> Vec<ActuationState> {
        self.applied.lock().unwrap().clone()
    }
}

impl ActuatorSink for RecordingSink {
    fn apply(&mut self, state: &ActuationState) -> Result<()> {
        self.applied.lock().unwrap().push(*state);
        Ok(())
    }
}

async fn run_link(samples: &'static [u8]) -> (u64, u64, Vec<ActuationState>) {
    // Small buffer so the transmitter has to wait on the receiver
    let (tx_port, rx_port) = memory_pair(8);
    let mut transmitter = Transmitter::new(LineSource::new(samples), LinkSerial::new(tx_port, "tx"));

    let sink = RecordingSink::default();
    let mut receiver = Receiver::new(LinkSerial::new(rx_port, "rx"), sink.clone());

    let sending = async move {
        let sent = transmitter.run_until(pending::<()>()).await.unwrap();
        // Dropping the transmitter closes the link
        drop(transmitter);
        sent
    };
    let receiving = async { receiver.run_until(pending::<()>()).await.unwrap() };

    let (sent, received) = tokio::join!(sending, receiving);
    (sent, received, sink.applied())
}

#[tokio::test]
async fn test_joystick_to_pwm() {
    let (sent, received, applied) = run_link(b"1234 900 250\n").await;

    assert_eq!(sent, 1);
    assert_eq!(received, 1);
    assert_eq!(
        applied,
        vec![ActuationState {
            drive_duty: 1000,
            scale: 1.4,
            steering_pwm: 1727,
        }]
    );
}

#[tokio::test]
async fn test_stream_of_samples() {
    let samples = b"0 512 512\n\
                    1000 100 900\n\
                    9999 800 300\n\
                    3 300 800\n";
    let (sent, received, applied) = run_link(samples).await;

    assert_eq!(sent, 4);
    assert_eq!(received, 4);

    let outputs: Vec<(u16, u32)> = applied.iter().map(|s| (s.drive_duty, s.steering_pwm)).collect();
    assert_eq!(
        outputs,
        vec![
            (2160, 0),     // A, M, throttle 0
            (5320, 1900),  // S, F, 1.9 * 1000
            (2160, 16998), // A, M, 1.7 * 9999
            (2160, 5),     // A, M, 1.7 * 3 truncated
        ]
    );
}

#[tokio::test]
async fn test_link_closed_without_packets() {
    let (sent, received, applied) = run_link(b"# no samples\n").await;
    assert_eq!(sent, 0);
    assert_eq!(received, 0);
    assert!(applied.is_empty());
}

#[tokio::test]
async fn test_noise_byte_retains_previous_duty() {
    let (tx_port, rx_port) = memory_pair(64);
    let mut raw = LinkSerial::new(tx_port, "raw");
    let mut receiver = Receiver::new(LinkSerial::new(rx_port, "rx"), RecordingSink::default());

    let packets = [
        [b'S', b'H', 0, 0, 1, 0, b' '],
        [b'X', b'F', 0, 5, 0, 0, b' '],
    ];
    for bytes in packets {
        raw.send_packet(&bytes.into()).await.unwrap();
    }

    let first = receiver.step().await.unwrap();
    assert_eq!(first.drive_duty, 5320);
    assert_eq!(first.steering_pwm, 14);

    let second = receiver.step().await.unwrap();
    assert_eq!(second.drive_duty, 5320);
    assert_eq!(second.scale, 1.9);
    assert_eq!(second.steering_pwm, 950);
}

#[tokio::test(start_paused = true)]
async fn test_receiver_times_out_on_lost_link() {
    let (_tx_port, rx_port) = memory_pair(64);
    let serial = LinkSerial::new(rx_port, "rx").with_timeout(Some(Duration::from_millis(250)));
    let mut receiver = Receiver::new(serial, RecordingSink::default());

    match receiver.step().await {
        Err(RcLinkError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(250)),
        other => panic!("Expected Timeout, got: {:?}", other),
    }
}
