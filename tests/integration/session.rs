//! Session lifecycle: input hand-off, skipped ticks, live loop, transmit
//! and shutdown.

use crate::helpers::*;
use sonolab::prelude::*;
use sonolab::{PassOutcome, TransitionResult};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl TransmitSink for RecordingSink {
    fn play(&mut self) -> sonolab::core::Result<()> {
        self.calls.lock().unwrap().push("play");
        Ok(())
    }

    fn pause(&mut self) -> sonolab::core::Result<()> {
        self.calls.lock().unwrap().push("pause");
        Ok(())
    }

    fn rewind(&mut self) -> sonolab::core::Result<()> {
        self.calls.lock().unwrap().push("rewind");
        Ok(())
    }
}

#[test]
fn test_latest_block_wins() {
    let session = test_session(Application::MatchedFilterBank, 64, 2);
    let first: Vec<i16> = (0..32).collect();
    let second: Vec<i16> = (100..132).collect();

    session.submit_samples(first);
    session.submit_samples(second.clone());
    assert_eq!(session.input().superseded(), 1);

    assert!(session.compute_frame().is_some());
    assert!(session.compute_frame().is_none());

    let tail = session.with_pipeline(|p| p.window()[32..].to_vec());
    assert_eq!(tail, to_f64(&second));
}

#[test]
fn test_busy_tick_is_skipped_not_queued() {
    let session = test_session(Application::SpectrumAnalyzer, 64, 1);
    session.submit_samples(vec![0; 32]);

    let outcome = session.with_pipeline(|_| session.tick());
    assert_eq!(outcome, PassOutcome::Busy);
    assert_eq!(session.frame_state().skipped(), 1);
    assert!(session.input().is_pending());
    assert!(session.latest_frame().is_none());

    assert_eq!(session.tick(), PassOutcome::Processed);
    assert_eq!(session.latest_frame().unwrap().sequence, 1);
}

#[test]
fn test_malformed_block_keeps_window() {
    let session = test_session(Application::MatchedFilterBank, 64, 2);
    feed(&session, &(0..64).collect::<Vec<i16>>());
    let before = session.with_pipeline(|p| p.window().to_vec());

    session.submit_samples(vec![1; 10]);
    assert_eq!(session.tick(), PassOutcome::NoInput);
    assert_eq!(session.with_pipeline(|p| p.window().to_vec()), before);
}

#[test]
fn test_live_loop_with_producer_thread() {
    let session = Session::builder()
        .application(Application::SpectrumAnalyzer)
        .block_size(256)
        .tick_interval(std::time::Duration::from_millis(1))
        .build()
        .unwrap();
    session.start_live().unwrap();

    let input = session.input();
    let producer = std::thread::spawn(move || {
        for seed in 0..50 {
            input.publish(generate_noise(128, 500.0, seed));
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    });
    producer.join().unwrap();

    assert!(wait_for(2000, || session.frame_state().passes() > 0));
    session.stop_live();

    let passes = session.frame_state().passes();
    assert!(passes <= 50);
    assert_eq!(session.latest_frame().unwrap().sequence, passes);
}

#[test]
fn test_transmit_cycle() {
    let sink = RecordingSink::default();
    let session = Session::builder()
        .application(Application::RangeDopplerSounder)
        .transmit_sink(sink.clone())
        .build()
        .unwrap();

    assert_eq!(session.transmit_state(), TransmitState::Paused);
    assert_eq!(
        session.set_transmit(true).unwrap(),
        TransitionResult::StateChanged(TransmitState::Playing)
    );
    assert_eq!(session.set_transmit(true).unwrap(), TransitionResult::None);
    assert_eq!(
        session.on_transmit_end_of_stream().unwrap(),
        TransitionResult::Rewound
    );
    assert_eq!(session.transmit_state(), TransmitState::Playing);

    session.shutdown();
    assert_eq!(session.transmit_state(), TransmitState::Paused);
    assert_eq!(sink.calls(), vec!["play", "rewind", "pause"]);

    // The sink is released on shutdown
    session.set_transmit(true).unwrap();
    assert_eq!(sink.calls().len(), 3);
}

#[test]
fn test_drop_stops_live_loop() {
    let session = test_session(Application::SpectrumAnalyzer, 64, 1);
    session.start_live().unwrap();
    let state = session.frame_state().clone();
    drop(session);
    assert!(!state.is_running());
}
