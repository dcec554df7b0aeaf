//! Matched-filter bank scenarios: detection, ties, snapshots and reference
//! handling.

use crate::helpers::*;
use sonolab::analysis::filter_bank::detect;
use sonolab::prelude::*;
use sonolab::FilterBankFrame;

const BLOCK: usize = 1024;

fn bank(filters: usize) -> Session {
    test_session(Application::MatchedFilterBank, BLOCK, filters)
}

fn bank_frame(frame: &Frame) -> &FilterBankFrame {
    match &frame.view {
        FrameView::FilterBank(bank) => bank,
        other => panic!("expected a filter-bank frame, got {:?}", other),
    }
}

#[test]
fn test_matching_filter_is_detected() {
    let session = bank(8);
    let references: Vec<Vec<i16>> = (0..8)
        .map(|k| generate_noise(BLOCK, 1000.0, k as u64 + 1))
        .collect();
    for (k, reference) in references.iter().enumerate() {
        assert!(session.load_reference_samples(&to_f64(reference), k).is_loaded());
    }

    // Two chunks fill the window with exactly reference 5
    let frame = feed(&session, &references[5]);
    let bank = bank_frame(&frame);

    assert_eq!(bank.readings.len(), 8);
    assert_eq!(bank.detected, Some(5));
    let best = bank.readings[5].score;
    for reading in bank.readings.iter().filter(|r| r.index != 5) {
        assert!(reading.score < best, "filter {} scored {}", reading.index, reading.score);
    }

    // Traces are rendered for the leading filters only
    assert!(bank.readings[3].trace.is_some());
    assert!(bank.readings[4].trace.is_none());
}

#[test]
fn test_ties_go_to_lowest_index() {
    let session = bank(6);
    let reference = generate_noise(BLOCK, 1000.0, 42);
    assert!(session.load_reference_samples(&to_f64(&reference), 2).is_loaded());
    assert!(session.load_reference_samples(&to_f64(&reference), 4).is_loaded());

    let frame = feed(&session, &reference);
    let bank = bank_frame(&frame);
    assert_eq!(bank.readings[2].score, bank.readings[4].score);
    assert_eq!(bank.detected, Some(2));

    assert_eq!(detect(&[3.0, 7.0, 7.0]), Some(1));
}

#[test]
fn test_nothing_detected_without_references() {
    let session = bank(4);
    let frame = feed(&session, &generate_noise(BLOCK, 1000.0, 7));
    let bank = bank_frame(&frame);

    // Empty references score 100·log10(0.01)
    for reading in &bank.readings {
        assert!((reading.score + 200.0).abs() < 1e-9);
    }
    assert_eq!(bank.detected, None);
}

#[test]
fn test_snapshot_rows_are_scaled_scores() {
    let session = bank(3);
    let reference = generate_noise(BLOCK, 1000.0, 3);
    session.load_reference_samples(&to_f64(&reference), 1);

    session.store_snapshot();
    let frame = feed(&session, &reference);
    let bank = bank_frame(&frame);
    // Only the first of the two passes consumed the request
    assert!(!bank.stored);
    assert_eq!(bank.next_store_number, 2);

    let rows = session.snapshots();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 3);
    assert!((rows[0][0] + 20.0).abs() < 1e-9);

    session.store_snapshot();
    session.submit_samples(reference[..BLOCK / 2].to_vec());
    let frame = session.compute_frame().unwrap();
    let bank = bank_frame(&frame);
    assert!(bank.stored);
    let rows = session.snapshots();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], bank.readings[1].score / 10.0);

    session.delete_last_snapshot();
    session.submit_samples(vec![0; BLOCK / 2]);
    session.compute_frame().unwrap();
    assert_eq!(session.snapshots().len(), 1);
}

#[test]
fn test_captured_reference_matches_window() {
    let session = bank(2);
    let signal = generate_noise(BLOCK, 1000.0, 11);
    feed(&session, &signal);

    // Applied before the next pass, against the window it holds now
    session.capture_reference(1);
    let frame = feed(&session, &signal);
    let bank = bank_frame(&frame);
    assert_eq!(bank.detected, Some(1));
    assert!(session.with_pipeline(|p| p.references().is_loaded(1)));
    assert!(!session.with_pipeline(|p| p.references().is_loaded(0)));
}

#[test]
fn test_bad_reference_keeps_previous() {
    let session = bank(4);
    let good = to_f64(&generate_noise(BLOCK, 1000.0, 5));
    assert!(session.load_reference_samples(&good, 3).is_loaded());
    let before = session.with_pipeline(|p| p.references().spectrum(3).unwrap().to_vec());

    assert!(!session.load_reference_samples(&[], 3).is_loaded());
    assert!(!session.load_reference_samples(&[f64::NAN, 1.0], 3).is_loaded());
    assert!(!session.load_reference_samples(&good, 4).is_loaded());

    let after = session.with_pipeline(|p| p.references().spectrum(3).unwrap().to_vec());
    assert_eq!(before, after);
}

#[test]
fn test_averaging_toggle_resets_traces() {
    let session = bank(2);
    let reference = generate_noise(BLOCK, 1000.0, 9);
    session.load_reference_samples(&to_f64(&reference), 0);
    session.configure(Control::SetAveraging(true));

    feed(&session, &reference);
    feed(&session, &reference);
    let accumulated = session.with_pipeline(|p| match p.processor() {
        sonolab::analysis::Processor::FilterBank(bank) => bank.accumulator(0).unwrap()[0].norm(),
        _ => unreachable!(),
    });

    session.configure(Control::SetAveraging(false));
    session.submit_samples(reference[BLOCK / 2..].to_vec());
    session.compute_frame().unwrap();
    let single = session.with_pipeline(|p| match p.processor() {
        sonolab::analysis::Processor::FilterBank(bank) => bank.accumulator(0).unwrap()[0].norm(),
        _ => unreachable!(),
    });

    assert!(accumulated > 2.0 * single);
}

#[test]
fn test_load_after_queued_capture_wins() {
    let session = bank(4);
    feed(&session, &generate_noise(BLOCK, 1000.0, 21));

    session.capture_reference(3);
    assert!(session.load_reference_samples(&[1.0, 0.0, 0.0], 3).is_loaded());
    session.submit_samples(vec![0; BLOCK / 2]);
    session.compute_frame().unwrap();

    // Conjugated spectrum of a unit impulse is flat
    let spectrum = session.with_pipeline(|p| p.references().spectrum(3).unwrap().to_vec());
    assert!(spectrum
        .iter()
        .all(|c| (c.re - 1.0).abs() < 1e-9 && c.im.abs() < 1e-9));
}

#[test]
fn test_queued_delete_visible_before_next_pass() {
    let session = bank(2);
    session.store_snapshot();
    feed(&session, &vec![0; BLOCK / 2]);
    session.store_snapshot();
    feed(&session, &vec![0; BLOCK / 2]);

    session.delete_last_snapshot();
    assert_eq!(session.snapshots().len(), 1);
}

#[test]
fn test_clear_reference_stops_detection() {
    let session = bank(2);
    let reference = generate_noise(BLOCK, 1000.0, 13);
    session.load_reference_samples(&to_f64(&reference), 1);
    let frame = feed(&session, &reference);
    assert_eq!(bank_frame(&frame).detected, Some(1));

    session.clear_reference(1);
    let frame = feed(&session, &reference);
    assert_eq!(bank_frame(&frame).detected, None);
    assert!(!session.with_pipeline(|p| p.references().is_loaded(1)));
}
