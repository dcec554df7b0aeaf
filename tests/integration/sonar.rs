//! Range and range-Doppler scenarios.

use crate::helpers::*;
use sonolab::analysis::sonar::{doppler_magnitudes, range_step};
use sonolab::analysis::{Processor, SpectralTransform};
use sonolab::prelude::*;
use sonolab::SonarFrame;

fn sounder(application: Application, block_size: usize, width: usize, height: usize) -> Session {
    Session::builder()
        .application(application)
        .block_size(block_size)
        .averaging_window(10)
        .display(width, height)
        .build()
        .expect("Failed to create sounder")
}

fn sonar_frame(frame: &Frame) -> &SonarFrame {
    match &frame.view {
        FrameView::Sonar(sonar) => sonar,
        other => panic!("expected a sonar frame, got {:?}", other),
    }
}

fn latest_pulse(session: &Session) -> Vec<f64> {
    session.with_pipeline(|p| match p.processor() {
        Processor::Sonar(sonar) => sonar.history().latest().unwrap().to_vec(),
        _ => unreachable!(),
    })
}

#[test]
fn test_stationary_target_lands_on_zero_doppler() {
    let rows = vec![vec![1.0, 4.0, 0.5]; 10];
    let mut transform = SpectralTransform::new(10);
    let doppler = doppler_magnitudes(&rows, &mut transform);

    assert_eq!(doppler.len(), 10);
    for col in 0..3 {
        let column: Vec<f64> = doppler.iter().map(|r| r[col]).collect();
        assert_eq!(argmax(&column), 5);
        assert!((column[5] - 10.0 * rows[0][col]).abs() < 1e-9);
        for (row, value) in column.iter().enumerate().filter(|(r, _)| *r != 5) {
            assert!(value.abs() < 1e-9, "row {} col {} reads {}", row, col, value);
        }
    }
}

#[test]
fn test_waterfall_zero_doppler_row() {
    let session = sounder(Application::RangeDopplerSounder, 64, 16, 60);
    session.configure(Control::SetMatchedFilter(false));
    session.configure(Control::SetCentering(false));

    // Every chunk identical, so every pulse after the first is identical
    let chunk: Vec<i16> = (0..32).map(|n| 1000 + 10 * n).collect();
    let signal: Vec<i16> = chunk.iter().copied().cycle().take(32 * 11).collect();
    let frame = feed(&session, &signal);
    let sonar = sonar_frame(&frame);

    assert_eq!(sonar.step, 2);
    assert!(!sonar.doppler_labels.is_empty());
    let SonarView::Image(image) = &sonar.view else {
        panic!("expected an image");
    };
    assert_eq!(image.width, 16);
    assert_eq!(image.height, 60);

    // Source row 5 of 10 fills display rows 30 to 35
    for row in 30..36 {
        assert!(image.row(row).iter().all(|&p| p == 255), "row {}", row);
    }
}

#[test]
fn test_waterfall_without_doppler_shows_pulses() {
    let session = sounder(Application::RangeDopplerSounder, 64, 32, 20);
    session.configure(Control::SetDoppler(false));

    let frame = feed(&session, &vec![100; 64]);
    let sonar = sonar_frame(&frame);
    assert!(sonar.doppler_labels.is_empty());
    let SonarView::Image(image) = &sonar.view else {
        panic!("expected an image");
    };
    assert_eq!(image.height, 10);
    assert_eq!(image.width, 32);
}

#[test]
fn test_step_never_drops_below_one() {
    let session = sounder(Application::RangeDopplerSounder, 3000, 2048, 380);
    let frame = feed(&session, &vec![0; 1500]);
    assert_eq!(sonar_frame(&frame).step, 1);

    session.configure(Control::ZoomIn);
    let frame = feed(&session, &vec![0; 1500]);
    let sonar = sonar_frame(&frame);
    assert_eq!(sonar.step, 1);
    assert_eq!(sonar.zoom, 1);

    let mut zoom = 2;
    assert_eq!(range_step(1500, 100, &mut zoom), 8);
    assert_eq!(zoom, 2);
}

#[test]
fn test_averaging_window_steps_by_ten() {
    let session = sounder(Application::RangeDopplerSounder, 64, 16, 20);
    session.configure(Control::WidenAveraging);
    let frame = feed(&session, &vec![0; 32]);
    assert_eq!(sonar_frame(&frame).averaging_window, 20);

    session.configure(Control::NarrowAveraging);
    session.configure(Control::NarrowAveraging);
    let frame = feed(&session, &vec![0; 32]);
    assert_eq!(sonar_frame(&frame).averaging_window, 10);
    assert_eq!(
        session.with_pipeline(|p| p.pulse_history().map(|h| h.pulses())),
        Some(10)
    );
}

#[test]
fn test_matched_filter_finds_echo_delay() {
    let session = sounder(Application::RangeSounder, 256, 64, 20);
    session.configure(Control::SetCentering(false));

    let chirp = generate_chirp(64, 0.05, 0.25, 8000.0);
    assert!(session.load_reference_samples(&to_f64(&chirp), 0).is_loaded());

    let mut echo = vec![0i16; 256];
    echo[20..84].copy_from_slice(&chirp);
    feed(&session, &echo);

    let pulse = latest_pulse(&session);
    assert_eq!(pulse.len(), 128);
    assert_eq!(argmax(&pulse), 20);
}

#[test]
fn test_centered_profile_starts_at_peak() {
    let session = sounder(Application::RangeSounder, 64, 16, 20);
    session.configure(Control::SetMatchedFilter(false));
    session.configure(Control::SetAveraging(false));

    let frame = feed(&session, &generate_impulse(64, 40, 5000));
    let sonar = sonar_frame(&frame);
    let SonarView::Profile(profile) = &sonar.view else {
        panic!("expected a profile");
    };
    assert_eq!(profile.len(), 16);
    assert!(profile.iter().all(|&v| v <= profile[0]));
    assert_eq!(argmax(&latest_pulse(&session)), 0);
}
