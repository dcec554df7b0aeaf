//! Spectrum analyzer scenarios: spectrum peak, autocorrelation, markers,
//! spectrogram and XY track.

use crate::helpers::tolerances::FLOOR_EPSILON;
use crate::helpers::*;
use approx::assert_relative_eq;
use sonolab::analysis::axis::bin_to_hz;
use sonolab::analysis::conditioning::disp_mag;
use sonolab::prelude::*;

fn analyzer() -> Session {
    Session::builder()
        .application(Application::SpectrumAnalyzer)
        .build()
        .expect("Failed to create analyzer")
}

#[test]
fn test_sinusoid_peaks_at_its_bin() {
    let session = analyzer();
    session.configure(Control::SetMode(DisplayMode::Spectrum));

    // Exactly 100 cycles per 2048-sample window
    let signal = generate_sine_bin(100, 2048, 10_000.0, 2048);
    let frame = feed(&session, &signal);

    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    let DisplayView::Spectrum(mags) = &display.view else {
        panic!("expected a spectrum view");
    };
    assert_eq!(mags.len(), 1024);
    assert_eq!(argmax(mags), 100);

    // Amplitude a sine puts a·L/2 in its bin
    let scale = session.config().input_scale;
    let expected = disp_mag(10_000.0 * scale * 1024.0);
    assert_relative_eq!(mags[100], expected, epsilon = 0.01);

    let first = display.markers[0];
    assert_eq!(first.bin, 100);
    assert_eq!(first.magnitude, mags[100]);
    assert_relative_eq!(first.position, bin_to_hz(100, 44100.0, 2048));
    assert_eq!(first.unit, sonolab::AxisUnit::Hertz);
}

#[test]
fn test_impulse_autocorrelation_is_a_single_lag() {
    let session = analyzer();
    session.configure(Control::SetMode(DisplayMode::Autocorrelation));

    // One pass: the window is 1024 zeros followed by this chunk
    let chunk = generate_impulse(1024, 10, 20_000);
    session.submit_samples(chunk);
    let frame = session.compute_frame().unwrap();

    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    let DisplayView::Autocorrelation(trace) = &display.view else {
        panic!("expected an autocorrelation view");
    };

    let a = 20_000.0 * session.config().input_scale;
    assert_relative_eq!(trace[0], disp_mag(a * a), epsilon = 1e-6);
    for (lag, &value) in trace.iter().enumerate().skip(1) {
        assert!(value < FLOOR_EPSILON, "lag {} reads {}", lag, value);
    }
    assert_eq!(display.markers[0].unit, sonolab::AxisUnit::Milliseconds);
}

#[test]
fn test_marker_moves_and_reads_back() {
    let session = analyzer();
    session.configure(Control::SetMode(DisplayMode::Spectrum));
    session.configure(Control::SetMarker {
        marker: Marker::Second,
        bin: 40,
    });

    let frame = feed(&session, &generate_sine_bin(40, 2048, 8_000.0, 2048));
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    assert_eq!(display.markers[1].bin, 40);
    assert!(display.markers[1].magnitude > display.markers[0].magnitude);
}

#[test]
fn test_spectrogram_is_default_and_scrolls() {
    let session = analyzer();

    let frame = feed(&session, &generate_sine_bin(64, 2048, 10_000.0, 2048));
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    assert_eq!(display.mode, DisplayMode::Spectrogram);
    let DisplayView::Spectrogram(image) = &display.view else {
        panic!("expected a spectrogram");
    };
    assert_eq!(image.width, 1024);
    assert_eq!(image.height, session.config().display.height);
    assert!(image.get(64, 0) > 0);

    // Silence pushes the tone row down by one
    feed(&session, &vec![0; 2048]);
    let frame = session.latest_frame().unwrap();
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    let DisplayView::Spectrogram(image) = &display.view else {
        panic!("expected a spectrogram");
    };
    assert_eq!(image.get(64, 0), 0);
    assert!(image.get(64, 2) > 0);
}

#[test]
fn test_track_collects_marker_peaks() {
    let session = analyzer();
    session.configure(Control::SetMode(DisplayMode::Track));

    let frame = feed(&session, &generate_sine_bin(100, 2048, 10_000.0, 4096));
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    let DisplayView::Track { points, latest, .. } = &display.view else {
        panic!("expected a track view");
    };
    assert_eq!(points.len(), 4);
    let latest = latest.expect("track has points");
    assert!(latest.x > latest.y);

    // Markers are fixed while tracking
    session.configure(Control::SetMarker {
        marker: Marker::First,
        bin: 7,
    });
    feed(&session, &vec![0; 1024]);
    let frame = session.latest_frame().unwrap();
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    assert_eq!(display.markers[0].bin, 100);

    // Leaving and re-entering through Spectrum clears the history
    session.configure(Control::SetMode(DisplayMode::Spectrum));
    session.configure(Control::SetMode(DisplayMode::Track));
    let frame = feed(&session, &vec![0; 1024]);
    let FrameView::Display(display) = &frame.view else {
        panic!("expected a display frame");
    };
    let DisplayView::Track { points, .. } = &display.view else {
        panic!("expected a track view");
    };
    assert_eq!(points.len(), 1);
}
