//! One analysis pass per tick: accumulate, transform, render.
//!
//! The pipeline owns every piece of mutable analysis state. Controls from
//! other threads are queued on a channel and applied at the start of the
//! next pass, so nothing mutates that state outside a pass.

use crate::accumulator::SampleBlockAccumulator;
use crate::display::{DisplayFrame, DisplayMode, DisplayModeProcessor, Marker};
use crate::fft::SpectralTransform;
use crate::filter_bank::{FilterBankFrame, MatchedFilterBank};
use crate::history::PulseHistory;
use crate::reference::ReferenceSignalStore;
use crate::result_log::ResultLog;
use crate::sonar::{RangeDopplerProcessor, SonarFrame};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sonolab_core::{Application, Result, SessionConfig};

/// Live configuration change.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    SetMode(DisplayMode),
    SetMarker { marker: Marker, bin: usize },
    SetAveraging(bool),
    SetCentering(bool),
    SetSinr(bool),
    SetMatchedFilter(bool),
    SetDoppler(bool),
    ZoomIn,
    ZoomOut,
    WidenAveraging,
    NarrowAveraging,
    /// Replace a reference with a time-domain waveform.
    LoadReference { index: usize, samples: Vec<f64> },
    /// Replace a reference with the current window.
    CaptureReference(usize),
    /// Reset a reference to all zeros.
    ClearReference(usize),
    StoreSnapshot,
    DeleteLastSnapshot,
}

/// The application-specific stage of a pass.
pub enum Processor {
    Display(DisplayModeProcessor),
    FilterBank(MatchedFilterBank),
    Sonar(RangeDopplerProcessor),
}

impl Processor {
    fn for_config(config: &SessionConfig) -> Self {
        match config.application {
            Application::SpectrumAnalyzer => Processor::Display(DisplayModeProcessor::new(config)),
            Application::MatchedFilterBank => Processor::FilterBank(MatchedFilterBank::new(config)),
            Application::RangeSounder | Application::RangeDopplerSounder => {
                Processor::Sonar(RangeDopplerProcessor::new(config))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FrameView {
    Display(DisplayFrame),
    FilterBank(FilterBankFrame),
    Sonar(SonarFrame),
}

/// Renderable output of one pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Frame {
    /// Increments with every completed pass, starting at 1.
    pub sequence: u64,
    pub view: FrameView,
}

pub struct Pipeline {
    config: SessionConfig,
    accumulator: SampleBlockAccumulator,
    transform: SpectralTransform,
    references: ReferenceSignalStore,
    processor: Processor,
    log: ResultLog,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
    sequence: u64,
}

impl Pipeline {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let (control_tx, control_rx) = unbounded();

        tracing::info!(
            "Pipeline {:?}: block {} @ {} Hz, {} filters",
            config.application,
            config.block_size,
            config.sample_rate,
            config.filter_count
        );

        Ok(Self {
            accumulator: SampleBlockAccumulator::new(config.block_size, config.input_scale),
            transform: SpectralTransform::new(config.block_size),
            references: ReferenceSignalStore::new(config.filter_count, config.block_size),
            processor: Processor::for_config(&config),
            log: ResultLog::new(config.filter_count),
            control_tx,
            control_rx,
            sequence: 0,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sender for controls applied at the start of the next pass.
    pub fn controller(&self) -> Sender<Control> {
        self.control_tx.clone()
    }

    pub fn window(&self) -> &[f64] {
        self.accumulator.window()
    }

    pub fn references(&self) -> &ReferenceSignalStore {
        &self.references
    }

    pub fn result_log(&self) -> &ResultLog {
        &self.log
    }

    pub fn result_log_mut(&mut self) -> &mut ResultLog {
        &mut self.log
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Pulse history of the sonar applications.
    pub fn pulse_history(&self) -> Option<&PulseHistory> {
        match &self.processor {
            Processor::Sonar(sonar) => Some(sonar.history()),
            _ => None,
        }
    }

    /// Passes completed so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Apply a control now. Controls that do not concern the running
    /// application are ignored.
    pub fn apply(&mut self, control: Control) -> Result<()> {
        match (control, &mut self.processor) {
            (Control::LoadReference { index, samples }, _) => {
                self.references
                    .load_from_waveform(&samples, index, &mut self.transform)?;
            }
            (Control::CaptureReference(index), _) => {
                self.references.capture_current(
                    self.accumulator.window(),
                    index,
                    &mut self.transform,
                )?;
            }
            (Control::ClearReference(index), _) => self.references.clear(index)?,
            (Control::StoreSnapshot, _) => self.log.request_store(),
            (Control::DeleteLastSnapshot, _) => {
                self.log.delete_last();
            }

            (Control::SetMode(mode), Processor::Display(display)) => display.set_mode(mode),
            (Control::SetMarker { marker, bin }, Processor::Display(display)) => {
                if !display.set_marker(marker, bin) {
                    tracing::debug!("Marker {:?} fixed while tracking", marker);
                }
            }

            (Control::SetAveraging(on), Processor::FilterBank(bank)) => bank.set_averaging(on),
            (Control::SetCentering(on), Processor::FilterBank(bank)) => bank.set_centering(on),
            (Control::SetSinr(on), Processor::FilterBank(bank)) => bank.set_sinr(on),

            (Control::SetAveraging(on), Processor::Sonar(sonar)) => sonar.set_averaging(on),
            (Control::SetCentering(on), Processor::Sonar(sonar)) => sonar.set_centering(on),
            (Control::SetMatchedFilter(on), Processor::Sonar(sonar)) => {
                sonar.set_matched_filter(on)
            }
            (Control::SetDoppler(on), Processor::Sonar(sonar)) => sonar.set_doppler(on),
            (Control::ZoomIn, Processor::Sonar(sonar)) => sonar.zoom_in(),
            (Control::ZoomOut, Processor::Sonar(sonar)) => sonar.zoom_out(),
            (Control::WidenAveraging, Processor::Sonar(sonar)) => sonar.widen_averaging(),
            (Control::NarrowAveraging, Processor::Sonar(sonar)) => sonar.narrow_averaging(),

            (control, _) => {
                tracing::debug!(
                    "Ignoring {:?} for {:?}",
                    control,
                    self.config.application
                );
            }
        }
        Ok(())
    }

    /// Apply every queued control in arrival order. Runs at the start of
    /// each pass; callers that touch references or the result log directly
    /// run it first so earlier requests land before theirs.
    pub fn apply_pending(&mut self) {
        while let Ok(control) = self.control_rx.try_recv() {
            if let Err(e) = self.apply(control) {
                tracing::warn!("Control rejected: {}", e);
            }
        }
    }

    /// Run one pass over the latest chunk. Returns `None` (and keeps every
    /// piece of state) when no chunk arrived or the chunk is malformed.
    pub fn compute_frame(&mut self, chunk: Option<&[i16]>) -> Option<Frame> {
        self.apply_pending();

        let chunk = chunk?;
        if let Err(e) = self.accumulator.update(chunk) {
            tracing::warn!("Skipping pass: {}", e);
            return None;
        }

        let spectrum = self.transform.forward(self.accumulator.window());
        let view = match &mut self.processor {
            Processor::Display(display) => {
                FrameView::Display(display.process(&spectrum, &mut self.transform))
            }
            Processor::FilterBank(bank) => FrameView::FilterBank(bank.process(
                &spectrum,
                &self.references,
                &mut self.transform,
                &mut self.log,
            )),
            Processor::Sonar(sonar) => {
                let reference = self.references.spectrum(0).unwrap_or_default();
                match sonar.process(
                    self.accumulator.window(),
                    &spectrum,
                    reference,
                    &mut self.transform,
                ) {
                    Ok(frame) => FrameView::Sonar(frame),
                    Err(e) => {
                        tracing::warn!("Skipping pass: {}", e);
                        return None;
                    }
                }
            }
        };

        self.sequence += 1;
        Some(Frame {
            sequence: self.sequence,
            view,
        })
    }
}
