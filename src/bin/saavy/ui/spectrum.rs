//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope buffer, sampled at log-spaced frequencies
//! and plotted against log10(Hz) so octaves are evenly spaced.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const SPECTRUM_BINS: usize = 64;
const MIN_DISPLAY_HZ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;
/// Per-frame fall of a peak, in dB, so the plot decays instead of flickering
const FALL_DB: f64 = 3.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin for each displayed point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB) per displayed point
    spectrum: Vec<(f64, f64)>,
    /// dB that makes a full-scale sine read 0
    reference_db: f64,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        let denom = (buffer_len - 1) as f32;
        let window: Vec<f32> = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).min(20_000.0);
        let max_bin = buffer_len / 2 - 1;
        let log_min = MIN_DISPLAY_HZ.log10();
        let log_max = nyquist.max(MIN_DISPLAY_HZ * 2.0).log10();

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let log_hz = log_min + (log_max - log_min) * t;
            let hz = 10f64.powf(log_hz);
            let bin = (hz * buffer_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(bin.clamp(1, max_bin));
            spectrum.push((log_hz, FLOOR_DB));
        }

        // Bin magnitude of a full-scale sine
        let full_scale = window.iter().sum::<f32>() as f64 / 2.0;

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            reference_db: 20.0 * full_scale.max(1e-9).log10(),
        }
    }

    /// Analyze the latest scope buffer. Buffers of the wrong length are skipped.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for ((_, db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() as f64;
            let fresh = (20.0 * magnitude.max(1e-12).log10() - self.reference_db).max(FLOOR_DB);
            *db = fresh.max(*db - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (x_min, x_max) = match (spectrum.first(), spectrum.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => (MIN_DISPLAY_HZ.log10(), 20_000f64.log10()),
    };

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
