//! Oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Find an upward zero crossing in the first half so a steady tone stands still
fn trigger_point(buffer: &[f32]) -> usize {
    buffer[..buffer.len() / 2]
        .windows(2)
        .position(|w| w[0] <= 0.0 && w[1] > 0.0)
        .unwrap_or(0)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default()
        .title(" Waveform ")
        .borders(Borders::ALL);

    let start = trigger_point(audio_buffer);
    let view = &audio_buffer[start..start + audio_buffer.len() / 2];

    let data: Vec<(f64, f64)> = view
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / view.len().max(1) as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
