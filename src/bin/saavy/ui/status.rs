//! Status panel - held notes, voicing, and the parameters the keys edit

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiState;

pub fn render_status(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .title(" saavy ")
        .borders(Borders::ALL);

    let held = if state.held.is_empty() {
        "-".to_string()
    } else {
        state.held.join(" ")
    };

    let params = &state.params;
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", state.mode()),
                Style::default().fg(if params.voicing.monophonic {
                    Color::Yellow
                } else {
                    Color::Green
                }),
            ),
            Span::styled(
                format!(" Octave: {}  ", state.octave),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("Voices: {}  ", state.voices),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:.1}kHz  ", state.sample_rate / 1000.0),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("Peak: {:.2}", state.peak),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Held: "),
            Span::styled(held, Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled(
                format!(
                    " Osc1: {}  Osc2: {}  Mix: {:.2}",
                    params.osc1.waveform.name(),
                    params.osc2.waveform.name(),
                    params.oscillator_mix
                ),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!(
                    " Filter: {} {:.0}Hz  Q {:.1}dB  {}dB/oct  Volume: {:.2}",
                    params.filter.filter_type.name(),
                    params.filter.frequency,
                    params.filter.q,
                    params.filter.slope,
                    params.master_volume
                ),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
