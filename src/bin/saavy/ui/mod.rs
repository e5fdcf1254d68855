//! TUI module for saavy
//!
//! Plays the synth from the computer keyboard and shows what the audio thread reports.

mod spectrum;
pub mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;
use tracing::debug;

use saavy_synth::{
    dsp::OscillatorWaveform,
    io::{KeyAction, KeyboardInput},
    synth::params::OscId,
    ParamChange, SynthError, SynthHandle, SynthParams,
};

pub use state::UiState;

use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::render_status;
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 1024;

const CUTOFF_STEP: f32 = 1.25;
const VOLUME_STEP: f32 = 0.05;

pub struct UiApp {
    handle: SynthHandle,
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    keyboard: KeyboardInput,
    /// Control-side copy of the sound, edited by keys then sent to the engine
    params: SynthParams,
    sample_rate: f32,
    /// Terminal reports key releases
    releases: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: SynthHandle,
        audio_rx: Consumer<f32>,
        sample_rate: f32,
        params: SynthParams,
        releases: bool,
    ) -> Self {
        Self {
            handle,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            keyboard: KeyboardInput::default(),
            params: params.clamped(),
            sample_rate,
            releases,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            let state = UiState::new(
                self.handle.latest_status(),
                &self.params,
                self.keyboard.octave(),
                self.sample_rate,
            );
            terminal.draw(|frame| self.render(frame, &state))?;

            // Drain every pending key (~60fps)
            if event::poll(Duration::from_millis(16))? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        self.handle_key(key);
                    }
                }
            }
        }

        // Leave nothing ringing
        let _ = self.handle.all_notes_off();
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let KeyCode::Char(c) = key.code else {
            if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press {
                self.should_quit = true;
            }
            return;
        };

        match key.kind {
            KeyEventKind::Release => {
                if let Some(note) = self.keyboard.release(c) {
                    report(self.handle.note_off_midi(note));
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => self.handle_press(c),
        }
    }

    fn handle_press(&mut self, c: char) {
        match c {
            'q' | 'Q' => self.should_quit = true,
            ' ' => {
                self.keyboard.clear();
                report(self.handle.all_notes_off());
            }
            'm' | 'M' => {
                // The engine lets go of every note on a mode switch
                self.keyboard.clear();
                let mono = !self.params.voicing.monophonic;
                self.send(ParamChange::Monophonic(mono));
            }
            '1'..='4' => {
                let index = c as usize - '1' as usize;
                let waveform = OscillatorWaveform::ALL[index];
                self.send(ParamChange::OscWaveform(OscId::Osc1, waveform));
            }
            '[' => {
                let cutoff = self.params.filter.frequency / CUTOFF_STEP;
                self.send(ParamChange::FilterFrequency(cutoff))
            }
            ']' => {
                let cutoff = self.params.filter.frequency * CUTOFF_STEP;
                self.send(ParamChange::FilterFrequency(cutoff))
            }
            '-' => self.send(ParamChange::MasterVolume(self.params.master_volume - VOLUME_STEP)),
            '=' => self.send(ParamChange::MasterVolume(self.params.master_volume + VOLUME_STEP)),
            _ => {
                // Without release events a second press lets go of the note
                if !self.releases {
                    if let Some(note) = self.keyboard.release(c) {
                        report(self.handle.note_off_midi(note));
                        return;
                    }
                }
                self.handle_note_key(c);
            }
        }
    }

    fn handle_note_key(&mut self, c: char) {
        match self.keyboard.press(c) {
            Some(KeyAction::NoteOn(note)) => report(self.handle.note_on_midi(note)),
            Some(KeyAction::Octave(octave)) => debug!(octave, "octave"),
            None => {}
        }
    }

    fn send(&mut self, change: ParamChange) {
        let change = self.params.apply(change);
        report(self.handle.set(change));
    }

    fn render(&self, frame: &mut Frame, state: &UiState) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Status
                Constraint::Min(8),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(frame, chunks[0], state);
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [a-j] Play  [Z/X] Octave  [M] Mono  [1-4] Wave  [ [ ] ] Cutoff  [-/=] Volume  [Space] Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

fn report(result: Result<(), SynthError>) {
    if let Err(err) = result {
        debug!(%err, "control message not delivered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;
    use saavy_synth::{EngineConfig, Synth};

    fn app(releases: bool) -> UiApp {
        let (_synth, handle) = Synth::new(EngineConfig::default()).unwrap();
        let (_scope_tx, scope_rx) = RingBuffer::<f32>::new(16);
        UiApp::new(handle, scope_rx, 48_000.0, SynthParams::default(), releases)
    }

    #[test]
    fn mode_switch_forgets_held_keys() {
        let mut app = app(false);
        app.handle_press('a');
        app.handle_press('d');
        assert_eq!(app.keyboard.held_notes().count(), 2);

        app.handle_press('m');
        assert!(app.params.voicing.monophonic);
        assert_eq!(app.keyboard.held_notes().count(), 0);

        // Without release events the next press starts the note again
        app.handle_press('a');
        assert_eq!(app.keyboard.held_notes().collect::<Vec<_>>(), vec![60]);
    }

    #[test]
    fn second_press_releases_without_release_events() {
        let mut app = app(false);
        app.handle_press('a');
        app.handle_press('a');
        assert_eq!(app.keyboard.held_notes().count(), 0);
    }
}
