//! Saavy - audio setup and runner

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};
use rtrb::RingBuffer;
use tracing::{info, warn};

use saavy_synth::{EngineConfig, Synth, SynthParams, MAX_BLOCK_SIZE};

use super::ui::{UiApp, VIS_BUFFER_SIZE};

/// Set while the TUI owns the terminal
static TERMINAL_TAKEN: AtomicBool = AtomicBool::new(false);

/// Log sink for the subscriber. Logs to a terminal stderr are dropped while the
/// TUI is drawn; a redirected stderr keeps receiving them.
pub fn log_writer() -> Box<dyn Write> {
    if mute_logs(TERMINAL_TAKEN.load(Ordering::Relaxed), io::stderr().is_terminal()) {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    }
}

fn mute_logs(terminal_taken: bool, stderr_is_tty: bool) -> bool {
    terminal_taken && stderr_is_tty
}

/// Main application builder
pub struct Saavy {
    config: EngineConfig,
    params: SynthParams,
}

impl Saavy {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            params: SynthParams::default(),
        }
    }

    /// Starting sound
    pub fn params(mut self, params: SynthParams) -> Self {
        self.params = params;
        self
    }

    /// Open the default output device and hand the terminal to the UI until quit.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;
        info!(sample_rate, channels, "opened output device");

        let config = self.config.with_sample_rate(sample_rate);
        let (mut synth, handle) = Synth::with_params(config, self.params)
            .wrap_err("failed to build synth engine")?;

        // Audio thread -> UI oscilloscope
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    synth.render(block);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        // Scope is best-effort, drop samples when the UI lags
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| warn!(%err, "audio stream error"),
            None,
        )?;

        // Key release events need the kitty keyboard protocol
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if !enhanced {
            warn!("terminal does not report key releases; press a note key again to stop it");
        }

        stream.play()?;

        let mut terminal = ratatui::init();
        TERMINAL_TAKEN.store(true, Ordering::Relaxed);
        if enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let mut app = UiApp::new(handle, scope_rx, sample_rate, self.params, enhanced);
        let result = app.run(&mut terminal);

        if enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        ratatui::restore();
        TERMINAL_TAKEN.store(false, Ordering::Relaxed);
        drop(stream);

        result
    }
}
