//! cpal-backed audio output.
//!
//! The cpal stream is not `Send`, so each `play` spawns a dedicated
//! thread that owns the stream and services pause/resume/stop commands
//! over a channel. Parameter changes bypass the channel entirely and go
//! through the lock-free [`Params`] shared with the mixer callback.
//!
//! Device failures are logged and swallowed: a machine without an output
//! device degrades to a silent session rather than an error.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, warn};

use mindwave_core::dose::FrequencyLayer;
use mindwave_core::output::AudioOutput;
use mindwave_core::session::store::DEFAULT_VOLUME;

use super::mixer::{Mixer, Params};

enum Command {
    Pause,
    Resume,
    Stop,
}

/// [`AudioOutput`] implementation over the default cpal output device.
pub struct CpalAudioOutput {
    params: Arc<Params>,
    control: Mutex<Option<Sender<Command>>>,
}

impl CpalAudioOutput {
    pub fn new() -> Self {
        Self {
            params: Arc::new(Params::new(DEFAULT_VOLUME, 5)),
            control: Mutex::new(None),
        }
    }

    fn send(&self, command: Command) {
        let control = self.control.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = control.as_ref() {
            // A dead stream thread means there is nothing left to control.
            let _ = sender.send(command);
        }
    }
}

impl Default for CpalAudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for CpalAudioOutput {
    fn play(&self, layers: &[FrequencyLayer], volume: f32, intensity: u8) {
        self.params.set_volume(volume);
        self.params.set_intensity(intensity);

        let mut control = self.control.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = control.take() {
            let _ = previous.send(Command::Stop);
        }

        let (sender, receiver) = mpsc::channel();
        let layers = layers.to_vec();
        let params = Arc::clone(&self.params);
        std::thread::spawn(move || run_stream(layers, params, receiver));
        *control = Some(sender);
    }

    fn pause(&self) {
        self.send(Command::Pause);
    }

    fn resume(&self) {
        self.send(Command::Resume);
    }

    fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    fn set_intensity(&self, intensity: u8) {
        self.params.set_intensity(intensity);
    }

    fn stop(&self) {
        let mut control = self.control.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = control.take() {
            let _ = sender.send(Command::Stop);
        }
    }
}

/// Stream thread body: builds the output stream, then blocks on the
/// command channel until told to stop (or the output is dropped).
fn run_stream(layers: Vec<FrequencyLayer>, params: Arc<Params>, receiver: Receiver<Command>) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        warn!("no audio output device available");
        return;
    };
    let config = match device.default_output_config() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "failed to query output config");
            return;
        }
    };
    if config.sample_format() != cpal::SampleFormat::F32 {
        warn!(format = ?config.sample_format(), "unsupported output sample format");
        return;
    }

    let channels = config.channels() as usize;
    let sample_rate = config.sample_rate().0 as f32;
    let mut mixer = Mixer::new(&layers, params, sample_rate);
    debug!(layers = layers.len(), sample_rate, "starting audio stream");

    let stream = match device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            for frame in data.chunks_mut(channels) {
                let (left, right) = mixer.next_frame();
                frame[0] = left;
                if channels > 1 {
                    frame[1] = right;
                }
                for extra in frame.iter_mut().skip(2) {
                    *extra = 0.0;
                }
            }
        },
        |err| warn!(error = %err, "audio stream error"),
        None,
    ) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(error = %err, "failed to build output stream");
            return;
        }
    };

    if let Err(err) = stream.play() {
        warn!(error = %err, "failed to start output stream");
        return;
    }

    while let Ok(command) = receiver.recv() {
        match command {
            Command::Pause => {
                let _ = stream.pause();
            }
            Command::Resume => {
                let _ = stream.play();
            }
            Command::Stop => break,
        }
    }
    debug!("audio stream stopped");
}
