use anyhow::{Context, Result};
use jack::{Client, Control, Frames, ProcessScope};
use log::{debug, error};

use crate::host::EffectHost;
use crate::io::ports::Ports;

pub struct NotificationHandler;

impl jack::NotificationHandler for NotificationHandler {
    fn sample_rate(&mut self, _: &Client, sample_rate: Frames) -> Control {
        debug!(">> JACK sample_rate changed to {sample_rate}");

        Control::Continue
    }
}

/// Real-time callback: one JACK cycle in, one out, frame by frame through
/// the effect host.
pub struct ProcessHandler {
    ports: Ports,
    host: EffectHost,
}

impl ProcessHandler {
    pub fn new(client: &Client, host: EffectHost) -> Result<Self> {
        let ports = Ports::new(client).context("failed to create audio ports")?;
        debug_stats(client);

        Ok(Self { ports, host })
    }
}

impl jack::ProcessHandler for ProcessHandler {
    fn process(&mut self, _client: &Client, ps: &ProcessScope) -> Control {
        if let Err(e) = self.ports.process(ps, &mut self.host) {
            // A rejected swap is a build/registry mismatch; stop the stream.
            error!("Effect host configuration error: {e}");
            self.ports.silence_output(ps);
            return Control::Quit;
        }

        Control::Continue
    }

    fn buffer_size(&mut self, client: &Client, frames: Frames) -> Control {
        debug!(">> JACK buffer_size changed to {frames} frames");
        debug_stats(client);

        Control::Continue
    }
}

fn debug_stats(client: &Client) {
    let sample_rate = client.sample_rate() as f32;
    let buffer_frames = client.buffer_size() as f32;
    debug!(
        "Sample rate: {sample_rate}, Buffer frames: {buffer_frames}, Calls p/s: {}",
        sample_rate / buffer_frames
    );
}
