use anyhow::{Context, Result};
use jack::{AudioIn, AudioOut, Client, Port, ProcessScope};

use crate::host::{EffectHost, HostError};

pub const IN_LEFT: &str = "in_left";
pub const IN_RIGHT: &str = "in_right";
pub const OUT_LEFT: &str = "out_left";
pub const OUT_RIGHT: &str = "out_right";

pub struct Ports {
    input_left: Port<AudioIn>,
    input_right: Port<AudioIn>,
    output_left: Port<AudioOut>,
    output_right: Port<AudioOut>,
}

impl Ports {
    pub fn new(client: &Client) -> Result<Self> {
        Ok(Self {
            input_left: client
                .register_port(IN_LEFT, AudioIn::default())
                .context("failed to register left in port")?,
            input_right: client
                .register_port(IN_RIGHT, AudioIn::default())
                .context("failed to register right in port")?,
            output_left: client
                .register_port(OUT_LEFT, AudioOut::default())
                .context("failed to register left out port")?,
            output_right: client
                .register_port(OUT_RIGHT, AudioOut::default())
                .context("failed to register right out port")?,
        })
    }

    /// Stream this cycle's input through the host into the output ports.
    pub fn process(&mut self, ps: &ProcessScope, host: &mut EffectHost) -> Result<(), HostError> {
        let Self {
            input_left,
            input_right,
            output_left,
            output_right,
        } = self;

        host.process_buffers(
            input_left.as_slice(ps),
            input_right.as_slice(ps),
            output_left.as_mut_slice(ps),
            output_right.as_mut_slice(ps),
        )
    }

    pub fn silence_output(&mut self, ps: &ProcessScope) {
        self.output_left.as_mut_slice(ps).fill(0.0);
        self.output_right.as_mut_slice(ps).fill(0.0);
    }
}
