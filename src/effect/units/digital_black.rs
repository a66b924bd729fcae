use crate::effect::common::{EnvelopeFollower, calculate_coefficient};
use crate::effect::{EffectUnit, pin_parameter};

pub const PARAM_COUNT: usize = 2;

const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
const GATE_ATTACK_MS: f32 = 1.0;
const GATE_RELEASE_MS: f32 = 20.0;

#[derive(Clone)]
struct GateChannel {
    envelope: EnvelopeFollower,
    gate: f32,
}

impl GateChannel {
    fn new(sample_rate: f32) -> Self {
        Self {
            envelope: EnvelopeFollower::from_ms(0.1, 10.0, sample_rate),
            gate: 1.0,
        }
    }
}

/// Envelope-driven gate that drops everything below the threshold to
/// digital silence.
///
/// Exposes the controls of Airwindows' DigitalBlack but not its algorithm:
/// the gate here follows a smoothed envelope with fixed 1 ms attack and
/// 20 ms release instead of switching sample by sample.
///
/// - `Thresh`: squared onto a linear level, 0 leaves the gate open.
/// - `Dry/Wet`: blend between the untouched input and the gated signal.
pub struct DigitalBlack {
    thresh: f32,
    dry_wet: f32,
    attack_coeff: f32,
    release_coeff: f32,
    channels: [GateChannel; 2],
}

impl Default for DigitalBlack {
    fn default() -> Self {
        Self {
            thresh: 0.0,
            dry_wet: 1.0,
            attack_coeff: calculate_coefficient(GATE_ATTACK_MS, DEFAULT_SAMPLE_RATE),
            release_coeff: calculate_coefficient(GATE_RELEASE_MS, DEFAULT_SAMPLE_RATE),
            channels: [
                GateChannel::new(DEFAULT_SAMPLE_RATE),
                GateChannel::new(DEFAULT_SAMPLE_RATE),
            ],
        }
    }
}

impl DigitalBlack {
    pub fn create() -> Box<dyn EffectUnit> {
        Box::new(Self::default())
    }
}

impl EffectUnit for DigitalBlack {
    fn set_parameter(&mut self, index: usize, value: f32) {
        match index {
            0 => self.thresh = pin_parameter(value),
            1 => self.dry_wet = pin_parameter(value),
            _ => {}
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        match index {
            0 => self.thresh,
            1 => self.dry_wet,
            _ => 0.0,
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        match index {
            0 => "Thresh",
            1 => "Dry/Wet",
            _ => "",
        }
    }

    fn effect_name(&self) -> &str {
        "DigitalBlack"
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.attack_coeff = calculate_coefficient(GATE_ATTACK_MS, sample_rate);
        self.release_coeff = calculate_coefficient(GATE_RELEASE_MS, sample_rate);
        self.channels = [GateChannel::new(sample_rate), GateChannel::new(sample_rate)];
    }

    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        let threshold = self.thresh * self.thresh;
        let wet = self.dry_wet;
        let (attack, release) = (self.attack_coeff, self.release_coeff);

        for ((inp, out), channel) in input.into_iter().zip(output).zip(&mut self.channels) {
            for (i, o) in inp.iter().zip(out.iter_mut()) {
                let level = channel.envelope.process(*i);
                let target = if level > threshold { 1.0 } else { 0.0 };
                let coeff = if target > channel.gate { attack } else { release };
                channel.gate = coeff.mul_add(channel.gate, (1.0 - coeff) * target);

                let gated = if channel.gate < 1e-4 { 0.0 } else { *i * channel.gate };
                *o = (*i).mul_add(1.0 - wet, gated * wet);
            }
        }
    }
}
