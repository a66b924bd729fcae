use crate::effect::{EffectUnit, pin_parameter};

pub const PARAM_COUNT: usize = 1;

#[derive(Clone, Copy, Default)]
struct SlewChannel {
    last_input: f32,
    last_output: f32,
}

impl SlewChannel {
    fn process(&mut self, input: f32, centering: f32) -> f32 {
        let slew = (input - self.last_input).clamp(-1.0, 1.0);
        self.last_input = input;

        let output = self.last_output + slew.asin();
        self.last_output = output.clamp(-1.0, 1.0) * centering;
        output
    }
}

/// Console-style channel stage in the manner of Airwindows' C5RawChannel.
///
/// Each sample is rebuilt from the previous output plus the arcsine of the
/// input's slew, so slow material passes unchanged and fast edges are
/// emphasised. `Center` bleeds the rebuilt signal back towards zero, tapered
/// so it only bites near the top of its travel.
#[derive(Default)]
pub struct C5RawChannel {
    center: f32,
    channels: [SlewChannel; 2],
}

impl C5RawChannel {
    pub fn create() -> Box<dyn EffectUnit> {
        Box::new(Self::default())
    }

    fn centering(&self) -> f32 {
        1.0 - (self.center * 0.5).powi(5)
    }
}

impl EffectUnit for C5RawChannel {
    fn set_parameter(&mut self, index: usize, value: f32) {
        if index == 0 {
            self.center = pin_parameter(value);
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        match index {
            0 => self.center,
            _ => 0.0,
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        match index {
            0 => "Center",
            _ => "",
        }
    }

    fn effect_name(&self) -> &str {
        "C5RawChannel"
    }

    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        let centering = self.centering();

        for ((inp, out), channel) in input.into_iter().zip(output).zip(&mut self.channels) {
            for (i, o) in inp.iter().zip(out.iter_mut()) {
                *o = channel.process(*i, centering);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(unit: &mut C5RawChannel, input: &[f32]) -> Vec<f32> {
        let (mut ol, mut or) = (vec![0.0; input.len()], vec![0.0; input.len()]);
        unit.process_replacing([input, input], [&mut ol, &mut or]);
        assert_eq!(ol, or);
        ol
    }

    #[test]
    fn test_slow_signal_passes_through() {
        let mut channel = C5RawChannel::default();
        let ramp: Vec<f32> = (0..300).map(|n| n as f32 * 0.001).collect();

        let out = run(&mut channel, &ramp);
        for (o, i) in out.iter().zip(&ramp) {
            assert!((o - i).abs() < 1e-4, "{o} vs {i}");
        }
    }

    #[test]
    fn test_center_pulls_held_level_to_zero() {
        let held = vec![0.5; 2048];

        let mut open = C5RawChannel::default();
        let out = run(&mut open, &held);
        assert!((out[2047] - 0.5f32.asin()).abs() < 1e-5);

        let mut centred = C5RawChannel::default();
        centred.set_parameter(0, 1.0);
        let out = run(&mut centred, &held);
        assert!(out[2047].abs() < 1e-3);
    }

    #[test]
    fn test_default_center_is_zero() {
        let channel = C5RawChannel::default();
        assert_eq!(channel.get_parameter(0), 0.0);
        assert_eq!(channel.parameter_name(0), "Center");
        assert_eq!(channel.centering(), 1.0);
    }
}
