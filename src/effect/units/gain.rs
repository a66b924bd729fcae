use crate::effect::common::{db_to_lin, lin_to_db};
use crate::effect::{EffectUnit, pin_parameter};

pub const PARAM_COUNT: usize = 1;

/// Plain stereo gain. The knob maps linearly onto `0..=2`, so the default
/// of 0.5 is unity.
pub struct Gain {
    gain: f32,
}

impl Default for Gain {
    fn default() -> Self {
        Self { gain: 0.5 }
    }
}

impl Gain {
    pub fn create() -> Box<dyn EffectUnit> {
        Box::new(Self::default())
    }

    fn linear(&self) -> f32 {
        self.gain * 2.0
    }
}

impl EffectUnit for Gain {
    fn set_parameter(&mut self, index: usize, value: f32) {
        if index == 0 {
            self.gain = pin_parameter(value);
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        match index {
            0 => self.gain,
            _ => 0.0,
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        match index {
            0 => "Gain",
            _ => "",
        }
    }

    fn effect_name(&self) -> &str {
        "Gain"
    }

    fn parameter_display(&self, index: usize) -> String {
        match index {
            0 => format!("{:.1} dB", lin_to_db(self.linear())),
            _ => String::new(),
        }
    }

    fn parameter_from_text(&self, index: usize, text: &str) -> Option<f32> {
        if index != 0 {
            return None;
        }
        let db: f32 = text.trim().trim_end_matches("dB").trim_end().parse().ok()?;
        Some(pin_parameter(db_to_lin(db) * 0.5))
    }

    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        let gain = self.linear();
        for (inp, out) in input.into_iter().zip(output) {
            for (i, o) in inp.iter().zip(out.iter_mut()) {
                *o = *i * gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_default_is_unity() {
        let mut gain = Gain::default();
        let (l, r) = ([0.25f32; 4], [-0.5f32; 4]);
        let (mut ol, mut or) = ([0.0f32; 4], [0.0f32; 4]);

        gain.process_replacing([&l, &r], [&mut ol, &mut or]);

        assert_eq!(ol, l);
        assert_eq!(or, r);
        assert_eq!(gain.parameter_display(0), "0.0 dB");
    }

    #[test]
    fn test_gain_clamps_and_scales() {
        let mut gain = Gain::default();
        gain.set_parameter(0, 5.0);
        assert_eq!(gain.get_parameter(0), 1.0);

        let input = [0.5f32; 2];
        let (mut ol, mut or) = ([0.0f32; 2], [0.0f32; 2]);
        gain.process_replacing([&input, &input], [&mut ol, &mut or]);
        assert_eq!(ol, [1.0, 1.0]);

        gain.set_parameter(0, 0.0);
        gain.process_replacing([&input, &input], [&mut ol, &mut or]);
        assert_eq!(or, [0.0, 0.0]);
    }

    #[test]
    fn test_gain_parses_decibel_text() {
        let gain = Gain::default();
        assert_eq!(gain.parameter_from_text(0, "0.0 dB"), Some(0.5));
        assert!((gain.parameter_from_text(0, "-6.02dB").unwrap() - 0.25).abs() < 1e-3);
        assert_eq!(gain.parameter_from_text(0, "+20 dB"), Some(1.0));
        assert_eq!(gain.parameter_from_text(0, "loud"), None);
        assert_eq!(gain.parameter_from_text(1, "0 dB"), None);
    }
}
