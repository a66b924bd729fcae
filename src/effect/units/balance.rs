use crate::effect::{EffectUnit, pin_parameter};

pub const PARAM_COUNT: usize = 2;

/// Mid/side width followed by a balance control. Both knobs centred is an
/// exact pass-through.
pub struct Balance {
    pan: f32,
    width: f32,
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            pan: 0.5,
            width: 0.5,
        }
    }
}

impl Balance {
    pub fn create() -> Box<dyn EffectUnit> {
        Box::new(Self::default())
    }

    fn gains(&self) -> (f32, f32) {
        let left = (2.0 * (1.0 - self.pan)).min(1.0);
        let right = (2.0 * self.pan).min(1.0);
        (left, right)
    }
}

impl EffectUnit for Balance {
    fn set_parameter(&mut self, index: usize, value: f32) {
        match index {
            0 => self.pan = pin_parameter(value),
            1 => self.width = pin_parameter(value),
            _ => {}
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        match index {
            0 => self.pan,
            1 => self.width,
            _ => 0.0,
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        match index {
            0 => "Pan",
            1 => "Width",
            _ => "",
        }
    }

    fn effect_name(&self) -> &str {
        "Balance"
    }

    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        let (gain_l, gain_r) = self.gains();
        let side_gain = self.width * 2.0;
        let [in_l, in_r] = input;
        let [out_l, out_r] = output;

        for (((l, r), ol), or) in in_l.iter().zip(in_r).zip(out_l.iter_mut()).zip(out_r.iter_mut()) {
            let mid = (l + r) * 0.5;
            let side = (l - r) * 0.5 * side_gain;
            *ol = (mid + side) * gain_l;
            *or = (mid - side) * gain_r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(balance: &mut Balance, l: f32, r: f32) -> (f32, f32) {
        let (mut ol, mut or) = ([0.0f32; 1], [0.0f32; 1]);
        balance.process_replacing([&[l], &[r]], [&mut ol, &mut or]);
        (ol[0], or[0])
    }

    #[test]
    fn test_centred_is_identity() {
        let mut balance = Balance::default();
        assert_eq!(run(&mut balance, 0.75, -0.25), (0.75, -0.25));
    }

    #[test]
    fn test_zero_width_folds_to_mono() {
        let mut balance = Balance::default();
        balance.set_parameter(1, 0.0);
        assert_eq!(run(&mut balance, 1.0, 0.0), (0.5, 0.5));
    }

    #[test]
    fn test_hard_left_mutes_right() {
        let mut balance = Balance::default();
        balance.set_parameter(0, 0.0);
        let (l, r) = run(&mut balance, 0.5, 0.5);
        assert_eq!(l, 0.5);
        assert_eq!(r, 0.0);
    }
}
