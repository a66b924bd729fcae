use crate::effect::common::OnePoleLowpass;
use crate::effect::{EffectUnit, pin_parameter};

pub const PARAM_COUNT: usize = 2;

const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
const MIN_CUTOFF_HZ: f32 = 20.0;
const CUTOFF_RANGE: f32 = 1_000.0;

/// One-pole low-pass with a dry/wet blend. `Cutoff` sweeps 20 Hz to 20 kHz
/// exponentially.
pub struct Smooth {
    cutoff: f32,
    dry_wet: f32,
    sample_rate: f32,
    filters: [OnePoleLowpass; 2],
    // Knob position the filters were last tuned for.
    tuned_for: f32,
}

impl Default for Smooth {
    fn default() -> Self {
        let mut smooth = Self {
            cutoff: 1.0,
            dry_wet: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            filters: [OnePoleLowpass::default(), OnePoleLowpass::default()],
            tuned_for: f32::NAN,
        };
        smooth.retune();
        smooth
    }
}

impl Smooth {
    pub fn create() -> Box<dyn EffectUnit> {
        Box::new(Self::default())
    }

    pub fn cutoff_hz(&self) -> f32 {
        let nyquist_guard = self.sample_rate * 0.45;
        (MIN_CUTOFF_HZ * CUTOFF_RANGE.powf(self.cutoff)).min(nyquist_guard)
    }

    fn retune(&mut self) {
        let hz = self.cutoff_hz();
        for filter in &mut self.filters {
            filter.set_cutoff(hz, self.sample_rate);
        }
        self.tuned_for = self.cutoff;
    }
}

impl EffectUnit for Smooth {
    fn set_parameter(&mut self, index: usize, value: f32) {
        match index {
            0 => self.cutoff = pin_parameter(value),
            1 => self.dry_wet = pin_parameter(value),
            _ => {}
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        match index {
            0 => self.cutoff,
            1 => self.dry_wet,
            _ => 0.0,
        }
    }

    fn parameter_name(&self, index: usize) -> &str {
        match index {
            0 => "Cutoff",
            1 => "Dry/Wet",
            _ => "",
        }
    }

    fn effect_name(&self) -> &str {
        "Smooth"
    }

    fn parameter_display(&self, index: usize) -> String {
        match index {
            0 => format!("{:.0} Hz", self.cutoff_hz()),
            1 => format!("{:.3}", self.dry_wet),
            _ => String::new(),
        }
    }

    fn parameter_from_text(&self, index: usize, text: &str) -> Option<f32> {
        match index {
            0 => {
                let hz: f32 = text.trim().trim_end_matches("Hz").trim_end().parse().ok()?;
                (hz > 0.0).then(|| pin_parameter((hz / MIN_CUTOFF_HZ).ln() / CUTOFF_RANGE.ln()))
            }
            1 => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.retune();
    }

    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        if self.tuned_for != self.cutoff {
            self.retune();
        }

        let wet = self.dry_wet;
        for ((inp, out), filter) in input.into_iter().zip(output).zip(&mut self.filters) {
            for (i, o) in inp.iter().zip(out.iter_mut()) {
                let filtered = filter.process(*i);
                *o = (*i).mul_add(1.0 - wet, filtered * wet);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_of_tone(smooth: &mut Smooth, freq: f32, sample_rate: f32) -> f32 {
        const FRAMES: usize = 4_800;
        let input: Vec<f32> = (0..FRAMES)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect();
        let (mut ol, mut or) = (vec![0.0; FRAMES], vec![0.0; FRAMES]);
        smooth.process_replacing([&input, &input], [&mut ol, &mut or]);

        let tail = &ol[FRAMES / 2..];
        (tail.iter().map(|x| x * x).sum::<f32>() / tail.len() as f32).sqrt()
    }

    #[test]
    fn test_low_cutoff_attenuates_treble() {
        let mut smooth = Smooth::default();
        smooth.set_sample_rate(48_000.0);
        smooth.set_parameter(0, 0.0);

        let rms = rms_of_tone(&mut smooth, 5_000.0, 48_000.0);
        assert!(rms < 0.05, "expected strong attenuation, got {rms}");
    }

    #[test]
    fn test_open_cutoff_passes_bass() {
        let mut smooth = Smooth::default();
        smooth.set_sample_rate(48_000.0);

        let rms = rms_of_tone(&mut smooth, 100.0, 48_000.0);
        assert!(rms > 0.65, "expected bass to pass, got {rms}");
    }

    #[test]
    fn test_cutoff_display() {
        let mut smooth = Smooth::default();
        smooth.set_sample_rate(48_000.0);
        smooth.set_parameter(0, 0.0);
        assert_eq!(smooth.parameter_display(0), "20 Hz");
    }

    #[test]
    fn test_cutoff_text_inverts_display() {
        let mut smooth = Smooth::default();
        smooth.set_sample_rate(48_000.0);
        smooth.set_parameter(0, 0.5);

        let shown = smooth.parameter_display(0);
        let value = smooth.parameter_from_text(0, &shown).unwrap();
        assert!((value - 0.5).abs() < 1e-3, "{shown} parsed to {value}");

        assert_eq!(smooth.parameter_from_text(0, "20 Hz"), Some(0.0));
        assert_eq!(smooth.parameter_from_text(0, "0 Hz"), None);
        assert_eq!(smooth.parameter_from_text(1, "0.25"), Some(0.25));
        assert_eq!(smooth.parameter_from_text(2, "0.25"), None);
    }
}
