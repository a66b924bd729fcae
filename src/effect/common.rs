use std::f32::consts::PI;

/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, flooring silence at -100 dB.
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin > 1e-5 { 20.0 * lin.log10() } else { -100.0 }
}

/// Calculate a one-pole smoothing coefficient from a time constant in milliseconds.
///
/// Returns `exp(-1 / (sample_rate * time_ms * 0.001))`.
#[inline]
pub fn calculate_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    (-1.0 / (sample_rate * 0.001 * time_ms)).exp()
}

/// One-pole envelope follower with separate attack and release coefficients.
#[derive(Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl EnvelopeFollower {
    pub fn from_ms(attack_ms: f32, release_ms: f32, sample_rate: f32) -> Self {
        Self {
            envelope: 0.0,
            attack_coeff: calculate_coefficient(attack_ms, sample_rate),
            release_coeff: calculate_coefficient(release_ms, sample_rate),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let abs_input = input.abs();
        let coeff = if abs_input > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff.mul_add(self.envelope, (1.0 - coeff) * abs_input);
        self.envelope
    }
}

/// First-order RC low-pass.
#[derive(Clone, Default)]
pub struct OnePoleLowpass {
    alpha: f32,
    prev: f32,
}

impl OnePoleLowpass {
    pub fn new(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::default();
        filter.set_cutoff(cutoff_hz, sample_rate);
        filter
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let dt = 1.0 / sample_rate;
        self.alpha = dt / (rc + dt);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.prev += self.alpha * (input - self.prev);
        self.prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_round_trip_at_unity() {
        assert!((db_to_lin(0.0) - 1.0).abs() < 1e-6);
        assert!(lin_to_db(1.0).abs() < 1e-4);
        assert_eq!(lin_to_db(0.0), -100.0);
    }

    #[test]
    fn test_envelope_follower_tracks_and_decays() {
        let mut env = EnvelopeFollower::from_ms(0.1, 10.0, 48_000.0);
        let mut level = 0.0;
        for _ in 0..480 {
            level = env.process(1.0);
        }
        assert!(level > 0.9);

        for _ in 0..4800 {
            level = env.process(0.0);
        }
        assert!(level < 0.01);
    }

    #[test]
    fn test_lowpass_passes_dc_and_settles() {
        let mut lp = OnePoleLowpass::new(1_000.0, 48_000.0);
        let mut out = 0.0;
        for _ in 0..4800 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3);
    }
}
