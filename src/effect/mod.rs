pub mod common;
pub mod registry;
pub mod units;

pub use registry::{EffectFactory, EffectRegistry, RegistryEntry};

/// The capability set every hostable effect implements.
///
/// Parameters are addressed by position and carry normalised values in
/// `[0, 1]`. The host never range-checks what it forwards, so units clamp
/// their own inputs (see [`pin_parameter`]).
pub trait EffectUnit: Send + 'static {
    fn set_parameter(&mut self, index: usize, value: f32);

    fn get_parameter(&self, index: usize) -> f32;

    fn parameter_name(&self, index: usize) -> &str;

    fn effect_name(&self) -> &str;

    /// Human readable rendering of a parameter's current value.
    fn parameter_display(&self, index: usize) -> String {
        format!("{:.3}", self.get_parameter(index))
    }

    /// Parse text in the style of [`parameter_display`](Self::parameter_display)
    /// back into a normalised value. `None` if the text is not understood.
    fn parameter_from_text(&self, _index: usize, text: &str) -> Option<f32> {
        text.trim().parse().ok()
    }

    // Called by the host on every freshly built unit, before the first block.
    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    /// Process one block, writing exactly `input[c].len()` frames into each
    /// output channel. Must not allocate or block.
    fn process_replacing(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]);
}

/// Clamp a normalised parameter into `[0, 1]`.
#[inline]
pub fn pin_parameter(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
