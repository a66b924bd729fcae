use std::sync::atomic::{AtomicU32, Ordering};

use crate::effect::EffectUnit;
use crate::host::{CV_SCALE, MAX_PARAMS};

/// One externally exposed control: a knob plus a control voltage summed into
/// it. Values are stored as `f32` bits so both sides stay lock-free.
///
/// Relaxed ordering is enough here: the audio thread only needs *a* recent
/// value, and one block of staleness is acceptable.
#[derive(Default)]
pub struct ControlInput {
    knob: AtomicU32,
    cv: AtomicU32,
}

impl ControlInput {
    pub fn set_knob(&self, value: f32) {
        self.knob.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn knob(&self) -> f32 {
        f32::from_bits(self.knob.load(Ordering::Relaxed))
    }

    pub fn set_cv(&self, volts: f32) {
        self.cv.store(volts.to_bits(), Ordering::Relaxed);
    }

    pub fn cv(&self) -> f32 {
        f32::from_bits(self.cv.load(Ordering::Relaxed))
    }

    /// Knob plus scaled CV, unclamped.
    pub fn value(&self) -> f32 {
        self.cv().mul_add(CV_SCALE, self.knob())
    }
}

/// The fixed bank of [`MAX_PARAMS`] controls shared between the control
/// surface and the audio thread.
pub struct ControlBank {
    inputs: [ControlInput; MAX_PARAMS],
}

impl Default for ControlBank {
    fn default() -> Self {
        Self {
            inputs: std::array::from_fn(|_| ControlInput::default()),
        }
    }
}

impl ControlBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&ControlInput> {
        self.inputs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlInput> {
        self.inputs.iter()
    }

    pub const fn len(&self) -> usize {
        MAX_PARAMS
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Which controls currently reach the active effect.
///
/// The first `param_count` controls are bound to parameter indices of the
/// same position; the rest are inert. Derived afresh on every swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterBinding {
    active: usize,
}

impl ParameterBinding {
    pub fn new(param_count: usize) -> Self {
        Self {
            active: param_count.min(MAX_PARAMS),
        }
    }

    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// Forward every bound control's current value into `unit`.
    pub fn apply(&self, controls: &ControlBank, unit: &mut dyn EffectUnit) {
        for (index, control) in controls.iter().take(self.active).enumerate() {
            unit.set_parameter(index, control.value());
        }
    }
}
