use log::debug;

use crate::effect::{EffectRegistry, EffectUnit};
use crate::host::{HostError, MAX_PARAMS};

/// The active effect instance. Owned and mutated by the audio thread only;
/// dropping the slot releases the unit.
pub struct EffectSlot {
    unit: Box<dyn EffectUnit>,
    index: usize,
    param_count: usize,
    name: String,
}

impl EffectSlot {
    /// Build a fresh unit from registry entry `index`.
    pub fn new(registry: &EffectRegistry, index: usize, sample_rate: f32) -> Result<Self, HostError> {
        if registry.is_empty() {
            return Err(HostError::EmptyRegistry);
        }
        let entry = registry.get(index)?;

        let mut unit = entry.create();
        unit.set_sample_rate(sample_rate);
        debug!(
            "Built effect slot #{index} '{}' at {sample_rate} Hz",
            entry.name()
        );

        Ok(Self {
            unit,
            index,
            param_count: entry.param_count(),
            name: entry.name().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn unit(&self) -> &dyn EffectUnit {
        self.unit.as_ref()
    }

    pub fn unit_mut(&mut self) -> &mut dyn EffectUnit {
        self.unit.as_mut()
    }

    pub fn process(&mut self, input: [&[f32]; 2], output: [&mut [f32]; 2]) {
        self.unit.process_replacing(input, output);
    }

    /// Query the unit's labels and current values for the control side.
    pub fn snapshot(&self) -> SlotInfo {
        let count = self.param_count.min(MAX_PARAMS);
        SlotInfo {
            index: self.index,
            name: self.name.clone(),
            effect_name: self.unit.effect_name().to_string(),
            param_names: (0..count)
                .map(|i| self.unit.parameter_name(i).to_string())
                .collect(),
            defaults: (0..count).map(|i| self.unit.get_parameter(i)).collect(),
        }
    }
}

/// Read-only description of the active slot, published to the control side
/// on every swap. Treat it as a snapshot: it may be one block stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotInfo {
    /// Registry index of the effect.
    pub index: usize,
    /// Registry display name.
    pub name: String,
    /// Name reported by the unit itself.
    pub effect_name: String,
    pub param_names: Vec<String>,
    /// Parameter values of the freshly built unit.
    pub defaults: Vec<f32>,
}

impl SlotInfo {
    pub fn param_count(&self) -> usize {
        self.param_names.len()
    }

    pub fn is_control_visible(&self, index: usize) -> bool {
        index < self.param_count()
    }

    /// Label for control `index`, or `None` if the control is hidden.
    pub fn control_label(&self, index: usize) -> Option<&str> {
        self.param_names.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::units::register_builtin;

    fn builtin() -> EffectRegistry {
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_slot_mirrors_registry_entry() {
        let registry = builtin();
        for index in 0..registry.count() {
            let slot = EffectSlot::new(&registry, index, 48_000.0).unwrap();
            let entry = registry.get(index).unwrap();
            assert_eq!(slot.name(), entry.name());
            assert_eq!(slot.param_count(), entry.param_count());
            assert_eq!(slot.index(), index);
        }
    }

    #[test]
    fn test_empty_registry_is_fatal() {
        let registry = EffectRegistry::new();
        let err = EffectSlot::new(&registry, 0, 48_000.0).err().unwrap();
        assert_eq!(err, HostError::EmptyRegistry);
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_out_of_range_index_is_fatal() {
        let registry = builtin();
        let count = registry.count();
        let err = EffectSlot::new(&registry, count, 48_000.0).err().unwrap();
        assert_eq!(err, HostError::OutOfRange { index: count, count });
    }

    #[test]
    fn test_snapshot_labels() {
        let registry = builtin();
        let slot = EffectSlot::new(&registry, 1, 48_000.0).unwrap();
        let info = slot.snapshot();

        assert_eq!(info.name, "DigitalBlack");
        assert_eq!(info.effect_name, "DigitalBlack");
        assert_eq!(info.param_names, ["Thresh", "Dry/Wet"]);
        assert_eq!(info.defaults, [0.0, 1.0]);
        assert_eq!(info.control_label(1), Some("Dry/Wet"));
        assert_eq!(info.control_label(2), None);
        assert!(!info.is_control_visible(2));
    }
}
