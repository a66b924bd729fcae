use arc_swap::ArcSwap;
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::effect::EffectRegistry;
use crate::host::block::BlockBuffer;
use crate::host::params::{ControlBank, ControlInput, ParameterBinding};
use crate::host::slot::{EffectSlot, SlotInfo};
use crate::host::swap::SwapController;
use crate::host::HostError;

/// Audio-thread side of the effect host.
///
/// Owns the active [`EffectSlot`], the block adapter and the current
/// parameter binding. Nothing here is touched by the control side; it talks
/// to us through the [`EffectHostHandle`].
pub struct EffectHost {
    registry: Arc<EffectRegistry>,
    slot: EffectSlot,
    buffer: BlockBuffer,
    binding: ParameterBinding,
    sample_rate: f32,
    swap: Arc<SwapController>,
    controls: Arc<ControlBank>,
    info: Arc<ArcSwap<SlotInfo>>,
    faulted: Arc<AtomicBool>,
}

/// Control-side view of an [`EffectHost`].
#[derive(Clone)]
pub struct EffectHostHandle {
    registry: Arc<EffectRegistry>,
    swap: Arc<SwapController>,
    controls: Arc<ControlBank>,
    info: Arc<ArcSwap<SlotInfo>>,
    faulted: Arc<AtomicBool>,
}

impl EffectHost {
    pub fn new(
        registry: Arc<EffectRegistry>,
        initial_index: usize,
        sample_rate: f32,
    ) -> Result<(Self, EffectHostHandle), HostError> {
        let slot = EffectSlot::new(&registry, initial_index, sample_rate)?;
        let binding = ParameterBinding::new(slot.param_count());
        let snapshot = slot.snapshot();
        let controls = Arc::new(ControlBank::new());
        seed_knobs(&controls, &snapshot);

        let info = Arc::new(ArcSwap::from_pointee(snapshot));
        let swap = Arc::new(SwapController::new());
        let faulted = Arc::new(AtomicBool::new(false));
        info!("Effect host started with '{}'", slot.name());

        Ok((
            Self {
                registry: Arc::clone(&registry),
                slot,
                buffer: BlockBuffer::new(),
                binding,
                sample_rate,
                swap: Arc::clone(&swap),
                controls: Arc::clone(&controls),
                info: Arc::clone(&info),
                faulted: Arc::clone(&faulted),
            },
            EffectHostHandle {
                registry,
                swap,
                controls,
                info,
                faulted,
            },
        ))
    }

    /// Push one input frame and return one output frame.
    ///
    /// At a block boundary this claims any pending swap, forwards the bound
    /// controls and runs the active effect over the block. A rejected swap
    /// keeps the current effect running and is reported through the
    /// returned error; the block is processed regardless.
    pub fn process_frame(&mut self, left: f32, right: f32) -> Result<(f32, f32), HostError> {
        let mut swapped = Ok(None);

        if self.buffer.push_input(left, right) {
            swapped = self.apply_pending_swap();
            self.binding.apply(&self.controls, self.slot.unit_mut());

            let slot = &mut self.slot;
            self.buffer
                .process_block(|input, output| slot.process(input, output));
        }

        let frame = self.buffer.pop_output();
        swapped.map(|_| frame)
    }

    /// Run whole host buffers through [`process_frame`](Self::process_frame).
    ///
    /// All four slices must be the same length. On a configuration error the
    /// remaining frames are still processed and the first error is returned.
    pub fn process_buffers(
        &mut self,
        in_left: &[f32],
        in_right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> Result<(), HostError> {
        debug_assert_eq!(in_left.len(), in_right.len());
        debug_assert_eq!(in_left.len(), out_left.len());
        debug_assert_eq!(in_left.len(), out_right.len());

        let mut result = Ok(());
        let frames = in_left.iter().zip(in_right).zip(out_left.iter_mut().zip(out_right));
        for ((&l, &r), (ol, or)) in frames {
            match self.process_frame(l, r) {
                Ok((left, right)) => {
                    *ol = left;
                    *or = right;
                }
                Err(e) => {
                    *ol = 0.0;
                    *or = 0.0;
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }
        result
    }

    /// Claim a pending selection and, if there is one, replace the active
    /// slot with a freshly built unit.
    ///
    /// The new slot is fully built before the old one is released, and its
    /// metadata is published before the generation counter moves.
    pub fn apply_pending_swap(&mut self) -> Result<Option<usize>, HostError> {
        let Some(index) = self.swap.try_consume_swap() else {
            return Ok(None);
        };

        let slot = match EffectSlot::new(&self.registry, index, self.sample_rate) {
            Ok(slot) => slot,
            Err(e) => {
                error!("Rejected effect swap to #{index}: {e}");
                self.faulted.store(true, Ordering::Release);
                return Err(e);
            }
        };

        let info = slot.snapshot();
        self.binding = ParameterBinding::new(slot.param_count());
        self.slot = slot;
        self.info.store(Arc::new(info));
        let generation = self.swap.publish();

        debug!(
            "Swapped to effect #{index} '{}' (generation {generation})",
            self.slot.name()
        );
        Ok(Some(index))
    }

    pub fn slot(&self) -> &EffectSlot {
        &self.slot
    }

    pub const fn binding(&self) -> ParameterBinding {
        self.binding
    }
}

impl EffectHostHandle {
    /// Ask the audio thread to switch effects at its next block boundary.
    /// Replaces any request it has not picked up yet.
    pub fn request_swap(&self, index: usize) {
        debug!("Requested swap to effect #{index}");
        self.swap.request_swap(index);
    }

    pub fn request_swap_by_name(&self, name: &str) -> Result<usize, HostError> {
        let index = self
            .registry
            .find(name)
            .ok_or_else(|| HostError::UnknownEffect(name.to_string()))?;
        self.request_swap(index);
        Ok(index)
    }

    /// Changes every time a swap completes.
    pub fn generation(&self) -> u64 {
        self.swap.generation()
    }

    pub fn is_swap_pending(&self) -> bool {
        self.swap.is_pending()
    }

    /// Snapshot of the active slot's metadata.
    pub fn slot_info(&self) -> Arc<SlotInfo> {
        self.info.load_full()
    }

    /// Returns `false` if `index` is outside the control bank.
    pub fn set_knob(&self, index: usize, value: f32) -> bool {
        let Some(control) = self.controls.get(index) else {
            return false;
        };
        control.set_knob(value);
        true
    }

    pub fn set_cv(&self, index: usize, volts: f32) -> bool {
        let Some(control) = self.controls.get(index) else {
            return false;
        };
        control.set_cv(volts);
        true
    }

    pub fn knob(&self, index: usize) -> Option<f32> {
        self.controls.get(index).map(ControlInput::knob)
    }

    /// Move every visible knob back to the active effect's defaults.
    pub fn reset_knobs_to_defaults(&self) {
        seed_knobs(&self.controls, &self.slot_info());
    }

    /// Set once the audio thread has rejected a swap.
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }
}

fn seed_knobs(controls: &ControlBank, info: &SlotInfo) {
    for (control, &default) in controls.iter().zip(&info.defaults) {
        control.set_knob(default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::units::register_builtin;

    fn host(initial: usize) -> (EffectHost, EffectHostHandle) {
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry).unwrap();
        EffectHost::new(Arc::new(registry), initial, 48_000.0).unwrap()
    }

    fn run_block(host: &mut EffectHost) {
        for _ in 0..crate::host::BLOCK_SIZE {
            host.process_frame(0.0, 0.0).unwrap();
        }
    }

    #[test]
    fn test_new_seeds_knobs_from_defaults() {
        let (_host, handle) = host(1);
        assert_eq!(handle.knob(0), Some(0.0));
        assert_eq!(handle.knob(1), Some(1.0));
        assert_eq!(handle.generation(), 0);
    }

    #[test]
    fn test_swap_waits_for_block_boundary() {
        let (mut host, handle) = host(0);
        handle.request_swap(2);

        host.process_frame(0.0, 0.0).unwrap();
        assert_eq!(host.slot().name(), "Gain");
        assert!(handle.is_swap_pending());

        for _ in 1..crate::host::BLOCK_SIZE {
            host.process_frame(0.0, 0.0).unwrap();
        }
        assert_eq!(host.slot().name(), "Smooth");
        assert_eq!(handle.generation(), 1);
        assert_eq!(handle.slot_info().name, "Smooth");
    }

    #[test]
    fn test_rejected_swap_keeps_current_effect() {
        let (mut host, handle) = host(0);
        let count = handle.registry().count();
        handle.request_swap(count);

        let mut errors = Vec::new();
        for _ in 0..crate::host::BLOCK_SIZE {
            if let Err(e) = host.process_frame(0.1, 0.1) {
                errors.push(e);
            }
        }

        assert_eq!(errors, [HostError::OutOfRange { index: count, count }]);
        assert_eq!(host.slot().name(), "Gain");
        assert_eq!(handle.generation(), 0);
        assert!(handle.is_faulted());
        assert!(!handle.is_swap_pending());

        // The request was consumed; processing carries on.
        run_block(&mut host);
    }

    #[test]
    fn test_swap_by_name() {
        let (mut host, handle) = host(0);
        assert_eq!(handle.request_swap_by_name("balance"), Ok(3));
        assert_eq!(
            handle.request_swap_by_name("nope"),
            Err(HostError::UnknownEffect("nope".to_string()))
        );

        run_block(&mut host);
        assert_eq!(host.slot().name(), "Balance");
        assert_eq!(host.binding().active_count(), 2);
    }

    #[test]
    fn test_reset_knobs_to_defaults() {
        let (mut host, handle) = host(0);
        handle.set_knob(0, 0.9);
        handle.request_swap(1);
        run_block(&mut host);

        handle.reset_knobs_to_defaults();
        assert_eq!(handle.knob(0), Some(0.0));
        assert_eq!(handle.knob(1), Some(1.0));
    }

    #[test]
    fn test_knob_index_out_of_bank() {
        let (_host, handle) = host(0);
        assert!(!handle.set_knob(crate::host::MAX_PARAMS, 0.5));
        assert!(handle.set_cv(0, 1.0));
        assert_eq!(handle.knob(crate::host::MAX_PARAMS), None);
    }
}
