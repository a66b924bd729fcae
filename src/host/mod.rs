pub mod block;
pub mod engine;
pub mod error;
pub mod params;
pub mod slot;
pub mod swap;
pub mod watcher;

pub use block::BlockBuffer;
pub use engine::{EffectHost, EffectHostHandle};
pub use error::HostError;
pub use params::{ControlBank, ControlInput, ParameterBinding};
pub use slot::{EffectSlot, SlotInfo};
pub use swap::SwapController;
pub use watcher::DisplayWatcher;

/// Number of knob/CV pairs exposed to the control surface.
pub const MAX_PARAMS: usize = 14;

/// Frames accumulated before an effect block is processed.
pub const BLOCK_SIZE: usize = 4;

/// Scale applied to a control voltage before it is added to its knob, so
/// that 10 V is one full knob turn.
pub const CV_SCALE: f32 = 0.1;
