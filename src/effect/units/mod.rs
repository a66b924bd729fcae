pub mod balance;
pub mod c5_raw_channel;
pub mod digital_black;
pub mod gain;
pub mod smooth;

use crate::effect::{EffectRegistry, EffectUnit};
use crate::host::HostError;

struct Builtin {
    name: &'static str,
    param_count: usize,
    create: fn() -> Box<dyn EffectUnit>,
}

// Positional order is user-facing: program changes and CLI indices refer to it.
const BUILTIN: &[Builtin] = &[
    Builtin {
        name: "Gain",
        param_count: gain::PARAM_COUNT,
        create: gain::Gain::create,
    },
    Builtin {
        name: "DigitalBlack",
        param_count: digital_black::PARAM_COUNT,
        create: digital_black::DigitalBlack::create,
    },
    Builtin {
        name: "Smooth",
        param_count: smooth::PARAM_COUNT,
        create: smooth::Smooth::create,
    },
    Builtin {
        name: "Balance",
        param_count: balance::PARAM_COUNT,
        create: balance::Balance::create,
    },
    Builtin {
        name: "C5RawChannel",
        param_count: c5_raw_channel::PARAM_COUNT,
        create: c5_raw_channel::C5RawChannel::create,
    },
];

/// Register every built-in effect, in their fixed order.
pub fn register_builtin(registry: &mut EffectRegistry) -> Result<(), HostError> {
    for builtin in BUILTIN {
        registry.register(builtin.name, builtin.param_count, builtin.create)?;
    }
    Ok(())
}
