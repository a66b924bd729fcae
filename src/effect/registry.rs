use log::debug;

use crate::effect::EffectUnit;
use crate::host::{HostError, MAX_PARAMS};

pub type EffectFactory = Box<dyn Fn() -> Box<dyn EffectUnit> + Send + Sync>;

/// One selectable effect: its display name, how many knobs it uses and how
/// to build a fresh instance.
pub struct RegistryEntry {
    name: String,
    param_count: usize,
    factory: EffectFactory,
}

impl RegistryEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn create(&self) -> Box<dyn EffectUnit> {
        (self.factory)()
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("param_count", &self.param_count)
            .finish_non_exhaustive()
    }
}

/// Append-only catalog of effects, addressed by insertion index.
///
/// The registry is filled during startup and then shared behind an `Arc`,
/// which makes it immutable for the rest of the process. Indices handed out
/// by [`EffectRegistry::register`] therefore never move.
#[derive(Default, Debug)]
pub struct EffectRegistry {
    entries: Vec<RegistryEntry>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        param_count: usize,
        factory: F,
    ) -> Result<usize, HostError>
    where
        F: Fn() -> Box<dyn EffectUnit> + Send + Sync + 'static,
    {
        let name = name.into();
        if param_count > MAX_PARAMS {
            return Err(HostError::TooManyParameters {
                name,
                count: param_count,
                max: MAX_PARAMS,
            });
        }

        let index = self.entries.len();
        debug!("Registered effect #{index} '{name}' ({param_count} params)");
        self.entries.push(RegistryEntry {
            name,
            param_count,
            factory: Box::new(factory),
        });

        Ok(index)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&RegistryEntry, HostError> {
        self.entries.get(index).ok_or(HostError::OutOfRange {
            index,
            count: self.entries.len(),
        })
    }

    /// Case-insensitive lookup by display name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }
}
