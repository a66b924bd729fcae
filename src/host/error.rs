use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("effect registry is empty")]
    EmptyRegistry,

    #[error("effect index {index} is out of range (registry holds {count})")]
    OutOfRange { index: usize, count: usize },

    #[error("effect '{name}' declares {count} parameters, at most {max} are supported")]
    TooManyParameters {
        name: String,
        count: usize,
        max: usize,
    },

    #[error("no effect named '{0}'")]
    UnknownEffect(String),
}

impl HostError {
    /// Errors that point at a registry/caller mismatch rather than user input.
    /// These abort construction or a swap and are never retried.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyRegistry | Self::OutOfRange { .. } | Self::TooManyParameters { .. }
        )
    }
}
