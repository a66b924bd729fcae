pub mod jack;
pub mod manager;
pub mod ports;

/// JACK client name; port names are prefixed with it.
pub const CLIENT_NAME: &str = "fxslot";
