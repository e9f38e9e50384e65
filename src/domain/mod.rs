//! Domain layer: the typed vocabulary of channels, users and events.

pub mod channel;
pub mod events;
pub mod message;
pub mod user;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
