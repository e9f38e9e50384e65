//! Use case layer: the gateway over a Slack transport and its workflows.

pub mod bootstrap;
pub mod context;
pub mod contracts;
pub mod decode;
pub mod describe_event;
pub mod envelope;
pub mod error;
pub mod event_stream;
pub mod gateway;
pub mod reference_cache;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
