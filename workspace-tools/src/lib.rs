//! Facade over the tool registration crates.
//!
//! The registry core is always available; configuration loading and tracing
//! setup sit behind the `config` and `telemetry` features.

#![warn(missing_docs, clippy::pedantic)]

/// Tool registration, enablement filtering, and failure containment.
pub use tool_registry as registry;

/// Startup tool selection (enabled by `config` feature).
#[cfg(feature = "config")]
pub use tool_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use tool_telemetry as telemetry;

pub use tool_registry::{
    BoundaryPolicy, FilterSummary, RegistrationInterceptor, Tool, ToolEnablement, ToolFailure,
    ToolHost, ToolMetadata, ToolOutcome, ToolRegistrar, ToolRegistry,
};
