//! Configuration management for tool hosts.
//!
//! Settings describe which tools each service offers at each [`ToolTier`];
//! a [`ToolSelection`] taken from the environment or command line picks from
//! them. [`ToolSettings::resolve`] turns both into the
//! [`ToolEnablement`](tool_registry::ToolEnablement) handed to the
//! registration interceptor.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;
pub mod selection;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, parse};
pub use schema::{BoundarySettings, ServiceTiers, ToolSettings, ToolTier};
pub use selection::ToolSelection;
