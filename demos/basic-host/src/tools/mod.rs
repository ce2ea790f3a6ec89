//! Tool modules served by the demo host.

use tool_registry::{ToolRegistrar, ToolResult};

mod drive;
mod sheets;

/// Default tier lists for the tools in this binary.
pub const DEFAULT_SETTINGS: &str = include_str!("../../tool_tiers.yaml");

/// Registers every tool module with `registrar`.
pub fn register_all(registrar: &mut dyn ToolRegistrar) -> ToolResult<()> {
    drive::register(registrar)?;
    sheets::register(registrar)?;
    Ok(())
}
