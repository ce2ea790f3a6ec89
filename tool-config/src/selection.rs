//! Tool selection supplied at startup.

use crate::error::ConfigResult;
use crate::schema::ToolTier;

/// Environment variable listing enabled tool names, comma separated.
pub const ENABLED_TOOLS_VAR: &str = "ENABLED_TOOLS";
/// Environment variable listing enabled services, comma separated.
pub const TOOL_SERVICES_VAR: &str = "TOOL_SERVICES";
/// Environment variable naming the tool tier.
pub const TOOL_TIER_VAR: &str = "TOOL_TIER";

/// Which tools the operator asked for. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolSelection {
    tools: Option<Vec<String>>,
    services: Option<Vec<String>>,
    tier: Option<ToolTier>,
}

impl ToolSelection {
    /// Reads the selection from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTier`](crate::ConfigError::UnknownTier)
    /// when `TOOL_TIER` is set to an unrecognised value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the selection through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTier`](crate::ConfigError::UnknownTier)
    /// when the tier variable holds an unrecognised value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tier = lookup(TOOL_TIER_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<ToolTier>())
            .transpose()?;

        Ok(Self {
            tools: lookup(ENABLED_TOOLS_VAR).as_deref().and_then(parse_list),
            services: lookup(TOOL_SERVICES_VAR).as_deref().and_then(parse_list),
            tier,
        })
    }

    /// Sets the explicit tool list.
    #[must_use]
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts tier resolution to the named services.
    #[must_use]
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = Some(services.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the tool tier.
    #[must_use]
    pub fn with_tier(mut self, tier: ToolTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_none() && self.services.is_none() && self.tier.is_none()
    }

    /// Returns `self` when it sets any field, `fallback` otherwise.
    ///
    /// Selections are never merged field by field: a tier from one source
    /// must not be overridden by a tool list from another.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        if self.is_empty() { fallback } else { self }
    }

    /// Returns the explicit tool list.
    #[must_use]
    pub fn tools(&self) -> Option<&[String]> {
        self.tools.as_deref()
    }

    /// Returns the selected services.
    #[must_use]
    pub fn services(&self) -> Option<&[String]> {
        self.services.as_deref()
    }

    /// Returns the selected tier.
    #[must_use]
    pub fn tier(&self) -> Option<ToolTier> {
        self.tier
    }
}

/// Splits a comma or whitespace separated list, dropping empty entries.
///
/// Returns `None` when nothing remains.
#[must_use]
pub fn parse_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect();
    (!items.is_empty()).then_some(items)
}
