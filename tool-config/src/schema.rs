//! Strongly typed tool settings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tool_registry::{BoundaryPolicy, ToolEnablement};
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::selection::ToolSelection;

/// Cumulative tool tier: each tier includes the tools of the tiers below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolTier {
    /// Essential tools only.
    Core,
    /// Core plus commonly used extras.
    Extended,
    /// Every tool the service offers.
    Complete,
}

impl ToolTier {
    /// Returns the lowercase tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Extended => "extended",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ToolTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "extended" => Ok(Self::Extended),
            "complete" => Ok(Self::Complete),
            _ => Err(ConfigError::UnknownTier(s.to_owned())),
        }
    }
}

/// Tool names a single service adds at each tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceTiers {
    #[serde(default)]
    core: Vec<String>,
    #[serde(default)]
    extended: Vec<String>,
    #[serde(default)]
    complete: Vec<String>,
}

impl ServiceTiers {
    /// Returns the tools added exactly at `tier`.
    #[must_use]
    pub fn at(&self, tier: ToolTier) -> &[String] {
        match tier {
            ToolTier::Core => &self.core,
            ToolTier::Extended => &self.extended,
            ToolTier::Complete => &self.complete,
        }
    }

    /// Returns every tool enabled when `tier` is selected.
    pub fn up_to(&self, tier: ToolTier) -> impl Iterator<Item = &String> {
        [ToolTier::Core, ToolTier::Extended, ToolTier::Complete]
            .into_iter()
            .filter(move |candidate| *candidate <= tier)
            .flat_map(move |candidate| self.at(candidate).iter())
    }
}

/// Settings for the failure boundary message format.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundarySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passthrough_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_hint: Option<String>,
}

impl BoundarySettings {
    /// Builds the boundary policy, keeping defaults for unset fields.
    #[must_use]
    pub fn to_policy(&self) -> BoundaryPolicy {
        let mut policy = BoundaryPolicy::default();
        if let Some(prefixes) = &self.passthrough_prefixes {
            policy = policy.with_passthrough_prefixes(prefixes.iter().cloned());
        }
        if let Some(log_hint) = &self.log_hint {
            policy = policy.with_log_hint(log_hint.clone());
        }
        policy
    }
}

/// Top-level tool settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSettings {
    #[serde(default)]
    services: BTreeMap<String, ServiceTiers>,
    #[serde(default)]
    boundary: BoundarySettings,
}

impl ToolSettings {
    /// Returns the configured service names.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns the tier lists for one service.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceTiers> {
        self.services.get(name)
    }

    /// Returns the boundary policy described by these settings.
    #[must_use]
    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary.to_policy()
    }

    /// Resolves a selection into the enablement handed to the interceptor.
    ///
    /// An explicit tool list wins. Otherwise a tier, optionally narrowed to
    /// some services, enables every tool up to that tier; services without a
    /// tier enable their complete lists. An empty selection keeps every tool
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownService`] when the selection names a
    /// service without tier lists.
    pub fn resolve(&self, selection: &ToolSelection) -> ConfigResult<ToolEnablement> {
        if let Some(tools) = selection.tools() {
            info!(count = tools.len(), "enabling explicitly listed tools");
            return Ok(ToolEnablement::only(tools.iter().cloned()));
        }

        if selection.tier().is_none() && selection.services().is_none() {
            info!("no tool selection configured; all tools enabled");
            return Ok(ToolEnablement::open());
        }

        let tier = selection.tier().unwrap_or(ToolTier::Complete);
        let services: Vec<(&str, &ServiceTiers)> = match selection.services() {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.services
                        .get(name)
                        .map(|tiers| (name.as_str(), tiers))
                        .ok_or_else(|| ConfigError::UnknownService { name: name.clone() })
                })
                .collect::<ConfigResult<_>>()?,
            None => self
                .services
                .iter()
                .map(|(name, tiers)| (name.as_str(), tiers))
                .collect(),
        };

        let enabled: BTreeSet<String> = services
            .iter()
            .flat_map(|(_, tiers)| tiers.up_to(tier).cloned())
            .collect();
        info!(
            tier = %tier,
            services = ?services.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            count = enabled.len(),
            "resolved tool tier selection"
        );
        Ok(ToolEnablement::from(Some(enabled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ToolSettings {
        crate::parse(
            r"
services:
  sheets:
    core: [read_sheet_values, modify_sheet_values]
    extended: [list_spreadsheets]
    complete: [deduplicate_rows_by_headers]
  forms:
    core: [create_form, get_form]
    complete: [set_publish_settings]
",
        )
        .expect("settings")
    }

    #[test]
    fn tiers_parse_case_insensitively() {
        assert_eq!("Core".parse::<ToolTier>().unwrap(), ToolTier::Core);
        assert_eq!(" complete ".parse::<ToolTier>().unwrap(), ToolTier::Complete);
        assert!(matches!(
            "gold".parse::<ToolTier>(),
            Err(ConfigError::UnknownTier(name)) if name == "gold"
        ));
    }

    #[test]
    fn tiers_are_cumulative() {
        let settings = settings();
        let sheets = settings.service("sheets").unwrap();
        let extended: Vec<_> = sheets.up_to(ToolTier::Extended).collect();
        assert_eq!(
            extended,
            ["read_sheet_values", "modify_sheet_values", "list_spreadsheets"]
        );
        assert_eq!(sheets.up_to(ToolTier::Complete).count(), 4);
        assert_eq!(sheets.at(ToolTier::Complete), ["deduplicate_rows_by_headers"]);
    }

    #[test]
    fn empty_selection_is_open() {
        let enablement = settings().resolve(&ToolSelection::default()).unwrap();
        assert!(enablement.is_open());
    }

    #[test]
    fn explicit_tools_win_over_tiers() {
        let selection = ToolSelection::default()
            .with_tools(["get_form"])
            .with_tier(ToolTier::Complete);
        let enablement = settings().resolve(&selection).unwrap();
        assert!(enablement.is_enabled("get_form"));
        assert!(!enablement.is_enabled("read_sheet_values"));
    }

    #[test]
    fn tier_spans_all_services() {
        let selection = ToolSelection::default().with_tier(ToolTier::Core);
        let enablement = settings().resolve(&selection).unwrap();
        let enabled = enablement.enabled().unwrap();
        assert_eq!(enabled.len(), 4);
        assert!(enablement.is_enabled("create_form"));
        assert!(!enablement.is_enabled("list_spreadsheets"));
    }

    #[test]
    fn command_line_tier_is_not_overridden_by_env_tools() {
        let cli = ToolSelection::default().with_tier(ToolTier::Core);
        let env = ToolSelection::default().with_tools(["get_form"]);

        let enablement = settings().resolve(&cli.or(env)).unwrap();
        assert!(enablement.is_enabled("read_sheet_values"));
        assert!(enablement.is_enabled("get_form"));
        assert!(!enablement.is_enabled("list_spreadsheets"));
        assert_eq!(enablement.enabled().unwrap().len(), 4);
    }

    #[test]
    fn services_without_tier_enable_complete_lists() {
        let selection = ToolSelection::default().with_services(["forms"]);
        let enablement = settings().resolve(&selection).unwrap();
        assert_eq!(enablement.enabled().unwrap().len(), 3);
        assert!(enablement.is_enabled("set_publish_settings"));
        assert!(!enablement.is_enabled("read_sheet_values"));
    }

    #[test]
    fn unknown_service_is_rejected() {
        let selection = ToolSelection::default().with_services(["gmail"]);
        let err = settings().resolve(&selection).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownService { name } if name == "gmail"));
    }

    #[test]
    fn boundary_settings_override_defaults() {
        let settings = crate::parse(
            r"
boundary:
  log_hint: mcp_server_debug.log
",
        )
        .unwrap();
        let policy = settings.boundary_policy();
        assert_eq!(policy.log_hint(), "mcp_server_debug.log");
        assert_eq!(
            policy.passthrough_prefixes(),
            BoundaryPolicy::default().passthrough_prefixes()
        );
    }
}
