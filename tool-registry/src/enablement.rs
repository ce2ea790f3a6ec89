//! Selection of the tools that stay active after registration.

use std::collections::BTreeSet;

/// Set of enabled tool names, or the open policy where every tool is enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolEnablement {
    enabled: Option<BTreeSet<String>>,
}

impl ToolEnablement {
    /// Creates the open policy: every tool is enabled.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Creates a closed policy enabling exactly the supplied names.
    #[must_use]
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Replaces the current selection. `None` restores the open policy.
    pub fn set_enabled(&mut self, names: Option<BTreeSet<String>>) {
        self.enabled = names;
    }

    /// Returns the enabled names, or `None` when every tool is enabled.
    #[must_use]
    pub fn enabled(&self) -> Option<&BTreeSet<String>> {
        self.enabled.as_ref()
    }

    /// Returns `true` when no closed selection has been configured.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.enabled.is_none()
    }

    /// Returns `true` when the named tool is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled
            .as_ref()
            .is_none_or(|enabled| enabled.contains(name))
    }
}

impl From<Option<BTreeSet<String>>> for ToolEnablement {
    fn from(enabled: Option<BTreeSet<String>>) -> Self {
        Self { enabled }
    }
}
