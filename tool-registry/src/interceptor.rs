//! Registration interceptor that instruments every tool a host receives.

use std::sync::Arc;

use tracing::{debug, info};

use crate::boundary::{BoundaryPolicy, ExceptionBoundary};
use crate::enablement::ToolEnablement;
use crate::registry::{Tool, ToolHost, ToolMetadata, ToolRegistrar, ToolResult};

/// Counts reported by [`RegistrationInterceptor::filter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Tools removed from the host dispatch table.
    pub removed: usize,
    /// Tools left in the host dispatch table.
    pub remaining: usize,
}

/// Sits between tool modules and a [`ToolHost`].
///
/// Every registration is recorded, wrapped in an [`ExceptionBoundary`] as the
/// outermost layer and forwarded to the host. After all modules have
/// registered, [`RegistrationInterceptor::filter`] purges the tools the
/// [`ToolEnablement`] does not name.
///
/// Registration takes `&mut self`: it happens once, sequentially, before the
/// host starts serving.
pub struct RegistrationInterceptor<H: ToolHost> {
    host: Arc<H>,
    enablement: ToolEnablement,
    policy: Arc<BoundaryPolicy>,
    tracked: Vec<String>,
}

impl<H: ToolHost> std::fmt::Debug for RegistrationInterceptor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInterceptor")
            .field("enablement", &self.enablement)
            .field("tracked", &self.tracked)
            .finish_non_exhaustive()
    }
}

impl<H: ToolHost> RegistrationInterceptor<H> {
    /// Attaches an interceptor to `host` with an empty tracked list.
    ///
    /// Install exactly one interceptor per host; a second one would wrap
    /// every tool twice.
    #[must_use]
    pub fn install(host: Arc<H>, enablement: ToolEnablement) -> Self {
        Self {
            host,
            enablement,
            policy: Arc::new(BoundaryPolicy::default()),
            tracked: Vec::new(),
        }
    }

    /// Sets the policy used by boundaries created from now on.
    #[must_use]
    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Returns the host this interceptor forwards to.
    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the enablement selection consulted by [`Self::filter`].
    #[must_use]
    pub fn enablement(&self) -> &ToolEnablement {
        &self.enablement
    }

    /// Returns the names registered so far, in registration order.
    #[must_use]
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Registers `tool` behind a failure boundary.
    ///
    /// # Errors
    ///
    /// Returns whatever error the host's own registration produces.
    pub fn register<T>(&mut self, metadata: ToolMetadata, tool: T) -> ToolResult<()>
    where
        T: Tool + 'static,
    {
        self.register_shared(metadata, Arc::new(tool))
    }

    /// Registers an already shared tool behind a failure boundary.
    ///
    /// # Errors
    ///
    /// Returns whatever error the host's own registration produces.
    pub fn register_shared(
        &mut self,
        metadata: ToolMetadata,
        tool: Arc<dyn Tool>,
    ) -> ToolResult<()> {
        let name = metadata.name().to_owned();
        self.tracked.push(name.clone());
        debug!(tool = %name, "registering tool with failure boundary");

        let bounded = ExceptionBoundary::wrap(name, tool, Arc::clone(&self.policy));
        self.host.register_handler(metadata, Arc::new(bounded))
    }

    /// Registers `tool` only when the enablement selection names it.
    ///
    /// Returns `Ok(false)` when the tool was skipped.
    ///
    /// # Errors
    ///
    /// Returns whatever error the host's own registration produces.
    pub fn register_if_enabled<T>(
        &mut self,
        metadata: ToolMetadata,
        tool: T,
    ) -> ToolResult<bool>
    where
        T: Tool + 'static,
    {
        if !self.enablement.is_enabled(metadata.name()) {
            debug!(tool = metadata.name(), "skipping tool registration");
            return Ok(false);
        }
        self.register(metadata, tool)?;
        Ok(true)
    }

    /// Removes disabled tools from the host dispatch table.
    ///
    /// Call once, after every module has registered. Does nothing under the
    /// open policy.
    pub fn filter(&self) -> FilterSummary {
        let Some(enabled) = self.enablement.enabled() else {
            return FilterSummary {
                removed: 0,
                remaining: self.host.tool_names().len(),
            };
        };

        let mut summary = FilterSummary::default();
        for name in self.host.tool_names() {
            if enabled.contains(&name) {
                summary.remaining += 1;
            } else if self.host.remove_tool(&name) {
                debug!(tool = %name, "removed disabled tool");
                summary.removed += 1;
            }
        }

        if summary.removed > 0 {
            info!(
                removed = summary.removed,
                enabled = enabled.len(),
                remaining = summary.remaining,
                "tool filtering removed disabled tools"
            );
        }
        summary
    }
}

impl<H: ToolHost> ToolRegistrar for RegistrationInterceptor<H> {
    fn add_tool(&mut self, metadata: ToolMetadata, tool: Arc<dyn Tool>) -> ToolResult<()> {
        self.register_shared(metadata, tool)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::failure::ToolFailure;
    use crate::registry::{ToolError, ToolRegistry};

    type Interceptor = RegistrationInterceptor<ToolRegistry>;

    fn setup(enablement: ToolEnablement) -> (Arc<ToolRegistry>, Interceptor) {
        let host = Arc::new(ToolRegistry::new());
        let interceptor = RegistrationInterceptor::install(Arc::clone(&host), enablement);
        (host, interceptor)
    }

    fn meta(name: &str) -> ToolMetadata {
        ToolMetadata::new(name).unwrap()
    }

    async fn ok_tool(_args: Value) -> Result<String, ToolFailure> {
        Ok("ok".to_owned())
    }

    #[test]
    fn tracks_registrations_in_order() {
        let (host, mut interceptor) = setup(ToolEnablement::open());
        assert!(interceptor.tracked().is_empty());

        interceptor.register(meta("list_spreadsheets"), ok_tool).unwrap();
        interceptor.register(meta("create_form"), ok_tool).unwrap();
        interceptor.register(meta("get_form"), ok_tool).unwrap();

        assert_eq!(
            interceptor.tracked(),
            ["list_spreadsheets", "create_form", "get_form"]
        );
        assert_eq!(host.len(), 3);
    }

    #[test]
    fn host_errors_are_forwarded() {
        let (_host, mut interceptor) = setup(ToolEnablement::open());
        interceptor.register(meta("get_form"), ok_tool).unwrap();

        let err = interceptor
            .register(meta("get_form"), ok_tool)
            .expect_err("duplicate should be rejected by the host");
        assert!(matches!(err, ToolError::DuplicateTool { name } if name == "get_form"));
    }

    #[test]
    fn register_if_enabled_skips_disabled_tools() {
        let (host, mut interceptor) = setup(ToolEnablement::only(["get_form"]));

        assert!(interceptor.register_if_enabled(meta("get_form"), ok_tool).unwrap());
        assert!(!interceptor.register_if_enabled(meta("create_form"), ok_tool).unwrap());

        assert_eq!(interceptor.tracked(), ["get_form"]);
        assert_eq!(host.tool_names(), ["get_form"]);
    }

    #[test]
    fn filter_removes_disabled_tools() {
        let (host, mut interceptor) = setup(ToolEnablement::only(["get_form"]));
        interceptor.register(meta("get_form"), ok_tool).unwrap();
        interceptor.register(meta("create_form"), ok_tool).unwrap();
        assert!(host.contains("create_form"));

        let summary = interceptor.filter();

        assert_eq!(summary, FilterSummary { removed: 1, remaining: 1 });
        assert!(!host.contains("create_form"));
        assert!(host.contains("get_form"));
    }

    #[test]
    fn filter_is_noop_under_open_policy() {
        let (host, mut interceptor) = setup(ToolEnablement::open());
        interceptor.register(meta("get_form"), ok_tool).unwrap();
        interceptor.register(meta("create_form"), ok_tool).unwrap();

        let summary = interceptor.filter();

        assert_eq!(summary, FilterSummary { removed: 0, remaining: 2 });
        assert_eq!(host.tool_names(), ["create_form", "get_form"]);
    }

    #[test]
    fn filter_before_registration_does_nothing() {
        let (host, interceptor) = setup(ToolEnablement::only(["get_form"]));
        assert_eq!(interceptor.filter(), FilterSummary::default());
        assert!(host.is_empty());
    }

    #[tokio::test]
    async fn registered_tools_are_bounded() {
        let (host, interceptor) = setup(ToolEnablement::open());
        let mut interceptor = interceptor
            .with_boundary_policy(BoundaryPolicy::default().with_log_hint("server.log"));
        interceptor
            .register(meta("read_sheet_values"), |_args: Value| async {
                Err::<String, _>(ToolFailure::msg("quota exceeded"))
            })
            .unwrap();

        let text = host.invoke("read_sheet_values", Value::Null).await.unwrap();
        assert!(text.contains("read_sheet_values"));
        assert!(text.contains("Error: quota exceeded"));
        assert!(text.contains("server.log"));
    }

    #[tokio::test]
    async fn modules_register_through_registrar_trait() {
        fn register_module(registrar: &mut dyn ToolRegistrar) -> ToolResult<()> {
            registrar.add_tool(meta("get_drive_image_url"), Arc::new(ok_tool))
        }

        let (host, mut interceptor) = setup(ToolEnablement::open());
        register_module(&mut interceptor).unwrap();

        assert_eq!(interceptor.tracked(), ["get_drive_image_url"]);
        let text = host.invoke("get_drive_image_url", Value::Null).await.unwrap();
        assert_eq!(text, "ok");
    }
}
