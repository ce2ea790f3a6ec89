//! Outermost wrapper that turns tool failures into display text.
//!
//! A tool-calling client must always receive a textual answer, so the
//! boundary absorbs every failure (returned or panicked) except the shutdown
//! signal and reports it as a message the calling agent can read.

use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::failure::{ToolFailure, ToolOutcome};
use crate::registry::Tool;

/// Prefixes that mark a failure message as already presentable.
///
/// The last entry is how `❌` reads after its UTF-8 bytes were decoded as
/// Windows-1252.
pub const DEFAULT_PASSTHROUGH_PREFIXES: [&str; 5] =
    ["**", "Error:", "API error", "\u{274c}", "\u{e2}\u{152}"];

/// Where operators should look for the full failure diagnostics.
pub const DEFAULT_LOG_HINT: &str = "the server logs";

/// Controls how the boundary renders absorbed failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryPolicy {
    passthrough_prefixes: Vec<String>,
    log_hint: String,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            passthrough_prefixes: DEFAULT_PASSTHROUGH_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect(),
            log_hint: DEFAULT_LOG_HINT.to_owned(),
        }
    }
}

impl BoundaryPolicy {
    /// Replaces the prefixes that mark a message as already presentable.
    #[must_use]
    pub fn with_passthrough_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passthrough_prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|prefix: &String| !prefix.is_empty())
            .collect();
        self
    }

    /// Sets the log location named in synthesized messages.
    #[must_use]
    pub fn with_log_hint(mut self, log_hint: impl Into<String>) -> Self {
        self.log_hint = log_hint.into();
        self
    }

    /// Returns the configured passthrough prefixes.
    #[must_use]
    pub fn passthrough_prefixes(&self) -> &[String] {
        &self.passthrough_prefixes
    }

    /// Returns the log location named in synthesized messages.
    #[must_use]
    pub fn log_hint(&self) -> &str {
        &self.log_hint
    }

    /// Returns `true` when the failure should reach the caller unchanged.
    #[must_use]
    pub fn is_presentable(&self, failure: &ToolFailure) -> bool {
        if failure.is_user_facing() {
            return true;
        }
        let message = failure.to_string();
        self.passthrough_prefixes
            .iter()
            .any(|prefix| message.starts_with(prefix.as_str()))
    }

    /// Renders an absorbed failure as the text returned to the caller.
    #[must_use]
    pub fn render(&self, tool: &str, failure: &ToolFailure) -> String {
        if self.is_presentable(failure) {
            return failure.to_string();
        }

        let mut message = format!("**Unexpected Error in {tool}**\n\n");
        message.push_str("An error occurred while executing this tool:\n\n");
        let _ = write!(message, "```\n{}: {failure}\n```\n\n", failure.kind());
        let _ = write!(
            message,
            "This error has been logged for investigation. \
             If this persists, please check {} for more details.",
            self.log_hint
        );
        message
    }
}

mod panic_site {
    //! Records where the current thread last panicked.

    use std::cell::RefCell;
    use std::panic;
    use std::sync::Once;

    thread_local! {
        static LAST: RefCell<Option<String>> = const { RefCell::new(None) };
    }

    static HOOK: Once = Once::new();

    /// Chains a panic hook in front of whatever hook is installed.
    pub(super) fn install() {
        HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if let Some(location) = info.location() {
                    let _ = LAST.try_with(|last| *last.borrow_mut() = Some(location.to_string()));
                }
                previous(info);
            }));
        });
    }

    /// Takes the location recorded by the most recent panic on this thread.
    pub(super) fn take() -> Option<String> {
        LAST.try_with(|last| last.borrow_mut().take()).ok().flatten()
    }
}

/// Tool wrapper that never lets a failure escape except the shutdown signal.
pub struct ExceptionBoundary {
    name: String,
    inner: Arc<dyn Tool>,
    policy: Arc<BoundaryPolicy>,
}

impl std::fmt::Debug for ExceptionBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionBoundary")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ExceptionBoundary {
    /// Wraps `inner`, reporting failures under the supplied tool name.
    #[must_use]
    pub fn wrap(
        name: impl Into<String>,
        inner: Arc<dyn Tool>,
        policy: Arc<BoundaryPolicy>,
    ) -> Self {
        panic_site::install();
        Self {
            name: name.into(),
            inner,
            policy,
        }
    }

    fn contain(&self, failure: &ToolFailure) -> String {
        let tool = self.name.as_str();
        error!(
            tool,
            kind = failure.kind(),
            message = %failure,
            "tool failed; returning error text to caller"
        );
        debug!(tool, diagnostic = ?failure, "full failure diagnostic");

        let text = self.policy.render(tool, failure);
        if self.policy.is_presentable(failure) {
            info!(tool, "returning pre-formatted error");
        } else {
            info!(tool, "returning synthesized error message");
        }
        text
    }
}

#[async_trait]
impl Tool for ExceptionBoundary {
    async fn invoke(&self, args: Value) -> ToolOutcome {
        debug!(tool = %self.name, "executing tool");
        let outcome = AssertUnwindSafe(self.inner.invoke(args))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(ToolFailure::from_panic(payload, panic_site::take()))
            });

        match outcome {
            Ok(text) => {
                debug!(tool = %self.name, "tool completed");
                Ok(text)
            }
            Err(failure) if failure.is_interrupt() => {
                info!(tool = %self.name, "shutdown requested during tool invocation");
                Err(failure)
            }
            Err(failure) => Ok(self.contain(&failure)),
        }
    }
}
