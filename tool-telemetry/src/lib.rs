//! Observability utilities for tool hosts.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support {
    //! Structured tracing helpers.

    use thiserror::Error;
    use tracing_subscriber::EnvFilter;

    /// Directive used when `RUST_LOG` is unset.
    pub const DEFAULT_DIRECTIVE: &str = "info";

    /// Errors raised while installing the subscriber.
    #[derive(Debug, Error)]
    pub enum TelemetryError {
        /// The filter directive could not be parsed.
        #[error("invalid log filter `{directive}`: {reason}")]
        InvalidFilter {
            /// Directive that failed to parse.
            directive: String,
            /// Parser message.
            reason: String,
        },

        /// A global subscriber was already installed.
        #[error("tracing subscriber already initialised: {0}")]
        AlreadyInitialised(String),
    }

    /// Subscriber configuration.
    #[derive(Clone, Debug)]
    pub struct TelemetryConfig {
        directive: String,
        with_target: bool,
        respect_env: bool,
    }

    impl Default for TelemetryConfig {
        fn default() -> Self {
            Self {
                directive: DEFAULT_DIRECTIVE.to_owned(),
                with_target: false,
                respect_env: true,
            }
        }
    }

    impl TelemetryConfig {
        /// Sets the filter directive used when `RUST_LOG` is unset.
        #[must_use]
        pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
            self.directive = directive.into();
            self
        }

        /// Toggles printing the event target (module path).
        #[must_use]
        pub fn with_target(mut self, with_target: bool) -> Self {
            self.with_target = with_target;
            self
        }

        /// Ignores `RUST_LOG` and always uses the configured directive.
        #[must_use]
        pub fn ignore_env(mut self) -> Self {
            self.respect_env = false;
            self
        }

        /// Builds the filter this configuration describes.
        ///
        /// # Errors
        ///
        /// Returns [`TelemetryError::InvalidFilter`] when the directive is
        /// malformed.
        pub fn filter(&self) -> Result<EnvFilter, TelemetryError> {
            if self.respect_env {
                if let Ok(filter) = EnvFilter::try_from_default_env() {
                    return Ok(filter);
                }
            }
            EnvFilter::try_new(&self.directive).map_err(|err| TelemetryError::InvalidFilter {
                directive: self.directive.clone(),
                reason: err.to_string(),
            })
        }
    }

    /// Installs the global `fmt` subscriber.
    ///
    /// Logs go to stderr so that stdout stays free for tool output.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError`] when the filter is invalid or a subscriber
    /// is already installed.
    pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
        tracing_subscriber::fmt()
            .with_env_filter(config.filter()?)
            .with_target(config.with_target)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| TelemetryError::AlreadyInitialised(err.to_string()))
    }

}

pub use tracing_support::{TelemetryConfig, TelemetryError, init};
