//! Tool registration and failure containment for tool-calling hosts.
//!
//! Tool modules register their functions through a
//! [`RegistrationInterceptor`](interceptor::RegistrationInterceptor), which
//! tracks every name, wraps each tool in an
//! [`ExceptionBoundary`](boundary::ExceptionBoundary) and forwards the result to
//! the host. Once registration is complete the interceptor purges tools that
//! the [`ToolEnablement`](enablement::ToolEnablement) selection does not name.

#![warn(missing_docs, clippy::pedantic)]

pub mod boundary;
pub mod enablement;
pub mod failure;
pub mod interceptor;
pub mod registry;

pub use boundary::{BoundaryPolicy, ExceptionBoundary};
pub use enablement::ToolEnablement;
pub use failure::{ToolFailure, ToolOutcome};
pub use interceptor::{FilterSummary, RegistrationInterceptor};
pub use registry::{
    Tool, ToolError, ToolHost, ToolMetadata, ToolRegistrar, ToolRegistry, ToolResult,
};
