//! Host-side registry for tool metadata and execution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::failure::{ToolFailure, ToolOutcome};

const MAX_NAME_LEN: usize = 64;

/// Result alias for registration and dispatch operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Metadata describing a registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolMetadata {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service: Option<String>,
}

impl ToolMetadata {
    /// Creates metadata for the supplied tool name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidMetadata`] if the name is empty, too long,
    /// or contains characters other than lowercase alphanumerics, `_`, `-`
    /// and `.`.
    pub fn new(name: impl Into<String>) -> ToolResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            description: None,
            service: None,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tags the tool with the service it belongs to, e.g. `drive`.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional service tag.
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }
}

fn validate_name(name: &str) -> ToolResult<()> {
    if name.trim().is_empty() {
        return Err(ToolError::InvalidMetadata {
            reason: "tool name cannot be empty".into(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ToolError::InvalidMetadata {
            reason: format!("tool name length must be <= {MAX_NAME_LEN}"),
        });
    }

    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | '.'))
    {
        return Err(ToolError::InvalidMetadata {
            reason: format!(
                "tool name `{name}` must contain lowercase alphanumeric, dash, underscore, or dot"
            ),
        });
    }

    Ok(())
}

/// Trait implemented by tool executors.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool with a JSON object of named arguments.
    async fn invoke(&self, args: Value) -> ToolOutcome;
}

#[async_trait]
impl<F, Fut> Tool for F
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ToolOutcome> + Send,
{
    async fn invoke(&self, args: Value) -> ToolOutcome {
        (self)(args).await
    }
}

/// Registration and dispatch-table surface a host exposes to the core.
///
/// Implementors own the dispatch table; the core only adds entries through
/// [`ToolHost::register_handler`] and purges them through
/// [`ToolHost::remove_tool`].
pub trait ToolHost: Send + Sync {
    /// Adds a handler to the dispatch table.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the host rejects the registration.
    fn register_handler(&self, metadata: ToolMetadata, tool: Arc<dyn Tool>) -> ToolResult<()>;

    /// Returns the names currently present in the dispatch table.
    fn tool_names(&self) -> Vec<String>;

    /// Removes a tool from the dispatch table, returning whether it existed.
    fn remove_tool(&self, name: &str) -> bool;
}

/// Registration surface used by tool modules.
pub trait ToolRegistrar {
    /// Registers a tool under the name carried by its metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the registration is rejected.
    fn add_tool(&mut self, metadata: ToolMetadata, tool: Arc<dyn Tool>) -> ToolResult<()>;
}

struct Entry {
    metadata: ToolMetadata,
    tool: Arc<dyn Tool>,
}

/// In-memory [`ToolHost`] keyed by tool name.
#[derive(Default)]
pub struct ToolRegistry {
    table: RwLock<HashMap<String, Entry>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tool` to the dispatch table without any wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is taken.
    pub fn register_tool<T>(&self, metadata: ToolMetadata, tool: T) -> ToolResult<()>
    where
        T: Tool + 'static,
    {
        self.register_handler(metadata, Arc::new(tool))
    }

    /// Returns `true` when `name` is in the dispatch table.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table
            .read()
            .is_ok_and(|table| table.contains_key(name))
    }

    /// Dispatches a call to the named tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for names not in the table and
    /// [`ToolError::Failed`] for failures the tool lets escape.
    pub async fn invoke(&self, name: &str, args: Value) -> ToolResult<String> {
        let tool = self
            .table
            .read()
            .ok()
            .and_then(|table| table.get(name).map(|entry| Arc::clone(&entry.tool)))
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_owned(),
            })?;
        Ok(tool.invoke(args).await?)
    }

    /// Metadata of every tool in the table, sorted by name.
    ///
    /// # Panics
    ///
    /// Panics if the table lock is poisoned.
    #[must_use]
    pub fn list(&self) -> Vec<ToolMetadata> {
        let table = self.table.read().expect("tool registry poisoned");
        let mut tools: Vec<ToolMetadata> =
            table.values().map(|entry| entry.metadata.clone()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Number of tools in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().map_or(0, |table| table.len())
    }

    /// Returns `true` when the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ToolHost for ToolRegistry {
    fn register_handler(&self, metadata: ToolMetadata, tool: Arc<dyn Tool>) -> ToolResult<()> {
        let mut table = self.table.write().expect("tool registry poisoned");
        if table.contains_key(metadata.name()) {
            return Err(ToolError::DuplicateTool {
                name: metadata.name().to_owned(),
            });
        }
        table.insert(metadata.name().to_owned(), Entry { metadata, tool });
        Ok(())
    }

    fn tool_names(&self) -> Vec<String> {
        let table = self.table.read().expect("tool registry poisoned");
        let mut names: Vec<String> = table.keys().cloned().collect();
        names.sort();
        names
    }

    fn remove_tool(&self, name: &str) -> bool {
        self.table
            .write()
            .expect("tool registry poisoned")
            .remove(name)
            .is_some()
    }
}

impl ToolRegistrar for ToolRegistry {
    fn add_tool(&mut self, metadata: ToolMetadata, tool: Arc<dyn Tool>) -> ToolResult<()> {
        self.register_handler(metadata, tool)
    }
}

/// Registration and dispatch errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool name failed validation.
    #[error("invalid tool metadata: {reason}")]
    InvalidMetadata {
        /// Why the name was rejected.
        reason: String,
    },

    /// A tool with this name is already in the table.
    #[error("duplicate tool name `{name}`")]
    DuplicateTool {
        /// Colliding name.
        name: String,
    },

    /// No tool with this name is in the table.
    #[error("no tool named `{name}`")]
    UnknownTool {
        /// Requested name.
        name: String,
    },

    /// The tool returned a failure that was not contained.
    #[error("tool failed: {0}")]
    Failed(#[from] ToolFailure),
}
