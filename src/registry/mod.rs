//! Tool registry: derives schemas once at registration and dispatches tool calls.
//!
//! Schemas and descriptors are computed when a callable is registered and kept
//! read-only afterwards, keyed by callable name. Dispatch coerces the raw arguments
//! against the cached descriptor and invokes the callable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::coerce::ArgumentCoercer;
use crate::config::ToolConfig;
use crate::schema::StructuredSchemaBuilder;
use crate::types::{Agent, Callable, CallableDescriptor, ToolCall, ToolDefinition, ToolResult, ToolSchema};
use crate::{Error, ErrorContext, Result};

struct Entry {
    callable: Arc<dyn Callable>,
    descriptor: CallableDescriptor,
    schema: Arc<ToolSchema>,
}

pub struct ToolRegistry {
    builder: StructuredSchemaBuilder,
    entries: HashMap<String, Entry>,
    /// Registration order, used for `definitions()`.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            builder: StructuredSchemaBuilder::new(config.schema.clone()),
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry holding every callable of an agent.
    pub fn for_agent(agent: &Agent, config: &ToolConfig) -> Result<Self> {
        let mut registry = Self::new(config);
        for function in &agent.functions {
            registry.register(Arc::clone(function))?;
        }
        Ok(registry)
    }

    /// Derive and cache the callable's schema.
    ///
    /// A [`SignatureError`](crate::types::SignatureError) is fatal for this callable;
    /// registering two callables under one name is a configuration error.
    pub fn register(&mut self, callable: Arc<dyn Callable>) -> Result<Arc<ToolSchema>> {
        let descriptor = callable.signature()?;
        let name = descriptor.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(Error::configuration_with_context(
                format!("Tool '{}' is already registered", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_source("tool_registry"),
            ));
        }

        let schema = Arc::new(self.builder.build_descriptor(&descriptor));
        debug!(
            tool = name.as_str(),
            mode = ?descriptor.mode(),
            parameters = descriptor.params().len(),
            "registered tool"
        );
        self.order.push(name.clone());
        self.entries.insert(
            name,
            Entry {
                callable,
                descriptor,
                schema: Arc::clone(&schema),
            },
        );
        Ok(schema)
    }

    pub fn schema(&self, name: &str) -> Option<Arc<ToolSchema>> {
        self.entries.get(name).map(|e| Arc::clone(&e.schema))
    }

    /// Tool entries for a request, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|e| e.schema.to_definition())
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coerce `raw` against the tool's signature and invoke it.
    pub fn call(&self, name: &str, raw: &Map<String, Value>) -> Result<Value> {
        let entry = self.entries.get(name).ok_or_else(|| Error::UnknownTool {
            name: name.to_string(),
        })?;
        let args = ArgumentCoercer::coerce_descriptor(&entry.descriptor, raw)?;
        entry.callable.call(&args)
    }

    /// Like [`call`](Self::call), for an arguments payload that must be a JSON object.
    pub fn call_value(&self, name: &str, arguments: &Value) -> Result<Value> {
        match arguments {
            Value::Object(raw) => self.call(name, raw),
            Value::Null => self.call(name, &Map::new()),
            other => Err(Error::validation_with_context(
                "Tool arguments must be a JSON object",
                ErrorContext::new()
                    .with_field_path(format!("{}.arguments", name))
                    .with_details(truncate(&other.to_string(), 200))
                    .with_source("tool_registry"),
            )),
        }
    }

    /// Dispatch a tool call; every failure is reported as an error result.
    pub fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.call_value(&call.name, &call.arguments) {
            Ok(content) => ToolResult::success(call.id.clone(), content),
            Err(e) => {
                warn!(tool = call.name.as_str(), id = call.id.as_str(), error = %e, "tool call failed");
                ToolResult::failure(call.id.clone(), e.to_string())
            }
        }
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish_non_exhaustive()
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &s[..i]),
        None => s.to_string(),
    }
}
