//! # ai-lib-tools
//!
//! Function-calling plumbing for AI-Protocol agents: derive JSON schemas from
//! callables, validate and coerce model-supplied arguments, and fold streamed
//! response deltas into a complete message.
//!
//! ## Overview
//!
//! A model that supports tool use needs three things from the host. It needs a
//! schema for every tool it may call. Its arguments have to be checked against that
//! schema before the tool runs. And when it streams, the host must reassemble the
//! fragmented message (content, tool call ids, argument JSON) before dispatching.
//!
//! ## Key Features
//!
//! - **Schema derivation**: [`SchemaBuilder`] for untyped signatures,
//!   [`StructuredSchemaBuilder`] for signatures carrying record types
//! - **Argument coercion**: [`ArgumentCoercer`] validates record-typed arguments and
//!   decodes them into their Rust types
//! - **Delta merging**: [`DeltaMerger`] folds streamed deltas into a [`DeltaState`]
//! - **Dispatch**: [`ToolRegistry`] caches schemas and turns tool calls into results
//!
//! ## Quick Start
//!
//! ```rust
//! use ai_lib_tools::{
//!     types::{CallableDescriptor, FunctionTool},
//!     ToolConfig, ToolRegistry,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let echo = FunctionTool::new(
//!     CallableDescriptor::builder("echo").arg("text").build().unwrap(),
//!     |args| Ok(json!(args.str("text").unwrap_or_default())),
//! );
//!
//! let mut registry = ToolRegistry::new(&ToolConfig::default());
//! registry.register(Arc::new(echo)).unwrap();
//!
//! let out = registry.call("echo", json!({"text": "hi"}).as_object().unwrap()).unwrap();
//! assert_eq!(out, json!("hi"));
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Callables, descriptors and tool wire types |
//! | [`schema`] | Schema derivation for unstructured and structured signatures |
//! | [`coerce`] | Argument validation and decoding |
//! | [`pipeline`] | Streamed delta accumulation |
//! | [`registry`] | Schema cache and tool dispatch |
//! | [`config`] | Schema and merge options |

pub mod coerce;
pub mod config;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use coerce::{ArgValue, ArgumentCoercer, CoercedArgs, ValidationError};
pub use config::{MergeConfig, SchemaConfig, ToolConfig};
pub use pipeline::{merge_chunk, DeltaMerger, DeltaState, MergeError};
pub use registry::ToolRegistry;
pub use schema::{function_to_schema, SchemaBuilder, StructuralType, StructuredSchemaBuilder};
pub use types::{Agent, Callable, CallableDescriptor, FunctionTool, ToolCall, ToolSchema};
pub use utils::ToolCallAssembler;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
