//! Core type definitions for exposing callables to the function-calling protocol.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Callable`] | Anything that reports a signature and can be invoked |
//! | [`CallableDescriptor`] | Name, doc and ordered parameters of a callable |
//! | [`FunctionTool`] | Closure-backed [`Callable`] |
//! | [`ToolSchema`] | Derived schema sent to the provider |
//! | [`ToolCall`] | Function/tool call from model response |
//! | [`Agent`] | Named bundle of instructions and callables |
//!
//! ## Example
//!
//! ```rust
//! use ai_lib_tools::types::{CallableDescriptor, ParamDescriptor, PrimitiveType};
//!
//! let descriptor = CallableDescriptor::builder("get_time")
//!     .doc("Current time in a timezone.")
//!     .param(ParamDescriptor::new("tz").typed(PrimitiveType::String))
//!     .param(ParamDescriptor::new("format").with_default("iso"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.required(), vec!["tz".to_string()]);
//! ```

pub mod agent;
pub mod callable;
pub mod tool;

pub use agent::Agent;
pub use callable::{
    Callable, CallableDescriptor, CallableDescriptorBuilder, DeclaredType, FunctionTool,
    ParamDescriptor, PrimitiveType, SchemaMode, SignatureError,
};
pub use tool::{ParametersSchema, ToolCall, ToolDefinition, ToolResult, ToolSchema};
