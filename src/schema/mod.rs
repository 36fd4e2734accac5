//! Tool schema derivation.
//!
//! Two mutually exclusive paths, chosen once per callable by its
//! [`SchemaMode`](crate::types::SchemaMode):
//!
//! - [`SchemaBuilder`]: primitive type map only (`string`, `integer`, `number`, `boolean`,
//!   `array`, `object`, `null`); used when no parameter declares a resolvable type.
//! - [`StructuredSchemaBuilder`]: delegates encoding to `schemars` and expands record
//!   parameters ([`StructuralType`]) into nested object schemas.
//!
//! Unknown or missing annotations never fail derivation: they are encoded as
//! [`FALLBACK_TYPE`].
//!
//! # Examples
//!
//! ```
//! use ai_lib_tools::schema::function_to_schema;
//! use ai_lib_tools::types::{CallableDescriptor, FunctionTool};
//! use serde_json::json;
//!
//! let send_email = FunctionTool::new(
//!     CallableDescriptor::builder("send_email")
//!         .arg("recipient")
//!         .arg("subject")
//!         .arg("body")
//!         .build()
//!         .unwrap(),
//!     |_| Ok(json!("Sent!")),
//! );
//!
//! let schema = function_to_schema(&send_email).unwrap();
//! assert_eq!(schema.parameters.properties["subject"], json!({"type": "string"}));
//! assert_eq!(schema.parameters.required, vec!["recipient", "subject", "body"]);
//! ```

pub mod structural;
pub mod structured;
pub mod unstructured;

pub use structural::{StructuralType, StructuredValue};
pub use structured::StructuredSchemaBuilder;
pub use unstructured::SchemaBuilder;

use crate::types::{Callable, SignatureError, ToolSchema};

/// JSON type used for parameters whose type is absent or unrecognized.
pub const FALLBACK_TYPE: &str = "string";

/// Derive a callable's schema with the default configuration.
pub fn function_to_schema(callable: &dyn Callable) -> Result<ToolSchema, SignatureError> {
    StructuredSchemaBuilder::default().build(callable)
}
