//! Unstructured schema derivation: a fixed primitive type map, no nested records.

use crate::schema::FALLBACK_TYPE;
use crate::types::{
    Callable, CallableDescriptor, DeclaredType, ParametersSchema, SignatureError, ToolSchema,
};
use serde_json::{json, Map};
use tracing::debug;

/// Derives a [`ToolSchema`] using only JSON type tags.
///
/// Absent or unresolved types are encoded as [`FALLBACK_TYPE`]; structural types degrade
/// to a bare `"object"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, callable: &dyn Callable) -> Result<ToolSchema, SignatureError> {
        let descriptor = callable.signature()?;
        Ok(self.build_descriptor(&descriptor))
    }

    pub fn build_descriptor(&self, descriptor: &CallableDescriptor) -> ToolSchema {
        let mut properties = Map::new();
        for param in descriptor.params() {
            let tag = match &param.declared {
                Some(DeclaredType::Primitive(p)) => p.json_type(),
                Some(DeclaredType::Structural(_)) => "object",
                Some(DeclaredType::Unresolved(annotation)) => {
                    debug!(
                        callable = descriptor.name(),
                        parameter = param.name.as_str(),
                        annotation = annotation.as_str(),
                        "unknown type annotation, encoding as {}",
                        FALLBACK_TYPE
                    );
                    FALLBACK_TYPE
                }
                None => FALLBACK_TYPE,
            };
            properties.insert(param.name.clone(), json!({ "type": tag }));
        }

        ToolSchema {
            name: descriptor.name().to_string(),
            description: descriptor.doc().unwrap_or_default().to_string(),
            parameters: ParametersSchema::new(properties, descriptor.required()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamDescriptor, PrimitiveType};

    #[test]
    fn test_untyped_parameters_default_to_string() {
        let d = CallableDescriptor::builder("send_email")
            .arg("recipient")
            .arg("subject")
            .param(ParamDescriptor::new("body").with_default(""))
            .build()
            .unwrap();

        let schema = SchemaBuilder::new().build_descriptor(&d);
        assert_eq!(schema.description, "");
        for name in ["recipient", "subject", "body"] {
            assert_eq!(schema.parameters.properties[name], json!({"type": "string"}));
        }
        assert_eq!(schema.parameters.required, vec!["recipient", "subject"]);
    }

    #[test]
    fn test_primitive_type_map() {
        let d = CallableDescriptor::builder("f")
            .doc("Does things.")
            .param(ParamDescriptor::new("s").typed(PrimitiveType::String))
            .param(ParamDescriptor::new("i").typed(PrimitiveType::Integer))
            .param(ParamDescriptor::new("n").typed(PrimitiveType::Float))
            .param(ParamDescriptor::new("b").typed(PrimitiveType::Boolean))
            .param(ParamDescriptor::new("a").typed(PrimitiveType::Array))
            .param(ParamDescriptor::new("o").typed(PrimitiveType::Object))
            .param(ParamDescriptor::new("z").typed(PrimitiveType::None))
            .param(ParamDescriptor::new("u").typed(DeclaredType::from_annotation("Decimal")))
            .build()
            .unwrap();

        let schema = SchemaBuilder::new().build_descriptor(&d);
        let tags: Vec<_> = schema
            .parameters
            .properties
            .values()
            .map(|v| v["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            tags,
            vec!["string", "integer", "number", "boolean", "array", "object", "null", "string"]
        );
        assert_eq!(schema.description, "Does things.");
    }
}
