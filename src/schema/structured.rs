//! Structured schema derivation through `schemars`.
//!
//! The callable's parameters are assembled into an ephemeral object model: one property
//! per declared parameter, the return annotation excluded. Each property's schema comes
//! from the provider, so record parameters expand into nested
//! `object`/`properties`/`required` trees.

use crate::config::SchemaConfig;
use crate::schema::structural::inline_generator;
use crate::schema::unstructured::SchemaBuilder;
use crate::types::{
    Callable, CallableDescriptor, DeclaredType, ParametersSchema, PrimitiveType, SchemaMode,
    SignatureError, ToolSchema,
};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Metadata, ObjectValidation, Schema, SchemaObject};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StructuredSchemaBuilder {
    config: SchemaConfig,
    fallback: SchemaBuilder,
}

impl StructuredSchemaBuilder {
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            fallback: SchemaBuilder::new(),
        }
    }

    /// Derive a schema, falling back to [`SchemaBuilder`] for callables without types.
    pub fn build(&self, callable: &dyn Callable) -> Result<ToolSchema, SignatureError> {
        let descriptor = callable.signature()?;
        Ok(self.build_descriptor(&descriptor))
    }

    pub fn build_descriptor(&self, descriptor: &CallableDescriptor) -> ToolSchema {
        debug!(
            callable = descriptor.name(),
            mode = ?descriptor.mode(),
            "deriving tool schema"
        );
        match descriptor.mode() {
            SchemaMode::Unstructured => self.fallback.build_descriptor(descriptor),
            SchemaMode::Structured => {
                let model = self.assemble_model(descriptor);
                into_tool_schema(descriptor, model, self.config.close_nested_objects)
            }
        }
    }

    /// Ephemeral object model mirroring the callable's parameters.
    fn assemble_model(&self, descriptor: &CallableDescriptor) -> SchemaObject {
        let mut gen = inline_generator();
        let mut object = ObjectValidation::default();

        for param in descriptor.params() {
            let schema = match &param.declared {
                Some(DeclaredType::Primitive(p)) => primitive_subschema(*p, &mut gen),
                Some(DeclaredType::Structural(s)) => s.subschema(&mut gen),
                Some(DeclaredType::Unresolved(annotation)) => {
                    debug!(
                        callable = descriptor.name(),
                        parameter = param.name.as_str(),
                        annotation = annotation.as_str(),
                        "unknown type annotation, encoding as string"
                    );
                    gen.subschema_for::<String>()
                }
                None => gen.subschema_for::<String>(),
            };

            let schema = match (&param.default, self.config.include_defaults) {
                (Some(default), true) => {
                    let mut obj = schema.into_object();
                    obj.metadata().default = Some(default.clone());
                    Schema::Object(obj)
                }
                _ => schema,
            };

            object.properties.insert(param.name.clone(), schema);
            if param.is_required() {
                object.required.insert(param.name.clone());
            }
        }

        if !self.config.additional_properties {
            object.additional_properties = Some(Box::new(Schema::Bool(false)));
        }

        SchemaObject {
            metadata: Some(Box::new(Metadata {
                title: Some(descriptor.name().to_string()),
                description: Some(descriptor.doc().unwrap_or_default().to_string()),
                ..Default::default()
            })),
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(object)),
            ..Default::default()
        }
    }
}

fn primitive_subschema(primitive: PrimitiveType, gen: &mut SchemaGenerator) -> Schema {
    match primitive {
        PrimitiveType::String => gen.subschema_for::<String>(),
        PrimitiveType::Integer => gen.subschema_for::<i64>(),
        PrimitiveType::Float => gen.subschema_for::<f64>(),
        PrimitiveType::Boolean => gen.subschema_for::<bool>(),
        PrimitiveType::Array => gen.subschema_for::<Vec<Value>>(),
        PrimitiveType::Object => gen.subschema_for::<Map<String, Value>>(),
        PrimitiveType::None => gen.subschema_for::<()>(),
    }
}

/// Hoist the model's description to the tool and keep its object keywords as parameters.
///
/// `required` follows declaration order; the provider emits it as a sorted set.
fn into_tool_schema(
    descriptor: &CallableDescriptor,
    model: SchemaObject,
    close: bool,
) -> ToolSchema {
    let mut map = match serde_json::to_value(model) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let description = match map.remove("description") {
        Some(Value::String(s)) => s,
        _ => String::new(),
    };
    map.remove("title");
    map.remove("type");
    map.remove("required");
    let mut properties = match map.remove("properties") {
        Some(Value::Object(p)) => p,
        _ => Map::new(),
    };
    for node in properties.values_mut() {
        normalize_object_schemas(node, close);
    }

    let mut parameters = ParametersSchema::new(properties, descriptor.required());
    parameters.extra = map;
    ToolSchema {
        name: descriptor.name().to_string(),
        description,
        parameters,
    }
}

/// Reorder every nested `required` list to match its sibling `properties`, and with
/// `close` set, add `additionalProperties: false` to object schemas that leave it open.
fn normalize_object_schemas(node: &mut Value, close: bool) {
    match node {
        Value::Object(map) => {
            let order: Option<Vec<String>> = match map.get("properties") {
                Some(Value::Object(p)) => Some(p.keys().cloned().collect()),
                _ => None,
            };
            if let Some(order) = order {
                if let Some(Value::Array(required)) = map.get_mut("required") {
                    required.sort_by_key(|name| {
                        name.as_str()
                            .and_then(|n| order.iter().position(|k| k == n))
                            .unwrap_or(usize::MAX)
                    });
                }
                if close && !map.contains_key("additionalProperties") {
                    map.insert("additionalProperties".to_string(), Value::Bool(false));
                }
            }

            for (key, child) in map.iter_mut() {
                match key.as_str() {
                    // Maps of name to schema.
                    "properties" | "patternProperties" | "definitions" => {
                        if let Value::Object(schemas) = child {
                            for schema in schemas.values_mut() {
                                normalize_object_schemas(schema, close);
                            }
                        }
                    }
                    // Instance data, not schemas.
                    "default" | "enum" | "const" | "examples" => {}
                    _ => normalize_object_schemas(child, close),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_object_schemas(item, close);
            }
        }
        _ => {}
    }
}
