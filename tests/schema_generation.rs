use ai_lib_tools::schema::{function_to_schema, SchemaBuilder, StructuralType, StructuredSchemaBuilder};
use ai_lib_tools::types::{
    CallableDescriptor, DeclaredType, FunctionTool, ParamDescriptor, PrimitiveType, SchemaMode,
};
use ai_lib_tools::SchemaConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Location {
    city: String,
    country: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Trip {
    origin: Location,
    destination: Location,
    nights: u32,
}

fn tool(descriptor: CallableDescriptor) -> FunctionTool {
    FunctionTool::new(descriptor, |_| Ok(serde_json::Value::Null))
}

#[test]
fn test_untyped_callable_required_excludes_defaults() {
    let send_email = tool(
        CallableDescriptor::builder("send_email")
            .arg("recipient")
            .arg("subject")
            .param(ParamDescriptor::new("body").with_default("(no body)"))
            .param(ParamDescriptor::new("cc").with_default(json!([])))
            .build()
            .unwrap(),
    );

    let schema = function_to_schema(&send_email).unwrap();
    assert_eq!(schema.parameters.required, vec!["recipient", "subject"]);
    assert_eq!(schema.parameters.properties.len(), 4);
    for (_, node) in &schema.parameters.properties {
        assert_eq!(node, &json!({"type": "string"}));
    }
}

#[test]
fn test_unknown_annotation_encoded_as_string() {
    let ty = DeclaredType::from_annotation("datetime.datetime");
    assert!(!ty.is_resolvable());

    let d = CallableDescriptor::builder("schedule")
        .param(ParamDescriptor::new("at").typed(ty))
        .build()
        .unwrap();
    assert_eq!(d.mode(), SchemaMode::Unstructured);

    let schema = SchemaBuilder::new().build_descriptor(&d);
    assert_eq!(schema.parameters.properties["at"], json!({"type": "string"}));
}

#[test]
fn test_wire_format() {
    let d = CallableDescriptor::builder("get_time")
        .doc("Current time.")
        .param(ParamDescriptor::new("tz").typed(PrimitiveType::String))
        .build()
        .unwrap();

    let def = SchemaBuilder::new().build_descriptor(&d).to_definition();
    let wire = serde_json::to_value(&def).unwrap();
    assert_eq!(
        wire,
        json!({
            "type": "function",
            "function": {
                "name": "get_time",
                "description": "Current time.",
                "parameters": {
                    "type": "object",
                    "properties": {"tz": {"type": "string"}},
                    "required": ["tz"]
                }
            }
        })
    );
}

#[test]
fn test_location_record_expands_on_structured_path() {
    let d = CallableDescriptor::builder("get_weather")
        .param(ParamDescriptor::new("location").typed(StructuralType::of::<Location>()))
        .build()
        .unwrap();
    assert_eq!(d.mode(), SchemaMode::Structured);

    let schema = StructuredSchemaBuilder::default().build_descriptor(&d);
    let location = &schema.parameters.properties["location"];
    assert_eq!(
        location["properties"],
        json!({"city": {"type": "string"}, "country": {"type": "string"}})
    );
    assert_eq!(location["required"], json!(["city", "country"]));

    // The unstructured path collapses the same record to a bare tag.
    let flat = SchemaBuilder::new().build_descriptor(&d);
    assert_eq!(flat.parameters.properties["location"], json!({"type": "object"}));
}

#[test]
fn test_nested_records_are_inlined() {
    let d = CallableDescriptor::builder("book_trip")
        .param(ParamDescriptor::new("trip").typed(StructuralType::of::<Trip>()))
        .build()
        .unwrap();

    let schema = StructuredSchemaBuilder::default().build_descriptor(&d);
    let wire = serde_json::to_string(&schema.to_json()).unwrap();
    assert!(!wire.contains("$ref"));
    assert!(!wire.contains("definitions"));

    let trip = &schema.parameters.properties["trip"];
    assert_eq!(trip["required"], json!(["origin", "destination", "nights"]));
    assert_eq!(trip["properties"]["origin"]["required"], json!(["city", "country"]));
    assert_eq!(trip["properties"]["nights"]["type"], "integer");
}

#[test]
fn test_structured_path_encodes_every_parameter() {
    let d = CallableDescriptor::builder("mixed")
        .param(ParamDescriptor::new("count").typed(PrimitiveType::Integer))
        .arg("note")
        .param(ParamDescriptor::new("tag").typed(DeclaredType::from_annotation("Tag")))
        .build()
        .unwrap();

    let schema = StructuredSchemaBuilder::new(SchemaConfig::default()).build_descriptor(&d);
    assert_eq!(schema.parameters.required, vec!["count", "note", "tag"]);
    assert_eq!(schema.parameters.properties["count"]["type"], "integer");
    assert_eq!(schema.parameters.properties["note"], json!({"type": "string"}));
    assert_eq!(schema.parameters.properties["tag"], json!({"type": "string"}));
}

#[test]
fn test_derivation_is_idempotent() {
    let d = CallableDescriptor::builder("get_weather")
        .param(ParamDescriptor::new("location").typed(StructuralType::of::<Location>()))
        .param(ParamDescriptor::new("time").with_default("now"))
        .build()
        .unwrap();

    let builder = StructuredSchemaBuilder::default();
    assert_eq!(builder.build_descriptor(&d), builder.build_descriptor(&d));
}
