//! Weather agent walkthrough (no network).
//!
//! This demo shows:
//! - a record-typed callable taking the structured schema path
//! - an untyped callable taking the unstructured path
//! - a streamed tool call folded into an assistant message and dispatched
//!
//! Run:
//!   RUST_LOG=ai_lib_tools=debug cargo run --example weather_agent

use ai_lib_tools::schema::StructuralType;
use ai_lib_tools::types::{Agent, CallableDescriptor, FunctionTool, ParamDescriptor, PrimitiveType};
use ai_lib_tools::{
    DeltaMerger, DeltaState, Error, ErrorContext, ToolCallAssembler, ToolConfig, ToolRegistry,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Location {
    city: String,
    /// Country name. Must be in the local language of the city, e.g., Danmark for Lyngby.
    country: String,
}

fn get_weather() -> ai_lib_tools::Result<FunctionTool> {
    let descriptor = CallableDescriptor::builder("get_weather")
        .doc("Get the current weather in a given location.")
        .param(ParamDescriptor::new("location").typed(StructuralType::of::<Location>()))
        .param(
            ParamDescriptor::new("time")
                .typed(PrimitiveType::String)
                .with_default("now"),
        )
        .build()?;

    Ok(FunctionTool::new(descriptor, |args| {
        let location = args
            .structured::<Location>("location")
            .ok_or_else(|| {
                Error::runtime_with_context(
                    "location is required",
                    ErrorContext::new().with_field_path("location"),
                )
            })?;
        Ok(json!({
            "city": location.city,
            "country": location.country,
            "temperature": "65",
            "time": args.str("time").unwrap_or("now"),
        }))
    }))
}

fn send_email() -> ai_lib_tools::Result<FunctionTool> {
    let descriptor = CallableDescriptor::builder("send_email")
        .arg("recipient")
        .arg("subject")
        .arg("body")
        .build()?;

    Ok(FunctionTool::new(descriptor, |args| {
        println!("Sending email...");
        println!("To: {}", args.str("recipient").unwrap_or_default());
        println!("Subject: {}", args.str("subject").unwrap_or_default());
        println!("Body: {}", args.str("body").unwrap_or_default());
        Ok(json!("Sent!"))
    }))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ToolConfig::from_env()?;
    let agent = Agent::new("Weather Agent", "You are a helpful agent.")
        .with_function(get_weather()?)
        .with_function(send_email()?);

    let registry = ToolRegistry::for_agent(&agent, &config)?;

    println!("--- Tools ---");
    for definition in registry.definitions() {
        println!("{}", serde_json::to_string_pretty(&definition)?);
    }

    // choices[0].delta of each streamed chunk
    let deltas = vec![
        json!({"role": "assistant", "content": null, "tool_calls": [{"index": 0, "id": "call_1", "type": "function", "function": {"name": "get_weather", "arguments": ""}}]}),
        json!({"tool_calls": [{"index": 0, "function": {"arguments": "{\"location\": {\"city\": "}}]}),
        json!({"tool_calls": [{"index": 0, "function": {"arguments": "\"Lyngby\", \"country\": \"Danmark\"}}"}}]}),
        json!({}),
    ];

    let mut message = DeltaState::assistant_message(&agent.name, 1);
    DeltaMerger::new(&config.merge).merge_all(&mut message, &deltas)?;
    println!("\n--- Assembled message ---\n{}", serde_json::to_string_pretty(&message.to_value())?);

    for call in ToolCallAssembler::collect(&message) {
        let result = registry.execute(&call);
        println!("\n--- {} ({}) ---\n{}", call.name, call.id, result.content);
    }

    Ok(())
}
