use ai_lib_tools::pipeline::tool_call_slot;
use ai_lib_tools::{DeltaMerger, DeltaState, MergeConfig, MergeError, ToolCallAssembler};
use serde_json::{json, Value};

/// Payloads of `data:` frames from a streamed chat completion with two parallel tool calls.
const SSE_FRAMES: &[&str] = &[
    r#"{"choices":[{"index":0,"delta":{"role":"assistant","content":null,"tool_calls":[{"index":0,"id":"call_w","type":"function","function":{"name":"get_weather","arguments":""}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"location\":"}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"city\":\"Lyngby\",\"country\":\"Danmark\"}}"}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":1,"id":"call_e","type":"function","function":{"name":"send_email","arguments":""}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":1,"function":{"arguments":"{\"recipient\":\"a@b.dk\"}"}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
];

fn deltas() -> Vec<Value> {
    SSE_FRAMES
        .iter()
        .map(|frame| {
            let chunk: Value = serde_json::from_str(frame).unwrap();
            chunk["choices"][0]["delta"].clone()
        })
        .collect()
}

#[test]
fn test_content_fragments_concatenate() {
    let mut acc = DeltaState::from_skeleton(&json!({"content": ""})).unwrap();
    let merger = DeltaMerger::default();
    merger.merge(&mut acc, &json!({"content": "He"})).unwrap();
    merger.merge(&mut acc, &json!({"content": "llo"})).unwrap();
    assert_eq!(acc.to_value(), json!({"content": "Hello"}));
}

#[test]
fn test_stream_reassembles_parallel_calls() {
    let mut acc = DeltaState::assistant_message("Weather Agent", 2);
    DeltaMerger::default().merge_all(&mut acc, &deltas()).unwrap();

    let calls = ToolCallAssembler::collect(&acc);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].id, "call_w");
    assert_eq!(
        calls[0].arguments,
        json!({"location": {"city": "Lyngby", "country": "Danmark"}})
    );
    assert_eq!(calls[1].name, "send_email");
    assert_eq!(calls[1].arguments, json!({"recipient": "a@b.dk"}));

    // role was resent on the first frame only, but is never appended either way.
    assert_eq!(acc.get("role").and_then(DeltaState::as_str), Some("assistant"));
}

#[test]
fn test_unused_slots_are_not_collected() {
    let mut acc = DeltaState::assistant_message("Weather Agent", 4);
    DeltaMerger::default().merge_all(&mut acc, &deltas()).unwrap();
    assert_eq!(ToolCallAssembler::collect(&acc).len(), 2);
}

#[test]
fn test_unallocated_slot_fails_fast() {
    let mut acc = DeltaState::assistant_message("Weather Agent", 1);
    let err = DeltaMerger::default().merge_all(&mut acc, &deltas()).unwrap_err();
    assert_eq!(
        err,
        MergeError::MissingSlot {
            path: "$.tool_calls".into(),
            index: 1,
            len: 1,
        }
    );

    // Everything before the rejected frame is kept; the rejected frame left no trace.
    let value = acc.to_value();
    assert_eq!(
        value["tool_calls"][0]["function"]["arguments"],
        "{\"location\":{\"city\":\"Lyngby\",\"country\":\"Danmark\"}}"
    );
    assert_eq!(value["tool_calls"].as_array().unwrap().len(), 1);
}

#[test]
fn test_ensure_slots_then_resume() {
    let frames = deltas();
    let merger = DeltaMerger::default();
    let mut acc = DeltaState::assistant_message("Weather Agent", 1);

    merger.merge_all(&mut acc, &frames[..3]).unwrap();
    assert!(merger.merge(&mut acc, &frames[3]).is_err());

    acc.ensure_slots("tool_calls", 2, &tool_call_slot()).unwrap();
    merger.merge_all(&mut acc, &frames[3..]).unwrap();
    assert_eq!(ToolCallAssembler::collect(&acc).len(), 2);
}

#[test]
fn test_absent_path_is_rejected() {
    let mut acc = DeltaState::from_skeleton(&json!({"content": ""})).unwrap();
    let err = DeltaMerger::default()
        .merge(&mut acc, &json!({"refusal": "no"}))
        .unwrap_err();
    assert_eq!(err, MergeError::MissingPath { path: "$.refusal".into() });
    assert_eq!(acc.to_value(), json!({"content": ""}));
}

#[test]
fn test_configured_stripped_keys() {
    let merger = DeltaMerger::new(&MergeConfig {
        stripped_keys: vec!["role".into(), "refusal".into()],
    });
    let mut acc = DeltaState::from_skeleton(&json!({"content": ""})).unwrap();
    merger
        .merge(&mut acc, &json!({"role": "assistant", "refusal": "x", "content": "ok"}))
        .unwrap();
    assert_eq!(acc.to_value(), json!({"content": "ok"}));
}

#[test]
fn test_non_object_delta() {
    let mut acc = DeltaState::from_skeleton(&json!({"content": ""})).unwrap();
    let err = DeltaMerger::default().merge(&mut acc, &json!("text")).unwrap_err();
    assert_eq!(err, MergeError::NotAnObject { found: "string" });
}
