use crate::pipeline::DeltaState;
use crate::types::tool::ToolCall;
use serde_json::Value;

/// Collects finished tool calls out of an accumulated response.
/// This is intentionally tolerant: if argument JSON parsing fails, it keeps the raw string.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    tool_calls: Vec<ToolCall>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every used slot of `state.tool_calls`. Slots without a function name are
    /// pre-allocated placeholders the stream never filled and are skipped.
    pub fn collect(state: &DeltaState) -> Vec<ToolCall> {
        let mut assembler = Self::new();
        if let Some(slots) = state.get("tool_calls").and_then(DeltaState::as_sequence) {
            for slot in slots {
                assembler.on_slot(slot);
            }
        }
        assembler.finalize()
    }

    pub fn on_slot(&mut self, slot: &DeltaState) {
        let function = slot.get("function");
        let name = function
            .and_then(|f| f.get("name"))
            .and_then(DeltaState::as_str)
            .unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let id = slot
            .get("id")
            .and_then(DeltaState::as_str)
            .unwrap_or_default();
        let arguments = function
            .and_then(|f| f.get("arguments"))
            .and_then(DeltaState::as_str)
            .unwrap_or_default();

        self.tool_calls.push(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: Value::String(arguments.to_string()),
        });
    }

    pub fn finalize(mut self) -> Vec<ToolCall> {
        for tc in &mut self.tool_calls {
            if let Value::String(s) = &tc.arguments {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    tc.arguments = Value::Object(serde_json::Map::new());
                } else if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
                    tc.arguments = v;
                }
            }
        }
        self.tool_calls
    }
}
