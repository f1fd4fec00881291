// Shared prompt fragments and schema-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

use serde_json::{json, Value};

/// System instruction shared by every Aura call.
pub const SKINCARE_SYSTEM: &str = "You are a careful skincare assistant. \
    Give general cosmetic guidance only, never a medical diagnosis. \
    Respond with JSON that matches the provided schema and nothing else.";

/// `{"type": "STRING"}`
pub fn string_schema() -> Value {
    json!({ "type": "STRING" })
}

/// `{"type": "ARRAY", "items": {"type": "STRING"}}`
pub fn string_array_schema() -> Value {
    json!({ "type": "ARRAY", "items": string_schema() })
}

/// An OBJECT schema where every listed property is required.
pub fn object_schema(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let props: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": props,
        "required": required,
    })
}
