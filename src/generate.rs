//! LLM orchestration: one-shot code generation with structured metadata, and
//! value-only property updates against existing code.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::extract;
use crate::llm::{ChatMessage, LlmClient, LlmError};

pub const GENERATION_TEMPERATURE: f32 = 0.7;
/// Updates favor determinism over creativity.
pub const UPDATE_TEMPERATURE: f32 = 0.2;

const GENERATION_SYSTEM_PROMPT: &str = r#"You are a Manim code generator. Generate Manim code based on the user's description.

- Always return your response in two blocks:
  1. A Python code block (```python) with the Manim code.
     - Always start with 'from manim import *' to import everything from manim.
     - For any property that should be editable (like font size, color, position, etc.), define a variable at the top (e.g., font_size = 48) make sure to always add position, scaling, rotation and opacity to each manim item, and use it in the code (e.g., font_size=font_size).
     - Use f-strings only for string properties that should be editable.
     - Always import all constants, classes, and animations you use, including color constants (e.g., BLUE, RED), animation classes (e.g., Create, Write), and any other required objects from manim.
  2. A JSON code block (```json) with the metadata for each animation component, including all properties and their types, values, and constraints.
     - The JSON should match this format:
       [
         {
           "id": "unique_id",
           "type": "text|shape|transform",
           "start": start_time,
           "duration": duration,
           "properties": {
             "property_name": {
               "position": "x,y,z",
               "scaling": "x,y,z",
               "rotation": "x,y,z",
               "opacity": "0.0-1.0",
               "color": "color_name",
               "type": "number|string|color|boolean|position",
               "value": value,
               "min": min_value,
               "max": max_value,
               "step": step_value,
               "options": ["option1", "option2"],
               "multiline": true,
               "label": "Label"
             }
           }
         }
       ]
     - min, max, step, options, multiline and label are optional.
- Always return both the code and the JSON metadata."#;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("failed to extract code from response")]
    MissingCodeBlock,
}

/// One editable animation component as described by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub properties: HashMap<String, PropertySpec>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Shape,
    Transform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub code: String,
    pub metadata: Vec<PropertyBlock>,
}

/// Asks the model for scene code plus metadata and extracts both. A missing
/// python block is a hard failure; missing or invalid metadata is not.
pub async fn generate_code(
    llm: &LlmClient,
    prompt: &str,
    api_key: Option<&str>,
) -> Result<GenerationResult, GenerationError> {
    let messages = [
        ChatMessage::system(GENERATION_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let content = llm.chat(api_key, &messages, GENERATION_TEMPERATURE).await?;
    scene_from_response(&content)
}

/// Asks the model to rewrite property values inside existing code, leaving
/// structure intact. Unlike [`generate_code`] this never fails on extraction:
/// a response without a fenced block is used as-is.
pub async fn update_code(
    llm: &LlmClient,
    code: &str,
    properties: &serde_json::Value,
    history: &[String],
) -> Result<String, GenerationError> {
    let prompt = update_prompt(code, properties, history);
    let content = llm
        .chat(None, &[ChatMessage::system(prompt)], UPDATE_TEMPERATURE)
        .await?;
    Ok(updated_code_from_response(&content))
}

fn scene_from_response(content: &str) -> Result<GenerationResult, GenerationError> {
    let code = extract::fenced_block(content, "python").ok_or(GenerationError::MissingCodeBlock)?;
    let code = extract::strip_preamble(code).to_string();
    let metadata = extract::fenced_block(content, "json")
        .map(parse_metadata)
        .unwrap_or_default();
    Ok(GenerationResult { code, metadata })
}

fn updated_code_from_response(content: &str) -> String {
    match extract::fenced_block(content, "python") {
        Some(code) => extract::strip_preamble(code).to_string(),
        None => content.trim().to_string(),
    }
}

fn update_prompt(code: &str, properties: &serde_json::Value, history: &[String]) -> String {
    let mut prompt = String::from(
        "You are a Manim code editor. Given the following Manim code and a JSON object of \
         updated property values, update the code so that the property values match the JSON. \
         Only change the values, do not change the structure or add new properties.\n\n",
    );
    if !history.is_empty() {
        prompt.push_str("Here is the previous code history for context:\n");
        for (idx, prev) in history.iter().enumerate() {
            prompt.push_str(&format!("Previous code version {}:\n{prev}\n\n", idx + 1));
        }
    }
    prompt.push_str(&format!("Manim code:\n{code}\n\n"));
    let properties_json =
        serde_json::to_string_pretty(properties).unwrap_or_else(|_| properties.to_string());
    prompt.push_str(&format!("Updated properties:\n{properties_json}\n\n"));
    prompt.push_str("Return only the updated Manim code.");
    prompt
}

/// Metadata is best-effort: anything that fails to parse, or parses but
/// breaks an invariant (duplicate id, negative timing), yields an empty
/// sequence rather than failing the request.
fn parse_metadata(raw: &str) -> Vec<PropertyBlock> {
    let Ok(blocks) = serde_json::from_str::<Vec<PropertyBlock>>(raw) else {
        return Vec::new();
    };
    if !metadata_invariants_hold(&blocks) {
        return Vec::new();
    }
    blocks
}

fn metadata_invariants_hold(blocks: &[PropertyBlock]) -> bool {
    let mut seen = HashSet::new();
    blocks
        .iter()
        .all(|b| b.start >= 0.0 && b.duration >= 0.0 && seen.insert(b.id.as_str()))
}
