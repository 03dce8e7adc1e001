#![forbid(unsafe_code)]

//! JS boundary for the probtree compiler.
//!
//! Exposes `parseText(text, startingLineNumber)` returning the element array
//! the graph view feeds straight into its rendering library, and `validate`
//! for editors that only need the diagnostic. Errors cross the boundary as
//! structured values carrying `code`, `message`, and `line`.

use pt_core::{CompileError, GraphElement};
use pt_parser::{parse_text, parse_tree};
use serde::Serialize;
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// A compile error in the shape the JS host consumes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    pub code: String,
    pub message: String,
    pub line: usize,
}

impl WireError {
    #[must_use]
    pub fn from_error(error: &CompileError) -> Self {
        Self {
            code: error.code().as_str().to_string(),
            message: error.message().to_string(),
            line: error.line(),
        }
    }
}

/// Outcome of `validate`: either valid with element counts, or the error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    pub node_count: usize,
    pub error: Option<WireError>,
}

/// Compile text to elements without crossing the JS boundary; the
/// wasm-bindgen exports below are thin wrappers over this.
pub fn parse_elements(
    text: &str,
    starting_line_number: usize,
) -> Result<Vec<GraphElement>, CompileError> {
    parse_text(text, starting_line_number)
}

#[must_use]
pub fn validation_outcome(text: &str, starting_line_number: usize) -> ValidationOutcome {
    match parse_tree(text, starting_line_number) {
        Ok(tree) => ValidationOutcome {
            valid: true,
            node_count: tree.map_or(0, |root| root.node_count()),
            error: None,
        },
        Err(error) => ValidationOutcome {
            valid: false,
            node_count: 0,
            error: Some(WireError::from_error(&error)),
        },
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        serde_wasm_bindgen::to_value(value)
            .map_err(|err| JsValue::from_str(&format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| JsValue::from_str(&format!("failed to serialize response: {err}")))
    }
}

fn error_to_js(error: &CompileError) -> JsValue {
    match to_js_value(&WireError::from_error(error)) {
        Ok(value) => value,
        Err(value) => value,
    }
}

/// Compile `text` into the element array. Throws a structured error value on
/// invalid input; the caller keeps its previous graph in that case.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseText))]
pub fn parse_text_js(text: &str, starting_line_number: usize) -> Result<JsValue, JsValue> {
    let elements = parse_elements(text, starting_line_number).map_err(|e| error_to_js(&e))?;
    to_js_value(&elements)
}

/// Check `text` and return `{ valid, nodeCount, error }` without throwing.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = validate))]
pub fn validate_js(text: &str, starting_line_number: usize) -> Result<JsValue, JsValue> {
    to_js_value(&validation_outcome(text, starting_line_number))
}
