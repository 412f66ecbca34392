//! Parsing and schema validation of the model reply.
//!
//! The reply is untrusted text. It may be wrapped in markdown code fences;
//! after stripping those it must be a single JSON object matching the active
//! schema variant. Structural failures are `MalformedReply`, field-level
//! failures are `SchemaViolation` naming the field.

use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::{RiskAssessment, SchemaVariant};

/// Removes markdown code-fence markers around the payload.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` openers, with or without a
/// closing fence. Text outside the fenced block is dropped. A reply that
/// starts with the object itself treats the first marker as its closing fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();

    let Some(open) = text.find("```") else {
        return text;
    };
    if text.starts_with('{') {
        return text[..open].trim();
    }
    let rest = &text[open + 3..];

    // Drop the language tag up to the end of the opening line
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn violation(field: &str, reason: impl Into<String>) -> AppError {
    AppError::SchemaViolation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn required_string(obj: &Map<String, Value>, field: &str) -> Result<String, AppError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(violation(field, "required field is missing")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(violation(field, format!("expected a string, got {}", other))),
    }
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, AppError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(violation(field, format!("expected a string, got {}", other))),
    }
}

fn optional_number(obj: &Map<String, Value>, field: &str) -> Result<Option<f64>, AppError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| violation(field, "number is not representable")),
        Some(other) => Err(violation(field, format!("expected a number, got {}", other))),
    }
}

fn fragility(obj: &Map<String, Value>) -> Result<u8, AppError> {
    const FIELD: &str = "fragilidad";
    let value = match obj.get(FIELD) {
        None | Some(Value::Null) => return Err(violation(FIELD, "required field is missing")),
        Some(value) => value,
    };

    let score = value
        .as_i64()
        .ok_or_else(|| violation(FIELD, format!("expected an integer, got {}", value)))?;

    if !(0..=100).contains(&score) {
        return Err(violation(FIELD, format!("{} is outside [0, 100]", score)));
    }

    // In range, so the narrowing cannot fail
    u8::try_from(score).map_err(|_| violation(FIELD, "out of range"))
}

fn tips(obj: &Map<String, Value>) -> Result<Vec<String>, AppError> {
    const FIELD: &str = "tips";
    let items = match obj.get(FIELD) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(violation(FIELD, format!("expected an array, got {}", other)));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
            Value::String(_) => Err(violation(FIELD, format!("tip {} is empty", i))),
            other => Err(violation(
                FIELD,
                format!("tip {} is not a string: {}", i, other),
            )),
        })
        .collect()
}

/// Drops every fence marker wherever it appears, keeping all other text.
///
/// Used when the fenced block alone is not valid JSON, e.g. when a string
/// value inside the object contains a fence of its own.
pub fn remove_fence_markers(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn decode(raw: &str) -> Result<Value, AppError> {
    let body = strip_code_fences(raw);
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let cleaned = remove_fence_markers(raw);
            if cleaned == body {
                return Err(AppError::MalformedReply(format!(
                    "reply is not valid JSON: {}",
                    first
                )));
            }
            serde_json::from_str(&cleaned)
                .map_err(|e| AppError::MalformedReply(format!("reply is not valid JSON: {}", e)))
        }
    }
}

/// Parses and validates a raw model reply against the variant's schema.
pub fn parse_reply(raw: &str, variant: SchemaVariant) -> Result<RiskAssessment, AppError> {
    let value = decode(raw)?;

    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(AppError::MalformedReply(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )));
        }
    };

    let loss_display = required_string(&obj, "monto")?;
    let message = required_string(&obj, "mensaje")?;
    let fragility = fragility(&obj)?;

    let loss_value = optional_number(&obj, "monto_num")?;
    if variant.requires_numeric_loss() && loss_value.is_none() {
        return Err(violation("monto_num", "required field is missing"));
    }

    let preview = optional_string(&obj, "preview")?;
    if variant.requires_preview() && preview.is_none() {
        return Err(violation("preview", "required field is missing"));
    }

    let tips = tips(&obj)?;

    tracing::debug!(
        "✓ Reply parsed: fragility={}, tips={}, variant={}",
        fragility,
        tips.len(),
        variant
    );

    Ok(RiskAssessment {
        loss_display,
        loss_value,
        message,
        fragility,
        tips,
        preview,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_variants() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(
            strip_code_fences("Aquí está:\n```json\n{\"a\":1}\n```\nSaludos"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_closing_fence_only_reply_parses() {
        let raw = "{\"monto\":\"$1\",\"mensaje\":\"x\",\"fragilidad\":5}\n```";
        assert_eq!(
            strip_code_fences(raw),
            "{\"monto\":\"$1\",\"mensaje\":\"x\",\"fragilidad\":5}"
        );
        let assessment = parse_reply(raw, SchemaVariant::Basic).unwrap();
        assert_eq!(assessment.fragility, 5);
    }

    #[test]
    fn test_fence_inside_message_falls_back_to_marker_removal() {
        let raw = "```json\n{\"monto\":\"$1\",\"mensaje\":\"usar ``` aqui\",\"fragilidad\":7}\n```";
        let assessment = parse_reply(raw, SchemaVariant::Basic).unwrap();
        assert_eq!(assessment.fragility, 7);
        assert_eq!(assessment.message, "usar  aqui");
    }

    #[test]
    fn test_unfenced_garbage_still_malformed() {
        let err = parse_reply("```json\nnot json\n```", SchemaVariant::Basic).unwrap_err();
        assert!(matches!(err, AppError::MalformedReply(_)));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = parse_reply("[1, 2, 3]", SchemaVariant::Basic).unwrap_err();
        assert!(matches!(err, AppError::MalformedReply(_)));
    }

    #[test]
    fn test_fractional_fragility_is_violation() {
        let raw = r#"{"monto":"$1","mensaje":"x","fragilidad":42.5}"#;
        match parse_reply(raw, SchemaVariant::Basic) {
            Err(AppError::SchemaViolation { field, .. }) => assert_eq!(field, "fragilidad"),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_tip_is_violation() {
        let raw = r#"{"monto":"$1","mensaje":"x","fragilidad":10,"tips":["ok","  "]}"#;
        match parse_reply(raw, SchemaVariant::Basic) {
            Err(AppError::SchemaViolation { field, .. }) => assert_eq!(field, "tips"),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_string_monto_num_is_violation() {
        let raw = r#"{"monto":"$1","monto_num":"1000","mensaje":"x","fragilidad":10}"#;
        match parse_reply(raw, SchemaVariant::Basic) {
            Err(AppError::SchemaViolation { field, .. }) => assert_eq!(field, "monto_num"),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_lead_gated_requires_preview() {
        let raw = r#"{"monto":"$1","monto_num":1,"mensaje":"x","fragilidad":10}"#;
        match parse_reply(raw, SchemaVariant::LeadGated) {
            Err(AppError::SchemaViolation { field, .. }) => assert_eq!(field, "preview"),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }
}
