//! Checking model candidates against output contracts.

use serde_json::Value;

use crate::extract::strip_code_fence;
use crate::model::{Candidate, Message, Part};
use crate::output::{OutputContract, OutputFormat};

/// Why a candidate does not satisfy an output contract.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ContractError {
    /// The candidate carries no message.
    #[error("candidate with no message")]
    NoMessage,

    /// The message has no parts.
    #[error("candidate message has no content")]
    NoContent,

    /// JSON was required but the text does not parse.
    #[error("candidate did not have valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The decoded output violates the schema.
    #[error("data did not match expected schema:\n{}", .0.join("\n"))]
    SchemaMismatch(Vec<String>),

    /// The schema itself is malformed.
    #[error("failed to validate data against expected schema: {0}")]
    InvalidSchema(String),
}

impl ContractError {
    /// `true` when the contract is at fault rather than the model output.
    pub fn is_contract_authoring_error(&self) -> bool {
        matches!(self, Self::InvalidSchema(_))
    }
}

/// Check `candidate` against `contract`.
///
/// For JSON contracts a valid candidate is returned with its text parts
/// replaced by a single text part holding the JSON text, fences removed.
/// Media and data parts are kept. Other valid candidates are returned
/// unchanged.
pub fn validate_candidate(
    candidate: Candidate,
    contract: &OutputContract,
) -> Result<Candidate, ContractError> {
    let message = candidate.message.as_ref().ok_or(ContractError::NoMessage)?;
    if message.content.is_empty() {
        return Err(ContractError::NoContent);
    }

    match contract.format {
        OutputFormat::Json => {
            let json = extract_json(message, contract.schema.as_ref())?;
            Ok(replace_content(candidate, json))
        }
        OutputFormat::Enum => {
            if let Some(schema) = &contract.schema {
                check_enum(&message.text(), schema)?;
            }
            Ok(candidate)
        }
        OutputFormat::Unspecified | OutputFormat::Text | OutputFormat::Other => Ok(candidate),
    }
}

fn extract_json(message: &Message, schema: Option<&Value>) -> Result<String, ContractError> {
    let text = message.text();
    let json = strip_code_fence(&text);
    let data: Value = serde_json::from_str(json).map_err(ContractError::InvalidJson)?;
    if let Some(schema) = schema {
        check_schema(schema, &data)?;
    }
    Ok(json.to_owned())
}

fn check_schema(schema: &Value, data: &Value) -> Result<(), ContractError> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|e| ContractError::InvalidSchema(e.to_string()))?;
    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| format!("- {e}"))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(violations = errors.len(), "candidate output violates schema");
        Err(ContractError::SchemaMismatch(errors))
    }
}

fn check_enum(text: &str, schema: &Value) -> Result<(), ContractError> {
    let Some(allowed) = schema.get("enum").and_then(Value::as_array) else {
        return Ok(());
    };
    let trimmed = text.trim();
    let value = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    if allowed.iter().any(|v| v.as_str() == Some(value)) {
        return Ok(());
    }
    let choices: Vec<String> = allowed.iter().map(Value::to_string).collect();
    Err(ContractError::SchemaMismatch(vec![format!(
        "- {value:?} is not one of [{}]",
        choices.join(", ")
    )]))
}

/// Collapse the text parts into one part holding `json`, placed where the
/// first text part was. Media and data parts stay in order.
fn replace_content(mut candidate: Candidate, json: String) -> Candidate {
    let Some(message) = candidate.message.as_mut() else {
        return candidate;
    };
    let mut json = Some(json);
    let content = std::mem::take(&mut message.content);
    for part in content {
        if part.as_text().is_none() {
            message.content.push(part);
        } else if let Some(json) = json.take() {
            message.content.push(Part::text(json));
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn candidate(text: &str) -> Candidate {
        Candidate::new(0, Message::model(text))
    }

    #[test]
    fn only_invalid_schemas_blame_the_contract() {
        assert!(ContractError::InvalidSchema("bad".into()).is_contract_authoring_error());
        assert!(!ContractError::NoMessage.is_contract_authoring_error());
        assert!(!ContractError::SchemaMismatch(vec![]).is_contract_authoring_error());
    }

    #[test]
    fn text_parts_are_concatenated_before_parsing() {
        let mut candidate = candidate("{\"a\":");
        if let Some(message) = candidate.message.as_mut() {
            message.content.push(Part::media("data:,", None));
            message.content.push(Part::text(" 1}"));
        }
        let valid = validate_candidate(candidate, &OutputContract::json()).unwrap();
        assert_eq!(valid.text(), "{\"a\": 1}");
        assert_eq!(
            valid.message.unwrap().content,
            vec![Part::text("{\"a\": 1}"), Part::media("data:,", None)]
        );
    }

    #[test]
    fn non_text_parts_survive_json_normalization() {
        let message = Message {
            content: vec![
                Part::media("https://example.com/chart.png", Some("image/png".into())),
                Part::text("```json\n{\"ok\": true}\n```"),
                Part::Data { data: json!({ "source": "cache" }) },
            ],
            ..Message::model("")
        };
        let valid = validate_candidate(Candidate::new(0, message), &OutputContract::json()).unwrap();

        assert_eq!(
            valid.message.unwrap().content,
            vec![
                Part::media("https://example.com/chart.png", Some("image/png".into())),
                Part::text("{\"ok\": true}"),
                Part::Data { data: json!({ "source": "cache" }) },
            ]
        );
    }

    #[test]
    fn enum_accepts_quoted_choice() {
        let contract = OutputContract::one_of(["red", "green"]);
        let valid = validate_candidate(candidate(" \"green\"\n"), &contract).unwrap();
        assert_eq!(valid.text(), " \"green\"\n");
    }

    #[test]
    fn enum_rejects_unknown_choice() {
        let contract = OutputContract::one_of(["red", "green"]);
        let err = validate_candidate(candidate("blue"), &contract).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data did not match expected schema:\n- \"blue\" is not one of [\"red\", \"green\"]"
        );
    }

    #[test]
    fn enum_without_schema_accepts_anything() {
        let contract = OutputContract {
            format: OutputFormat::Enum,
            schema: None,
        };
        assert!(validate_candidate(candidate("anything"), &contract).is_ok());
    }

    #[test]
    fn unknown_format_is_not_checked() {
        let contract = OutputContract {
            format: OutputFormat::Other,
            schema: Some(json!({ "type": "object" })),
        };
        assert!(validate_candidate(candidate("not json"), &contract).is_ok());
    }
}
