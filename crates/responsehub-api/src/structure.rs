//! Envelope key-scheme validation.

use serde_json::{Map, Value};

use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;
use responsehub_core::types::ResponseStructure;

/// Required structure roles, in the order they are reported when missing.
const REQUIRED_KEYS: [&str; 8] = [
    "success_key",
    "message_key",
    "data_key",
    "errors_key",
    "error_code_key",
    "meta_key",
    "links_key",
    "include_api_version",
];

/// Validate an envelope structure configuration.
///
/// Every required role must be present; the error names all missing roles,
/// comma-joined. Callers are responsible for merging defaults before
/// validation.
pub fn validate(structure: &Map<String, Value>) -> AppResult<ResponseStructure> {
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .filter(|key| !structure.contains_key(**key))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(AppError::configuration(format!(
            "Missing required keys in response structure configuration: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(Value::Object(structure.clone())).map_err(|e| {
        AppError::configuration(format!("Invalid response structure configuration: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_structure() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "success_key": "success",
            "message_key": "message",
            "data_key": "data",
            "errors_key": "errors",
            "error_code_key": "error_code",
            "meta_key": "meta",
            "links_key": "_links",
            "include_api_version": true,
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn accepts_complete_structure() {
        let structure = validate(&full_structure()).unwrap();
        assert_eq!(structure, ResponseStructure::default());
    }

    #[test]
    fn names_every_missing_key_in_fixed_order() {
        let mut incomplete = full_structure();
        incomplete.remove("message_key");
        incomplete.remove("links_key");
        incomplete.remove("include_api_version");

        let err = validate(&incomplete).unwrap_err();
        assert_eq!(
            err.message,
            "Missing required keys in response structure configuration: \
             message_key, links_key, include_api_version"
        );
    }

    #[test]
    fn empty_structure_reports_all_keys() {
        let err = validate(&Map::new()).unwrap_err();
        assert_eq!(
            err.message,
            "Missing required keys in response structure configuration: \
             success_key, message_key, data_key, errors_key, error_code_key, \
             meta_key, links_key, include_api_version"
        );
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut structure = full_structure();
        structure.insert("include_api_version".to_string(), json!("yes"));
        let err = validate(&structure).unwrap_err();
        assert!(err.message.starts_with("Invalid response structure"));
    }

    #[test]
    fn custom_key_names_survive_validation() {
        let mut structure = full_structure();
        structure.insert("data_key".to_string(), json!("payload"));
        let validated = validate(&structure).unwrap();
        assert_eq!(validated.data_key, "payload");
        assert_eq!(validated.success_key, "success");
    }
}
