// crates/guestbook-core/src/schema.rs
//
// Declarative input schemas evaluated at the RPC boundary.
//
// A schema is a table of field name -> expected JSON type + required-ness.
// Validation runs against the raw `serde_json::Value` params before any
// handler code, and reports every offending field rather than stopping at
// the first one. Keys not named in the schema are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

/// One entry of an object schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
        }
    }
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Field name, or an empty string when the params themselves are malformed.
    pub path: String,
    /// Expected JSON type (e.g. "string", "object").
    pub expected: String,
    /// JSON type actually received ("undefined" when the field is missing).
    pub received: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// An object schema: the params must be a JSON object whose listed fields
/// have the listed types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSchema {
    fields: &'static [FieldSpec],
}

impl InputSchema {
    pub const fn object(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Check `params` against the schema, collecting every issue.
    pub fn validate(&self, params: &Value) -> Result<(), Vec<FieldIssue>> {
        let object = match params {
            Value::Object(map) => map,
            other => {
                return Err(vec![FieldIssue {
                    path: String::new(),
                    expected: "object".to_string(),
                    received: json_type_name(Some(other)).to_string(),
                    message: format!(
                        "Expected object, received {}",
                        json_type_name(Some(other))
                    ),
                }]);
            }
        };

        let mut issues = Vec::new();
        for field in self.fields {
            let value = object.get(field.name);
            let ok = match value {
                None | Some(Value::Null) if !field.required => true,
                Some(v) => field.field_type.matches(v),
                None => false,
            };
            if ok {
                continue;
            }

            let received = json_type_name(value);
            let message = if value.is_none() {
                "Required".to_string()
            } else {
                format!("Expected {}, received {}", field.field_type.name(), received)
            };
            issues.push(FieldIssue {
                path: field.name.to_string(),
                expected: field.field_type.name().to_string(),
                received: received.to_string(),
                message,
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn json_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NAME_AND_MESSAGE: InputSchema = InputSchema::object(&[
        FieldSpec::required("name", FieldType::String),
        FieldSpec::required("message", FieldType::String),
    ]);

    #[test]
    fn test_valid_input_passes() {
        assert!(NAME_AND_MESSAGE
            .validate(&json!({"name": "Ada", "message": "hello"}))
            .is_ok());
    }

    #[test]
    fn test_empty_strings_are_accepted() {
        assert!(NAME_AND_MESSAGE
            .validate(&json!({"name": "", "message": ""}))
            .is_ok());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        assert!(NAME_AND_MESSAGE
            .validate(&json!({"name": "Ada", "message": "hi", "createdAt": 0}))
            .is_ok());
    }

    #[test]
    fn test_missing_field_is_required() {
        let issues = NAME_AND_MESSAGE
            .validate(&json!({"name": "Ada"}))
            .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "message");
        assert_eq!(issues[0].received, "undefined");
        assert_eq!(issues[0].message, "Required");
    }

    #[test]
    fn test_wrong_type_reports_expected_and_received() {
        let issues = NAME_AND_MESSAGE
            .validate(&json!({"name": 42, "message": null}))
            .unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, "name");
        assert_eq!(issues[0].expected, "string");
        assert_eq!(issues[0].received, "number");
        assert_eq!(issues[1].path, "message");
        assert_eq!(issues[1].received, "null");
        assert_eq!(issues[1].to_string(), "message: Expected string, received null");
    }

    #[test]
    fn test_non_object_params() {
        let issues = NAME_AND_MESSAGE.validate(&json!(["Ada", "hi"])).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "");
        assert_eq!(issues[0].expected, "object");
        assert_eq!(issues[0].received, "array");
    }

    #[test]
    fn test_optional_field_may_be_absent_or_null() {
        const SCHEMA: InputSchema =
            InputSchema::object(&[FieldSpec::optional("limit", FieldType::Number)]);
        assert!(SCHEMA.validate(&json!({})).is_ok());
        assert!(SCHEMA.validate(&json!({"limit": null})).is_ok());
        assert!(SCHEMA.validate(&json!({"limit": "ten"})).is_err());
    }
}
