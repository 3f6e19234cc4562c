use serde_json::{Map, Value};

use super::errors::ValidationErrors;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";

/// Name of the JSON type of `value`, as reported in validation messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// The payload as a JSON object, or a `non_field_errors` entry.
pub fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload.as_object().ok_or_else(|| {
        ValidationErrors::single(
            ValidationErrors::NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(payload)
            ),
        )
    })
}

/// A bounded text field. Input is trimmed before the blank and length checks;
/// numbers are accepted and kept in their textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharField {
    pub name: &'static str,
    pub max_length: usize,
}

impl CharField {
    pub const fn new(name: &'static str, max_length: usize) -> Self {
        Self { name, max_length }
    }

    pub fn clean(&self, value: &Value) -> Result<String, String> {
        let text = match value {
            Value::Null => return Err(NOT_NULL.to_owned()),
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            _ => return Err(NOT_A_STRING.to_owned()),
        };

        if text.is_empty() {
            return Err(NOT_BLANK.to_owned());
        }

        // counted in characters, not bytes
        if text.chars().count() > self.max_length {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                self.max_length
            ));
        }

        Ok(text)
    }

    /// Reads and cleans the field from `payload`, recording any failure in
    /// `errors`. A missing key is only an error when `required` is set.
    pub fn extract(
        &self,
        payload: &Map<String, Value>,
        required: bool,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        let Some(value) = payload.get(self.name) else {
            if required {
                errors.add(self.name, REQUIRED);
            }
            return None;
        };

        self.clean(value)
            .map_err(|message| errors.add(self.name, message))
            .ok()
    }
}
