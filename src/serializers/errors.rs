use std::{collections::BTreeMap, fmt};

use serde::Serialize;

/// Field name to the list of human readable messages for that field.
///
/// Serialized as a plain JSON object, e.g. `{"name": ["This field is required."]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    inner: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Key used for errors that don't belong to a single field.
    pub const NON_FIELD_ERRORS: &'static str = "non_field_errors";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.inner
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        messages
            .into_iter()
            .for_each(|message| self.add(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.inner.get(field).map(Vec::as_slice)
    }

    /// Every message prefixed with its field name, non-field messages as is.
    pub fn into_messages(self) -> Vec<String> {
        self.inner
            .into_iter()
            .flat_map(|(field, messages)| {
                messages.into_iter().map(move |message| {
                    if field == Self::NON_FIELD_ERRORS {
                        message
                    } else {
                        format!("{field}: {message}")
                    }
                })
            })
            .collect()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.inner {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "This field is required.");
        errors.add("name", "Second message.");
        errors.add("description", "This field may not be blank.");

        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "description": ["This field may not be blank."],
                "name": ["This field is required.", "Second message."],
            })
        );
    }

    #[test]
    fn into_result_passes_value_through_when_empty() {
        assert_eq!(ValidationErrors::new().into_result(7), Ok(7));

        let errors = ValidationErrors::single("name", "This field is required.");
        assert_eq!(
            errors.clone().into_result(7).unwrap_err().get("name"),
            Some(&["This field is required.".to_owned()][..])
        );
        assert_eq!(errors.to_string(), "name: This field is required.");
    }
}
