//! Request body reading shared by the write endpoints.
//!
//! Multipart text fields and JSON members are parsed leniently into their
//! target types; every parse failure is recorded in a [`FieldErrors`] so the
//! handler can report it together with the rest of the request's violations.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use vrtour_core::error::CoreError;
use vrtour_core::media::{check_upload, MediaKind, MediaStore, MediaUpload};
use vrtour_core::validation::{FieldErrors, NON_FIELD_ERRORS};

use crate::error::{AppError, AppResult};
use crate::media_store::discard;

pub const MSG_NO_FILE: &str = "No file was submitted.";
pub const MSG_INVALID_NUMBER: &str = "A valid number is required.";
pub const MSG_INVALID_INTEGER: &str = "A valid integer is required.";
pub const MSG_INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const MSG_INVALID_PK: &str = "Incorrect type. Expected pk value.";
pub const MSG_INVALID_STRING: &str = "Not a valid string.";
pub const MSG_EXPECTED_OBJECT: &str = "Invalid data. Expected a dictionary.";

/// The text fields and files of one multipart request.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<MediaKind, MediaUpload>,
}

impl MultipartForm {
    /// Drain a multipart body. Parts named after a media slot that carry a
    /// file name become uploads; everything else is read as text. Unknown
    /// names are kept but never consulted.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();
            let kind = MediaKind::from_field(&name);

            match (kind, field.file_name().map(str::to_string)) {
                (Some(kind), Some(file_name)) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.files.insert(
                        kind,
                        MediaUpload {
                            file_name,
                            content_type,
                            bytes: data.to_vec(),
                        },
                    );
                }
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Raw text of a field, if it was sent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Parse a field; blank values count as absent.
    pub fn parse<T: FromStr>(
        &self,
        name: &str,
        errors: &mut FieldErrors,
        message: &str,
    ) -> Option<T> {
        let raw = self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.add(name, message);
                None
            }
        }
    }

    /// Parse a checkbox-style boolean (`true`/`false`, `1`/`0`, `on`/`off`).
    pub fn parse_bool(&self, name: &str, errors: &mut FieldErrors) -> Option<bool> {
        let raw = self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" => Some(false),
            _ => {
                errors.add(name, MSG_INVALID_BOOLEAN);
                None
            }
        }
    }

    /// Take the upload for a slot and record any rule it breaks.
    pub fn take_file(&mut self, kind: MediaKind, errors: &mut FieldErrors) -> Option<MediaUpload> {
        let upload = self.files.remove(&kind)?;
        check_upload(kind, &upload, errors);
        Some(upload)
    }
}

/// The members of a JSON object body.
#[derive(Debug, Default)]
pub struct JsonForm {
    fields: Map<String, Value>,
}

impl JsonForm {
    /// Accept a JSON object; any other body is a non-field violation.
    pub fn from_value(body: Value) -> Result<Self, CoreError> {
        match body {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(CoreError::validation(NON_FIELD_ERRORS, MSG_EXPECTED_OBJECT)),
        }
    }

    /// Decode a member; `null` counts as absent. A string holding a JSON
    /// scalar (`"12.5"`, `"true"`) is accepted for non-string targets.
    pub fn parse<T: DeserializeOwned>(
        &self,
        name: &str,
        errors: &mut FieldErrors,
        message: &str,
    ) -> Option<T> {
        let value = self.fields.get(name).filter(|v| !v.is_null())?;
        let decoded = <T as Deserialize>::deserialize(value).or_else(|e| match value {
            Value::String(raw) => serde_json::from_str(raw.trim()),
            _ => Err(e),
        });
        match decoded {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(name, message);
                None
            }
        }
    }
}

/// Add declarative violations for fields that have no error yet, so a value
/// that failed to parse is not also reported as missing.
pub fn merge_new_fields(errors: &mut FieldErrors, violations: FieldErrors) {
    for (field, messages) in violations.iter() {
        if !errors.contains(field) {
            for message in messages {
                errors.add(field, message.as_str());
            }
        }
    }
}

/// Write every upload to the store, returning the key per slot.
///
/// If one write fails, the files already written are removed again.
pub async fn store_uploads(
    media: &dyn MediaStore,
    uploads: Vec<(MediaKind, MediaUpload)>,
) -> AppResult<HashMap<MediaKind, String>> {
    let mut stored: HashMap<MediaKind, String> = HashMap::new();
    for (kind, upload) in uploads {
        match media.put(kind, &upload).await {
            Ok(key) => {
                stored.insert(kind, key);
            }
            Err(e) => {
                let written: Vec<String> = stored.into_values().collect();
                discard(media, &written).await;
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_members_parse_leniently() {
        let form = JsonForm::from_value(json!({
            "yaw": "12.5",
            "pitch": 4,
            "label": null,
            "size": "big",
        }))
        .unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(form.parse::<f64>("yaw", &mut errors, MSG_INVALID_NUMBER), Some(12.5));
        assert_eq!(form.parse::<f64>("pitch", &mut errors, MSG_INVALID_NUMBER), Some(4.0));
        assert_eq!(form.parse::<String>("label", &mut errors, MSG_INVALID_STRING), None);
        assert_eq!(form.parse::<f64>("size", &mut errors, MSG_INVALID_NUMBER), None);
        assert_eq!(form.parse::<bool>("is_active", &mut errors, MSG_INVALID_BOOLEAN), None);

        assert_eq!(errors.get("size"), Some(&[MSG_INVALID_NUMBER.to_string()][..]));
        assert!(!errors.contains("label"));
        assert!(!errors.contains("is_active"));
    }

    #[test]
    fn non_object_json_body_is_rejected() {
        let err = JsonForm::from_value(json!([1, 2])).unwrap_err();
        match err {
            CoreError::Validation(fields) => {
                assert_eq!(
                    fields.get(NON_FIELD_ERRORS),
                    Some(&[MSG_EXPECTED_OBJECT.to_string()][..])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
