//! Field-level error aggregation and cross-entity write rules.
//!
//! Per-field domains (ranges, lengths, color format) are declared with
//! `validator` derives on the write DTOs; their failures are folded into a
//! [`FieldErrors`] map alongside the rules checked here, so a caller always
//! sees every violation of a request at once.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Key used for violations that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_CROSS_TOUR: &str = "Source and target scenes must belong to the same tour.";
pub const MSG_SELF_LOOP: &str = "Source and target scenes cannot be the same.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_HEX_COLOR: &str = "Color must be a hex value such as #ffffff.";
pub const MSG_SCENE_LINKED: &str =
    "A scene connected by hotspots cannot be moved to another tour.";
pub const MSG_UNIQUE_ORDER: &str = "The fields tour, order must make a unique set.";

/// Message for a reference to a row that does not exist.
pub fn msg_missing_reference(id: DbId) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Default hotspot color.
pub const DEFAULT_HOTSPOT_COLOR: &str = "#ffffff";

/// Default hotspot size multiplier.
pub const DEFAULT_HOTSPOT_SIZE: f64 = 1.0;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern is valid"));

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Mapping from field name to the messages reported for it.
///
/// Serializes as a plain JSON object (`{"yaw": ["..."], ...}`) with fields in
/// lexical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against `field`. Messages accumulate per field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Move every message of `other` into `self`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
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

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", err.code));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Run a DTO's declarative field checks, returning their violations.
pub fn field_violations<T: validator::Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

// ---------------------------------------------------------------------------
// Custom field validators (used from `#[validate(custom(...))]`)
// ---------------------------------------------------------------------------

/// Reject strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some(Cow::Borrowed(MSG_BLANK));
        return Err(err);
    }
    Ok(())
}

/// Accept only `#RRGGBB` colors.
pub fn validate_hex_color(value: &str) -> Result<(), validator::ValidationError> {
    if is_hex_color(value) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("hex_color");
        err.message = Some(Cow::Borrowed(MSG_HEX_COLOR));
        Err(err)
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

// ---------------------------------------------------------------------------
// Hotspot endpoints
// ---------------------------------------------------------------------------

/// The identity of a resolved hotspot endpoint and the tour it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneEndpoint {
    pub id: DbId,
    pub tour_id: DbId,
}

/// Check that a hotspot stays inside one tour and does not point at itself.
///
/// Both endpoints must already be resolved; a missing endpoint is a reference
/// error reported by the persistence layer, not by this check.
pub fn check_hotspot_endpoints(source: SceneEndpoint, target: SceneEndpoint) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if source.tour_id != target.tour_id {
        errors.add(NON_FIELD_ERRORS, MSG_CROSS_TOUR);
    } else if source.id == target.id {
        errors.add(NON_FIELD_ERRORS, MSG_SELF_LOOP);
    }
    errors
}
