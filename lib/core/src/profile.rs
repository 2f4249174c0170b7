//! Normalization of the provider's userinfo payload.
//!
//! The provider reports accounts with capitalized keys (`ZUID`, `Email`,
//! `Display_Name`, `First_Name`, `Last_Name`). Downstream sign-in expects the
//! canonical `{id, email, name, emailVerified, image}` shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors from profile normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The payload is not a JSON object.
    NotAnObject,
    /// Neither the provider subject field nor a generic `id` is present.
    MissingSubject,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "profile payload is not a JSON object"),
            Self::MissingSubject => write!(f, "profile payload has no subject identifier"),
        }
    }
}

impl std::error::Error for ProfileError {}

/// User profile in the shape the sign-in layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub email_verified: bool,
    pub image: Option<String>,
}

impl CanonicalProfile {
    /// Normalizes a raw userinfo payload.
    ///
    /// - `id`: `ZUID`, falling back to `id`; numbers are stringified.
    /// - `email`: `Email` (or `email`), lower-cased.
    /// - `name`: `Display_Name`, else `First_Name` + `Last_Name`, trimmed.
    /// - `emailVerified`: always true, the provider only issues verified addresses.
    /// - `image`: always `None`, the provider does not supply one.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] when the payload is not an object or carries
    /// no usable subject identifier.
    pub fn from_provider(raw: &Value) -> Result<Self, ProfileError> {
        let object = raw.as_object().ok_or(ProfileError::NotAnObject)?;

        let id = ["ZUID", "id"]
            .iter()
            .find_map(|key| object.get(*key).and_then(scalar_to_string))
            .ok_or(ProfileError::MissingSubject)?;

        let email = ["Email", "email"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());

        let display_name = object
            .get("Display_Name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let name = match display_name {
            Some(name) => name.to_string(),
            None => {
                let first = object
                    .get("First_Name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let last = object
                    .get("Last_Name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                format!("{first} {last}").trim().to_string()
            }
        };

        Ok(Self {
            id,
            email,
            name,
            email_verified: true,
            image: None,
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
