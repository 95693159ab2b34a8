//! Shared primitive types for the Posyandu client.
//!
//! This crate holds the small enumerations that cross crate boundaries
//! (desk roles, patient categories, dialog kinds) together with their wire
//! conversions, plus a validated non-empty text type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. The input is trimmed during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The three successive health-post desk roles, plus anything the backend
/// sends that we do not recognise.
///
/// Meja 1 handles registration, meja 2 measurement, meja 3 counseling.
/// The role is only ever read from the session profile; this layer never
/// mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Registration desk, sees everything.
    Meja1,
    /// Measurement desk.
    Meja2,
    /// Counseling desk.
    Meja3,
    /// Unauthenticated or unrecognised role string.
    Unknown,
}

impl Role {
    /// Parse from the backend's role string. Unrecognised values map to
    /// [`Role::Unknown`] rather than failing, matching the original UI.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "meja1" => Role::Meja1,
            "meja2" => Role::Meja2,
            "meja3" => Role::Meja3,
            _ => Role::Unknown,
        }
    }

    /// Convert to the backend's role string.
    pub fn to_wire(self) -> &'static str {
        match self {
            Role::Meja1 => "meja1",
            Role::Meja2 => "meja2",
            Role::Meja3 => "meja3",
            Role::Unknown => "",
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Role::from_wire(&s))
    }
}

/// The two patient categories served by the health post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatientType {
    /// Child under five years old.
    Balita,
    /// Pregnant woman.
    IbuHamil,
}

impl PatientType {
    /// Parse from the backend's `patientType` string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "balita" => Some(PatientType::Balita),
            "ibu_hamil" => Some(PatientType::IbuHamil),
            _ => None,
        }
    }

    /// Convert to the backend's `patientType` string.
    pub fn to_wire(self) -> &'static str {
        match self {
            PatientType::Balita => "balita",
            PatientType::IbuHamil => "ibu_hamil",
        }
    }

    /// Human-readable Indonesian label, as used in headings and report
    /// filenames.
    pub fn label(self) -> &'static str {
        match self {
            PatientType::Balita => "Balita",
            PatientType::IbuHamil => "Ibu Hamil",
        }
    }
}

impl Serialize for PatientType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for PatientType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientType::from_wire(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown patient type '{s}'")))
    }
}

/// Severity of an alert dialog, deciding its icon and colouring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Styling of a confirm dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmStyle {
    Danger,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_known_values() {
        for wire in ["meja1", "meja2", "meja3"] {
            assert_eq!(Role::from_wire(wire).to_wire(), wire);
        }
    }

    #[test]
    fn unknown_role_is_tolerated() {
        assert_eq!(Role::from_wire("admin"), Role::Unknown);
        assert_eq!(Role::from_wire(""), Role::Unknown);
    }

    #[test]
    fn patient_type_wire_strings() {
        assert_eq!(PatientType::Balita.to_wire(), "balita");
        assert_eq!(PatientType::IbuHamil.to_wire(), "ibu_hamil");
        assert_eq!(PatientType::from_wire("ibu_hamil"), Some(PatientType::IbuHamil));
        assert_eq!(PatientType::from_wire("lansia"), None);
    }

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Siti  ").unwrap().as_str(), "Siti");
        assert!(NonEmptyText::new("   ").is_err());
    }
}
