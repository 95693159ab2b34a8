//! Role-based field access rules for the checkup workflow.
//!
//! Responsibilities:
//! - Decide which measurement fields a desk role may see at all
//! - Decide which fields render as read-only info for the counseling desk
//! - Wrap the server-supplied list of currently editable fields
//!
//! These rules must match the backend's editing permissions exactly:
//! incorrect gating would leak protected counseling notes to desk roles
//! that are not authorised to read them. Visibility is a pure function of
//! role and field name; editability is *never* derived from the role for
//! data-entry fields, only from the per-session list the server returns.

use posyandu_types::{PatientType, Role};

/// Fields reserved for the counseling desk (meja 3).
pub const COUNSELING_FIELDS: [&str; 2] = ["counselingNotes", "resiko"];

/// Fields the server computes; shown but never editable by anyone.
pub const CALCULATED_FIELDS: [&str; 4] =
    ["statusGizi", "zScoreBMIU", "zScoreBMIPregnant", "stuntingStatus"];

/// Measurement and auto fields captured at meja 2, across both patient
/// categories. For meja 3 these render as a read-only info block.
const MEJA2_FIELDS: [&str; 23] = [
    "ageMonths",
    "weightKg",
    "heightCm",
    "headCircCm",
    "lilaCm",
    "asi",
    "vitaminA",
    "statusGizi",
    "stuntingStatus",
    "ageMonthsPregnant",
    "weightKgPregnant",
    "heightCmPregnant",
    "lilaCmPregnant",
    "tekananDarah",
    "proteinUrine",
    "reduksiUrine",
    "testHiv",
    "testSifilis",
    "testHbsAg",
    "gds",
    "ancTerpadu",
    "HB",
    "zScoreBMIPregnant",
];

/// Edit-form field order for a balita checkup.
pub const BALITA_FORM_FIELDS: [&str; 10] = [
    "ageMonths",
    "weightKg",
    "heightCm",
    "headCircCm",
    "lilaCm",
    "asi",
    "vitaminA",
    "statusGizi",
    "stuntingStatus",
    "counselingNotes",
];

/// Edit-form field order for an ibu hamil checkup.
pub const IBU_HAMIL_FORM_FIELDS: [&str; 16] = [
    "ageMonthsPregnant",
    "weightKgPregnant",
    "heightCmPregnant",
    "lilaCmPregnant",
    "tekananDarah",
    "proteinUrine",
    "reduksiUrine",
    "testHiv",
    "testSifilis",
    "testHbsAg",
    "gds",
    "ancTerpadu",
    "HB",
    "zScoreBMIPregnant",
    "resiko",
    "counselingNotes",
];

/// Returns whether `role` may see `field` at all.
///
/// - Meja 1 (registration) sees every field.
/// - Meja 2 (measurement) sees everything except the counseling fields.
/// - Meja 3 (counseling) sees only the counseling fields.
/// - Any other role sees nothing.
pub fn can_see_field(role: Role, field: &str) -> bool {
    match role {
        Role::Meja1 => true,
        Role::Meja2 => !COUNSELING_FIELDS.contains(&field),
        Role::Meja3 => COUNSELING_FIELDS.contains(&field),
        Role::Unknown => false,
    }
}

/// Returns whether `field` should render as a read-only info line for
/// `role` in the edit view. Only meja 3 gets the meja-2 measurement block
/// as information; every other role renders fields normally.
pub fn should_show_as_info(role: Role, field: &str) -> bool {
    role == Role::Meja3 && MEJA2_FIELDS.contains(&field)
}

/// Returns whether the server computes `field` (auto fields are displayed
/// alongside editable ones regardless of the editable list).
pub fn is_calculated_field(field: &str) -> bool {
    CALCULATED_FIELDS.contains(&field)
}

/// Edit-form field order for the given patient category.
pub fn form_fields(patient_type: PatientType) -> &'static [&'static str] {
    match patient_type {
        PatientType::Balita => &BALITA_FORM_FIELDS,
        PatientType::IbuHamil => &IBU_HAMIL_FORM_FIELDS,
    }
}

/// The server-supplied list of fields currently editable for one checkup
/// session (a field disappears from the list once the session is marked
/// complete). Absence from the list means read-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditableFields(Vec<String>);

impl EditableFields {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    /// A field is displayed when it is editable for this session or when
    /// the server computes it.
    pub fn should_display(&self, field: &str) -> bool {
        self.is_editable(field) || is_calculated_field(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meja1_sees_everything() {
        for field in IBU_HAMIL_FORM_FIELDS {
            assert!(can_see_field(Role::Meja1, field));
        }
        for field in BALITA_FORM_FIELDS {
            assert!(can_see_field(Role::Meja1, field));
        }
    }

    #[test]
    fn meja2_and_meja3_partition_the_counseling_fields() {
        assert!(!can_see_field(Role::Meja2, "resiko"));
        assert!(can_see_field(Role::Meja3, "resiko"));
        assert!(!can_see_field(Role::Meja2, "counselingNotes"));
        assert!(can_see_field(Role::Meja3, "counselingNotes"));

        for field in IBU_HAMIL_FORM_FIELDS {
            if COUNSELING_FIELDS.contains(&field) {
                continue;
            }
            assert!(can_see_field(Role::Meja2, field), "meja2 should see {field}");
            assert!(!can_see_field(Role::Meja3, field), "meja3 should not see {field}");
        }
    }

    #[test]
    fn unknown_role_sees_nothing() {
        for field in IBU_HAMIL_FORM_FIELDS.iter().chain(BALITA_FORM_FIELDS.iter()) {
            assert!(!can_see_field(Role::Unknown, field));
        }
    }

    #[test]
    fn meja3_gets_measurement_fields_as_info_only() {
        assert!(should_show_as_info(Role::Meja3, "weightKg"));
        assert!(should_show_as_info(Role::Meja3, "tekananDarah"));
        assert!(!should_show_as_info(Role::Meja3, "counselingNotes"));
        assert!(!should_show_as_info(Role::Meja2, "weightKg"));
        assert!(!should_show_as_info(Role::Meja1, "weightKg"));
    }

    #[test]
    fn editability_comes_only_from_the_server_list() {
        let editable = EditableFields::new(vec!["counselingNotes".into()]);
        assert!(editable.is_editable("counselingNotes"));
        assert!(!editable.is_editable("weightKg"));

        // Calculated fields display even when frozen.
        assert!(editable.should_display("statusGizi"));
        assert!(!editable.should_display("weightKg"));
    }
}
