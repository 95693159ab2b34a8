//! Wire types for the backend's JSON payloads.
//!
//! Field names follow the server's camelCase (and occasionally snake_case)
//! spellings via serde renames. Measurement records are open-ended, so they
//! keep their values in a flattened map instead of a fixed struct.

use std::collections::BTreeMap;

use posyandu_core::{EditableFields, UserProfile};
use posyandu_types::PatientType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserProfile,
}

/// Patient counts for the dashboard header.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub jumlah_balita: u64,
    pub jumlah_ibu_hamil: u64,
    pub total_pasien: u64,
}

/// One row of the patient register.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub patient_type: Option<PatientType>,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub nama_suami: Option<String>,
    #[serde(default)]
    pub rt: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

/// Full patient record, used to prefill the edit form. Only identity and
/// category are fixed; everything else stays in the extras map under the
/// server's own keys.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub id: i64,
    #[serde(default)]
    pub patient_type: Option<PatientType>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PatientDetail {
    /// A field as display text; numbers are rendered, null becomes `None`.
    pub fn field_str(&self, key: &str) -> Option<String> {
        value_as_text(self.extra.get(key)?)
    }
}

/// Patient data embedded in a checkup row.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupPatient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub rt: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age_in_years: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

/// One queue entry for the selected month/year/category.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupItem {
    pub id: i64,
    #[serde(default)]
    pub patient: Option<CheckupPatient>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub is_data_complete: Option<bool>,
}

impl CheckupItem {
    /// Done when either completion flag is set.
    pub fn is_complete(&self) -> bool {
        self.completed.unwrap_or(false) || self.is_data_complete.unwrap_or(false)
    }

    /// Case-insensitive name search. For balita the mother's name matches
    /// too; for ibu hamil only the patient's own name.
    pub fn matches_search(&self, patient_type: PatientType, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        let Some(patient) = &self.patient else {
            return false;
        };
        let name_matches = patient
            .name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&keyword));
        match patient_type {
            PatientType::Balita => {
                name_matches
                    || patient
                        .mother_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&keyword))
            }
            PatientType::IbuHamil => name_matches,
        }
    }
}

/// Patient fields nested inside a measurement's checkup session.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub patient_type: Option<PatientType>,
}

/// The checkup session a measurement belongs to. The session date arrives
/// under either spelling depending on the endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CheckupSession {
    #[serde(default)]
    pub patient: Option<SessionPatient>,
    #[serde(default, rename = "sessionDate")]
    pub session_date_camel: Option<String>,
    #[serde(default, rename = "session_date")]
    pub session_date_snake: Option<String>,
}

impl CheckupSession {
    pub fn session_date(&self) -> Option<&str> {
        self.session_date_camel
            .as_deref()
            .or(self.session_date_snake.as_deref())
    }
}

/// A measurement record with its open-ended field values.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MeasurementRecord {
    #[serde(default)]
    pub checkup_session: Option<CheckupSession>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl MeasurementRecord {
    /// A measurement field as display text.
    pub fn field_str(&self, key: &str) -> Option<String> {
        value_as_text(self.values.get(key)?)
    }

    pub fn patient_birth_date(&self) -> Option<&str> {
        self.checkup_session
            .as_ref()?
            .patient
            .as_ref()?
            .birth_date
            .as_deref()
    }

    pub fn session_date(&self) -> Option<&str> {
        self.checkup_session.as_ref()?.session_date()
    }
}

/// Which fields the server still allows editing for one session.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditData {
    #[serde(default)]
    pub editable_fields: Vec<String>,
}

impl EditData {
    pub fn into_editable_fields(self) -> EditableFields {
        EditableFields::new(self.editable_fields)
    }
}

/// Server-side derivations returned alongside a measurement submission.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInfo {
    #[serde(default)]
    pub z_score: Option<Value>,
    #[serde(default)]
    pub stunting_status: Option<String>,
}

impl CalculationInfo {
    pub fn z_score_text(&self) -> Option<String> {
        value_as_text(self.z_score.as_ref()?)
    }
}

/// Response to a measurement submission. `calculationInfo` sits beside the
/// envelope fields rather than inside `data`, so this is decoded directly
/// instead of through the shared envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMeasurementResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<MeasurementRecord>,
    #[serde(default)]
    pub calculation_info: Option<CalculationInfo>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Stunting vs non-stunting counts for one patient category.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StuntingCount {
    #[serde(default)]
    pub stunting: u64,
    #[serde(default)]
    pub tidak_stunting: u64,
}

/// Monthly stunting statistics, keyed by category.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct StuntingStats {
    #[serde(default)]
    pub balita: StuntingCount,
    #[serde(default)]
    pub ibu_hamil: StuntingCount,
}

/// One bar group of the yearly trend chart.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balita_stunting: u64,
    #[serde(default)]
    pub balita_tidak_stunting: u64,
    #[serde(default)]
    pub ibu_hamil_stunting: u64,
    #[serde(default)]
    pub ibu_hamil_tidak_stunting: u64,
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkup_completion_uses_either_flag() {
        let both_unset: CheckupItem = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert!(!both_unset.is_complete());

        let completed: CheckupItem =
            serde_json::from_str(r#"{"id":1,"completed":true}"#).unwrap();
        assert!(completed.is_complete());

        let data_complete: CheckupItem =
            serde_json::from_str(r#"{"id":1,"isDataComplete":true}"#).unwrap();
        assert!(data_complete.is_complete());
    }

    #[test]
    fn balita_search_includes_the_mothers_name() {
        let item: CheckupItem = serde_json::from_str(
            r#"{"id":1,"patient":{"name":"Andi","motherName":"Siti Aminah"}}"#,
        )
        .unwrap();
        assert!(item.matches_search(PatientType::Balita, "siti"));
        assert!(!item.matches_search(PatientType::IbuHamil, "siti"));
        assert!(item.matches_search(PatientType::IbuHamil, "andi"));
        assert!(item.matches_search(PatientType::IbuHamil, ""));
    }

    #[test]
    fn session_date_tolerates_both_spellings() {
        let camel: MeasurementRecord = serde_json::from_str(
            r#"{"weightKg":"8.5","checkup_session":{"sessionDate":"2025-03-10","patient":{"birthDate":"2023-01-05"}}}"#,
        )
        .unwrap();
        assert_eq!(camel.session_date(), Some("2025-03-10"));
        assert_eq!(camel.patient_birth_date(), Some("2023-01-05"));
        assert_eq!(camel.field_str("weightKg").as_deref(), Some("8.5"));

        let snake: MeasurementRecord = serde_json::from_str(
            r#"{"checkup_session":{"session_date":"2025-03-11"}}"#,
        )
        .unwrap();
        assert_eq!(snake.session_date(), Some("2025-03-11"));
    }

    #[test]
    fn numeric_measurement_values_render_as_text() {
        let record: MeasurementRecord =
            serde_json::from_str(r#"{"weightKg":8.5,"counselingNotes":null}"#).unwrap();
        assert_eq!(record.field_str("weightKg").as_deref(), Some("8.5"));
        assert_eq!(record.field_str("counselingNotes"), None);
        assert_eq!(record.field_str("missing"), None);
    }

    #[test]
    fn stunting_stats_keep_the_snake_case_category_keys() {
        let stats: StuntingStats = serde_json::from_str(
            r#"{"balita":{"stunting":3,"tidakStunting":40},"ibu_hamil":{"stunting":1,"tidakStunting":12}}"#,
        )
        .unwrap();
        assert_eq!(stats.balita.tidak_stunting, 40);
        assert_eq!(stats.ibu_hamil.stunting, 1);
    }

    #[test]
    fn submit_response_carries_sibling_calculation_info() {
        let response: SubmitMeasurementResponse = serde_json::from_str(
            r#"{"success":true,"data":{"stuntingStatus":"Normal"},"calculationInfo":{"zScore":-1.2,"stuntingStatus":"Normal"}}"#,
        )
        .unwrap();
        let info = response.calculation_info.unwrap();
        assert_eq!(info.z_score_text().as_deref(), Some("-1.2"));
        assert_eq!(info.stunting_status.as_deref(), Some("Normal"));
        assert_eq!(
            response.data.unwrap().field_str("stuntingStatus").as_deref(),
            Some("Normal")
        );
    }

    #[test]
    fn patient_stats_decode_from_the_indonesian_keys() {
        let stats: PatientStats = serde_json::from_str(
            r#"{"jumlahBalita":10,"jumlahIbuHamil":4,"totalPasien":14}"#,
        )
        .unwrap();
        assert_eq!(stats.total_pasien, 14);
    }
}
