//! Input validation rules.
//!
//! Pure, deterministic field validators for the checkup measurement form
//! and the patient registration form. Each rule maps a raw input string to
//! an Indonesian error message, or `None` when the value is acceptable.
//! Blank input is always valid at the field level; required-field presence
//! is enforced separately at submit time (see [`crate::patient`]).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use posyandu_types::PatientType;

use crate::access::EditableFields;

/// Inclusive numeric bounds with per-field message text.
struct RangeRule {
    label: &'static str,
    max: f64,
    too_high: &'static str,
    /// Lower bound and its message; `None` when zero is acceptable.
    low: Option<(f64, &'static str)>,
}

impl RangeRule {
    fn apply(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let value: f64 = match raw.parse() {
            Ok(v) => v,
            Err(_) => return Some(format!("{} harus berupa angka", self.label)),
        };
        if value < 0.0 {
            return Some(format!("{} tidak boleh negatif", self.label));
        }
        if value > self.max {
            return Some(self.too_high.to_string());
        }
        if let Some((min, too_low)) = self.low {
            if value < min {
                return Some(too_low.to_string());
            }
        }
        None
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Measurement fields validated at submit time for each patient category.
pub fn validated_measurement_fields(patient_type: PatientType) -> &'static [&'static str] {
    match patient_type {
        PatientType::Balita => &["weightKg", "heightCm", "headCircCm", "lilaCm"],
        PatientType::IbuHamil => &[
            "ageMonthsPregnant",
            "weightKgPregnant",
            "heightCmPregnant",
            "lilaCmPregnant",
            "tekananDarah",
            "gds",
            "HB",
        ],
    }
}

/// Validates a single measurement field value.
///
/// Returns the error message on violation, or `None` for valid and for
/// blank input (blank means "not yet provided"). Fields without a rule are
/// always accepted.
pub fn validate_measurement_field(
    patient_type: PatientType,
    field: &str,
    raw: &str,
) -> Option<String> {
    match patient_type {
        PatientType::Balita => match field {
            "weightKg" => RangeRule {
                label: "Berat badan",
                max: 50.0,
                too_high: "Berat badan tidak masuk akal (maksimal 50 kg untuk balita)",
                low: Some((1.0, "Berat badan terlalu rendah (minimal 1 kg)")),
            }
            .apply(raw),
            "heightCm" => RangeRule {
                label: "Tinggi badan",
                max: 150.0,
                too_high: "Tinggi badan tidak masuk akal (maksimal 150 cm untuk balita)",
                low: Some((30.0, "Tinggi badan terlalu rendah (minimal 30 cm)")),
            }
            .apply(raw),
            "headCircCm" => RangeRule {
                label: "Lingkar kepala",
                max: 60.0,
                too_high: "Lingkar kepala tidak masuk akal (maksimal 60 cm)",
                low: Some((25.0, "Lingkar kepala terlalu rendah (minimal 25 cm)")),
            }
            .apply(raw),
            "lilaCm" => RangeRule {
                label: "LILA",
                max: 30.0,
                too_high: "LILA tidak masuk akal (maksimal 30 cm)",
                low: Some((8.0, "LILA terlalu rendah (minimal 8 cm)")),
            }
            .apply(raw),
            _ => None,
        },
        PatientType::IbuHamil => match field {
            "ageMonthsPregnant" => validate_pregnancy_age(raw),
            "weightKgPregnant" => RangeRule {
                label: "Berat badan",
                max: 200.0,
                too_high: "Berat badan tidak masuk akal (maksimal 200 kg)",
                low: Some((30.0, "Berat badan terlalu rendah (minimal 30 kg)")),
            }
            .apply(raw),
            "heightCmPregnant" => RangeRule {
                label: "Tinggi badan",
                max: 220.0,
                too_high: "Tinggi badan tidak masuk akal (maksimal 220 cm)",
                low: Some((130.0, "Tinggi badan terlalu rendah (minimal 130 cm)")),
            }
            .apply(raw),
            "lilaCmPregnant" => RangeRule {
                label: "LILA",
                max: 50.0,
                too_high: "LILA tidak masuk akal (maksimal 50 cm)",
                low: Some((15.0, "LILA terlalu rendah (minimal 15 cm)")),
            }
            .apply(raw),
            "tekananDarah" => validate_blood_pressure(raw),
            "gds" => RangeRule {
                label: "GDS",
                max: 600.0,
                too_high: "GDS tidak masuk akal (maksimal 600 mg/dL)",
                low: None,
            }
            .apply(raw),
            "HB" => RangeRule {
                label: "HB",
                max: 20.0,
                too_high: "HB tidak masuk akal (maksimal 20 g/dL)",
                low: Some((5.0, "HB terlalu rendah (minimal 5 g/dL)")),
            }
            .apply(raw),
            "resiko" => {
                if raw.chars().count() > 50 {
                    Some("Resiko maksimal 50 karakter".to_string())
                } else {
                    None
                }
            }
            _ => None,
        },
    }
}

fn validate_pregnancy_age(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let months: i64 = match raw.parse() {
        Ok(v) => v,
        Err(_) => return Some("Usia kehamilan harus berupa angka".to_string()),
    };
    if months < 0 {
        return Some("Usia kehamilan tidak boleh negatif".to_string());
    }
    if months > 9 {
        return Some("Usia kehamilan tidak boleh lebih dari 9 bulan".to_string());
    }
    None
}

/// Validates a blood pressure reading of the form `NNN/NN` (two to three
/// digits each side). Systolic must be 70-250 mmHg, diastolic 40-150 mmHg,
/// and systolic strictly greater than diastolic.
pub fn validate_blood_pressure(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = raw.split('/').collect();
    let well_formed = parts.len() == 2
        && parts
            .iter()
            .all(|p| (2..=3).contains(&p.len()) && is_digits(p));
    if !well_formed {
        return Some("Format tekanan darah harus seperti 120/80".to_string());
    }

    // Lengths are bounded, so these cannot overflow.
    let systolic: u32 = parts[0].parse().ok()?;
    let diastolic: u32 = parts[1].parse().ok()?;

    if !(70..=250).contains(&systolic) {
        return Some("Tekanan sistolik tidak normal (70-250 mmHg)".to_string());
    }
    if !(40..=150).contains(&diastolic) {
        return Some("Tekanan diastolik tidak normal (40-150 mmHg)".to_string());
    }
    if systolic <= diastolic {
        return Some("Tekanan sistolik harus lebih besar dari diastolik".to_string());
    }
    None
}

/// Validates every editable, non-blank measurement field at submit time.
///
/// Only fields the server currently allows editing are checked, mirroring
/// the edit form: frozen fields cannot carry fresh mistakes.
pub fn validate_measurement_form(
    patient_type: PatientType,
    editable: &EditableFields,
    values: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    for &field in validated_measurement_fields(patient_type) {
        if !editable.is_editable(field) {
            continue;
        }
        let Some(raw) = values.get(field) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(message) = validate_measurement_field(patient_type, field, raw) {
            errors.insert(field.to_string(), message);
        }
    }
    errors
}

/// Login form validation: both fields required, password at least six
/// characters.
pub fn validate_login(username: &str, password: &str) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    if username.trim().is_empty() {
        errors.insert("username".to_string(), "Username wajib diisi".to_string());
    }
    if password.trim().is_empty() {
        errors.insert("password".to_string(), "Password wajib diisi".to_string());
    } else if password.chars().count() < 6 {
        errors.insert(
            "password".to_string(),
            "Password minimal 6 karakter".to_string(),
        );
    }
    errors
}

fn is_name_like(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '-'))
}

fn validate_name(raw: &str, label: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() < 3 {
        return Some(format!("{label} minimal 3 karakter"));
    }
    if trimmed.chars().count() > 100 {
        return Some(format!("{label} maksimal 100 karakter"));
    }
    if !is_name_like(raw) {
        return Some("Nama hanya boleh mengandung huruf dan spasi".to_string());
    }
    None
}

fn validate_digit_range(
    raw: &str,
    label: &str,
    min: i64,
    max: i64,
    too_low: &str,
    too_high: &str,
) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if !is_digits(raw) {
        return Some(format!("{label} harus berupa angka"));
    }
    // Absurdly long digit strings overflow the parse; treat as too high.
    let value: i64 = match raw.parse() {
        Ok(v) => v,
        Err(_) => return Some(too_high.to_string()),
    };
    if value < min {
        return Some(too_low.to_string());
    }
    if value > max {
        return Some(too_high.to_string());
    }
    None
}

fn validate_exact_digits(raw: &str, label: &str, digits: usize) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if !is_digits(raw) {
        return Some(format!("{label} hanya boleh berisi angka"));
    }
    if raw.len() < digits {
        return Some(format!("{label} harus {digits} digit"));
    }
    if raw.len() > digits {
        return Some(format!("{label} tidak boleh lebih dari {digits} digit"));
    }
    None
}

/// Parse a `YYYY-MM-DD` form value, tolerating blanks.
fn parse_form_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Format tanggal tidak valid (YYYY-MM-DD)".to_string())
}

/// Fractional age in years at `today`, matching the original day-count
/// arithmetic (days / 365).
fn age_in_years_fractional(birth: NaiveDate, today: NaiveDate) -> f64 {
    (today - birth).num_days() as f64 / 365.0
}

fn validate_birth_date(raw: &str, patient_type: PatientType, today: NaiveDate) -> Option<String> {
    let birth = match parse_form_date(raw) {
        Ok(Some(d)) => d,
        Ok(None) => return None,
        Err(msg) => return Some(msg),
    };
    if birth > today {
        return Some("Tanggal lahir tidak boleh lebih dari hari ini".to_string());
    }
    let age = age_in_years_fractional(birth, today);
    match patient_type {
        PatientType::Balita => {
            if age > 5.0 {
                return Some("Usia anak melebihi 5 tahun (bukan kategori balita)".to_string());
            }
        }
        PatientType::IbuHamil => {
            if age < 15.0 {
                return Some("Usia ibu terlalu muda (minimal 15 tahun)".to_string());
            }
            if age > 55.0 {
                return Some("Usia ibu melebihi batas wajar untuk kehamilan".to_string());
            }
        }
    }
    None
}

fn validate_not_future(raw: &str, today: NaiveDate, too_late: &str) -> Option<String> {
    match parse_form_date(raw) {
        Ok(Some(d)) if d > today => Some(too_late.to_string()),
        Ok(_) => None,
        Err(msg) => Some(msg),
    }
}

fn validate_due_date(raw: &str, today: NaiveDate) -> Option<String> {
    let due = match parse_form_date(raw) {
        Ok(Some(d)) => d,
        Ok(None) => return None,
        Err(msg) => return Some(msg),
    };
    if due < today {
        return Some("HPL harus tanggal di masa depan".to_string());
    }
    let one_year_from_now = today
        .checked_add_months(chrono::Months::new(12))
        .unwrap_or(today);
    if due > one_year_from_now {
        return Some("HPL tidak wajar (lebih dari 1 tahun dari sekarang)".to_string());
    }
    None
}

/// Validates a single patient registration field.
///
/// `today` is injected so that age and future-date checks are
/// deterministic. Blank input is valid; required-field presence is checked
/// by the full-form validator.
pub fn validate_patient_field(
    patient_type: PatientType,
    field: &str,
    raw: &str,
    today: NaiveDate,
) -> Option<String> {
    match patient_type {
        PatientType::Balita => match field {
            "name" => validate_name(raw, "Nama anak"),
            "motherName" => validate_name(raw, "Nama ibu"),
            "rt" => validate_digit_range(raw, "RT", 1, 999, "RT minimal 1", "RT maksimal 999"),
            "birthDate" => validate_birth_date(raw, patient_type, today),
            _ => None,
        },
        PatientType::IbuHamil => match field {
            "name" => validate_name(raw, "Nama ibu"),
            "namaSuami" => validate_name(raw, "Nama suami"),
            "nik" => validate_exact_digits(raw, "NIK", 16),
            "noKK" => validate_exact_digits(raw, "No KK", 16),
            "rt" => validate_digit_range(raw, "RT", 1, 999, "RT minimal 1", "RT maksimal 999"),
            "birthDate" => validate_birth_date(raw, patient_type, today),
            "gravida" => validate_digit_range(
                raw,
                "Gravida",
                1,
                15,
                "Gravida minimal 1",
                "Gravida maksimal 15",
            ),
            "partus" => validate_digit_range(
                raw,
                "Partus",
                0,
                10,
                "Partus minimal 0",
                "Partus maksimal 10",
            ),
            "abortus" => validate_digit_range(
                raw,
                "Abortus",
                0,
                5,
                "Abortus minimal 0",
                "Abortus maksimal 5",
            ),
            "jarakPersalinanSebelumnya" => validate_digit_range(
                raw,
                "Jarak persalinan",
                0,
                240,
                "Jarak persalinan minimal 0 bulan",
                "Jarak persalinan tidak wajar (maksimal 240 bulan/20 tahun)",
            ),
            "usiaKandunganMinggu" => validate_digit_range(
                raw,
                "Usia kandungan",
                1,
                42,
                "Usia kandungan minimal 1 minggu",
                "Usia kandungan maksimal 42 minggu",
            ),
            "tglPemeriksaanPertama" => validate_not_future(
                raw,
                today,
                "Tanggal pemeriksaan tidak boleh lebih dari hari ini",
            ),
            "hpm" => validate_not_future(raw, today, "HPM tidak boleh lebih dari hari ini"),
            "hpl" => validate_due_date(raw, today),
            "nomorJaminan" => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if !is_digits(trimmed) {
                    return Some("Nomor jaminan hanya boleh berisi angka".to_string());
                }
                if trimmed.len() < 9 {
                    return Some("Nomor jaminan minimal 9 digit".to_string());
                }
                if trimmed.len() > 11 {
                    return Some("Nomor jaminan maksimal 11 digit".to_string());
                }
                None
            }
            "noTelp" => {
                if raw.is_empty() {
                    return None;
                }
                if !is_digits(raw) {
                    return Some("No telepon hanya boleh berisi angka".to_string());
                }
                if raw.len() < 10 {
                    return Some("No telepon minimal 10 digit".to_string());
                }
                if raw.len() > 13 {
                    return Some("No telepon maksimal 13 digit".to_string());
                }
                None
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posyandu_types::PatientType::{Balita, IbuHamil};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn blank_measurement_input_is_always_valid() {
        assert_eq!(validate_measurement_field(Balita, "weightKg", ""), None);
        assert_eq!(validate_measurement_field(IbuHamil, "tekananDarah", "  "), None);
    }

    #[test]
    fn weight_bounds_for_balita() {
        assert!(validate_measurement_field(Balita, "weightKg", "0.5")
            .unwrap()
            .contains("terlalu rendah"));
        assert_eq!(validate_measurement_field(Balita, "weightKg", "10"), None);
        assert!(validate_measurement_field(Balita, "weightKg", "51")
            .unwrap()
            .contains("maksimal 50"));
        assert!(validate_measurement_field(Balita, "weightKg", "abc")
            .unwrap()
            .contains("harus berupa angka"));
        assert!(validate_measurement_field(Balita, "weightKg", "-2")
            .unwrap()
            .contains("negatif"));
    }

    #[test]
    fn inclusive_bounds_are_accepted() {
        assert_eq!(validate_measurement_field(Balita, "weightKg", "1"), None);
        assert_eq!(validate_measurement_field(Balita, "weightKg", "50"), None);
        assert_eq!(validate_measurement_field(Balita, "heightCm", "30"), None);
        assert_eq!(validate_measurement_field(Balita, "heightCm", "150"), None);
        assert_eq!(validate_measurement_field(IbuHamil, "HB", "5"), None);
        assert_eq!(validate_measurement_field(IbuHamil, "HB", "20"), None);
    }

    #[test]
    fn pregnancy_age_is_a_small_integer() {
        assert_eq!(validate_measurement_field(IbuHamil, "ageMonthsPregnant", "9"), None);
        assert!(validate_measurement_field(IbuHamil, "ageMonthsPregnant", "10")
            .unwrap()
            .contains("9 bulan"));
        assert!(validate_measurement_field(IbuHamil, "ageMonthsPregnant", "3.5").is_some());
    }

    #[test]
    fn blood_pressure_format_and_ordering() {
        assert_eq!(validate_blood_pressure("120/80"), None);
        assert!(validate_blood_pressure("80/120")
            .unwrap()
            .contains("lebih besar dari diastolik"));
        assert!(validate_blood_pressure("120/120")
            .unwrap()
            .contains("lebih besar dari diastolik"));
        assert!(validate_blood_pressure("12080").unwrap().contains("Format"));
        assert!(validate_blood_pressure("1200/80").unwrap().contains("Format"));
        assert!(validate_blood_pressure("ab/cd").unwrap().contains("Format"));
        assert!(validate_blood_pressure("300/80").unwrap().contains("sistolik"));
        assert!(validate_blood_pressure("120/30").unwrap().contains("diastolik"));
    }

    #[test]
    fn resiko_is_capped_at_fifty_characters() {
        let short = "a".repeat(50);
        let long = "a".repeat(51);
        assert_eq!(validate_measurement_field(IbuHamil, "resiko", &short), None);
        assert!(validate_measurement_field(IbuHamil, "resiko", &long).is_some());
    }

    #[test]
    fn form_validation_only_touches_editable_fields() {
        let editable = EditableFields::new(vec!["weightKg".into()]);
        let mut values = BTreeMap::new();
        values.insert("weightKg".to_string(), "0.5".to_string());
        values.insert("heightCm".to_string(), "999".to_string()); // frozen, ignored

        let errors = validate_measurement_form(Balita, &editable, &values);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("weightKg"));
    }

    #[test]
    fn login_requires_username_and_six_character_password() {
        assert!(validate_login("kader1", "rahasia1").is_empty());

        let errors = validate_login("", "12345");
        assert_eq!(errors.get("username").unwrap(), "Username wajib diisi");
        assert_eq!(errors.get("password").unwrap(), "Password minimal 6 karakter");

        let errors = validate_login("kader1", "   ");
        assert_eq!(errors.get("password").unwrap(), "Password wajib diisi");
    }

    #[test]
    fn names_need_three_letters_and_safe_characters() {
        let today = date("2025-06-01");
        assert!(validate_patient_field(Balita, "name", "Al", today)
            .unwrap()
            .contains("minimal 3"));
        assert_eq!(validate_patient_field(Balita, "name", "Siti Aminah", today), None);
        assert_eq!(validate_patient_field(Balita, "name", "O'Neil-Putra", today), None);
        assert!(validate_patient_field(Balita, "name", "Budi123", today)
            .unwrap()
            .contains("huruf dan spasi"));
    }

    #[test]
    fn identity_numbers_must_be_sixteen_digits() {
        let today = date("2025-06-01");
        assert_eq!(
            validate_patient_field(IbuHamil, "nik", "1234567890123456", today),
            None
        );
        assert!(validate_patient_field(IbuHamil, "nik", "123", today)
            .unwrap()
            .contains("16 digit"));
        assert!(validate_patient_field(IbuHamil, "noKK", "12345678901234567", today)
            .unwrap()
            .contains("lebih dari 16"));
        assert!(validate_patient_field(IbuHamil, "nik", "12345678901234ab", today)
            .unwrap()
            .contains("angka"));
    }

    #[test]
    fn balita_birth_date_category_bounds() {
        let today = date("2025-06-01");
        assert_eq!(validate_patient_field(Balita, "birthDate", "2022-03-10", today), None);
        assert!(validate_patient_field(Balita, "birthDate", "2018-01-01", today)
            .unwrap()
            .contains("melebihi 5 tahun"));
        assert!(validate_patient_field(Balita, "birthDate", "2026-01-01", today)
            .unwrap()
            .contains("hari ini"));
    }

    #[test]
    fn ibu_hamil_birth_date_category_bounds() {
        let today = date("2025-06-01");
        assert_eq!(validate_patient_field(IbuHamil, "birthDate", "1995-06-01", today), None);
        assert!(validate_patient_field(IbuHamil, "birthDate", "2015-06-01", today)
            .unwrap()
            .contains("terlalu muda"));
        assert!(validate_patient_field(IbuHamil, "birthDate", "1960-01-01", today)
            .unwrap()
            .contains("batas wajar"));
    }

    #[test]
    fn due_date_must_fall_within_the_next_year() {
        let today = date("2025-06-01");
        assert_eq!(validate_patient_field(IbuHamil, "hpl", "2025-12-01", today), None);
        assert!(validate_patient_field(IbuHamil, "hpl", "2025-01-01", today)
            .unwrap()
            .contains("masa depan"));
        assert!(validate_patient_field(IbuHamil, "hpl", "2026-07-01", today)
            .unwrap()
            .contains("tidak wajar"));
    }

    #[test]
    fn phone_number_length_bounds() {
        let today = date("2025-06-01");
        assert_eq!(validate_patient_field(IbuHamil, "noTelp", "0812345678", today), None);
        assert!(validate_patient_field(IbuHamil, "noTelp", "081234567", today)
            .unwrap()
            .contains("minimal 10"));
        assert!(validate_patient_field(IbuHamil, "noTelp", "08123456789012", today)
            .unwrap()
            .contains("maksimal 13"));
    }
}
