//! Terminal rendering of patient lists, checkup queues, measurement forms
//! and the dashboard.

use std::io::{self, Write};

use posyandu_api::{
    CheckupItem, FetchGuard, FetchTicket, MeasurementRecord, PatientStats, PatientSummary,
    StuntingStats, TrendPoint,
};
use posyandu_core::{
    can_see_field, form_fields, is_calculated_field, month_name, should_show_as_info,
    EditableFields,
};
use posyandu_types::{PatientType, Role};

fn text_or_dash(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-".to_string(),
    }
}

pub fn patient_table(out: &mut impl Write, patients: &[PatientSummary]) -> io::Result<()> {
    if patients.is_empty() {
        writeln!(out, "Belum ada data pasien.")?;
        return Ok(());
    }
    writeln!(out, "{:<6} {:<12} {:<25} {:<25} {:<4}", "ID", "Jenis", "Nama", "Ibu/Suami", "RT")?;
    for patient in patients {
        let kind = patient
            .patient_type
            .map(|t| t.label())
            .unwrap_or("-");
        let partner = patient
            .mother_name
            .clone()
            .or_else(|| patient.nama_suami.clone());
        writeln!(
            out,
            "{:<6} {:<12} {:<25} {:<25} {:<4}",
            patient.id,
            kind,
            text_or_dash(patient.name.clone()),
            text_or_dash(partner),
            text_or_dash(patient.rt.clone()),
        )?;
    }
    Ok(())
}

pub fn checkup_table(out: &mut impl Write, items: &[CheckupItem]) -> io::Result<()> {
    if items.is_empty() {
        writeln!(out, "Tidak ada antrian pemeriksaan untuk periode ini.")?;
        return Ok(());
    }
    writeln!(out, "{:<6} {:<25} {:<25} {:<4} {:<8}", "ID", "Nama", "Ibu", "RT", "Status")?;
    for item in items {
        let patient = item.patient.clone().unwrap_or_default();
        let status = if item.is_complete() { "Selesai" } else { "Belum" };
        writeln!(
            out,
            "{:<6} {:<25} {:<25} {:<4} {:<8}",
            item.id,
            text_or_dash(patient.name),
            text_or_dash(patient.mother_name),
            text_or_dash(patient.rt),
            status,
        )?;
    }
    Ok(())
}

/// The measurement form for one checkup session, gated by desk role.
///
/// Meja 3 first gets the measurement block as read-only information, then
/// its own counseling fields. Server-calculated fields are tagged AUTO and
/// fields outside the server's editable list are tagged as locked.
pub fn measurement_view(
    out: &mut impl Write,
    role: Role,
    patient_type: PatientType,
    record: &MeasurementRecord,
    editable: &EditableFields,
) -> io::Result<()> {
    if role == Role::Meja3 {
        let info: Vec<&str> = form_fields(patient_type)
            .iter()
            .copied()
            .filter(|field| should_show_as_info(role, field))
            .collect();
        if !info.is_empty() {
            writeln!(out, "Hasil pengukuran (hanya baca):")?;
            for field in info {
                writeln!(out, "  {field}: {}", text_or_dash(record.field_str(field)))?;
            }
            writeln!(out)?;
        }
    }

    for field in form_fields(patient_type) {
        if !can_see_field(role, field) {
            continue;
        }
        if role == Role::Meja3 && should_show_as_info(role, field) {
            continue;
        }
        let marker = if is_calculated_field(field) {
            " (AUTO)"
        } else if !editable.is_editable(field) {
            " (terkunci)"
        } else {
            ""
        };
        writeln!(out, "{field}{marker}: {}", text_or_dash(record.field_str(field)))?;
    }
    Ok(())
}

/// Dashboard state. Each section keeps its own fetch guard so a slow
/// response for an old month/year filter can never overwrite the data of
/// the current one; stale results are dropped and the previous state is
/// kept.
#[derive(Debug, Default)]
pub struct Dashboard {
    patients_guard: FetchGuard,
    stunting_guard: FetchGuard,
    trends_guard: FetchGuard,
    patients: PatientStats,
    stunting: StuntingStats,
    trends: Vec<TrendPoint>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_patients_fetch(&self) -> FetchTicket {
        self.patients_guard.begin()
    }

    pub fn begin_stunting_fetch(&self) -> FetchTicket {
        self.stunting_guard.begin()
    }

    pub fn begin_trends_fetch(&self) -> FetchTicket {
        self.trends_guard.begin()
    }

    /// Apply a completed fetch; returns false when the result was stale
    /// and dropped.
    pub fn apply_patients(&mut self, ticket: FetchTicket, stats: PatientStats) -> bool {
        if !self.patients_guard.is_current(ticket) {
            tracing::debug!("dropping stale patient statistics");
            return false;
        }
        self.patients = stats;
        true
    }

    pub fn apply_stunting(&mut self, ticket: FetchTicket, stats: StuntingStats) -> bool {
        if !self.stunting_guard.is_current(ticket) {
            tracing::debug!("dropping stale stunting statistics");
            return false;
        }
        self.stunting = stats;
        true
    }

    pub fn apply_trends(&mut self, ticket: FetchTicket, trends: Vec<TrendPoint>) -> bool {
        if !self.trends_guard.is_current(ticket) {
            tracing::debug!("dropping stale trend data");
            return false;
        }
        self.trends = trends;
        true
    }

    pub fn render(
        &self,
        out: &mut impl Write,
        kader_name: &str,
        month: u32,
        year: i32,
    ) -> io::Result<()> {
        writeln!(out, "Selamat datang, {kader_name}")?;
        writeln!(out, "Periode: {} {year}", month_name(month))?;
        writeln!(out)?;
        writeln!(out, "Jumlah pasien")?;
        writeln!(out, "  Balita    : {}", self.patients.jumlah_balita)?;
        writeln!(out, "  Ibu hamil : {}", self.patients.jumlah_ibu_hamil)?;
        writeln!(out, "  Total     : {}", self.patients.total_pasien)?;
        writeln!(out)?;
        writeln!(out, "Status stunting")?;
        writeln!(
            out,
            "  Balita    : {} stunting / {} tidak stunting",
            self.stunting.balita.stunting, self.stunting.balita.tidak_stunting
        )?;
        writeln!(
            out,
            "  Ibu hamil : {} stunting / {} tidak stunting",
            self.stunting.ibu_hamil.stunting, self.stunting.ibu_hamil.tidak_stunting
        )?;
        if !self.trends.is_empty() {
            writeln!(out)?;
            writeln!(out, "Tren tahunan")?;
            for point in &self.trends {
                writeln!(
                    out,
                    "  {:<12} balita {}/{}  ibu hamil {}/{}",
                    point.name,
                    point.balita_stunting,
                    point.balita_tidak_stunting,
                    point.ibu_hamil_stunting,
                    point.ibu_hamil_tidak_stunting,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> MeasurementRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn meja3_sees_measurements_as_info_and_edits_counseling_only() {
        let record = record(r#"{"weightKg":"8.5","heightCm":"72","counselingNotes":"Perlu ASI"}"#);
        let editable = EditableFields::new(vec!["counselingNotes".to_string(), "resiko".to_string()]);

        let mut out = Vec::new();
        measurement_view(&mut out, Role::Meja3, PatientType::Balita, &record, &editable).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Hasil pengukuran (hanya baca):"));
        assert!(text.contains("  weightKg: 8.5"));
        assert!(text.contains("counselingNotes: Perlu ASI"));
        // The measurement fields never render as editable lines for meja 3.
        assert!(!text.contains("weightKg (terkunci)"));
    }

    #[test]
    fn meja2_never_sees_counseling_fields() {
        let record = record(r#"{"weightKg":"8.5","counselingNotes":"rahasia"}"#);
        let editable = EditableFields::new(vec!["weightKg".to_string()]);

        let mut out = Vec::new();
        measurement_view(&mut out, Role::Meja2, PatientType::Balita, &record, &editable).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("weightKg: 8.5"));
        assert!(!text.contains("counselingNotes"));
        assert!(!text.contains("rahasia"));
    }

    #[test]
    fn calculated_fields_are_marked_auto() {
        let record = record(r#"{"statusGizi":"Gizi Baik"}"#);
        let editable = EditableFields::new(vec!["weightKg".to_string()]);

        let mut out = Vec::new();
        measurement_view(&mut out, Role::Meja1, PatientType::Balita, &record, &editable).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("statusGizi (AUTO): Gizi Baik"));
        assert!(text.contains("heightCm (terkunci)"));
    }

    #[test]
    fn stale_dashboard_results_are_dropped() {
        let mut dashboard = Dashboard::new();

        let slow = dashboard.begin_stunting_fetch();
        let fast = dashboard.begin_stunting_fetch();

        let fresh: StuntingStats =
            serde_json::from_str(r#"{"balita":{"stunting":2,"tidakStunting":30}}"#).unwrap();
        assert!(dashboard.apply_stunting(fast, fresh));

        let stale: StuntingStats =
            serde_json::from_str(r#"{"balita":{"stunting":99,"tidakStunting":0}}"#).unwrap();
        assert!(!dashboard.apply_stunting(slow, stale));

        // The fresher result is still in place.
        assert_eq!(dashboard.stunting.balita.stunting, 2);
    }

    #[test]
    fn checkup_table_shows_completion_status() {
        let items: Vec<CheckupItem> = serde_json::from_str(
            r#"[
                {"id":1,"patient":{"name":"Andi","motherName":"Siti","rt":"4"},"completed":true},
                {"id":2,"patient":{"name":"Budi","motherName":"Wati","rt":"5"},"isDataComplete":false}
            ]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        checkup_table(&mut out, &items).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Selesai"));
        assert!(text.contains("Belum"));
    }
}
