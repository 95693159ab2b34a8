//! Excel report export naming and request parameters.
//!
//! The server renders the spreadsheets; the client only chooses the report
//! kind, builds the query parameters for the selected period and decides
//! the local file name for the downloaded bytes.

use posyandu_types::PatientType;

/// Indonesian month names, indexed by month number minus one.
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Selectable report years.
pub const REPORT_YEARS: [i32; 5] = [2023, 2024, 2025, 2026, 2027];

/// Which of the two server-side reports to download.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Monthly recap for the supervising puskesmas, per patient category.
    Puskesmas,
    /// Benefit-recipient list, always covering pregnant women.
    PenerimaManfaat,
}

impl ReportKind {
    pub fn endpoint_path(self) -> &'static str {
        match self {
            ReportKind::Puskesmas => "/api/measurement/export/puskesmas",
            ReportKind::PenerimaManfaat => "/api/measurement/export/penerima-manfaat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Puskesmas => "Puskesmas",
            ReportKind::PenerimaManfaat => "Penerima Manfaat",
        }
    }
}

/// Zero-padded two-digit month, as the query parameter expects.
pub fn padded_month(month: u32) -> String {
    format!("{month:02}")
}

/// Month name for display and filenames; out-of-range numbers fall back to
/// the padded numeric form.
pub fn month_name(month: u32) -> String {
    match MONTH_NAMES.get(month.wrapping_sub(1) as usize) {
        Some(name) => (*name).to_string(),
        None => padded_month(month),
    }
}

/// Query string for an export request. The puskesmas report is filtered by
/// patient category; the benefit-recipient report is not.
pub fn export_query(kind: ReportKind, month: u32, year: i32, patient_type: PatientType) -> String {
    let month = padded_month(month);
    match kind {
        ReportKind::Puskesmas => format!(
            "month={month}&year={year}&patientType={}",
            patient_type.to_wire()
        ),
        ReportKind::PenerimaManfaat => format!("month={month}&year={year}"),
    }
}

/// Local file name for a downloaded report.
pub fn export_filename(kind: ReportKind, month: u32, year: i32, patient_type: PatientType) -> String {
    let month_name = month_name(month);
    match kind {
        ReportKind::Puskesmas => format!(
            "Laporan_Puskesmas_{}_{month_name}_{year}.xlsx",
            patient_type.label()
        ),
        ReportKind::PenerimaManfaat => {
            format!("Penerima_Manfaat_Ibu_Hamil_{month_name}_{year}.xlsx")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posyandu_types::PatientType::{Balita, IbuHamil};

    #[test]
    fn month_names_cover_the_calendar() {
        assert_eq!(month_name(1), "Januari");
        assert_eq!(month_name(12), "Desember");
        // Out of range falls back to the padded number.
        assert_eq!(month_name(0), "00");
        assert_eq!(month_name(13), "13");
    }

    #[test]
    fn puskesmas_query_carries_the_patient_category() {
        assert_eq!(
            export_query(ReportKind::Puskesmas, 3, 2025, Balita),
            "month=03&year=2025&patientType=balita"
        );
        assert_eq!(
            export_query(ReportKind::Puskesmas, 11, 2025, IbuHamil),
            "month=11&year=2025&patientType=ibu_hamil"
        );
    }

    #[test]
    fn penerima_manfaat_query_ignores_the_patient_category() {
        assert_eq!(
            export_query(ReportKind::PenerimaManfaat, 3, 2025, Balita),
            "month=03&year=2025"
        );
    }

    #[test]
    fn filenames_follow_the_report_kind() {
        assert_eq!(
            export_filename(ReportKind::Puskesmas, 2, 2025, Balita),
            "Laporan_Puskesmas_Balita_Februari_2025.xlsx"
        );
        assert_eq!(
            export_filename(ReportKind::Puskesmas, 2, 2025, IbuHamil),
            "Laporan_Puskesmas_Ibu Hamil_Februari_2025.xlsx"
        );
        assert_eq!(
            export_filename(ReportKind::PenerimaManfaat, 2, 2025, IbuHamil),
            "Penerima_Manfaat_Ibu_Hamil_Februari_2025.xlsx"
        );
    }
}
