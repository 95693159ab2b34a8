//! Command handlers.
//!
//! Each handler loads the stored session, talks to the backend through the
//! injected transport and renders alerts or tables to the given writer.
//! Errors from the API are rendered as alerts, mirroring the dialogs of
//! the original interface, rather than aborting the process.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;
use posyandu_api::{ApiClient, ApiError, Transport};
use posyandu_core::{
    age_in_months, can_see_field, export_filename, validate_login, validate_measurement_form,
    BalitaForm, CoreConfig, IbuHamilForm, ReportKind, Session,
};
use posyandu_types::{AlertKind, ConfirmStyle, PatientType, Role};

use crate::dialog::{confirm, Alert};
use crate::views::{checkup_table, measurement_view, patient_table, Dashboard};

pub struct CommandContext<'a, T: Transport> {
    pub client: &'a ApiClient<T>,
    pub config: &'a CoreConfig,
    pub today: NaiveDate,
}

fn render_api_error(out: &mut impl Write, title: &str, err: &ApiError) -> anyhow::Result<()> {
    let suggestion = err.suggestion().map(str::to_string);
    Alert::new(AlertKind::Error, title, err.to_string())
        .with_suggestion(suggestion)
        .render(out)?;
    Ok(())
}

fn render_field_errors(
    out: &mut impl Write,
    title: &str,
    errors: &BTreeMap<String, String>,
) -> anyhow::Result<()> {
    Alert::new(
        AlertKind::Error,
        title,
        "Mohon periksa kembali data yang Anda masukkan.",
    )
    .render(out)?;
    for (field, message) in errors {
        writeln!(out, "  - {field}: {message}")?;
    }
    Ok(())
}

fn load_session<T: Transport>(ctx: &CommandContext<'_, T>) -> anyhow::Result<Session> {
    Ok(Session::load(ctx.config.session_path())?)
}

/// Patient management and exports are reserved for the registration desk.
fn require_meja1(session: &Session, out: &mut impl Write) -> anyhow::Result<bool> {
    if session.role() == Role::Meja1 {
        return Ok(true);
    }
    Alert::new(
        AlertKind::Warning,
        "Akses Ditolak",
        "Fitur ini hanya tersedia untuk petugas meja 1.",
    )
    .render(out)?;
    Ok(false)
}

// Auth

pub async fn login<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let errors = validate_login(username, password);
    if !errors.is_empty() {
        render_field_errors(out, "Login Gagal", &errors)?;
        return Ok(());
    }

    match ctx.client.login(username, password).await {
        Ok(data) => {
            let session = Session {
                token: Some(data.token),
                user: Some(data.user),
                last_patient_filter: None,
            };
            session.save(ctx.config.session_path())?;
            let name = session
                .user
                .as_ref()
                .map(|u| u.nama_lengkap.clone())
                .unwrap_or_default();
            Alert::new(
                AlertKind::Success,
                "Login Berhasil",
                format!("Selamat datang, {name}."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Login Gagal", &err)?,
    }
    Ok(())
}

/// Logout always clears the local session, even when the server call
/// fails.
pub async fn logout<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if let Ok(token) = session.bearer_token() {
        if let Err(err) = ctx.client.logout(token).await {
            tracing::warn!(error = %err, "logout request failed, clearing session anyway");
        }
    }
    Session::clear(ctx.config.session_path())?;
    Alert::new(AlertKind::Success, "Logout Berhasil", "Sesi telah dihapus.").render(out)?;
    Ok(())
}

// Dashboard

pub async fn dashboard<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    month: u32,
    year: i32,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?.to_string();
    let kader_name = session
        .user
        .as_ref()
        .map(|u| u.nama_lengkap.clone())
        .unwrap_or_else(|| "Kader".to_string());

    let mut dashboard = Dashboard::new();
    let patients_ticket = dashboard.begin_patients_fetch();
    let stunting_ticket = dashboard.begin_stunting_fetch();
    let trends_ticket = dashboard.begin_trends_fetch();

    let (patients, stunting, trends) = tokio::join!(
        ctx.client.patient_stats(&token),
        ctx.client.stunting_stats(&token, month, year),
        ctx.client.stunting_trends(&token, month, year),
    );

    // A failed section keeps its previous (empty) state instead of
    // aborting the whole dashboard.
    match patients {
        Ok(stats) => {
            dashboard.apply_patients(patients_ticket, stats);
        }
        Err(err) => tracing::warn!(error = %err, "failed to fetch patient statistics"),
    }
    match stunting {
        Ok(stats) => {
            dashboard.apply_stunting(stunting_ticket, stats);
        }
        Err(err) => tracing::warn!(error = %err, "failed to fetch stunting statistics"),
    }
    match trends {
        Ok(points) => {
            dashboard.apply_trends(trends_ticket, points);
        }
        Err(err) => tracing::warn!(error = %err, "failed to fetch trend data"),
    }

    dashboard.render(out, &kader_name, month, year)?;
    Ok(())
}

// Patients

pub async fn patient_list<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    filter: Option<PatientType>,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let mut session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?.to_string();

    // The chosen category filter is remembered across invocations.
    let effective = filter
        .or(session.last_patient_filter)
        .unwrap_or(PatientType::Balita);
    if session.last_patient_filter != Some(effective) {
        session.last_patient_filter = Some(effective);
        session.save(ctx.config.session_path())?;
    }

    match ctx.client.list_patients(&token).await {
        Ok(patients) => {
            let keyword = search.unwrap_or("").to_lowercase();
            let rows: Vec<_> = patients
                .into_iter()
                .filter(|p| p.patient_type == Some(effective))
                .filter(|p| {
                    if keyword.is_empty() {
                        return true;
                    }
                    [&p.name, &p.mother_name, &p.nama_suami]
                        .into_iter()
                        .flatten()
                        .any(|v| v.to_lowercase().contains(&keyword))
                })
                .collect();
            writeln!(out, "Data pasien ({})", effective.label())?;
            patient_table(out, &rows)?;
        }
        Err(err) => render_api_error(out, "Gagal Mengambil Data Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_show<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    id: i64,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    match ctx.client.get_patient(token, id).await {
        Ok(detail) => {
            writeln!(out, "Pasien #{}", detail.id)?;
            if let Some(kind) = detail.patient_type {
                writeln!(out, "  Jenis: {}", kind.label())?;
            }
            for key in detail.extra.keys() {
                if let Some(value) = detail.field_str(key) {
                    writeln!(out, "  {key}: {value}")?;
                }
            }
        }
        Err(err) => render_api_error(out, "Gagal Mengambil Data Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_add_balita<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    form: &BalitaForm,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    let errors = form.validate(ctx.today);
    if !errors.is_empty() {
        render_field_errors(out, "Data Tidak Valid", &errors)?;
        return Ok(());
    }

    match ctx.client.create_patient(token, &form.to_payload()).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pasien Tersimpan",
                format!("Data balita {} berhasil disimpan.", form.name),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menyimpan Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_add_ibu_hamil<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    form: &IbuHamilForm,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    let errors = form.validate(ctx.today);
    if !errors.is_empty() {
        render_field_errors(out, "Data Tidak Valid", &errors)?;
        return Ok(());
    }

    match ctx.client.create_patient(token, &form.to_payload()).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pasien Tersimpan",
                format!("Data ibu hamil {} berhasil disimpan.", form.name),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menyimpan Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_update_balita<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    id: i64,
    form: &BalitaForm,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    let errors = form.validate(ctx.today);
    if !errors.is_empty() {
        render_field_errors(out, "Data Tidak Valid", &errors)?;
        return Ok(());
    }

    match ctx
        .client
        .update_patient(token, id, &form.to_payload())
        .await
    {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pasien Diperbarui",
                format!("Data pasien #{id} berhasil diperbarui."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Memperbarui Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_update_ibu_hamil<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    id: i64,
    form: &IbuHamilForm,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    let errors = form.validate(ctx.today);
    if !errors.is_empty() {
        render_field_errors(out, "Data Tidak Valid", &errors)?;
        return Ok(());
    }

    match ctx
        .client
        .update_patient(token, id, &form.to_payload())
        .await
    {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pasien Diperbarui",
                format!("Data pasien #{id} berhasil diperbarui."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Memperbarui Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_delete<T: Transport>(
    ctx: &CommandContext<'_, T>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    id: i64,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    if !assume_yes
        && !confirm(
            input,
            out,
            ConfirmStyle::Danger,
            "Hapus Pasien",
            &format!("Data pasien #{id} akan dihapus permanen."),
        )?
    {
        writeln!(out, "Dibatalkan.")?;
        return Ok(());
    }

    match ctx.client.delete_patient(token, id).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pasien Dihapus",
                format!("Data pasien #{id} berhasil dihapus."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menghapus Pasien", &err)?,
    }
    Ok(())
}

pub async fn patient_queue<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    id: i64,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;
    let date = date.unwrap_or(ctx.today);

    match ctx.client.add_to_queue(token, id, date).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Masuk Antrian",
                format!("Pasien #{id} masuk antrian pemeriksaan tanggal {date}."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menambah Antrian", &err)?,
    }
    Ok(())
}

// Checkups

pub async fn checkup_list<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    month: u32,
    year: i32,
    patient_type: PatientType,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?;

    match ctx
        .client
        .list_checkups(token, month, year, patient_type)
        .await
    {
        Ok(items) => {
            let keyword = search.unwrap_or("");
            let rows: Vec<_> = items
                .into_iter()
                .filter(|item| item.matches_search(patient_type, keyword))
                .collect();
            writeln!(
                out,
                "Antrian pemeriksaan {} ({month:02}/{year})",
                patient_type.label()
            )?;
            checkup_table(out, &rows)?;
        }
        Err(err) => render_api_error(out, "Gagal Mengambil Data Pemeriksaan", &err)?,
    }
    Ok(())
}

pub async fn checkup_complete<T: Transport>(
    ctx: &CommandContext<'_, T>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    id: i64,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?;

    if !assume_yes
        && !confirm(
            input,
            out,
            ConfirmStyle::Warning,
            "Selesaikan Pemeriksaan",
            "Pemeriksaan akan ditandai selesai dan tidak dapat diubah lagi.",
        )?
    {
        writeln!(out, "Dibatalkan.")?;
        return Ok(());
    }

    match ctx.client.complete_checkup(token, id).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pemeriksaan Selesai",
                format!("Pemeriksaan #{id} ditandai selesai."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menyelesaikan Pemeriksaan", &err)?,
    }
    Ok(())
}

pub async fn checkup_delete<T: Transport>(
    ctx: &CommandContext<'_, T>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    id: i64,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?;

    if !assume_yes
        && !confirm(
            input,
            out,
            ConfirmStyle::Danger,
            "Hapus Pemeriksaan",
            &format!("Pemeriksaan #{id} beserta hasil pengukurannya akan dihapus."),
        )?
    {
        writeln!(out, "Dibatalkan.")?;
        return Ok(());
    }

    match ctx.client.delete_checkup(token, id).await {
        Ok(()) => {
            Alert::new(
                AlertKind::Success,
                "Pemeriksaan Dihapus",
                format!("Pemeriksaan #{id} berhasil dihapus."),
            )
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menghapus Pemeriksaan", &err)?,
    }
    Ok(())
}

// Measurements

pub async fn measurement_show<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    session_id: i64,
    patient_type: PatientType,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?.to_string();
    let role = session.role();

    let record = match ctx.client.measurement_session(&token, session_id).await {
        Ok(record) => record,
        Err(err) => {
            render_api_error(out, "Gagal Mengambil Data Pengukuran", &err)?;
            return Ok(());
        }
    };
    let editable = match ctx.client.editable_fields(&token, session_id).await {
        Ok(editable) => editable,
        Err(err) => {
            render_api_error(out, "Gagal Mengambil Daftar Field", &err)?;
            return Ok(());
        }
    };

    measurement_view(out, role, patient_type, &record, &editable)?;
    Ok(())
}

/// Parse repeated `field=value` arguments.
pub fn parse_set_args(sets: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut values = BTreeMap::new();
    for set in sets {
        match set.split_once('=') {
            Some((field, value)) if !field.is_empty() => {
                values.insert(field.to_string(), value.to_string());
            }
            _ => return Err(format!("argumen tidak valid: '{set}' (gunakan field=nilai)")),
        }
    }
    Ok(values)
}

pub async fn measurement_edit<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    session_id: i64,
    patient_type: PatientType,
    updates: &BTreeMap<String, String>,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    let token = session.bearer_token()?.to_string();
    let role = session.role();

    let record = match ctx.client.measurement_session(&token, session_id).await {
        Ok(record) => record,
        Err(err) => {
            render_api_error(out, "Gagal Mengambil Data Pengukuran", &err)?;
            return Ok(());
        }
    };
    let editable = match ctx.client.editable_fields(&token, session_id).await {
        Ok(editable) => editable,
        Err(err) => {
            render_api_error(out, "Gagal Mengambil Daftar Field", &err)?;
            return Ok(());
        }
    };

    // Role and editability gates before anything is merged.
    for field in updates.keys() {
        if !can_see_field(role, field) {
            Alert::new(
                AlertKind::Warning,
                "Akses Ditolak",
                format!("Field '{field}' tidak tersedia untuk peran Anda."),
            )
            .render(out)?;
            return Ok(());
        }
        if !editable.is_editable(field) {
            Alert::new(
                AlertKind::Warning,
                "Field Terkunci",
                format!("Field '{field}' sudah tidak dapat diubah untuk sesi ini."),
            )
            .render(out)?;
            return Ok(());
        }
    }

    // Current values plus the requested changes.
    let mut values: BTreeMap<String, String> = BTreeMap::new();
    for field in editable.iter() {
        if let Some(value) = record.field_str(field) {
            values.insert(field.to_string(), value);
        }
    }
    for (field, value) in updates {
        values.insert(field.clone(), value.clone());
    }

    // The child's age is derived from the birth date and session date, not
    // typed by hand.
    if patient_type == PatientType::Balita {
        if let (Some(birth), Some(session_date)) =
            (record.patient_birth_date(), record.session_date())
        {
            let birth = NaiveDate::parse_from_str(&birth[..10.min(birth.len())], "%Y-%m-%d");
            let reference =
                NaiveDate::parse_from_str(&session_date[..10.min(session_date.len())], "%Y-%m-%d");
            if let (Ok(birth), Ok(reference)) = (birth, reference) {
                values.insert(
                    "ageMonths".to_string(),
                    age_in_months(birth, reference).to_string(),
                );
            }
        }
    }

    let errors = validate_measurement_form(patient_type, &editable, &values);
    if !errors.is_empty() {
        render_field_errors(out, "Data Tidak Valid", &errors)?;
        return Ok(());
    }

    match ctx
        .client
        .submit_measurement(&token, session_id, &values)
        .await
    {
        Ok(response) => {
            let suggestion = response.calculation_info.as_ref().map(|info| {
                format!(
                    "Z-Score: {}, Status: {}",
                    info.z_score_text().unwrap_or_else(|| "-".to_string()),
                    info.stunting_status.clone().unwrap_or_else(|| "-".to_string()),
                )
            });
            Alert::new(
                AlertKind::Success,
                "Data Tersimpan",
                "Hasil pengukuran berhasil disimpan.",
            )
            .with_suggestion(suggestion)
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Menyimpan Pengukuran", &err)?,
    }
    Ok(())
}

// Exports

pub async fn export_report<T: Transport>(
    ctx: &CommandContext<'_, T>,
    out: &mut impl Write,
    kind: ReportKind,
    month: u32,
    year: i32,
    patient_type: PatientType,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let session = load_session(ctx)?;
    if !require_meja1(&session, out)? {
        return Ok(());
    }
    let token = session.bearer_token()?;

    // The benefit-recipient report only exists for pregnant women.
    if kind == ReportKind::PenerimaManfaat && patient_type != PatientType::IbuHamil {
        Alert::new(
            AlertKind::Warning,
            "Laporan Tidak Tersedia",
            "Laporan penerima manfaat hanya tersedia untuk ibu hamil.",
        )
        .render(out)?;
        return Ok(());
    }

    match ctx
        .client
        .export_report(token, kind, month, year, patient_type)
        .await
    {
        Ok(bytes) => {
            let filename = export_filename(kind, month, year, patient_type);
            let path = out_dir.join(&filename);
            std::fs::write(&path, &bytes)?;
            Alert::new(
                AlertKind::Success,
                "Laporan Berhasil Diunduh",
                format!("Laporan tersimpan di {}.", path.display()),
            )
            .with_suggestion(Some(
                "Buka file dengan Microsoft Excel atau aplikasi spreadsheet lainnya.".to_string(),
            ))
            .render(out)?;
        }
        Err(err) => render_api_error(out, "Gagal Mencetak Laporan", &err)?,
    }
    Ok(())
}
