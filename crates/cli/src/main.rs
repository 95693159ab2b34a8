//! Command line client for the Posyandu record system.

use std::io::BufRead;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use posyandu_api::{ApiClient, HyperTransport};
use posyandu_core::{
    resolve_session_path, BalitaForm, CoreConfig, IbuHamilForm, ReportKind, DEFAULT_API_BASE_URL,
    REPORT_YEARS,
};
use posyandu_types::PatientType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod dialog;
mod views;

use commands::CommandContext;

#[derive(Parser)]
#[command(name = "posyandu")]
#[command(about = "Posyandu maternal and child health record client")]
struct Cli {
    /// Backend base URL (default: POSYANDU_API_URL or http://localhost:3000)
    #[arg(long)]
    api_url: Option<String>,
    /// Session file location (default: ~/.posyandu-session.json)
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

fn parse_patient_type(s: &str) -> Result<PatientType, String> {
    match s {
        "ibu-hamil" => Ok(PatientType::IbuHamil),
        other => PatientType::from_wire(other)
            .ok_or_else(|| format!("jenis pasien tidak dikenal: '{other}' (balita/ibu_hamil)")),
    }
}

fn parse_report_kind(s: &str) -> Result<ReportKind, String> {
    match s {
        "puskesmas" => Ok(ReportKind::Puskesmas),
        "penerima-manfaat" => Ok(ReportKind::PenerimaManfaat),
        other => Err(format!(
            "jenis laporan tidak dikenal: '{other}' (puskesmas/penerima-manfaat)"
        )),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("tanggal tidak valid: '{s}' (format YYYY-MM-DD)"))
}

fn parse_month(s: &str) -> Result<u32, String> {
    match s.parse() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(format!("bulan tidak valid: '{s}' (1-12)")),
    }
}

fn parse_year(s: &str) -> Result<i32, String> {
    let year: i32 = s.parse().map_err(|_| format!("tahun tidak valid: '{s}'"))?;
    if REPORT_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(format!(
            "tahun di luar rentang ({}-{})",
            REPORT_YEARS[0],
            REPORT_YEARS[REPORT_YEARS.len() - 1]
        ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Masuk dengan akun kader
    Login { username: String, password: String },
    /// Keluar dan hapus sesi lokal
    Logout,
    /// Ringkasan statistik pasien dan stunting
    Dashboard {
        #[arg(long, value_parser = parse_month)]
        month: Option<u32>,
        #[arg(long, value_parser = parse_year)]
        year: Option<i32>,
    },
    /// Kelola data pasien (hanya meja 1)
    Pasien {
        #[command(subcommand)]
        command: PasienCommands,
    },
    /// Antrian pemeriksaan bulanan
    Checkup {
        #[command(subcommand)]
        command: CheckupCommands,
    },
    /// Hasil pengukuran satu sesi pemeriksaan
    Ukur {
        #[command(subcommand)]
        command: UkurCommands,
    },
    /// Unduh laporan Excel (hanya meja 1)
    Export {
        /// puskesmas atau penerima-manfaat
        #[arg(value_parser = parse_report_kind)]
        kind: ReportKind,
        #[arg(long, value_parser = parse_month)]
        month: Option<u32>,
        #[arg(long, value_parser = parse_year)]
        year: Option<i32>,
        #[arg(long = "type", value_parser = parse_patient_type, default_value = "balita")]
        patient_type: PatientType,
        /// Folder tujuan
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum PasienCommands {
    /// Daftar pasien
    List {
        #[arg(long = "type", value_parser = parse_patient_type)]
        patient_type: Option<PatientType>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Detail satu pasien
    Show { id: i64 },
    /// Daftarkan balita baru
    AddBalita {
        #[command(flatten)]
        form: BalitaArgs,
    },
    /// Daftarkan ibu hamil baru
    AddIbuHamil {
        #[command(flatten)]
        form: IbuHamilArgs,
    },
    /// Perbarui data balita (isi ulang seluruh kolom)
    EditBalita {
        id: i64,
        #[command(flatten)]
        form: BalitaArgs,
    },
    /// Perbarui data ibu hamil (isi ulang seluruh kolom)
    EditIbuHamil {
        id: i64,
        #[command(flatten)]
        form: IbuHamilArgs,
    },
    /// Hapus pasien
    Delete {
        id: i64,
        /// Lewati konfirmasi
        #[arg(long)]
        yes: bool,
    },
    /// Masukkan pasien ke antrian pemeriksaan
    Queue {
        id: i64,
        /// Tanggal pemeriksaan (default: hari ini)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum CheckupCommands {
    /// Antrian untuk bulan/tahun/jenis terpilih
    List {
        #[arg(long, value_parser = parse_month)]
        month: Option<u32>,
        #[arg(long, value_parser = parse_year)]
        year: Option<i32>,
        #[arg(long = "type", value_parser = parse_patient_type, default_value = "balita")]
        patient_type: PatientType,
        #[arg(long)]
        search: Option<String>,
    },
    /// Tandai pemeriksaan selesai
    Complete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Hapus pemeriksaan
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UkurCommands {
    /// Tampilkan formulir pengukuran sesuai peran
    Show {
        session_id: i64,
        #[arg(long = "type", value_parser = parse_patient_type, default_value = "balita")]
        patient_type: PatientType,
    },
    /// Ubah nilai pengukuran (field=nilai, boleh berulang)
    Edit {
        session_id: i64,
        #[arg(long = "type", value_parser = parse_patient_type, default_value = "balita")]
        patient_type: PatientType,
        #[arg(long = "set")]
        sets: Vec<String>,
    },
}

#[derive(Args)]
struct BalitaArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    mother_name: String,
    /// L atau P
    #[arg(long)]
    gender: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: String,
    #[arg(long)]
    rt: String,
    #[arg(long, default_value = "")]
    address: String,
    /// Daftar imunisasi, dipisah koma
    #[arg(long, default_value = "")]
    imunisasi: String,
    #[arg(long, default_value = "")]
    kb: String,
    /// Ya atau Tidak
    #[arg(long)]
    pus: String,
    /// Ya atau Tidak
    #[arg(long)]
    wus: String,
}

impl BalitaArgs {
    fn into_form(self) -> BalitaForm {
        BalitaForm {
            name: self.name,
            mother_name: self.mother_name,
            gender: self.gender,
            birth_date: self.birth_date,
            address: self.address,
            rt: self.rt,
            imunisasi: self
                .imunisasi
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            kb: self.kb,
            pus: self.pus,
            wus: self.wus,
        }
    }
}

#[derive(Args)]
struct IbuHamilArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    nama_suami: String,
    #[arg(long)]
    nik: String,
    #[arg(long)]
    no_kk: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long)]
    rt: String,
    #[arg(long)]
    gravida: String,
    #[arg(long)]
    partus: String,
    #[arg(long)]
    abortus: String,
    /// Jarak persalinan sebelumnya dalam bulan
    #[arg(long)]
    jarak_persalinan: String,
    #[arg(long)]
    usia_kandungan_minggu: String,
    /// YYYY-MM-DD
    #[arg(long)]
    tgl_pemeriksaan_pertama: String,
    /// YYYY-MM-DD
    #[arg(long)]
    hpm: String,
    /// YYYY-MM-DD
    #[arg(long)]
    hpl: String,
    #[arg(long, default_value = "")]
    nomor_jaminan: String,
    #[arg(long)]
    no_telp: String,
    #[arg(long)]
    golongan_darah: String,
}

impl IbuHamilArgs {
    fn into_form(self) -> IbuHamilForm {
        IbuHamilForm {
            name: self.name,
            nama_suami: self.nama_suami,
            nik: self.nik,
            no_kk: self.no_kk,
            birth_date: self.birth_date,
            address: self.address,
            rt: self.rt,
            gravida: self.gravida,
            partus: self.partus,
            abortus: self.abortus,
            jarak_persalinan_sebelumnya: self.jarak_persalinan,
            usia_kandungan_minggu: self.usia_kandungan_minggu,
            tgl_pemeriksaan_pertama: self.tgl_pemeriksaan_pertama,
            hpm: self.hpm,
            hpl: self.hpl,
            nomor_jaminan: self.nomor_jaminan,
            no_telp: self.no_telp,
            golongan_darah: self.golongan_darah,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("posyandu=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let api_url = cli
        .api_url
        .or_else(|| std::env::var("POSYANDU_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let session_path = resolve_session_path(
        cli.session_file
            .or_else(|| std::env::var("POSYANDU_SESSION_FILE").ok().map(PathBuf::from)),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    let config = CoreConfig::new(api_url, session_path)?;

    let client = ApiClient::new(HyperTransport::new(), config.api_base_url());
    let today = chrono::Local::now().date_naive();
    let ctx = CommandContext {
        client: &client,
        config: &config,
        today,
    };

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Login { username, password } => {
            commands::login(&ctx, &mut out, &username, &password).await?;
        }
        Commands::Logout => {
            commands::logout(&ctx, &mut out).await?;
        }
        Commands::Dashboard { month, year } => {
            let month = month.unwrap_or(today.month());
            let year = year.unwrap_or(today.year());
            commands::dashboard(&ctx, &mut out, month, year).await?;
        }
        Commands::Pasien { command } => {
            run_pasien(&ctx, &mut input, &mut out, command).await?;
        }
        Commands::Checkup { command } => {
            run_checkup(&ctx, &mut input, &mut out, command, today).await?;
        }
        Commands::Ukur { command } => match command {
            UkurCommands::Show {
                session_id,
                patient_type,
            } => {
                commands::measurement_show(&ctx, &mut out, session_id, patient_type).await?;
            }
            UkurCommands::Edit {
                session_id,
                patient_type,
                sets,
            } => {
                let updates = commands::parse_set_args(&sets).map_err(anyhow::Error::msg)?;
                commands::measurement_edit(&ctx, &mut out, session_id, patient_type, &updates)
                    .await?;
            }
        },
        Commands::Export {
            kind,
            month,
            year,
            patient_type,
            out: out_dir,
        } => {
            let month = month.unwrap_or(today.month());
            let year = year.unwrap_or(today.year());
            commands::export_report(&ctx, &mut out, kind, month, year, patient_type, &out_dir)
                .await?;
        }
    }

    Ok(())
}

async fn run_pasien(
    ctx: &CommandContext<'_, HyperTransport>,
    input: &mut impl BufRead,
    out: &mut impl std::io::Write,
    command: PasienCommands,
) -> anyhow::Result<()> {
    match command {
        PasienCommands::List {
            patient_type,
            search,
        } => commands::patient_list(ctx, out, patient_type, search.as_deref()).await,
        PasienCommands::Show { id } => commands::patient_show(ctx, out, id).await,
        PasienCommands::AddBalita { form } => {
            commands::patient_add_balita(ctx, out, &form.into_form()).await
        }
        PasienCommands::AddIbuHamil { form } => {
            commands::patient_add_ibu_hamil(ctx, out, &form.into_form()).await
        }
        PasienCommands::EditBalita { id, form } => {
            commands::patient_update_balita(ctx, out, id, &form.into_form()).await
        }
        PasienCommands::EditIbuHamil { id, form } => {
            commands::patient_update_ibu_hamil(ctx, out, id, &form.into_form()).await
        }
        PasienCommands::Delete { id, yes } => {
            commands::patient_delete(ctx, input, out, id, yes).await
        }
        PasienCommands::Queue { id, date } => commands::patient_queue(ctx, out, id, date).await,
    }
}

async fn run_checkup(
    ctx: &CommandContext<'_, HyperTransport>,
    input: &mut impl BufRead,
    out: &mut impl std::io::Write,
    command: CheckupCommands,
    today: NaiveDate,
) -> anyhow::Result<()> {
    match command {
        CheckupCommands::List {
            month,
            year,
            patient_type,
            search,
        } => {
            let month = month.unwrap_or(today.month());
            let year = year.unwrap_or(today.year());
            commands::checkup_list(ctx, out, month, year, patient_type, search.as_deref()).await
        }
        CheckupCommands::Complete { id, yes } => {
            commands::checkup_complete(ctx, input, out, id, yes).await
        }
        CheckupCommands::Delete { id, yes } => {
            commands::checkup_delete(ctx, input, out, id, yes).await
        }
    }
}
