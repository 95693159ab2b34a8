//! Patient registration forms.
//!
//! Form values are raw strings, exactly as typed. Submit-time validation
//! combines required-field checks with the per-field rules in
//! [`crate::validation`]; payload structs serialize with the camelCase
//! keys the backend expects.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use posyandu_types::PatientType;
use serde::Serialize;

use crate::validation::validate_patient_field;

/// Registration form for a child under five.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalitaForm {
    pub name: String,
    pub mother_name: String,
    /// `L` or `P`.
    pub gender: String,
    pub birth_date: String,
    pub address: String,
    pub rt: String,
    pub imunisasi: Vec<String>,
    pub kb: String,
    /// `Ya` or `Tidak`.
    pub pus: String,
    /// `Ya` or `Tidak`.
    pub wus: String,
}

/// Registration form for a pregnant woman.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IbuHamilForm {
    pub name: String,
    pub nama_suami: String,
    pub nik: String,
    pub no_kk: String,
    pub birth_date: String,
    pub address: String,
    pub rt: String,
    pub gravida: String,
    pub partus: String,
    pub abortus: String,
    pub jarak_persalinan_sebelumnya: String,
    pub usia_kandungan_minggu: String,
    pub tgl_pemeriksaan_pertama: String,
    pub hpm: String,
    pub hpl: String,
    pub nomor_jaminan: String,
    pub no_telp: String,
    pub golongan_darah: String,
}

/// Create/update payload for a balita, keyed the way the backend expects.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalitaPayload {
    pub patient_type: &'static str,
    pub name: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub mother_name: String,
    pub rt: String,
    /// Comma-joined list, matching the stored representation.
    pub imunisasi: String,
    pub kb: String,
    pub pus: String,
    pub wus: String,
}

/// Create/update payload for an ibu hamil.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IbuHamilPayload {
    pub patient_type: &'static str,
    pub name: String,
    pub birth_date: String,
    pub address: String,
    pub rt: String,
    pub nik: String,
    #[serde(rename = "noKK")]
    pub no_kk: String,
    pub nama_suami: String,
    pub gravida: String,
    pub partus: String,
    pub abortus: String,
    pub jarak_persalinan_sebelumnya: String,
    pub usia_kandungan_minggu: String,
    pub tgl_pemeriksaan_pertama: String,
    pub hpm: String,
    pub hpl: String,
    pub nomor_jaminan: String,
    pub no_telp: String,
    pub golongan_darah: String,
}

fn require(
    errors: &mut BTreeMap<String, String>,
    field: &str,
    value: &str,
    message: &str,
) -> bool {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
        false
    } else {
        true
    }
}

fn bound_check(
    errors: &mut BTreeMap<String, String>,
    patient_type: PatientType,
    field: &str,
    value: &str,
    today: NaiveDate,
) {
    if errors.contains_key(field) {
        return;
    }
    if let Some(message) = validate_patient_field(patient_type, field, value, today) {
        errors.insert(field.to_string(), message);
    }
}

impl BalitaForm {
    /// Validate the whole form for submission. An empty map means the form
    /// may be sent.
    pub fn validate(&self, today: NaiveDate) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        require(&mut errors, "name", &self.name, "Nama anak wajib diisi");
        require(
            &mut errors,
            "motherName",
            &self.mother_name,
            "Nama ibu wajib diisi",
        );
        require(
            &mut errors,
            "gender",
            &self.gender,
            "Jenis kelamin wajib dipilih",
        );
        require(
            &mut errors,
            "birthDate",
            &self.birth_date,
            "Tanggal lahir wajib diisi",
        );
        require(&mut errors, "rt", &self.rt, "RT wajib diisi");
        require(&mut errors, "pus", &self.pus, "PUS wajib dipilih");
        require(&mut errors, "wus", &self.wus, "WUS wajib dipilih");

        for field in ["name", "motherName", "rt", "birthDate"] {
            let value = match field {
                "name" => &self.name,
                "motherName" => &self.mother_name,
                "rt" => &self.rt,
                _ => &self.birth_date,
            };
            bound_check(&mut errors, PatientType::Balita, field, value, today);
        }
        errors
    }

    pub fn to_payload(&self) -> BalitaPayload {
        BalitaPayload {
            patient_type: "balita",
            name: self.name.clone(),
            birth_date: self.birth_date.clone(),
            gender: self.gender.clone(),
            address: self.address.clone(),
            mother_name: self.mother_name.clone(),
            rt: self.rt.clone(),
            imunisasi: self.imunisasi.join(", "),
            kb: self.kb.clone(),
            pus: self.pus.clone(),
            wus: self.wus.clone(),
        }
    }
}

impl IbuHamilForm {
    pub fn validate(&self, today: NaiveDate) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        require(&mut errors, "name", &self.name, "Nama ibu wajib diisi");
        require(
            &mut errors,
            "namaSuami",
            &self.nama_suami,
            "Nama suami wajib diisi",
        );
        require(&mut errors, "nik", &self.nik, "NIK wajib diisi");
        require(&mut errors, "noKK", &self.no_kk, "No KK wajib diisi");
        require(&mut errors, "rt", &self.rt, "RT wajib diisi");
        require(
            &mut errors,
            "birthDate",
            &self.birth_date,
            "Tanggal lahir wajib diisi",
        );
        require(&mut errors, "gravida", &self.gravida, "Gravida wajib diisi");
        require(&mut errors, "partus", &self.partus, "Partus wajib diisi");
        require(&mut errors, "abortus", &self.abortus, "Abortus wajib diisi");
        require(
            &mut errors,
            "jarakPersalinanSebelumnya",
            &self.jarak_persalinan_sebelumnya,
            "Jarak persalinan sebelumnya wajib diisi",
        );
        require(
            &mut errors,
            "usiaKandunganMinggu",
            &self.usia_kandungan_minggu,
            "Usia kandungan wajib diisi",
        );
        require(
            &mut errors,
            "tglPemeriksaanPertama",
            &self.tgl_pemeriksaan_pertama,
            "Tanggal pemeriksaan pertama wajib diisi",
        );
        require(&mut errors, "hpm", &self.hpm, "HPM wajib diisi");
        require(&mut errors, "hpl", &self.hpl, "HPL wajib diisi");
        require(
            &mut errors,
            "golonganDarah",
            &self.golongan_darah,
            "Golongan darah wajib dipilih",
        );
        require(&mut errors, "noTelp", &self.no_telp, "No telepon wajib diisi");

        let bounded: [(&str, &String); 15] = [
            ("name", &self.name),
            ("namaSuami", &self.nama_suami),
            ("nik", &self.nik),
            ("noKK", &self.no_kk),
            ("rt", &self.rt),
            ("birthDate", &self.birth_date),
            ("gravida", &self.gravida),
            ("partus", &self.partus),
            ("abortus", &self.abortus),
            ("jarakPersalinanSebelumnya", &self.jarak_persalinan_sebelumnya),
            ("usiaKandunganMinggu", &self.usia_kandungan_minggu),
            ("tglPemeriksaanPertama", &self.tgl_pemeriksaan_pertama),
            ("hpm", &self.hpm),
            ("hpl", &self.hpl),
            ("noTelp", &self.no_telp),
        ];
        for (field, value) in bounded {
            bound_check(&mut errors, PatientType::IbuHamil, field, value, today);
        }
        // Optional, but format-checked when present.
        bound_check(
            &mut errors,
            PatientType::IbuHamil,
            "nomorJaminan",
            &self.nomor_jaminan,
            today,
        );
        errors
    }

    pub fn to_payload(&self) -> IbuHamilPayload {
        IbuHamilPayload {
            patient_type: "ibu_hamil",
            name: self.name.clone(),
            birth_date: self.birth_date.clone(),
            address: self.address.clone(),
            rt: self.rt.clone(),
            nik: self.nik.clone(),
            no_kk: self.no_kk.clone(),
            nama_suami: self.nama_suami.clone(),
            gravida: self.gravida.clone(),
            partus: self.partus.clone(),
            abortus: self.abortus.clone(),
            jarak_persalinan_sebelumnya: self.jarak_persalinan_sebelumnya.clone(),
            usia_kandungan_minggu: self.usia_kandungan_minggu.clone(),
            tgl_pemeriksaan_pertama: self.tgl_pemeriksaan_pertama.clone(),
            hpm: self.hpm.clone(),
            hpl: self.hpl.clone(),
            nomor_jaminan: self.nomor_jaminan.clone(),
            no_telp: self.no_telp.clone(),
            golongan_darah: self.golongan_darah.clone(),
        }
    }
}
