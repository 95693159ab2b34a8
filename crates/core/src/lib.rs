//! Core domain logic for the Posyandu client.
//!
//! Everything here is pure and synchronous: role-based field access rules,
//! form and measurement validation, age arithmetic, report naming and the
//! on-disk login session. Network I/O lives in the API client crate, which
//! builds on these types.

pub mod access;
pub mod age;
pub mod config;
pub mod error;
pub mod export;
pub mod patient;
pub mod session;
pub mod validation;

pub use access::{can_see_field, form_fields, is_calculated_field, should_show_as_info, EditableFields};
pub use age::{age_in_months, age_in_years};
pub use config::{resolve_session_path, CoreConfig, DEFAULT_API_BASE_URL, SESSION_FILE_NAME};
pub use error::{ClientError, ClientResult};
pub use export::{export_filename, export_query, month_name, ReportKind, MONTH_NAMES, REPORT_YEARS};
pub use patient::{BalitaForm, BalitaPayload, IbuHamilForm, IbuHamilPayload};
pub use session::{Session, UserProfile};
pub use validation::{
    validate_blood_pressure, validate_login, validate_measurement_field,
    validate_measurement_form, validate_patient_field,
};
