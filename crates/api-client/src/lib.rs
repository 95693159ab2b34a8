//! HTTP client for the Posyandu backend API.
//!
//! The backend speaks JSON wrapped in a `{success, data, message,
//! suggestion}` envelope over plain HTTP/1. [`ApiClient`] offers one typed
//! method per endpoint and is generic over [`Transport`] so tests can run
//! against canned responses.

pub mod client;
pub mod envelope;
pub mod error;
pub mod freshness;
pub mod transport;
pub mod wire;

pub use client::ApiClient;
pub use envelope::ApiEnvelope;
pub use error::{ApiError, ApiResult};
pub use freshness::{FetchGuard, FetchTicket};
pub use transport::{ApiRequest, ApiResponse, HyperTransport, Transport};
pub use wire::{
    CalculationInfo, CheckupItem, CheckupPatient, CheckupSession, EditData, LoginData,
    LoginRequest, MeasurementRecord, PatientDetail, PatientStats, PatientSummary, SessionPatient,
    StuntingCount, StuntingStats, SubmitMeasurementResponse, TrendPoint,
};
