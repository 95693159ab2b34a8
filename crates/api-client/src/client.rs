//! Typed client for the Posyandu backend.
//!
//! One method per endpoint. Every call except `login` carries a bearer
//! token; callers obtain it from the stored session. JSON endpoints are
//! decoded through [`ApiEnvelope`], exports return raw spreadsheet bytes.

use bytes::Bytes;
use chrono::NaiveDate;
use http::Method;
use posyandu_core::{export_query, EditableFields, ReportKind};
use posyandu_types::PatientType;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::wire::{
    CheckupItem, EditData, LoginData, LoginRequest, MeasurementRecord, PatientDetail,
    PatientStats, PatientSummary, StuntingStats, SubmitMeasurementResponse, TrendPoint,
};

pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: String,
}

impl<T: Transport> ApiClient<T> {
    /// `base_url` must already be normalized (no trailing slash), as
    /// `CoreConfig` guarantees.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn encode_body(payload: &impl Serialize) -> ApiResult<Bytes> {
        let raw = serde_json::to_vec(payload)
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        Ok(Bytes::from(raw))
    }

    /// Send a request and fail fast on transport errors. Non-2xx responses
    /// are mapped to a business error when the body carries an envelope
    /// with a message, otherwise to a bare status error.
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let endpoint = request.url.clone();
        let response = self.transport.send(request).await?;
        if response.status.is_success() {
            return Ok(response);
        }

        if let Ok(envelope) = ApiEnvelope::<serde_json::Value>::decode(&endpoint, &response.body) {
            if let Some(message) = envelope.message {
                return Err(ApiError::Business {
                    message,
                    suggestion: envelope.suggestion,
                });
            }
        }
        Err(ApiError::Status {
            endpoint,
            status: response.status.as_u16(),
        })
    }

    async fn get_data<D: DeserializeOwned>(&self, path: &str, token: &str) -> ApiResult<D> {
        let request = ApiRequest::new(Method::GET, self.url(path)).with_bearer(token);
        let response = self.send(request).await?;
        ApiEnvelope::<D>::decode(path, &response.body)?.into_result(path)
    }

    async fn send_ack(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<Bytes>,
    ) -> ApiResult<()> {
        let mut request = ApiRequest::new(method, self.url(path)).with_bearer(token);
        if let Some(body) = body {
            request = request.with_json_body(body);
        }
        let response = self.send(request).await?;
        if response.body.is_empty() {
            return Ok(());
        }
        ApiEnvelope::<serde_json::Value>::decode(path, &response.body)?.into_ack()
    }

    // Auth

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginData> {
        let path = "/api/auth/login";
        let body = Self::encode_body(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let request = ApiRequest::new(Method::POST, self.url(path)).with_json_body(body);
        let response = self.send(request).await?;
        ApiEnvelope::<LoginData>::decode(path, &response.body)?.into_result(path)
    }

    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        self.send_ack(
            Method::POST,
            "/api/auth/logout",
            token,
            Some(Bytes::from_static(b"{}")),
        )
        .await
    }

    // Patients

    pub async fn list_patients(&self, token: &str) -> ApiResult<Vec<PatientSummary>> {
        self.get_data("/api/pasien", token).await
    }

    pub async fn get_patient(&self, token: &str, id: i64) -> ApiResult<PatientDetail> {
        self.get_data(&format!("/api/pasien/{id}"), token).await
    }

    pub async fn create_patient(&self, token: &str, payload: &impl Serialize) -> ApiResult<()> {
        let body = Self::encode_body(payload)?;
        self.send_ack(Method::POST, "/api/pasien", token, Some(body))
            .await
    }

    pub async fn update_patient(
        &self,
        token: &str,
        id: i64,
        payload: &impl Serialize,
    ) -> ApiResult<()> {
        let body = Self::encode_body(payload)?;
        self.send_ack(Method::PUT, &format!("/api/pasien/{id}"), token, Some(body))
            .await
    }

    pub async fn delete_patient(&self, token: &str, id: i64) -> ApiResult<()> {
        self.send_ack(Method::DELETE, &format!("/api/pasien/{id}"), token, None)
            .await
    }

    pub async fn patient_stats(&self, token: &str) -> ApiResult<PatientStats> {
        self.get_data("/api/pasien/statistik", token).await
    }

    /// Queue a patient for a checkup on the given date.
    pub async fn add_to_queue(&self, token: &str, patient_id: i64, date: NaiveDate) -> ApiResult<()> {
        let body = Self::encode_body(&json!({
            "pasienId": patient_id,
            "tanggal": date.format("%Y-%m-%d").to_string(),
        }))?;
        self.send_ack(Method::POST, "/api/pasien/add-to-queue", token, Some(body))
            .await
    }

    // Checkups

    pub async fn list_checkups(
        &self,
        token: &str,
        month: u32,
        year: i32,
        patient_type: PatientType,
    ) -> ApiResult<Vec<CheckupItem>> {
        let path = format!(
            "/api/checkup?month={month:02}&year={year}&patientType={}",
            patient_type.to_wire()
        );
        self.get_data(&path, token).await
    }

    pub async fn delete_checkup(&self, token: &str, id: i64) -> ApiResult<()> {
        self.send_ack(Method::DELETE, &format!("/api/checkup/{id}"), token, None)
            .await
    }

    pub async fn complete_checkup(&self, token: &str, id: i64) -> ApiResult<()> {
        self.send_ack(
            Method::PUT,
            &format!("/api/checkup/complete/{id}"),
            token,
            Some(Bytes::from_static(b"{}")),
        )
        .await
    }

    // Measurements

    pub async fn measurement_session(
        &self,
        token: &str,
        session_id: i64,
    ) -> ApiResult<MeasurementRecord> {
        self.get_data(&format!("/api/measurement/session/{session_id}"), token)
            .await
    }

    /// The fields still editable for one session.
    pub async fn editable_fields(&self, token: &str, session_id: i64) -> ApiResult<EditableFields> {
        let data: EditData = self
            .get_data(&format!("/api/measurement/edit/{session_id}"), token)
            .await?;
        Ok(data.into_editable_fields())
    }

    /// Submit measurement values. The response is decoded directly because
    /// `calculationInfo` sits beside the envelope fields.
    pub async fn submit_measurement(
        &self,
        token: &str,
        session_id: i64,
        values: &impl Serialize,
    ) -> ApiResult<SubmitMeasurementResponse> {
        let path = format!("/api/measurement/{session_id}");
        let body = Self::encode_body(values)?;
        let request = ApiRequest::new(Method::POST, self.url(&path))
            .with_bearer(token)
            .with_json_body(body);
        let response = self.send(request).await?;

        let decoded: SubmitMeasurementResponse = serde_json::from_slice(&response.body)
            .map_err(|source| ApiError::Decode {
                endpoint: path,
                source,
            })?;
        if decoded.success == Some(false) {
            return Err(ApiError::Business {
                message: decoded
                    .message
                    .unwrap_or_else(|| "Terjadi kesalahan pada server".to_string()),
                suggestion: decoded.suggestion,
            });
        }
        Ok(decoded)
    }

    // Statistics

    pub async fn stunting_stats(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> ApiResult<StuntingStats> {
        self.get_data(
            &format!("/api/measurement/statistics/stunting?month={month}&year={year}"),
            token,
        )
        .await
    }

    pub async fn stunting_trends(
        &self,
        token: &str,
        month: u32,
        year: i32,
    ) -> ApiResult<Vec<TrendPoint>> {
        self.get_data(
            &format!("/api/measurement/statistics/trends?month={month}&year={year}"),
            token,
        )
        .await
    }

    // Exports

    /// Download one Excel report; returns the raw spreadsheet bytes.
    pub async fn export_report(
        &self,
        token: &str,
        kind: ReportKind,
        month: u32,
        year: i32,
        patient_type: PatientType,
    ) -> ApiResult<Bytes> {
        let path = format!(
            "{}?{}",
            kind.endpoint_path(),
            export_query(kind, month, year, patient_type)
        );
        let request = ApiRequest::new(Method::GET, self.url(&path)).with_bearer(token);
        let response = self.send(request).await?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiRequest, ApiResponse, Transport};
    use http::StatusCode;
    use std::sync::Mutex;

    /// Records requests and replays canned responses.
    struct MockTransport {
        requests: Mutex<Vec<ApiRequest>>,
        responses: Mutex<Vec<ApiResponse>>,
    }

    impl MockTransport {
        fn replying(status: StatusCode, body: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(vec![ApiResponse {
                    status,
                    body: Bytes::from(body.to_string()),
                }]),
            }
        }

        fn last_request(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for &MockTransport {
        async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    #[tokio::test]
    async fn login_posts_credentials_without_a_bearer() {
        let transport = MockTransport::replying(
            StatusCode::OK,
            r#"{"success":true,"data":{"token":"tok123","user":{"nama_lengkap":"Kader Satu","role":"meja1"}}}"#,
        );
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let data = client.login("kader1", "rahasia1").await.unwrap();
        assert_eq!(data.token, "tok123");
        assert_eq!(data.user.nama_lengkap, "Kader Satu");

        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://localhost:3000/api/auth/login");
        assert!(request.bearer.is_none());
        let body: serde_json::Value =
            serde_json::from_slice(&request.body.unwrap()).unwrap();
        assert_eq!(body["username"], "kader1");
        assert_eq!(body["password"], "rahasia1");
    }

    #[tokio::test]
    async fn checkup_listing_builds_the_filter_query() {
        let transport =
            MockTransport::replying(StatusCode::OK, r#"{"success":true,"data":[{"id":7}]}"#);
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let items = client
            .list_checkups("tok", 3, 2025, PatientType::IbuHamil)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);

        let request = transport.last_request();
        assert_eq!(
            request.url,
            "http://localhost:3000/api/checkup?month=03&year=2025&patientType=ibu_hamil"
        );
        assert_eq!(request.bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn error_envelopes_become_business_errors() {
        let transport = MockTransport::replying(
            StatusCode::NOT_FOUND,
            r#"{"success":false,"message":"Pasien tidak ditemukan","suggestion":"Muat ulang daftar pasien"}"#,
        );
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let err = client.get_patient("tok", 99).await.unwrap_err();
        match err {
            ApiError::Business { message, suggestion } => {
                assert_eq!(message, "Pasien tidak ditemukan");
                assert_eq!(suggestion.as_deref(), Some("Muat ulang daftar pasien"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn plain_http_failures_become_status_errors() {
        let transport = MockTransport::replying(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let err = client.patient_stats("tok").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn add_to_queue_sends_patient_and_date() {
        let transport = MockTransport::replying(StatusCode::OK, r#"{"success":true}"#);
        let client = ApiClient::new(&transport, "http://localhost:3000");
        let date = NaiveDate::parse_from_str("2025-03-10", "%Y-%m-%d").unwrap();

        client.add_to_queue("tok", 42, date).await.unwrap();

        let body: serde_json::Value =
            serde_json::from_slice(&transport.last_request().body.unwrap()).unwrap();
        assert_eq!(body["pasienId"], 42);
        assert_eq!(body["tanggal"], "2025-03-10");
    }

    #[tokio::test]
    async fn submit_measurement_surfaces_calculation_info() {
        let transport = MockTransport::replying(
            StatusCode::OK,
            r#"{"success":true,"data":{"stuntingStatus":"Normal"},"calculationInfo":{"zScore":-0.7,"stuntingStatus":"Normal"}}"#,
        );
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let values = serde_json::json!({"weightKg":"9.1"});
        let response = client.submit_measurement("tok", 5, &values).await.unwrap();
        let info = response.calculation_info.unwrap();
        assert_eq!(info.z_score_text().as_deref(), Some("-0.7"));

        let request = transport.last_request();
        assert_eq!(request.url, "http://localhost:3000/api/measurement/5");
        assert_eq!(request.method, Method::POST);
    }

    #[tokio::test]
    async fn export_returns_raw_bytes_and_the_right_query() {
        let transport = MockTransport::replying(StatusCode::OK, "PK\x03\x04fakexlsx");
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let bytes = client
            .export_report("tok", ReportKind::Puskesmas, 2, 2025, PatientType::Balita)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"PK"));

        assert_eq!(
            transport.last_request().url,
            "http://localhost:3000/api/measurement/export/puskesmas?month=02&year=2025&patientType=balita"
        );
    }

    #[tokio::test]
    async fn editable_fields_unwrap_into_the_core_type() {
        let transport = MockTransport::replying(
            StatusCode::OK,
            r#"{"success":true,"data":{"editableFields":["counselingNotes","resiko"]}}"#,
        );
        let client = ApiClient::new(&transport, "http://localhost:3000");

        let editable = client.editable_fields("tok", 11).await.unwrap();
        assert!(editable.is_editable("resiko"));
        assert!(!editable.is_editable("weightKg"));
    }
}
