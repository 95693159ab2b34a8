//! The `{success, data, message, suggestion}` response envelope.
//!
//! Every JSON endpoint wraps its payload in this shape. Decoding is
//! deliberately tolerant: `success` may be absent on older endpoints, and
//! error responses may carry only `message`/`suggestion`.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Decode an envelope from raw response bytes.
    pub fn decode(endpoint: &str, body: &[u8]) -> ApiResult<Self>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Unwrap the payload, turning `success: false` and missing data into
    /// errors.
    pub fn into_result(self, endpoint: &str) -> ApiResult<T> {
        if self.success == Some(false) {
            return Err(ApiError::Business {
                message: self
                    .message
                    .unwrap_or_else(|| "Terjadi kesalahan pada server".to_string()),
                suggestion: self.suggestion,
            });
        }
        self.data.ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
        })
    }

    /// For endpoints whose payload is optional (logout, deletes): accept a
    /// successful envelope with no data.
    pub fn into_ack(self) -> ApiResult<()> {
        if self.success == Some(false) {
            return Err(ApiError::Business {
                message: self
                    .message
                    .unwrap_or_else(|| "Terjadi kesalahan pada server".to_string()),
                suggestion: self.suggestion,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_successful_data() {
        let envelope: ApiEnvelope<Vec<i32>> =
            ApiEnvelope::decode("/api/x", br#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(envelope.into_result("/api/x").unwrap(), vec![1, 2]);
    }

    #[test]
    fn success_false_becomes_a_business_error() {
        let envelope: ApiEnvelope<Vec<i32>> = ApiEnvelope::decode(
            "/api/x",
            br#"{"success":false,"message":"Data tidak ditemukan","suggestion":"Coba periode lain"}"#,
        )
        .unwrap();
        let err = envelope.into_result("/api/x").unwrap_err();
        match err {
            ApiError::Business { message, suggestion } => {
                assert_eq!(message, "Data tidak ditemukan");
                assert_eq!(suggestion.as_deref(), Some("Coba periode lain"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_data_on_a_data_endpoint_is_an_error() {
        let envelope: ApiEnvelope<Vec<i32>> =
            ApiEnvelope::decode("/api/x", br#"{"success":true}"#).unwrap();
        assert!(matches!(
            envelope.into_result("/api/x"),
            Err(ApiError::MissingData { .. })
        ));
    }

    #[test]
    fn ack_tolerates_missing_data() {
        let envelope: ApiEnvelope<serde_json::Value> =
            ApiEnvelope::decode("/api/x", br#"{"success":true,"message":"ok"}"#).unwrap();
        assert!(envelope.into_ack().is_ok());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let result: ApiResult<ApiEnvelope<Vec<i32>>> = ApiEnvelope::decode("/api/x", b"<html>");
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
