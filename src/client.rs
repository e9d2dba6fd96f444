// src/client.rs
//! Typed client for the scope back-end's control API.
//!
//! The back-end owns the serial device; this side only lists ports, asks
//! for status and requests connect/disconnect.

use std::time::Duration;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A serial endpoint the back-end can open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub hwid: Option<String>,
}

impl PortInfo {
    /// "Manufacturer: x  |  HWID: y", with `-` for missing fields.
    pub fn meta_line(&self) -> String {
        let manufacturer = self.manufacturer.as_deref().filter(|s| !s.is_empty()).unwrap_or("-");
        let hwid = self.hwid.as_deref().filter(|s| !s.is_empty()).unwrap_or("-");
        format!("Manufacturer: {manufacturer}  |  HWID: {hwid}")
    }
}

/// Reply to `GET /status`. Only the two flags are authoritative here; the
/// rest is informational and may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteStatus {
    pub connected: bool,
    pub recording: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub baud: Option<u32>,
    #[serde(default)]
    pub sample_rate_hz: Option<u32>,
    #[serde(default)]
    pub last_timestamp_ms: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectRequest {
    pub endpoint: String,
    pub baud: u32,
    pub sample_rate_hz: u32,
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub async fn ports(&self) -> Result<Vec<PortInfo>, ApiError> {
        let body = self.send(self.http.get(self.url("ports"))).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn status(&self) -> Result<RemoteStatus, ApiError> {
        let body = self.send(self.http.get(self.url("status"))).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn connect(&self, request: &ConnectRequest) -> Result<(), ApiError> {
        let body = self
            .send(self.http.post(self.url("connect")).json(request))
            .await?;
        check_ack(&body)
    }

    pub async fn disconnect(&self) -> Result<(), ApiError> {
        let body = self.send(self.http.post(self.url("disconnect"))).await?;
        check_ack(&body)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("api returned {status}: {body}");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(body)
    }
}

/// Message for a non-2xx reply: the JSON `error` field when there is one,
/// otherwise the raw body, otherwise the status line.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }
    let raw = body.trim();
    if raw.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        raw.to_owned()
    }
}

/// A 2xx body may still say `{"ok": false, "error": ...}`.
fn check_ack(body: &str) -> Result<(), ApiError> {
    let Ok(ack) = serde_json::from_str::<Ack>(body) else {
        return Ok(());
    };
    match ack.ok {
        Some(false) => Err(ApiError::Rejected(
            ack.error.unwrap_or_else(|| "request rejected".to_owned()),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_preferred() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"error":"endpoint required"}"#);
        assert_eq!(msg, "endpoint required");
    }

    #[test]
    fn raw_body_when_not_json() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n");
        assert_eq!(msg, "Internal Server Error");
        let json_without_error = error_message(StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#);
        assert_eq!(json_without_error, r#"{"detail":"Not Found"}"#);
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[test]
    fn ack_with_ok_false_is_rejected() {
        match check_ack(r#"{"ok":false,"error":"endpoint required"}"#) {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "endpoint required"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(check_ack(r#"{"ok":true}"#).is_ok());
        assert!(check_ack("").is_ok());
    }

    #[test]
    fn status_parses_with_and_without_extras() {
        let full: RemoteStatus = serde_json::from_str(
            r#"{"connected":true,"endpoint":"/dev/ttyACM0","baud":921600,
                "sample_rate_hz":16000,"last_timestamp_ms":null,"recording":true}"#,
        )
        .unwrap();
        assert!(full.connected && full.recording);
        assert_eq!(full.baud, Some(921_600));
        let minimal: RemoteStatus =
            serde_json::from_str(r#"{"connected":false,"recording":false}"#).unwrap();
        assert_eq!(minimal, RemoteStatus::default());
    }

    #[test]
    fn port_meta_uses_dashes() {
        let port: PortInfo =
            serde_json::from_str(r#"{"id":"COM4","label":"COM4 - USB Serial"}"#).unwrap();
        assert_eq!(port.meta_line(), "Manufacturer: -  |  HWID: -");
    }

    #[test]
    fn connect_request_wire_shape() {
        let req = ConnectRequest {
            endpoint: "COM4".into(),
            baud: 921_600,
            sample_rate_hz: 16_000,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"endpoint":"COM4","baud":921600,"sample_rate_hz":16000})
        );
    }

    #[test]
    fn urls_join_cleanly() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("status"), "http://127.0.0.1:8000/api/status");
        assert_eq!(client.url("/ports"), "http://127.0.0.1:8000/api/ports");
    }
}
