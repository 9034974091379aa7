use crate::config::EndpointConfig;
use crate::error::{Result, VouchrError};
use crate::record::VoucherRecord;
use crate::services::{ListService, SaveOutcome, SaveService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Save and list endpoints reached over HTTP with one shared client.
pub struct HttpVoucherService {
    client: Client,
    save_url: String,
    list_url: String,
    timeout: u64,
}

impl HttpVoucherService {
    pub fn new(endpoints: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout))
            .user_agent(concat!("vouchr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VouchrError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            save_url: endpoints.save_url.clone(),
            list_url: endpoints.list_url.clone(),
            timeout: endpoints.timeout,
        })
    }

    pub fn save_url(&self) -> &str {
        &self.save_url
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    fn map_request_error(&self, error: reqwest::Error) -> VouchrError {
        if error.is_timeout() {
            VouchrError::Timeout {
                seconds: self.timeout,
            }
        } else {
            VouchrError::from(error)
        }
    }
}

#[async_trait]
impl SaveService for HttpVoucherService {
    async fn save(&self, record: &VoucherRecord) -> Result<SaveOutcome> {
        info!(url = %self.save_url, voucher_code = %record.voucher_code, "saving voucher");

        let response = self
            .client
            .post(&self.save_url)
            .json(record)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let outcome = interpret_save_response(status, &body);
        match &outcome {
            Ok(outcome) => debug!(%status, ?outcome, "save endpoint responded"),
            Err(e) => warn!(%status, error = %e, "save failed"),
        }
        outcome
    }
}

#[async_trait]
impl ListService for HttpVoucherService {
    async fn list(&self) -> Result<Vec<VoucherRecord>> {
        info!(url = %self.list_url, "fetching vouchers");

        let response = self
            .client
            .get(&self.list_url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let vouchers = interpret_list_response(status, &body)?;
        debug!(count = vouchers.len(), "list endpoint responded");
        Ok(vouchers)
    }
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    vouchers: Option<Vec<Value>>,
}

/// A stored voucher as the list endpoint returns it. Any field may be
/// absent, `null`, or not a string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListedVoucher {
    title: Option<Value>,
    platform: Option<Value>,
    shared_via: Option<Value>,
    voucher_code: Option<Value>,
    link: Option<Value>,
    expiry: Option<Value>,
}

impl From<ListedVoucher> for VoucherRecord {
    fn from(listed: ListedVoucher) -> Self {
        VoucherRecord {
            title: value_text(listed.title),
            platform: value_text(listed.platform),
            shared_via: value_text(listed.shared_via),
            voucher_code: value_text(listed.voucher_code),
            link: value_text(listed.link),
            expiry: value_text(listed.expiry),
        }
    }
}

fn value_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Classifies a save response.
///
/// A `"duplicate"` status in the body takes precedence over the HTTP status.
/// A body that is not JSON is a failure even on 2xx.
pub fn interpret_save_response(status: StatusCode, body: &str) -> Result<SaveOutcome> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| VouchrError::MalformedResponse {
            message: e.to_string(),
        })?;

    let parsed = SaveResponse::deserialize(&value).unwrap_or(SaveResponse { status: None });

    if parsed.status.as_deref() == Some("duplicate") {
        Ok(SaveOutcome::Duplicate)
    } else if status.is_success() {
        Ok(SaveOutcome::Saved)
    } else {
        Err(VouchrError::Server {
            status: status.as_u16(),
        })
    }
}

/// Extracts the `vouchers` array; an absent or null array is empty.
///
/// Fields that are missing, `null` or not strings become text so that one
/// odd record never hides the rest.
pub fn interpret_list_response(status: StatusCode, body: &str) -> Result<Vec<VoucherRecord>> {
    if !status.is_success() {
        return Err(VouchrError::Server {
            status: status.as_u16(),
        });
    }

    let parsed: ListResponse =
        serde_json::from_str(body).map_err(|e| VouchrError::MalformedResponse {
            message: e.to_string(),
        })?;

    let vouchers = parsed
        .vouchers
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match ListedVoucher::deserialize(&entry) {
            Ok(listed) => Some(VoucherRecord::from(listed)),
            Err(e) => {
                warn!(error = %e, "skipping listed voucher that is not an object");
                None
            }
        })
        .collect();

    Ok(vouchers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[test]
    fn test_save_success() {
        let outcome = interpret_save_response(StatusCode::OK, r#"{"message":"stored"}"#);
        assert_eq!(outcome.unwrap(), SaveOutcome::Saved);

        let outcome = interpret_save_response(StatusCode::CREATED, "{}");
        assert_eq!(outcome.unwrap(), SaveOutcome::Saved);
    }

    #[test]
    fn test_save_duplicate_wins_over_status() {
        let body = r#"{"status":"duplicate"}"#;
        assert_eq!(
            interpret_save_response(StatusCode::OK, body).unwrap(),
            SaveOutcome::Duplicate
        );
        assert_eq!(
            interpret_save_response(StatusCode::CONFLICT, body).unwrap(),
            SaveOutcome::Duplicate
        );
    }

    #[test]
    fn test_save_failure_status() {
        let result = interpret_save_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"status":"error"}"#);
        assert!(matches!(result, Err(VouchrError::Server { status: 500 })));
    }

    #[test]
    fn test_save_malformed_body() {
        let result = interpret_save_response(StatusCode::OK, "<html>ok</html>");
        assert!(matches!(result, Err(VouchrError::MalformedResponse { .. })));

        let result = interpret_save_response(StatusCode::OK, "");
        assert!(matches!(result, Err(VouchrError::MalformedResponse { .. })));
    }

    #[test]
    fn test_save_non_object_json() {
        // valid JSON without a status field is judged on the HTTP status alone
        assert_eq!(
            interpret_save_response(StatusCode::OK, "true").unwrap(),
            SaveOutcome::Saved
        );
        assert!(interpret_save_response(StatusCode::BAD_REQUEST, "[1,2]").is_err());
    }

    #[test]
    fn test_list_vouchers() {
        let body = r#"{"vouchers":[
            {"title":"Flat 50","voucherCode":"A-1","link":"https://a.in","expiry":"2025-01-01"},
            {"voucherCode":"B-2"}
        ]}"#;

        let vouchers = interpret_list_response(StatusCode::OK, body).unwrap();
        assert_eq!(vouchers.len(), 2);
        assert_eq!(vouchers[0].title, "Flat 50");
        assert_eq!(vouchers[1].voucher_code, "B-2");
        assert_eq!(vouchers[1].display_title(), "(No title)");
    }

    #[test]
    fn test_list_tolerates_null_and_non_string_fields() {
        let body = r#"{"vouchers":[
            {"title":null,"voucherCode":"A-1","link":"https://a.in","expiry":"2025-01-01"},
            {"title":"Numbers","voucherCode":12345,"expiry":false,"platform":{"name":"x"}},
            "not a record"
        ]}"#;

        let vouchers = interpret_list_response(StatusCode::OK, body).unwrap();
        assert_eq!(vouchers.len(), 2);
        assert_eq!(vouchers[0].display_title(), "(No title)");
        assert_eq!(vouchers[0].voucher_code, "A-1");
        assert_eq!(vouchers[1].voucher_code, "12345");
        assert_eq!(vouchers[1].expiry, "false");
        assert_eq!(vouchers[1].platform, r#"{"name":"x"}"#);
        assert!(vouchers[1].link.is_empty());
    }

    #[test]
    fn test_list_absent_or_null_is_empty() {
        assert!(interpret_list_response(StatusCode::OK, "{}").unwrap().is_empty());
        assert!(interpret_list_response(StatusCode::OK, r#"{"vouchers":null}"#).unwrap().is_empty());
        assert!(interpret_list_response(StatusCode::OK, r#"{"vouchers":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_list_failures() {
        let result = interpret_list_response(StatusCode::BAD_GATEWAY, r#"{"vouchers":[]}"#);
        assert!(matches!(result, Err(VouchrError::Server { status: 502 })));

        let result = interpret_list_response(StatusCode::OK, "not json");
        assert!(matches!(result, Err(VouchrError::MalformedResponse { .. })));
    }

    fn stub_endpoints(addr: SocketAddr, timeout: u64) -> EndpointConfig {
        EndpointConfig {
            save_url: format!("http://{}/vouchers", addr),
            list_url: format!("http://{}/vouchers", addr),
            timeout,
        }
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&data).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&data).into_owned()
    }

    /// Answers a single request and hands back what the client sent.
    async fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (addr, handle)
    }

    fn sample_record() -> VoucherRecord {
        VoucherRecord {
            title: "Flat 20% off".to_string(),
            platform: "Swiggy".to_string(),
            shared_via: "WhatsApp".to_string(),
            voucher_code: "SWG-1".to_string(),
            link: "https://swiggy.com/offers".to_string(),
            expiry: "2025-01-05".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_posts_json_record() {
        let (addr, server) = serve_once("200 OK", r#"{"message":"stored"}"#).await;
        let service = HttpVoucherService::new(&stub_endpoints(addr, 5)).unwrap();

        let outcome = service.save(&sample_record()).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);

        let request = server.await.unwrap();
        let lowered = request.to_lowercase();
        assert!(request.starts_with("POST /vouchers HTTP/1.1"));
        assert!(lowered.contains("content-type: application/json"));
        assert!(lowered.contains("user-agent: vouchr/"));

        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["voucherCode"], "SWG-1");
        assert_eq!(sent["sharedVia"], "WhatsApp");
        assert_eq!(sent.as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_save_duplicate_over_http() {
        let (addr, server) = serve_once("409 Conflict", r#"{"status":"duplicate"}"#).await;
        let service = HttpVoucherService::new(&stub_endpoints(addr, 5)).unwrap();

        let outcome = service.save(&sample_record()).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Duplicate);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_save_server_error_over_http() {
        let (addr, server) = serve_once("500 Internal Server Error", r#"{"status":"error"}"#).await;
        let service = HttpVoucherService::new(&stub_endpoints(addr, 5)).unwrap();

        let result = service.save(&sample_record()).await;
        assert!(matches!(result, Err(VouchrError::Server { status: 500 })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_list_over_http() {
        let (addr, server) = serve_once(
            "200 OK",
            r#"{"vouchers":[{"title":null,"voucherCode":"A-1"},{"voucherCode":7}]}"#,
        )
        .await;
        let service = HttpVoucherService::new(&stub_endpoints(addr, 5)).unwrap();

        let vouchers = service.list().await.unwrap();
        assert_eq!(vouchers.len(), 2);
        assert_eq!(vouchers[1].voucher_code, "7");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /vouchers HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(3)).await;
            drop(socket);
        });

        let service = HttpVoucherService::new(&stub_endpoints(addr, 1)).unwrap();
        let result = service.save(&sample_record()).await;
        assert!(matches!(result, Err(VouchrError::Timeout { seconds: 1 })));

        server.abort();
    }

    #[test]
    fn test_client_construction() {
        let service = HttpVoucherService::new(&EndpointConfig::default()).unwrap();
        assert_eq!(service.save_url(), EndpointConfig::default().save_url);
        assert_eq!(service.list_url(), EndpointConfig::default().list_url);
    }
}
