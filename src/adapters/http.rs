use crate::domain::model::{EmailAddress, PollOutcome, ServerEndpoint, VerificationCode};
use crate::domain::ports::CodeApi;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Builds the client shared by the probe and the poller: one fixed timeout per request.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

pub fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// Loose truthiness for the relay's `success` and `code` fields: null, false, 0 and empty values are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn extract_code(body: &Value) -> Option<VerificationCode> {
    let object = body.as_object()?;
    if !object.get("success").map(is_truthy).unwrap_or(false) {
        return None;
    }

    match object.get("code")? {
        Value::String(code) if !code.is_empty() => Some(VerificationCode::new(code.clone())),
        Value::Number(code) if is_truthy(&Value::Number(code.clone())) => {
            Some(VerificationCode::new(code.to_string()))
        }
        _ => None,
    }
}

/// Classifies the body of a 200 `get_code` response.
pub fn classify_code_body(body: &str) -> PollOutcome {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return PollOutcome::MalformedBody(e.to_string()),
    };

    if !parsed.is_object() {
        return PollOutcome::MalformedBody("expected a JSON object".to_string());
    }

    match extract_code(&parsed) {
        Some(code) => PollOutcome::Success(code),
        None => {
            tracing::debug!("No verification code in response: {}", parsed);
            PollOutcome::NotYet
        }
    }
}

/// `CodeApi` backed by `GET {endpoint}/get_code`.
#[derive(Debug, Clone)]
pub struct HttpCodeApi {
    client: Client,
    endpoint: ServerEndpoint,
}

impl HttpCodeApi {
    pub fn new(endpoint: ServerEndpoint, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(request_timeout)?,
            endpoint,
        })
    }
}

#[async_trait]
impl CodeApi for HttpCodeApi {
    async fn request_code(&self, email: &EmailAddress) -> PollOutcome {
        let url = match self.endpoint.code_url(email) {
            Ok(url) => url,
            Err(e) => return PollOutcome::TransportError(e.to_string()),
        };

        tracing::debug!("Making code request to: {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return PollOutcome::TransportError(describe_request_error(&e)),
        };

        let status = response.status();
        tracing::debug!("Code response status: {}", status);
        if status != StatusCode::OK {
            return PollOutcome::ProtocolError(status.as_u16());
        }

        match response.text().await {
            Ok(body) => classify_code_body(&body),
            Err(e) => PollOutcome::TransportError(describe_request_error(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn api_for(server: &MockServer, timeout: Duration) -> HttpCodeApi {
        let endpoint = ServerEndpoint::parse(&server.base_url()).unwrap();
        HttpCodeApi::new(endpoint, timeout).unwrap()
    }

    #[test]
    fn test_classify_success() {
        assert_eq!(
            classify_code_body(r#"{"success": true, "code": "938298"}"#),
            PollOutcome::Success(VerificationCode::new("938298"))
        );
    }

    #[test]
    fn test_classify_numeric_code() {
        assert_eq!(
            classify_code_body(r#"{"success": 1, "code": 123456}"#),
            PollOutcome::Success(VerificationCode::new("123456"))
        );
    }

    #[test]
    fn test_classify_not_yet() {
        assert_eq!(classify_code_body(r#"{"success": false}"#), PollOutcome::NotYet);
        assert_eq!(
            classify_code_body(r#"{"success": true, "code": ""}"#),
            PollOutcome::NotYet
        );
        assert_eq!(
            classify_code_body(r#"{"success": true, "code": null}"#),
            PollOutcome::NotYet
        );
        assert_eq!(
            classify_code_body(r#"{"success": "", "code": "111111"}"#),
            PollOutcome::NotYet
        );
        assert_eq!(classify_code_body(r#"{"code": "111111"}"#), PollOutcome::NotYet);
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(
            classify_code_body("<html>busy</html>"),
            PollOutcome::MalformedBody(_)
        ));
        assert!(matches!(
            classify_code_body(r#"["success", "code"]"#),
            PollOutcome::MalformedBody(_)
        ));
    }

    #[tokio::test]
    async fn test_request_code_success() {
        let server = MockServer::start_async().await;
        let code_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/get_code")
                    .query_param("email", "abc123@example.com");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"success": true, "code": "938298"}));
            })
            .await;

        let api = api_for(&server, Duration::from_secs(5));
        let email = EmailAddress::new("abc123@example.com").unwrap();
        let outcome = api.request_code(&email).await;

        code_mock.assert_async().await;
        assert_eq!(outcome, PollOutcome::Success(VerificationCode::new("938298")));
    }

    #[tokio::test]
    async fn test_request_code_server_error() {
        let server = MockServer::start_async().await;
        let code_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/get_code");
                then.status(503);
            })
            .await;

        let api = api_for(&server, Duration::from_secs(5));
        let email = EmailAddress::new("abc123@example.com").unwrap();

        assert_eq!(api.request_code(&email).await, PollOutcome::ProtocolError(503));
        code_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_code_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/get_code");
                then.status(200).body("not json");
            })
            .await;

        let api = api_for(&server, Duration::from_secs(5));
        let email = EmailAddress::new("abc123@example.com").unwrap();

        assert!(matches!(
            api.request_code(&email).await,
            PollOutcome::MalformedBody(_)
        ));
    }

    #[tokio::test]
    async fn test_request_code_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/get_code");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(serde_json::json!({"success": true, "code": "1"}));
            })
            .await;

        let api = api_for(&server, Duration::from_millis(200));
        let email = EmailAddress::new("abc123@example.com").unwrap();

        assert!(matches!(
            api.request_code(&email).await,
            PollOutcome::TransportError(_)
        ));
    }

    #[tokio::test]
    async fn test_request_code_connection_refused() {
        let endpoint = ServerEndpoint::parse("http://127.0.0.1:1").unwrap();
        let api = HttpCodeApi::new(endpoint, Duration::from_secs(2)).unwrap();
        let email = EmailAddress::new("abc123@example.com").unwrap();

        assert!(matches!(
            api.request_code(&email).await,
            PollOutcome::TransportError(_)
        ));
    }
}
