use crate::error::{ApiError, ApiResult};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Clone)]
pub struct SpotifyApi {
    client: Client,
    base_url: String,
}

impl Default for SpotifyApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotifyApi {
    pub fn new() -> Self {
        Self::with_base_url(SPOTIFY_API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("implicit-grant/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }

    /// Fetches the current user's profile with the given bearer token. A
    /// non-200 status is logged but the body is still parsed, since the
    /// endpoint returns its error details as JSON too.
    pub async fn get_current_user(&self, token: &str) -> ApiResult<Map<String, Value>> {
        let response = self
            .client
            .get(format!("{}/me", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Profile endpoint returned {}, still parsing body", status);
        }

        let body = response.text().await?;
        parse_profile_body(&body)
    }
}

fn parse_profile_body(body: &str) -> ApiResult<Map<String, Value>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::UnexpectedBody(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::UnexpectedBody(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response on a loopback port and hands
    /// back the raw request it received.
    async fn one_shot_server(status_line: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = vec![0u8; 8192];
            let size = socket.read(&mut buffer).await.unwrap();
            let request = String::from_utf8_lossy(&buffer[..size]).to_string();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (format!("http://127.0.0.1:{}", port), handle)
    }

    #[tokio::test]
    async fn test_request_carries_bearer_header() {
        let (base, server) = one_shot_server("HTTP/1.1 200 OK", r#"{"display_name":"Ada"}"#).await;
        let api = SpotifyApi::with_base_url(base);

        api.get_current_user("T").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.contains("GET /me"));
        assert!(request.contains("authorization: Bearer T") || request.contains("Authorization: Bearer T"));
    }

    #[tokio::test]
    async fn test_object_body_is_forwarded() {
        let (base, _server) = one_shot_server("HTTP/1.1 200 OK", r#"{"display_name":"Ada"}"#).await;
        let api = SpotifyApi::with_base_url(base);

        let profile = api.get_current_user("T").await.unwrap();
        assert_eq!(
            profile.get("display_name").and_then(|v| v.as_str()),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let (base, _server) = one_shot_server("HTTP/1.1 200 OK", "<html>nope</html>").await;
        let api = SpotifyApi::with_base_url(base);

        let err = api.get_current_user("T").await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedBody(_)));
    }

    #[tokio::test]
    async fn test_non_object_json_is_an_error() {
        let (base, _server) = one_shot_server("HTTP/1.1 200 OK", "[1,2,3]").await;
        let api = SpotifyApi::with_base_url(base);

        let err = api.get_current_user("T").await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedBody(_)));
    }

    #[tokio::test]
    async fn test_non_200_body_is_still_parsed() {
        let (base, _server) =
            one_shot_server("HTTP/1.1 401 Unauthorized", r#"{"error":{"status":401}}"#).await;
        let api = SpotifyApi::with_base_url(base);

        let body = api.get_current_user("expired").await.unwrap();
        assert!(body.contains_key("error"));
    }

    #[test]
    fn test_parse_profile_body_accepts_object() {
        let map = parse_profile_body(r#"{"id":"u1"}"#).unwrap();
        assert_eq!(map.get("id").and_then(|v| v.as_str()), Some("u1"));
    }

    #[test]
    fn test_parse_profile_body_rejects_scalar() {
        assert!(parse_profile_body("42").is_err());
    }
}
