use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Provider, VcsError};
use crate::config::ProviderConfig;

const USER_AGENT: &str = concat!("recombinant/", env!("CARGO_PKG_VERSION"));

/// Builds the process-wide HTTP client shared by every provider call.
pub fn build_client(config: &ProviderConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .build()
}

pub(crate) fn transport_error(provider: Provider, err: reqwest::Error) -> VcsError {
    let message = if err.is_timeout() {
        format!("request to {provider} timed out")
    } else {
        err.to_string()
    };
    tracing::warn!("{provider} transport error: {message}");
    VcsError::Provider {
        provider,
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

/// Turns a non-success response into a `Provider` error carrying the
/// upstream status and whatever message the body holds.
pub(crate) async fn upstream_error(provider: Provider, response: Response) -> VcsError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    });
    tracing::warn!("{provider} returned {}: {message}", status.as_u16());
    VcsError::Provider {
        provider,
        status: Some(status.as_u16()),
        message,
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message").or_else(|| value.get("error"))?;
    Some(match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Checks the status, classifying it with `classify` first, then decodes
/// the JSON body.
pub(crate) async fn read_json<T, F>(
    provider: Provider,
    response: Response,
    classify: F,
) -> Result<T, VcsError>
where
    T: DeserializeOwned,
    F: FnOnce(StatusCode) -> Option<VcsError>,
{
    let status = response.status();
    if !status.is_success() {
        if let Some(err) = classify(status) {
            return Err(err);
        }
        return Err(upstream_error(provider, response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| transport_error(provider, e))
}

/// Percent-encodes each `/`-separated segment of a path, keeping the slashes.
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes a base64 file payload. GitHub wraps these at 60 columns.
pub(crate) fn decode_base64(provider: Provider, content: &str) -> Result<Vec<u8>, VcsError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| VcsError::Provider {
        provider,
        status: None,
        message: format!("invalid base64 content: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("src/my file.rs"), "src/my%20file.rs");
        assert_eq!(encode_path("/docs/a#b.md/"), "docs/a%23b.md");
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let wrapped = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(
            decode_base64(Provider::GitHub, wrapped).unwrap(),
            b"hello world"
        );
        assert!(matches!(
            decode_base64(Provider::GitLab, "not base64!!"),
            Err(VcsError::Provider {
                provider: Provider::GitLab,
                ..
            })
        ));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"message":"Not Found"}"#).as_deref(),
            Some("Not Found")
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_token"}"#).as_deref(),
            Some("invalid_token")
        );
        assert_eq!(
            error_message(r#"{"message":{"ref":["is missing"]}}"#).as_deref(),
            Some(r#"{"ref":["is missing"]}"#)
        );
        assert_eq!(error_message("<html>"), None);
    }
}
