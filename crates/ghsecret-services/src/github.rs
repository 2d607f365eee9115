//! GitHub Actions secrets API client implementation.

use async_trait::async_trait;
use ghsecret_types::config::{GithubSettings, DEFAULT_API_URL};
use ghsecret_types::{
    ActionsSecretsService, EncryptedSecretPayload, GhSecretError, PublicKeyMaterial,
    RepositoryRef, Result,
};
use reqwest::{header, Client, ClientBuilder, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

const API_VERSION: &str = "2022-11-28";

/// GitHub client configuration.
#[derive(Clone)]
pub struct GithubConfig {
    /// GitHub API base URL (for Enterprise)
    pub api_url: String,
    /// Token with permission to write repository secrets
    pub token: Option<String>,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: concat!("register-github-secret/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&GithubSettings> for GithubConfig {
    fn from(settings: &GithubSettings) -> Self {
        Self {
            api_url: settings.api_url.clone(),
            token: settings.token.clone(),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// GitHub API client for repository Actions secrets.
#[derive(Clone)]
pub struct GithubClient {
    config: GithubConfig,
    client: Client,
    base_url: Url,
}

impl GithubClient {
    /// Create a new GitHub client.
    pub fn new(config: GithubConfig) -> Result<Self> {
        Self::with_builder(config, Client::builder())
    }

    fn with_builder(config: GithubConfig, builder: ClientBuilder) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| GhSecretError::Config(format!("Invalid GitHub API URL '{}': {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GhSecretError::Config(format!(
                "Invalid GitHub API URL '{}': not a base URL",
                config.api_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .map_err(|e| GhSecretError::Config(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(|e| GhSecretError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Build `{api}/repos/{owner}/{repo}/actions/secrets/{tail..}` with
    /// every segment percent-encoded.
    fn secrets_url(&self, repo: &RepositoryRef, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                GhSecretError::Config(format!("Invalid GitHub API URL '{}'", self.config.api_url))
            })?;
            segments
                .pop_if_empty()
                .push("repos")
                .push(repo.owner())
                .push(repo.name())
                .push("actions")
                .push("secrets")
                .extend(tail);
        }
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Turn a non-success response into a `Service` error.
    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        let text = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.message,
            Err(_) if !text.trim().is_empty() => text.trim().to_string(),
            Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };

        Err(GhSecretError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Serialize)]
struct PutSecretRequest<'a> {
    encrypted_value: &'a str,
    key_id: &'a str,
}

#[async_trait]
impl ActionsSecretsService for GithubClient {
    async fn get_repository_public_key(&self, repo: &RepositoryRef) -> Result<PublicKeyMaterial> {
        let url = self.secrets_url(repo, &["public-key"])?;
        tracing::debug!(repo.owner = repo.owner(), repo.name = repo.name(), "fetching repository public key");

        let resp = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| GhSecretError::Http(format!("Failed to get public key: {}", e)))?;

        Self::check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| GhSecretError::Http(format!("Failed to parse public key: {}", e)))
    }

    async fn submit_encrypted_secret(
        &self,
        repo: &RepositoryRef,
        payload: &EncryptedSecretPayload,
    ) -> Result<()> {
        let url = self.secrets_url(repo, &[payload.name().as_str()])?;
        tracing::debug!(
            repo.owner = repo.owner(),
            repo.name = repo.name(),
            secret.name = payload.name().as_str(),
            "submitting encrypted secret"
        );

        let body = PutSecretRequest {
            encrypted_value: payload.encrypted_value(),
            key_id: payload.key_id(),
        };

        let resp = self
            .authorize(self.client.put(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GhSecretError::Http(format!("Failed to submit secret: {}", e)))?;

        Self::check_status(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghsecret_types::SecretName;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn repo() -> RepositoryRef {
        RepositoryRef::new("aereal", "myrepo").unwrap()
    }

    fn client_for(api_url: &str, token: Option<&str>) -> GithubClient {
        let config = GithubConfig {
            api_url: api_url.to_string(),
            token: token.map(str::to_string),
            ..Default::default()
        };
        GithubClient::with_builder(config, Client::builder().no_proxy()).unwrap()
    }

    /// Serve exactly one HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let content_length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_secrets_url() {
        let client = client_for("https://api.github.com", None);
        let url = client.secrets_url(&repo(), &["public-key"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/aereal/myrepo/actions/secrets/public-key"
        );
    }

    #[test]
    fn test_secrets_url_keeps_enterprise_prefix() {
        let client = client_for("https://ghe.example.com/api/v3/", None);
        let url = client.secrets_url(&repo(), &["MY_SECRET"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/aereal/myrepo/actions/secrets/MY_SECRET"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let config = GithubConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(GithubClient::new(config), Err(GhSecretError::Config(_))));
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = GithubConfig {
            token: Some("ghp_supersecret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("ghp_supersecret"));
    }

    #[tokio::test]
    async fn test_get_repository_public_key() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"key_id":"0xdeadbeaf","key":"2Sg8iYjAxxmI2LvUXpJjkYrMxURPc8r+dB7TJyvv1234"}"#,
        )
        .await;
        let client = client_for(&url, Some("ghp_test"));

        let key = client.get_repository_public_key(&repo()).await.unwrap();
        assert_eq!(key.key_id, "0xdeadbeaf");
        assert_eq!(key.key, "2Sg8iYjAxxmI2LvUXpJjkYrMxURPc8r+dB7TJyvv1234");

        let request = server.await.unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("GET /repos/aereal/myrepo/actions/secrets/public-key "));
        assert!(lower.contains("authorization: bearer ghp_test"));
        assert!(lower.contains("accept: application/vnd.github+json"));
        assert!(lower.contains("x-github-api-version: 2022-11-28"));
    }

    #[tokio::test]
    async fn test_submit_encrypted_secret() {
        let (url, server) = serve_once("201 Created", "{}").await;
        let client = client_for(&url, Some("ghp_test"));
        let payload = EncryptedSecretPayload::new(
            SecretName::new("MY_SECRET").unwrap(),
            "0xdeadbeaf",
            "c2VhbGVk",
        );

        client.submit_encrypted_secret(&repo(), &payload).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /repos/aereal/myrepo/actions/secrets/MY_SECRET "));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"encrypted_value": "c2VhbGVk", "key_id": "0xdeadbeaf"})
        );
    }

    #[tokio::test]
    async fn test_error_status_becomes_service_error() {
        let (url, server) = serve_once(
            "404 Not Found",
            r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#,
        )
        .await;
        let client = client_for(&url, None);

        let err = client.get_repository_public_key(&repo()).await.unwrap_err();
        match err {
            GhSecretError::Service { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("authorization:"));
    }
}
