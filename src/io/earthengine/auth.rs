//! Service-account authentication for Earth Engine.
//!
//! A key file is turned into a short-lived OAuth2 access token through the
//! JWT bearer grant: an RS256-signed assertion naming the service account and
//! the requested scopes is posted to the key's `token_uri`.
//!
//! The resulting [`Session`] is created once at startup and shared by every
//! request. Tokens live for an hour; [`Session::bearer_token`] mints a new one
//! shortly before expiry.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Read-only access to Earth Engine.
pub const EARTH_ENGINE_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/earthengine.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub(crate) const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Cannot read service account key {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed service account key: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
    #[error("Token request failed: {0}")]
    Http(String),
    #[error("Credentials rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Fields of a Google service-account JSON key used for the JWT grant.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Signed JWT assertion for the bearer grant.
    pub fn assertion(&self, scopes: &[String], now: DateTime<Utc>) -> Result<String, CredentialError> {
        let encoding_key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone, Debug)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Authenticated handle to Earth Engine.
pub struct Session {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    http: reqwest::Client,
    token: RwLock<AccessToken>,
}

impl Session {
    /// Load the key file and obtain a first token. Any failure here means the
    /// service cannot talk to Earth Engine at all.
    pub async fn initialize(key_path: &Path, scopes: &[&str]) -> Result<Self, CredentialError> {
        let key = ServiceAccountKey::from_file(key_path)?;
        Self::from_key(key, scopes).await
    }

    pub async fn from_key(key: ServiceAccountKey, scopes: &[&str]) -> Result<Self, CredentialError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sarmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CredentialError::Http(format!("Failed to create HTTP client: {}", e)))?;
        let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();
        let token = fetch_token(&http, &key, &scopes).await?;
        info!(
            "Authenticated as {} (project {})",
            key.client_email, key.project_id
        );
        Ok(Self {
            key,
            scopes,
            http,
            token: RwLock::new(token),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// Current access token, re-minted when it is about to expire.
    pub async fn bearer_token(&self) -> Result<String, CredentialError> {
        {
            let token = self.token.read().await;
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let mut token = self.token.write().await;
        if !token.is_fresh(Utc::now()) {
            debug!("Access token expiring, requesting a new one");
            *token = fetch_token(&self.http, &self.key, &self.scopes).await?;
        }
        Ok(token.value.clone())
    }
}

async fn fetch_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    scopes: &[String],
) -> Result<AccessToken, CredentialError> {
    let now = Utc::now();
    let assertion = key.assertion(scopes, now)?;

    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| CredentialError::Http(format!("Request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CredentialError::Http(format!("Failed to read response: {}", e)))?;
    if !status.is_success() {
        return Err(CredentialError::Rejected {
            status: status.as_u16(),
            message: body,
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| CredentialError::Http(format!("Unexpected token response: {}", e)))?;
    let lifetime = parsed.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
    debug!("Obtained access token valid for {}s", lifetime);
    Ok(AccessToken {
        value: parsed.access_token,
        expires_at: now + Duration::seconds(lifetime),
    })
}
