//! Blocking client for the note server's session and item content endpoints.

mod item_path;

pub use item_path::{content_url, encode_item_path, item_path};

use std::fs;
use std::path::PathBuf;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::note::{parse_serialized_note, Note};

const AUTH_HEADER: &str = "X-API-AUTH";

/// Connection settings handed to [`ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Extra root CA (PEM or DER) trusted in addition to the system roots.
    pub ca_cert: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ca_cert: None,
        }
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(path) = &config.ca_cert {
            let cert_error = |message: String| SyncError::Certificate {
                path: path.clone(),
                message,
            };
            let bytes = fs::read(path).map_err(|e| cert_error(e.to_string()))?;
            let is_pem = bytes
                .windows(b"-----BEGIN".len())
                .any(|w| w == b"-----BEGIN");
            let cert = if is_pem {
                reqwest::Certificate::from_pem(&bytes)
            } else {
                reqwest::Certificate::from_der(&bytes)
            }
            .map_err(|e| cert_error(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|e| transport_error(&config.base_url, e))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a session and return its token.
    pub fn create_session(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/api/sessions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&SessionRequest { email, password })
            .send()
            .map_err(|e| transport_error(&url, e))?;
        let resp = check_status(&url, "POST", resp)?;

        let text = resp.text().map_err(|e| transport_error(&url, e))?;
        if text.trim().is_empty() {
            return Err(SyncError::Auth(
                "Missing session id from /api/sessions response".to_string(),
            ));
        }

        let session: SessionResponse = serde_json::from_str(&text)
            .map_err(|e| SyncError::Auth(format!("Unreadable /api/sessions response: {}", e)))?;
        session.id.ok_or_else(|| {
            SyncError::Auth("Missing session id from /api/sessions response".to_string())
        })
    }

    /// Authenticate and bind the token to this client.
    pub fn login(self, email: &str, password: &str) -> Result<Session> {
        let token = self.create_session(email, password)?;
        Ok(Session {
            client: self,
            token,
        })
    }

    /// Fetch the raw serialized note text for `note_id`.
    pub fn fetch_content(&self, token: &str, note_id: &str) -> Result<String> {
        let url = content_url(&self.base_url, note_id);
        let resp = self
            .http
            .get(&url)
            .header(AUTH_HEADER, token)
            .send()
            .map_err(|e| transport_error(&url, e))?;
        let resp = check_status(&url, "GET", resp)?;

        resp.text().map_err(|e| transport_error(&url, e))
    }

    /// Replace the content of `note_id` with `bytes`, uploaded as a single
    /// multipart `file` field.
    ///
    /// Any 2xx status is success. The reply is returned as JSON when it parses,
    /// otherwise as a JSON string holding the raw text.
    pub fn store_content(
        &self,
        token: &str,
        note_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value> {
        let url = content_url(&self.base_url, note_id);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| transport_error(&url, e))?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .http
            .put(&url)
            .header(AUTH_HEADER, token)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .map_err(|e| transport_error(&url, e))?;
        let resp = check_status(&url, "PUT", resp)?;

        let text = resp.text().map_err(|e| transport_error(&url, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        match serde_json::from_str(&text) {
            Ok(ack) => Ok(ack),
            Err(e) => {
                debug!(url = %url, error = %e, "non-JSON store reply");
                Ok(Value::String(text))
            }
        }
    }
}

/// An authenticated client. One is created per command run.
pub struct Session {
    client: ApiClient,
    token: String,
}

impl Session {
    pub fn fetch_note(&self, note_id: &str) -> Result<Note> {
        let content = self.client.fetch_content(&self.token, note_id)?;
        parse_serialized_note(&content)
    }

    /// Upload serialized note text as `<note_id>.md`.
    pub fn store_note(&self, note_id: &str, serialized: &str) -> Result<Value> {
        self.client.store_content(
            &self.token,
            note_id,
            &format!("{}.md", note_id),
            serialized.as_bytes().to_vec(),
        )
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> SyncError {
    SyncError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn check_status(url: &str, method: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    debug!(method, url, status = status.as_u16(), "note server response");

    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    Err(SyncError::Api {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}
