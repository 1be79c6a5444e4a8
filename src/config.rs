use std::fmt;
use std::path::PathBuf;

use crate::client::{ApiClient, ClientConfig, Session};
use crate::error::{Result, SyncError};

pub const DEFAULT_BASE_URL: &str = "https://notes.home.arpa";

pub const ENV_BASE_URL: &str = "JOPLIN_BASE_URL";
pub const ENV_EMAIL: &str = "JOPLIN_EMAIL";
pub const ENV_PASSWORD: &str = "JOPLIN_PASSWORD";
pub const ENV_CA_CERT: &str = "JOPLIN_CA_CERT";
/// Log filter for the binary, in `tracing_subscriber::EnvFilter` syntax.
pub const ENV_LOG: &str = "JOPLIN_SYNC_LOG";

/// Resolved connection settings for one command run.
#[derive(Clone)]
pub struct SyncConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub ca_cert: Option<PathBuf>,
}

impl SyncConfig {
    /// Build from the global CLI options. Email and password are required.
    pub fn from_globals(
        base_url: &str,
        email: Option<String>,
        password: Option<String>,
        ca_cert: Option<PathBuf>,
    ) -> Result<Self> {
        let email = email.filter(|e| !e.is_empty());
        let password = password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(SyncError::MissingCredentials);
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            password,
            ca_cert,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.base_url.as_str());
        match &self.ca_cert {
            Some(path) => config.with_ca_cert(path.clone()),
            None => config,
        }
    }

    /// Build a client and open a fresh session.
    pub fn login(&self) -> Result<Session> {
        ApiClient::new(&self.client_config())?.login(&self.email, &self.password)
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("ca_cert", &self.ca_cert)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_globals() {
        let config = SyncConfig::from_globals(
            "https://notes.example/",
            Some("me@example.com".to_string()),
            Some("secret".to_string()),
            Some(PathBuf::from("/etc/ca.pem")),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://notes.example");
        let client = config.client_config();
        assert_eq!(client.base_url, "https://notes.example");
        assert_eq!(client.ca_cert, Some(PathBuf::from("/etc/ca.pem")));
    }

    #[test]
    fn test_missing_credentials() {
        let missing_password =
            SyncConfig::from_globals(DEFAULT_BASE_URL, Some("me@example.com".to_string()), None, None);
        assert!(matches!(missing_password, Err(SyncError::MissingCredentials)));

        let empty_email = SyncConfig::from_globals(
            DEFAULT_BASE_URL,
            Some(String::new()),
            Some("secret".to_string()),
            None,
        );
        assert!(matches!(empty_email, Err(SyncError::MissingCredentials)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = SyncConfig::from_globals(
            DEFAULT_BASE_URL,
            Some("me@example.com".to_string()),
            Some("hunter2".to_string()),
            None,
        )
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("me@example.com"));
    }
}
