//! REST transport over HTTPS.
//!
//! Talks to the appliance's `iControl REST` endpoints under `/mgmt/` with
//! HTTP basic authentication. Every call is blocking and made exactly once.

use crate::error::{Error, Result};
use crate::transport::Transport;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for a management endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Management address, `https://` is assumed when no scheme is given.
    pub address: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate verification (self-signed management certs).
    pub insecure: bool,
    pub timeout_secs: u64,
}

impl ConnectionConfig {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Base URL with scheme and without trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let address = self.address.trim().trim_end_matches('/');
        if address.is_empty() {
            return Err(Error::Config("management address is empty".to_string()));
        }
        if address.starts_with("https://") || address.starts_with("http://") {
            Ok(address.to_string())
        } else {
            Ok(format!("https://{address}"))
        }
    }
}

/// Blocking HTTPS transport.
pub struct RestTransport {
    agent: ureq::Agent,
    base: String,
    authorization: String,
}

impl RestTransport {
    /// Build a transport for the given endpoint.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        if config.username.is_empty() {
            return Err(Error::Config("username is empty".to_string()));
        }

        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(config.insecure)
            .build();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .into();

        let credentials = format!("{}:{}", config.username, config.password);
        Ok(Self {
            agent,
            base: format!("{}/mgmt", config.base_url()?),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn finish(path: &str, mut response: ureq::http::Response<ureq::Body>) -> Result<String> {
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        log::trace!("{status} {path}: {body}");
        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(Error::from_status(status, path, &body))
        }
    }
}

impl Transport for RestTransport {
    fn get(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;
        Self::finish(path, response)
    }

    fn post(&self, path: &str, body: &str) -> Result<String> {
        let url = self.url(path);
        log::debug!("POST {url}");
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .send(body)?;
        Self::finish(path, response)
    }

    fn put(&self, path: &str, body: &str) -> Result<String> {
        let url = self.url(path);
        log::debug!("PUT {url}");
        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .send(body)?;
        Self::finish(path, response)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        log::debug!("DELETE {url}");
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.authorization)
            .call()?;
        Self::finish(path, response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_scheme() {
        let config = ConnectionConfig::new("10.1.1.245/", "admin", "admin");
        assert_eq!(config.base_url().unwrap(), "https://10.1.1.245");

        let config = ConnectionConfig::new("http://localhost:8443", "admin", "admin");
        assert_eq!(config.base_url().unwrap(), "http://localhost:8443");
    }

    #[test]
    fn test_empty_address_is_config_error() {
        let config = ConnectionConfig::new("  ", "admin", "admin");
        assert!(matches!(config.base_url(), Err(Error::Config(_))));
    }

    #[test]
    fn test_new_builds_urls_and_auth() {
        let config = ConnectionConfig::new("bigip.example.com", "admin", "secret");
        let transport = RestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("tm/ltm/pool/~Common~web"),
            "https://bigip.example.com/mgmt/tm/ltm/pool/~Common~web"
        );
        assert_eq!(transport.authorization, "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_new_rejects_missing_username() {
        let config = ConnectionConfig::new("bigip.example.com", "", "secret");
        assert!(RestTransport::new(&config).is_err());
    }
}
