//! Transport collaborator - talks to the employee/qualification backend
//!
//! The core only depends on the [`Transport`] trait. [`HttpTransport`] is the
//! production implementation; tests substitute an in-memory backend.
//!
//! ```text
//! Transport (trait)
//!     |
//!     +-- HttpTransport (reqwest, bearer auth)
//!             |
//!             +-- AccessTokenProvider (trait)
//!                     +-- StaticToken
//!                     +-- EnvToken
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::TransportError;
use crate::entities::{Employee, EmployeePayload, Qualification, QualificationDetails, QualificationPayload};

/// Calls the backend offers; all of them need a bearer credential
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, TransportError>;

    async fn fetch_employee(&self, id: i64) -> Result<Employee, TransportError>;

    async fn create_employee(&self, payload: &EmployeePayload) -> Result<Employee, TransportError>;

    async fn update_employee(&self, id: i64, payload: &EmployeePayload) -> Result<Employee, TransportError>;

    async fn delete_employee(&self, id: i64) -> Result<(), TransportError>;

    async fn fetch_qualifications(&self) -> Result<Vec<Qualification>, TransportError>;

    async fn create_qualification(&self, payload: &QualificationPayload) -> Result<Qualification, TransportError>;

    async fn update_qualification(
        &self,
        id: i64,
        payload: &QualificationPayload,
    ) -> Result<Qualification, TransportError>;

    async fn delete_qualification(&self, id: i64) -> Result<(), TransportError>;

    /// A qualification together with every employee holding it
    async fn fetch_qualification_details(&self, id: i64) -> Result<QualificationDetails, TransportError>;
}

/// Supplies the bearer credential for each request
///
/// Implementations are consulted per call so an external identity provider
/// can rotate the token underneath a running client.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> Result<String, TransportError>;
}

/// A fixed token, typically from the config file
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl AccessTokenProvider for StaticToken {
    fn access_token(&self) -> Result<String, TransportError> {
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl AccessTokenProvider for EnvToken {
    fn access_token(&self) -> Result<String, TransportError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(TransportError::Credential {
                message: format!("{} is not set", self.var),
            }),
        }
    }
}

/// REST transport over reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Arc<dyn AccessTokenProvider>,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `http://localhost:8089`)
    pub fn new(
        base_url: impl Into<String>,
        token: Arc<dyn AccessTokenProvider>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TransportError::Network {
                message: "api url must not be empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path like `/employees/3`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, TransportError> {
        let token = self.token.access_token()?;
        let url = self.endpoint(path);
        debug!(%method, %url, "request");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        let response = builder.send().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, TransportError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, TransportError> {
        self.json(self.request(Method::GET, "/employees")?).await
    }

    async fn fetch_employee(&self, id: i64) -> Result<Employee, TransportError> {
        self.json(self.request(Method::GET, &format!("/employees/{id}"))?)
            .await
    }

    async fn create_employee(&self, payload: &EmployeePayload) -> Result<Employee, TransportError> {
        self.json(self.request(Method::POST, "/employees")?.json(payload))
            .await
    }

    async fn update_employee(&self, id: i64, payload: &EmployeePayload) -> Result<Employee, TransportError> {
        self.json(
            self.request(Method::PUT, &format!("/employees/{id}"))?
                .json(payload),
        )
        .await
    }

    async fn delete_employee(&self, id: i64) -> Result<(), TransportError> {
        self.send(self.request(Method::DELETE, &format!("/employees/{id}"))?)
            .await
            .map(|_| ())
    }

    async fn fetch_qualifications(&self) -> Result<Vec<Qualification>, TransportError> {
        self.json(self.request(Method::GET, "/qualifications")?).await
    }

    async fn create_qualification(&self, payload: &QualificationPayload) -> Result<Qualification, TransportError> {
        self.json(self.request(Method::POST, "/qualifications")?.json(payload))
            .await
    }

    async fn update_qualification(
        &self,
        id: i64,
        payload: &QualificationPayload,
    ) -> Result<Qualification, TransportError> {
        self.json(
            self.request(Method::PUT, &format!("/qualifications/{id}"))?
                .json(payload),
        )
        .await
    }

    async fn delete_qualification(&self, id: i64) -> Result<(), TransportError> {
        self.send(self.request(Method::DELETE, &format!("/qualifications/{id}"))?)
            .await
            .map(|_| ())
    }

    async fn fetch_qualification_details(&self, id: i64) -> Result<QualificationDetails, TransportError> {
        self.json(self.request(Method::GET, &format!("/qualifications/{id}/employees"))?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Arc::new(StaticToken::new("t")), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let t = transport("http://localhost:8089/");
        assert_eq!(t.base_url(), "http://localhost:8089");
        assert_eq!(t.endpoint("/employees/4"), "http://localhost:8089/employees/4");
        assert_eq!(
            t.endpoint("qualifications/2/employees"),
            "http://localhost:8089/qualifications/2/employees"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = HttpTransport::new("  ", Arc::new(StaticToken::new("t")), Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_token_missing() {
        let provider = EnvToken::new("ROSTER_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(matches!(
            provider.access_token(),
            Err(TransportError::Credential { .. })
        ));
    }

    #[test]
    fn test_static_token_debug_is_masked() {
        let token = StaticToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.access_token().unwrap(), "secret-value");
    }
}
