use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::error::ApiError;
use super::types::{ApiResponse, VulnCreate, VulnUpdate};
use crate::lifecycle::Vulnerability;

/// Backend operations the lifecycle service needs. Implemented by
/// [`VulnClient`] for the real REST backend and by in-memory doubles in
/// tests.
pub trait VulnBackend {
    async fn create_vuln(&self, create: &VulnCreate) -> Result<Vulnerability, ApiError>;
    async fn fetch_vuln(&self, id: u64) -> Result<Vulnerability, ApiError>;
    async fn update_vuln(&self, id: u64, update: &VulnUpdate) -> Result<Vulnerability, ApiError>;
    async fn delete_vuln(&self, id: u64) -> Result<(), ApiError>;
}

/// HTTP client for the vulnerability backend.
pub struct VulnClient {
    client: Client,
    base_url: String,
    token: String,
}

impl VulnClient {
    /// Create a client for the given API root (e.g. `http://host/api/v1`).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn vuln_url(&self, id: u64) -> String {
        format!("{}/vulns/{id}", self.base_url.trim_end_matches('/'))
    }

    /// Triage the HTTP status, then unwrap the backend's response envelope.
    async fn decode(&self, response: Response, id: u64) -> Result<ApiResponse<Vulnerability>, ApiError> {
        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(ApiError::Conflict);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<ApiResponse<Vulnerability>>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        if body.code != 200 {
            return Err(ApiError::Api {
                status: body.code,
                message: body.message,
            });
        }
        Ok(body)
    }
}

impl VulnBackend for VulnClient {
    async fn create_vuln(&self, create: &VulnCreate) -> Result<Vulnerability, ApiError> {
        let response = self
            .client
            .post(format!("{}/vulns", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.token)
            .json(create)
            .send()
            .await?;
        let body = self.decode(response, 0).await?;
        body.data
            .ok_or_else(|| ApiError::Parse("response envelope has no data".into()))
    }

    async fn fetch_vuln(&self, id: u64) -> Result<Vulnerability, ApiError> {
        let response = self
            .client
            .get(self.vuln_url(id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body = self.decode(response, id).await?;
        body.data
            .ok_or_else(|| ApiError::Parse("response envelope has no data".into()))
    }

    async fn update_vuln(&self, id: u64, update: &VulnUpdate) -> Result<Vulnerability, ApiError> {
        let response = self
            .client
            .put(self.vuln_url(id))
            .bearer_auth(&self.token)
            .json(update)
            .send()
            .await?;
        let body = self.decode(response, id).await?;
        body.data
            .ok_or_else(|| ApiError::Parse("response envelope has no data".into()))
    }

    async fn delete_vuln(&self, id: u64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.vuln_url(id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        self.decode(response, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testutil::sample_vuln;
    use crate::lifecycle::Status;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(vuln: &Vulnerability) -> serde_json::Value {
        serde_json::json!({ "code": 200, "message": "ok", "data": vuln })
    }

    #[tokio::test]
    async fn fetch_vuln_unwraps_envelope() {
        let server = MockServer::start().await;
        let vuln = sample_vuln(Status::Fixing);
        Mock::given(method("GET"))
            .and(path("/vulns/1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&vuln)))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let fetched = client.fetch_vuln(1).await.unwrap();
        assert_eq!(fetched, vuln);
    }

    #[tokio::test]
    async fn create_vuln_posts_report() {
        let server = MockServer::start().await;
        let created = sample_vuln(Status::Unfixed);
        Mock::given(method("POST"))
            .and(path("/vulns"))
            .and(body_partial_json(serde_json::json!({
                "title": "XSS in search box",
                "project_id": 3,
                "assignee_id": 9
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&created)))
            .expect(1)
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let create = VulnCreate {
            title: "XSS in search box".into(),
            severity: None,
            project_id: 3,
            assignee_id: 9,
            fix_deadline: None,
        };
        let vuln = client.create_vuln(&create).await.unwrap();
        assert_eq!(vuln.status, Status::Unfixed);
    }

    #[tokio::test]
    async fn fetch_vuln_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vulns/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let err = client.fetch_vuln(99).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(99)));
    }

    #[tokio::test]
    async fn update_vuln_sends_sparse_payload() {
        let server = MockServer::start().await;
        let updated = sample_vuln(Status::Fixing);
        Mock::given(method("PUT"))
            .and(path("/vulns/1"))
            .and(body_partial_json(serde_json::json!({
                "status": "fixing",
                "fixer_id": 9
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&updated)))
            .expect(1)
            .mount(&server)
            .await;

        let update = VulnUpdate {
            status: Some(Status::Fixing),
            fixer_id: Some(9),
            ..VulnUpdate::default()
        };
        let client = VulnClient::new(server.uri(), "secret", 30);
        let confirmed = client.update_vuln(1, &update).await.unwrap();
        assert_eq!(confirmed.status, Status::Fixing);
    }

    #[tokio::test]
    async fn update_vuln_maps_409_to_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/vulns/1"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let update = VulnUpdate {
            status: Some(Status::Fixed),
            ..VulnUpdate::default()
        };
        let err = client.update_vuln(1, &update).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict));
    }

    #[tokio::test]
    async fn envelope_business_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vulns/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 403,
                "message": "insufficient permissions"
            })))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let err = client.fetch_vuln(1).await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "insufficient permissions");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_vuln_accepts_empty_data() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/vulns/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 200,
                "message": "deleted"
            })))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        client.delete_vuln(4).await.unwrap();
    }

    #[tokio::test]
    async fn garbage_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vulns/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = VulnClient::new(server.uri(), "secret", 30);
        let err = client.fetch_vuln(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
