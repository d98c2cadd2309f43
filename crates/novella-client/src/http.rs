//! `reqwest` implementation of the backend seam.
//!
//! # Design
//! - Routes are resolved relative to the configured base URL, so a path prefix such as `/api/`
//!   is preserved.
//! - Credentials travel as a session cookie attached to every request.
//! - Non-success statuses become `BackendError::Status`, carrying the server message when the
//!   body is a problem document or a `{ "message": ... }` object.

use async_trait::async_trait;
use novella_api_models::{
    BanToggleResponse, EngagementKind, EngagementStatus, EntityId, IdentityProfile, MessageBody,
    ModerationTarget, ProblemDetails, Report, ReportKind, ReportViewed,
};
use novella_core::{Backend, BackendError, BackendResult};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Header carrying the per-client correlation id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Backend speaking the Novella HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    request_id: String,
}

impl HttpBackend {
    /// Build a backend from connection settings.
    ///
    /// # Errors
    /// Returns an error when the base URL cannot carry API paths or the HTTP client cannot be
    /// constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = normalize_base(config.base_url)?;
        let request_id = Uuid::new_v4().to_string();

        let mut default_headers = HeaderMap::new();
        let header = HeaderValue::from_str(&request_id).map_err(|_| ClientError::InvalidHeader {
            name: HEADER_REQUEST_ID,
        })?;
        default_headers.insert(HEADER_REQUEST_ID, header);
        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|_| ClientError::InvalidHeader { name: "cookie" })?;
            value.set_sensitive(true);
            default_headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ClientError::Build { source })?;

        tracing::debug!(base_url = %base_url, request_id = %request_id, "http backend ready");
        Ok(Self {
            client,
            base_url,
            request_id,
        })
    }

    /// Base URL every route is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Correlation id sent with every request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::transport(format!("invalid route {path}: {err}")))
    }

    async fn send(&self, request: RequestBuilder, route: &str) -> BackendResult<Response> {
        let response = request.send().await.map_err(|err| {
            tracing::debug!(route, error = %err, "request did not complete");
            BackendError::transport(err.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(route, status = status.as_u16(), "request succeeded");
            Ok(response)
        } else {
            let err = classify_failure(response).await;
            tracing::debug!(route, status = status.as_u16(), error = %err, "request rejected");
            Err(err)
        }
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn engagement_status(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<EngagementStatus> {
        let route = format!("engagements/{kind}/{target_id}/status");
        let response = self
            .send(self.client.get(self.endpoint(&route)?), &route)
            .await?;
        read_json(response).await
    }

    async fn create_engagement(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<()> {
        let route = format!("engagements/{kind}/{target_id}");
        self.send(self.client.post(self.endpoint(&route)?), &route)
            .await?;
        Ok(())
    }

    async fn remove_engagement(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<()> {
        let route = format!("engagements/{kind}/{target_id}");
        self.send(self.client.delete(self.endpoint(&route)?), &route)
            .await?;
        Ok(())
    }

    async fn unviewed_reports(&self, kind: ReportKind) -> BackendResult<Vec<Report>> {
        let route = "reports/unviewed";
        let request = self
            .client
            .get(self.endpoint(route)?)
            .query(&[("kind", kind.as_str())]);
        let response = self.send(request, route).await?;
        read_json(response).await
    }

    async fn mark_report_viewed(&self, report_id: EntityId) -> BackendResult<ReportViewed> {
        let route = format!("reports/{report_id}/view");
        let response = self
            .send(self.client.patch(self.endpoint(&route)?), &route)
            .await?;
        read_json(response).await
    }

    async fn toggle_ban(&self, target: ModerationTarget) -> BackendResult<BanToggleResponse> {
        let route = format!("targets/{}/ban", target.id);
        let request = self
            .client
            .patch(self.endpoint(&route)?)
            .query(&[("kind", target.kind.as_str())]);
        let response = self.send(request, &route).await?;
        read_json(response).await
    }

    async fn current_identity(&self) -> BackendResult<IdentityProfile> {
        let route = "identity/profile";
        let response = self
            .send(self.client.get(self.endpoint(route)?), route)
            .await?;
        read_json(response).await
    }
}

fn normalize_base(mut base_url: Url) -> Result<Url, ClientError> {
    if base_url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
        });
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url.set_query(None);
    base_url.set_fragment(None);
    Ok(base_url)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| BackendError::decode(err.to_string()))
}

async fn classify_failure(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.unwrap_or_default();

    let detail = serde_json::from_slice::<ProblemDetails>(&bytes)
        .ok()
        .and_then(|problem| problem.detail.or(Some(problem.title)))
        .or_else(|| {
            serde_json::from_slice::<MessageBody>(&bytes)
                .ok()
                .map(|body| body.message)
        })
        .map(|detail| detail.trim().to_string())
        .filter(|detail| !detail.is_empty());

    BackendError::Status { status, detail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use novella_api_models::Role;
    use serde_json::json;

    fn backend_for(server: &MockServer, cookie: Option<&str>) -> Result<HttpBackend> {
        let base_url = server
            .base_url()
            .parse()
            .map_err(|_| anyhow!("valid URL"))?;
        let config =
            ClientConfig::new(base_url).with_session_cookie(cookie.map(ToString::to_string));
        Ok(HttpBackend::new(config)?)
    }

    #[test]
    fn base_url_gains_trailing_slash() -> Result<()> {
        let normalized = normalize_base("http://localhost:9000/api?x=1".parse()?)?;
        assert_eq!(normalized.as_str(), "http://localhost:9000/api/");
        assert_eq!(
            normalized.join("identity/profile")?.as_str(),
            "http://localhost:9000/api/identity/profile"
        );
        assert!(matches!(
            normalize_base("mailto:admin@example.com".parse()?),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn status_check_sends_session_cookie_and_request_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/engagements/bookmark/5/status")
                .header("cookie", "session=abc")
                .header_exists(HEADER_REQUEST_ID);
            then.status(200).json_body(json!({"present": true}));
        });

        let backend = backend_for(&server, Some("session=abc"))?;
        let status = backend
            .engagement_status(EngagementKind::Bookmark, 5)
            .await?;

        mock.assert();
        assert!(status.present);
        assert!(!backend.request_id().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn create_and_remove_use_post_and_delete() -> Result<()> {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/engagements/like/9");
            then.status(201);
        });
        let remove = server.mock(|when, then| {
            when.method(DELETE).path("/engagements/like/9");
            then.status(204);
        });

        let backend = backend_for(&server, None)?;
        backend.create_engagement(EngagementKind::Like, 9).await?;
        backend.remove_engagement(EngagementKind::Like, 9).await?;

        create.assert();
        remove.assert();
        Ok(())
    }

    #[tokio::test]
    async fn report_listing_sends_kind_query() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/reports/unviewed")
                .query_param("kind", "comment");
            then.status(200).json_body(json!([{
                "reportId": 3,
                "targetKind": "comment",
                "targetId": 44,
                "reporterId": 7,
                "reportedId": 8,
                "reason": "spam",
                "createdAt": "2026-03-01T10:00:00Z"
            }]));
        });

        let backend = backend_for(&server, None)?;
        let reports = backend.unviewed_reports(ReportKind::Comment).await?;

        mock.assert();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_id, 3);
        assert!(!reports[0].viewed);
        Ok(())
    }

    #[tokio::test]
    async fn ban_toggle_addresses_kind_and_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/targets/7/ban")
                .query_param("kind", "user");
            then.status(200)
                .json_body(json!({"banned": true, "message": "User 7 has been banned."}));
        });

        let backend = backend_for(&server, None)?;
        let response = backend.toggle_ban(ModerationTarget::user(7)).await?;

        mock.assert();
        assert!(response.banned);
        assert_eq!(response.message, "User 7 has been banned.");
        Ok(())
    }

    #[tokio::test]
    async fn identity_accepts_numeric_role_codes() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/identity/profile");
            then.status(200)
                .json_body(json!({"id": 12, "displayName": "Mod", "role": 2}));
        });

        let backend = backend_for(&server, None)?;
        let profile = backend.current_identity().await?;

        assert_eq!(profile.id, 12);
        assert_eq!(profile.role, Role::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn failures_carry_server_message() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(PATCH).path("/reports/4/view");
            then.status(403)
                .json_body(json!({"message": "Admins only."}));
        });
        server.mock(|when, then| {
            when.method(PATCH).path("/reports/5/view");
            then.status(422).json_body(json!({
                "type": "about:blank",
                "title": "Invalid report",
                "status": 422,
                "detail": "report already closed"
            }));
        });
        server.mock(|when, then| {
            when.method(PATCH).path("/reports/6/view");
            then.status(500).body("<html>oops</html>");
        });

        let backend = backend_for(&server, None)?;

        let err = backend
            .mark_report_viewed(4)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected 403"))?;
        assert!(err.is_forbidden());
        assert_eq!(err.user_message(), "Admins only.");

        let err = backend
            .mark_report_viewed(5)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected 422"))?;
        assert_eq!(err.user_message(), "report already closed");

        let err = backend
            .mark_report_viewed(6)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected 500"))?;
        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                detail: None
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/engagements/like/1/status");
            then.status(200).body("not json");
        });

        let backend = backend_for(&server, None)?;
        let err = backend
            .engagement_status(EngagementKind::Like, 1)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected decode failure"))?;

        assert!(matches!(err, BackendError::Decode { .. }));
        Ok(())
    }
}
