//! reqwest-backed [`SubscriptionApi`].

use super::{ApiError, SubscriptionApi};
use crate::session::SessionContext;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use subtrack_core::{
    analytics::CategoryTotal,
    models::{Category, Subscription, SubscriptionPayload},
};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Auth {
    Required,
    Optional,
}

/// HTTP client for the subscription service at `{base}/api/v1/...`.
#[derive(Debug, Clone)]
pub struct HttpSubscriptionApi {
    client: reqwest::Client,
    base: Url,
    session: Arc<SessionContext>,
}

impl HttpSubscriptionApi {
    /// Build a client rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidUrl`] when `base_url` cannot serve as an API
    /// base, or [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        session: Arc<SessionContext>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("'{}': {}", base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "'{}' cannot be used as an API base",
                base_url
            )));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        api_url(&self.base, segments)
    }

    /// Attach the bearer token. Read-only reference endpoints accept anonymous
    /// calls, so a missing session only fails requests that need one.
    fn authorized(&self, request: RequestBuilder, auth: Auth) -> Result<RequestBuilder, ApiError> {
        match (self.session.bearer_token(), auth) {
            (Ok(token), _) => Ok(request.bearer_auth(token)),
            (Err(_), Auth::Required) => Err(ApiError::MissingSession),
            (Err(_), Auth::Optional) => Ok(request),
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        auth: Auth,
        action: &str,
    ) -> Result<Response, ApiError> {
        let res = self.authorized(request, auth)?.send().await?;
        let status = res.status();
        debug!("{} -> {}", action, status);
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(error_for_status(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        auth: Auth,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let res = self
            .send(self.client.get(url), auth, &segments.join("/"))
            .await?;
        let body = res.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

impl SubscriptionApi for HttpSubscriptionApi {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        self.get_json(&["api", "v1", "subscriptions"], Auth::Required)
            .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json(&["api", "v1", "categories"], Auth::Optional)
            .await
    }

    async fn create_subscription(&self, payload: &SubscriptionPayload) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "v1", "subscriptions"])?;
        self.send(self.client.post(url).json(payload), Auth::Required, "create subscription")
            .await?;
        Ok(())
    }

    async fn update_subscription(
        &self,
        id: &str,
        payload: &SubscriptionPayload,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "v1", "subscriptions", id])?;
        self.send(self.client.put(url).json(payload), Auth::Required, "update subscription")
            .await?;
        Ok(())
    }

    async fn delete_subscription(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "v1", "subscriptions", id])?;
        self.send(self.client.delete(url), Auth::Required, "delete subscription")
            .await?;
        Ok(())
    }

    async fn category_totals(&self) -> Result<Vec<CategoryTotal>, ApiError> {
        self.get_json(
            &["api", "v1", "subscriptions", "total-amounts"],
            Auth::Optional,
        )
        .await
    }
}

/// Append percent-encoded path segments to `base`.
pub(crate) fn api_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    let mut path = url
        .path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(format!("'{}' cannot be used as an API base", base)))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    let message = error_message_for_response(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pick the most useful message out of an error response body.
pub(crate) fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}
