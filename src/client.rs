use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::errors::ServiceError;

/// Thin JSON-over-HTTP wrapper around `reqwest` shared by all backend
/// services. Maps 404 to [`ServiceError::NotFound`] and any other non-2xx
/// status to [`ServiceError::ExternalApiError`].
///
/// No request timeout is configured; a hung request blocks only the caller's
/// progress indicator, matching the behavior of the web front-end this
/// replaces.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.endpoint(path);
        let response = self.http.get(&url).send().await?;
        Self::decode(path, response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(path);
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(path, response).await
    }

    /// POST to an absolute URL outside the configured base (integration
    /// endpoint override).
    pub async fn post_json_absolute<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(ServiceError::ExternalApiError(format!(
                "{path} returned {status}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::SerializationError(e.to_string()))
    }
}
