use async_trait::async_trait;
use reqwest::{
    RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use super::{ApiError, RequirementPage, RequirementsApi, UploadFile};
use crate::domain::{
    Config, QueryState, Requirement, RequirementDraft, RequirementId, StatsSnapshot, Status,
};

/// [`RequirementsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    per_page: Option<u32>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpClient {
    /// Build a client for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be initialised.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            per_page: config.per_page,
        })
    }

    /// The service base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn requirement_url(&self, id: &RequirementId) -> String {
        self.url(&format!("/api/requirements/{id}"))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|body| body.error);
        tracing::warn!(status = status.as_u16(), ?message, "request rejected");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turn a 404 into `Ok(None)`.
fn found<T>(result: Result<T, ApiError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}

#[async_trait]
impl RequirementsApi for HttpClient {
    #[instrument(level = "debug", skip(self), fields(page = query.page()))]
    async fn fetch_page(&self, query: &QueryState) -> Result<RequirementPage, ApiError> {
        let request = self
            .client
            .get(self.url("/api/requirements"))
            .query(&query.query_pairs(self.per_page));
        Self::get_json(request).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_requirement(
        &self,
        id: &RequirementId,
    ) -> Result<Option<Requirement>, ApiError> {
        found(Self::get_json(self.client.get(self.requirement_url(id))).await)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_overall_stats(&self) -> Result<StatsSnapshot, ApiError> {
        Self::get_json(self.client.get(self.url("/api/requirements/stats"))).await
    }

    #[instrument(level = "debug", skip(self, draft))]
    async fn create(&self, draft: &RequirementDraft) -> Result<(), ApiError> {
        Self::send(self.client.post(self.url("/api/requirements")).json(draft)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, draft))]
    async fn update(&self, id: &RequirementId, draft: &RequirementDraft) -> Result<(), ApiError> {
        Self::send(self.client.put(self.requirement_url(id)).json(draft)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_status(&self, id: &RequirementId, status: Status) -> Result<(), ApiError> {
        let body = serde_json::json!({ "status": status });
        let url = format!("{}/status", self.requirement_url(id));
        Self::send(self.client.patch(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, id: &RequirementId) -> Result<(), ApiError> {
        Self::send(self.client.delete(self.requirement_url(id))).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn analyze(&self, file: UploadFile) -> Result<(), ApiError> {
        let name = file.name().to_string();
        let mime = file.kind().mime();
        let part = Part::bytes(file.into_bytes())
            .file_name(name)
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        Self::send(self.client.post(self.url("/api/analyze")).multipart(form)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_to_base() {
        let mut config = Config::default();
        config.set_base_url("https://reqs.example.com/");
        let client = HttpClient::new(&config).unwrap();

        assert_eq!(client.base_url(), "https://reqs.example.com");
        assert_eq!(
            client.requirement_url(&RequirementId::from(42_u64)),
            "https://reqs.example.com/api/requirements/42"
        );
    }

    #[test]
    fn query_is_encoded_with_repeated_parameters() {
        use crate::domain::{Category, Facet, QueryUpdate};

        let client = HttpClient::new(&Config::default()).unwrap();
        let query = QueryState::default()
            .apply(QueryUpdate::SearchText("log in".to_string()))
            .apply(QueryUpdate::ToggleFilter(Facet::Type(Category::Ui)))
            .apply(QueryUpdate::ToggleFilter(Facet::Type(Category::Security)));

        let request = client
            .client
            .get(client.url("/api/requirements"))
            .query(&query.query_pairs(None))
            .build()
            .unwrap();

        assert_eq!(
            request.url().query(),
            Some("search=log+in&type=UI&type=Security&page=1&stats=true")
        );
    }

    #[test]
    fn missing_record_is_not_an_error() {
        let missing: Result<u8, _> = Err(ApiError::Status {
            status: 404,
            message: Some("Requirement not found".to_string()),
        });
        let failed: Result<u8, _> = Err(ApiError::Status {
            status: 500,
            message: None,
        });

        assert!(matches!(found(Ok(7)), Ok(Some(7))));
        assert!(matches!(found(missing), Ok(None)));
        assert!(matches!(
            found(failed),
            Err(ApiError::Status { status: 500, .. })
        ));
    }
}
