use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{CreateVideoRequest, CreatedVideo, ListVideosParams, Tag, VideoItem};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// The catalog operations as seen from a client.
#[async_trait]
pub trait VideoApi: Send + Sync {
    async fn list_videos(&self, params: &ListVideosParams) -> Result<Vec<VideoItem>, ClientError>;

    /// `Ok(None)` when the id is unknown.
    async fn get_video(&self, id: &str) -> Result<Option<VideoItem>, ClientError>;

    async fn get_video_count(&self) -> Result<u64, ClientError>;

    async fn create_video(&self, request: &CreateVideoRequest) -> Result<CreatedVideo, ClientError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, ClientError>;
}

/// `VideoApi` over the server's JSON routes.
pub struct HttpVideoApi {
    client: Client,
    base_url: String,
}

impl HttpVideoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        // The server reports failures as {"error": "..."}
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ClientError::Api { status, message })
    }
}

#[async_trait]
impl VideoApi for HttpVideoApi {
    async fn list_videos(&self, params: &ListVideosParams) -> Result<Vec<VideoItem>, ClientError> {
        debug!(?params, "Requesting video list.");
        let response = self
            .client
            .get(self.url("/api/videos"))
            .query(&params.to_query_pairs())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoItem>, ClientError> {
        let path = format!("/api/videos/{}", urlencoding::encode(id));
        let response = self.client.get(self.url(&path)).send().await?;
        Self::decode(response).await
    }

    async fn get_video_count(&self) -> Result<u64, ClientError> {
        let response = self.client.get(self.url("/api/videos/count")).send().await?;
        Self::decode(response).await
    }

    async fn create_video(
        &self,
        request: &CreateVideoRequest,
    ) -> Result<CreatedVideo, ClientError> {
        let response = self
            .client
            .post(self.url("/api/videos"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ClientError> {
        let response = self.client.get(self.url("/api/tags")).send().await?;
        Self::decode(response).await
    }
}
