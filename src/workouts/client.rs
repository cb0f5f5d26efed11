use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::UpstreamError,
    rate_limit::RateLimiter,
    upstream::{bytes_body, endpoint, json_body},
};

const SERVICE: &str = "ExercisesDB";

/// Exercise catalog.
#[async_trait]
pub trait ExerciseApi: Send + Sync {
    /// Exercises for a muscle, named in the catalog's own vocabulary.
    async fn exercises_by_target(&self, target: &str) -> Result<Value, UpstreamError>;
    async fn exercise_image(&self, exercise_id: &str, resolution: &str) -> Result<Bytes, UpstreamError>;
}

#[derive(Clone)]
pub struct ExerciseDbClient {
    http: Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
    image_limiter: Arc<RateLimiter>,
}

impl ExerciseDbClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        image_limiter: Arc<RateLimiter>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            host: rapidapi_host(&base_url),
            http,
            base_url,
            api_key,
            image_limiter,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, UpstreamError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential(SERVICE))?;
        Ok(builder
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", &self.host))
    }
}

/// Host part of the base URL, sent as `X-RapidAPI-Host`.
pub fn rapidapi_host(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map_or(base_url, |(_, rest)| rest);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[async_trait]
impl ExerciseApi for ExerciseDbClient {
    async fn exercises_by_target(&self, target: &str) -> Result<Value, UpstreamError> {
        let url = endpoint(
            &self.base_url,
            &format!("exercises/target/{}", urlencoding::encode(target)),
        );
        let request = self.authorized(self.http.get(&url))?;
        debug!(%url, "requesting exercises");
        let response = request.send().await?;
        json_body(SERVICE, response).await
    }

    async fn exercise_image(&self, exercise_id: &str, resolution: &str) -> Result<Bytes, UpstreamError> {
        let url = endpoint(&self.base_url, "image");
        let request = self
            .authorized(self.http.get(&url))?
            .query(&[("exerciseId", exercise_id), ("resolution", resolution)]);
        self.image_limiter.acquire().await;
        debug!(%url, exercise_id, resolution, "requesting exercise image");
        let response = request.send().await?;
        bytes_body(SERVICE, response).await
    }
}
