// src/services/advisor.rs

//! Recommendation service client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, ApiEnvelope, CropCatalog, HealthStatus, Measurements, RecommendationResult,
    SensorReading, ServiceStats,
};
use crate::utils::http::create_async_client;

const RECOMMEND_PATH: &str = "api/recommend";
const SENSOR_PATH: &str = "api/sensor-data";
const HEALTH_PATH: &str = "api/health";
const CROPS_PATH: &str = "api/crops";
const STATS_PATH: &str = "api/stats";

/// Remote operations the form depends on.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    /// `POST /api/recommend`
    async fn recommend(&self, body: &Measurements) -> Result<RecommendationResult>;

    /// `GET /api/sensor-data`
    async fn sensor_data(&self) -> Result<SensorReading>;

    /// `GET /api/health`
    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /api/crops`
    async fn crops(&self) -> Result<CropCatalog>;

    /// `GET /api/stats`
    async fn stats(&self) -> Result<ServiceStats>;
}

/// [`AdvisorApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAdvisor {
    client: Client,
    base_url: Url,
}

impl HttpAdvisor {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Build the client and base URL from configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?, config.base_url()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("GET request to: {}", url);
        let response = self.client.get(url).send().await?;
        read_json(path, response).await
    }
}

/// Decode a success body; any other status is an error without parsing.
async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::debug!("{} - HTTP {}: {}", path, status, body);
        return Err(AppError::status(path, status.as_u16()));
    }
    log::trace!("{} - Response received, parsing JSON", path);
    Ok(response.json().await?)
}

#[async_trait]
impl AdvisorApi for HttpAdvisor {
    async fn recommend(&self, body: &Measurements) -> Result<RecommendationResult> {
        let url = self.endpoint(RECOMMEND_PATH)?;
        log::debug!("POST request to: {}", url);
        let response = self.client.post(url).json(body).send().await?;
        let envelope: ApiEnvelope<RecommendationResult> = read_json(RECOMMEND_PATH, response).await?;
        Ok(envelope.data)
    }

    async fn sensor_data(&self) -> Result<SensorReading> {
        let envelope: ApiEnvelope<SensorReading> = self.get(SENSOR_PATH).await?;
        Ok(envelope.data)
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get(HEALTH_PATH).await
    }

    async fn crops(&self) -> Result<CropCatalog> {
        let envelope: ApiEnvelope<CropCatalog> = self.get(CROPS_PATH).await?;
        Ok(envelope.data)
    }

    async fn stats(&self) -> Result<ServiceStats> {
        let envelope: ApiEnvelope<ServiceStats> = self.get(STATS_PATH).await?;
        Ok(envelope.data)
    }
}
