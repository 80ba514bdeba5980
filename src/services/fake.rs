// src/services/fake.rs

//! Scripted in-memory [`AdvisorApi`] for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::AdvisorApi;
use crate::error::{AppError, Result};
use crate::models::{
    CropCatalog, HealthStatus, Measurements, RecommendationResult, SensorReading, ServiceStats,
};

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    outcome: std::result::Result<T, u16>,
}

/// Replies are consumed in call order; a failure is a status code.
#[derive(Default)]
pub struct ScriptedAdvisor {
    recommend: Mutex<VecDeque<Scripted<RecommendationResult>>>,
    sensor: Mutex<VecDeque<Scripted<SensorReading>>>,
    bodies: Mutex<Vec<Measurements>>,
}

impl ScriptedAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_recommend(&self, outcome: std::result::Result<RecommendationResult, u16>) {
        push(&self.recommend, None, outcome);
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub fn gated_recommend(
        &self,
        outcome: std::result::Result<RecommendationResult, u16>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        push(&self.recommend, Some(rx), outcome);
        tx
    }

    pub fn reply_sensor(&self, outcome: std::result::Result<SensorReading, u16>) {
        push(&self.sensor, None, outcome);
    }

    pub fn gated_sensor(
        &self,
        outcome: std::result::Result<SensorReading, u16>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        push(&self.sensor, Some(rx), outcome);
        tx
    }

    /// Request bodies received so far.
    pub fn bodies(&self) -> Vec<Measurements> {
        self.bodies.lock().unwrap().clone()
    }
}

fn push<T>(
    queue: &Mutex<VecDeque<Scripted<T>>>,
    gate: Option<oneshot::Receiver<()>>,
    outcome: std::result::Result<T, u16>,
) {
    queue.lock().unwrap().push_back(Scripted { gate, outcome });
}

async fn play<T>(queue: &Mutex<VecDeque<Scripted<T>>>, path: &str) -> Result<T> {
    let next = queue.lock().unwrap().pop_front();
    let Some(Scripted { gate, outcome }) = next else {
        return Err(AppError::config(format!("no scripted reply for {path}")));
    };
    if let Some(gate) = gate {
        let _ = gate.await;
    }
    outcome.map_err(|status| AppError::status(path, status))
}

#[async_trait]
impl AdvisorApi for ScriptedAdvisor {
    async fn recommend(&self, body: &Measurements) -> Result<RecommendationResult> {
        self.bodies.lock().unwrap().push(*body);
        play(&self.recommend, "api/recommend").await
    }

    async fn sensor_data(&self) -> Result<SensorReading> {
        play(&self.sensor, "api/sensor-data").await
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            success: true,
            message: "scripted".into(),
            timestamp: None,
            model_status: Some("loaded".into()),
        })
    }

    async fn crops(&self) -> Result<CropCatalog> {
        Ok(CropCatalog::default())
    }

    async fn stats(&self) -> Result<ServiceStats> {
        Ok(ServiceStats::default())
    }
}
