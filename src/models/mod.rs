// src/models/mod.rs

//! Domain models for the advisor client.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod form;
mod recommendation;
mod sensor;

// Re-export all public types
pub use config::{ApiConfig, Config, DisplayConfig, LoggingConfig};
pub use form::{Field, InputModel, Measurements};
pub use recommendation::{
    ApiEnvelope, CropCatalog, CropInfo, HealthStatus, RankedCrop, RecommendationResult,
    ServiceStats,
};
pub use sensor::SensorReading;
