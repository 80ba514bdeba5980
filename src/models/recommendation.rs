//! Recommendation service payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Measurements;

/// Success envelope shared by the service's JSON responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// One `[crop, confidence]` entry of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCrop(pub String, pub f64);

impl RankedCrop {
    pub fn new(crop: impl Into<String>, confidence: f64) -> Self {
        Self(crop.into(), confidence)
    }

    pub fn crop(&self) -> &str {
        &self.0
    }

    /// Confidence in `0..=1`.
    pub fn confidence(&self) -> f64 {
        self.1
    }
}

/// Static reference attributes of a crop.
///
/// The service answers `{"error": "..."}` in place of the attributes for
/// crops it has no information on, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_rainfall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CropInfo {
    /// `(label, value)` rows in display order; missing values are skipped.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Optimal Temperature", &self.optimal_temperature),
            ("Optimal Humidity", &self.optimal_humidity),
            ("Optimal Rainfall", &self.optimal_rainfall),
            ("pH Range", &self.ph_range),
            ("Season", &self.season),
            ("Soil Type", &self.soil_type),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// A successful `/api/recommend` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Top crop name
    pub recommendation: String,

    /// Confidence of the top crop in `0..=1`
    pub confidence: f64,

    #[serde(default)]
    pub crop_info: Option<BTreeMap<String, CropInfo>>,

    #[serde(default)]
    pub top_recommendations: Option<Vec<RankedCrop>>,

    /// Inputs as the service understood them
    #[serde(default)]
    pub input: Option<Measurements>,

    /// Server-side prediction time, verbatim
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RecommendationResult {
    /// Reference info for the top crop, when the service sent it.
    pub fn top_crop_info(&self) -> Option<&CropInfo> {
        self.crop_info.as_ref()?.get(&self.recommendation)
    }

    /// Ranking entries, empty when the service sent none.
    pub fn ranking(&self) -> &[RankedCrop] {
        self.top_recommendations.as_deref().unwrap_or_default()
    }
}

/// `/api/health` answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub model_status: Option<String>,
}

/// `/api/crops` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CropCatalog {
    #[serde(default)]
    pub crops: Vec<String>,
    #[serde(default)]
    pub crop_info: BTreeMap<String, CropInfo>,
}

/// `/api/stats` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceStats {
    pub total_crops: usize,
    #[serde(default)]
    pub crops: Vec<String>,
    pub model_type: Option<String>,
    /// Model input names in request order
    #[serde(default)]
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICE_RESPONSE: &str = r#"{
        "success": true,
        "data": {
            "input": {"N": 90.0, "P": 40.0, "K": 40.0, "temperature": 21.5,
                      "humidity": 82.0, "ph": 6.5, "rainfall": 202.0},
            "recommendation": "Rice",
            "confidence": 0.92,
            "top_recommendations": [["Rice", 0.92], ["Maize", 0.05], ["Wheat", 0.03]],
            "crop_info": {
                "Rice": {
                    "optimal_temperature": "21-27°C",
                    "optimal_humidity": "80-100%",
                    "optimal_rainfall": "200-300mm",
                    "ph_range": "6.0-7.5",
                    "season": "Monsoon",
                    "soil_type": "Clayey soil, well-drained"
                }
            },
            "timestamp": "2025-06-01T10:15:30.123456"
        }
    }"#;

    #[test]
    fn decodes_full_recommendation() {
        let envelope: ApiEnvelope<RecommendationResult> =
            serde_json::from_str(RICE_RESPONSE).unwrap();
        let result = envelope.data;

        assert_eq!(result.recommendation, "Rice");
        assert_eq!(result.ranking().len(), 3);
        assert_eq!(result.ranking()[1], RankedCrop::new("Maize", 0.05));
        assert_eq!(result.input.unwrap().ph, 6.5);

        let info = result.top_crop_info().unwrap();
        assert_eq!(info.season.as_deref(), Some("Monsoon"));
        assert_eq!(info.rows().len(), 6);
        assert_eq!(info.rows()[3], ("pH Range", "6.0-7.5"));
    }

    #[test]
    fn decodes_minimal_recommendation() {
        let json = r#"{"data": {"recommendation": "Barley", "confidence": 0.4}}"#;
        let envelope: ApiEnvelope<RecommendationResult> = serde_json::from_str(json).unwrap();

        assert!(envelope.data.ranking().is_empty());
        assert!(envelope.data.top_crop_info().is_none());
    }

    #[test]
    fn crop_info_error_placeholder() {
        let json = r#"{"error": "Crop information not available"}"#;
        let info: CropInfo = serde_json::from_str(json).unwrap();

        assert!(info.rows().is_empty());
        assert_eq!(info.error.as_deref(), Some("Crop information not available"));
    }

    #[test]
    fn decodes_catalog() {
        let json = r#"{"success": true, "data": {"crops": ["Rice", "Wheat"],
            "crop_info": {"Wheat": {"season": "Winter"}}}}"#;
        let envelope: ApiEnvelope<CropCatalog> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.data.crops, vec!["Rice", "Wheat"]);
        assert_eq!(
            envelope.data.crop_info["Wheat"].season.as_deref(),
            Some("Winter")
        );
    }

    #[test]
    fn decodes_stats() {
        let json = r#"{"success": true, "data": {"total_crops": 2, "crops": ["Rice", "Wheat"],
            "model_type": "Random Forest Classifier",
            "features": ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"]}}"#;
        let envelope: ApiEnvelope<ServiceStats> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.data.total_crops, 2);
        assert_eq!(envelope.data.model_type.as_deref(), Some("Random Forest Classifier"));
        assert_eq!(envelope.data.features.len(), 7);
    }
}
