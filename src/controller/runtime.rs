// src/controller/runtime.rs

//! Event loop glue between [`AppState`] and the remote service.
//!
//! User actions are applied immediately. Requests run as spawned tasks whose
//! only output is one completion [`Action`] posted back over a channel, and
//! completions are applied when the owner awaits [`Controller::next_completion`].
//! State is therefore only ever mutated by the task that owns the controller.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::state::{Action, AppState, Effect, Resolution, Transition};
use crate::models::{Field, InputModel};
use crate::services::AdvisorApi;

/// Owns the form state and drives its requests.
pub struct Controller {
    state: AppState,
    api: Arc<dyn AdvisorApi>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    pending: usize,
}

impl Controller {
    pub fn new(api: Arc<dyn AdvisorApi>) -> Self {
        Self::with_input(api, InputModel::default())
    }

    /// Start from a pre-filled form.
    pub fn with_input(api: Arc<dyn AdvisorApi>, input: InputModel) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(input),
            api,
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether any request has not reported back yet, stale ones included.
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Apply an action and start the request it asks for, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<Resolution> {
        let Transition {
            state,
            effect,
            resolution,
        } = std::mem::take(&mut self.state).reduce(action);
        self.state = state;

        if let Some(effect) = effect {
            self.spawn(effect);
        }
        resolution
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.dispatch(Action::Edit {
            field,
            value: value.into(),
        });
    }

    /// Validate and submit. Returns whether a request went out.
    pub fn submit(&mut self) -> bool {
        let before = self.pending;
        self.dispatch(Action::Submit);
        self.pending > before
    }

    pub fn fetch_sensor(&mut self) {
        self.dispatch(Action::FetchSensor);
    }

    /// Wait for the next request to finish and apply it.
    ///
    /// Returns `None` at once when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Resolution> {
        if self.pending == 0 {
            return None;
        }
        let action = self.rx.recv().await?;
        self.pending -= 1;

        let resolution = self.dispatch(action);
        if let Some(Resolution::Stale { channel, id }) = resolution {
            log::debug!("Dropping stale {} response {}", channel, id);
        }
        resolution
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    fn spawn(&mut self, effect: Effect) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            let action = match effect {
                Effect::SendRecommendation { id, body } => {
                    log::debug!("Requesting recommendation {}", id);
                    match api.recommend(&body).await {
                        Ok(result) => Action::RecommendSucceeded { id, result },
                        Err(e) => {
                            log::warn!("Recommendation request {} failed: {}", id, e);
                            Action::RecommendFailed { id }
                        }
                    }
                }
                Effect::FetchSensorData { id } => {
                    log::debug!("Fetching sensor data {}", id);
                    match api.sensor_data().await {
                        Ok(reading) => Action::SensorSucceeded { id, reading },
                        Err(e) => {
                            log::warn!("Sensor request {} failed: {}", id, e);
                            Action::SensorFailed { id }
                        }
                    }
                }
            };
            // The controller holds the receiver; a send error means it is gone.
            let _ = tx.send(action);
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::controller::state::{Banner, Channel, RequestError, ResultsPanel};
    use crate::controller::validate::ValidationError;
    use crate::models::{RankedCrop, RecommendationResult, SensorReading};
    use crate::services::fake::ScriptedAdvisor;

    fn form() -> InputModel {
        InputModel::default()
            .with(Field::Nitrogen, "90")
            .with(Field::Phosphorus, "40")
            .with(Field::Potassium, "40")
            .with(Field::Temperature, "21.5")
            .with(Field::Humidity, "82")
            .with(Field::Ph, "6.5")
            .with(Field::Rainfall, "202")
    }

    fn recommendation(crop: &str) -> RecommendationResult {
        RecommendationResult {
            recommendation: crop.to_string(),
            confidence: 0.92,
            crop_info: None,
            top_recommendations: Some(vec![
                RankedCrop::new(crop, 0.92),
                RankedCrop::new("maize", 0.05),
            ]),
            input: None,
            timestamp: None,
        }
    }

    fn reading() -> SensorReading {
        SensorReading {
            soil_moisture: 512.0,
            temperature: 28.5,
            humidity: 65.0,
            rain_value: 120.0,
            timestamp: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn controller(api: &Arc<ScriptedAdvisor>, input: InputModel) -> Controller {
        Controller::with_input(Arc::clone(api) as Arc<dyn AdvisorApi>, input)
    }

    #[tokio::test]
    async fn submit_then_settle_stores_result() {
        let api = Arc::new(ScriptedAdvisor::new());
        api.reply_recommend(Ok(recommendation("rice")));
        let mut ctl = controller(&api, form());

        assert!(ctl.submit());
        assert_eq!(ctl.state().results_panel(), ResultsPanel::Loading);

        let done = ctl.next_completion().await;
        assert_eq!(
            done,
            Some(Resolution::Applied { channel: Channel::Recommend, succeeded: true })
        );
        assert_eq!(ctl.state().result().unwrap().recommendation, "rice");
        assert_eq!(api.bodies()[0].rainfall, 202.0);
        assert!(!ctl.has_pending());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_service() {
        let api = Arc::new(ScriptedAdvisor::new());
        let mut ctl = controller(&api, form().with(Field::Temperature, ""));

        assert!(!ctl.submit());
        assert!(!ctl.has_pending());
        assert_eq!(ctl.next_completion().await, None);
        assert!(api.bodies().is_empty());
        assert_eq!(
            ctl.state().banner(),
            Some(Banner::Validation(ValidationError::MissingFields))
        );
    }

    #[tokio::test]
    async fn service_failure_sets_banner_and_keeps_result() {
        let api = Arc::new(ScriptedAdvisor::new());
        api.reply_recommend(Ok(recommendation("rice")));
        api.reply_recommend(Err(500));
        let mut ctl = controller(&api, form());

        ctl.submit();
        ctl.settle().await;
        ctl.submit();
        ctl.settle().await;

        assert_eq!(ctl.state().result().unwrap().recommendation, "rice");
        assert_eq!(
            ctl.state().banner(),
            Some(Banner::Request(RequestError::Recommendation))
        );
        assert!(!ctl.state().is_submitting());
    }

    #[tokio::test]
    async fn sensor_fetch_prefills_climate_fields() {
        let api = Arc::new(ScriptedAdvisor::new());
        api.reply_sensor(Ok(reading()));
        let mut ctl = controller(&api, form());

        ctl.fetch_sensor();
        assert!(ctl.state().is_fetching_sensor());
        ctl.settle().await;

        let input = ctl.state().input();
        assert_eq!(input.temperature, "28.5");
        assert_eq!(input.humidity, "65");
        assert_eq!(input.rainfall, "120");
        assert_eq!(input.n, "90");
        assert_eq!(input.ph, "6.5");
        assert!(!ctl.state().is_fetching_sensor());
    }

    #[tokio::test]
    async fn failing_sensor_fetch_changes_nothing_but_banner() {
        let api = Arc::new(ScriptedAdvisor::new());
        api.reply_sensor(Ok(reading()));
        api.reply_sensor(Err(503));
        let mut ctl = controller(&api, form());

        ctl.fetch_sensor();
        ctl.settle().await;
        let before = ctl.state().input().clone();

        ctl.fetch_sensor();
        ctl.settle().await;

        assert_eq!(ctl.state().input(), &before);
        assert_eq!(ctl.state().sensor(), Some(&reading()));
        assert_eq!(
            ctl.state().banner(),
            Some(Banner::Request(RequestError::SensorData))
        );
    }

    #[tokio::test]
    async fn late_response_from_superseded_request_is_dropped() {
        let api = Arc::new(ScriptedAdvisor::new());
        let first = api.gated_recommend(Ok(recommendation("rice")));
        let second = api.gated_recommend(Ok(recommendation("wheat")));
        let mut ctl = controller(&api, form());

        assert!(ctl.submit());
        assert!(ctl.submit());

        second.send(()).unwrap();
        let done = ctl.next_completion().await;
        assert!(done.unwrap().is_applied());
        assert!(!ctl.state().is_submitting());

        first.send(()).unwrap();
        let done = ctl.next_completion().await;
        assert!(matches!(
            done,
            Some(Resolution::Stale { channel: Channel::Recommend, .. })
        ));
        assert_eq!(ctl.state().result().unwrap().recommendation, "wheat");
        assert!(!ctl.has_pending());
    }

    #[tokio::test]
    async fn both_channels_can_be_in_flight() {
        let api = Arc::new(ScriptedAdvisor::new());
        let sensor_gate = api.gated_sensor(Ok(reading()));
        api.reply_recommend(Ok(recommendation("rice")));
        let mut ctl = controller(&api, form());

        ctl.fetch_sensor();
        assert!(ctl.submit());
        assert!(ctl.state().is_fetching_sensor() && ctl.state().is_submitting());

        let done = ctl.next_completion().await.unwrap();
        assert_eq!(
            done,
            Resolution::Applied { channel: Channel::Recommend, succeeded: true }
        );
        assert!(ctl.state().is_fetching_sensor());

        sensor_gate.send(()).unwrap();
        ctl.settle().await;
        assert!(ctl.state().sensor().is_some());
        assert!(ctl.state().result().is_some());
    }

    struct Capture;

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> = std::sync::Mutex::new(Vec::new());
    static CAPTURE: Capture = Capture;

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            RECORDS
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    #[tokio::test]
    async fn outbound_requests_log_at_debug() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        let api = Arc::new(ScriptedAdvisor::new());
        api.reply_recommend(Ok(recommendation("rice")));
        api.reply_sensor(Ok(reading()));
        let mut ctl = controller(&api, form());

        ctl.submit();
        ctl.fetch_sensor();
        ctl.settle().await;

        let records = RECORDS.lock().unwrap();
        let outbound: Vec<_> = records
            .iter()
            .filter(|(_, msg)| {
                msg.starts_with("Requesting recommendation") || msg.starts_with("Fetching sensor data")
            })
            .collect();
        assert!(outbound.len() >= 2);
        assert!(outbound.iter().all(|(level, _)| *level == log::Level::Debug));
    }
}
