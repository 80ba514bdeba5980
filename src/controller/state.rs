// src/controller/state.rs

//! Form state as an immutable value driven by [`Action`]s.
//!
//! [`AppState::reduce`] is pure: it never touches the network. Requests the
//! caller must issue come back as an [`Effect`], tagged with a per-channel
//! [`RequestId`]. A completion is applied only if its id is the latest one
//! issued on its channel; anything older is dropped as stale.

use std::fmt;

use thiserror::Error;

use super::validate::{ValidationError, validate};
use crate::error::AppError;
use crate::models::{Field, InputModel, Measurements, RecommendationResult, SensorReading};

/// Monotonic id of an outbound request within its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two independent request channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Recommend,
    Sensor,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Recommend => f.write_str("recommend"),
            Channel::Sensor => f.write_str("sensor"),
        }
    }
}

/// Status of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight(RequestId),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ChannelState {
    issued: u64,
    status: RequestStatus,
}

impl ChannelState {
    fn start(&mut self) -> RequestId {
        self.issued += 1;
        let id = RequestId(self.issued);
        self.status = RequestStatus::InFlight(id);
        id
    }

    fn is_latest(&self, id: RequestId) -> bool {
        self.status == RequestStatus::InFlight(id)
    }
}

/// Post-flight failure. `Display` is the banner text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("Error getting recommendation. Please check if backend is running.")]
    Recommendation,

    #[error("Error fetching sensor data. Please check if backend and IoT device are running.")]
    SensorData,
}

/// The single error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Validation(ValidationError),
    Request(RequestError),
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Banner::Validation(e) => e.fmt(f),
            Banner::Request(e) => e.fmt(f),
        }
    }
}

impl From<Banner> for AppError {
    fn from(banner: Banner) -> Self {
        match banner {
            Banner::Validation(e) => AppError::validation(e.to_string()),
            Banner::Request(e) => AppError::request(e.to_string()),
        }
    }
}

/// Everything that can happen to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User typed into a field
    Edit { field: Field, value: String },
    /// User pressed the recommendation button
    Submit,
    /// User pressed the sensor button
    FetchSensor,
    RecommendSucceeded {
        id: RequestId,
        result: RecommendationResult,
    },
    RecommendFailed { id: RequestId },
    SensorSucceeded { id: RequestId, reading: SensorReading },
    SensorFailed { id: RequestId },
}

/// Network work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendRecommendation { id: RequestId, body: Measurements },
    FetchSensorData { id: RequestId },
}

/// How a completion action was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied { channel: Channel, succeeded: bool },
    Stale { channel: Channel, id: RequestId },
}

/// Output of [`AppState::reduce`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
    pub resolution: Option<Resolution>,
}

/// What the results area shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultsPanel<'a> {
    Loading,
    Result(&'a RecommendationResult),
    Placeholder,
}

/// Complete client-side state of the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    input: InputModel,
    banner: Option<Banner>,
    result: Option<RecommendationResult>,
    sensor: Option<SensorReading>,
    recommend: ChannelState,
    sensor_channel: ChannelState,
}

impl AppState {
    pub fn new(input: InputModel) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &InputModel {
        &self.input
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    pub fn result(&self) -> Option<&RecommendationResult> {
        self.result.as_ref()
    }

    pub fn sensor(&self) -> Option<&SensorReading> {
        self.sensor.as_ref()
    }

    pub fn status(&self, channel: Channel) -> RequestStatus {
        match channel {
            Channel::Recommend => self.recommend.status,
            Channel::Sensor => self.sensor_channel.status,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.status(Channel::Recommend) != RequestStatus::Idle
    }

    pub fn is_fetching_sensor(&self) -> bool {
        self.status(Channel::Sensor) != RequestStatus::Idle
    }

    /// A previous result stays hidden while a new one is loading.
    pub fn results_panel(&self) -> ResultsPanel<'_> {
        match (&self.result, self.is_submitting()) {
            (_, true) => ResultsPanel::Loading,
            (Some(result), false) => ResultsPanel::Result(result),
            (None, false) => ResultsPanel::Placeholder,
        }
    }

    /// Apply one action.
    pub fn reduce(mut self, action: Action) -> Transition {
        let mut effect = None;
        let mut resolution = None;

        match action {
            Action::Edit { field, value } => {
                self.input.set(field, value);
                self.banner = None;
            }
            Action::Submit => {
                self.banner = None;
                match validate(&self.input) {
                    Ok(body) => {
                        let id = self.recommend.start();
                        effect = Some(Effect::SendRecommendation { id, body });
                    }
                    Err(e) => self.banner = Some(Banner::Validation(e)),
                }
            }
            Action::FetchSensor => {
                self.banner = None;
                let id = self.sensor_channel.start();
                effect = Some(Effect::FetchSensorData { id });
            }
            Action::RecommendSucceeded { id, result } => {
                let done = self.finish(Channel::Recommend, id, true);
                if done.is_applied() {
                    self.result = Some(result);
                }
                resolution = Some(done);
            }
            Action::RecommendFailed { id } => {
                let done = self.finish(Channel::Recommend, id, false);
                if done.is_applied() {
                    self.banner = Some(Banner::Request(RequestError::Recommendation));
                }
                resolution = Some(done);
            }
            Action::SensorSucceeded { id, reading } => {
                let done = self.finish(Channel::Sensor, id, true);
                if done.is_applied() {
                    self.input
                        .set(Field::Temperature, reading.temperature.to_string());
                    self.input.set(Field::Humidity, reading.humidity.to_string());
                    self.input.set(Field::Rainfall, reading.rain_value.to_string());
                    self.sensor = Some(reading);
                }
                resolution = Some(done);
            }
            Action::SensorFailed { id } => {
                let done = self.finish(Channel::Sensor, id, false);
                if done.is_applied() {
                    self.banner = Some(Banner::Request(RequestError::SensorData));
                }
                resolution = Some(done);
            }
        }

        Transition {
            state: self,
            effect,
            resolution,
        }
    }

    fn finish(&mut self, channel: Channel, id: RequestId, succeeded: bool) -> Resolution {
        let slot = match channel {
            Channel::Recommend => &mut self.recommend,
            Channel::Sensor => &mut self.sensor_channel,
        };
        if slot.is_latest(id) {
            slot.status = RequestStatus::Idle;
            Resolution::Applied { channel, succeeded }
        } else {
            Resolution::Stale { channel, id }
        }
    }
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied { .. })
    }
}
