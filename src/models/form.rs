//! The seven-field measurement form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the seven soil/climate inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 7] = [
        Field::Nitrogen,
        Field::Phosphorus,
        Field::Potassium,
        Field::Temperature,
        Field::Humidity,
        Field::Ph,
        Field::Rainfall,
    ];

    /// Name used on the wire and in the form.
    pub fn name(self) -> &'static str {
        match self {
            Field::Nitrogen => "N",
            Field::Phosphorus => "P",
            Field::Potassium => "K",
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Ph => "ph",
            Field::Rainfall => "rainfall",
        }
    }

    /// Human readable label with unit.
    pub fn label(self) -> &'static str {
        match self {
            Field::Nitrogen => "Nitrogen (N) - ppm",
            Field::Phosphorus => "Phosphorus (P) - ppm",
            Field::Potassium => "Potassium (K) - ppm",
            Field::Temperature => "Temperature - °C",
            Field::Humidity => "Humidity - %",
            Field::Ph => "pH Level",
            Field::Rainfall => "Rainfall - mm",
        }
    }

    /// Inclusive accepted range.
    pub fn range(self) -> (f64, f64) {
        match self {
            Field::Nitrogen => (0.0, 140.0),
            Field::Phosphorus => (5.0, 145.0),
            Field::Potassium => (5.0, 205.0),
            Field::Temperature => (8.0, 43.0),
            Field::Humidity => (14.0, 100.0),
            Field::Ph => (3.5, 9.5),
            Field::Rainfall => (20.0, 300.0),
        }
    }

    /// Range hint shown under the input.
    pub fn hint(self) -> &'static str {
        match self {
            Field::Nitrogen => "Range: 0-140 ppm",
            Field::Phosphorus => "Range: 5-145 ppm",
            Field::Potassium => "Range: 5-205 ppm",
            Field::Temperature => "Range: 8-43°C",
            Field::Humidity => "Range: 14-100%",
            Field::Ph => "Range: 3.5-9.5",
            Field::Rainfall => "Range: 20-300mm",
        }
    }

    /// Whether `value` lies inside the inclusive range.
    pub fn accepts(self, value: f64) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "nitrogen" => Ok(Field::Nitrogen),
            "p" | "phosphorus" => Ok(Field::Phosphorus),
            "k" | "potassium" => Ok(Field::Potassium),
            "temperature" | "temp" => Ok(Field::Temperature),
            "humidity" => Ok(Field::Humidity),
            "ph" => Ok(Field::Ph),
            "rainfall" | "rain" => Ok(Field::Rainfall),
            other => Err(AppError::validation(format!("unknown field '{other}'"))),
        }
    }
}

/// Raw text of every form input, pending validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputModel {
    pub n: String,
    pub p: String,
    pub k: String,
    pub temperature: String,
    pub humidity: String,
    pub ph: String,
    pub rainfall: String,
}

impl InputModel {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Nitrogen => &self.n,
            Field::Phosphorus => &self.p,
            Field::Potassium => &self.k,
            Field::Temperature => &self.temperature,
            Field::Humidity => &self.humidity,
            Field::Ph => &self.ph,
            Field::Rainfall => &self.rainfall,
        }
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Nitrogen => &mut self.n,
            Field::Phosphorus => &mut self.p,
            Field::Potassium => &mut self.k,
            Field::Temperature => &mut self.temperature,
            Field::Humidity => &mut self.humidity,
            Field::Ph => &mut self.ph,
            Field::Rainfall => &mut self.rainfall,
        };
        *slot = value.into();
    }

    /// Builder-style variant of [`InputModel::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterate `(field, raw text)` in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

/// Validated numeric form values; also the `/api/recommend` request body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}
