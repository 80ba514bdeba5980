// src/controller/validate.rs

//! Pre-submit gate for the measurement form.
//!
//! Rules run in form order and the first failure wins:
//! requiredness, then NPK, temperature, humidity, pH and rainfall ranges.
//! Each value goes through [`parse_measurement`] before its range check, so a
//! non-numeric entry is rejected with the range message of its group.

use thiserror::Error;

use crate::models::{Field, InputModel, Measurements};

/// A raw field that is not a usable number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0} is blank")]
    Blank(Field),

    #[error("{field}: '{raw}' is not a finite number")]
    NotANumber { field: Field, raw: String },
}

/// User-facing validation failure. `Display` is the banner text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill all fields")]
    MissingFields,

    #[error("Invalid NPK values")]
    InvalidNpk,

    #[error("Temperature must be between 8°C and 43°C")]
    Temperature,

    #[error("Humidity must be between 14% and 100%")]
    Humidity,

    #[error("pH must be between 3.5 and 9.5")]
    Ph,

    #[error("Rainfall must be between 20mm and 300mm")]
    Rainfall,
}

impl ValidationError {
    /// Range error reported when `field` is unparsable or out of bounds.
    pub fn out_of_range(field: Field) -> Self {
        match field {
            Field::Nitrogen | Field::Phosphorus | Field::Potassium => Self::InvalidNpk,
            Field::Temperature => Self::Temperature,
            Field::Humidity => Self::Humidity,
            Field::Ph => Self::Ph,
            Field::Rainfall => Self::Rainfall,
        }
    }
}

/// Parse one raw field as a finite decimal number.
///
/// Surrounding whitespace is ignored. `inf`, `NaN` and trailing garbage
/// such as `12abc` are rejected.
pub fn parse_measurement(field: Field, raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Blank(field));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::NotANumber {
            field,
            raw: raw.to_string(),
        }),
    }
}

fn checked(input: &InputModel, field: Field) -> Result<f64, ValidationError> {
    let value = parse_measurement(field, input.get(field)).map_err(|e| {
        log::debug!("Rejecting form: {e}");
        ValidationError::out_of_range(field)
    })?;
    if field.accepts(value) {
        Ok(value)
    } else {
        log::debug!("Rejecting form: {field} = {value} outside {:?}", field.range());
        Err(ValidationError::out_of_range(field))
    }
}

/// Validate the whole form, yielding the request payload on success.
pub fn validate(input: &InputModel) -> Result<Measurements, ValidationError> {
    if input.iter().any(|(_, raw)| raw.is_empty()) {
        return Err(ValidationError::MissingFields);
    }

    Ok(Measurements {
        n: checked(input, Field::Nitrogen)?,
        p: checked(input, Field::Phosphorus)?,
        k: checked(input, Field::Potassium)?,
        temperature: checked(input, Field::Temperature)?,
        humidity: checked(input, Field::Humidity)?,
        ph: checked(input, Field::Ph)?,
        rainfall: checked(input, Field::Rainfall)?,
    })
}
