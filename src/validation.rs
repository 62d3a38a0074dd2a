//! Field-level checks applied to external input before it reaches the store.
//!
//! Every violation found in a payload is collected so the boundary can render
//! one entry per offending field.

use std::fmt;

use serde::Serialize;

use crate::domain::{AddressCreate, AddressPatch, ProximityQuery};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Which constraint a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    GreaterThanEqual,
    LessThanEqual,
    FiniteNumber,
    StringTooShort,
}

/// One rejected field: where it lives in the request, why it was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
}

impl FieldError {
    pub fn new(loc: &[&str], kind: ViolationKind, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
            kind,
        }
    }
}

#[cfg(test)]
impl FieldError {
    /// Last segment of `loc`, i.e. the field name.
    pub fn field(&self) -> &str {
        self.loc.last().map(String::as_str).unwrap_or_default()
    }
}

/// Non-empty list of [`FieldError`]s for a single payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

#[cfg(test)]
impl ValidationErrors {
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.loc.join("."), e.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Inputs that must be checked before they are acted on.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn check(&mut self, result: Result<(), FieldError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

fn check_range(loc: &[&str], value: f64, min: f64, max: f64) -> Result<(), FieldError> {
    if !value.is_finite() {
        return Err(FieldError::new(loc, ViolationKind::FiniteNumber, "Input should be a finite number"));
    }
    if value < min {
        return Err(FieldError::new(
            loc,
            ViolationKind::GreaterThanEqual,
            format!("Input should be greater than or equal to {min}"),
        ));
    }
    if value > max {
        return Err(FieldError::new(
            loc,
            ViolationKind::LessThanEqual,
            format!("Input should be less than or equal to {max}"),
        ));
    }
    Ok(())
}

/// `-90 <= value <= 90`.
pub fn validate_latitude(loc: &[&str], value: f64) -> Result<(), FieldError> {
    check_range(loc, value, MIN_LATITUDE, MAX_LATITUDE)
}

/// `-180 <= value <= 180`.
pub fn validate_longitude(loc: &[&str], value: f64) -> Result<(), FieldError> {
    check_range(loc, value, MIN_LONGITUDE, MAX_LONGITUDE)
}

/// Search radius: finite and not negative.
pub fn validate_distance(loc: &[&str], value: f64) -> Result<(), FieldError> {
    check_range(loc, value, 0.0, f64::MAX)
}

pub fn validate_text(loc: &[&str], value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::new(
            loc,
            ViolationKind::StringTooShort,
            "String should have at least 1 character",
        ))
    } else {
        Ok(())
    }
}

impl Validate for AddressCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Collector::default();
        c.check(validate_text(&["body", "name"], &self.name));
        c.check(validate_text(&["body", "street"], &self.street));
        c.check(validate_text(&["body", "city"], &self.city));
        c.check(validate_text(&["body", "state"], &self.state));
        c.check(validate_text(&["body", "country"], &self.country));
        c.check(validate_latitude(&["body", "latitude"], self.latitude));
        c.check(validate_longitude(&["body", "longitude"], self.longitude));
        c.finish()
    }
}

impl Validate for AddressPatch {
    /// Only fields present in the patch are checked; absent means unchanged.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Collector::default();
        let text_fields = [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                c.check(validate_text(&["body", field], value));
            }
        }
        if let Some(latitude) = self.latitude {
            c.check(validate_latitude(&["body", "latitude"], latitude));
        }
        if let Some(longitude) = self.longitude {
            c.check(validate_longitude(&["body", "longitude"], longitude));
        }
        c.finish()
    }
}

impl Validate for ProximityQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Collector::default();
        c.check(validate_distance(&["query", "distance"], self.distance_km));
        c.check(validate_latitude(&["query", "latitude"], self.origin.latitude));
        c.check(validate_longitude(&["query", "longitude"], self.origin.longitude));
        c.finish()
    }
}
