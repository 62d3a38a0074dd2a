use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// A stored postal address. `id` is assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Address {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Payload for creating a new address. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCreate {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Payload for a partial update.
///
/// `None` means "leave unchanged". `Some` is always applied, including
/// `Some(0.0)` coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// "Everything within `distance_km` of `origin`".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityQuery {
    #[serde(rename = "distance")]
    pub distance_km: f64,
    #[serde(flatten)]
    pub origin: Coordinates,
}

impl ProximityQuery {
    pub fn new(distance_km: f64, origin: Coordinates) -> Self {
        Self { distance_km, origin }
    }
}

/// Proximity results as they appear in a response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressList {
    pub addresses: Vec<Address>,
}
