//! Housing feature record and prediction output

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, ValidationErrors};

/// Feature names in the exact order the model was trained on
pub const FEATURE_NAMES: [&str; 12] = [
    "median_income",
    "housing_median_age",
    "total_rooms",
    "rooms_per_household",
    "population_per_household",
    "total_bedrooms",
    "bedrooms_per_room",
    "population",
    "households",
    "latitude",
    "longitude",
    "ocean_proximity",
];

/// Number of features the model expects
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Features carried as category strings rather than numbers
pub const CATEGORICAL_FEATURES: [&str; 1] = ["ocean_proximity"];

/// One housing district as submitted to `POST /predict`
///
/// Field order here is the request schema order; it intentionally differs
/// from [`FEATURE_NAMES`]. Use [`HouseFeatures::to_feature_vector`] to get the
/// model order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseFeatures {
    /// Median household income, > 0
    pub median_income: f64,
    /// Age of housing in years, in [0, 100]
    pub housing_median_age: f64,
    /// Total number of rooms, > 0
    pub total_rooms: f64,
    /// Total number of bedrooms, > 0
    pub total_bedrooms: f64,
    /// Ratio of bedrooms to rooms, > 0
    pub bedrooms_per_room: f64,
    /// Rooms per household, > 0
    pub rooms_per_household: f64,
    /// Total population, >= 0
    pub population: f64,
    /// People per household, > 0
    pub population_per_household: f64,
    /// Number of households, > 0
    pub households: f64,
    /// Latitude, in [-90, 90]
    pub latitude: f64,
    /// Longitude, in [-180, 180]
    pub longitude: f64,
    /// Proximity to ocean, e.g. `<1H OCEAN` or `INLAND`
    pub ocean_proximity: String,
}

impl HouseFeatures {
    /// Build the feature vector in [`FEATURE_NAMES`] order
    pub fn to_feature_vector(&self) -> Vec<FeatureValue> {
        vec![
            FeatureValue::Number(self.median_income),
            FeatureValue::Number(self.housing_median_age),
            FeatureValue::Number(self.total_rooms),
            FeatureValue::Number(self.rooms_per_household),
            FeatureValue::Number(self.population_per_household),
            FeatureValue::Number(self.total_bedrooms),
            FeatureValue::Number(self.bedrooms_per_room),
            FeatureValue::Number(self.population),
            FeatureValue::Number(self.households),
            FeatureValue::Number(self.latitude),
            FeatureValue::Number(self.longitude),
            FeatureValue::Category(self.ocean_proximity.clone()),
        ]
    }

    /// Look up a single feature by name
    pub fn value_of(&self, name: &str) -> Option<FeatureValue> {
        let value = match name {
            "median_income" => FeatureValue::Number(self.median_income),
            "housing_median_age" => FeatureValue::Number(self.housing_median_age),
            "total_rooms" => FeatureValue::Number(self.total_rooms),
            "total_bedrooms" => FeatureValue::Number(self.total_bedrooms),
            "bedrooms_per_room" => FeatureValue::Number(self.bedrooms_per_room),
            "rooms_per_household" => FeatureValue::Number(self.rooms_per_household),
            "population" => FeatureValue::Number(self.population),
            "population_per_household" => FeatureValue::Number(self.population_per_household),
            "households" => FeatureValue::Number(self.households),
            "latitude" => FeatureValue::Number(self.latitude),
            "longitude" => FeatureValue::Number(self.longitude),
            "ocean_proximity" => FeatureValue::Category(self.ocean_proximity.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Re-check every range constraint on an already constructed record
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        crate::validation::check_features(self)
    }

    /// The documented example district
    pub fn example() -> Self {
        Self {
            median_income: 8.3252,
            housing_median_age: 41.0,
            total_rooms: 880.0,
            total_bedrooms: 129.0,
            bedrooms_per_room: 0.2,
            rooms_per_household: 6.0,
            population: 322.0,
            population_per_household: 2.555,
            households: 126.0,
            latitude: 37.88,
            longitude: -122.23,
            ocean_proximity: "<1H OCEAN".to_string(),
        }
    }
}

/// A single entry of the ordered feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Number(_) => None,
            FeatureValue::Category(c) => Some(c),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Category(c) => write!(f, "{:?}", c),
        }
    }
}

/// Response body of a successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted house price, always finite and > 0
    pub predicted_price: f64,
}

impl PredictionResult {
    /// Wrap a raw model output, rejecting prices that are not strictly positive
    pub fn new(predicted_price: f64) -> Result<Self, InferenceError> {
        if !predicted_price.is_finite() {
            return Err(InferenceError::NonFiniteOutput(predicted_price));
        }
        if predicted_price <= 0.0 {
            return Err(InferenceError::NonPositivePrice(predicted_price));
        }
        Ok(Self { predicted_price })
    }
}
