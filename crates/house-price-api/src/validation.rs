//! Input validation for housing feature records
//!
//! Every field of [`HouseFeatures`] is described by a [`FieldRule`] in
//! [`FIELD_RULES`]. Validation walks the whole table and collects every
//! violation instead of stopping at the first one, so a client sees all of
//! its mistakes in a single 400 response.
//!
//! Nothing here depends on the HTTP layer; the CLI and tests call
//! [`validate_payload`] directly.

use serde_json::{Map, Value};

use crate::contracts::{FeatureValue, HouseFeatures};
use crate::error::{ValidationErrors, Violation, ViolationCode};

/// Inclusive or exclusive numeric bounds for a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    /// Minimum value
    pub min: Option<f64>,
    /// Maximum value
    pub max: Option<f64>,
    /// Whether min is exclusive
    pub min_exclusive: bool,
    /// Whether max is exclusive
    pub max_exclusive: bool,
}

impl NumericBounds {
    /// Strictly greater than zero
    pub const fn positive() -> Self {
        Self {
            min: Some(0.0),
            max: None,
            min_exclusive: true,
            max_exclusive: false,
        }
    }

    /// Zero or greater
    pub const fn non_negative() -> Self {
        Self {
            min: Some(0.0),
            max: None,
            min_exclusive: false,
            max_exclusive: false,
        }
    }

    /// Inclusive on both ends
    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            min_exclusive: false,
            max_exclusive: false,
        }
    }

    /// Check if a value is within bounds
    pub fn check(&self, value: f64) -> BoundsCheckResult {
        if let Some(min) = self.min {
            let too_low = if self.min_exclusive {
                value <= min
            } else {
                value < min
            };
            if too_low {
                return BoundsCheckResult::BelowMinimum { value, min };
            }
        }

        if let Some(max) = self.max {
            let too_high = if self.max_exclusive {
                value >= max
            } else {
                value > max
            };
            if too_high {
                return BoundsCheckResult::AboveMaximum { value, max };
            }
        }

        BoundsCheckResult::WithinBounds
    }

    /// Get a description of the bounds
    pub fn describe(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => {
                let min_bracket = if self.min_exclusive { "(" } else { "[" };
                let max_bracket = if self.max_exclusive { ")" } else { "]" };
                format!("in {}{}, {}{}", min_bracket, min, max, max_bracket)
            }
            (Some(min), None) => {
                if self.min_exclusive {
                    format!("> {}", min)
                } else {
                    format!(">= {}", min)
                }
            }
            (None, Some(max)) => {
                if self.max_exclusive {
                    format!("< {}", max)
                } else {
                    format!("<= {}", max)
                }
            }
            (None, None) => "unbounded".to_string(),
        }
    }
}

/// Result of a bounds check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsCheckResult {
    WithinBounds,
    BelowMinimum { value: f64, min: f64 },
    AboveMaximum { value: f64, max: f64 },
}

/// Expected shape of one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Number(NumericBounds),
    Category,
}

/// Validation rule for a single named field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldRule {
    const fn number(name: &'static str, bounds: NumericBounds) -> Self {
        Self {
            name,
            kind: FieldKind::Number(bounds),
        }
    }

    /// Convert a raw JSON value into a typed feature, or report the type mismatch
    ///
    /// Numeric fields also accept strings holding a number (`"8.3252"`); the
    /// parsed value still goes through [`FieldRule::check`].
    pub fn extract(&self, value: &Value) -> Result<FeatureValue, Violation> {
        match (self.kind, value) {
            (FieldKind::Number(_), Value::Number(n)) => n
                .as_f64()
                .map(FeatureValue::Number)
                .ok_or_else(|| Violation::type_mismatch(self.name, "number", "unrepresentable number")),
            (FieldKind::Number(_), Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(FeatureValue::Number)
                .map_err(|_| Violation::type_mismatch(self.name, "number", "string")),
            (FieldKind::Number(_), other) => Err(Violation::type_mismatch(
                self.name,
                "number",
                json_type_name(other),
            )),
            (FieldKind::Category, Value::String(s)) => Ok(FeatureValue::Category(s.clone())),
            (FieldKind::Category, other) => Err(Violation::type_mismatch(
                self.name,
                "string",
                json_type_name(other),
            )),
        }
    }

    /// Check range and emptiness constraints on a typed value
    pub fn check(&self, value: &FeatureValue) -> Option<Violation> {
        match (self.kind, value) {
            (FieldKind::Number(bounds), FeatureValue::Number(n)) => {
                if !n.is_finite() {
                    return Some(Violation::new(
                        self.name,
                        ViolationCode::NotFinite,
                        format!("field '{}' must be a finite number", self.name),
                    ));
                }
                match bounds.check(*n) {
                    BoundsCheckResult::WithinBounds => None,
                    BoundsCheckResult::BelowMinimum { value, .. }
                    | BoundsCheckResult::AboveMaximum { value, .. } => Some(Violation::new(
                        self.name,
                        ViolationCode::OutOfRange,
                        format!(
                            "field '{}' must be {}, got {}",
                            self.name,
                            bounds.describe(),
                            value
                        ),
                    )),
                }
            }
            (FieldKind::Category, FeatureValue::Category(c)) => {
                if c.trim().is_empty() {
                    Some(Violation::new(
                        self.name,
                        ViolationCode::EmptyCategory,
                        format!("field '{}' must be a non-empty category", self.name),
                    ))
                } else {
                    None
                }
            }
            (FieldKind::Number(_), FeatureValue::Category(_)) => {
                Some(Violation::type_mismatch(self.name, "number", "string"))
            }
            (FieldKind::Category, FeatureValue::Number(_)) => {
                Some(Violation::type_mismatch(self.name, "string", "number"))
            }
        }
    }
}

/// Constraints for every input field, listed in model feature order
pub static FIELD_RULES: [FieldRule; 12] = [
    FieldRule::number("median_income", NumericBounds::positive()),
    FieldRule::number("housing_median_age", NumericBounds::closed(0.0, 100.0)),
    FieldRule::number("total_rooms", NumericBounds::positive()),
    FieldRule::number("rooms_per_household", NumericBounds::positive()),
    FieldRule::number("population_per_household", NumericBounds::positive()),
    FieldRule::number("total_bedrooms", NumericBounds::positive()),
    FieldRule::number("bedrooms_per_room", NumericBounds::positive()),
    FieldRule::number("population", NumericBounds::non_negative()),
    FieldRule::number("households", NumericBounds::positive()),
    FieldRule::number("latitude", NumericBounds::closed(-90.0, 90.0)),
    FieldRule::number("longitude", NumericBounds::closed(-180.0, 180.0)),
    FieldRule {
        name: "ocean_proximity",
        kind: FieldKind::Category,
    },
];

/// Validate an untyped JSON body into a [`HouseFeatures`] record
///
/// Reports every missing field, type mismatch and range violation at once.
/// Unknown extra fields are ignored.
pub fn validate_payload(payload: &Value) -> Result<HouseFeatures, ValidationErrors> {
    let Some(map) = payload.as_object() else {
        return Err(ValidationErrors::single(Violation::invalid_body(format!(
            "request body must be a JSON object, got {}",
            json_type_name(payload)
        ))));
    };

    let mut violations = Vec::new();
    let mut typed = Map::with_capacity(FIELD_RULES.len());
    for rule in FIELD_RULES.iter() {
        let Some(raw) = map.get(rule.name) else {
            violations.push(Violation::missing(rule.name));
            continue;
        };

        match rule.extract(raw) {
            Ok(value) => match rule.check(&value) {
                Some(violation) => violations.push(violation),
                None => {
                    typed.insert(rule.name.to_string(), feature_to_json(value));
                }
            },
            Err(violation) => violations.push(violation),
        }
    }

    if !violations.is_empty() {
        return Err(ValidationErrors::new(violations));
    }

    serde_json::from_value(Value::Object(typed)).map_err(|e| {
        ValidationErrors::single(Violation::invalid_body(format!(
            "request body could not be decoded: {}",
            e
        )))
    })
}

/// Check range constraints on an already typed record
pub fn check_features(features: &HouseFeatures) -> Result<(), ValidationErrors> {
    let violations: Vec<Violation> = FIELD_RULES
        .iter()
        .filter_map(|rule| {
            features
                .value_of(rule.name)
                .and_then(|value| rule.check(&value))
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors::new(violations))
    }
}

fn feature_to_json(value: FeatureValue) -> Value {
    match value {
        FeatureValue::Number(n) => Value::from(n),
        FeatureValue::Category(c) => Value::String(c),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::FEATURE_NAMES;
    use proptest::prelude::*;
    use serde_json::json;

    fn example_payload() -> Value {
        json!({
            "median_income": 8.3252,
            "housing_median_age": 41,
            "total_rooms": 880,
            "total_bedrooms": 129,
            "bedrooms_per_room": 0.2,
            "rooms_per_household": 6.0,
            "population": 322,
            "population_per_household": 2.555,
            "households": 126,
            "latitude": 37.88,
            "longitude": -122.23,
            "ocean_proximity": "<1H OCEAN"
        })
    }

    #[test]
    fn test_rules_follow_feature_order() {
        let names: Vec<&str> = FIELD_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn test_bounds_check() {
        let positive = NumericBounds::positive();
        assert_eq!(positive.check(0.1), BoundsCheckResult::WithinBounds);
        assert!(matches!(
            positive.check(0.0),
            BoundsCheckResult::BelowMinimum { .. }
        ));

        let age = NumericBounds::closed(0.0, 100.0);
        assert_eq!(age.check(0.0), BoundsCheckResult::WithinBounds);
        assert_eq!(age.check(100.0), BoundsCheckResult::WithinBounds);
        assert!(matches!(
            age.check(100.5),
            BoundsCheckResult::AboveMaximum { .. }
        ));
    }

    #[test]
    fn test_bounds_describe() {
        assert_eq!(NumericBounds::positive().describe(), "> 0");
        assert_eq!(NumericBounds::non_negative().describe(), ">= 0");
        assert_eq!(NumericBounds::closed(-90.0, 90.0).describe(), "in [-90, 90]");
    }

    #[test]
    fn test_valid_payload() {
        let features = validate_payload(&example_payload()).unwrap();
        assert_eq!(features, HouseFeatures::example());
        assert!(features.validate().is_ok());
    }

    #[test]
    fn test_negative_income_rejected() {
        let mut payload = example_payload();
        payload["median_income"] = json!(-1);

        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.len(), 1);
        let violation = &err.violations()[0];
        assert_eq!(violation.field, "median_income");
        assert_eq!(violation.code, ViolationCode::OutOfRange);
        assert_eq!(violation.message, "field 'median_income' must be > 0, got -1");
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut payload = example_payload();
        payload.as_object_mut().unwrap().remove("households");

        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.violations(), &[Violation::missing("households")]);
    }

    #[test]
    fn test_collects_every_violation() {
        let payload = json!({
            "median_income": 0,
            "housing_median_age": 101,
            "total_rooms": "many",
            "total_bedrooms": 129,
            "bedrooms_per_room": -0.2,
            "rooms_per_household": 6.0,
            "population": -1,
            "population_per_household": 2.555,
            "households": 126,
            "latitude": 91,
            "longitude": -181,
            "ocean_proximity": "   "
        });

        let err = validate_payload(&payload).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "median_income",
                "housing_median_age",
                "total_rooms",
                "bedrooms_per_room",
                "population",
                "latitude",
                "longitude",
                "ocean_proximity",
            ]
        );
        assert_eq!(err.violations()[2].code, ViolationCode::TypeMismatch);
        assert_eq!(err.violations()[7].code, ViolationCode::EmptyCategory);
    }

    #[test]
    fn test_null_is_type_mismatch() {
        let mut payload = example_payload();
        payload["latitude"] = Value::Null;

        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.violations()[0].code, ViolationCode::TypeMismatch);
        assert_eq!(
            err.violations()[0].message,
            "field 'latitude' must be a number, got null"
        );
    }

    #[test]
    fn test_numeric_category_rejected() {
        let mut payload = example_payload();
        payload["ocean_proximity"] = json!(1);

        let err = validate_payload(&payload).unwrap_err();
        assert!(err.has_field("ocean_proximity"));
        assert_eq!(err.violations()[0].code, ViolationCode::TypeMismatch);
    }

    #[test]
    fn test_non_object_body_rejected() {
        let err = validate_payload(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.violations()[0].code, ViolationCode::InvalidBody);
        assert_eq!(
            err.violations()[0].message,
            "request body must be a JSON object, got array"
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut payload = example_payload();
        payload["bathrooms"] = json!(2);
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut payload = example_payload();
        payload["median_income"] = json!("8.3252");
        payload["population"] = json!(" 322 ");

        let features = validate_payload(&payload).unwrap();
        assert_eq!(features, HouseFeatures::example());
    }

    #[test]
    fn test_non_numeric_string_is_type_mismatch() {
        let mut payload = example_payload();
        payload["median_income"] = json!("abc");

        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.violations()[0].code, ViolationCode::TypeMismatch);
        assert_eq!(
            err.violations()[0].message,
            "field 'median_income' must be a number, got string"
        );
    }

    #[test]
    fn test_coerced_strings_are_range_checked() {
        let mut payload = example_payload();
        payload["median_income"] = json!("-1");
        payload["latitude"] = json!("NaN");

        let err = validate_payload(&payload).unwrap_err();
        let codes: Vec<ViolationCode> = err.violations().iter().map(|v| v.code).collect();
        assert_eq!(codes, vec![ViolationCode::OutOfRange, ViolationCode::NotFinite]);
    }

    #[test]
    fn test_inclusive_bounds_at_payload_level() {
        // (field, inclusive end, first value past it)
        let cases: &[(&str, f64, f64)] = &[
            ("population", 0.0, -0.001),
            ("housing_median_age", 0.0, -0.001),
            ("housing_median_age", 100.0, 100.001),
            ("latitude", -90.0, -90.001),
            ("latitude", 90.0, 90.001),
            ("longitude", -180.0, -180.001),
            ("longitude", 180.0, 180.001),
        ];

        for &(field, edge, past) in cases {
            let mut payload = example_payload();
            payload[field] = json!(edge);
            let features = validate_payload(&payload)
                .unwrap_or_else(|e| panic!("{} = {} should be accepted: {}", field, edge, e));
            assert_eq!(features.value_of(field), Some(FeatureValue::Number(edge)));

            payload[field] = json!(past);
            let err = validate_payload(&payload).unwrap_err();
            assert_eq!(err.len(), 1, "{} = {}", field, past);
            assert_eq!(err.violations()[0].field, field);
            assert_eq!(err.violations()[0].code, ViolationCode::OutOfRange);
        }
    }

    #[test]
    fn test_exclusive_zero_bound_at_payload_level() {
        for field in ["median_income", "total_rooms", "households", "bedrooms_per_room"] {
            let mut payload = example_payload();
            payload[field] = json!(0);
            let err = validate_payload(&payload).unwrap_err();
            assert_eq!(err.violations()[0].field, field);
            assert_eq!(err.violations()[0].code, ViolationCode::OutOfRange);
        }
    }

    #[test]
    fn test_check_features_catches_non_finite() {
        let mut features = HouseFeatures::example();
        features.longitude = f64::NAN;

        let err = features.validate().unwrap_err();
        assert_eq!(err.violations()[0].code, ViolationCode::NotFinite);
    }

    proptest! {
        #[test]
        fn prop_in_range_records_are_accepted(
            income in 0.01f64..20.0,
            age in 0.0f64..=100.0,
            population in 0.0f64..50_000.0,
            latitude in -90.0f64..=90.0,
            longitude in -180.0f64..=180.0,
        ) {
            let mut payload = example_payload();
            payload["median_income"] = json!(income);
            payload["housing_median_age"] = json!(age);
            payload["population"] = json!(population);
            payload["latitude"] = json!(latitude);
            payload["longitude"] = json!(longitude);

            prop_assert!(validate_payload(&payload).is_ok());
        }

        #[test]
        fn prop_non_positive_ratios_are_rejected(
            ratio in -1_000.0f64..=0.0,
            field in prop::sample::select(vec![
                "bedrooms_per_room",
                "rooms_per_household",
                "population_per_household",
            ]),
        ) {
            let mut payload = example_payload();
            payload[field] = json!(ratio);

            let err = validate_payload(&payload).unwrap_err();
            prop_assert_eq!(err.len(), 1);
            prop_assert_eq!(err.violations()[0].field.as_str(), field);
        }
    }
}
