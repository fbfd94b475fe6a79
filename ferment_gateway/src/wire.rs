//! JSON bodies exchanged with an EVOK-style gateway.
//!
//! Reads:
//! - `GET /temp/{circuit}`       -> `{"value": 18.5, "lost": false}`
//! - `GET /data_point/{circuit}` -> `{"value": 18.5, "valid": true}`
//! - `GET /di/{circuit}`, `GET /ro/{circuit}` -> `{"value": true}` or `{"value": 1}`
//!
//! Writes: `POST /ro/{circuit}` with `{"value": 0|1}`.
use ferment_traits::TempPoint;
use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// Which temperature endpoint the gateway exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// `/temp/{circuit}` reporting a `lost` flag.
    #[default]
    Temp,
    /// `/data_point/{circuit}` reporting a `valid` flag.
    DataPoint,
}

impl Flavor {
    pub fn path(self) -> &'static str {
        match self {
            Flavor::Temp => "temp",
            Flavor::DataPoint => "data_point",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TempBody {
    value: Option<f32>,
    #[serde(default)]
    lost: bool,
}

#[derive(Debug, Deserialize)]
struct DataPointBody {
    value: Option<f32>,
    // Absent flag counts as invalid.
    #[serde(default)]
    valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Level {
    Bool(bool),
    Num(f64),
}

#[derive(Debug, Deserialize)]
struct LevelBody {
    value: Level,
}

/// Decode a temperature body for the given endpoint flavor.
pub fn parse_temp(flavor: Flavor, body: &str) -> Result<TempPoint> {
    let (value, valid) = match flavor {
        Flavor::Temp => {
            let b: TempBody = serde_json::from_str(body)?;
            (b.value, !b.lost)
        }
        Flavor::DataPoint => {
            let b: DataPointBody = serde_json::from_str(body)?;
            (b.value, b.valid)
        }
    };
    let value = value.filter(|v| v.is_finite());
    Ok(TempPoint {
        value,
        valid: valid && value.is_some(),
    })
}

/// Decode a binary input/output body. A missing `value` is an error, never `false`.
pub fn parse_level(body: &str) -> Result<bool> {
    let b: LevelBody = serde_json::from_str(body)?;
    match b.value {
        Level::Bool(v) => Ok(v),
        Level::Num(n) if n == 0.0 => Ok(false),
        Level::Num(n) if n == 1.0 => Ok(true),
        Level::Num(n) => Err(GatewayError::Decode(format!("unexpected level {n}"))),
    }
}

/// Body for `POST /ro/{circuit}`.
pub fn relay_body(on: bool) -> serde_json::Value {
    serde_json::json!({ "value": u8::from(on) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Flavor::Temp, r#"{"value": 18.5, "lost": false}"#, Some(18.5), true)]
    #[case(Flavor::Temp, r#"{"value": 18.5, "lost": true}"#, Some(18.5), false)]
    #[case(Flavor::Temp, r#"{"value": 21.0}"#, Some(21.0), true)]
    #[case(Flavor::Temp, r#"{"lost": false}"#, None, false)]
    #[case(Flavor::DataPoint, r#"{"value": 4.25, "valid": true}"#, Some(4.25), true)]
    #[case(Flavor::DataPoint, r#"{"value": 4.25}"#, Some(4.25), false)]
    fn temp_bodies(
        #[case] flavor: Flavor,
        #[case] body: &str,
        #[case] value: Option<f32>,
        #[case] valid: bool,
    ) {
        let p = parse_temp(flavor, body).expect("decode");
        assert_eq!(p.value, value);
        assert_eq!(p.valid, valid);
    }

    #[rstest]
    #[case(r#"{"value": true}"#, true)]
    #[case(r#"{"value": false}"#, false)]
    #[case(r#"{"value": 1}"#, true)]
    #[case(r#"{"value": 0}"#, false)]
    fn level_bodies(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(parse_level(body).expect("decode"), expected);
    }

    #[test]
    fn level_without_value_is_an_error() {
        let err = parse_level(r#"{"circuit": "1_01"}"#).expect_err("missing value");
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn relay_body_is_numeric() {
        assert_eq!(relay_body(true).to_string(), r#"{"value":1}"#);
        assert_eq!(relay_body(false).to_string(), r#"{"value":0}"#);
    }
}
