use serde::{Deserialize, Serialize};

/// The range of a slider in the panel, in slider units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliderRange {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl SliderRange {
    /// Keep `value` inside the slider bounds.
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Temperature slider, in degrees Celsius.
pub const TEMPERATURE_RANGE: SliderRange = SliderRange {
    min: -70,
    max: 70,
    default: 0,
};

/// Humidity slider, in percent.
pub const HUMIDITY_RANGE: SliderRange = SliderRange {
    min: 0,
    max: 100,
    default: 50,
};

/// A temperature reading as sent to the backend.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TemperatureRecord {
    /// Whole degrees Celsius, as set on the slider.
    pub value: i32,
    /// Unix time in seconds.
    pub time: f64,
}

impl TemperatureRecord {
    pub fn new(degrees: i32, time: f64) -> Self {
        Self {
            value: degrees,
            time,
        }
    }
}

/// A humidity reading as sent to the backend.
///
/// The slider works in percent, the backend expects a fraction in `0..=1`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct HumidityRecord {
    /// Relative humidity as a fraction.
    pub value: f64,
    /// Unix time in seconds.
    pub time: f64,
}

impl HumidityRecord {
    /// Create a record from a slider value in percent.
    pub fn from_percent(percent: i32, time: f64) -> Self {
        Self {
            value: percent as f64 / 100.0,
            time,
        }
    }
}

#[test]
fn test_slider_clamp() {
    assert_eq!(TEMPERATURE_RANGE.clamp(-71), -70);
    assert_eq!(TEMPERATURE_RANGE.clamp(71), 70);
    assert_eq!(TEMPERATURE_RANGE.clamp(12), 12);
    assert_eq!(HUMIDITY_RANGE.clamp(-1), 0);
    assert_eq!(HUMIDITY_RANGE.clamp(250), 100);
}

#[test]
fn test_humidity_is_normalized() {
    let record = HumidityRecord::from_percent(50, 0.0);
    assert_eq!(record.value, 0.5);

    assert_eq!(HumidityRecord::from_percent(0, 0.0).value, 0.0);
    assert_eq!(HumidityRecord::from_percent(100, 0.0).value, 1.0);
}

#[test]
fn test_record_json_shape() {
    let record = TemperatureRecord::new(-20, 1_700_000_000.5);
    let json = serde_json::to_value(record).unwrap();

    assert_eq!(json, serde_json::json!({ "value": -20, "time": 1_700_000_000.5 }));
    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        r#"{"value":-20,"time":1700000000.5}"#
    );
}
