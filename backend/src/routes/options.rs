use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::api::RangeKind;

// =========================================================
// Filter option types + route
// =========================================================

/// Observed extent of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
}

/// Observed extent of a time-of-day column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min: NaiveTime,
    pub max: NaiveTime,
    /// `HH:MM` renderings for slider captions.
    pub min_label: String,
    pub max_label: String,
}

/// Choices and default bounds for every dashboard filter of one range kind.
///
/// Single- and multi-choice lists start with the `"All"` wildcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub range: RangeKind,
    pub range_kinds: Vec<RangeKind>,
    pub instruments: Vec<String>,
    pub days_of_week: Vec<String>,
    pub m7box_directions: Vec<String>,
    pub m7box_confirmation_directions: Vec<String>,
    pub dr_confirmation_directions: Vec<String>,
    pub confirmation_valid: Vec<String>,
    pub m7box_confirmation_valid: Vec<String>,
    pub models: Vec<String>,
    pub adr_mid_broken: Vec<String>,
    pub odr_mid_broken: Vec<String>,
    pub box_size: Option<NumericBounds>,
    pub m7box_time: Option<TimeBounds>,
    pub dr_time: Option<TimeBounds>,
}

/// Query string of the options endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsParams {
    #[serde(default)]
    pub range: RangeKind,
}

/// Route path for the options endpoint.
pub const GET_OPTIONS: &str = "/v1/sessions/{session_id}/options";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_bounds_serialize() {
        let bounds = TimeBounds {
            min: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            max: NaiveTime::from_hms_opt(11, 5, 0).unwrap(),
            min_label: "09:30".into(),
            max_label: "11:05".into(),
        };
        let value = serde_json::to_value(&bounds).unwrap();
        assert_eq!(value["min"], json!("09:30:00"));
        assert_eq!(value["max_label"], json!("11:05"));
    }

    #[test]
    fn test_params_default_range() {
        let params: OptionsParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.range, RangeKind::Odr);
    }
}
