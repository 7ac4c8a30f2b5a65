//! Choice lists and default bounds that drive the dashboard filter widgets.

use log::debug;
use std::collections::HashSet;

use crate::api::{FilterOptions, NumericBounds, RangeKind, TimeBounds};
use crate::models::{format_clock, Dataset};
use crate::services::dashboard::{
    RangeColumns, ADR_MID_BROKEN, DAY_OF_WEEK, INSTRUMENT, ODR_MID_BROKEN, WEEKDAYS,
};
use crate::services::error::AnalysisResult;
use crate::services::filtering::WILDCARD;

/// `"All"` followed by the distinct non-missing keys of `column`, in first-seen order.
pub fn category_options(dataset: &Dataset, column: &str) -> AnalysisResult<Vec<String>> {
    let col = dataset.require_column(column, "category_options")?;
    let mut seen = HashSet::new();
    let mut options = vec![WILDCARD.to_string()];
    for row in 0..dataset.height() {
        if let Some(key) = col.text_at(row) {
            if seen.insert(key.clone()) {
                options.push(key);
            }
        }
    }
    Ok(options)
}

/// Observed min/max of a numeric column; `None` when it has no values.
pub fn numeric_bounds(dataset: &Dataset, column: &str) -> AnalysisResult<Option<NumericBounds>> {
    let values = dataset
        .require_column(column, "numeric_bounds")?
        .as_numbers()?;
    Ok(values.iter().flatten().fold(None, |acc, &v| {
        Some(match acc {
            None => NumericBounds { min: v, max: v },
            Some(b) => NumericBounds {
                min: b.min.min(v),
                max: b.max.max(v),
            },
        })
    }))
}

/// Observed earliest/latest time of a time-of-day column; `None` when it has no values.
pub fn time_bounds(dataset: &Dataset, column: &str) -> AnalysisResult<Option<TimeBounds>> {
    let values = dataset.require_column(column, "time_bounds")?.as_times()?;
    let present = values.iter().flatten();
    let (Some(min), Some(max)) = (present.clone().min(), present.max()) else {
        return Ok(None);
    };
    Ok(Some(TimeBounds {
        min: *min,
        max: *max,
        min_label: format_clock(*min),
        max_label: format_clock(*max),
    }))
}

/// Options for a column that may be absent; an absent column offers only the wildcard.
fn options_or_wildcard(dataset: &Dataset, column: &str) -> AnalysisResult<Vec<String>> {
    if dataset.has_column(column) {
        category_options(dataset, column)
    } else {
        debug!("No options for absent column '{}'", column);
        Ok(vec![WILDCARD.to_string()])
    }
}

/// Every option list and default bound of the dashboard for `range`.
pub fn dashboard_options(dataset: &Dataset, range: RangeKind) -> AnalysisResult<FilterOptions> {
    let cols = RangeColumns::for_range(range);

    let box_size = if dataset.has_column(&cols.box_size) {
        numeric_bounds(dataset, &cols.box_size)?
    } else {
        None
    };
    let m7box_time = if dataset.has_column(&cols.m7box_time) {
        time_bounds(dataset, &cols.m7box_time)?
    } else {
        None
    };
    let dr_time = if dataset.has_column(&cols.dr_time) {
        time_bounds(dataset, &cols.dr_time)?
    } else {
        None
    };

    let days_of_week = std::iter::once(WILDCARD)
        .chain(WEEKDAYS.iter().copied())
        .map(str::to_string)
        .collect();

    Ok(FilterOptions {
        range,
        range_kinds: RangeKind::ALL.to_vec(),
        instruments: options_or_wildcard(dataset, INSTRUMENT)?,
        days_of_week,
        m7box_directions: options_or_wildcard(dataset, &cols.m7box_direction)?,
        m7box_confirmation_directions: options_or_wildcard(
            dataset,
            &cols.m7box_confirmation_direction,
        )?,
        dr_confirmation_directions: options_or_wildcard(dataset, &cols.dr_confirmation_direction)?,
        confirmation_valid: options_or_wildcard(dataset, &cols.confirmation_valid)?,
        m7box_confirmation_valid: options_or_wildcard(dataset, &cols.m7box_confirmation_valid)?,
        models: options_or_wildcard(dataset, &cols.model)?,
        adr_mid_broken: options_or_wildcard(dataset, ADR_MID_BROKEN)?,
        odr_mid_broken: options_or_wildcard(dataset, ODR_MID_BROKEN)?,
        box_size,
        m7box_time,
        dr_time,
    })
}
