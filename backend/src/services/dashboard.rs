//! The range-box dashboard: bin → filter → aggregate over the session dataset
//! for one range kind.
//!
//! Uploaded datasets follow a fixed column naming contract. Range-specific
//! columns are prefixed with `ODR` or `RDR`; a handful of columns are shared.

use log::debug;

use crate::api::{
    AxisHints, BoundsQuery, ChartKind, Comparison, DashboardChart, DashboardQuery,
    DashboardReport, DistributionReport, MetricTile, OccurrenceTable, ProbabilityProbe,
    RangeKind, TileKind,
};
use crate::models::Dataset;
use crate::services::binning::{apply_bin_specs, BinSpec};
use crate::services::distributions::{median, quantile, threshold_probability, value_distribution};
use crate::services::error::AnalysisResult;
use crate::services::filter_options::{numeric_bounds, time_bounds};
use crate::services::filtering::{apply_filters, FilterPredicate};

pub const INSTRUMENT: &str = "Instrument";
pub const DAY_OF_WEEK: &str = "Day of Week";
pub const DATE: &str = "Date";
pub const CONTRACT: &str = "contract";
// Trailing spaces are part of the exported column names.
pub const ADR_MID_BROKEN: &str = "ADR Mid Broken ";
pub const ODR_MID_BROKEN: &str = "ODR Mid Broken ";

pub const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Columns of the "dates of occurrence" view.
pub const OCCURRENCE_COLUMNS: [&str; 4] = [INSTRUMENT, DATE, DAY_OF_WEEK, CONTRACT];

/// Range-specific column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeColumns {
    pub m7box_direction: String,
    pub m7box_confirmation_direction: String,
    pub dr_confirmation_direction: String,
    pub confirmation_valid: String,
    pub m7box_confirmation_valid: String,
    pub model: String,
    pub box_size: String,
    pub m7box_time: String,
    pub dr_time: String,
    pub m7box_retracement: String,
    pub dr_retracement: String,
    pub m7box_extension: String,
    pub dr_extension: String,
}

impl RangeColumns {
    pub fn for_range(range: RangeKind) -> Self {
        let r = range.prefix();
        Self {
            m7box_direction: format!("{r}_M7Box_Direction"),
            m7box_confirmation_direction: format!("{r}_M7Box_Confirmation_Direction"),
            dr_confirmation_direction: format!("{r}_DR_Confirmation_Direction"),
            confirmation_valid: format!("{r}_Confirmation_Valid"),
            m7box_confirmation_valid: format!("{r}_M7Box_Confirmation_Valid"),
            model: format!("{r} Model"),
            box_size: format!("{r} M7Box / IDR"),
            m7box_time: format!("{r}_M7Box_Confirmation_Time_NY"),
            dr_time: format!("{r}_DR_Confirmation_Time_NY"),
            m7box_retracement: format!("{r}_M7Box_Max_Retracement_STD"),
            dr_retracement: format!("{r}_DR_Max_Retracement_STD"),
            m7box_extension: format!("{r}_M7Box_Max_Extension_STD"),
            dr_extension: format!("{r}_DR_Max_Extension_STD"),
        }
    }
}

/// Derived column holding retracement bins.
pub fn retracement_bins(column: &str) -> String {
    format!("{}_Quarters_Grouped", column)
}

/// Derived column holding extension bins.
pub fn extension_bins(column: &str) -> String {
    format!("{}_Halves_Grouped", column)
}

/// Confirmation-time columns of both range kinds, for ingestion.
pub fn confirmation_time_columns() -> Vec<String> {
    RangeKind::ALL
        .iter()
        .flat_map(|&r| {
            let cols = RangeColumns::for_range(r);
            [cols.m7box_time, cols.dr_time]
        })
        .collect()
}

/// Bin widths, metric thresholds and preferred chart windows.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub retracement_width: f64,
    pub extension_width: f64,
    /// Probed with `<=`.
    pub retracement_thresholds: Vec<f64>,
    /// Probed with `>=`.
    pub extension_thresholds: Vec<f64>,
    pub retracement_focus: (String, String),
    pub extension_focus: (String, String),
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            retracement_width: 0.25,
            extension_width: 0.5,
            retracement_thresholds: vec![-1.0, 0.0],
            extension_thresholds: vec![0.5, 1.0],
            retracement_focus: ("-1.500 to -1.251".to_string(), "0.250 to 0.499".to_string()),
            extension_focus: ("0.000 to 0.499".to_string(), "5.000 to 5.499".to_string()),
        }
    }
}

/// Bin specifications for the four distribution columns of `range`.
pub fn bin_specs(range: RangeKind, settings: &DashboardSettings) -> AnalysisResult<Vec<BinSpec>> {
    let cols = RangeColumns::for_range(range);
    let retracements = [&cols.m7box_retracement, &cols.dr_retracement]
        .into_iter()
        .map(|c| {
            BinSpec::dynamic(c.as_str(), settings.retracement_width)
                .map(|s| s.with_output(retracement_bins(c)))
        });
    let extensions = [&cols.m7box_extension, &cols.dr_extension]
        .into_iter()
        .map(|c| {
            BinSpec::dynamic(c.as_str(), settings.extension_width)
                .map(|s| s.with_output(extension_bins(c)))
        });
    retracements.chain(extensions).collect()
}

fn resolve_numeric(
    dataset: &Dataset,
    column: &str,
    bounds: &BoundsQuery<f64>,
) -> AnalysisResult<FilterPredicate> {
    let observed = numeric_bounds(dataset, column)?;
    let low = bounds.low.or(observed.map(|b| b.min));
    let high = bounds.high.or(observed.map(|b| b.max));
    Ok(match (low, high) {
        (Some(low), Some(high)) => FilterPredicate::numeric_range(column, low, high),
        // Nothing observed, so every row is missing and fails any range.
        _ => FilterPredicate::numeric_range(column, 0.0, 0.0),
    })
}

fn resolve_time(
    dataset: &Dataset,
    column: &str,
    bounds: &BoundsQuery<chrono::NaiveTime>,
) -> AnalysisResult<FilterPredicate> {
    let observed = time_bounds(dataset, column)?;
    let low = bounds.low.or(observed.as_ref().map(|b| b.min));
    let high = bounds.high.or(observed.as_ref().map(|b| b.max));
    Ok(match (low, high) {
        (Some(low), Some(high)) => FilterPredicate::time_range(column, low, high),
        _ => FilterPredicate::time_range(column, chrono::NaiveTime::MIN, chrono::NaiveTime::MIN),
    })
}

/// Translate the dashboard query into a filter chain.
///
/// Missing range bounds are filled from the observed extent of `dataset`, and
/// stay right-exclusive.
pub fn filter_chain(dataset: &Dataset, query: &DashboardQuery) -> AnalysisResult<Vec<FilterPredicate>> {
    let cols = RangeColumns::for_range(query.range);
    let mut chain = vec![
        FilterPredicate::categorical(INSTRUMENT, query.instrument.clone()),
        FilterPredicate::categorical(DAY_OF_WEEK, query.day_of_week.clone()),
        FilterPredicate::categorical(
            &cols.dr_confirmation_direction,
            query.dr_confirmation_direction.clone(),
        ),
        FilterPredicate::categorical(
            &cols.m7box_confirmation_direction,
            query.m7box_confirmation_direction.clone(),
        ),
        FilterPredicate::categorical(&cols.m7box_direction, query.m7box_direction.clone()),
        FilterPredicate::categorical(&cols.confirmation_valid, query.confirmation_valid.clone()),
        FilterPredicate::categorical(
            &cols.m7box_confirmation_valid,
            query.m7box_confirmation_valid.clone(),
        ),
        FilterPredicate::categorical(&cols.model, query.models.clone()),
        FilterPredicate::categorical(ADR_MID_BROKEN, query.adr_mid_broken.clone()),
        FilterPredicate::categorical(ODR_MID_BROKEN, query.odr_mid_broken.clone()),
    ];
    if let Some(bounds) = &query.box_size {
        chain.push(resolve_numeric(dataset, &cols.box_size, bounds)?);
    }
    if let Some(bounds) = &query.m7box_time {
        chain.push(resolve_time(dataset, &cols.m7box_time, bounds)?);
    }
    if let Some(bounds) = &query.dr_time {
        chain.push(resolve_time(dataset, &cols.dr_time, bounds)?);
    }
    Ok(chain)
}

/// Viewport hints for a distribution chart.
///
/// The focus window spans the two preferred labels (in either order); when
/// either is not on the axis the whole axis is used. The count range is the
/// 30th to 70th percentile of the bar counts, falling back to min/max, with
/// the upper end padded by 10%.
pub fn axis_hints(report: &DistributionReport, focus: &(String, String)) -> AxisHints {
    let labels = report.labels();
    let last = labels.len().saturating_sub(1);
    let (focus_start, focus_end) = match (
        labels.iter().position(|l| *l == focus.0),
        labels.iter().position(|l| *l == focus.1),
    ) {
        (Some(a), Some(b)) => (a.min(b), a.max(b)),
        _ => (0, last),
    };

    let mut counts: Vec<f64> = report.counts().into_iter().map(|c| c as f64).collect();
    counts.sort_by(f64::total_cmp);
    let (mut count_min, mut count_max) = (quantile(&counts, 0.3), quantile(&counts, 0.7));
    if count_min.is_nan() || count_max.is_nan() {
        count_min = counts.first().copied().unwrap_or(0.0);
        count_max = counts.last().copied().unwrap_or(0.0);
    }

    AxisHints {
        focus_start,
        focus_end,
        count_min,
        count_max: count_max * 1.1,
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn two_decimals(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Probability and median tiles for one confirmation subject ("M7Box" or "DR").
fn metric_tiles(
    dataset: &Dataset,
    subject: &str,
    retracement: &str,
    extension: &str,
    settings: &DashboardSettings,
) -> AnalysisResult<Vec<MetricTile>> {
    let probes = settings
        .retracement_thresholds
        .iter()
        .map(|&t| ProbabilityProbe::new(retracement, Comparison::AtMost, t))
        .chain(
            settings
                .extension_thresholds
                .iter()
                .map(|&t| ProbabilityProbe::new(extension, Comparison::AtLeast, t)),
        );

    let mut tiles = probes
        .map(|probe| {
            let value = threshold_probability(dataset, &probe)?;
            Ok(MetricTile {
                kind: TileKind::Probability,
                label: format!("% of Hitting {} After {} Conf.", probe.threshold, subject),
                column: probe.column,
                value,
                display: percent(value),
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    for (short, column) in [("Ret.", retracement), ("Ext.", extension)] {
        let value = median(dataset, column)?;
        tiles.push(MetricTile {
            kind: TileKind::Median,
            label: format!("Median {} After {} Conf.", short, subject),
            column: column.to_string(),
            value,
            display: two_decimals(value),
        });
    }
    Ok(tiles)
}

/// Run the dashboard pipeline for one query.
///
/// Bins are computed over the whole session dataset so that the bin axis
/// does not move while filters change; the filtered subset is then counted
/// against that axis.
pub fn build_dashboard(
    dataset: &Dataset,
    query: &DashboardQuery,
    settings: &DashboardSettings,
) -> AnalysisResult<DashboardReport> {
    let range = query.range;
    let cols = RangeColumns::for_range(range);

    let binned = apply_bin_specs(dataset, &bin_specs(range, settings)?)?;
    let chain = filter_chain(dataset, query)?;
    let filtered = apply_filters(&binned.dataset, &chain)?;

    let mut tiles = metric_tiles(
        &filtered,
        "M7Box",
        &cols.m7box_retracement,
        &cols.m7box_extension,
        settings,
    )?;
    tiles.extend(metric_tiles(
        &filtered,
        "DR",
        &cols.dr_retracement,
        &cols.dr_extension,
        settings,
    )?);

    let charts = [
        (
            ChartKind::M7BoxRetracement,
            retracement_bins(&cols.m7box_retracement),
            format!("{} M7Box Retracements After M7Box Confirmation", range),
            &settings.retracement_focus,
        ),
        (
            ChartKind::M7BoxExtension,
            extension_bins(&cols.m7box_extension),
            format!("{} M7Box Extensions After M7Box Confirmation", range),
            &settings.extension_focus,
        ),
        (
            ChartKind::DrRetracement,
            retracement_bins(&cols.dr_retracement),
            format!("{} M7Box Retracements After DR Confirmation", range),
            &settings.retracement_focus,
        ),
        (
            ChartKind::DrExtension,
            extension_bins(&cols.dr_extension),
            format!("{} M7Box Extensions After DR Confirmation", range),
            &settings.extension_focus,
        ),
    ]
    .into_iter()
    .map(|(kind, column, title, focus)| {
        let distribution = value_distribution(&filtered, &column, binned.bin_order(&column))?;
        let axis = axis_hints(&distribution, focus);
        Ok(DashboardChart {
            kind,
            title,
            distribution,
            axis,
        })
    })
    .collect::<AnalysisResult<Vec<_>>>()?;

    debug!(
        "Dashboard {}: {} of {} rows after {} filters",
        range,
        filtered.height(),
        dataset.height(),
        chain.len()
    );

    Ok(DashboardReport {
        range,
        total_count: filtered.height(),
        tiles,
        charts,
    })
}

/// Project already filtered rows onto `columns`.
pub fn occurrences(filtered: &Dataset, columns: &[&str]) -> AnalysisResult<OccurrenceTable> {
    let projected = filtered.select(columns)?;
    Ok(OccurrenceTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: projected.to_records(),
    })
}

/// The "dates of occurrence" table for a dashboard query.
pub fn query_occurrences(dataset: &Dataset, query: &DashboardQuery) -> AnalysisResult<OccurrenceTable> {
    let chain = filter_chain(dataset, query)?;
    let filtered = apply_filters(dataset, &chain)?;
    occurrences(&filtered, &OCCURRENCE_COLUMNS)
}
