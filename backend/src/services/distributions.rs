//! Frequency distributions, threshold probabilities and medians over a
//! filtered dataset.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::api::{
    ColumnMedian, DistributionReport, DistributionRow, DistributionStats, ProbabilityProbe,
    ThresholdProbability,
};
use crate::models::Dataset;
use crate::services::error::AnalysisResult;

/// Summary statistics of `values`.
///
/// Population standard deviation. With no values `count` and `sum` are zero
/// and every other field is NaN.
pub fn summarize(values: &[f64]) -> DistributionStats {
    let count = values.len();
    let sum: f64 = values.iter().sum();
    if count == 0 {
        return DistributionStats {
            count,
            mean: f64::NAN,
            median: f64::NAN,
            std_dev: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            sum,
        };
    }

    let mean = sum / count as f64;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    DistributionStats {
        count,
        mean,
        median: sorted_median(&sorted),
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
        sum,
    }
}

fn sorted_median(sorted: &[f64]) -> f64 {
    let count = sorted.len();
    if count == 0 {
        return f64::NAN;
    }
    if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    }
}

/// Linearly interpolated quantile of already sorted values; NaN when empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

/// Non-missing values of a numeric column.
pub fn present_values(dataset: &Dataset, column: &str, operation: &str) -> AnalysisResult<Vec<f64>> {
    let values = dataset.require_column(column, operation)?.as_numbers()?;
    Ok(values.iter().flatten().copied().collect())
}

/// Counts per category of `column`, ordered by `bin_order`.
///
/// Bins absent from the data are reported with count 0. Categories not in
/// `bin_order` follow the canonical bins in first-seen order. Percentages are
/// taken over rows that have a category.
pub fn value_distribution(
    dataset: &Dataset,
    column: &str,
    bin_order: &[String],
) -> AnalysisResult<DistributionReport> {
    let col = dataset.require_column(column, "value_distribution")?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut extras: Vec<String> = Vec::new();
    let mut missing = 0usize;
    for row in 0..dataset.height() {
        match col.text_at(row) {
            Some(label) => {
                let count = counts.entry(label).or_insert(0);
                *count += 1;
            }
            None => missing += 1,
        }
    }
    let total = dataset.height() - missing;

    let canonical: HashSet<&str> = bin_order.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::new();
    for row in 0..dataset.height() {
        if let Some(label) = col.text_at(row) {
            if !canonical.contains(label.as_str()) && seen.insert(label.clone()) {
                extras.push(label);
            }
        }
    }

    let rows = bin_order
        .iter()
        .chain(extras.iter())
        .map(|label| {
            let count = counts.get(label).copied().unwrap_or(0);
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            DistributionRow {
                label: label.clone(),
                count,
                percentage,
                text: format!("{} ({:.2}%)", count, percentage),
            }
        })
        .collect();

    Ok(DistributionReport {
        column: column.to_string(),
        rows,
        total,
        missing,
        probabilities: Vec::new(),
        medians: Vec::new(),
    })
}

/// Share of all rows whose value satisfies the probe; 0 when the subset is empty.
///
/// The denominator is the subset size, so rows missing the value count
/// against the probability.
pub fn threshold_probability(dataset: &Dataset, probe: &ProbabilityProbe) -> AnalysisResult<f64> {
    let values = dataset
        .require_column(&probe.column, "threshold_probability")?
        .as_numbers()?;
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let hits = values
        .iter()
        .flatten()
        .filter(|&&v| probe.comparison.holds(v, probe.threshold))
        .count();
    Ok(hits as f64 / dataset.height() as f64)
}

/// Median of the non-missing values of `column`; NaN when there are none.
pub fn median(dataset: &Dataset, column: &str) -> AnalysisResult<f64> {
    let mut values = present_values(dataset, column, "median")?;
    values.sort_by(f64::total_cmp);
    Ok(sorted_median(&values))
}

/// Distribution of `category_column` with the requested probabilities and medians.
pub fn report(
    dataset: &Dataset,
    category_column: &str,
    bin_order: &[String],
    probes: &[ProbabilityProbe],
    median_columns: &[String],
) -> AnalysisResult<DistributionReport> {
    let mut report = value_distribution(dataset, category_column, bin_order)?;

    report.probabilities = probes
        .iter()
        .map(|probe| {
            Ok(ThresholdProbability {
                column: probe.column.clone(),
                comparison: probe.comparison,
                threshold: probe.threshold,
                probability: threshold_probability(dataset, probe)?,
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    report.medians = median_columns
        .iter()
        .map(|column| {
            let mut values = present_values(dataset, column, "report")?;
            values.sort_by(f64::total_cmp);
            Ok(ColumnMedian {
                column: column.clone(),
                median: sorted_median(&values),
                summary: summarize(&values),
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    debug!(
        "Distribution of '{}': {} categories over {} rows ({} missing)",
        category_column,
        report.rows.len(),
        report.total,
        report.missing
    );
    Ok(report)
}
