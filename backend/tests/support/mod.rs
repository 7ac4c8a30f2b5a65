#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

use m7box_stats::models::{dataset_from_records, Dataset, IngestOptions};
use m7box_stats::services::dashboard::confirmation_time_columns;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn ingest_options() -> IngestOptions {
    IngestOptions {
        time_columns: confirmation_time_columns(),
        date_columns: vec!["Date".to_string()],
    }
}

/// One ODR trade session.
#[allow(clippy::too_many_arguments)]
pub fn odr_session(
    instrument: &str,
    day: &str,
    date: &str,
    model: &str,
    box_size: f64,
    m7box_time: Option<&str>,
    m7box_retracement: f64,
    m7box_extension: f64,
) -> Value {
    json!({
        "Instrument": instrument,
        "Day of Week": day,
        "Date": date,
        "contract": format!("{}H4", instrument),
        "ODR_M7Box_Direction": "Long",
        "ODR_M7Box_Confirmation_Direction": "Long",
        "ODR_DR_Confirmation_Direction": "Short",
        "ODR_Confirmation_Valid": "True",
        "ODR_M7Box_Confirmation_Valid": "True",
        "ODR Model": model,
        "ODR M7Box / IDR": box_size,
        "ADR Mid Broken ": "No",
        "ODR Mid Broken ": "Yes",
        "ODR_M7Box_Confirmation_Time_NY": m7box_time.map(|t| format!("{} {}", date, t)),
        "ODR_DR_Confirmation_Time_NY": m7box_time.map(|t| format!("{} {}", date, t)),
        "ODR_M7Box_Max_Retracement_STD": m7box_retracement,
        "ODR_DR_Max_Retracement_STD": m7box_retracement / 2.0,
        "ODR_M7Box_Max_Extension_STD": m7box_extension,
        "ODR_DR_Max_Extension_STD": m7box_extension + 0.5,
    })
}

/// Ten sessions across three instruments; four retrace to -1 or beyond.
pub fn sample_records() -> Vec<Value> {
    vec![
        odr_session("NQ", "Monday", "2024-03-04", "Model A", 0.2, Some("09:30:00"), -1.6, 0.4),
        odr_session("NQ", "Tuesday", "2024-03-05", "Model B", 0.4, Some("09:45:00"), -1.2, 1.3),
        odr_session("ES", "Wednesday", "2024-03-06", "Model A", 0.6, Some("10:00:00"), -0.9, 2.2),
        odr_session("ES", "Thursday", "2024-03-07", "Model C", 0.8, None, 0.3, 0.1),
        odr_session("EURUSD", "Friday", "2024-03-08", "Model A", 0.3, Some("09:59:59"), 0.5, 3.0),
        odr_session("EURUSD", "Monday", "2024-03-11", "Model B", 0.5, Some("11:15:00"), -1.0, 0.9),
        odr_session("NQ", "Tuesday", "2024-03-12", "Model C", 0.7, Some("09:31:00"), -0.4, 1.8),
        odr_session("ES", "Wednesday", "2024-03-13", "Model A", 0.9, Some("10:30:00"), -2.1, 0.6),
        odr_session("NQ", "Thursday", "2024-03-14", "Model B", 0.1, Some("09:40:00"), -0.2, 4.4),
        odr_session("EURUSD", "Friday", "2024-03-15", "Model C", 0.45, Some("09:50:00"), 0.1, 1.1),
    ]
}

pub fn sample_dataset() -> Dataset {
    dataset_from_records(&sample_records(), &ingest_options()).expect("sample records ingest")
}
