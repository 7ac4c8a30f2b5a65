use super::dataset::*;
use crate::services::error::AnalysisError;
use chrono::{NaiveDate, NaiveTime};

fn sample() -> Dataset {
    Dataset::new(vec![
        Column::categories("Instrument", [Some("NQ"), Some("ES"), None]),
        Column::numbers("ret", [Some(-1.25), Some(f64::NAN), Some(0.5)]),
        Column::times(
            "time",
            [NaiveTime::from_hms_opt(9, 30, 0), None, NaiveTime::from_hms_opt(10, 0, 0)],
        ),
        Column::dates("Date", [NaiveDate::from_ymd_opt(2024, 3, 5), None, None]),
    ])
    .unwrap()
}

#[test]
fn test_nan_is_missing() {
    let ds = sample();
    let ret = ds.column("ret").unwrap().as_numbers().unwrap();
    assert_eq!(ret[1], None);
    assert_eq!(ds.column("ret").unwrap().data().present_count(), 2);
}

#[test]
fn test_shape_mismatch() {
    let err = Dataset::new(vec![
        Column::numbers("a", [Some(1.0)]),
        Column::numbers("b", [Some(1.0), Some(2.0)]),
    ])
    .unwrap_err();
    assert!(matches!(err, AnalysisError::ShapeMismatch { .. }));
}

#[test]
fn test_duplicate_column() {
    let ds = sample();
    let err = ds
        .with_column(Column::numbers("ret", [None, None, None]))
        .unwrap_err();
    assert_eq!(err, AnalysisError::DuplicateColumn("ret".to_string()));
}

#[test]
fn test_with_column_appends() {
    let ds = sample();
    let extended = ds
        .with_column(Column::categories("ret_Grouped", [Some("a"), None, Some("b")]))
        .unwrap();
    assert_eq!(extended.width(), ds.width() + 1);
    assert_eq!(extended.column_names().last(), Some(&"ret_Grouped"));
    // Original snapshot is untouched.
    assert!(!ds.has_column("ret_Grouped"));
}

#[test]
fn test_take_preserves_order_and_columns() {
    let ds = sample();
    let subset = ds.take(&[2, 0]);
    assert_eq!(subset.height(), 2);
    assert_eq!(subset.width(), ds.width());
    let instruments: Vec<_> = (0..2)
        .map(|i| subset.column("Instrument").unwrap().text_at(i))
        .collect();
    assert_eq!(instruments, vec![None, Some("NQ".to_string())]);
}

#[test]
fn test_select_unknown_column() {
    let err = sample().select(&["Instrument", "contract"]).unwrap_err();
    assert_eq!(err.column(), Some("contract"));
}

#[test]
fn test_text_keys() {
    let ds = sample();
    assert_eq!(ds.column("ret").unwrap().text_at(0).as_deref(), Some("-1.25"));
    assert_eq!(ds.column("time").unwrap().text_at(0).as_deref(), Some("09:30:00"));
    assert_eq!(ds.column("Date").unwrap().text_at(0).as_deref(), Some("2024-03-05"));
}

#[test]
fn test_to_records() {
    let records = sample().select(&["Instrument", "ret"]).unwrap().to_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["Instrument"], "NQ");
    assert_eq!(records[0]["ret"], -1.25);
    assert!(records[1]["ret"].is_null());
    assert!(records[2]["Instrument"].is_null());
}

#[test]
fn test_type_accessors() {
    let ds = sample();
    let err = ds.column("Instrument").unwrap().as_numbers().unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::TypeMismatch { expected: "number", actual: "category", .. }
    ));
    assert!(ds.column("time").unwrap().as_times().is_ok());
}
