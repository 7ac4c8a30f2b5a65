#[cfg(test)]
mod tests {
    use crate::api::{
        BoundsQuery, ChartKind, DashboardQuery, DistributionReport, DistributionRow, RangeKind,
        TileKind,
    };
    use crate::models::{dataset_from_records, Dataset, IngestOptions};
    use crate::services::dashboard::*;
    use crate::services::error::AnalysisError;
    use crate::services::filtering::Selection;
    use serde_json::json;

    fn sessions() -> Dataset {
        let records = vec![
            json!({"Instrument": "NQ", "Day of Week": "Monday", "Date": "2024-03-04", "contract": "NQH4",
                   "ODR_M7Box_Direction": "Long", "ODR Model": "Model A", "ODR M7Box / IDR": 0.2,
                   "ODR_M7Box_Confirmation_Time_NY": "2024-03-04 09:35:00",
                   "ODR_DR_Confirmation_Time_NY": "2024-03-04 09:40:00",
                   "ODR_M7Box_Max_Retracement_STD": -1.2, "ODR_DR_Max_Retracement_STD": -0.6,
                   "ODR_M7Box_Max_Extension_STD": 0.7, "ODR_DR_Max_Extension_STD": 1.1}),
            json!({"Instrument": "NQ", "Day of Week": "Tuesday", "Date": "2024-03-05", "contract": "NQH4",
                   "ODR_M7Box_Direction": "Short", "ODR Model": "Model B", "ODR M7Box / IDR": 0.5,
                   "ODR_M7Box_Confirmation_Time_NY": "2024-03-05 09:50:00",
                   "ODR_DR_Confirmation_Time_NY": "2024-03-05 10:05:00",
                   "ODR_M7Box_Max_Retracement_STD": -0.3, "ODR_DR_Max_Retracement_STD": -1.1,
                   "ODR_M7Box_Max_Extension_STD": 1.6, "ODR_DR_Max_Extension_STD": 0.2}),
            json!({"Instrument": "ES", "Day of Week": "Monday", "Date": "2024-03-04", "contract": "ESH4",
                   "ODR_M7Box_Direction": "Long", "ODR Model": "Model A", "ODR M7Box / IDR": 0.8,
                   "ODR_M7Box_Confirmation_Time_NY": "2024-03-04 10:10:00",
                   "ODR_DR_Confirmation_Time_NY": null,
                   "ODR_M7Box_Max_Retracement_STD": 0.1, "ODR_DR_Max_Retracement_STD": 0.2,
                   "ODR_M7Box_Max_Extension_STD": 0.3, "ODR_DR_Max_Extension_STD": 2.4}),
            json!({"Instrument": "NQ", "Day of Week": "Wednesday", "Date": "2024-03-06", "contract": "NQH4",
                   "ODR_M7Box_Direction": "Long", "ODR Model": "Model C", "ODR M7Box / IDR": 0.4,
                   "ODR_M7Box_Confirmation_Time_NY": "2024-03-06 09:31:00",
                   "ODR_DR_Confirmation_Time_NY": "2024-03-06 09:45:00",
                   "ODR_M7Box_Max_Retracement_STD": -1.0, "ODR_DR_Max_Retracement_STD": -0.2,
                   "ODR_M7Box_Max_Extension_STD": 0.5, "ODR_DR_Max_Extension_STD": 0.0}),
        ];
        let options = IngestOptions {
            time_columns: confirmation_time_columns(),
            date_columns: vec!["Date".to_string()],
        };
        dataset_from_records(&records, &options).unwrap()
    }

    fn run(query: &DashboardQuery) -> crate::api::DashboardReport {
        build_dashboard(&sessions(), query, &DashboardSettings::default()).unwrap()
    }

    #[test]
    fn test_range_columns() {
        let cols = RangeColumns::for_range(RangeKind::Rdr);
        assert_eq!(cols.box_size, "RDR M7Box / IDR");
        assert_eq!(cols.model, "RDR Model");
        assert_eq!(cols.dr_time, "RDR_DR_Confirmation_Time_NY");
        assert_eq!(confirmation_time_columns().len(), 4);
    }

    #[test]
    fn test_bin_specs() {
        let specs = bin_specs(RangeKind::Odr, &DashboardSettings::default()).unwrap();
        let outputs: Vec<_> = specs.iter().map(|s| s.output.as_str()).collect();
        assert_eq!(
            outputs,
            vec![
                "ODR_M7Box_Max_Retracement_STD_Quarters_Grouped",
                "ODR_DR_Max_Retracement_STD_Quarters_Grouped",
                "ODR_M7Box_Max_Extension_STD_Halves_Grouped",
                "ODR_DR_Max_Extension_STD_Halves_Grouped",
            ]
        );
    }

    #[test]
    fn test_default_query_applies_observed_ranges() {
        // Box size [0.2, 0.8), M7Box time [09:31, 10:10), DR time [09:40, 10:05):
        // the ES row sits on two maxima and has no DR time, the 10:05 row on a third.
        let report = run(&DashboardQuery::default());
        assert_eq!(report.total_count, 2);
        let chart = report.chart(ChartKind::M7BoxRetracement).unwrap();
        assert_eq!(chart.distribution.counts(), vec![1, 1, 0, 0, 0, 0]);

        let table = query_occurrences(&sessions(), &DashboardQuery::default()).unwrap();
        let dates: Vec<_> = table.rows.iter().map(|r| r["Date"].clone()).collect();
        assert_eq!(dates, vec![json!("2024-03-04"), json!("2024-03-06")]);
    }

    #[test]
    fn test_unranged_query_counts_everything() {
        let report = run(&DashboardQuery::without_ranges());
        assert_eq!(report.range, RangeKind::Odr);
        assert_eq!(report.total_count, 4);
        assert_eq!(report.charts.len(), 4);

        let chart = report.chart(ChartKind::M7BoxRetracement).unwrap();
        assert_eq!(
            chart.title,
            "ODR M7Box Retracements After M7Box Confirmation"
        );
        assert_eq!(
            chart.distribution.labels(),
            vec![
                "-1.250 to -1.001",
                "-1.000 to -0.751",
                "-0.750 to -0.501",
                "-0.500 to -0.251",
                "-0.250 to -0.001",
                "0.000 to 0.249",
            ]
        );
        assert_eq!(chart.distribution.counts(), vec![1, 1, 0, 1, 0, 1]);
        // Preferred window is not on this axis.
        assert_eq!((chart.axis.focus_start, chart.axis.focus_end), (0, 5));
    }

    #[test]
    fn test_metric_tiles() {
        let report = run(&DashboardQuery::without_ranges());
        assert_eq!(report.tiles.len(), 12);

        let tile = report.tile("% of Hitting -1 After M7Box Conf.").unwrap();
        assert_eq!(tile.kind, TileKind::Probability);
        assert_eq!(tile.value, 0.5);
        assert_eq!(tile.display, "50.00%");

        assert_eq!(report.tile("% of Hitting 0 After M7Box Conf.").unwrap().value, 0.75);
        assert_eq!(report.tile("% of Hitting 0.5 After M7Box Conf.").unwrap().value, 0.75);
        assert_eq!(report.tile("% of Hitting 1 After M7Box Conf.").unwrap().value, 0.25);
        assert_eq!(report.tile("% of Hitting -1 After DR Conf.").unwrap().value, 0.25);

        let median = report.tile("Median Ret. After M7Box Conf.").unwrap();
        assert_eq!(median.kind, TileKind::Median);
        assert_eq!(median.display, "-0.65");
    }

    #[test]
    fn test_filters_keep_full_bin_axis() {
        let query = DashboardQuery {
            instrument: Selection::from_choice("NQ"),
            models: Selection::from_choices(&["Model A", "Model B"]),
            ..DashboardQuery::without_ranges()
        };
        let report = run(&query);
        assert_eq!(report.total_count, 2);

        let chart = report.chart(ChartKind::M7BoxRetracement).unwrap();
        assert_eq!(chart.distribution.counts(), vec![1, 0, 0, 1, 0, 0]);
        assert_eq!(chart.distribution.row("-1.250 to -1.001").unwrap().text, "1 (50.00%)");
    }

    #[test]
    fn test_time_range_defaults_are_right_exclusive() {
        let query = DashboardQuery {
            dr_time: Some(BoundsQuery::default()),
            ..DashboardQuery::without_ranges()
        };
        // 09:40 and 09:45 survive; the 10:05 maximum and the missing time do not.
        assert_eq!(run(&query).total_count, 2);
    }

    #[test]
    fn test_box_size_low_bound_only() {
        let query = DashboardQuery {
            box_size: Some(BoundsQuery {
                low: Some(0.4),
                high: None,
            }),
            ..DashboardQuery::without_ranges()
        };
        assert_eq!(run(&query).total_count, 2);
    }

    #[test]
    fn test_empty_subset() {
        let query = DashboardQuery {
            instrument: Selection::from_choice("CL"),
            ..Default::default()
        };
        let report = run(&query);
        assert_eq!(report.total_count, 0);
        assert!(report
            .tiles
            .iter()
            .filter(|t| t.kind == TileKind::Probability)
            .all(|t| t.value == 0.0));
        let median = report.tile("Median Ext. After DR Conf.").unwrap();
        assert!(median.value.is_nan());
        assert_eq!(median.display, "n/a");
        for chart in &report.charts {
            assert!(!chart.distribution.rows.is_empty());
            assert!(chart.distribution.counts().iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn test_other_range_without_columns_is_rejected() {
        let query = DashboardQuery {
            range: RangeKind::Rdr,
            ..Default::default()
        };
        let err = build_dashboard(&sessions(), &query, &DashboardSettings::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownColumn { .. }));
    }

    #[test]
    fn test_query_occurrences() {
        let query = DashboardQuery {
            instrument: Selection::from_choice("ES"),
            ..DashboardQuery::without_ranges()
        };
        let table = query_occurrences(&sessions(), &query).unwrap();
        assert_eq!(table.columns, vec!["Instrument", "Date", "Day of Week", "contract"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Date"], "2024-03-04");
        assert_eq!(table.rows[0]["contract"], "ESH4");
    }

    fn report_with_counts(counts: &[usize]) -> DistributionReport {
        DistributionReport {
            column: "bins".into(),
            rows: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| DistributionRow {
                    label: format!("bin {}", i),
                    count,
                    percentage: 0.0,
                    text: String::new(),
                })
                .collect(),
            total: counts.iter().sum(),
            missing: 0,
            probabilities: vec![],
            medians: vec![],
        }
    }

    #[test]
    fn test_axis_hints_quantiles_and_focus() {
        let report = report_with_counts(&[10, 0, 4, 8, 2, 6]);
        let hints = axis_hints(&report, &("bin 4".to_string(), "bin 1".to_string()));
        assert_eq!((hints.focus_start, hints.focus_end), (1, 4));
        assert!((hints.count_min - 3.0).abs() < 1e-9);
        assert!((hints.count_max - 7.7).abs() < 1e-9);
    }

    #[test]
    fn test_axis_hints_empty_report() {
        let report = report_with_counts(&[]);
        let hints = axis_hints(&report, &("a".to_string(), "b".to_string()));
        assert_eq!((hints.focus_start, hints.focus_end), (0, 0));
        assert_eq!(hints.count_min, 0.0);
        assert_eq!(hints.count_max, 0.0);
    }
}
