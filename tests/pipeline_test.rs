use color_eyre::Result;
use datadash::config::DisplayConfig;
use datadash::pipeline::{render, NO_FILTER_NOTICE};
use datadash::statistics::Summary;
use datadash::{ColumnKind, Dataset, FilteredView, ViewParams};
use polars::prelude::*;

fn cities() -> Dataset {
    Dataset::new(
        df!(
            "id" => &[1i64, 2, 3],
            "city" => &["NY", "LA", "NY"],
            "score" => &[10.0f64, 20.0, 30.0],
        )
        .unwrap(),
    )
}

fn params_for(dataset: &Dataset) -> ViewParams {
    ViewParams::defaults_for(dataset, &DisplayConfig::default())
}

fn ids(df: &DataFrame) -> Vec<i64> {
    df.column("id")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn test_preview_rows_follow_slider() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    params.preview_rows.set(2);

    let out = render(&ds, &params)?;
    assert_eq!(ids(&out.preview), vec![1, 2]);
    assert_eq!(out.insights.rows, 3);
    assert_eq!(out.insights.columns, 3);
    Ok(())
}

#[test]
fn test_column_classification_is_disjoint() -> Result<()> {
    let ds = cities();
    let out = render(&ds, &params_for(&ds))?;

    let kinds: Vec<(&str, ColumnKind)> = out
        .insights
        .column_names
        .iter()
        .map(|(name, kind)| (name.as_str(), *kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("id", ColumnKind::Numeric),
            ("city", ColumnKind::Categorical),
            ("score", ColumnKind::Numeric),
        ]
    );

    let numeric = ds.numeric_columns();
    let categorical = ds.categorical_columns();
    assert!(numeric.iter().all(|c| !categorical.contains(c)));
    Ok(())
}

#[test]
fn test_filter_on_category() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    params.set_filter_column(Some("city".to_string()));
    assert_eq!(render(&ds, &params)?.filter_options, vec!["NY", "LA"]);

    params.toggle_filter_value("NY");
    let out = render(&ds, &params)?;
    match &out.filtered {
        FilteredView::Applied { column, values, df } => {
            assert_eq!(column, "city");
            assert_eq!(values, &vec!["NY".to_string()]);
            assert_eq!(ids(df), vec![1, 3]);
        }
        FilteredView::NoFilter { .. } => panic!("expected a filter to be applied"),
    }
    assert!(out.filtered.notice().is_none());
    Ok(())
}

#[test]
fn test_empty_filter_selection_shows_everything() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    params.set_filter_column(Some("city".to_string()));

    let out = render(&ds, &params)?;
    assert!(matches!(out.filtered, FilteredView::NoFilter { .. }));
    assert_eq!(out.filtered.notice(), Some(NO_FILTER_NOTICE));
    assert_eq!(out.filtered.df().height(), 3);
    Ok(())
}

#[test]
fn test_changing_filter_column_drops_values() {
    let ds = cities();
    let mut params = params_for(&ds);
    params.set_filter_column(Some("city".to_string()));
    params.toggle_filter_value("LA");
    params.set_filter_column(Some("id".to_string()));
    assert!(params.filter_values.is_empty());
}

#[test]
fn test_search_ignores_case() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    params.search_term = "la".to_string();

    let out = render(&ds, &params)?;
    let found = out.search.expect("search ran");
    assert_eq!(ids(&found), vec![2]);
    Ok(())
}

#[test]
fn test_search_never_matches_missing_cells() -> Result<()> {
    let ds = Dataset::new(df!(
        "id" => &[1i64, 2, 3],
        "note" => &[Some("x"), None, Some("y")],
        "value" => &[Some(1.5f64), None, Some(f64::NAN)],
    )?);
    let mut params = params_for(&ds);

    for term in ["null", "NULL", "nan", "None", "NA"] {
        params.search_term = term.to_string();
        let found = render(&ds, &params)?.search.expect("search ran");
        assert_eq!(found.height(), 0, "term {:?} matched a missing cell", term);
        assert_eq!(found.width(), 3);
    }

    // Row 2 is all missing apart from its id
    params.search_term = "2".to_string();
    let found = render(&ds, &params)?.search.expect("search ran");
    assert_eq!(ids(&found), vec![2]);

    params.search_term = "y".to_string();
    let found = render(&ds, &params)?.search.expect("search ran");
    assert_eq!(ids(&found), vec![3]);
    Ok(())
}

#[test]
fn test_empty_search_term_means_no_search() -> Result<()> {
    let ds = cities();
    let out = render(&ds, &params_for(&ds))?;
    assert!(out.search.is_none());
    Ok(())
}

#[test]
fn test_heatmap_needs_two_numeric_columns() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);

    let out = render(&ds, &params)?;
    let heatmap = out.heatmap.expect("two numeric columns selected");
    assert_eq!(heatmap.columns, vec!["id", "score"]);
    assert!((heatmap.correlations[0][1] - 1.0).abs() < 1e-12);

    params.numeric_selection = vec!["score".to_string()];
    let out = render(&ds, &params)?;
    assert!(out.heatmap.is_none());
    assert_eq!(out.histograms.len(), 1);
    assert_eq!(out.histograms[0].column, "score");
    Ok(())
}

#[test]
fn test_empty_categorical_selection_has_no_bar_charts() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    assert_eq!(render(&ds, &params)?.bar_charts.len(), 1);

    params.categorical_selection.clear();
    assert!(render(&ds, &params)?.bar_charts.is_empty());
    Ok(())
}

#[test]
fn test_charts_use_first_rows_only() -> Result<()> {
    let ds = Dataset::new(df!(
        "v" => (0..40).map(|i| i as f64).collect::<Vec<_>>(),
        "tag" => (0..40).map(|i| if i < 10 { "early" } else { "late" }).collect::<Vec<_>>(),
    )?);
    let mut params = params_for(&ds);
    params.viz_rows.set(10);

    let out = render(&ds, &params)?;
    assert_eq!(out.viz_rows, 10);
    assert_eq!(out.subset_label(), "(first 10 rows)");
    assert_eq!(out.histograms[0].total, 10);
    assert_eq!(out.bar_charts[0].counts, vec![("early".to_string(), 10)]);
    Ok(())
}

#[test]
fn test_render_is_idempotent() -> Result<()> {
    let ds = cities();
    let mut params = params_for(&ds);
    params.search_term = "ny".to_string();
    let before = params.clone();

    let first = render(&ds, &params)?;
    let second = render(&ds, &params)?;
    assert_eq!(params, before);
    assert!(first.preview.equals_missing(&second.preview));
    assert!(first
        .search
        .as_ref()
        .zip(second.search.as_ref())
        .is_some_and(|(a, b)| a.equals_missing(b)));
    assert_eq!(first.nulls, second.nulls);
    assert_eq!(first.insights, second.insights);
    Ok(())
}

#[test]
fn test_empty_dataset() -> Result<()> {
    let ds = Dataset::new(df!(
        "x" => Vec::<f64>::new(),
        "label" => Vec::<String>::new(),
    )?);
    let mut params = params_for(&ds);
    assert!(!params.preview_rows.enabled);
    params.search_term = "a".to_string();

    let out = render(&ds, &params)?;
    assert_eq!(out.preview.height(), 0);
    assert_eq!(out.insights.rows, 0);
    assert_eq!(out.viz_rows, 0);
    assert_eq!(out.histograms[0].total, 0);
    assert!(out.bar_charts[0].counts.is_empty());
    assert_eq!(out.search.map(|df| df.height()), Some(0));
    Ok(())
}

#[test]
fn test_single_row_dataset() -> Result<()> {
    let ds = Dataset::new(df!("a" => &[1.0f64], "b" => &[2.0f64], "c" => &["x"])?);
    let params = params_for(&ds);
    assert_eq!(params.preview_rows.value, 1);

    let out = render(&ds, &params)?;
    assert_eq!(out.preview.height(), 1);
    let heatmap = out.heatmap.expect("two numeric columns");
    assert!(heatmap.correlations[0][1].is_nan());
    assert!(out.histograms[0].density.is_empty());
    let Summary::Numeric(stats) = out.summary else {
        panic!("expected numeric summary");
    };
    assert!(stats[0].std.is_nan());
    Ok(())
}
