use color_eyre::Result;
use datadash::statistics::{
    correlation_matrix, count_values, describe, distinct_values, histogram, null_counts,
    numeric_values, Summary,
};
use datadash::Dataset;
use polars::prelude::*;

#[test]
fn test_describe_numeric_columns() -> Result<()> {
    let df = df!(
        "id" => &[1i64, 2, 3, 4],
        "city" => &["NY", "LA", "NY", "SF"],
        "score" => &[Some(10.0f64), Some(20.0), None, Some(40.0)],
    )?;
    let ds = Dataset::new(df);

    let Summary::Numeric(stats) = describe(ds.df(), ds.columns())? else {
        panic!("expected numeric summary");
    };
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].column, "id");
    assert_eq!(stats[0].count, 4);
    assert_eq!(stats[0].mean, 2.5);
    assert_eq!(stats[0].median, 2.5);

    // Nulls are excluded from every statistic
    assert_eq!(stats[1].column, "score");
    assert_eq!(stats[1].count, 3);
    assert!((stats[1].mean - 70.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats[1].min, 10.0);
    assert_eq!(stats[1].max, 40.0);
    Ok(())
}

#[test]
fn test_describe_text_only_dataset() -> Result<()> {
    let df = df!("city" => &["NY", "LA", "NY"], "state" => &["NY", "CA", "NY"])?;
    let ds = Dataset::new(df);

    let Summary::Categorical(stats) = describe(ds.df(), ds.columns())? else {
        panic!("expected categorical summary");
    };
    assert_eq!(stats[0].count, 3);
    assert_eq!(stats[0].unique, 2);
    assert_eq!(stats[0].top.as_deref(), Some("NY"));
    assert_eq!(stats[0].freq, 2);
    Ok(())
}

#[test]
fn test_describe_without_rows() -> Result<()> {
    let df = df!("x" => Vec::<f64>::new())?;
    let ds = Dataset::new(df);

    let Summary::Numeric(stats) = describe(ds.df(), ds.columns())? else {
        panic!("expected numeric summary");
    };
    assert_eq!(stats[0].count, 0);
    assert!(stats[0].mean.is_nan());
    assert!(stats[0].max.is_nan());
    Ok(())
}

#[test]
fn test_null_counts_cover_every_column() -> Result<()> {
    let df = df!(
        "a" => &[Some(1i64), None, None],
        "b" => &[Some("x"), Some("y"), None],
        "c" => &[true, false, true],
    )?;
    assert_eq!(
        null_counts(&df),
        vec![
            ("a".to_string(), 2),
            ("b".to_string(), 1),
            ("c".to_string(), 0)
        ]
    );
    Ok(())
}

#[test]
fn test_histogram_scaled_density_tracks_counts() {
    let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 100) as f64).collect();
    let h = histogram("v", &values, 20);
    let bin_width = h.bins[0].end - h.bins[0].start;

    // A count-scaled density integrates to about the number of values
    let (lo, hi) = h.range();
    let step = (hi - lo) / (h.density.len() - 1) as f64;
    let area: f64 = h.density.iter().map(|(_, y)| y * step).sum::<f64>() / bin_width;
    assert!(area > 150.0 && area < 210.0, "area = {}", area);
}

#[test]
fn test_value_counts_from_frame() -> Result<()> {
    let df = df!("city" => &[Some("NY"), Some("LA"), None, Some("NY")])?;
    let series = df.column("city")?.as_materialized_series();
    let counts = count_values(series)?;
    assert_eq!(counts.column, "city");
    assert_eq!(
        counts.counts,
        vec![("NY".to_string(), 2), ("LA".to_string(), 1)]
    );
    Ok(())
}

#[test]
fn test_correlation_matrix() -> Result<()> {
    let df = df!(
        "x" => &[1.0f64, 2.0, 3.0, 4.0],
        "y" => &[2.0f64, 4.0, 6.0, 8.0],
        "z" => &[4.0f64, 3.0, 2.0, 1.0],
        "k" => &[5.0f64, 5.0, 5.0, 5.0],
    )?;
    let columns: Vec<String> = ["x", "y", "z", "k"].iter().map(|s| s.to_string()).collect();
    let matrix = correlation_matrix(&df, &columns)?;

    assert_eq!(matrix.columns, columns);
    assert!((matrix.correlations[0][1] - 1.0).abs() < 1e-12);
    assert!((matrix.correlations[0][2] + 1.0).abs() < 1e-12);
    assert_eq!(matrix.correlations[1][0], matrix.correlations[0][1]);

    // Constant column: undefined, and reported as such
    assert!(matrix.correlations[3][0].is_nan());
    assert!(matrix.correlations[3][3].is_nan());
    assert_eq!(matrix.correlations[0][0], 1.0);
    Ok(())
}

#[test]
fn test_distinct_values_keep_first_appearance() -> Result<()> {
    let df = df!("n" => &[Some(3i64), Some(1), None, Some(3), Some(2)])?;
    let series = df.column("n")?.as_materialized_series();
    assert_eq!(distinct_values(series)?, vec!["3", "1", "2"]);
    Ok(())
}

#[test]
fn test_numeric_values_cast_integers() -> Result<()> {
    let df = df!("n" => &[Some(1i32), None, Some(3)])?;
    let series = df.column("n")?.as_materialized_series();
    assert_eq!(numeric_values(series)?, vec![Some(1.0), None, Some(3.0)]);
    Ok(())
}
