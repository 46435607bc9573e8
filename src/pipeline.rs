//! Derived views of a dataset.
//!
//! [`render`] recomputes every output from scratch for one `(Dataset,
//! ViewParams)` pair. It reads both and mutates neither, so calling it twice
//! with the same inputs gives the same [`Outputs`].

use color_eyre::Result;
use polars::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

use crate::dataset::{ColumnKind, Dataset};
use crate::params::ViewParams;
use crate::statistics::{self, CorrelationMatrix, Histogram, Summary, ValueCounts};

/// Shown in place of the filtered table when no values are selected
pub const NO_FILTER_NOTICE: &str = "No filter applied. Showing full dataset.";

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<(String, ColumnKind)>,
}

#[derive(Debug, Clone)]
pub enum FilteredView {
    /// Rows whose `column` value is one of `values`
    Applied {
        column: String,
        values: Vec<String>,
        df: DataFrame,
    },
    /// Empty selection: the whole dataset
    NoFilter { df: DataFrame },
}

impl FilteredView {
    pub fn df(&self) -> &DataFrame {
        match self {
            FilteredView::Applied { df, .. } | FilteredView::NoFilter { df } => df,
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            FilteredView::Applied { .. } => None,
            FilteredView::NoFilter { .. } => Some(NO_FILTER_NOTICE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Outputs {
    pub preview: DataFrame,
    pub insights: Insights,
    pub summary: Summary,
    pub nulls: Vec<(String, usize)>,
    /// Rows actually used for charts (may be below the requested count)
    pub viz_rows: usize,
    pub histograms: Vec<Histogram>,
    pub bar_charts: Vec<ValueCounts>,
    /// Present when at least two numeric columns are selected
    pub heatmap: Option<CorrelationMatrix>,
    /// Distinct values of the filter column, as offered to the user
    pub filter_options: Vec<String>,
    pub filtered: FilteredView,
    /// `None` for an empty search term, which is not the same as no matches
    pub search: Option<DataFrame>,
}

impl Outputs {
    /// Chart title suffix naming the visualization subset
    pub fn subset_label(&self) -> String {
        format!("(first {} rows)", self.viz_rows)
    }
}

pub fn render(dataset: &Dataset, params: &ViewParams) -> Result<Outputs> {
    let started = Instant::now();
    let df = dataset.df();

    let preview = df.head(Some(params.preview_rows.value));

    let insights = Insights {
        rows: dataset.height(),
        columns: dataset.width(),
        column_names: dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.kind))
            .collect(),
    };
    let summary = statistics::describe(df, dataset.columns())?;
    let nulls = statistics::null_counts(df);

    let subset = df.head(Some(params.viz_rows.value));

    let numeric = selected_of_kind(dataset, &params.numeric_selection, ColumnKind::Numeric);
    let mut histograms = Vec::with_capacity(numeric.len());
    for name in &numeric {
        let values: Vec<f64> =
            statistics::numeric_values(subset.column(name)?.as_materialized_series())?
                .into_iter()
                .flatten()
                .collect();
        histograms.push(statistics::histogram(name, &values, params.histogram_bins));
    }

    let categorical = selected_of_kind(
        dataset,
        &params.categorical_selection,
        ColumnKind::Categorical,
    );
    let mut bar_charts = Vec::with_capacity(categorical.len());
    for name in &categorical {
        bar_charts.push(statistics::count_values(
            subset.column(name)?.as_materialized_series(),
        )?);
    }

    let heatmap = if numeric.len() >= 2 {
        Some(statistics::correlation_matrix(&subset, &numeric)?)
    } else {
        None
    };

    let filter_column = params
        .filter_column
        .as_deref()
        .filter(|name| dataset.column(name).is_some());
    let filter_options = match filter_column {
        Some(name) => statistics::distinct_values(df.column(name)?.as_materialized_series())?,
        None => Vec::new(),
    };
    let filtered = match filter_column {
        Some(name) if !params.filter_values.is_empty() => FilteredView::Applied {
            column: name.to_string(),
            values: params.filter_values.clone(),
            df: filter_rows(df, name, &params.filter_values)?,
        },
        _ => FilteredView::NoFilter { df: df.clone() },
    };

    let search = search_rows(df, &params.search_term)?;

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        histograms = histograms.len(),
        bar_charts = bar_charts.len(),
        "recomputed outputs"
    );

    Ok(Outputs {
        preview,
        insights,
        summary,
        nulls,
        viz_rows: subset.height(),
        histograms,
        bar_charts,
        heatmap,
        filter_options,
        filtered,
        search,
    })
}

/// Selected columns that exist and have the wanted kind, in selection order
fn selected_of_kind(dataset: &Dataset, selection: &[String], kind: ColumnKind) -> Vec<String> {
    selection
        .iter()
        .filter(|name| dataset.column(name).is_some_and(|c| c.kind == kind))
        .cloned()
        .collect()
}

/// Rows whose `column` value, rendered as text, is one of `values`
pub fn filter_rows(df: &DataFrame, column: &str, values: &[String]) -> Result<DataFrame> {
    let wanted: HashSet<&str> = values.iter().map(String::as_str).collect();
    let mask: Vec<bool> = statistics::text_values(df.column(column)?.as_materialized_series())?
        .iter()
        .map(|v| v.as_deref().is_some_and(|v| wanted.contains(v)))
        .collect();
    apply_mask(df, &mask)
}

/// Rows where any non-null cell contains `term`, ignoring case. The term is
/// matched literally. An empty term means no search at all.
pub fn search_rows(df: &DataFrame, term: &str) -> Result<Option<DataFrame>> {
    if term.is_empty() {
        return Ok(None);
    }
    let needle = term.to_lowercase();

    let mut any_match: Option<Expr> = None;
    for column in df.get_columns() {
        let mut cell = col(column.name().as_str());
        if column.dtype().is_float() {
            // NaN is missing, not the text "NaN"
            cell = cell.fill_nan(lit(NULL));
        }
        let hit = cell
            .cast(DataType::String)
            .str()
            .to_lowercase()
            .str()
            .contains_literal(lit(needle.clone()))
            .fill_null(lit(false));
        any_match = Some(match any_match {
            Some(expr) => expr.or(hit),
            None => hit,
        });
    }

    match any_match {
        Some(expr) => Ok(Some(df.clone().lazy().filter(expr).collect()?)),
        None => Ok(Some(df.clone())),
    }
}

fn apply_mask(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "name" => &["Alpha", "beta", "GAMMA"],
            "n" => &[Some(1i64), None, Some(3)],
        )
        .unwrap()
    }

    #[test]
    fn test_search_empty_term_is_none() {
        assert!(search_rows(&sample(), "").unwrap().is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let found = search_rows(&sample(), "gam").unwrap().unwrap();
        assert_eq!(found.height(), 1);
    }

    #[test]
    fn test_search_no_match_is_empty_frame() {
        let found = search_rows(&sample(), "zzz").unwrap().unwrap();
        assert_eq!(found.height(), 0);
        assert_eq!(found.width(), 2);
    }

    #[test]
    fn test_search_is_literal() {
        let df = df!("s" => &["a.c", "abc"]).unwrap();
        let found = search_rows(&df, ".").unwrap().unwrap();
        assert_eq!(found.height(), 1);
    }

    #[test]
    fn test_search_matches_numbers_as_text() {
        let found = search_rows(&sample(), "3").unwrap().unwrap();
        assert_eq!(found.height(), 1);
    }

    #[test]
    fn test_filter_numeric_column_by_text() {
        let filtered = filter_rows(&sample(), "n", &["1".to_string()]).unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn test_filter_unknown_value_is_empty() {
        let filtered = filter_rows(&sample(), "name", &["delta".to_string()]).unwrap();
        assert_eq!(filtered.height(), 0);
    }
}
