//! Control values of the dashboard.
//!
//! A [`ViewParams`] is everything the pipeline needs besides the dataset. The
//! app edits its own copy in response to keys and hands a reference to
//! [`crate::pipeline::render`]; the pipeline never changes it.

use crate::config::DisplayConfig;
use crate::dataset::Dataset;

/// Lower bound of the row sliders for datasets with at least this many rows
pub const MIN_SLIDER_ROWS: usize = 5;

/// Bounds and current value of a row-count slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlider {
    pub min: usize,
    pub max: usize,
    pub value: usize,
    /// False for an empty dataset; the slider is shown but cannot move
    pub enabled: bool,
}

impl RowSlider {
    /// Slider over a dataset of `rows` rows, starting at `requested` (clamped)
    pub fn for_rows(rows: usize, requested: usize) -> Self {
        let max = rows.max(1);
        let min = if rows >= MIN_SLIDER_ROWS {
            MIN_SLIDER_ROWS
        } else {
            1
        };

        Self {
            min,
            max,
            value: requested.clamp(min, max),
            enabled: rows > 0,
        }
    }

    pub fn clamp(&self, value: usize) -> usize {
        value.clamp(self.min, self.max)
    }

    pub fn set(&mut self, value: usize) {
        if self.enabled {
            self.value = self.clamp(value);
        }
    }

    /// Move by `delta` rows, saturating at the bounds
    pub fn step(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.value.saturating_sub(delta.unsigned_abs())
        } else {
            self.value.saturating_add(delta as usize)
        };
        self.set(target);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub preview_rows: RowSlider,
    pub viz_rows: RowSlider,
    pub numeric_selection: Vec<String>,
    pub categorical_selection: Vec<String>,
    pub filter_column: Option<String>,
    pub filter_values: Vec<String>,
    pub search_term: String,
    pub histogram_bins: usize,
}

impl ViewParams {
    /// Initial controls for a freshly loaded dataset
    pub fn defaults_for(dataset: &Dataset, display: &DisplayConfig) -> Self {
        let rows = dataset.height();
        let take = display.default_column_selection;

        Self {
            preview_rows: RowSlider::for_rows(rows, display.preview_rows),
            viz_rows: RowSlider::for_rows(rows, display.viz_rows.min(rows)),
            numeric_selection: dataset.numeric_columns().into_iter().take(take).collect(),
            categorical_selection: dataset
                .categorical_columns()
                .into_iter()
                .take(take)
                .collect(),
            filter_column: dataset.column_names().into_iter().next(),
            filter_values: Vec::new(),
            search_term: String::new(),
            histogram_bins: display.histogram_bins,
        }
    }

    /// Choose a new filter column. Selected values belong to the old column and
    /// are dropped.
    pub fn set_filter_column(&mut self, column: Option<String>) {
        if self.filter_column != column {
            self.filter_column = column;
            self.filter_values.clear();
        }
    }

    pub fn toggle_numeric(&mut self, column: &str) {
        toggle(&mut self.numeric_selection, column);
    }

    pub fn toggle_categorical(&mut self, column: &str) {
        toggle(&mut self.categorical_selection, column);
    }

    pub fn toggle_filter_value(&mut self, value: &str) {
        toggle(&mut self.filter_values, value);
    }
}

/// Remove `value` if selected, otherwise append it. Selection order is the
/// order values were picked in.
pub fn toggle(selection: &mut Vec<String>, value: &str) {
    match selection.iter().position(|v| v == value) {
        Some(idx) => {
            selection.remove(idx);
        }
        None => selection.push(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_slider_bounds_large_dataset() {
        let slider = RowSlider::for_rows(100, 5);
        assert_eq!((slider.min, slider.max, slider.value), (5, 100, 5));
        assert!(slider.enabled);
    }

    #[test]
    fn test_slider_bounds_small_dataset() {
        let mut slider = RowSlider::for_rows(3, 5);
        assert_eq!((slider.min, slider.max, slider.value), (1, 3, 3));
        slider.set(2);
        assert_eq!(slider.value, 2);

        let slider = RowSlider::for_rows(1, 5);
        assert_eq!((slider.min, slider.max, slider.value), (1, 1, 1));
        assert!(slider.enabled);
    }

    #[test]
    fn test_slider_empty_dataset_is_disabled() {
        let mut slider = RowSlider::for_rows(0, 5);
        assert!(!slider.enabled);
        assert!(slider.min <= slider.max);
        slider.step(3);
        assert_eq!(slider.value, 1);
    }

    #[test]
    fn test_slider_step_saturates() {
        let mut slider = RowSlider::for_rows(20, 5);
        slider.step(-10);
        assert_eq!(slider.value, 5);
        slider.step(100);
        assert_eq!(slider.value, 20);
    }

    #[test]
    fn test_toggle_keeps_pick_order() {
        let mut selection = vec!["a".to_string()];
        toggle(&mut selection, "c");
        toggle(&mut selection, "b");
        assert_eq!(selection, vec!["a", "c", "b"]);
        toggle(&mut selection, "a");
        assert_eq!(selection, vec!["c", "b"]);
    }

    #[test]
    fn test_defaults_for_dataset() {
        let df = df!(
            "id" => &[1i64, 2, 3],
            "city" => &["NY", "LA", "NY"],
            "score" => &[1.0f64, 2.0, 3.0],
        )
        .unwrap();
        let ds = Dataset::new(df);
        let params = ViewParams::defaults_for(&ds, &DisplayConfig::default());
        assert_eq!(params.numeric_selection, vec!["id", "score"]);
        assert_eq!(params.categorical_selection, vec!["city"]);
        assert_eq!(params.filter_column.as_deref(), Some("id"));
        assert_eq!(params.viz_rows.value, 3);
        assert!(params.search_term.is_empty());
    }

    #[test]
    fn test_changing_filter_column_clears_values() {
        let df = df!("a" => &["x", "y"], "b" => &["u", "v"]).unwrap();
        let ds = Dataset::new(df);
        let mut params = ViewParams::defaults_for(&ds, &DisplayConfig::default());
        params.toggle_filter_value("x");
        params.set_filter_column(Some("a".to_string()));
        assert_eq!(params.filter_values, vec!["x"]);
        params.set_filter_column(Some("b".to_string()));
        assert!(params.filter_values.is_empty());
    }
}
