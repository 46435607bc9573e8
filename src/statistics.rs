use color_eyre::Result;
use polars::prelude::*;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::dataset::{ColumnInfo, ColumnKind};

/// Number of points the density curve is evaluated on
pub const DENSITY_POINTS: usize = 200;

/// `describe`-style statistics for one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// `describe`-style statistics for one text column
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// Summary of the whole dataset. Numeric columns win when present, like a
/// dataframe's default `describe`.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Numeric(Vec<NumericSummary>),
    Categorical(Vec<CategoricalSummary>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    /// Gaussian KDE scaled to counts: (x, expected count per bin). Empty when
    /// there are fewer than two values or they do not vary.
    pub density: Vec<(f64, f64)>,
    pub total: usize,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueCounts {
    pub column: String,
    /// Descending by count; ties keep first-appearance order
    pub counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Square, symmetric. NaN where a coefficient is undefined.
    pub correlations: Vec<Vec<f64>>,
}

/// Column cast to Float64 with NaN turned into null
fn present_f64(series: &Series) -> Result<Series> {
    let cast = series.cast(&DataType::Float64)?;
    let cleaned: Float64Chunked = cast
        .f64()?
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(cleaned.with_name(series.name().clone()).into_series())
}

/// Numeric column values as f64; nulls and NaN become `None`
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    Ok(present_f64(series)?.f64()?.iter().collect())
}

/// Cell values rendered as text; nulls stay `None`
pub fn text_values(series: &Series) -> Result<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast.str()?.iter().map(|v| v.map(str::to_string)).collect())
}

pub fn describe(df: &DataFrame, columns: &[ColumnInfo]) -> Result<Summary> {
    let numeric: Vec<&ColumnInfo> = columns
        .iter()
        .filter(|c| c.kind == ColumnKind::Numeric)
        .collect();

    if !numeric.is_empty() {
        let mut summaries = Vec::with_capacity(numeric.len());
        for info in numeric {
            summaries.push(numeric_summary(df.column(&info.name)?.as_materialized_series())?);
        }
        return Ok(Summary::Numeric(summaries));
    }

    let categorical: Vec<&ColumnInfo> = columns
        .iter()
        .filter(|c| c.kind == ColumnKind::Categorical)
        .collect();

    if categorical.is_empty() {
        return Ok(Summary::Empty);
    }

    let mut summaries = Vec::with_capacity(categorical.len());
    for info in categorical {
        let series = df.column(&info.name)?.as_materialized_series();
        let counts = count_values(series)?;
        let (top, freq) = counts
            .counts
            .first()
            .map(|(v, c)| (Some(v.clone()), *c))
            .unwrap_or((None, 0));
        summaries.push(CategoricalSummary {
            column: info.name.clone(),
            count: series.len() - series.null_count(),
            unique: counts.counts.len(),
            top,
            freq,
        });
    }
    Ok(Summary::Categorical(summaries))
}

/// Count, moments and quartiles of a numeric column, ignoring nulls and NaN
pub fn numeric_summary(series: &Series) -> Result<NumericSummary> {
    let values = present_f64(series)?;
    let mut sorted: Vec<f64> = values.f64()?.iter().flatten().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(NumericSummary {
        column: series.name().to_string(),
        count: values.len() - values.null_count(),
        mean: values.mean().unwrap_or(f64::NAN),
        // Sample std (ddof=1); None below two values
        std: values.std(1).unwrap_or(f64::NAN),
        min: values.min::<f64>()?.unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: values.max::<f64>()?.unwrap_or(f64::NAN),
    })
}

fn sample_std(values: &[f64]) -> f64 {
    Float64Chunked::from_slice(PlSmallStr::EMPTY, values)
        .std(1)
        .unwrap_or(f64::NAN)
}

/// Quantile of sorted data with linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Null count per column, in column order
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Equal-width histogram over `[min, max]` of the values, last bin closed.
/// All-equal data gets the unit range `[v - 0.5, v + 0.5]`.
pub fn histogram(column: &str, values: &[f64], num_bins: usize) -> Histogram {
    let num_bins = num_bins.max(1);
    let total = values.len();

    let (lo, hi) = match (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) {
        (Some(lo), Some(hi)) if hi > lo => (lo, hi),
        (Some(v), Some(_)) => (v - 0.5, v + 0.5),
        _ => (0.0, 1.0),
    };

    let width = (hi - lo) / num_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == num_bins {
                hi
            } else {
                lo + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(num_bins - 1);
        bins[idx].count += 1;
    }

    let density = kde_curve(values, lo, hi, DENSITY_POINTS)
        .into_iter()
        .map(|(x, d)| (x, d * total as f64 * width))
        .collect();

    Histogram {
        column: column.to_string(),
        bins,
        density,
        total,
    }
}

/// Gaussian kernel density estimate on `points` evenly spaced x values in
/// `[lo, hi]`, bandwidth by Scott's rule. Empty for degenerate input.
pub fn kde_curve(values: &[f64], lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
    let n = values.len();
    if n < 2 || points < 2 {
        return Vec::new();
    }
    let std = sample_std(values);
    if !(std > 0.0) {
        return Vec::new();
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}

/// Frequency of each non-null value as text, descending by count
pub fn count_values(series: &Series) -> Result<ValueCounts> {
    let text = series
        .cast(&DataType::String)?
        .drop_nulls()
        .with_name("value".into());

    let first_seen: HashMap<String, usize> = text
        .unique_stable()?
        .str()?
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, v)| (v.to_string(), i))
        .collect();

    let counted = text.value_counts(false, false, "count".into(), false)?;
    let values = counted.column("value")?.as_materialized_series().str()?;
    let totals = counted
        .column("count")?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    let mut counts: Vec<(String, usize)> = values
        .iter()
        .zip(totals.u64()?.iter())
        .filter_map(|(v, c)| Some((v?.to_string(), c? as usize)))
        .collect();
    // equal counts keep first-appearance order
    counts.sort_by_key(|(v, c)| {
        (
            Reverse(*c),
            first_seen.get(v).copied().unwrap_or(usize::MAX),
        )
    });

    Ok(ValueCounts {
        column: series.name().to_string(),
        counts,
    })
}

/// Distinct non-null values of a column as text, in first-appearance order
pub fn distinct_values(series: &Series) -> Result<Vec<String>> {
    let unique = series
        .cast(&DataType::String)?
        .drop_nulls()
        .unique_stable()?;
    Ok(unique.str()?.iter().flatten().map(str::to_string).collect())
}

/// Pearson correlations among exactly `columns` using pairwise-complete rows
pub fn correlation_matrix(df: &DataFrame, columns: &[String]) -> Result<CorrelationMatrix> {
    let mut values = Vec::with_capacity(columns.len());
    for name in columns {
        values.push(numeric_values(df.column(name)?.as_materialized_series())?);
    }

    let n = columns.len();
    let mut correlations = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                let present: Vec<f64> = values[i].iter().flatten().copied().collect();
                if sample_std(&present) > 0.0 {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(&values[i], &values[j])
            };
            correlations[i][j] = r;
            correlations[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        correlations,
    })
}

/// Pearson r over rows where both sides are present; NaN when undefined
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }

    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}
