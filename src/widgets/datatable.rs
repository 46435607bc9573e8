use color_eyre::Result;
use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Cell, Row, Table, Widget},
};

use crate::statistics::{self, Summary};

/// Widest a column is drawn, in characters
const MAX_COLUMN_WIDTH: usize = 24;

/// Shown for missing values
pub const NULL_TEXT: &str = "null";

/// A table already rendered to text, ready to draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the source before truncation
    pub total_rows: usize,
}

impl TextGrid {
    /// First `max_rows` rows of a frame
    pub fn from_frame(df: &DataFrame, max_rows: usize) -> Result<Self> {
        let shown = df.height().min(max_rows);
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series().head(Some(shown));
            columns.push(statistics::text_values(&series)?);
        }

        let rows = (0..shown)
            .map(|i| {
                columns
                    .iter()
                    .map(|values| {
                        values[i]
                            .clone()
                            .unwrap_or_else(|| NULL_TEXT.to_string())
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            headers: df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rows,
            total_rows: df.height(),
        })
    }

    /// One row per statistic, one column per dataset column
    pub fn from_summary(summary: &Summary) -> Self {
        let mut headers = vec![String::new()];
        let rows: Vec<Vec<String>> = match summary {
            Summary::Numeric(columns) => {
                headers.extend(columns.iter().map(|c| c.column.clone()));
                type Stat = fn(&statistics::NumericSummary) -> String;
                let stats: [(&str, Stat); 8] = [
                    ("count", |s| s.count.to_string()),
                    ("mean", |s| format_number(s.mean)),
                    ("std", |s| format_number(s.std)),
                    ("min", |s| format_number(s.min)),
                    ("25%", |s| format_number(s.q25)),
                    ("50%", |s| format_number(s.median)),
                    ("75%", |s| format_number(s.q75)),
                    ("max", |s| format_number(s.max)),
                ];
                stats
                    .iter()
                    .map(|(label, stat)| {
                        std::iter::once(label.to_string())
                            .chain(columns.iter().map(stat))
                            .collect()
                    })
                    .collect()
            }
            Summary::Categorical(columns) => {
                headers.extend(columns.iter().map(|c| c.column.clone()));
                type Stat = fn(&statistics::CategoricalSummary) -> String;
                let stats: [(&str, Stat); 4] = [
                    ("count", |s| s.count.to_string()),
                    ("unique", |s| s.unique.to_string()),
                    ("top", |s| s.top.clone().unwrap_or_else(|| NULL_TEXT.to_string())),
                    ("freq", |s| s.freq.to_string()),
                ];
                stats
                    .iter()
                    .map(|(label, stat)| {
                        std::iter::once(label.to_string())
                            .chain(columns.iter().map(stat))
                            .collect()
                    })
                    .collect()
            }
            Summary::Empty => Vec::new(),
        };

        Self {
            total_rows: rows.len(),
            headers,
            rows,
        }
    }

    /// Column / missing-count pairs
    pub fn from_null_counts(nulls: &[(String, usize)]) -> Self {
        Self {
            headers: vec!["column".to_string(), "missing".to_string()],
            rows: nulls
                .iter()
                .map(|(name, count)| vec![name.clone(), count.to_string()])
                .collect(),
            total_rows: nulls.len(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }

    fn column_widths(&self) -> Vec<Constraint> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                Constraint::Length(widest.clamp(1, MAX_COLUMN_WIDTH) as u16)
            })
            .collect()
    }
}

/// Format a statistic the way a dataframe summary prints it; NaN stays visible
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{:.1}", value);
    }
    let text = format!("{:.4}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Draws a [`TextGrid`] inside a titled border
pub struct GridTable<'a> {
    grid: &'a TextGrid,
    title: String,
    header_color: Color,
    border_color: Color,
    dimmed_color: Color,
    notice: Option<&'a str>,
}

impl<'a> GridTable<'a> {
    pub fn new(grid: &'a TextGrid, title: impl Into<String>) -> Self {
        Self {
            grid,
            title: title.into(),
            header_color: Color::Cyan,
            border_color: Color::DarkGray,
            dimmed_color: Color::DarkGray,
            notice: None,
        }
    }

    pub fn with_colors(mut self, header: Color, border: Color, dimmed: Color) -> Self {
        self.header_color = header;
        self.border_color = border;
        self.dimmed_color = dimmed;
        self
    }

    /// Line shown above the table
    pub fn with_notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }

    /// Rows needed to draw the whole grid, borders included
    pub fn height(grid: &TextGrid, has_notice: bool) -> u16 {
        let footer = usize::from(grid.is_truncated() || grid.rows.is_empty());
        (grid.rows.len() + 3 + footer + usize::from(has_notice)) as u16
    }
}

impl Widget for GridTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(self.border_color));

        if let Some(notice) = self.notice {
            block = block.title_bottom(
                Line::from(notice).style(Style::default().fg(self.dimmed_color)),
            );
        }
        if self.grid.rows.is_empty() {
            block = block.title_bottom(
                Line::from("no rows").style(Style::default().fg(self.dimmed_color)),
            );
        } else if self.grid.is_truncated() {
            block = block.title_bottom(
                Line::from(format!(
                    "showing {} of {} rows",
                    self.grid.rows.len(),
                    self.grid.total_rows
                ))
                .style(Style::default().fg(self.dimmed_color))
                .right_aligned(),
            );
        }

        let header = Row::new(self.grid.headers.iter().map(|h| Cell::from(h.as_str()))).style(
            Style::default()
                .fg(self.header_color)
                .add_modifier(Modifier::BOLD),
        );

        let rows = self.grid.rows.iter().map(|row| {
            Row::new(row.iter().map(|cell| {
                let style = if cell == NULL_TEXT {
                    Style::default().fg(self.dimmed_color)
                } else {
                    Style::default()
                };
                Cell::from(cell.as_str()).style(style)
            }))
        });

        Table::new(rows, self.grid.column_widths())
            .header(header)
            .column_spacing(2)
            .block(block)
            .render(area, buf);
    }
}
