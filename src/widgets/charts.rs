use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Cell, Chart, Dataset as ChartDataset, GraphType,
        Paragraph, Row, Table, Widget,
    },
};

use crate::config::Theme;
use crate::statistics::{CorrelationMatrix, Histogram, ValueCounts};
use crate::widgets::datatable::format_number;

/// Height of one histogram or bar chart section
pub const CHART_HEIGHT: u16 = 14;

/// Heatmap cell width in characters
const HEATMAP_CELL_WIDTH: u16 = 7;

fn axis_label(value: f64) -> String {
    if value.abs() >= 1000.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Count histogram with the density curve drawn over it
pub struct HistogramChart<'a> {
    histogram: &'a Histogram,
    title: String,
    bar_color: Color,
    curve_color: Color,
    border_color: Color,
}

impl<'a> HistogramChart<'a> {
    pub fn new(histogram: &'a Histogram, title: impl Into<String>) -> Self {
        Self {
            histogram,
            title: title.into(),
            bar_color: Color::Blue,
            curve_color: Color::White,
            border_color: Color::DarkGray,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.bar_color = theme.get("histogram");
        self.curve_color = theme.get("density_curve");
        self.border_color = theme.get("table_border");
        self
    }
}

impl Widget for HistogramChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(self.border_color));

        if self.histogram.total == 0 {
            Paragraph::new("No values in this column")
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        let bars: Vec<(f64, f64)> = self
            .histogram
            .bins
            .iter()
            .map(|bin| ((bin.start + bin.end) / 2.0, bin.count as f64))
            .collect();

        let (x_min, x_max) = self.histogram.range();
        let y_max = self
            .histogram
            .density
            .iter()
            .map(|(_, y)| *y)
            .fold(self.histogram.max_count() as f64, f64::max)
            .max(1.0)
            * 1.1;

        let mut datasets = vec![ChartDataset::default()
            .name("count")
            .marker(symbols::Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(self.bar_color))
            .data(&bars)];

        if !self.histogram.density.is_empty() {
            datasets.push(
                ChartDataset::default()
                    .name("density")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.curve_color))
                    .data(&self.histogram.density),
            );
        }

        let x_mid = (x_min + x_max) / 2.0;
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(self.histogram.column.as_str())
                    .bounds([x_min, x_max])
                    .labels([axis_label(x_min), axis_label(x_mid), axis_label(x_max)]),
            )
            .y_axis(
                Axis::default()
                    .title("Count")
                    .bounds([0.0, y_max])
                    .labels(["0".to_string(), axis_label(y_max / 1.1)]),
            )
            .hidden_legend_constraints((Constraint::Ratio(1, 4), Constraint::Ratio(1, 4)))
            .render(area, buf);
    }
}

/// Vertical bars of value frequencies, as many as fit
pub struct FrequencyChart<'a> {
    counts: &'a ValueCounts,
    title: String,
    bar_color: Color,
    border_color: Color,
}

impl<'a> FrequencyChart<'a> {
    pub fn new(counts: &'a ValueCounts, title: impl Into<String>) -> Self {
        Self {
            counts,
            title: title.into(),
            bar_color: Color::LightBlue,
            border_color: Color::DarkGray,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.bar_color = theme.get("bar_chart");
        self.border_color = theme.get("table_border");
        self
    }
}

impl Widget for FrequencyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(self.border_color));

        if self.counts.counts.is_empty() {
            Paragraph::new("No values in this column")
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        let inner_width = area.width.saturating_sub(2);
        let longest = self
            .counts
            .counts
            .iter()
            .map(|(value, _)| value.chars().count())
            .max()
            .unwrap_or(1);
        let bar_width = (longest as u16).clamp(3, 12);
        let gap = 1u16;
        let fits = ((inner_width + gap) / (bar_width + gap)).max(1) as usize;

        let bars: Vec<Bar> = self
            .counts
            .counts
            .iter()
            .take(fits)
            .map(|(value, count)| {
                let label: String = value.chars().take(bar_width as usize).collect();
                Bar::default()
                    .value(*count as u64)
                    .label(Line::from(label))
                    .text_value(count.to_string())
            })
            .collect();

        let mut block = block;
        if self.counts.counts.len() > bars.len() {
            block = block.title_bottom(
                Line::from(format!(
                    "{} of {} values",
                    bars.len(),
                    self.counts.counts.len()
                ))
                .right_aligned(),
            );
        }

        BarChart::default()
            .block(block)
            .bar_width(bar_width)
            .bar_gap(gap)
            .bar_style(Style::default().fg(self.bar_color))
            .value_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(self.bar_color)
                    .add_modifier(Modifier::BOLD),
            )
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

/// Annotated correlation table colored on a diverging scale
pub struct CorrelationHeatmap<'a> {
    matrix: &'a CorrelationMatrix,
    theme: &'a Theme,
    title: String,
}

impl<'a> CorrelationHeatmap<'a> {
    pub fn new(matrix: &'a CorrelationMatrix, theme: &'a Theme, title: impl Into<String>) -> Self {
        Self {
            matrix,
            theme,
            title: title.into(),
        }
    }

    pub fn height(matrix: &CorrelationMatrix) -> u16 {
        (matrix.columns.len() + 3) as u16
    }
}

/// Text of one heatmap cell
pub fn correlation_text(value: f64) -> String {
    if value.is_nan() {
        format_number(value)
    } else {
        format!("{:.2}", value)
    }
}

impl Widget for CorrelationHeatmap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_width = self
            .matrix
            .columns
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(4, 20) as u16;

        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(self.matrix.columns.iter().map(|c| {
                    let short: String = c.chars().take(HEATMAP_CELL_WIDTH as usize).collect();
                    Cell::from(short)
                })),
        )
        .style(
            Style::default()
                .fg(self.theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        );

        let rows = self
            .matrix
            .columns
            .iter()
            .zip(self.matrix.correlations.iter())
            .map(|(name, values)| {
                let label = Cell::from(name.as_str()).style(
                    Style::default()
                        .fg(self.theme.get("table_header"))
                        .add_modifier(Modifier::BOLD),
                );
                Row::new(std::iter::once(label).chain(values.iter().map(|&v| {
                    Cell::from(Line::from(correlation_text(v)).centered())
                        .style(Style::default().fg(Color::Black).bg(self.theme.diverging(v)))
                })))
            });

        let widths = std::iter::once(Constraint::Length(label_width)).chain(
            self.matrix
                .columns
                .iter()
                .map(|_| Constraint::Length(HEATMAP_CELL_WIDTH)),
        );

        Table::new(rows, widths)
            .header(header)
            .column_spacing(0)
            .block(
                Block::bordered()
                    .title(self.title)
                    .border_style(Style::default().fg(self.theme.get("table_border"))),
            )
            .render(area, buf);
    }
}
