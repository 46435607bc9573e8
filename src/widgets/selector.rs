//! Input controls of the side panel: row sliders and option lists.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::{
        Block, LineGauge, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
    },
};

use crate::params::RowSlider;

/// Cursor over a list of options. What is selected lives in `ViewParams`;
/// this only tracks where the user is pointing.
#[derive(Debug, Clone, Default)]
pub struct ListSelector {
    pub options: Vec<String>,
    pub cursor: usize,
}

impl ListSelector {
    pub fn new(options: Vec<String>) -> Self {
        Self { options, cursor: 0 }
    }

    /// Replace the options, keeping the cursor in range
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.cursor = self.cursor.min(self.options.len().saturating_sub(1));
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.options.len() {
            self.cursor += 1;
        }
    }

    pub fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn current(&self) -> Option<&str> {
        self.options.get(self.cursor).map(String::as_str)
    }

    /// Move the cursor onto `value` if it is an option
    pub fn point_at(&mut self, value: &str) {
        if let Some(idx) = self.options.iter().position(|o| o == value) {
            self.cursor = idx;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Checkboxes; any number of options
    Multi,
    /// Radio buttons; exactly one option
    Single,
}

/// Renders a [`ListSelector`] with the given options marked as selected
pub struct SelectorList<'a> {
    selector: &'a ListSelector,
    selected: &'a [String],
    title: &'a str,
    mode: SelectMode,
    focused: bool,
    border_color: Color,
    active_color: Color,
}

impl<'a> SelectorList<'a> {
    pub fn new(selector: &'a ListSelector, selected: &'a [String], title: &'a str) -> Self {
        Self {
            selector,
            selected,
            title,
            mode: SelectMode::Multi,
            focused: false,
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
        }
    }

    pub fn mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn colors(mut self, border: Color, active: Color) -> Self {
        self.border_color = border;
        self.active_color = active;
        self
    }
}

impl Widget for SelectorList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.active_color
        } else {
            self.border_color
        };
        let block = Block::bordered()
            .title(format!("{} ({})", self.title, self.selected.len()))
            .border_style(Style::default().fg(border));

        if self.selector.options.is_empty() {
            Paragraph::new("(none)")
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .selector
            .options
            .iter()
            .map(|option| {
                let checked = self.selected.iter().any(|s| s == option);
                let mark = match (self.mode, checked) {
                    (SelectMode::Multi, true) => "[x]",
                    (SelectMode::Multi, false) => "[ ]",
                    (SelectMode::Single, true) => "(•)",
                    (SelectMode::Single, false) => "( )",
                };
                ListItem::new(Line::from(format!("{} {}", mark, option)))
            })
            .collect();

        let highlight = if self.focused {
            Style::default()
                .fg(self.active_color)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        let mut state = ListState::default().with_selected(Some(self.selector.cursor));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

/// Renders a [`RowSlider`] as a gauge with its bounds
pub struct SliderGauge<'a> {
    slider: &'a RowSlider,
    title: &'a str,
    focused: bool,
    border_color: Color,
    active_color: Color,
}

impl<'a> SliderGauge<'a> {
    pub fn new(slider: &'a RowSlider, title: &'a str) -> Self {
        Self {
            slider,
            title,
            focused: false,
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn colors(mut self, border: Color, active: Color) -> Self {
        self.border_color = border;
        self.active_color = active;
        self
    }
}

/// Position of the slider value within its bounds, in [0, 1]
pub fn slider_ratio(slider: &RowSlider) -> f64 {
    if slider.max <= slider.min {
        return 1.0;
    }
    (slider.value - slider.min) as f64 / (slider.max - slider.min) as f64
}

impl Widget for SliderGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.active_color
        } else {
            self.border_color
        };
        let filled = if self.slider.enabled {
            self.active_color
        } else {
            Color::DarkGray
        };

        let label = if self.slider.enabled {
            format!(
                "{} [{}-{}]",
                self.slider.value, self.slider.min, self.slider.max
            )
        } else {
            "no rows".to_string()
        };

        LineGauge::default()
            .block(
                Block::bordered()
                    .title(self.title)
                    .border_style(Style::default().fg(border)),
            )
            .filled_style(Style::default().fg(filled))
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .line_set(symbols::line::THICK)
            .ratio(slider_ratio(self.slider))
            .label(label)
            .render(area, buf);
    }
}
