use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Key hints shown while navigating the dashboard
const NAVIGATION: [(&str, &str); 8] = [
    ("Tab", "Next"),
    ("←→", "Adjust"),
    ("↑↓", "Move"),
    ("Space", "Toggle"),
    ("1-3", "Tab"),
    ("PgDn", "Scroll"),
    ("o", "Open"),
    ("q", "Quit"),
];

/// Key hints shown while a text field has the keyboard
const TYPING: [(&str, &str); 3] = [("Enter", "Apply"), ("Tab", "Next"), ("Esc", "Leave")];

#[derive(Default)]
pub struct Controls {
    pub row_count: Option<usize>,
    pub dimmed: bool,
    pub typing: bool,
    pub bg: Option<Color>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(row_count: usize) -> Self {
        Self {
            row_count: Some(row_count),
            ..Self::default()
        }
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls: &[(&str, &str)] = if self.typing { &TYPING } else { &NAVIGATION };

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15)); // "Rows: 12345"
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = self.bg.unwrap_or(Color::DarkGray);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = controls.len() * 2;
        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(base_style.bg(bg).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    Color::White
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(bg))
            .render(layout[fill_start_idx], buf);
    }
}
