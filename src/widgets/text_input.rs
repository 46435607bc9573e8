use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Changed, // Text was edited
    Submit,  // Enter pressed
    Cancel,  // Esc pressed
}

/// Single-line text input widget wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    text_color: Option<Color>,
    background_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            text_color: None,
            background_color: None,
            focused: false,
        };
        widget.apply_colors_to_textarea();
        widget.set_focused(false);
        widget
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
    }

    fn apply_colors_to_textarea(&mut self) {
        let mut style = Style::default();
        if let Some(text_color) = self.text_color {
            style = style.fg(text_color);
        }
        if let Some(bg_color) = self.background_color {
            style = style.bg(bg_color);
        }
        self.textarea.set_style(style);
        // No underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.apply_colors_to_textarea();
        let focused = self.focused;
        self.set_focused(focused);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self.apply_colors_to_textarea();
        self
    }

    /// Show or hide the cursor
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            // Same style as the text hides the cursor
            let textarea_style = self.textarea.style();
            self.textarea.set_cursor_style(textarea_style);
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![self.value.clone()]);
        self.apply_colors_to_textarea();
        let focused = self.focused;
        self.set_focused(focused);
        self.textarea.move_cursor(CursorMove::End);
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => TextInputEvent::Submit,
            KeyCode::Esc => TextInputEvent::Cancel,
            // Single line: vertical movement and tabs are not text edits
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => TextInputEvent::None,
            _ => {
                let before = self.value.clone();
                self.textarea.input(Self::key_event_to_input(event));
                self.sync_from_textarea();
                if self.value != before {
                    TextInputEvent::Changed
                } else {
                    TextInputEvent::None
                }
            }
        }
    }

    fn key_event_to_input(event: &KeyEvent) -> Input {
        let key = match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => Key::Null,
        };

        Input {
            key,
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            shift: event.modifiers.contains(KeyModifiers::SHIFT),
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        // tui-textarea underlines the cursor line on some terminals
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}
