use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Clear, Paragraph, Tabs, Wrap};

pub mod cache;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod params;
pub mod pipeline;
pub mod statistics;
pub mod widgets;

pub use cache::CacheManager;
pub use cli::Args;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::{ColumnKind, Dataset, LoadError};
pub use params::{RowSlider, ViewParams};
pub use pipeline::{FilteredView, Outputs};

use statistics::{CorrelationMatrix, Histogram, ValueCounts};
use widgets::charts::{CorrelationHeatmap, FrequencyChart, HistogramChart, CHART_HEIGHT};
use widgets::controls::Controls;
use widgets::datatable::{GridTable, TextGrid};
use widgets::debug::DebugState;
use widgets::selector::{ListSelector, SelectMode, SelectorList, SliderGauge};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for config and cache directories
pub const APP_NAME: &str = "datadash";

/// Re-export compression format from CLI module
pub use cli::CompressionFormat;

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        // Check final extension (e.g., .csv.gz -> gz)
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            match ext.to_lowercase().as_str() {
                "gz" => Some(Self::Gzip),
                "zst" | "zstd" => Some(Self::Zstd),
                "bz2" | "bz" => Some(Self::Bzip2),
                "xz" => Some(Self::Xz),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Parse the name used in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gzip" => Some(Self::Gzip),
            "zstd" => Some(Self::Zstd),
            "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Get file extension for this compression format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}


#[derive(Debug, Default, Clone, PartialEq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_rows: Option<usize>,
    pub compression: Option<CompressionFormat>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = Some(skip_rows);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &cli::Args, config: &AppConfig) -> Self {
        let mut opts = OpenOptions::new();

        opts.delimiter = args.delimiter.or(config.file_loading.delimiter);
        opts.skip_rows = args.skip_rows.or(config.file_loading.skip_rows);

        // --no-header is a switch; without it the config decides
        opts.has_header = if args.no_header {
            Some(false)
        } else {
            config.file_loading.has_header
        };

        opts.compression = args.compression.or_else(|| {
            config
                .file_loading
                .compression
                .as_deref()
                .and_then(CompressionFormat::from_name)
        });

        opts
    }
}

impl From<&cli::Args> for OpenOptions {
    fn from(args: &cli::Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions), // Internal event to actually perform loading after UI update
    Recompute,
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search field
    Editing,
    /// Typing a path into the open-file prompt
    OpenPath,
}

/// Side-panel control that receives keys
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    PreviewRows,
    VizRows,
    NumericColumns,
    CategoricalColumns,
    FilterColumn,
    FilterValues,
    Search,
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::PreviewRows,
        Focus::VizRows,
        Focus::NumericColumns,
        Focus::CategoricalColumns,
        Focus::FilterColumn,
        Focus::FilterValues,
        Focus::Search,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputTab {
    #[default]
    Overview,
    Visualizations,
    FilterSearch,
}

impl OutputTab {
    const TITLES: [&'static str; 3] = ["1 Overview", "2 Visualizations", "3 Filter & Search"];

    fn index(self) -> usize {
        match self {
            OutputTab::Overview => 0,
            OutputTab::Visualizations => 1,
            OutputTab::FilterSearch => 2,
        }
    }
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading { file_path: PathBuf },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }
}

pub struct App {
    pub dataset: Option<Dataset>,
    pub params: Option<ViewParams>,
    pub outputs: Option<Outputs>,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub tab: OutputTab,
    pub status: Option<String>,
    events: Sender<AppEvent>,
    config: AppConfig,
    theme: Theme,
    open_options: OpenOptions,
    scroll: usize,
    numeric_list: ListSelector,
    categorical_list: ListSelector,
    filter_column_list: ListSelector,
    filter_values_list: ListSelector,
    search_input: TextInput,
    path_input: TextInput,
    error_modal: ErrorModal,
    loading_state: LoadingState,
    debug: DebugState,
}

impl App {
    pub fn send_event(&mut self, event: AppEvent) -> color_eyre::Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        let search_input = TextInput::new().with_theme(&theme);
        let path_input = TextInput::new().with_theme(&theme);

        App {
            dataset: None,
            params: None,
            outputs: None,
            input_mode: InputMode::Normal,
            focus: Focus::default(),
            tab: OutputTab::default(),
            status: None,
            events,
            config,
            theme,
            open_options: OpenOptions::default(),
            scroll: 0,
            numeric_list: ListSelector::default(),
            categorical_list: ListSelector::default(),
            filter_column_list: ListSelector::default(),
            filter_values_list: ListSelector::default(),
            search_input,
            path_input,
            error_modal: ErrorModal::new(),
            loading_state: LoadingState::Idle,
            debug: DebugState::default(),
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Options used for files opened from the path prompt
    pub fn set_open_options(&mut self, options: OpenOptions) {
        self.open_options = options;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.loading_state.is_loading()
    }

    /// Show the open-file prompt
    pub fn prompt_for_path(&mut self) {
        self.input_mode = InputMode::OpenPath;
        self.path_input.clear();
        self.path_input.set_focused(true);
    }

    fn load(&mut self, path: &Path, options: &OpenOptions) -> Result<(), LoadError> {
        let dataset = Dataset::from_path(path, options, &self.config.performance)?;
        let params = ViewParams::defaults_for(&dataset, &self.config.display);

        self.numeric_list = ListSelector::new(dataset.numeric_columns());
        self.categorical_list = ListSelector::new(dataset.categorical_columns());
        self.filter_column_list = ListSelector::new(dataset.column_names());
        self.filter_values_list = ListSelector::default();
        self.search_input.clear();
        self.scroll = 0;

        tracing::info!(
            path = %path.display(),
            rows = dataset.height(),
            columns = dataset.width(),
            "loaded dataset"
        );
        self.status = Some(format!(
            "File loaded successfully: {} rows, {} columns",
            dataset.height(),
            dataset.width()
        ));
        self.dataset = Some(dataset);
        self.params = Some(params);
        Ok(())
    }

    /// Forget the current dataset and everything derived from it
    fn clear_dataset(&mut self) {
        self.dataset = None;
        self.params = None;
        self.outputs = None;
        self.status = None;
        self.numeric_list = ListSelector::default();
        self.categorical_list = ListSelector::default();
        self.filter_column_list = ListSelector::default();
        self.filter_values_list = ListSelector::default();
        self.search_input.clear();
    }

    fn recompute(&mut self) {
        let (Some(dataset), Some(params)) = (&self.dataset, &self.params) else {
            self.outputs = None;
            return;
        };

        let started = Instant::now();
        match pipeline::render(dataset, params) {
            Ok(outputs) => {
                self.filter_values_list
                    .set_options(outputs.filter_options.clone());
                self.outputs = Some(outputs);
            }
            Err(e) => {
                tracing::error!(error = %e, "pipeline failed");
                self.outputs = None;
                self.error_modal
                    .show(format!("Could not compute the dashboard: {}", e));
            }
        }
        self.debug.num_recomputes += 1;
        self.debug.last_recompute_ms = started.elapsed().as_millis();
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.error_modal.active {
            if matches!(event.code, KeyCode::Enter | KeyCode::Esc) {
                self.error_modal.hide();
            }
            return None;
        }

        match self.input_mode {
            InputMode::OpenPath => self.path_key(event),
            InputMode::Editing => self.search_key(event),
            InputMode::Normal => self.normal_key(event),
        }
    }

    fn path_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match self.path_input.handle_key(event) {
            TextInputEvent::Submit => {
                let path = self.path_input.value().trim().to_string();
                if path.is_empty() {
                    return None;
                }
                self.input_mode = InputMode::Normal;
                self.path_input.set_focused(false);
                Some(AppEvent::Open(
                    PathBuf::from(path),
                    self.open_options.clone(),
                ))
            }
            TextInputEvent::Cancel => {
                self.input_mode = InputMode::Normal;
                self.path_input.set_focused(false);
                None
            }
            TextInputEvent::Changed | TextInputEvent::None => None,
        }
    }

    fn start_search(&mut self) {
        self.focus = Focus::Search;
        self.input_mode = InputMode::Editing;
        self.search_input.set_focused(true);
    }

    /// Leave the search field, applying what was typed
    fn commit_search(&mut self) -> Option<AppEvent> {
        self.input_mode = InputMode::Normal;
        self.search_input.set_focused(false);
        let params = self.params.as_mut()?;
        if params.search_term == self.search_input.value() {
            return None;
        }
        params.search_term = self.search_input.value().to_string();
        self.debug.last_action = "search".to_string();
        Some(AppEvent::Recompute)
    }

    fn search_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return self.commit_search();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return self.commit_search();
            }
            _ => {}
        }

        match self.search_input.handle_key(event) {
            TextInputEvent::Submit => self.commit_search(),
            TextInputEvent::Cancel => {
                // Drop unapplied edits
                let term = self
                    .params
                    .as_ref()
                    .map(|p| p.search_term.clone())
                    .unwrap_or_default();
                self.search_input.set_value(term);
                self.input_mode = InputMode::Normal;
                self.search_input.set_focused(false);
                None
            }
            TextInputEvent::Changed | TextInputEvent::None => None,
        }
    }

    fn normal_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('o') => {
                self.prompt_for_path();
                return None;
            }
            KeyCode::Char('1') => {
                self.set_tab(OutputTab::Overview);
                return None;
            }
            KeyCode::Char('2') => {
                self.set_tab(OutputTab::Visualizations);
                return None;
            }
            KeyCode::Char('3') => {
                self.set_tab(OutputTab::FilterSearch);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(1);
                return None;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(1);
                return None;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            _ => {}
        }

        let Some(params) = self.params.as_mut() else {
            return None;
        };

        match event.code {
            KeyCode::Char('/') => {
                self.start_search();
                return None;
            }
            KeyCode::Char('r') => {
                if let Some(dataset) = &self.dataset {
                    *params = ViewParams::defaults_for(dataset, &self.config.display);
                    self.search_input.clear();
                    self.debug.last_action = "reset".to_string();
                    return Some(AppEvent::Recompute);
                }
                return None;
            }
            _ => {}
        }

        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let step = if shift { 10 } else { 1 };
        let toggle = matches!(event.code, KeyCode::Char(' ') | KeyCode::Enter);
        let up = matches!(event.code, KeyCode::Up | KeyCode::Char('k'));
        let down = matches!(event.code, KeyCode::Down | KeyCode::Char('j'));

        let changed = match self.focus {
            Focus::PreviewRows | Focus::VizRows => {
                let slider = if self.focus == Focus::PreviewRows {
                    &mut params.preview_rows
                } else {
                    &mut params.viz_rows
                };
                let before = slider.value;
                match event.code {
                    KeyCode::Left | KeyCode::Char('h') => slider.step(-step),
                    KeyCode::Right | KeyCode::Char('l') => slider.step(step),
                    KeyCode::Home => slider.set(slider.min),
                    KeyCode::End => slider.set(slider.max),
                    _ => {}
                }
                self.debug.last_action = "slide".to_string();
                slider.value != before
            }
            Focus::NumericColumns => {
                move_cursor(&mut self.numeric_list, up, down);
                match self.numeric_list.current() {
                    Some(column) if toggle => {
                        params.toggle_numeric(column);
                        self.debug.last_action = "toggle_numeric".to_string();
                        true
                    }
                    _ => false,
                }
            }
            Focus::CategoricalColumns => {
                move_cursor(&mut self.categorical_list, up, down);
                match self.categorical_list.current() {
                    Some(column) if toggle => {
                        params.toggle_categorical(column);
                        self.debug.last_action = "toggle_categorical".to_string();
                        true
                    }
                    _ => false,
                }
            }
            Focus::FilterColumn => {
                move_cursor(&mut self.filter_column_list, up, down);
                match self.filter_column_list.current() {
                    Some(column) if toggle => {
                        params.set_filter_column(Some(column.to_string()));
                        self.filter_values_list = ListSelector::default();
                        self.debug.last_action = "filter_column".to_string();
                        true
                    }
                    _ => false,
                }
            }
            Focus::FilterValues => {
                move_cursor(&mut self.filter_values_list, up, down);
                match self.filter_values_list.current() {
                    Some(value) if toggle => {
                        params.toggle_filter_value(value);
                        self.debug.last_action = "toggle_filter_value".to_string();
                        true
                    }
                    _ => false,
                }
            }
            Focus::Search => {
                if toggle {
                    self.start_search();
                }
                false
            }
        };

        changed.then_some(AppEvent::Recompute)
    }

    fn set_tab(&mut self, tab: OutputTab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                // Render the loading message before the blocking parse
                self.loading_state = LoadingState::Loading {
                    file_path: path.clone(),
                };
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                self.loading_state = LoadingState::Idle;
                match self.load(path, options) {
                    Ok(()) => Some(AppEvent::Recompute),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "load failed");
                        self.clear_dataset();
                        self.error_modal.show(format!("Error loading file: {}", e));
                        None
                    }
                }
            }
            AppEvent::Recompute => {
                self.recompute();
                None
            }
            AppEvent::Resize(_cols, _rows) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn render_panel(&self, area: Rect, buf: &mut Buffer) {
        let Some(params) = &self.params else {
            return;
        };
        let border = self.theme.get("table_border");
        let active = self.theme.get("modal_border_active");

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(3),
            ])
            .split(area);

        SliderGauge::new(&params.preview_rows, "Preview rows")
            .focused(self.focus == Focus::PreviewRows)
            .colors(border, active)
            .render(layout[0], buf);
        SliderGauge::new(&params.viz_rows, "Visualization rows")
            .focused(self.focus == Focus::VizRows)
            .colors(border, active)
            .render(layout[1], buf);
        SelectorList::new(&self.numeric_list, &params.numeric_selection, "Numeric")
            .focused(self.focus == Focus::NumericColumns)
            .colors(border, active)
            .render(layout[2], buf);
        SelectorList::new(
            &self.categorical_list,
            &params.categorical_selection,
            "Categorical",
        )
        .focused(self.focus == Focus::CategoricalColumns)
        .colors(border, active)
        .render(layout[3], buf);

        let filter_column: Vec<String> = params.filter_column.iter().cloned().collect();
        SelectorList::new(&self.filter_column_list, &filter_column, "Filter column")
            .mode(SelectMode::Single)
            .focused(self.focus == Focus::FilterColumn)
            .colors(border, active)
            .render(layout[4], buf);
        SelectorList::new(
            &self.filter_values_list,
            &params.filter_values,
            "Filter values",
        )
        .focused(self.focus == Focus::FilterValues)
        .colors(border, active)
        .render(layout[5], buf);

        let search_block = Block::bordered().title("Search").border_style(
            Style::default().fg(if self.focus == Focus::Search {
                active
            } else {
                border
            }),
        );
        let inner = search_block.inner(layout[6]);
        search_block.render(layout[6], buf);
        self.search_input.render(inner, buf);
    }

    fn render_outputs(&mut self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .split(area);

        Tabs::new(OutputTab::TITLES)
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(layout[0], buf);

        let Some(outputs) = &self.outputs else {
            return;
        };

        let sections = build_sections(self.tab, outputs, &self.config);
        self.scroll = self.scroll.min(sections.len().saturating_sub(1));

        let content = layout[1];
        let mut y = content.y;
        for section in sections.into_iter().skip(self.scroll) {
            if y >= content.bottom() {
                break;
            }
            let height = section.height(content.width).min(content.bottom() - y);
            section.render(
                Rect::new(content.x, y, content.width, height),
                buf,
                &self.theme,
            );
            y += height;
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            " datadash ",
            Style::default()
                .fg(self.theme.get("primary"))
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(source) = self.dataset.as_ref().and_then(|d| d.source()) {
            spans.push(Span::raw(source.display().to_string()));
            spans.push(Span::raw("  "));
        }
        if let Some(status) = &self.status {
            spans.push(Span::styled(
                status.as_str(),
                Style::default().fg(self.theme.get("success")),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_placeholder(&self, area: Rect, buf: &mut Buffer) {
        let text = match &self.loading_state {
            LoadingState::Loading { file_path } => format!("Loading {}…", file_path.display()),
            LoadingState::Idle => {
                "No data loaded. Press o to open a .csv, .tsv, .psv or .txt file.".to_string()
            }
        };
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);
        Paragraph::new(text)
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .centered()
            .render(middle, buf);
    }

    fn render_path_prompt(&self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(area.width.saturating_sub(4).min(70), 3, area);
        Clear.render(popup, buf);
        let block = Block::bordered()
            .title("Open file")
            .title_bottom(Line::from("Enter to load, Esc to cancel").right_aligned())
            .border_style(Style::default().fg(self.theme.get("modal_border_active")));
        let inner = block.inner(popup);
        block.render(popup, buf);
        self.path_input.render(inner, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4).min(70);
        let text_width = width.saturating_sub(2).max(1) as usize;
        let lines = self
            .error_modal
            .message
            .lines()
            .map(|l| l.chars().count() / text_width + 1)
            .sum::<usize>();
        let popup = centered_rect(width, (lines as u16 + 2).min(area.height), area);
        Clear.render(popup, buf);
        Paragraph::new(self.error_modal.message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title("Error")
                    .title_bottom(Line::from("Enter to dismiss").right_aligned())
                    .border_style(Style::default().fg(self.theme.get("modal_border_error"))),
            )
            .render(popup, buf);
    }
}

fn move_cursor(list: &mut ListSelector, up: bool, down: bool) {
    if up {
        list.prev();
    } else if down {
        list.next();
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// One block of the output column
enum Section<'a> {
    Grid {
        title: String,
        grid: TextGrid,
        notice: Option<&'static str>,
    },
    Text {
        title: String,
        text: String,
    },
    Histogram {
        title: String,
        histogram: &'a Histogram,
    },
    Bars {
        title: String,
        counts: &'a ValueCounts,
    },
    Heatmap {
        title: String,
        matrix: &'a CorrelationMatrix,
    },
}

impl Section<'_> {
    fn grid(title: String, grid: color_eyre::Result<TextGrid>) -> Self {
        match grid {
            Ok(grid) => Section::Grid {
                title,
                grid,
                notice: None,
            },
            Err(e) => Section::Text {
                title,
                text: format!("Could not display table: {}", e),
            },
        }
    }

    fn height(&self, width: u16) -> u16 {
        match self {
            Section::Grid { grid, notice, .. } => GridTable::height(grid, notice.is_some()),
            Section::Text { text, .. } => {
                let inner = width.saturating_sub(2).max(1) as usize;
                (text.chars().count() / inner + 3) as u16
            }
            Section::Histogram { .. } | Section::Bars { .. } => CHART_HEIGHT,
            Section::Heatmap { matrix, .. } => CorrelationHeatmap::height(matrix),
        }
    }

    fn render(self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        match self {
            Section::Grid {
                title,
                grid,
                notice,
            } => GridTable::new(&grid, title)
                .with_colors(
                    theme.get("table_header"),
                    theme.get("table_border"),
                    theme.get("dimmed"),
                )
                .with_notice(notice)
                .render(area, buf),
            Section::Text { title, text } => Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(
                    Block::bordered()
                        .title(title)
                        .border_style(Style::default().fg(theme.get("table_border"))),
                )
                .render(area, buf),
            Section::Histogram { title, histogram } => HistogramChart::new(histogram, title)
                .with_theme(theme)
                .render(area, buf),
            Section::Bars { title, counts } => FrequencyChart::new(counts, title)
                .with_theme(theme)
                .render(area, buf),
            Section::Heatmap { title, matrix } => {
                CorrelationHeatmap::new(matrix, theme, title).render(area, buf)
            }
        }
    }
}

fn build_sections<'a>(tab: OutputTab, outputs: &'a Outputs, config: &AppConfig) -> Vec<Section<'a>> {
    let max_rows = config.display.max_table_rows;
    let mut sections = Vec::new();

    match tab {
        OutputTab::Overview => {
            sections.push(Section::grid(
                format!("Dataset Preview (first {} rows)", outputs.preview.height()),
                TextGrid::from_frame(&outputs.preview, outputs.preview.height()),
            ));

            let columns = outputs
                .insights
                .column_names
                .iter()
                .map(|(name, kind)| format!("{} ({})", name, kind.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            sections.push(Section::Text {
                title: "Basic Insights".to_string(),
                text: format!(
                    "Total rows: {}   Total columns: {}   Columns: {}",
                    outputs.insights.rows, outputs.insights.columns, columns
                ),
            });

            let summary = TextGrid::from_summary(&outputs.summary);
            if summary.rows.is_empty() {
                sections.push(Section::Text {
                    title: "Summary Statistics".to_string(),
                    text: "No numeric or text columns to summarize".to_string(),
                });
            } else {
                sections.push(Section::grid(
                    "Summary Statistics".to_string(),
                    Ok(summary),
                ));
            }

            sections.push(Section::grid(
                "Missing Values".to_string(),
                Ok(TextGrid::from_null_counts(&outputs.nulls)),
            ));
        }
        OutputTab::Visualizations => {
            let label = outputs.subset_label();
            for histogram in &outputs.histograms {
                sections.push(Section::Histogram {
                    title: format!("Histogram of {} {}", histogram.column, label),
                    histogram,
                });
            }
            for counts in &outputs.bar_charts {
                sections.push(Section::Bars {
                    title: format!("Bar Chart of {} {}", counts.column, label),
                    counts,
                });
            }
            if let Some(matrix) = &outputs.heatmap {
                sections.push(Section::Heatmap {
                    title: format!("Correlation Heatmap {}", label),
                    matrix,
                });
            }
            if sections.is_empty() {
                sections.push(Section::Text {
                    title: "Visualizations".to_string(),
                    text: "Select numeric or categorical columns in the side panel to draw charts"
                        .to_string(),
                });
            }
        }
        OutputTab::FilterSearch => {
            let title = match &outputs.filtered {
                FilteredView::Applied { column, values, df } => format!(
                    "Filtered Data: {} in [{}] ({} rows)",
                    column,
                    values.join(", "),
                    df.height()
                ),
                FilteredView::NoFilter { .. } => "Filtered Data".to_string(),
            };
            let mut filtered =
                Section::grid(title, TextGrid::from_frame(outputs.filtered.df(), max_rows));
            if let Section::Grid { notice, .. } = &mut filtered {
                *notice = outputs.filtered.notice();
            }
            sections.push(filtered);

            match &outputs.search {
                Some(found) => sections.push(Section::grid(
                    format!("Search Results ({} rows)", found.height()),
                    TextGrid::from_frame(found, max_rows),
                )),
                // No term, no results block
                None => sections.push(Section::Text {
                    title: "Search".to_string(),
                    text: "Press / and type a term to search every column".to_string(),
                }),
            }
        }
    }

    sections
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1), // Controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_title(layout[0], buf);

        if self.dataset.is_some() {
            let main = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(36), Constraint::Fill(1)])
                .split(layout[1]);
            self.render_panel(main[0], buf);
            self.render_outputs(main[1], buf);
        } else {
            self.render_placeholder(layout[1], buf);
        }

        let controls = match &self.dataset {
            Some(dataset) => Controls::with_row_count(dataset.height()),
            None => Controls::new(),
        };
        controls
            .with_typing(self.input_mode != InputMode::Normal)
            .with_dimmed(self.error_modal.active)
            .with_background(self.theme.get("controls_bg"))
            .render(layout[2], buf);

        if self.debug.enabled {
            self.debug.render(layout[3], buf);
        }

        if self.input_mode == InputMode::OpenPath {
            self.render_path_prompt(layout[1], buf);
        }
        if self.error_modal.active {
            self.render_error(layout[1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::PreviewRows.prev(), Focus::Search);
        assert_eq!(Focus::Search.next(), Focus::PreviewRows);
        assert_eq!(Focus::VizRows.next(), Focus::NumericColumns);
    }

    #[test]
    fn test_quit_keys() {
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new(tx);
        assert!(matches!(app.event(&key(KeyCode::Char('q'))), Some(AppEvent::Exit)));
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));
    }

    #[test]
    fn test_open_prompt_submits_path() {
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new(tx);
        app.set_open_options(OpenOptions::new().with_delimiter(b';'));
        app.event(&key(KeyCode::Char('o')));
        assert_eq!(app.input_mode, InputMode::OpenPath);
        for c in "a.csv".chars() {
            assert!(app.event(&key(KeyCode::Char(c))).is_none());
        }
        match app.event(&key(KeyCode::Enter)) {
            Some(AppEvent::Open(path, options)) => {
                assert_eq!(path, PathBuf::from("a.csv"));
                assert_eq!(options.delimiter, Some(b';'));
            }
            _ => panic!("expected an Open event"),
        }
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_controls_need_a_dataset() {
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new(tx);
        assert!(app.event(&key(KeyCode::Right)).is_none());
        assert!(app.event(&key(KeyCode::Char('/'))).is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 10, 4);
        let rect = centered_rect(20, 3, area);
        assert_eq!(rect, Rect::new(0, 0, 10, 3));
    }
}
