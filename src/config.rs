use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse config.toml from this directory; missing file yields defaults
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_rows: Option<usize>,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial preview slider value
    pub preview_rows: usize,
    /// Initial visualization slider value (capped at the row count)
    pub viz_rows: usize,
    /// How many numeric / categorical columns are pre-selected for charts
    pub default_column_selection: usize,
    pub histogram_bins: usize,
    /// Height cap for table sections; the derived view itself is never truncated
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_rows: usize,
    pub max_file_size_mb: u64,
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_border: String,
    pub modal_border: String,
    pub modal_border_active: String,
    pub modal_border_error: String,
    pub histogram: String,
    pub density_curve: String,
    pub bar_chart: String,
    pub heatmap_negative: String,
    pub heatmap_neutral: String,
    pub heatmap_positive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// tracing filter directive used when DATADASH_LOG is not set
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            viz_rows: 10,
            default_column_selection: 5,
            histogram_bins: 20,
            max_table_rows: 20,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_rows: 1_000_000,
            max_file_size_mb: 512,
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_active: "yellow".to_string(),
            modal_border_error: "red".to_string(),
            histogram: "#4c72b0".to_string(),
            density_curve: "white".to_string(),
            bar_chart: "#87ceeb".to_string(),
            heatmap_negative: "#3b4cc0".to_string(),
            heatmap_neutral: "#dddddd".to_string(),
            heatmap_positive: "#b40426".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: "info".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration layered over defaults from a specific config directory
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(config_manager.load_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if let Some(name) = &self.file_loading.compression {
            if crate::CompressionFormat::from_name(name).is_none() {
                return Err(eyre!(
                    "Unknown compression '{}'. Expected gzip, zstd, bzip2 or xz",
                    name
                ));
            }
        }

        if self.display.histogram_bins == 0 {
            return Err(eyre!("histogram_bins must be greater than 0"));
        }

        if self.display.max_table_rows == 0 {
            return Err(eyre!("max_table_rows must be greater than 0"));
        }

        if self.performance.max_rows == 0 {
            return Err(eyre!("max_rows must be greater than 0"));
        }

        if self.performance.max_file_size_mb == 0 {
            return Err(eyre!("max_file_size_mb must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
        if other.skip_rows.is_some() {
            self.skip_rows = other.skip_rows;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.preview_rows != default.preview_rows {
            self.preview_rows = other.preview_rows;
        }
        if other.viz_rows != default.viz_rows {
            self.viz_rows = other.viz_rows;
        }
        if other.default_column_selection != default.default_column_selection {
            self.default_column_selection = other.default_column_selection;
        }
        if other.histogram_bins != default.histogram_bins {
            self.histogram_bins = other.histogram_bins;
        }
        if other.max_table_rows != default.max_table_rows {
            self.max_table_rows = other.max_table_rows;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.max_rows != default.max_rows {
            self.max_rows = other.max_rows;
        }
        if other.max_file_size_mb != default.max_file_size_mb {
            self.max_file_size_mb = other.max_file_size_mb;
        }
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// (name, value) pairs for every themed color, in a stable order
    fn entries(&self) -> [(&'static str, &String); 19] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("modal_border", &self.modal_border),
            ("modal_border_active", &self.modal_border_active),
            ("modal_border_error", &self.modal_border_error),
            ("histogram", &self.histogram),
            ("density_curve", &self.density_curve),
            ("bar_chart", &self.bar_chart),
            ("heatmap_negative", &self.heatmap_negative),
            ("heatmap_neutral", &self.heatmap_neutral),
            ("heatmap_positive", &self.heatmap_positive),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        merge_color!(
            primary,
            secondary,
            success,
            error,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            table_header,
            table_border,
            modal_border,
            modal_border_active,
            modal_border_error,
            histogram,
            density_curve,
            bar_chart,
            heatmap_negative,
            heatmap_neutral,
            heatmap_positive,
        );
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_level != default.log_level {
            self.log_level = other.log_level;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, indexed or named) and convert to a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();
        let color = parse_color_spec(trimmed)?;

        if self.no_color {
            return Ok(Color::Reset);
        }

        Ok(match color {
            Color::Rgb(r, g, b) => self.convert_rgb_to_terminal_color(r, g, b),
            other => other,
        })
    }

    /// Convert RGB values to appropriate terminal color based on capabilities
    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a color spec without terminal adaptation; hex colors stay `Color::Rgb`
fn parse_color_spec(trimmed: &str) -> Result<Color> {
    if trimmed.starts_with('#') && trimmed.len() == 7 {
        let (r, g, b) = parse_hex(trimmed)?;
        return Ok(Color::Rgb(r, g, b));
    }

    let lower = trimmed.to_lowercase();

    if lower.starts_with("indexed(") && lower.ends_with(')') {
        let num_str = &lower[8..lower.len() - 1];
        let num = num_str.parse::<u8>().map_err(|_| {
            eyre!(
                "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                trimmed
            )
        })?;
        return Ok(Color::Indexed(num));
    }

    match lower.as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "white" => Ok(Color::White),

        "bright_black" | "bright black" => Ok(Color::Indexed(8)),
        "bright_red" | "bright red" => Ok(Color::Indexed(9)),
        "bright_green" | "bright green" => Ok(Color::Indexed(10)),
        "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
        "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
        "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
        "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
        "bright_white" | "bright white" => Ok(Color::Indexed(15)),

        "gray" | "grey" => Ok(Color::Indexed(8)),
        "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
        "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

        "reset" => Ok(Color::Reset),

        _ => Err(eyre!(
            "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
             bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
            trimmed
        )),
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 || !s.is_ascii() {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Linear interpolation between two RGB colors; non-RGB endpoints are returned as-is
pub fn blend_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    /// Unadapted RGB values of hex colors, used for gradients (heatmap)
    pub rgb: HashMap<String, (u8, u8, u8)>,
    parser_true_color: bool,
    parser_256: bool,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        let mut rgb = HashMap::new();

        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
            if let Ok(Color::Rgb(r, g, b)) = parse_color_spec(value.trim()) {
                rgb.insert(name.to_string(), (r, g, b));
            }
        }

        Ok(Self {
            colors,
            rgb,
            parser_true_color: parser.supports_true_color && !parser.no_color,
            parser_256: parser.supports_256 && !parser.no_color,
        })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Color on the diverging scale `negative → neutral → positive` for a value in [-1, 1].
    /// NaN maps to the neutral color.
    pub fn diverging(&self, value: f64) -> Color {
        let (Some(neg), Some(mid), Some(pos)) = (
            self.rgb.get("heatmap_negative"),
            self.rgb.get("heatmap_neutral"),
            self.rgb.get("heatmap_positive"),
        ) else {
            return if value.is_nan() {
                self.get("heatmap_neutral")
            } else if value < 0.0 {
                self.get("heatmap_negative")
            } else {
                self.get("heatmap_positive")
            };
        };

        if value.is_nan() {
            return self.get("heatmap_neutral");
        }

        let (r, g, b) = if value < 0.0 {
            blend_rgb(*mid, *neg, -value)
        } else {
            blend_rgb(*mid, *pos, value)
        };

        if self.parser_true_color {
            Color::Rgb(r, g, b)
        } else if self.parser_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Theme {
            colors: HashMap::new(),
            rgb: HashMap::new(),
            parser_true_color: false,
            parser_256: false,
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
