use datadash::config::{AppConfig, ColorParser, Theme};
use datadash::{App, AppEvent};
use ratatui::style::Color;
use std::sync::mpsc::channel;

// Colors are only adapted when NO_COLOR is unset
fn ensure_colors_enabled() {
    std::env::remove_var("NO_COLOR");
}

#[test]
fn test_parse_named_and_indexed_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("red").unwrap(), Color::Red);
    assert_eq!(parser.parse(" Cyan ").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("bright_red").unwrap(), Color::Indexed(9));
    assert_eq!(parser.parse("dark grey").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert_eq!(parser.parse("reset").unwrap(), Color::Reset);
}

#[test]
fn test_parse_rejects_bad_colors() {
    let parser = ColorParser::new();

    assert!(parser.parse("mauve").is_err());
    assert!(parser.parse("indexed(256)").is_err());
    assert!(parser.parse("#12345g").is_err());
    assert!(parser.parse("#123").is_err());
}

#[test]
fn test_hex_colors_adapt_to_terminal() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    // Whatever the terminal supports, a hex color never fails to parse
    match parser.parse("#4c72b0").unwrap() {
        Color::Rgb(0x4c, 0x72, 0xb0) | Color::Indexed(_) => {}
        Color::Blue => {}
        other => panic!("unexpected color {:?}", other),
    }
}

#[test]
fn test_diverging_scale_matches_theme_endpoints() {
    ensure_colors_enabled();
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();

    assert_eq!(theme.diverging(1.0), theme.get("heatmap_positive"));
    assert_eq!(theme.diverging(-1.0), theme.get("heatmap_negative"));
    assert_eq!(theme.diverging(0.0), theme.get("heatmap_neutral"));
    assert_eq!(theme.diverging(f64::NAN), theme.get("heatmap_neutral"));
}

#[test]
fn test_diverging_with_named_colors() {
    ensure_colors_enabled();
    let mut config = AppConfig::default();
    config.theme.colors.heatmap_negative = "blue".to_string();
    config.theme.colors.heatmap_positive = "red".to_string();
    let theme = Theme::from_config(&config.theme).unwrap();

    // Without RGB endpoints there is no gradient, only the sign
    assert_eq!(theme.diverging(0.3), Color::Red);
    assert_eq!(theme.diverging(-0.3), Color::Blue);
}

#[test]
fn test_unknown_theme_color_is_reset() {
    let theme = Theme::default();
    assert_eq!(theme.get("no_such_color"), Color::Reset);
}

#[test]
fn test_app_accepts_custom_theme() {
    let mut config = AppConfig::default();
    config.theme.colors.primary = "#ff0000".to_string();
    config.theme.colors.bar_chart = "bright_green".to_string();

    let theme = Theme::from_config(&config.theme).expect("custom colors parse");
    let (tx, _rx) = channel::<AppEvent>();
    let app = App::new_with_config(tx, theme, config);
    assert!(app.dataset.is_none());
}
