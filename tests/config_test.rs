use datadash::config::{AppConfig, ConfigManager};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.display.preview_rows, 5);
    assert_eq!(config.display.viz_rows, 10);
    assert_eq!(config.display.default_column_selection, 5);
    assert_eq!(config.display.histogram_bins, 20);

    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.performance.max_rows, 1_000_000);

    assert_eq!(config.theme.colors.histogram, "#4c72b0");
    assert_eq!(config.theme.colors.bar_chart, "#87ceeb");

    assert!(!config.debug.enabled);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[file_loading]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));

    // A second write without force must not clobber the file
    assert!(config_manager.write_default_config(false).is_err());
    assert!(config_manager.write_default_config(true).is_ok());
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.display.preview_rows, 5);
}

#[test]
fn test_partial_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
version = "0.1"

[display]
preview_rows = 8

[theme.colors]
histogram = "green"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.display.preview_rows, 8);
    assert_eq!(config.display.viz_rows, 10);
    assert_eq!(config.theme.colors.histogram, "green");
    assert_eq!(config.theme.colors.bar_chart, "#87ceeb");
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = AppConfig::default();
    config.display.histogram_bins = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.file_loading.compression = Some("lz4".to_string());
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.colors.heatmap_positive = "not-a-color".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.version = "9.0".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_unparsable_file_is_an_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    fs::write(config_manager.config_path("config.toml"), "[display\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());
}
