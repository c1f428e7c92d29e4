//! Integration tests for `cvewatch config` command.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("cvewatch.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[watcher]
enabled = false
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should succeed
    assert!(result.is_ok(), "valid config should load successfully");
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    let malformed_config = r#"
[general
log_level = "info"
"#;

    fs::write(&config_path, malformed_config).expect("should write bad config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should fail
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    // Given: A nonexistent file path
    let config_path = std::path::PathBuf::from("/nonexistent/cvewatch.toml");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should fail
    assert!(result.is_err(), "missing file should fail to load");
}

#[tokio::test]
async fn test_config_validate_empty_file() {
    // Given: An empty config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");

    fs::write(&config_path, "").expect("should write empty file");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should succeed with defaults
    assert!(result.is_ok(), "empty config should use defaults");
    let config = result.expect("config should load");
    assert!(config.watcher.enabled, "watcher should be enabled by default");
    assert!(!config.metrics.enabled, "metrics should be disabled by default");
}

#[tokio::test]
async fn test_config_show_full_config() {
    // Given: A full config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("cvewatch.toml");

    let full_config = r#"
[general]
log_level = "debug"
log_format = "pretty"

[storage]
db_path = "/var/lib/cvewatch/cvewatch.db"

[feed]
base_url = "https://services.nvd.nist.gov/rest/json/cves/2.0"
result_limit = 10
timeout_secs = 30

[notify]
webex_token = "bot-token"
webex_room_id = "room-1"
timeout_secs = 20

[watcher]
enabled = true
poll_interval_mins = 30
summary_max_chars = 160

[metrics]
enabled = true
listen_addr = "127.0.0.1"
port = 9100
endpoint = "/metrics"
"#;

    fs::write(&config_path, full_config).expect("should write config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should succeed and contain all sections
    assert!(result.is_ok(), "full config should load: {:?}", result.err());
    let config = result.expect("config should load");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.db_path, "/var/lib/cvewatch/cvewatch.db");
    assert_eq!(config.feed.result_limit, 10);
    assert_eq!(config.notify.webex_room_id.as_deref(), Some("room-1"));
    assert!(config.watcher.enabled);
    assert_eq!(config.watcher.poll_interval_mins, 30);
    assert_eq!(config.watcher.summary_max_chars, 160);
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.port, 9100);
}

#[tokio::test]
async fn test_config_unicode_values() {
    // Given: A config with unicode values
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("unicode.toml");

    let unicode_config = r#"
[general]
log_level = "info"

[storage]
db_path = "/경로/데이터베이스.db"
"#;

    fs::write(&config_path, unicode_config).expect("should write unicode config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should handle unicode in paths
    assert!(result.is_ok(), "unicode config should load: {:?}", result.err());
    let config = result.expect("config should load");
    assert_eq!(config.general.log_level, "info");
    assert!(config.storage.db_path.contains("데이터베이스"));
}

#[tokio::test]
async fn test_config_boundary_values() {
    // Given: A config with boundary values
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("boundary.toml");

    let boundary_config = r#"
[watcher]
enabled = true
poll_interval_mins = 1
summary_max_chars = 20

[feed]
result_limit = 1
timeout_secs = 1
"#;

    fs::write(&config_path, boundary_config).expect("should write config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should accept boundary values
    assert!(result.is_ok(), "boundary values should be accepted: {:?}", result.err());
    let config = result.expect("config should load");
    assert_eq!(config.watcher.poll_interval_mins, 1);
    assert_eq!(config.watcher.summary_max_chars, 20);
    assert_eq!(config.feed.result_limit, 1);
}

#[tokio::test]
async fn test_config_zero_poll_interval_rejected() {
    // Given: A config with a zero poll interval and the watcher enabled
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("zero.toml");

    let zero_config = r#"
[watcher]
enabled = true
poll_interval_mins = 0
"#;

    fs::write(&config_path, zero_config).expect("should write config");

    // When: Loading the config (load validates)
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should be rejected
    assert!(result.is_err(), "zero poll interval should fail validation");
}

#[tokio::test]
async fn test_config_special_characters_in_paths() {
    // Given: Config with special characters in paths
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("special.toml");

    let special_config = r#"
[storage]
db_path = "/var/lib/cvewatch-db/cvewatch-2024-02@v1.0.db"

[general]
pid_file = "/run/cvewatch/cvewatch.pid"
"#;

    fs::write(&config_path, special_config).expect("should write config");

    // When: Loading the config
    let result = cvewatch_core::config::CvewatchConfig::load(&config_path).await;

    // Then: Should preserve special characters
    assert!(result.is_ok(), "special chars should be preserved");
    let config = result.expect("config should load");
    assert!(config.storage.db_path.contains("@v1.0"));
    assert!(config.storage.db_path.contains("2024-02"));
    assert!(config.general.pid_file.contains("/run/cvewatch"));
}
