//! Integration tests for configuration file loading.

use std::io::Write;

use ngw_common::{LogFormat, LoggingConfig, load_config};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AppConfig {
    name: String,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{
            name: "gateway",
            logging: {{ level: "warn", format: "json" }},
        }}"#
    )
    .unwrap();

    let config: AppConfig = load_config(file.path()).unwrap();

    assert_eq!(config.name, "gateway");
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_config_parse_error_names_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{ name: ").unwrap();

    let result: ngw_common::Result<AppConfig> = load_config(file.path());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("Failed to parse config file"));
    assert!(err.contains(&file.path().display().to_string()));
}
