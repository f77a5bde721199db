//! Tests for configuration resolution
//!
//! Tests that manipulate OCL_* environment variables are marked #[serial]
//! so they run sequentially, not in parallel.

use std::env;
use std::io::Write;
use std::time::Duration;

use ocl_common::config::{
    load_toml, Overrides, ServiceConfig, TomlConfig, DEFAULT_API_URL, ENV_API_URL, ENV_LOG_LEVEL,
    ENV_PORT,
};
use ocl_common::Error;
use serial_test::serial;
use tempfile::NamedTempFile;

fn clear_env() {
    for name in [
        ENV_API_URL,
        ENV_PORT,
        ENV_LOG_LEVEL,
        "OCL_API_TOKEN",
        "OCL_WEB_HOST",
        "OCL_REQUEST_TIMEOUT_SECS",
    ] {
        env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_load_toml_all_keys() {
    let file = write_config(
        r#"
api_url = "http://localhost:8000/"
api_token = "secret"
host = "0.0.0.0"
port = 8080
log_level = "debug"
request_timeout_secs = 5
"#,
    );

    let config = load_toml(file.path()).unwrap();
    assert_eq!(
        config,
        TomlConfig {
            api_url: Some("http://localhost:8000/".to_string()),
            api_token: Some("secret".to_string()),
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            log_level: Some("debug".to_string()),
            request_timeout_secs: Some(5),
        }
    );
}

#[test]
fn test_load_toml_partial_file() {
    let file = write_config("port = 9999\n");
    let config = load_toml(file.path()).unwrap();
    assert_eq!(config.port, Some(9999));
    assert!(config.api_url.is_none());
}

#[test]
fn test_malformed_toml_is_an_error() {
    let file = write_config("port = \"not a number\n");
    let result = load_toml(file.path());
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
#[serial]
fn test_explicit_missing_config_file_is_an_error() {
    clear_env();
    let overrides = Overrides {
        config_file: Some("/nonexistent/ocl/config.toml".into()),
        ..Default::default()
    };
    let result = ServiceConfig::resolve(&overrides);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_file_values_used_when_no_overrides() {
    clear_env();
    let file = write_config("api_url = \"http://file.example/\"\nrequest_timeout_secs = 7\n");
    let overrides = Overrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(&overrides).unwrap();
    assert_eq!(config.api_url, "http://file.example");
    assert_eq!(config.request_timeout, Duration::from_secs(7));
    assert_eq!(config.port, 5780);
}

#[test]
#[serial]
fn test_env_beats_file_and_cli_beats_env() {
    clear_env();
    let file = write_config("api_url = \"http://file.example\"\nport = 7000\nlog_level = \"warn\"\n");
    env::set_var(ENV_API_URL, "http://env.example");
    env::set_var(ENV_PORT, "8000");

    let overrides = Overrides {
        port: Some(9000),
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(&overrides).unwrap();

    assert_eq!(config.api_url, "http://env.example");
    assert_eq!(config.port, 9000);
    assert_eq!(config.log_level, "warn");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_ignored() {
    clear_env();
    env::set_var(ENV_PORT, "not-a-port");
    let file = write_config("");
    let overrides = Overrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(&overrides).unwrap();
    assert_eq!(config.port, 5780);
    assert_eq!(config.api_url, DEFAULT_API_URL);

    clear_env();
}
