use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "RETAILINTEL_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should load");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.brands_path.to_str(), Some("./config/brands.yaml"));
    assert!(cfg.analyzer.api_key.is_none());
    assert_eq!(cfg.analyzer.model, DEFAULT_GEMINI_MODEL);
    assert_eq!(cfg.analyzer.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.analyzer.timeout_secs, 120);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let map = HashMap::from([("RETAILINTEL_BIND_ADDR", "not-a-socket-addr")]);
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILINTEL_BIND_ADDR"),
        "expected InvalidEnvVar(RETAILINTEL_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_analyzer_overrides() {
    let map = HashMap::from([
        ("GEMINI_API_KEY", "secret-key"),
        ("RETAILINTEL_GEMINI_MODEL", "gemini-2.5-pro"),
        ("RETAILINTEL_GEMINI_BASE_URL", "http://127.0.0.1:9000"),
        ("RETAILINTEL_ANALYZER_TIMEOUT_SECS", "30"),
    ]);
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.analyzer.api_key.as_deref(), Some("secret-key"));
    assert_eq!(cfg.analyzer.model, "gemini-2.5-pro");
    assert_eq!(cfg.analyzer.base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.analyzer.timeout_secs, 30);
}

#[test]
fn build_app_config_treats_blank_api_key_as_absent() {
    let map = HashMap::from([("GEMINI_API_KEY", "   ")]);
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert!(cfg.analyzer.api_key.is_none());
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let map = HashMap::from([("RETAILINTEL_ANALYZER_TIMEOUT_SECS", "soon")]);
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RETAILINTEL_ANALYZER_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let map = HashMap::from([("RETAILINTEL_ANALYZER_TIMEOUT_SECS", "0")]);
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn debug_output_redacts_api_key() {
    let map = HashMap::from([("GEMINI_API_KEY", "super-secret")]);
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("[redacted]"));
}

#[test]
fn require_api_key_names_missing_variable() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let err = cfg.analyzer.require_api_key().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GEMINI_API_KEY"));
}
