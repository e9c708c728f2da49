use wl_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8787);
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8787
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn default_cors_is_permissive() {
    let config = Config::default();
    assert_eq!(config.server.cors.allowed_origins, vec!["*".to_string()]);
}

#[test]
fn cors_config_parses_custom_origins() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["https://app.wonderland.example", "http://localhost:3000"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
}

#[test]
fn default_config_reports_missing_base_id() {
    let config = Config::default();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|e| e.field == "airtable.base_id" && e.severity == ConfigSeverity::Error));
}

#[test]
fn configured_base_id_passes_validation() {
    let toml_str = r#"
[airtable]
base_id = "appWonderland01"

[server.cors]
allowed_origins = ["https://app.wonderland.example"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn wildcard_cors_is_a_warning_not_an_error() {
    let config = Config::default();
    let issues = config.validate();
    let cors_issue = issues
        .iter()
        .find(|e| e.field == "server.cors.allowed_origins")
        .expect("wildcard default should be flagged");
    assert_eq!(cors_issue.severity, ConfigSeverity::Warning);
}

#[test]
fn session_defaults_are_stable() {
    let config = Config::default();
    assert_eq!(config.sessions.default_key, "main");
    assert_eq!(config.sessions.flush_interval_secs, 60);
}
