use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(name: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("chat_client_config_test_{name}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("client.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_key: &str) -> Option<String> {
    None
}

#[test]
fn defaults_target_local_query_endpoint() {
    let settings = ClientSettings::default();
    assert_eq!(settings.endpoint, "http://localhost:8000/query");
    assert_eq!(settings.request_timeout(), None);
    assert_eq!(settings.session_id_policy, SessionIdPolicy::AcceptRotation);
    assert_eq!(
        settings.endpoint_url().expect("url").path(),
        "/query"
    );
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "file",
        r#"
endpoint = "https://chat.example.test/query"
request_timeout_ms = 2500
session_id_policy = "keep_first"
"#,
    );

    let settings = load_settings_with(Some(path.as_path()), no_env).expect("load");

    assert_eq!(settings.endpoint, "https://chat.example.test/query");
    assert_eq!(settings.request_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(settings.session_id_policy, SessionIdPolicy::KeepFirst);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let path = env::temp_dir().join("chat_client_config_test_missing/none.toml");
    let err = load_settings_with(Some(path.as_path()), no_env).expect_err("must fail");
    assert!(matches!(err, SettingsError::Read { .. }), "unexpected error: {err}");
}

#[test]
fn malformed_file_is_reported_with_path() {
    let path = temp_settings_file("malformed", "request_timeout_ms = \"soon\"");
    let err = load_settings_with(Some(path.as_path()), no_env).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("client.toml"));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("CHAT_ENDPOINT", "http://10.0.0.5:8000/query"),
        ("APP__ENDPOINT", "http://10.0.0.6:8000/query"),
        ("APP__REQUEST_TIMEOUT_MS", "900"),
    ]);
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.endpoint, "http://10.0.0.6:8000/query");
    assert_eq!(settings.request_timeout_ms, Some(900));
}

#[test]
fn non_numeric_timeout_env_is_ignored() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |key| {
        (key == "APP__REQUEST_TIMEOUT_MS").then(|| "soon".to_string())
    });
    assert_eq!(settings.request_timeout_ms, None);
}

#[test]
fn rejects_non_http_endpoints() {
    let settings = ClientSettings {
        endpoint: "ftp://localhost/query".into(),
        ..ClientSettings::default()
    };
    assert!(matches!(
        settings.endpoint_url(),
        Err(SettingsError::UnsupportedScheme(_))
    ));

    let settings = ClientSettings {
        endpoint: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(matches!(
        settings.endpoint_url(),
        Err(SettingsError::InvalidEndpoint { .. })
    ));
}

#[test]
fn env_overrides_apply_on_top_of_file_values() {
    let path = temp_settings_file(
        "layered",
        r#"
endpoint = "https://chat.example.test/query"
session_id_policy = "keep_first"
"#,
    );
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__ENDPOINT", "http://127.0.0.1:9000/query"),
        ("APP__SESSION_ID_POLICY", "accept_rotation"),
    ]);

    let settings = load_settings_with(Some(path.as_path()), |key| {
        vars.get(key).map(|v| v.to_string())
    })
    .expect("load");

    assert_eq!(settings.endpoint, "http://127.0.0.1:9000/query");
    assert_eq!(settings.session_id_policy, SessionIdPolicy::AcceptRotation);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn session_policy_env_selects_keep_first() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |key| {
        (key == "APP__SESSION_ID_POLICY").then(|| " keep_first ".to_string())
    });
    assert_eq!(settings.session_id_policy, SessionIdPolicy::KeepFirst);
}

#[test]
fn unknown_session_policy_env_is_ignored() {
    let mut settings = ClientSettings {
        session_id_policy: SessionIdPolicy::KeepFirst,
        ..ClientSettings::default()
    };
    apply_env_overrides(&mut settings, |key| {
        (key == "APP__SESSION_ID_POLICY").then(|| "newest".to_string())
    });
    assert_eq!(settings.session_id_policy, SessionIdPolicy::KeepFirst);
}
