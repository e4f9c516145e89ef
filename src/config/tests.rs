use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.connection.url, "ws://localhost:8008");
    assert_eq!(settings.connection.vpn, "default");
    assert!(settings.connection.username.is_empty());
    assert!(settings.connection.client_name.starts_with("subscope-"));
    assert_eq!(settings.session.activity_capacity, 500);
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.topic_builder.domain, "workshop");
    assert_eq!(settings.topic_builder.noun, "hello-message");

    let prop3 = &settings.topic_builder.prop3;
    assert_eq!(prop3.len(), 4);
    let n: u16 = prop3.parse().unwrap();
    assert!((1..=9999).contains(&n));
}

#[test]
fn test_missing_connection_fields() {
    let mut settings = Settings::default();
    assert_eq!(
        settings.connection.missing_fields(),
        vec!["username", "password"]
    );

    settings.connection.username = "demo".to_string();
    settings.connection.password = "secret".to_string();
    settings.connection.url = "  ".to_string();
    assert_eq!(settings.connection.missing_fields(), vec!["url"]);
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    // load_config reads config/default.toml relative to the working directory
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [connection]
        url = "wss://broker.example:443"
        username = "demo"

        [session]
        activity_capacity = 25

        [topic_builder]
        domain = "garage"
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();

    // restore cwd before asserting so a failure does not leak into other tests
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.connection.url, "wss://broker.example:443");
    assert_eq!(cfg.connection.username, "demo");
    assert_eq!(cfg.connection.vpn, "default");
    assert_eq!(cfg.session.activity_capacity, 25);
    assert_eq!(cfg.topic_builder.domain, "garage");
    assert_eq!(cfg.topic_builder.verb, "announced");
}

#[test]
#[serial]
fn test_load_config_from_environment() {
    temp_env::with_vars(
        [
            ("SUBSCOPE_CONNECTION__VPN", Some("lab")),
            ("SUBSCOPE_CONNECTION__PASSWORD", Some("hunter2")),
            ("SUBSCOPE_LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.connection.vpn, "lab");
            assert_eq!(cfg.connection.password, "hunter2");
            assert_eq!(cfg.logging.level, "debug");
        },
    );
}
