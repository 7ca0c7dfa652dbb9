use std::io::Write;
use std::time::Duration;

use fintrack_sdk::config::{DEFAULT_CURRENCY, DEFAULT_RETRY_ATTEMPTS};
use fintrack_sdk::{Config, FinTrack, FinTrackError, MemoryStore};

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.currency, DEFAULT_CURRENCY);
    assert_eq!(config.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    assert!(matches!(config.validate(), Err(FinTrackError::Config(_))));
}

#[test]
fn test_from_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"url": "https://demo.supabase.co/", "anon_key": "anon", "timeout_secs": 5, "currency": "EUR"}}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.currency, "EUR");
    assert_eq!(config.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    config.validate().unwrap();
    assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
}

#[test]
fn test_from_file_rejects_bad_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "url = nope").unwrap();
    assert!(matches!(
        Config::from_file(file.path()),
        Err(FinTrackError::Config(_))
    ));
}

#[test]
fn test_missing_key_fails_validation() {
    let config = Config {
        url: "https://demo.supabase.co".into(),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("FINTRACK_ANON_KEY"));
}

#[test]
fn test_builder_needs_connection_for_http_parts() {
    let err = FinTrack::builder().build().err().unwrap();
    assert!(matches!(err, FinTrackError::Config(_)));
}

#[test]
fn test_builder_with_http_parts() {
    let ft = FinTrack::builder()
        .url("https://demo.supabase.co")
        .anon_key("anon")
        .store(std::sync::Arc::new(MemoryStore::new()))
        .currency("EUR")
        .build()
        .unwrap();
    assert_eq!(ft.config().currency, "EUR");
    assert!(ft.to_string().starts_with("FinTrack(url=https://demo.supabase.co"));
}
