//! Unit tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing TOML files SHALL NOT cause termination (defaults are used)
//! - Priority order for root folder resolution (CLI > ENV > TOML > default)
//! - Contact secrets resolved from the process environment
//! - Round-trip of collection registration through the config file
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PHOTOSITE_* or contact variables are marked with
//! #[serial] so they run sequentially, not in parallel.

use photosite_common::config::{
    resolve_root_folder, ConfigOrigin, ContactConfig, ContactSettings, ResponseFormat, TomlConfig,
    CONTACT_EMAIL_ENV, CONTACT_FROM_EMAIL_ENV, RECAPTCHA_SECRET_ENV, RECAPTCHA_THRESHOLD_ENV,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

fn clear_contact_env() {
    env::remove_var(RECAPTCHA_SECRET_ENV);
    env::remove_var(RECAPTCHA_THRESHOLD_ENV);
    env::remove_var(CONTACT_EMAIL_ENV);
    env::remove_var(CONTACT_FROM_EMAIL_ENV);
}

#[test]
fn test_full_toml_file_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/photosite"
site_title = "Example Photography"

[gallery]
collections = ["big-bend-2025", "japan-2025"]
full_res_dir = "full"
default_tags = []

[contact]
bot_protection = false
require_subject = false
response_format = "text"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/photosite")));
    assert_eq!(config.site_title.as_deref(), Some("Example Photography"));
    assert_eq!(config.gallery.collections, vec!["big-bend-2025", "japan-2025"]);
    assert_eq!(config.gallery.full_res_dir, "full");
    assert!(config.gallery.default_tags.is_empty());
    // Unspecified keys keep their defaults
    assert_eq!(config.gallery.base_path, "assets/images/gallery");
    assert_eq!(config.gallery.featured_fallback, 6);
    assert!(!config.contact.bot_protection);
    assert!(!config.contact.require_subject);
    assert_eq!(config.contact.response_format, ResponseFormat::Text);
    assert_eq!(config.contact.recaptcha_threshold, 0.5);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = Path::new("/nonexistent/photosite.toml");
    let (config, origin) = TomlConfig::load_or_default(Some(path));
    assert_eq!(config, TomlConfig::default());
    assert!(matches!(origin, ConfigOrigin::Fallback { path: p, .. } if p.as_path() == path));
}

#[test]
fn test_invalid_toml_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    assert!(TomlConfig::load(&path).is_err());
    let (config, origin) = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config, TomlConfig::default());
    assert!(matches!(origin, ConfigOrigin::Fallback { .. }));
}

#[test]
fn test_register_and_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = TomlConfig::default();
    config.register_collection("big-bend-2025");
    config.register_collection("japan-2025");
    config.save(&path).unwrap();

    let reloaded = TomlConfig::load(&path).unwrap();
    assert_eq!(
        reloaded.gallery.collections,
        vec!["big-bend-2025".to_string(), "japan-2025".to_string()]
    );
}

#[test]
#[serial]
fn test_root_folder_cli_takes_precedence() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/photosite-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/photosite-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/photosite-cli")), &toml);
    assert_eq!(root, PathBuf::from("/tmp/photosite-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_env_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/photosite-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/photosite-toml")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/photosite-env"));

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/photosite-toml"));
}

#[test]
#[serial]
fn test_root_folder_default_is_current_dir() {
    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(
        resolve_root_folder(None, &TomlConfig::default()),
        PathBuf::from(".")
    );
}

#[test]
#[serial]
fn test_contact_settings_from_env() {
    clear_contact_env();
    env::set_var(RECAPTCHA_SECRET_ENV, "secret-key");
    env::set_var(CONTACT_EMAIL_ENV, "owner@example.com");
    env::set_var(CONTACT_FROM_EMAIL_ENV, "noreply@example.com");

    let settings = ContactSettings::from_env(&ContactConfig::default()).unwrap();
    assert_eq!(settings.contact_email, "owner@example.com");
    assert_eq!(settings.from_email, "noreply@example.com");
    assert!(settings.require_subject);
    assert_eq!(settings.recaptcha.unwrap().secret, "secret-key");

    clear_contact_env();
}

#[test]
#[serial]
fn test_contact_settings_missing_env_is_config_error() {
    clear_contact_env();
    env::set_var(CONTACT_EMAIL_ENV, "owner@example.com");

    let result = ContactSettings::from_env(&ContactConfig::default());
    assert!(matches!(result, Err(photosite_common::Error::Config(_))));

    clear_contact_env();
}
