//! Configuration loading and root folder resolution
//!
//! Resolution order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Contact secrets (reCAPTCHA key, mail addresses) are read from the
//! environment only and never from the TOML file.

use crate::paths::{DEFAULT_FULL_RES_DIR, DEFAULT_GALLERY_BASE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "PHOTOSITE_CONFIG";
pub const ROOT_FOLDER_ENV: &str = "PHOTOSITE_ROOT";
pub const RECAPTCHA_SECRET_ENV: &str = "RECAPTCHA_SECRET_KEY";
pub const RECAPTCHA_THRESHOLD_ENV: &str = "RECAPTCHA_THRESHOLD";
pub const CONTACT_EMAIL_ENV: &str = "CONTACT_EMAIL";
pub const CONTACT_FROM_EMAIL_ENV: &str = "CONTACT_FROM_EMAIL";

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_FEATURED_FALLBACK: usize = 6;

/// Top-level TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    pub gallery: GalleryConfig,
    pub contact: ContactConfig,
    pub logging: LoggingConfig,
}

/// `[gallery]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Ordered collection identifiers shown on the homepage and browse view
    pub collections: Vec<String>,
    /// Gallery folder relative to the root folder; also the public URL path
    pub base_path: String,
    /// Full-resolution subfolder name (`full-res` or `full`)
    pub full_res_dir: String,
    /// Remote metadata store; when unset documents are read from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    /// Images shown per collection on the homepage when none are featured
    pub featured_fallback: usize,
    /// Tags pre-selected on the browse view when the query names none
    pub default_tags: Vec<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            collections: Vec::new(),
            base_path: DEFAULT_GALLERY_BASE.to_string(),
            full_res_dir: DEFAULT_FULL_RES_DIR.to_string(),
            metadata_url: None,
            featured_fallback: DEFAULT_FEATURED_FALLBACK,
            default_tags: vec![
                "travel".to_string(),
                "landscape".to_string(),
                "nature".to_string(),
            ],
        }
    }
}

/// Response body format of the contact endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

/// `[contact]` section (non-secret settings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Require and verify a reCAPTCHA v3 token
    pub bot_protection: bool,
    pub require_subject: bool,
    pub response_format: ResponseFormat,
    /// Minimum accepted score (0.0 - 1.0); `RECAPTCHA_THRESHOLD` overrides
    pub recaptcha_threshold: f64,
    pub verify_url: String,
    pub sendmail_path: PathBuf,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            bot_protection: true,
            require_subject: true,
            response_format: ResponseFormat::Json,
            recaptcha_threshold: DEFAULT_THRESHOLD,
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            sendmail_path: PathBuf::from("/usr/sbin/sendmail"),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where a loaded `TomlConfig` came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// No config file resolved
    Defaults,
    /// A config file resolved but could not be read or parsed
    Fallback { path: PathBuf, error: String },
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
            ConfigOrigin::Defaults => info!("No config file found, using defaults"),
            ConfigOrigin::Fallback { path, error } => {
                warn!("Could not load config {}: {} (using defaults)", path.display(), error)
            }
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config file if one resolves, otherwise defaults
    ///
    /// A missing or unreadable file is not fatal: compiled defaults are
    /// used. Nothing is logged here so callers can read the config before
    /// their subscriber exists; report the returned origin afterwards.
    pub fn load_or_default(cli_path: Option<&Path>) -> (Self, ConfigOrigin) {
        let Some(path) = resolve_config_path(cli_path) else {
            return (Self::default(), ConfigOrigin::Defaults);
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigOrigin::File(path)),
            Err(e) => (
                Self::default(),
                ConfigOrigin::Fallback {
                    path,
                    error: e.to_string(),
                },
            ),
        }
    }

    /// Write the config back to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Append a collection id to `gallery.collections` unless already listed
    ///
    /// Returns `true` when the list changed.
    pub fn register_collection(&mut self, collection_id: &str) -> bool {
        if self.gallery.collections.iter().any(|c| c == collection_id) {
            return false;
        }
        self.gallery.collections.push(collection_id.to_string());
        true
    }
}

/// Config file path: CLI argument, then `PHOTOSITE_CONFIG`, then the user
/// config dir, then `./photosite.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("photosite").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let local = PathBuf::from("photosite.toml");
    if local.exists() {
        return Some(local);
    }

    None
}

/// Site root folder (the directory holding `assets/`)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: current directory
    PathBuf::from(".")
}

/// Fully resolved contact endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSettings {
    /// `Some` when bot protection is enabled
    pub recaptcha: Option<RecaptchaSettings>,
    pub contact_email: String,
    pub from_email: String,
    pub require_subject: bool,
    pub response_format: ResponseFormat,
    pub sendmail_path: PathBuf,
}

#[derive(Clone, PartialEq)]
pub struct RecaptchaSettings {
    pub secret: String,
    pub threshold: f64,
    pub verify_url: String,
}

impl std::fmt::Debug for RecaptchaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaSettings")
            .field("secret", &"<redacted>")
            .field("threshold", &self.threshold)
            .field("verify_url", &self.verify_url)
            .finish()
    }
}

impl ContactSettings {
    /// Resolve from the process environment
    pub fn from_env(config: &ContactConfig) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup
    ///
    /// Missing contact/from addresses, or a missing secret while bot
    /// protection is enabled, is a configuration error.
    pub fn from_lookup<F>(config: &ContactConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let contact_email = non_empty(CONTACT_EMAIL_ENV);
        if contact_email.is_none() {
            missing.push(CONTACT_EMAIL_ENV);
        }
        let from_email = non_empty(CONTACT_FROM_EMAIL_ENV);
        if from_email.is_none() {
            missing.push(CONTACT_FROM_EMAIL_ENV);
        }

        let recaptcha = if config.bot_protection {
            let secret = non_empty(RECAPTCHA_SECRET_ENV);
            if secret.is_none() {
                missing.push(RECAPTCHA_SECRET_ENV);
            }
            let threshold = match non_empty(RECAPTCHA_THRESHOLD_ENV) {
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                    Error::Config(format!("{} is not a number: {:?}", RECAPTCHA_THRESHOLD_ENV, raw))
                })?,
                None => config.recaptcha_threshold,
            };
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::Config(format!(
                    "reCAPTCHA threshold must be between 0.0 and 1.0, got {}",
                    threshold
                )));
            }
            secret.map(|secret| RecaptchaSettings {
                secret,
                threshold,
                verify_url: config.verify_url.clone(),
            })
        } else {
            None
        };

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            recaptcha,
            contact_email: contact_email.unwrap_or_default(),
            from_email: from_email.unwrap_or_default(),
            require_subject: config.require_subject,
            response_format: config.response_format,
            sendmail_path: config.sendmail_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_contact_settings_complete() {
        let settings = ContactSettings::from_lookup(
            &ContactConfig::default(),
            lookup(&[
                (RECAPTCHA_SECRET_ENV, "s3cret"),
                (CONTACT_EMAIL_ENV, "owner@example.com"),
                (CONTACT_FROM_EMAIL_ENV, "web@example.com"),
            ]),
        )
        .unwrap();

        let recaptcha = settings.recaptcha.unwrap();
        assert_eq!(recaptcha.secret, "s3cret");
        assert_eq!(recaptcha.threshold, DEFAULT_THRESHOLD);
        assert_eq!(settings.contact_email, "owner@example.com");
    }

    #[test]
    fn test_contact_settings_missing_values_listed() {
        let err = ContactSettings::from_lookup(&ContactConfig::default(), lookup(&[]))
            .unwrap_err()
            .to_string();
        assert!(err.contains(CONTACT_EMAIL_ENV));
        assert!(err.contains(CONTACT_FROM_EMAIL_ENV));
        assert!(err.contains(RECAPTCHA_SECRET_ENV));
    }

    #[test]
    fn test_secret_not_required_without_bot_protection() {
        let config = ContactConfig {
            bot_protection: false,
            ..Default::default()
        };
        let settings = ContactSettings::from_lookup(
            &config,
            lookup(&[
                (CONTACT_EMAIL_ENV, "owner@example.com"),
                (CONTACT_FROM_EMAIL_ENV, "web@example.com"),
            ]),
        )
        .unwrap();
        assert!(settings.recaptcha.is_none());
    }

    #[test]
    fn test_threshold_env_overrides_toml() {
        let settings = ContactSettings::from_lookup(
            &ContactConfig::default(),
            lookup(&[
                (RECAPTCHA_SECRET_ENV, "s"),
                (RECAPTCHA_THRESHOLD_ENV, "0.7"),
                (CONTACT_EMAIL_ENV, "a@example.com"),
                (CONTACT_FROM_EMAIL_ENV, "b@example.com"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.recaptcha.unwrap().threshold, 0.7);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result = ContactSettings::from_lookup(
            &ContactConfig::default(),
            lookup(&[
                (RECAPTCHA_SECRET_ENV, "s"),
                (RECAPTCHA_THRESHOLD_ENV, "1.5"),
                (CONTACT_EMAIL_ENV, "a@example.com"),
                (CONTACT_FROM_EMAIL_ENV, "b@example.com"),
            ]),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let settings = RecaptchaSettings {
            secret: "hunter2".into(),
            threshold: 0.5,
            verify_url: DEFAULT_VERIFY_URL.into(),
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_register_collection_is_idempotent() {
        let mut config = TomlConfig::default();
        assert!(config.register_collection("japan-2025"));
        assert!(!config.register_collection("japan-2025"));
        assert_eq!(config.gallery.collections, vec!["japan-2025".to_string()]);
    }
}
