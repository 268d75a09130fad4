use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "campusgig.toml",
    "config/campusgig.toml",
    "crates/config/campusgig.toml",
    "../campusgig.toml",
    "../config/campusgig.toml",
    "../crates/config/campusgig.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub otp: OtpConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://campusgig.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Local policy for OTP phone verification. The SMS delivery itself is an
/// external collaborator; these knobs only govern the session bookkeeping
/// layered on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    #[serde(default = "OtpConfig::default_expiry")]
    pub expiry_seconds: u64,
    #[serde(default = "OtpConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "OtpConfig::default_resend_interval")]
    pub resend_interval_seconds: u64,
}

impl OtpConfig {
    const fn default_expiry() -> u64 {
        300
    }

    const fn default_max_attempts() -> u32 {
        3
    }

    const fn default_resend_interval() -> u64 {
        60
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: Self::default_expiry(),
            max_attempts: Self::default_max_attempts(),
            resend_interval_seconds: Self::default_resend_interval(),
        }
    }
}

/// Media upload limits and the blob storage root.
///
/// ```
/// use campusgig_config::MediaConfig;
///
/// let media = MediaConfig::default();
/// assert_eq!(media.max_image_bytes, 10 * 1024 * 1024);
/// assert_eq!(media.max_video_seconds, 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "MediaConfig::default_blob_root")]
    pub blob_root: String,
    #[serde(default = "MediaConfig::default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "MediaConfig::default_max_media_bytes")]
    pub max_media_bytes: u64,
    #[serde(default = "MediaConfig::default_max_video_seconds")]
    pub max_video_seconds: u64,
}

impl MediaConfig {
    fn default_blob_root() -> String {
        "blobs".to_string()
    }

    const fn default_max_image_bytes() -> u64 {
        10 * 1024 * 1024
    }

    const fn default_max_media_bytes() -> u64 {
        5 * 1024 * 1024
    }

    const fn default_max_video_seconds() -> u64 {
        15
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            blob_root: Self::default_blob_root(),
            max_image_bytes: Self::default_max_image_bytes(),
            max_media_bytes: Self::default_max_media_bytes(),
            max_video_seconds: Self::default_max_video_seconds(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use campusgig_config::load;
///
/// std::env::remove_var("CAMPUSGIG_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default(
            "otp.expiry_seconds",
            i64::try_from(defaults.otp.expiry_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("otp.max_attempts", i64::from(defaults.otp.max_attempts))
        .unwrap()
        .set_default(
            "otp.resend_interval_seconds",
            i64::try_from(defaults.otp.resend_interval_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("media.blob_root", defaults.media.blob_root.clone())
        .unwrap()
        .set_default(
            "media.max_image_bytes",
            i64::try_from(defaults.media.max_image_bytes).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "media.max_media_bytes",
            i64::try_from(defaults.media.max_media_bytes).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "media.max_video_seconds",
            i64::try_from(defaults.media.max_video_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("CAMPUSGIG").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("CAMPUSGIG_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via CAMPUSGIG_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_load_without_files() {
        std::env::remove_var("CAMPUSGIG_CONFIG");
        let config = load().unwrap();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.otp.max_attempts, 3);
        assert_eq!(config.otp.resend_interval_seconds, 60);
        assert_eq!(config.media.max_media_bytes, 5 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn environment_overrides_win() {
        std::env::remove_var("CAMPUSGIG_CONFIG");
        std::env::set_var("CAMPUSGIG__DATABASE__MAX_CONNECTIONS", "3");
        std::env::set_var("CAMPUSGIG__OTP__EXPIRY_SECONDS", "120");

        let config = load().unwrap();
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.otp.expiry_seconds, 120);

        std::env::remove_var("CAMPUSGIG__DATABASE__MAX_CONNECTIONS");
        std::env::remove_var("CAMPUSGIG__OTP__EXPIRY_SECONDS");
    }

    #[test]
    #[serial]
    fn config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campusgig.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"sqlite://from-file.db\"\nmax_connections = 2\n",
        )
        .unwrap();

        std::env::set_var("CAMPUSGIG_CONFIG", &path);
        let config = load().unwrap();
        assert_eq!(config.database.url, "sqlite://from-file.db");
        assert_eq!(config.database.max_connections, 2);
        std::env::remove_var("CAMPUSGIG_CONFIG");
    }
}
