use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub recognition: RecognitionConfig,
    pub audio: AudioConfig,
    pub sync: SyncConfig,
    pub silence: SilenceConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// ACRCloud identification host for your project's region.
    pub host: String,
    pub access_key: String,
    pub access_secret: String,
    /// Seconds between recognition polls.
    pub interval_secs: u64,
    /// Length of each captured sample.
    pub record_secs: u32,
    /// Capture sample rate; 16 kHz is enough for fingerprinting.
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name (see `lyrid devices`); None uses the default.
    pub device: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Default manual correction applied when a song starts.
    pub manual_offset_ms: i64,
    /// Keep the operator's correction across song changes instead of
    /// resetting it to the default.
    pub carry_offset: bool,
    /// Step size for the +/- runtime keys.
    pub offset_step_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    /// RMS level (i16 scale) below which a capture counts as silent.
    pub rms_threshold: f64,
    /// Consecutive silent polls before the session goes back to Idle.
    pub debounce_polls: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UiConfig {
    /// Compact layout: current line only, no context lines.
    pub compact: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            host: "identify-eu-west-1.acrcloud.com".to_string(),
            access_key: String::new(),
            access_secret: String::new(),
            interval_secs: 45,
            record_secs: 5,
            sample_rate: 16_000,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            manual_offset_ms: 0,
            carry_offset: false,
            offset_step_ms: 500,
        }
    }
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            rms_threshold: 500.0,
            debounce_polls: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "lyrid", "lyrid");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lyrid"));
        Self { data_dir }
    }
}

impl RecognitionConfig {
    /// Missing credentials are the one startup-fatal misconfiguration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.access_key.is_empty() || self.access_secret.is_empty() {
            anyhow::bail!(
                "ACRCloud credentials not configured; set recognition.access_key and \
                 recognition.access_secret in {}",
                default_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
        }
        Ok(())
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "lyrid", "lyrid").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        // First run: write the defaults so the credential fields are there
        // to fill in.
        let cfg = Config::default();
        save(&cfg, Some(&path))?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
