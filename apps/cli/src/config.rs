//! Local configuration: `voxbridge/config.json` under the platform config dir.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use voxbridge_client::{ClientConfig, DEFAULT_SERVER_URL, RetryPolicy};
use voxbridge_protocol::constants::{WS_PING_PERIOD, WS_PONG_WAIT};
use voxbridge_session::ControllerOptions;
use voxbridge_stream::StreamOptions;
use voxbridge_upload::UploadOptions;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "VOXBRIDGE_API_KEY";

const MIB: u64 = 1024 * 1024;
const MAX_PING_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub api_key: String,
    /// Zero disables the timeout.
    pub request_timeout_secs: u64,
    pub chunk_size_mib: u64,
    pub chunked_threshold_mib: u64,
    pub stop_retries: u32,
    pub stop_retry_delay_ms: u64,
    /// Keepalive ping period on the result stream.
    pub ping_interval_secs: u64,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            api_key: String::new(),
            request_timeout_secs: 0,
            chunk_size_mib: 5,
            chunked_threshold_mib: 5,
            stop_retries: 3,
            stop_retry_delay_ms: 1000,
            ping_interval_secs: WS_PING_PERIOD.as_secs(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads `path`. A missing file yields the defaults; so does one that
    /// does not parse, with a warning.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = create_private(path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Replaces the API key with `env_key` when it is set and non-empty.
    pub fn with_api_key_override(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server_url.clone(),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            chunk_size: self.chunk_size_mib.max(1).saturating_mul(MIB),
            chunked_threshold: self.chunked_threshold_mib.saturating_mul(MIB),
        }
    }

    /// Ping period clamped to 1 s..=1 h; the silence allowance is at least
    /// four ping periods.
    pub fn stream_options(&self) -> StreamOptions {
        let ping_period = Duration::from_secs(self.ping_interval_secs.clamp(1, MAX_PING_SECS));
        StreamOptions {
            ping_period,
            pong_wait: WS_PONG_WAIT.max(ping_period.saturating_mul(4)),
            ..Default::default()
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            upload: self.upload_options(),
            stream: self.stream_options(),
            stop_retry: RetryPolicy {
                max_retries: self.stop_retries,
                delay: Duration::from_millis(self.stop_retry_delay_ms),
            },
            ..Default::default()
        }
    }
}

/// `<config dir>/voxbridge/config.json`.
pub fn default_path() -> PathBuf {
    config_base_dir().join("voxbridge").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}

/// Opens `path` for writing, truncated, readable by the owner only. The
/// mode is set at creation and re-applied to a file that already existed.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }
    #[cfg(not(unix))]
    {
        options.open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_url, "http://localhost:5000");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key":"sk-1","stop_retries":5}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.stop_retries, 5);
        assert_eq!(config.chunk_size_mib, 5);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_key: "sk-2".into(),
            request_timeout_secs: 30,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "a much longer previous body than the new one will be").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        Config::default().save(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn huge_sizes_saturate() {
        let config = Config {
            chunk_size_mib: u64::MAX,
            chunked_threshold_mib: u64::MAX / 2,
            ..Default::default()
        };
        let upload = config.upload_options();
        assert_eq!(upload.chunk_size, u64::MAX);
        assert_eq!(upload.chunked_threshold, u64::MAX);
    }

    #[test]
    fn stream_options_stay_valid() {
        let default = Config::default().stream_options();
        assert_eq!(default, StreamOptions::default());

        for secs in [0, 1, 30, 120, u64::MAX] {
            let config = Config {
                ping_interval_secs: secs,
                ..Default::default()
            };
            let options = config.stream_options();
            assert!(options.validate().is_ok(), "{secs}: {options:?}");
        }
        let slow = Config {
            ping_interval_secs: 120,
            ..Default::default()
        };
        assert_eq!(slow.stream_options().pong_wait, Duration::from_secs(480));

        let absurd = Config {
            ping_interval_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(absurd.stream_options().ping_period, Duration::from_secs(MAX_PING_SECS));
    }

    #[test]
    fn env_key_wins_unless_blank() {
        let config = Config {
            api_key: "stored".into(),
            ..Default::default()
        };
        assert_eq!(
            config.clone().with_api_key_override(Some("env".into())).api_key,
            "env"
        );
        assert_eq!(
            config.clone().with_api_key_override(Some("  ".into())).api_key,
            "stored"
        );
        assert_eq!(config.with_api_key_override(None).api_key, "stored");
    }

    #[test]
    fn derived_options() {
        let config = Config {
            request_timeout_secs: 0,
            chunk_size_mib: 0,
            chunked_threshold_mib: 8,
            stop_retries: 2,
            stop_retry_delay_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.client_config().timeout, None);

        let upload = config.upload_options();
        assert_eq!(upload.chunk_size, MIB);
        assert_eq!(upload.chunked_threshold, 8 * MIB);

        let options = config.controller_options();
        assert_eq!(options.stop_retry.max_retries, 2);
        assert_eq!(options.stop_retry.delay, Duration::from_millis(250));
    }
}
