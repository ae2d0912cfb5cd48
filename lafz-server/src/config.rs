//! Configuration for lafz-server
//!
//! Settings are resolved once at startup in this order:
//! 1. Command-line argument
//! 2. Environment variable (`LAFZ_*`, handled by clap)
//! 3. TOML config file (`--config`, else `<config dir>/lafz/lafz-server.toml`)
//! 4. Compiled default

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lafz_common::{Error, RangePolicy, Result};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8004;
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 128;
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

/// Command-line / environment overrides, shared by both binaries
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to TOML configuration file
    #[arg(long, env = "LAFZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "LAFZ_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LAFZ_PORT")]
    pub port: Option<u16>,

    /// Path to the corpus snapshot (JSON)
    #[arg(long = "corpus", env = "LAFZ_CORPUS")]
    pub corpus_path: Option<PathBuf>,

    /// Directory holding per-request workspaces
    #[arg(long, env = "LAFZ_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Maximum upload size in MB
    #[arg(long = "max-upload-size", env = "LAFZ_MAX_UPLOAD_SIZE")]
    pub max_upload_size_mb: Option<usize>,

    /// Device passed to the aligner (cpu, cuda)
    #[arg(long, env = "LAFZ_DEVICE")]
    pub device: Option<String>,

    /// Language code passed to the aligner
    #[arg(long, env = "LAFZ_LANGUAGE")]
    pub language: Option<String>,

    /// Ask the aligner to romanize the transcript
    #[arg(long, env = "LAFZ_ROMANIZE")]
    pub romanize: Option<bool>,

    /// Sample rate of the transcoded audio
    #[arg(long, env = "LAFZ_SAMPLE_RATE")]
    pub sample_rate: Option<u32>,

    /// Transcoder executable
    #[arg(long = "transcoder", env = "LAFZ_TRANSCODER")]
    pub transcoder_binary: Option<String>,

    /// Aligner executable
    #[arg(long = "aligner", env = "LAFZ_ALIGNER")]
    pub aligner_binary: Option<String>,

    /// Per-invocation timeout for external tools, in seconds
    #[arg(long = "tool-timeout", env = "LAFZ_TOOL_TIMEOUT")]
    pub tool_timeout_secs: Option<u64>,

    /// Handling of unknown or reversed ranges (reject, skip)
    #[arg(long, env = "LAFZ_RANGE_POLICY")]
    pub range_policy: Option<RangePolicy>,
}

/// Configuration file contents; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub corpus_path: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub max_upload_size_mb: Option<usize>,
    pub device: Option<String>,
    pub language: Option<String>,
    pub romanize: Option<bool>,
    pub sample_rate: Option<u32>,
    pub transcoder_binary: Option<String>,
    pub aligner_binary: Option<String>,
    pub tool_timeout_secs: Option<u64>,
    pub range_policy: Option<RangePolicy>,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Platform config location, e.g. `~/.config/lafz/lafz-server.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lafz").join("lafz-server.toml"))
    }

    /// Load the explicit file, else the default file if it exists
    ///
    /// Returns the path that was read along with its contents. An explicit
    /// path that cannot be read is an error; a missing default file just
    /// means compiled defaults apply.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, Self)>> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let config = Self::load(&path)?;
        Ok(Some((path, config)))
    }
}

/// Options for invoking the aligner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignerSettings {
    pub binary: String,
    pub device: String,
    pub language: String,
    pub romanize: bool,
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub corpus_path: PathBuf,
    pub work_dir: PathBuf,
    pub max_upload_size_mb: usize,
    pub transcoder_binary: String,
    pub sample_rate: u32,
    pub aligner: AlignerSettings,
    pub tool_timeout_secs: u64,
    pub range_policy: RangePolicy,
    pub log_level: String,
    /// TOML file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Resolve from command line, environment and config file
    ///
    /// Runs before the tracing subscriber exists; callers log
    /// `config_file` once logging is up.
    pub fn load(args: ConfigArgs) -> Result<Self> {
        match TomlConfig::discover(args.config.as_deref())? {
            Some((path, file)) => {
                let mut config = Self::resolve(args, file)?;
                config.config_file = Some(path);
                Ok(config)
            }
            None => Self::resolve(args, TomlConfig::default()),
        }
    }

    pub fn resolve(args: ConfigArgs, file: TomlConfig) -> Result<Self> {
        let config = Self {
            host: args.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            corpus_path: args
                .corpus_path
                .or(file.corpus_path)
                .unwrap_or_else(|| PathBuf::from("data.json")),
            work_dir: args
                .work_dir
                .or(file.work_dir)
                .unwrap_or_else(|| PathBuf::from("data").join("requests")),
            max_upload_size_mb: args
                .max_upload_size_mb
                .or(file.max_upload_size_mb)
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB),
            transcoder_binary: args
                .transcoder_binary
                .or(file.transcoder_binary)
                .unwrap_or_else(|| "ffmpeg".to_string()),
            sample_rate: args
                .sample_rate
                .or(file.sample_rate)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            aligner: AlignerSettings {
                binary: args
                    .aligner_binary
                    .or(file.aligner_binary)
                    .unwrap_or_else(|| "ctc-forced-aligner".to_string()),
                device: args.device.or(file.device).unwrap_or_else(|| "cpu".to_string()),
                language: args
                    .language
                    .or(file.language)
                    .unwrap_or_else(|| "ara".to_string()),
                romanize: args.romanize.or(file.romanize).unwrap_or(true),
            },
            tool_timeout_secs: args
                .tool_timeout_secs
                .or(file.tool_timeout_secs)
                .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS),
            range_policy: args.range_policy.or(file.range_policy).unwrap_or_default(),
            log_level: file.logging.level,
            config_file: None,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_size_mb == 0 {
            return Err(Error::Config("max_upload_size_mb must be positive".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be positive".to_string()));
        }
        if self.tool_timeout_secs == 0 {
            return Err(Error::Config("tool_timeout_secs must be positive".to_string()));
        }
        if self.transcoder_binary.trim().is_empty() || self.aligner.binary.trim().is_empty() {
            return Err(Error::Config("tool binaries must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1 << 20)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", self.host, self.port, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve(ConfigArgs::default(), TomlConfig::default()).unwrap();

        assert_eq!(config.port, 8004);
        assert_eq!(config.corpus_path, PathBuf::from("data.json"));
        assert_eq!(config.work_dir, PathBuf::from("data").join("requests"));
        assert_eq!(config.max_upload_bytes(), 128 << 20);
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.aligner.device, "cpu");
        assert_eq!(config.aligner.language, "ara");
        assert!(config.aligner.romanize);
        assert_eq!(config.range_policy, RangePolicy::Reject);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.socket_addr().unwrap().port(), 8004);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file: TomlConfig = toml::from_str(
            r#"
            port = 9000
            device = "cuda"
            range_policy = "skip"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let config = ServerConfig::resolve(ConfigArgs::default(), file).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.aligner.device, "cuda");
        assert_eq!(config.range_policy, RangePolicy::Skip);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_args_override_file() {
        let file: TomlConfig = toml::from_str("port = 9000\nromanize = true").unwrap();
        let args = ConfigArgs {
            port: Some(9100),
            romanize: Some(false),
            ..Default::default()
        };

        let config = ServerConfig::resolve(args, file).unwrap();
        assert_eq!(config.port, 9100);
        assert!(!config.aligner.romanize);
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        assert!(toml::from_str::<TomlConfig>("prot = 1").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = ConfigArgs {
            tool_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            ServerConfig::resolve(args, TomlConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(TomlConfig::discover(Some(&missing)).is_err());
    }

    #[test]
    fn test_discover_reports_path_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lafz-server.toml");
        std::fs::write(&path, "port = 9300").unwrap();

        let (found, file) = TomlConfig::discover(Some(&path)).unwrap().unwrap();
        assert_eq!(found, path);
        assert_eq!(file.port, Some(9300));
    }
}
