//! Layered service configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. YAML file (`--config` or `COURSES_CONFIG`)
//! 3. environment variables prefixed `COURSES__`, nested keys split on `__`
//!    (for example `COURSES__LOGGING__LEVEL=debug`)
//! 4. CLI overrides applied by the binary

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::server::ListenConfig;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "COURSES__";

/// Environment variable naming the YAML config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "COURSES_CONFIG";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:50051";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoursesConfig {
    /// `host:port` for TCP or `uds:///path/to/socket` for a Unix domain socket.
    pub listen_addr: String,
    /// Load the mock data set on startup.
    pub seed: bool,
    pub logging: LoggingConfig,
    pub plugin: PluginConfig,
    pub health: HealthConfig,
}

impl Default for CoursesConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            seed: true,
            logging: LoggingConfig::default(),
            plugin: PluginConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset, e.g. `info` or `courses=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Router plugin handshake settings.
///
/// With `handshake` enabled the bound address is announced on stdout as
/// `<core>|<app>|<network>|<address>|grpc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub handshake: bool,
    pub core_protocol_version: u32,
    pub app_protocol_version: u32,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            handshake: false,
            core_protocol_version: 1,
            app_protocol_version: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Serve `grpc.health.v1.Health` next to the courses service.
    pub enabled: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CoursesConfig {
    /// Load defaults, then the optional YAML file, then `COURSES__*` variables.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or any source fails to
    /// deserialize.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")
    }

    /// Parsed listen address.
    ///
    /// # Errors
    /// Returns an error if `listen_addr` is malformed or unsupported on this platform.
    pub fn listen(&self) -> anyhow::Result<ListenConfig> {
        self.listen_addr.parse()
    }

    /// Check everything that can be checked without binding.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen()?;
        tracing_subscriber::EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("invalid logging.level '{}'", self.logging.level))?;
        Ok(())
    }

    /// Render as YAML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let cfg = temp_env::with_vars_unset(
            ["COURSES__LISTEN_ADDR", "COURSES__SEED", "COURSES__LOGGING__LEVEL"],
            || CoursesConfig::load(None).unwrap(),
        );
        assert_eq!(cfg, CoursesConfig::default());
        assert!(cfg.seed);
        assert!(cfg.health.enabled);
        assert!(!cfg.plugin.handshake);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let file = write_yaml(
            r"
listen_addr: 0.0.0.0:6000
seed: false
logging:
  format: json
plugin:
  handshake: true
",
        );

        let cfg = temp_env::with_vars_unset(["COURSES__LISTEN_ADDR", "COURSES__SEED"], || {
            CoursesConfig::load(Some(file.path())).unwrap()
        });
        assert_eq!(cfg.listen_addr, "0.0.0.0:6000");
        assert!(!cfg.seed);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.plugin.handshake);
        assert_eq!(cfg.plugin.core_protocol_version, 1);
    }

    #[test]
    fn env_overrides_yaml() {
        let file = write_yaml("listen_addr: 0.0.0.0:6000\n");

        let cfg = temp_env::with_vars(
            [
                ("COURSES__LISTEN_ADDR", Some("127.0.0.1:7000")),
                ("COURSES__LOGGING__LEVEL", Some("debug")),
            ],
            || CoursesConfig::load(Some(file.path())).unwrap(),
        );
        assert_eq!(cfg.listen_addr, "127.0.0.1:7000");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = CoursesConfig::load(Some(Path::new("/nonexistent/courses.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn validate_rejects_bad_listen_addr() {
        let cfg = CoursesConfig {
            listen_addr: "not-an-address".to_owned(),
            ..CoursesConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(CoursesConfig::default().validate().is_ok());
    }

    #[test]
    fn yaml_rendering_names_sections() {
        let yaml = CoursesConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("listen_addr"));
        assert!(yaml.contains("logging"));
        assert!(yaml.contains("plugin"));
    }
}
