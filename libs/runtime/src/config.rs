use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

const DEFAULT_SUBDIR: &str = ".apikit";

/// Application configuration: typed global sections plus a per-module bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Per-subsystem logging; `None` keeps the built-in console logger.
    pub logging: Option<LoggingConfig>,
    /// Directory of `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// module name → arbitrary YAML/JSON value, decoded by the module itself.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Normalized to an absolute path on load.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Subsystem name → logging settings. `"default"` catches every target without its own entry.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Section {
    pub console_level: String,
    /// Log file, relative to `server.home_dir` unless absolute. Empty disables the file.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8087,
            timeout_sec: 0,
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/apikit.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// defaults → YAML file → `APP__*` environment, then home dir normalization and
    /// `modules_dir` merge.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file '{}' not found", path.display());
        }

        // Optional sections stay None unless YAML or env provide them.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // APP__SERVER__PORT=9000 → server.port
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in '{}'", path.display()))?;

        normalize_home_dir_inplace(&mut config.server)?;
        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, &dir)
                .with_context(|| format!("failed to merge module files from '{dir}'"))?;
        }
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut config = Self::default();
                normalize_home_dir_inplace(&mut config.server)?;
                Ok(config)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    /// Decode one module's section; a missing section yields `T::default()`.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid config for module '{name}'")),
            None => Ok(T::default()),
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if args.verbose == 0 {
            return;
        }
        let level = if args.verbose == 1 { "debug" } else { "trace" };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }
}

/// Global command line flags, decoupled from the binary's `clap` types.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let configured = Some(server.home_dir.clone()).filter(|s| !s.trim().is_empty());
    let resolved: PathBuf = resolve_home_dir(configured, DEFAULT_SUBDIR, true)
        .context("failed to resolve server.home_dir")?;
    server.home_dir = resolved.to_string_lossy().into_owned();
    Ok(())
}

fn merge_module_files(bag: &mut HashMap<String, serde_json::Value>, dir: &str) -> Result<()> {
    let dir = Path::new(dir);
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "modules_dir does not exist, skipping");
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_yaml {
            continue;
        }
        let raw = std::fs::read_to_string(&path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in '{}'", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn is_normalized_path(p: &str) -> bool {
        PathBuf::from(p).is_absolute() && !p.starts_with('~')
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default)]
        schema_file: String,
        #[serde(default)]
        prefix: Option<String>,
    }

    #[test]
    fn default_config_structure() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8087);
        assert_eq!(config.server.home_dir, "");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "info");
        assert_eq!(logging["default"].file, "logs/apikit.log");
        assert!(config.modules.is_empty());
    }

    #[test]
    fn load_layered_reads_yaml_and_normalizes_home_dir() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home");
        let cfg_path = tmp.path().join("cfg.yaml");
        let yaml = format!(
            r#"
server:
  home_dir: "{}"
  host: "0.0.0.0"
  port: 9090
  timeout_sec: 30
logging:
  default:
    console_level: debug
    file: "logs/default.log"
modules:
  apikit:
    schema_file: "model.yaml"
    prefix: "/v1"
"#,
            home.to_string_lossy().replace('\\', "/")
        );
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(is_normalized_path(&config.server.home_dir));
        assert!(home.is_dir());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timeout_sec, 30);
        assert_eq!(config.logging.unwrap()["default"].file, "logs/default.log");
    }

    #[test]
    fn minimal_yaml_leaves_optional_sections_empty() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        let home = tmp.path().join("h").to_string_lossy().replace('\\', "/");
        fs::write(
            &cfg_path,
            format!("server:\n  home_dir: \"{home}\"\n  host: localhost\n  port: 8080\n"),
        )
        .unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert_eq!(config.server.host, "localhost");
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(AppConfig::load_layered(tmp.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn modules_dir_files_are_merged() {
        let tmp = tempdir().unwrap();
        let modules_dir = tmp.path().join("modules");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::write(modules_dir.join("apikit.yaml"), "schema_file: blog.yaml\n").unwrap();
        fs::write(modules_dir.join("notes.txt"), "ignored").unwrap();

        let cfg_path = tmp.path().join("cfg.yaml");
        let yaml = format!(
            "server:\n  home_dir: \"{}\"\n  host: 127.0.0.1\n  port: 8087\nmodules_dir: \"{}\"\nmodules:\n  api_ingress:\n    enable_docs: true\n",
            tmp.path().join("h").to_string_lossy().replace('\\', "/"),
            modules_dir.to_string_lossy().replace('\\', "/")
        );
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(config.modules.contains_key("api_ingress"));
        assert_eq!(config.modules["apikit"]["schema_file"], "blog.yaml");
        assert!(!config.modules.contains_key("notes"));
    }

    #[test]
    fn module_config_decodes_or_defaults() {
        let mut config = AppConfig::default();
        assert_eq!(config.module_config::<Probe>("apikit").unwrap(), Probe::default());

        config.modules.insert(
            "apikit".into(),
            serde_json::json!({ "schema_file": "m.yaml", "prefix": "/v2" }),
        );
        let probe: Probe = config.module_config("apikit").unwrap();
        assert_eq!(probe.schema_file, "m.yaml");
        assert_eq!(probe.prefix.as_deref(), Some("/v2"));

        config
            .modules
            .insert("apikit".into(), serde_json::json!({ "prefix": 7 }));
        assert!(config.module_config::<Probe>("apikit").is_err());
    }

    #[test]
    fn cli_overrides() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                port: Some(3000),
                verbose,
                ..CliArgs::default()
            });
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.logging.unwrap()["default"].console_level, expected);
        }
    }

    #[test]
    fn yaml_roundtrip() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.server.port, config.server.port);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "server:\n  home_dir: x\n  host: h\n  port: 1\n  color: blue\n";
        assert!(serde_yaml::from_str::<AppConfig>(yaml).is_err());
    }
}
