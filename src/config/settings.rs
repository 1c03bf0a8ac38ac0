//! TOML-based configuration for gridsql.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! default_take = 200
//! default_schema = "dbo"
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # pretty | compact | json
//!
//! [objects."dbo.GetOrders"]
//! kind = "function"
//! parameters = ["CustomerId", "Since"]
//!
//! [objects."sales.OpenOrders"]
//! kind = "view"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::{CompileOptions, ObjectKind, ObjectName};
use crate::logging::LogFormat;
use crate::metadata::{ObjectInfo, StaticSchemaProvider};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GRIDSQL_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Compiler defaults.
    pub compiler: CompilerSettings,

    /// Diagnostic logging.
    pub logging: LoggingSettings,

    /// Known grid objects, keyed by `schema.name`.
    pub objects: BTreeMap<String, ObjectSettings>,
}

/// Compiler defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Page size when a request gives `skip` without `take`.
    pub default_take: u64,

    /// Schema for one-part object names.
    pub default_schema: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            default_take: options.default_take,
            default_schema: options.default_schema,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "gridsql=debug").
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// One entry of the `[objects]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectSettings {
    /// "view" or "function".
    pub kind: String,

    /// Function parameters in call order.
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GRIDSQL_CONFIG`
    /// 2. `./gridsql.toml`
    /// 3. `~/.config/gridsql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("gridsql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gridsql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Load from `path` when given, otherwise from the default locations.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.compiler.default_take == 0 {
            return Err(SettingsError::InvalidConfig(
                "compiler.default_take must be positive".into(),
            ));
        }
        if self.compiler.default_schema.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "compiler.default_schema must not be empty".into(),
            ));
        }
        self.schema_provider().map(|_| ())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_default_take(self.compiler.default_take)
            .with_default_schema(self.compiler.default_schema.clone())
    }

    /// Build a schema provider from the `[objects]` table.
    pub fn schema_provider(&self) -> Result<StaticSchemaProvider, SettingsError> {
        let mut provider = StaticSchemaProvider::new();
        for (name, object) in &self.objects {
            let object_name = ObjectName::parse(name, &self.compiler.default_schema)
                .map_err(|e| SettingsError::InvalidConfig(format!("objects.\"{}\": {}", name, e)))?;

            let kind = ObjectKind::parse(&object.kind).ok_or_else(|| {
                SettingsError::InvalidConfig(format!(
                    "objects.\"{}\": unknown kind '{}'",
                    name, object.kind
                ))
            })?;

            let info = match kind {
                ObjectKind::View if !object.parameters.is_empty() => {
                    return Err(SettingsError::InvalidConfig(format!(
                        "objects.\"{}\": a view takes no parameters",
                        name
                    )))
                }
                ObjectKind::View => ObjectInfo::view(),
                ObjectKind::Function => ObjectInfo::function(object.parameters.iter().cloned()),
            };
            provider.insert(object_name, info);
        }
        Ok(provider)
    }
}
