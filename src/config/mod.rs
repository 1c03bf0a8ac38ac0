//! Configuration module for gridsql.
//!
//! Handles the TOML settings file: compiler defaults, logging, and the
//! static object table.

mod settings;

pub use settings::{
    CompilerSettings, LoggingSettings, ObjectSettings, Settings, SettingsError, CONFIG_ENV,
};
