//! runeterm structured logging infrastructure
//!
//! Centralized logging configuration with per-module level controls and
//! structured metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Logging configuration for runeterm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (applies when module-specific level not set)
    pub global_level: LogLevel,
    /// Per-module log level overrides
    pub module_levels: HashMap<String, LogLevel>,
    /// Whether to include subsystem/module names in log output
    pub include_subsystem: bool,
    /// Whether to include severity levels in log output
    pub include_severity: bool,
    /// Whether to use JSON format for structured output
    pub json_format: bool,
    /// Whether to use ANSI colors in output (when not JSON)
    pub use_colors: bool,
}

/// Log levels for runeterm modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Show all logs including trace
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above (default)
    Info,
    /// Show warnings and above
    Warn,
    /// Show only errors
    Error,
    /// Disable all logging for this module
    Off,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: LogLevel::Info,
            module_levels: HashMap::new(),
            include_subsystem: true,
            include_severity: true,
            json_format: false,
            use_colors: true,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            // No direct "off" in tracing, use ERROR as fallback
            LogLevel::Error | LogLevel::Off => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

/// Module names for per-module logging configuration
pub mod modules {
    /// Core module logging identifier
    pub const CORE: &str = "runeterm_core";
    /// Grid module logging identifier
    pub const GRID: &str = "runeterm_grid";
    /// PTY module logging identifier
    pub const PTY: &str = "runeterm_pty";
    /// Configuration module logging identifier
    pub const CONFIG: &str = "runeterm_config";
    /// CLI module logging identifier
    pub const CLI: &str = "runeterm_cli";
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LoggingConfig) -> crate::Result<()> {
    let env_filter = build_env_filter(config);
    let registry = Registry::default().with(env_filter);

    if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_timer(ChronoUtc::rfc_3339());

        registry.with(json_layer).try_init().map_err(|e| {
            crate::RuneTermError::Configuration(format!("Failed to initialize JSON logging: {}", e))
        })?;
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.include_subsystem)
            .with_level(config.include_severity)
            .with_ansi(config.use_colors)
            .with_timer(ChronoUtc::rfc_3339());

        registry.with(fmt_layer).try_init().map_err(|e| {
            crate::RuneTermError::Configuration(format!("Failed to initialize logging: {}", e))
        })?;
    }

    Ok(())
}

/// Build an environment filter from the logging configuration
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::new("");

    let global_level: Level = config.global_level.into();
    if let Ok(directive) = format!("runeterm={}", global_level).parse() {
        filter = filter.add_directive(directive);
    }

    for (module, level) in &config.module_levels {
        if *level == LogLevel::Off {
            continue;
        }
        let tracing_level: Level = (*level).into();
        if let Ok(directive) = format!("{}={}", module, tracing_level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Environment variable override
    if let Ok(env_filter) = std::env::var("RUNETERM_LOG") {
        if let Ok(env_directive) = env_filter.parse() {
            filter = filter.add_directive(env_directive);
        }
    }

    filter
}

/// Get default development logging configuration
pub fn dev_config() -> LoggingConfig {
    let mut config = LoggingConfig::default();
    config.global_level = LogLevel::Debug;
    config.use_colors = true;
    config.json_format = false;

    config
        .module_levels
        .insert(modules::PTY.to_string(), LogLevel::Debug);
    config
        .module_levels
        .insert(modules::GRID.to_string(), LogLevel::Info);

    config
}

/// Get default production logging configuration
pub fn prod_config() -> LoggingConfig {
    let mut config = LoggingConfig::default();
    config.global_level = LogLevel::Info;
    config.use_colors = false;
    config.json_format = true;

    config
        .module_levels
        .insert(modules::PTY.to_string(), LogLevel::Info);
    config
        .module_levels
        .insert(modules::GRID.to_string(), LogLevel::Warn);

    config
}
