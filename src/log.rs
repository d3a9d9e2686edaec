//! Diagnostic logging for simulation runs. This is separate from the CSV reports, which are the
//! simulation's actual output.
//!
//! The five `log` macros are re-exported here. Logging is off until a level is set, either
//! with `--log-level <level>` on the command line or from code:
//!
//! ```rust
//! use disease_progression::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! // Per-individual transitions are logged at `trace`.
//! set_module_filter("disease_progression::progression", LevelFilter::Trace);
//! ```

pub use log::{debug, error, info, trace, warn, LevelFilter};

use crate::hashing::HashMap;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

// ISO 8601 timestamp and a color coded level tag
const DEFAULT_LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

#[derive(Debug)]
struct LogConfiguration {
    /// Level for targets without a module filter. `Off` disables logging.
    global_log_level: LevelFilter,
    module_filters: HashMap<String, LevelFilter>,
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_filters: HashMap::default(),
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// Installs or updates the global log4rs logger to match this configuration.
    fn apply(&mut self) {
        let encoder = Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN));
        let stderr = ConsoleAppender::builder()
            .target(log4rs::append::console::Target::Stderr)
            .encoder(encoder)
            .build();

        let mut builder =
            Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
        for (module, level) in &self.module_filters {
            builder = builder.logger(Logger::builder().build(module.clone(), *level));
        }
        let root = Root::builder()
            .appender("stderr")
            .build(self.global_log_level);

        let config = match builder.build(root) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("failed to build log configuration: {error}");
                return;
            }
        };

        match self.root_handle {
            Some(ref handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                // Another logger is already installed; leave it in place.
                Err(error) => eprintln!("failed to install logger: {error}"),
            },
        }
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for every module without its own filter.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = get_log_configuration();
    configuration.global_log_level = level;
    configuration.apply();
}

/// Sets a level filter for a module path such as `"disease_progression::simulation"`.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    let mut configuration = get_log_configuration();
    if configuration
        .module_filters
        .insert(module_path.to_string(), level)
        != Some(level)
    {
        configuration.apply();
    }
}

/// Sets several module filters at once.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    let mut configuration = get_log_configuration();
    let mut changed = false;
    for (module_path, level) in module_filters {
        changed |= configuration
            .module_filters
            .insert((*module_path).to_string(), *level)
            != Some(*level);
    }
    if changed {
        configuration.apply();
    }
}

/// The global level applies to the module again.
pub fn remove_module_filter(module_path: &str) {
    let mut configuration = get_log_configuration();
    if configuration.module_filters.remove(module_path).is_some() {
        configuration.apply();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The logger is process-global, so everything is checked in one test.
    #[test]
    fn configuration_tracks_levels_and_filters() {
        set_log_level(LevelFilter::Error);
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Error);
        error!("logging test: global level is error");

        set_module_filters(&[
            ("disease_progression::progression", LevelFilter::Trace),
            ("disease_progression::simulation", LevelFilter::Info),
        ]);
        assert_eq!(get_log_configuration().module_filters.len(), 2);

        set_module_filter("disease_progression::simulation", LevelFilter::Debug);
        assert_eq!(
            get_log_configuration()
                .module_filters
                .get("disease_progression::simulation"),
            Some(&LevelFilter::Debug)
        );

        remove_module_filter("disease_progression::progression");
        remove_module_filter("disease_progression::simulation");
        assert!(get_log_configuration().module_filters.is_empty());

        enable_logging();
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Trace);
        disable_logging();
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Off);
    }
}
