use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "kiln_engine=debug,wgpu=warn") and replaces the defaults entirely.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// Default level for everything not listed in the quiet modules.
    pub level: LevelFilter,
    /// Logs mesh growth and dropped draws at `debug`.
    pub mesh_debug: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            mesh_debug: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// wgpu internals are chatty below `warn`.
const QUIET_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Installs `env_logger` once; later calls are ignored.
///
/// An explicit `env_filter` wins over `RUST_LOG`, which wins over the defaults.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                for (module, level) in default_filters(&config) {
                    builder.filter(module, level);
                }
            }
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        builder.init();

        log::debug!("logging initialized");
    });
}

fn default_filters(config: &LoggingConfig) -> Vec<(Option<&'static str>, LevelFilter)> {
    let mut filters = vec![(None, config.level)];
    filters.extend(
        QUIET_MODULES
            .iter()
            .map(|m| (Some(*m), config.level.min(LevelFilter::Warn))),
    );
    if config.mesh_debug {
        filters.push((Some("kiln_engine::mesh"), LevelFilter::Debug));
        filters.push((Some("kiln_engine::render"), LevelFilter::Debug));
    }
    filters
}
