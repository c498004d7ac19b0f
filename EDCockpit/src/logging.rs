use edconfig::Config;
use tracing_subscriber::{Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Level filter from `host.logger.min_level`, TRACE when unreadable
pub fn level_filter(config: &Config) -> LevelFilter {
    config
        .get_log_min_level()
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::TRACE)
}

/// Installs the global subscriber
///
/// The console layer is left out when `host.logger.enable_console` is false.
pub fn init_logging(config: &Config) {
    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let console = enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    Registry::default()
        .with(level_filter(config))
        .with(console)
        .init();
}
