use dane_policyd_domain::{CliOverrides, Config};
use tracing_subscriber::EnvFilter;

pub fn load_config(config_path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Ok(Config::load(config_path, overrides)?)
}

/// Initialize structured logging. `RUST_LOG` wins over the configured
/// level so a one-off debug run never needs a config edit.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
