mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./avs3probe.toml",
        "~/.config/avs3probe/config.toml",
        "/etc/avs3probe/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.probe.sample_size == 0 {
        anyhow::bail!("probe.sample_size cannot be 0");
    }

    if config.probe.sample_size < 4 {
        tracing::warn!(
            "probe.sample_size of {} bytes cannot hold a start code",
            config.probe.sample_size
        );
    }

    if config.demux.packet_size == 0 {
        anyhow::bail!("demux.packet_size cannot be 0");
    }

    config
        .demuxer_options()
        .with_context(|| format!("Invalid demux.framerate: {:?}", config.demux.framerate))?;

    Ok(())
}
