//! Reads `~/.config/ucon/config.toml` into a [`ucon_core::Config`] (§6a).

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use ucon_core::Config;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    undershoot_bias: f64,
    include_binary: bool,
    cyclic_consistency_tolerance: f64,
    allow_projection: bool,
    prompt: String,
    color: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            undershoot_bias: defaults.undershoot_bias,
            include_binary: defaults.include_binary,
            cyclic_consistency_tolerance: defaults.cyclic_consistency_tolerance,
            allow_projection: defaults.allow_projection,
            prompt: "> ".to_string(),
            color: true,
        }
    }
}

/// The subset of [`RawConfig`] the REPL shell itself reads, beyond what
/// feeds straight into [`ucon_core::Config`].
pub struct CliConfig {
    pub engine: Config,
    pub prompt: String,
    pub color: bool,
}

fn config_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".config").join("ucon").join("config.toml"))
}

/// Loads the config file if present, falling back to defaults on any
/// read or parse failure rather than refusing to start.
pub fn load() -> CliConfig {
    let raw = config_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|text| toml::from_str::<RawConfig>(&text).ok())
        .unwrap_or_default();

    CliConfig {
        engine: Config {
            undershoot_bias: raw.undershoot_bias,
            include_binary: raw.include_binary,
            cyclic_consistency_tolerance: raw.cyclic_consistency_tolerance,
            allow_projection: raw.allow_projection,
        },
        prompt: raw.prompt,
        color: raw.color,
    }
}
