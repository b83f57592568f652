use anyhow::{Result, anyhow};
use dxt_squish::{ColourFitKind, CompressionSettings, Format, MetricKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// One named set of compression options; every field is optional so presets
/// can be layered.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PresetConfig {
    pub format: Option<Format>,
    pub fit: Option<ColourFitKind>,
    pub metric: Option<MetricKind>,
    pub weight_by_alpha: Option<bool>,
    pub threads: Option<usize>,
}

impl PresetConfig {
    /// Values set in `overrides` win over values set here.
    pub fn overridden_by(&self, overrides: &PresetConfig) -> PresetConfig {
        PresetConfig {
            format: overrides.format.or(self.format),
            fit: overrides.fit.or(self.fit),
            metric: overrides.metric.or(self.metric),
            weight_by_alpha: overrides.weight_by_alpha.or(self.weight_by_alpha),
            threads: overrides.threads.or(self.threads),
        }
    }

    /// Fills unset fields from [`CompressionSettings::default`].
    pub fn settings(&self) -> CompressionSettings {
        let base = CompressionSettings::default();
        CompressionSettings {
            format: self.format.unwrap_or(base.format),
            fit: self.fit.unwrap_or(base.fit),
            metric: self.metric.unwrap_or(base.metric),
            weight_colour_by_alpha: self.weight_by_alpha.unwrap_or(base.weight_colour_by_alpha),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub default: Option<PresetConfig>,
    #[serde(flatten)]
    pub presets: HashMap<String, PresetConfig>,
}

impl Config {
    pub fn load() -> Result<Option<Self>> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            log::debug!("Config file not found at {}", config_path.display());
            return Ok(None);
        }

        log::info!("Loading config from {}", config_path.display());

        let config_content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config = Self::parse(&config_content)?;

        log::debug!("Loaded config with {} presets", config.presets.len());

        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Failed to parse config file: {}", e))
    }

    pub fn get_preset(&self, name: &str) -> Option<&PresetConfig> {
        // Special case for "default"
        if name == "default" {
            return self.default.as_ref();
        }

        self.presets.get(name)
    }

    pub fn get_default(&self) -> Option<&PresetConfig> {
        self.default.as_ref()
    }

    pub fn list_presets(&self) -> Vec<String> {
        let mut presets = Vec::new();

        if self.default.is_some() {
            presets.push("default".to_string());
        }

        let mut preset_names: Vec<_> = self.presets.keys().cloned().collect();
        preset_names.sort();
        presets.extend(preset_names);

        presets
    }
}

/// Picks the named preset (or the default one) and layers `overrides` on top.
pub fn resolve(
    config: Option<&Config>,
    preset: Option<&str>,
    overrides: &PresetConfig,
) -> Result<PresetConfig> {
    let base = match (config, preset) {
        (Some(cfg), Some(name)) => cfg.get_preset(name).cloned().ok_or_else(|| {
            let available = cfg.list_presets();
            if available.is_empty() {
                anyhow!("No preset named '{}' found", name)
            } else {
                anyhow!(
                    "No preset named '{}' found\nAvailable presets: {}",
                    name,
                    available.join(", ")
                )
            }
        })?,
        (None, Some(name)) => {
            return Err(anyhow!(
                "No config file found, cannot use preset '{}'. Create {} to define presets.",
                name,
                get_config_path()?.display()
            ));
        }
        (Some(cfg), None) => cfg.get_default().cloned().unwrap_or_default(),
        (None, None) => PresetConfig::default(),
    };

    Ok(base.overridden_by(overrides))
}

pub fn get_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
        .ok_or_else(|| anyhow!("Could not determine home directory"))?;

    Ok(home_dir
        .join(".config")
        .join("dxt-squish")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[default]
format = "dxt1"
fit = "range"

[sprites]
format = "dxt5"
weight_by_alpha = true
threads = 2

[photo]
metric = "uniform"
fit = "iterative"
"#;

    #[test]
    fn test_parse_presets() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.list_presets(), vec!["default", "photo", "sprites"]);

        let sprites = config.get_preset("sprites").unwrap();
        assert_eq!(sprites.format, Some(Format::Dxt5));
        assert_eq!(sprites.weight_by_alpha, Some(true));
        assert_eq!(sprites.threads, Some(2));

        let photo = config.get_preset("photo").unwrap();
        assert_eq!(photo.fit, Some(ColourFitKind::IterativeCluster));
        assert_eq!(photo.metric, Some(MetricKind::Uniform));
    }

    #[test]
    fn test_resolve_layers_overrides() {
        let config = Config::parse(SAMPLE).unwrap();
        let overrides = PresetConfig {
            fit: Some(ColourFitKind::Cluster),
            ..Default::default()
        };

        let resolved = resolve(Some(&config), None, &overrides).unwrap();
        let settings = resolved.settings();
        assert_eq!(settings.format, Format::Dxt1);
        assert_eq!(settings.fit, ColourFitKind::Cluster);
        assert_eq!(settings.metric, MetricKind::Perceptual);

        let resolved = resolve(Some(&config), Some("sprites"), &PresetConfig::default()).unwrap();
        assert_eq!(resolved.settings(), CompressionSettings::alpha_smooth());
    }

    #[test]
    fn test_resolve_unknown_preset() {
        let config = Config::parse(SAMPLE).unwrap();
        let err = resolve(Some(&config), Some("nope"), &PresetConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Available presets: default, photo, sprites"));
    }

    #[test]
    fn test_settings_without_config() {
        let resolved = resolve(None, None, &PresetConfig::default()).unwrap();
        assert_eq!(resolved.settings(), CompressionSettings::default());
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        assert!(Config::parse("[default]\nformat = \"bc7\"\n").is_err());
    }
}
