use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::DEFAULT_ANIMATION_DELAY;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slidectl";

const MIN_ANIMATION_DELAY_MS: u64 = 100;
const MAX_ANIMATION_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<ParticlesConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_delay_ms: Option<u64>,

    /// 1-indexed slide to open on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticlesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Append a JSON line per slide view to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `slidectl config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# slidectl configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.animation_delay_ms" => {
                let ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| (MIN_ANIMATION_DELAY_MS..=MAX_ANIMATION_DELAY_MS).contains(ms))
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid animation_delay_ms: {value}. Must be a number between {MIN_ANIMATION_DELAY_MS} and {MAX_ANIMATION_DELAY_MS}."
                        )
                    })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .animation_delay_ms = Some(ms);
            }
            "defaults.start_slide" => {
                let slide = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| {
                        anyhow::anyhow!("Invalid start_slide: {value}. Must be a slide number (1-indexed).")
                    })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            "particles.enabled" => {
                let enabled = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => anyhow::bail!("Invalid particles.enabled: {value}. Must be 'true' or 'false'."),
                };
                self.particles
                    .get_or_insert_with(ParticlesConfig::default)
                    .enabled = Some(enabled);
            }
            "analytics.log_file" => {
                if value.is_empty() {
                    anyhow::bail!("analytics.log_file must not be empty.");
                }
                self.analytics
                    .get_or_insert_with(AnalyticsConfig::default)
                    .log_file = Some(PathBuf::from(value));
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.animation_delay_ms, defaults.start_slide, particles.enabled, analytics.log_file"
            ),
        }
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn animation_delay_ms(&self) -> Option<u64> {
        self.defaults.as_ref().and_then(|d| d.animation_delay_ms)
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn particles_enabled(&self) -> bool {
        self.particles
            .as_ref()
            .and_then(|p| p.enabled)
            .unwrap_or(true)
    }

    pub fn analytics_log_file(&self) -> Option<&Path> {
        self.analytics.as_ref().and_then(|a| a.log_file.as_deref())
    }
}

/// Pick the animation delay: CLI flag, then deck frontmatter, then config.
/// A value outside 100..=5000 ms is clamped into range with a warning.
pub fn resolve_animation_delay(
    cli_ms: Option<u64>,
    deck_ms: Option<u64>,
    config: &Config,
) -> Duration {
    let picked = [
        (cli_ms, "--delay"),
        (deck_ms, "deck frontmatter"),
        (config.animation_delay_ms(), "config"),
    ]
    .into_iter()
    .find_map(|(ms, source)| ms.map(|ms| (ms, source)));

    match picked {
        Some((ms, source)) => Duration::from_millis(clamp_delay_ms(ms, source)),
        None => DEFAULT_ANIMATION_DELAY,
    }
}

fn clamp_delay_ms(ms: u64, source: &str) -> u64 {
    let clamped = ms.clamp(MIN_ANIMATION_DELAY_MS, MAX_ANIMATION_DELAY_MS);
    if clamped != ms {
        tracing::warn!(
            "animation delay {ms}ms from {source} is outside \
             {MIN_ANIMATION_DELAY_MS}..={MAX_ANIMATION_DELAY_MS}ms; using {clamped}ms"
        );
    }
    clamped
}
