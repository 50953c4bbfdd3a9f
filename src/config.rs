use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::intersect::RootMargin;
use crate::nav::{DEFAULT_AT_TOP_TOLERANCE, NavOptions, ScrollBehavior};
use crate::theme::Theme;
use crate::visibility::DEFAULT_THRESHOLD;

// ---------------------------------------------------------------------------
// ConfigFile: deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub theme: Option<Theme>,
    #[serde(default)]
    pub engine: EngineConfigFile,
    #[serde(default)]
    pub viewer: ViewerConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct EngineConfigFile {
    pub threshold: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub at_top_tolerance: Option<f64>,
    pub reduced_motion: Option<bool>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfigFile {
    pub scroll_step: Option<u32>,
    pub frame_budget_ms: Option<u64>,
    pub sidebar_cols: Option<u16>,
    pub smooth_speed: Option<f64>,
}

// ---------------------------------------------------------------------------
// Config: resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    pub theme: Theme,
    pub engine: EngineConfig,
    pub viewer: ViewerConfig,
}

pub struct EngineConfig {
    pub threshold: f64,
    pub margin: RootMargin,
    pub at_top_tolerance: f64,
    pub reduced_motion: bool,
}

pub struct ViewerConfig {
    pub scroll_step: u32,
    pub frame_budget: Duration,
    pub sidebar_cols: u16,
    pub smooth_speed: f64,
}

impl EngineConfig {
    pub fn nav_options(&self) -> NavOptions {
        NavOptions {
            at_top_tolerance: self.at_top_tolerance,
            behavior: if self.reduced_motion {
                ScrollBehavior::Instant
            } else {
                ScrollBehavior::Smooth
            },
        }
    }
}

/// CLI values layered on top of the config file.
#[derive(Default, Clone)]
pub struct CliOverrides {
    pub theme: Option<Theme>,
    pub threshold: Option<f64>,
    pub reduced_motion: bool,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(&mut self, cli: &CliOverrides) {
        if let Some(v) = cli.theme {
            debug!("config: CLI override theme={v}");
            self.theme = Some(v);
        }
        if let Some(v) = cli.threshold {
            debug!("config: CLI override threshold={v}");
            self.engine.threshold = Some(v);
        }
        if cli.reduced_motion {
            debug!("config: CLI override reduced_motion=true");
            self.engine.reduced_motion = Some(true);
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    pub fn resolve(self) -> Config {
        let config = Config {
            theme: self.theme.unwrap_or_default(),
            engine: EngineConfig {
                threshold: finite_or(self.engine.threshold, DEFAULT_THRESHOLD, "engine.threshold").clamp(0.0, 1.0),
                margin: RootMargin {
                    top: finite_or(self.engine.margin_top, 0.0, "engine.margin_top").clamp(0.0, 0.5),
                    bottom: finite_or(self.engine.margin_bottom, 0.0, "engine.margin_bottom").clamp(0.0, 0.5),
                },
                at_top_tolerance: finite_or(
                    self.engine.at_top_tolerance,
                    DEFAULT_AT_TOP_TOLERANCE,
                    "engine.at_top_tolerance",
                )
                .max(0.0),
                reduced_motion: self.engine.reduced_motion.unwrap_or(false),
            },
            viewer: ViewerConfig {
                scroll_step: self.viewer.scroll_step.unwrap_or(3).max(1),
                frame_budget: Duration::from_millis(self.viewer.frame_budget_ms.unwrap_or(32)),
                sidebar_cols: self.viewer.sidebar_cols.unwrap_or(18),
                smooth_speed: finite_or(self.viewer.smooth_speed, 0.35, "viewer.smooth_speed").clamp(0.05, 1.0),
            },
        };
        info!(
            "config: resolved theme={}, threshold={}, margin={}/{}, at_top_tolerance={}, \
             reduced_motion={}, scroll_step={}, sidebar_cols={}, smooth_speed={}, frame_budget={}ms",
            config.theme,
            config.engine.threshold,
            config.engine.margin.top,
            config.engine.margin.bottom,
            config.engine.at_top_tolerance,
            config.engine.reduced_motion,
            config.viewer.scroll_step,
            config.viewer.sidebar_cols,
            config.viewer.smooth_speed,
            config.viewer.frame_budget.as_millis(),
        );
        config
    }
}

/// A set value, or `default` when unset or not a finite number.
fn finite_or(value: Option<f64>, default: f64, key: &str) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!("config: {key}={v} is not a finite number, using {default}");
            default
        }
        None => default,
    }
}

/// Resolve the XDG config path for slidesync.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("slidesync").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.theme, Theme::Dark);
        assert_eq!(resolved.engine.threshold, 0.6);
        assert_eq!(resolved.engine.margin, RootMargin::default());
        assert_eq!(resolved.engine.at_top_tolerance, 4.0);
        assert!(!resolved.engine.reduced_motion);
        assert_eq!(resolved.viewer.scroll_step, 3);
        assert_eq!(resolved.viewer.sidebar_cols, 18);
        assert_eq!(resolved.viewer.frame_budget, Duration::from_millis(32));
    }

    #[test]
    fn partial_toml() {
        let text = r#"
            theme = "light"
            [engine]
            threshold = 0.35
            margin_top = 0.1
            [viewer]
            scroll_step = 10
        "#;
        let cfg: ConfigFile = toml::from_str(text).unwrap();
        let resolved = cfg.resolve();
        assert_eq!(resolved.theme, Theme::Light);
        assert_eq!(resolved.engine.threshold, 0.35);
        assert_eq!(resolved.engine.margin.top, 0.1);
        assert_eq!(resolved.viewer.scroll_step, 10);
        // Defaults for unspecified fields
        assert_eq!(resolved.engine.margin.bottom, 0.0);
        assert_eq!(resolved.viewer.sidebar_cols, 18);
    }

    #[test]
    fn invalid_toml() {
        let text = "this is not valid toml [[[";
        let result = toml::from_str::<ConfigFile>(text);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(toml::from_str::<ConfigFile>("theme = \"neon\"").is_err());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let text = r#"
            [engine]
            threshold = 1.5
            margin_bottom = 0.9
            at_top_tolerance = -3.0
        "#;
        let resolved = toml::from_str::<ConfigFile>(text).unwrap().resolve();
        assert_eq!(resolved.engine.threshold, 1.0);
        assert_eq!(resolved.engine.margin.bottom, 0.5);
        assert_eq!(resolved.engine.at_top_tolerance, 0.0);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let text = r#"
            [engine]
            threshold = nan
            at_top_tolerance = inf
            [viewer]
            smooth_speed = -inf
        "#;
        let resolved = toml::from_str::<ConfigFile>(text).unwrap().resolve();
        assert_eq!(resolved.engine.threshold, DEFAULT_THRESHOLD);
        assert_eq!(resolved.engine.at_top_tolerance, DEFAULT_AT_TOP_TOLERANCE);
        assert_eq!(resolved.viewer.smooth_speed, 0.35);

        let mut cfg = ConfigFile::default();
        cfg.merge_cli(&CliOverrides {
            threshold: Some(f64::NAN),
            ..CliOverrides::default()
        });
        assert_eq!(cfg.resolve().engine.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn cli_overrides() {
        let mut cfg: ConfigFile = toml::from_str("[engine]\nthreshold = 0.5").unwrap();
        cfg.merge_cli(&CliOverrides {
            theme: Some(Theme::Light),
            threshold: Some(0.35),
            reduced_motion: true,
        });
        let resolved = cfg.resolve();
        assert_eq!(resolved.theme, Theme::Light);
        assert_eq!(resolved.engine.threshold, 0.35); // CLI wins
        assert_eq!(resolved.engine.nav_options().behavior, ScrollBehavior::Instant);
    }
}
