//! Configuration module
//!
//! Settings for transformation planning, watermark sizing, the processing queue and
//! renderer throttling. Values come from the environment (a `.env` file is loaded
//! first when present); missing or unparsable values fall back to defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::*;
use crate::error::ConfigError;
use crate::models::Gravity;

/// Watermark overlay settings
#[derive(Clone, Debug)]
pub struct WatermarkConfig {
    pub path: PathBuf,
    /// Overlay width as a percentage of the base image width.
    pub percent: f64,
    /// Floor for the overlay width in pixels.
    pub min_width: u32,
    pub gravity: Gravity,
    /// Pad the base to its own size over a transparent background before compositing.
    pub normalize_canvas: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WATERMARK_PATH),
            percent: DEFAULT_WATERMARK_PERCENT,
            min_width: DEFAULT_MIN_WATERMARK_WIDTH,
            gravity: Gravity::Center,
            normalize_canvas: true,
        }
    }
}

/// Token bucket in front of the asset renderer. `rate_per_sec == 0` disables it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderLimitConfig {
    pub rate_per_sec: f64,
    pub burst: f64,
}

impl RenderLimitConfig {
    pub fn is_enabled(&self) -> bool {
        self.rate_per_sec > 0.0
    }
}

impl Default for RenderLimitConfig {
    fn default() -> Self {
        Self {
            rate_per_sec: 0.0,
            burst: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    pub max_dimension: u32,
    pub quality: u8,
    pub watermark: WatermarkConfig,
    /// Ask the store not to emit a new upload notification when re-storing.
    pub suppress_notifications: bool,
    pub render_limit: RenderLimitConfig,
    /// Deadline for one queue item; `None` waits forever.
    pub item_timeout: Option<Duration>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
            watermark: WatermarkConfig::default(),
            suppress_notifications: true,
            render_limit: RenderLimitConfig::default(),
            item_timeout: Some(Duration::from_secs(DEFAULT_ITEM_TIMEOUT_SECS)),
        }
    }
}

impl OptimizerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let watermark_path = lookup(ENV_WATERMARK_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.watermark.path);

        let item_timeout_secs =
            parse_or(&lookup, ENV_ITEM_TIMEOUT_SECS, DEFAULT_ITEM_TIMEOUT_SECS);

        let config = Self {
            max_dimension: parse_or(&lookup, ENV_MAX_DIMENSION, DEFAULT_MAX_DIMENSION),
            quality: parse_or(&lookup, ENV_QUALITY, DEFAULT_QUALITY),
            watermark: WatermarkConfig {
                path: watermark_path,
                normalize_canvas: bool_or(&lookup, ENV_NORMALIZE_CANVAS, true),
                ..defaults.watermark
            },
            suppress_notifications: bool_or(&lookup, ENV_SUPPRESS_EVENTS, true),
            render_limit: RenderLimitConfig {
                rate_per_sec: parse_or(&lookup, ENV_RENDER_RATE, 0.0),
                burst: parse_or(&lookup, ENV_RENDER_BURST, 1.0),
            },
            item_timeout: (item_timeout_secs > 0).then(|| Duration::from_secs(item_timeout_secs)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_MAX_DIMENSION,
                reason: "must be greater than 0".to_string(),
            });
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Invalid {
                key: ENV_QUALITY,
                reason: format!("{} is outside 1..=100", self.quality),
            });
        }
        if !(self.watermark.percent > 0.0 && self.watermark.percent <= 100.0) {
            return Err(ConfigError::Invalid {
                key: "watermark.percent",
                reason: format!("{} is outside (0, 100]", self.watermark.percent),
            });
        }
        if self.watermark.min_width == 0 {
            return Err(ConfigError::Invalid {
                key: "watermark.min_width",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.render_limit.rate_per_sec.is_finite() || self.render_limit.rate_per_sec < 0.0 {
            return Err(ConfigError::Invalid {
                key: ENV_RENDER_RATE,
                reason: "must be a non-negative number".to_string(),
            });
        }
        if self.render_limit.is_enabled()
            && Duration::try_from_secs_f64(1.0 / self.render_limit.rate_per_sec).is_err()
        {
            return Err(ConfigError::Invalid {
                key: ENV_RENDER_RATE,
                reason: format!(
                    "{} is too small; the refill interval does not fit a duration",
                    self.render_limit.rate_per_sec
                ),
            });
        }
        if self.render_limit.is_enabled()
            && !(self.render_limit.burst.is_finite() && self.render_limit.burst >= 1.0)
        {
            return Err(ConfigError::Invalid {
                key: ENV_RENDER_BURST,
                reason: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => false,
        _ => default,
    }
}
