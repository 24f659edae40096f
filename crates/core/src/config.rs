//! Engine configuration.
//!
//! Limits and numeric conventions are passed into the engine at construction
//! instead of living as literals in the domain code.

use std::env;
use std::str::FromStr;

/// Tunables shared by the axis catalog, formula engine and bundle composer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of axes a variant parent may declare (at least one is required).
    pub max_variant_axes: usize,
    /// Absolute tolerance when checking that a range parameter sits on a step.
    pub step_tolerance: f64,
    /// Decimal places for unit and total prices.
    pub price_decimals: u32,
    /// Decimal places for the area reported in `per_m2` breakdowns.
    pub area_decimals: u32,
    /// Locale used when a caller does not ask for one.
    pub default_locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_variant_axes: 4,
            step_tolerance: 0.001,
            price_decimals: 2,
            area_decimals: 4,
            default_locale: "en".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `FORGECAT_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = parse_env::<usize>("FORGECAT_MAX_VARIANT_AXES") {
            config.max_variant_axes = max;
        }
        if let Some(tolerance) = parse_env::<f64>("FORGECAT_STEP_TOLERANCE") {
            config.step_tolerance = tolerance;
        }
        if let Ok(locale) = env::var("FORGECAT_DEFAULT_LOCALE") {
            if !locale.trim().is_empty() {
                config.default_locale = locale.trim().to_string();
            }
        }
        config
    }

    pub fn with_max_variant_axes(mut self, max: usize) -> Self {
        self.max_variant_axes = max;
        self
    }

    pub fn with_step_tolerance(mut self, tolerance: f64) -> Self {
        self.step_tolerance = tolerance;
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("{key}={raw:?} is not valid; using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_conventions() {
        let config = EngineConfig::default();
        assert_eq!(config.max_variant_axes, 4);
        assert_eq!(config.price_decimals, 2);
        assert_eq!(config.area_decimals, 4);
        assert!((config.step_tolerance - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn builders_override_fields() {
        let config = EngineConfig::default()
            .with_max_variant_axes(2)
            .with_default_locale("de");
        assert_eq!(config.max_variant_axes, 2);
        assert_eq!(config.default_locale, "de");
    }
}
