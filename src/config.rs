//! Analysis configuration
//!
//! Every field has a default, so a partial JSON document is a valid
//! configuration. [`AnalysisConfig::validate`] runs before any reactor is
//! touched.

use growth_core::{Error, Result};
use growth_filter::FilterOptions;
use growth_spline::Smoothing;
use growth_summary::{validate_threshold, DEFAULT_HIGH_GROWTH_THRESHOLD};
use growth_turbidostat::DEFAULT_MINIMUM_DISTANCE;
use serde::{Deserialize, Serialize};

/// Default resolution of the time axis, in seconds
pub const DEFAULT_ROUND_TIME: u32 = 5;

/// Default smoothing factor of the spline fits
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 1000.0;

/// Segmentation of turbidostat runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbidostatOptions {
    /// Minimum distance between detected peaks, in samples
    pub minimum_distance: usize,
    /// Minimum peak prominence in OD units, `None` adapts to each series
    pub minimum_peak_height: Option<f64>,
    /// Drop readings that do not increase before fitting
    pub remove_downward_trending: bool,
}

impl Default for TurbidostatOptions {
    fn default() -> Self {
        Self {
            minimum_distance: DEFAULT_MINIMUM_DISTANCE,
            minimum_peak_height: None,
            remove_downward_trending: true,
        }
    }
}

/// Settings of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Resolution the time axis is rounded to, in seconds
    pub round_time: u32,
    pub filter: FilterOptions,
    /// `None` uses the number of fitted samples of each series
    pub smoothing_factor: Option<f64>,
    /// Percentage of the maximum growth rate that counts as high growth
    pub high_percentage_threshold: f64,
    pub turbidostat: TurbidostatOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            round_time: DEFAULT_ROUND_TIME,
            filter: FilterOptions::default(),
            smoothing_factor: Some(DEFAULT_SMOOTHING_FACTOR),
            high_percentage_threshold: DEFAULT_HIGH_GROWTH_THRESHOLD,
            turbidostat: TurbidostatOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| Error::Configuration(format!("invalid configuration JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::Configuration(format!("cannot serialize configuration: {err}")))
    }

    /// All parameter checks, reported as [`Error::Configuration`]
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        validate_threshold(self.high_percentage_threshold)
            .map_err(|err| Error::Configuration(err.to_string()))?;
        if let Some(s) = self.smoothing_factor {
            if !s.is_finite() || s < 0.0 {
                return Err(Error::Configuration(format!(
                    "smoothing_factor must be a finite value >= 0, got {s}"
                )));
            }
        }
        if self.turbidostat.minimum_distance < 1 {
            return Err(Error::Configuration(
                "turbidostat.minimum_distance must be at least 1".to_string(),
            ));
        }
        if let Some(height) = self.turbidostat.minimum_peak_height {
            if !height.is_finite() || height < 0.0 {
                return Err(Error::Configuration(format!(
                    "turbidostat.minimum_peak_height must be a finite value >= 0, got {height}"
                )));
            }
        }
        Ok(())
    }

    pub fn smoothing(&self) -> Smoothing {
        Smoothing::from(self.smoothing_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.round_time, 5);
        assert_eq!(config.filter.rolling_window, 31);
        assert_eq!(config.filter.min_periods, 5);
        assert!(config.filter.filter_by_iqr_range);
        assert!(!config.filter.remove_max);
        assert_eq!(config.smoothing(), Smoothing::Fixed(1000.0));
        assert_eq!(config.high_percentage_threshold, 90.0);
        assert_eq!(config.turbidostat.minimum_distance, 300);
        assert!(config.turbidostat.remove_downward_trending);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = AnalysisConfig::from_json_str(
            r#"{"round_time": 10, "smoothing_factor": null, "filter": {"remove_zero": true}}"#,
        )
        .unwrap();
        assert_eq!(config.round_time, 10);
        assert_eq!(config.smoothing(), Smoothing::SampleCount);
        assert!(config.filter.remove_zero);
        assert_eq!(config.filter.quantile_max, 0.99);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = AnalysisConfig::default();
        config.turbidostat.minimum_peak_height = Some(0.2);
        let json = config.to_json_string().unwrap();
        assert_eq!(AnalysisConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_validation_errors() {
        let cases: Vec<Box<dyn Fn(&mut AnalysisConfig)>> = vec![
            Box::new(|c| c.filter.rolling_window = 30),
            Box::new(|c| c.filter.rolling_window = 1),
            Box::new(|c| c.filter.min_periods = 0),
            Box::new(|c| c.filter.quantile_max = 1.0),
            Box::new(|c| c.filter.iqr_range_value = 0.0),
            Box::new(|c| c.high_percentage_threshold = 101.0),
            Box::new(|c| c.smoothing_factor = Some(-1.0)),
            Box::new(|c| c.turbidostat.minimum_distance = 0),
            Box::new(|c| c.turbidostat.minimum_peak_height = Some(f64::NAN)),
        ];
        for mutate in cases {
            let mut config = AnalysisConfig::default();
            mutate(&mut config);
            assert!(matches!(config.validate(), Err(Error::Configuration(_))));
        }
        assert!(matches!(
            AnalysisConfig::from_json_str("{\"round_time\": -1}"),
            Err(Error::Configuration(_))
        ));
    }
}
