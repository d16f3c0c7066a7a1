//! Common test utilities for growth-spline tests

use growth_core::{Series, Timestamp, WideTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Parameters of a logistic growth curve with a lag phase, time in hours
#[derive(Debug, Clone, Copy)]
pub struct GrowthCurve {
    pub lag_hours: f64,
    pub rate_per_hour: f64,
    pub max_population: f64,
    pub initial_population: f64,
    pub noise_level: f64,
}

impl Default for GrowthCurve {
    fn default() -> Self {
        Self {
            lag_hours: 2.0,
            rate_per_hour: 0.5,
            max_population: 1.0,
            initial_population: 0.01,
            noise_level: 0.01,
        }
    }
}

impl GrowthCurve {
    /// Noise-free population at `t` hours
    pub fn clean(&self, t: f64) -> f64 {
        if t < self.lag_hours {
            return self.initial_population * (1.0 + 0.1 * t / self.lag_hours);
        }
        let ratio = (self.max_population - self.initial_population) / self.initial_population;
        self.max_population / (1.0 + ratio * (-self.rate_per_hour * (t - self.lag_hours)).exp())
    }

    /// Hours at which the logistic part grows fastest
    pub fn inflection_hours(&self) -> f64 {
        let ratio = (self.max_population - self.initial_population) / self.initial_population;
        self.lag_hours + ratio.ln() / self.rate_per_hour
    }

    /// Largest growth rate in OD per second
    pub fn max_rate_per_second(&self) -> f64 {
        self.rate_per_hour * self.max_population / 4.0 / 3600.0
    }

    /// Noisy samples every `step_secs` seconds for `hours` hours
    pub fn sample(&self, hours: f64, step_secs: i64, seed: u64) -> Series<Option<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, self.noise_level * self.max_population).unwrap();
        let n = (hours * 3600.0 / step_secs as f64) as i64 + 1;
        let index: Vec<Timestamp> = (0..n)
            .map(|i| Timestamp::from_secs(1_700_000_000 + i * step_secs))
            .collect();
        let values = (0..n)
            .map(|i| {
                let t = (i * step_secs) as f64 / 3600.0;
                Some(self.clean(t) + noise.sample(&mut rng))
            })
            .collect();
        Series::new(index, values).unwrap()
    }
}

/// Several reactors sampled on the same index
pub fn growth_table(curves: &[(&str, GrowthCurve)], hours: f64, step_secs: i64) -> WideTable {
    let mut index = Vec::new();
    let mut columns = Vec::new();
    for (seed, (name, curve)) in curves.iter().enumerate() {
        let series = curve.sample(hours, step_secs, 42 + seed as u64);
        let (ts, values) = series.into_parts();
        index = ts;
        columns.push((name.to_string(), values));
    }
    WideTable::new(index, columns).unwrap()
}
