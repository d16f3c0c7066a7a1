//! Common test utilities for growth-turbidostat tests

use growth_core::{Series, Timestamp};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

pub const STEP_SECS: i64 = 30;
pub const ORIGIN_SECS: i64 = 1_700_000_000;

/// Exponential growth between a low and a high OD set point
#[derive(Debug, Clone, Copy)]
pub struct TurbidostatRun {
    pub low: f64,
    pub high: f64,
    pub rate_per_hour: f64,
    pub noise: f64,
}

impl Default for TurbidostatRun {
    fn default() -> Self {
        Self { low: 0.2, high: 0.8, rate_per_hour: 0.5, noise: 0.003 }
    }
}

pub struct Simulated {
    pub series: Series<Option<f64>>,
    /// Last sample before each dilution
    pub tops: Vec<Timestamp>,
}

impl TurbidostatRun {
    /// Samples of one growth phase from `low` up to `high`
    pub fn samples_per_cycle(&self) -> usize {
        let hours = (self.high / self.low).ln() / self.rate_per_hour;
        (hours * 3600.0 / STEP_SECS as f64).floor() as usize + 1
    }

    /// `cycles` full phases followed by half a phase without dilution
    pub fn simulate(&self, cycles: usize, seed: u64) -> Simulated {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, self.noise).unwrap();
        let per_cycle = self.samples_per_cycle();
        let total = cycles * per_cycle + per_cycle / 2;

        let mut index = Vec::with_capacity(total);
        let mut values = Vec::with_capacity(total);
        let mut tops = Vec::new();
        for i in 0..total {
            let ts = Timestamp::from_secs(ORIGIN_SECS + i as i64 * STEP_SECS);
            let within = i % per_cycle;
            let hours = within as f64 * STEP_SECS as f64 / 3600.0;
            let clean = self.low * (self.rate_per_hour * hours).exp();
            if within == per_cycle - 1 && i / per_cycle < cycles {
                tops.push(ts);
            }
            index.push(ts);
            values.push(Some(clean + noise.sample(&mut rng)));
        }
        Simulated { series: Series::new(index, values).unwrap(), tops }
    }
}
