//! Common types and helpers for hourly profile sources.

use rand::{Rng, rngs::StdRng};

/// Trait for anything that yields one power value per simulated hour.
///
/// Implemented by the synthetic profile generators so presets and tests can
/// build load and solar series without external data files.
pub trait HourlySource {
    /// Returns the power in megawatts for the given hour index.
    ///
    /// Sources may carry random state, so calls are expected in hour order.
    fn power_mw(&mut self, hour: usize) -> f64;

    /// Returns a human-readable name for the source.
    fn source_type(&self) -> &'static str;

    /// Collects `hours` consecutive values starting at hour 0.
    fn series(&mut self, hours: usize) -> Vec<f64> {
        (0..hours).map(|h| self.power_mw(h)).collect()
    }
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight shape for an hour of the day.
///
/// Returns 0 outside `[sunrise, sunset)` and peaks at 1 around solar noon.
/// The value is taken at the middle of the hour.
pub fn daylight_frac(hour_of_day: u32, sunrise: u32, sunset: u32) -> f64 {
    if hour_of_day < sunrise || hour_of_day >= sunset {
        return 0.0;
    }
    let span = f64::from(sunset - sunrise);
    let pos = (f64::from(hour_of_day - sunrise) + 0.5) / span; // (0, 1)
    (std::f64::consts::PI * pos).sin().max(0.0)
}
