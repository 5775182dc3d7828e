use crate::devices::types::{HourlySource, daylight_frac, gaussian_noise};
use rand::{SeedableRng, rngs::StdRng};

/// A synthetic solar PV profile based on daylight hours.
///
/// `SolarProfile` produces a half-sine shaped generation curve between
/// sunrise and sunset with a configurable peak and multiplicative Gaussian
/// noise standing in for weather variation. Output is never negative and
/// never exceeds `peak_mw` by more than the noise allows.
#[derive(Debug, Clone)]
pub struct SolarProfile {
    /// Output at solar noon under clear-sky conditions (MW).
    pub peak_mw: f64,

    /// Hour of day when generation starts (inclusive).
    pub sunrise: u32,

    /// Hour of day when generation stops (exclusive).
    pub sunset: u32,

    /// Standard deviation of the noise as a fraction of output.
    pub noise_std: f64,

    /// Random number generator for noise generation.
    rng: StdRng,
}

impl SolarProfile {
    /// Creates a new solar profile generator.
    ///
    /// # Arguments
    ///
    /// * `peak_mw` - Clear-sky output at solar noon (MW)
    /// * `sunrise` - Hour of day when generation starts (inclusive)
    /// * `sunset` - Hour of day when generation stops (exclusive)
    /// * `noise_std` - Standard deviation of noise (e.g., 0.1 for +/-10% variation)
    /// * `seed` - Random seed for reproducible noise generation
    ///
    /// # Panics
    ///
    /// Panics if `sunrise >= sunset` or `sunset > 24`.
    pub fn new(peak_mw: f64, sunrise: u32, sunset: u32, noise_std: f64, seed: u64) -> Self {
        assert!(sunrise < sunset && sunset <= 24);
        Self {
            peak_mw: peak_mw.max(0.0),
            sunrise,
            sunset,
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl HourlySource for SolarProfile {
    /// Returns 0 during night hours.
    fn power_mw(&mut self, hour: usize) -> f64 {
        let frac = daylight_frac((hour % 24) as u32, self.sunrise, self.sunset);
        if frac <= 0.0 {
            return 0.0;
        }

        let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
        (self.peak_mw * frac * noise_mult).max(0.0)
    }

    fn source_type(&self) -> &'static str {
        "SolarPV"
    }
}
