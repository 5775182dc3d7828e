use rand::{SeedableRng, rngs::StdRng};

use crate::devices::types::{HourlySource, gaussian_noise};

/// A synthetic hourly load profile.
///
/// `LoadProfile` combines a constant baseline, a sinusoidal daily swing,
/// and Gaussian noise. Setting `amp_mw` and `noise_std` to zero gives the
/// flat load used by most sizing studies.
///
/// # Examples
///
/// ```
/// use hybrid_dispatch::devices::{HourlySource, LoadProfile};
///
/// // Flat 25 MW load
/// let mut load = LoadProfile::new(25.0, 0.0, 0.0, 0.0, 42);
/// assert_eq!(load.power_mw(12), 25.0);
/// ```
#[derive(Debug, Clone)]
pub struct LoadProfile {
    /// Baseline demand in megawatts
    pub base_mw: f64,

    /// Amplitude of the sinusoidal daily variation in megawatts
    pub amp_mw: f64,

    /// Phase offset of the sinusoidal pattern in radians
    pub phase_rad: f64,

    /// Standard deviation of the Gaussian noise in megawatts
    pub noise_std: f64,

    /// Random number generator for noise generation
    rng: StdRng,
}

impl LoadProfile {
    /// Creates a new load profile generator.
    ///
    /// # Arguments
    ///
    /// * `base_mw` - The baseline demand in megawatts
    /// * `amp_mw` - The amplitude of sinusoidal daily variation in megawatts
    /// * `phase_rad` - The phase offset in radians (0 = rising through the baseline at midnight)
    /// * `noise_std` - The standard deviation of Gaussian noise in megawatts
    /// * `seed` - Seed for reproducible noise
    pub fn new(base_mw: f64, amp_mw: f64, phase_rad: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            base_mw,
            amp_mw,
            phase_rad,
            noise_std,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A constant load with no swing or noise.
    pub fn flat(base_mw: f64) -> Self {
        Self::new(base_mw, 0.0, 0.0, 0.0, 0)
    }
}

impl HourlySource for LoadProfile {
    /// Demand is never negative.
    fn power_mw(&mut self, hour: usize) -> f64 {
        let day_pos = (hour % 24) as f64 / 24.0; // [0,1)
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian_noise(&mut self.rng, self.noise_std);

        let mw = self.base_mw + self.amp_mw * angle.sin() + noise;
        mw.max(0.0)
    }

    fn source_type(&self) -> &'static str {
        "Load"
    }
}
