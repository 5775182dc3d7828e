use crate::sim::types::GeneratorParams;

/// A diesel generator that is either OFF or running at full rated output.
///
/// There is no part-load operation: surplus output beyond what load and the
/// battery can take is curtailed.
#[derive(Debug, Clone)]
pub struct Generator {
    /// Rated output in megawatts.
    pub capacity_mw: f64,

    /// Whether surplus output may be routed into the battery.
    pub charges_battery: bool,

    enabled: bool,
}

impl Generator {
    pub fn new(params: &GeneratorParams) -> Self {
        Self {
            capacity_mw: params.capacity_mw.max(0.0),
            charges_battery: params.charges_battery,
            enabled: params.enabled,
        }
    }

    /// Energy produced over one hour in the given ON/OFF state.
    pub fn output_mwh(&self, on: bool) -> f64 {
        if on && self.enabled {
            self.capacity_mw
        } else {
            0.0
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.capacity_mw > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(enabled: bool, capacity_mw: f64) -> GeneratorParams {
        GeneratorParams {
            enabled,
            capacity_mw,
            charges_battery: false,
        }
    }

    #[test]
    fn full_output_when_on() {
        let g = Generator::new(&params(true, 27.0));
        assert_eq!(g.output_mwh(true), 27.0);
        assert_eq!(g.output_mwh(false), 0.0);
    }

    #[test]
    fn disabled_generator_produces_nothing() {
        let g = Generator::new(&params(false, 27.0));
        assert!(!g.is_enabled());
        assert_eq!(g.output_mwh(true), 0.0);
    }

    #[test]
    fn negative_capacity_clamped_to_zero() {
        let g = Generator::new(&params(true, -5.0));
        assert_eq!(g.capacity_mw, 0.0);
        assert!(!g.is_enabled());
    }
}
