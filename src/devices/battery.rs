use crate::sim::types::BatteryParams;

/// Result of pushing AC energy into the battery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeOutcome {
    /// AC-side energy consumed from the source (MWh).
    pub absorbed_mwh: f64,
    /// SOC increase in percentage points.
    pub soc_delta_pct: f64,
}

/// A battery energy storage system with SOC window, power, efficiency and
/// daily cycle constraints.
///
/// Stored energy is always kept within `[min_energy_mwh, max_energy_mwh]`.
/// Efficiency is applied symmetrically: AC energy in is multiplied by the
/// one-way efficiency before it is stored, and stored energy is divided by
/// it to find the AC energy that can be delivered.
///
/// # Energy Convention
/// All quantities are per one-hour step, so MW and MWh are interchangeable.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Nameplate capacity in megawatt-hours.
    pub capacity_mwh: f64,

    /// Maximum charging power in megawatts.
    pub charge_power_mw: f64,

    /// Maximum discharging power in megawatts.
    pub discharge_power_mw: f64,

    /// One-way efficiency (0..1.0).
    pub efficiency: f64,

    min_energy_mwh: f64,
    max_energy_mwh: f64,

    /// Cap on stored energy drawn per day, when the cycle limit is enforced.
    daily_discharge_cap_mwh: Option<f64>,

    stored_mwh: f64,
    discharged_today_mwh: f64,
    charged_this_hour_mwh: f64,
    discharged_this_hour_mwh: f64,
}

impl Battery {
    /// Creates a battery at its configured initial SOC.
    ///
    /// The parameters are expected to have passed
    /// [`DispatchConfig::validate`](crate::sim::types::DispatchConfig::validate);
    /// the initial energy is still clamped into the SOC window.
    pub fn new(params: &BatteryParams) -> Self {
        let capacity = params.capacity_mwh;
        let min_energy_mwh = capacity * params.min_soc_pct / 100.0;
        let max_energy_mwh = capacity * params.max_soc_pct / 100.0;
        let stored_mwh =
            (capacity * params.initial_soc_pct / 100.0).clamp(min_energy_mwh, max_energy_mwh);

        Self {
            capacity_mwh: capacity,
            charge_power_mw: params.charge_power_mw,
            discharge_power_mw: params.discharge_power_mw,
            efficiency: params.efficiency,
            min_energy_mwh,
            max_energy_mwh,
            daily_discharge_cap_mwh: params
                .enforce_cycle_limit
                .then(|| capacity * params.daily_cycle_limit),
            stored_mwh,
            discharged_today_mwh: 0.0,
            charged_this_hour_mwh: 0.0,
            discharged_this_hour_mwh: 0.0,
        }
    }

    pub fn stored_mwh(&self) -> f64 {
        self.stored_mwh
    }

    pub fn min_energy_mwh(&self) -> f64 {
        self.min_energy_mwh
    }

    pub fn max_energy_mwh(&self) -> f64 {
        self.max_energy_mwh
    }

    /// Stored energy drawn since the start of the current day.
    pub fn discharged_today_mwh(&self) -> f64 {
        self.discharged_today_mwh
    }

    /// State of charge as a percentage of nameplate capacity.
    pub fn soc_pct(&self) -> f64 {
        100.0 * self.stored_mwh / self.capacity_mwh
    }

    /// Resets the per-hour power budget. Called once at the top of each hour.
    pub fn begin_hour(&mut self) {
        self.charged_this_hour_mwh = 0.0;
        self.discharged_this_hour_mwh = 0.0;
    }

    /// Resets the daily cycle counter. Called at `hour_of_day == 0`.
    pub fn begin_day(&mut self) {
        self.discharged_today_mwh = 0.0;
    }

    /// AC energy the battery can still accept this hour.
    pub fn charge_headroom(&self) -> f64 {
        let room = (self.max_energy_mwh - self.stored_mwh).max(0.0);
        let power_left = (self.charge_power_mw - self.charged_this_hour_mwh).max(0.0);
        room.min(power_left)
    }

    /// Stored energy that may still be drawn this hour.
    ///
    /// Returns 0 once the daily cycle cap is reached, regardless of SOC.
    pub fn discharge_headroom(&self) -> f64 {
        let available = (self.stored_mwh - self.min_energy_mwh).max(0.0);
        let power_left = (self.discharge_power_mw - self.discharged_this_hour_mwh).max(0.0);
        let headroom = available.min(power_left);
        match self.daily_discharge_cap_mwh {
            Some(cap) => headroom.min((cap - self.discharged_today_mwh).max(0.0)),
            None => headroom,
        }
    }

    /// AC energy the battery could deliver right now.
    pub fn deliverable_mwh(&self) -> f64 {
        self.discharge_headroom() * self.efficiency
    }

    /// Charges with up to `input_mwh` of AC energy.
    pub fn charge(&mut self, input_mwh: f64) -> ChargeOutcome {
        let absorbed_mwh = input_mwh.max(0.0).min(self.charge_headroom());
        if absorbed_mwh <= 0.0 {
            return ChargeOutcome {
                absorbed_mwh: 0.0,
                soc_delta_pct: 0.0,
            };
        }

        let before = self.stored_mwh;
        self.stored_mwh = (before + absorbed_mwh * self.efficiency)
            .clamp(self.min_energy_mwh, self.max_energy_mwh);
        self.charged_this_hour_mwh += absorbed_mwh;

        ChargeOutcome {
            absorbed_mwh,
            soc_delta_pct: 100.0 * (self.stored_mwh - before) / self.capacity_mwh,
        }
    }

    /// Discharges to deliver up to `requested_mwh` of AC energy.
    ///
    /// Returns the AC energy actually delivered.
    pub fn discharge(&mut self, requested_mwh: f64) -> f64 {
        let deliverable = requested_mwh.max(0.0).min(self.deliverable_mwh());
        if deliverable <= 0.0 {
            return 0.0;
        }

        let drawn = deliverable / self.efficiency;
        self.stored_mwh =
            (self.stored_mwh - drawn).clamp(self.min_energy_mwh, self.max_energy_mwh);
        self.discharged_this_hour_mwh += drawn;
        self.discharged_today_mwh += drawn;

        deliverable
    }
}
