//! Post-hoc summary KPIs computed from hourly records.

use std::fmt;

use super::types::HourlyRecord;

/// Days per month in the 365-day calendar used for monthly breakdowns.
const MONTH_DAYS: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month index (0..12) of a day index, wrapping every 365 days.
pub fn month_of_day(day: usize) -> usize {
    let mut day_of_year = day % 365;
    for (month, &days) in MONTH_DAYS.iter().enumerate() {
        if day_of_year < days {
            return month;
        }
        day_of_year -= days;
    }
    11
}

/// Aggregate indicators for a complete (or partial) run.
///
/// Computed post-hoc from the record slice so the summary can never drift
/// from the hourly data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub hours: usize,
    /// Total load requirement (MWh).
    pub total_load_mwh: f64,
    /// Total solar available (MWh).
    pub total_solar_mwh: f64,
    pub solar_to_load_mwh: f64,
    pub battery_to_load_mwh: f64,
    pub generator_to_load_mwh: f64,
    pub unserved_mwh: f64,
    /// Hours with no unserved energy.
    pub delivery_hours: usize,
    /// `delivery_hours / hours` as a percentage.
    pub delivery_pct: f64,
    pub generator_hours: usize,
    /// OFF→ON transitions (hour 0 counts if the run starts ON).
    pub generator_starts: usize,
    /// Total generator output, including energy to battery and curtailed.
    pub generator_energy_mwh: f64,
    pub generator_to_battery_mwh: f64,
    pub generator_curtailed_mwh: f64,
    pub solar_to_battery_mwh: f64,
    pub solar_curtailed_mwh: f64,
    /// Curtailed solar as a share of available solar.
    pub solar_wastage_pct: f64,
    pub average_soc_pct: f64,
    /// AC energy delivered by the battery (MWh).
    pub battery_discharge_mwh: f64,
    /// `battery_discharge_mwh / capacity`.
    pub battery_equivalent_cycles: f64,
    /// Delivered hours in which each source served some load.
    pub solar_contribution_hours: usize,
    pub battery_contribution_hours: usize,
    pub generator_contribution_hours: usize,
}

impl SummaryReport {
    /// Computes the summary from hourly records.
    ///
    /// # Arguments
    ///
    /// * `records` - Hourly records in run order
    /// * `battery_capacity_mwh` - Nameplate capacity for cycle counting
    pub fn from_records(records: &[HourlyRecord], battery_capacity_mwh: f64) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut s = Self {
            hours: records.len(),
            ..Self::default()
        };
        let mut soc_sum = 0.0;
        let mut was_on = false;

        for r in records {
            s.total_load_mwh += r.load_mw;
            s.total_solar_mwh += r.solar_mw;
            s.solar_to_load_mwh += r.solar_to_load;
            s.battery_to_load_mwh += r.battery_to_load;
            s.generator_to_load_mwh += r.generator_to_load;
            s.unserved_mwh += r.unserved;
            s.generator_energy_mwh += r.generator_output();
            s.generator_to_battery_mwh += r.generator_to_battery;
            s.generator_curtailed_mwh += r.generator_curtailed;
            s.solar_to_battery_mwh += r.solar_to_battery;
            s.solar_curtailed_mwh += r.solar_curtailed;
            soc_sum += r.soc_pct;

            if r.generator_on {
                s.generator_hours += 1;
                if !was_on {
                    s.generator_starts += 1;
                }
            }
            was_on = r.generator_on;

            if r.delivered() {
                s.delivery_hours += 1;
                s.solar_contribution_hours += usize::from(r.solar_to_load > 0.0);
                s.battery_contribution_hours += usize::from(r.battery_to_load > 0.0);
                s.generator_contribution_hours += usize::from(r.generator_to_load > 0.0);
            }
        }

        let n = records.len() as f64;
        s.delivery_pct = 100.0 * s.delivery_hours as f64 / n;
        s.average_soc_pct = soc_sum / n;
        s.solar_wastage_pct = if s.total_solar_mwh > 0.0 {
            100.0 * s.solar_curtailed_mwh / s.total_solar_mwh
        } else {
            0.0
        };
        s.battery_discharge_mwh = s.battery_to_load_mwh;
        s.battery_equivalent_cycles = if battery_capacity_mwh > 0.0 {
            s.battery_discharge_mwh / battery_capacity_mwh
        } else {
            0.0
        };
        s
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ({} h) ---", self.hours)?;
        writeln!(f, "Load:                  {:.2} MWh", self.total_load_mwh)?;
        writeln!(
            f,
            "Served by solar/bat/dg: {:.2} / {:.2} / {:.2} MWh",
            self.solar_to_load_mwh, self.battery_to_load_mwh, self.generator_to_load_mwh
        )?;
        writeln!(f, "Unserved:              {:.2} MWh", self.unserved_mwh)?;
        writeln!(
            f,
            "Delivery:              {} h ({:.1}%)",
            self.delivery_hours, self.delivery_pct
        )?;
        writeln!(
            f,
            "Generator:             {} h, {} starts, {:.2} MWh ({:.2} to battery, {:.2} curtailed)",
            self.generator_hours,
            self.generator_starts,
            self.generator_energy_mwh,
            self.generator_to_battery_mwh,
            self.generator_curtailed_mwh
        )?;
        writeln!(
            f,
            "Solar:                 {:.2} MWh ({:.2} to battery, {:.2} curtailed, {:.1}% wasted)",
            self.total_solar_mwh,
            self.solar_to_battery_mwh,
            self.solar_curtailed_mwh,
            self.solar_wastage_pct
        )?;
        write!(
            f,
            "Battery:               avg SoC {:.1}%, {:.2} MWh discharged ({:.2} equiv. cycles)",
            self.average_soc_pct, self.battery_discharge_mwh, self.battery_equivalent_cycles
        )
    }
}

/// Totals for one calendar month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySummary {
    /// Month index, 0 = January.
    pub month: usize,
    pub hours: usize,
    pub load_mwh: f64,
    pub solar_mwh: f64,
    pub unserved_mwh: f64,
    pub generator_hours: usize,
    pub solar_curtailed_mwh: f64,
    pub delivery_pct: f64,
}

impl MonthlySummary {
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month % 12]
    }
}

/// Groups records by month. Months with no hours are omitted.
pub fn monthly_breakdown(records: &[HourlyRecord]) -> Vec<MonthlySummary> {
    let mut months: Vec<MonthlySummary> = (0..12)
        .map(|month| MonthlySummary {
            month,
            ..MonthlySummary::default()
        })
        .collect();
    let mut delivered = [0_usize; 12];

    for r in records {
        let month = month_of_day(r.day);
        let m = &mut months[month];
        m.hours += 1;
        m.load_mwh += r.load_mw;
        m.solar_mwh += r.solar_mw;
        m.unserved_mwh += r.unserved;
        m.solar_curtailed_mwh += r.solar_curtailed;
        if r.generator_on {
            m.generator_hours += 1;
        }
        if r.delivered() {
            delivered[month] += 1;
        }
    }

    for (m, &ok) in months.iter_mut().zip(delivered.iter()) {
        if m.hours > 0 {
            m.delivery_pct = 100.0 * ok as f64 / m.hours as f64;
        }
    }

    months.retain(|m| m.hours > 0);
    months
}

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | load {:>9.2} | solar {:>9.2} | unmet {:>8.2} | dg {:>4} h | curt {:>8.2} | {:>5.1}%",
            self.name(),
            self.load_mwh,
            self.solar_mwh,
            self.unserved_mwh,
            self.generator_hours,
            self.solar_curtailed_mwh,
            self.delivery_pct
        )
    }
}
