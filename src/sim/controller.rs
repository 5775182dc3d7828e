use super::template::{GeneratorDecision, TriggerContext};
use super::types::DispatchConfig;

/// Per-hour generator ON/OFF controller.
///
/// Stateless: the previous ON flag and the SOC after the previous hour are
/// passed in, and the template's row decides. A generator that is disabled,
/// has no capacity, or belongs to a generator-free template is always OFF.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneratorController;

impl GeneratorController {
    /// Decide the generator state for the coming hour.
    ///
    /// Returns [`GeneratorDecision::Reactive`] for templates whose decision
    /// needs the hour's residual load; the dispatch step resolves those.
    pub fn decide(
        &self,
        config: &DispatchConfig,
        hour_of_day: u32,
        soc_pct: f64,
        was_on: bool,
    ) -> GeneratorDecision {
        if !config.generator_available() {
            return GeneratorDecision::Off;
        }

        let rule = config.template.rule();
        if !(rule.gate)(&config.rules, hour_of_day) {
            return GeneratorDecision::Off;
        }

        (rule.trigger)(&TriggerContext {
            hour_of_day,
            soc_pct,
            was_on,
            rules: &config.rules,
        })
    }
}
