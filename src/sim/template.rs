//! Generator control templates T0 to T6.
//!
//! Each template is a row in [`TEMPLATE_RULES`]: an availability gate that
//! says whether the generator may run at a given hour, and a trigger rule
//! that decides ON/OFF while the gate is open. Adding a template means
//! adding a row; the dispatch step never branches on the template id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::types::DispatchRules;

/// Dispatch template identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Template {
    /// T0: solar and battery only, no generator.
    SolarBatteryOnly,
    /// T1: generator as last resort at any hour.
    #[default]
    GreenPriority,
    /// T2: generator runs through the night window.
    NightCharge,
    /// T3: reactive generator, barred from the blackout window.
    BlackoutWindow,
    /// T4: SOC-triggered generator at any hour.
    EmergencyOnly,
    /// T5: SOC-triggered generator during the day window.
    DayCharge,
    /// T6: SOC-triggered generator during the night window.
    NightSocTrigger,
}

impl Template {
    pub const ALL: [Template; 7] = [
        Template::SolarBatteryOnly,
        Template::GreenPriority,
        Template::NightCharge,
        Template::BlackoutWindow,
        Template::EmergencyOnly,
        Template::DayCharge,
        Template::NightSocTrigger,
    ];

    /// Numeric id, 0 to 6.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The gate/trigger row for this template.
    pub fn rule(self) -> &'static TemplateRule {
        &TEMPLATE_RULES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.rule().name
    }

    /// Whether the template ever runs a generator.
    pub fn uses_generator(self) -> bool {
        self != Template::SolarBatteryOnly
    }

    /// Whether ON/OFF follows the SOC-on/SOC-off thresholds.
    pub fn uses_soc_hysteresis(self) -> bool {
        matches!(
            self,
            Template::EmergencyOnly | Template::DayCharge | Template::NightSocTrigger
        )
    }

    /// Whether the ON decision depends on the hour's residual load.
    pub fn is_reactive(self) -> bool {
        matches!(self, Template::GreenPriority | Template::BlackoutWindow)
    }
}

impl TryFrom<u8> for Template {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Template::ALL
            .get(usize::from(id))
            .copied()
            .ok_or_else(|| {
                ConfigError::new("template", format!("unknown template {id}, expected 0..=6"))
            })
    }
}

impl From<Template> for u8 {
    fn from(template: Template) -> Self {
        template as u8
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} {}", self.id(), self.name())
    }
}

/// What the trigger rule wants for the coming hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorDecision {
    On,
    Off,
    /// Decided inside the dispatch step from the residual load after solar
    /// and the full battery headroom.
    Reactive,
}

/// Inputs a trigger rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub hour_of_day: u32,
    /// SOC after the previous hour (%).
    pub soc_pct: f64,
    /// Generator state during the previous hour.
    pub was_on: bool,
    pub rules: &'a DispatchRules,
}

/// Availability gate: may the generator run at this hour of day?
pub type GateFn = fn(&DispatchRules, u32) -> bool;

/// Trigger rule, consulted only while the gate is open.
pub type TriggerFn = fn(&TriggerContext<'_>) -> GeneratorDecision;

/// One template's behavior and its descriptive metadata.
#[derive(Debug)]
pub struct TemplateRule {
    pub template: Template,
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub merit_order: &'static str,
    pub gate: GateFn,
    pub trigger: TriggerFn,
}

fn never(_: &DispatchRules, _: u32) -> bool {
    false
}

fn always(_: &DispatchRules, _: u32) -> bool {
    true
}

fn in_day(rules: &DispatchRules, hour_of_day: u32) -> bool {
    rules.day_window.contains(hour_of_day)
}

fn in_night(rules: &DispatchRules, hour_of_day: u32) -> bool {
    rules.night_window.contains(hour_of_day)
}

fn outside_blackout(rules: &DispatchRules, hour_of_day: u32) -> bool {
    !rules.blackout_window.contains(hour_of_day)
}

fn stay_off(_: &TriggerContext<'_>) -> GeneratorDecision {
    GeneratorDecision::Off
}

fn run_whole_window(_: &TriggerContext<'_>) -> GeneratorDecision {
    GeneratorDecision::On
}

fn on_residual_load(_: &TriggerContext<'_>) -> GeneratorDecision {
    GeneratorDecision::Reactive
}

/// OFF→ON at or below SOC-on, ON→OFF at or above SOC-off, otherwise hold.
pub fn soc_hysteresis(ctx: &TriggerContext<'_>) -> GeneratorDecision {
    let on = if ctx.was_on {
        ctx.soc_pct < ctx.rules.soc_off_pct
    } else {
        ctx.soc_pct <= ctx.rules.soc_on_pct
    };
    if on {
        GeneratorDecision::On
    } else {
        GeneratorDecision::Off
    }
}

/// Behavior table indexed by template id.
pub static TEMPLATE_RULES: [TemplateRule; 7] = [
    TemplateRule {
        template: Template::SolarBatteryOnly,
        name: "Solar + BESS Only",
        short_name: "Pure Green",
        description: "No generator, solar and battery only",
        merit_order: "Solar -> Battery -> Unserved",
        gate: never,
        trigger: stay_off,
    },
    TemplateRule {
        template: Template::GreenPriority,
        name: "Green Priority",
        short_name: "Green Priority",
        description: "Generator runs only when solar and battery cannot cover load",
        merit_order: "Solar -> Battery -> Generator -> Unserved",
        gate: always,
        trigger: on_residual_load,
    },
    TemplateRule {
        template: Template::NightCharge,
        name: "DG Night Charge",
        short_name: "Night Charge",
        description: "Generator runs through the night window and may charge the battery",
        merit_order: "Solar -> Generator -> Battery",
        gate: in_night,
        trigger: run_whole_window,
    },
    TemplateRule {
        template: Template::BlackoutWindow,
        name: "DG Blackout Window",
        short_name: "Blackout Window",
        description: "Generator cannot run during the blackout hours",
        merit_order: "Solar -> Battery -> Generator (when allowed)",
        gate: outside_blackout,
        trigger: on_residual_load,
    },
    TemplateRule {
        template: Template::EmergencyOnly,
        name: "DG Emergency Only",
        short_name: "Emergency Only",
        description: "Generator starts when battery SOC drops below the threshold",
        merit_order: "Solar -> Battery -> Generator (SOC trigger)",
        gate: always,
        trigger: soc_hysteresis,
    },
    TemplateRule {
        template: Template::DayCharge,
        name: "DG Day Charge",
        short_name: "Day Charge",
        description: "SOC-triggered generator, day hours only",
        merit_order: "Solar -> Battery -> Generator (day only)",
        gate: in_day,
        trigger: soc_hysteresis,
    },
    TemplateRule {
        template: Template::NightSocTrigger,
        name: "DG Night SoC Trigger",
        short_name: "Night SoC Trigger",
        description: "SOC-triggered generator, night hours only",
        merit_order: "Solar -> Battery -> Generator (night, SOC trigger)",
        gate: in_night,
        trigger: soc_hysteresis,
    },
];

/// When the generator is allowed to run, in plain terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorTiming {
    #[default]
    Anytime,
    DayOnly,
    NightOnly,
    CustomBlackout,
}

/// What starts the generator, in plain terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorTrigger {
    /// When solar and battery cannot meet load.
    #[default]
    Reactive,
    /// When battery SOC drops below a threshold.
    SocBased,
    /// At the start of the allowed window.
    Proactive,
}

/// Maps plain-language answers to a template.
///
/// Triggers that make no sense for a timing fall back to the SOC-based
/// variant (anytime, night only) or are ignored (day only, custom blackout).
///
/// ```
/// use hybrid_dispatch::sim::template::{infer_template, GeneratorTiming, GeneratorTrigger, Template};
///
/// let t = infer_template(true, GeneratorTiming::NightOnly, GeneratorTrigger::Proactive);
/// assert_eq!(t, Template::NightCharge);
/// assert_eq!(
///     infer_template(false, GeneratorTiming::Anytime, GeneratorTrigger::Reactive),
///     Template::SolarBatteryOnly
/// );
/// ```
pub fn infer_template(
    generator_enabled: bool,
    timing: GeneratorTiming,
    trigger: GeneratorTrigger,
) -> Template {
    if !generator_enabled {
        return Template::SolarBatteryOnly;
    }
    match (timing, trigger) {
        (GeneratorTiming::Anytime, GeneratorTrigger::Reactive) => Template::GreenPriority,
        (GeneratorTiming::Anytime, _) => Template::EmergencyOnly,
        (GeneratorTiming::DayOnly, _) => Template::DayCharge,
        (GeneratorTiming::NightOnly, GeneratorTrigger::Proactive) => Template::NightCharge,
        (GeneratorTiming::NightOnly, _) => Template::NightSocTrigger,
        (GeneratorTiming::CustomBlackout, _) => Template::BlackoutWindow,
    }
}

/// Trigger options that are meaningful for a timing, with display labels.
pub fn valid_triggers(timing: GeneratorTiming) -> &'static [(GeneratorTrigger, &'static str)] {
    const REACTIVE: (GeneratorTrigger, &str) = (
        GeneratorTrigger::Reactive,
        "When battery + solar cannot meet load",
    );
    const SOC: (GeneratorTrigger, &str) = (
        GeneratorTrigger::SocBased,
        "When battery charge drops below threshold",
    );
    const PROACTIVE: (GeneratorTrigger, &str) = (
        GeneratorTrigger::Proactive,
        "At start of night (pre-emptive charging)",
    );

    match timing {
        GeneratorTiming::Anytime => &[REACTIVE, SOC],
        GeneratorTiming::DayOnly => &[SOC],
        GeneratorTiming::NightOnly => &[PROACTIVE, SOC],
        GeneratorTiming::CustomBlackout => &[REACTIVE],
    }
}
