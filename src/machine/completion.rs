//! Closed-form expected completion time for a machine, treating skill checks
//! as a renewal process with a fixed dead time after each offer.

use serde::{Deserialize, Serialize};

/// Round to `places` decimals. Presentation only.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionModel {
    /// Work units in a full machine.
    pub total_units: f64,
    pub min_check_duration: f64,
    pub max_check_duration: f64,
    /// Cooldown after a skill check before another can be offered.
    pub grace_period: f64,
    /// Upper clamp on the per-second offer probability; `ln(0)` otherwise.
    pub max_event_chance: f64,
    /// Used when the resolved chance is not a number.
    pub default_event_chance: f64,
}

impl Default for CompletionModel {
    fn default() -> Self {
        Self {
            total_units: 45.0,
            min_check_duration: 0.75,
            max_check_duration: 2.5,
            grace_period: 2.0,
            max_event_chance: 0.9999,
            default_event_chance: 0.25,
        }
    }
}

/// Inputs for one model evaluation, all taken from resolved stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInputs {
    /// Base units per second (extraction speed).
    pub progress_rate: f64,
    /// Units granted per successful skill check.
    pub bonus_per_event: f64,
    pub success_probability: f64,
    /// Per-second probability of a skill check being offered.
    pub event_chance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEstimate {
    pub expected_time: f64,
    /// Time with no skill checks at all.
    pub default_time: f64,
    pub expected_events: f64,
    pub expected_successful_events: f64,
    pub effective_progress_rate: f64,
}

impl CompletionEstimate {
    pub fn rounded(&self) -> CompletionEstimate {
        CompletionEstimate {
            expected_time: round_to(self.expected_time, 1),
            default_time: round_to(self.default_time, 1),
            expected_events: round_to(self.expected_events, 1),
            expected_successful_events: round_to(self.expected_successful_events, 1),
            effective_progress_rate: round_to(self.effective_progress_rate, 2),
        }
    }
}

/// Progress made inside one bounded time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowProgress {
    pub units_completed: f64,
    pub units_remaining: f64,
    pub expected_events: f64,
    pub expected_successful_events: f64,
    pub time_consumed: f64,
    /// Work ran out before the window closed.
    pub early_completion: bool,
    pub effective_progress_rate: f64,
}

impl CompletionModel {
    /// Mean check duration plus grace.
    pub fn dead_time(&self) -> f64 {
        (self.min_check_duration + self.max_check_duration) / 2.0 + self.grace_period
    }

    pub fn clamp_event_chance(&self, chance: f64) -> f64 {
        let chance = if chance.is_nan() {
            self.default_event_chance
        } else {
            chance
        };
        chance.clamp(0.0, self.max_event_chance)
    }

    /// `d / (1 + d * D)` with hazard `d = -ln(1 - p)`.
    pub fn effective_event_rate(&self, chance: f64) -> f64 {
        let hazard = -(1.0 - self.clamp_event_chance(chance)).ln();
        hazard / (1.0 + hazard * self.dead_time())
    }

    pub fn effective_progress_rate(&self, inputs: &ProgressInputs) -> f64 {
        inputs.progress_rate
            + inputs.bonus_per_event
                * inputs.success_probability
                * self.effective_event_rate(inputs.event_chance)
    }

    /// Expected time to finish `units`. Zero or negative work finishes
    /// immediately. A zero progress rate is a caller error.
    pub fn estimate(&self, inputs: &ProgressInputs, units: f64) -> CompletionEstimate {
        if units <= 0.0 {
            return CompletionEstimate {
                effective_progress_rate: inputs.progress_rate,
                ..CompletionEstimate::default()
            };
        }
        let rate = self.effective_event_rate(inputs.event_chance);
        let effective_progress_rate = self.effective_progress_rate(inputs);
        let expected_time = units / effective_progress_rate;
        let expected_events = rate * expected_time;
        CompletionEstimate {
            expected_time,
            default_time: units / inputs.progress_rate,
            expected_events,
            expected_successful_events: expected_events * inputs.success_probability,
            effective_progress_rate,
        }
    }

    /// Consume work for at most `window` seconds.
    pub fn progress_window(
        &self,
        inputs: &ProgressInputs,
        window: f64,
        units_remaining: f64,
    ) -> WindowProgress {
        let rate = self.effective_event_rate(inputs.event_chance);
        let effective_progress_rate = self.effective_progress_rate(inputs);
        let time_to_finish = units_remaining / effective_progress_rate;
        let early_completion = time_to_finish < window;
        let time_consumed = time_to_finish.min(window);

        let expected_events = rate * time_consumed;
        let bonus_units = expected_events * inputs.bonus_per_event * inputs.success_probability;
        let units_completed = inputs.progress_rate * time_consumed + bonus_units;
        let units_remaining = if early_completion {
            0.0
        } else {
            (units_remaining - units_completed).max(0.0)
        };

        WindowProgress {
            units_completed,
            units_remaining,
            expected_events,
            expected_successful_events: expected_events * inputs.success_probability,
            time_consumed,
            early_completion,
            effective_progress_rate,
        }
    }
}
