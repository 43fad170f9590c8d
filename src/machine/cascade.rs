//! Machine completion with time-limited items. Elapsed time is split at every
//! item expiry; stats are recalculated for each window and work units are
//! consumed window by window until the machine is done.

use serde::Serialize;
use tracing::debug;

use crate::data::build::BuildState;
use crate::data::catalog::TrinketSpecial;
use crate::engine::calculator::{calculate_final_stats, CalcContext, FinalStats};
use crate::machine::completion::{round_to, CompletionEstimate, ProgressInputs};

/// An active item that expires mid-machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedEffect {
    pub item_id: String,
    pub name: String,
    /// Catalog duration in seconds.
    pub duration: f64,
    /// Duration after trinket extensions.
    pub effective_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStats {
    pub extraction_speed: f64,
    pub skill_check_amount: f64,
    pub skill_check_chance: f64,
}

impl From<&FinalStats> for StepStats {
    fn from(stats: &FinalStats) -> Self {
        Self {
            extraction_speed: stats.extraction_speed,
            skill_check_amount: stats.skill_check_amount,
            skill_check_chance: stats.skill_check_chance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeStep {
    /// Expiry timestamp closing this window.
    pub time_point: f64,
    pub items_expired: Vec<String>,
    pub stats_at_step: StepStats,
    pub units_completed: f64,
    pub units_remaining: f64,
    pub events_this_window: f64,
    pub successful_events_this_window: f64,
    pub actual_time_taken: f64,
    pub early_completion: bool,
    pub effective_progress_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResult {
    pub total_time: f64,
    /// Time at the initial extraction speed with no skill checks.
    pub default_time: f64,
    pub total_expected_events: f64,
    pub total_expected_successful_events: f64,
    /// Initial effective rate.
    pub effective_progress_rate: f64,
    /// The machine was finished before any time passed.
    pub instant: bool,
    pub step_breakdown: Vec<CascadeStep>,
}

impl CascadeResult {
    fn instant() -> CascadeResult {
        CascadeResult {
            instant: true,
            ..CascadeResult::default()
        }
    }

    fn from_estimate(estimate: &CompletionEstimate) -> CascadeResult {
        CascadeResult {
            total_time: estimate.expected_time,
            default_time: estimate.default_time,
            total_expected_events: estimate.expected_events,
            total_expected_successful_events: estimate.expected_successful_events,
            effective_progress_rate: estimate.effective_progress_rate,
            instant: false,
            step_breakdown: Vec::new(),
        }
    }

    /// Presentation copy: 1 decimal for times and counts, 2 for rates.
    pub fn rounded(&self) -> CascadeResult {
        CascadeResult {
            total_time: round_to(self.total_time, 1),
            default_time: round_to(self.default_time, 1),
            total_expected_events: round_to(self.total_expected_events, 1),
            total_expected_successful_events: round_to(self.total_expected_successful_events, 1),
            effective_progress_rate: round_to(self.effective_progress_rate, 2),
            instant: self.instant,
            step_breakdown: self
                .step_breakdown
                .iter()
                .map(|step| CascadeStep {
                    time_point: round_to(step.time_point, 1),
                    units_completed: round_to(step.units_completed, 2),
                    units_remaining: round_to(step.units_remaining, 2),
                    events_this_window: round_to(step.events_this_window, 2),
                    successful_events_this_window: round_to(step.successful_events_this_window, 2),
                    actual_time_taken: round_to(step.actual_time_taken, 1),
                    effective_progress_rate: round_to(step.effective_progress_rate, 2),
                    ..step.clone()
                })
                .collect(),
        }
    }
}

/// Progress inputs taken from resolved stats.
pub fn progress_inputs(stats: &FinalStats, success_probability: f64) -> ProgressInputs {
    ProgressInputs {
        progress_rate: stats.extraction_speed,
        bonus_per_event: stats.skill_check_amount,
        success_probability,
        event_chance: stats.skill_check_chance,
    }
}

/// Active items with a positive duration, excluding instant-completion
/// items. Candy items are extended while a candy-extension trinket is on.
pub fn timed_effects_for(state: &BuildState) -> Vec<TimedEffect> {
    let extension: f64 = state
        .trinkets
        .iter()
        .find_map(|equipped| match equipped.trinket.special {
            Some(TrinketSpecial::CandyDurationExtension { seconds }) => Some(seconds),
            _ => None,
        })
        .unwrap_or(0.0);

    state
        .items
        .iter()
        .filter(|active| active.count > 0 && active.item.instant_completion().is_none())
        .filter_map(|active| {
            let duration = active.item.duration?;
            let bonus = if active.item.candy { extension } else { 0.0 };
            Some(TimedEffect {
                item_id: active.item.id.clone(),
                name: active.item.name.clone(),
                duration,
                effective_duration: duration + bonus,
            })
        })
        .collect()
}

struct TimelinePoint<'a> {
    time: f64,
    expired: Vec<&'a TimedEffect>,
}

/// Distinct expiry times in ascending order, each with the effects ending there.
fn build_timeline(timed: &[TimedEffect]) -> Vec<TimelinePoint<'_>> {
    let mut times: Vec<f64> = timed.iter().map(|effect| effect.effective_duration).collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
        .into_iter()
        .map(|time| TimelinePoint {
            time,
            expired: timed
                .iter()
                .filter(|effect| effect.effective_duration == time)
                .collect(),
        })
        .collect()
}

/// Expected completion of `units` work with `timed` items expiring along the
/// way. Non-positive `units` is an instant completion.
pub fn schedule_completion(
    state: &BuildState,
    timed: &[TimedEffect],
    units: f64,
    ctx: &CalcContext<'_>,
) -> CascadeResult {
    if units <= 0.0 {
        return CascadeResult::instant();
    }
    let model = &ctx.config.machine;
    let success = state.skill_check_success_rate;
    let initial = calculate_final_stats(state, ctx).final_stats;
    let initial_inputs = progress_inputs(&initial, success);

    if timed.is_empty() {
        return CascadeResult::from_estimate(&model.estimate(&initial_inputs, units));
    }

    let mut steps = Vec::new();
    let mut remaining = units;
    let mut elapsed = 0.0;
    let mut events = 0.0;
    let mut successful_events = 0.0;
    let mut working = state.clone();

    for point in build_timeline(timed) {
        let window = point.time - elapsed;
        if window <= 0.0 {
            continue;
        }

        let stats = calculate_final_stats(&working, ctx).final_stats;
        let progress = model.progress_window(&progress_inputs(&stats, success), window, remaining);
        debug!(
            time_point = point.time,
            window,
            units_remaining = progress.units_remaining,
            early = progress.early_completion,
            "cascade window"
        );

        remaining = progress.units_remaining;
        elapsed += progress.time_consumed;
        events += progress.expected_events;
        successful_events += progress.expected_successful_events;

        steps.push(CascadeStep {
            time_point: point.time,
            items_expired: point.expired.iter().map(|effect| effect.name.clone()).collect(),
            stats_at_step: StepStats::from(&stats),
            units_completed: progress.units_completed,
            units_remaining: progress.units_remaining,
            events_this_window: progress.expected_events,
            successful_events_this_window: progress.expected_successful_events,
            actual_time_taken: progress.time_consumed,
            early_completion: progress.early_completion,
            effective_progress_rate: progress.effective_progress_rate,
        });

        if progress.early_completion {
            break;
        }

        let expired_ids: Vec<String> = point
            .expired
            .iter()
            .map(|effect| effect.item_id.clone())
            .collect();
        working = working.without_items(&expired_ids);
    }

    if remaining > 0.0 {
        let stats = calculate_final_stats(&working, ctx).final_stats;
        let tail = model.estimate(&progress_inputs(&stats, success), remaining);
        debug!(units_remaining = remaining, time = tail.expected_time, "cascade final pass");
        elapsed += tail.expected_time;
        events += tail.expected_events;
        successful_events += tail.expected_successful_events;
    }

    CascadeResult {
        total_time: elapsed,
        default_time: units / initial.extraction_speed,
        total_expected_events: events,
        total_expected_successful_events: successful_events,
        effective_progress_rate: model.effective_progress_rate(&initial_inputs),
        instant: false,
        step_breakdown: steps,
    }
}

/// Default machine plus the first-machine scenario when a head-start
/// trinket is equipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineStats {
    pub default: CascadeResult,
    pub first_machine: CascadeResult,
    pub has_head_start_trinket: bool,
    /// Units left after up-front completion effects.
    pub starting_units: f64,
}

impl MachineStats {
    pub fn rounded(&self) -> MachineStats {
        MachineStats {
            default: self.default.rounded(),
            first_machine: self.first_machine.rounded(),
            has_head_start_trinket: self.has_head_start_trinket,
            starting_units: round_to(self.starting_units, 2),
        }
    }
}

/// Fraction of a machine completed up front by instant-completion items,
/// capped at 1.
pub fn instant_completion_fraction(state: &BuildState) -> f64 {
    state
        .items
        .iter()
        .filter_map(|active| {
            active
                .item
                .instant_completion()
                .map(|fraction| fraction * f64::from(active.count))
        })
        .sum::<f64>()
        .min(1.0)
}

/// Work units left after every up-front completion effect of the build.
pub fn starting_units(state: &BuildState, total_units: f64) -> f64 {
    let mut units = total_units * (1.0 - instant_completion_fraction(state));
    if let Some(head_start) = state.toon.machine_head_start {
        units *= 1.0 - head_start.clamp(0.0, 1.0);
    }
    units
}

fn first_machine_units(state: &BuildState) -> Option<f64> {
    state
        .trinkets
        .iter()
        .find_map(|equipped| match equipped.trinket.special {
            Some(TrinketSpecial::FirstMachineHeadStart { units }) => Some(units),
            _ => None,
        })
}

pub fn machine_stats(state: &BuildState, ctx: &CalcContext<'_>) -> MachineStats {
    let head_start = first_machine_units(state);
    let has_head_start_trinket = head_start.is_some();

    if instant_completion_fraction(state) >= 1.0 {
        return MachineStats {
            default: CascadeResult::instant(),
            first_machine: CascadeResult::instant(),
            has_head_start_trinket,
            starting_units: 0.0,
        };
    }

    let units = starting_units(state, ctx.config.machine.total_units);
    let timed = timed_effects_for(state);
    let default = schedule_completion(state, &timed, units, ctx);
    let first_machine = match head_start {
        Some(head_start) => schedule_completion(state, &timed, (units - head_start).max(0.0), ctx),
        None => default.clone(),
    };

    MachineStats {
        default,
        first_machine,
        has_head_start_trinket,
        starting_units: units,
    }
}
