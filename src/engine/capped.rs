//! Movement trinket whose stacked run speed is held at a hard ceiling, plus
//! the equip-time gating that goes with it.

use thiserror::Error;
use tracing::debug;

use crate::data::build::{BuildState, EquippedTrinket};
use crate::data::catalog::Trinket;
use crate::data::effect::Effect;
use crate::data::stat::Stat;
use crate::engine::calculator::{calculate_final_stats, CalcContext};
use crate::engine::stacking::{ModifierBuckets, Multiplier};

/// Per-stack bonus when the trinket declares no movement multiplier.
pub const DEFAULT_CAPPED_STACK_MODIFIER: f64 = 0.25;

/// Slack for `cap / base - 1` landing a hair under the cap after resolve.
const SATURATION_EPSILON: f64 = 1e-9;

fn saturated(current: f64, simulated: f64, cap: f64) -> bool {
    current >= cap - SATURATION_EPSILON && (simulated - current).abs() <= SATURATION_EPSILON
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquipRejection {
    #[error("stack limit of {max} reached")]
    StackLimit { max: u32 },
    #[error("movement speed already at the cap of {cap}")]
    RunSpeedCapReached { cap: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CappedStack {
    /// Total stacks across every equipped entry.
    pub count: u32,
    /// Per-stack movement multiplier value.
    pub modifier: f64,
}

impl CappedStack {
    /// Total count and the last movement multiplier seen. `None` when no
    /// capped trinket is equipped.
    pub fn extract(trinkets: &[EquippedTrinket]) -> Option<CappedStack> {
        let mut count = 0;
        let mut modifier = DEFAULT_CAPPED_STACK_MODIFIER;
        for equipped in trinkets
            .iter()
            .filter(|equipped| equipped.trinket.is_run_speed_capped())
        {
            count += equipped.count;
            for effect in &equipped.trinket.effects {
                if let Effect::Multiplicative {
                    stat: Stat::MovementSpeed,
                    value,
                    ..
                } = *effect
                {
                    modifier = value;
                }
            }
        }
        (count > 0).then_some(CappedStack { count, modifier })
    }

    /// Combined multiplier before capping.
    pub fn projected_multiplier(&self) -> f64 {
        let exponent = i32::try_from(self.count).unwrap_or(i32::MAX);
        (1.0 + self.modifier).powi(exponent)
    }
}

/// Push the stack into the shared movement bucket. Below the cap every stack
/// is its own entry; above it a single entry lands run speed exactly on the
/// cap and walk speed takes the same multiplier.
pub fn apply_capped_stack(
    buckets: &mut ModifierBuckets,
    base_run_speed: f64,
    stack: CappedStack,
    cap: f64,
) {
    let projected = base_run_speed * stack.projected_multiplier();
    if projected > cap && base_run_speed > 0.0 {
        let effective = cap / base_run_speed - 1.0;
        buckets.push_multiplier(Stat::MovementSpeed, Multiplier::new(effective));
        return;
    }
    for _ in 0..stack.count {
        buckets.push_multiplier(Stat::MovementSpeed, Multiplier::new(stack.modifier));
    }
}

/// Equip one more of `trinket`. Non-stackable trinkets already equipped are
/// left as is; stackable ones are limited to the configured stack count; the
/// capped movement trinket is refused once another stack would not move
/// walk or run speed off an already saturated value.
pub fn equip_trinket(
    state: &BuildState,
    trinket: &Trinket,
    ctx: &CalcContext<'_>,
) -> Result<BuildState, EquipRejection> {
    if !trinket.stackable {
        if state.has_trinket(&trinket.id) {
            return Ok(state.clone());
        }
        return Ok(state.clone().with_trinket(trinket.clone(), 1));
    }

    let max = ctx.config.max_stack_count.max(1);
    if state.trinket_count(&trinket.id) >= max {
        return Err(EquipRejection::StackLimit { max });
    }

    let next = state.with_extra_stack(trinket);
    if trinket.is_run_speed_capped() {
        let cap = ctx.config.run_speed_cap;
        let current = calculate_final_stats(state, ctx).final_stats;
        let simulated = calculate_final_stats(&next, ctx).final_stats;
        if saturated(current.walk_speed, simulated.walk_speed, cap)
            || saturated(current.run_speed, simulated.run_speed, cap)
        {
            debug!(trinket = %trinket.id, cap, "capped stack refused");
            return Err(EquipRejection::RunSpeedCapReached { cap });
        }
    }
    Ok(next)
}

/// Remove one stack of `id`; non-stackable entries disappear entirely.
pub fn unequip_trinket(state: &BuildState, id: &str) -> BuildState {
    let stackable = state
        .trinkets
        .iter()
        .find(|equipped| equipped.trinket.id == id)
        .is_some_and(|equipped| equipped.trinket.stackable);
    if stackable {
        return state.without_stack(id);
    }
    let mut next = state.clone();
    next.trinkets.retain(|equipped| equipped.trinket.id != id);
    next
}
