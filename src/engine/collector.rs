//! Walks every active modifier source of a build and folds it into base
//! stats and per-stat modifier buckets.

use serde::Serialize;

use crate::data::build::BuildState;
use crate::data::catalog::{Ability, TrinketSpecial};
use crate::data::effect::Effect;
use crate::data::stat::{BaseStats, Stat};
use crate::engine::calculator::CalcContext;
use crate::engine::capped::{apply_capped_stack, CappedStack};
use crate::engine::stacking::{ModifierBuckets, Multiplier};
use crate::engine::toggles::ToggleState;

/// Lookup table name for the star-rated skill check size.
pub const SKILL_CHECK_SIZE_TABLE: &str = "skillCheckSize";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collected {
    /// Base stats after overrides and base increases.
    pub base: BaseStats,
    /// Base stats after overrides, before base increases.
    pub original_base: BaseStats,
    pub buckets: ModifierBuckets,
    pub skill_check_size_base: f64,
    /// Star-rating lookup before any flat increase.
    pub skill_check_size_original: f64,
}

fn ability_active(ability: &Ability, toggles: &dyn ToggleState) -> bool {
    !ability.has_toggle || toggles.is_enabled(&ability.id)
}

fn apply_base_overrides(base: &mut BaseStats, ability: &Ability) {
    for effect in &ability.player_effects {
        let Effect::BaseOverride { stat, value } = *effect else {
            continue;
        };
        let Some(slot) = base.get_mut(stat) else {
            continue;
        };
        match stat {
            Stat::WalkSpeed | Stat::RunSpeed => *slot += value,
            _ => *slot = value,
        }
    }
}

fn apply_base_increases(base: &mut BaseStats, effects: &[Effect], count: u32) {
    for effect in effects {
        if let Effect::BaseIncrease { stat, value } = *effect {
            if let Some(slot) = base.get_mut(stat) {
                *slot += value * f64::from(count);
            }
        }
    }
}

fn skill_check_size_increase(effects: &[Effect], count: u32) -> f64 {
    effects
        .iter()
        .filter_map(|effect| match *effect {
            Effect::BaseIncrease {
                stat: Stat::SkillCheckSize,
                value,
            } => Some(value * f64::from(count)),
            _ => None,
        })
        .sum()
}

fn apply_player_effects(buckets: &mut ModifierBuckets, ability: &Ability, team_size: u32) {
    for effect in &ability.player_effects {
        match *effect {
            Effect::PerTeamMember { stat, value } => {
                buckets.push_additive(stat, value * f64::from(team_size));
            }
            Effect::Multiplicative { .. } | Effect::Additive { .. } => buckets.apply(effect),
            Effect::BaseIncrease { .. } | Effect::BaseOverride { .. } | Effect::Special => {}
        }
    }
}

/// Fold every source of `state` into base stats and modifier buckets.
pub fn collect(state: &BuildState, ctx: &CalcContext<'_>) -> Collected {
    let toon = &state.toon;
    let active_abilities: Vec<&Ability> = toon
        .abilities()
        .filter(|ability| ability_active(ability, ctx.toggles))
        .collect();

    let mut base = toon.base_stats;
    if let Some(set) = &state.conditional_stat {
        base.merge_from(&set.stat_modifiers);
    }

    for ability in &active_abilities {
        apply_base_overrides(&mut base, ability);
    }
    let original_base = base;

    for equipped in &state.trinkets {
        match equipped.trinket.special {
            Some(TrinketSpecial::SelectableStat { bonus }) => {
                if let Some(stat) = equipped.selected_stat {
                    if let Some(slot) = base.get_mut(stat) {
                        *slot += bonus * f64::from(equipped.count);
                    }
                }
            }
            Some(TrinketSpecial::TeamScaledStamina { per_toon, max_bonus }) => {
                base.stamina += (per_toon * f64::from(state.team_size)).min(max_bonus);
            }
            _ => apply_base_increases(&mut base, &equipped.trinket.effects, equipped.count),
        }
    }
    for active in &state.items {
        apply_base_increases(&mut base, &active.item.effects, active.count);
    }

    let mut buckets = ModifierBuckets::new();

    for ability in &active_abilities {
        apply_player_effects(&mut buckets, ability, state.team_size);
    }

    if let Some(set) = &state.conditional_stat {
        for (stat, value) in &set.modifier_overrides {
            buckets.push_multiplier(*stat, Multiplier::new(*value));
        }
    }

    let capped = CappedStack::extract(&state.trinkets);

    for equipped in state
        .trinkets
        .iter()
        .filter(|equipped| !equipped.trinket.is_run_speed_capped())
    {
        buckets.apply_repeated(&equipped.trinket.effects, equipped.count);
    }

    if let Some(stack) = capped {
        apply_capped_stack(&mut buckets, base.run_speed, stack, ctx.config.run_speed_cap);
    }

    for ability in &state.team_abilities {
        buckets.apply_repeated(&ability.effects, 1);
    }

    for active in &state.items {
        buckets.apply_repeated(&active.item.effects, active.count);
    }

    let skill_check_size_original = ctx
        .stat_values
        .value(SKILL_CHECK_SIZE_TABLE, toon.star_ratings.skill_check_amount);
    let skill_check_size_base = skill_check_size_original
        + state
            .trinkets
            .iter()
            .map(|equipped| skill_check_size_increase(&equipped.trinket.effects, equipped.count))
            .sum::<f64>()
        + state
            .items
            .iter()
            .map(|active| skill_check_size_increase(&active.item.effects, active.count))
            .sum::<f64>();

    Collected {
        base,
        original_base,
        buckets,
        skill_check_size_base,
        skill_check_size_original,
    }
}
