//! Final stat resolution for a build snapshot.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::build::{BuildSelection, BuildState};
use crate::data::catalog::{Catalog, StatMappings};
use crate::data::stat::{BaseStats, Stat};
use crate::engine::collector::{collect, Collected};
use crate::engine::toggles::ToggleState;

/// Everything a calculation reads besides the build itself.
#[derive(Clone, Copy)]
pub struct CalcContext<'a> {
    pub stat_values: &'a StatMappings,
    pub toggles: &'a (dyn ToggleState + Sync),
    pub config: &'a EngineConfig,
}

impl<'a> CalcContext<'a> {
    pub fn new(
        stat_values: &'a StatMappings,
        toggles: &'a (dyn ToggleState + Sync),
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            stat_values,
            toggles,
            config,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStats {
    pub walk_speed: f64,
    pub run_speed: f64,
    pub stealth: f64,
    pub extraction_speed: f64,
    pub stamina: f64,
    pub skill_check_amount: f64,
    pub skill_check_size: f64,
    /// Probability in 0..1, never rounded.
    pub skill_check_chance: f64,
    pub stamina_regen: f64,
    pub hearts: f64,
}

impl FinalStats {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::WalkSpeed => Some(self.walk_speed),
            Stat::RunSpeed => Some(self.run_speed),
            Stat::Stealth => Some(self.stealth),
            Stat::ExtractionSpeed => Some(self.extraction_speed),
            Stat::Stamina => Some(self.stamina),
            Stat::SkillCheckAmount => Some(self.skill_check_amount),
            Stat::SkillCheckSize => Some(self.skill_check_size),
            Stat::SkillCheckChance => Some(self.skill_check_chance),
            Stat::StaminaRegen => Some(self.stamina_regen),
            Stat::Hearts => Some(self.hearts),
            Stat::MovementSpeed => None,
        }
    }
}

/// Display-only net percentage change per stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentages {
    pub walk_speed: f64,
    pub run_speed: f64,
    pub stealth: f64,
    pub extraction_speed: f64,
    pub stamina: f64,
    pub skill_check_amount: f64,
    pub skill_check_size: f64,
    pub stamina_regen: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStatBases {
    pub skill_check_size: f64,
    pub skill_check_size_original: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub base: BaseStats,
    #[serde(rename = "final")]
    pub final_stats: FinalStats,
    pub percentages: Percentages,
    pub original_base: BaseStats,
    pub derived_stat_bases: DerivedStatBases,
}

/// Resolve collected buckets into final values and display percentages.
pub fn resolve(collected: &Collected, stamina_regen_base: f64) -> CalculationResult {
    let base = collected.base;
    let buckets = &collected.buckets;
    let walk = buckets.movement(Stat::WalkSpeed);
    let run = buckets.movement(Stat::RunSpeed);
    let stealth = buckets.bucket(Stat::Stealth);
    let extraction = buckets.bucket(Stat::ExtractionSpeed);
    let stamina = buckets.bucket(Stat::Stamina);
    let amount = buckets.bucket(Stat::SkillCheckAmount);
    let size = buckets.bucket(Stat::SkillCheckSize);
    let chance = buckets.bucket(Stat::SkillCheckChance);
    let regen = buckets.bucket(Stat::StaminaRegen);
    let size_base = collected.skill_check_size_base;

    let final_stats = FinalStats {
        walk_speed: walk.resolve(base.walk_speed),
        run_speed: run.resolve(base.run_speed),
        stealth: stealth.resolve(base.stealth),
        extraction_speed: extraction.resolve(base.extraction_speed),
        stamina: stamina.resolve(base.stamina),
        skill_check_amount: amount.resolve(base.skill_check_amount),
        skill_check_size: size.resolve(size_base),
        skill_check_chance: chance.resolve(base.skill_check_chance),
        stamina_regen: regen.resolve(stamina_regen_base),
        hearts: base.hearts,
    };

    let percentages = Percentages {
        walk_speed: walk.net_percentage(base.walk_speed),
        run_speed: run.net_percentage(base.run_speed),
        stealth: stealth.net_percentage(base.stealth),
        extraction_speed: extraction.net_percentage(base.extraction_speed),
        stamina: stamina.net_percentage(base.stamina),
        skill_check_amount: amount.net_percentage(base.skill_check_amount),
        skill_check_size: size.net_percentage(size_base),
        stamina_regen: regen.net_percentage(stamina_regen_base),
    };

    CalculationResult {
        base,
        final_stats,
        percentages,
        original_base: collected.original_base,
        derived_stat_bases: DerivedStatBases {
            skill_check_size: size_base,
            skill_check_size_original: collected.skill_check_size_original,
        },
    }
}

/// Full collect + resolve pass. Pure apart from the toggle lookup.
pub fn calculate_final_stats(state: &BuildState, ctx: &CalcContext<'_>) -> CalculationResult {
    let collected = collect(state, ctx);
    resolve(&collected, ctx.config.stamina_regen_base)
}

/// Resolve `selection` against `catalog` and calculate it. `None` when the
/// selected toon does not exist.
pub fn calculate_selection(
    catalog: &Catalog,
    selection: &BuildSelection,
    ctx: &CalcContext<'_>,
) -> Option<CalculationResult> {
    let state = catalog.resolve_build(selection, ctx.config.max_stack_count)?;
    Some(calculate_final_stats(&state, ctx))
}
