use rayon::prelude::*;
use serde::Serialize;

use crate::data::build::BuildSelection;
use crate::data::catalog::Catalog;
use crate::engine::calculator::{calculate_final_stats, CalcContext};
use crate::machine::cascade::machine_stats;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedToon {
    pub toon_id: String,
    pub name: String,
    pub expected_time: f64,
    pub first_machine_time: f64,
    pub walk_speed: f64,
    pub run_speed: f64,
    pub stealth: f64,
}

/// Evaluate the same build on every toon and order by expected machine
/// time, fastest first. Ties break on toon id.
pub fn rank_toons(
    catalog: &Catalog,
    selection: &BuildSelection,
    ctx: &CalcContext<'_>,
    parallel: bool,
) -> Vec<RankedToon> {
    let run_one = |toon_id: &String| -> Option<RankedToon> {
        let candidate = BuildSelection {
            toon: toon_id.clone(),
            ..selection.clone()
        };
        let state = catalog.resolve_build(&candidate, ctx.config.max_stack_count)?;
        let stats = calculate_final_stats(&state, ctx).final_stats;
        let machine = machine_stats(&state, ctx);
        Some(RankedToon {
            toon_id: state.toon.id.clone(),
            name: state.toon.name.clone(),
            expected_time: machine.default.total_time,
            first_machine_time: machine.first_machine.total_time,
            walk_speed: stats.walk_speed,
            run_speed: stats.run_speed,
            stealth: stats.stealth,
        })
    };

    let toon_ids: Vec<String> = catalog.toons.iter().map(|toon| toon.id.clone()).collect();
    let mut ranked: Vec<RankedToon> = if parallel {
        toon_ids.par_iter().filter_map(run_one).collect()
    } else {
        toon_ids.iter().filter_map(run_one).collect()
    };

    ranked.sort_by(|left, right| {
        left.expected_time
            .total_cmp(&right.expected_time)
            .then_with(|| left.toon_id.cmp(&right.toon_id))
    });
    ranked
}
