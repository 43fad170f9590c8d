//! Player speed against twisted chase speeds.

use serde::Serialize;

use crate::data::catalog::Twisted;
use crate::engine::calculator::FinalStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpeedTier {
    /// Walking is already fast enough.
    Outpaces,
    /// Only running escapes.
    OutrunsWhileRunning,
    Caught,
}

pub fn compare_speed(walk: f64, run: f64, threat: f64) -> SpeedTier {
    if walk >= threat {
        SpeedTier::Outpaces
    } else if run > threat {
        SpeedTier::OutrunsWhileRunning
    } else {
        SpeedTier::Caught
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwistedMatchup {
    pub twisted_id: String,
    pub name: String,
    pub normal: SpeedTier,
    pub panic: SpeedTier,
    pub panic_suppressed: SpeedTier,
}

/// Tier against each twisted's run speed in every chase state.
pub fn twisted_matchups<'a, I>(stats: &FinalStats, twisteds: I) -> Vec<TwistedMatchup>
where
    I: IntoIterator<Item = &'a Twisted>,
{
    let tier = |threat: f64| compare_speed(stats.walk_speed, stats.run_speed, threat);
    twisteds
        .into_iter()
        .map(|twisted| TwistedMatchup {
            twisted_id: twisted.id.clone(),
            name: twisted.name.clone(),
            normal: tier(twisted.speeds.normal.run),
            panic: tier(twisted.speeds.panic.run),
            panic_suppressed: tier(twisted.speeds.panic_suppressed.run),
        })
        .collect()
}
