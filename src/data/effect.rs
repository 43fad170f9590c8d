//! Normalized effect vocabulary. Every catalog effect is converted into one of
//! these variants before it reaches the modifier collector.

use serde::{Deserialize, Serialize};

use crate::data::stat::Stat;

/// How a catalog effect is folded into a stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationType {
    Multiplicative,
    Additive,
    BaseStatIncrease,
}

impl ApplicationType {
    pub fn from_name(name: &str) -> Option<ApplicationType> {
        match name.trim() {
            "multiplicative" => Some(Self::Multiplicative),
            "additive" => Some(Self::Additive),
            "baseStatIncrease" => Some(Self::BaseStatIncrease),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Effect {
    /// Pushes `(1 + value)` into the stat's product, optionally clamped.
    Multiplicative {
        stat: Stat,
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cap: Option<f64>,
    },
    /// Added to the base before multiplication.
    Additive { stat: Stat, value: f64 },
    /// Raises the base stat itself (per stack).
    BaseIncrease { stat: Stat, value: f64 },
    /// Replaces a base stat. Walk/run overrides add instead of replacing.
    BaseOverride { stat: Stat, value: f64 },
    /// Additive bonus scaled by team size, applied once.
    PerTeamMember { stat: Stat, value: f64 },
    /// Resolved outside the automatic pipeline.
    Special,
}

impl Effect {
    /// Build an effect from a stat + application type pair.
    pub fn from_application(
        stat: Stat,
        application: ApplicationType,
        value: f64,
        cap: Option<f64>,
    ) -> Effect {
        match application {
            ApplicationType::Multiplicative => Effect::Multiplicative { stat, value, cap },
            ApplicationType::Additive => Effect::Additive { stat, value },
            ApplicationType::BaseStatIncrease => Effect::BaseIncrease { stat, value },
        }
    }
}
