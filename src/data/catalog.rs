//! Read-only catalog of toons, trinkets, items and twisteds, plus the
//! star-rating lookup tables. Built once by the loader and never mutated.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::effect::Effect;
use crate::data::stat::{BaseStats, StarRatings, Stat};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub id: String,
    pub name: String,
    /// When true the player effect only applies while the external toggle is on.
    pub has_toggle: bool,
    pub player_effects: Vec<Effect>,
    pub team_effects: Vec<Effect>,
}

/// Named alternative stat set a toon can be switched into (e.g. heart tiers).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalStatSet {
    pub name: String,
    /// Replaces base stats outright.
    pub stat_modifiers: BTreeMap<Stat, f64>,
    /// Each entry becomes one multiplicative modifier.
    pub modifier_overrides: BTreeMap<Stat, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toon {
    pub id: String,
    pub name: String,
    pub base_stats: BaseStats,
    pub star_ratings: StarRatings,
    pub abilities: [Option<Ability>; 2],
    pub conditional_stats: Vec<ConditionalStatSet>,
    /// Fraction of every machine completed automatically.
    pub machine_head_start: Option<f64>,
}

impl Toon {
    pub fn abilities(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.iter().flatten()
    }

    pub fn conditional_stat(&self, name: &str) -> Option<&ConditionalStatSet> {
        self.conditional_stats.iter().find(|set| set.name == name)
    }
}

/// Trinket behaviors that do not fit the generic effect pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TrinketSpecial {
    /// Movement multiplier whose run speed result is held at the engine's cap.
    RunSpeedCappedStack,
    /// Flat bonus to a stat chosen at equip time.
    SelectableStat { bonus: f64 },
    /// `min(per_toon * team_size, max_bonus)` base stamina.
    #[serde(rename_all = "camelCase")]
    TeamScaledStamina { per_toon: f64, max_bonus: f64 },
    /// Removes work units from the first machine only.
    FirstMachineHeadStart { units: f64 },
    /// Extends the duration of candy items.
    CandyDurationExtension { seconds: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trinket {
    pub id: String,
    pub name: String,
    pub stackable: bool,
    pub hidden: bool,
    pub effects: Vec<Effect>,
    pub special: Option<TrinketSpecial>,
}

impl Trinket {
    pub fn is_run_speed_capped(&self) -> bool {
        self.special == Some(TrinketSpecial::RunSpeedCappedStack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemSpecial {
    /// Completes `fraction` of the machine per item, up front.
    InstantCompletion { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub effects: Vec<Effect>,
    /// Seconds the item stays active. `None` means permanent.
    pub duration: Option<f64>,
    pub special: Option<ItemSpecial>,
    pub candy: bool,
}

impl Item {
    pub fn instant_completion(&self) -> Option<f64> {
        match self.special {
            Some(ItemSpecial::InstantCompletion { fraction }) => Some(fraction),
            None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeedPair {
    pub walk: f64,
    pub run: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwistedSpeeds {
    pub normal: SpeedPair,
    pub panic: SpeedPair,
    pub panic_suppressed: SpeedPair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Twisted {
    pub id: String,
    pub name: String,
    pub speeds: TwistedSpeeds,
}

/// A team ability as activated from a teammate's ability slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAbility {
    pub id: String,
    pub name: String,
    pub effects: Vec<Effect>,
}

/// Star rating -> value tables keyed by stat name (`stat-mappings.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatMappings(pub HashMap<String, BTreeMap<u8, f64>>);

impl StatMappings {
    /// Value for `stat` at `stars`; 0.0 on miss.
    pub fn value(&self, stat: &str, stars: u8) -> f64 {
        self.0
            .get(stat)
            .and_then(|table| table.get(&stars))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn insert(&mut self, stat: &str, stars: u8, value: f64) {
        self.0.entry(stat.to_string()).or_default().insert(stars, value);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub stat_mappings: StatMappings,
    pub toons: Vec<Toon>,
    pub trinkets: Vec<Trinket>,
    pub items: Vec<Item>,
    pub twisteds: Vec<Twisted>,
}

impl Catalog {
    pub fn toon(&self, id: &str) -> Option<&Toon> {
        self.toons.iter().find(|toon| toon.id == id)
    }

    pub fn trinket(&self, id: &str) -> Option<&Trinket> {
        self.trinkets.iter().find(|trinket| trinket.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn twisted(&self, id: &str) -> Option<&Twisted> {
        self.twisteds.iter().find(|twisted| twisted.id == id)
    }

    /// Find a team ability by ability id across every toon's slots.
    pub fn team_ability(&self, id: &str) -> Option<TeamAbility> {
        self.toons
            .iter()
            .flat_map(Toon::abilities)
            .find(|ability| ability.id == id && !ability.team_effects.is_empty())
            .map(|ability| TeamAbility {
                id: ability.id.clone(),
                name: ability.name.clone(),
                effects: ability.team_effects.clone(),
            })
    }

    pub fn stat_value(&self, stat: &str, stars: u8) -> f64 {
        self.stat_mappings.value(stat, stars)
    }
}
