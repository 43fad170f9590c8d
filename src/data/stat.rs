//! Stat vocabulary and the per-toon base stat block.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every stat the engine knows about. Catalog names are normalized into this
/// enum at ingestion; engine internals never see raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    /// Shared walk + run modifier.
    MovementSpeed,
    WalkSpeed,
    RunSpeed,
    Stealth,
    ExtractionSpeed,
    Stamina,
    /// Bonus work units granted by a successful skill check.
    SkillCheckAmount,
    /// Visual size of the skill check target.
    SkillCheckSize,
    /// Per-second probability of being offered a skill check.
    SkillCheckChance,
    StaminaRegen,
    Hearts,
}

impl Stat {
    /// Stats that own a modifier bucket.
    pub const BUCKETED: [Stat; 10] = [
        Stat::MovementSpeed,
        Stat::WalkSpeed,
        Stat::RunSpeed,
        Stat::Stealth,
        Stat::ExtractionSpeed,
        Stat::Stamina,
        Stat::SkillCheckAmount,
        Stat::SkillCheckSize,
        Stat::SkillCheckChance,
        Stat::StaminaRegen,
    ];

    /// Resolve a catalog stat name, following the alias table. Unknown names
    /// return `None`.
    pub fn from_name(name: &str) -> Option<Stat> {
        match name.trim() {
            "movementSpeed" => Some(Stat::MovementSpeed),
            "walkSpeed" => Some(Stat::WalkSpeed),
            "runSpeed" => Some(Stat::RunSpeed),
            "stealth" | "stealthRating" => Some(Stat::Stealth),
            "extractionSpeed" => Some(Stat::ExtractionSpeed),
            "stamina" => Some(Stat::Stamina),
            "skillCheckAmount" => Some(Stat::SkillCheckAmount),
            "skillCheckSize" => Some(Stat::SkillCheckSize),
            "skillCheckChance" => Some(Stat::SkillCheckChance),
            "staminaRegen" => Some(Stat::StaminaRegen),
            "hearts" => Some(Stat::Hearts),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MovementSpeed => "movementSpeed",
            Self::WalkSpeed => "walkSpeed",
            Self::RunSpeed => "runSpeed",
            Self::Stealth => "stealth",
            Self::ExtractionSpeed => "extractionSpeed",
            Self::Stamina => "stamina",
            Self::SkillCheckAmount => "skillCheckAmount",
            Self::SkillCheckSize => "skillCheckSize",
            Self::SkillCheckChance => "skillCheckChance",
            Self::StaminaRegen => "staminaRegen",
            Self::Hearts => "hearts",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base stats stored on a toon. Stats without a field here (movementSpeed,
/// skillCheckSize, staminaRegen) are derived elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseStats {
    pub walk_speed: f64,
    pub run_speed: f64,
    pub stealth: f64,
    pub extraction_speed: f64,
    pub stamina: f64,
    pub skill_check_amount: f64,
    pub skill_check_chance: f64,
    pub hearts: f64,
}

impl BaseStats {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::WalkSpeed => Some(self.walk_speed),
            Stat::RunSpeed => Some(self.run_speed),
            Stat::Stealth => Some(self.stealth),
            Stat::ExtractionSpeed => Some(self.extraction_speed),
            Stat::Stamina => Some(self.stamina),
            Stat::SkillCheckAmount => Some(self.skill_check_amount),
            Stat::SkillCheckChance => Some(self.skill_check_chance),
            Stat::Hearts => Some(self.hearts),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> Option<&mut f64> {
        match stat {
            Stat::WalkSpeed => Some(&mut self.walk_speed),
            Stat::RunSpeed => Some(&mut self.run_speed),
            Stat::Stealth => Some(&mut self.stealth),
            Stat::ExtractionSpeed => Some(&mut self.extraction_speed),
            Stat::Stamina => Some(&mut self.stamina),
            Stat::SkillCheckAmount => Some(&mut self.skill_check_amount),
            Stat::SkillCheckChance => Some(&mut self.skill_check_chance),
            Stat::Hearts => Some(&mut self.hearts),
            _ => None,
        }
    }

    /// Overwrite the listed stats (stat-set swap). Stats without a base field
    /// are ignored.
    pub fn merge_from<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a Stat, &'a f64)>,
    {
        for (stat, value) in values {
            if let Some(slot) = self.get_mut(*stat) {
                *slot = *value;
            }
        }
    }
}

/// Per-stat star ratings (1-5). Only used for display and for looking up
/// derived base values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarRatings {
    pub walk_speed: u8,
    pub run_speed: u8,
    pub stealth: u8,
    pub extraction_speed: u8,
    pub stamina: u8,
    pub skill_check_amount: u8,
}

impl Default for StarRatings {
    fn default() -> Self {
        Self {
            walk_speed: 1,
            run_speed: 1,
            stealth: 1,
            extraction_speed: 1,
            stamina: 1,
            skill_check_amount: 1,
        }
    }
}
