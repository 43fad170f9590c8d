//! Raw catalog records as they appear in the JSON data files, and their
//! conversion into the normalized catalog model.
//!
//! Effect objects are kept as untyped JSON until conversion so that one
//! malformed entry is skipped instead of failing the whole file.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::data::catalog::{
    Ability, ConditionalStatSet, Item, ItemSpecial, SpeedPair, Toon, Trinket, TrinketSpecial,
    Twisted, TwistedSpeeds,
};
use crate::data::effect::{ApplicationType, Effect};
use crate::data::stat::{BaseStats, StarRatings, Stat};

pub const RUN_SPEED_CAPPED_TRINKET_ID: &str = "bone";
pub const SELECTABLE_STAT_TRINKET_ID: &str = "lucky_coin";
pub const TEAM_SCALED_TRINKET_ID: &str = "friendship_bracelet";
pub const HEAD_START_TRINKET_ID: &str = "wrench";
pub const CANDY_EXTENSION_TRINKET_ID: &str = "glazed_fondant_bag";
pub const INSTANT_COMPLETION_ITEM_ID: &str = "jumper_cable";
pub const HEAD_START_TOON_ID: &str = "eggson";

const DEFAULT_STAMINA_PER_TOON: f64 = 5.0;
const DEFAULT_TEAM_STAMINA_MAX: f64 = 40.0;
const DEFAULT_HEAD_START_UNITS: f64 = 15.0;
const DEFAULT_CANDY_EXTENSION_SECONDS: f64 = 4.0;
const DEFAULT_INSTANT_COMPLETION_FRACTION: f64 = 0.33;
const DEFAULT_TOON_HEAD_START_FRACTION: f64 = 0.10;

/// Items whose duration is extended by the candy-extension trinket.
pub const CANDY_ITEM_IDS: &[&str] = &[
    "gumballs",
    "stamina_candy",
    "stealth_candy",
    "chocolate",
    "speed_candy",
    "extraction_speed_candy",
    "skill_check_candy",
    "jawbreaker",
    "bonbon",
    "box_o_chocolates",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToonsFile {
    #[serde(default)]
    pub toons: Vec<ToonRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrinketsFile {
    #[serde(default)]
    pub trinkets: Vec<TrinketRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsFile {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwistedsFile {
    #[serde(default)]
    pub twisteds: Vec<TwistedRecord>,
}

/// `{ targetStat, applicationType, value, cap? }` on trinkets and items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectRecord {
    #[serde(default)]
    pub target_stat: Option<String>,
    #[serde(default)]
    pub application_type: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub cap: Option<f64>,
}

impl EffectRecord {
    /// Returns `None` for missing fields, unknown stats or unknown application types.
    pub fn to_effect(&self) -> Option<Effect> {
        let stat = Stat::from_name(self.target_stat.as_deref()?)?;
        let application = ApplicationType::from_name(self.application_type.as_deref()?)?;
        let value = self.value.filter(|v| v.is_finite())?;
        Some(Effect::from_application(stat, application, value, self.cap))
    }
}

/// Malformed field values read as absent instead of failing the whole block.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// Keeps the numeric entries of an override map.
fn numeric_entries<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_object().map(|entries| {
        entries
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|number| (name.clone(), number)))
            .collect()
    }))
}

/// Structured per-field bonus block used by `playerEffect` and `teamEffect`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredEffectRecord {
    #[serde(deserialize_with = "lenient")]
    pub application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub movement_speed: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub movement_speed_application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub extraction_speed: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub extraction_speed_application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_amount: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_amount_application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_size: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_size_application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_chance: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub skill_check_chance_application_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub stamina_regen: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub stamina_regen_application_type: Option<String>,
    #[serde(deserialize_with = "numeric_entries")]
    pub base_stat_overrides: Option<BTreeMap<String, f64>>,
    #[serde(deserialize_with = "lenient_flag")]
    pub per_team_member: bool,
    pub special: Option<Value>,
}

/// Which side of an ability a structured block belongs to. The player side
/// routes `skillCheckSize` into the skill-check bonus amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectSide {
    Player,
    Team,
}

impl StructuredEffectRecord {
    fn fields(&self, side: EffectSide) -> Vec<(Stat, f64, Option<&str>)> {
        let size_target = match side {
            EffectSide::Player => Stat::SkillCheckAmount,
            EffectSide::Team => Stat::SkillCheckSize,
        };
        let mut fields = vec![
            (
                Stat::MovementSpeed,
                self.movement_speed,
                self.movement_speed_application_type.as_deref(),
            ),
            (
                Stat::ExtractionSpeed,
                self.extraction_speed,
                self.extraction_speed_application_type.as_deref(),
            ),
            (
                size_target,
                self.skill_check_size,
                self.skill_check_size_application_type.as_deref(),
            ),
            (
                Stat::SkillCheckChance,
                self.skill_check_chance,
                self.skill_check_chance_application_type.as_deref(),
            ),
            (
                Stat::StaminaRegen,
                self.stamina_regen,
                self.stamina_regen_application_type.as_deref(),
            ),
        ];
        if side == EffectSide::Team {
            fields.push((
                Stat::SkillCheckAmount,
                self.skill_check_amount,
                self.skill_check_amount_application_type.as_deref(),
            ));
        }
        fields
            .into_iter()
            .filter_map(|(stat, value, app)| value.filter(|v| v.is_finite()).map(|v| (stat, v, app)))
            .collect()
    }

    fn is_special(&self) -> bool {
        match &self.special {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(_) => true,
        }
    }

    fn application_for(&self, field_override: Option<&str>) -> Option<ApplicationType> {
        let name = field_override
            .or(self.application_type.as_deref())
            .unwrap_or("multiplicative");
        match ApplicationType::from_name(name)? {
            ApplicationType::BaseStatIncrease => None,
            other => Some(other),
        }
    }

    fn structured_effects(&self, side: EffectSide) -> Vec<Effect> {
        self.fields(side)
            .into_iter()
            .filter_map(|(stat, value, field_app)| {
                let application = self.application_for(field_app)?;
                Some(Effect::from_application(stat, application, value, None))
            })
            .collect()
    }

    /// Fields without their own or a shared application type count as
    /// multiplicative.
    pub fn to_player_effects(&self) -> Vec<Effect> {
        if self.is_special() {
            return vec![Effect::Special];
        }
        if let Some(overrides) = &self.base_stat_overrides {
            let mut effects: Vec<Effect> = overrides
                .iter()
                .filter_map(|(name, value)| {
                    Stat::from_name(name).map(|stat| Effect::BaseOverride { stat, value: *value })
                })
                .collect();
            // Only a multiplicative movement bonus rides alongside overrides.
            if let Some(value) = self.movement_speed {
                if self.application_for(self.movement_speed_application_type.as_deref())
                    == Some(ApplicationType::Multiplicative)
                {
                    effects.push(Effect::Multiplicative {
                        stat: Stat::MovementSpeed,
                        value,
                        cap: None,
                    });
                }
            }
            return effects;
        }
        if self.per_team_member {
            return self
                .fields(EffectSide::Player)
                .into_iter()
                .map(|(stat, value, _)| Effect::PerTeamMember { stat, value })
                .collect();
        }
        self.structured_effects(EffectSide::Player)
    }

    pub fn to_team_effects(&self) -> Vec<Effect> {
        self.structured_effects(EffectSide::Team)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub has_toggle: bool,
    #[serde(default)]
    pub player_effect: Option<Value>,
    #[serde(default)]
    pub team_effect: Option<Value>,
    // Legacy flat team ability.
    #[serde(default)]
    pub target_stat: Option<String>,
    #[serde(default)]
    pub application_type: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

fn structured(value: &Option<Value>, ability_id: &str) -> Option<StructuredEffectRecord> {
    let raw = value.as_ref().filter(|v| v.is_object())?;
    match serde_json::from_value(raw.clone()) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!(ability = ability_id, %err, "structured effect block dropped");
            None
        }
    }
}

impl AbilityRecord {
    pub fn into_ability(self) -> Ability {
        let player_effects = structured(&self.player_effect, &self.id)
            .map(|record| record.to_player_effects())
            .unwrap_or_default();

        let team_effects = match structured(&self.team_effect, &self.id) {
            Some(record) => record.to_team_effects(),
            None => self.legacy_team_effect().into_iter().collect(),
        };

        Ability {
            id: self.id,
            name: self.name,
            has_toggle: self.has_toggle,
            player_effects,
            team_effects,
        }
    }

    fn legacy_team_effect(&self) -> Option<Effect> {
        if self.application_type.as_deref() != Some("multiplicative") {
            return None;
        }
        let stat = Stat::from_name(self.target_stat.as_deref()?)?;
        let value = self.value?;
        Some(Effect::Multiplicative {
            stat,
            value,
            cap: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalStatRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stat_modifiers: BTreeMap<String, f64>,
    #[serde(default)]
    pub modifier_overrides: BTreeMap<String, f64>,
}

fn normalize_stat_map(raw: BTreeMap<String, f64>) -> BTreeMap<Stat, f64> {
    raw.into_iter()
        .filter_map(|(name, value)| Stat::from_name(&name).map(|stat| (stat, value)))
        .collect()
}

impl ConditionalStatRecord {
    pub fn into_set(self) -> ConditionalStatSet {
        ConditionalStatSet {
            name: self.name,
            stat_modifiers: normalize_stat_map(self.stat_modifiers),
            modifier_overrides: normalize_stat_map(self.modifier_overrides),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToonRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_stats: BaseStats,
    #[serde(default)]
    pub star_ratings: StarRatings,
    #[serde(default)]
    pub ability: Option<AbilityRecord>,
    #[serde(default)]
    pub ability2: Option<AbilityRecord>,
    #[serde(default)]
    pub conditional_stats: Vec<ConditionalStatRecord>,
    #[serde(default)]
    pub machine_head_start: Option<f64>,
}

impl ToonRecord {
    pub fn into_toon(self) -> Toon {
        let machine_head_start = self.machine_head_start.or_else(|| {
            (self.id == HEAD_START_TOON_ID).then_some(DEFAULT_TOON_HEAD_START_FRACTION)
        });
        Toon {
            id: self.id,
            name: self.name,
            base_stats: self.base_stats,
            star_ratings: self.star_ratings,
            abilities: [
                self.ability.map(AbilityRecord::into_ability),
                self.ability2.map(AbilityRecord::into_ability),
            ],
            conditional_stats: self
                .conditional_stats
                .into_iter()
                .map(ConditionalStatRecord::into_set)
                .collect(),
            machine_head_start,
        }
    }
}

fn effects_from_values(values: &[Value]) -> Vec<Effect> {
    values
        .iter()
        .filter_map(|raw| serde_json::from_value::<EffectRecord>(raw.clone()).ok())
        .filter_map(|record| record.to_effect())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrinketRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub effects: Vec<Value>,
    #[serde(default)]
    pub dynamic_team_based: bool,
    #[serde(default)]
    pub base_stamina_per_toon: Option<f64>,
    #[serde(default)]
    pub max_bonus: Option<f64>,
    /// Flat bonus for the selectable-stat trinket.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub first_machine_units: Option<f64>,
    #[serde(default)]
    pub candy_duration_bonus: Option<f64>,
    #[serde(default)]
    pub run_speed_capped: bool,
}

impl TrinketRecord {
    fn special(&self) -> Option<TrinketSpecial> {
        if self.run_speed_capped || self.id == RUN_SPEED_CAPPED_TRINKET_ID {
            return Some(TrinketSpecial::RunSpeedCappedStack);
        }
        if self.id == SELECTABLE_STAT_TRINKET_ID {
            return Some(TrinketSpecial::SelectableStat {
                bonus: self.value.unwrap_or(0.0),
            });
        }
        if self.dynamic_team_based || self.id == TEAM_SCALED_TRINKET_ID {
            return Some(TrinketSpecial::TeamScaledStamina {
                per_toon: self.base_stamina_per_toon.unwrap_or(DEFAULT_STAMINA_PER_TOON),
                max_bonus: self.max_bonus.unwrap_or(DEFAULT_TEAM_STAMINA_MAX),
            });
        }
        if let Some(units) = self.first_machine_units {
            return Some(TrinketSpecial::FirstMachineHeadStart { units });
        }
        if self.id == HEAD_START_TRINKET_ID {
            return Some(TrinketSpecial::FirstMachineHeadStart {
                units: DEFAULT_HEAD_START_UNITS,
            });
        }
        if let Some(seconds) = self.candy_duration_bonus {
            return Some(TrinketSpecial::CandyDurationExtension { seconds });
        }
        if self.id == CANDY_EXTENSION_TRINKET_ID {
            return Some(TrinketSpecial::CandyDurationExtension {
                seconds: DEFAULT_CANDY_EXTENSION_SECONDS,
            });
        }
        None
    }

    pub fn into_trinket(self) -> Trinket {
        let special = self.special();
        Trinket {
            effects: effects_from_values(&self.effects),
            id: self.id,
            name: self.name,
            stackable: self.stackable,
            hidden: self.hidden,
            special,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub effects: Vec<Value>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub instant_completion: Option<f64>,
    #[serde(default)]
    pub candy: Option<bool>,
}

impl ItemRecord {
    pub fn into_item(self) -> Item {
        let special = match self.instant_completion {
            Some(fraction) => Some(ItemSpecial::InstantCompletion { fraction }),
            None if self.id == INSTANT_COMPLETION_ITEM_ID => Some(ItemSpecial::InstantCompletion {
                fraction: DEFAULT_INSTANT_COMPLETION_FRACTION,
            }),
            None => None,
        };
        let candy = self
            .candy
            .unwrap_or_else(|| CANDY_ITEM_IDS.contains(&self.id.as_str()));
        Item {
            effects: effects_from_values(&self.effects),
            duration: self.duration.filter(|d| d.is_finite() && *d > 0.0),
            id: self.id,
            name: self.name,
            special,
            candy,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedPairRecord {
    pub walk: Option<f64>,
    pub run: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwistedSpeedsRecord {
    pub normal: SpeedPairRecord,
    pub panic: SpeedPairRecord,
    pub panic_suppressed: SpeedPairRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwistedRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub speeds: TwistedSpeedsRecord,
}

impl From<SpeedPairRecord> for SpeedPair {
    fn from(record: SpeedPairRecord) -> Self {
        SpeedPair {
            walk: record.walk.unwrap_or(0.0),
            run: record.run.unwrap_or(0.0),
        }
    }
}

impl TwistedRecord {
    pub fn into_twisted(self) -> Twisted {
        Twisted {
            id: self.id,
            name: self.name,
            speeds: TwistedSpeeds {
                normal: self.speeds.normal.into(),
                panic: self.speeds.panic.into(),
                panic_suppressed: self.speeds.panic_suppressed.into(),
            },
        }
    }
}
