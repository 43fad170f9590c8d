//! Build selections (ids as chosen in the UI) and the resolved, owned
//! snapshot the engine calculates against.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::catalog::{Catalog, ConditionalStatSet, Item, TeamAbility, Toon, Trinket};
use crate::data::loader::CatalogError;
use crate::data::stat::Stat;

fn default_count() -> u32 {
    1
}

fn default_team_size() -> u32 {
    1
}

fn default_success_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrinketSelection {
    pub id: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub selected_stat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSelection {
    pub id: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Everything the user picked, by catalog id. Also carries the externally
/// persisted ability toggle states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSelection {
    pub toon: String,
    #[serde(default)]
    pub trinkets: Vec<TrinketSelection>,
    #[serde(default)]
    pub items: Vec<ItemSelection>,
    #[serde(default)]
    pub team_abilities: Vec<String>,
    #[serde(default)]
    pub conditional_stat: Option<String>,
    #[serde(default = "default_team_size")]
    pub team_size: u32,
    #[serde(default = "default_success_rate")]
    pub skill_check_success_rate: f64,
    #[serde(default)]
    pub toggles: BTreeMap<String, bool>,
}

impl BuildSelection {
    pub fn for_toon(toon: impl Into<String>) -> Self {
        Self {
            toon: toon.into(),
            trinkets: Vec::new(),
            items: Vec::new(),
            team_abilities: Vec::new(),
            conditional_stat: None,
            team_size: 1,
            skill_check_success_rate: 1.0,
            toggles: BTreeMap::new(),
        }
    }
}

pub fn load_build_selection(path: impl AsRef<Path>) -> Result<BuildSelection, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquippedTrinket {
    pub trinket: Trinket,
    pub count: u32,
    pub selected_stat: Option<Stat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveItem {
    pub item: Item,
    pub count: u32,
}

/// Immutable calculation input. Transforms return new values so cascade
/// steps never alias one another.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildState {
    pub toon: Toon,
    pub trinkets: Vec<EquippedTrinket>,
    pub items: Vec<ActiveItem>,
    pub team_abilities: Vec<TeamAbility>,
    pub conditional_stat: Option<ConditionalStatSet>,
    /// Team size including the player.
    pub team_size: u32,
    pub skill_check_success_rate: f64,
}

impl BuildState {
    pub fn new(toon: Toon) -> Self {
        Self {
            toon,
            trinkets: Vec::new(),
            items: Vec::new(),
            team_abilities: Vec::new(),
            conditional_stat: None,
            team_size: 1,
            skill_check_success_rate: 1.0,
        }
    }

    pub fn with_trinket(mut self, trinket: Trinket, count: u32) -> Self {
        self.trinkets.push(EquippedTrinket {
            trinket,
            count,
            selected_stat: None,
        });
        self
    }

    pub fn with_selected_stat_trinket(mut self, trinket: Trinket, stat: Stat) -> Self {
        self.trinkets.push(EquippedTrinket {
            trinket,
            count: 1,
            selected_stat: Some(stat),
        });
        self
    }

    pub fn with_item(mut self, item: Item, count: u32) -> Self {
        self.items.push(ActiveItem { item, count });
        self
    }

    pub fn with_team_ability(mut self, ability: TeamAbility) -> Self {
        self.team_abilities.push(ability);
        self
    }

    pub fn with_conditional_stat(mut self, set: ConditionalStatSet) -> Self {
        self.conditional_stat = Some(set);
        self
    }

    pub fn with_team_size(mut self, team_size: u32) -> Self {
        self.team_size = team_size.max(1);
        self
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.skill_check_success_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Copy of this state with every item whose id is listed removed.
    pub fn without_items(&self, ids: &[String]) -> BuildState {
        BuildState {
            items: self
                .items
                .iter()
                .filter(|active| !ids.contains(&active.item.id))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn trinket_count(&self, id: &str) -> u32 {
        self.trinkets
            .iter()
            .filter(|equipped| equipped.trinket.id == id)
            .map(|equipped| equipped.count)
            .sum()
    }

    pub fn has_trinket(&self, id: &str) -> bool {
        self.trinkets.iter().any(|equipped| equipped.trinket.id == id)
    }

    /// Copy with one more stack of `trinket` (new entry when not equipped).
    /// Performs no limit checks.
    pub fn with_extra_stack(&self, trinket: &Trinket) -> BuildState {
        let mut next = self.clone();
        match next
            .trinkets
            .iter_mut()
            .find(|equipped| equipped.trinket.id == trinket.id)
        {
            Some(existing) => existing.count += 1,
            None => next.trinkets.push(EquippedTrinket {
                trinket: trinket.clone(),
                count: 1,
                selected_stat: None,
            }),
        }
        next
    }

    /// Copy with one stack of `id` removed; the entry disappears at zero.
    pub fn without_stack(&self, id: &str) -> BuildState {
        let mut next = self.clone();
        if let Some(existing) = next
            .trinkets
            .iter_mut()
            .find(|equipped| equipped.trinket.id == id)
        {
            existing.count = existing.count.saturating_sub(1);
        }
        next.trinkets.retain(|equipped| equipped.count > 0);
        next
    }
}

impl Catalog {
    /// Resolve a selection into an owned snapshot. Returns `None` when the
    /// toon is unknown; unknown trinkets, items and abilities are dropped.
    pub fn resolve_build(&self, selection: &BuildSelection, max_stack: u32) -> Option<BuildState> {
        let toon = self.toon(&selection.toon)?.clone();
        let max_stack = max_stack.max(1);

        let mut trinkets: Vec<EquippedTrinket> = Vec::new();
        for picked in &selection.trinkets {
            let Some(trinket) = self.trinket(&picked.id) else {
                debug!(trinket = %picked.id, "unknown trinket dropped from build");
                continue;
            };
            let selected_stat = picked.selected_stat.as_deref().and_then(Stat::from_name);
            match trinkets
                .iter_mut()
                .find(|equipped| equipped.trinket.id == trinket.id)
            {
                Some(existing) => {
                    existing.count = existing.count.saturating_add(picked.count);
                    existing.selected_stat = existing.selected_stat.or(selected_stat);
                }
                None => trinkets.push(EquippedTrinket {
                    trinket: trinket.clone(),
                    count: picked.count,
                    selected_stat,
                }),
            }
        }
        // Duplicate entries share one stack limit per id.
        for equipped in &mut trinkets {
            equipped.count = if equipped.trinket.stackable {
                equipped.count.clamp(1, max_stack)
            } else {
                1
            };
        }

        let mut items: Vec<ActiveItem> = Vec::new();
        for picked in selection.items.iter().filter(|picked| picked.count > 0) {
            let Some(item) = self.item(&picked.id) else {
                debug!(item = %picked.id, "unknown item dropped from build");
                continue;
            };
            match items.iter_mut().find(|active| active.item.id == item.id) {
                Some(existing) => existing.count = existing.count.saturating_add(picked.count),
                None => items.push(ActiveItem {
                    item: item.clone(),
                    count: picked.count,
                }),
            }
        }
        for active in &mut items {
            active.count = active.count.min(max_stack);
        }

        let team_abilities = selection
            .team_abilities
            .iter()
            .filter_map(|id| {
                let ability = self.team_ability(id);
                if ability.is_none() {
                    debug!(ability = %id, "unknown team ability dropped from build");
                }
                ability
            })
            .collect();

        let conditional_stat = selection
            .conditional_stat
            .as_deref()
            .and_then(|name| toon.conditional_stat(name).cloned());

        Some(BuildState {
            toon,
            trinkets,
            items,
            team_abilities,
            conditional_stat,
            team_size: selection.team_size.max(1),
            skill_check_success_rate: selection.skill_check_success_rate.clamp(0.0, 1.0),
        })
    }
}
