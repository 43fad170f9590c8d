use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::effect::Effect;
use crate::data::stat::Stat;

/// One multiplicative entry: contributes `(1 + value)` to the product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Multiplier {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
}

impl Multiplier {
    pub fn new(value: f64) -> Self {
        Self { value, cap: None }
    }

    pub fn capped(value: f64, cap: f64) -> Self {
        Self {
            value,
            cap: Some(cap),
        }
    }
}

/// Per-stat modifier lists. Contributions are kept as lists and folded in
/// sorted order so the result never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModifierBucket {
    pub multiplicative: Vec<Multiplier>,
    pub additive: Vec<f64>,
}

impl ModifierBucket {
    pub fn push_multiplier(&mut self, multiplier: Multiplier) {
        self.multiplicative.push(multiplier);
    }

    pub fn push_additive(&mut self, value: f64) {
        self.additive.push(value);
    }

    pub fn additive_total(&self) -> f64 {
        let mut values = self.additive.clone();
        values.sort_by(f64::total_cmp);
        values.iter().sum()
    }

    pub fn multiplier(&self) -> f64 {
        let mut factors: Vec<f64> = self
            .multiplicative
            .iter()
            .map(|entry| 1.0 + entry.value)
            .collect();
        factors.sort_by(f64::total_cmp);
        factors.iter().product()
    }

    /// Last cap seen in insertion order.
    pub fn cap(&self) -> Option<f64> {
        self.multiplicative.iter().rev().find_map(|entry| entry.cap)
    }

    /// `(base + additive) * product(1 + m)`, clamped by the cap when present.
    pub fn resolve(&self, base: f64) -> f64 {
        let value = (base + self.additive_total()) * self.multiplier();
        match self.cap() {
            Some(cap) => value.min(cap),
            None => value,
        }
    }

    /// Display-only net change against `base`, one decimal. Blends additive
    /// and multiplicative contributions into a single number and ignores caps.
    pub fn net_percentage(&self, base: f64) -> f64 {
        let value = (base + self.additive_total()) * self.multiplier();
        let percent = (value - base) / base * 100.0;
        (percent * 10.0).round() / 10.0
    }

    /// Union of two buckets (movementSpeed with walk/run-only modifiers).
    pub fn merged_with(&self, other: &ModifierBucket) -> ModifierBucket {
        let mut merged = self.clone();
        merged
            .multiplicative
            .extend(other.multiplicative.iter().copied());
        merged.additive.extend(other.additive.iter().copied());
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.multiplicative.is_empty() && self.additive.is_empty()
    }
}

/// Buckets for every modifiable stat, keyed by [`Stat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierBuckets {
    buckets: BTreeMap<Stat, ModifierBucket>,
}

impl Default for ModifierBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierBuckets {
    pub fn new() -> Self {
        Self {
            buckets: Stat::BUCKETED
                .iter()
                .map(|stat| (*stat, ModifierBucket::default()))
                .collect(),
        }
    }

    /// `None` for stats without a bucket (hearts).
    pub fn get(&self, stat: Stat) -> Option<&ModifierBucket> {
        self.buckets.get(&stat)
    }

    /// Empty bucket for stats that have none.
    pub fn bucket(&self, stat: Stat) -> ModifierBucket {
        self.buckets.get(&stat).cloned().unwrap_or_default()
    }

    pub fn push_multiplier(&mut self, stat: Stat, multiplier: Multiplier) {
        if let Some(bucket) = self.buckets.get_mut(&stat) {
            bucket.push_multiplier(multiplier);
        }
    }

    pub fn push_additive(&mut self, stat: Stat, value: f64) {
        if let Some(bucket) = self.buckets.get_mut(&stat) {
            bucket.push_additive(value);
        }
    }

    /// Fold one modifier effect into its bucket. Base-level and special
    /// effects are handled by the collector and ignored here.
    pub fn apply(&mut self, effect: &Effect) {
        match *effect {
            Effect::Multiplicative { stat, value, cap } => {
                self.push_multiplier(stat, Multiplier { value, cap });
            }
            Effect::Additive { stat, value } => self.push_additive(stat, value),
            Effect::BaseIncrease { .. }
            | Effect::BaseOverride { .. }
            | Effect::PerTeamMember { .. }
            | Effect::Special => {}
        }
    }

    /// Apply `effects` `count` times each.
    pub fn apply_repeated<'a, I>(&mut self, effects: I, count: u32)
    where
        I: IntoIterator<Item = &'a Effect>,
    {
        for effect in effects {
            for _ in 0..count {
                self.apply(effect);
            }
        }
    }

    /// Walk or run bucket merged with the shared movementSpeed bucket.
    pub fn movement(&self, stat: Stat) -> ModifierBucket {
        self.bucket(Stat::MovementSpeed).merged_with(&self.bucket(stat))
    }
}
