pub mod calculator;
pub mod capped;
pub mod collector;
pub mod stacking;
pub mod toggles;

pub use calculator::{
    calculate_final_stats, calculate_selection, resolve, CalcContext, CalculationResult,
    DerivedStatBases, FinalStats, Percentages,
};
pub use capped::{equip_trinket, unequip_trinket, CappedStack, EquipRejection};
pub use collector::{collect, Collected};
pub use stacking::{ModifierBucket, ModifierBuckets, Multiplier};
pub use toggles::{AllTogglesOff, ToggleState};
