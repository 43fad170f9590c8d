pub mod build;
pub mod catalog;
pub mod effect;
pub mod loader;
pub mod records;
pub mod stat;
pub mod validate;

pub use build::{
    load_build_selection, ActiveItem, BuildSelection, BuildState, EquippedTrinket, ItemSelection,
    TrinketSelection,
};
pub use catalog::{
    Ability, Catalog, ConditionalStatSet, Item, ItemSpecial, SpeedPair, StatMappings, TeamAbility,
    Toon, Trinket, TrinketSpecial, Twisted, TwistedSpeeds,
};
pub use effect::{ApplicationType, Effect};
pub use loader::{data_dir_from_env, load_catalog, CatalogError};
pub use stat::{BaseStats, StarRatings, Stat};
pub use validate::{validate_catalog, ValidationDiagnostic, ValidationReport, ValidationSeverity};
