use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use tooncalc::data::{
    load_build_selection, load_catalog, validate_catalog, BuildSelection, CatalogError, Effect,
    ItemSelection, ItemSpecial, Stat, TrinketSelection, TrinketSpecial, ValidationSeverity,
};
use tooncalc::engine::{calculate_selection, AllTogglesOff, CalcContext};
use tooncalc::EngineConfig;

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tooncalc-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_json(dir: &Path, file: &str, value: serde_json::Value) {
    fs::write(dir.join(file), value.to_string()).expect("fixture should be writable");
}

fn write_fixture(dir: &Path) {
    write_json(
        dir,
        "stat-mappings.json",
        json!({ "skillCheckSize": { "1": 40, "2": 50, "3": 60, "4": 70, "5": 80 } }),
    );
    write_json(
        dir,
        "toons.json",
        json!({ "toons": [
            {
                "id": "shelly",
                "name": "Shelly",
                "baseStats": {
                    "walkSpeed": 15, "runSpeed": 25, "stealth": 50,
                    "extractionSpeed": 1.2, "stamina": 100,
                    "skillCheckAmount": 3, "skillCheckChance": 0.25, "hearts": 3
                },
                "starRatings": { "walkSpeed": 3, "runSpeed": 3, "skillCheckAmount": 3 },
                "ability": {
                    "id": "dig_site",
                    "name": "Dig Site",
                    "teamEffect": { "applicationType": "multiplicative", "extractionSpeed": 0.1 }
                },
                "conditionalStats": [
                    { "name": "one_heart", "statModifiers": { "walkSpeed": 12 } }
                ]
            },
            {
                "id": "eggson",
                "name": "Eggson",
                "baseStats": {
                    "walkSpeed": 14, "runSpeed": 24, "stealth": 60,
                    "extractionSpeed": 1.0, "stamina": 90,
                    "skillCheckAmount": 3, "skillCheckChance": 0.2, "hearts": 2
                }
            }
        ]}),
    );
    write_json(
        dir,
        "trinkets.json",
        json!({ "trinkets": [
            { "id": "bone", "name": "Bone", "stackable": true,
              "effects": [{ "targetStat": "movementSpeed", "applicationType": "multiplicative", "value": 0.1 }] },
            { "id": "wrench", "name": "Wrench" },
            { "id": "cooler", "name": "Cooler",
              "effects": [{ "targetStat": "stamina", "applicationType": "additive", "value": 50 }] },
            { "id": "thermos", "name": "Thermos", "stackable": true,
              "effects": [{ "targetStat": "stamina", "applicationType": "additive", "value": 25 }] }
        ]}),
    );
    write_json(
        dir,
        "items.json",
        json!({ "items": [
            { "id": "jumper_cable", "name": "Jumper Cable" },
            { "id": "gumballs", "name": "Gumballs", "duration": 10,
              "effects": [{ "targetStat": "extractionSpeed", "applicationType": "multiplicative", "value": 0.2 }] }
        ]}),
    );
    write_json(
        dir,
        "twisteds.json",
        json!({ "twisteds": [
            { "id": "twisted_shelly", "name": "Twisted Shelly",
              "speeds": { "normal": { "walk": 10, "run": 12 }, "panicSuppressed": { "run": 30 } } }
        ]}),
    );
}

#[test]
fn catalog_loads_and_normalizes_special_records() {
    let dir = unique_temp_dir("catalog-load");
    write_fixture(&dir);

    let catalog = load_catalog(&dir).expect("catalog should load");
    assert_eq!(catalog.toons.len(), 2);
    assert_eq!(catalog.stat_value("skillCheckSize", 3), 60.0);

    let eggson = catalog.toon("eggson").expect("eggson");
    assert_eq!(eggson.machine_head_start, Some(0.1));
    assert_eq!(catalog.toon("shelly").and_then(|t| t.machine_head_start), None);

    let bone = catalog.trinket("bone").expect("bone");
    assert!(bone.is_run_speed_capped());
    assert_eq!(
        catalog.trinket("wrench").and_then(|t| t.special),
        Some(TrinketSpecial::FirstMachineHeadStart { units: 15.0 })
    );

    let cable = catalog.item("jumper_cable").expect("jumper cable");
    assert_eq!(
        cable.special,
        Some(ItemSpecial::InstantCompletion { fraction: 0.33 })
    );
    let gumballs = catalog.item("gumballs").expect("gumballs");
    assert!(gumballs.candy);
    assert_eq!(gumballs.duration, Some(10.0));
    assert_eq!(
        gumballs.effects,
        vec![Effect::Multiplicative {
            stat: Stat::ExtractionSpeed,
            value: 0.2,
            cap: None
        }]
    );

    let twisted = catalog.twisted("twisted_shelly").expect("twisted");
    assert_eq!(twisted.speeds.normal.run, 12.0);
    assert_eq!(twisted.speeds.panic.run, 0.0);
    assert_eq!(twisted.speeds.panic_suppressed.run, 30.0);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn optional_files_fall_back_to_empty_but_toons_are_required() {
    let dir = unique_temp_dir("catalog-partial");
    let missing = load_catalog(&dir);
    assert!(matches!(missing, Err(CatalogError::Io { .. })));

    write_json(&dir, "toons.json", json!({ "toons": [{ "id": "pebble", "baseStats": {} }] }));
    let catalog = load_catalog(&dir).expect("toons alone should load");
    assert_eq!(catalog.toons.len(), 1);
    assert!(catalog.trinkets.is_empty());
    assert!(catalog.items.is_empty());
    assert!(catalog.twisteds.is_empty());
    assert_eq!(catalog.stat_value("skillCheckSize", 3), 0.0);

    fs::write(dir.join("trinkets.json"), "{ not json").expect("write");
    assert!(matches!(load_catalog(&dir), Err(CatalogError::Json { .. })));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn build_resolution_clamps_counts_and_drops_unknown_ids() {
    let dir = unique_temp_dir("catalog-resolve");
    write_fixture(&dir);
    let catalog = load_catalog(&dir).expect("catalog should load");

    let selection = BuildSelection {
        trinkets: vec![
            TrinketSelection {
                id: "thermos".to_string(),
                count: 25,
                selected_stat: None,
            },
            TrinketSelection {
                id: "wrench".to_string(),
                count: 3,
                selected_stat: None,
            },
            TrinketSelection {
                id: "missing".to_string(),
                count: 1,
                selected_stat: None,
            },
        ],
        items: vec![
            ItemSelection {
                id: "gumballs".to_string(),
                count: 2,
            },
            ItemSelection {
                id: "jumper_cable".to_string(),
                count: 0,
            },
        ],
        team_abilities: vec!["dig_site".to_string(), "nope".to_string()],
        conditional_stat: Some("one_heart".to_string()),
        team_size: 0,
        skill_check_success_rate: 1.7,
        ..BuildSelection::for_toon("shelly")
    };

    let state = catalog.resolve_build(&selection, 10).expect("shelly exists");
    assert_eq!(state.trinket_count("thermos"), 10);
    assert_eq!(state.trinket_count("wrench"), 1);
    assert!(!state.has_trinket("missing"));
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].count, 2);
    assert_eq!(state.team_abilities.len(), 1);
    assert_eq!(state.team_abilities[0].id, "dig_site");
    assert_eq!(
        state.conditional_stat.as_ref().map(|set| set.name.as_str()),
        Some("one_heart")
    );
    assert_eq!(state.team_size, 1);
    assert_eq!(state.skill_check_success_rate, 1.0);

    assert!(catalog
        .resolve_build(&BuildSelection::for_toon("nobody"), 10)
        .is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn duplicate_selection_entries_share_one_stack_limit() {
    let dir = unique_temp_dir("catalog-duplicates");
    write_fixture(&dir);
    let catalog = load_catalog(&dir).expect("catalog should load");
    let config = EngineConfig::default();
    let ctx = CalcContext::new(&catalog.stat_mappings, &AllTogglesOff, &config);

    let pick = |id: &str, count: u32| TrinketSelection {
        id: id.to_string(),
        count,
        selected_stat: None,
    };
    let selection = BuildSelection {
        trinkets: vec![
            pick("cooler", 1),
            pick("thermos", 10),
            pick("cooler", 1),
            pick("thermos", 10),
        ],
        items: vec![
            ItemSelection {
                id: "gumballs".to_string(),
                count: 6,
            },
            ItemSelection {
                id: "gumballs".to_string(),
                count: 7,
            },
        ],
        ..BuildSelection::for_toon("shelly")
    };

    let state = catalog.resolve_build(&selection, 10).expect("shelly exists");
    assert_eq!(state.trinkets.len(), 2);
    assert_eq!(state.trinket_count("cooler"), 1);
    assert_eq!(state.trinket_count("thermos"), 10);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].count, 10);

    let result = calculate_selection(&catalog, &selection, &ctx).expect("known toon");
    assert!((result.final_stats.stamina - 400.0).abs() < 1e-9);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn selection_calculates_against_loaded_catalog() {
    let dir = unique_temp_dir("catalog-calc");
    write_fixture(&dir);
    let catalog = load_catalog(&dir).expect("catalog should load");
    let config = EngineConfig::default();
    let ctx = CalcContext::new(&catalog.stat_mappings, &AllTogglesOff, &config);

    let mut selection = BuildSelection::for_toon("shelly");
    selection.trinkets.push(TrinketSelection {
        id: "thermos".to_string(),
        count: 2,
        selected_stat: None,
    });
    let result = calculate_selection(&catalog, &selection, &ctx).expect("known toon");
    assert!((result.final_stats.stamina - 150.0).abs() < 1e-9);
    assert_eq!(result.base.stamina, 100.0);

    assert!(calculate_selection(&catalog, &BuildSelection::for_toon("ghost"), &ctx).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn build_selection_file_fills_defaults() {
    let dir = unique_temp_dir("build-file");
    let path = dir.join("build.json");
    write_json(
        &dir,
        "build.json",
        json!({ "toon": "shelly", "trinkets": [{ "id": "bone" }], "toggles": { "dig_site": true } }),
    );

    let selection = load_build_selection(&path).expect("build should parse");
    assert_eq!(selection.toon, "shelly");
    assert_eq!(selection.trinkets[0].count, 1);
    assert_eq!(selection.team_size, 1);
    assert_eq!(selection.skill_check_success_rate, 1.0);
    assert_eq!(selection.toggles.get("dig_site"), Some(&true));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn validate_accepts_clean_catalog() {
    let dir = unique_temp_dir("validate-clean");
    write_fixture(&dir);

    let report = validate_catalog(&dir).expect("catalog should be readable");
    assert!(!report.has_errors(), "{:?}", report.diagnostics);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn validate_reports_duplicates_bad_stars_and_unknown_application_types() {
    let dir = unique_temp_dir("validate-broken");
    write_json(
        &dir,
        "toons.json",
        json!({ "toons": [
            { "id": "shelly", "baseStats": { "stamina": 100 }, "starRatings": { "stamina": 6 } },
            { "id": "shelly", "baseStats": { "stamina": "lots", "luck": 2 } },
            { "name": "Nameless" }
        ]}),
    );
    write_json(
        &dir,
        "trinkets.json",
        json!({ "trinkets": [
            { "id": "cooler", "effects": [
                { "targetStat": "stamina", "applicationType": "exponential", "value": 2 },
                { "targetStat": "luck", "applicationType": "additive", "value": 1 }
            ]}
        ]}),
    );
    write_json(
        &dir,
        "items.json",
        json!({ "items": [{ "id": "soda", "duration": -5 }] }),
    );

    let report = validate_catalog(&dir).expect("files should be readable");
    assert!(report.has_errors());

    let messages: Vec<String> = report.diagnostics.iter().map(ToString::to_string).collect();
    let has = |needle: &str| messages.iter().any(|message| message.contains(needle));
    assert!(has("duplicate id 'shelly'"));
    assert!(has("star rating must be an integer 1-5"));
    assert!(has("expected number"));
    assert!(has("missing non-empty 'id'"));
    assert!(has("missing 'baseStats' object"));
    assert!(has("unsupported application type 'exponential'"));
    assert!(has("unrecognized stat 'luck'"));
    assert!(has("duration must be a non-negative number"));
    assert!(has("stat-mappings.json: missing"));
    assert!(report.count(ValidationSeverity::Warning) >= 2);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn validate_fails_hard_without_toon_file() {
    let dir = unique_temp_dir("validate-empty");
    let err = validate_catalog(&dir).expect_err("missing toons.json should fail");
    assert!(err.contains("toons.json"));
    let _ = fs::remove_dir_all(dir);
}
