use tooncalc::data::{
    BaseStats, BuildSelection, BuildState, Catalog, Effect, Item, ItemSpecial, SpeedPair,
    StarRatings, Stat, StatMappings, Toon, Trinket, TrinketSpecial, Twisted, TwistedSpeeds,
};
use tooncalc::engine::{calculate_final_stats, AllTogglesOff, CalcContext};
use tooncalc::machine::{
    compare_speed, machine_stats, progress_inputs, rank_toons, schedule_completion,
    starting_units, timed_effects_for, twisted_matchups, write_cascade_csv, CompletionModel,
    ProgressInputs, SpeedTier,
};
use tooncalc::EngineConfig;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn toon(id: &str, extraction_speed: f64, skill_check_chance: f64) -> Toon {
    Toon {
        id: id.to_string(),
        name: id.to_string(),
        base_stats: BaseStats {
            walk_speed: 15.0,
            run_speed: 25.0,
            stealth: 50.0,
            extraction_speed,
            stamina: 100.0,
            skill_check_amount: 3.0,
            skill_check_chance,
            hearts: 3.0,
        },
        star_ratings: StarRatings::default(),
        abilities: [None, None],
        conditional_stats: Vec::new(),
        machine_head_start: None,
    }
}

fn timed_item(id: &str, extraction_bonus: f64, duration: f64, candy: bool) -> Item {
    Item {
        id: id.to_string(),
        name: format!("{id} item"),
        effects: vec![Effect::Multiplicative {
            stat: Stat::ExtractionSpeed,
            value: extraction_bonus,
            cap: None,
        }],
        duration: Some(duration),
        special: None,
        candy,
    }
}

fn jumper_cable() -> Item {
    Item {
        id: "jumper_cable".to_string(),
        name: "Jumper Cable".to_string(),
        effects: Vec::new(),
        duration: None,
        special: Some(ItemSpecial::InstantCompletion { fraction: 0.33 }),
        candy: false,
    }
}

fn special_trinket(id: &str, special: TrinketSpecial) -> Trinket {
    Trinket {
        id: id.to_string(),
        name: id.to_string(),
        stackable: false,
        hidden: false,
        effects: Vec::new(),
        special: Some(special),
    }
}

fn inputs(progress_rate: f64, bonus: f64, chance: f64) -> ProgressInputs {
    ProgressInputs {
        progress_rate,
        bonus_per_event: bonus,
        success_probability: 1.0,
        event_chance: chance,
    }
}

struct Fixture {
    mappings: StatMappings,
    config: EngineConfig,
}

impl Fixture {
    fn new() -> Self {
        Self {
            mappings: StatMappings::default(),
            config: EngineConfig::default(),
        }
    }

    fn ctx(&self) -> CalcContext<'_> {
        CalcContext::new(&self.mappings, &AllTogglesOff, &self.config)
    }
}

#[test]
fn estimate_matches_renewal_formula() {
    let model = CompletionModel::default();
    let estimate = model.estimate(&inputs(1.0, 3.0, 0.25), 45.0);

    let hazard = -(0.75f64).ln();
    let rate = hazard / (1.0 + hazard * 3.625);
    let progress = 1.0 + 3.0 * rate;
    approx_eq(estimate.effective_progress_rate, progress, 1e-12);
    approx_eq(estimate.expected_time, 45.0 / progress, 1e-12);
    approx_eq(estimate.expected_events, rate * 45.0 / progress, 1e-12);
    approx_eq(estimate.default_time, 45.0, 1e-12);
}

#[test]
fn expected_time_decreases_with_progress_rate_and_event_chance() {
    let model = CompletionModel::default();
    let mut previous = f64::INFINITY;
    for rate in [0.5, 0.75, 1.0, 1.5, 3.0] {
        let time = model.estimate(&inputs(rate, 3.0, 0.25), 45.0).expected_time;
        assert!(time < previous);
        previous = time;
    }

    let mut previous = f64::INFINITY;
    for chance in [0.0, 0.05, 0.25, 0.5, 0.9, 0.9999, 1.0] {
        let time = model.estimate(&inputs(1.0, 3.0, chance), 45.0).expected_time;
        if chance < 1.0 {
            assert!(time < previous, "chance {chance} did not speed things up");
        } else {
            approx_eq(time, previous, 1e-12);
        }
        previous = time;
    }
}

#[test]
fn successful_events_scale_with_success_probability() {
    let model = CompletionModel::default();
    let half = ProgressInputs {
        success_probability: 0.5,
        ..inputs(1.0, 3.0, 0.25)
    };
    let estimate = model.estimate(&half, 45.0);
    approx_eq(
        estimate.expected_successful_events,
        estimate.expected_events * 0.5,
        1e-12,
    );
}

#[test]
fn no_timed_effects_equals_single_estimate() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("shelly", 1.2, 0.3)).with_success_rate(0.8);

    let cascade = schedule_completion(&state, &[], 45.0, &ctx);
    let stats = calculate_final_stats(&state, &ctx).final_stats;
    let direct = fixture
        .config
        .machine
        .estimate(&progress_inputs(&stats, 0.8), 45.0);

    assert!(cascade.step_breakdown.is_empty());
    assert_eq!(cascade.total_time, direct.expected_time);
    assert_eq!(cascade.default_time, direct.default_time);
    assert_eq!(cascade.total_expected_events, direct.expected_events);
    assert_eq!(
        cascade.total_expected_successful_events,
        direct.expected_successful_events
    );
    assert_eq!(cascade.effective_progress_rate, direct.effective_progress_rate);
}

#[test]
fn work_finished_inside_first_window_stops_the_cascade() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("cosmo", 1.0, 0.25))
        .with_item(timed_item("extraction_speed_candy", 1.0, 60.0, true), 1)
        .with_item(timed_item("slow_soda", 0.5, 90.0, false), 1);

    let timed = timed_effects_for(&state);
    let result = schedule_completion(&state, &timed, 45.0, &ctx);

    assert_eq!(result.step_breakdown.len(), 1);
    let step = &result.step_breakdown[0];
    assert!(step.early_completion);
    assert!(step.actual_time_taken < 60.0);
    assert_eq!(step.units_remaining, 0.0);
    approx_eq(result.total_time, step.actual_time_taken, 1e-12);
}

#[test]
fn expiring_item_splits_work_into_windows() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("pebble", 1.0, 0.0))
        .with_item(timed_item("speed_candy", 1.0, 10.0, true), 1);

    let timed = timed_effects_for(&state);
    let result = schedule_completion(&state, &timed, 45.0, &ctx);

    assert_eq!(result.step_breakdown.len(), 1);
    let step = &result.step_breakdown[0];
    assert!(!step.early_completion);
    approx_eq(step.units_completed, 20.0, 1e-9);
    approx_eq(step.units_remaining, 25.0, 1e-9);
    assert_eq!(step.items_expired, vec!["speed_candy item".to_string()]);
    approx_eq(step.stats_at_step.extraction_speed, 2.0, 1e-12);
    approx_eq(result.total_time, 35.0, 1e-9);
    approx_eq(result.default_time, 22.5, 1e-9);
}

#[test]
fn shared_expiry_time_yields_one_window() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("razzle", 1.0, 0.0))
        .with_item(timed_item("gumballs", 0.2, 5.0, true), 1)
        .with_item(timed_item("chocolate", 0.3, 5.0, true), 1)
        .with_item(timed_item("bonbon", 0.1, 8.0, true), 1);

    let timed = timed_effects_for(&state);
    let result = schedule_completion(&state, &timed, 45.0, &ctx);

    assert_eq!(result.step_breakdown.len(), 2);
    assert_eq!(result.step_breakdown[0].items_expired.len(), 2);
    approx_eq(result.step_breakdown[1].actual_time_taken, 3.0, 1e-12);
    approx_eq(result.step_breakdown[1].stats_at_step.extraction_speed, 1.1, 1e-12);
}

#[test]
fn candy_items_gain_extension_seconds() {
    let state = BuildState::new(toon("glisten", 1.0, 0.25))
        .with_trinket(
            special_trinket(
                "glazed_fondant_bag",
                TrinketSpecial::CandyDurationExtension { seconds: 4.0 },
            ),
            1,
        )
        .with_item(timed_item("gumballs", 0.2, 10.0, true), 1)
        .with_item(timed_item("soda", 0.2, 10.0, false), 1);

    let timed = timed_effects_for(&state);
    assert_eq!(timed.len(), 2);
    assert_eq!(timed[0].effective_duration, 14.0);
    assert_eq!(timed[0].duration, 10.0);
    assert_eq!(timed[1].effective_duration, 10.0);
}

#[test]
fn instant_completion_items_deduct_work_up_front() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();

    let three = BuildState::new(toon("sprout", 1.0, 0.0)).with_item(jumper_cable(), 3);
    approx_eq(starting_units(&three, 45.0), 45.0 * (1.0 - 0.99), 1e-9);
    assert!(timed_effects_for(&three).is_empty());
    let partial = machine_stats(&three, &ctx);
    assert!(!partial.default.instant);
    approx_eq(partial.default.total_time, 0.45, 1e-9);

    let four = BuildState::new(toon("sprout", 1.0, 0.0)).with_item(jumper_cable(), 4);
    let instant = machine_stats(&four, &ctx);
    assert!(instant.default.instant);
    assert!(instant.first_machine.instant);
    assert_eq!(instant.default.total_time, 0.0);
}

#[test]
fn toon_head_start_and_first_machine_trinket() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut eggson = toon("eggson", 1.0, 0.0);
    eggson.machine_head_start = Some(0.1);
    let state = BuildState::new(eggson).with_trinket(
        special_trinket("wrench", TrinketSpecial::FirstMachineHeadStart { units: 15.0 }),
        1,
    );

    let stats = machine_stats(&state, &ctx);
    assert!(stats.has_head_start_trinket);
    approx_eq(stats.starting_units, 40.5, 1e-9);
    approx_eq(stats.default.total_time, 40.5, 1e-9);
    approx_eq(stats.first_machine.total_time, 25.5, 1e-9);

    let plain = machine_stats(&BuildState::new(toon("boxten", 1.0, 0.0)), &ctx);
    assert!(!plain.has_head_start_trinket);
    assert_eq!(plain.first_machine, plain.default);
}

#[test]
fn rounded_machine_stats_trim_presentation_digits() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("vee", 1.3, 0.25));
    let rounded = machine_stats(&state, &ctx).rounded();
    let tenths = rounded.default.total_time * 10.0;
    approx_eq(tenths, tenths.round(), 1e-9);
}

#[test]
fn speed_tiers_against_twisted_chase_states() {
    assert_eq!(compare_speed(18.0, 25.0, 18.0), SpeedTier::Outpaces);
    assert_eq!(compare_speed(15.0, 25.0, 20.0), SpeedTier::OutrunsWhileRunning);
    assert_eq!(compare_speed(15.0, 20.0, 20.0), SpeedTier::Caught);

    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let stats = calculate_final_stats(&BuildState::new(toon("finn", 1.0, 0.25)), &ctx).final_stats;
    let twisted = Twisted {
        id: "twisted_boxten".to_string(),
        name: "Twisted Boxten".to_string(),
        speeds: TwistedSpeeds {
            normal: SpeedPair {
                walk: 10.0,
                run: 12.0,
            },
            panic: SpeedPair {
                walk: 20.0,
                run: 22.0,
            },
            panic_suppressed: SpeedPair {
                walk: 24.0,
                run: 28.0,
            },
        },
    };
    let matchups = twisted_matchups(&stats, [&twisted]);
    assert_eq!(matchups[0].normal, SpeedTier::Outpaces);
    assert_eq!(matchups[0].panic, SpeedTier::OutrunsWhileRunning);
    assert_eq!(matchups[0].panic_suppressed, SpeedTier::Caught);
}

#[test]
fn ranking_orders_toons_by_expected_time() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let catalog = Catalog {
        toons: vec![
            toon("slow", 0.8, 0.25),
            toon("fast", 2.0, 0.25),
            toon("mid", 1.2, 0.25),
        ],
        ..Catalog::default()
    };
    let selection = BuildSelection::for_toon("slow");

    let parallel = rank_toons(&catalog, &selection, &ctx, true);
    let sequential = rank_toons(&catalog, &selection, &ctx, false);
    let order: Vec<&str> = parallel.iter().map(|ranked| ranked.toon_id.as_str()).collect();
    assert_eq!(order, vec!["fast", "mid", "slow"]);
    assert_eq!(
        parallel.iter().map(|r| r.expected_time).collect::<Vec<_>>(),
        sequential.iter().map(|r| r.expected_time).collect::<Vec<_>>()
    );
}

#[test]
fn cascade_breakdown_exports_as_csv() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let state = BuildState::new(toon("pebble", 1.0, 0.0))
        .with_item(timed_item("speed_candy", 1.0, 10.0, true), 1);
    let result = schedule_completion(&state, &timed_effects_for(&state), 45.0, &ctx);

    let mut buffer = Vec::new();
    write_cascade_csv(&result.rounded(), &mut buffer).expect("csv export");
    let text = String::from_utf8(buffer).expect("utf8");
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].starts_with("10,speed_candy item,2,3,0,20,25,"));
}
