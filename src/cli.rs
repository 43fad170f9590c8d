use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::data::build::{load_build_selection, BuildSelection};
use crate::data::catalog::Catalog;
use crate::data::loader::{data_dir_from_env, load_catalog};
use crate::data::validate::{validate_catalog, ValidationSeverity};
use crate::engine::calculator::{calculate_final_stats, CalcContext, CalculationResult};
use crate::machine::cascade::{machine_stats, MachineStats};
use crate::machine::export_csv::write_cascade_csv;
use crate::machine::ranking::rank_toons;
use crate::machine::speed::{twisted_matchups, TwistedMatchup};

const USAGE: &str = "usage: tooncalc <stats|machine|rank|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stats,
    Machine,
    Rank,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("stats") => Some(Command::Stats),
        Some("machine") => Some(Command::Machine),
        Some("rank") => Some(Command::Rank),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Stats) => handle_stats(args),
        Some(Command::Machine) => handle_machine(args),
        Some(Command::Rank) => handle_rank(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Catalog, build selection and config for a build-driven command.
struct Session {
    catalog: Catalog,
    selection: BuildSelection,
    config: EngineConfig,
}

impl Session {
    fn context(&self) -> CalcContext<'_> {
        CalcContext::new(&self.catalog.stat_mappings, &self.selection.toggles, &self.config)
    }
}

fn load_session(args: &[String], command: &str) -> Result<Session, i32> {
    let Some(build_path) = args.get(2) else {
        eprintln!("usage: tooncalc {command} <build.json>");
        return Err(2);
    };
    let data_dir = data_dir_from_env();
    let catalog = load_catalog(&data_dir).map_err(|err| {
        eprintln!("failed to load catalog: {err}");
        1
    })?;
    let selection = load_build_selection(build_path).map_err(|err| {
        eprintln!("failed to load build: {err}");
        1
    })?;
    info!(
        command,
        data_dir = %data_dir.display(),
        toon = %selection.toon,
        "loaded build"
    );
    Ok(Session {
        catalog,
        selection,
        config: EngineConfig::from_env(),
    })
}

fn print_json<T: Serialize>(value: &T, label: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {label}: {err}");
            1
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    #[serde(flatten)]
    result: CalculationResult,
    twisted_matchups: Vec<TwistedMatchup>,
}

fn handle_stats(args: &[String]) -> i32 {
    let session = match load_session(args, "stats") {
        Ok(session) => session,
        Err(code) => return code,
    };
    let ctx = session.context();
    let Some(state) = session
        .catalog
        .resolve_build(&session.selection, session.config.max_stack_count)
    else {
        eprintln!("unknown toon '{}'", session.selection.toon);
        return 1;
    };
    let result = calculate_final_stats(&state, &ctx);
    let matchups = twisted_matchups(&result.final_stats, &session.catalog.twisteds);
    print_json(
        &StatsReport {
            result,
            twisted_matchups: matchups,
        },
        "stats",
    )
}

fn handle_machine(args: &[String]) -> i32 {
    let session = match load_session(args, "machine") {
        Ok(session) => session,
        Err(code) => return code,
    };
    let as_csv = args.iter().any(|arg| arg == "--csv");
    let ctx = session.context();
    let Some(state) = session
        .catalog
        .resolve_build(&session.selection, session.config.max_stack_count)
    else {
        eprintln!("unknown toon '{}'", session.selection.toon);
        return 1;
    };
    let stats: MachineStats = machine_stats(&state, &ctx).rounded();

    if as_csv {
        return match write_cascade_csv(&stats.default, io::stdout()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("failed to write csv: {err}");
                1
            }
        };
    }
    print_json(&stats, "machine stats")
}

fn handle_rank(args: &[String]) -> i32 {
    let session = match load_session(args, "rank") {
        Ok(session) => session,
        Err(code) => return code,
    };
    let ctx = session.context();
    let ranked = rank_toons(&session.catalog, &session.selection, &ctx, true);
    print_json(&ranked, "ranking")
}

fn handle_validate(args: &[String]) -> i32 {
    let dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(data_dir_from_env);

    match validate_catalog(&dir) {
        Ok(report) => {
            for diagnostic in &report.diagnostics {
                eprintln!("- {diagnostic}");
            }
            if report.has_errors() {
                eprintln!(
                    "validation failed: {} error(s), {} warning(s)",
                    report.count(ValidationSeverity::Error),
                    report.count(ValidationSeverity::Warning)
                );
                1
            } else {
                println!(
                    "validation passed: {} ({} warning(s))",
                    dir.display(),
                    report.count(ValidationSeverity::Warning)
                );
                0
            }
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}
