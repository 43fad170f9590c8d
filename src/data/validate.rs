use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::data::loader::{ITEMS_FILE, STAT_MAPPINGS_FILE, TOONS_FILE, TRINKETS_FILE};
use crate::data::stat::Stat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

const APPLICATION_TYPES: &[&str] = &["multiplicative", "additive", "baseStatIncrease"];

/// Stats whose star rating feeds a lookup table.
const LOOKUP_STATS: &[&str] = &["skillCheckSize"];

fn read_json(path: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("unable to read '{}': {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("unable to parse json '{}': {err}", path.display()))
}

fn entries<'a>(payload: &'a Value, key: &str) -> Result<&'a Vec<Value>, String> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .ok_or_else(|| format!("expected top-level JSON array or {{ {key}: [...] }}"))
}

/// Validate the catalog files under `dir`. Unreadable toon data is a hard
/// failure; optional files are skipped when absent.
pub fn validate_catalog(dir: impl AsRef<Path>) -> Result<ValidationReport, String> {
    let dir = dir.as_ref();
    let mut report = ValidationReport::default();

    let toons = read_json(&dir.join(TOONS_FILE))?;
    validate_toons(&mut report, entries(&toons, "toons")?);

    let trinkets_path = dir.join(TRINKETS_FILE);
    if trinkets_path.exists() {
        let trinkets = read_json(&trinkets_path)?;
        validate_modifiers(&mut report, "trinkets", entries(&trinkets, "trinkets")?);
    }

    let items_path = dir.join(ITEMS_FILE);
    if items_path.exists() {
        let items = read_json(&items_path)?;
        let items = entries(&items, "items")?;
        validate_modifiers(&mut report, "items", items);
        validate_durations(&mut report, items);
    }

    let mappings_path = dir.join(STAT_MAPPINGS_FILE);
    if mappings_path.exists() {
        validate_stat_mappings(&mut report, &read_json(&mappings_path)?);
    } else {
        report.push(
            ValidationSeverity::Warning,
            STAT_MAPPINGS_FILE,
            "missing; star-rating lookups will resolve to 0",
        );
    }

    Ok(report)
}

fn entry_id(
    report: &mut ValidationReport,
    object: &Map<String, Value>,
    base_context: &str,
    seen_ids: &mut HashSet<String>,
) -> String {
    match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => {
            if !seen_ids.insert(id.to_string()) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{base_context}.id"),
                    format!("duplicate id '{id}'"),
                );
            }
            id.to_string()
        }
        _ => {
            report.push(
                ValidationSeverity::Error,
                format!("{base_context}.id"),
                "missing non-empty 'id'",
            );
            "<missing-id>".to_string()
        }
    }
}

fn validate_toons(report: &mut ValidationReport, toons: &[Value]) {
    let mut seen_ids = HashSet::new();
    for (index, entry) in toons.iter().enumerate() {
        let base_context = format!("toons[{index}]");
        let Some(object) = entry.as_object() else {
            report.push(ValidationSeverity::Error, base_context, "entry is not an object");
            continue;
        };
        let toon_id = entry_id(report, object, &base_context, &mut seen_ids);
        let context = format!("toons[{index}] id='{toon_id}'");

        match object.get("baseStats").and_then(Value::as_object) {
            Some(stats) => {
                for (name, value) in stats {
                    if Stat::from_name(name).is_none() {
                        report.push(
                            ValidationSeverity::Warning,
                            format!("{context}.baseStats.{name}"),
                            "unrecognized stat ignored",
                        );
                    } else if !value.is_number() {
                        report.push(
                            ValidationSeverity::Error,
                            format!("{context}.baseStats.{name}"),
                            "expected number",
                        );
                    }
                }
            }
            None => report.push(
                ValidationSeverity::Error,
                format!("{context}.baseStats"),
                "missing 'baseStats' object",
            ),
        }

        if let Some(ratings) = object.get("starRatings").and_then(Value::as_object) {
            for (name, value) in ratings {
                match value.as_u64() {
                    Some(stars) if (1..=5).contains(&stars) => {}
                    _ => report.push(
                        ValidationSeverity::Error,
                        format!("{context}.starRatings.{name}"),
                        format!("star rating must be an integer 1-5, got {value}"),
                    ),
                }
            }
        }

        for slot in ["ability", "ability2"] {
            if let Some(ability) = object.get(slot).and_then(Value::as_object) {
                validate_ability(report, &format!("{context}.{slot}"), ability);
            }
        }
    }
}

fn validate_ability(report: &mut ValidationReport, context: &str, ability: &Map<String, Value>) {
    if ability.get("hasToggle").and_then(Value::as_bool) == Some(true)
        && ability.get("id").and_then(Value::as_str).is_none()
    {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.id"),
            "toggleable ability needs an id to key its toggle state",
        );
    }

    let Some(player) = ability.get("playerEffect").and_then(Value::as_object) else {
        return;
    };
    if let Some(overrides) = player.get("baseStatOverrides").and_then(Value::as_object) {
        for name in overrides.keys() {
            if Stat::from_name(name).is_none() {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.playerEffect.baseStatOverrides.{name}"),
                    "unrecognized stat ignored",
                );
            }
        }
    }
    if player.contains_key("special") {
        report.push(
            ValidationSeverity::Info,
            format!("{context}.playerEffect"),
            "special effect is excluded from automatic resolution",
        );
    }
}

fn validate_modifiers(report: &mut ValidationReport, label: &str, entries: &[Value]) {
    let mut seen_ids = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let base_context = format!("{label}[{index}]");
        let Some(object) = entry.as_object() else {
            report.push(ValidationSeverity::Error, base_context, "entry is not an object");
            continue;
        };
        let id = entry_id(report, object, &base_context, &mut seen_ids);
        let context = format!("{label}[{index}] id='{id}'");

        let Some(effects) = object.get("effects") else {
            continue;
        };
        let Some(effects) = effects.as_array() else {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.effects"),
                "expected array",
            );
            continue;
        };
        for (effect_index, effect) in effects.iter().enumerate() {
            validate_effect(report, &format!("{context}.effects[{effect_index}]"), effect);
        }
    }
}

fn validate_effect(report: &mut ValidationReport, context: &str, effect: &Value) {
    let Some(effect) = effect.as_object() else {
        report.push(
            ValidationSeverity::Error,
            context,
            "effect is not an object; it will be skipped",
        );
        return;
    };

    match effect.get("targetStat").and_then(Value::as_str) {
        Some(name) if Stat::from_name(name).is_some() => {}
        Some(name) => report.push(
            ValidationSeverity::Warning,
            format!("{context}.targetStat"),
            format!("unrecognized stat '{name}'; effect will be dropped"),
        ),
        None => report.push(
            ValidationSeverity::Error,
            format!("{context}.targetStat"),
            "missing non-empty 'targetStat'",
        ),
    }

    match effect.get("applicationType").and_then(Value::as_str) {
        Some(kind) if APPLICATION_TYPES.contains(&kind) => {}
        Some(kind) => report.push(
            ValidationSeverity::Error,
            format!("{context}.applicationType"),
            format!("unsupported application type '{kind}'"),
        ),
        None => report.push(
            ValidationSeverity::Error,
            format!("{context}.applicationType"),
            "missing 'applicationType'",
        ),
    }

    if !effect.get("value").is_some_and(Value::is_number) {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.value"),
            "missing numeric 'value'",
        );
    }
}

fn validate_durations(report: &mut ValidationReport, items: &[Value]) {
    for (index, entry) in items.iter().enumerate() {
        let Some(duration) = entry.get("duration") else {
            continue;
        };
        match duration.as_f64() {
            Some(seconds) if seconds >= 0.0 => {
                if seconds == 0.0 {
                    report.push(
                        ValidationSeverity::Info,
                        format!("items[{index}].duration"),
                        "zero duration is treated as permanent",
                    );
                }
            }
            _ => report.push(
                ValidationSeverity::Error,
                format!("items[{index}].duration"),
                format!("duration must be a non-negative number, got {duration}"),
            ),
        }
    }
}

fn validate_stat_mappings(report: &mut ValidationReport, mappings: &Value) {
    for stat in LOOKUP_STATS {
        let Some(table) = mappings.get(*stat).and_then(Value::as_object) else {
            report.push(
                ValidationSeverity::Error,
                format!("{STAT_MAPPINGS_FILE}.{stat}"),
                "missing lookup table",
            );
            continue;
        };
        for stars in 1..=5 {
            if !table.get(&stars.to_string()).is_some_and(Value::is_number) {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{STAT_MAPPINGS_FILE}.{stat}.{stars}"),
                    "missing star value; lookups resolve to 0",
                );
            }
        }
    }
}
